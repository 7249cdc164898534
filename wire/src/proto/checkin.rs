//! Device check-in messages (proto2).

/// Chrome browser build fingerprint reported at check-in.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ChromeBuildProto {
    #[prost(enumeration = "chrome_build_proto::Platform", optional, tag = "1")]
    pub platform: ::core::option::Option<i32>,
    #[prost(string, optional, tag = "2")]
    pub chrome_version: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(enumeration = "chrome_build_proto::Channel", optional, tag = "3")]
    pub channel: ::core::option::Option<i32>,
}

/// Nested message and enum types in `ChromeBuildProto`.
pub mod chrome_build_proto {
    #[derive(
        Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration,
    )]
    #[repr(i32)]
    pub enum Platform {
        Win = 1,
        Mac = 2,
        Linux = 3,
        Cros = 4,
        Ios = 5,
        Android = 6,
    }

    impl Platform {
        /// String value of the enum field names used in the ProtoBuf definition.
        pub fn as_str_name(&self) -> &'static str {
            match self {
                Platform::Win => "PLATFORM_WIN",
                Platform::Mac => "PLATFORM_MAC",
                Platform::Linux => "PLATFORM_LINUX",
                Platform::Cros => "PLATFORM_CROS",
                Platform::Ios => "PLATFORM_IOS",
                Platform::Android => "PLATFORM_ANDROID",
            }
        }
    }

    #[derive(
        Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration,
    )]
    #[repr(i32)]
    pub enum Channel {
        Stable = 1,
        Beta = 2,
        Dev = 3,
        Canary = 4,
        Unknown = 5,
    }

    impl Channel {
        /// String value of the enum field names used in the ProtoBuf definition.
        pub fn as_str_name(&self) -> &'static str {
            match self {
                Channel::Stable => "CHANNEL_STABLE",
                Channel::Beta => "CHANNEL_BETA",
                Channel::Dev => "CHANNEL_DEV",
                Channel::Canary => "CHANNEL_CANARY",
                Channel::Unknown => "CHANNEL_UNKNOWN",
            }
        }
    }
}

/// Kind of device checking in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum DeviceType {
    AndroidOs = 1,
    IosOs = 2,
    ChromeBrowser = 3,
    ChromeOs = 4,
}

impl DeviceType {
    /// String value of the enum field names used in the ProtoBuf definition.
    pub fn as_str_name(&self) -> &'static str {
        match self {
            DeviceType::AndroidOs => "DEVICE_ANDROID_OS",
            DeviceType::IosOs => "DEVICE_IOS_OS",
            DeviceType::ChromeBrowser => "DEVICE_CHROME_BROWSER",
            DeviceType::ChromeOs => "DEVICE_CHROME_OS",
        }
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AndroidCheckinProto {
    #[prost(int64, optional, tag = "2")]
    pub last_checkin_msec: ::core::option::Option<i64>,
    #[prost(string, optional, tag = "6")]
    pub cell_operator: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(string, optional, tag = "7")]
    pub sim_operator: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(string, optional, tag = "8")]
    pub roaming: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(int32, optional, tag = "9")]
    pub user_number: ::core::option::Option<i32>,
    #[prost(enumeration = "DeviceType", optional, tag = "12")]
    pub r#type: ::core::option::Option<i32>,
    #[prost(message, optional, tag = "13")]
    pub chrome_build: ::core::option::Option<ChromeBuildProto>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AndroidCheckinRequest {
    #[prost(string, optional, tag = "1")]
    pub imei: ::core::option::Option<::prost::alloc::string::String>,
    /// Android id, or 0 for a first check-in
    #[prost(int64, optional, tag = "2")]
    pub id: ::core::option::Option<i64>,
    #[prost(string, optional, tag = "3")]
    pub digest: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(message, optional, tag = "4")]
    pub checkin: ::core::option::Option<AndroidCheckinProto>,
    #[prost(string, optional, tag = "5")]
    pub desired_build: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(string, optional, tag = "6")]
    pub locale: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(int64, optional, tag = "7")]
    pub logging_id: ::core::option::Option<i64>,
    #[prost(string, optional, tag = "8")]
    pub market_checkin: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(string, repeated, tag = "9")]
    pub mac_addr: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
    #[prost(string, optional, tag = "10")]
    pub meid: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(string, repeated, tag = "11")]
    pub account_cookie: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
    #[prost(string, optional, tag = "12")]
    pub time_zone: ::core::option::Option<::prost::alloc::string::String>,
    /// Security token from a previous check-in, or 0
    #[prost(fixed64, optional, tag = "13")]
    pub security_token: ::core::option::Option<u64>,
    #[prost(int32, optional, tag = "14")]
    pub version: ::core::option::Option<i32>,
    #[prost(string, repeated, tag = "15")]
    pub ota_cert: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
    #[prost(string, optional, tag = "16")]
    pub serial_number: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(string, optional, tag = "17")]
    pub esn: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(int32, optional, tag = "20")]
    pub fragment: ::core::option::Option<i32>,
    #[prost(string, optional, tag = "21")]
    pub user_name: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(int32, optional, tag = "22")]
    pub user_serial_number: ::core::option::Option<i32>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AndroidCheckinResponse {
    #[prost(bool, required, tag = "1")]
    pub stats_ok: bool,
    #[prost(int64, optional, tag = "3")]
    pub time_msec: ::core::option::Option<i64>,
    #[prost(string, optional, tag = "4")]
    pub digest: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(bool, optional, tag = "6")]
    pub market_ok: ::core::option::Option<bool>,
    /// Device identity minted by the server
    #[prost(fixed64, optional, tag = "7")]
    pub android_id: ::core::option::Option<u64>,
    /// Secret paired with the android id; reused as the MCS auth token
    #[prost(fixed64, optional, tag = "8")]
    pub security_token: ::core::option::Option<u64>,
    #[prost(bool, optional, tag = "9")]
    pub version_info: ::core::option::Option<bool>,
}
