//! Checked-in protobuf bindings for the MCS and device check-in schemas.
//!
//! Both schemas are fixed upstream, so the prost structs are vendored here
//! instead of generated at build time. proto2 field semantics are kept:
//! `optional` maps to `Option<T>` so absent and zero stay distinct.

/// Device check-in protocol (android.clients.google.com/checkin)
#[allow(missing_docs)]
pub mod checkin;
/// Mobile Client Service stream protocol (mtalk.google.com:5228)
#[allow(missing_docs)]
pub mod mcs;
