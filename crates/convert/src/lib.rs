//! Value marshalling for the Kestrel client bridge
//!
//! Two concerns live here:
//! - [`HostValue`] and the converter functions [`to_native`]/[`to_host`]:
//!   lossless bidirectional conversion between the host runtime's dynamic
//!   value model and the engine-facing [`kestrel_core::Value`] model.
//! - The cloner ([`clone_value`], [`clone_key`], [`clone_record`]): deep
//!   copies of engine-delivered data that must survive past the native call
//!   that produced it.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cloner;
pub mod convert;
pub mod host;

pub use cloner::{clone_key, clone_record, clone_value};
pub use convert::{to_host, to_native, MAX_SAFE_INTEGER, MIN_SAFE_INTEGER};
pub use host::HostValue;
