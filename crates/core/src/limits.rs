//! Size limits enforced at the API boundary
//!
//! These match the native engine's fixed-size fields; violating them is a
//! parameter error before any native call is made.

/// Maximum namespace length in bytes.
pub const MAX_NAMESPACE_BYTES: usize = 31;

/// Maximum set name length in bytes.
pub const MAX_SET_BYTES: usize = 63;

/// Maximum bin name length in bytes.
pub const MAX_BIN_NAME_BYTES: usize = 15;
