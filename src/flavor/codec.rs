//! Reversible flavor <-> native encoding
//!
//! When nothing maps a flavor to a platform format, its MIME type is written
//! into a native name behind a fixed marker. Any peer that sees such a native
//! can recover the flavor without a shared table.

use super::{Flavor, Native};
use crate::error::Result;

/// Marker prefix of synthesized natives
pub const ENCODED_PREFIX: &str = "ENCODED:";

/// Encode a MIME type string as a native name
///
/// # Example
///
/// ```
/// use lamco_flavormap::flavor::codec;
///
/// let native = codec::encode("application/x-foo");
/// assert_eq!(native.as_str(), "ENCODED:application/x-foo");
/// assert_eq!(codec::decode(native.as_str()).as_deref(), Some("application/x-foo"));
/// ```
pub fn encode(mime_type: &str) -> Native {
    Native::from(format!("{}{}", ENCODED_PREFIX, mime_type))
}

/// Encode a flavor's full MIME type as a native name
pub fn encode_flavor(flavor: &Flavor) -> Native {
    encode(&flavor.mime_type())
}

/// Recover the MIME type from an encoded native, trimmed
///
/// Returns `None` for natives without the marker.
pub fn decode(native: &str) -> Option<String> {
    native.strip_prefix(ENCODED_PREFIX).map(|mime| mime.trim().to_string())
}

/// Recover a flavor from an encoded native
///
/// `None` if the native isn't encoded; `Some(Err(_))` if the embedded MIME
/// type does not parse.
pub fn decode_flavor(native: &str) -> Option<Result<Flavor>> {
    decode(native).map(|mime| Flavor::parse(&mime))
}

/// Whether a native carries the marker
pub fn is_encoded(native: &str) -> bool {
    native.starts_with(ENCODED_PREFIX)
}
