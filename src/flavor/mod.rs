//! Flavors and Natives
//!
//! A [`Flavor`] describes data inside the process: a MIME type, its
//! parameters, and the [`Representation`] the bytes will be handed out as.
//! A [`Native`] is an opaque platform clipboard target (`UTF8_STRING`,
//! `text/html`, `image/png`, ...). The registry translates between the two.

use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::{FlavorMapError, Result};

pub mod charset;
pub mod codec;
mod mime;

/// Base type of plain text
pub const TEXT_PLAIN_BASE_TYPE: &str = "text/plain";

/// Base type of HTML
pub const TEXT_HTML_BASE_TYPE: &str = "text/html";

/// Parameter carrying the representation kind in a MIME string
pub const CLASS_PARAMETER: &str = "class";

/// Parameter carrying the text charset
pub const CHARSET_PARAMETER: &str = "charset";

/// Parameter carrying the HTML document scope
pub const DOCUMENT_PARAMETER: &str = "document";

/// HTML document scopes, in priority order (whole document, selection, fragment)
pub const HTML_DOCUMENT_SCOPES: [&str; 3] = ["all", "selection", "fragment"];

// =============================================================================
// Representation
// =============================================================================

/// In-process shape of the transferred data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Representation {
    /// Streaming character reader
    Reader,
    /// Owned string
    String,
    /// Character buffer
    CharBuffer,
    /// Character array
    CharArray,
    /// Streaming byte reader
    ByteStream,
    /// Byte buffer
    ByteBuffer,
    /// Byte array
    ByteArray,
    /// Opaque in-process object
    Object,
}

impl Representation {
    /// Decoded text kinds, best first
    pub const DECODED_TEXT: [Representation; 4] = [
        Representation::Reader,
        Representation::String,
        Representation::CharBuffer,
        Representation::CharArray,
    ];

    /// Encoded byte kinds, best first
    pub const ENCODED_BYTES: [Representation; 3] = [
        Representation::ByteStream,
        Representation::ByteBuffer,
        Representation::ByteArray,
    ];

    /// Name used in the `class` MIME parameter
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Reader => "reader",
            Self::String => "string",
            Self::CharBuffer => "char-buffer",
            Self::CharArray => "char-array",
            Self::ByteStream => "byte-stream",
            Self::ByteBuffer => "byte-buffer",
            Self::ByteArray => "byte-array",
            Self::Object => "object",
        }
    }

    /// Look up a representation by its `class` parameter name
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();
        [
            Self::Reader,
            Self::String,
            Self::CharBuffer,
            Self::CharArray,
            Self::ByteStream,
            Self::ByteBuffer,
            Self::ByteArray,
            Self::Object,
        ]
        .into_iter()
        .find(|r| r.as_str() == name)
    }

    /// Characters already decoded from some charset
    pub fn is_decoded_text(self) -> bool {
        Self::DECODED_TEXT.contains(&self)
    }

    /// Raw bytes in some charset (or none)
    pub fn is_encoded_bytes(self) -> bool {
        Self::ENCODED_BYTES.contains(&self)
    }

    /// Representation assumed when a MIME string carries no `class` parameter
    pub fn default_for(primary_type: &str) -> Self {
        if primary_type == "text" {
            Self::ByteStream
        } else {
            Self::Object
        }
    }
}

impl fmt::Display for Representation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Flavor
// =============================================================================

/// Typed data descriptor
///
/// Equality is by value: primary type, subtype, parameters and
/// representation must all match. Parameter order is irrelevant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Flavor {
    primary: String,
    sub: String,
    params: BTreeMap<String, String>,
    representation: Representation,
}

impl Flavor {
    /// Parse a flavor from a MIME type string
    ///
    /// The `class` parameter selects the representation; without it, text
    /// defaults to a byte stream and everything else to an opaque object.
    ///
    /// # Example
    ///
    /// ```
    /// use lamco_flavormap::{Flavor, Representation};
    ///
    /// let flavor = Flavor::parse("text/html; charset=utf8; class=reader").unwrap();
    /// assert_eq!(flavor.base_type(), "text/html");
    /// assert_eq!(flavor.charset(), Some("UTF-8"));
    /// assert_eq!(flavor.representation(), Representation::Reader);
    /// ```
    pub fn parse(mime_type: &str) -> Result<Self> {
        let parsed = mime::parse(mime_type)?;

        let mut representation = None;
        let mut flavor = Self {
            representation: Representation::default_for(&parsed.primary),
            primary: parsed.primary,
            sub: parsed.sub,
            params: BTreeMap::new(),
        };

        for (name, value) in parsed.params {
            if name == CLASS_PARAMETER {
                let repr = Representation::from_name(&value).ok_or_else(|| {
                    FlavorMapError::invalid_mime(
                        mime_type,
                        format!("unknown representation class '{}'", value),
                    )
                })?;
                representation = Some(repr);
            } else {
                flavor = flavor.with_parameter(name, value);
            }
        }

        if let Some(repr) = representation {
            flavor.representation = repr;
        }
        Ok(flavor)
    }

    /// Build a flavor from its parts
    pub fn new(primary: &str, sub: &str, representation: Representation) -> Result<Self> {
        let primary = primary.trim().to_ascii_lowercase();
        let sub = sub.trim().to_ascii_lowercase();
        if !mime::is_token(&primary) || !mime::is_token(&sub) {
            return Err(FlavorMapError::invalid_mime(
                format!("{}/{}", primary, sub),
                "primary type and subtype must be non-empty tokens",
            ));
        }

        Ok(Self {
            primary,
            sub,
            params: BTreeMap::new(),
            representation,
        })
    }

    /// Return a copy with an extra parameter
    ///
    /// Parameter names are case-insensitive. Text charsets are stored in
    /// canonical form so `utf8` and `UTF-8` compare equal.
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into().to_ascii_lowercase();
        let mut value = value.into();
        if name == CHARSET_PARAMETER && self.is_text() {
            value = charset::canonical_name(&value);
        }
        self.params.insert(name, value);
        self
    }

    /// Return a copy with a different representation
    pub fn with_representation(mut self, representation: Representation) -> Self {
        self.representation = representation;
        self
    }

    /// Canonical string flavor
    pub fn string() -> Self {
        Self {
            primary: "application".to_string(),
            sub: "x-string".to_string(),
            params: BTreeMap::new(),
            representation: Representation::String,
        }
    }

    /// Canonical plain-text flavor
    ///
    /// Carries the legacy `unicode` charset regardless of the platform default.
    pub fn plain_text() -> Self {
        let mut params = BTreeMap::new();
        params.insert(CHARSET_PARAMETER.to_string(), charset::UNICODE.to_string());
        Self {
            primary: "text".to_string(),
            sub: "plain".to_string(),
            params,
            representation: Representation::ByteStream,
        }
    }

    /// Primary type (`text` in `text/plain`)
    pub fn primary_type(&self) -> &str {
        &self.primary
    }

    /// Subtype (`plain` in `text/plain`)
    pub fn sub_type(&self) -> &str {
        &self.sub
    }

    /// `primary/sub` without parameters
    pub fn base_type(&self) -> String {
        format!("{}/{}", self.primary, self.sub)
    }

    /// All parameters except the representation class
    pub fn parameters(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    /// A single parameter
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.params.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    /// The `charset` parameter
    pub fn charset(&self) -> Option<&str> {
        self.parameter(CHARSET_PARAMETER)
    }

    /// In-process representation
    pub fn representation(&self) -> Representation {
        self.representation
    }

    /// Full MIME type string
    ///
    /// The `class` parameter is only written when the representation differs
    /// from the default for the primary type, so [`Flavor::parse`] of the
    /// result yields an equal flavor.
    pub fn mime_type(&self) -> String {
        let mut out = self.base_type();
        for (name, value) in &self.params {
            out.push_str("; ");
            out.push_str(name);
            out.push('=');
            out.push_str(&mime::quote_if_needed(value));
        }
        if self.representation != Representation::default_for(&self.primary) {
            out.push_str("; ");
            out.push_str(CLASS_PARAMETER);
            out.push('=');
            out.push_str(self.representation.as_str());
        }
        out
    }

    /// Primary type is `text`
    pub fn is_text(&self) -> bool {
        self.primary == "text"
    }

    /// Text whose bytes are interpreted through a charset
    ///
    /// Decoded representations always qualify. Byte representations qualify
    /// when the subtype supports a charset.
    pub fn is_charset_text(&self) -> bool {
        if *self == Self::string() {
            return true;
        }
        if !self.is_text() {
            return false;
        }
        if self.representation.is_decoded_text() {
            return true;
        }
        self.representation.is_encoded_bytes()
            && charset::subtype_supports_charset(&self.sub, self.charset())
    }

    /// Text handled as opaque bytes with no charset
    pub fn is_noncharset_text(&self) -> bool {
        self.is_text()
            && self.representation.is_encoded_bytes()
            && !charset::subtype_supports_charset(&self.sub, self.charset())
    }
}

impl fmt::Display for Flavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.mime_type())
    }
}

impl FromStr for Flavor {
    type Err = FlavorMapError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

// =============================================================================
// Native
// =============================================================================

/// Opaque platform format identifier
///
/// Cheap to clone; equality is string equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Native(Arc<str>);

impl Native {
    /// Wrap a platform format name
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    /// The identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Empty or whitespace-only identifiers stand for a missing native
    pub fn is_absent(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for Native {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Native {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Native {
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}

impl AsRef<str> for Native {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Native {
    fn borrow(&self) -> &str {
        &self.0
    }
}
