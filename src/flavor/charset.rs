//! Text charsets
//!
//! Canonical charset names and the fixed table of text subtypes that do or
//! do not carry a charset.

/// Legacy charset of the canonical plain-text flavor
pub const UNICODE: &str = "unicode";

/// Charsets offered for text when none are configured, platform default first
pub const DEFAULT_CHARSETS: [&str; 6] = [
    "UTF-8",
    "US-ASCII",
    "ISO-8859-1",
    "UTF-16BE",
    "UTF-16LE",
    "UTF-16",
];

/// Text subtypes that always interpret their bytes through a charset
const CHARSET_SUBTYPES: [&str; 10] = [
    "plain",
    "html",
    "xml",
    "sgml",
    "enriched",
    "richtext",
    "uri-list",
    "directory",
    "css",
    "calendar",
];

/// Text subtypes whose bytes never carry a charset
const NONCHARSET_SUBTYPES: [&str; 5] = [
    "rtf",
    "tab-separated-values",
    "t140",
    "rfc822-headers",
    "parityfec",
];

/// Canonical spelling of a charset name
///
/// Known aliases collapse to one name (`utf8`, `Utf_8` -> `UTF-8`); unknown
/// names are returned trimmed but otherwise untouched.
pub fn canonical_name(name: &str) -> String {
    let trimmed = name.trim();
    let key: String = trimmed
        .chars()
        .filter(|c| *c != '-' && *c != '_')
        .collect::<String>()
        .to_ascii_lowercase();

    let canonical = match key.as_str() {
        "utf8" => "UTF-8",
        "utf16" => "UTF-16",
        "utf16be" => "UTF-16BE",
        "utf16le" => "UTF-16LE",
        "usascii" | "ascii" => "US-ASCII",
        "iso88591" | "latin1" => "ISO-8859-1",
        "unicode" => UNICODE,
        _ => return trimmed.to_string(),
    };
    canonical.to_string()
}

/// Whether a text subtype interprets its bytes through a charset
///
/// Subtypes outside the fixed table support a charset exactly when the
/// flavor names one.
pub fn subtype_supports_charset(sub_type: &str, charset: Option<&str>) -> bool {
    let sub_type = sub_type.to_ascii_lowercase();
    if CHARSET_SUBTYPES.contains(&sub_type.as_str()) {
        return true;
    }
    if NONCHARSET_SUBTYPES.contains(&sub_type.as_str()) {
        return false;
    }
    charset.is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_name() {
        assert_eq!(canonical_name("utf8"), "UTF-8");
        assert_eq!(canonical_name(" UTF-8 "), "UTF-8");
        assert_eq!(canonical_name("utf_16le"), "UTF-16LE");
        assert_eq!(canonical_name("Latin1"), "ISO-8859-1");
        assert_eq!(canonical_name("Unicode"), "unicode");
        assert_eq!(canonical_name("windows-1252"), "windows-1252");
    }

    #[test]
    fn test_subtype_supports_charset() {
        assert!(subtype_supports_charset("plain", None));
        assert!(subtype_supports_charset("HTML", None));
        assert!(!subtype_supports_charset("rtf", Some("UTF-8")));
        assert!(!subtype_supports_charset("x-unknown", None));
        assert!(subtype_supports_charset("x-unknown", Some("UTF-8")));
    }
}
