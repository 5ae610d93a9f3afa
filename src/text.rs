//! Text equivalence expansion
//!
//! Every text base type stands for a family of equivalent flavors: decoded
//! characters in each [`Representation`], plus raw bytes in each supported
//! charset. HTML additionally fans out over its document scopes.

use tracing::debug;

use crate::flavor::{
    charset, Flavor, Representation, CHARSET_PARAMETER, DOCUMENT_PARAMETER, HTML_DOCUMENT_SCOPES,
    TEXT_HTML_BASE_TYPE, TEXT_PLAIN_BASE_TYPE,
};

/// Expands text base types into their equivalent flavors
#[derive(Debug, Clone)]
pub struct TextExpander {
    charsets: Vec<String>,
}

impl Default for TextExpander {
    fn default() -> Self {
        Self::new(charset::DEFAULT_CHARSETS)
    }
}

impl TextExpander {
    /// Create an expander for the given charsets, in priority order
    ///
    /// Names are canonicalized; repeats after the first are dropped.
    pub fn new<I, S>(charsets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut unique: Vec<String> = Vec::new();
        for name in charsets {
            let name = charset::canonical_name(name.as_ref());
            if !name.is_empty() && !unique.contains(&name) {
                unique.push(name);
            }
        }
        Self { charsets: unique }
    }

    /// Supported charsets, best first
    pub fn charsets(&self) -> &[String] {
        &self.charsets
    }

    /// Equivalent flavors for a text base type, best first
    ///
    /// Unparseable base types expand to nothing. Subtypes without charset
    /// support expand to one opaque-bytes flavor per byte representation.
    ///
    /// # Example
    ///
    /// ```
    /// use lamco_flavormap::{Flavor, TextExpander};
    ///
    /// let expander = TextExpander::new(["UTF-8"]);
    /// let flavors = expander.expand("text/plain");
    /// assert_eq!(flavors.first(), Some(&Flavor::string()));
    /// assert_eq!(flavors.last(), Some(&Flavor::plain_text()));
    /// ```
    pub fn expand(&self, base_type: &str) -> Vec<Flavor> {
        let base = match Flavor::parse(base_type) {
            Ok(flavor) => Flavor::parse(&flavor.base_type()),
            Err(e) => Err(e),
        };
        let base = match base {
            Ok(base) => base,
            Err(e) => {
                debug!("Not expanding '{}': {}", base_type, e);
                return Vec::new();
            }
        };

        let mut out = Vec::new();

        if !charset::subtype_supports_charset(base.sub_type(), None) {
            for repr in Representation::ENCODED_BYTES {
                push_unique(&mut out, base.clone().with_representation(repr));
            }
            return out;
        }

        let base_type = base.base_type();
        let is_plain = base_type == TEXT_PLAIN_BASE_TYPE;
        let is_html = base_type == TEXT_HTML_BASE_TYPE;

        if is_plain {
            push_unique(&mut out, Flavor::string());
        }

        for repr in Representation::DECODED_TEXT {
            let flavor = base
                .clone()
                .with_parameter(CHARSET_PARAMETER, charset::UNICODE)
                .with_representation(repr);
            push_scoped(&mut out, flavor, is_html);
        }

        for name in &self.charsets {
            for repr in Representation::ENCODED_BYTES {
                let flavor = base
                    .clone()
                    .with_parameter(CHARSET_PARAMETER, name.as_str())
                    .with_representation(repr);
                push_scoped(&mut out, flavor, is_html);
            }
        }

        if is_plain {
            push_unique(&mut out, Flavor::plain_text());
        }

        out
    }
}

fn push_unique(out: &mut Vec<Flavor>, flavor: Flavor) {
    if !out.contains(&flavor) {
        out.push(flavor);
    }
}

/// Push a flavor, fanned out over the HTML document scopes when asked
fn push_scoped(out: &mut Vec<Flavor>, flavor: Flavor, html: bool) {
    if html {
        for scope in HTML_DOCUMENT_SCOPES {
            push_unique(out, flavor.clone().with_parameter(DOCUMENT_PARAMETER, scope));
        }
    } else {
        push_unique(out, flavor);
    }
}
