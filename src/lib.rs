//! # lamco-flavormap
//!
//! Clipboard and drag-and-drop format negotiation.
//!
//! Platform clipboards speak in opaque format names ("natives" such as
//! `UTF8_STRING` or `image/png`); applications want typed descriptions of
//! the data ("flavors": a MIME type plus the in-process representation).
//! This crate keeps the bidirectional, priority-ordered mapping between the
//! two:
//!
//! - [`FlavorRegistry`] - the mapping itself, with on-demand synthesis of
//!   missing entries and per-key result caching
//! - [`TextExpander`] - the family of text flavors equivalent to a text type
//! - [`flavor::codec`] - reversible flavor <-> native encoding
//! - [`properties`] - the `native = mime-type` mapping file parser
//!
//! # Architecture
//!
//! ```text
//! mapping sources ──> properties parser ──> FlavorRegistry <── callers
//!                                             ├─> ResultCache (per flavor / per native)
//!                                             ├─> TextExpander (text flavors)
//!                                             └─> codec (synthesis)
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use lamco_flavormap::{Flavor, FlavorRegistry, Native};
//!
//! let registry = FlavorRegistry::new();
//!
//! // What can an application read from a UTF8_STRING target?
//! let flavors = registry.flavors_for(Some(&Native::from("UTF8_STRING")));
//! assert!(flavors.contains(&Flavor::plain_text()));
//!
//! // Which targets should an application offer for HTML?
//! let html = Flavor::parse("text/html; charset=UTF-8").unwrap();
//! let natives = registry.natives_for(Some(&html));
//! assert_eq!(natives[0], Native::from("text/html"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Configuration loading and validation
pub mod config;

/// Error types
pub mod error;

/// Flavor and native types, charsets, and the synthesis codec
pub mod flavor;

/// Mapping file parser
pub mod properties;

/// The native <-> flavor registry
pub mod registry;

/// Text equivalence expansion
pub mod text;

/// Utility functions
pub mod utils;

pub use error::{FlavorMapError, Result};
pub use flavor::{Flavor, Native, Representation};
pub use registry::{FlavorRegistry, MappingSource, RegistryBuilder, RegistryStats};
pub use text::TextExpander;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::flavor::codec;
    pub use crate::{Flavor, FlavorMapError, FlavorRegistry, Native, Representation, Result};
}
