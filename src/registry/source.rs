//! Mapping sources
//!
//! Where the initial `native = mime-type` table comes from. Sources are read
//! once, on the registry's first use.

use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::Result;
use crate::flavor::{Flavor, Native};
use crate::properties;

/// Clipboard targets every Wayland/X11 session offers, and the flavors they carry
pub const BUILTIN_MAPPINGS: &str = r"# Text
UTF8_STRING = text/plain;charset=UTF-8
text/plain;charset\=utf-8 = text/plain;charset=UTF-8
STRING = text/plain;charset=ISO-8859-1
TEXT = text/plain;charset=ISO-8859-1
text/plain = text/plain;charset=US-ASCII

# Rich text
text/html = text/html;charset=UTF-8
text/richtext = text/richtext;charset=UTF-8
text/rtf = text/rtf
application/rtf = text/rtf

# Files
text/uri-list = text/uri-list;charset=UTF-8
x-special/gnome-copied-files = text/uri-list;charset=UTF-8

# Images
image/png = image/png
image/jpeg = image/jpeg
image/gif = image/gif
image/bmp = image/bmp

# Audio
audio/wav = audio/wav
";

/// A stream of mapping lines
pub trait MappingSource: Send + Sync + fmt::Debug {
    /// Name used in logs and diagnostics
    fn describe(&self) -> String;

    /// Open the stream for reading
    fn open(&self) -> io::Result<Box<dyn BufRead + '_>>;
}

/// Mapping file on disk
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    /// Read mappings from `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the mapping file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MappingSource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn open(&self) -> io::Result<Box<dyn BufRead + '_>> {
        Ok(Box::new(BufReader::new(File::open(&self.path)?)))
    }
}

/// Mappings held in memory
#[derive(Debug, Clone)]
pub struct StringSource {
    name: String,
    text: String,
}

impl StringSource {
    /// Named in-memory mapping text
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

impl MappingSource for StringSource {
    fn describe(&self) -> String {
        self.name.clone()
    }

    fn open(&self) -> io::Result<Box<dyn BufRead + '_>> {
        Ok(Box::new(self.text.as_bytes()))
    }
}

/// The [`BUILTIN_MAPPINGS`] table
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinSource;

impl MappingSource for BuiltinSource {
    fn describe(&self) -> String {
        "<builtin>".to_string()
    }

    fn open(&self) -> io::Result<Box<dyn BufRead + '_>> {
        Ok(Box::new(BUILTIN_MAPPINGS.as_bytes()))
    }
}

/// A mapping line that was skipped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingDiagnostic {
    /// Source the line came from
    pub source: String,
    /// Line where the logical line starts (1-based)
    pub line: usize,
    /// Why it was skipped
    pub message: String,
}

impl fmt::Display for MappingDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.source, self.line, self.message)
    }
}

/// Decoded mappings from all sources
#[derive(Debug, Clone, Default)]
pub struct LoadedMappings {
    /// Pairs in source order, then line order
    pub pairs: Vec<(Native, Flavor)>,
    /// Skipped lines
    pub diagnostics: Vec<MappingDiagnostic>,
}

/// Read and decode every source
///
/// Bad lines are skipped and reported. A fatal error in any source
/// (unreadable stream, truncated escape) fails the whole load so that no
/// partial table is applied.
pub fn load_sources(sources: &[Box<dyn MappingSource>]) -> Result<LoadedMappings> {
    let mut loaded = LoadedMappings::default();

    for source in sources {
        let name = source.describe();
        let reader = source.open()?;
        let parsed = properties::parse_reader(reader)?;
        debug!("Read {} mapping entries from {}", parsed.entries.len(), name);

        loaded
            .diagnostics
            .extend(parsed.diagnostics.into_iter().map(|d| MappingDiagnostic {
                source: name.clone(),
                line: d.line,
                message: d.message,
            }));

        for entry in parsed.entries {
            let native = Native::from(entry.key);
            if native.is_absent() {
                warn!("{}:{}: empty native name, skipping", name, entry.line);
                loaded.diagnostics.push(MappingDiagnostic {
                    source: name.clone(),
                    line: entry.line,
                    message: "empty native name".to_string(),
                });
                continue;
            }

            match Flavor::parse(&entry.value) {
                Ok(flavor) => loaded.pairs.push((native, flavor)),
                Err(e) => {
                    warn!("{}:{}: {}", name, entry.line, e);
                    loaded.diagnostics.push(MappingDiagnostic {
                        source: name.clone(),
                        line: entry.line,
                        message: e.to_string(),
                    });
                }
            }
        }
    }

    Ok(loaded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FlavorMapError;

    fn boxed(source: impl MappingSource + 'static) -> Vec<Box<dyn MappingSource>> {
        vec![Box::new(source)]
    }

    #[test]
    fn test_builtin_table_is_clean() {
        let loaded = load_sources(&boxed(BuiltinSource)).unwrap();
        assert!(loaded.diagnostics.is_empty(), "{:?}", loaded.diagnostics);
        assert!(loaded.pairs.len() >= 10);

        let key = Native::from("text/plain;charset=utf-8");
        assert!(loaded.pairs.iter().any(|(n, _)| *n == key));
    }

    #[test]
    fn test_bad_mime_type_is_reported_and_skipped() {
        let source = StringSource::new(
            "test",
            "GOOD = image/png\nBAD = not-a-type\nALSO_GOOD = audio/wav\n",
        );
        let loaded = load_sources(&boxed(source)).unwrap();

        let natives: Vec<&str> = loaded.pairs.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(natives, vec!["GOOD", "ALSO_GOOD"]);
        assert_eq!(loaded.diagnostics.len(), 1);
        assert_eq!(loaded.diagnostics[0].line, 2);
        assert_eq!(loaded.diagnostics[0].source, "test");
    }

    #[test]
    fn test_empty_value_is_reported() {
        let loaded = load_sources(&boxed(StringSource::new("test", "EMPTY =\n"))).unwrap();
        assert!(loaded.pairs.is_empty());
        assert_eq!(loaded.diagnostics.len(), 1);
    }

    #[test]
    fn test_fatal_error_discards_everything() {
        let sources: Vec<Box<dyn MappingSource>> = vec![
            Box::new(StringSource::new("first", "A = image/png\n")),
            Box::new(StringSource::new("second", "B = \\u00\n")),
        ];
        let err = load_sources(&sources).unwrap_err();
        assert!(matches!(err, FlavorMapError::MalformedEscape { .. }));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let source = FileSource::new("/nonexistent/flavormap.properties");
        let err = load_sources(&boxed(source)).unwrap_err();
        assert!(matches!(err, FlavorMapError::Io(_)));
    }

    #[test]
    fn test_file_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flavormap.properties");
        std::fs::write(&path, "CUSTOM_TARGET : application/x-custom\n").unwrap();

        let source = FileSource::new(&path);
        assert_eq!(source.path(), path.as_path());

        let loaded = load_sources(&boxed(source)).unwrap();
        assert_eq!(loaded.pairs.len(), 1);
        assert_eq!(loaded.pairs[0].1, Flavor::parse("application/x-custom").unwrap());
    }
}
