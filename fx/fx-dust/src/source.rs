//! Config sources and the lazily loaded dust library.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, error};

use crate::error::{DustError, Result};
use crate::table::{DustLookup, DustMatch, DustTable};

/// Default location of the settings file, relative to the game root.
pub const DEFAULT_CONFIG_PATH: &str = "GameData/CollisionFX/settings.cfg";

/// Where the dust color configuration text comes from.
pub trait ConfigSource {
    /// Human readable description, used in log messages.
    fn describe(&self) -> String;

    /// Read the full configuration text.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read.
    fn read_to_string(&self) -> Result<String>;
}

/// Configuration read from a file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    /// Create a source for the given path.
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Source pointing at [`DEFAULT_CONFIG_PATH`].
    #[must_use]
    pub fn default_path() -> Self {
        Self::new(DEFAULT_CONFIG_PATH)
    }

    /// Path of the file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigSource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn read_to_string(&self) -> Result<String> {
        fs::read_to_string(&self.path).map_err(|e| DustError::Source {
            source_name: self.describe(),
            message: e.to_string(),
        })
    }
}

/// Configuration held in memory.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StrSource {
    text: String,
}

impl StrSource {
    /// Wrap configuration text.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl ConfigSource for StrSource {
    fn describe(&self) -> String {
        "<inline>".to_string()
    }

    fn read_to_string(&self) -> Result<String> {
        Ok(self.text.clone())
    }
}

/// Read and parse a source into a table.
///
/// Failures are logged and produce an empty table, so every later lookup
/// falls back to the generic dust color.
#[must_use]
pub fn load_table(source: &dyn ConfigSource) -> DustTable {
    let table = source
        .read_to_string()
        .and_then(|text| DustTable::parse_str(&text));

    match table {
        Ok(table) => {
            debug!(
                source = %source.describe(),
                bodies = table.len(),
                "Loaded dust colours"
            );
            table
        }
        Err(err) => {
            error!(source = %source.describe(), "CollisionFX: {err}");
            DustTable::new()
        }
    }
}

/// A dust table that is read from its source on first use.
///
/// The host creates one per process and threads it through every call.
/// [`DustLibrary::ensure_loaded`] is the single point where the table is
/// built.
pub struct DustLibrary {
    source: Box<dyn ConfigSource>,
    table: Option<DustTable>,
}

impl std::fmt::Debug for DustLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DustLibrary")
            .field("source", &self.source.describe())
            .field("loaded", &self.table.is_some())
            .finish()
    }
}

impl Default for DustLibrary {
    fn default() -> Self {
        Self::new(FileSource::default_path())
    }
}

impl DustLibrary {
    /// Create a library backed by the given source. Nothing is read yet.
    #[must_use]
    pub fn new(source: impl ConfigSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            table: None,
        }
    }

    /// Create a library from an already-built table.
    #[must_use]
    pub fn preloaded(table: DustTable) -> Self {
        Self {
            source: Box::new(StrSource::default()),
            table: Some(table),
        }
    }

    /// Load the table if it has not been loaded yet, and return it.
    pub fn ensure_loaded(&mut self) -> &DustTable {
        self.table
            .get_or_insert_with(|| load_table(self.source.as_ref()))
    }

    /// Whether the table has been loaded.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.table.is_some()
    }

    /// Drop the loaded table so the next use re-reads the source.
    pub fn reload(&mut self) {
        self.table = None;
    }
}

impl DustLookup for DustLibrary {
    /// Looks up against the loaded table; an unloaded library knows no
    /// bodies. Call [`DustLibrary::ensure_loaded`] first.
    fn lookup(&self, body: &str, biome: &str) -> DustMatch {
        self.table
            .as_ref()
            .map_or(DustMatch::UnknownBody, |t| t.lookup(body, biome))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct CountingSource {
        reads: Rc<Cell<usize>>,
        text: &'static str,
    }

    impl ConfigSource for CountingSource {
        fn describe(&self) -> String {
            "counting".to_string()
        }

        fn read_to_string(&self) -> Result<String> {
            self.reads.set(self.reads.get() + 1);
            Ok(self.text.to_string())
        }
    }

    const KERBIN: &str = "DustBody\n{\n name = Kerbin\n Biomes\n {\n  Shores = 0.6 0.5 0.3\n }\n}";

    #[test]
    fn test_lazy_load_happens_once() {
        let reads = Rc::new(Cell::new(0));
        let mut library = DustLibrary::new(CountingSource {
            reads: Rc::clone(&reads),
            text: KERBIN,
        });

        assert!(!library.is_loaded());
        assert_eq!(library.lookup("Kerbin", "Shores"), DustMatch::UnknownBody);

        assert_eq!(library.ensure_loaded().len(), 1);
        assert_eq!(library.ensure_loaded().len(), 1);
        assert_eq!(reads.get(), 1);
        assert!(matches!(
            library.lookup("Kerbin", "Shores"),
            DustMatch::Found(_)
        ));

        library.reload();
        library.ensure_loaded();
        assert_eq!(reads.get(), 2);
    }

    #[test]
    fn test_missing_file_yields_empty_table() {
        let mut library = DustLibrary::new(FileSource::new("/nonexistent/collisionfx.cfg"));
        assert!(library.ensure_loaded().is_empty());
        assert!(library.is_loaded());
    }

    #[test]
    fn test_unreadable_file_names_the_source() {
        let source = FileSource::new("/nonexistent/collisionfx.cfg");
        let err = source.read_to_string().unwrap_err();
        assert!(matches!(
            &err,
            DustError::Source { source_name, .. } if source_name == "/nonexistent/collisionfx.cfg"
        ));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_malformed_source_yields_empty_table() {
        let table = load_table(&StrSource::new("DustBody\n{\n name = Kerbin"));
        assert!(table.is_empty());
    }

    #[test]
    fn test_file_source_reads_disk() {
        let path = std::env::temp_dir().join(format!("fx-dust-{}.cfg", std::process::id()));
        fs::write(&path, KERBIN).unwrap();

        let table = load_table(&FileSource::new(&path));
        assert_eq!(table.len(), 1);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_preloaded() {
        let library = DustLibrary::preloaded(DustTable::parse_str(KERBIN).unwrap());
        assert!(library.is_loaded());
        assert!(format!("{library:?}").contains("loaded: true"));
    }
}
