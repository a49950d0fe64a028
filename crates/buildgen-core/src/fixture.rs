//! Writer for JSON config-schema test fixtures.
//!
//! Each fixture is `schematest-<schema>-<name>.json` holding the schema name,
//! whether validation is expected to throw, and the document under test.

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Serializer, Value};
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("test with that name and schema already exists: {}", .0.display())]
    AlreadyExists(PathBuf),
    #[error("fixture I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("fixture serialize error: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct FixtureDocument<'a> {
    schema: &'a str,
    throws: bool,
    data: &'a Value,
}

#[derive(Debug, Clone)]
pub struct FixtureWriter {
    test_dir: PathBuf,
}

impl FixtureWriter {
    pub fn new(test_dir: impl Into<PathBuf>) -> Self {
        Self {
            test_dir: test_dir.into(),
        }
    }

    pub fn test_dir(&self) -> &Path {
        &self.test_dir
    }

    pub fn fixture_path(&self, name: &str, schema: &str) -> PathBuf {
        self.test_dir.join(format!("schematest-{schema}-{name}.json"))
    }

    /// Write a new fixture. Never overwrites: an existing file with the same
    /// name and schema is an error.
    pub fn write_test_file(
        &self,
        name: &str,
        schema: &str,
        data: &Value,
        throws: bool,
    ) -> Result<PathBuf, FixtureError> {
        let path = self.fixture_path(name, schema);
        let file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(FixtureError::AlreadyExists(path));
            }
            Err(e) => return Err(e.into()),
        };

        let document = FixtureDocument {
            schema,
            throws,
            data,
        };
        let mut serializer = Serializer::with_formatter(file, PrettyFormatter::with_indent(b" "));
        document.serialize(&mut serializer)?;
        serializer.into_inner().flush()?;
        debug!("wrote fixture {}", path.display());
        Ok(path)
    }
}
