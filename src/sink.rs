use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::SinkError;
use crate::record::{ProductRecord, HEADER};

/// Persists record lists as CSV at a fixed path. Each write replaces the
/// previous artifact.
#[derive(Debug, Clone)]
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CsvSink { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write header plus one row per record and return the artifact id.
    pub fn write(&self, records: &[ProductRecord]) -> Result<String, SinkError> {
        let id = self.path().display().to_string();
        let csv_err = |source| SinkError::Csv {
            path: id.clone(),
            source,
        };

        let mut writer = csv::Writer::from_path(&self.path).map_err(csv_err)?;
        writer.write_record(HEADER).map_err(csv_err)?;
        for record in records {
            writer.write_record(record.as_row()).map_err(csv_err)?;
        }
        writer.flush().map_err(|source| SinkError::Io {
            path: id.clone(),
            source,
        })?;

        info!("Saved {} products to {}", records.len(), id);
        Ok(id)
    }

    /// Load a persisted artifact. Values come back as the same text.
    pub fn read(path: &Path) -> Result<Vec<ProductRecord>, SinkError> {
        let csv_err = |source| SinkError::Csv {
            path: path.display().to_string(),
            source,
        };
        let mut reader = csv::Reader::from_path(path).map_err(csv_err)?;
        reader
            .deserialize::<ProductRecord>()
            .collect::<Result<Vec<ProductRecord>, _>>()
            .map_err(csv_err)
    }
}
