use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Local;
use thiserror::Error;

use crate::domain::query::ListQuery;
use crate::domain::record::RecordRow;
use crate::domain::table::TableConfig;
use crate::infra::export::csv::write_fallback_csv;
use crate::usecase::ports::api::{ApiError, RecordApi};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// The server produced the full filtered CSV.
    Server { path: PathBuf },
    /// The server export failed; only the rows currently in memory were
    /// written, from the fixed fallback column subset.
    Fallback { path: PathBuf, rows: usize },
    /// The user dismissed the destination dialog.
    Cancelled,
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("export timed out, try narrowing the filters")]
    TimedOut,

    #[error("export failed: {0}")]
    Failed(String),
}

pub struct ExportService {
    api: Arc<dyn RecordApi>,
}

impl ExportService {
    pub fn new(api: Arc<dyn RecordApi>) -> Self {
        ExportService { api }
    }

    pub fn suggested_filename(config: &TableConfig) -> String {
        format!("{}_{}.csv", config.entity, Local::now().date_naive())
    }

    /// Runs the two-tier export. The primary path asks the server for the
    /// full filtered set; a timeout there is terminal and distinct. Any other
    /// primary failure degrades to writing the in-memory rows. `choose_dest`
    /// turns a suggested filename into a destination path (a save dialog in
    /// the app, a closure in tests).
    pub fn run(
        &self,
        config: &TableConfig,
        query: &ListQuery,
        visible_columns: &[String],
        rows: &[RecordRow],
        choose_dest: impl FnOnce(&str) -> Option<PathBuf>,
    ) -> Result<ExportOutcome, ExportError> {
        match self.api.export(config, query, visible_columns) {
            Ok(blob) => {
                let suggested = blob
                    .filename
                    .unwrap_or_else(|| Self::suggested_filename(config));
                let Some(dest) = choose_dest(&suggested) else {
                    return Ok(ExportOutcome::Cancelled);
                };
                fs::write(&dest, &blob.bytes)
                    .map_err(|err| ExportError::Failed(err.to_string()))?;
                Ok(ExportOutcome::Server { path: dest })
            }
            Err(ApiError::Timeout) => Err(ExportError::TimedOut),
            Err(err) => {
                tracing::warn!(entity = config.entity, %err, "server export failed, degrading to in-memory rows");
                let suggested = Self::suggested_filename(config);
                let Some(dest) = choose_dest(&suggested) else {
                    return Ok(ExportOutcome::Cancelled);
                };
                let written = write_fallback_csv(config, rows, &dest)
                    .map_err(|err| ExportError::Failed(err.to_string()))?;
                Ok(ExportOutcome::Fallback {
                    path: dest,
                    rows: written,
                })
            }
        }
    }
}
