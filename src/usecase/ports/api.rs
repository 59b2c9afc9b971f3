use std::collections::BTreeMap;
use std::path::PathBuf;

use serde_json::Value;
use thiserror::Error;

use crate::domain::list::ListResult;
use crate::domain::query::ListQuery;
use crate::domain::table::TableConfig;

/// Failures crossing the API boundary. Everything the UI needs to tell the
/// user apart is a distinct variant; nothing here ever propagates uncaught.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
    #[error("{message}")]
    Http { status: u16, message: String },

    #[error("{message}")]
    Validation {
        message: String,
        errors: BTreeMap<String, Vec<String>>,
    },

    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("unrecognized response from server")]
    UnexpectedShape,
}

/// Payload for create/update. Endpoints accept JSON normally and switch to
/// multipart form-data when a file rides along.
#[derive(Debug, Clone)]
pub enum WritePayload {
    Json(Value),
    Multipart {
        fields: Vec<(String, String)>,
        file: Option<FileAttachment>,
    },
}

#[derive(Debug, Clone)]
pub struct FileAttachment {
    pub field: String,
    pub path: PathBuf,
}

/// Raw CSV export as returned by the server.
#[derive(Debug, Clone)]
pub struct ExportBlob {
    pub bytes: Vec<u8>,
    /// Filename from the Content-Disposition header, when present.
    pub filename: Option<String>,
}

pub trait RecordApi: Send + Sync {
    fn list(&self, config: &TableConfig, query: &ListQuery) -> Result<ListResult, ApiError>;

    fn detail(&self, config: &TableConfig, id: &str) -> Result<Value, ApiError>;

    fn create(&self, config: &TableConfig, payload: WritePayload) -> Result<Value, ApiError>;

    fn update(
        &self,
        config: &TableConfig,
        id: &str,
        payload: WritePayload,
    ) -> Result<Value, ApiError>;

    fn delete(&self, config: &TableConfig, id: &str) -> Result<(), ApiError>;

    fn validate(&self, config: &TableConfig, id: &str) -> Result<(), ApiError>;

    /// Same filtered set as `list`, pagination stripped, as a CSV blob.
    fn export(
        &self,
        config: &TableConfig,
        query: &ListQuery,
        visible_columns: &[String],
    ) -> Result<ExportBlob, ApiError>;
}
