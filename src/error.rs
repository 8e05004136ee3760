//! Error types / 错误类型

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Any failure to run the crew query against the data file / 数据源错误
#[derive(Debug, Error)]
pub enum DataSourceError {
    #[error("failed to open data source {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: sqlx::Error,
    },

    #[error("crew query failed: {0}")]
    Query(#[from] sqlx::Error),

    #[error("crew query timed out after {0:?}")]
    Timeout(Duration),
}

/// Errors raised by the search widgets / 搜索组件错误
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("unknown widget: {0}")]
    UnknownWidget(String),

    #[error("selection {index} out of range ({len} suggestions)")]
    SelectionOutOfRange { index: usize, len: usize },

    #[error(transparent)]
    DataSource(#[from] DataSourceError),
}

impl ShellError {
    /// Status code carried in the API envelope
    pub fn code(&self) -> i32 {
        match self {
            ShellError::UnknownWidget(_) => 404,
            ShellError::SelectionOutOfRange { .. } => 400,
            ShellError::DataSource(_) => 500,
        }
    }
}
