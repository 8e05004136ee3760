pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod shell;
pub mod state;

pub use db::{CrewSource, CrewStore};
pub use error::{DataSourceError, ShellError};
pub use models::{CrewRecord, FieldValue};
pub use shell::{Resolved, SearchWidget, Shell};
