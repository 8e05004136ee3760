use std::sync::Arc;

use crate::config::PageConfig;
use crate::db::CrewSource;
use crate::shell::Shell;

/// Shared handler state / 共享状态
pub struct AppState {
    pub shell: Shell,
}

impl AppState {
    pub fn new(source: Arc<dyn CrewSource>, page: &PageConfig) -> Self {
        Self {
            shell: Shell::new(source, page),
        }
    }
}
