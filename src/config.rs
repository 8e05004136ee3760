//! Application configuration module / 应用配置模块
//!
//! Loaded from config.json next to the binary's working directory.
//! Creates default config file on first run / 首次运行时创建默认配置文件

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Application configuration / 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Server configuration / 服务器配置
    pub server: ServerConfig,
    /// Database configuration / 数据库配置
    pub database: DatabaseConfig,
    /// Page layout / 页面配置
    pub page: PageConfig,
}

/// Server configuration / 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host address / 服务器监听地址
    pub host: String,
    /// Server port / 服务器端口
    pub port: u16,
}

/// Database configuration / 数据库配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Pool size; two widgets may query at once / 连接池大小
    pub max_connections: u32,
    /// SQLite busy timeout in milliseconds
    pub busy_timeout_ms: u64,
    /// Per-search timeout in seconds, 0 disables it / 单次查询超时
    pub query_timeout_secs: u64,
}

/// Page configuration / 页面配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    /// Page title / 页面标题
    pub title: String,
    /// Name searched for the preview panel, `null` hides it / 预览查询
    pub preview: Option<String>,
    /// Search widgets, rendered left to right / 搜索组件
    pub widgets: Vec<WidgetConfig>,
}

/// One search widget / 搜索组件配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetConfig {
    pub key: String,
    pub label: String,
    pub default: String,
    #[serde(default)]
    pub placeholder: String,
}

impl WidgetConfig {
    pub fn new(key: &str, label: &str, default: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            default: default.to_string(),
            placeholder: default.to_string(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8180,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            max_connections: 4,
            busy_timeout_ms: 5000,
            query_timeout_secs: 10,
        }
    }
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            title: "Star Atlas Crew".to_string(),
            preview: Some("Anna Tolle".to_string()),
            widgets: vec![
                WidgetConfig::new("crew1_search", "Crew 1", "Anna Tolle"),
                WidgetConfig::new("crew2_search", "Crew 2", "Sammy Banx"),
            ],
        }
    }
}

impl AppConfig {
    /// Get the server bind address / 获取服务器绑定地址
    pub fn get_bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Check widget keys are present and unique / 校验组件key
    pub fn validate(&self) -> Result<(), String> {
        let mut seen = HashSet::new();
        for widget in &self.page.widgets {
            if widget.key.trim().is_empty() {
                return Err(format!("Widget '{}' has an empty key", widget.label));
            }
            if !seen.insert(widget.key.as_str()) {
                return Err(format!("Duplicate widget key: {}", widget.key));
            }
        }
        Ok(())
    }
}

/// Load configuration from file, or create default if not exists / 加载配置文件，不存在则创建默认配置
pub fn load_config(config_path: &Path) -> Result<AppConfig, String> {
    let config = if config_path.exists() {
        // Load existing config / 加载现有配置
        let content = std::fs::read_to_string(config_path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let config: AppConfig = serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse config file: {}", e))?;

        tracing::info!("Loaded configuration from {:?}", config_path);
        config
    } else {
        // Create default config / 创建默认配置
        let config = AppConfig::default();
        match save_config(config_path, &config) {
            Ok(()) => tracing::info!("Created default configuration at {:?}", config_path),
            Err(e) => tracing::warn!("Using default configuration, {}", e),
        }
        config
    };

    config.validate()?;
    Ok(config)
}

/// Save configuration to file / 保存配置到文件
pub fn save_config(config_path: &Path, config: &AppConfig) -> Result<(), String> {
    let content = serde_json::to_string_pretty(config)
        .map_err(|e| format!("Failed to serialize config: {}", e))?;

    std::fs::write(config_path, content)
        .map_err(|e| format!("Failed to write config file: {}", e))?;

    Ok(())
}

/// Validate the data file argument / 校验数据库文件参数
pub fn parse_db_path(value: &str) -> Result<PathBuf, String> {
    if value.trim().is_empty() {
        return Err("database path is empty".to_string());
    }
    let path = PathBuf::from(value);
    if !path.exists() {
        return Err(format!("database file not found: {}", value));
    }
    if !path.is_file() {
        return Err(format!("not a file: {}", value));
    }
    Ok(path)
}
