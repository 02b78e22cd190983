//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 加载应用配置
///
/// # 环境变量示例
/// - `VOICELAB_SERVER__PORT=8080`
/// - `VOICELAB_SYNTH__URL=http://kokoro:8880`
/// - `VOICELAB_CATALOG__EMBEDDING_DIM=256`
/// - `VOICELAB_LOG__JSON=true`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 默认值（最低优先级）
    builder = builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 5070)?
        .set_default("synth.url", "http://localhost:8880")?
        .set_default("synth.timeout_secs", 120)?
        .set_default("synth.max_retries", 0)?
        .set_default("synth.sample_rate", 24000)?
        .set_default("database.path", "data/voices.db")?
        .set_default("database.max_connections", 5)?
        .set_default("storage.output_dir", "data/output")?
        .set_default("storage.export_dir", "data/export")?
        .set_default("catalog.voice_data_path", "voice-data.json")?
        .set_default("catalog.voice_bank_path", "voices-v1.0.bin")?
        .set_default("lab.default_speed", 1.0)?
        .set_default("lab.default_lang", "en-us")?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 环境变量（最高优先级）
    // 前缀: VOICELAB_
    // 层级分隔符: __ (双下划线)
    builder = builder.add_source(
        Environment::with_prefix("VOICELAB")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    if config.synth.url.is_empty() {
        return Err(ConfigError::ValidationError(
            "Synthesizer URL cannot be empty".to_string(),
        ));
    }

    if config.synth.sample_rate == 0 {
        return Err(ConfigError::ValidationError(
            "Synthesizer sample rate cannot be 0".to_string(),
        ));
    }

    if config.database.path.is_empty() {
        return Err(ConfigError::ValidationError(
            "Database path cannot be empty".to_string(),
        ));
    }

    if config.catalog.embedding_dim == Some(0) {
        return Err(ConfigError::ValidationError(
            "Embedding dimension cannot be 0".to_string(),
        ));
    }

    if !(config.lab.default_speed.is_finite() && config.lab.default_speed > 0.0) {
        return Err(ConfigError::ValidationError(
            "Default speed must be positive".to_string(),
        ));
    }

    if config.lab.default_scales.is_empty()
        || config.lab.default_scales.iter().any(|s| !s.is_finite())
    {
        return Err(ConfigError::ValidationError(
            "Default scales must be a non-empty list of finite numbers".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}:{}", config.server.host, config.server.port);
    tracing::info!("Synthesizer URL: {}", config.synth.url);
    tracing::info!("Synthesizer Timeout: {}s", config.synth.timeout_secs);
    tracing::info!("Synthesizer Retries: {}", config.synth.max_retries);
    tracing::info!("Database: {}", config.database.path);
    tracing::info!("Database Max Connections: {}", config.database.max_connections);
    tracing::info!("Output Directory: {:?}", config.storage.output_dir);
    tracing::info!("Export Directory: {:?}", config.storage.export_dir);
    match config.catalog.embedding_dim {
        Some(dim) => tracing::info!("Embedding Dimension: {} (pinned)", dim),
        None => tracing::info!("Embedding Dimension: from first insert"),
    }
    tracing::info!("Default Scales: {:?}", config.lab.default_scales);
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}
