//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// 合成服务配置
    #[serde(default)]
    pub synth: SynthConfig,

    /// 数据库配置
    #[serde(default)]
    pub database: DatabaseConfig,

    /// 存储配置
    #[serde(default)]
    pub storage: StorageConfig,

    /// 音色目录配置
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// 实验默认参数
    #[serde(default)]
    pub lab: LabConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5070
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 合成服务配置
#[derive(Debug, Clone, Deserialize)]
pub struct SynthConfig {
    /// 合成服务基础 URL
    #[serde(default = "default_synth_url")]
    pub url: String,

    /// 请求超时时间（秒）
    #[serde(default = "default_synth_timeout")]
    pub timeout_secs: u64,

    /// 网络错误 / 超时的最大重试次数
    #[serde(default)]
    pub max_retries: u32,

    /// 期望的输出采样率（Hz）
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
}

fn default_synth_url() -> String {
    "http://localhost:8880".to_string()
}

fn default_synth_timeout() -> u64 {
    120
}

fn default_sample_rate() -> u32 {
    24000 // Kokoro 输出采样率
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            url: default_synth_url(),
            timeout_secs: default_synth_timeout(),
            max_retries: 0,
            sample_rate: default_sample_rate(),
        }
    }
}

/// 数据库配置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// 数据库文件路径
    #[serde(default = "default_db_path")]
    pub path: String,

    /// 最大连接数
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_db_path() -> String {
    "data/voices.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            max_connections: default_max_connections(),
        }
    }
}

impl DatabaseConfig {
    /// 获取数据库 URL
    pub fn database_url(&self) -> String {
        format!("sqlite:{}?mode=rwc", self.path)
    }
}

/// 存储配置
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// 合成音频输出目录
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// 向量导出目录
    #[serde(default = "default_export_dir")]
    pub export_dir: PathBuf,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("data/output")
}

fn default_export_dir() -> PathBuf {
    PathBuf::from("data/export")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            export_dir: default_export_dir(),
        }
    }
}

/// 音色目录配置
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// 固定的向量维度；未设置时由第一条写入决定
    #[serde(default)]
    pub embedding_dim: Option<usize>,

    /// 导入用的元数据 JSON
    #[serde(default = "default_voice_data_path")]
    pub voice_data_path: PathBuf,

    /// 导入用的音色向量归档（NPZ）
    #[serde(default = "default_voice_bank_path")]
    pub voice_bank_path: PathBuf,
}

fn default_voice_data_path() -> PathBuf {
    PathBuf::from("voice-data.json")
}

fn default_voice_bank_path() -> PathBuf {
    PathBuf::from("voices-v1.0.bin")
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            embedding_dim: None,
            voice_data_path: default_voice_data_path(),
            voice_bank_path: default_voice_bank_path(),
        }
    }
}

/// 实验默认参数（请求未提供时使用）
#[derive(Debug, Clone, Deserialize)]
pub struct LabConfig {
    #[serde(default = "default_lab_text")]
    pub default_text: String,

    #[serde(default = "default_lab_scales")]
    pub default_scales: Vec<f32>,

    #[serde(default = "default_lab_speed")]
    pub default_speed: f32,

    #[serde(default = "default_lab_lang")]
    pub default_lang: String,
}

fn default_lab_text() -> String {
    "Hello, this is a test of the voice interpolation.".to_string()
}

fn default_lab_scales() -> Vec<f32> {
    vec![-2.0, -1.0, 0.0, 1.0, 2.0]
}

fn default_lab_speed() -> f32 {
    1.0
}

fn default_lab_lang() -> String {
    "en-us".to_string()
}

impl Default for LabConfig {
    fn default() -> Self {
        Self {
            default_text: default_lab_text(),
            default_scales: default_lab_scales(),
            default_speed: default_lab_speed(),
            default_lang: default_lab_lang(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 5070);
        assert_eq!(config.synth.url, "http://localhost:8880");
        assert_eq!(config.database.path, "data/voices.db");
        assert_eq!(config.catalog.embedding_dim, None);
        assert_eq!(config.lab.default_lang, "en-us");
    }

    #[test]
    fn test_server_addr() {
        let config = ServerConfig::default();
        assert_eq!(config.addr(), "0.0.0.0:5070");
    }

    #[test]
    fn test_database_url() {
        let config = DatabaseConfig::default();
        assert_eq!(config.database_url(), "sqlite:data/voices.db?mode=rwc");
    }
}
