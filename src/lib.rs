//! VoiceLab - 音色向量代数与音色目录引擎
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Voice: 音色记录与值对象
//! - Predicate: 音色查询谓词
//! - Lab: 分组归约、差向量与外推
//!
//! 应用层 (application/):
//! - Ports: 端口定义（Catalog, Synthesizer, AudioSink, EmbeddingExport, StyleBank）
//! - Commands: 实验、导入、合成、导出
//! - Queries: 音色查询与目录概况
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: JSON API
//! - Persistence: SQLite 音色目录
//! - Adapters: 合成服务客户端、WAV 输出、NPY/NPZ 读写

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
