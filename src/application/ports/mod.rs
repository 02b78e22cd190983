//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod audio_sink;
mod catalog;
mod embedding_export;
mod style_bank;
mod synthesizer;

pub use audio_sink::{AudioSinkError, AudioSinkPort};
pub use catalog::{CatalogError, CatalogInfo, CatalogPort};
pub use embedding_export::{EmbeddingExportPort, ExportError};
pub use style_bank::{StyleBank, StyleBankError, StyleBankPort};
pub use synthesizer::{SynthesisError, SynthesisRequest, SynthesizedAudio, SynthesizerPort};
