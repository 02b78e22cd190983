//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（Catalog、Synthesizer、AudioSink、EmbeddingExport、StyleBank）
//! - commands: CQRS 命令及处理器
//! - queries: CQRS 查询及处理器
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod ports;
pub mod queries;

// Re-exports
pub use commands::{
    // Lab commands
    LabMode,
    LabVoiceMetadata,
    RunLab,
    // Catalog commands
    ExportVoices,
    ImportCatalog,
    SynthesizeVoice,
    // Handlers
    handlers::{
        ExportVoicesHandler, ExportVoicesResponse, ImportCatalogHandler, ImportCatalogResponse,
        LabGroupSummary, LabInsertResponse, LabOutcome, LabPreviewResponse, PreviewSample,
        RunLabHandler, SynthesizeVoiceHandler, SynthesizeVoiceResponse,
    },
};

pub use error::ApplicationError;

pub use ports::{
    // Catalog
    CatalogError,
    CatalogInfo,
    CatalogPort,
    // Synthesizer
    SynthesisError,
    SynthesisRequest,
    SynthesizedAudio,
    SynthesizerPort,
    // Audio sink
    AudioSinkError,
    AudioSinkPort,
    // Export
    EmbeddingExportPort,
    ExportError,
    // Style bank
    StyleBank,
    StyleBankError,
    StyleBankPort,
};

pub use queries::{
    GetCatalogInfo,
    GetVoice,
    ListVoices,
    QueryVoices,
    // Handlers
    handlers::{
        CatalogInfoHandler, GetVoiceHandler, ListVoicesHandler, QueryVoicesHandler, VoiceResponse,
    },
};
