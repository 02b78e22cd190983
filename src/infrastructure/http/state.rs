//! Application State
//!
//! 包含所有 Command/Query Handlers 的应用状态

use std::sync::Arc;

use crate::application::{
    // Command handlers
    ExportVoicesHandler, ImportCatalogHandler, RunLabHandler, SynthesizeVoiceHandler,
    // Query handlers
    CatalogInfoHandler, GetVoiceHandler, ListVoicesHandler, QueryVoicesHandler,
    // Ports
    AudioSinkPort, CatalogPort, EmbeddingExportPort, StyleBankPort, SynthesizerPort,
};
use crate::config::{CatalogConfig, LabConfig};
use crate::domain::lab::{GroupReducer, MeanReducer};

/// 出站端口集合
#[derive(Clone)]
pub struct AppPorts {
    pub catalog: Arc<dyn CatalogPort>,
    pub synthesizer: Arc<dyn SynthesizerPort>,
    pub sink: Arc<dyn AudioSinkPort>,
    pub exporter: Arc<dyn EmbeddingExportPort>,
    pub style_bank: Arc<dyn StyleBankPort>,
}

/// 应用状态
pub struct AppState {
    // ========== Ports ==========
    pub catalog: Arc<dyn CatalogPort>,
    pub synthesizer: Arc<dyn SynthesizerPort>,

    // ========== Defaults ==========
    /// 实验请求未提供时使用的默认参数
    pub lab_defaults: LabConfig,
    /// 导入请求未提供路径时使用
    pub catalog_defaults: CatalogConfig,

    // ========== Command Handlers ==========
    pub run_lab_handler: RunLabHandler,
    pub import_catalog_handler: ImportCatalogHandler,
    pub synthesize_voice_handler: SynthesizeVoiceHandler,
    pub export_voices_handler: ExportVoicesHandler,

    // ========== Query Handlers ==========
    pub get_voice_handler: GetVoiceHandler,
    pub list_voices_handler: ListVoicesHandler,
    pub query_voices_handler: QueryVoicesHandler,
    pub catalog_info_handler: CatalogInfoHandler,
}

impl AppState {
    /// 创建应用状态
    pub fn new(ports: AppPorts, lab_defaults: LabConfig, catalog_defaults: CatalogConfig) -> Self {
        let reducer: Arc<dyn GroupReducer> = Arc::new(MeanReducer);
        let AppPorts {
            catalog,
            synthesizer,
            sink,
            exporter,
            style_bank,
        } = ports;

        Self {
            // Command handlers
            run_lab_handler: RunLabHandler::new(
                catalog.clone(),
                synthesizer.clone(),
                sink.clone(),
                reducer,
            ),
            import_catalog_handler: ImportCatalogHandler::new(catalog.clone(), style_bank),
            synthesize_voice_handler: SynthesizeVoiceHandler::new(
                catalog.clone(),
                synthesizer.clone(),
                sink,
            ),
            export_voices_handler: ExportVoicesHandler::new(catalog.clone(), exporter),

            // Query handlers
            get_voice_handler: GetVoiceHandler::new(catalog.clone()),
            list_voices_handler: ListVoicesHandler::new(catalog.clone()),
            query_voices_handler: QueryVoicesHandler::new(catalog.clone()),
            catalog_info_handler: CatalogInfoHandler::new(catalog.clone()),

            // Ports
            catalog,
            synthesizer,

            lab_defaults,
            catalog_defaults,
        }
    }
}
