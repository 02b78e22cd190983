//! Catalog Command Handlers - 导入 / 单音色合成 / 导出

use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;

use super::output::{output_path, voice_sample_file_name};
use crate::application::commands::{ExportVoices, ImportCatalog, SynthesizeVoice};
use crate::application::error::ApplicationError;
use crate::application::ports::{
    AudioSinkPort, CatalogError, CatalogPort, EmbeddingExportPort, StyleBankPort,
    SynthesisRequest, SynthesizerPort,
};
use crate::application::queries::handlers::VoiceResponse;
use crate::domain::predicate::VoicePredicate;
use crate::domain::voice::{Gender, NewVoice, Quality, StyleVector, VoiceName, VoiceRecord};

// ============================================================================
// ImportCatalog
// ============================================================================

/// 元数据文档 `{ "voices": [...] }`
#[derive(Debug, Deserialize)]
struct VoiceDataDocument {
    voices: Vec<VoiceDataEntry>,
}

#[derive(Debug, Deserialize)]
struct VoiceDataEntry {
    name: String,
    gender: String,
    language: String,
    quality: i64,
    /// 数字或形如 "10 min" 的文本
    #[serde(default)]
    training_duration: Option<serde_json::Value>,
    #[serde(default)]
    is_synthetic: bool,
    #[serde(default)]
    notes: Option<String>,
}

/// 导入结果
#[derive(Debug, Clone)]
pub struct ImportCatalogResponse {
    pub imported: usize,
    pub skipped: usize,
    pub failed: usize,
    /// 导入后的记录总数
    pub total: usize,
    /// 质量评分最高的 5 个音色
    pub top_voices: Vec<VoiceResponse>,
}

/// ImportCatalog Handler
///
/// 单条失败只记录日志并计数，不中断整批导入
pub struct ImportCatalogHandler {
    catalog: Arc<dyn CatalogPort>,
    style_bank: Arc<dyn StyleBankPort>,
}

impl ImportCatalogHandler {
    pub fn new(catalog: Arc<dyn CatalogPort>, style_bank: Arc<dyn StyleBankPort>) -> Self {
        Self {
            catalog,
            style_bank,
        }
    }

    pub async fn handle(
        &self,
        command: ImportCatalog,
    ) -> Result<ImportCatalogResponse, ApplicationError> {
        let raw = tokio::fs::read_to_string(&command.metadata_path)
            .await
            .map_err(|e| {
                ApplicationError::StorageError(format!(
                    "Failed to read {}: {}",
                    command.metadata_path.display(),
                    e
                ))
            })?;
        let document: VoiceDataDocument = serde_json::from_str(&raw)
            .map_err(|e| ApplicationError::validation(format!("Invalid voice data: {}", e)))?;

        let bank = self.style_bank.load(&command.bank_path).await?;

        tracing::info!(
            entries = document.voices.len(),
            bank_size = bank.len(),
            "Importing voice catalog"
        );

        let mut imported = 0;
        let mut skipped = 0;
        let mut failed = 0;

        for entry in document.voices {
            let name = entry.name.clone();
            let Some(style) = bank.get(&name) else {
                tracing::warn!(name = %name, "No style vector in voice bank");
                failed += 1;
                continue;
            };

            let record = match build_record(entry, style.to_vec()) {
                Ok(record) => record,
                Err(e) => {
                    tracing::warn!(name = %name, error = %e, "Invalid voice entry");
                    failed += 1;
                    continue;
                }
            };

            match self.catalog.insert(&record).await {
                Ok(()) => {
                    tracing::debug!(name = %name, "Added voice");
                    imported += 1;
                }
                Err(CatalogError::DuplicateName(_)) => {
                    tracing::info!(name = %name, "Voice already in catalog, skipped");
                    skipped += 1;
                }
                Err(e) => {
                    tracing::warn!(name = %name, error = %e, "Failed to add voice");
                    failed += 1;
                }
            }
        }

        let mut voices = self.catalog.query(&VoicePredicate::All).await?;
        let total = voices.len();
        voices.sort_by(|a, b| {
            b.quality()
                .cmp(&a.quality())
                .then_with(|| a.name().as_str().cmp(b.name().as_str()))
        });
        let top_voices = voices
            .iter()
            .take(5)
            .map(|v| VoiceResponse::from_record(v, false))
            .collect();

        tracing::info!(
            imported = imported,
            skipped = skipped,
            failed = failed,
            total = total,
            "Voice catalog import finished"
        );

        Ok(ImportCatalogResponse {
            imported,
            skipped,
            failed,
            total,
            top_voices,
        })
    }
}

fn build_record(entry: VoiceDataEntry, style: Vec<f32>) -> Result<VoiceRecord, ApplicationError> {
    Ok(VoiceRecord::new(NewVoice {
        name: VoiceName::new(entry.name)?,
        gender: entry.gender.parse::<Gender>()?,
        language: entry.language,
        quality: Quality::new(entry.quality)?,
        training_duration: entry.training_duration.as_ref().and_then(parse_duration),
        style_vector: StyleVector::new(style)?,
        is_synthetic: entry.is_synthetic,
        notes: entry.notes,
    }))
}

/// 取文本开头的数字部分，如 "10 min" → 10.0
fn parse_duration(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => {
            let head: String = s
                .trim()
                .chars()
                .take_while(|c| c.is_ascii_digit() || *c == '.')
                .collect();
            head.parse().ok()
        }
        _ => None,
    }
}

// ============================================================================
// SynthesizeVoice
// ============================================================================

#[derive(Debug, Clone)]
pub struct SynthesizeVoiceResponse {
    pub name: String,
    pub file: PathBuf,
    pub duration_ms: u64,
    pub sample_rate: u32,
}

/// SynthesizeVoice Handler
pub struct SynthesizeVoiceHandler {
    catalog: Arc<dyn CatalogPort>,
    synthesizer: Arc<dyn SynthesizerPort>,
    sink: Arc<dyn AudioSinkPort>,
}

impl SynthesizeVoiceHandler {
    pub fn new(
        catalog: Arc<dyn CatalogPort>,
        synthesizer: Arc<dyn SynthesizerPort>,
        sink: Arc<dyn AudioSinkPort>,
    ) -> Self {
        Self {
            catalog,
            synthesizer,
            sink,
        }
    }

    pub async fn handle(
        &self,
        command: SynthesizeVoice,
    ) -> Result<SynthesizeVoiceResponse, ApplicationError> {
        if command.text.trim().is_empty() {
            return Err(ApplicationError::validation("text must not be empty"));
        }
        if !(command.speed.is_finite() && command.speed > 0.0) {
            return Err(ApplicationError::validation(format!(
                "speed must be positive, got {}",
                command.speed
            )));
        }

        let relative = output_path(
            command.output_subdir.as_deref(),
            &voice_sample_file_name(&command.name, &command.text),
        )?;

        let voice = self
            .catalog
            .find_by_name(&command.name)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Voice", &command.name))?;

        let audio = self
            .synthesizer
            .synthesize(SynthesisRequest {
                style_vector: voice.style_vector().clone(),
                text: command.text.clone(),
                speed: command.speed,
                lang: command.lang,
            })
            .await
            .map_err(|e| ApplicationError::synthesis(None, e))?;

        let file = self.sink.write(&relative, &audio).await?;

        tracing::info!(
            name = %voice.name(),
            file = %file.display(),
            duration_ms = audio.duration_ms(),
            "Voice synthesized"
        );

        Ok(SynthesizeVoiceResponse {
            name: voice.name().to_string(),
            file,
            duration_ms: audio.duration_ms(),
            sample_rate: audio.sample_rate,
        })
    }
}

// ============================================================================
// ExportVoices
// ============================================================================

#[derive(Debug, Clone)]
pub struct ExportVoicesResponse {
    pub file: PathBuf,
    pub voices: Vec<String>,
}

/// ExportVoices Handler
pub struct ExportVoicesHandler {
    catalog: Arc<dyn CatalogPort>,
    exporter: Arc<dyn EmbeddingExportPort>,
}

impl ExportVoicesHandler {
    pub fn new(catalog: Arc<dyn CatalogPort>, exporter: Arc<dyn EmbeddingExportPort>) -> Self {
        Self { catalog, exporter }
    }

    pub async fn handle(
        &self,
        command: ExportVoices,
    ) -> Result<ExportVoicesResponse, ApplicationError> {
        let (file, voices) = match command.name {
            Some(name) => {
                let voice = self
                    .catalog
                    .find_by_name(&name)
                    .await?
                    .ok_or_else(|| ApplicationError::not_found("Voice", &name))?;
                let file = self.exporter.export_voice(&voice).await?;
                (file, vec![voice.name().to_string()])
            }
            None => {
                let voices = self.catalog.query(&VoicePredicate::All).await?;
                let file = self.exporter.export_catalog(&voices).await?;
                (file, voices.iter().map(|v| v.name().to_string()).collect())
            }
        };

        tracing::info!(
            file = %file.display(),
            count = voices.len(),
            "Style vectors exported"
        );

        Ok(ExportVoicesResponse { file, voices })
    }
}
