//! NPY / NPZ 向量导出
//!
//! - 单个音色 → `{name}.npy`（一维 f32 数组）
//! - 全部音色 → `voices.npz`（每个音色一个数组，键为音色名称）

use async_trait::async_trait;
use ndarray::Array1;
use ndarray_npy::{write_npy, NpzWriter};
use std::fs::File;
use std::path::{Path, PathBuf};

use crate::application::ports::{EmbeddingExportPort, ExportError};
use crate::domain::voice::VoiceRecord;

/// 全量导出的归档文件名
pub const CATALOG_ARCHIVE_NAME: &str = "voices.npz";

/// NPZ 导出器
pub struct NpzExporter {
    export_dir: PathBuf,
}

impl NpzExporter {
    pub async fn new(export_dir: impl AsRef<Path>) -> Result<Self, ExportError> {
        let export_dir = export_dir.as_ref().to_path_buf();

        tokio::fs::create_dir_all(&export_dir)
            .await
            .map_err(|e| ExportError::IoError(e.to_string()))?;

        Ok(Self { export_dir })
    }

    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }
}

#[async_trait]
impl EmbeddingExportPort for NpzExporter {
    async fn export_voice(&self, voice: &VoiceRecord) -> Result<PathBuf, ExportError> {
        let path = self.export_dir.join(format!("{}.npy", voice.name()));
        let array = Array1::from(voice.style_vector().as_slice().to_vec());

        let target = path.clone();
        tokio::task::spawn_blocking(move || write_npy(&target, &array))
            .await
            .map_err(|e| ExportError::IoError(e.to_string()))?
            .map_err(|e| ExportError::EncodingError(e.to_string()))?;

        tracing::info!(
            name = %voice.name(),
            path = %path.display(),
            "Voice exported"
        );

        Ok(path)
    }

    async fn export_catalog(&self, voices: &[VoiceRecord]) -> Result<PathBuf, ExportError> {
        if voices.is_empty() {
            return Err(ExportError::Empty);
        }

        let path = self.export_dir.join(CATALOG_ARCHIVE_NAME);
        let arrays: Vec<(String, Array1<f32>)> = voices
            .iter()
            .map(|v| {
                (
                    v.name().to_string(),
                    Array1::from(v.style_vector().as_slice().to_vec()),
                )
            })
            .collect();

        let target = path.clone();
        tokio::task::spawn_blocking(move || -> Result<(), ExportError> {
            let file = File::create(&target).map_err(|e| ExportError::IoError(e.to_string()))?;
            let mut npz = NpzWriter::new(file);
            for (name, array) in &arrays {
                npz.add_array(name.as_str(), array)
                    .map_err(|e| ExportError::EncodingError(e.to_string()))?;
            }
            npz.finish()
                .map_err(|e| ExportError::EncodingError(e.to_string()))?;
            Ok(())
        })
        .await
        .map_err(|e| ExportError::IoError(e.to_string()))??;

        tracing::info!(
            count = voices.len(),
            path = %path.display(),
            "Catalog exported"
        );

        Ok(path)
    }
}
