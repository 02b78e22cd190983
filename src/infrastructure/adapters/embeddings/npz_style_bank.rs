//! NPZ Style Bank - 读取 Kokoro 格式的音色向量归档
//!
//! 归档中每个音色一个数组（Kokoro 为 (510, 1, 256)），整体展平后作为风格向量

use async_trait::async_trait;
use ndarray::ArrayD;
use ndarray_npy::NpzReader;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use crate::application::ports::{StyleBank, StyleBankError, StyleBankPort};

/// NPZ 音色向量来源
#[derive(Debug, Clone, Copy, Default)]
pub struct NpzStyleBank;

fn read_bank(path: &Path) -> Result<StyleBank, StyleBankError> {
    let file = File::open(path)
        .map_err(|e| StyleBankError::ReadError(format!("{}: {}", path.display(), e)))?;
    let mut npz =
        NpzReader::new(file).map_err(|e| StyleBankError::FormatError(e.to_string()))?;

    let names = npz
        .names()
        .map_err(|e| StyleBankError::FormatError(e.to_string()))?;

    let mut styles = HashMap::with_capacity(names.len());
    for raw_name in names {
        let array: ArrayD<f32> = npz
            .by_name(&raw_name)
            .map_err(|e| StyleBankError::FormatError(format!("{}: {}", raw_name, e)))?;
        let name = raw_name.strip_suffix(".npy").unwrap_or(&raw_name).to_string();
        styles.insert(name, array.iter().copied().collect());
    }

    Ok(StyleBank::new(styles))
}

#[async_trait]
impl StyleBankPort for NpzStyleBank {
    async fn load(&self, path: &Path) -> Result<StyleBank, StyleBankError> {
        let path = path.to_path_buf();
        let bank = tokio::task::spawn_blocking(move || read_bank(&path))
            .await
            .map_err(|e| StyleBankError::ReadError(e.to_string()))??;

        tracing::info!(voices = bank.len(), "Style bank loaded");
        Ok(bank)
    }
}
