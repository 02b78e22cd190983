//! Voice Context - Aggregate Root

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Gender, Quality, StyleVector, VoiceError, VoiceName};
use crate::domain::lab::{LabError, Provenance};

/// 音色记录聚合根
///
/// 不变量:
/// - name 全局唯一且创建后不可变
/// - 记录创建后不可修改（目录只追加）
/// - style_vector 维度与目录维度一致（由目录在写入时校验）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceRecord {
    name: VoiceName,
    gender: Gender,
    language: String,
    quality: Quality,
    training_duration: Option<f64>,
    style_vector: StyleVector,
    is_synthetic: bool,
    notes: Option<String>,
    provenance: Option<Provenance>,
    created_at: DateTime<Utc>,
}

/// 新建音色所需字段
#[derive(Debug, Clone)]
pub struct NewVoice {
    pub name: VoiceName,
    pub gender: Gender,
    pub language: String,
    pub quality: Quality,
    pub training_duration: Option<f64>,
    pub style_vector: StyleVector,
    pub is_synthetic: bool,
    pub notes: Option<String>,
}

impl VoiceRecord {
    /// 创建新音色（created_at 取当前时间）
    pub fn new(voice: NewVoice) -> Self {
        Self {
            name: voice.name,
            gender: voice.gender,
            language: voice.language,
            quality: voice.quality,
            training_duration: voice.training_duration,
            style_vector: voice.style_vector,
            is_synthetic: voice.is_synthetic,
            notes: voice.notes,
            provenance: None,
            created_at: Utc::now(),
        }
    }

    /// 创建合成音色
    ///
    /// is_synthetic 强制为 true，notes 合并机器可读的来源信息
    pub fn synthetic(
        name: VoiceName,
        gender: Gender,
        language: impl Into<String>,
        quality: Quality,
        style_vector: StyleVector,
        caller_notes: Option<String>,
        provenance: Provenance,
    ) -> Result<Self, LabError> {
        let notes = provenance.merge_notes(caller_notes.as_deref())?;
        Ok(Self {
            name,
            gender,
            language: language.into(),
            quality,
            training_duration: None,
            style_vector,
            is_synthetic: true,
            notes: Some(notes),
            provenance: Some(provenance),
            created_at: Utc::now(),
        })
    }

    /// 从持久化数据重建
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        name: VoiceName,
        gender: Gender,
        language: String,
        quality: Quality,
        training_duration: Option<f64>,
        style_vector: StyleVector,
        is_synthetic: bool,
        notes: Option<String>,
        provenance: Option<Provenance>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            name,
            gender,
            language,
            quality,
            training_duration,
            style_vector,
            is_synthetic,
            notes,
            provenance,
            created_at,
        }
    }

    /// 校验向量维度
    pub fn ensure_dim(&self, expected: usize) -> Result<(), VoiceError> {
        let actual = self.style_vector.dim();
        if actual != expected {
            return Err(VoiceError::DimensionMismatch { expected, actual });
        }
        Ok(())
    }

    // Getters
    pub fn name(&self) -> &VoiceName {
        &self.name
    }

    pub fn gender(&self) -> Gender {
        self.gender
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn quality(&self) -> Quality {
        self.quality
    }

    pub fn training_duration(&self) -> Option<f64> {
        self.training_duration
    }

    pub fn style_vector(&self) -> &StyleVector {
        &self.style_vector
    }

    pub fn is_synthetic(&self) -> bool {
        self.is_synthetic
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn provenance(&self) -> Option<&Provenance> {
        self.provenance.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
