//! Lab Commands - 音色实验

use crate::domain::predicate::VoicePredicate;

/// 一次音色实验
///
/// 预览与入库互斥，由 `mode` 决定
#[derive(Debug, Clone)]
pub struct RunLab {
    pub source: VoicePredicate,
    pub target: VoicePredicate,
    /// 合成文本
    pub text: String,
    pub speed: f32,
    pub lang: String,
    /// 输出子目录（相对于输出根目录）
    pub output_subdir: Option<String>,
    pub mode: LabMode,
}

#[derive(Debug, Clone)]
pub enum LabMode {
    /// 对每个缩放系数合成一段试听音频
    Preview { scales: Vec<f32> },
    /// 取单个缩放系数生成向量并写入目录
    Insert {
        scale: f32,
        voice: LabVoiceMetadata,
        /// 是否同时生成 `{name}.wav` 试听
        render_sample: bool,
    },
}

/// 新合成音色的元数据（未校验的原始输入）
#[derive(Debug, Clone)]
pub struct LabVoiceMetadata {
    pub name: String,
    pub gender: String,
    pub quality: i64,
    pub notes: Option<String>,
}
