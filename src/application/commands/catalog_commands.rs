//! Catalog Commands

use std::path::PathBuf;

/// 从元数据 JSON 与音色向量归档批量导入
#[derive(Debug, Clone)]
pub struct ImportCatalog {
    pub metadata_path: PathBuf,
    pub bank_path: PathBuf,
}

/// 用目录中的单个音色合成文本
#[derive(Debug, Clone)]
pub struct SynthesizeVoice {
    pub name: String,
    pub text: String,
    pub speed: f32,
    pub lang: String,
    pub output_subdir: Option<String>,
}

/// 导出风格向量
#[derive(Debug, Clone)]
pub struct ExportVoices {
    /// None 表示导出全部音色
    pub name: Option<String>,
}
