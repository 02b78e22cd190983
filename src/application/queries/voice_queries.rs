//! Voice Queries

use crate::domain::predicate::VoicePredicate;

/// 获取单个音色
#[derive(Debug, Clone)]
pub struct GetVoice {
    pub name: String,
    /// 是否返回完整风格向量
    pub include_vector: bool,
}

/// 列出所有音色
#[derive(Debug, Clone)]
pub struct ListVoices;

/// 按谓词查询音色
#[derive(Debug, Clone)]
pub struct QueryVoices {
    pub predicate: VoicePredicate,
    pub include_vector: bool,
}

/// 目录概况
#[derive(Debug, Clone)]
pub struct GetCatalogInfo;
