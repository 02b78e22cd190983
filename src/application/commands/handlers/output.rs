//! 输出文件命名

use std::path::{Component, PathBuf};

use crate::application::error::ApplicationError;

/// 文件名中允许保留的字符之外一律替换为 `_`
pub(crate) fn safe_file_stem(raw: &str) -> String {
    let stem: String = raw
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let stem = stem.trim_matches('.').to_string();
    if stem.is_empty() {
        "_".to_string()
    } else {
        stem
    }
}

/// 预览文件名：请求列表中的位置 + 缩放系数
///
/// 位置前缀保证重复的系数不会互相覆盖
pub(crate) fn preview_file_name(index: usize, scale: f32) -> String {
    format!("{:02}_interpolation_{:.2}.wav", index, scale)
}

/// 单音色合成文件名：`{name}_{文本前 20 个字符}.wav`
pub(crate) fn voice_sample_file_name(name: &str, text: &str) -> String {
    let head: String = text.chars().take(20).collect();
    format!("{}_{}.wav", safe_file_stem(name), safe_file_stem(&head))
}

/// 输出根目录下的相对路径
///
/// 绝对路径与 `..` 在任何 I/O 之前即被拒绝
pub(crate) fn output_path(
    subdir: Option<&str>,
    file_name: &str,
) -> Result<PathBuf, ApplicationError> {
    let path = match subdir.map(str::trim).filter(|s| !s.is_empty()) {
        Some(dir) => PathBuf::from(dir).join(file_name),
        None => PathBuf::from(file_name),
    };

    let stays_inside = path
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    if !stays_inside {
        return Err(ApplicationError::validation(format!(
            "{} escapes the output directory",
            path.display()
        )));
    }

    Ok(path)
}
