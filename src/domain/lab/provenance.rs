//! 合成音色来源记录

use serde::{Deserialize, Serialize};

use crate::domain::predicate::VoicePredicate;

use super::LabError;

/// notes 中机器可读行的前缀
pub const PROVENANCE_NOTE_PREFIX: &str = "lab:";

/// 合成音色的结构化来源
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    pub source: VoicePredicate,
    pub target: VoicePredicate,
    pub scale: f32,
    /// 归约策略名称
    pub reducer: String,
}

impl Provenance {
    pub fn new(source: VoicePredicate, target: VoicePredicate, scale: f32) -> Self {
        Self {
            source,
            target,
            scale,
            reducer: "mean".to_string(),
        }
    }

    pub fn with_reducer(mut self, reducer: impl Into<String>) -> Self {
        self.reducer = reducer.into();
        self
    }

    /// 合并调用方备注与来源信息
    ///
    /// 格式（逐行）:
    /// 1. 调用方备注（可选）
    /// 2. 人类可读摘要
    /// 3. `lab:` + JSON
    ///
    /// 非有限的 scale 会被 JSON 写成 null 而无法解析回来，直接拒绝
    pub fn merge_notes(&self, caller_notes: Option<&str>) -> Result<String, LabError> {
        if !self.scale.is_finite() {
            return Err(LabError::NonFinite { scale: self.scale });
        }
        let json = serde_json::to_string(self).map_err(|e| LabError::Provenance(e.to_string()))?;

        let mut lines = Vec::with_capacity(3);
        if let Some(notes) = caller_notes.map(str::trim).filter(|n| !n.is_empty()) {
            lines.push(notes.to_string());
        }
        lines.push(format!(
            "Generated from {} towards {} at scale {}",
            self.source, self.target, self.scale
        ));
        lines.push(format!("{}{}", PROVENANCE_NOTE_PREFIX, json));
        Ok(lines.join("\n"))
    }

    /// 从 notes 中解析来源信息
    pub fn parse_notes(notes: &str) -> Option<Self> {
        notes
            .lines()
            .rev()
            .find_map(|line| line.strip_prefix(PROVENANCE_NOTE_PREFIX))
            .and_then(|json| serde_json::from_str(json).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::predicate::{CompareOp, VoiceField};

    #[test]
    fn test_notes_round_trip_through_free_text() {
        let provenance = Provenance::new(
            VoicePredicate::cond(VoiceField::Gender, CompareOp::Eq, "M"),
            VoicePredicate::cond(VoiceField::Gender, CompareOp::Eq, "F"),
            -2.0,
        );
        let notes = provenance.merge_notes(Some("  deeper  ")).unwrap();
        let lines: Vec<&str> = notes.lines().collect();

        assert_eq!(lines[0], "deeper");
        assert_eq!(
            lines[1],
            "Generated from gender = 'M' towards gender = 'F' at scale -2"
        );
        assert_eq!(Provenance::parse_notes(&notes), Some(provenance));
    }

    #[test]
    fn test_blank_caller_notes_are_dropped() {
        let provenance = Provenance::new(VoicePredicate::All, VoicePredicate::All, 0.5);
        let notes = provenance.merge_notes(Some("   ")).unwrap();
        assert_eq!(notes.lines().count(), 2);
    }

    #[test]
    fn test_non_finite_scale_is_rejected() {
        let provenance = Provenance::new(VoicePredicate::All, VoicePredicate::All, f32::NAN);
        assert!(matches!(
            provenance.merge_notes(None),
            Err(LabError::NonFinite { .. })
        ));

        let provenance = Provenance::new(VoicePredicate::All, VoicePredicate::All, f32::INFINITY);
        assert!(provenance.merge_notes(Some("x")).is_err());
    }
}
