//! Voice Context - Value Objects

use serde::{Deserialize, Serialize};

use super::VoiceError;

/// 音色名称（目录主键）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VoiceName(String);

impl VoiceName {
    pub fn new(name: impl Into<String>) -> Result<Self, VoiceError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(VoiceError::InvalidName("音色名称不能为空".to_string()));
        }
        if name.len() > 100 {
            return Err(VoiceError::InvalidName(
                "音色名称长度不能超过100字符".to_string(),
            ));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for VoiceName {
    type Error = VoiceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<VoiceName> for String {
    fn from(name: VoiceName) -> Self {
        name.0
    }
}

impl std::fmt::Display for VoiceName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 性别标签
///
/// `X` 表示合成或未指定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    M,
    F,
    X,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::M => "M",
            Gender::F => "F",
            Gender::X => "X",
        }
    }
}

impl std::str::FromStr for Gender {
    type Err = VoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "M" => Ok(Gender::M),
            "F" => Ok(Gender::F),
            "X" => Ok(Gender::X),
            other => Err(VoiceError::InvalidGender(other.to_string())),
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 质量评分 (0 - 100)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Quality(u8);

impl Quality {
    pub const MAX: i64 = 100;

    pub fn new(value: i64) -> Result<Self, VoiceError> {
        if !(0..=Self::MAX).contains(&value) {
            return Err(VoiceError::InvalidQuality(value));
        }
        Ok(Self(value as u8))
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Quality {
    type Error = VoiceError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quality> for i64 {
    fn from(quality: Quality) -> Self {
        quality.0 as i64
    }
}

impl std::fmt::Display for Quality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 风格向量（音色 embedding）
///
/// 不变量:
/// - 非空
/// - 所有分量为有限值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f32>", into = "Vec<f32>")]
pub struct StyleVector(Vec<f32>);

impl StyleVector {
    pub fn new(values: Vec<f32>) -> Result<Self, VoiceError> {
        if values.is_empty() {
            return Err(VoiceError::InvalidStyleVector(
                "风格向量不能为空".to_string(),
            ));
        }
        if let Some(pos) = values.iter().position(|v| !v.is_finite()) {
            return Err(VoiceError::InvalidStyleVector(format!(
                "第 {} 个分量不是有限值",
                pos
            )));
        }
        Ok(Self(values))
    }

    pub fn dim(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<f32> {
        self.0
    }
}

impl TryFrom<Vec<f32>> for StyleVector {
    type Error = VoiceError;

    fn try_from(values: Vec<f32>) -> Result<Self, Self::Error> {
        Self::new(values)
    }
}

impl From<StyleVector> for Vec<f32> {
    fn from(vector: StyleVector) -> Self {
        vector.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gender_parse() {
        assert_eq!("F".parse::<Gender>().unwrap(), Gender::F);
        assert!(matches!(
            "Q".parse::<Gender>(),
            Err(VoiceError::InvalidGender(g)) if g == "Q"
        ));
    }

    #[test]
    fn test_quality_bounds() {
        assert_eq!(Quality::new(0).unwrap().value(), 0);
        assert_eq!(Quality::new(100).unwrap().value(), 100);
        assert!(matches!(Quality::new(150), Err(VoiceError::InvalidQuality(150))));
        assert!(Quality::new(-1).is_err());
    }

    #[test]
    fn test_style_vector_rejects_non_finite() {
        assert!(StyleVector::new(vec![]).is_err());
        assert!(StyleVector::new(vec![0.0, f32::NAN]).is_err());
        assert_eq!(StyleVector::new(vec![1.0, 2.0]).unwrap().dim(), 2);
    }

    #[test]
    fn test_voice_name_validation() {
        assert!(VoiceName::new("   ").is_err());
        assert!(VoiceName::new("a".repeat(101)).is_err());
        assert_eq!(VoiceName::new("af_bella").unwrap().as_str(), "af_bella");
    }
}
