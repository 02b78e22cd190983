//! 结构化查询谓词
//!
//! 目录查询不接受原始查询字符串，而是 (字段, 运算符, 值) 组成的谓词树。
//! 目录实现负责把谓词翻译为自身的查询机制（如 SQL WHERE 子句），
//! 同一谓词也可以在内存中直接求值（`matches`）。
//!
//! JSON 形式示例:
//! ```json
//! {"and": [
//!   {"cond": {"field": "gender", "op": "eq", "value": "F"}},
//!   {"cond": {"field": "quality", "op": "ge", "value": 70}}
//! ]}
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::voice::{Gender, VoiceRecord};

/// 谓词错误（谓词本身不合法）
#[derive(Debug, Error, PartialEq)]
pub enum PredicateError {
    #[error("字段 {field} 不支持运算符 {op}")]
    UnsupportedOperator { field: VoiceField, op: CompareOp },

    #[error("字段 {field} 的取值类型不匹配: {value}")]
    TypeMismatch { field: VoiceField, value: String },

    #[error("IN 列表不能为空 (字段 {0})")]
    EmptyList(VoiceField),

    #[error("{0} 子句列表不能为空")]
    EmptyClauses(&'static str),
}

/// 可查询字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoiceField {
    Name,
    Gender,
    Language,
    Quality,
    IsSynthetic,
}

impl VoiceField {
    /// 对应的列名
    pub fn column(&self) -> &'static str {
        match self {
            VoiceField::Name => "name",
            VoiceField::Gender => "gender",
            VoiceField::Language => "language",
            VoiceField::Quality => "quality",
            VoiceField::IsSynthetic => "is_synthetic",
        }
    }

    fn kind(&self) -> FieldKind {
        match self {
            VoiceField::Name | VoiceField::Gender | VoiceField::Language => FieldKind::Text,
            VoiceField::Quality => FieldKind::Int,
            VoiceField::IsSynthetic => FieldKind::Bool,
        }
    }
}

impl std::fmt::Display for VoiceField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    Text,
    Int,
    Bool,
}

/// 比较运算符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    /// SQL LIKE 语义：`%` 匹配任意串，`_` 匹配单字符，ASCII 大小写不敏感
    Like,
    In,
}

impl CompareOp {
    pub fn sql(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "<>",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
            CompareOp::Like => "LIKE",
            CompareOp::In => "IN",
        }
    }

    fn allowed_for(&self, kind: FieldKind) -> bool {
        match kind {
            FieldKind::Text => matches!(
                self,
                CompareOp::Eq | CompareOp::Ne | CompareOp::Like | CompareOp::In
            ),
            FieldKind::Int => !matches!(self, CompareOp::Like),
            FieldKind::Bool => matches!(self, CompareOp::Eq | CompareOp::Ne),
        }
    }
}

impl std::fmt::Display for CompareOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.sql())
    }
}

/// 比较值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Int(i64),
    Text(String),
    List(Vec<FieldValue>),
}

impl FieldValue {
    fn fits(&self, kind: FieldKind) -> bool {
        matches!(
            (self, kind),
            (FieldValue::Text(_), FieldKind::Text)
                | (FieldValue::Int(_), FieldKind::Int)
                | (FieldValue::Bool(_), FieldKind::Bool)
        )
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Int(i) => write!(f, "{}", i),
            FieldValue::Text(s) => write!(f, "'{}'", s.replace('\'', "''")),
            FieldValue::List(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str(")")
            }
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

/// 单个比较条件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub field: VoiceField,
    pub op: CompareOp,
    pub value: FieldValue,
}

impl Condition {
    pub fn validate(&self) -> Result<(), PredicateError> {
        let kind = self.field.kind();
        if !self.op.allowed_for(kind) {
            return Err(PredicateError::UnsupportedOperator {
                field: self.field,
                op: self.op,
            });
        }

        let scalars: Vec<&FieldValue> = match (&self.op, &self.value) {
            (CompareOp::In, FieldValue::List(items)) => {
                if items.is_empty() {
                    return Err(PredicateError::EmptyList(self.field));
                }
                items.iter().collect()
            }
            (CompareOp::In, other) | (_, other @ FieldValue::List(_)) => {
                return Err(self.mismatch(other));
            }
            (_, value) => vec![value],
        };

        for value in scalars {
            if !value.fits(kind) {
                return Err(self.mismatch(value));
            }
            // 性别取值必须在枚举范围内
            if let (VoiceField::Gender, FieldValue::Text(g), false) =
                (self.field, value, self.op == CompareOp::Like)
            {
                if g.parse::<Gender>().is_err() {
                    return Err(self.mismatch(value));
                }
            }
        }
        Ok(())
    }

    fn mismatch(&self, value: &FieldValue) -> PredicateError {
        PredicateError::TypeMismatch {
            field: self.field,
            value: value.to_string(),
        }
    }

    /// 在内存中对一条记录求值（调用前应已通过 validate）
    pub fn matches(&self, voice: &VoiceRecord) -> bool {
        let actual = match self.field {
            VoiceField::Name => FieldValue::Text(voice.name().as_str().to_string()),
            VoiceField::Gender => FieldValue::Text(voice.gender().as_str().to_string()),
            VoiceField::Language => FieldValue::Text(voice.language().to_string()),
            VoiceField::Quality => FieldValue::Int(voice.quality().value() as i64),
            VoiceField::IsSynthetic => FieldValue::Bool(voice.is_synthetic()),
        };

        match (&self.op, &self.value) {
            (CompareOp::In, FieldValue::List(items)) => items.iter().any(|v| *v == actual),
            (CompareOp::Like, FieldValue::Text(pattern)) => match &actual {
                FieldValue::Text(text) => like_match(pattern, text),
                _ => false,
            },
            (op, expected) => match (&actual, expected) {
                (FieldValue::Int(a), FieldValue::Int(b)) => compare(*op, a, b),
                (FieldValue::Text(a), FieldValue::Text(b)) => compare(*op, a, b),
                (FieldValue::Bool(a), FieldValue::Bool(b)) => compare(*op, a, b),
                _ => false,
            },
        }
    }
}

fn compare<T: PartialOrd>(op: CompareOp, a: &T, b: &T) -> bool {
    match op {
        CompareOp::Eq => a == b,
        CompareOp::Ne => a != b,
        CompareOp::Lt => a < b,
        CompareOp::Le => a <= b,
        CompareOp::Gt => a > b,
        CompareOp::Ge => a >= b,
        CompareOp::Like | CompareOp::In => false,
    }
}

/// LIKE 模式匹配（与 SQLite 默认行为一致：ASCII 大小写不敏感）
fn like_match(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().map(|c| c.to_ascii_lowercase()).collect();
    let t: Vec<char> = text.chars().map(|c| c.to_ascii_lowercase()).collect();

    let (mut pi, mut ti) = (0, 0);
    let mut star: Option<(usize, usize)> = None;

    while ti < t.len() {
        if pi < p.len() && (p[pi] == '_' || p[pi] == t[ti]) {
            pi += 1;
            ti += 1;
        } else if pi < p.len() && p[pi] == '%' {
            star = Some((pi, ti));
            pi += 1;
        } else if let Some((sp, st)) = star {
            pi = sp + 1;
            ti = st + 1;
            star = Some((sp, st + 1));
        } else {
            return false;
        }
    }
    p[pi..].iter().all(|&c| c == '%')
}

/// 音色查询谓词
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoicePredicate {
    /// 匹配全部记录
    All,
    Cond(Condition),
    And(Vec<VoicePredicate>),
    Or(Vec<VoicePredicate>),
    Not(Box<VoicePredicate>),
}

impl VoicePredicate {
    pub fn cond(field: VoiceField, op: CompareOp, value: impl Into<FieldValue>) -> Self {
        VoicePredicate::Cond(Condition {
            field,
            op,
            value: value.into(),
        })
    }

    pub fn name_eq(name: impl Into<String>) -> Self {
        Self::cond(VoiceField::Name, CompareOp::Eq, FieldValue::Text(name.into()))
    }

    pub fn and(self, other: VoicePredicate) -> Self {
        match self {
            VoicePredicate::And(mut clauses) => {
                clauses.push(other);
                VoicePredicate::And(clauses)
            }
            first => VoicePredicate::And(vec![first, other]),
        }
    }

    /// 递归校验谓词结构
    pub fn validate(&self) -> Result<(), PredicateError> {
        match self {
            VoicePredicate::All => Ok(()),
            VoicePredicate::Cond(cond) => cond.validate(),
            VoicePredicate::And(clauses) if clauses.is_empty() => {
                Err(PredicateError::EmptyClauses("AND"))
            }
            VoicePredicate::Or(clauses) if clauses.is_empty() => {
                Err(PredicateError::EmptyClauses("OR"))
            }
            VoicePredicate::And(clauses) | VoicePredicate::Or(clauses) => {
                clauses.iter().try_for_each(|c| c.validate())
            }
            VoicePredicate::Not(inner) => inner.validate(),
        }
    }

    pub fn matches(&self, voice: &VoiceRecord) -> bool {
        match self {
            VoicePredicate::All => true,
            VoicePredicate::Cond(cond) => cond.matches(voice),
            VoicePredicate::And(clauses) => clauses.iter().all(|c| c.matches(voice)),
            VoicePredicate::Or(clauses) => clauses.iter().any(|c| c.matches(voice)),
            VoicePredicate::Not(inner) => !inner.matches(voice),
        }
    }
}

impl std::fmt::Display for VoicePredicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VoicePredicate::All => f.write_str("TRUE"),
            VoicePredicate::Cond(c) => write!(f, "{} {} {}", c.field, c.op, c.value),
            VoicePredicate::And(clauses) | VoicePredicate::Or(clauses) => {
                let joiner = if matches!(self, VoicePredicate::And(_)) {
                    " AND "
                } else {
                    " OR "
                };
                f.write_str("(")?;
                for (i, clause) in clauses.iter().enumerate() {
                    if i > 0 {
                        f.write_str(joiner)?;
                    }
                    write!(f, "{}", clause)?;
                }
                f.write_str(")")
            }
            VoicePredicate::Not(inner) => write!(f, "NOT {}", inner),
        }
    }
}
