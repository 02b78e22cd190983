//! Vector Reducer - 分组归约
//!
//! 把一组风格向量归约为一个代表向量。目前只有逐分量算术平均；
//! 按质量加权等其它策略可以作为新的 `GroupReducer` 实现接入。

use crate::domain::voice::StyleVector;

use super::ReduceError;

/// 分组归约策略
pub trait GroupReducer: Send + Sync {
    /// 策略名称（写入 provenance）
    fn name(&self) -> &'static str;

    /// 归约非空分组；成员维度必须一致
    fn reduce(&self, members: &[&StyleVector]) -> Result<StyleVector, ReduceError>;
}

/// 逐分量算术平均
#[derive(Debug, Clone, Copy, Default)]
pub struct MeanReducer;

impl GroupReducer for MeanReducer {
    fn name(&self) -> &'static str {
        "mean"
    }

    fn reduce(&self, members: &[&StyleVector]) -> Result<StyleVector, ReduceError> {
        let first = members.first().ok_or(ReduceError::Empty)?;
        let dim = first.dim();

        // f64 累加：f32 输入在常见取值范围内求和精确，结果与成员顺序无关
        let mut sums = vec![0.0f64; dim];
        for (index, member) in members.iter().enumerate() {
            if member.dim() != dim {
                return Err(ReduceError::DimensionMismatch {
                    index,
                    expected: dim,
                    actual: member.dim(),
                });
            }
            for (sum, value) in sums.iter_mut().zip(member.as_slice()) {
                *sum += *value as f64;
            }
        }

        let count = members.len() as f64;
        let mean: Vec<f32> = sums.into_iter().map(|s| (s / count) as f32).collect();
        StyleVector::new(mean).map_err(|_| ReduceError::NonFinite)
    }
}
