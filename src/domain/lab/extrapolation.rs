//! Delta/Extrapolation Engine
//!
//! `generate(scale) = source + scale * (target - source)`
//!
//! - scale = 0 得到 source 分组的平均
//! - scale = 1 得到 target 分组的平均
//! - scale < 0 或 scale > 1 沿同一方向外推，不做截断或归一化

use crate::domain::predicate::VoicePredicate;
use crate::domain::voice::{StyleVector, VoiceRecord};

use super::{GroupReducer, GroupRole, LabError, Provenance};

/// 两个代表向量之间的方向
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceDelta {
    source: StyleVector,
    target: StyleVector,
    delta: Vec<f32>,
}

impl VoiceDelta {
    pub fn between(source: StyleVector, target: StyleVector) -> Result<Self, LabError> {
        if source.dim() != target.dim() {
            return Err(LabError::DirectionDimensionMismatch {
                source_dim: source.dim(),
                target_dim: target.dim(),
            });
        }

        let delta: Vec<f32> = target
            .as_slice()
            .iter()
            .zip(source.as_slice())
            .map(|(t, s)| t - s)
            .collect();

        // 差值溢出为 inf 时，scale = 0 会得到 0 * inf = NaN
        if let Some(index) = delta.iter().position(|d| !d.is_finite()) {
            return Err(LabError::NonFiniteDirection { index });
        }

        Ok(Self {
            source,
            target,
            delta,
        })
    }

    pub fn source(&self) -> &StyleVector {
        &self.source
    }

    pub fn target(&self) -> &StyleVector {
        &self.target
    }

    pub fn delta(&self) -> &[f32] {
        &self.delta
    }

    pub fn dim(&self) -> usize {
        self.delta.len()
    }

    /// 在任意有符号缩放系数处取向量
    pub fn at(&self, scale: f32) -> Result<StyleVector, LabError> {
        let values: Vec<f32> = self
            .source
            .as_slice()
            .iter()
            .zip(&self.delta)
            .map(|(s, d)| s + scale * d)
            .collect();

        StyleVector::new(values).map_err(|_| LabError::NonFinite { scale })
    }
}

/// 引擎生成的向量
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedEmbedding {
    /// 在请求列表中的位置
    pub index: usize,
    pub scale: f32,
    pub vector: StyleVector,
    pub provenance: Provenance,
}

/// 一次实验的方向：两组查询、归约结果与差向量
#[derive(Debug, Clone)]
pub struct LabDirection {
    source_query: VoicePredicate,
    target_query: VoicePredicate,
    reducer: &'static str,
    delta: VoiceDelta,
}

impl LabDirection {
    /// 归约两组音色并计算方向
    pub fn resolve(
        reducer: &dyn GroupReducer,
        source_query: VoicePredicate,
        source_group: &[VoiceRecord],
        target_query: VoicePredicate,
        target_group: &[VoiceRecord],
    ) -> Result<Self, LabError> {
        let source = reduce_group(reducer, GroupRole::Source, source_group)?;
        let target = reduce_group(reducer, GroupRole::Target, target_group)?;

        Ok(Self {
            source_query,
            target_query,
            reducer: reducer.name(),
            delta: VoiceDelta::between(source, target)?,
        })
    }

    pub fn delta(&self) -> &VoiceDelta {
        &self.delta
    }

    pub fn source_query(&self) -> &VoicePredicate {
        &self.source_query
    }

    pub fn target_query(&self) -> &VoicePredicate {
        &self.target_query
    }

    /// 生成单个缩放系数对应的向量
    pub fn generate(&self, index: usize, scale: f32) -> Result<GeneratedEmbedding, LabError> {
        let vector = self.delta.at(scale)?;
        let provenance = Provenance::new(self.source_query.clone(), self.target_query.clone(), scale)
            .with_reducer(self.reducer);

        Ok(GeneratedEmbedding {
            index,
            scale,
            vector,
            provenance,
        })
    }

    /// 按请求顺序生成，每个系数独立计算（重复系数不去重）
    pub fn generate_all(&self, scales: &[f32]) -> Vec<Result<GeneratedEmbedding, LabError>> {
        scales
            .iter()
            .enumerate()
            .map(|(index, &scale)| self.generate(index, scale))
            .collect()
    }
}

fn reduce_group(
    reducer: &dyn GroupReducer,
    role: GroupRole,
    group: &[VoiceRecord],
) -> Result<StyleVector, LabError> {
    let members: Vec<&StyleVector> = group.iter().map(|v| v.style_vector()).collect();
    reducer
        .reduce(&members)
        .map_err(|e| LabError::from_reduce(role, e))
}
