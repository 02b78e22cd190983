//! Lab Context - 音色向量代数
//!
//! 职责:
//! - 分组归约（Vector Reducer）
//! - 差向量与内插/外推（Delta/Extrapolation Engine）
//! - 合成音色的来源记录

mod errors;
mod extrapolation;
mod provenance;
mod reducer;

pub use errors::{GroupRole, LabError, ReduceError};
pub use extrapolation::{GeneratedEmbedding, LabDirection, VoiceDelta};
pub use provenance::{Provenance, PROVENANCE_NOTE_PREFIX};
pub use reducer::{GroupReducer, MeanReducer};
