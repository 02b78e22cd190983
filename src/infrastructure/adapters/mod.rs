//! Infrastructure Adapters
//!
//! 六边形架构的适配器实现

pub mod audio;
pub mod embeddings;
pub mod synth;

pub use audio::*;
pub use embeddings::*;
pub use synth::*;
