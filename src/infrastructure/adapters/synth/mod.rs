//! Synthesizer Adapter - 语音合成客户端实现

mod fake_synthesizer;
mod http_synthesizer;

pub use fake_synthesizer::{FakeSynthesizer, FakeSynthesizerConfig};
pub use http_synthesizer::*;
