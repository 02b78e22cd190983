//! Audio Adapter - WAV 编解码与文件输出

mod wav_codec;
mod wav_sink;

pub use wav_codec::{decode_wav, encode_wav, WavCodecError};
pub use wav_sink::WavFileSink;
