//! WAV 编解码
//!
//! 解码使用 symphonia（兼容 16-bit PCM / 32-bit float 等常见格式），
//! 编码使用 hound 输出 32-bit float 单声道

use std::io::Cursor;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use thiserror::Error;

use crate::application::ports::SynthesizedAudio;

#[derive(Debug, Error)]
pub enum WavCodecError {
    #[error("Decoding error: {0}")]
    Decoding(String),

    #[error("Encoding error: {0}")]
    Encoding(String),
}

/// 解码 WAV 字节为单声道 f32 样本（多声道取平均）
pub fn decode_wav(data: &[u8]) -> Result<SynthesizedAudio, WavCodecError> {
    let cursor = Cursor::new(data.to_vec());
    let mss = MediaSourceStream::new(Box::new(cursor), Default::default());

    let mut hint = Hint::new();
    hint.with_extension("wav");

    let detected = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| WavCodecError::Decoding(format!("Format detection failed: {}", e)))?;

    let mut format = detected.format;

    let track = format
        .default_track()
        .ok_or_else(|| WavCodecError::Decoding("No audio track found".to_string()))?;

    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| WavCodecError::Decoding("Unknown sample rate".to_string()))?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| WavCodecError::Decoding(format!("Decoder creation failed: {}", e)))?;

    let track_id = track.id;
    let mut samples: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(symphonia::core::errors::Error::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => {
                return Err(WavCodecError::Decoding(format!(
                    "Packet read error: {}",
                    e
                )));
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(e) => {
                tracing::warn!("Decode error (skipping packet): {}", e);
                continue;
            }
        };

        let spec = *decoded.spec();
        let num_frames = decoded.frames();
        let channels = spec.channels.count().max(1);
        let mut sample_buf = SampleBuffer::<f32>::new(num_frames as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);

        let interleaved = &sample_buf.samples()[..num_frames * channels];
        if channels == 1 {
            samples.extend_from_slice(interleaved);
        } else {
            samples.extend(
                interleaved
                    .chunks_exact(channels)
                    .map(|frame| frame.iter().sum::<f32>() / channels as f32),
            );
        }
    }

    Ok(SynthesizedAudio {
        samples,
        sample_rate,
    })
}

/// 编码为 32-bit float 单声道 WAV 字节
pub fn encode_wav(audio: &SynthesizedAudio) -> Result<Vec<u8>, WavCodecError> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: audio.sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };

    let mut buffer = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut buffer, spec)
            .map_err(|e| WavCodecError::Encoding(e.to_string()))?;
        for &sample in &audio.samples {
            writer
                .write_sample(sample)
                .map_err(|e| WavCodecError::Encoding(e.to_string()))?;
        }
        writer
            .finalize()
            .map_err(|e| WavCodecError::Encoding(e.to_string()))?;
    }

    Ok(buffer.into_inner())
}
