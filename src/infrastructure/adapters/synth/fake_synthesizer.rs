//! Fake Synthesizer - 用于测试的合成器
//!
//! 不调用外部服务，按文本长度生成确定性的正弦波

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::application::ports::{
    SynthesisError, SynthesisRequest, SynthesizedAudio, SynthesizerPort,
};

/// Fake Synthesizer 配置
#[derive(Debug, Clone)]
pub struct FakeSynthesizerConfig {
    pub sample_rate: u32,
    /// 每个字符对应的样本数（speed = 1.0 时）
    pub samples_per_char: usize,
    /// 向量任一分量绝对值超过该值时合成失败
    pub fail_above: Option<f32>,
    /// 期望的向量维度
    pub expected_dim: Option<usize>,
}

impl Default for FakeSynthesizerConfig {
    fn default() -> Self {
        Self {
            sample_rate: 24000,
            samples_per_char: 240,
            fail_above: None,
            expected_dim: None,
        }
    }
}

/// Fake Synthesizer
pub struct FakeSynthesizer {
    config: FakeSynthesizerConfig,
    calls: AtomicUsize,
}

impl FakeSynthesizer {
    pub fn new(config: FakeSynthesizerConfig) -> Self {
        Self {
            config,
            calls: AtomicUsize::new(0),
        }
    }

    /// 已收到的合成请求数
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SynthesizerPort for FakeSynthesizer {
    async fn synthesize(&self, request: SynthesisRequest) -> Result<SynthesizedAudio, SynthesisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if request.text.trim().is_empty() {
            return Err(SynthesisError::InvalidText("text is empty".to_string()));
        }

        let values = request.style_vector.as_slice();
        if let Some(expected) = self.config.expected_dim {
            if values.len() != expected {
                return Err(SynthesisError::IncompatibleEmbedding {
                    expected,
                    actual: values.len(),
                });
            }
        }
        if let Some(limit) = self.config.fail_above {
            if values.iter().any(|v| v.abs() > limit) {
                return Err(SynthesisError::ServiceError(format!(
                    "embedding outside supported range (limit {})",
                    limit
                )));
            }
        }

        let chars = request.text.chars().count();
        let len = ((chars * self.config.samples_per_char) as f32 / request.speed.max(0.1)) as usize;
        let mean = values.iter().sum::<f32>() / values.len() as f32;
        let freq = 220.0 + 40.0 * mean.tanh();

        let samples = (0..len)
            .map(|i| {
                let t = i as f32 / self.config.sample_rate as f32;
                (2.0 * std::f32::consts::PI * freq * t).sin() * 0.3
            })
            .collect();

        tracing::debug!(
            text_len = chars,
            samples = len,
            "FakeSynthesizer: generated tone"
        );

        Ok(SynthesizedAudio {
            samples,
            sample_rate: self.config.sample_rate,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::voice::StyleVector;

    fn request(values: Vec<f32>, text: &str) -> SynthesisRequest {
        SynthesisRequest {
            style_vector: StyleVector::new(values).unwrap(),
            text: text.to_string(),
            speed: 1.0,
            lang: "en-us".to_string(),
        }
    }

    #[tokio::test]
    async fn test_deterministic_output() {
        let synth = FakeSynthesizer::new(FakeSynthesizerConfig::default());
        let a = synth.synthesize(request(vec![0.1, 0.2], "hello")).await.unwrap();
        let b = synth.synthesize(request(vec![0.1, 0.2], "hello")).await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a.samples.len(), 5 * 240);
        assert_eq!(a.duration_ms(), 50);
        assert_eq!(synth.calls(), 2);
    }

    #[tokio::test]
    async fn test_failure_modes() {
        let synth = FakeSynthesizer::new(FakeSynthesizerConfig {
            fail_above: Some(1.0),
            expected_dim: Some(2),
            ..Default::default()
        });

        assert!(matches!(
            synth.synthesize(request(vec![0.0], "hi")).await,
            Err(SynthesisError::IncompatibleEmbedding { expected: 2, actual: 1 })
        ));
        assert!(matches!(
            synth.synthesize(request(vec![2.0, 0.0], "hi")).await,
            Err(SynthesisError::ServiceError(_))
        ));
        assert!(matches!(
            synth.synthesize(request(vec![0.0, 0.0], "  ")).await,
            Err(SynthesisError::InvalidText(_))
        ));
    }
}
