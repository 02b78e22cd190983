//! HTTP Synthesizer - 调用外部 Kokoro 合成服务
//!
//! 外部合成 API:
//! POST {base_url}/api/tts/synthesize
//! Request: {"text": "...", "style_vector": [...], "speed": 1.0, "lang": "en-us"}  (JSON)
//! Response: audio/wav binary

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use crate::application::ports::{
    SynthesisError, SynthesisRequest, SynthesizedAudio, SynthesizerPort,
};
use crate::infrastructure::adapters::audio::decode_wav;

/// 合成请求体 (JSON)
#[derive(Debug, Serialize)]
struct SynthHttpRequest<'a> {
    text: &'a str,
    style_vector: &'a [f32],
    speed: f32,
    lang: &'a str,
}

/// HTTP 合成客户端配置
#[derive(Debug, Clone)]
pub struct HttpSynthesizerConfig {
    /// 合成服务基础 URL
    pub base_url: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
    /// 网络错误 / 超时的重试次数
    pub max_retries: u32,
    /// 期望的输出采样率，不一致时只记录告警
    pub sample_rate: Option<u32>,
}

impl Default for HttpSynthesizerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8880".to_string(),
            timeout_secs: 120,
            max_retries: 0,
            sample_rate: None,
        }
    }
}

impl HttpSynthesizerConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = Some(sample_rate);
        self
    }
}

/// HTTP 合成客户端
pub struct HttpSynthesizer {
    client: Client,
    config: HttpSynthesizerConfig,
}

impl HttpSynthesizer {
    pub fn new(config: HttpSynthesizerConfig) -> Result<Self, SynthesisError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SynthesisError::NetworkError(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn synthesize_url(&self) -> String {
        format!(
            "{}/api/tts/synthesize",
            self.config.base_url.trim_end_matches('/')
        )
    }

    fn health_url(&self) -> String {
        format!("{}/health", self.config.base_url.trim_end_matches('/'))
    }

    async fn send_once(&self, request: &SynthesisRequest) -> Result<SynthesizedAudio, SynthesisError> {
        let body = SynthHttpRequest {
            text: &request.text,
            style_vector: request.style_vector.as_slice(),
            speed: request.speed,
            lang: &request.lang,
        };

        let response = self
            .client
            .post(self.synthesize_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SynthesisError::Timeout
                } else if e.is_connect() {
                    SynthesisError::NetworkError(format!("Cannot connect to synthesizer: {}", e))
                } else {
                    SynthesisError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(SynthesisError::ServiceError(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SynthesisError::InvalidResponse(format!("Failed to read audio: {}", e)))?;

        let audio =
            decode_wav(&bytes).map_err(|e| SynthesisError::InvalidResponse(e.to_string()))?;

        if let Some(expected) = self.config.sample_rate {
            if audio.sample_rate != expected {
                tracing::warn!(
                    expected = expected,
                    actual = audio.sample_rate,
                    "Synthesizer returned unexpected sample rate"
                );
            }
        }

        Ok(audio)
    }
}

#[async_trait]
impl SynthesizerPort for HttpSynthesizer {
    async fn synthesize(&self, request: SynthesisRequest) -> Result<SynthesizedAudio, SynthesisError> {
        if request.text.trim().is_empty() {
            return Err(SynthesisError::InvalidText("text is empty".to_string()));
        }

        tracing::debug!(
            url = %self.synthesize_url(),
            text_len = request.text.len(),
            embedding_dim = request.style_vector.dim(),
            "Sending synthesis request"
        );

        let mut attempt = 0;
        loop {
            match self.send_once(&request).await {
                Ok(audio) => {
                    tracing::info!(
                        duration_ms = audio.duration_ms(),
                        sample_rate = audio.sample_rate,
                        attempts = attempt + 1,
                        "Synthesis completed"
                    );
                    return Ok(audio);
                }
                Err(e) if e.is_transient() && attempt < self.config.max_retries => {
                    attempt += 1;
                    tracing::warn!(
                        error = %e,
                        attempt = attempt,
                        max_retries = self.config.max_retries,
                        "Synthesis request failed, retrying"
                    );
                    tokio::time::sleep(Duration::from_millis(500 * attempt as u64)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn health_check(&self) -> bool {
        match self
            .client
            .get(self.health_url())
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}
