//! WAV File Sink - 将合成音频写入输出目录

use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

use super::wav_codec::encode_wav;
use crate::application::ports::{AudioSinkError, AudioSinkPort, SynthesizedAudio};

/// 文件系统 WAV 输出
pub struct WavFileSink {
    /// 输出根目录
    base_dir: PathBuf,
}

impl WavFileSink {
    pub async fn new(base_dir: impl AsRef<Path>) -> Result<Self, AudioSinkError> {
        let base_dir = base_dir.as_ref().to_path_buf();

        fs::create_dir_all(&base_dir)
            .await
            .map_err(|e| AudioSinkError::IoError(e.to_string()))?;

        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// 只接受落在根目录内的相对路径
    fn resolve(&self, relative: &Path) -> Result<PathBuf, AudioSinkError> {
        if relative.as_os_str().is_empty() {
            return Err(AudioSinkError::InvalidPath("empty path".to_string()));
        }
        for component in relative.components() {
            match component {
                Component::Normal(_) | Component::CurDir => {}
                _ => {
                    return Err(AudioSinkError::InvalidPath(format!(
                        "{} escapes the output directory",
                        relative.display()
                    )));
                }
            }
        }
        Ok(self.base_dir.join(relative))
    }
}

#[async_trait]
impl AudioSinkPort for WavFileSink {
    async fn write(
        &self,
        relative: &Path,
        audio: &SynthesizedAudio,
    ) -> Result<PathBuf, AudioSinkError> {
        let path = self.resolve(relative)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| AudioSinkError::IoError(e.to_string()))?;
        }

        let bytes = encode_wav(audio).map_err(|e| AudioSinkError::EncodingError(e.to_string()))?;

        fs::write(&path, &bytes)
            .await
            .map_err(|e| AudioSinkError::IoError(e.to_string()))?;

        tracing::debug!(
            path = %path.display(),
            size = bytes.len(),
            duration_ms = audio.duration_ms(),
            "Saved audio"
        );

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn audio() -> SynthesizedAudio {
        SynthesizedAudio {
            samples: vec![0.0, 0.25, -0.25, 0.0],
            sample_rate: 24000,
        }
    }

    #[tokio::test]
    async fn test_write_creates_nested_file() {
        let dir = TempDir::new().unwrap();
        let sink = WavFileSink::new(dir.path()).await.unwrap();

        let path = sink
            .write(Path::new("run/00_interpolation_1.00.wav"), &audio())
            .await
            .unwrap();

        assert!(path.starts_with(dir.path()));
        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().sample_rate, 24000);
        assert_eq!(reader.len(), 4);
    }

    #[tokio::test]
    async fn test_rejects_escaping_paths() {
        let dir = TempDir::new().unwrap();
        let sink = WavFileSink::new(dir.path().join("out")).await.unwrap();

        for bad in ["../x.wav", "/tmp/x.wav", "a/../../x.wav", ""] {
            let result = sink.write(Path::new(bad), &audio()).await;
            assert!(
                matches!(result, Err(AudioSinkError::InvalidPath(_))),
                "path {:?} should be rejected",
                bad
            );
        }
    }
}
