//! Lab Command Handlers - 音色实验编排
//!
//! 流程: 查询两组音色 → 归约 → 差向量 → 按缩放系数生成 → 试听合成 或 写入目录

use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

use super::output::{output_path, preview_file_name, safe_file_stem};
use crate::application::commands::{LabMode, LabVoiceMetadata, RunLab};
use crate::application::error::ApplicationError;
use crate::application::ports::{
    AudioSinkPort, CatalogPort, SynthesisRequest, SynthesizedAudio, SynthesizerPort,
};
use crate::domain::lab::{GeneratedEmbedding, GroupReducer, GroupRole, LabDirection, LabError};
use crate::domain::predicate::VoicePredicate;
use crate::domain::voice::{Gender, Quality, VoiceName, VoiceRecord};

// ============================================================================
// Responses
// ============================================================================

/// 分组匹配结果
#[derive(Debug, Clone)]
pub struct LabGroupSummary {
    pub role: GroupRole,
    pub predicate: String,
    pub members: Vec<String>,
}

/// 单个缩放系数的试听结果
///
/// 各系数相互独立：某个系数失败不影响其它系数
#[derive(Debug, Clone)]
pub struct PreviewSample {
    pub index: usize,
    pub scale: f32,
    pub file: Option<PathBuf>,
    pub duration_ms: Option<u64>,
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LabPreviewResponse {
    pub run_id: Uuid,
    pub source: LabGroupSummary,
    pub target: LabGroupSummary,
    pub samples: Vec<PreviewSample>,
}

#[derive(Debug, Clone)]
pub struct LabInsertResponse {
    pub run_id: Uuid,
    pub source: LabGroupSummary,
    pub target: LabGroupSummary,
    pub name: String,
    pub scale: f32,
    pub notes: Option<String>,
    pub sample_file: Option<PathBuf>,
    /// 记录已提交但试听文件写入失败
    pub sample_error: Option<String>,
}

#[derive(Debug, Clone)]
pub enum LabOutcome {
    Preview(LabPreviewResponse),
    Insert(LabInsertResponse),
}

// ============================================================================
// RunLab
// ============================================================================

/// 校验后的入库参数
struct ValidatedVoice {
    name: VoiceName,
    gender: Gender,
    quality: Quality,
    notes: Option<String>,
}

/// 入库结果
struct InsertedVoice {
    name: String,
    notes: Option<String>,
    sample_file: Option<PathBuf>,
    sample_error: Option<String>,
}

/// RunLab Handler
pub struct RunLabHandler {
    catalog: Arc<dyn CatalogPort>,
    synthesizer: Arc<dyn SynthesizerPort>,
    sink: Arc<dyn AudioSinkPort>,
    reducer: Arc<dyn GroupReducer>,
}

impl RunLabHandler {
    pub fn new(
        catalog: Arc<dyn CatalogPort>,
        synthesizer: Arc<dyn SynthesizerPort>,
        sink: Arc<dyn AudioSinkPort>,
        reducer: Arc<dyn GroupReducer>,
    ) -> Self {
        Self {
            catalog,
            synthesizer,
            sink,
            reducer,
        }
    }

    pub async fn handle(&self, command: RunLab) -> Result<LabOutcome, ApplicationError> {
        let run_id = Uuid::new_v4();

        // 所有参数在查询目录之前校验完毕
        command.source.validate()?;
        command.target.validate()?;
        if !(command.speed.is_finite() && command.speed > 0.0) {
            return Err(ApplicationError::validation(format!(
                "speed must be positive, got {}",
                command.speed
            )));
        }

        match &command.mode {
            LabMode::Preview { scales } => {
                validate_scales(scales)?;
                require_text(&command.text)?;
                output_path(
                    command.output_subdir.as_deref(),
                    &preview_file_name(0, scales[0]),
                )?;
            }
            LabMode::Insert {
                scale,
                voice,
                render_sample,
            } => {
                validate_scales(std::slice::from_ref(scale))?;
                let voice = validate_voice(voice)?;
                if *render_sample {
                    require_text(&command.text)?;
                    sample_path(&command, &voice)?;
                }
            }
        }

        tracing::info!(
            run_id = %run_id,
            source = %command.source,
            target = %command.target,
            "Voice lab run started"
        );

        let (direction, source, target) = self.resolve(&command).await?;

        let outcome = match &command.mode {
            LabMode::Preview { scales } => LabOutcome::Preview(LabPreviewResponse {
                run_id,
                samples: self.preview(run_id, &command, &direction, scales).await,
                source,
                target,
            }),
            LabMode::Insert {
                scale,
                voice,
                render_sample,
            } => {
                let voice = validate_voice(voice)?;
                let inserted = self
                    .insert(run_id, &command, &direction, *scale, voice, *render_sample)
                    .await?;
                LabOutcome::Insert(LabInsertResponse {
                    run_id,
                    source,
                    target,
                    name: inserted.name,
                    scale: *scale,
                    notes: inserted.notes,
                    sample_file: inserted.sample_file,
                    sample_error: inserted.sample_error,
                })
            }
        };

        tracing::info!(run_id = %run_id, "Voice lab run finished");
        Ok(outcome)
    }

    /// 查询两组并计算方向；任一分组为空则整个实验失败
    async fn resolve(
        &self,
        command: &RunLab,
    ) -> Result<(LabDirection, LabGroupSummary, LabGroupSummary), ApplicationError> {
        let source_group = self.fetch_group(GroupRole::Source, &command.source).await?;
        let target_group = self.fetch_group(GroupRole::Target, &command.target).await?;

        let direction = LabDirection::resolve(
            self.reducer.as_ref(),
            command.source.clone(),
            &source_group,
            command.target.clone(),
            &target_group,
        )
        .map_err(|e| with_group_context(e, command))?;

        Ok((
            direction,
            summarize(GroupRole::Source, &command.source, &source_group),
            summarize(GroupRole::Target, &command.target, &target_group),
        ))
    }

    async fn fetch_group(
        &self,
        role: GroupRole,
        predicate: &VoicePredicate,
    ) -> Result<Vec<VoiceRecord>, ApplicationError> {
        let group = self.catalog.query(predicate).await?;

        if group.is_empty() {
            return Err(ApplicationError::EmptyGroup {
                role,
                predicate: predicate.to_string(),
            });
        }

        tracing::info!(
            role = %role,
            predicate = %predicate,
            members = ?group.iter().map(|v| v.name().as_str()).collect::<Vec<_>>(),
            "Voices matched by query"
        );

        Ok(group)
    }

    async fn preview(
        &self,
        run_id: Uuid,
        command: &RunLab,
        direction: &LabDirection,
        scales: &[f32],
    ) -> Vec<PreviewSample> {
        let mut samples = Vec::with_capacity(scales.len());

        for (index, generated) in direction.generate_all(scales).into_iter().enumerate() {
            let scale = scales[index];
            let result = match generated {
                Ok(embedding) => self.render_preview(command, &embedding).await,
                Err(e) => Err(ApplicationError::from(e)),
            };

            let sample = match result {
                Ok((file, audio)) => {
                    tracing::info!(
                        run_id = %run_id,
                        scale = scale,
                        file = %file.display(),
                        "Preview sample created"
                    );
                    PreviewSample {
                        index,
                        scale,
                        file: Some(file),
                        duration_ms: Some(audio.duration_ms()),
                        error: None,
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        run_id = %run_id,
                        scale = scale,
                        error = %e,
                        "Preview sample failed"
                    );
                    PreviewSample {
                        index,
                        scale,
                        file: None,
                        duration_ms: None,
                        error: Some(e.to_string()),
                    }
                }
            };
            samples.push(sample);
        }

        samples
    }

    async fn render_preview(
        &self,
        command: &RunLab,
        embedding: &GeneratedEmbedding,
    ) -> Result<(PathBuf, SynthesizedAudio), ApplicationError> {
        let audio = self.synthesize(command, embedding).await?;
        let relative = output_path(
            command.output_subdir.as_deref(),
            &preview_file_name(embedding.index, embedding.scale),
        )?;
        let file = self.sink.write(&relative, &audio).await?;
        Ok((file, audio))
    }

    /// 入库顺序: 校验输出路径 → 生成 → （可选）合成到内存 → 写入目录 → 写出试听文件
    ///
    /// 合成失败不会留下记录；写入失败不会留下音频文件。
    /// 记录提交后的写文件失败只体现在 `sample_error` 上
    async fn insert(
        &self,
        run_id: Uuid,
        command: &RunLab,
        direction: &LabDirection,
        scale: f32,
        voice: ValidatedVoice,
        render_sample: bool,
    ) -> Result<InsertedVoice, ApplicationError> {
        let relative = if render_sample {
            Some(sample_path(command, &voice)?)
        } else {
            None
        };

        if self.catalog.find_by_name(voice.name.as_str()).await?.is_some() {
            return Err(ApplicationError::DuplicateName(voice.name.to_string()));
        }

        let embedding = direction.generate(0, scale)?;

        let audio = if render_sample {
            Some(self.synthesize(command, &embedding).await?)
        } else {
            None
        };

        let record = VoiceRecord::synthetic(
            voice.name,
            voice.gender,
            command.lang.clone(),
            voice.quality,
            embedding.vector,
            voice.notes,
            embedding.provenance,
        )?;
        self.catalog.insert(&record).await?;

        tracing::info!(
            run_id = %run_id,
            name = %record.name(),
            scale = scale,
            "Synthetic voice inserted"
        );

        let mut inserted = InsertedVoice {
            name: record.name().to_string(),
            notes: record.notes().map(str::to_string),
            sample_file: None,
            sample_error: None,
        };

        if let (Some(relative), Some(audio)) = (relative, audio) {
            match self.sink.write(&relative, &audio).await {
                Ok(file) => inserted.sample_file = Some(file),
                Err(e) => {
                    tracing::warn!(
                        run_id = %run_id,
                        name = %record.name(),
                        error = %e,
                        "Voice inserted but sample could not be written"
                    );
                    inserted.sample_error = Some(e.to_string());
                }
            }
        }

        Ok(inserted)
    }

    async fn synthesize(
        &self,
        command: &RunLab,
        embedding: &GeneratedEmbedding,
    ) -> Result<SynthesizedAudio, ApplicationError> {
        let request = SynthesisRequest {
            style_vector: embedding.vector.clone(),
            text: command.text.clone(),
            speed: command.speed,
            lang: command.lang.clone(),
        };

        self.synthesizer
            .synthesize(request)
            .await
            .map_err(|e| ApplicationError::synthesis(Some(embedding.scale), e))
    }
}

/// 入库试听文件 `{name}.wav` 的相对路径
fn sample_path(command: &RunLab, voice: &ValidatedVoice) -> Result<PathBuf, ApplicationError> {
    output_path(
        command.output_subdir.as_deref(),
        &format!("{}.wav", safe_file_stem(voice.name.as_str())),
    )
}

fn validate_scales(scales: &[f32]) -> Result<(), ApplicationError> {
    if scales.is_empty() {
        return Err(ApplicationError::validation("at least one scale is required"));
    }
    if let Some(bad) = scales.iter().find(|s| !s.is_finite()) {
        return Err(ApplicationError::validation(format!(
            "scale must be a finite number, got {}",
            bad
        )));
    }
    Ok(())
}

fn require_text(text: &str) -> Result<(), ApplicationError> {
    if text.trim().is_empty() {
        return Err(ApplicationError::validation("text must not be empty"));
    }
    Ok(())
}

fn validate_voice(voice: &LabVoiceMetadata) -> Result<ValidatedVoice, ApplicationError> {
    Ok(ValidatedVoice {
        name: VoiceName::new(voice.name.clone())?,
        gender: voice.gender.parse::<Gender>()?,
        quality: Quality::new(voice.quality)?,
        notes: voice.notes.clone(),
    })
}

fn summarize(role: GroupRole, predicate: &VoicePredicate, group: &[VoiceRecord]) -> LabGroupSummary {
    LabGroupSummary {
        role,
        predicate: predicate.to_string(),
        members: group.iter().map(|v| v.name().to_string()).collect(),
    }
}

fn with_group_context(err: LabError, command: &RunLab) -> ApplicationError {
    match err {
        LabError::EmptyGroup { role } => ApplicationError::EmptyGroup {
            role,
            predicate: match role {
                GroupRole::Source => command.source.to_string(),
                GroupRole::Target => command.target.to_string(),
            },
        },
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::lab::{MeanReducer, Provenance};
    use crate::domain::predicate::{CompareOp, VoiceField};
    use crate::domain::voice::{NewVoice, StyleVector};
    use crate::infrastructure::adapters::{FakeSynthesizer, FakeSynthesizerConfig, WavFileSink};
    use crate::infrastructure::persistence::sqlite::{
        create_pool, run_migrations, DatabaseConfig, SqliteCatalog,
    };
    use tempfile::TempDir;

    struct Fixture {
        catalog: Arc<SqliteCatalog>,
        synthesizer: Arc<FakeSynthesizer>,
        handler: RunLabHandler,
        output: TempDir,
    }

    fn voice(name: &str, gender: Gender, values: &[f32]) -> VoiceRecord {
        VoiceRecord::new(NewVoice {
            name: VoiceName::new(name).unwrap(),
            gender,
            language: "en-us".to_string(),
            quality: Quality::new(80).unwrap(),
            training_duration: None,
            style_vector: StyleVector::new(values.to_vec()).unwrap(),
            is_synthetic: false,
            notes: None,
        })
    }

    async fn fixture(config: FakeSynthesizerConfig) -> Fixture {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        let catalog = Arc::new(SqliteCatalog::new(pool));

        catalog.insert(&voice("A", Gender::M, &[0.0, 0.0])).await.unwrap();
        catalog.insert(&voice("A2", Gender::M, &[2.0, 0.0])).await.unwrap();
        catalog.insert(&voice("B", Gender::F, &[2.0, 0.0])).await.unwrap();

        let output = TempDir::new().unwrap();
        let sink = Arc::new(WavFileSink::new(output.path()).await.unwrap());
        let synthesizer = Arc::new(FakeSynthesizer::new(config));
        let handler = RunLabHandler::new(
            catalog.clone(),
            synthesizer.clone(),
            sink,
            Arc::new(MeanReducer),
        );

        Fixture {
            catalog,
            synthesizer,
            handler,
            output,
        }
    }

    fn run(source: VoicePredicate, target: VoicePredicate, mode: LabMode) -> RunLab {
        RunLab {
            source,
            target,
            text: "Hello, world!".to_string(),
            speed: 1.0,
            lang: "en-us".to_string(),
            output_subdir: None,
            mode,
        }
    }

    fn insert_mode(name: &str, gender: &str, quality: i64, scale: f32) -> LabMode {
        LabMode::Insert {
            scale,
            voice: LabVoiceMetadata {
                name: name.to_string(),
                gender: gender.to_string(),
                quality,
                notes: Some("lab voice".to_string()),
            },
            render_sample: true,
        }
    }

    #[tokio::test]
    async fn test_preview_writes_one_file_per_scale_in_order() {
        let fx = fixture(FakeSynthesizerConfig::default()).await;
        let scales = vec![-1.0, 0.0, 0.5, 1.0, 2.0];
        let outcome = fx
            .handler
            .handle(run(
                VoicePredicate::name_eq("A"),
                VoicePredicate::name_eq("B"),
                LabMode::Preview {
                    scales: scales.clone(),
                },
            ))
            .await
            .unwrap();

        let LabOutcome::Preview(preview) = outcome else {
            panic!("expected preview outcome");
        };
        assert_eq!(preview.source.members, vec!["A".to_string()]);
        assert_eq!(preview.target.members, vec!["B".to_string()]);
        assert_eq!(
            preview.samples.iter().map(|s| s.scale).collect::<Vec<_>>(),
            scales
        );
        for sample in &preview.samples {
            let file = sample.file.as_ref().unwrap();
            assert!(file.exists());
            assert_eq!(
                file.file_name().unwrap().to_str().unwrap(),
                preview_file_name(sample.index, sample.scale)
            );
        }
        assert_eq!(fx.synthesizer.calls(), 5);
    }

    #[tokio::test]
    async fn test_preview_failure_on_one_scale_keeps_others() {
        let fx = fixture(FakeSynthesizerConfig {
            fail_above: Some(3.0),
            ..Default::default()
        })
        .await;
        let outcome = fx
            .handler
            .handle(run(
                VoicePredicate::name_eq("A"),
                VoicePredicate::name_eq("B"),
                LabMode::Preview {
                    scales: vec![1.0, 2.0, 0.5],
                },
            ))
            .await
            .unwrap();

        let LabOutcome::Preview(preview) = outcome else {
            panic!("expected preview outcome");
        };
        assert!(preview.samples[0].file.is_some());
        assert!(preview.samples[1].file.is_none());
        assert!(preview.samples[1].error.as_ref().unwrap().contains("scale"));
        assert!(preview.samples[2].file.is_some());
    }

    #[tokio::test]
    async fn test_empty_group_aborts_before_synthesis() {
        let fx = fixture(FakeSynthesizerConfig::default()).await;
        let err = fx
            .handler
            .handle(run(
                VoicePredicate::name_eq("A"),
                VoicePredicate::name_eq("nobody"),
                LabMode::Preview { scales: vec![1.0] },
            ))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ApplicationError::EmptyGroup {
                role: GroupRole::Target,
                ref predicate,
            } if predicate == "name = 'nobody'"
        ));
        assert_eq!(fx.synthesizer.calls(), 0);
        assert_eq!(std::fs::read_dir(fx.output.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_source_group_mean_is_order_independent() {
        let fx = fixture(FakeSynthesizerConfig::default()).await;
        let males = VoicePredicate::cond(VoiceField::Gender, CompareOp::Eq, "M");
        let outcome = fx
            .handler
            .handle(run(males, VoicePredicate::name_eq("B"), insert_mode("mid", "X", 60, 0.0)))
            .await
            .unwrap();
        assert!(matches!(outcome, LabOutcome::Insert(_)));

        // scale 0 → source 分组平均 [1, 0]
        let inserted = fx.catalog.find_by_name("mid").await.unwrap().unwrap();
        assert_eq!(inserted.style_vector().as_slice(), &[1.0, 0.0]);
    }

    #[tokio::test]
    async fn test_insert_persists_synthetic_voice_with_provenance() {
        let fx = fixture(FakeSynthesizerConfig::default()).await;
        let outcome = fx
            .handler
            .handle(run(
                VoicePredicate::name_eq("A"),
                VoicePredicate::name_eq("B"),
                insert_mode("extreme", "X", 70, 2.0),
            ))
            .await
            .unwrap();

        let LabOutcome::Insert(insert) = outcome else {
            panic!("expected insert outcome");
        };
        assert!(insert.sample_file.unwrap().ends_with("extreme.wav"));

        let record = fx.catalog.find_by_name("extreme").await.unwrap().unwrap();
        assert!(record.is_synthetic());
        assert_eq!(record.style_vector().as_slice(), &[4.0, 0.0]);
        assert_eq!(record.quality().value(), 70);

        let notes = record.notes().unwrap();
        assert!(notes.starts_with("lab voice"));
        let parsed = Provenance::parse_notes(notes).unwrap();
        assert_eq!(parsed.scale, 2.0);
        assert_eq!(parsed.source, VoicePredicate::name_eq("A"));
        assert_eq!(record.provenance(), Some(&parsed));
    }

    #[tokio::test]
    async fn test_insert_duplicate_name_leaves_catalog_unchanged() {
        let fx = fixture(FakeSynthesizerConfig::default()).await;
        let before = fx.catalog.count().await.unwrap();

        let err = fx
            .handler
            .handle(run(
                VoicePredicate::name_eq("A"),
                VoicePredicate::name_eq("B"),
                insert_mode("B", "F", 50, 0.5),
            ))
            .await
            .unwrap_err();

        assert!(matches!(err, ApplicationError::DuplicateName(ref n) if n == "B"));
        assert_eq!(fx.catalog.count().await.unwrap(), before);
        assert_eq!(fx.synthesizer.calls(), 0);
    }

    #[tokio::test]
    async fn test_insert_rejects_invalid_metadata() {
        let fx = fixture(FakeSynthesizerConfig::default()).await;
        let before = fx.catalog.count().await.unwrap();

        for mode in [
            insert_mode("q150", "F", 150, 0.5),
            insert_mode("gq", "Q", 50, 0.5),
        ] {
            let err = fx
                .handler
                .handle(run(
                    VoicePredicate::name_eq("A"),
                    VoicePredicate::name_eq("B"),
                    mode,
                ))
                .await
                .unwrap_err();
            assert!(matches!(err, ApplicationError::ValidationError(_)));
        }

        assert_eq!(fx.catalog.count().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_insert_synthesis_failure_writes_no_row() {
        let fx = fixture(FakeSynthesizerConfig {
            fail_above: Some(3.0),
            ..Default::default()
        })
        .await;
        let before = fx.catalog.count().await.unwrap();

        let err = fx
            .handler
            .handle(run(
                VoicePredicate::name_eq("A"),
                VoicePredicate::name_eq("B"),
                insert_mode("too_far", "X", 50, 5.0),
            ))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ApplicationError::SynthesisError { scale: Some(s), .. } if s == 5.0
        ));
        assert_eq!(fx.catalog.count().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_insert_escaping_output_dir_writes_nothing() {
        let fx = fixture(FakeSynthesizerConfig::default()).await;
        let before = fx.catalog.count().await.unwrap();

        let mut command = run(
            VoicePredicate::name_eq("A"),
            VoicePredicate::name_eq("B"),
            insert_mode("new", "X", 50, 2.0),
        );
        command.output_subdir = Some("../escape".to_string());

        let err = fx.handler.handle(command).await.unwrap_err();

        assert!(matches!(err, ApplicationError::ValidationError(_)));
        assert_eq!(fx.catalog.count().await.unwrap(), before);
        assert!(fx.catalog.find_by_name("new").await.unwrap().is_none());
        assert_eq!(fx.synthesizer.calls(), 0);
    }

    /// 写文件总是失败的输出
    struct BrokenSink;

    #[async_trait::async_trait]
    impl AudioSinkPort for BrokenSink {
        async fn write(
            &self,
            _relative: &std::path::Path,
            _audio: &SynthesizedAudio,
        ) -> Result<PathBuf, crate::application::ports::AudioSinkError> {
            Err(crate::application::ports::AudioSinkError::IoError(
                "disk full".to_string(),
            ))
        }
    }

    #[tokio::test]
    async fn test_insert_reports_sample_write_failure_after_commit() {
        let fx = fixture(FakeSynthesizerConfig::default()).await;
        let handler = RunLabHandler::new(
            fx.catalog.clone(),
            fx.synthesizer.clone(),
            Arc::new(BrokenSink),
            Arc::new(MeanReducer),
        );

        let outcome = handler
            .handle(run(
                VoicePredicate::name_eq("A"),
                VoicePredicate::name_eq("B"),
                insert_mode("kept", "X", 50, 1.0),
            ))
            .await
            .unwrap();

        let LabOutcome::Insert(insert) = outcome else {
            panic!("expected insert outcome");
        };
        assert!(insert.sample_file.is_none());
        assert!(insert.sample_error.unwrap().contains("disk full"));
        assert!(fx.catalog.find_by_name("kept").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_malformed_predicate_is_query_error() {
        let fx = fixture(FakeSynthesizerConfig::default()).await;
        let err = fx
            .handler
            .handle(run(
                VoicePredicate::cond(VoiceField::Quality, CompareOp::Like, "9%"),
                VoicePredicate::name_eq("B"),
                LabMode::Preview { scales: vec![1.0] },
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::QueryError(_)));
    }
}
