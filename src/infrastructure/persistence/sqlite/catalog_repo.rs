//! SQLite Voice Catalog
//!
//! 谓词翻译为参数化 WHERE 子句；风格向量以 bincode 编码的 `Vec<f32>` 存为 BLOB

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, QueryBuilder, Sqlite};

use super::DbPool;
use crate::application::ports::{CatalogError, CatalogInfo, CatalogPort};
use crate::domain::lab::Provenance;
use crate::domain::predicate::{CompareOp, FieldValue, VoicePredicate};
use crate::domain::voice::{Quality, StyleVector, VoiceName, VoiceRecord};

const EMBEDDING_DIM_KEY: &str = "embedding_dim";

const VOICE_COLUMNS: &str = "name, gender, language, quality, training_duration, style_vector, \
                             is_synthetic, notes, provenance, created_at";

/// SQLite Voice Catalog
pub struct SqliteCatalog {
    pool: DbPool,
}

impl SqliteCatalog {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// 固定目录维度
    ///
    /// 目录尚无维度时写入；已有维度且不同则报错
    pub async fn pin_embedding_dim(&self, dim: usize) -> Result<(), CatalogError> {
        match self.embedding_dim().await? {
            Some(existing) if existing != dim => Err(CatalogError::DimensionMismatch {
                expected: existing,
                actual: dim,
            }),
            Some(_) => Ok(()),
            None => {
                sqlx::query("INSERT INTO catalog_meta (key, value) VALUES (?, ?)")
                    .bind(EMBEDDING_DIM_KEY)
                    .bind(dim.to_string())
                    .execute(&self.pool)
                    .await
                    .map_err(db_error)?;
                tracing::info!(embedding_dim = dim, "Catalog embedding dimension pinned");
                Ok(())
            }
        }
    }

    async fn embedding_dim(&self) -> Result<Option<usize>, CatalogError> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM catalog_meta WHERE key = ?")
                .bind(EMBEDDING_DIM_KEY)
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error)?;
        value.as_deref().map(parse_dim).transpose()
    }
}

#[derive(FromRow)]
struct VoiceRow {
    name: String,
    gender: String,
    language: String,
    quality: i64,
    training_duration: Option<f64>,
    style_vector: Vec<u8>,
    is_synthetic: bool,
    notes: Option<String>,
    provenance: Option<String>,
    created_at: String,
}

impl TryFrom<VoiceRow> for VoiceRecord {
    type Error = CatalogError;

    fn try_from(row: VoiceRow) -> Result<Self, Self::Error> {
        let values: Vec<f32> = bincode::deserialize(&row.style_vector)
            .map_err(|e| CatalogError::Serialization(e.to_string()))?;
        let provenance = row
            .provenance
            .as_deref()
            .map(serde_json::from_str::<Provenance>)
            .transpose()
            .map_err(|e| CatalogError::Serialization(e.to_string()))?;

        Ok(VoiceRecord::restore(
            VoiceName::new(row.name).map_err(corrupt)?,
            row.gender.parse().map_err(corrupt)?,
            row.language,
            Quality::new(row.quality).map_err(corrupt)?,
            row.training_duration,
            StyleVector::new(values).map_err(corrupt)?,
            row.is_synthetic,
            row.notes,
            provenance,
            DateTime::parse_from_rfc3339(&row.created_at)
                .map_err(|e| CatalogError::Serialization(e.to_string()))?
                .with_timezone(&Utc),
        ))
    }
}

fn corrupt(err: impl std::fmt::Display) -> CatalogError {
    CatalogError::Serialization(format!("Corrupt voice row: {}", err))
}

fn db_error(err: sqlx::Error) -> CatalogError {
    CatalogError::Database(err.to_string())
}

fn parse_dim(value: &str) -> Result<usize, CatalogError> {
    value
        .parse()
        .map_err(|_| CatalogError::Serialization(format!("Invalid embedding_dim: {}", value)))
}

/// 追加谓词对应的 SQL 片段（值全部走参数绑定）
fn push_predicate(qb: &mut QueryBuilder<'_, Sqlite>, predicate: &VoicePredicate) {
    match predicate {
        VoicePredicate::All => {
            qb.push("1 = 1");
        }
        VoicePredicate::Cond(cond) => {
            qb.push(cond.field.column());
            qb.push(" ");
            qb.push(cond.op.sql());
            match (&cond.op, &cond.value) {
                (CompareOp::In, FieldValue::List(items)) => {
                    qb.push(" (");
                    let mut separated = qb.separated(", ");
                    for item in items {
                        match item {
                            FieldValue::Bool(b) => separated.push_bind(*b),
                            FieldValue::Int(i) => separated.push_bind(*i),
                            FieldValue::Text(s) => separated.push_bind(s.clone()),
                            FieldValue::List(_) => separated.push("NULL"),
                        };
                    }
                    qb.push(")");
                }
                (_, value) => {
                    qb.push(" ");
                    push_value(qb, value);
                }
            }
        }
        VoicePredicate::And(clauses) | VoicePredicate::Or(clauses) => {
            let joiner = if matches!(predicate, VoicePredicate::And(_)) {
                " AND "
            } else {
                " OR "
            };
            qb.push("(");
            for (i, clause) in clauses.iter().enumerate() {
                if i > 0 {
                    qb.push(joiner);
                }
                push_predicate(qb, clause);
            }
            qb.push(")");
        }
        VoicePredicate::Not(inner) => {
            qb.push("NOT (");
            push_predicate(qb, inner);
            qb.push(")");
        }
    }
}

fn push_value(qb: &mut QueryBuilder<'_, Sqlite>, value: &FieldValue) {
    match value {
        FieldValue::Bool(b) => {
            qb.push_bind(*b);
        }
        FieldValue::Int(i) => {
            qb.push_bind(*i);
        }
        FieldValue::Text(s) => {
            qb.push_bind(s.clone());
        }
        FieldValue::List(_) => {
            qb.push("NULL");
        }
    }
}

#[async_trait]
impl CatalogPort for SqliteCatalog {
    async fn query(&self, predicate: &VoicePredicate) -> Result<Vec<VoiceRecord>, CatalogError> {
        predicate
            .validate()
            .map_err(|e| CatalogError::Query(e.to_string()))?;

        let mut qb =
            QueryBuilder::<Sqlite>::new(format!("SELECT {} FROM voices WHERE ", VOICE_COLUMNS));
        push_predicate(&mut qb, predicate);
        qb.push(" ORDER BY name");

        let rows: Vec<VoiceRow> = qb
            .build_query_as::<VoiceRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| CatalogError::Query(e.to_string()))?;

        let voices = rows
            .into_iter()
            .map(VoiceRecord::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        // 查询结果必须与目录维度一致
        if let Some(expected) = self.embedding_dim().await? {
            if let Some(bad) = voices.iter().find(|v| v.style_vector().dim() != expected) {
                return Err(CatalogError::Query(format!(
                    "voice {} has embedding dimension {}, catalog dimension is {}",
                    bad.name(),
                    bad.style_vector().dim(),
                    expected
                )));
            }
        }

        Ok(voices)
    }

    async fn insert(&self, voice: &VoiceRecord) -> Result<(), CatalogError> {
        let dim = voice.style_vector().dim();
        let blob = bincode::serialize(voice.style_vector().as_slice())
            .map_err(|e| CatalogError::Serialization(e.to_string()))?;
        let provenance = voice
            .provenance()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| CatalogError::Serialization(e.to_string()))?;

        // 维度检查与写入在同一事务中完成
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        let current: Option<String> =
            sqlx::query_scalar("SELECT value FROM catalog_meta WHERE key = ?")
                .bind(EMBEDDING_DIM_KEY)
                .fetch_optional(&mut *tx)
                .await
                .map_err(db_error)?;

        match current.as_deref().map(parse_dim).transpose()? {
            Some(expected) => {
                voice.ensure_dim(expected).map_err(|_| CatalogError::DimensionMismatch {
                    expected,
                    actual: dim,
                })?;
            }
            None => {
                sqlx::query("INSERT INTO catalog_meta (key, value) VALUES (?, ?)")
                    .bind(EMBEDDING_DIM_KEY)
                    .bind(dim.to_string())
                    .execute(&mut *tx)
                    .await
                    .map_err(db_error)?;
            }
        }

        sqlx::query(&format!(
            "INSERT INTO voices ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            VOICE_COLUMNS
        ))
        .bind(voice.name().as_str())
        .bind(voice.gender().as_str())
        .bind(voice.language())
        .bind(i64::from(voice.quality()))
        .bind(voice.training_duration())
        .bind(blob)
        .bind(voice.is_synthetic())
        .bind(voice.notes())
        .bind(provenance)
        .bind(voice.created_at().to_rfc3339())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db) = &e {
                if db.is_unique_violation() {
                    return CatalogError::DuplicateName(voice.name().to_string());
                }
                if db.is_check_violation() {
                    return CatalogError::Validation(db.message().to_string());
                }
            }
            db_error(e)
        })?;

        tx.commit().await.map_err(db_error)?;

        tracing::debug!(
            name = %voice.name(),
            embedding_dim = dim,
            synthetic = voice.is_synthetic(),
            "Voice inserted"
        );

        Ok(())
    }

    async fn info(&self) -> Result<CatalogInfo, CatalogError> {
        let (total, synthetic): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COALESCE(SUM(is_synthetic), 0) FROM voices",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(CatalogInfo {
            total: total as usize,
            synthetic: synthetic as usize,
            embedding_dim: self.embedding_dim().await?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::predicate::VoiceField;
    use crate::domain::voice::{Gender, NewVoice};
    use crate::infrastructure::persistence::sqlite::{create_pool, run_migrations, DatabaseConfig};

    async fn catalog() -> SqliteCatalog {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        SqliteCatalog::new(pool)
    }

    fn voice(name: &str, gender: Gender, language: &str, quality: i64, values: &[f32]) -> VoiceRecord {
        VoiceRecord::new(NewVoice {
            name: VoiceName::new(name).unwrap(),
            gender,
            language: language.to_string(),
            quality: Quality::new(quality).unwrap(),
            training_duration: Some(1.5),
            style_vector: StyleVector::new(values.to_vec()).unwrap(),
            is_synthetic: false,
            notes: Some("it's fine".to_string()),
        })
    }

    async fn seeded() -> (SqliteCatalog, Vec<VoiceRecord>) {
        let catalog = catalog().await;
        let voices = vec![
            voice("af_bella", Gender::F, "en-us", 90, &[0.1, 0.2]),
            voice("af_nicole", Gender::F, "en-us", 50, &[0.3, 0.4]),
            voice("am_adam", Gender::M, "en-us", 70, &[0.5, 0.6]),
            voice("bf_emma", Gender::F, "en-gb", 75, &[0.7, 0.8]),
            voice("bm_george", Gender::M, "en-gb", 40, &[0.9, 1.0]),
        ];
        for v in &voices {
            catalog.insert(v).await.unwrap();
        }
        (catalog, voices)
    }

    #[tokio::test]
    async fn test_insert_and_round_trip() {
        let (catalog, voices) = seeded().await;
        let stored = catalog.find_by_name("af_bella").await.unwrap().unwrap();

        assert_eq!(stored.style_vector(), voices[0].style_vector());
        assert_eq!(stored.quality().value(), 90);
        assert_eq!(stored.training_duration(), Some(1.5));
        assert_eq!(stored.notes(), Some("it's fine"));
        assert_eq!(stored.created_at().timestamp(), voices[0].created_at().timestamp());
    }

    #[tokio::test]
    async fn test_sql_translation_agrees_with_in_memory_evaluation() {
        let (catalog, voices) = seeded().await;

        let predicates = vec![
            VoicePredicate::All,
            VoicePredicate::cond(VoiceField::Gender, CompareOp::Eq, "F")
                .and(VoicePredicate::cond(VoiceField::Quality, CompareOp::Ge, 70)),
            VoicePredicate::Or(vec![
                VoicePredicate::cond(VoiceField::Language, CompareOp::Eq, "en-gb"),
                VoicePredicate::cond(VoiceField::Quality, CompareOp::Lt, 60),
            ]),
            VoicePredicate::Not(Box::new(VoicePredicate::cond(
                VoiceField::Gender,
                CompareOp::Eq,
                "M",
            ))),
            VoicePredicate::cond(VoiceField::Name, CompareOp::Like, "AF_%"),
            VoicePredicate::cond(
                VoiceField::Name,
                CompareOp::In,
                FieldValue::List(vec!["am_adam".into(), "bf_emma".into(), "nobody".into()]),
            ),
            VoicePredicate::cond(VoiceField::IsSynthetic, CompareOp::Eq, false),
            VoicePredicate::cond(VoiceField::Quality, CompareOp::Ne, 90),
        ];

        for predicate in predicates {
            let from_sql: Vec<String> = catalog
                .query(&predicate)
                .await
                .unwrap()
                .iter()
                .map(|v| v.name().to_string())
                .collect();
            let in_memory: Vec<String> = voices
                .iter()
                .filter(|v| predicate.matches(v))
                .map(|v| v.name().to_string())
                .collect();
            assert_eq!(from_sql, in_memory, "predicate: {}", predicate);
        }
    }

    #[tokio::test]
    async fn test_values_are_bound_not_interpolated() {
        let (catalog, _) = seeded().await;
        let injection = VoicePredicate::name_eq("x' OR '1'='1");
        assert!(catalog.query(&injection).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_result_is_not_error() {
        let (catalog, _) = seeded().await;
        let none = VoicePredicate::cond(VoiceField::Quality, CompareOp::Gt, 100);
        assert!(catalog.query(&none).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_predicate_is_query_error() {
        let (catalog, _) = seeded().await;
        let bad = VoicePredicate::cond(VoiceField::IsSynthetic, CompareOp::Gt, true);
        assert!(matches!(
            catalog.query(&bad).await,
            Err(CatalogError::Query(_))
        ));
    }

    #[tokio::test]
    async fn test_duplicate_name_is_rejected() {
        let (catalog, _) = seeded().await;
        let dup = voice("af_bella", Gender::F, "en-us", 10, &[0.0, 0.0]);

        assert!(matches!(
            catalog.insert(&dup).await,
            Err(CatalogError::DuplicateName(ref n)) if n == "af_bella"
        ));
        let stored = catalog.find_by_name("af_bella").await.unwrap().unwrap();
        assert_eq!(stored.quality().value(), 90);
        assert_eq!(catalog.count().await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_dimension_fixed_by_first_insert() {
        let catalog = catalog().await;
        assert_eq!(catalog.info().await.unwrap().embedding_dim, None);

        catalog
            .insert(&voice("a", Gender::F, "en-us", 50, &[1.0, 2.0, 3.0]))
            .await
            .unwrap();
        assert_eq!(catalog.info().await.unwrap().embedding_dim, Some(3));

        let err = catalog
            .insert(&voice("b", Gender::F, "en-us", 50, &[1.0, 2.0]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CatalogError::DimensionMismatch {
                expected: 3,
                actual: 2
            }
        ));
        assert_eq!(catalog.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_pinned_dimension() {
        let catalog = catalog().await;
        catalog.pin_embedding_dim(4).await.unwrap();
        catalog.pin_embedding_dim(4).await.unwrap();
        assert!(catalog.pin_embedding_dim(5).await.is_err());

        assert!(matches!(
            catalog
                .insert(&voice("a", Gender::F, "en-us", 50, &[1.0, 2.0]))
                .await,
            Err(CatalogError::DimensionMismatch {
                expected: 4,
                actual: 2
            })
        ));
    }

    #[tokio::test]
    async fn test_query_rejects_rows_with_foreign_dimension() {
        let (catalog, _) = seeded().await;

        // 绕过 insert 的维度检查直接写入 3 维向量
        let blob = bincode::serialize(&vec![1.0f32, 2.0, 3.0]).unwrap();
        sqlx::query(
            "INSERT INTO voices (name, gender, language, quality, style_vector, is_synthetic, created_at) \
             VALUES (?, 'F', 'en-us', 60, ?, 0, ?)",
        )
        .bind("stray")
        .bind(blob)
        .bind(Utc::now().to_rfc3339())
        .execute(&catalog.pool)
        .await
        .unwrap();

        let result = catalog.query(&VoicePredicate::All).await;
        assert!(
            matches!(result, Err(CatalogError::Query(ref msg)) if msg.contains("stray")),
            "{:?}",
            result.map(|v| v.len())
        );

        // 未命中该行的查询不受影响
        let matched = catalog.query(&VoicePredicate::name_eq("af_bella")).await.unwrap();
        assert_eq!(matched.len(), 1);
    }

    #[tokio::test]
    async fn test_synthetic_voice_keeps_provenance() {
        let catalog = catalog().await;
        let provenance = Provenance::new(
            VoicePredicate::cond(VoiceField::Gender, CompareOp::Eq, "M"),
            VoicePredicate::cond(VoiceField::Gender, CompareOp::Eq, "F"),
            1.5,
        );
        let synthetic = VoiceRecord::synthetic(
            VoiceName::new("lab_1").unwrap(),
            Gender::X,
            "en-us",
            Quality::new(60).unwrap(),
            StyleVector::new(vec![0.5, 0.5]).unwrap(),
            None,
            provenance.clone(),
        )
        .unwrap();
        catalog.insert(&synthetic).await.unwrap();

        let stored = catalog.find_by_name("lab_1").await.unwrap().unwrap();
        assert!(stored.is_synthetic());
        assert_eq!(stored.provenance(), Some(&provenance));
        assert_eq!(
            catalog.info().await.unwrap(),
            CatalogInfo {
                total: 1,
                synthetic: 1,
                embedding_dim: Some(2),
            }
        );
    }
}
