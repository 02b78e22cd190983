//! Voice Query Handlers

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::{CatalogInfo, CatalogPort};
use crate::application::queries::{GetCatalogInfo, GetVoice, ListVoices, QueryVoices};
use crate::domain::lab::Provenance;
use crate::domain::predicate::VoicePredicate;
use crate::domain::voice::VoiceRecord;

// ============================================================================
// Response DTOs
// ============================================================================

/// 音色详情响应
#[derive(Debug, Clone)]
pub struct VoiceResponse {
    pub name: String,
    pub gender: String,
    pub language: String,
    pub quality: u8,
    pub training_duration: Option<f64>,
    pub is_synthetic: bool,
    pub notes: Option<String>,
    pub provenance: Option<Provenance>,
    pub embedding_dim: usize,
    /// 仅在显式请求时返回
    pub style_vector: Option<Vec<f32>>,
    pub created_at: String,
}

impl VoiceResponse {
    pub fn from_record(record: &VoiceRecord, include_vector: bool) -> Self {
        Self {
            name: record.name().to_string(),
            gender: record.gender().to_string(),
            language: record.language().to_string(),
            quality: record.quality().value(),
            training_duration: record.training_duration(),
            is_synthetic: record.is_synthetic(),
            notes: record.notes().map(str::to_string),
            provenance: record.provenance().cloned(),
            embedding_dim: record.style_vector().dim(),
            style_vector: include_vector.then(|| record.style_vector().as_slice().to_vec()),
            created_at: record.created_at().to_rfc3339(),
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GetVoice Handler
pub struct GetVoiceHandler {
    catalog: Arc<dyn CatalogPort>,
}

impl GetVoiceHandler {
    pub fn new(catalog: Arc<dyn CatalogPort>) -> Self {
        Self { catalog }
    }

    pub async fn handle(&self, query: GetVoice) -> Result<VoiceResponse, ApplicationError> {
        let voice = self
            .catalog
            .find_by_name(&query.name)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Voice", &query.name))?;

        Ok(VoiceResponse::from_record(&voice, query.include_vector))
    }
}

/// ListVoices Handler
pub struct ListVoicesHandler {
    catalog: Arc<dyn CatalogPort>,
}

impl ListVoicesHandler {
    pub fn new(catalog: Arc<dyn CatalogPort>) -> Self {
        Self { catalog }
    }

    pub async fn handle(&self, _query: ListVoices) -> Result<Vec<VoiceResponse>, ApplicationError> {
        let voices = self.catalog.query(&VoicePredicate::All).await?;
        Ok(voices
            .iter()
            .map(|v| VoiceResponse::from_record(v, false))
            .collect())
    }
}

/// QueryVoices Handler
pub struct QueryVoicesHandler {
    catalog: Arc<dyn CatalogPort>,
}

impl QueryVoicesHandler {
    pub fn new(catalog: Arc<dyn CatalogPort>) -> Self {
        Self { catalog }
    }

    pub async fn handle(&self, query: QueryVoices) -> Result<Vec<VoiceResponse>, ApplicationError> {
        query.predicate.validate()?;

        let voices = self.catalog.query(&query.predicate).await?;

        tracing::debug!(
            predicate = %query.predicate,
            matched = voices.len(),
            "Voices queried"
        );

        Ok(voices
            .iter()
            .map(|v| VoiceResponse::from_record(v, query.include_vector))
            .collect())
    }
}

/// CatalogInfo Handler
pub struct CatalogInfoHandler {
    catalog: Arc<dyn CatalogPort>,
}

impl CatalogInfoHandler {
    pub fn new(catalog: Arc<dyn CatalogPort>) -> Self {
        Self { catalog }
    }

    pub async fn handle(&self, _query: GetCatalogInfo) -> Result<CatalogInfo, ApplicationError> {
        Ok(self.catalog.info().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::predicate::{CompareOp, VoiceField};
    use crate::domain::voice::{Gender, NewVoice, Quality, StyleVector, VoiceName};
    use crate::infrastructure::persistence::sqlite::{
        create_pool, run_migrations, DatabaseConfig, SqliteCatalog,
    };

    async fn seeded_catalog() -> Arc<SqliteCatalog> {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        let catalog = Arc::new(SqliteCatalog::new(pool));

        for (name, gender, quality) in [
            ("af_bella", Gender::F, 90),
            ("af_nicole", Gender::F, 50),
            ("am_adam", Gender::M, 70),
        ] {
            let voice = VoiceRecord::new(NewVoice {
                name: VoiceName::new(name).unwrap(),
                gender,
                language: "en-us".to_string(),
                quality: Quality::new(quality).unwrap(),
                training_duration: None,
                style_vector: StyleVector::new(vec![0.1, 0.2, 0.3]).unwrap(),
                is_synthetic: false,
                notes: None,
            });
            catalog.insert(&voice).await.unwrap();
        }
        catalog
    }

    #[tokio::test]
    async fn test_get_voice_with_and_without_vector() {
        let handler = GetVoiceHandler::new(seeded_catalog().await);

        let brief = handler
            .handle(GetVoice {
                name: "af_bella".to_string(),
                include_vector: false,
            })
            .await
            .unwrap();
        assert_eq!(brief.gender, "F");
        assert_eq!(brief.embedding_dim, 3);
        assert!(brief.style_vector.is_none());

        let full = handler
            .handle(GetVoice {
                name: "af_bella".to_string(),
                include_vector: true,
            })
            .await
            .unwrap();
        assert_eq!(full.style_vector, Some(vec![0.1, 0.2, 0.3]));

        let missing = handler
            .handle(GetVoice {
                name: "nobody".to_string(),
                include_vector: false,
            })
            .await;
        assert!(matches!(missing, Err(ApplicationError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_query_voices() {
        let handler = QueryVoicesHandler::new(seeded_catalog().await);
        let predicate = VoicePredicate::cond(VoiceField::Gender, CompareOp::Eq, "F")
            .and(VoicePredicate::cond(VoiceField::Quality, CompareOp::Ge, 70));

        let voices = handler
            .handle(QueryVoices {
                predicate,
                include_vector: false,
            })
            .await
            .unwrap();
        assert_eq!(
            voices.iter().map(|v| v.name.as_str()).collect::<Vec<_>>(),
            vec!["af_bella"]
        );

        let empty = handler
            .handle(QueryVoices {
                predicate: VoicePredicate::name_eq("nobody"),
                include_vector: false,
            })
            .await
            .unwrap();
        assert!(empty.is_empty());
    }

    #[tokio::test]
    async fn test_list_and_info() {
        let catalog = seeded_catalog().await;
        let voices = ListVoicesHandler::new(catalog.clone())
            .handle(ListVoices)
            .await
            .unwrap();
        assert_eq!(voices.len(), 3);

        let info = CatalogInfoHandler::new(catalog)
            .handle(GetCatalogInfo)
            .await
            .unwrap();
        assert_eq!(
            info,
            CatalogInfo {
                total: 3,
                synthetic: 0,
                embedding_dim: Some(3),
            }
        );
    }
}
