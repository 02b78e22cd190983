//! VoiceLab - 音色向量实验服务
//!
//! - Domain: voice/, predicate, lab/
//! - Application: commands, queries, ports
//! - Infrastructure: http, persistence, adapters

use std::sync::Arc;

use voicelab::config::{load_config, print_config, LogConfig};
use voicelab::infrastructure::adapters::{
    HttpSynthesizer, HttpSynthesizerConfig, NpzExporter, NpzStyleBank, WavFileSink,
};
use voicelab::infrastructure::http::{AppPorts, AppState, HttpServer};
use voicelab::infrastructure::persistence::sqlite::{
    create_pool, run_migrations, DatabaseConfig, SqliteCatalog,
};

fn init_tracing(log: &LogConfig) {
    let log_filter = format!("{},voicelab={},tower_http=debug", log.level, log.level);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    if log.json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config.log);

    tracing::info!("VoiceLab - 音色向量实验服务");
    print_config(&config);

    // 确保数据目录存在
    if let Some(parent) = std::path::Path::new(&config.database.path).parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    // 初始化数据库
    let db_config = DatabaseConfig {
        database_url: config.database.database_url(),
        max_connections: config.database.max_connections,
    };
    let pool = create_pool(&db_config).await?;
    run_migrations(&pool).await?;

    let catalog = Arc::new(SqliteCatalog::new(pool));
    if let Some(dim) = config.catalog.embedding_dim {
        catalog.pin_embedding_dim(dim).await?;
    }

    // 外部合成服务
    let synth_config = HttpSynthesizerConfig::new(config.synth.url.clone())
        .with_timeout(config.synth.timeout_secs)
        .with_retries(config.synth.max_retries)
        .with_sample_rate(config.synth.sample_rate);
    let synthesizer = Arc::new(HttpSynthesizer::new(synth_config)?);

    // 输出适配器
    let sink = Arc::new(WavFileSink::new(&config.storage.output_dir).await?);
    let exporter = Arc::new(NpzExporter::new(&config.storage.export_dir).await?);

    let ports = AppPorts {
        catalog,
        synthesizer,
        sink,
        exporter,
        style_bank: Arc::new(NpzStyleBank),
    };
    let state = AppState::new(ports, config.lab.clone(), config.catalog.clone());

    let server = HttpServer::new(&config.server, state);

    // 启动服务器（带优雅关闭）
    server
        .run_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
                return;
            }
            tracing::info!("Received shutdown signal");
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}
