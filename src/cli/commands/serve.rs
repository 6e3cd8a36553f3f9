//! HTTP server command.
//!
//! Wires the production adapters into the ingestion pipeline and serves the
//! webhook, listing and playback endpoints until Ctrl+C.

use crate::api::{router, AppState};
use crate::attachment::AttachmentStore;
use crate::cli::Output;
use crate::config::paths::{ATTACHMENT_DIR, DATA_DIR, DB_PATH};
use crate::config::Settings;
use crate::ingest::IngestPipeline;
use crate::repository::SqliteRecordingRepository;
use crate::title::LocalChatTitleGenerator;
use crate::transcription::WhisperCppTranscriber;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Run the HTTP server.
pub async fn run_serve(host: Option<String>, port: Option<u16>, mut settings: Settings) -> anyhow::Result<()> {
    if let Some(host) = host {
        settings.server.host = host;
    }
    if let Some(port) = port {
        settings.server.port = port;
    }

    std::fs::create_dir_all(DATA_DIR)?;
    std::fs::create_dir_all(ATTACHMENT_DIR)?;

    let repository = Arc::new(SqliteRecordingRepository::new(Path::new(DB_PATH))?);
    let transcriber = Arc::new(WhisperCppTranscriber::with_timeout(
        settings.transcription.timeout(),
    ));
    let titler = Arc::new(LocalChatTitleGenerator::new(&settings.title)?);

    let pipeline = IngestPipeline::new(transcriber, titler, repository, AttachmentStore::default());
    let state = Arc::new(AppState::new(pipeline));
    let app = router(state);

    let addr = settings.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Voicebox Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Webhook", "POST /api/webhook");
    Output::kv("Recordings", "GET  /api/recordings");
    Output::kv("Play", "GET  /api/play/{id}");
    Output::kv("Health", "GET  /health");
    println!();
    Output::kv("Store", DB_PATH);
    Output::kv("Attachments", ATTACHMENT_DIR);
    Output::kv("Title model", &settings.title.model);
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}
