//! List command implementation.

use crate::cli::Output;
use crate::config::paths::DB_PATH;
use crate::repository::{RecordingRepository, SqliteRecordingRepository};
use anyhow::Result;
use std::path::Path;

/// Run the list command.
pub async fn run_list() -> Result<()> {
    let db_path = Path::new(DB_PATH);
    if !db_path.exists() {
        Output::info("No recordings yet. Start the server with 'voicebox serve'.");
        return Ok(());
    }

    let repository = SqliteRecordingRepository::new(db_path)?;

    match repository.list().await {
        Ok(recordings) => {
            if recordings.is_empty() {
                Output::info("No recordings yet.");
            } else {
                Output::header(&format!("Recordings ({})", recordings.len()));
                println!();

                for rec in &recordings {
                    Output::recording_info(
                        &rec.title,
                        &rec.phone_number,
                        &rec.received_at,
                        rec.file_size,
                        &rec.transcription,
                    );
                }

                let total_bytes: i64 = recordings.iter().map(|r| r.file_size).sum();
                println!();
                Output::kv("Total recordings", &recordings.len().to_string());
                Output::kv("Total audio", &crate::cli::output::format_size(total_bytes));
            }
        }
        Err(e) => {
            Output::error(&format!("Failed to list recordings: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
