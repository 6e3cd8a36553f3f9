//! Doctor command - verify external tools, model files and services.

use crate::cli::output::format_size;
use crate::cli::Output;
use crate::config::paths::{DATA_DIR, DB_PATH, FFMPEG_BIN, TITLE_API_BASE, WHISPER_CLI, WHISPER_MODEL};
use crate::config::Settings;
use console::style;
use std::path::Path;
use std::process::Command;
use std::time::Duration;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
///
/// Missing enrichment tools are warnings: recordings are still stored
/// without a transcript or title.
pub async fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("Voicebox Doctor");
    println!();

    let mut checks = Vec::new();

    println!("{}", style("Transcription").bold());
    let section = vec![
        check_ffmpeg(),
        check_file("whisper-cli", Path::new(WHISPER_CLI), WHISPER_HINT),
        check_file("Whisper model", Path::new(WHISPER_MODEL), MODEL_HINT),
    ];
    section.iter().for_each(CheckResult::print);
    checks.extend(section);
    println!();

    println!("{}", style("Title Service").bold());
    let title_check = check_title_service(&settings.title.model).await;
    title_check.print();
    checks.push(title_check);
    println!();

    println!("{}", style("Storage").bold());
    let section = check_storage();
    section.iter().for_each(CheckResult::print);
    checks.extend(section);
    println!();

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!("{} error(s) found.", errors));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!(
            "{} warning(s). Recordings will be stored, but some enrichment may be skipped.",
            warnings
        ));
    } else {
        Output::success("All checks passed! Voicebox is ready.");
    }

    Ok(())
}

const WHISPER_HINT: &str = "Build whisper.cpp next to this directory: cmake -B build && cmake --build build";
const MODEL_HINT: &str = "Download with: ./models/download-ggml-model.sh base.en (inside whisper.cpp)";

fn check_ffmpeg() -> CheckResult {
    let hint = if cfg!(target_os = "macos") {
        "Install with: brew install ffmpeg"
    } else {
        "Install with: sudo apt install ffmpeg (or your package manager)"
    };

    match Command::new(FFMPEG_BIN).arg("-version").output() {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .unwrap_or("installed")
                .trim()
                .chars()
                .take(50)
                .collect::<String>();
            CheckResult::ok(FFMPEG_BIN, &version)
        }
        Ok(_) => CheckResult::warning(FFMPEG_BIN, "installed but not working", hint),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            CheckResult::warning(FFMPEG_BIN, "not found", hint)
        }
        Err(e) => CheckResult::warning(FFMPEG_BIN, &format!("error: {}", e), hint),
    }
}

fn check_file(name: &str, path: &Path, hint: &str) -> CheckResult {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_file() => CheckResult::ok(
            name,
            &format!("{} ({})", path.display(), format_size(meta.len() as i64)),
        ),
        Ok(_) => CheckResult::warning(name, &format!("{} is not a file", path.display()), hint),
        Err(_) => CheckResult::warning(name, &format!("{} not found", path.display()), hint),
    }
}

async fn check_title_service(model: &str) -> CheckResult {
    let name = "Ollama";
    let hint = format!("Start Ollama and pull the model: ollama pull {}", model);

    let client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(3))
        .build()
    {
        Ok(c) => c,
        Err(e) => return CheckResult::error(name, &format!("HTTP client error: {}", e), &hint),
    };

    match client.get(format!("{}/models", TITLE_API_BASE)).send().await {
        Ok(resp) if resp.status().is_success() => {
            let body = resp.text().await.unwrap_or_default();
            if body.contains(model) {
                CheckResult::ok(name, &format!("{} serving {}", TITLE_API_BASE, model))
            } else {
                CheckResult::warning(name, &format!("model {} not listed", model), &hint)
            }
        }
        Ok(resp) => CheckResult::warning(name, &format!("status {}", resp.status()), &hint),
        Err(_) => CheckResult::warning(name, &format!("{} unreachable", TITLE_API_BASE), &hint),
    }
}

fn check_storage() -> Vec<CheckResult> {
    let mut results = Vec::new();

    let data_dir = Path::new(DATA_DIR);
    if data_dir.is_dir() {
        results.push(CheckResult::ok("Data directory", DATA_DIR));
    } else if data_dir.exists() {
        results.push(CheckResult::error(
            "Data directory",
            &format!("{} exists but is not a directory", DATA_DIR),
            "Move it aside; the server needs to create this directory",
        ));
    } else {
        results.push(CheckResult::warning(
            "Data directory",
            &format!("{} (will be created)", DATA_DIR),
            "Directory will be created when the server starts",
        ));
    }

    let db_path = Path::new(DB_PATH);
    if db_path.exists() {
        let size = std::fs::metadata(db_path)
            .map(|m| format_size(m.len() as i64))
            .unwrap_or_else(|_| "unknown size".to_string());
        results.push(CheckResult::ok("Database", &format!("{} ({})", DB_PATH, size)));
    } else {
        results.push(CheckResult::warning(
            "Database",
            &format!("{} (not created yet)", DB_PATH),
            "Database will be created when the server starts",
        ));
    }

    results
}
