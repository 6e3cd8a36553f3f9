//! Local whisper.cpp transcription.
//!
//! Two stages: ffmpeg normalises the MP3 to 16 kHz mono 16-bit PCM WAV next to
//! the source file, then whisper-cli recognises the WAV. The WAV is removed on
//! every exit path once stage one has started.

use super::tool::{ExternalTool, ToolFailure};
use super::Transcriber;
use crate::config::paths::{FFMPEG_BIN, WHISPER_CLI, WHISPER_MODEL};
use crate::error::{Result, VoiceboxError};
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Default upper bound for each external process.
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Removes the wrapped file when dropped.
struct ScratchFile(PathBuf);

impl Drop for ScratchFile {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.0) {
            Ok(()) => debug!("Removed scratch file {:?}", self.0),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove scratch file {:?}: {}", self.0, e),
        }
    }
}

/// whisper.cpp-based transcriber.
#[derive(Debug, Clone)]
pub struct WhisperCppTranscriber {
    ffmpeg: ExternalTool,
    whisper: ExternalTool,
    model: PathBuf,
    timeout: Duration,
}

impl WhisperCppTranscriber {
    /// Transcriber using the fixed tool and model locations.
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_tools(
            ExternalTool::new(FFMPEG_BIN),
            ExternalTool::new(WHISPER_CLI),
            WHISPER_MODEL,
            timeout,
        )
    }

    pub fn with_tools(
        ffmpeg: ExternalTool,
        whisper: ExternalTool,
        model: impl Into<PathBuf>,
        timeout: Duration,
    ) -> Self {
        Self {
            ffmpeg,
            whisper,
            model: model.into(),
            timeout,
        }
    }

    /// Stage one: MP3 to normalised WAV.
    #[instrument(skip(self), fields(source = %source.display()))]
    async fn convert_to_wav(&self, source: &Path, wav: &Path) -> Result<()> {
        let args: Vec<OsString> = vec![
            "-y".into(),
            "-i".into(),
            source.into(),
            "-ar".into(),
            "16000".into(),
            "-ac".into(),
            "1".into(),
            "-c:a".into(),
            "pcm_s16le".into(),
            wav.into(),
        ];

        match self.ffmpeg.run(&args, self.timeout).await {
            Ok(out) if out.status.success() => Ok(()),
            Ok(out) => {
                let stderr = String::from_utf8_lossy(&out.stderr);
                Err(VoiceboxError::Conversion(format!(
                    "ffmpeg exited with {}: {}",
                    out.status,
                    stderr.trim()
                )))
            }
            Err(ToolFailure::NotFound) => Err(VoiceboxError::ToolNotFound(self.ffmpeg.name())),
            Err(ToolFailure::Spawn(e)) => {
                Err(VoiceboxError::Conversion(format!("ffmpeg error: {}", e)))
            }
            Err(ToolFailure::TimedOut(limit)) => Err(VoiceboxError::Conversion(format!(
                "ffmpeg timed out after {}s",
                limit.as_secs_f64()
            ))),
        }
    }

    /// Stage two: WAV to text.
    #[instrument(skip(self), fields(wav = %wav.display()))]
    async fn recognize(&self, wav: &Path) -> Result<String> {
        let args: Vec<OsString> = vec![
            "--model".into(),
            self.model.clone().into(),
            "--output-txt".into(),
            "-f".into(),
            wav.into(),
        ];

        let output = match self.whisper.run(&args, self.timeout).await {
            Ok(out) => out,
            Err(ToolFailure::NotFound) => {
                return Err(VoiceboxError::ToolNotFound(self.whisper.name()));
            }
            Err(ToolFailure::Spawn(e)) => {
                return Err(VoiceboxError::Transcription(format!("whisper-cli error: {}", e)));
            }
            Err(ToolFailure::TimedOut(limit)) => {
                return Err(VoiceboxError::Transcription(format!(
                    "whisper-cli timed out after {}s",
                    limit.as_secs_f64()
                )));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VoiceboxError::Transcription(format!(
                "whisper-cli exited with {}\nstderr: {}",
                output.status, stderr
            )));
        }

        for sidecar in sidecar_candidates(wav) {
            if !sidecar.exists() {
                continue;
            }
            let text = tokio::fs::read_to_string(&sidecar).await.map_err(|e| {
                VoiceboxError::Transcription(format!("Failed to read {:?}: {}", sidecar, e))
            })?;
            if let Err(e) = tokio::fs::remove_file(&sidecar).await {
                warn!("Failed to remove transcript file {:?}: {}", sidecar, e);
            }
            debug!("Read transcript from {:?}", sidecar);
            return Ok(text.trim().to_string());
        }

        debug!("No transcript file, using stdout");
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl Default for WhisperCppTranscriber {
    fn default() -> Self {
        Self::new()
    }
}

/// Text files whisper-cli may write for `--output-txt`, in preference order.
fn sidecar_candidates(wav: &Path) -> [PathBuf; 2] {
    let mut appended = wav.as_os_str().to_os_string();
    appended.push(".txt");
    [PathBuf::from(appended), wav.with_extension("txt")]
}

#[async_trait]
impl Transcriber for WhisperCppTranscriber {
    async fn transcribe(&self, audio_path: &Path) -> Result<String> {
        let wav_path = audio_path.with_extension("wav");
        let _scratch = ScratchFile(wav_path.clone());

        self.convert_to_wav(audio_path, &wav_path).await?;
        let text = self.recognize(&wav_path).await?;

        info!("Transcribed {} characters", text.len());
        Ok(text)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    /// A fake tool: `sh <script>` with the script written to `dir`.
    fn script(dir: &Path, name: &str, body: &str) -> ExternalTool {
        let path = dir.join(name);
        std::fs::write(&path, format!("{}\n", body)).unwrap();
        ExternalTool::new("sh").arg(path)
    }

    /// ffmpeg stand-in that creates its last argument.
    fn fake_ffmpeg(dir: &Path) -> ExternalTool {
        script(dir, "ffmpeg.sh", "for last; do :; done\nprintf 'RIFF' > \"$last\"")
    }

    fn setup() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let mp3 = dir.path().join("abc.mp3");
        std::fs::write(&mp3, b"ID3").unwrap();
        (dir, mp3)
    }

    fn transcriber(dir: &Path, whisper_body: &str, timeout: Duration) -> WhisperCppTranscriber {
        WhisperCppTranscriber::with_tools(
            fake_ffmpeg(dir),
            script(dir, "whisper.sh", whisper_body),
            dir.join("model.bin"),
            timeout,
        )
    }

    #[tokio::test]
    async fn test_reads_sidecar_and_cleans_up() {
        let (dir, mp3) = setup();
        let t = transcriber(
            dir.path(),
            "for last; do :; done\nprintf '  Hi, call me back.  \\n' > \"$last.txt\"\necho ignored",
            Duration::from_secs(10),
        );

        let text = t.transcribe(&mp3).await.unwrap();

        assert_eq!(text, "Hi, call me back.");
        assert!(!dir.path().join("abc.wav").exists());
        assert!(!dir.path().join("abc.wav.txt").exists());
        assert!(mp3.exists());
    }

    #[tokio::test]
    async fn test_stem_sidecar() {
        let (dir, mp3) = setup();
        let t = transcriber(
            dir.path(),
            "for last; do :; done\nprintf 'stem file' > \"${last%.wav}.txt\"",
            Duration::from_secs(10),
        );

        assert_eq!(t.transcribe(&mp3).await.unwrap(), "stem file");
        assert!(!dir.path().join("abc.txt").exists());
    }

    #[tokio::test]
    async fn test_falls_back_to_stdout() {
        let (dir, mp3) = setup();
        let t = transcriber(dir.path(), "echo '  from stdout  '", Duration::from_secs(10));

        assert_eq!(t.transcribe(&mp3).await.unwrap(), "from stdout");
        assert!(!dir.path().join("abc.wav").exists());
    }

    #[tokio::test]
    async fn test_empty_transcript_is_ok() {
        let (dir, mp3) = setup();
        let t = transcriber(dir.path(), "exit 0", Duration::from_secs(10));

        assert_eq!(t.transcribe(&mp3).await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_recognizer_failure_removes_wav() {
        let (dir, mp3) = setup();
        let t = transcriber(dir.path(), "echo 'model missing' >&2\nexit 3", Duration::from_secs(10));

        let err = t.transcribe(&mp3).await.unwrap_err();

        match err {
            VoiceboxError::Transcription(msg) => assert!(msg.contains("model missing")),
            other => panic!("unexpected error: {other}"),
        }
        assert!(!dir.path().join("abc.wav").exists());
    }

    #[tokio::test]
    async fn test_recognizer_timeout_removes_wav() {
        let (dir, mp3) = setup();
        let t = transcriber(dir.path(), "exec sleep 5", Duration::from_millis(200));

        let err = t.transcribe(&mp3).await.unwrap_err();

        assert!(matches!(err, VoiceboxError::Transcription(ref m) if m.contains("timed out")));
        assert!(!dir.path().join("abc.wav").exists());
    }

    #[tokio::test]
    async fn test_conversion_failure() {
        let (dir, mp3) = setup();
        let t = WhisperCppTranscriber::with_tools(
            script(dir.path(), "ffmpeg.sh", "echo 'Invalid data' >&2\nexit 1"),
            script(dir.path(), "whisper.sh", "echo unreachable"),
            dir.path().join("model.bin"),
            Duration::from_secs(10),
        );

        let err = t.transcribe(&mp3).await.unwrap_err();

        assert!(matches!(err, VoiceboxError::Conversion(ref m) if m.contains("Invalid data")));
        assert!(!dir.path().join("abc.wav").exists());
    }

    #[tokio::test]
    async fn test_missing_tool() {
        let (dir, mp3) = setup();
        let t = WhisperCppTranscriber::with_tools(
            ExternalTool::new(dir.path().join("no-such-ffmpeg")),
            ExternalTool::new(dir.path().join("no-such-whisper")),
            dir.path().join("model.bin"),
            Duration::from_secs(10),
        );

        let err = t.transcribe(&mp3).await.unwrap_err();
        assert!(matches!(err, VoiceboxError::ToolNotFound(_)));
    }
}
