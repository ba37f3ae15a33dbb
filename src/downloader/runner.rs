// Process runner for the yt-dlp binary
//
// stdout is published line by line through the EventHub, stderr is only
// logged. Both `run` flavours return once the child is spawned; completion is
// observed through `has_exited` and the stream-closed event.

use async_trait::async_trait;
use std::io::{BufRead, BufReader};
use std::process::{Command as StdCommand, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufReadExt, BufReader as TokioBufReader};
use tokio::process::Command as TokioCommand;
use tracing::{debug, info, warn};

use super::diagnostics::log_stderr_line;
use super::errors::DownloadError;
use super::events::EventHub;
use super::traits::ProcessRunner;
use super::utils::find_ytdlp;

/// How to start yt-dlp
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    pub program: String,
    /// Arguments placed before the generated ones
    pub leading_args: Vec<String>,
}

impl RunnerConfig {
    /// Binary from `$YTDLP_PATH` or the usual install locations
    pub fn from_env() -> Self {
        Self {
            program: find_ytdlp(),
            leading_args: Vec::new(),
        }
    }

    /// Run the `yt_dlp` module through a Python interpreter
    pub fn python(interpreter: impl Into<String>) -> Self {
        Self {
            program: interpreter.into(),
            leading_args: vec!["-m".to_string(), "yt_dlp".to_string()],
        }
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

pub struct YtDlpRunner {
    config: RunnerConfig,
    /// Exit flag of the most recently started process
    exited: Mutex<Arc<AtomicBool>>,
}

impl YtDlpRunner {
    pub fn new(config: RunnerConfig) -> Self {
        Self {
            config,
            exited: Mutex::new(Arc::new(AtomicBool::new(true))),
        }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Fresh exit flag for a process about to be tracked
    fn track_new_process(&self) -> Arc<AtomicBool> {
        let flag = Arc::new(AtomicBool::new(false));
        let mut current = self.exited.lock().unwrap_or_else(|p| p.into_inner());
        *current = flag.clone();
        flag
    }

    fn command_line(&self, args: &[String]) -> Vec<String> {
        self.config
            .leading_args
            .iter()
            .chain(args)
            .cloned()
            .collect()
    }
}

impl Default for YtDlpRunner {
    fn default() -> Self {
        Self::new(RunnerConfig::default())
    }
}

#[async_trait]
impl ProcessRunner for YtDlpRunner {
    fn name(&self) -> &'static str {
        "yt-dlp"
    }

    fn has_exited(&self) -> bool {
        self.exited
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .load(Ordering::SeqCst)
    }

    fn run(&self, args: Vec<String>, events: EventHub) -> Result<(), DownloadError> {
        let args = self.command_line(&args);
        info!(program = %self.config.program, args = ?args, "starting yt-dlp");

        let mut child = StdCommand::new(&self.config.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                warn!(program = %self.config.program, error = %e, "failed to start yt-dlp");
                DownloadError::from(e)
            })?;

        let (stdout, stderr) = match (child.stdout.take(), child.stderr.take()) {
            (Some(out), Some(err)) => (out, err),
            _ => {
                let _ = child.kill();
                return Err(DownloadError::ExecutionError(
                    "Failed to capture yt-dlp output".to_string(),
                ));
            }
        };
        let exited = self.track_new_process();

        std::thread::spawn(move || {
            for line in BufReader::new(stderr).lines().map_while(Result::ok) {
                log_stderr_line(&line);
            }
        });

        std::thread::spawn(move || {
            for line in BufReader::new(stdout).lines().map_while(Result::ok) {
                events.emit_line(&line);
            }
            events.emit_closed();
        });

        std::thread::spawn(move || {
            match child.wait() {
                Ok(status) => debug!(%status, "yt-dlp exited"),
                Err(e) => warn!(error = %e, "failed to wait for yt-dlp"),
            }
            exited.store(true, Ordering::SeqCst);
        });

        Ok(())
    }

    async fn run_async(&self, args: Vec<String>, events: EventHub) -> Result<(), DownloadError> {
        let args = self.command_line(&args);
        info!(program = %self.config.program, args = ?args, "starting yt-dlp");

        let mut child = TokioCommand::new(&self.config.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                warn!(program = %self.config.program, error = %e, "failed to start yt-dlp");
                DownloadError::from(e)
            })?;

        let (stdout, stderr) = match (child.stdout.take(), child.stderr.take()) {
            (Some(out), Some(err)) => (out, err),
            _ => {
                let _ = child.start_kill();
                return Err(DownloadError::ExecutionError(
                    "Failed to capture yt-dlp output".to_string(),
                ));
            }
        };
        let exited = self.track_new_process();

        tokio::spawn(async move {
            let mut lines = TokioBufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                log_stderr_line(&line);
            }
        });

        tokio::spawn(async move {
            let mut lines = TokioBufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                events.emit_line(&line);
            }
            events.emit_closed();
        });

        tokio::spawn(async move {
            match child.wait().await {
                Ok(status) => debug!(%status, "yt-dlp exited"),
                Err(e) => warn!(error = %e, "failed to wait for yt-dlp"),
            }
            exited.store(true, Ordering::SeqCst);
        });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_python_config_prefixes_module() {
        let runner = YtDlpRunner::new(RunnerConfig::python("python3"));
        assert_eq!(
            runner.command_line(&["--simulate".to_string()]),
            ["-m", "yt_dlp", "--simulate"]
        );
    }

    #[test]
    fn test_idle_runner_reports_exited() {
        let runner = YtDlpRunner::new(RunnerConfig {
            program: "yt-dlp".into(),
            leading_args: Vec::new(),
        });
        assert!(runner.has_exited());
    }

    #[test]
    fn test_missing_binary_is_tool_not_found() {
        let runner = YtDlpRunner::new(RunnerConfig {
            program: "/nonexistent/yt-dlp-binary".into(),
            leading_args: Vec::new(),
        });
        let result = runner.run(vec!["--version".into()], EventHub::new());
        assert!(matches!(result, Err(DownloadError::ToolNotFound(_))));
    }

    #[tokio::test]
    async fn test_missing_binary_is_tool_not_found_async() {
        let runner = YtDlpRunner::new(RunnerConfig {
            program: "/nonexistent/yt-dlp-binary".into(),
            leading_args: Vec::new(),
        });
        let result = runner.run_async(vec!["--version".into()], EventHub::new()).await;
        assert!(matches!(result, Err(DownloadError::ToolNotFound(_))));
    }
}
