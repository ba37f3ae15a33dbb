// Seams to the external tool: argument building and process execution

use async_trait::async_trait;

use super::errors::DownloadError;
use super::events::EventHub;
use super::options::Options;

/// Turns a configuration into concrete yt-dlp arguments
pub trait CommandBuilder: Send + Sync {
    fn build(&self, options: &Options, url: &str) -> Vec<String>;
}

/// Runs yt-dlp and publishes its stdout.
///
/// Both entry points return as soon as the process is running. Every stdout
/// line goes to `events.emit_line`, EOF to `events.emit_closed`, and
/// [`has_exited`](Self::has_exited) turns true once the child is reaped.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Name of the runner (for logging)
    fn name(&self) -> &'static str;

    /// Whether the most recently started process has exited
    fn has_exited(&self) -> bool;

    /// Start from the calling thread, streaming from worker threads
    fn run(&self, args: Vec<String>, events: EventHub) -> Result<(), DownloadError>;

    /// Start on the tokio runtime, streaming from spawned tasks
    async fn run_async(&self, args: Vec<String>, events: EventHub) -> Result<(), DownloadError>;
}
