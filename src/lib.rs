//! Media metadata retrieval through yt-dlp.
//!
//! [`YtDlp`] holds a typed [`Options`] model, a set of output subscribers and
//! the last retrieved [`DownloadInfo`]. [`YtDlp::get_download_info`] runs
//! yt-dlp in simulate mode with a minimal option set and returns the parsed
//! JSON document(s), leaving the caller's options and subscribers as they were.
//!
//! Logging goes through `tracing`; install a subscriber to see it.

pub mod downloader;
pub mod ytdlp;

pub use downloader::{
    ArgumentBuilder, CodecError, CommandBuilder, DownloadError, DownloadInfo, EventHub,
    InfoRecord, Options, ProcessRunner, RunnerConfig, YtDlpRunner,
};
pub use tokio_util::sync::CancellationToken;
pub use ytdlp::YtDlp;
