// Downloader module - option model, process plumbing and retrieval sessions
//
// - options: typed yt-dlp option categories and their JSON codec
// - runner/command: how yt-dlp is started and what it is told
// - session: one info-only run with the caller's state swapped out and back

pub mod command;
pub mod diagnostics;
pub mod errors;
pub mod events;
pub mod models;
pub mod options;
pub mod runner;
pub mod session;
pub mod traits;
pub mod utils;

pub use command::ArgumentBuilder;
pub use diagnostics::{diagnose_error, BlockingReason};
pub use errors::{CodecError, DownloadError};
pub use events::{ClosedHandler, EventHub, LineHandler};
pub use models::{DownloadInfo, FormatInfo, InfoRecord, RecordKind};
pub use options::{ConfigModel, OptionCategory, Options, Rate};
pub use runner::{RunnerConfig, YtDlpRunner};
pub use session::{RetrievalSession, SessionState, POLL_INTERVAL};
pub use traits::{CommandBuilder, ProcessRunner};
