// One info-only yt-dlp run on behalf of a client
//
// A session borrows the client's options and subscriber lists, swaps in its
// own, and puts the originals back when it finishes. Restoration happens in
// `finish` on the normal path and in `Drop` on every other one (early return,
// panic, dropped future).
//
// Callers must not run two sessions against the same options/hub at once;
// nothing here serializes them.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use super::errors::{CodecError, DownloadError};
use super::events::{ClosedHandler, EventHub, LineHandler};
use super::models::{DownloadInfo, InfoRecord};
use super::options::{codec, Options};
use super::traits::{CommandBuilder, ProcessRunner};

/// Delay between checks for process exit, stream close and cancellation
pub const POLL_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Preparing,
    Running,
    Draining,
    Finalizing,
    Completed,
    Cancelled,
}

pub struct RetrievalSession<'a> {
    options: &'a mut Options,
    events: &'a EventHub,
    cancel: CancellationToken,
    /// Present until the caller's state has been put back
    saved_config: Option<Value>,
    saved_output: Vec<LineHandler>,
    saved_closed: Vec<ClosedHandler>,
    records: Arc<Mutex<Vec<InfoRecord>>>,
    closed: Arc<AtomicBool>,
    state: SessionState,
}

impl<'a> RetrievalSession<'a> {
    /// Snapshot the caller's options and subscribers and install the
    /// session's own.
    ///
    /// Fails without touching anything when the options cannot be serialized.
    pub fn begin(
        options: &'a mut Options,
        events: &'a EventHub,
        retrieve_all_info: bool,
        cancel: CancellationToken,
    ) -> Result<Self, CodecError> {
        let saved_config = codec::serialize(&*options)?;
        debug!(from = ?SessionState::Idle, to = ?SessionState::Preparing, "retrieval session");

        *options = options.for_info_retrieval(retrieve_all_info);
        let (saved_output, saved_closed) = events.take_all();

        let records = Arc::new(Mutex::new(Vec::new()));
        let closed = Arc::new(AtomicBool::new(false));

        {
            let records = records.clone();
            let closed = closed.clone();
            let cancel = cancel.clone();
            events.subscribe_output(Arc::new(move |line: &str| {
                if cancel.is_cancelled() || closed.load(Ordering::SeqCst) {
                    return;
                }
                if let Some(record) = InfoRecord::parse_line(line) {
                    records
                        .lock()
                        .unwrap_or_else(|p| p.into_inner())
                        .push(record);
                }
            }));
        }
        {
            let closed = closed.clone();
            events.subscribe_closed(Arc::new(move || closed.store(true, Ordering::SeqCst)));
        }

        Ok(Self {
            options,
            events,
            cancel,
            saved_config: Some(saved_config),
            saved_output,
            saved_closed,
            records,
            closed,
            state: SessionState::Preparing,
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Session-local options currently installed on the client
    pub fn options(&self) -> &Options {
        &*self.options
    }

    pub fn record_count(&self) -> usize {
        self.records.lock().unwrap_or_else(|p| p.into_inner()).len()
    }

    fn transition(&mut self, state: SessionState) {
        debug!(from = ?self.state, to = ?state, "retrieval session");
        self.state = state;
    }

    fn is_drained(&mut self, runner: &dyn ProcessRunner) -> bool {
        if self.state != SessionState::Draining {
            self.transition(SessionState::Draining);
        }
        self.cancel.is_cancelled()
            || (runner.has_exited() && self.closed.load(Ordering::SeqCst))
    }

    /// Run with the calling thread blocked until drained or cancelled
    pub fn drive_blocking(
        mut self,
        runner: &dyn ProcessRunner,
        builder: &dyn CommandBuilder,
        url: &str,
    ) -> Result<Option<DownloadInfo>, DownloadError> {
        self.transition(SessionState::Running);
        let args = builder.build(self.options, url);

        if let Err(e) = runner.run(args, self.events.clone()) {
            self.finish()?;
            return Err(e);
        }

        while !self.is_drained(runner) {
            std::thread::sleep(POLL_INTERVAL);
        }

        Ok(self.finish()?)
    }

    /// Run with the calling task suspended until drained or cancelled
    pub async fn drive_async(
        mut self,
        runner: &dyn ProcessRunner,
        builder: &dyn CommandBuilder,
        url: &str,
    ) -> Result<Option<DownloadInfo>, DownloadError> {
        self.transition(SessionState::Running);
        let args = builder.build(self.options, url);

        if let Err(e) = runner.run_async(args, self.events.clone()).await {
            self.finish()?;
            return Err(e);
        }

        while !self.is_drained(runner) {
            tokio::time::sleep(POLL_INTERVAL).await;
        }

        Ok(self.finish()?)
    }

    /// Collect the result and hand the caller's state back.
    ///
    /// A cancelled session yields `None` whatever it captured. If the saved
    /// options cannot be decoded the error is returned and the client keeps
    /// the session-local options; subscribers are restored regardless.
    pub fn finish(mut self) -> Result<Option<DownloadInfo>, CodecError> {
        self.transition(SessionState::Finalizing);

        let cancelled = self.cancel.is_cancelled();
        let records = std::mem::take(&mut *self.records.lock().unwrap_or_else(|p| p.into_inner()));
        let captured = records.len();
        let result = if cancelled {
            None
        } else {
            DownloadInfo::from_records(records)
        };

        self.restore()?;

        if cancelled {
            self.transition(SessionState::Cancelled);
            info!(captured, "info retrieval cancelled");
        } else {
            self.transition(SessionState::Completed);
            info!(records = captured, "info retrieval completed");
        }
        Ok(result)
    }

    fn restore(&mut self) -> Result<(), CodecError> {
        let Some(saved) = self.saved_config.take() else {
            return Ok(());
        };

        self.events.replace_all(
            std::mem::take(&mut self.saved_output),
            std::mem::take(&mut self.saved_closed),
        );
        *self.options = codec::deserialize(&saved)?;
        Ok(())
    }
}

impl Drop for RetrievalSession<'_> {
    fn drop(&mut self) {
        if self.saved_config.is_some() {
            debug!(state = ?self.state, "retrieval session abandoned, restoring caller state");
            if let Err(e) = self.restore() {
                error!(error = %e, "failed to restore options after retrieval");
            }
        }
    }
}
