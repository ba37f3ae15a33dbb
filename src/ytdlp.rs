use std::path::Path;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::downloader::command::ArgumentBuilder;
use crate::downloader::errors::{CodecError, DownloadError};
use crate::downloader::events::EventHub;
use crate::downloader::models::DownloadInfo;
use crate::downloader::options::Options;
use crate::downloader::runner::{RunnerConfig, YtDlpRunner};
use crate::downloader::session::RetrievalSession;
use crate::downloader::traits::{CommandBuilder, ProcessRunner};
use crate::downloader::utils::is_blank_url;

/// yt-dlp client: options, output subscribers and the last retrieved info.
///
/// Retrievals temporarily replace [`options`](Self::options) and the
/// subscribers registered on [`events`](Self::events), and put them back
/// afterwards. A client runs one retrieval at a time; `&mut self` on the
/// retrieval methods enforces that for a single owner, callers sharing the
/// same `EventHub` between clients must serialize themselves.
pub struct YtDlp<R = YtDlpRunner, B = ArgumentBuilder> {
    pub options: Options,
    /// Resolve every playlist entry instead of listing them flat
    pub retrieve_all_info: bool,
    events: EventHub,
    runner: R,
    builder: B,
    info: Option<DownloadInfo>,
}

impl YtDlp {
    pub fn new() -> Self {
        Self::with_runner(YtDlpRunner::default())
    }

    pub fn with_config(config: RunnerConfig) -> Self {
        Self::with_runner(YtDlpRunner::new(config))
    }
}

impl Default for YtDlp {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: ProcessRunner> YtDlp<R> {
    pub fn with_runner(runner: R) -> Self {
        Self::with_parts(runner, ArgumentBuilder)
    }
}

impl<R: ProcessRunner, B: CommandBuilder> YtDlp<R, B> {
    pub fn with_parts(runner: R, builder: B) -> Self {
        Self {
            options: Options::default(),
            retrieve_all_info: false,
            events: EventHub::new(),
            runner,
            builder,
            info: None,
        }
    }

    /// Output-line and stream-closed subscribers
    pub fn events(&self) -> &EventHub {
        &self.events
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Result of the last retrieval that produced records
    pub fn info(&self) -> Option<&DownloadInfo> {
        self.info.as_ref()
    }

    pub fn save_options(&self, path: impl AsRef<Path>) -> Result<(), CodecError> {
        self.options.save(path)
    }

    pub fn load_options(&mut self, path: impl AsRef<Path>) -> Result<(), CodecError> {
        self.options = Options::load(path)?;
        Ok(())
    }

    /// Fetch metadata for `url`, blocking the calling thread.
    ///
    /// Returns `Ok(None)` without doing anything for a blank URL, and
    /// `Ok(None)` when cancelled or when yt-dlp printed no info document.
    pub fn get_download_info(
        &mut self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<DownloadInfo>, DownloadError> {
        if is_blank_url(url) {
            debug!("blank url, nothing to retrieve");
            return Ok(None);
        }

        let session = RetrievalSession::begin(
            &mut self.options,
            &self.events,
            self.retrieve_all_info,
            cancel.clone(),
        )?;
        let result = session.drive_blocking(&self.runner, &self.builder, url)?;
        self.remember(&result);
        Ok(result)
    }

    /// Fetch metadata for `url` without blocking the runtime.
    pub async fn get_download_info_async(
        &mut self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<DownloadInfo>, DownloadError> {
        if is_blank_url(url) {
            debug!("blank url, nothing to retrieve");
            return Ok(None);
        }

        let session = RetrievalSession::begin(
            &mut self.options,
            &self.events,
            self.retrieve_all_info,
            cancel.clone(),
        )?;
        let result = session.drive_async(&self.runner, &self.builder, url).await?;
        self.remember(&result);
        Ok(result)
    }

    fn remember(&mut self, result: &Option<DownloadInfo>) {
        if let Some(info) = result {
            self.info = Some(info.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::downloader::events::LineHandler;
    use crate::downloader::options::{Rate, RateUnit};
    use crate::downloader::session::tests::{video_line, ScriptedRunner};
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting_handler(counter: &Arc<AtomicUsize>) -> LineHandler {
        let counter = counter.clone();
        Arc::new(move |_: &str| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    fn client(lines: &[&str]) -> YtDlp<ScriptedRunner> {
        let mut client = YtDlp::with_runner(ScriptedRunner::new(lines));
        client.options.authentication.username = Some("bob".into());
        client.options.network.proxy = Some("socks5://127.0.0.1:1080".into());
        client
    }

    #[test]
    fn test_subscribers_survive_retrieval() {
        let mut client = client(&[&video_line("a")]);
        let first_calls = Arc::new(AtomicUsize::new(0));
        let second_calls = Arc::new(AtomicUsize::new(0));
        let first = counting_handler(&first_calls);
        let second = counting_handler(&second_calls);
        client.events().subscribe_output(first.clone());
        client.events().subscribe_output(second.clone());

        client
            .get_download_info("https://x/a", &CancellationToken::new())
            .unwrap();

        let subscribers = client.events().output_subscribers();
        assert_eq!(subscribers.len(), 2);
        assert!(Arc::ptr_eq(&subscribers[0], &first));
        assert!(Arc::ptr_eq(&subscribers[1], &second));
        assert_eq!(first_calls.load(Ordering::SeqCst), 0);
        assert_eq!(second_calls.load(Ordering::SeqCst), 0);
        assert!(client.events().closed_subscribers().is_empty());
    }

    #[test]
    fn test_single_record_fills_info_slot() {
        let mut client = client(&[&video_line("a")]);
        let result = client
            .get_download_info("https://x/a", &CancellationToken::new())
            .unwrap();

        assert!(matches!(result, Some(DownloadInfo::Single(_))));
        assert_eq!(client.info(), result.as_ref());
        assert_eq!(client.info().and_then(|i| i.title()), Some("Video a"));
    }

    #[test]
    fn test_three_records_aggregate_in_order() {
        let mut client = client(&[&video_line("1"), &video_line("2"), &video_line("3")]);
        let result = client
            .get_download_info("https://x/list", &CancellationToken::new())
            .unwrap()
            .unwrap();

        let ids: Vec<_> = result.records().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["1", "2", "3"]);
        assert!(matches!(client.info(), Some(DownloadInfo::Multiple(v)) if v.len() == 3));
    }

    #[test]
    fn test_playlist_with_failed_entry_is_returned() {
        let line = concat!(
            r#"{"_type":"playlist","id":"PL","title":"L","#,
            r#""entries":[{"_type":"url","id":"a","url":"u"},null]}"#,
        );
        let mut client = client(&[line]);
        let result = client
            .get_download_info("https://x/list", &CancellationToken::new())
            .unwrap();

        match result {
            Some(DownloadInfo::Single(playlist)) => {
                assert!(playlist.is_playlist());
                assert_eq!(playlist.entries.len(), 1);
            }
            other => panic!("expected the playlist document, got {other:?}"),
        }
    }

    #[test]
    fn test_options_restored_after_retrieval() {
        let mut client = client(&[&video_line("a")]);
        let before = client.options.clone();
        client
            .get_download_info("https://x/a", &CancellationToken::new())
            .unwrap();
        assert_eq!(client.options, before);
        assert_eq!(client.options.verbosity_simulation.simulate, None);
    }

    #[test]
    fn test_cancelled_retrieval_restores_and_returns_none() {
        // Same output without cancelling yields both records
        let mut uncancelled = client(&[&video_line("a"), &video_line("b")]);
        let control = uncancelled
            .get_download_info("https://x/list", &CancellationToken::new())
            .unwrap();
        assert_eq!(control.map(|info| info.len()), Some(2));

        let cancel = CancellationToken::new();
        let mut runner = ScriptedRunner::new(&[&video_line("a"), &video_line("b")]);
        runner.finish = false;
        runner.cancel_after = Some(cancel.clone());
        let mut client = YtDlp::with_runner(runner);
        client.options.authentication.username = Some("bob".into());
        let before = client.options.clone();

        let calls = Arc::new(AtomicUsize::new(0));
        let handler = counting_handler(&calls);
        client.events().subscribe_output(handler.clone());

        let result = client.get_download_info("https://x/list", &cancel).unwrap();

        assert_eq!(result, None);
        assert_eq!(client.info(), None);
        assert_eq!(client.options, before);
        let subscribers = client.events().output_subscribers();
        assert_eq!(subscribers.len(), 1);
        assert!(Arc::ptr_eq(&subscribers[0], &handler));
    }

    #[test]
    fn test_blank_url_short_circuits() {
        let mut client = client(&[&video_line("a")]);
        let before = client.options.clone();
        let handler = counting_handler(&Arc::new(AtomicUsize::new(0)));
        client.events().subscribe_output(handler.clone());

        for url in ["", "   ", "\t\n"] {
            assert_eq!(
                client.get_download_info(url, &CancellationToken::new()).unwrap(),
                None
            );
        }

        assert_eq!(client.options, before);
        assert!(client.runner().last_args.lock().unwrap().is_empty());
        assert!(Arc::ptr_eq(&client.events().output_subscribers()[0], &handler));
    }

    #[test]
    fn test_unencodable_options_fail_before_override() {
        let mut client = client(&[&video_line("a")]);
        client.options.download.limit_rate = Some(Rate::new(-1.0, RateUnit::Kilo));
        client.options.filesystem.output = Some("%(title)s.%(ext)s".into());
        let before = client.options.clone();
        let handler = counting_handler(&Arc::new(AtomicUsize::new(0)));
        client.events().subscribe_output(handler.clone());

        let err = client
            .get_download_info("https://x/a", &CancellationToken::new())
            .unwrap_err();

        assert!(matches!(
            err,
            DownloadError::Codec(CodecError::MalformedRate { .. })
        ));
        assert_eq!(client.options, before);
        assert_eq!(client.options.verbosity_simulation.simulate, None);
        assert!(client.runner().last_args.lock().unwrap().is_empty());
        assert!(Arc::ptr_eq(&client.events().output_subscribers()[0], &handler));
    }

    #[test]
    fn test_empty_output_keeps_previous_info() {
        let mut client = client(&[&video_line("a")]);
        client
            .get_download_info("https://x/a", &CancellationToken::new())
            .unwrap();

        let mut quiet = YtDlp::with_runner(ScriptedRunner::new(&[]));
        quiet.info = client.info.clone();
        let result = quiet
            .get_download_info("https://x/b", &CancellationToken::new())
            .unwrap();

        assert_eq!(result, None);
        assert_eq!(quiet.info(), client.info());
    }

    #[test]
    fn test_session_arguments_carry_caller_credentials_only() {
        let mut client = client(&[&video_line("a")]);
        client
            .get_download_info("https://x/a", &CancellationToken::new())
            .unwrap();

        let args = client.runner().last_args.lock().unwrap().clone();
        assert!(args.windows(2).any(|w| w == ["--username", "bob"]));
        assert!(!args.iter().any(|a| a == "--proxy"));
        assert_eq!(args.last().map(String::as_str), Some("https://x/a"));
    }

    #[test]
    fn test_options_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("options.json");
        let source = client(&[]);
        source.save_options(&path).unwrap();

        let mut target = YtDlp::with_runner(ScriptedRunner::new(&[]));
        target.load_options(&path).unwrap();
        assert_eq!(target.options, source.options);
    }

    #[tokio::test]
    async fn test_async_retrieval() {
        let mut client = client(&[&video_line("a"), &video_line("b")]);
        let before = client.options.clone();
        let handler = counting_handler(&Arc::new(AtomicUsize::new(0)));
        client.events().subscribe_closed(Arc::new(|| {}));
        client.events().subscribe_output(handler.clone());

        let result = client
            .get_download_info_async("https://x/list", &CancellationToken::new())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(client.options, before);
        assert_eq!(client.events().closed_subscribers().len(), 1);
        assert!(Arc::ptr_eq(&client.events().output_subscribers()[0], &handler));
    }

    #[tokio::test]
    async fn test_async_cancel() {
        let cancel = CancellationToken::new();
        let mut runner = ScriptedRunner::new(&[&video_line("a"), &video_line("b")]);
        runner.finish = false;
        runner.cancel_after = Some(cancel.clone());
        let mut client = YtDlp::with_runner(runner);

        let result = client
            .get_download_info_async("https://x/list", &cancel)
            .await
            .unwrap();
        assert_eq!(result, None);
        assert!(client.events().output_subscribers().is_empty());
    }
}
