// Option categories understood by the client, one struct per concern

use time::OffsetDateTime;

use super::cell::{option_category, option_enum, ConfigModel, OptionCategory};
use super::rate::Rate;

option_enum! {
    /// Container used when merging separate video and audio streams
    pub enum MergeOutputFormat {
        Avi = 0 => "avi",
        Flv = 1 => "flv",
        Mkv = 2 => "mkv",
        Mov = 3 => "mov",
        Mp4 = 4 => "mp4",
        Webm = 5 => "webm",
    }
}

option_enum! {
    pub enum AudioFormat {
        Best = 0 => "best",
        Aac = 1 => "aac",
        Alac = 2 => "alac",
        Flac = 3 => "flac",
        M4a = 4 => "m4a",
        Mp3 = 5 => "mp3",
        Opus = 6 => "opus",
        Vorbis = 7 => "vorbis",
        Wav = 8 => "wav",
    }
}

option_category! {
    pub struct General("General") {
        ignore_errors: bool => ("IgnoreErrors", "--ignore-errors"),
        abort_on_error: bool => ("AbortOnError", "--abort-on-error"),
        /// List playlist entries without resolving each video
        flat_playlist: bool => ("FlatPlaylist", "--flat-playlist"),
        mark_watched: bool => ("MarkWatched", "--mark-watched"),
        live_from_start: bool => ("LiveFromStart", "--live-from-start"),
    }
}

option_category! {
    pub struct Network("Network") {
        /// e.g. "socks5://127.0.0.1:1080"
        proxy: String => ("Proxy", "--proxy"),
        socket_timeout: f64 => ("SocketTimeout", "--socket-timeout"),
        source_address: String => ("SourceAddress", "--source-address"),
        force_ipv4: bool => ("ForceIpv4", "--force-ipv4"),
        force_ipv6: bool => ("ForceIpv6", "--force-ipv6"),
    }
}

option_category! {
    pub struct GeoRestriction("GeoRestriction") {
        geo_verification_proxy: String => ("GeoVerificationProxy", "--geo-verification-proxy"),
        /// Two-letter ISO 3166 country code
        geo_bypass_country: String => ("GeoBypassCountry", "--xff"),
    }
}

option_category! {
    pub struct VideoSelection("VideoSelection") {
        playlist_start: i64 => ("PlaylistStart", "--playlist-start"),
        playlist_end: i64 => ("PlaylistEnd", "--playlist-end"),
        playlist_items: String => ("PlaylistItems", "--playlist-items"),
        min_filesize: Rate => ("MinFilesize", "--min-filesize"),
        max_filesize: Rate => ("MaxFilesize", "--max-filesize"),
        date: OffsetDateTime => ("Date", "--date"),
        date_before: OffsetDateTime => ("DateBefore", "--datebefore"),
        date_after: OffsetDateTime => ("DateAfter", "--dateafter"),
        match_title: String => ("MatchTitle", "--match-title"),
        reject_title: String => ("RejectTitle", "--reject-title"),
        age_limit: i64 => ("AgeLimit", "--age-limit"),
        no_playlist: bool => ("NoPlaylist", "--no-playlist"),
        yes_playlist: bool => ("YesPlaylist", "--yes-playlist"),
    }
}

option_category! {
    pub struct Download("Download") {
        limit_rate: Rate => ("LimitRate", "--limit-rate"),
        throttled_rate: Rate => ("ThrottledRate", "--throttled-rate"),
        retries: i64 => ("Retries", "--retries"),
        concurrent_fragments: i64 => ("ConcurrentFragments", "--concurrent-fragments"),
        buffer_size: Rate => ("BufferSize", "--buffer-size"),
    }
}

option_category! {
    pub struct Filesystem("Filesystem") {
        /// Output filename template
        output: String => ("Output", "--output"),
        paths: String => ("Paths", "--paths"),
        /// Netscape-format cookies file
        cookies: String => ("Cookies", "--cookies"),
        no_part: bool => ("NoPart", "--no-part"),
        restrict_filenames: bool => ("RestrictFilenames", "--restrict-filenames"),
    }
}

option_category! {
    pub struct VerbositySimulation("VerbositySimulation") {
        quiet: bool => ("Quiet", "--quiet"),
        no_warnings: bool => ("NoWarnings", "--no-warnings"),
        simulate: bool => ("Simulate", "--simulate"),
        dump_json: bool => ("DumpJson", "--dump-json"),
        /// One JSON document for the whole URL, playlists included
        dump_single_json: bool => ("DumpSingleJson", "--dump-single-json"),
        verbose: bool => ("Verbose", "--verbose"),
    }
}

option_category! {
    pub struct Workarounds("Workarounds") {
        user_agent: String => ("UserAgent", "--user-agent"),
        referer: String => ("Referer", "--referer"),
        sleep_interval: f64 => ("SleepInterval", "--sleep-interval"),
        no_check_certificates: bool => ("NoCheckCertificates", "--no-check-certificates"),
    }
}

option_category! {
    pub struct VideoFormat("VideoFormat") {
        /// Format selector, e.g. "bv*+ba/b"
        format: String => ("Format", "--format"),
        format_sort: String => ("FormatSort", "--format-sort"),
        merge_output_format: MergeOutputFormat => ("MergeOutputFormat", "--merge-output-format"),
    }
}

option_category! {
    pub struct Subtitles("Subtitles") {
        write_subs: bool => ("WriteSubs", "--write-subs"),
        write_auto_subs: bool => ("WriteAutoSubs", "--write-auto-subs"),
        all_subs: bool => ("AllSubs", "--all-subs"),
        sub_format: String => ("SubFormat", "--sub-format"),
        /// Comma separated, e.g. "en,de"
        sub_langs: String => ("SubLangs", "--sub-langs"),
    }
}

option_category! {
    pub struct Authentication("Authentication") {
        username: String => ("Username", "--username"),
        password: String => ("Password", "--password"),
        two_factor: String => ("TwoFactor", "--twofactor"),
        netrc: bool => ("Netrc", "--netrc"),
        video_password: String => ("VideoPassword", "--video-password"),
    }
}

option_category! {
    pub struct PostProcessing("PostProcessing") {
        extract_audio: bool => ("ExtractAudio", "--extract-audio"),
        audio_format: AudioFormat => ("AudioFormat", "--audio-format"),
        /// 0 (best) to 10 (worst) for VBR
        audio_quality: i64 => ("AudioQuality", "--audio-quality"),
        embed_metadata: bool => ("EmbedMetadata", "--embed-metadata"),
    }
}

/// Every option yt-dlp is driven with.
///
/// All instances share the same structure; only cell values differ.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Options {
    pub general: General,
    pub network: Network,
    pub geo_restriction: GeoRestriction,
    pub video_selection: VideoSelection,
    pub download: Download,
    pub filesystem: Filesystem,
    pub verbosity_simulation: VerbositySimulation,
    pub workarounds: Workarounds,
    pub video_format: VideoFormat,
    pub subtitles: Subtitles,
    pub authentication: Authentication,
    pub post_processing: PostProcessing,
}

impl ConfigModel for Options {
    fn categories(&self) -> Vec<&dyn OptionCategory> {
        let categories: [&dyn OptionCategory; 12] = [
            &self.general,
            &self.network,
            &self.geo_restriction,
            &self.video_selection,
            &self.download,
            &self.filesystem,
            &self.verbosity_simulation,
            &self.workarounds,
            &self.video_format,
            &self.subtitles,
            &self.authentication,
            &self.post_processing,
        ];
        categories.to_vec()
    }

    fn category_mut(&mut self, name: &str) -> Option<&mut dyn OptionCategory> {
        let category: &mut dyn OptionCategory = match name {
            General::NAME => &mut self.general,
            Network::NAME => &mut self.network,
            GeoRestriction::NAME => &mut self.geo_restriction,
            VideoSelection::NAME => &mut self.video_selection,
            Download::NAME => &mut self.download,
            Filesystem::NAME => &mut self.filesystem,
            VerbositySimulation::NAME => &mut self.verbosity_simulation,
            Workarounds::NAME => &mut self.workarounds,
            VideoFormat::NAME => &mut self.video_format,
            Subtitles::NAME => &mut self.subtitles,
            Authentication::NAME => &mut self.authentication,
            PostProcessing::NAME => &mut self.post_processing,
            _ => return None,
        };
        Some(category)
    }
}

impl Options {
    /// Session-local options for an info-only run.
    ///
    /// Forces a single JSON document in simulate mode and carries over only
    /// credentials, user agent, format choice, playlist and subtitle settings.
    pub fn for_info_retrieval(&self, retrieve_all_info: bool) -> Self {
        let mut info = Self::default();

        info.verbosity_simulation.dump_single_json = Some(true);
        info.verbosity_simulation.simulate = Some(true);
        info.general.flat_playlist = Some(!retrieve_all_info);
        info.general.ignore_errors = Some(true);

        info.authentication = self.authentication.clone();
        info.workarounds.user_agent = self.workarounds.user_agent.clone();
        info.video_format.format = self.video_format.format.clone();
        info.video_selection.no_playlist = self.video_selection.no_playlist;
        info.subtitles = self.subtitles.clone();

        info
    }
}
