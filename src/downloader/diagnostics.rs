// Classification of yt-dlp stderr lines
//
// yt-dlp keeps running with --ignore-errors, so failures for single entries
// only ever show up on stderr. The runner logs each line with its severity and,
// for errors, the most likely blocking reason.

/// Prefix yt-dlp puts on a diagnostic line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// Why an extractor refused to return metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockingReason {
    DrmProtected,
    MembersOnly,
    AgeRestricted,
    PrivateVideo,
    VideoUnavailable,
    GeoBlocked,
    RateLimited,
    BotDetection,
    Http403Forbidden,
    NetworkTimeout,
    Unknown,
}

/// Checked top to bottom; the first match wins.
const PATTERNS: &[(BlockingReason, &[&str])] = &[
    (
        BlockingReason::DrmProtected,
        &["drm", "widevine", "playready", "fairplay", "requires purchase", "rental"],
    ),
    (
        BlockingReason::MembersOnly,
        &["members only", "members-only", "join this channel", "available to members"],
    ),
    (
        BlockingReason::AgeRestricted,
        &["age-restricted", "confirm your age", "age_verification"],
    ),
    (
        BlockingReason::PrivateVideo,
        &["private video", "video is private", "been granted access"],
    ),
    (
        BlockingReason::VideoUnavailable,
        &["video unavailable", "has been removed", "no longer available", "is unavailable"],
    ),
    (
        BlockingReason::GeoBlocked,
        &["not available in your country", "blocked in your country", "geo restrict"],
    ),
    (
        BlockingReason::RateLimited,
        &["429", "rate limit", "too many requests"],
    ),
    (
        BlockingReason::BotDetection,
        &["not a bot", "captcha", "unusual traffic"],
    ),
    (BlockingReason::Http403Forbidden, &["403", "forbidden"]),
    (
        BlockingReason::NetworkTimeout,
        &["timed out", "timeout", "connection refused", "network is unreachable"],
    ),
];

impl BlockingReason {
    /// Human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::DrmProtected => "DRM-protected content",
            Self::MembersOnly => "Members-only content",
            Self::AgeRestricted => "Age-restricted content",
            Self::PrivateVideo => "Private video",
            Self::VideoUnavailable => "Video unavailable",
            Self::GeoBlocked => "Geographic restriction",
            Self::RateLimited => "Rate limited",
            Self::BotDetection => "Bot detection triggered",
            Self::Http403Forbidden => "Access denied (HTTP 403)",
            Self::NetworkTimeout => "Network timeout",
            Self::Unknown => "Unknown error",
        }
    }

    /// No change of options will make the content retrievable
    pub fn is_permanent(&self) -> bool {
        matches!(self, Self::DrmProtected | Self::VideoUnavailable)
    }

    /// Credentials or cookies in the Authentication / Filesystem options may help
    pub fn credentials_might_help(&self) -> bool {
        matches!(
            self,
            Self::MembersOnly | Self::AgeRestricted | Self::PrivateVideo | Self::BotDetection
        )
    }

    /// Which options are worth changing before retrying, if any
    pub fn hint(&self) -> Option<&'static str> {
        if self.is_permanent() || *self == Self::Unknown {
            None
        } else if self.credentials_might_help() {
            Some("set Authentication credentials or Filesystem cookies")
        } else if *self == Self::GeoBlocked {
            Some("set Network proxy or GeoRestriction options")
        } else {
            Some("retry later or through a Network proxy")
        }
    }
}

pub fn severity(line: &str) -> Severity {
    let line = line.trim_start();
    if line.starts_with("ERROR:") {
        Severity::Error
    } else if line.starts_with("WARNING:") {
        Severity::Warning
    } else {
        Severity::Info
    }
}

/// Analyze an error message and return the blocking reason
pub fn diagnose_error(error: &str) -> Option<BlockingReason> {
    if error.trim().is_empty() {
        return None;
    }
    let lower = error.to_lowercase();
    let reason = PATTERNS
        .iter()
        .find(|(_, needles)| needles.iter().any(|n| lower.contains(n)))
        .map(|(reason, _)| *reason)
        .unwrap_or(BlockingReason::Unknown);
    Some(reason)
}

/// Log one stderr line at a level matching its prefix
pub fn log_stderr_line(line: &str) {
    match severity(line) {
        Severity::Error => {
            let reason = diagnose_error(line).unwrap_or(BlockingReason::Unknown);
            tracing::warn!(
                reason = reason.description(),
                permanent = reason.is_permanent(),
                hint = reason.hint().unwrap_or("-"),
                "yt-dlp: {}",
                line
            );
        }
        Severity::Warning => tracing::debug!("yt-dlp: {}", line),
        Severity::Info => tracing::trace!("yt-dlp: {}", line),
    }
}
