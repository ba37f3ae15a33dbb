// Metadata records parsed from yt-dlp JSON output

use serde::{Deserialize, Deserializer, Serialize};

/// Kind of document yt-dlp emitted (`_type`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    #[default]
    Video,
    Playlist,
    MultiVideo,
    /// Unresolved entry of a flat playlist
    Url,
    UrlTransparent,
    /// Any `_type` this crate does not model
    #[serde(other)]
    Unknown,
}

/// Format details from yt-dlp
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatInfo {
    /// Format ID (e.g., "137", "140")
    pub format_id: String,
    /// File extension (mp4, webm, m4a)
    pub ext: String,
    pub resolution: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub fps: Option<f32>,
    /// Video codec (avc1, vp9, av01, none)
    pub vcodec: Option<String>,
    /// Audio codec (mp4a, opus, none)
    pub acodec: Option<String>,
    /// Bytes; some extractors report fractional estimates
    pub filesize: Option<f64>,
    /// Approximate file size (when exact is unknown)
    pub filesize_approx: Option<f64>,
    /// Total bitrate in kbps
    pub tbr: Option<f32>,
    pub format_note: Option<String>,
}

impl FormatInfo {
    /// Get effective file size (exact or approximate)
    pub fn effective_size(&self) -> Option<u64> {
        self.filesize
            .or(self.filesize_approx)
            .filter(|size| size.is_finite() && *size >= 0.0)
            .map(|size| size.round() as u64)
    }

    pub fn has_video(&self) -> bool {
        self.vcodec.as_deref().is_some_and(|v| v != "none")
    }

    pub fn has_audio(&self) -> bool {
        self.acodec.as_deref().is_some_and(|a| a != "none")
    }

    pub fn is_video_only(&self) -> bool {
        self.has_video() && !self.has_audio()
    }

    pub fn is_audio_only(&self) -> bool {
        self.has_audio() && !self.has_video()
    }
}

/// One JSON document from yt-dlp: a video, or a playlist with its entries.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InfoRecord {
    #[serde(rename = "_type")]
    pub kind: RecordKind,
    pub id: String,
    pub title: Option<String>,
    pub uploader: Option<String>,
    /// Seconds
    pub duration: Option<f64>,
    pub thumbnail: Option<String>,
    pub webpage_url: Option<String>,
    /// Flat entries only carry `url`
    pub url: Option<String>,
    pub extractor: Option<String>,
    #[serde(deserialize_with = "present_only")]
    pub formats: Vec<FormatInfo>,
    /// yt-dlp writes `null` for entries it failed to extract under
    /// `--ignore-errors`; those are dropped
    #[serde(deserialize_with = "present_only")]
    pub entries: Vec<InfoRecord>,
    /// The document as received, for fields not modelled above
    #[serde(skip)]
    pub raw: serde_json::Value,
}

/// A list that may be `null` or contain `null` items
fn present_only<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let items: Option<Vec<Option<T>>> = Option::deserialize(deserializer)?;
    Ok(items.unwrap_or_default().into_iter().flatten().collect())
}

impl InfoRecord {
    /// Parse one output line. Anything that is not a JSON object yields `None`.
    pub fn parse_line(line: &str) -> Option<Self> {
        let line = line.trim();
        if !line.starts_with('{') {
            return None;
        }
        let raw: serde_json::Value = match serde_json::from_str(line) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::debug!(error = %e, "skipping unparsable output line");
                return None;
            }
        };
        match serde_json::from_value::<InfoRecord>(raw.clone()) {
            Ok(mut record) => {
                record.raw = raw;
                Some(record)
            }
            Err(e) => {
                tracing::debug!(error = %e, "output line is not an info document");
                None
            }
        }
    }

    pub fn is_playlist(&self) -> bool {
        matches!(self.kind, RecordKind::Playlist | RecordKind::MultiVideo)
    }

    /// Duration formatted as m:ss
    pub fn duration_label(&self) -> Option<String> {
        let secs = self.duration? as i64;
        Some(format!("{}:{:02}", secs / 60, secs % 60))
    }
}

/// Result of one retrieval: a single document, or several in arrival order.
///
/// Both shapes answer the same accessors, so callers that expect one record
/// can consume an aggregate unchanged.
#[derive(Debug, Clone, PartialEq)]
pub enum DownloadInfo {
    Single(InfoRecord),
    Multiple(Vec<InfoRecord>),
}

impl DownloadInfo {
    /// `None` for an empty list; one record stays unwrapped.
    pub fn from_records(mut records: Vec<InfoRecord>) -> Option<Self> {
        match records.len() {
            0 => None,
            1 => records.pop().map(Self::Single),
            _ => Some(Self::Multiple(records)),
        }
    }

    pub fn records(&self) -> &[InfoRecord] {
        match self {
            Self::Single(record) => std::slice::from_ref(record),
            Self::Multiple(records) => records,
        }
    }

    pub fn len(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records().is_empty()
    }

    /// Title of the first record
    pub fn title(&self) -> Option<&str> {
        self.records().first().and_then(|r| r.title.as_deref())
    }

    /// Every video reachable from this result, playlist entries flattened
    pub fn videos(&self) -> Vec<&InfoRecord> {
        fn collect<'a>(record: &'a InfoRecord, out: &mut Vec<&'a InfoRecord>) {
            if record.is_playlist() || !record.entries.is_empty() {
                for entry in &record.entries {
                    collect(entry, out);
                }
            } else {
                out.push(record);
            }
        }

        let mut out = Vec::new();
        for record in self.records() {
            collect(record, &mut out);
        }
        out
    }
}
