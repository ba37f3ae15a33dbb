// Helper functions for locating yt-dlp and the options file

use std::path::PathBuf;
use std::process::Command as StdCommand;

/// Environment variable that overrides binary discovery
pub const YTDLP_PATH_ENV: &str = "YTDLP_PATH";

/// Find yt-dlp executable: `$YTDLP_PATH`, common install paths, then `which`
pub fn find_ytdlp() -> String {
    if let Ok(custom) = std::env::var(YTDLP_PATH_ENV) {
        if !custom.trim().is_empty() {
            return custom;
        }
    }

    let common_paths = [
        "/opt/homebrew/bin/yt-dlp", // Homebrew on Apple Silicon
        "/usr/local/bin/yt-dlp",    // Homebrew on Intel Mac
        "/usr/bin/yt-dlp",          // System installation
    ];

    for path in common_paths {
        if std::path::Path::new(path).exists() {
            return path.to_string();
        }
    }

    if let Ok(output) = StdCommand::new("which").arg("yt-dlp").output() {
        if output.status.success() {
            if let Ok(path) = String::from_utf8(output.stdout) {
                let trimmed = path.trim();
                if !trimmed.is_empty() {
                    return trimmed.to_string();
                }
            }
        }
    }

    // Last resort: hope it's in PATH
    "yt-dlp".to_string()
}

/// `<config dir>/ytdlp-info/options.json`, when the platform has a config dir
pub fn default_options_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("ytdlp-info").join("options.json"))
}

/// Empty or whitespace-only URLs are never handed to yt-dlp
pub fn is_blank_url(url: &str) -> bool {
    url.trim().is_empty()
}
