// Configuration model: typed option categories plus their JSON codec

mod catalog;
pub mod cell;
pub mod codec;
mod rate;

use std::fs;
use std::path::Path;

use crate::downloader::errors::CodecError;

pub use catalog::{
    AudioFormat, Authentication, Download, Filesystem, General, GeoRestriction, MergeOutputFormat,
    Network, Options, PostProcessing, Subtitles, VerbositySimulation, VideoFormat, VideoSelection,
    Workarounds,
};
pub use cell::{CellDescriptor, CellValue, ConfigModel, OptionCategory, OptionType, OptionValue};
pub use rate::{ParseRateError, Rate, RateUnit};

impl Options {
    pub fn to_json(&self) -> Result<serde_json::Value, CodecError> {
        codec::serialize(self)
    }

    pub fn from_json(doc: &serde_json::Value) -> Result<Self, CodecError> {
        codec::deserialize(doc)
    }

    pub fn to_json_string(&self) -> Result<String, CodecError> {
        codec::to_string(self)
    }

    pub fn from_json_str(text: &str) -> Result<Self, CodecError> {
        codec::from_str(text)
    }

    /// Yt-dlp arguments for every present cell, in catalog order
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        for category in self.categories() {
            category.push_args(&mut args);
        }
        args
    }

    /// Write the options document, creating parent directories as needed.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), CodecError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(&self.to_json()?)?;
        fs::write(path, text)?;
        tracing::debug!(path = %path.display(), "options saved");
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CodecError> {
        let text = fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }
}
