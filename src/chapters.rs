use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{ChapterError, Result};
use crate::timecode::parse_millis;

#[derive(Clone, Debug, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct Chapter {
    #[serde(default)]
    pub title: String,
    /// Start of the chapter, e.g. `"00:05:00.500"`.
    #[serde(default)]
    pub start: String,
}

impl Chapter {
    pub fn new(title: impl Into<String>, start: impl Into<String>) -> Self {
        Chapter {
            title: title.into(),
            start: start.into(),
        }
    }
}

/// Everything written to a track: text fields, cover art and chapters.
///
/// Empty fields are skipped by the writers.
#[derive(Clone, Debug, Deserialize, Serialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct TrackInfo {
    pub title: String,
    pub album: String,
    pub artist: String,
    pub genre: String,
    pub year: String,
    /// Release date, `YYYY-MM-DD` in the manifest.
    pub date: Option<NaiveDate>,
    pub track: String,
    pub comment: String,
    pub description: String,
    pub language: String,
    pub copyright: String,
    #[serde(rename = "coverJPEG")]
    pub cover_jpeg: Option<PathBuf>,
    pub chapters: Vec<Chapter>,
}

impl TrackInfo {
    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        let info = serde_json::from_str(json).context("Failed to parse track info")?;
        Ok(info)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let json = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read {}", path.as_ref().display()))?;
        Self::from_json_str(&json)
            .with_context(|| format!("Invalid track info in {}", path.as_ref().display()))
    }

    pub fn has_chapters(&self) -> bool {
        !self.chapters.is_empty()
    }
}

/// A chapter with resolved boundaries, in milliseconds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChapterInterval {
    pub element_id: String,
    pub start_ms: u32,
    pub end_ms: u32,
    pub title: String,
}

/// Resolves each chapter's `[start, end)` range.
///
/// The end of a chapter is the start of the next one and the last chapter
/// ends at `total_ms`. Element IDs are the 1-based positions in `chapters`.
/// Start times are not required to be increasing.
pub fn build_intervals(chapters: &[Chapter], total_ms: u32) -> Result<Vec<ChapterInterval>> {
    if chapters.is_empty() {
        return Ok(Vec::new());
    }
    if total_ms == 0 {
        return Err(ChapterError::ZeroDuration);
    }

    let starts = chapters
        .iter()
        .map(|chapter| parse_millis(&chapter.start))
        .collect::<Result<Vec<_>>>()?;

    let intervals = chapters
        .iter()
        .enumerate()
        .map(|(i, chapter)| ChapterInterval {
            element_id: (i + 1).to_string(),
            start_ms: starts[i],
            end_ms: starts.get(i + 1).copied().unwrap_or(total_ms),
            title: chapter.title.clone(),
        })
        .collect();

    Ok(intervals)
}
