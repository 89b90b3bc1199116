//! FFmpeg metadata files (`;FFMETADATA1`), e.g. for building m4b audiobooks:
//!
//! ```text
//! ffmpeg -i input.flac output.m4a
//! ffmpeg -i output.m4a -i metadata.txt -map_metadata 1 -codec copy final.m4a
//! ```

use std::path::PathBuf;

use anyhow::Context;

use crate::chapters::{Chapter, TrackInfo, build_intervals};
use crate::error::Result;
use crate::temp::write_temp_file;

pub const FFMETADATA_HEADER: &str = ";FFMETADATA1\n";

/// Strips line breaks so a value can not start a new metadata line.
fn strip_line_breaks(value: &str) -> String {
    value.chars().filter(|c| !matches!(c, '\n' | '\r')).collect()
}

fn sanitize(value: &str) -> String {
    strip_line_breaks(value).trim().to_owned()
}

fn push_chapter_blocks(output: &mut String, total_ms: u32, chapters: &[Chapter]) -> Result<()> {
    for interval in build_intervals(chapters, total_ms)? {
        output.push_str(&format!(
            "\n[CHAPTER]\nTIMEBASE=1/1000\nSTART={}\nEND={}\ntitle={}\n",
            interval.start_ms,
            interval.end_ms,
            strip_line_breaks(&interval.title),
        ));
    }
    Ok(())
}

/// FFmetadata holding only the chapters.
///
/// Without chapters only the header line is returned.
pub fn chapters_txt(total_ms: u32, chapters: &[Chapter]) -> Result<String> {
    let mut output = String::from(FFMETADATA_HEADER);
    push_chapter_blocks(&mut output, total_ms, chapters)?;
    Ok(output)
}

/// FFmetadata holding the global fields of `track` followed by its chapters.
pub fn ffmetadata(total_ms: u32, track: &TrackInfo) -> Result<String> {
    let mut chapters = String::new();
    push_chapter_blocks(&mut chapters, total_ms, &track.chapters)?;

    let copyright = if track.copyright.trim().is_empty() {
        let year = track
            .date
            .map(|date| date.format("%Y").to_string())
            .unwrap_or_else(|| track.year.trim().to_owned());
        if year.is_empty() {
            String::new()
        } else {
            format!("Copyright {} {}", year, track.artist)
        }
    } else {
        track.copyright.clone()
    };
    let date = track
        .date
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_default();

    let fields: [(&str, &str); 10] = [
        ("title", &track.title),
        ("album", &track.album),
        ("artist", &track.artist),
        ("genre", &track.genre),
        ("track", &track.track),
        ("comment", &track.comment),
        ("language", &track.language),
        ("description", &track.description),
        ("copyright", &copyright),
        ("date", &date),
    ];

    let mut output = String::from(FFMETADATA_HEADER);
    for (key, value) in fields {
        let value = sanitize(value);
        if !value.is_empty() {
            output.push_str(&format!("{}={}\n", key, value));
        }
    }
    output.push_str(&chapters);
    Ok(output)
}

/// Writes [`chapters_txt`] to a new `*-chapters.txt` temporary file.
pub fn write_chapters_txt(total_ms: u32, chapters: &[Chapter]) -> anyhow::Result<PathBuf> {
    let txt = chapters_txt(total_ms, chapters).context("Failed to generate chapters.txt")?;
    write_temp_file("-chapters.txt", txt.as_bytes())
}

/// Writes [`ffmetadata`] to a new `*-ffmetadata.txt` temporary file.
pub fn write_ffmetadata_file(total_ms: u32, track: &TrackInfo) -> anyhow::Result<PathBuf> {
    let txt = ffmetadata(total_ms, track).context("Failed to generate ffmetadata")?;
    let path = write_temp_file("-ffmetadata.txt", txt.as_bytes())?;
    log::debug!("Wrote ffmetadata to {}", path.display());
    Ok(path)
}
