//! Binary bodies of the ID3v2.4 frames used for chapters.
//!
//! All integers are big-endian and identifiers are NUL-terminated ASCII.

use crate::chapters::{Chapter, ChapterInterval, build_intervals};
use crate::error::{ChapterError, Result};
use crate::tag::TagContainer;

pub type FrameId = [u8; 4];

pub const CHAP: FrameId = *b"CHAP";
pub const CTOC: FrameId = *b"CTOC";
pub const TIT2: FrameId = *b"TIT2";
pub const TALB: FrameId = *b"TALB";
pub const TPE1: FrameId = *b"TPE1";
pub const TCON: FrameId = *b"TCON";
pub const TDRC: FrameId = *b"TDRC";
pub const APIC: FrameId = *b"APIC";

/// Element ID of the top-level table of contents.
pub const TOC_ELEMENT_ID: &str = "toc";

const ENCODING_UTF16_BOM: u8 = 0x01;
const BOM_LE: [u8; 2] = [0xFF, 0xFE];
const OFFSET_UNSPECIFIED: [u8; 4] = [0xFF; 4];
// Flags byte 0x01, second byte always zero.
const CTOC_FLAGS: [u8; 2] = [0x01, 0x00];

/// Encodes a title as a UTF-16 text payload with a byte order mark.
///
/// Only the low byte of each character is kept, so characters above U+00FF
/// come out wrong. Existing tags were written this way.
pub fn text_frame(text: &str) -> Vec<u8> {
    let mut frame = Vec::with_capacity(3 + 2 * text.len());
    frame.push(ENCODING_UTF16_BOM);
    frame.extend_from_slice(&BOM_LE);
    for c in text.chars() {
        frame.push(c as u32 as u8);
        frame.push(0x00);
    }
    frame
}

/// Body of the `CHAP` frame for one interval, with an embedded `TIT2` sub-frame.
pub fn chap_frame(interval: &ChapterInterval) -> Vec<u8> {
    let title = text_frame(&interval.title);

    let mut body = Vec::with_capacity(interval.element_id.len() + 27 + title.len());
    push_id(&mut body, &interval.element_id);
    body.extend_from_slice(&interval.start_ms.to_be_bytes());
    body.extend_from_slice(&interval.end_ms.to_be_bytes());
    body.extend_from_slice(&OFFSET_UNSPECIFIED);
    body.extend_from_slice(&OFFSET_UNSPECIFIED);

    body.extend_from_slice(&TIT2);
    body.extend_from_slice(&(title.len() as u32).to_be_bytes());
    body.extend_from_slice(&[0x00, 0x00]);
    body.extend_from_slice(&title);
    body
}

/// Body of the top-level `CTOC` frame listing `element_ids` in order.
pub fn ctoc_frame<S: AsRef<str>>(element_ids: &[S]) -> Result<Vec<u8>> {
    let count = u8::try_from(element_ids.len())
        .map_err(|_| ChapterError::TooManyChapters(element_ids.len()))?;

    let mut body = Vec::new();
    push_id(&mut body, TOC_ELEMENT_ID);
    body.extend_from_slice(&CTOC_FLAGS);
    body.push(count);
    for id in element_ids {
        push_id(&mut body, id.as_ref());
    }
    Ok(body)
}

fn push_id(body: &mut Vec<u8>, id: &str) {
    body.extend_from_slice(id.as_bytes());
    body.push(0x00);
}

/// Encodes every `CHAP` frame and the `CTOC` frame for `chapters`.
///
/// Returns nothing for an empty chapter list.
pub fn chapter_frames(total_ms: u32, chapters: &[Chapter]) -> Result<Vec<(FrameId, Vec<u8>)>> {
    let intervals = build_intervals(chapters, total_ms)?;
    if intervals.is_empty() {
        return Ok(Vec::new());
    }

    let mut frames: Vec<_> = intervals
        .iter()
        .map(|interval| (CHAP, chap_frame(interval)))
        .collect();
    let ids: Vec<&str> = intervals.iter().map(|iv| iv.element_id.as_str()).collect();
    frames.push((CTOC, ctoc_frame(&ids)?));

    log::debug!("Encoded {} CHAP frames and one CTOC frame", intervals.len());
    Ok(frames)
}

/// Adds each `CHAP` and a final `CTOC` frame to `tag`.
///
/// Every frame is encoded before the first one is added, so `tag` is left
/// untouched when an error is returned.
pub fn add_chap_and_ctoc<T: TagContainer + ?Sized>(
    total_ms: u32,
    tag: &mut T,
    chapters: &[Chapter],
) -> Result<()> {
    for (id, body) in chapter_frames(total_ms, chapters)? {
        tag.add_record(id, body);
    }
    Ok(())
}
