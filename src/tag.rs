use std::fs::{self, File};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::NamedTempFile;

use crate::chapters::TrackInfo;
use crate::frames::{APIC, FrameId, TALB, TCON, TDRC, TIT2, TPE1, add_chap_and_ctoc};
use crate::sound::{DurationProbe, SymphoniaProbe};

const HEADER_LEN: u64 = 10;
const FOOTER_FLAG: u8 = 0x10;
const ENCODING_ISO_8859_1: u8 = 0x00;
const ENCODING_UTF8: u8 = 0x03;
const PICTURE_FRONT_COVER: u8 = 0x03;
const SYNCHSAFE_MAX: usize = (1 << 28) - 1;

/// Something that collects raw frames and writes them back to a media file.
pub trait TagContainer {
    fn add_record(&mut self, id: FrameId, body: Vec<u8>);

    fn save(&mut self) -> Result<()>;
}

/// A write-only ID3v2.4 tag.
///
/// Existing frames in the file are not parsed: opening a file only records
/// where its audio starts, and saving replaces the whole tag.
#[derive(Debug, Default)]
pub struct Id3Tag {
    path: Option<PathBuf>,
    audio_offset: u64,
    frames: Vec<(FrameId, Vec<u8>)>,
}

impl Id3Tag {
    /// An empty tag not bound to any file.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut file =
            File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;

        Ok(Id3Tag {
            path: Some(path.to_path_buf()),
            audio_offset: existing_tag_len(&mut file)?,
            frames: Vec::new(),
        })
    }

    pub fn frames(&self) -> &[(FrameId, Vec<u8>)] {
        &self.frames
    }

    /// Sets a UTF-8 text frame, replacing any previous frame with the same ID.
    pub fn set_text(&mut self, id: FrameId, text: &str) {
        self.frames.retain(|(frame_id, _)| *frame_id != id);

        let mut body = Vec::with_capacity(1 + text.len());
        body.push(ENCODING_UTF8);
        body.extend_from_slice(text.as_bytes());
        self.frames.push((id, body));
    }

    pub fn set_title(&mut self, title: &str) {
        self.set_text(TIT2, title);
    }

    pub fn set_album(&mut self, album: &str) {
        self.set_text(TALB, album);
    }

    pub fn set_artist(&mut self, artist: &str) {
        self.set_text(TPE1, artist);
    }

    pub fn set_genre(&mut self, genre: &str) {
        self.set_text(TCON, genre);
    }

    pub fn set_year(&mut self, year: &str) {
        self.set_text(TDRC, year);
    }

    pub fn add_attached_picture(&mut self, mime_type: &str, description: &str, picture: &[u8]) {
        let mut body = Vec::with_capacity(mime_type.len() + description.len() + picture.len() + 4);
        body.push(ENCODING_ISO_8859_1);
        body.extend_from_slice(mime_type.as_bytes());
        body.push(0x00);
        body.push(PICTURE_FRONT_COVER);
        body.extend_from_slice(description.as_bytes());
        body.push(0x00);
        body.extend_from_slice(picture);
        self.add_record(APIC, body);
    }

    /// Serializes the header and every frame.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut frames = Vec::new();
        for (id, body) in &self.frames {
            frames.extend_from_slice(id);
            frames.extend_from_slice(&synchsafe(body.len()).with_context(|| {
                format!("{} frame is too large", String::from_utf8_lossy(id))
            })?);
            frames.extend_from_slice(&[0x00, 0x00]);
            frames.extend_from_slice(body);
        }

        let mut tag = Vec::with_capacity(HEADER_LEN as usize + frames.len());
        tag.extend_from_slice(b"ID3");
        tag.extend_from_slice(&[0x04, 0x00, 0x00]);
        tag.extend_from_slice(&synchsafe(frames.len()).context("tag is too large")?);
        tag.extend_from_slice(&frames);
        Ok(tag)
    }
}

impl TagContainer for Id3Tag {
    fn add_record(&mut self, id: FrameId, body: Vec<u8>) {
        self.frames.push((id, body));
    }

    /// Rewrites the file as the new tag followed by the original audio.
    fn save(&mut self) -> Result<()> {
        let path = self
            .path
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("Tag is not bound to a file"))?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let tag = self.to_bytes()?;
        let mut src =
            File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        src.seek(SeekFrom::Start(self.audio_offset))?;

        let mut out = NamedTempFile::new_in(dir)
            .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
        out.write_all(&tag)?;
        io::copy(&mut src, &mut out)?;
        out.as_file()
            .set_permissions(src.metadata()?.permissions())
            .with_context(|| format!("Failed to keep permissions of {}", path.display()))?;
        out.persist(path)
            .with_context(|| format!("Failed to replace {}", path.display()))?;

        log::info!("Wrote {} frames to {}", self.frames.len(), path.display());
        Ok(())
    }
}

/// Length of the ID3v2 tag at the start of `file`, or 0 when there is none.
fn existing_tag_len(file: &mut File) -> Result<u64> {
    let mut header = [0u8; HEADER_LEN as usize];
    match file.read_exact(&mut header) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => return Ok(0),
        Err(err) => return Err(err.into()),
    }
    if &header[..3] != b"ID3" || header[6..].iter().any(|b| b & 0x80 != 0) {
        return Ok(0);
    }

    let size = header[6..]
        .iter()
        .fold(0u64, |acc, b| (acc << 7) | u64::from(*b));
    let footer = if header[5] & FOOTER_FLAG != 0 { HEADER_LEN } else { 0 };
    Ok(HEADER_LEN + size + footer)
}

fn synchsafe(len: usize) -> Option<[u8; 4]> {
    if len > SYNCHSAFE_MAX {
        return None;
    }
    let len = len as u32;
    Some([
        (len >> 21) as u8 & 0x7F,
        (len >> 14) as u8 & 0x7F,
        (len >> 7) as u8 & 0x7F,
        len as u8 & 0x7F,
    ])
}

/// Adds the JPEG at `jpeg_path` as the front cover.
pub fn add_cover_jpeg(tag: &mut Id3Tag, jpeg_path: impl AsRef<Path>) -> Result<()> {
    let img = fs::read(jpeg_path.as_ref())
        .with_context(|| format!("Failed to read cover {}", jpeg_path.as_ref().display()))?;
    tag.add_attached_picture("image/jpeg", "Cover", &img);
    Ok(())
}

/// Writes title, album, artist, genre, year, cover and chapters of `input`
/// into the ID3v2.4 tag of `path`. Empty fields are left out.
pub fn write_id3v2_tag(path: impl AsRef<Path>, input: &TrackInfo) -> Result<()> {
    write_id3v2_tag_with(path, input, &SymphoniaProbe)
}

pub fn write_id3v2_tag_with<P: DurationProbe + ?Sized>(
    path: impl AsRef<Path>,
    input: &TrackInfo,
    probe: &P,
) -> Result<()> {
    let path = path.as_ref();
    let total_ms = probe
        .probe(path)
        .with_context(|| format!("Failed to read duration of {}", path.display()))?;

    let mut tag = Id3Tag::open(path)?;

    let text_fields = [
        (TIT2, &input.title),
        (TALB, &input.album),
        (TPE1, &input.artist),
        (TCON, &input.genre),
        (TDRC, &input.year),
    ];
    for (id, value) in text_fields {
        if !value.is_empty() {
            tag.set_text(id, value);
        }
    }

    if let Some(cover) = input.cover_jpeg.as_ref().filter(|p| !p.as_os_str().is_empty()) {
        add_cover_jpeg(&mut tag, cover)?;
    }

    // On error the tag is dropped without being saved.
    add_chap_and_ctoc(total_ms, &mut tag, &input.chapters)
        .with_context(|| format!("Failed to add chapters to {}", path.display()))?;

    tag.save()
}
