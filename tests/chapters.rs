use std::fs;
use std::path::{Path, PathBuf};

use chaptermark::{
    ChapterError, Id3Tag, TrackInfo, add_chap_and_ctoc, chapters_txt, write_chapters_txt,
    write_ffmetadata_file, write_id3v2_tag,
};

fn testdata(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("testdata")
        .join(name)
}

fn track() -> TrackInfo {
    TrackInfo::from_json_file(testdata("track.json")).unwrap()
}

#[test]
fn chapters_txt_matches_testdata() {
    let expected = fs::read_to_string(testdata("chapters.txt")).unwrap();
    assert_eq!(chapters_txt(30_000, &track().chapters).unwrap(), expected);

    let path = write_chapters_txt(30_000, &track().chapters).unwrap();
    let written = fs::read_to_string(&path).unwrap();
    fs::remove_file(&path).unwrap();
    assert_eq!(written, expected);
}

#[test]
fn ffmetadata_file_matches_testdata() {
    let path = write_ffmetadata_file(30_000, &track()).unwrap();
    let written = fs::read(&path).unwrap();
    fs::remove_file(&path).unwrap();

    assert_eq!(written, fs::read(testdata("ffmetadata.txt")).unwrap());
}

#[test]
fn chap_frames_for_sample_track() {
    let mut tag = Id3Tag::new();
    tag.set_artist("John Doe");
    tag.set_title("Test Title");
    tag.set_album("Hello World");
    add_chap_and_ctoc(30_000, &mut tag, &track().chapters).unwrap();

    let frames = tag.frames();
    assert_eq!(frames.len(), 7);

    let (id, body) = &frames[3];
    assert_eq!(id, b"CHAP");
    let mut expected = b"1\0".to_vec();
    expected.extend_from_slice(&0u32.to_be_bytes());
    expected.extend_from_slice(&10_000u32.to_be_bytes());
    expected.extend_from_slice(&[0xFF; 8]);
    expected.extend_from_slice(b"TIT2\x00\x00\x00\x15\x00\x00\x01\xFF\xFE");
    for c in "Chapter 1".bytes() {
        expected.extend_from_slice(&[c, 0x00]);
    }
    assert_eq!(body, &expected);

    let (id, body) = &frames[6];
    assert_eq!(id, b"CTOC");
    assert_eq!(body, b"toc\0\x01\x00\x031\x002\x003\x00");
}

#[test]
fn malformed_start_yields_nothing() {
    let mut info = track();
    info.chapters[1].start = "10:99".to_owned();

    let mut tag = Id3Tag::new();
    let err = add_chap_and_ctoc(30_000, &mut tag, &info.chapters).unwrap_err();
    assert!(matches!(err, ChapterError::MalformedTimeCode(ref s) if s == "10:99"));
    assert!(tag.frames().is_empty());

    assert!(write_ffmetadata_file(30_000, &info).is_err());
}

fn write_silent_wav(path: &Path, sample_rate: u32, seconds: u32) {
    let data_len = sample_rate * seconds * 2;
    let mut wav = Vec::new();
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&(36 + data_len).to_le_bytes());
    wav.extend_from_slice(b"WAVEfmt ");
    wav.extend_from_slice(&16u32.to_le_bytes());
    wav.extend_from_slice(&1u16.to_le_bytes());
    wav.extend_from_slice(&1u16.to_le_bytes());
    wav.extend_from_slice(&sample_rate.to_le_bytes());
    wav.extend_from_slice(&(sample_rate * 2).to_le_bytes());
    wav.extend_from_slice(&2u16.to_le_bytes());
    wav.extend_from_slice(&16u16.to_le_bytes());
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&data_len.to_le_bytes());
    wav.resize(wav.len() + data_len as usize, 0);
    fs::write(path, wav).unwrap();
}

#[test]
fn tags_file_with_probed_duration() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("episode.wav");
    write_silent_wav(&path, 8_000, 30);
    let audio = fs::read(&path).unwrap();

    write_id3v2_tag(&path, &track()).unwrap();

    let written = fs::read(&path).unwrap();
    assert_eq!(&written[..5], b"ID3\x04\x00");
    assert!(written.ends_with(&audio));

    // Last chapter ends at the probed 30 s.
    let ctoc = written
        .windows(4)
        .position(|w| w == b"CTOC")
        .expect("CTOC frame");
    let last_chap = written[..ctoc]
        .windows(6)
        .rposition(|w| w == b"CHAP\x00\x00")
        .expect("CHAP frame");
    let body = &written[last_chap + 10..];
    assert_eq!(&body[..2], b"3\0");
    assert_eq!(&body[2..6], &20_500u32.to_be_bytes());
    assert_eq!(&body[6..10], &30_000u32.to_be_bytes());
}
