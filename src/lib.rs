/*

Chapters for audio files, as ID3v2.4 CHAP/CTOC frames or as FFmpeg metadata.

{
  "title": "Hello world",
  "artist": "Universe",
  "date": "2024-09-17",
  "chapters": [
    { "title": "Chapter 1", "start": "00:00:00.000" },
    { "title": "Chapter 2", "start": "00:00:10" },
    { "title": "Chapter 3", "start": "00:00:20.5" }
  ]
}

*/

pub mod chapters;
pub mod error;
pub mod ffmetadata;
pub mod frames;
pub mod sound;
pub mod tag;
pub mod temp;
pub mod timecode;

pub use chapters::{Chapter, ChapterInterval, TrackInfo, build_intervals};
pub use error::ChapterError;
pub use ffmetadata::{chapters_txt, ffmetadata, write_chapters_txt, write_ffmetadata_file};
pub use frames::{add_chap_and_ctoc, chap_frame, ctoc_frame, text_frame};
pub use sound::{DurationProbe, SymphoniaProbe};
pub use tag::{Id3Tag, TagContainer, add_cover_jpeg, write_id3v2_tag, write_id3v2_tag_with};
pub use timecode::parse_millis;
