use std::fs::File;
use std::io;
use std::path::Path;
use std::time::Duration;

use symphonia::core::codecs::CODEC_TYPE_NULL;
use symphonia::core::errors::Error;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::units::{Time, TimeBase};

use crate::error::{ChapterError, Result};

/// Source of the total playing time of a media file.
pub trait DurationProbe {
    /// Total duration of the file at `path`, in milliseconds.
    fn probe(&self, path: &Path) -> Result<u32>;
}

/// Probes files with symphonia.
#[derive(Debug, Default, Clone, Copy)]
pub struct SymphoniaProbe;

impl DurationProbe for SymphoniaProbe {
    fn probe(&self, path: &Path) -> Result<u32> {
        duration_millis(media_duration(path)?)
    }
}

/// Converts a duration into the millisecond count stored in CHAP frames.
pub fn duration_millis(duration: Duration) -> Result<u32> {
    let millis = duration.as_millis();
    u32::try_from(millis)
        .map_err(|_| ChapterError::DurationOutOfRange(u64::try_from(millis).unwrap_or(u64::MAX)))
}

fn time_to_duration(time: Time) -> Duration {
    Duration::from_secs(time.seconds) + Duration::from_secs_f64(time.frac)
}

/// Returns the playing time of the first decodable audio track in `path`.
///
/// Uses the frame count from the container headers when present and
/// otherwise walks every packet of the track.
pub fn media_duration(path: &Path) -> Result<Duration> {
    log::info!("[0/2] Probing duration of <{}>", path.to_string_lossy());

    let src = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(src), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|ext| ext.to_str()) {
        hint.with_extension(ext);
    }

    let meta_opts: MetadataOptions = Default::default();
    let fmt_opts: FormatOptions = Default::default();

    let probed = symphonia::default::get_probe().format(&hint, mss, &fmt_opts, &meta_opts)?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or(Error::Unsupported("no supported audio tracks"))?;

    let track_id = track.id;
    let n_frames = track.codec_params.n_frames;
    let time_base = track
        .codec_params
        .time_base
        .or_else(|| track.codec_params.sample_rate.map(|rate| TimeBase::new(1, rate)))
        .ok_or(Error::Unsupported("track has no time base"))?;

    if let Some(n_frames) = n_frames {
        let duration = time_to_duration(time_base.calc_time(n_frames));
        log::info!("[2/2] Duration from headers: {:?}", duration);
        return Ok(duration);
    }

    log::info!("[1/2] No frame count in headers, scanning packets of track {}", track_id);
    let mut end_ts: u64 = 0;
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(Error::IoError(err)) if err.kind() == io::ErrorKind::UnexpectedEof => break,
            Err(err) => return Err(err.into()),
        };

        if packet.track_id() != track_id {
            continue;
        }
        end_ts = end_ts.max(packet.ts + packet.dur);
    }

    let duration = time_to_duration(time_base.calc_time(end_ts));
    log::info!("[2/2] Duration from packets: {:?}", duration);
    Ok(duration)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    /// Writes a silent 16-bit mono PCM WAV file of `samples` samples.
    fn write_wav(path: &Path, sample_rate: u32, samples: u32) {
        let data_len = samples * 2;
        let mut wav = Vec::new();
        wav.extend_from_slice(b"RIFF");
        wav.extend_from_slice(&(36 + data_len).to_le_bytes());
        wav.extend_from_slice(b"WAVE");
        wav.extend_from_slice(b"fmt ");
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

        let mut file = File::create(path).unwrap();
        file.write_all(&wav).unwrap();
    }

    #[test]
    fn millis_conversion() {
        assert_eq!(duration_millis(Duration::from_millis(30_000)).unwrap(), 30_000);
        assert_eq!(duration_millis(Duration::from_micros(1_999)).unwrap(), 1);
        assert!(matches!(
            duration_millis(Duration::from_millis(u32::MAX as u64 + 1)),
            Err(ChapterError::DurationOutOfRange(ms)) if ms == u32::MAX as u64 + 1
        ));
    }

    #[test]
    fn probes_wav_duration() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("one_second.wav");
        write_wav(&path, 8_000, 8_000);

        assert_eq!(SymphoniaProbe.probe(&path).unwrap(), 1_000);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SymphoniaProbe.probe(&dir.path().join("missing.mp3")).unwrap_err();
        assert!(matches!(err, ChapterError::Io(_)));
    }

    #[test]
    fn garbage_is_probe_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("noise.bin");
        std::fs::write(&path, b"definitely not audio").unwrap();

        let err = SymphoniaProbe.probe(&path).unwrap_err();
        assert!(matches!(err, ChapterError::Probe(_)));
    }
}
