use std::sync::LazyLock;

use regex::Regex;

use crate::error::{ChapterError, Result};

struct TimeCodeFormat {
    pattern: Regex,
    // Milliseconds represented by one unit of the fractional group.
    frac_unit_ms: u32,
}

impl TimeCodeFormat {
    fn new(pattern: &str, frac_unit_ms: u32) -> Self {
        TimeCodeFormat {
            pattern: Regex::new(pattern).expect("time-code pattern is valid"),
            frac_unit_ms,
        }
    }

    fn parse(&self, text: &str) -> Option<u32> {
        let caps = self.pattern.captures(text)?;
        let field = |i: usize| -> Option<u32> {
            caps.get(i).map_or(Some(0), |m| m.as_str().parse::<u32>().ok())
        };

        let hours = field(1)?;
        let minutes = field(2)?;
        let seconds = field(3)?;
        let frac = field(4)?;

        if hours > 23 || minutes > 59 || seconds > 59 {
            return None;
        }

        Some(hours * 3_600_000 + minutes * 60_000 + seconds * 1_000 + frac * self.frac_unit_ms)
    }
}

/// Accepted formats, in priority order. The first one that matches wins.
static FORMATS: LazyLock<[TimeCodeFormat; 3]> = LazyLock::new(|| {
    [
        // HH:MM:SS.mmm
        TimeCodeFormat::new(r"^([0-9]{1,2}):([0-9]{2}):([0-9]{2})\.([0-9]{3})$", 1),
        // HH:MM:SS.m
        TimeCodeFormat::new(r"^([0-9]{1,2}):([0-9]{2}):([0-9]{2})\.([0-9])$", 100),
        // HH:MM:SS
        TimeCodeFormat::new(r"^([0-9]{1,2}):([0-9]{2}):([0-9]{2})$", 0),
    ]
});

/// Parses a chapter start such as `"00:05:00.500"` into milliseconds.
///
/// Hours may be written with one or two digits and must be below 24, so the
/// result always fits in a `u32`.
pub fn parse_millis(text: &str) -> Result<u32> {
    FORMATS
        .iter()
        .find_map(|format| format.parse(text))
        .ok_or_else(|| ChapterError::MalformedTimeCode(text.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_each_format() {
        assert_eq!(parse_millis("00:00:00.000").unwrap(), 0);
        assert_eq!(parse_millis("01:02:03.456").unwrap(), 3_723_456);
        assert_eq!(parse_millis("00:00:20.5").unwrap(), 20_500);
        assert_eq!(parse_millis("00:00:10").unwrap(), 10_000);
        assert_eq!(parse_millis("1:00:00").unwrap(), 3_600_000);
        assert_eq!(parse_millis("23:59:59.999").unwrap(), 86_399_999);
    }

    #[test]
    fn parsing_is_deterministic() {
        for text in ["00:05:00.500", "12:34:56.7", "02:00:00"] {
            assert_eq!(parse_millis(text).unwrap(), parse_millis(text).unwrap());
        }
    }

    #[test]
    fn rejects_malformed() {
        for text in [
            "10:99",
            "",
            "00:00",
            "00:00:10.50",
            "00:00:10.",
            "00:00:10.1234",
            "00:60:00",
            "00:00:60",
            "24:00:00",
            "100:00:00",
            " 00:00:10",
            "aa:bb:cc",
        ] {
            match parse_millis(text) {
                Err(ChapterError::MalformedTimeCode(s)) => assert_eq!(s, text),
                other => panic!("{text:?} should be malformed, got {other:?}"),
            }
        }
    }
}
