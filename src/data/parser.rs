use chrono::NaiveDateTime;
use encoding_rs::{DecoderResult, Encoding, UTF_8};

use super::error::RecordError;
use super::model::SpectrumHeader;

/// Separator between filename fields.
pub const FILENAME_SEP: char = '-';

/// `YYYYMMDDTHHMMSS`, e.g. `20260121T143000`.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%S";

/// Minimum number of numeric tokens a file must contain.
///
/// A header plus end marker plus one sample would be 9; the instrument
/// tooling has always required 10 and files are judged against that.
pub const MIN_VALUES: usize = 10;

/// Number of leading header tokens.
const HEADER_LEN: usize = 7;

// ---------------------------------------------------------------------------
// Filename metadata
// ---------------------------------------------------------------------------

/// Acquisition metadata encoded in a measurement's filename.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilenameMetadata {
    pub timestamp: Option<NaiveDateTime>,
    pub fiber: Option<i32>,
    pub integration_time_us: Option<i64>,
}

/// Parse `<timestamp>('-' <tag>)*` from a filename stem.
///
/// Tags are order-independent: `F<digits>` is the fiber, `i<digits>` the
/// integration time in microseconds. Anything else, including `info` or
/// `Fast`, is ignored. An empty stem has no fields and yields empty metadata.
pub fn parse_filename(stem: &str) -> Result<FilenameMetadata, RecordError> {
    let mut meta = FilenameMetadata::default();
    if stem.is_empty() {
        return Ok(meta);
    }

    let mut fields = stem.split(FILENAME_SEP);
    // split() always yields at least one item for a non-empty stem
    let first = fields.next().unwrap_or_default();
    let timestamp = NaiveDateTime::parse_from_str(first, TIMESTAMP_FORMAT).map_err(|e| {
        RecordError::MalformedTimestamp {
            field: first.to_string(),
            reason: e.to_string(),
        }
    })?;
    meta.timestamp = Some(timestamp);

    for tag in fields {
        if let Some(digits) = numeric_payload(tag, 'F') {
            meta.fiber = Some(parse_tag(tag, digits)?);
        } else if let Some(digits) = numeric_payload(tag, 'i') {
            meta.integration_time_us = Some(parse_tag(tag, digits)?);
        }
    }
    Ok(meta)
}

/// The digits after `prefix`, if the rest of the tag is all ASCII digits.
fn numeric_payload(tag: &str, prefix: char) -> Option<&str> {
    tag.strip_prefix(prefix)
        .filter(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
}

/// Only fails when the digits overflow `T`.
fn parse_tag<T: std::str::FromStr>(tag: &str, digits: &str) -> Result<T, RecordError> {
    digits.parse().map_err(|_| RecordError::MalformedTag {
        tag: tag.to_string(),
    })
}

// ---------------------------------------------------------------------------
// File content
// ---------------------------------------------------------------------------

/// Header and samples decoded from a measurement file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedContent {
    pub header: SpectrumHeader,
    /// Samples between the header and the end marker; empty unless
    /// `pixel_mode == 0`.
    pub data: Vec<i32>,
}

/// Decode, clean, tokenize and assign a measurement file's content.
pub fn parse_content(bytes: &[u8], encoding: &'static Encoding) -> Result<ParsedContent, RecordError> {
    let text = decode_strict(bytes, encoding)?;
    let values = tokenize(&clean(&text))?;

    if values.len() < MIN_VALUES {
        return Err(RecordError::TooFewValues {
            found: values.len(),
        });
    }

    let last = values.len() - 1;
    let header = SpectrumHeader {
        start_of_spectrum: values[0],
        data_size_flag: values[1],
        nr_of_scans: values[2],
        integration_time_ms: values[3],
        baseline_i: values[4],
        baseline_ii: values[5],
        pixel_mode: values[6],
        end_of_spectrum: values[last],
    };

    // Only pixel mode 0 has a known sample layout.
    let data = if header.pixel_mode == 0 {
        values[HEADER_LEN..last].to_vec()
    } else {
        Vec::new()
    };

    Ok(ParsedContent { header, data })
}

/// Decode `bytes` without replacement characters; the first malformed
/// sequence is reported with its byte offset.
pub fn decode_strict(bytes: &[u8], encoding: &'static Encoding) -> Result<String, RecordError> {
    let mut decoder = encoding.new_decoder_without_bom_handling();
    let capacity = decoder
        .max_utf8_buffer_length_without_replacement(bytes.len())
        .unwrap_or(bytes.len());
    let mut text = String::with_capacity(capacity);
    let mut offset = 0;

    loop {
        let (result, read) =
            decoder.decode_to_string_without_replacement(&bytes[offset..], &mut text, true);
        offset += read;
        match result {
            DecoderResult::InputEmpty => return Ok(text),
            DecoderResult::OutputFull => text.reserve(bytes.len() - offset + 16),
            DecoderResult::Malformed(bad, extra) => {
                let position = offset - bad as usize - extra as usize;
                let byte = bytes.get(position).copied().unwrap_or_default();
                return Err(RecordError::Decode {
                    encoding: encoding.name().to_ascii_lowercase(),
                    byte,
                    position,
                    reason: malformed_reason(encoding, byte, position + bad as usize, bytes.len()),
                });
            }
        }
    }
}

/// Short cause of a malformed sequence; `end` is the offset just past it.
fn malformed_reason(encoding: &'static Encoding, byte: u8, end: usize, len: usize) -> &'static str {
    if encoding != UTF_8 {
        return "malformed sequence";
    }
    match byte {
        0x80..=0xc1 | 0xf5..=0xff => "invalid start byte",
        _ if end >= len => "unexpected end of data",
        _ => "invalid continuation byte",
    }
}

/// Drop every character that is neither an ASCII digit nor whitespace.
pub fn clean(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii_digit() || c.is_whitespace())
        .collect()
}

/// Split cleaned text on whitespace runs and parse base-10 integers.
pub fn tokenize(clean: &str) -> Result<Vec<i32>, RecordError> {
    clean
        .split_whitespace()
        .map(|tok| {
            tok.parse::<i32>().map_err(|_| RecordError::ValueOutOfRange {
                token: tok.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use encoding_rs::{UTF_8, WINDOWS_1252};

    fn numbers(n: usize) -> String {
        (1..=n).map(|i| i.to_string()).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn filename_tags_are_extracted() {
        let meta = parse_filename("20260121T143000-F2-i500").unwrap();
        let expected = NaiveDate::from_ymd_opt(2026, 1, 21)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap();
        assert_eq!(meta.timestamp, Some(expected));
        assert_eq!(meta.fiber, Some(2));
        assert_eq!(meta.integration_time_us, Some(500));
    }

    #[test]
    fn filename_tags_are_order_independent_and_unknown_ones_ignored() {
        let meta = parse_filename("20260121T143000-i750-x9-baud115200-F3").unwrap();
        assert_eq!(meta.fiber, Some(3));
        assert_eq!(meta.integration_time_us, Some(750));
    }

    #[test]
    fn filename_without_tags_has_only_timestamp() {
        let meta = parse_filename("20260121T143000").unwrap();
        assert!(meta.timestamp.is_some());
        assert_eq!(meta.fiber, None);
        assert_eq!(meta.integration_time_us, None);
    }

    #[test]
    fn empty_stem_is_a_no_op() {
        assert_eq!(parse_filename("").unwrap(), FilenameMetadata::default());
    }

    #[test]
    fn malformed_timestamp_is_reported() {
        let err = parse_filename("2026-01-21-F1").unwrap_err();
        assert!(matches!(err, RecordError::MalformedTimestamp { ref field, .. } if field == "2026"));
        assert!(parse_filename("20261321T143000-F1").is_err());
    }

    #[test]
    fn tags_without_digits_are_opaque() {
        let meta = parse_filename("20260121T143000-Fiber-F2-info-i500-iso-Fast-i-F").unwrap();
        assert_eq!(meta.fiber, Some(2));
        assert_eq!(meta.integration_time_us, Some(500));

        let meta = parse_filename("20260121T143000-i12ms-F+1").unwrap();
        assert_eq!(meta.fiber, None);
        assert_eq!(meta.integration_time_us, None);
    }

    #[test]
    fn overflowing_tag_is_reported() {
        let err = parse_filename("20260121T143000-F99999999999").unwrap_err();
        assert_eq!(
            err,
            RecordError::MalformedTag {
                tag: "F99999999999".into()
            }
        );
    }

    #[test]
    fn header_fields_are_assigned_positionally() {
        let content = "1 2 3 4 5 6 0 100 200 300 9";
        let parsed = parse_content(content.as_bytes(), UTF_8).unwrap();
        let h = parsed.header;
        assert_eq!(
            [
                h.start_of_spectrum,
                h.data_size_flag,
                h.nr_of_scans,
                h.integration_time_ms,
                h.baseline_i,
                h.baseline_ii,
                h.pixel_mode,
            ],
            [1, 2, 3, 4, 5, 6, 0]
        );
        assert_eq!(h.end_of_spectrum, 9);
        assert_eq!(parsed.data, vec![100, 200, 300]);
    }

    #[test]
    fn nine_values_are_too_few() {
        let err = parse_content(numbers(9).as_bytes(), UTF_8).unwrap_err();
        assert_eq!(err, RecordError::TooFewValues { found: 9 });
        assert_eq!(err.to_string(), "Too few values");
    }

    #[test]
    fn ten_values_are_enough() {
        let content = "1 2 3 4 5 6 0 7 8 9";
        let parsed = parse_content(content.as_bytes(), UTF_8).unwrap();
        assert_eq!(parsed.data, vec![7, 8]);
        assert_eq!(parsed.header.end_of_spectrum, 9);
    }

    #[test]
    fn noise_is_stripped_before_splitting() {
        assert_eq!(tokenize(&clean("12,34 56")).unwrap(), vec![1234, 56]);
        assert_eq!(tokenize(&clean("12, 34\t56;\r\n7")).unwrap(), vec![12, 34, 56, 7]);
        // signs and decimal points are noise too
        assert_eq!(tokenize(&clean("-5 1.5")).unwrap(), vec![5, 15]);
    }

    #[test]
    fn nonzero_pixel_mode_has_no_data() {
        let content = "1 2 3 4 5 6 1 100 200 300 400 9";
        let parsed = parse_content(content.as_bytes(), UTF_8).unwrap();
        assert_eq!(parsed.header.pixel_mode, 1);
        assert!(parsed.data.is_empty());
        assert_eq!(parsed.header.end_of_spectrum, 9);
    }

    #[test]
    fn invalid_utf8_is_a_decode_error() {
        let mut bytes = b"1 2 3 ".to_vec();
        bytes.push(0xff);
        bytes.extend_from_slice(b" 4 5 6 0 7 8 9 10");
        let err = parse_content(&bytes, UTF_8).unwrap_err();
        assert_eq!(
            err,
            RecordError::Decode {
                encoding: "utf-8".into(),
                byte: 0xff,
                position: 6,
                reason: "invalid start byte",
            }
        );
        assert_eq!(
            err.to_string(),
            "'utf-8' codec can't decode byte 0xff in position 6: invalid start byte"
        );
    }

    #[test]
    fn decode_error_names_broken_and_truncated_sequences() {
        let err = decode_strict(b"12 \xc3( 34", UTF_8).unwrap_err();
        assert!(matches!(
            err,
            RecordError::Decode { byte: 0xc3, position: 3, reason: "invalid continuation byte", .. }
        ));

        let err = decode_strict(b"12 \xc3", UTF_8).unwrap_err();
        assert!(matches!(
            err,
            RecordError::Decode { byte: 0xc3, position: 3, reason: "unexpected end of data", .. }
        ));
    }

    #[test]
    fn single_byte_encoding_accepts_high_bytes() {
        let mut bytes = b"1 2 3 4 5 6 0 7 8 ".to_vec();
        bytes.push(0xb0); // degree sign, stripped as noise
        bytes.extend_from_slice(b" 9");
        let parsed = parse_content(&bytes, WINDOWS_1252).unwrap();
        assert_eq!(parsed.data, vec![7, 8]);
    }

    #[test]
    fn oversized_token_is_out_of_range() {
        let content = "1 2 3 4 5 6 0 7 99999999999 9";
        let err = parse_content(content.as_bytes(), UTF_8).unwrap_err();
        assert!(matches!(err, RecordError::ValueOutOfRange { .. }));
    }
}
