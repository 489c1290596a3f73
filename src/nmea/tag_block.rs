//! Receiver tag blocks (NMEA 4.x `\...\` prefix).
//!
//! A tag block is a comma separated list of `key:value` pairs, optionally followed by a
//! `*hh` checksum, enclosed between two backslashes:
//!
//! ```text
//! \s:rEV02,c:1334337326*5A\!AIVDM,1,1,,B,18JSad001i5gcaArTICimQTT068t,0*4A
//! ```
//!
//! Recognized keys
//! -----------------
//! * `s` – Source / receiving station identifier.
//! * `c` – UNIX capture time. Seconds, or milliseconds when written with 13 digits or more.
//! * `g` – Sentence group `index-count-id` linking several tagged lines.
//!
//! Every other key is kept verbatim in [`TagBlock::extra`].
use nom::{
    bytes::complete::{is_not, take_until, take_while1, take_while_m_n},
    character::complete::char,
    combinator::{all_consuming, opt},
    multi::separated_list1,
    sequence::{delimited, preceded, separated_pair},
    IResult,
};

use crate::{
    ais_errors::AisError,
    constants::{EpochMillis, MILLIS_PER_SECOND, MILLIS_TIMESTAMP_DIGITS},
    nmea::checksum,
};

/// Sentence grouping information (`g:` key).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentenceGroup {
    pub index: u32,
    pub count: u32,
    pub id: u32,
}

/// Parsed tag block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagBlock {
    /// Receiving station (`s:`).
    pub source: Option<String>,
    /// Capture time normalized to epoch milliseconds (`c:`).
    pub time: Option<EpochMillis>,
    /// Sentence group (`g:`).
    pub group: Option<SentenceGroup>,
    /// Unrecognized pairs, in order of appearance.
    pub extra: Vec<(String, String)>,
}

/// `\content\` framing; returns the raw content and the rest of the line.
fn framed(input: &str) -> IResult<&str, &str> {
    delimited(char('\\'), take_until("\\"), char('\\'))(input)
}

fn pair(input: &str) -> IResult<&str, (&str, &str)> {
    separated_pair(
        take_while1(|c: char| c.is_ascii_alphanumeric()),
        char(':'),
        is_not(",*"),
    )(input)
}

/// `k:v,k:v[*hh]`
fn content(input: &str) -> IResult<&str, (Vec<(&str, &str)>, Option<&str>)> {
    let (input, pairs) = separated_list1(char(','), pair)(input)?;
    let (input, hex) = opt(preceded(
        char('*'),
        take_while_m_n(2, 2, |c: char| c.is_ascii_hexdigit()),
    ))(input)?;
    Ok((input, (pairs, hex)))
}

fn parse_time(value: &str) -> Result<EpochMillis, AisError> {
    let raw: i64 = value
        .parse()
        .map_err(|_| AisError::MalformedSentence(format!("invalid tag block time: {value}")))?;
    if value.trim_start_matches('-').len() >= MILLIS_TIMESTAMP_DIGITS {
        Ok(raw)
    } else {
        Ok(raw * MILLIS_PER_SECOND)
    }
}

fn parse_group(value: &str) -> Result<SentenceGroup, AisError> {
    let mut parts = value.splitn(3, '-').map(str::parse::<u32>);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(Ok(index)), Some(Ok(count)), Some(Ok(id))) => Ok(SentenceGroup { index, count, id }),
        _ => Err(AisError::MalformedSentence(format!(
            "invalid tag block group: {value}"
        ))),
    }
}

impl TagBlock {
    /// Split a leading tag block from `line`.
    ///
    /// Arguments
    /// -----------------
    /// * `line` – A raw input line starting with `\`.
    ///
    /// Return
    /// ----------
    /// * `(rest, tag_block)` where `rest` is the remainder of the line after the closing `\`,
    ///   or [`AisError::MalformedSentence`] / [`AisError::ChecksumMismatch`].
    pub fn split(line: &str) -> Result<(&str, TagBlock), AisError> {
        let (rest, raw) = framed(line)
            .map_err(|_| AisError::MalformedSentence(format!("unterminated tag block: {line}")))?;
        Ok((rest, TagBlock::parse(raw)?))
    }

    /// Parse the content of a tag block (without the surrounding backslashes).
    pub fn parse(raw: &str) -> Result<TagBlock, AisError> {
        let (_, (pairs, hex)) = all_consuming(content)(raw)
            .map_err(|_| AisError::MalformedSentence(format!("invalid tag block: {raw}")))?;

        if let Some(hex) = hex {
            let expected = u8::from_str_radix(hex, 16)
                .map_err(|_| AisError::MalformedSentence(format!("invalid checksum: {hex}")))?;
            let body = raw.rsplit_once('*').map_or(raw, |(body, _)| body);
            let computed = checksum(body);
            if expected != computed {
                return Err(AisError::ChecksumMismatch { expected, computed });
            }
        }

        let mut block = TagBlock::default();
        for (key, value) in pairs {
            match key {
                "s" => block.source = Some(value.to_string()),
                "c" => block.time = Some(parse_time(value)?),
                "g" => block.group = Some(parse_group(value)?),
                _ => block.extra.push((key.to_string(), value.to_string())),
            }
        }
        Ok(block)
    }
}

#[cfg(test)]
mod test_tag_block {
    use super::*;

    #[test]
    fn test_split_source_and_seconds() {
        let (rest, block) =
            TagBlock::split("\\s:rEV02,c:1334337326*5A\\!AIVDM,1,1,,B,18JSad001i5gcaArTICimQTT068t,0*4A")
                .unwrap();
        assert_eq!(rest, "!AIVDM,1,1,,B,18JSad001i5gcaArTICimQTT068t,0*4A");
        assert_eq!(block.source.as_deref(), Some("rEV02"));
        assert_eq!(block.time, Some(1_334_337_326_000));
        assert!(block.extra.is_empty());
    }

    #[test]
    fn test_source_with_spaces() {
        let block = TagBlock::parse("s:MSQ - Mt Cootha,c:1426803365*73").unwrap();
        assert_eq!(block.source.as_deref(), Some("MSQ - Mt Cootha"));
        assert_eq!(block.time, Some(1_426_803_365_000));
    }

    #[test]
    fn test_millis_and_unknown_keys() {
        let block = TagBlock::parse("c:1426803365123,g:1-2-4711,n:42").unwrap();
        assert_eq!(block.time, Some(1_426_803_365_123));
        assert_eq!(
            block.group,
            Some(SentenceGroup {
                index: 1,
                count: 2,
                id: 4711
            })
        );
        assert_eq!(block.extra, vec![("n".to_string(), "42".to_string())]);
    }

    #[test]
    fn test_bad_checksum() {
        assert_eq!(
            TagBlock::parse("s:rEV02,c:1334337326*5B"),
            Err(AisError::ChecksumMismatch {
                expected: 0x5B,
                computed: 0x5A
            })
        );
    }

    #[test]
    fn test_malformed() {
        assert!(matches!(
            TagBlock::split("\\s:rEV02"),
            Err(AisError::MalformedSentence(_))
        ));
        assert!(matches!(
            TagBlock::parse("c:yesterday"),
            Err(AisError::MalformedSentence(_))
        ));
        assert!(matches!(
            TagBlock::parse("s"),
            Err(AisError::MalformedSentence(_))
        ));
    }
}
