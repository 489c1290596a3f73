//! Line-level parser for AIS NMEA sentences.
//!
//! [`parse_line`] turns one raw text line into a checksum-validated [`RawSentence`].
//!
//! Outcomes
//! -----------------
//! * `Ok(Some(sentence))` – A well-formed `VDM`/`VDO` sentence with a valid checksum.
//! * `Ok(None)` – The line is not applicable: empty, a `#` comment, or an NMEA sentence
//!   unrelated to AIS (e.g. `$GPGGA`).
//! * `Err(AisError::ChecksumMismatch)` – The sentence (or its tag block) failed the XOR check.
//! * `Err(AisError::MalformedSentence)` / `Err(AisError::InvalidFillBits)` – Structural errors.
//!
//! Sentences of other types (e.g. `$GPGGA`) are set aside from their formatter alone, before
//! the checksum. For AIS sentences the checksum is validated before any field is
//! interpreted, so a corrupted sentence is never partially trusted.
use nom::{
    bytes::complete::take_while_m_n,
    character::complete::{char, one_of, space0},
    combinator::all_consuming,
    sequence::{preceded, terminated},
    IResult,
};

use crate::{
    ais_errors::AisError,
    nmea::{checksum, tag_block::TagBlock, RawSentence},
};

/// Number of comma separated fields of a `VDM`/`VDO` sentence body.
const VDM_FIELDS: usize = 7;

fn malformed(line: &str, what: &str) -> AisError {
    AisError::MalformedSentence(format!("{what}: {line}"))
}

/// `*hh` trailer, tolerating trailing whitespace.
fn checksum_trailer(input: &str) -> IResult<&str, &str> {
    all_consuming(terminated(
        preceded(
            char('*'),
            take_while_m_n(2, 2, |c: char| c.is_ascii_hexdigit()),
        ),
        space0,
    ))(input)
}

fn start_delimiter(input: &str) -> IResult<&str, char> {
    one_of("!$")(input)
}

fn is_ais_talker(talker: &str) -> bool {
    talker.len() == 5 && (talker.ends_with("VDM") || talker.ends_with("VDO"))
}

/// Whether the sentence formatter (the three characters after the two-letter talker) is
/// more than one bit away from both `VDM` and `VDO`.
///
/// Only that fixed window is read, so the decision never depends on unchecked field
/// boundaries, and a single flipped bit in an AIS formatter still reaches the checksum.
fn is_foreign_sentence(sentence: &str) -> bool {
    let Some(formatter) = sentence.as_bytes().get(2..5) else {
        return false;
    };
    let distance = |target: &[u8; 3]| -> u32 {
        formatter
            .iter()
            .zip(target)
            .map(|(a, b)| (a ^ b).count_ones())
            .sum()
    };
    distance(b"VDM") > 1 && distance(b"VDO") > 1
}

fn parse_u8(field: &str, line: &str, what: &str) -> Result<u8, AisError> {
    field.parse::<u8>().map_err(|_| malformed(line, what))
}

/// Parse one line into a [`RawSentence`].
///
/// Arguments
/// -----------------
/// * `line` – A raw input line, optionally prefixed by a tag block. Trailing `\r\n` is ignored.
///
/// Return
/// ----------
/// * `Ok(Some(sentence))` for a valid AIS sentence, `Ok(None)` when the line is not
///   applicable, or an [`AisError`] describing why the sentence was rejected.
///
/// See also
/// ------------
/// * [`TagBlock::split`] – Tag block extraction and validation.
/// * [`crate::nmea::reassembly::FragmentReassembler`] – Next stage for multi-fragment messages.
pub fn parse_line(line: &str) -> Result<Option<RawSentence>, AisError> {
    let line = line.trim_end();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (rest, tag_block) = if line.starts_with('\\') {
        let (rest, block) = TagBlock::split(line)?;
        (rest, Some(block))
    } else {
        (line, None)
    };

    let Ok((rest, _)) = start_delimiter(rest) else {
        return match tag_block {
            Some(_) => Err(malformed(line, "missing sentence after tag block")),
            None => Ok(None),
        };
    };
    if is_foreign_sentence(rest) {
        return Ok(None);
    }

    // The last '*' delimits the body, so a corrupted payload byte can never move the trailer.
    let (body, trailer) = rest
        .rfind('*')
        .map(|pos| rest.split_at(pos))
        .ok_or_else(|| malformed(line, "missing checksum"))?;
    let (_, hex) = checksum_trailer(trailer).map_err(|_| malformed(line, "invalid checksum"))?;
    let expected = u8::from_str_radix(hex, 16).map_err(|_| malformed(line, "invalid checksum"))?;
    let computed = checksum(body);
    if expected != computed {
        return Err(AisError::ChecksumMismatch { expected, computed });
    }

    let fields: Vec<&str> = body.split(',').collect();
    if !is_ais_talker(fields[0]) {
        return Ok(None);
    }
    if fields.len() != VDM_FIELDS {
        return Err(malformed(line, "unexpected field count"));
    }

    let fragment_count = parse_u8(fields[1], line, "invalid fragment count")?;
    let fragment_index = parse_u8(fields[2], line, "invalid fragment index")?;
    if fragment_count == 0 || fragment_index == 0 || fragment_index > fragment_count {
        return Err(malformed(line, "fragment index out of range"));
    }

    let sequence_id = match fields[3] {
        "" => None,
        id => Some(parse_u8(id, line, "invalid sequential message id")?),
    };

    let mut channel_chars = fields[4].chars();
    let channel = match (channel_chars.next(), channel_chars.next()) {
        (None, _) => None,
        (Some(c), None) => Some(c),
        _ => return Err(malformed(line, "invalid channel")),
    };

    let fill_bits = parse_u8(fields[6], line, "invalid fill bits")?;
    if fill_bits > 5 {
        return Err(AisError::InvalidFillBits(fill_bits));
    }

    Ok(Some(RawSentence {
        talker: fields[0].to_string(),
        fragment_count,
        fragment_index,
        sequence_id,
        channel,
        payload: fields[5].to_string(),
        fill_bits,
        checksum: expected,
        tag_block,
    }))
}

#[cfg(test)]
mod test_sentence {
    use super::*;

    const POSITION_A: &str =
        "\\s:rEV02,c:1334337326*5A\\!AIVDM,1,1,,B,18JSad001i5gcaArTICimQTT068t,0*4A";

    #[test]
    fn test_parse_position_a_line() {
        let sentence = parse_line(POSITION_A).unwrap().unwrap();
        assert_eq!(sentence.talker, "AIVDM");
        assert_eq!(sentence.fragment_count, 1);
        assert_eq!(sentence.fragment_index, 1);
        assert_eq!(sentence.sequence_id, None);
        assert_eq!(sentence.channel, Some('B'));
        assert_eq!(sentence.payload, "18JSad001i5gcaArTICimQTT068t");
        assert_eq!(sentence.fill_bits, 0);
        assert_eq!(sentence.checksum, 0x4A);
        assert_eq!(sentence.source(), Some("rEV02"));
        assert_eq!(sentence.time(), Some(1_334_337_326_000));
    }

    #[test]
    fn test_parse_without_tag_block_and_crlf() {
        let sentence = parse_line("!AIVDM,1,1,,B,18JSad001i5gcaArTICimQTT068t,0*4A\r\n")
            .unwrap()
            .unwrap();
        assert!(sentence.tag_block.is_none());
        assert!(sentence.is_single_fragment());
    }

    #[test]
    fn test_not_applicable() {
        assert_eq!(parse_line(""), Ok(None));
        assert_eq!(parse_line("   "), Ok(None));
        assert_eq!(parse_line("# comment"), Ok(None));
        assert_eq!(parse_line("hello world"), Ok(None));
        let gga = "GPGGA,123456.00,4916.29,N,12311.76,W,1,08,0.9,545.4,M,46.9,M,,";
        let line = format!("${gga}*{:02X}", checksum(gga));
        assert_eq!(parse_line(&line), Ok(None));
    }

    #[test]
    fn test_corrupted_foreign_sentence_is_not_applicable() {
        let gga = "GPGGA,123456.00,4916.29,N,12311.76,W,1,08,0.9,545.4,M,46.9,M,,";
        let line = format!("${gga}*{:02X}", checksum(gga) ^ 0x01);
        assert_eq!(parse_line(&line), Ok(None));
        assert_eq!(parse_line("$GPRMC,garbage*ZZ"), Ok(None));

        let tagged = format!("\\s:rEV02,c:1334337326*5A\\{line}");
        assert_eq!(parse_line(&tagged), Ok(None));
    }

    #[test]
    fn test_formatter_window() {
        assert!(is_foreign_sentence("GPGGA,1"));
        assert!(is_foreign_sentence("GPRMC"));
        assert!(!is_foreign_sentence("AIVDM,1"));
        assert!(!is_foreign_sentence("ABVDO,1"));
        // one flipped bit away from VDM
        assert!(!is_foreign_sentence("AIVDL,1"));
        assert!(!is_foreign_sentence("AI"));
    }

    #[test]
    fn test_checksum_mismatch() {
        assert_eq!(
            parse_line("!AIVDM,1,1,,B,18JSad001i5gcaArTICimQTT068t,0*4B"),
            Err(AisError::ChecksumMismatch {
                expected: 0x4B,
                computed: 0x4A
            })
        );
    }

    #[test]
    fn test_every_single_bit_flip_is_detected() {
        let line = "!AIVDM,1,1,,B,18JSad001i5gcaArTICimQTT068t,0*4A";
        let body_end = line.rfind('*').unwrap();
        for pos in 1..body_end {
            for bit in 0..7 {
                let mut bytes = line.as_bytes().to_vec();
                bytes[pos] ^= 1 << bit;
                let flipped = String::from_utf8(bytes).unwrap();
                assert!(
                    matches!(
                        parse_line(&flipped),
                        Err(AisError::ChecksumMismatch { .. })
                    ),
                    "flip of bit {bit} at {pos} not detected: {flipped:?}"
                );
            }
        }
    }

    #[test]
    fn test_malformed_structure() {
        let missing_field = "AIVDM,1,1,,B,18JSad001i5gcaArTICimQTT068t";
        let line = format!("!{missing_field}*{:02X}", checksum(missing_field));
        assert!(matches!(
            parse_line(&line),
            Err(AisError::MalformedSentence(_))
        ));

        let bad_index = "AIVDM,2,3,1,A,55,0";
        let line = format!("!{bad_index}*{:02X}", checksum(bad_index));
        assert!(matches!(
            parse_line(&line),
            Err(AisError::MalformedSentence(_))
        ));

        let bad_fill = "AIVDM,1,1,,A,55,7";
        let line = format!("!{bad_fill}*{:02X}", checksum(bad_fill));
        assert_eq!(parse_line(&line), Err(AisError::InvalidFillBits(7)));

        assert!(matches!(
            parse_line("!AIVDM,1,1,,B,18JSad001i5gcaArTICimQTT068t,0"),
            Err(AisError::MalformedSentence(_))
        ));
        assert!(matches!(
            parse_line("\\s:rEV02*00\\"),
            Err(AisError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn test_multi_fragment_fields() {
        let body = "AIVDM,2,1,7,A,55NBjP01mtGIL@CW;SM<D60P5Ld000000000000P0`<3557l0<50@kk@K5h@00000,0";
        let line = format!("!{body}*{:02X}", checksum(body));
        let sentence = parse_line(&line).unwrap().unwrap();
        assert_eq!(sentence.fragment_count, 2);
        assert_eq!(sentence.fragment_index, 1);
        assert_eq!(sentence.sequence_id, Some(7));
        assert_eq!(sentence.channel, Some('A'));
        assert!(!sentence.is_single_fragment());
    }
}
