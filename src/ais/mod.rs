//! # AIS message decoding
//!
//! Turns a reassembled six-bit payload into a typed [`DecodedMessage`].
//!
//! ## Overview
//! -----------------
//! - [`sixbit`] – Armor decoding and total bit-field extraction primitives.
//! - [`fields`] – Bit-field table entries shared by every message layout.
//! - [`position_report`] – Types 1, 2, 3 (Class A position report).
//! - [`ship_static`] – Type 5 (ship static and voyage related data).
//! - [`class_b`] – Type 18 (Class B CS position report).
//!
//! ## Outcomes
//! -----------------
//! [`decode_message`] never fails. Message types outside the supported set produce
//! [`MessageOutcome::Unsupported`] and bit sequences shorter than the layout produce
//! [`MessageOutcome::Truncated`]; callers decide whether to count or ignore them.
//! Out-of-range or reserved field codes are reported as `None` on the decoded message.
pub mod class_b;
pub mod fields;
pub mod navigational_status;
pub mod position_report;
pub mod ship_static;
pub mod sixbit;

pub use class_b::PositionReportClassB;
pub use navigational_status::NavigationalStatus;
pub use position_report::PositionReportClassA;
pub use ship_static::ShipStaticData;

use crate::{
    ais_errors::AisError,
    constants::{
        Degree, Knots, Mmsi, COG_NOT_AVAILABLE, COORD_UNITS_PER_DEGREE, HEADING_NOT_AVAILABLE,
        LATITUDE_NOT_AVAILABLE, LONGITUDE_NOT_AVAILABLE, ROT_NOT_AVAILABLE, SECOND_NOT_AVAILABLE,
        SOG_NOT_AVAILABLE,
    },
};
use sixbit::Bits;

/// A decoded AIS message of a supported type.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedMessage {
    /// Types 1, 2 and 3.
    PositionReportClassA(PositionReportClassA),
    /// Type 5.
    ShipStaticData(ShipStaticData),
    /// Type 18.
    PositionReportClassB(PositionReportClassB),
}

impl DecodedMessage {
    pub fn mmsi(&self) -> Mmsi {
        match self {
            DecodedMessage::PositionReportClassA(m) => m.mmsi,
            DecodedMessage::ShipStaticData(m) => m.mmsi,
            DecodedMessage::PositionReportClassB(m) => m.mmsi,
        }
    }

    pub fn message_type(&self) -> u8 {
        match self {
            DecodedMessage::PositionReportClassA(m) => m.message_type,
            DecodedMessage::ShipStaticData(_) => 5,
            DecodedMessage::PositionReportClassB(_) => 18,
        }
    }
}

/// Result of decoding one bit sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageOutcome {
    Decoded(DecodedMessage),
    Unsupported {
        message_type: u8,
    },
    Truncated {
        message_type: u8,
        bits: usize,
        required: usize,
    },
}

/// Minimum number of bits for `message_type`, `None` if the type is not supported.
pub fn required_bits(message_type: u8) -> Option<usize> {
    match message_type {
        1..=3 => Some(position_report::MIN_BITS),
        5 => Some(ship_static::MIN_BITS),
        18 => Some(class_b::MIN_BITS),
        _ => None,
    }
}

/// Decode a bit sequence according to its message type.
///
/// Arguments
/// -----------------
/// * `bits` – The full bit sequence of one AIS message.
///
/// Return
/// ----------
/// * [`MessageOutcome::Decoded`] for supported and long enough messages,
///   [`MessageOutcome::Unsupported`] or [`MessageOutcome::Truncated`] otherwise.
pub fn decode_message(bits: &Bits) -> MessageOutcome {
    let message_type = fields::MESSAGE_TYPE.read_unsigned(bits) as u8;
    if bits.len() < fields::MESSAGE_TYPE.end() {
        return MessageOutcome::Truncated {
            message_type,
            bits: bits.len(),
            required: fields::MESSAGE_TYPE.end(),
        };
    }

    let Some(required) = required_bits(message_type) else {
        return MessageOutcome::Unsupported { message_type };
    };
    if bits.len() < required {
        return MessageOutcome::Truncated {
            message_type,
            bits: bits.len(),
            required,
        };
    }

    let message = match message_type {
        5 => DecodedMessage::ShipStaticData(ShipStaticData::decode(bits)),
        18 => DecodedMessage::PositionReportClassB(PositionReportClassB::decode(bits)),
        _ => DecodedMessage::PositionReportClassA(PositionReportClassA::decode(bits)),
    };
    MessageOutcome::Decoded(message)
}

/// Armor-decode then field-decode a payload.
pub fn decode_payload(payload: &str, fill_bits: u8) -> Result<MessageOutcome, AisError> {
    Ok(decode_message(&Bits::from_armor(payload, fill_bits)?))
}

// -------------------------------------------------------------------------------------------------
// Scaling and "not available" sentinels shared by the position-bearing layouts
// -------------------------------------------------------------------------------------------------

pub(crate) fn longitude(raw: i64) -> Option<Degree> {
    if raw == LONGITUDE_NOT_AVAILABLE {
        return None;
    }
    let deg = raw as f64 / COORD_UNITS_PER_DEGREE;
    (-180.0..=180.0).contains(&deg).then_some(deg)
}

pub(crate) fn latitude(raw: i64) -> Option<Degree> {
    if raw == LATITUDE_NOT_AVAILABLE {
        return None;
    }
    let deg = raw as f64 / COORD_UNITS_PER_DEGREE;
    (-90.0..=90.0).contains(&deg).then_some(deg)
}

pub(crate) fn speed_over_ground(raw: u64) -> Option<Knots> {
    (raw != SOG_NOT_AVAILABLE).then(|| raw as f32 / 10.0)
}

pub(crate) fn course_over_ground(raw: u64) -> Option<f32> {
    (raw < COG_NOT_AVAILABLE).then(|| raw as f32 / 10.0)
}

pub(crate) fn heading(raw: u64) -> Option<u16> {
    (raw < 360 && raw != HEADING_NOT_AVAILABLE).then_some(raw as u16)
}

pub(crate) fn rate_of_turn(raw: i64) -> Option<i8> {
    (raw != ROT_NOT_AVAILABLE).then_some(raw as i8)
}

pub(crate) fn utc_second(raw: u64) -> Option<u8> {
    (raw < SECOND_NOT_AVAILABLE).then_some(raw as u8)
}

#[cfg(test)]
mod test_decode_message {
    use super::*;

    #[test]
    fn test_dispatch_reference_payloads() {
        let outcome = decode_payload("18JSad001i5gcaArTICimQTT068t", 0).unwrap();
        let MessageOutcome::Decoded(message) = outcome else {
            panic!("expected a decoded message, got {outcome:?}");
        };
        assert_eq!(message.message_type(), 1);
        assert_eq!(message.mmsi(), 564_718_000);

        let outcome = decode_payload("B7P?n900Irg8IHL4RblF?wRToP06", 0).unwrap();
        assert!(matches!(
            outcome,
            MessageOutcome::Decoded(DecodedMessage::PositionReportClassB(_))
        ));
    }

    #[test]
    fn test_garbage_is_never_a_crash() {
        assert_eq!(
            decode_payload("0", 0).unwrap(),
            MessageOutcome::Unsupported { message_type: 0 }
        );
        assert_eq!(
            decode_payload("", 0).unwrap(),
            MessageOutcome::Truncated {
                message_type: 0,
                bits: 0,
                required: 6
            }
        );
        assert_eq!(
            decode_payload("1", 0).unwrap(),
            MessageOutcome::Truncated {
                message_type: 1,
                bits: 6,
                required: 168
            }
        );
        assert_eq!(
            decode_payload("8", 0).unwrap(),
            MessageOutcome::Unsupported { message_type: 8 }
        );
        assert!(decode_payload("1~", 0).is_err());
    }

    #[test]
    fn test_sentinels() {
        assert_eq!(longitude(LONGITUDE_NOT_AVAILABLE), None);
        assert_eq!(latitude(LATITUDE_NOT_AVAILABLE), None);
        assert_eq!(latitude(95 * 600_000), None);
        assert_eq!(longitude(-180 * 600_000), Some(-180.0));
        assert_eq!(speed_over_ground(1023), None);
        assert_eq!(speed_over_ground(1022), Some(102.2));
        assert_eq!(course_over_ground(3600), None);
        assert_eq!(course_over_ground(4095), None);
        assert_eq!(heading(511), None);
        assert_eq!(heading(359), Some(359));
        assert_eq!(rate_of_turn(-128), None);
        assert_eq!(utc_second(61), None);
    }
}
