//! Position Report Class A (message types 1, 2 and 3).
//!
//! Field layout (168 bits)
//! -----------------
//! | bits | field | notes |
//! |---|---|---|
//! | 38–41 | navigational status | 15 = not defined |
//! | 42–49 | rate of turn | signed, −128 = not available |
//! | 50–59 | speed over ground | 1/10 knot, 1023 = not available |
//! | 60 | position accuracy | |
//! | 61–88 | longitude | signed, 1/10000 min, 181° = not available |
//! | 89–115 | latitude | signed, 1/10000 min, 91° = not available |
//! | 116–127 | course over ground | 1/10 degree, 3600 = not available |
//! | 128–136 | true heading | degrees, 511 = not available |
//! | 137–142 | UTC second | ≥ 60 = not available |
//! | 143–144 | special manoeuvre indicator | |
//! | 148 | RAIM flag | |
//! | 149–167 | radio status | |
use super::{
    course_over_ground, fields, fields::Field, heading, latitude, longitude, rate_of_turn,
    sixbit::Bits, speed_over_ground, utc_second, NavigationalStatus,
};
use crate::constants::{Degree, Knots, Mmsi};

pub const MIN_BITS: usize = 168;

const NAV_STATUS: Field = Field::unsigned(38, 4);
const RATE_OF_TURN: Field = Field::signed(42, 8);
const SPEED_OVER_GROUND: Field = Field::unsigned(50, 10);
const POSITION_ACCURACY: Field = Field::unsigned(60, 1);
const LONGITUDE: Field = Field::signed(61, 28);
const LATITUDE: Field = Field::signed(89, 27);
const COURSE_OVER_GROUND: Field = Field::unsigned(116, 12);
const TRUE_HEADING: Field = Field::unsigned(128, 9);
const UTC_SECOND: Field = Field::unsigned(137, 6);
const SPECIAL_MANOEUVRE: Field = Field::unsigned(143, 2);
const RAIM: Field = Field::unsigned(148, 1);
const RADIO_STATUS: Field = Field::unsigned(149, 19);

#[derive(Debug, Clone, PartialEq)]
pub struct PositionReportClassA {
    /// 1, 2 or 3.
    pub message_type: u8,
    pub repeat_indicator: u8,
    pub mmsi: Mmsi,
    pub navigational_status: NavigationalStatus,
    /// Raw rate-of-turn indicator (`±127` turning faster than 5°/30 s, `±126` ROT sensor range).
    pub rate_of_turn: Option<i8>,
    pub speed_over_ground: Option<Knots>,
    /// `true` for DGNSS quality (< 10 m).
    pub position_accuracy: bool,
    pub longitude: Option<Degree>,
    pub latitude: Option<Degree>,
    /// Degrees.
    pub course_over_ground: Option<f32>,
    /// Degrees.
    pub true_heading: Option<u16>,
    pub utc_second: Option<u8>,
    pub special_manoeuvre: u8,
    pub raim: bool,
    pub radio_status: u32,
}

impl PositionReportClassA {
    pub(crate) fn decode(bits: &Bits) -> Self {
        PositionReportClassA {
            message_type: fields::MESSAGE_TYPE.read_unsigned(bits) as u8,
            repeat_indicator: fields::REPEAT_INDICATOR.read_unsigned(bits) as u8,
            mmsi: fields::MMSI.read_unsigned(bits) as Mmsi,
            navigational_status: NavigationalStatus::from_code(
                NAV_STATUS.read_unsigned(bits) as u8,
            ),
            rate_of_turn: rate_of_turn(RATE_OF_TURN.read(bits)),
            speed_over_ground: speed_over_ground(SPEED_OVER_GROUND.read_unsigned(bits)),
            position_accuracy: POSITION_ACCURACY.read_flag(bits),
            longitude: longitude(LONGITUDE.read(bits)),
            latitude: latitude(LATITUDE.read(bits)),
            course_over_ground: course_over_ground(COURSE_OVER_GROUND.read_unsigned(bits)),
            true_heading: heading(TRUE_HEADING.read_unsigned(bits)),
            utc_second: utc_second(UTC_SECOND.read_unsigned(bits)),
            special_manoeuvre: SPECIAL_MANOEUVRE.read_unsigned(bits) as u8,
            raim: RAIM.read_flag(bits),
            radio_status: RADIO_STATUS.read_unsigned(bits) as u32,
        }
    }
}
