//! Standard Class B CS Position Report (message type 18).
use super::{
    course_over_ground, fields, fields::Field, heading, latitude, longitude, sixbit::Bits,
    speed_over_ground, utc_second,
};
use crate::constants::{Degree, Knots, Mmsi};

pub const MIN_BITS: usize = 168;

const SPEED_OVER_GROUND: Field = Field::unsigned(46, 10);
const POSITION_ACCURACY: Field = Field::unsigned(56, 1);
const LONGITUDE: Field = Field::signed(57, 28);
const LATITUDE: Field = Field::signed(85, 27);
const COURSE_OVER_GROUND: Field = Field::unsigned(112, 12);
const TRUE_HEADING: Field = Field::unsigned(124, 9);
const UTC_SECOND: Field = Field::unsigned(133, 6);
const CS_UNIT: Field = Field::unsigned(141, 1);
const DISPLAY: Field = Field::unsigned(142, 1);
const DSC: Field = Field::unsigned(143, 1);
const BAND: Field = Field::unsigned(144, 1);
const MESSAGE_22: Field = Field::unsigned(145, 1);
const ASSIGNED: Field = Field::unsigned(146, 1);
const RAIM: Field = Field::unsigned(147, 1);
const RADIO_STATUS: Field = Field::unsigned(148, 20);

#[derive(Debug, Clone, PartialEq)]
pub struct PositionReportClassB {
    pub repeat_indicator: u8,
    pub mmsi: Mmsi,
    pub speed_over_ground: Option<Knots>,
    pub position_accuracy: bool,
    pub longitude: Option<Degree>,
    pub latitude: Option<Degree>,
    pub course_over_ground: Option<f32>,
    pub true_heading: Option<u16>,
    pub utc_second: Option<u8>,
    /// `true` for a carrier-sense (CS) unit, `false` for SOTDMA.
    pub cs_unit: bool,
    pub display: bool,
    pub dsc: bool,
    pub band: bool,
    pub message_22: bool,
    pub assigned: bool,
    pub raim: bool,
    pub radio_status: u32,
}

impl PositionReportClassB {
    pub(crate) fn decode(bits: &Bits) -> Self {
        PositionReportClassB {
            repeat_indicator: fields::REPEAT_INDICATOR.read_unsigned(bits) as u8,
            mmsi: fields::MMSI.read_unsigned(bits) as Mmsi,
            speed_over_ground: speed_over_ground(SPEED_OVER_GROUND.read_unsigned(bits)),
            position_accuracy: POSITION_ACCURACY.read_flag(bits),
            longitude: longitude(LONGITUDE.read(bits)),
            latitude: latitude(LATITUDE.read(bits)),
            course_over_ground: course_over_ground(COURSE_OVER_GROUND.read_unsigned(bits)),
            true_heading: heading(TRUE_HEADING.read_unsigned(bits)),
            utc_second: utc_second(UTC_SECOND.read_unsigned(bits)),
            cs_unit: CS_UNIT.read_flag(bits),
            display: DISPLAY.read_flag(bits),
            dsc: DSC.read_flag(bits),
            band: BAND.read_flag(bits),
            message_22: MESSAGE_22.read_flag(bits),
            assigned: ASSIGNED.read_flag(bits),
            raim: RAIM.read_flag(bits),
            radio_status: RADIO_STATUS.read_unsigned(bits) as u32,
        }
    }
}
