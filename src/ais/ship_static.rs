//! Ship Static and Voyage Related Data (message type 5).
//!
//! Usually transmitted as two sentences (424 bits, 2 fill bits). Some transponders omit the
//! trailing spare bits, so 420 bits are accepted; missing bits read as zero.
use super::{fields, fields::Field, sixbit::Bits};
use crate::constants::{Mmsi, IMO_NOT_AVAILABLE};

pub const MIN_BITS: usize = 420;

const AIS_VERSION: Field = Field::unsigned(38, 2);
const IMO: Field = Field::unsigned(40, 30);
const CALLSIGN: Field = Field::unsigned(70, 42);
const NAME: Field = Field::unsigned(112, 120);
const SHIP_TYPE: Field = Field::unsigned(232, 8);
const TO_BOW: Field = Field::unsigned(240, 9);
const TO_STERN: Field = Field::unsigned(249, 9);
const TO_PORT: Field = Field::unsigned(258, 6);
const TO_STARBOARD: Field = Field::unsigned(264, 6);
const EPFD: Field = Field::unsigned(270, 4);
const ETA_MONTH: Field = Field::unsigned(274, 4);
const ETA_DAY: Field = Field::unsigned(278, 5);
const ETA_HOUR: Field = Field::unsigned(283, 5);
const ETA_MINUTE: Field = Field::unsigned(288, 6);
const DRAUGHT: Field = Field::unsigned(294, 8);
const DESTINATION: Field = Field::unsigned(302, 120);
const DTE: Field = Field::unsigned(422, 1);

/// Estimated time of arrival; each component is `None` when not available.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Eta {
    pub month: Option<u8>,
    pub day: Option<u8>,
    pub hour: Option<u8>,
    pub minute: Option<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShipStaticData {
    pub repeat_indicator: u8,
    pub mmsi: Mmsi,
    pub ais_version: u8,
    pub imo: Option<u32>,
    pub callsign: String,
    pub name: String,
    /// ITU ship and cargo type code.
    pub ship_type: Option<u8>,
    /// Offsets of the position reference point, metres.
    pub to_bow: Option<u16>,
    pub to_stern: Option<u16>,
    pub to_port: Option<u16>,
    pub to_starboard: Option<u16>,
    /// Electronic position fixing device type.
    pub epfd: Option<u8>,
    pub eta: Eta,
    /// Metres.
    pub draught: Option<f32>,
    pub destination: String,
    /// `false` when data terminal equipment is available.
    pub dte: bool,
}

fn non_zero(raw: u64) -> Option<u16> {
    (raw != 0).then_some(raw as u16)
}

impl ShipStaticData {
    pub(crate) fn decode(bits: &Bits) -> Self {
        let imo = IMO.read_unsigned(bits);
        let month = ETA_MONTH.read_unsigned(bits) as u8;
        let day = ETA_DAY.read_unsigned(bits) as u8;
        let hour = ETA_HOUR.read_unsigned(bits) as u8;
        let minute = ETA_MINUTE.read_unsigned(bits) as u8;
        let draught = DRAUGHT.read_unsigned(bits);
        let ship_type = SHIP_TYPE.read_unsigned(bits) as u8;
        let epfd = EPFD.read_unsigned(bits) as u8;

        ShipStaticData {
            repeat_indicator: fields::REPEAT_INDICATOR.read_unsigned(bits) as u8,
            mmsi: fields::MMSI.read_unsigned(bits) as Mmsi,
            ais_version: AIS_VERSION.read_unsigned(bits) as u8,
            imo: (imo != IMO_NOT_AVAILABLE).then_some(imo as u32),
            callsign: CALLSIGN.read_text(bits),
            name: NAME.read_text(bits),
            ship_type: (ship_type != 0).then_some(ship_type),
            to_bow: non_zero(TO_BOW.read_unsigned(bits)),
            to_stern: non_zero(TO_STERN.read_unsigned(bits)),
            to_port: non_zero(TO_PORT.read_unsigned(bits)),
            to_starboard: non_zero(TO_STARBOARD.read_unsigned(bits)),
            epfd: (epfd != 0 && epfd != 15).then_some(epfd),
            eta: Eta {
                month: (1..=12).contains(&month).then_some(month),
                day: (1..=31).contains(&day).then_some(day),
                hour: (hour < 24).then_some(hour),
                minute: (minute < 60).then_some(minute),
            },
            draught: (draught != 0).then(|| draught as f32 / 10.0),
            destination: DESTINATION.read_text(bits),
            dte: DTE.read_flag(bits),
        }
    }

    /// Overall length (bow + stern offsets), metres.
    pub fn length_metres(&self) -> Option<u16> {
        Some(self.to_bow? + self.to_stern?)
    }

    /// Overall beam (port + starboard offsets), metres.
    pub fn width_metres(&self) -> Option<u16> {
        Some(self.to_port? + self.to_starboard?)
    }
}
