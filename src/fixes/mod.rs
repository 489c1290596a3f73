//! # Vessel position fixes
//!
//! A [`Fix`] is the minimal positional record kept from a decoded AIS message: identity,
//! coordinates, time, and the kinematics the transponder reported.
//!
//! ## Reduction rules
//! -----------------
//! - Only position-bearing messages (types 1, 2, 3 and 18) produce fixes.
//! - Unavailable latitude (91°) or longitude (181°) yields no fix; the sentinels never reach
//!   downstream consumers.
//! - Navigational status `NotDefined` (15) is stored as absent.
//! - Coordinates are narrowed to `f32`, the precision of the binary record
//!   (≈ 1 m at the equator, finer than the 1/10000 minute transmitted).
//!
//! See [`binary_format`] for the on-disk representation.
pub mod binary_format;

use std::fmt;

use hifitime::Epoch;
use serde::Serialize;

use crate::{
    ais::{DecodedMessage, NavigationalStatus},
    constants::{EpochMillis, Knots, Mmsi},
};

/// Transponder class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AisClass {
    A,
    B,
}

/// Reduced vessel position record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Fix {
    /// Absent when read back from a compact record.
    pub mmsi: Option<Mmsi>,
    /// Degrees, `[-90, 90]`.
    pub lat: f32,
    /// Degrees, `[-180, 180]`.
    pub lon: f32,
    /// Epoch milliseconds.
    pub time: EpochMillis,
    pub navigational_status: Option<NavigationalStatus>,
    /// Raw AIS rate-of-turn indicator, `-127..=127` (`-128` means not available).
    pub rate_of_turn: Option<i8>,
    /// Whole tenths of a knot.
    pub speed_over_ground: Option<Knots>,
    /// Degrees, whole tenths.
    pub course_over_ground: Option<f32>,
    /// Degrees.
    pub heading: Option<u16>,
    pub ais_class: AisClass,
}

impl Fix {
    /// A Class A fix with no kinematics.
    pub fn new(mmsi: Mmsi, lat: f32, lon: f32, time: EpochMillis) -> Self {
        Fix {
            mmsi: Some(mmsi),
            lat,
            lon,
            time,
            navigational_status: None,
            rate_of_turn: None,
            speed_over_ground: None,
            course_over_ground: None,
            heading: None,
            ais_class: AisClass::A,
        }
    }

    /// Reduce a decoded message to a fix.
    ///
    /// Arguments
    /// -----------------
    /// * `message` – A decoded AIS message.
    /// * `time` – Reception time (tag block time, or the caller's ingestion time).
    ///
    /// Return
    /// ----------
    /// * `Some(fix)` for position reports with an available position, `None` otherwise.
    pub fn from_message(message: &DecodedMessage, time: EpochMillis) -> Option<Fix> {
        match message {
            DecodedMessage::PositionReportClassA(p) => Some(Fix {
                mmsi: Some(p.mmsi),
                lat: p.latitude? as f32,
                lon: p.longitude? as f32,
                time,
                navigational_status: Some(p.navigational_status)
                    .filter(|s| *s != NavigationalStatus::NotDefined),
                rate_of_turn: p.rate_of_turn,
                speed_over_ground: p.speed_over_ground,
                course_over_ground: p.course_over_ground,
                heading: p.true_heading,
                ais_class: AisClass::A,
            }),
            DecodedMessage::PositionReportClassB(p) => Some(Fix {
                mmsi: Some(p.mmsi),
                lat: p.latitude? as f32,
                lon: p.longitude? as f32,
                time,
                navigational_status: None,
                rate_of_turn: None,
                speed_over_ground: p.speed_over_ground,
                course_over_ground: p.course_over_ground,
                heading: p.true_heading,
                ais_class: AisClass::B,
            }),
            DecodedMessage::ShipStaticData(_) => None,
        }
    }

    /// Fix time as a UTC [`Epoch`].
    pub fn epoch(&self) -> Epoch {
        Epoch::from_unix_milliseconds(self.time as f64)
    }
}

impl fmt::Display for Fix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mmsi {
            Some(mmsi) => write!(f, "{mmsi:09}")?,
            None => write!(f, "?")?,
        }
        write!(f, " @ {} ({:.5}, {:.5})", self.epoch(), self.lat, self.lon)?;
        if let Some(sog) = self.speed_over_ground {
            write!(f, " sog={sog:.1}kn")?;
        }
        if let Some(cog) = self.course_over_ground {
            write!(f, " cog={cog:.1}°")?;
        }
        Ok(())
    }
}
