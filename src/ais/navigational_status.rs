use std::fmt;

use serde::Serialize;

/// Navigational status reported by Class A transponders (4-bit code).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NavigationalStatus {
    UnderWayUsingEngine,
    AtAnchor,
    NotUnderCommand,
    RestrictedManoeuvrability,
    ConstrainedByHerDraught,
    Moored,
    Aground,
    EngagedInFishing,
    UnderWaySailing,
    ReservedHsc,
    ReservedWig,
    PowerDrivenTowingAstern,
    PowerDrivenPushingAhead,
    Reserved13,
    AisSartActive,
    NotDefined,
}

impl NavigationalStatus {
    const ALL: [NavigationalStatus; 16] = [
        NavigationalStatus::UnderWayUsingEngine,
        NavigationalStatus::AtAnchor,
        NavigationalStatus::NotUnderCommand,
        NavigationalStatus::RestrictedManoeuvrability,
        NavigationalStatus::ConstrainedByHerDraught,
        NavigationalStatus::Moored,
        NavigationalStatus::Aground,
        NavigationalStatus::EngagedInFishing,
        NavigationalStatus::UnderWaySailing,
        NavigationalStatus::ReservedHsc,
        NavigationalStatus::ReservedWig,
        NavigationalStatus::PowerDrivenTowingAstern,
        NavigationalStatus::PowerDrivenPushingAhead,
        NavigationalStatus::Reserved13,
        NavigationalStatus::AisSartActive,
        NavigationalStatus::NotDefined,
    ];

    /// Status for a 4-bit code; every code is defined.
    pub fn from_code(code: u8) -> Self {
        Self::ALL[usize::from(code & 0x0F)]
    }

    /// Code in `0..=15`, `None` for larger values.
    pub fn try_from_code(code: u8) -> Option<Self> {
        Self::ALL.get(usize::from(code)).copied()
    }

    pub fn code(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for NavigationalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            NavigationalStatus::UnderWayUsingEngine => "under way using engine",
            NavigationalStatus::AtAnchor => "at anchor",
            NavigationalStatus::NotUnderCommand => "not under command",
            NavigationalStatus::RestrictedManoeuvrability => "restricted manoeuvrability",
            NavigationalStatus::ConstrainedByHerDraught => "constrained by her draught",
            NavigationalStatus::Moored => "moored",
            NavigationalStatus::Aground => "aground",
            NavigationalStatus::EngagedInFishing => "engaged in fishing",
            NavigationalStatus::UnderWaySailing => "under way sailing",
            NavigationalStatus::ReservedHsc => "reserved (HSC)",
            NavigationalStatus::ReservedWig => "reserved (WIG)",
            NavigationalStatus::PowerDrivenTowingAstern => "power-driven vessel towing astern",
            NavigationalStatus::PowerDrivenPushingAhead => "power-driven vessel pushing ahead",
            NavigationalStatus::Reserved13 => "reserved",
            NavigationalStatus::AisSartActive => "AIS-SART active",
            NavigationalStatus::NotDefined => "not defined",
        };
        f.write_str(label)
    }
}
