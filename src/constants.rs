//! # Constants and type definitions for aisfix
//!
//! This module centralizes the **protocol constants**, **unit conversions** and **common type
//! aliases** used throughout the crate.
//!
//! ## Overview
//!
//! - AIS raw-unit scaling (1/10000 minute coordinates, tenths of knots / degrees)
//! - "Not available" sentinels defined by ITU-R M.1371
//! - Core type aliases shared by the decoder, the fix codec and the partitioner
//!
//! The values are fixed by the AIS bit-field standard; they are never inferred from data.

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Maritime Mobile Service Identity (9 decimal digits, 30 bits on the wire)
pub type Mmsi = u32;

/// Milliseconds since the UNIX epoch
pub type EpochMillis = i64;

/// Angle in degrees
pub type Degree = f64;

/// Speed in knots
pub type Knots = f32;

// -------------------------------------------------------------------------------------------------
// AIS scaling
// -------------------------------------------------------------------------------------------------

/// Raw coordinate units per degree (coordinates are transmitted in 1/10000 minute)
pub const COORD_UNITS_PER_DEGREE: f64 = 600_000.0;

/// Raw longitude meaning "not available" (181°)
pub const LONGITUDE_NOT_AVAILABLE: i64 = 181 * 600_000;

/// Raw latitude meaning "not available" (91°)
pub const LATITUDE_NOT_AVAILABLE: i64 = 91 * 600_000;

/// Raw speed over ground meaning "not available" (tenths of knots)
pub const SOG_NOT_AVAILABLE: u64 = 1023;

/// Raw course over ground meaning "not available" (tenths of degrees)
pub const COG_NOT_AVAILABLE: u64 = 3600;

/// Raw true heading meaning "not available"
pub const HEADING_NOT_AVAILABLE: u64 = 511;

/// Raw rate of turn meaning "not available"
pub const ROT_NOT_AVAILABLE: i64 = -128;

/// UTC second values of 60 and above are "not available" / positioning-system states
pub const SECOND_NOT_AVAILABLE: u64 = 60;

/// Raw IMO number meaning "not available"
pub const IMO_NOT_AVAILABLE: u64 = 0;

// -------------------------------------------------------------------------------------------------
// Time
// -------------------------------------------------------------------------------------------------

/// Tag-block capture times with at least this many digits are already in milliseconds
pub const MILLIS_TIMESTAMP_DIGITS: usize = 13;

/// Milliseconds per second
pub const MILLIS_PER_SECOND: i64 = 1_000;
