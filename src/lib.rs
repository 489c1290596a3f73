//! # aisfix
//!
//! Decoding of AIS (Automatic Identification System) radio traffic into compact vessel
//! position fixes, and spatial-temporal partitioning of large fix collections.
//!
//! ## Pipeline
//! -----------------
//! 1. [`nmea`] – NMEA-0183 sentence parsing, tag blocks and fragment reassembly.
//! 2. [`ais`] – Six-bit payload decoding into typed messages (types 1, 2, 3, 5, 18).
//! 3. [`fixes`] – Reduction of position reports to [`fixes::Fix`] records and their
//!    fixed-width binary encoding.
//! 4. [`partition`] – Bucketing of fixes along a 3-D Hilbert curve over latitude, longitude
//!    and time.
//!
//! [`pipeline`] chains the first three stages as iterators over text lines.
//!
//! ## Example
//! -----------------
//! ```rust
//! use aisfix::{nmea::ReassemblyParams, pipeline::FixStream};
//!
//! let lines = [
//!     "\\s:rEV02,c:1334337326*5A\\!AIVDM,1,1,,B,18JSad001i5gcaArTICimQTT068t,0*4A",
//! ];
//! let fixes: Vec<_> = FixStream::new(lines.into_iter(), ReassemblyParams::default())
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//! assert_eq!(fixes[0].mmsi, Some(564_718_000));
//! ```
pub mod ais;
pub mod ais_errors;
pub mod constants;
pub mod fixes;
pub mod nmea;
pub mod partition;
pub mod pipeline;

use std::collections::HashMap;

pub use ais_errors::AisError;

/// `HashMap` keyed with `ahash`.
pub type FastHashMap<K, V> = HashMap<K, V, ahash::RandomState>;
