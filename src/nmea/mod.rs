//! # NMEA-0183 framing for AIS
//!
//! Text-level handling of AIS radio sentences (`!AIVDM`, `!ABVDM`, `!AIVDO`, ...):
//!
//! - [`tag_block`] – The optional `\key:value,...*hh\` prefix added by receiving stations.
//! - [`sentence`] – Line parser producing a checksum-validated [`RawSentence`].
//! - [`reassembly`] – Stateful joining of multi-sentence messages into one armored payload.
//!
//! Wire format
//! -----------------
//! ```text
//! [\tagblock\]!<talker>VDM,<fragCount>,<fragIdx>,[<seqId>],<channel>,<payload>,<fillBits>*<checksum>
//! ```
//!
//! The checksum of both the tag block and the sentence body is the XOR of every byte between
//! the opening delimiter and the `*`, written as two hexadecimal digits.
pub mod reassembly;
pub mod sentence;
pub mod tag_block;

use crate::constants::EpochMillis;

pub use reassembly::{AisPayload, FragmentReassembler, IncompleteGroup, ReassemblyParams};
pub use sentence::parse_line;
pub use tag_block::TagBlock;

/// One checksum-validated AIS sentence (possibly a single fragment of a larger message).
#[derive(Debug, Clone, PartialEq)]
pub struct RawSentence {
    /// Talker and formatter, e.g. `"AIVDM"` or `"ABVDM"`.
    pub talker: String,
    /// Total number of sentences carrying the message.
    pub fragment_count: u8,
    /// 1-based index of this sentence within the message.
    pub fragment_index: u8,
    /// Sequential message id shared by every fragment of one message, empty on single fragments.
    pub sequence_id: Option<u8>,
    /// Radio channel label (`A`, `B`, `1`, `2`), when reported.
    pub channel: Option<char>,
    /// Six-bit armored payload.
    pub payload: String,
    /// Number of padding bits at the end of the payload (0–5).
    pub fill_bits: u8,
    /// Transmitted checksum byte (already validated).
    pub checksum: u8,
    /// Receiver tag block, when the line carried one.
    pub tag_block: Option<TagBlock>,
}

impl RawSentence {
    #[inline]
    pub fn is_single_fragment(&self) -> bool {
        self.fragment_count <= 1
    }

    /// Capture time reported by the receiving station.
    pub fn time(&self) -> Option<EpochMillis> {
        self.tag_block.as_ref().and_then(|t| t.time)
    }

    /// Receiving station identifier.
    pub fn source(&self) -> Option<&str> {
        self.tag_block.as_ref().and_then(|t| t.source.as_deref())
    }
}

/// XOR of every byte of `content`.
#[inline]
pub fn checksum(content: &str) -> u8 {
    content.bytes().fold(0u8, |acc, b| acc ^ b)
}
