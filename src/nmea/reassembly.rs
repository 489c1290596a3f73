//! # Multi-sentence AIS message reassembly
//!
//! Long AIS messages (e.g. type 5, 424 bits) do not fit in one NMEA sentence and are split
//! into several fragments sharing a *sequential message id* and a radio channel.
//! [`FragmentReassembler`] buffers those fragments per `(sequence id, channel)` key and emits a
//! single [`AisPayload`] once every fragment has arrived.
//!
//! ## Rules
//! -----------------
//! - Single-fragment sentences bypass the buffer.
//! - Fragments must arrive **in order**. A fragment whose index is not the next expected one
//!   discards the pending group; it starts a new group when its index is 1 and is dropped
//!   otherwise. Transmitters recycle sequential ids, so a new first fragment supersedes any
//!   pending group under the same key.
//! - Groups older than [`ReassemblyParams::retention_ms`] are evicted, and at most
//!   [`ReassemblyParams::max_groups`] groups are kept (oldest evicted first).
//! - Every discarded group is reported as an [`IncompleteGroup`]; nothing is dropped silently.
//!   Reports accumulate until [`FragmentReassembler::take_incomplete`] drains them, so a caller
//!   driving the reassembler directly must drain regularly.
//! - Retention is measured on the `now` values passed to [`FragmentReassembler::push`], which
//!   must share one time base for the whole feed.
//!
//! ## Ownership
//! -----------------
//! Sequential ids are only unique within one feed. Each input source needs its own
//! reassembler; never share one between independent streams.
use log::debug;
use smallvec::SmallVec;

use crate::{
    ais::sixbit::Bits,
    ais_errors::AisError,
    constants::EpochMillis,
    nmea::{tag_block::TagBlock, RawSentence},
    FastHashMap,
};

/// A complete six-bit armored AIS payload, ready for bit decoding.
#[derive(Debug, Clone, PartialEq)]
pub struct AisPayload {
    pub talker: String,
    pub channel: Option<char>,
    /// Concatenation of every fragment payload, in index order.
    pub payload: String,
    /// Fill bits of the final fragment.
    pub fill_bits: u8,
    /// First tag block carrying a time among the fragments, else the first tag block.
    pub tag_block: Option<TagBlock>,
    /// Number of sentences the payload was assembled from.
    pub fragments: u8,
}

impl AisPayload {
    pub fn time(&self) -> Option<EpochMillis> {
        self.tag_block.as_ref().and_then(|t| t.time)
    }

    /// Expand the armored payload into its bit sequence.
    pub fn bits(&self) -> Result<Bits, AisError> {
        Bits::from_armor(&self.payload, self.fill_bits)
    }
}

impl From<RawSentence> for AisPayload {
    fn from(sentence: RawSentence) -> Self {
        AisPayload {
            talker: sentence.talker,
            channel: sentence.channel,
            payload: sentence.payload,
            fill_bits: sentence.fill_bits,
            tag_block: sentence.tag_block,
            fragments: 1,
        }
    }
}

/// Why a pending group was discarded before completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncompleteReason {
    /// Older than the retention window.
    Expired,
    /// A fragment arrived with an unexpected index or fragment count.
    OutOfOrder,
    /// A new first fragment reused the key.
    Superseded,
    /// Evicted to respect `max_groups`.
    Capacity,
    /// Still pending when the input ended.
    EndOfStream,
}

/// Report for a fragment group that never completed.
#[derive(Debug, Clone, PartialEq)]
pub struct IncompleteGroup {
    pub sequence_id: Option<u8>,
    pub channel: Option<char>,
    pub received: u8,
    pub expected: u8,
    pub first_seen: EpochMillis,
    pub reason: IncompleteReason,
}

/// Running counters of a [`FragmentReassembler`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReassemblyStats {
    /// Single-fragment sentences forwarded unchanged.
    pub passed_through: u64,
    /// Multi-fragment messages successfully assembled.
    pub completed: u64,
    /// Fragments dropped without a group to join.
    pub dropped_fragments: u64,
    /// Groups discarded before completion.
    pub incomplete_groups: u64,
}

/// Bounds of the reassembly buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReassemblyParams {
    /// Maximum age of a pending group, in milliseconds.
    pub retention_ms: i64,
    /// Maximum number of pending groups.
    pub max_groups: usize,
}

impl ReassemblyParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> ReassemblyParamsBuilder {
        ReassemblyParamsBuilder::new()
    }
}

impl Default for ReassemblyParams {
    fn default() -> Self {
        ReassemblyParams {
            retention_ms: 60_000,
            max_groups: 4_096,
        }
    }
}

/// Fluent builder for [`ReassemblyParams`].
#[derive(Debug, Clone)]
pub struct ReassemblyParamsBuilder {
    params: ReassemblyParams,
}

impl Default for ReassemblyParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReassemblyParamsBuilder {
    pub fn new() -> Self {
        Self {
            params: ReassemblyParams::default(),
        }
    }

    pub fn retention_ms(mut self, v: i64) -> Self {
        self.params.retention_ms = v;
        self
    }

    pub fn max_groups(mut self, v: usize) -> Self {
        self.params.max_groups = v;
        self
    }

    /// Validate and return the parameters.
    pub fn build(self) -> Result<ReassemblyParams, AisError> {
        let p = self.params;
        if p.retention_ms < 0 {
            return Err(AisError::InvalidReassemblyParameter(
                "retention_ms must be non-negative".into(),
            ));
        }
        if p.max_groups == 0 {
            return Err(AisError::InvalidReassemblyParameter(
                "max_groups must be > 0".into(),
            ));
        }
        Ok(p)
    }
}

type FragmentKey = (Option<u8>, Option<char>);

#[derive(Debug)]
struct FragmentGroup {
    total: u8,
    first_seen: EpochMillis,
    fragments: SmallVec<[RawSentence; 4]>,
}

impl FragmentGroup {
    fn next_index(&self) -> u8 {
        self.fragments.len() as u8 + 1
    }

    fn is_complete(&self) -> bool {
        self.fragments.len() == self.total as usize
    }

    fn assemble(self) -> Option<AisPayload> {
        let fragments = self.fragments.len() as u8;
        let fill_bits = self.fragments.last()?.fill_bits;
        let mut tag_blocks = self.fragments.iter().filter_map(|f| f.tag_block.as_ref());
        let tag_block = tag_blocks
            .clone()
            .find(|t| t.time.is_some())
            .or_else(|| tag_blocks.next())
            .cloned();
        let payload = self
            .fragments
            .iter()
            .map(|f| f.payload.as_str())
            .collect::<String>();
        let first = self.fragments.into_iter().next()?;
        Some(AisPayload {
            talker: first.talker,
            channel: first.channel,
            payload,
            fill_bits,
            tag_block,
            fragments,
        })
    }

    fn report(&self, key: FragmentKey, reason: IncompleteReason) -> IncompleteGroup {
        IncompleteGroup {
            sequence_id: key.0,
            channel: key.1,
            received: self.fragments.len() as u8,
            expected: self.total,
            first_seen: self.first_seen,
            reason,
        }
    }
}

/// Stateful fragment buffer for one input source.
#[derive(Debug)]
pub struct FragmentReassembler {
    params: ReassemblyParams,
    groups: FastHashMap<FragmentKey, FragmentGroup>,
    /// Lower bound of every pending `first_seen`, `None` when nothing is pending.
    oldest_first_seen: Option<EpochMillis>,
    incomplete: Vec<IncompleteGroup>,
    stats: ReassemblyStats,
}

impl Default for FragmentReassembler {
    fn default() -> Self {
        Self::new(ReassemblyParams::default())
    }
}

impl FragmentReassembler {
    pub fn new(params: ReassemblyParams) -> Self {
        FragmentReassembler {
            params,
            groups: FastHashMap::default(),
            oldest_first_seen: None,
            incomplete: Vec::new(),
            stats: ReassemblyStats::default(),
        }
    }

    /// Feed one sentence.
    ///
    /// Arguments
    /// -----------------
    /// * `sentence` – A checksum-validated sentence.
    /// * `now` – Arrival time of the sentence (epoch ms), used for retention.
    ///
    /// Return
    /// ----------
    /// * `Some(payload)` when the sentence completes a message (immediately for single
    ///   fragments), `None` while the message is still pending or when the fragment was dropped.
    pub fn push(&mut self, sentence: RawSentence, now: EpochMillis) -> Option<AisPayload> {
        self.evict_stale(now);

        if sentence.is_single_fragment() {
            self.stats.passed_through += 1;
            return Some(sentence.into());
        }

        let key = (sentence.sequence_id, sentence.channel);
        if let Some(group) = self.groups.get_mut(&key) {
            if sentence.fragment_index == group.next_index()
                && sentence.fragment_count == group.total
            {
                group.fragments.push(sentence);
                if !group.is_complete() {
                    return None;
                }
                let group = self.groups.remove(&key)?;
                self.forget_oldest_if_empty();
                self.stats.completed += 1;
                return group.assemble();
            }

            let reason = if sentence.fragment_index == 1 {
                IncompleteReason::Superseded
            } else {
                IncompleteReason::OutOfOrder
            };
            self.discard(key, reason);
        }

        if sentence.fragment_index != 1 {
            debug!(
                "dropping fragment {}/{} of sequence {:?} on channel {:?}: no pending group",
                sentence.fragment_index,
                sentence.fragment_count,
                sentence.sequence_id,
                sentence.channel
            );
            self.stats.dropped_fragments += 1;
            return None;
        }

        if self.groups.len() >= self.params.max_groups {
            if let Some(oldest) = self
                .groups
                .iter()
                .min_by_key(|(_, g)| g.first_seen)
                .map(|(k, _)| *k)
            {
                self.discard(oldest, IncompleteReason::Capacity);
            }
        }

        let mut fragments = SmallVec::new();
        let total = sentence.fragment_count;
        fragments.push(sentence);
        self.groups.insert(
            key,
            FragmentGroup {
                total,
                first_seen: now,
                fragments,
            },
        );
        self.oldest_first_seen = Some(self.oldest_first_seen.map_or(now, |o| o.min(now)));
        None
    }

    /// Evict every group older than the retention window.
    ///
    /// Pending groups are only scanned when the oldest of them may have expired.
    pub fn evict_stale(&mut self, now: EpochMillis) {
        let retention = self.params.retention_ms;
        match self.oldest_first_seen {
            None => return,
            Some(oldest) if now.saturating_sub(oldest) <= retention => return,
            Some(_) => {}
        }
        let stale: Vec<FragmentKey> = self
            .groups
            .iter()
            .filter(|(_, g)| now.saturating_sub(g.first_seen) > retention)
            .map(|(k, _)| *k)
            .collect();
        for key in stale {
            self.discard(key, IncompleteReason::Expired);
        }
        self.oldest_first_seen = self.groups.values().map(|g| g.first_seen).min();
    }

    fn forget_oldest_if_empty(&mut self) {
        if self.groups.is_empty() {
            self.oldest_first_seen = None;
        }
    }

    fn discard(&mut self, key: FragmentKey, reason: IncompleteReason) {
        if let Some(group) = self.groups.remove(&key) {
            let report = group.report(key, reason);
            debug!("incomplete fragment group: {report:?}");
            self.stats.incomplete_groups += 1;
            self.incomplete.push(report);
        }
        self.forget_oldest_if_empty();
    }

    /// Drain the groups discarded since the last call.
    ///
    /// Reports are buffered until drained; call this after every [`Self::push`] (or
    /// periodically) to keep the buffer bounded.
    pub fn take_incomplete(&mut self) -> Vec<IncompleteGroup> {
        std::mem::take(&mut self.incomplete)
    }

    /// Discard every pending group (end of input) and drain all reports.
    pub fn finish(&mut self) -> Vec<IncompleteGroup> {
        let keys: Vec<FragmentKey> = self.groups.keys().copied().collect();
        for key in keys {
            self.discard(key, IncompleteReason::EndOfStream);
        }
        self.take_incomplete()
    }

    /// Number of groups currently waiting for fragments.
    pub fn pending(&self) -> usize {
        self.groups.len()
    }

    pub fn stats(&self) -> ReassemblyStats {
        self.stats
    }
}
