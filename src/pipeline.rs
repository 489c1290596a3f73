//! # Streaming decode pipeline
//!
//! Pull-driven iterator stages from raw text lines to [`DecodedMessage`]s and [`Fix`]es.
//!
//! ```text
//! lines ──parse_line──▶ RawSentence ──FragmentReassembler──▶ AisPayload
//!       ──Bits::from_armor──▶ Bits ──decode_message──▶ DecodedMessage ──Fix::from_message──▶ Fix
//! ```
//!
//! ## Accounting
//! -----------------
//! Rejected lines, unsupported or truncated messages and incomplete fragment groups never stop
//! the stream; each is counted in [`PipelineStats`] and logged at `debug` (or `warn` for
//! incomplete groups). Only I/O errors of the line source are yielded as `Err`, after which
//! the stream ends.
//!
//! ## Time
//! -----------------
//! A message is stamped with the `c:` time of its tag block when present, otherwise with the
//! stream clock (ingestion time). Fragment retention always runs on the stream clock: in real
//! feeds only the first fragment of a group carries `c:`, so tag times cannot serve as a
//! common time base.
use std::io::{self, BufRead};

use hifitime::Epoch;
use log::{debug, info, warn};

use crate::{
    ais::{decode_message, DecodedMessage, MessageOutcome},
    ais_errors::AisError,
    constants::EpochMillis,
    fixes::Fix,
    nmea::{
        parse_line,
        reassembly::{IncompleteGroup, ReassemblyStats},
        FragmentReassembler, ReassemblyParams,
    },
};

/// Wall clock in epoch milliseconds (0 if the system time is unavailable).
pub fn system_clock() -> EpochMillis {
    Epoch::now()
        .map(|e| e.to_unix_milliseconds() as EpochMillis)
        .unwrap_or(0)
}

/// Buffered line source over any reader.
pub fn lines_from_reader<R: BufRead>(reader: R) -> io::Lines<R> {
    reader.lines()
}

/// An item of a line source: plain text, or the fallible lines of a reader.
pub trait SourceLine {
    type Text: AsRef<str>;

    fn into_text(self) -> io::Result<Self::Text>;
}

impl<'a> SourceLine for &'a str {
    type Text = &'a str;

    fn into_text(self) -> io::Result<&'a str> {
        Ok(self)
    }
}

impl<'a> SourceLine for &'a String {
    type Text = &'a str;

    fn into_text(self) -> io::Result<&'a str> {
        Ok(self.as_str())
    }
}

impl SourceLine for String {
    type Text = String;

    fn into_text(self) -> io::Result<String> {
        Ok(self)
    }
}

impl SourceLine for io::Result<String> {
    type Text = String;

    fn into_text(self) -> io::Result<String> {
        self
    }
}

/// Counters of a decode stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Lines read from the source.
    pub lines: u64,
    /// Empty lines, comments and non-AIS sentences.
    pub ignored_lines: u64,
    pub malformed_sentences: u64,
    pub checksum_failures: u64,
    /// Payloads rejected by the six-bit decoder.
    pub invalid_payloads: u64,
    pub decoded_messages: u64,
    pub unsupported_messages: u64,
    pub truncated_messages: u64,
    /// Fixes produced (fix streams only).
    pub fixes: u64,
    /// Decoded messages without a usable position (fix streams only).
    pub messages_without_fix: u64,
    pub reassembly: ReassemblyStats,
}

/// A decoded message and its reception time.
#[derive(Debug, Clone, PartialEq)]
pub struct TimedMessage {
    pub message: DecodedMessage,
    /// Tag block time, or ingestion time.
    pub time: EpochMillis,
    /// Receiving station from the tag block.
    pub source: Option<String>,
}

impl TimedMessage {
    pub fn to_fix(&self) -> Option<Fix> {
        Fix::from_message(&self.message, self.time)
    }
}

/// Lines to decoded messages, owning one [`FragmentReassembler`].
pub struct AisMessageStream<I, C> {
    lines: I,
    clock: C,
    reassembler: FragmentReassembler,
    stats: PipelineStats,
    finished: bool,
}

impl<I> AisMessageStream<I, fn() -> EpochMillis>
where
    I: Iterator,
    I::Item: SourceLine,
{
    /// Stream stamping untagged messages with the system clock.
    pub fn new(lines: I, params: ReassemblyParams) -> Self {
        Self::with_clock(lines, params, system_clock)
    }
}

impl<I, C> AisMessageStream<I, C>
where
    I: Iterator,
    I::Item: SourceLine,
    C: FnMut() -> EpochMillis,
{
    /// Arguments
    /// -----------------
    /// * `lines` – The line source.
    /// * `params` – Fragment retention bounds.
    /// * `clock` – Ingestion time: drives fragment retention and stamps messages without a
    ///   tag block time.
    pub fn with_clock(lines: I, params: ReassemblyParams, clock: C) -> Self {
        AisMessageStream {
            lines,
            clock,
            reassembler: FragmentReassembler::new(params),
            stats: PipelineStats::default(),
            finished: false,
        }
    }

    pub fn stats(&self) -> PipelineStats {
        PipelineStats {
            reassembly: self.reassembler.stats(),
            ..self.stats
        }
    }

    /// Stop reading, report every pending fragment group and return them.
    pub fn finish(&mut self) -> Vec<IncompleteGroup> {
        if self.finished {
            return Vec::new();
        }
        self.finished = true;
        let mut incomplete = self.reassembler.take_incomplete();
        incomplete.extend(self.reassembler.finish());
        if !incomplete.is_empty() {
            warn!(
                "{} fragment group(s) left incomplete at end of stream",
                incomplete.len()
            );
        }
        incomplete
    }

    fn report_incomplete(&mut self) {
        for group in self.reassembler.take_incomplete() {
            warn!(
                "incomplete AIS message ({}/{} fragments, sequence {:?}, channel {:?}): {:?}",
                group.received, group.expected, group.sequence_id, group.channel, group.reason
            );
        }
    }

    fn next_message(&mut self, text: &str) -> Option<TimedMessage> {
        let sentence = match parse_line(text) {
            Ok(Some(sentence)) => sentence,
            Ok(None) => {
                self.stats.ignored_lines += 1;
                return None;
            }
            Err(e @ AisError::ChecksumMismatch { .. }) => {
                debug!("{e}: {text}");
                self.stats.checksum_failures += 1;
                return None;
            }
            Err(e) => {
                debug!("{e}");
                self.stats.malformed_sentences += 1;
                return None;
            }
        };

        let now = (self.clock)();
        let payload = self.reassembler.push(sentence, now);
        self.report_incomplete();
        let payload = payload?;

        let bits = match payload.bits() {
            Ok(bits) => bits,
            Err(e) => {
                debug!("{e}: payload {}", payload.payload);
                self.stats.invalid_payloads += 1;
                return None;
            }
        };

        match decode_message(&bits) {
            MessageOutcome::Decoded(message) => {
                self.stats.decoded_messages += 1;
                Some(TimedMessage {
                    message,
                    time: payload.time().unwrap_or(now),
                    source: payload.tag_block.and_then(|t| t.source),
                })
            }
            MessageOutcome::Unsupported { message_type } => {
                debug!("unsupported message type {message_type}");
                self.stats.unsupported_messages += 1;
                None
            }
            MessageOutcome::Truncated {
                message_type,
                bits,
                required,
            } => {
                debug!("message type {message_type} truncated: {bits} of {required} bits");
                self.stats.truncated_messages += 1;
                None
            }
        }
    }
}

impl<I, C> Iterator for AisMessageStream<I, C>
where
    I: Iterator,
    I::Item: SourceLine,
    C: FnMut() -> EpochMillis,
{
    type Item = Result<TimedMessage, AisError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        loop {
            let Some(line) = self.lines.next() else {
                self.finish();
                return None;
            };
            self.stats.lines += 1;
            let text = match line.into_text() {
                Ok(text) => text,
                Err(e) => {
                    self.finish();
                    return Some(Err(e.into()));
                }
            };
            if let Some(message) = self.next_message(text.as_ref()) {
                return Some(Ok(message));
            }
        }
    }
}

/// Lines to fixes: an [`AisMessageStream`] reduced by [`Fix::from_message`].
pub struct FixStream<I, C> {
    messages: AisMessageStream<I, C>,
    fixes: u64,
    without_fix: u64,
}

impl<I> FixStream<I, fn() -> EpochMillis>
where
    I: Iterator,
    I::Item: SourceLine,
{
    pub fn new(lines: I, params: ReassemblyParams) -> Self {
        Self::from_messages(AisMessageStream::new(lines, params))
    }
}

impl<I, C> FixStream<I, C>
where
    I: Iterator,
    I::Item: SourceLine,
    C: FnMut() -> EpochMillis,
{
    pub fn with_clock(lines: I, params: ReassemblyParams, clock: C) -> Self {
        Self::from_messages(AisMessageStream::with_clock(lines, params, clock))
    }

    pub fn from_messages(messages: AisMessageStream<I, C>) -> Self {
        FixStream {
            messages,
            fixes: 0,
            without_fix: 0,
        }
    }

    pub fn stats(&self) -> PipelineStats {
        PipelineStats {
            fixes: self.fixes,
            messages_without_fix: self.without_fix,
            ..self.messages.stats()
        }
    }
}

impl<I, C> Iterator for FixStream<I, C>
where
    I: Iterator,
    I::Item: SourceLine,
    C: FnMut() -> EpochMillis,
{
    type Item = Result<Fix, AisError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.messages.next()? {
                Ok(message) => match message.to_fix() {
                    Some(fix) => {
                        self.fixes += 1;
                        return Some(Ok(fix));
                    }
                    None => self.without_fix += 1,
                },
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

/// Iterator adapter logging the number of items seen every `every` items.
pub struct LogProgress<I> {
    inner: I,
    label: String,
    every: u64,
    seen: u64,
    done: bool,
}

impl<I: Iterator> Iterator for LogProgress<I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        match self.inner.next() {
            Some(item) => {
                self.seen += 1;
                if self.every > 0 && self.seen % self.every == 0 {
                    info!("{}: {} processed", self.label, self.seen);
                }
                Some(item)
            }
            None => {
                if !self.done {
                    self.done = true;
                    info!("{}: finished after {}", self.label, self.seen);
                }
                None
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<I> LogProgress<I> {
    /// Items seen so far.
    pub fn seen(&self) -> u64 {
        self.seen
    }
}

/// Progress sampling for any iterator.
pub trait ProgressExt: Iterator + Sized {
    /// Log `"<label>: <n> processed"` every `every` items (`0` only logs the final count).
    fn log_progress(self, label: impl Into<String>, every: u64) -> LogProgress<Self> {
        LogProgress {
            inner: self,
            label: label.into(),
            every,
            seen: 0,
            done: false,
        }
    }
}

impl<I: Iterator> ProgressExt for I {}
