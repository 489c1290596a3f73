//! # Binary fix records
//!
//! Fixed-width, headerless, big-endian encoding of [`Fix`] values. A fix file is a plain
//! concatenation of records; the format is **not** self-describing, so writer and reader
//! must agree on the [`BinaryFixesFormat`] out-of-band.
//!
//! ## Layout (format version [`FORMAT_VERSION`])
//! -----------------
//! | offset (WithMmsi / Compact) | size | field | absent sentinel |
//! |---|---|---|---|
//! | 0 / – | 4 | MMSI (`i32`) | – |
//! | 4 / 0 | 4 | latitude (`f32`, degrees) | – |
//! | 8 / 4 | 4 | longitude (`f32`, degrees) | – |
//! | 12 / 8 | 8 | time (`i64`, epoch ms) | – |
//! | 20 / 16 | 4 | latency seconds (`i32`, reserved) | −1 |
//! | 24 / 20 | 2 | source (`i16`, reserved) | 0 |
//! | 26 / 22 | 1 | navigational status (`u8` code) | 127 |
//! | 27 / 23 | 1 | rate of turn (`i8`) | −128 |
//! | 28 / 24 | 2 | speed over ground (`i16`, 1/10 knot) | 1023 |
//! | 30 / 26 | 2 | course over ground (`i16`, 1/10 degree) | 3600 |
//! | 32 / 28 | 2 | heading (`i16`, degrees) | 360 |
//! | 34 / 30 | 1 | AIS class (`u8`, 0 = A, 1 = B) | – |
//!
//! Records are 35 bytes with MMSI and 31 bytes without.
//!
//! ## Round trip
//! -----------------
//! `decode(encode(f)) == f` for every retained field of every representable fix: speed and
//! course are kept at 1/10 resolution, heading in whole degrees. The compact variant drops
//! the MMSI (decoded as `None`). The reserved latency/source slots are written as absent and
//! ignored on read.
//!
//! ## Errors
//! -----------------
//! * [`AisError::CodecVariantMismatch`] – Wrong record length, trailing partial record, or a
//!   record whose content cannot come from the requested format (NaN or out-of-range
//!   coordinates, unknown status/class codes). This indicates a misconfigured caller; it is
//!   never coerced.
//! * [`AisError::MissingMmsi`] / [`AisError::InvalidFix`] – The fix cannot be written.
use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Read, Seek, SeekFrom, Write},
};

use byteorder::{BigEndian, WriteBytesExt};
use camino::Utf8Path;
use nom::{
    number::complete::{be_f32, be_i16, be_i32, be_i64, be_i8, be_u8},
    IResult,
};

use super::{AisClass, Fix};
use crate::{ais::NavigationalStatus, ais_errors::AisError, constants::Mmsi};

/// Version of the record layout documented above.
pub const FORMAT_VERSION: u16 = 1;

/// Bytes of a compact record.
pub const COMPACT_RECORD_BYTES: usize = 31;

/// Bytes of a record carrying the MMSI.
pub const WITH_MMSI_RECORD_BYTES: usize = COMPACT_RECORD_BYTES + 4;

const LATENCY_ABSENT: i32 = -1;
const SOURCE_ABSENT: i16 = 0;
const NAV_STATUS_ABSENT: u8 = 127;
const RATE_OF_TURN_ABSENT: i8 = -128;
const SOG_ABSENT: i16 = 1023;
const COG_ABSENT: i16 = 3600;
const HEADING_ABSENT: i16 = 360;

/// Schema variant of a binary fix record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryFixesFormat {
    WithMmsi,
    Compact,
}

impl BinaryFixesFormat {
    pub const fn record_size(self) -> usize {
        match self {
            BinaryFixesFormat::WithMmsi => WITH_MMSI_RECORD_BYTES,
            BinaryFixesFormat::Compact => COMPACT_RECORD_BYTES,
        }
    }

    pub const fn has_mmsi(self) -> bool {
        matches!(self, BinaryFixesFormat::WithMmsi)
    }

    /// Number of whole records in `bytes` bytes; fails on a trailing partial record.
    pub fn record_count(self, bytes: u64) -> Result<u64, AisError> {
        let size = self.record_size() as u64;
        if bytes % size != 0 {
            return Err(AisError::CodecVariantMismatch(format!(
                "{bytes} bytes is not a multiple of the {size}-byte record"
            )));
        }
        Ok(bytes / size)
    }
}

/// Largest distance to a whole tenth still accepted, in tenths.
const TENTHS_TOLERANCE: f32 = 1e-3;

/// Fixed-point tenths of `value`. Only whole tenths are representable, anything finer is
/// rejected rather than rounded.
fn tenths(value: Option<f32>, absent: i16, limit: i16, what: &str) -> Result<i16, AisError> {
    match value {
        None => Ok(absent),
        Some(v) => {
            let exact = v * 10.0;
            let scaled = exact.round();
            if !(v.is_finite() && scaled >= 0.0 && scaled < f32::from(limit)) {
                Err(AisError::InvalidFix(format!("{what} out of range: {v}")))
            } else if (exact - scaled).abs() > TENTHS_TOLERANCE {
                Err(AisError::InvalidFix(format!("{what} is not a whole tenth: {v}")))
            } else {
                Ok(scaled as i16)
            }
        }
    }
}

/// Encode `fix` into the first `format.record_size()` bytes of `buf`.
///
/// Arguments
/// -----------------
/// * `fix` – The fix to write.
/// * `format` – Record variant.
/// * `buf` – Reusable output buffer, at least one record long.
///
/// Return
/// ----------
/// * `Ok(())`, or [`AisError::MissingMmsi`] / [`AisError::InvalidFix`] when the fix cannot be
///   represented, or [`AisError::CodecVariantMismatch`] when `buf` is too small.
pub fn encode_into(fix: &Fix, format: BinaryFixesFormat, buf: &mut [u8]) -> Result<(), AisError> {
    let size = format.record_size();
    if buf.len() < size {
        return Err(AisError::CodecVariantMismatch(format!(
            "buffer of {} bytes cannot hold a {size}-byte record",
            buf.len()
        )));
    }
    if !(fix.lat.is_finite() && (-90.0..=90.0).contains(&fix.lat)) {
        return Err(AisError::InvalidFix(format!("latitude {}", fix.lat)));
    }
    if !(fix.lon.is_finite() && (-180.0..=180.0).contains(&fix.lon)) {
        return Err(AisError::InvalidFix(format!("longitude {}", fix.lon)));
    }
    let sog = tenths(fix.speed_over_ground, SOG_ABSENT, SOG_ABSENT, "speed")?;
    let cog = tenths(fix.course_over_ground, COG_ABSENT, COG_ABSENT, "course")?;
    let rate_of_turn = match fix.rate_of_turn {
        None => RATE_OF_TURN_ABSENT,
        Some(RATE_OF_TURN_ABSENT) => {
            return Err(AisError::InvalidFix(format!(
                "rate of turn {RATE_OF_TURN_ABSENT} is reserved for absence"
            )))
        }
        Some(rot) => rot,
    };
    let heading = match fix.heading {
        None => HEADING_ABSENT,
        Some(h) if h < HEADING_ABSENT as u16 => h as i16,
        Some(h) => return Err(AisError::InvalidFix(format!("heading {h}"))),
    };

    let mut out = &mut buf[..size];
    if format.has_mmsi() {
        let mmsi = fix.mmsi.ok_or(AisError::MissingMmsi)?;
        let mmsi = i32::try_from(mmsi)
            .map_err(|_| AisError::InvalidFix(format!("mmsi {mmsi}")))?;
        out.write_i32::<BigEndian>(mmsi)?;
    }
    out.write_f32::<BigEndian>(fix.lat)?;
    out.write_f32::<BigEndian>(fix.lon)?;
    out.write_i64::<BigEndian>(fix.time)?;
    out.write_i32::<BigEndian>(LATENCY_ABSENT)?;
    out.write_i16::<BigEndian>(SOURCE_ABSENT)?;
    out.write_u8(
        fix.navigational_status
            .map_or(NAV_STATUS_ABSENT, NavigationalStatus::code),
    )?;
    out.write_i8(rate_of_turn)?;
    out.write_i16::<BigEndian>(sog)?;
    out.write_i16::<BigEndian>(cog)?;
    out.write_i16::<BigEndian>(heading)?;
    out.write_u8(match fix.ais_class {
        AisClass::A => 0,
        AisClass::B => 1,
    })?;
    Ok(())
}

/// Encode `fix` into a freshly allocated record.
pub fn encode(fix: &Fix, format: BinaryFixesFormat) -> Result<Vec<u8>, AisError> {
    let mut buf = vec![0u8; format.record_size()];
    encode_into(fix, format, &mut buf)?;
    Ok(buf)
}

/// Record fields exactly as stored.
struct RawRecord {
    mmsi: Option<i32>,
    lat: f32,
    lon: f32,
    time: i64,
    nav_status: u8,
    rate_of_turn: i8,
    sog: i16,
    cog: i16,
    heading: i16,
    ais_class: u8,
}

fn parse_record(input: &[u8], with_mmsi: bool) -> IResult<&[u8], RawRecord> {
    let (input, mmsi) = if with_mmsi {
        let (input, mmsi) = be_i32(input)?;
        (input, Some(mmsi))
    } else {
        (input, None)
    };
    let (input, lat) = be_f32(input)?;
    let (input, lon) = be_f32(input)?;
    let (input, time) = be_i64(input)?;
    let (input, _latency) = be_i32(input)?;
    let (input, _source) = be_i16(input)?;
    let (input, nav_status) = be_u8(input)?;
    let (input, rate_of_turn) = be_i8(input)?;
    let (input, sog) = be_i16(input)?;
    let (input, cog) = be_i16(input)?;
    let (input, heading) = be_i16(input)?;
    let (input, ais_class) = be_u8(input)?;
    Ok((
        input,
        RawRecord {
            mmsi,
            lat,
            lon,
            time,
            nav_status,
            rate_of_turn,
            sog,
            cog,
            heading,
            ais_class,
        },
    ))
}

fn mismatch(what: String) -> AisError {
    AisError::CodecVariantMismatch(what)
}

impl RawRecord {
    fn into_fix(self) -> Result<Fix, AisError> {
        let mmsi = match self.mmsi {
            None => None,
            Some(m) => Some(Mmsi::try_from(m).map_err(|_| mismatch(format!("mmsi {m}")))?),
        };
        if !(self.lat.is_finite() && (-90.0..=90.0).contains(&self.lat)) {
            return Err(mismatch(format!("latitude {}", self.lat)));
        }
        if !(self.lon.is_finite() && (-180.0..=180.0).contains(&self.lon)) {
            return Err(mismatch(format!("longitude {}", self.lon)));
        }
        let navigational_status = match self.nav_status {
            NAV_STATUS_ABSENT => None,
            code => Some(
                NavigationalStatus::try_from_code(code)
                    .ok_or_else(|| mismatch(format!("navigational status {code}")))?,
            ),
        };
        let speed_over_ground = match self.sog {
            SOG_ABSENT => None,
            v if (0..SOG_ABSENT).contains(&v) => Some(f32::from(v) / 10.0),
            v => return Err(mismatch(format!("speed {v}"))),
        };
        let course_over_ground = match self.cog {
            COG_ABSENT => None,
            v if (0..COG_ABSENT).contains(&v) => Some(f32::from(v) / 10.0),
            v => return Err(mismatch(format!("course {v}"))),
        };
        let heading = match self.heading {
            HEADING_ABSENT => None,
            v if (0..HEADING_ABSENT).contains(&v) => Some(v as u16),
            v => return Err(mismatch(format!("heading {v}"))),
        };
        let ais_class = match self.ais_class {
            0 => AisClass::A,
            1 => AisClass::B,
            v => return Err(mismatch(format!("ais class {v}"))),
        };
        Ok(Fix {
            mmsi,
            lat: self.lat,
            lon: self.lon,
            time: self.time,
            navigational_status,
            rate_of_turn: (self.rate_of_turn != RATE_OF_TURN_ABSENT).then_some(self.rate_of_turn),
            speed_over_ground,
            course_over_ground,
            heading,
            ais_class,
        })
    }
}

/// Decode exactly one record.
///
/// Arguments
/// -----------------
/// * `bytes` – One record, exactly `format.record_size()` bytes long.
/// * `format` – The variant used at write time.
///
/// Return
/// ----------
/// * The decoded [`Fix`] or [`AisError::CodecVariantMismatch`].
pub fn decode(bytes: &[u8], format: BinaryFixesFormat) -> Result<Fix, AisError> {
    if bytes.len() != format.record_size() {
        return Err(mismatch(format!(
            "record of {} bytes, {format:?} records are {} bytes",
            bytes.len(),
            format.record_size()
        )));
    }
    let (_, raw) = parse_record(bytes, format.has_mmsi())
        .map_err(|e| mismatch(format!("unreadable record: {e}")))?;
    raw.into_fix()
}

/// Lazy iterator over the records of an in-memory fix file.
///
/// Restartable: [`FixRecords::starting_at`] positions a new iterator at any record.
#[derive(Debug, Clone)]
pub struct FixRecords<'a> {
    bytes: &'a [u8],
    format: BinaryFixesFormat,
    offset: usize,
}

impl<'a> FixRecords<'a> {
    pub fn new(bytes: &'a [u8], format: BinaryFixesFormat) -> Self {
        FixRecords {
            bytes,
            format,
            offset: 0,
        }
    }

    /// Iterator positioned at record `index` (past the end yields nothing).
    pub fn starting_at(bytes: &'a [u8], format: BinaryFixesFormat, index: usize) -> Self {
        FixRecords {
            bytes,
            format,
            offset: index.saturating_mul(format.record_size()).min(bytes.len()),
        }
    }

    /// Index of the next record to be read.
    pub fn position(&self) -> usize {
        self.offset / self.format.record_size()
    }
}

impl Iterator for FixRecords<'_> {
    type Item = Result<Fix, AisError>;

    fn next(&mut self) -> Option<Self::Item> {
        let remaining = self.bytes.len() - self.offset;
        if remaining == 0 {
            return None;
        }
        let size = self.format.record_size();
        if remaining < size {
            self.offset = self.bytes.len();
            return Some(Err(mismatch(format!(
                "trailing partial record of {remaining} bytes"
            ))));
        }
        let record = &self.bytes[self.offset..self.offset + size];
        self.offset += size;
        Some(decode(record, self.format))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = (self.bytes.len() - self.offset).div_ceil(self.format.record_size());
        (n, Some(n))
    }
}

/// Streaming record reader over any [`Read`] source.
#[derive(Debug)]
pub struct BinaryFixReader<R> {
    reader: R,
    format: BinaryFixesFormat,
    buf: [u8; WITH_MMSI_RECORD_BYTES],
    done: bool,
}

impl<R: Read> BinaryFixReader<R> {
    pub fn new(reader: R, format: BinaryFixesFormat) -> Self {
        BinaryFixReader {
            reader,
            format,
            buf: [0; WITH_MMSI_RECORD_BYTES],
            done: false,
        }
    }

    pub fn format(&self) -> BinaryFixesFormat {
        self.format
    }

    /// Fill one record; returns the number of bytes read (short only at end of stream).
    fn fill(&mut self) -> io::Result<usize> {
        let size = self.format.record_size();
        let mut filled = 0;
        while filled < size {
            match self.reader.read(&mut self.buf[filled..size]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(filled)
    }
}

impl<R: Read + Seek> BinaryFixReader<R> {
    /// Reposition the reader at record `index`.
    pub fn seek_to_record(&mut self, index: u64) -> Result<(), AisError> {
        let offset = index * self.format.record_size() as u64;
        self.reader.seek(SeekFrom::Start(offset))?;
        self.done = false;
        Ok(())
    }
}

impl<R: Read> Iterator for BinaryFixReader<R> {
    type Item = Result<Fix, AisError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let size = self.format.record_size();
        match self.fill() {
            Ok(0) => {
                self.done = true;
                None
            }
            Ok(n) if n < size => {
                self.done = true;
                Some(Err(mismatch(format!("trailing partial record of {n} bytes"))))
            }
            Ok(_) => Some(decode(&self.buf[..size], self.format)),
            Err(e) => {
                self.done = true;
                Some(Err(e.into()))
            }
        }
    }
}

/// Open a fix file for streaming reads.
pub fn read_fixes(
    path: &Utf8Path,
    format: BinaryFixesFormat,
) -> Result<BinaryFixReader<BufReader<File>>, AisError> {
    Ok(BinaryFixReader::new(
        BufReader::new(File::open(path)?),
        format,
    ))
}

/// Streaming record writer reusing one record buffer.
#[derive(Debug)]
pub struct BinaryFixWriter<W: Write> {
    writer: W,
    format: BinaryFixesFormat,
    buf: [u8; WITH_MMSI_RECORD_BYTES],
    written: u64,
}

impl<W: Write> BinaryFixWriter<W> {
    pub fn new(writer: W, format: BinaryFixesFormat) -> Self {
        BinaryFixWriter {
            writer,
            format,
            buf: [0; WITH_MMSI_RECORD_BYTES],
            written: 0,
        }
    }

    pub fn write(&mut self, fix: &Fix) -> Result<(), AisError> {
        let size = self.format.record_size();
        encode_into(fix, self.format, &mut self.buf[..size])?;
        self.writer.write_all(&self.buf[..size])?;
        self.written += 1;
        Ok(())
    }

    pub fn records_written(&self) -> u64 {
        self.written
    }

    pub fn flush(&mut self) -> Result<(), AisError> {
        self.writer.flush()?;
        Ok(())
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(mut self) -> Result<W, AisError> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

/// Create (truncate) a fix file for streaming writes.
pub fn create_fixes_file(
    path: &Utf8Path,
    format: BinaryFixesFormat,
) -> Result<BinaryFixWriter<BufWriter<File>>, AisError> {
    Ok(BinaryFixWriter::new(
        BufWriter::new(File::create(path)?),
        format,
    ))
}
