//! # Spatial-temporal partitioning
//!
//! Splits a stream of [`Fix`]es into `buckets` groups such that fixes close in space
//! and time tend to share a bucket.
//!
//! ## Method
//! -----------------
//! 1. Latitude (`[-90, 90]`), longitude (`[-180, 180]`) and time (`[min, max]` of the input)
//!    are each normalized to `[0, 1]` and quantized to `bits`-bit integers
//!    (`floor(norm · 2^bits)`, clamped to `2^bits − 1`). A degenerate time range maps every
//!    fix to time cell 0.
//! 2. The three coordinates are mapped to a scalar index on a 3-D [`HilbertCurve`].
//! 3. The index range `[0, 2^(3·bits))` is cut into `buckets` equal steps of
//!    `2^(3·bits) / buckets`; the last bucket absorbs the remainder.
//!
//! Identical inputs always land in the same bucket and every fix lands in exactly one bucket.
//!
//! ## File workflow
//! -----------------
//! [`partition_file`] reads a binary fix file twice: once to find the [`TimeBounds`], once to
//! write each fix to `partition{i}.fix` in the output directory.
pub mod histogram;
pub mod hilbert;
pub mod writer;

pub use histogram::Histogram;
pub use hilbert::HilbertCurve;
pub use writer::PartitionWriter;

use camino::{Utf8Path, Utf8PathBuf};
use itertools::{Itertools, MinMaxResult};
use log::info;

use crate::{
    ais_errors::AisError,
    constants::EpochMillis,
    fixes::{
        binary_format::{read_fixes, BinaryFixesFormat},
        Fix,
    },
};

#[cfg(feature = "progress")]
use indicatif::{ProgressBar, ProgressStyle};

/// Quantized dimensions: latitude, longitude, time.
pub const PARTITION_DIMS: usize = 3;

/// Parameters of the spatial-temporal partitioner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionParams {
    /// Bits per quantized coordinate.
    pub bits: u32,
    /// Number of output buckets.
    pub buckets: usize,
}

impl PartitionParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> PartitionParamsBuilder {
        PartitionParamsBuilder::new()
    }

    /// Check `1 ≤ bits`, `3·bits ≤ 63` and `1 ≤ buckets ≤ 2^(3·bits)`.
    pub fn validate(&self) -> Result<(), AisError> {
        if self.bits == 0 {
            return Err(AisError::InvalidPartitionParameter(
                "bits must be ≥ 1".into(),
            ));
        }
        let total = u64::from(self.bits) * PARTITION_DIMS as u64;
        if total > u64::from(HilbertCurve::MAX_TOTAL_BITS) {
            return Err(AisError::InvalidPartitionParameter(format!(
                "3·bits = {total} exceeds {}",
                HilbertCurve::MAX_TOTAL_BITS
            )));
        }
        if self.buckets == 0 || self.buckets as u64 > 1u64 << total {
            return Err(AisError::InvalidPartitionParameter(format!(
                "buckets must be in [1, 2^{total}], got {}",
                self.buckets
            )));
        }
        Ok(())
    }
}

impl Default for PartitionParams {
    fn default() -> Self {
        PartitionParams {
            bits: 16,
            buckets: 800,
        }
    }
}

/// Fluent builder for [`PartitionParams`].
#[derive(Debug, Clone)]
pub struct PartitionParamsBuilder {
    params: PartitionParams,
}

impl Default for PartitionParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PartitionParamsBuilder {
    pub fn new() -> Self {
        Self {
            params: PartitionParams::default(),
        }
    }

    pub fn bits(mut self, v: u32) -> Self {
        self.params.bits = v;
        self
    }

    pub fn buckets(mut self, v: usize) -> Self {
        self.params.buckets = v;
        self
    }

    /// Validate and return the parameters.
    pub fn build(self) -> Result<PartitionParams, AisError> {
        self.params.validate()?;
        Ok(self.params)
    }
}

/// Inclusive time range of a fix set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeBounds {
    pub min: EpochMillis,
    pub max: EpochMillis,
}

impl TimeBounds {
    pub fn new(min: EpochMillis, max: EpochMillis) -> Self {
        TimeBounds {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Single pass over `fixes`; `None` when there are none.
    pub fn from_fixes<I>(fixes: I) -> Option<TimeBounds>
    where
        I: IntoIterator<Item = Fix>,
    {
        match fixes.into_iter().map(|f| f.time).minmax() {
            MinMaxResult::NoElements => None,
            MinMaxResult::OneElement(t) => Some(TimeBounds::new(t, t)),
            MinMaxResult::MinMax(min, max) => Some(TimeBounds::new(min, max)),
        }
    }

    pub fn span(&self) -> EpochMillis {
        self.max - self.min
    }
}

/// Maps fixes to buckets.
#[derive(Debug, Clone)]
pub struct Partitioner {
    params: PartitionParams,
    bounds: TimeBounds,
    curve: HilbertCurve,
    step: u64,
}

fn quantize_unit(norm: f64, side: u64) -> u64 {
    let scaled = (norm * side as f64).floor();
    if scaled.is_nan() || scaled < 0.0 {
        0
    } else {
        (scaled as u64).min(side - 1)
    }
}

impl Partitioner {
    /// Arguments
    /// -----------------
    /// * `params` – Quantization bits and bucket count; validated here.
    /// * `bounds` – Time range used to normalize fix times.
    pub fn new(params: PartitionParams, bounds: TimeBounds) -> Result<Self, AisError> {
        params.validate()?;
        let curve = HilbertCurve::new(params.bits, PARTITION_DIMS)?;
        let step = curve.cells() / params.buckets as u64;
        Ok(Partitioner {
            params,
            bounds,
            curve,
            step,
        })
    }

    pub fn params(&self) -> PartitionParams {
        self.params
    }

    pub fn bounds(&self) -> TimeBounds {
        self.bounds
    }

    /// Quantized `[lat, lon, time]` grid coordinates of a fix.
    pub fn quantize(&self, fix: &Fix) -> [u64; PARTITION_DIMS] {
        let side = self.curve.side();
        let lat = (f64::from(fix.lat) + 90.0) / 180.0;
        let lon = (f64::from(fix.lon) + 180.0) / 360.0;
        let time = if self.bounds.span() == 0 {
            0.0
        } else {
            (fix.time - self.bounds.min) as f64 / self.bounds.span() as f64
        };
        [
            quantize_unit(lat, side),
            quantize_unit(lon, side),
            quantize_unit(time, side),
        ]
    }

    /// Hilbert index of a fix.
    pub fn index(&self, fix: &Fix) -> u64 {
        self.curve.index(&self.quantize(fix))
    }

    /// Bucket of a Hilbert index.
    pub fn bucket_of_index(&self, index: u64) -> usize {
        ((index / self.step) as usize).min(self.params.buckets - 1)
    }

    /// Bucket of a fix, in `[0, buckets)`.
    pub fn bucket(&self, fix: &Fix) -> usize {
        self.bucket_of_index(self.index(fix))
    }
}

/// Outcome of [`partition_file`].
#[derive(Debug, Clone)]
pub struct PartitionSummary {
    /// `None` when the input holds no fix.
    pub bounds: Option<TimeBounds>,
    pub histogram: Histogram,
    /// Output files, in bucket order.
    pub files: Vec<Utf8PathBuf>,
}

/// Partition a binary fix file into `params.buckets` files.
///
/// Arguments
/// -----------------
/// * `input` – Binary fix file.
/// * `output_dir` – Directory receiving `partition{i}.fix` (created if missing).
/// * `format` – Record variant of both input and output.
/// * `params` – Partitioner parameters.
///
/// Return
/// ----------
/// * A [`PartitionSummary`], or the first I/O or decoding error.
///
/// See also
/// ------------
/// * [`Partitioner::bucket`] – The per-fix assignment.
pub fn partition_file(
    input: &Utf8Path,
    output_dir: &Utf8Path,
    format: BinaryFixesFormat,
    params: &PartitionParams,
) -> Result<PartitionSummary, AisError> {
    params.validate()?;

    let bounds = itertools::process_results(read_fixes(input, format)?, |fixes| {
        TimeBounds::from_fixes(fixes)
    })?;
    let partitioner = Partitioner::new(*params, bounds.unwrap_or(TimeBounds::new(0, 0)))?;

    let mut writer = PartitionWriter::create(output_dir, params.buckets, format)?;
    let mut histogram = Histogram::new(params.buckets);

    #[cfg(feature = "progress")]
    let pb = {
        let records = format.record_count(std::fs::metadata(input)?.len())?;
        let pb = ProgressBar::new(records.max(1));
        pb.set_style(
            ProgressStyle::with_template(
                "{bar:40.cyan/blue} {pos}/{len} ({percent:>3}%) | {per_sec} | ETA {eta_precise}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        pb
    };

    for fix in read_fixes(input, format)? {
        let fix = fix?;
        let bucket = partitioner.bucket(&fix);
        writer.write(bucket, &fix)?;
        histogram.record(bucket);
        #[cfg(feature = "progress")]
        pb.inc(1);
    }

    #[cfg(feature = "progress")]
    pb.finish_and_clear();

    let files = writer.finish()?;
    info!(
        "partitioned {} fixes from {input} into {}/{} non-empty buckets under {output_dir}",
        histogram.total(),
        histogram.non_empty(),
        params.buckets
    );
    Ok(PartitionSummary {
        bounds,
        histogram,
        files,
    })
}

#[cfg(test)]
mod test_partitioner {
    use super::*;

    fn partitioner(bits: u32, buckets: usize, bounds: TimeBounds) -> Partitioner {
        Partitioner::new(
            PartitionParams::builder()
                .bits(bits)
                .buckets(buckets)
                .build()
                .unwrap(),
            bounds,
        )
        .unwrap()
    }

    #[test]
    fn test_params_validation() {
        assert_eq!(
            PartitionParams::builder().build().unwrap(),
            PartitionParams {
                bits: 16,
                buckets: 800
            }
        );
        assert!(PartitionParams::builder().bits(0).build().is_err());
        assert!(PartitionParams::builder().bits(22).build().is_err());
        assert!(PartitionParams::builder().bits(21).build().is_ok());
        assert!(PartitionParams::builder().buckets(0).build().is_err());
        assert!(PartitionParams::builder().bits(1).buckets(8).build().is_ok());
        assert!(matches!(
            PartitionParams::builder().bits(1).buckets(9).build(),
            Err(AisError::InvalidPartitionParameter(_))
        ));
    }

    #[test]
    fn test_time_bounds() {
        assert_eq!(TimeBounds::from_fixes(Vec::new()), None);
        let fixes = vec![
            Fix::new(1, 0.0, 0.0, 50),
            Fix::new(1, 0.0, 0.0, -10),
            Fix::new(1, 0.0, 0.0, 20),
        ];
        assert_eq!(
            TimeBounds::from_fixes(fixes.iter().copied()),
            Some(TimeBounds { min: -10, max: 50 })
        );
        assert_eq!(
            TimeBounds::from_fixes([Fix::new(1, 0.0, 0.0, 7)]),
            Some(TimeBounds { min: 7, max: 7 })
        );
        assert_eq!(TimeBounds::new(5, 1), TimeBounds { min: 1, max: 5 });
    }

    #[test]
    fn test_quantize_extremes() {
        let p = partitioner(4, 8, TimeBounds::new(0, 1000));
        assert_eq!(p.quantize(&Fix::new(1, -90.0, -180.0, 0)), [0, 0, 0]);
        assert_eq!(p.quantize(&Fix::new(1, 90.0, 180.0, 1000)), [15, 15, 15]);
        assert_eq!(p.quantize(&Fix::new(1, 0.0, 0.0, 500)), [8, 8, 8]);
        // outside the bounds clamps
        assert_eq!(p.quantize(&Fix::new(1, 0.0, 0.0, 5000))[2], 15);
        assert_eq!(p.quantize(&Fix::new(1, 0.0, 0.0, -5000))[2], 0);

        let flat = partitioner(4, 8, TimeBounds::new(42, 42));
        assert_eq!(flat.quantize(&Fix::new(1, 0.0, 0.0, 42))[2], 0);
    }

    #[test]
    fn test_bucket_range() {
        let p = partitioner(2, 5, TimeBounds::new(0, 100));
        // 64 cells, step 12: buckets 0..=4, last one absorbs indices 48..64
        assert_eq!(p.bucket_of_index(0), 0);
        assert_eq!(p.bucket_of_index(11), 0);
        assert_eq!(p.bucket_of_index(12), 1);
        assert_eq!(p.bucket_of_index(47), 3);
        assert_eq!(p.bucket_of_index(60), 4);
        assert_eq!(p.bucket_of_index(63), 4);

        let origin = Fix::new(1, -90.0, -180.0, 0);
        assert_eq!(p.index(&origin), 0);
        assert_eq!(p.bucket(&origin), 0);
    }

    #[test]
    fn test_deterministic() {
        let p = partitioner(16, 800, TimeBounds::new(0, 86_400_000));
        let fix = Fix::new(1, 51.5, -0.12, 43_200_000);
        let again = Fix::new(2, 51.5, -0.12, 43_200_000);
        assert_eq!(p.bucket(&fix), p.bucket(&again));
        assert!(p.bucket(&fix) < 800);
    }
}
