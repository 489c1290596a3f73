//! Per-bucket fix counts of a partitioning run.
use std::{fmt, io::Write};

use itertools::Itertools;
use serde::Serialize;

use crate::ais_errors::AisError;

/// Count of fixes assigned to each bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    counts: Vec<u64>,
}

#[derive(Serialize)]
struct HistogramRow {
    bucket: usize,
    count: u64,
}

impl Histogram {
    pub fn new(buckets: usize) -> Self {
        Histogram {
            counts: vec![0; buckets],
        }
    }

    /// Count one fix in `bucket`.
    ///
    /// # Panics
    /// Panics if `bucket` is out of range.
    pub fn record(&mut self, bucket: usize) {
        self.counts[bucket] += 1;
    }

    pub fn count(&self, bucket: usize) -> u64 {
        self.counts.get(bucket).copied().unwrap_or(0)
    }

    pub fn buckets(&self) -> usize {
        self.counts.len()
    }

    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Number of buckets holding at least one fix.
    pub fn non_empty(&self) -> usize {
        self.counts.iter().filter(|c| **c > 0).count()
    }

    pub fn max(&self) -> u64 {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    /// Write `bucket,count` rows, with a header, for every bucket.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), AisError> {
        let mut csv = csv::Writer::from_writer(writer);
        for (bucket, &count) in self.counts.iter().enumerate() {
            csv.serialize(HistogramRow { bucket, count })?;
        }
        csv.flush()?;
        Ok(())
    }
}

impl fmt::Display for Histogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} fixes in {}/{} buckets (max {})",
            self.total(),
            self.non_empty(),
            self.buckets(),
            self.max()
        )?;
        let used = self
            .counts
            .iter()
            .enumerate()
            .filter(|(_, c)| **c > 0)
            .map(|(b, c)| format!("{b}:{c}"))
            .join(" ");
        write!(f, "{used}")
    }
}
