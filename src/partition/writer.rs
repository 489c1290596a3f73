//! One binary fix file per bucket.
use std::{fs::File, io::BufWriter};

use camino::{Utf8Path, Utf8PathBuf};

use crate::{
    ais_errors::AisError,
    fixes::{
        binary_format::{create_fixes_file, BinaryFixWriter, BinaryFixesFormat},
        Fix,
    },
};

/// File name of bucket `bucket` inside the output directory.
pub fn partition_file_name(bucket: usize) -> String {
    format!("partition{bucket}.fix")
}

/// Owns the buffered output of every bucket.
///
/// Files are created (truncated) up front, so empty buckets still produce an empty file.
/// Buffers are flushed by [`PartitionWriter::finish`]; dropping the writer without calling
/// it still closes every file but may lose buffered records.
#[derive(Debug)]
pub struct PartitionWriter {
    outputs: Vec<BinaryFixWriter<BufWriter<File>>>,
    paths: Vec<Utf8PathBuf>,
}

impl PartitionWriter {
    /// Arguments
    /// -----------------
    /// * `output_dir` – Directory receiving `partition{i}.fix`; created if missing.
    /// * `buckets` – Number of output files.
    /// * `format` – Record variant of the written fixes.
    pub fn create(
        output_dir: &Utf8Path,
        buckets: usize,
        format: BinaryFixesFormat,
    ) -> Result<Self, AisError> {
        std::fs::create_dir_all(output_dir)?;
        let paths: Vec<Utf8PathBuf> = (0..buckets)
            .map(|b| output_dir.join(partition_file_name(b)))
            .collect();
        let outputs = paths
            .iter()
            .map(|p| create_fixes_file(p, format))
            .collect::<Result<_, _>>()?;
        Ok(PartitionWriter { outputs, paths })
    }

    pub fn write(&mut self, bucket: usize, fix: &Fix) -> Result<(), AisError> {
        let output = self.outputs.get_mut(bucket).ok_or_else(|| {
            AisError::InvalidPartitionParameter(format!("no output for bucket {bucket}"))
        })?;
        output.write(fix)
    }

    pub fn paths(&self) -> &[Utf8PathBuf] {
        &self.paths
    }

    /// Flush and close every output, returning the file paths in bucket order.
    pub fn finish(self) -> Result<Vec<Utf8PathBuf>, AisError> {
        for output in self.outputs {
            output.into_inner()?;
        }
        Ok(self.paths)
    }
}
