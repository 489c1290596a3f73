use thiserror::Error;

#[derive(Error, Debug)]
pub enum AisError {
    #[error("Malformed NMEA sentence: {0}")]
    MalformedSentence(String),

    #[error("Checksum mismatch: expected {expected:02X}, computed {computed:02X}")]
    ChecksumMismatch { expected: u8, computed: u8 },

    #[error("Invalid six-bit armor character: {0:?}")]
    InvalidArmorCharacter(char),

    #[error("Invalid fill bit count: {0}")]
    InvalidFillBits(u8),

    #[error("Binary fix record does not match the requested format: {0}")]
    CodecVariantMismatch(String),

    #[error("Fix has no MMSI but the binary format requires one")]
    MissingMmsi,

    #[error("Fix cannot be represented in the binary format: {0}")]
    InvalidFix(String),

    #[error("Invalid partition parameter: {0}")]
    InvalidPartitionParameter(String),

    #[error("Invalid reassembly parameter: {0}")]
    InvalidReassemblyParameter(String),

    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV write error: {0}")]
    CsvError(#[from] csv::Error),
}

impl PartialEq for AisError {
    fn eq(&self, other: &Self) -> bool {
        use AisError::*;
        match (self, other) {
            (MalformedSentence(a), MalformedSentence(b)) => a == b,
            (
                ChecksumMismatch {
                    expected: e1,
                    computed: c1,
                },
                ChecksumMismatch {
                    expected: e2,
                    computed: c2,
                },
            ) => e1 == e2 && c1 == c2,
            (InvalidArmorCharacter(a), InvalidArmorCharacter(b)) => a == b,
            (InvalidFillBits(a), InvalidFillBits(b)) => a == b,
            (CodecVariantMismatch(a), CodecVariantMismatch(b)) => a == b,
            (InvalidFix(a), InvalidFix(b)) => a == b,
            (InvalidPartitionParameter(a), InvalidPartitionParameter(b)) => a == b,
            (InvalidReassemblyParameter(a), InvalidReassemblyParameter(b)) => a == b,

            // I/O and CSV errors are not comparable: equal when the variant matches
            (IoError(_), IoError(_)) => true,
            (CsvError(_), CsvError(_)) => true,

            (MissingMmsi, MissingMmsi) => true,

            _ => false,
        }
    }
}
