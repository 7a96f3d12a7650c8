use thiserror::Error;

/// Why a single measurement file could not be turned into a valid record.
///
/// Every variant is scoped to one record: the record is kept in the batch
/// with `valid == false` and this error as its cause.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// The file could not be read from disk.
    #[error("failed to read file: {0}")]
    Read(String),

    /// The content is not valid text in the configured encoding.
    #[error("'{encoding}' codec can't decode byte 0x{byte:02x} in position {position}: {reason}")]
    Decode {
        encoding: String,
        byte: u8,
        position: usize,
        reason: &'static str,
    },

    /// Fewer numeric tokens than a header plus end marker needs.
    #[error("Too few values")]
    TooFewValues { found: usize },

    /// The first filename field is not a `YYYYMMDDTHHMMSS` timestamp.
    #[error("malformed timestamp '{field}' in filename: {reason}")]
    MalformedTimestamp { field: String, reason: String },

    /// An `F` or `i` filename tag whose digits overflow the field type.
    #[error("malformed filename tag '{tag}'")]
    MalformedTag { tag: String },

    /// A numeric token that does not fit a 32-bit signed integer.
    #[error("value '{token}' is out of range")]
    ValueOutOfRange { token: String },
}
