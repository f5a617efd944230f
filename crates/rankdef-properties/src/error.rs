/// Error while encoding or decoding a property blob.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Key or value contains one of the two separator characters.
    #[error("property `{key}` contains a reserved separator character")]
    SeparatorInContent { key: String },

    #[error("compression stream failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("decompressed properties are not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Blob ended in the middle of a property.
    #[error("truncated property blob")]
    Truncated,
}
