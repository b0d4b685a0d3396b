use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] proxima::Error),
    #[error("invalid parameter: {0}")]
    Parameters(String),
    #[error("checkpoint io failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("checkpoint is not readable: {0}")]
    Format(#[from] serde_json::Error),
    #[error("unsupported checkpoint format version {0}")]
    Version(u32),
    #[error(
        "checkpoint was taken on different data: {found_samples} samples of length {found_len}, \
         training data has {samples} of length {len}"
    )]
    Fingerprint {
        found_samples: usize,
        found_len: usize,
        samples: usize,
        len: usize,
    },
}
