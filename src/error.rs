//! Error types in proxima
//!

use thiserror::Error;

use ndarray::ShapeError;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone)]
pub enum Error {
    #[error("invalid parameter {0}")]
    Parameters(String),
    #[error("empty dataset")]
    EmptyDataset,
    #[error("{0} records do not match {1} targets")]
    SampleCountMismatch(usize, usize),
    #[error("series length mismatch: expected {expected}, got {got}")]
    SeriesLength { expected: usize, got: usize },
    #[error("invalid ndarray shape {0}")]
    NdShape(#[from] ShapeError),
}
