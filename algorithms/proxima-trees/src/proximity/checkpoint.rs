//! Persistence of interrupted builds.
//!
//! Trees and forests write their build state to disk on a configured
//! interval: whatever is grown so far, the pending work, the generator state
//! and the training time spent. A later fit on the same data picks the file
//! up and continues where the interrupted run stopped, producing the same
//! model the uninterrupted run would have.
//!
//! The envelope is explicit, versioned JSON; the payload type differs
//! between tree and forest but the surrounding fields do not.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::time::Duration;

use rand_chacha::ChaCha8Rng;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use proxima::{Dataset, Float, Label};

use crate::error::{Error, Result};

pub(crate) const FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct Envelope<'a, S> {
    format_version: u32,
    n_samples: usize,
    series_len: usize,
    elapsed: Duration,
    rng: &'a ChaCha8Rng,
    state: &'a S,
}

#[derive(Deserialize)]
pub(crate) struct Checkpoint<S> {
    format_version: u32,
    n_samples: usize,
    series_len: usize,
    pub(crate) elapsed: Duration,
    pub(crate) rng: ChaCha8Rng,
    pub(crate) state: S,
}

impl<S> Checkpoint<S> {
    /// Checks that the checkpoint was taken on data of the same shape.
    pub(crate) fn validate<F: Float, L: Label>(&self, dataset: &Dataset<F, L>) -> Result<()> {
        if self.n_samples != dataset.nsamples() || self.series_len != dataset.series_len() {
            return Err(Error::Fingerprint {
                found_samples: self.n_samples,
                found_len: self.series_len,
                samples: dataset.nsamples(),
                len: dataset.series_len(),
            });
        }
        Ok(())
    }
}

/// Write a build state, replacing the file atomically via a sibling
/// temporary.
pub(crate) fn save<S, F, L>(
    path: &Path,
    dataset: &Dataset<F, L>,
    elapsed: Duration,
    rng: &ChaCha8Rng,
    state: &S,
) -> Result<()>
where
    S: Serialize,
    F: Float,
    L: Label,
{
    let staging = path.with_extension("part");
    let writer = BufWriter::new(File::create(&staging)?);
    serde_json::to_writer(
        writer,
        &Envelope {
            format_version: FORMAT_VERSION,
            n_samples: dataset.nsamples(),
            series_len: dataset.series_len(),
            elapsed,
            rng,
            state,
        },
    )?;
    fs::rename(&staging, path)?;
    Ok(())
}

pub(crate) fn load<S: DeserializeOwned>(path: &Path) -> Result<Checkpoint<S>> {
    let reader = BufReader::new(File::open(path)?);
    let checkpoint: Checkpoint<S> = serde_json::from_reader(reader)?;
    if checkpoint.format_version != FORMAT_VERSION {
        return Err(Error::Version(checkpoint.format_version));
    }
    Ok(checkpoint)
}
