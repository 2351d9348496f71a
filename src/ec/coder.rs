//! Matrix Erasure Coder
//!
//! A systematic erasure code over an explicit GF(2^8) generator matrix.
//! Provides the three primitives the LRC codec is composed from:
//!
//! - `encode`: compute parity shards from data shards
//! - `reconstruct`: fill every missing shard given at least k survivors
//! - `verify`: check parity shards against data shards
//!
//! `reed-solomon-erasure` supplies the field arithmetic; the generator matrix
//! is owned here so callers can splice rows between codes.

use crate::ec::matrix::Matrix;
use crate::error::{Error, Result};
use reed_solomon_erasure::galois_8;

/// Erasure coder for `data_shards + parity_shards` over a generator matrix
#[derive(Debug, Clone)]
pub struct MatrixCoder {
    /// Number of data shards (k)
    data_shards: usize,
    /// Number of parity shards (m)
    parity_shards: usize,
    /// (k + m) x k generator, identity on top
    matrix: Matrix,
}

impl MatrixCoder {
    /// Create a coder over the standard systematic Vandermonde generator
    pub fn new(data_shards: usize, parity_shards: usize) -> Result<Self> {
        let matrix = Matrix::systematic(data_shards, data_shards + parity_shards)?;
        Self::with_matrix(data_shards, parity_shards, matrix)
    }

    /// Create a coder over a caller-supplied generator matrix
    pub fn with_matrix(data_shards: usize, parity_shards: usize, matrix: Matrix) -> Result<Self> {
        if data_shards == 0 {
            return Err(Error::InvalidEcConfig(
                "data_shards must be greater than 0".to_string(),
            ));
        }
        if parity_shards == 0 {
            return Err(Error::InvalidEcConfig(
                "parity_shards must be greater than 0".to_string(),
            ));
        }
        if matrix.rows() != data_shards + parity_shards || matrix.cols() != data_shards {
            return Err(Error::InvalidEcConfig(format!(
                "generator must be {}x{}, got {}x{}",
                data_shards + parity_shards,
                data_shards,
                matrix.rows(),
                matrix.cols()
            )));
        }

        Ok(Self {
            data_shards,
            parity_shards,
            matrix,
        })
    }

    /// Get the number of data shards
    pub fn data_shards(&self) -> usize {
        self.data_shards
    }

    /// Get the number of parity shards
    pub fn parity_shards(&self) -> usize {
        self.parity_shards
    }

    /// Get the total number of shards
    pub fn total_shards(&self) -> usize {
        self.data_shards + self.parity_shards
    }

    /// Get the generator matrix
    pub fn matrix(&self) -> &Matrix {
        &self.matrix
    }

    /// Compute all parity shards from the data shards
    pub fn encode(&self, data: &[&[u8]], parity: &mut [&mut [u8]]) -> Result<()> {
        if data.len() != self.data_shards {
            return Err(Error::ShardCountMismatch {
                expected: self.data_shards,
                actual: data.len(),
            });
        }
        if parity.len() != self.parity_shards {
            return Err(Error::ShardCountMismatch {
                expected: self.parity_shards,
                actual: parity.len(),
            });
        }
        let size = uniform_len(data.iter().copied())?;
        if let Some(bad) = parity.iter().position(|p| p.len() != size) {
            return Err(Error::ShardShapeInvalid(format!(
                "parity shard {} has length {}, expected {}",
                bad,
                parity[bad].len(),
                size
            )));
        }

        for (p, out) in parity.iter_mut().enumerate() {
            self.apply_row(self.data_shards + p, data, out);
        }
        Ok(())
    }

    /// Check that every parity shard matches the data shards
    pub fn verify(&self, shards: &[&[u8]]) -> Result<bool> {
        if shards.len() != self.total_shards() {
            return Err(Error::ShardCountMismatch {
                expected: self.total_shards(),
                actual: shards.len(),
            });
        }
        let size = uniform_len(shards.iter().copied())?;

        let (data, parity) = shards.split_at(self.data_shards);
        let mut scratch = vec![0u8; size];
        for (p, expected) in parity.iter().enumerate() {
            self.apply_row(self.data_shards + p, data, &mut scratch);
            if scratch.as_slice() != *expected {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Reconstruct every `None` shard in place.
    ///
    /// Requires at least `data_shards` present shards of equal length. On
    /// error the slice is left exactly as it was passed in.
    pub fn reconstruct(&self, shards: &mut [Option<Vec<u8>>]) -> Result<()> {
        if shards.len() != self.total_shards() {
            return Err(Error::ShardCountMismatch {
                expected: self.total_shards(),
                actual: shards.len(),
            });
        }
        let size = uniform_len(shards.iter().filter_map(|s| s.as_deref()))?;

        let present = shards.iter().filter(|s| s.is_some()).count();
        if present == shards.len() {
            return Ok(());
        }
        if present < self.data_shards {
            return Err(Error::TooFewShards {
                available: present,
                required: self.data_shards,
            });
        }

        // Decode data shards from the first k survivors
        let mut recovered: Vec<(usize, Vec<u8>)> = Vec::new();
        {
            let (rows, inputs): (Vec<usize>, Vec<&[u8]>) = shards
                .iter()
                .enumerate()
                .filter_map(|(i, s)| s.as_deref().map(|b| (i, b)))
                .take(self.data_shards)
                .unzip();
            let decode = self.matrix.select_rows(&rows).invert()?;

            for i in 0..self.data_shards {
                if shards[i].is_some() {
                    continue;
                }
                let mut out = vec![0u8; size];
                for (j, input) in inputs.iter().enumerate() {
                    galois_8::mul_slice_xor(decode.get(i, j), input, &mut out);
                }
                recovered.push((i, out));
            }
        }
        for (i, out) in recovered {
            shards[i] = Some(out);
        }

        // Re-encode missing parity from the now complete data
        let mut parity_out: Vec<(usize, Vec<u8>)> = Vec::new();
        {
            let data: Vec<&[u8]> = shards[..self.data_shards]
                .iter()
                .filter_map(|s| s.as_deref())
                .collect();
            for p in 0..self.parity_shards {
                let idx = self.data_shards + p;
                if shards[idx].is_some() {
                    continue;
                }
                let mut out = vec![0u8; size];
                self.apply_row(idx, &data, &mut out);
                parity_out.push((idx, out));
            }
        }
        for (idx, out) in parity_out {
            shards[idx] = Some(out);
        }

        Ok(())
    }

    /// `out = matrix[row] . data`
    fn apply_row(&self, row: usize, data: &[&[u8]], out: &mut [u8]) {
        let coefficients = self.matrix.row(row);
        galois_8::mul_slice(coefficients[0], data[0], out);
        for (c, input) in coefficients.iter().zip(data.iter()).skip(1) {
            galois_8::mul_slice_xor(*c, input, out);
        }
    }
}

/// Common length of a set of shards; all must be non-empty and equal
pub(crate) fn uniform_len<'a>(shards: impl Iterator<Item = &'a [u8]>) -> Result<usize> {
    let mut size = None;
    for (i, shard) in shards.enumerate() {
        if shard.is_empty() {
            return Err(Error::ShardShapeInvalid(format!("shard {} is empty", i)));
        }
        match size {
            None => size = Some(shard.len()),
            Some(s) if s != shard.len() => {
                return Err(Error::ShardShapeInvalid(format!(
                    "shard {} has length {}, expected {}",
                    i,
                    shard.len(),
                    s
                )));
            }
            Some(_) => {}
        }
    }
    size.ok_or_else(|| Error::ShardShapeInvalid("no shards present".to_string()))
}
