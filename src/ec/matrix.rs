//! GF(2^8) Generator Matrices
//!
//! Dense row-major matrices over GF(2^8), using the field arithmetic from
//! `reed-solomon-erasure`. Generator matrices are systematic: the top
//! `data x data` block is the identity, so data shards pass through encoding
//! unchanged and each lower row produces one parity shard.

use crate::error::{Error, Result};
use reed_solomon_erasure::galois_8;

/// A dense matrix over GF(2^8)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    cells: Vec<u8>,
}

impl Matrix {
    /// Create a zero matrix
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![0u8; rows * cols],
        }
    }

    /// Create an identity matrix
    pub fn identity(size: usize) -> Self {
        let mut m = Self::new(size, size);
        for i in 0..size {
            m.set(i, i, 1);
        }
        m
    }

    /// Vandermonde matrix with `cell[r][c] = r^c`.
    ///
    /// Any `cols` rows are linearly independent as long as `rows <= 256`.
    pub fn vandermonde(rows: usize, cols: usize) -> Self {
        let mut m = Self::new(rows, cols);
        for r in 0..rows {
            for c in 0..cols {
                m.set(r, c, galois_8::exp(r as u8, c));
            }
        }
        m
    }

    /// Systematic generator matrix of `total` rows over `data` columns.
    ///
    /// Built as `vandermonde(total, data) * inverse(top data x data block)`,
    /// which keeps every `data`-row subset invertible while turning the top
    /// block into the identity.
    pub fn systematic(data: usize, total: usize) -> Result<Self> {
        if data == 0 || total < data {
            return Err(Error::InvalidEcConfig(format!(
                "cannot build {}x{} generator matrix",
                total, data
            )));
        }
        if total > 256 {
            return Err(Error::InvalidEcConfig(format!(
                "total rows {} exceed GF(2^8) field size",
                total
            )));
        }

        let vm = Self::vandermonde(total, data);
        let top = vm.sub_matrix(0, data);
        let top_inv = top.invert()?;
        vm.multiply(&top_inv)
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Read a cell
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> u8 {
        self.cells[row * self.cols + col]
    }

    /// Write a cell
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: u8) {
        self.cells[row * self.cols + col] = value;
    }

    /// Borrow one row
    pub fn row(&self, row: usize) -> &[u8] {
        &self.cells[row * self.cols..(row + 1) * self.cols]
    }

    /// Mutably borrow one row
    pub fn row_mut(&mut self, row: usize) -> &mut [u8] {
        &mut self.cells[row * self.cols..(row + 1) * self.cols]
    }

    /// Rows `[start, end)` as a new matrix
    pub fn sub_matrix(&self, start: usize, end: usize) -> Self {
        Self {
            rows: end - start,
            cols: self.cols,
            cells: self.cells[start * self.cols..end * self.cols].to_vec(),
        }
    }

    /// Gather the given rows, in order, into a new matrix
    pub fn select_rows(&self, rows: &[usize]) -> Self {
        let mut cells = Vec::with_capacity(rows.len() * self.cols);
        for &r in rows {
            cells.extend_from_slice(self.row(r));
        }
        Self {
            rows: rows.len(),
            cols: self.cols,
            cells,
        }
    }

    /// Matrix product `self * rhs`
    pub fn multiply(&self, rhs: &Matrix) -> Result<Self> {
        if self.cols != rhs.rows {
            return Err(Error::InvalidEcConfig(format!(
                "cannot multiply {}x{} by {}x{}",
                self.rows, self.cols, rhs.rows, rhs.cols
            )));
        }

        let mut out = Self::new(self.rows, rhs.cols);
        for r in 0..self.rows {
            for c in 0..rhs.cols {
                let mut acc = 0u8;
                for k in 0..self.cols {
                    acc ^= galois_8::mul(self.get(r, k), rhs.get(k, c));
                }
                out.set(r, c, acc);
            }
        }
        Ok(out)
    }

    /// Invert a square matrix with Gauss-Jordan elimination
    pub fn invert(&self) -> Result<Self> {
        if self.rows != self.cols {
            return Err(Error::InvalidEcConfig(format!(
                "cannot invert non-square {}x{} matrix",
                self.rows, self.cols
            )));
        }

        let n = self.rows;
        let mut work = self.clone();
        let mut inv = Self::identity(n);

        for col in 0..n {
            if work.get(col, col) == 0 {
                let pivot = (col + 1..n)
                    .find(|&r| work.get(r, col) != 0)
                    .ok_or(Error::SingularMatrix)?;
                work.swap_rows(col, pivot);
                inv.swap_rows(col, pivot);
            }

            let p = work.get(col, col);
            if p != 1 {
                let scale = galois_8::div(1, p);
                work.scale_row(col, scale);
                inv.scale_row(col, scale);
            }

            for r in 0..n {
                let factor = work.get(r, col);
                if r != col && factor != 0 {
                    work.add_scaled_row(col, r, factor);
                    inv.add_scaled_row(col, r, factor);
                }
            }
        }

        Ok(inv)
    }

    fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for c in 0..self.cols {
            self.cells.swap(a * self.cols + c, b * self.cols + c);
        }
    }

    fn scale_row(&mut self, row: usize, factor: u8) {
        for cell in self.row_mut(row) {
            *cell = galois_8::mul(*cell, factor);
        }
    }

    /// `row[dst] += factor * row[src]`
    fn add_scaled_row(&mut self, src: usize, dst: usize, factor: u8) {
        for c in 0..self.cols {
            let v = galois_8::mul(factor, self.get(src, c));
            let idx = dst * self.cols + c;
            self.cells[idx] ^= v;
        }
    }
}
