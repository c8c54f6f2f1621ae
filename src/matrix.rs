//! Fixed-size matrices and the numeric kernels the interpreter runs on them.
//!
//! Every matrix in the calculator has the same shape, [`ROWS`] x [`COLS`], known
//! at compile time. Kernels come in two flavours: the plain ones read their
//! operands and write a distinct destination, and the `*_in_place` ones are used
//! when the destination is also one of the operands.

use std::fmt;
use std::ops::{Add, Mul, Sub};

/// Number of rows of every matrix.
pub const ROWS: usize = 4;
/// Number of columns of every matrix.
pub const COLS: usize = 4;
/// Number of cells of every matrix, the size of a `read_mat` buffer.
pub const CELLS: usize = ROWS * COLS;

/// Field width used when printing a single cell.
pub const PRINT_WIDTH: usize = 8;
/// Digits after the decimal point when printing a single cell.
pub const PRINT_PRECISION: usize = 2;

// In-place transpose and multiplying a matrix by itself only work on squares.
const _: () = assert!(ROWS == COLS, "matrices must be square");

/// A `ROWS` x `COLS` grid of real numbers, stored row by row.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Matrix {
    data: [[f64; COLS]; ROWS],
}

impl Matrix {
    /// A matrix with every cell set to zero.
    pub fn zeros() -> Self {
        Self::default()
    }

    /// The identity matrix.
    pub fn identity() -> Self {
        let mut m = Self::zeros();
        for i in 0..ROWS {
            m.data[i][i] = 1.0;
        }
        m
    }

    /// Build a matrix from values in row-major order.
    ///
    /// Cells without a corresponding value stay zero; values past [`CELLS`] are ignored.
    pub fn from_row_major(values: &[f64]) -> Self {
        let mut m = Self::zeros();
        m.fill_row_major(values);
        m
    }

    /// Overwrite the whole grid from values in row-major order, zero-filling the tail.
    pub fn fill_row_major(&mut self, values: &[f64]) {
        let mut values = values.iter().copied();
        for row in self.data.iter_mut() {
            for cell in row.iter_mut() {
                *cell = values.next().unwrap_or(0.0);
            }
        }
    }

    /// All cells in row-major order.
    pub fn to_row_major(&self) -> [f64; CELLS] {
        let mut out = [0.0; CELLS];
        for (i, value) in self.data.iter().flatten().enumerate() {
            out[i] = *value;
        }
        out
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row][col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.data[row][col] = value;
    }

    /// Largest absolute cell-wise difference between two matrices.
    pub fn max_abs_diff(&self, other: &Matrix) -> f64 {
        self.data
            .iter()
            .flatten()
            .zip(other.data.iter().flatten())
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max)
    }

    fn zip_with(&self, other: &Matrix, f: impl Fn(f64, f64) -> f64) -> Matrix {
        let mut out = Matrix::zeros();
        for row in 0..ROWS {
            for col in 0..COLS {
                out.data[row][col] = f(self.data[row][col], other.data[row][col]);
            }
        }
        out
    }
}

impl Add for Matrix {
    type Output = Matrix;

    fn add(self, rhs: Matrix) -> Matrix {
        self.zip_with(&rhs, |a, b| a + b)
    }
}

impl Sub for Matrix {
    type Output = Matrix;

    fn sub(self, rhs: Matrix) -> Matrix {
        self.zip_with(&rhs, |a, b| a - b)
    }
}

impl Mul<f64> for Matrix {
    type Output = Matrix;

    fn mul(self, scalar: f64) -> Matrix {
        let mut out = self;
        for cell in out.data.iter_mut().flatten() {
            *cell *= scalar;
        }
        out
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.data {
            for value in row {
                write!(f, "{:>width$.prec$} ", value, width = PRINT_WIDTH, prec = PRINT_PRECISION)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// `result = lhs × rhs`, written straight into `result`.
///
/// `result` is cleared first, so it must not be one of the operands; the borrow
/// checker enforces that here.
pub fn multiply(lhs: &Matrix, rhs: &Matrix, result: &mut Matrix) {
    *result = Matrix::zeros();
    accumulate_product(lhs, rhs, result);
}

/// `target = target × rhs`.
pub fn multiply_in_place(target: &mut Matrix, rhs: &Matrix) {
    let mut temp = Matrix::zeros();
    accumulate_product(target, rhs, &mut temp);
    *target = temp;
}

/// `target = lhs × target`.
pub fn premultiply_in_place(lhs: &Matrix, target: &mut Matrix) {
    let mut temp = Matrix::zeros();
    accumulate_product(lhs, target, &mut temp);
    *target = temp;
}

/// `target = target × target`.
pub fn square_in_place(target: &mut Matrix) {
    let mut temp = Matrix::zeros();
    accumulate_product(target, target, &mut temp);
    *target = temp;
}

fn accumulate_product(lhs: &Matrix, rhs: &Matrix, acc: &mut Matrix) {
    for row in 0..ROWS {
        for col in 0..COLS {
            for inner in 0..COLS {
                acc.data[row][col] += lhs.data[row][inner] * rhs.data[inner][col];
            }
        }
    }
}

/// Write the transpose of `original` into a distinct `transposed`.
pub fn transpose(original: &Matrix, transposed: &mut Matrix) {
    for row in 0..ROWS {
        for col in 0..COLS {
            transposed.data[col][row] = original.data[row][col];
        }
    }
}

/// Transpose by swapping every cell above the diagonal with its mirror.
pub fn transpose_in_place(matrix: &mut Matrix) {
    for row in 0..ROWS {
        for col in (row + 1)..COLS {
            let upper = matrix.data[row][col];
            matrix.data[row][col] = matrix.data[col][row];
            matrix.data[col][row] = upper;
        }
    }
}
