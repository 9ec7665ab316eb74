//! Row-major integer matrix.
//!
//! Used for tile maps and collision masks. Every operation that can go out
//! of shape returns a [`MathError`].

use thiserror::Error;

/// Errors from matrix operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MathError {
    /// Cell coordinates outside the matrix.
    #[error("cell ({column}, {row}) outside {width}x{height} matrix")]
    OutOfBounds {
        /// Requested column.
        column: usize,
        /// Requested row.
        row: usize,
        /// Matrix width.
        width: usize,
        /// Matrix height.
        height: usize,
    },

    /// Operands do not have compatible shapes.
    #[error("shape mismatch: {left_width}x{left_height} vs {right_width}x{right_height}")]
    ShapeMismatch {
        /// Left operand width.
        left_width: usize,
        /// Left operand height.
        left_height: usize,
        /// Right operand width.
        right_width: usize,
        /// Right operand height.
        right_height: usize,
    },

    /// Backing data does not fill the matrix exactly.
    #[error("expected {expected} values, got {actual}")]
    DataLength {
        /// Cells in the matrix.
        expected: usize,
        /// Values supplied.
        actual: usize,
    },

    /// An element result does not fit in `i32`.
    #[error("integer overflow in matrix {operation}")]
    Overflow {
        /// Operation that overflowed.
        operation: &'static str,
    },
}

/// `width` columns by `height` rows of `i32`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Matrix {
    width: usize,
    height: usize,
    values: Vec<i32>,
}

impl Matrix {
    /// Creates a zero-filled matrix.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            values: vec![0; width * height],
        }
    }

    /// Wraps existing row-major data.
    ///
    /// # Errors
    ///
    /// Returns [`MathError::DataLength`] unless `values.len() == width * height`.
    pub fn from_values(width: usize, height: usize, values: Vec<i32>) -> Result<Self, MathError> {
        if values.len() != width * height {
            return Err(MathError::DataLength {
                expected: width * height,
                actual: values.len(),
            });
        }
        Ok(Self {
            width,
            height,
            values,
        })
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Row-major cell values.
    #[must_use]
    pub fn values(&self) -> &[i32] {
        &self.values
    }

    fn offset(&self, column: usize, row: usize) -> Result<usize, MathError> {
        if column >= self.width || row >= self.height {
            return Err(MathError::OutOfBounds {
                column,
                row,
                width: self.width,
                height: self.height,
            });
        }
        Ok(row * self.width + column)
    }

    /// Reads a cell.
    ///
    /// # Errors
    ///
    /// Returns [`MathError::OutOfBounds`] for coordinates outside the matrix.
    pub fn get(&self, column: usize, row: usize) -> Result<i32, MathError> {
        Ok(self.values[self.offset(column, row)?])
    }

    /// Writes a cell.
    ///
    /// # Errors
    ///
    /// Returns [`MathError::OutOfBounds`] for coordinates outside the matrix.
    pub fn set(&mut self, column: usize, row: usize, value: i32) -> Result<(), MathError> {
        let offset = self.offset(column, row)?;
        self.values[offset] = value;
        Ok(())
    }

    /// Builds a new matrix from `f(value, column, row)` for every cell.
    #[must_use]
    pub fn map(&self, mut f: impl FnMut(i32, usize, usize) -> i32) -> Self {
        let values = self
            .values
            .iter()
            .enumerate()
            .map(|(i, &v)| f(v, i % self.width, i / self.width))
            .collect();
        Self {
            width: self.width,
            height: self.height,
            values,
        }
    }

    /// Rewrites every cell in place with `f(value, column, row)`.
    pub fn update(&mut self, mut f: impl FnMut(i32, usize, usize) -> i32) {
        let width = self.width;
        for (i, v) in self.values.iter_mut().enumerate() {
            *v = f(*v, i % width, i / width);
        }
    }

    fn same_shape(&self, other: &Self) -> Result<(), MathError> {
        if self.width != other.width || self.height != other.height {
            return Err(self.mismatch(other));
        }
        Ok(())
    }

    fn mismatch(&self, other: &Self) -> MathError {
        MathError::ShapeMismatch {
            left_width: self.width,
            left_height: self.height,
            right_width: other.width,
            right_height: other.height,
        }
    }

    fn zip_checked(
        &self,
        other: &Self,
        operation: &'static str,
        op: impl Fn(i32, i32) -> Option<i32>,
    ) -> Result<Self, MathError> {
        self.same_shape(other)?;
        let values = self
            .values
            .iter()
            .zip(&other.values)
            .map(|(&a, &b)| op(a, b).ok_or(MathError::Overflow { operation }))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            width: self.width,
            height: self.height,
            values,
        })
    }

    /// Element-wise sum.
    ///
    /// # Errors
    ///
    /// Returns [`MathError::ShapeMismatch`] if the shapes differ and
    /// [`MathError::Overflow`] if an element leaves the `i32` range.
    pub fn sum(&self, other: &Self) -> Result<Self, MathError> {
        self.zip_checked(other, "sum", i32::checked_add)
    }

    /// Element-wise difference.
    ///
    /// # Errors
    ///
    /// Returns [`MathError::ShapeMismatch`] if the shapes differ and
    /// [`MathError::Overflow`] if an element leaves the `i32` range.
    pub fn sub(&self, other: &Self) -> Result<Self, MathError> {
        self.zip_checked(other, "sub", i32::checked_sub)
    }

    /// Matrix product `self × other`.
    ///
    /// # Errors
    ///
    /// Returns [`MathError::ShapeMismatch`] unless `self.width == other.height`
    /// and [`MathError::Overflow`] if a product or partial sum leaves the
    /// `i32` range.
    pub fn mult(&self, other: &Self) -> Result<Self, MathError> {
        if self.width != other.height {
            return Err(self.mismatch(other));
        }
        let mut out = Self::new(other.width, self.height);
        for row in 0..self.height {
            for column in 0..other.width {
                let mut acc: i32 = 0;
                for k in 0..self.width {
                    acc = self.values[row * self.width + k]
                        .checked_mul(other.values[k * other.width + column])
                        .and_then(|product| acc.checked_add(product))
                        .ok_or(MathError::Overflow { operation: "mult" })?;
                }
                out.values[row * out.width + column] = acc;
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set() {
        let mut m = Matrix::new(3, 2);
        m.set(2, 1, 7).unwrap();
        assert_eq!(m.get(2, 1), Ok(7));
        assert_eq!(m.values()[5], 7);
        assert!(matches!(m.get(3, 0), Err(MathError::OutOfBounds { .. })));
    }

    #[test]
    fn test_sum_and_sub() {
        let a = Matrix::from_values(2, 2, vec![1, 2, 3, 4]).unwrap();
        let b = Matrix::from_values(2, 2, vec![10, 20, 30, 40]).unwrap();

        assert_eq!(a.sum(&b).unwrap().values(), &[11, 22, 33, 44]);
        assert_eq!(b.sub(&a).unwrap().values(), &[9, 18, 27, 36]);

        let c = Matrix::new(3, 1);
        assert!(matches!(a.sum(&c), Err(MathError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_mult() {
        // 2x3 (w=3,h=2) times 3x2 (w=2,h=3)
        let a = Matrix::from_values(3, 2, vec![1, 2, 3, 4, 5, 6]).unwrap();
        let b = Matrix::from_values(2, 3, vec![7, 8, 9, 10, 11, 12]).unwrap();
        let p = a.mult(&b).unwrap();

        assert_eq!((p.width(), p.height()), (2, 2));
        assert_eq!(p.values(), &[58, 64, 139, 154]);
        assert!(a.mult(&a).is_err());
    }

    #[test]
    fn test_overflow_is_an_error() {
        let max = Matrix::from_values(1, 1, vec![i32::MAX]).unwrap();
        let one = Matrix::from_values(1, 1, vec![1]).unwrap();
        let min = Matrix::from_values(1, 1, vec![i32::MIN]).unwrap();

        assert_eq!(max.sum(&one), Err(MathError::Overflow { operation: "sum" }));
        assert_eq!(min.sub(&one), Err(MathError::Overflow { operation: "sub" }));
        assert_eq!(max.sub(&one).unwrap().values(), &[i32::MAX - 1]);

        let two = Matrix::from_values(1, 1, vec![2]).unwrap();
        assert_eq!(max.mult(&two), Err(MathError::Overflow { operation: "mult" }));

        // Each product fits; their sum does not.
        let row = Matrix::from_values(2, 1, vec![i32::MAX, 1]).unwrap();
        let column = Matrix::from_values(1, 2, vec![1, 1]).unwrap();
        assert_eq!(row.mult(&column), Err(MathError::Overflow { operation: "mult" }));
    }

    #[test]
    fn test_from_values_length() {
        assert_eq!(
            Matrix::from_values(2, 2, vec![1, 2, 3]),
            Err(MathError::DataLength {
                expected: 4,
                actual: 3
            })
        );
    }

    #[test]
    fn test_update_uses_coordinates() {
        let mut m = Matrix::new(3, 2);
        m.update(|_, c, r| i32::try_from(c * 10 + r).unwrap_or_default());
        assert_eq!(m.values(), &[0, 10, 20, 1, 11, 21]);
    }
}
