use crate::error::MatrixError;
use serde::{Deserialize, Serialize};

/// Dense column/row matrix with a size chosen at runtime.
///
/// Values are addressed as `(column, row)`, matching how the heat map is indexed by
/// `(x, y)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Matrix<T> {
    columns: usize,
    rows: usize,
    values: Vec<T>,
}

impl<T: Clone + Default> Matrix<T> {
    pub fn new(columns: usize, rows: usize) -> Self {
        Self::filled(columns, rows, T::default())
    }
}

impl<T: Clone> Matrix<T> {
    pub fn filled(columns: usize, rows: usize, value: T) -> Self {
        Self {
            columns,
            rows,
            values: vec![value; columns * rows],
        }
    }
}

impl<T> Matrix<T> {
    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn contains(&self, column: usize, row: usize) -> bool {
        column < self.columns && row < self.rows
    }

    fn offset(&self, column: usize, row: usize) -> Option<usize> {
        self.contains(column, row).then(|| row * self.columns + column)
    }

    pub fn get(&self, column: usize, row: usize) -> Option<&T> {
        self.offset(column, row).map(|offset| &self.values[offset])
    }

    pub fn get_mut(&mut self, column: usize, row: usize) -> Option<&mut T> {
        self.offset(column, row)
            .map(move |offset| &mut self.values[offset])
    }

    pub fn set(&mut self, column: usize, row: usize, value: T) -> Result<(), MatrixError> {
        let offset = self
            .offset(column, row)
            .ok_or(MatrixError::IndexOutOfRange {
                column,
                row,
                columns: self.columns,
                rows: self.rows,
            })?;
        self.values[offset] = value;
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.values.iter()
    }
}

impl<T: Copy> Matrix<T> {
    pub fn value(&self, column: usize, row: usize) -> Option<T> {
        self.get(column, row).copied()
    }

    /// Matrix with rows and columns swapped.
    pub fn transposed(&self) -> Matrix<T> {
        let mut values = Vec::with_capacity(self.values.len());
        for column in 0..self.columns {
            for row in 0..self.rows {
                values.push(self.values[row * self.columns + column]);
            }
        }
        Matrix {
            columns: self.rows,
            rows: self.columns,
            values,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_matrix_is_default_filled() {
        let matrix: Matrix<u32> = Matrix::new(3, 2);
        assert_eq!(matrix.columns(), 3);
        assert_eq!(matrix.rows(), 2);
        assert!(matrix.iter().all(|&value| value == 0));
    }

    #[test]
    fn test_set_and_get() {
        let mut matrix: Matrix<u32> = Matrix::new(3, 2);
        matrix.set(2, 1, 7).unwrap();
        assert_eq!(matrix.value(2, 1), Some(7));
        assert_eq!(matrix.value(1, 2), None);
        if let Some(value) = matrix.get_mut(0, 0) {
            *value += 1;
        }
        assert_eq!(matrix.value(0, 0), Some(1));
    }

    #[test]
    fn test_set_out_of_range_is_an_error() {
        let mut matrix: Matrix<u32> = Matrix::new(2, 2);
        let err = matrix.set(2, 0, 1).unwrap_err();
        assert_eq!(
            err,
            MatrixError::IndexOutOfRange {
                column: 2,
                row: 0,
                columns: 2,
                rows: 2
            }
        );
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn test_transposed_swaps_axes() {
        let mut matrix: Matrix<i32> = Matrix::new(3, 2);
        matrix.set(2, 0, 5).unwrap();
        matrix.set(0, 1, -1).unwrap();
        let transposed = matrix.transposed();
        assert_eq!(transposed.columns(), 2);
        assert_eq!(transposed.rows(), 3);
        assert_eq!(transposed.value(0, 2), Some(5));
        assert_eq!(transposed.value(1, 0), Some(-1));
    }
}
