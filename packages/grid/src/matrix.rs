//! Dense row-major 2-D container.

/// `rows × cols` cells stored row-major. Every accessor is bounds-checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinMatrix<T> {
    rows: usize,
    cols: usize,
    cells: Vec<T>,
}

impl<T: Default> BinMatrix<T> {
    /// Creates a matrix of default cells.
    #[must_use]
    pub fn new(rows: usize, cols: usize) -> Self {
        Self::from_fn(rows, cols, |_, _| T::default())
    }
}

impl<T> BinMatrix<T> {
    #[must_use]
    pub fn from_fn(rows: usize, cols: usize, mut cell: impl FnMut(usize, usize) -> T) -> Self {
        let cells = (0..rows)
            .flat_map(|row| (0..cols).map(move |col| (row, col)))
            .map(|(row, col)| cell(row, col))
            .collect();
        Self { rows, cols, cells }
    }

    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    const fn offset(&self, row: usize, col: usize) -> Option<usize> {
        if row < self.rows && col < self.cols {
            Some(row * self.cols + col)
        } else {
            None
        }
    }

    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        self.offset(row, col).and_then(|i| self.cells.get(i))
    }

    pub fn get_mut(&mut self, row: usize, col: usize) -> Option<&mut T> {
        self.offset(row, col).and_then(|i| self.cells.get_mut(i))
    }

    /// Cells in row-major order.
    pub fn values(&self) -> std::slice::Iter<'_, T> {
        self.cells.iter()
    }

    #[must_use]
    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> BinMatrix<U> {
        BinMatrix {
            rows: self.rows,
            cols: self.cols,
            cells: self.cells.iter().map(f).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_are_bounds_checked() {
        let mut matrix: BinMatrix<u32> = BinMatrix::new(2, 3);
        assert!(matrix.get(1, 2).is_some());
        assert!(matrix.get(2, 0).is_none());
        assert!(matrix.get(0, 3).is_none());
        assert!(matrix.get_mut(5, 5).is_none());
    }

    #[test]
    fn layout_is_row_major() {
        let matrix = BinMatrix::from_fn(2, 3, |row, col| row * 10 + col);
        let values: Vec<_> = matrix.values().copied().collect();
        assert_eq!(values, [0, 1, 2, 10, 11, 12]);

        assert_eq!(matrix.get(1, 1), Some(&11));
        assert_eq!(matrix.get(1, 2), Some(&12));
    }

    #[test]
    fn get_mut_writes_through() {
        let mut matrix: BinMatrix<Vec<u8>> = BinMatrix::new(2, 2);
        matrix.get_mut(1, 0).unwrap().push(7);
        assert_eq!(matrix.get(1, 0).unwrap(), &[7]);
        assert!(matrix.get(0, 1).unwrap().is_empty());
    }

    #[test]
    fn map_preserves_shape() {
        let matrix = BinMatrix::from_fn(3, 2, |row, col| row + col);
        let doubled = matrix.map(|v| v * 2);
        assert_eq!((doubled.rows(), doubled.cols()), (3, 2));
        assert_eq!(doubled.get(2, 1), Some(&6));
    }
}
