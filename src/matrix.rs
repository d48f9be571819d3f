use core::{
    fmt,
    ops::{Index, IndexMut},
    str::FromStr,
};
use thiserror::Error;

/// Error kind for malformed graph matrices.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum MatrixError {
    /// A row does not have as many cells as there are rows.
    #[error("row {row} has {len} cells, expected {size}")]
    NotSquare { row: usize, len: usize, size: usize },
    /// Adjacency and cost matrices describe a different number of nodes.
    #[error("adjacency matrix is {adjacency}x{adjacency} but cost matrix is {costs}x{costs}")]
    SizeMismatch { adjacency: usize, costs: usize },
    /// Text input ended before the layout was complete.
    #[error("unexpected end of input while reading {expected}")]
    UnexpectedEnd { expected: &'static str },
    /// A token could not be parsed as the expected value.
    #[error("invalid token `{token}` at position {position}")]
    InvalidToken { token: String, position: usize },
    /// Text input has tokens past the cost block.
    #[error("unexpected trailing data at position {position}")]
    TrailingData { position: usize },
}

/// Dense row-major square matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct SquareMatrix<T> {
    size: usize,
    cells: Vec<T>,
}

/// Entry `(i, j)` is `true` iff there is a directed edge `i -> j`.
pub type AdjacencyMatrix = SquareMatrix<bool>;
/// Off-diagonal entries are edge weights, diagonal entries are node thresholds.
pub type CostMatrix = SquareMatrix<f64>;

impl<T: Clone> SquareMatrix<T> {
    /// A `size`x`size` matrix with every cell set to `value`.
    #[must_use]
    pub fn filled(size: usize, value: T) -> Self {
        Self {
            size,
            cells: vec![value; size * size],
        }
    }
}

impl<T> SquareMatrix<T> {
    /// Build a matrix from its rows.
    ///
    /// # Errors
    /// If any row length differs from the number of rows.
    pub fn from_rows(rows: impl IntoIterator<Item = Vec<T>>) -> Result<Self, MatrixError> {
        let rows: Vec<Vec<T>> = rows.into_iter().collect();
        let size = rows.len();
        let mut cells = Vec::with_capacity(size * size);
        for (row, cells_of_row) in rows.into_iter().enumerate() {
            if cells_of_row.len() != size {
                return Err(MatrixError::NotSquare {
                    row,
                    len: cells_of_row.len(),
                    size,
                });
            }
            cells.extend(cells_of_row);
        }
        Ok(Self { size, cells })
    }

    /// Number of rows (and columns).
    #[must_use]
    #[inline]
    pub const fn size(&self) -> usize {
        self.size
    }

    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        (row < self.size && col < self.size).then(|| &self.cells[row * self.size + col])
    }

    #[must_use]
    pub fn row(&self, row: usize) -> &[T] {
        &self.cells[row * self.size..(row + 1) * self.size]
    }

    /// Delete row `index` and column `index`, shifting every later row and
    /// column down by one.
    pub(crate) fn remove(&mut self, index: usize) {
        let size = self.size;
        assert!(index < size, "SquareMatrix::remove");
        self.cells = core::mem::take(&mut self.cells)
            .into_iter()
            .enumerate()
            .filter_map(|(pos, cell)| (pos / size != index && pos % size != index).then_some(cell))
            .collect();
        self.size = size - 1;
    }
}

impl<T> Index<(usize, usize)> for SquareMatrix<T> {
    type Output = T;

    #[inline]
    fn index(&self, (row, col): (usize, usize)) -> &T {
        assert!(row < self.size && col < self.size, "SquareMatrix::index");
        &self.cells[row * self.size + col]
    }
}

impl<T> IndexMut<(usize, usize)> for SquareMatrix<T> {
    #[inline]
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut T {
        assert!(row < self.size && col < self.size, "SquareMatrix::index_mut");
        &mut self.cells[row * self.size + col]
    }
}

/// Index-aligned adjacency and cost matrices describing one graph.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphMatrices {
    adjacency: AdjacencyMatrix,
    costs: CostMatrix,
}

impl GraphMatrices {
    /// # Errors
    /// If the two matrices have different sizes.
    pub fn new(adjacency: AdjacencyMatrix, costs: CostMatrix) -> Result<Self, MatrixError> {
        if adjacency.size() != costs.size() {
            return Err(MatrixError::SizeMismatch {
                adjacency: adjacency.size(),
                costs: costs.size(),
            });
        }
        Ok(Self { adjacency, costs })
    }

    /// Number of nodes.
    #[must_use]
    #[inline]
    pub const fn len(&self) -> usize {
        self.adjacency.size()
    }

    #[must_use]
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub const fn adjacency(&self) -> &AdjacencyMatrix {
        &self.adjacency
    }

    #[must_use]
    pub const fn costs(&self) -> &CostMatrix {
        &self.costs
    }

    #[must_use]
    pub fn into_parts(self) -> (AdjacencyMatrix, CostMatrix) {
        (self.adjacency, self.costs)
    }

    /// Edges `i -> j` with `i < j`.
    #[must_use]
    pub fn forward_edge_count(&self) -> usize {
        let n = self.len();
        (0..n)
            .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
            .filter(|&cell| self.adjacency[cell])
            .count()
    }

    /// Edges `i -> j` with `i > j`.
    #[must_use]
    pub fn feedback_edge_count(&self) -> usize {
        let n = self.len();
        (0..n)
            .flat_map(|i| (0..i).map(move |j| (i, j)))
            .filter(|&cell| self.adjacency[cell])
            .count()
    }

    pub(crate) fn remove_node(&mut self, index: usize) {
        self.adjacency.remove(index);
        self.costs.remove(index);
    }
}

/// Reads `N`, then an `N`x`N` block of `0`/`1` adjacency flags, then an
/// `N`x`N` block of reals, all separated by arbitrary whitespace.
impl FromStr for GraphMatrices {
    type Err = MatrixError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        let invalid = |position: usize| MatrixError::InvalidToken {
            token: tokens[position].to_owned(),
            position,
        };

        let Some(count) = tokens.first() else {
            return Err(MatrixError::UnexpectedEnd {
                expected: "node count",
            });
        };
        let size: usize = count.parse().map_err(|_| invalid(0))?;

        // Both blocks must be present before anything is allocated, so the
        // matrices never outgrow the text they are read from.
        let available = tokens.len() - 1;
        let cells = size
            .checked_mul(size)
            .filter(|&cells| cells <= available)
            .ok_or(MatrixError::UnexpectedEnd {
                expected: "adjacency block",
            })?;
        if available - cells < cells {
            return Err(MatrixError::UnexpectedEnd {
                expected: "cost block",
            });
        }
        if available > 2 * cells {
            return Err(MatrixError::TrailingData {
                position: 1 + 2 * cells,
            });
        }

        let flags = (1..=cells).map(|position| match tokens[position] {
            "0" => Ok(false),
            "1" => Ok(true),
            _ => Err(invalid(position)),
        });
        let adjacency = AdjacencyMatrix {
            size,
            cells: flags.collect::<Result<_, _>>()?,
        };
        let weights = (cells + 1..=2 * cells)
            .map(|position| tokens[position].parse::<f64>().map_err(|_| invalid(position)));
        let costs = CostMatrix {
            size,
            cells: weights.collect::<Result<_, _>>()?,
        };
        Self::new(adjacency, costs)
    }
}

impl fmt::Display for GraphMatrices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.len();
        writeln!(f, "{n}")?;
        for row in 0..n {
            let flags: Vec<&str> = self
                .adjacency
                .row(row)
                .iter()
                .map(|&edge| if edge { "1" } else { "0" })
                .collect();
            writeln!(f, "{}", flags.join(" "))?;
        }
        for row in 0..n {
            let costs: Vec<String> = self.costs.row(row).iter().map(f64::to_string).collect();
            writeln!(f, "{}", costs.join(" "))?;
        }
        Ok(())
    }
}
