//! Model records and their translation into the engine's flat layout.

use crate::ModelError;
use serde::Serialize;

/// Integrality of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(i32)]
pub enum ColumnType {
    #[default]
    Continuous = 0,
    Integer = 1,
    SemiContinuous = 2,
    SemiInteger = 3,
    ImplicitInteger = 4,
}

impl ColumnType {
    pub fn code(self) -> i32 {
        self as i32
    }
}

/// Compressed sparse matrix.
///
/// `offsets[i]` is where row (or column) `i` starts in `indices`/`values`;
/// the last extent ends at the non-zero count.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SparseMatrix {
    pub offsets: Vec<usize>,
    pub indices: Vec<usize>,
    pub values: Vec<f64>,
}

impl SparseMatrix {
    pub fn new(offsets: Vec<usize>, indices: Vec<usize>, values: Vec<f64>) -> Self {
        Self {
            offsets,
            indices,
            values,
        }
    }

    /// Build a row-wise matrix from dense rows, dropping zeros.
    pub fn from_dense_rows<R: AsRef<[f64]>>(rows: &[R]) -> Self {
        let mut matrix = SparseMatrix::default();
        for row in rows {
            matrix.offsets.push(matrix.indices.len());
            let sparse = SparseRow::from_dense(row.as_ref(), None);
            matrix.indices.extend(sparse.indices);
            matrix.values.extend(sparse.values);
        }
        matrix
    }

    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Range of entries belonging to `line`.
    pub fn extent(&self, line: usize) -> std::ops::Range<usize> {
        let start = self.offsets.get(line).copied().unwrap_or(self.nnz());
        let end = self.offsets.get(line + 1).copied().unwrap_or(self.nnz());
        start..end
    }

    /// Check balance and offset monotonicity.
    pub fn validate(&self, field: &'static str) -> Result<(), ModelError> {
        if self.indices.len() != self.values.len() {
            return Err(ModelError::UnbalancedSparseRow {
                indices: self.indices.len(),
                values: self.values.len(),
            });
        }
        let nnz = self.nnz();
        match self.offsets.first() {
            Some(&first) if first != 0 => {
                return Err(ModelError::InvalidOffsets { field, position: 0 });
            }
            None if nnz > 0 => {
                return Err(ModelError::InvalidOffsets { field, position: 0 });
            }
            _ => {}
        }
        let mut previous = 0;
        for (position, &offset) in self.offsets.iter().enumerate() {
            if offset < previous || offset > nnz {
                return Err(ModelError::InvalidOffsets { field, position });
            }
            previous = offset;
        }
        Ok(())
    }

    /// Offsets extended with `nnz` up to `len` entries.
    pub fn padded_offsets(&self, len: usize) -> Vec<usize> {
        let mut offsets = self.offsets.clone();
        if offsets.len() < len {
            offsets.resize(len, self.nnz());
        }
        offsets
    }
}

/// Parallel index/value vectors describing one sparse row.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SparseRow {
    pub indices: Vec<usize>,
    pub values: Vec<f64>,
}

impl SparseRow {
    /// Keep non-zero entries of `values`. Entry `i` is placed at
    /// `indices[i]` when explicit indices are given, at `i` otherwise.
    pub fn from_dense(values: &[f64], indices: Option<&[usize]>) -> Self {
        let mut row = SparseRow::default();
        for (position, &value) in values.iter().enumerate() {
            if value == 0.0 {
                continue;
            }
            let index = indices
                .and_then(|ixs| ixs.get(position).copied())
                .unwrap_or(position);
            row.indices.push(index);
            row.values.push(value);
        }
        row
    }

    pub fn check_balanced(&self) -> Result<(), ModelError> {
        if self.indices.len() == self.values.len() {
            Ok(())
        } else {
            Err(ModelError::UnbalancedSparseRow {
                indices: self.indices.len(),
                values: self.values.len(),
            })
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Optimization model as supplied by callers.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SolverModel {
    pub is_maximization: bool,
    pub objective_offset: f64,
    pub column_lower_bounds: Vec<f64>,
    pub column_upper_bounds: Vec<f64>,
    pub column_types: Option<Vec<ColumnType>>,
    /// Linear costs; all zero when absent.
    pub linear_weights: Option<Vec<f64>>,
    /// Row-wise upper triangle of the objective's quadratic term. Diagonal
    /// entries hold half the effective coefficient.
    pub quadratic_weights: Option<SparseMatrix>,
    pub row_lower_bounds: Vec<f64>,
    pub row_upper_bounds: Vec<f64>,
    /// Row-wise constraint matrix. Missing trailing offsets denote empty rows.
    pub weights: SparseMatrix,
}

impl SolverModel {
    /// Number of columns.
    pub fn width(&self) -> usize {
        self.column_lower_bounds.len()
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.row_lower_bounds.len()
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        let width = self.width();
        let check_width = |field: &'static str, actual: usize| {
            if actual == width {
                Ok(())
            } else {
                Err(ModelError::InconsistentWidth {
                    field,
                    expected: width,
                    actual,
                })
            }
        };
        check_width("column_upper_bounds", self.column_upper_bounds.len())?;
        if let Some(types) = &self.column_types {
            check_width("column_types", types.len())?;
        }
        if let Some(linear) = &self.linear_weights {
            check_width("linear_weights", linear.len())?;
        }
        if let Some(quadratic) = &self.quadratic_weights {
            check_width("quadratic_weights", quadratic.offsets.len())?;
            quadratic.validate("quadratic_weights")?;
        }

        let height = self.height();
        if self.row_upper_bounds.len() != height {
            return Err(ModelError::InconsistentHeight {
                field: "row_upper_bounds",
                expected: height,
                actual: self.row_upper_bounds.len(),
            });
        }
        if self.weights.offsets.len() > height {
            return Err(ModelError::InconsistentHeight {
                field: "weights",
                expected: height,
                actual: self.weights.offsets.len(),
            });
        }
        self.weights.validate("weights")
    }

    /// Validate and convert into the engine's flat layout.
    pub fn flatten(&self) -> Result<FlatModel, ModelError> {
        self.validate()?;
        let width = self.width();
        let height = self.height();

        let hessian = self.quadratic_weights.as_ref().map(scale_hessian_diagonal);
        tracing::trace!(
            component = "model",
            operation = "flatten",
            width,
            height,
            nnz = self.weights.nnz(),
            quadratic = hessian.is_some(),
            "Flattened model"
        );

        Ok(FlatModel {
            num_col: width,
            num_row: height,
            is_maximization: self.is_maximization,
            offset: self.objective_offset,
            col_cost: self
                .linear_weights
                .clone()
                .unwrap_or_else(|| vec![0.0; width]),
            col_lower: self.column_lower_bounds.clone(),
            col_upper: self.column_upper_bounds.clone(),
            row_lower: self.row_lower_bounds.clone(),
            row_upper: self.row_upper_bounds.clone(),
            a_start: self.weights.padded_offsets(height),
            a_index: self.weights.indices.clone(),
            a_value: self.weights.values.clone(),
            integrality: self
                .column_types
                .as_ref()
                .map(|types| types.iter().map(|t| t.code()).collect()),
            hessian,
        })
    }
}

/// Model in the layout the engine consumes.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatModel {
    pub num_col: usize,
    pub num_row: usize,
    pub is_maximization: bool,
    pub offset: f64,
    pub col_cost: Vec<f64>,
    pub col_lower: Vec<f64>,
    pub col_upper: Vec<f64>,
    pub row_lower: Vec<f64>,
    pub row_upper: Vec<f64>,
    /// Row-wise starts, exactly `num_row` long.
    pub a_start: Vec<usize>,
    pub a_index: Vec<usize>,
    pub a_value: Vec<f64>,
    pub integrality: Option<Vec<i32>>,
    /// Upper-triangular Hessian with full diagonal coefficients.
    pub hessian: Option<SparseMatrix>,
}

/// Double the diagonal of a row-wise upper-triangular matrix.
///
/// Each row is scanned forward and the scan stops at the first column past
/// the diagonal, so entries are expected in increasing column order.
/// Offsets past the end of `indices` or `values` end the row's scan.
pub(crate) fn scale_hessian_diagonal(matrix: &SparseMatrix) -> SparseMatrix {
    let mut values = matrix.values.clone();
    for row in 0..matrix.offsets.len() {
        for ix in matrix.extent(row) {
            let (Some(&col), Some(value)) = (matrix.indices.get(ix), values.get_mut(ix)) else {
                break;
            };
            if col == row {
                *value *= 2.0;
            } else if col > row {
                break;
            }
        }
    }
    SparseMatrix {
        offsets: matrix.offsets.clone(),
        indices: matrix.indices.clone(),
        values,
    }
}
