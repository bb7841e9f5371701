//! Dense feature matrix handed to the classifier.

use ndarray::{Array2, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use super::table::{FeatureTable, TableError, FRAME, LABEL};

/// Row-major feature matrix with shape `(n_rows, n_features)` and the
/// name of every feature column.
///
/// Serialized as names, shape and row-major cells with NaN written as `null`,
/// so missing values survive formats without a NaN literal such as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "MatrixRepr", try_from = "MatrixRepr")]
pub struct FeatureMatrix {
    names: Vec<String>,
    values: Array2<f32>,
}

#[derive(Serialize, Deserialize)]
struct MatrixRepr {
    names: Vec<String>,
    n_rows: usize,
    cells: Vec<Option<f32>>,
}

impl From<FeatureMatrix> for MatrixRepr {
    fn from(matrix: FeatureMatrix) -> Self {
        Self {
            n_rows: matrix.n_rows(),
            cells: matrix
                .values
                .iter()
                .map(|&v| if v.is_nan() { None } else { Some(v) })
                .collect(),
            names: matrix.names,
        }
    }
}

impl TryFrom<MatrixRepr> for FeatureMatrix {
    type Error = String;

    fn try_from(repr: MatrixRepr) -> Result<Self, Self::Error> {
        let shape = (repr.n_rows, repr.names.len());
        let cells: Vec<f32> = repr.cells.into_iter().map(|v| v.unwrap_or(f32::NAN)).collect();
        let values = Array2::from_shape_vec(shape, cells)
            .map_err(|e| format!("feature matrix of shape {shape:?}: {e}"))?;
        Ok(Self { names: repr.names, values })
    }
}

impl FeatureMatrix {
    /// Wrap an existing matrix.
    ///
    /// # Panics
    ///
    /// Panics if `names.len()` differs from the number of matrix columns.
    pub fn new(names: Vec<String>, values: Array2<f32>) -> Self {
        assert_eq!(names.len(), values.ncols(), "one name per feature column");
        Self { names, values }
    }

    /// Every column of `table`, in table order.
    pub fn from_table(table: &FeatureTable) -> Self {
        let n_rows = table.n_rows();
        let names: Vec<String> = table.column_names().map(str::to_string).collect();
        let mut values = Array2::<f32>::zeros((n_rows, names.len()));
        for (j, column) in table.columns().iter().enumerate() {
            for (i, &v) in column.values().iter().enumerate() {
                values[(i, j)] = v as f32;
            }
        }
        Self { names, values }
    }

    #[inline]
    pub fn n_rows(&self) -> usize {
        self.values.nrows()
    }

    #[inline]
    pub fn n_features(&self) -> usize {
        self.values.ncols()
    }

    pub fn feature_names(&self) -> &[String] {
        &self.names
    }

    pub fn view(&self) -> ArrayView2<'_, f32> {
        self.values.view()
    }

    pub fn row(&self, row: usize) -> ArrayView1<'_, f32> {
        self.values.row(row)
    }

    /// A new matrix holding `rows` in the given order.
    pub fn select_rows(&self, rows: &[usize]) -> Self {
        Self {
            names: self.names.clone(),
            values: self.values.select(Axis(0), rows),
        }
    }
}

/// Split a table into features and labels.
///
/// Features are every column except `frame` and `cls`; labels are `cls`,
/// which must hold only 0 and 1.
pub fn split_features_labels(table: &FeatureTable) -> Result<(FeatureMatrix, Vec<f32>), TableError> {
    let labels = table
        .column(LABEL)?
        .iter()
        .enumerate()
        .map(|(row, &value)| {
            if value == 0.0 || value == 1.0 {
                Ok(value as f32)
            } else {
                Err(TableError::InvalidLabel { row, value })
            }
        })
        .collect::<Result<Vec<f32>, _>>()?;

    let features = FeatureMatrix::from_table(&table.without_columns(&[FRAME, LABEL]));
    Ok((features, labels))
}
