//! Column-oriented feature table of detection boxes.

use crate::occlusion::BoxBounds;

/// Frame identifier column.
pub const FRAME: &str = "frame";
/// Box bound columns.
pub const XMIN: &str = "xmin";
pub const XMAX: &str = "xmax";
pub const YMIN: &str = "ymin";
pub const YMAX: &str = "ymax";
/// Binary label column (1 = tracking failure).
pub const LABEL: &str = "cls";
/// Column appended by [`augment_with_occlusion`](crate::occlusion::augment_with_occlusion).
pub const OCCLUSION: &str = "inter_objects_occlusion";

/// Table validation errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TableError {
    #[error("missing required column: {0}")]
    MissingColumn(String),

    #[error("column {column} has {got} rows, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        got: usize,
    },

    #[error("duplicate column name: {0}")]
    DuplicateColumn(String),

    #[error("label at row {row} must be 0 or 1, got {value}")]
    InvalidLabel { row: usize, value: f64 },
}

/// A single named numeric column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    values: Vec<f64>,
}

impl Column {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

/// Hashable frame identifier taken from the numeric `frame` column.
///
/// `-0.0` and `0.0` are the same frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameKey(u64);

impl FrameKey {
    #[inline]
    pub fn from_value(value: f64) -> Self {
        let value = if value == 0.0 { 0.0 } else { value };
        Self(value.to_bits())
    }

    #[inline]
    pub fn value(self) -> f64 {
        f64::from_bits(self.0)
    }
}

/// An ordered table of equally long numeric columns.
///
/// Row order is significant: every derived column is aligned with it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureTable {
    columns: Vec<Column>,
    n_rows: usize,
}

impl FeatureTable {
    /// Build a table from `(name, values)` pairs.
    pub fn from_columns<S: Into<String>>(
        columns: impl IntoIterator<Item = (S, Vec<f64>)>,
    ) -> Result<Self, TableError> {
        let mut table = Self::default();
        for (name, values) in columns {
            table.push_column(name, values)?;
        }
        Ok(table)
    }

    /// Append a new column.
    ///
    /// The first column fixes the row count.
    pub fn push_column(&mut self, name: impl Into<String>, values: Vec<f64>) -> Result<(), TableError> {
        let name = name.into();
        if self.position(&name).is_some() {
            return Err(TableError::DuplicateColumn(name));
        }
        if self.columns.is_empty() {
            self.n_rows = values.len();
        } else if values.len() != self.n_rows {
            return Err(TableError::LengthMismatch {
                column: name,
                expected: self.n_rows,
                got: values.len(),
            });
        }
        self.columns.push(Column { name, values });
        Ok(())
    }

    /// Replace the values of `name` in place, or append it if absent.
    pub fn set_column(&mut self, name: &str, values: Vec<f64>) -> Result<(), TableError> {
        match self.position(name) {
            None => self.push_column(name, values),
            Some(idx) => {
                if values.len() != self.n_rows {
                    return Err(TableError::LengthMismatch {
                        column: name.to_string(),
                        expected: self.n_rows,
                        got: values.len(),
                    });
                }
                self.columns[idx].values = values;
                Ok(())
            }
        }
    }

    /// A copy of the table without the named columns. Unknown names are ignored.
    pub fn without_columns(&self, names: &[&str]) -> Self {
        let columns: Vec<Column> = self
            .columns
            .iter()
            .filter(|c| !names.contains(&c.name.as_str()))
            .cloned()
            .collect();
        let n_rows = if columns.is_empty() { 0 } else { self.n_rows };
        Self { columns, n_rows }
    }

    #[inline]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    #[inline]
    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Values of the named column.
    pub fn column(&self, name: &str) -> Result<&[f64], TableError> {
        self.position(name)
            .map(|idx| self.columns[idx].values.as_slice())
            .ok_or_else(|| TableError::MissingColumn(name.to_string()))
    }

    /// Frame key of every row.
    pub fn frame_keys(&self) -> Result<Vec<FrameKey>, TableError> {
        Ok(self.column(FRAME)?.iter().map(|&v| FrameKey::from_value(v)).collect())
    }

    /// Box bounds of every row.
    pub fn boxes(&self) -> Result<Vec<BoxBounds>, TableError> {
        let xmin = self.column(XMIN)?;
        let xmax = self.column(XMAX)?;
        let ymin = self.column(YMIN)?;
        let ymax = self.column(YMAX)?;

        Ok((0..self.n_rows)
            .map(|r| BoxBounds::new(xmin[r], xmax[r], ymin[r], ymax[r]))
            .collect())
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }
}
