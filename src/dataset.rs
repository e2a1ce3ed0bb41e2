//! Row and table types exchanged with the dataset collaborator.

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Name of the passthrough label column.
pub const CLASS_ATTRIBUTE: &str = "class";

/// One input row: an image reference with its label and weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub image: String,
    pub label: Option<f64>,
    pub weight: f64,
}

impl Row {
    pub fn new(image: impl Into<String>, label: Option<f64>) -> Self {
        Self {
            image: image.into(),
            label,
            weight: 1.0,
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }
}

/// Feature vector of one input row; label and weight are passed through.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub features: Array1<f64>,
    pub label: Option<f64>,
    pub weight: f64,
}

/// Attribute names `x1 .. xN` followed by the class column.
pub fn output_attributes(num_features: usize) -> Vec<String> {
    let mut attributes: Vec<String> = (1..=num_features).map(|i| format!("x{}", i)).collect();
    attributes.push(CLASS_ATTRIBUTE.to_string());
    attributes
}

/// Output of a transform: one row per input row, input order preserved.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    attributes: Vec<String>,
    rows: Vec<FeatureRow>,
}

impl FeatureTable {
    pub fn new(num_features: usize) -> Self {
        Self {
            attributes: output_attributes(num_features),
            rows: Vec::new(),
        }
    }

    pub fn with_capacity(num_features: usize, capacity: usize) -> Self {
        Self {
            attributes: output_attributes(num_features),
            rows: Vec::with_capacity(capacity),
        }
    }

    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    pub fn num_features(&self) -> usize {
        self.attributes.len() - 1
    }

    /// Index of the label column in [`FeatureTable::to_matrix`].
    pub fn class_index(&self) -> usize {
        self.attributes.len() - 1
    }

    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn push(&mut self, row: FeatureRow) {
        debug_assert_eq!(row.features.len(), self.num_features());
        self.rows.push(row);
    }

    pub fn weights(&self) -> Array1<f64> {
        self.rows.iter().map(|r| r.weight).collect()
    }

    /// Dense `rows × (features + 1)` matrix; missing labels become NaN.
    pub fn to_matrix(&self) -> Array2<f64> {
        let width = self.attributes.len();
        let mut matrix = Array2::zeros((self.rows.len(), width));
        for (mut out, row) in matrix.rows_mut().into_iter().zip(&self.rows) {
            out.slice_mut(ndarray::s![..width - 1]).assign(&row.features);
            out[width - 1] = row.label.unwrap_or(f64::NAN);
        }
        matrix
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn attribute_names() {
        assert_eq!(output_attributes(3), vec!["x1", "x2", "x3", "class"]);
    }

    #[test]
    fn matrix_appends_label_column() {
        let mut table = FeatureTable::new(2);
        table.push(FeatureRow {
            features: array![1.0, 2.0],
            label: Some(1.0),
            weight: 0.5,
        });
        table.push(FeatureRow {
            features: array![3.0, 4.0],
            label: None,
            weight: 2.0,
        });
        let m = table.to_matrix();
        assert_eq!(m.dim(), (2, 3));
        assert_eq!(m[[0, 2]], 1.0);
        assert!(m[[1, 2]].is_nan());
        assert_eq!(m[[1, 1]], 4.0);
        assert_eq!(table.weights(), array![0.5, 2.0]);
        assert_eq!(table.class_index(), 2);
    }
}
