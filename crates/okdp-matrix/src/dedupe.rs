//! Reduced projections of the matrix with exact duplicates removed.

use okdp_core::fields::{PYTHON_DEV_TAG, PYTHON_VERSION};
use okdp_core::MatrixRow;

/// Keep only `fields`, in that order. Missing fields project to `""`.
pub fn project(rows: &[MatrixRow], fields: &[&str]) -> Vec<MatrixRow> {
    rows.iter()
        .map(|row| {
            fields
                .iter()
                .map(|f| (f.to_string(), row.get(f).unwrap_or_default().to_string()))
                .collect()
        })
        .collect()
}

/// Drop rows equal to an earlier one, first occurrence order
pub fn remove_duplicates(rows: Vec<MatrixRow>) -> Vec<MatrixRow> {
    let mut result: Vec<MatrixRow> = Vec::with_capacity(rows.len());
    for row in rows {
        if !result.contains(&row) {
            result.push(row);
        }
    }
    result
}

/// Unique Python environments of the matrix
pub fn python_matrix(rows: &[MatrixRow]) -> Vec<MatrixRow> {
    remove_duplicates(project(rows, &[PYTHON_VERSION, PYTHON_DEV_TAG]))
}
