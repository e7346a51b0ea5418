use crate::domain::model::Matrix;
use crate::utils::error::{AppError, Result};

/// 非空且每列長度與第一列相同（至少一欄）
pub fn is_valid(matrix: &[Vec<i64>]) -> bool {
    match matrix.first() {
        None => false,
        Some(first) => !first.is_empty() && matrix.iter().all(|row| row.len() == first.len()),
    }
}

/// Same check as [`is_valid`], reporting which rule failed.
pub fn validate(matrix: &[Vec<i64>]) -> Result<()> {
    let Some(first) = matrix.first() else {
        return Err(AppError::validation("Matrix cannot be empty"));
    };

    let cols = first.len();
    if cols == 0 {
        return Err(AppError::validation("Matrix rows cannot be empty"));
    }

    if let Some((index, row)) = matrix
        .iter()
        .enumerate()
        .find(|(_, row)| row.len() != cols)
    {
        return Err(AppError::validation(format!(
            "All rows must have the same length (row {} has {} elements, expected {})",
            index,
            row.len(),
            cols
        )));
    }

    Ok(())
}

/// 方陣且對角線以外皆為 0；非方陣或空矩陣一律 false
pub fn is_diagonal(matrix: &[Vec<i64>]) -> bool {
    let rows = matrix.len();
    if rows == 0 || matrix.iter().any(|row| row.len() != rows) {
        return false;
    }

    matrix.iter().enumerate().all(|(i, row)| {
        row.iter()
            .enumerate()
            .all(|(j, &value)| i == j || value == 0)
    })
}

/// 順時針旋轉 90 度：R×C 輸入得到 C×R，`out[j][R-1-i] = in[i][j]`。
///
/// Callers must validate first. A ragged matrix is rotated using the first
/// row's width, reading missing cells as 0.
pub fn rotate(matrix: &[Vec<i64>]) -> Matrix {
    let rows = matrix.len();
    let cols = matrix.first().map_or(0, Vec::len);

    (0..cols)
        .map(|j| (0..rows).rev().map(|i| matrix[i].get(j).copied().unwrap_or(0)).collect())
        .collect()
}
