//! Statistics computed by the downstream statistics service.
//!
//! The relay never interprets this document; it is only built here so the
//! `statistics-service` binary can answer `POST /api/statistics`.

use crate::core::matrix;
use crate::domain::model::StatisticsResult;
use serde_json::{json, Value};

pub fn calculate(data: &[Vec<i64>], original_diagonal: Option<bool>) -> StatisticsResult {
    let mut stats = StatisticsResult::new();
    let values: Vec<i64> = data.iter().flatten().copied().collect();

    let (Some(&max), Some(&min)) = (values.iter().max(), values.iter().min()) else {
        stats.insert("maxValue".to_string(), Value::Null);
        stats.insert("minValue".to_string(), Value::Null);
        stats.insert("average".to_string(), Value::Null);
        stats.insert("totalSum".to_string(), Value::Null);
        stats.insert("isDiagonal".to_string(), Value::Bool(false));
        stats.insert("elementCount".to_string(), json!(0));
        return stats;
    };

    let total: i128 = values.iter().map(|&v| i128::from(v)).sum();
    let average = total as f64 / values.len() as f64;
    // 四捨五入到小數第二位
    let average = (average * 100.0).round() / 100.0;
    let total = i64::try_from(total)
        .map(Value::from)
        .unwrap_or_else(|_| json!(total as f64));

    // 上游送來的 originalDiagonal 優先於旋轉後矩陣的判斷
    let is_diagonal = original_diagonal.unwrap_or_else(|| matrix::is_diagonal(data));

    stats.insert("maxValue".to_string(), json!(max));
    stats.insert("minValue".to_string(), json!(min));
    stats.insert("average".to_string(), json!(average));
    stats.insert("totalSum".to_string(), total);
    stats.insert("isDiagonal".to_string(), Value::Bool(is_diagonal));
    stats.insert("elementCount".to_string(), json!(values.len()));
    stats.insert(
        "dimensions".to_string(),
        json!({
            "rows": data.len(),
            "columns": data.first().map_or(0, Vec::len),
        }),
    );

    stats
}
