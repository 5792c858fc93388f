/// Format a model result for display: fixed four decimal places.
pub fn format_result(value: f64) -> String {
    if value.is_nan() {
        "#NAN!".to_string()
    } else if value.is_infinite() {
        "#INF!".to_string()
    } else if value == 0.0 {
        // Avoid rendering negative zero as "-0.0000".
        "0.0000".to_string()
    } else {
        format!("{:.4}", value)
    }
}

/// Binary class label for a (rounded) classification score.
pub fn class_label(score: f64) -> u8 {
    if score >= 0.5 { 1 } else { 0 }
}
