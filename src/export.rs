use serde_json::{Map, Value};

use crate::model::PredictionOutcome;

/// Serialize outcomes to the downloadable CSV artifact.
///
/// Format contract (consumed by existing exports, must not drift):
/// header row = serialized outcome keys minus `id`, in serialization order;
/// one data row per outcome; numbers formatted to 4 decimal places; strings
/// double-quoted with embedded quotes doubled; rows joined with `\n`.
/// An empty outcome list produces an empty string.
pub fn to_csv(outcomes: &[PredictionOutcome]) -> String {
    let Some(first) = outcomes.first() else {
        return String::new();
    };

    let columns: Vec<String> = outcome_object(first)
        .keys()
        .filter(|key| key.as_str() != "id")
        .cloned()
        .collect();

    let mut rows = Vec::with_capacity(outcomes.len() + 1);
    rows.push(columns.join(","));

    for outcome in outcomes {
        let object = outcome_object(outcome);
        let cells: Vec<String> = columns
            .iter()
            .map(|column| format_cell(object.get(column).unwrap_or(&Value::Null)))
            .collect();
        rows.push(cells.join(","));
    }

    rows.join("\n")
}

fn outcome_object(outcome: &PredictionOutcome) -> Map<String, Value> {
    match serde_json::to_value(outcome) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

fn format_cell(value: &Value) -> String {
    match value {
        Value::Number(n) => format!("{:.4}", n.as_f64().unwrap_or(0.0)),
        Value::String(s) => format!("\"{}\"", s.replace('"', "\"\"")),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
