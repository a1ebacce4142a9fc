use serde_json::{Map, Value};

/// Rows returned by a feature query, restricted to the selected columns
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureFrame {
    columns: Vec<String>,
    rows: Vec<Map<String, Value>>,
}

impl FeatureFrame {
    pub fn new(columns: Vec<String>, rows: Vec<Map<String, Value>>) -> Self {
        Self { columns, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Map<String, Value>] {
        &self.rows
    }

    /// Values of one column, `Null` where a row lacks it
    pub fn column(&self, name: &str) -> Vec<&Value> {
        self.rows
            .iter()
            .map(|row| row.get(name).unwrap_or(&Value::Null))
            .collect()
    }

    /// Remove a column and return its values. `None` if the frame does not
    /// select it.
    pub fn pop(&mut self, name: &str) -> Option<Vec<Value>> {
        let position = self.columns.iter().position(|c| c == name)?;
        self.columns.remove(position);
        Some(
            self.rows
                .iter_mut()
                .map(|row| row.remove(name).unwrap_or(Value::Null))
                .collect(),
        )
    }
}
