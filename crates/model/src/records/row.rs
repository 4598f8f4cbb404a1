use crate::core::value::Value;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldValue {
    pub name: String,
    pub value: Value,
}

impl FieldValue {
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        FieldValue {
            name: name.into(),
            value,
        }
    }
}

/// One source row: column names and values in result-set order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RowData {
    pub field_values: Vec<FieldValue>,
}

impl RowData {
    pub fn new(field_values: Vec<FieldValue>) -> Self {
        RowData { field_values }
    }

    pub fn size_bytes(&self) -> usize {
        self.field_values
            .iter()
            .map(|f| f.name.len() + f.value.size_bytes())
            .sum()
    }
}

impl FromIterator<(String, Value)> for RowData {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        RowData::new(
            iter.into_iter()
                .map(|(name, value)| FieldValue { name, value })
                .collect(),
        )
    }
}
