use serde::{Deserialize, Serialize};

/// Logical column type of a staged page. Inferred from the values a page
/// actually carries, since the source schema is never introspected.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DataType {
    Int,
    Float,
    Decimal { scale: u8 },
    String,
    Boolean,
    Bytes,
    Date,
    Time,
    DateTime,
    Timestamp,
    Null,
}

impl DataType {
    /// Merges the type seen so far for a column with the type of the next
    /// value. `Null` never widens a column; conflicting concrete types fall
    /// back to `String`.
    pub fn merge(self, other: DataType) -> DataType {
        use DataType::*;
        match (self, other) {
            (Null, t) | (t, Null) => t,
            (a, b) if a == b => a,
            (Int, Float) | (Float, Int) => Float,
            (Decimal { scale: a }, Decimal { scale: b }) => Decimal { scale: a.max(b) },
            (Int, Decimal { scale }) | (Decimal { scale }, Int) => Decimal { scale },
            (Float, Decimal { .. }) | (Decimal { .. }, Float) => Float,
            (DateTime, Date) | (Date, DateTime) => DateTime,
            _ => String,
        }
    }
}
