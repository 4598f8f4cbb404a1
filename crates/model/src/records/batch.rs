use crate::{pagination::offset::OffsetWindow, records::row::RowData};

/// A bounded slice of the source result set, read and written as a unit.
/// Lives only for one read → write cycle.
#[derive(Debug, Clone)]
pub struct Page {
    pub window: OffsetWindow,
    pub rows: Vec<RowData>,
}

impl Page {
    pub fn new(window: OffsetWindow, rows: Vec<RowData>) -> Self {
        Page { window, rows }
    }

    pub fn empty(window: OffsetWindow) -> Self {
        Page {
            window,
            rows: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Estimated in-memory size of the page.
    pub fn size_bytes(&self) -> usize {
        self.rows.iter().map(|r| r.size_bytes()).sum()
    }

    /// True when the source returned fewer rows than the window asked for,
    /// which means the result set ran out before the declared total.
    pub fn is_short(&self) -> bool {
        (self.row_count() as u64) < self.window.limit
    }

    /// Column names in result-set order, taken from the first row.
    pub fn column_names(&self) -> Vec<&str> {
        self.rows
            .first()
            .map(|r| r.field_values.iter().map(|f| f.name.as_str()).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::value::Value;

    fn row(id: i64) -> RowData {
        RowData::from_iter([
            ("id".to_string(), Value::Int(id)),
            ("name".to_string(), Value::String(format!("n{id}"))),
        ])
    }

    #[test]
    fn short_page_is_detected() {
        let page = Page::new(OffsetWindow::new(50, 25), (0..10).map(row).collect());
        assert!(page.is_short());
        assert_eq!(page.row_count(), 10);
    }

    #[test]
    fn full_page_is_not_short() {
        let page = Page::new(OffsetWindow::new(0, 3), (0..3).map(row).collect());
        assert!(!page.is_short());
        assert_eq!(page.column_names(), vec!["id", "name"]);
        assert!(page.size_bytes() > 0);
    }

    #[test]
    fn empty_page_has_no_columns() {
        let page = Page::empty(OffsetWindow::new(100, 25));
        assert!(page.is_empty());
        assert!(page.column_names().is_empty());
    }
}
