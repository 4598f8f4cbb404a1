use model::{execution::connection::SourceSelection, pagination::offset::OffsetWindow};

/// SQL Server ordering clause that satisfies `OFFSET … FETCH` syntax without
/// sorting. Row-to-page assignment is therefore whatever order the server
/// returns.
const NO_OP_ORDER_BY: &str = "ORDER BY (SELECT NULL)";

/// Builds the count and page queries for a source selection. The query or
/// table text is embedded verbatim.
pub struct QueryGenerator<'a> {
    selection: &'a SourceSelection,
}

impl<'a> QueryGenerator<'a> {
    pub fn new(selection: &'a SourceSelection) -> Self {
        Self { selection }
    }

    pub fn count(&self) -> String {
        match self.selection {
            SourceSelection::Query(query) => {
                format!("SELECT COUNT(*) FROM ({}) AS subquery", trim_query(query))
            }
            SourceSelection::Table(table) => format!("SELECT COUNT(*) FROM {table}"),
        }
    }

    pub fn page(&self, window: OffsetWindow) -> String {
        let select = match self.selection {
            SourceSelection::Query(query) => {
                format!("SELECT subquery.* FROM ({}) AS subquery", trim_query(query))
            }
            SourceSelection::Table(table) => format!("SELECT * FROM {table}"),
        };

        format!(
            "{select} {NO_OP_ORDER_BY} OFFSET {} ROWS FETCH NEXT {} ROWS ONLY",
            window.offset, window.limit
        )
    }
}

// A trailing semicolon would break the query once it is wrapped in a subquery.
fn trim_query(query: &str) -> &str {
    query.trim().trim_end_matches(';').trim_end()
}
