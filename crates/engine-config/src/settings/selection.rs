use crate::error::ConfigError;
use model::execution::connection::SourceSelection;

/// Turns the optional query/table pair given by the user into a selection.
/// Exactly one of the two must be present and non-blank.
pub fn resolve_selection(
    query: Option<String>,
    table: Option<String>,
) -> Result<SourceSelection, ConfigError> {
    let query = query.filter(|q| !q.trim().is_empty());
    let table = table.filter(|t| !t.trim().is_empty());

    match (query, table) {
        (Some(_), Some(_)) => Err(ConfigError::AmbiguousSelection),
        (Some(query), None) => Ok(SourceSelection::Query(query)),
        (None, Some(table)) => Ok(SourceSelection::Table(table.trim().to_string())),
        (None, None) => Err(ConfigError::MissingSelection),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_one_selection_is_required() {
        assert_eq!(
            resolve_selection(None, None),
            Err(ConfigError::MissingSelection)
        );
        assert_eq!(
            resolve_selection(Some("SELECT 1".into()), Some("dbo.t".into())),
            Err(ConfigError::AmbiguousSelection)
        );
        assert_eq!(
            resolve_selection(Some("  ".into()), None),
            Err(ConfigError::MissingSelection)
        );
    }

    #[test]
    fn table_or_query_is_kept() {
        assert_eq!(
            resolve_selection(None, Some(" dbo.orders ".into())),
            Ok(SourceSelection::Table("dbo.orders".into()))
        );
        assert_eq!(
            resolve_selection(Some("SELECT id FROM t".into()), Some(String::new())),
            Ok(SourceSelection::Query("SELECT id FROM t".into()))
        );
    }
}
