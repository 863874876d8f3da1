//! SQL text helpers shared by the dataset and the check builder.

/// Quotes an identifier so DataFusion keeps its case and accepts any characters.
pub fn quote_identifier(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

/// Quotes a string literal.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Reads NaN in a float column as NULL.
pub fn null_if_nan(quoted_column: &str) -> String {
    format!("CASE WHEN isnan({quoted_column}) THEN NULL ELSE {quoted_column} END")
}

/// Joins predicates into one conjunction, each wrapped in parentheses.
pub fn conjunction<S: AsRef<str>>(predicates: &[S]) -> Option<String> {
    if predicates.is_empty() {
        return None;
    }
    Some(
        predicates
            .iter()
            .map(|p| format!("({})", p.as_ref()))
            .collect::<Vec<_>>()
            .join(" AND "),
    )
}
