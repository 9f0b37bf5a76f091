/// Builds an `ILIKE` pattern matching `query` anywhere in a column, with
/// `%`, `_` and `\` escaped so they match literally.
pub fn contains_pattern(query: &str) -> String {
    format!("%{}%", escape_like_pattern(query))
}

/// Same as [`contains_pattern`] for an optional search term.
pub fn optional_pattern(query: Option<&str>) -> Option<String> {
    query.map(contains_pattern)
}

fn escape_like_pattern(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '%' | '_' | '\\' => {
                escaped.push('\\');
                escaped.push(ch);
            }
            _ => escaped.push(ch),
        }
    }
    escaped
}
