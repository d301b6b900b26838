//! CQL query construction for the Gallica SRU endpoint.

/// Quote a term for use in a CQL clause.
fn quote(term: &str) -> String {
    format!("\"{}\"", term.trim().replace('\\', "\\\\").replace('"', "\\\""))
}

/// `all` matches every word in any order; `adj` matches the exact phrase.
fn relation(exact: bool) -> &'static str {
    if exact { "adj" } else { "all" }
}

fn field_clause(index: &str, term: &str, exact: bool) -> String {
    format!("{} {} {}", index, relation(exact), quote(term))
}

/// Free-text search across every indexed field.
pub fn natural_language(text: &str) -> String {
    field_clause("gallica", text, false)
}

pub fn title(text: &str, exact: bool) -> String {
    field_clause("dc.title", text, exact)
}

pub fn author(text: &str, exact: bool) -> String {
    field_clause("dc.creator", text, exact)
}

pub fn subject(text: &str, exact: bool) -> String {
    field_clause("dc.subject", text, exact)
}

/// Single date, or an inclusive range when `end` is given.
pub fn date(start: &str, end: Option<&str>) -> String {
    match end {
        Some(end) if !end.trim().is_empty() => format!(
            "dc.date >= {} and dc.date <= {}",
            quote(start),
            quote(end)
        ),
        _ => format!("dc.date = {}", quote(start)),
    }
}

pub fn document_type(doc_type: &str) -> String {
    field_clause("dc.type", doc_type, false)
}

/// Still images matching a keyword.
pub fn image(keyword: &str) -> String {
    format!("{} and ({})", document_type("image"), natural_language(keyword))
}

/// Maps matching a keyword.
pub fn map(keyword: &str) -> String {
    format!("{} and ({})", document_type("carte"), natural_language(keyword))
}

/// Any visual material (image, map or print) matching a keyword.
pub fn visual_material(keyword: &str) -> String {
    format!(
        "({} or {} or {}) and ({})",
        document_type("image"),
        document_type("carte"),
        document_type("estampe"),
        natural_language(keyword)
    )
}
