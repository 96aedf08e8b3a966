use crate::model::PriceEntry;

/// Canonical form of a text column: literal double quotes removed, upper-cased.
pub fn normalize_field(raw: &str) -> String {
    raw.replace('"', "").to_uppercase()
}

/// Display label of an entry, `"DESCRIPTION - CONTAINER"`.
pub fn label_of(entry: &PriceEntry) -> String {
    format!("{} - {}", entry.description, entry.container)
}
