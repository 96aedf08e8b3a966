pub const MAX_FIELD_LEN: usize = 100;

pub fn format_amount(value: f64) -> String {
    format!("{:.2}", value)
}

/// Capitalizes the first letter of every word and lowercases the rest.
///
/// A letter starts a word when the character before it is not a letter,
/// so `"RED DELICIOUS - CARTON"` becomes `"Red Delicious - Carton"`.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_is_letter = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if prev_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(c);
            prev_is_letter = false;
        }
    }
    out
}

/// Trims a required form field. Returns a message describing the problem
/// when the value is blank or too long.
pub fn clean_required(field: &str, value: &str) -> Result<String, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(format!("{}: This field is required.", field));
    }
    check_length(field, trimmed)?;
    Ok(trimmed.to_string())
}

pub fn clean_optional(field: &str, value: Option<&str>) -> Result<Option<String>, String> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(trimmed) => {
            check_length(field, trimmed)?;
            Ok(Some(trimmed.to_string()))
        }
    }
}

fn check_length(field: &str, value: &str) -> Result<(), String> {
    let len = value.chars().count();
    if len > MAX_FIELD_LEN {
        return Err(format!(
            "{}: Ensure this value has at most {} characters (it has {}).",
            field, MAX_FIELD_LEN, len
        ));
    }
    Ok(())
}
