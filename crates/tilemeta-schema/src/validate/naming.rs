use crate::MAX_ID_LEN;

/// Ensure an identifier is non-empty, bounded, and shaped like
/// `[A-Za-z_][A-Za-z0-9_]*`.
pub(crate) fn validate_id(kind: &str, id: &str) -> Result<(), String> {
    if id.is_empty() {
        return Err(format!("{kind} id is empty"));
    }
    if id.len() > MAX_ID_LEN {
        return Err(format!("{kind} id '{id}' exceeds max length {MAX_ID_LEN}"));
    }

    let mut chars = id.chars();
    let leading_ok = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if !leading_ok || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(format!("{kind} id '{id}' must match [A-Za-z_][A-Za-z0-9_]*"));
    }

    Ok(())
}
