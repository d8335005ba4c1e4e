/// Normalize raw query text: trim, collapse internal whitespace runs to a
/// single space, lowercase. Accents, digits and currency symbols are kept
/// as-is; accent-insensitive comparison is the validator's job.
///
/// Returns an empty string for blank input, which the pipeline treats as
/// `EmptyInput` before making any collaborator calls.
pub fn normalize_query(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_collapses_whitespace() {
        assert_eq!(
            normalize_query("  Casa   en\tCuenca \n"),
            "casa en cuenca"
        );
    }

    #[test]
    fn lowercases_unicode() {
        assert_eq!(normalize_query("DEPARTAMENTO EN BAÑOS"), "departamento en baños");
    }

    #[test]
    fn preserves_accents_numbers_and_currency() {
        assert_eq!(
            normalize_query("Suite en Ñuñoa bajo $150k"),
            "suite en ñuñoa bajo $150k"
        );
    }

    #[test]
    fn blank_input_becomes_empty() {
        assert_eq!(normalize_query(""), "");
        assert_eq!(normalize_query("   \t\n  "), "");
    }
}
