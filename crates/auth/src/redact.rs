//! Log redaction for credential material.

/// Shorten a credential for logging. Values longer than eight characters
/// keep a prefix for correlation; anything shorter is fully masked.
/// Signing secrets must never be passed through here at all.
#[must_use]
pub fn redact(value: &str) -> String {
    if value.chars().count() <= 8 {
        return "***".to_string();
    }
    let prefix: String = value.chars().take(8).collect();
    format!("{prefix}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_values_keep_a_prefix_only() {
        let token = "eyJpZCI6InJlcy0xIn0.c2lnbmF0dXJl";
        assert_eq!(redact(token), "eyJpZCI6...");
    }

    #[test]
    fn short_values_are_fully_masked() {
        assert_eq!(redact(""), "***");
        assert_eq!(redact("12345678"), "***");
    }
}
