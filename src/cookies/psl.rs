//! Public Suffix List checks for cookie `Domain` attributes.
//!
//! A cookie scoped to `com` or `co.uk` would be sent to every site under
//! that suffix, so the jar refuses such domains. Backed by the `psl` crate.

use psl::{List, Psl};

/// True when `domain` is itself a public suffix (`com`, `co.uk`, `github.io`).
///
/// Hosts under an unlisted TLD fall back to the implicit `*` rule, so a bare
/// single label such as `localhost` also counts as a suffix.
pub fn is_public_suffix(domain: &str) -> bool {
    let domain = domain.trim_end_matches('.').to_ascii_lowercase();
    if domain.is_empty() {
        return false;
    }
    List.suffix(domain.as_bytes())
        .is_some_and(|suffix| suffix.as_bytes() == domain.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_public_suffix() {
        assert!(is_public_suffix("com"));
        assert!(is_public_suffix("COM"));
        assert!(is_public_suffix("co.uk"));
        assert!(is_public_suffix("github.io"));
    }

    #[test]
    fn test_not_public_suffix() {
        assert!(!is_public_suffix("example.com"));
        assert!(!is_public_suffix("sub.example.co.uk"));
        assert!(!is_public_suffix(""));
    }
}
