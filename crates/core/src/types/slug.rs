//! URL slug derivation.

/// Derive a URL-safe slug from a title.
///
/// Lowercases the input, collapses every run of non-alphanumeric ASCII
/// into a single `-`, and trims leading/trailing dashes. Collision
/// handling (numeric suffixes) is the caller's concern, since it needs a
/// uniqueness check against stored data.
///
/// ## Examples
///
/// ```
/// use durian_core::slugify;
///
/// assert_eq!(slugify("Durian Pak Jayus"), "durian-pak-jayus");
/// assert_eq!(slugify("  Musang King!! (Grade A)  "), "musang-king-grade-a");
/// ```
#[must_use]
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic() {
        assert_eq!(slugify("Hello World"), "hello-world");
    }

    #[test]
    fn test_collapses_runs() {
        assert_eq!(slugify("a  -  b___c"), "a-b-c");
    }

    #[test]
    fn test_trims_edges() {
        assert_eq!(slugify("--edges--"), "edges");
        assert_eq!(slugify("  spaced  "), "spaced");
    }

    #[test]
    fn test_non_ascii_dropped() {
        // Non-ASCII characters act as separators, matching the original
        // [^a-z0-9]+ replacement
        assert_eq!(slugify("durian änanas"), "durian-nanas");
    }

    #[test]
    fn test_empty_and_symbol_only() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("!!!"), "");
    }
}
