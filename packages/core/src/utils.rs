// ABOUTME: Shared utility functions for Casebook
// ABOUTME: ID generation, title slugs, string helpers

/// Generate a unique draft ID (8-character alphanumeric format)
pub fn generate_draft_id() -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";
    let mut rng = rand::thread_rng();
    (0..8)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

/// Derive a folder-name slug from a case-study title.
///
/// Lowercases, collapses runs of non-alphanumeric characters into single
/// hyphens, and trims leading/trailing hyphens. An all-symbol title slugs
/// to "case-study" so the blob key layout never sees an empty segment.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_was_hyphen = true;
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            slug.push('-');
            last_was_hyphen = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    if slug.is_empty() {
        "case-study".to_string()
    } else {
        slug
    }
}

/// Truncates a string to a maximum length, appending "..." when cut
pub fn truncate(s: &str, max_length: usize) -> String {
    if s.chars().count() <= max_length {
        s.to_string()
    } else if max_length <= 3 {
        s.chars().take(max_length).collect()
    } else {
        let cut: String = s.chars().take(max_length - 3).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_draft_id() {
        let id1 = generate_draft_id();
        let id2 = generate_draft_id();

        assert_eq!(id1.len(), 8);
        assert_eq!(id2.len(), 8);
        assert_ne!(id1, id2);
        assert!(id1.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Acme Cloud Migration"), "acme-cloud-migration");
        assert_eq!(slugify("  CST/12 -- phase 2  "), "cst-12-phase-2");
        assert_eq!(slugify("cst12"), "cst12");
        assert_eq!(slugify("!!!"), "case-study");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a much longer title", 10), "a much ...");
        assert_eq!(truncate("abc", 2), "ab");
    }
}
