/// Checks if a URL matches a keyword exclusion
///
/// This function supports two kinds of keywords:
/// 1. Plain keyword: "logout" matches any URL containing "logout"
/// 2. Glob pattern: a keyword containing `*` must match the whole URL, where
///    `*` stands for any run of characters (including none)
///
/// # Examples
///
/// ```
/// use link_ledger::url::matches_keyword;
///
/// assert!(matches_keyword("logout", "https://example.com/account/logout"));
/// assert!(matches_keyword("*.pdf", "https://example.com/files/guide.pdf"));
/// assert!(!matches_keyword("*.pdf", "https://example.com/files/guide.pdf?x=1"));
/// ```
pub fn matches_keyword(keyword: &str, url: &str) -> bool {
    if keyword.is_empty() {
        return false;
    }

    if keyword.contains('*') {
        glob_match(keyword.as_bytes(), url.as_bytes())
    } else {
        url.contains(keyword)
    }
}

/// Iterative wildcard match with single-star backtracking
fn glob_match(pattern: &[u8], text: &[u8]) -> bool {
    let (mut p, mut t) = (0, 0);
    let mut star: Option<usize> = None;
    let mut star_text = 0;

    while t < text.len() {
        if p < pattern.len() && pattern[p] == b'*' {
            star = Some(p);
            star_text = t;
            p += 1;
        } else if p < pattern.len() && pattern[p] == text[t] {
            p += 1;
            t += 1;
        } else if let Some(s) = star {
            p = s + 1;
            star_text += 1;
            t = star_text;
        } else {
            return false;
        }
    }

    while p < pattern.len() && pattern[p] == b'*' {
        p += 1;
    }

    p == pattern.len()
}
