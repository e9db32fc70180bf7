//! Wildcard pattern matching over index, alias and type names
//!
//! Pure functions, no state. Patterns support `*` (any run of characters,
//! including none) and `?` (exactly one character). A pattern without
//! wildcards is an exact, case-sensitive comparison.

/// Returns whether the pattern contains any wildcard character
pub fn is_wildcard(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?')
}

/// Matches a single candidate against a single pattern
pub fn matches(pattern: &str, candidate: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let c: Vec<char> = candidate.chars().collect();

    let (mut pi, mut ci) = (0usize, 0usize);
    // backtracking positions for the most recent '*'
    let (mut star, mut mark) = (usize::MAX, 0usize);

    while ci < c.len() {
        if pi < p.len() && (p[pi] == '?' || p[pi] == c[ci]) {
            pi += 1;
            ci += 1;
        } else if pi < p.len() && p[pi] == '*' {
            star = pi;
            mark = ci;
            pi += 1;
        } else if star != usize::MAX {
            pi = star + 1;
            mark += 1;
            ci = mark;
        } else {
            return false;
        }
    }

    while pi < p.len() && p[pi] == '*' {
        pi += 1;
    }

    pi == p.len()
}

/// Returns whether the candidate matches any of the patterns
pub fn match_any<I, S>(patterns: I, candidate: &str) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    patterns
        .into_iter()
        .any(|p| matches(p.as_ref(), candidate))
}

/// Collects the candidates that match the given pattern
pub fn matching<'a, I>(pattern: &str, candidates: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a String>,
{
    candidates
        .into_iter()
        .filter(|c| matches(pattern, c))
        .cloned()
        .collect()
}

/// Collects the candidates that match any of the patterns
///
/// This is the intersection primitive used by retain-mode rewriting: the
/// candidates are a request's own resolved indices and the patterns are the
/// authorized set.
pub fn retain_matching<'a, I, S>(candidates: I, patterns: &[S]) -> Vec<String>
where
    I: IntoIterator<Item = &'a String>,
    S: AsRef<str>,
{
    candidates
        .into_iter()
        .filter(|c| match_any(patterns, c))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        assert!(matches("logs-2024", "logs-2024"));
        assert!(!matches("logs-2024", "logs-2025"));
        assert!(!matches("logs", "logs-2024"));
    }

    #[test]
    fn test_star_wildcard() {
        assert!(matches("logs-*", "logs-2024"));
        assert!(matches("logs-*", "logs-"));
        assert!(matches("*", "anything"));
        assert!(matches("*", ""));
        assert!(matches("*-2024", "logs-2024"));
        assert!(matches("l*s*4", "logs-2024"));
        assert!(!matches("logs-*", "metrics-2024"));
    }

    #[test]
    fn test_question_mark_wildcard() {
        assert!(matches("logs-?", "logs-1"));
        assert!(!matches("logs-?", "logs-12"));
        assert!(matches("l?gs-*", "logs-2024"));
    }

    #[test]
    fn test_case_sensitive() {
        assert!(!matches("Logs-*", "logs-2024"));
    }

    #[test]
    fn test_match_any() {
        let patterns = ["metrics-*", "logs-*"];
        assert!(match_any(patterns, "logs-2024"));
        assert!(!match_any(patterns, "traces-2024"));
    }

    #[test]
    fn test_matching_filters_candidates() {
        let candidates = vec![
            "alias-one".to_string(),
            "alias-two".to_string(),
            "other".to_string(),
        ];
        let hits = matching("alias-*", &candidates);
        assert_eq!(hits, vec!["alias-one".to_string(), "alias-two".to_string()]);
    }

    #[test]
    fn test_retain_matching() {
        let candidates = vec![
            "app-1".to_string(),
            "app-2".to_string(),
            "app-3".to_string(),
        ];
        let retained = retain_matching(&candidates, &["app-1", "app-2"]);
        assert_eq!(retained, vec!["app-1".to_string(), "app-2".to_string()]);
    }

    #[test]
    fn test_is_wildcard() {
        assert!(is_wildcard("logs-*"));
        assert!(is_wildcard("logs-?"));
        assert!(!is_wildcard("logs-2024"));
    }
}
