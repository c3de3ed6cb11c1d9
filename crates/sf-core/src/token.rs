//! Splits a command string into an argv-style vector, preserving quoted
//! substrings as single tokens.
//!
//! No escape processing, no environment expansion, no globbing — a token is
//! either a double-quoted run, a single-quoted run (quotes kept in the
//! token), or a maximal run of non-whitespace characters.

use std::sync::LazyLock;

use regex::Regex;

static TOKEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""[^"]*"|'[^']*'|\S+"#).expect("static pattern is valid"));

/// Split `command` into argv-style tokens. An empty or whitespace-only
/// command yields an empty vector; callers treat that as "use the identity
/// executor."
pub fn split(command: &str) -> Vec<String> {
    TOKEN_PATTERN
        .find_iter(command)
        .map(|m| m.as_str().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_plain_words() {
        assert_eq!(split("wc -w"), vec!["wc", "-w"]);
    }

    #[test]
    fn empty_command_yields_empty_argv() {
        assert!(split("").is_empty());
        assert!(split("   ").is_empty());
    }

    #[test]
    fn preserves_double_quoted_substring_with_quotes() {
        assert_eq!(
            split(r#"grep "hello world""#),
            vec!["grep", "\"hello world\""]
        );
    }

    #[test]
    fn preserves_single_quoted_substring_with_quotes() {
        assert_eq!(split("echo 'a b c'"), vec!["echo", "'a b c'"]);
    }

    #[test]
    fn collapses_repeated_whitespace() {
        assert_eq!(split("  a    b  "), vec!["a", "b"]);
    }

    #[test]
    fn mixed_quoted_and_bare_tokens() {
        assert_eq!(
            split(r#"cmd arg1 "quoted arg" 'another one' bare"#),
            vec!["cmd", "arg1", "\"quoted arg\"", "'another one'", "bare"]
        );
    }
}
