//! Safety checks for generated read queries
//!
//! Queries produced by a language model must use `$param` placeholders and
//! must not smuggle in writes, subqueries, or file and export access.

use crate::error::{KgError, Result};
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

const INJECTION_PATTERNS: [&str; 7] = [
    r"(?i);\s*DROP",
    r"(?i);\s*DELETE",
    r"(?i);\s*DETACH",
    // subquery injection
    r"(?i)CALL\s+\{",
    // file system access
    r"(?i)LOAD\s+CSV",
    r"(?i)apoc\.export",
    r"(?i)apoc\.load",
];

fn injection_patterns() -> &'static Vec<Regex> {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        INJECTION_PATTERNS
            .iter()
            .map(|p| Regex::new(p).expect("valid regex"))
            .collect()
    })
}

fn interpolation_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"\$\{.+?\}|"\s*\+\s*\w+\s*\+\s*""#).expect("valid regex")
    })
}

fn parameter_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$(\w+)").expect("valid regex"))
}

/// Validates Cypher queries before they reach the database
#[derive(Debug, Clone, Copy, Default)]
pub struct CypherGuard;

impl CypherGuard {
    pub fn new() -> Self {
        Self
    }

    /// `true` if the query passes [`assert_valid`](Self::assert_valid)
    pub fn validate(&self, cypher: &str) -> bool {
        self.assert_valid(cypher).is_ok()
    }

    /// Reject empty queries, injection patterns and string interpolation
    pub fn assert_valid(&self, cypher: &str) -> Result<()> {
        if cypher.trim().is_empty() {
            return Err(KgError::UnsafeCypher("Cypher query is empty".to_string()));
        }

        if let Some(pattern) = injection_patterns().iter().find(|p| p.is_match(cypher)) {
            return Err(KgError::UnsafeCypher(format!(
                "Potentially unsafe Cypher pattern detected: {}",
                pattern.as_str()
            )));
        }

        if interpolation_pattern().is_match(cypher) {
            return Err(KgError::UnsafeCypher(
                "String interpolation detected, use $param syntax instead".to_string(),
            ));
        }

        debug!("Cypher query accepted ({} chars)", cypher.len());
        Ok(())
    }

    /// Names of the `$parameters` referenced by the query, in order of appearance
    pub fn extract_parameters(&self, cypher: &str) -> Vec<String> {
        parameter_pattern()
            .captures_iter(cypher)
            .map(|caps| caps[1].to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameterised_read_is_valid() {
        let guard = CypherGuard::new();
        assert!(guard.validate("MATCH (p:Person {name: $name}) RETURN p LIMIT $limit"));
    }

    #[test]
    fn test_empty_is_rejected() {
        assert!(matches!(
            CypherGuard::new().assert_valid("  "),
            Err(KgError::UnsafeCypher(_))
        ));
    }

    #[test]
    fn test_injection_patterns_rejected() {
        let guard = CypherGuard::new();
        for query in [
            "MATCH (n) RETURN n; drop index foo",
            "MATCH (n) RETURN n;DELETE n",
            "MATCH (n) RETURN n ; DETACH DELETE n",
            "MATCH (n) CALL { MATCH (m) RETURN m } RETURN n",
            "LOAD CSV FROM 'file:///etc/passwd' AS row RETURN row",
            "CALL apoc.export.csv.all('out.csv', {})",
            "CALL apoc.load.json('http://x')",
        ] {
            assert!(!guard.validate(query), "accepted: {}", query);
        }
    }

    #[test]
    fn test_plain_delete_without_semicolon_is_not_an_injection() {
        assert!(CypherGuard::new().validate("MATCH (n:Tmp) DELETE n"));
    }

    #[test]
    fn test_interpolation_rejected() {
        let guard = CypherGuard::new();
        assert!(!guard.validate("MATCH (p {name: '${name}'}) RETURN p"));
        assert!(!guard.validate(r#"MATCH (p {name: "" + user + ""}) RETURN p"#));
    }

    #[test]
    fn test_extract_parameters() {
        let params = CypherGuard::new()
            .extract_parameters("MATCH (a {id: $from})-[:SENT]->(b {id: $to}) WHERE a.ts > $since");
        assert_eq!(params, vec!["from", "to", "since"]);
    }
}
