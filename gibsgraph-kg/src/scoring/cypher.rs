//! Deterministic quality score for a schema's Cypher setup script

use crate::schema::{Finding, Stage};
use tracing::debug;

/// Keywords that must never appear in a setup script (matched case-insensitively)
pub const FORBIDDEN_KEYWORDS: [&str; 6] = ["DELETE", "DETACH", "DROP", "REMOVE", "FOREACH", "CALL {"];

/// Forbidden keywords contained in `cypher`, in declaration order
pub(crate) fn forbidden_keywords(cypher: &str) -> impl Iterator<Item = &'static str> {
    let upper = cypher.to_uppercase();
    FORBIDDEN_KEYWORDS
        .into_iter()
        .filter(move |keyword| upper.contains(keyword))
}

/// Score a Cypher setup script
///
/// 0.5 for a `CREATE CONSTRAINT` statement plus 0.5 for a `CREATE INDEX`
/// statement. An empty script, or one containing a forbidden keyword, scores
/// 0.0 with an ERROR finding.
pub fn score_cypher_quality(cypher: &str) -> (f64, Vec<Finding>) {
    let mut findings = Vec::new();

    if cypher.trim().is_empty() {
        findings.push(Finding::error(Stage::Cypher, "Setup script is empty"));
        return (0.0, findings);
    }

    if let Some(keyword) = forbidden_keywords(cypher).next() {
        findings.push(Finding::error(
            Stage::Cypher,
            format!("Contains dangerous keyword '{}'", keyword),
        ));
        return (0.0, findings);
    }

    let upper = cypher.to_uppercase();
    let mut score = 0.0;

    if upper.contains("CREATE CONSTRAINT") {
        score += 0.5;
    } else {
        findings.push(Finding::warning(Stage::Cypher, "No CREATE CONSTRAINT in setup"));
    }

    if upper.contains("CREATE INDEX") {
        score += 0.5;
    } else {
        findings.push(Finding::warning(Stage::Cypher, "No CREATE INDEX in setup"));
    }

    debug!("Cypher quality score {}", score);
    (score, findings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Severity;

    #[test]
    fn test_constraint_and_index_score_one() {
        let (score, findings) = score_cypher_quality(
            "CREATE CONSTRAINT a_id FOR (a:Account) REQUIRE a.id IS UNIQUE;\n\
             CREATE INDEX t_ts FOR (t:Transaction) ON (t.timestamp);",
        );
        assert_eq!(score, 1.0);
        assert!(findings.is_empty());
    }

    #[test]
    fn test_lowercase_statements_are_recognised() {
        let (score, _) = score_cypher_quality("create index t_ts for (t:Transaction) on (t.ts)");
        assert_eq!(score, 0.5);
    }

    #[test]
    fn test_missing_index_is_warning() {
        let (score, findings) =
            score_cypher_quality("CREATE CONSTRAINT a_id FOR (a:Account) REQUIRE a.id IS UNIQUE");
        assert_eq!(score, 0.5);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity(), Severity::Warning);
        assert_eq!(findings[0].message(), "No CREATE INDEX in setup");
    }

    #[test]
    fn test_whitespace_only_is_error() {
        let (score, findings) = score_cypher_quality("   \n\t");
        assert_eq!(score, 0.0);
        assert_eq!(findings.len(), 1);
        assert!(findings[0].is_error());
        assert_eq!(findings[0].stage(), Stage::Cypher);
    }

    #[test]
    fn test_forbidden_keyword_short_circuits() {
        let (score, findings) = score_cypher_quality(
            "CREATE CONSTRAINT a_id FOR (a:Account) REQUIRE a.id IS UNIQUE;\nMATCH (n) detach delete n",
        );
        assert_eq!(score, 0.0);
        assert_eq!(findings.len(), 1);
        assert!(findings[0].is_error());
        assert!(findings[0].message().starts_with("Contains dangerous keyword"));
    }

    #[test]
    fn test_forbidden_keywords_lists_every_match() {
        let found: Vec<_> = forbidden_keywords("DROP INDEX x; CALL { MATCH (n) REMOVE n.x }").collect();
        assert_eq!(found, vec!["DROP", "REMOVE", "CALL {"]);
    }
}
