//! Socratic LLM scoring
//!
//! Instead of asking a model for a number, ask it twelve specific yes/no
//! questions and score each dimension as the fraction of YES answers. The
//! model is an external collaborator behind [`LanguageModel`]; retries, if
//! any, belong to the implementation of that trait.

use crate::error::{KgError, Result};
use crate::schema::SynthesisResult;
use crate::scoring::round3;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Characters of research context included in the prompt
pub const RESEARCH_CONTEXT_LIMIT: usize = 2000;

/// Question ids per dimension
const REGULATORY_KEYS: [&str; 4] = ["R1", "R2", "R3", "R4"];
const EXPERT_KEYS: [&str; 4] = ["E1", "E2", "E3", "E4"];
const COMPLETENESS_KEYS: [&str; 4] = ["C1", "C2", "C3", "C4"];

/// A text-in, text-out language model
pub trait LanguageModel: Send + Sync {
    /// Send `prompt` and return the raw completion text
    fn invoke(&self, prompt: &str) -> Result<String>;
}

impl<F> LanguageModel for F
where
    F: Fn(&str) -> Result<String> + Send + Sync,
{
    fn invoke(&self, prompt: &str) -> Result<String> {
        self(prompt)
    }
}

/// Supporting material the reviewer model judges the schema against
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SocraticContext {
    /// Research findings the schema should address
    pub research_context: String,
    /// Patterns domain experts recommend
    pub expert_patterns: Vec<String>,
    pub industry: String,
    pub differentiators: Vec<String>,
}

impl SocraticContext {
    pub fn new(industry: impl Into<String>) -> Self {
        Self {
            industry: industry.into(),
            ..Default::default()
        }
    }

    pub fn with_research(mut self, research: impl Into<String>) -> Self {
        self.research_context = research.into();
        self
    }

    pub fn with_expert_patterns(mut self, patterns: &[&str]) -> Self {
        self.expert_patterns = patterns.iter().map(|p| p.to_string()).collect();
        self
    }
}

/// Scores of the three LLM-assessed dimensions, each in `[0, 1]`
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SocraticBreakdown {
    pub regulatory_coverage: f64,
    pub expert_alignment: f64,
    pub completeness: f64,
}

impl SocraticBreakdown {
    /// All three dimensions at 0.0, the result of any failure
    pub fn zero() -> Self {
        Self::default()
    }
}

/// Build the twelve-question review prompt
pub fn build_socratic_prompt(synthesis: &SynthesisResult, ctx: &SocraticContext) -> String {
    let schema = &synthesis.graph_schema;
    let industry = &ctx.industry;

    let nodes = schema
        .nodes
        .iter()
        .map(|n| format!("{} (required: {:?})", n.label, n.required_properties))
        .collect::<Vec<_>>()
        .join(", ");
    let relationships = schema
        .relationships
        .iter()
        .map(|r| format!("({})-[:{}]->({})", r.from_label, r.rel_type, r.to_label))
        .collect::<Vec<_>>()
        .join(", ");
    let research: String = ctx.research_context.chars().take(RESEARCH_CONTEXT_LIMIT).collect();

    format!(
        r#"You are a strict Neo4j schema reviewer.
Answer each question with exactly "YES" or "NO". No explanation.

SCHEMA UNDER REVIEW:
Industry: {industry}
Differentiators: {differentiators:?}
Nodes: {nodes}
Relationships: {relationships}
Constraints: {constraints:?}
Indexes: {indexes:?}
Claimed regulations: {regulations:?}

RESEARCH CONTEXT (what the schema should address):
{research}

EXPERT PATTERNS (what Neo4j experts say this domain needs):
{patterns:?}

REGULATORY COVERAGE (answer YES or NO for each):
R1: Does the schema have a node that can store the primary regulated entity for {industry}?
R2: Are all claimed regulatory requirements actually addressable with this schema?
R3: Is there a relationship pattern that enables the primary compliance query?
R4: Do the constraints reflect the regulatory uniqueness requirements?

EXPERT ALIGNMENT (answer YES or NO for each):
E1: Do relationship directions match domain logic (money flows, ownership, causality)?
E2: Are the node labels domain-specific (not generic like Entity or Object)?
E3: Do the indexes reflect the primary query patterns for this domain?
E4: Are the expert patterns from the knowledge base reflected in the schema?

COMPLETENESS (answer YES or NO for each):
C1: Are there at least 4 node types that represent distinct domain concepts?
C2: Is the primary domain risk pattern (fraud ring, compliance violation, etc.) detectable?
C3: Are temporal properties present where the domain requires audit trails?
C4: Would a domain expert recognize this schema as specific to {industry}?

Respond ONLY with valid JSON. No other text:
{{"R1": "YES/NO", "R2": "YES/NO", "R3": "YES/NO", "R4": "YES/NO",
  "E1": "YES/NO", "E2": "YES/NO", "E3": "YES/NO", "E4": "YES/NO",
  "C1": "YES/NO", "C2": "YES/NO", "C3": "YES/NO", "C4": "YES/NO"}}"#,
        differentiators = ctx.differentiators,
        constraints = schema.constraints,
        indexes = schema.indexes,
        regulations = synthesis.regulatory_requirements,
        patterns = ctx.expert_patterns,
    )
}

/// Parse the model's answer into `{question id: answer}`
///
/// Markdown code fences are stripped. Answers that are not strings are
/// dropped, so they count as NO.
pub fn parse_socratic_answers(text: &str) -> Result<BTreeMap<String, String>> {
    let mut text = text.trim().to_string();
    if text.starts_with("```") {
        text = text
            .lines()
            .filter(|line| !line.trim_start().starts_with("```"))
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string();
    }

    let value: Value = serde_json::from_str(&text)?;
    let object = match value {
        Value::Object(map) => map,
        other => {
            return Err(KgError::SerializationError(format!(
                "Expected a JSON object of answers, got {}",
                other
            )))
        }
    };

    Ok(object
        .into_iter()
        .filter_map(|(key, value)| match value {
            Value::String(answer) => Some((key, answer)),
            _ => None,
        })
        .collect())
}

/// Convert yes/no answers into dimension scores
///
/// Missing keys count as NO. Comparison ignores case and surrounding whitespace.
pub fn compute_score_from_socratic(answers: &BTreeMap<String, String>) -> SocraticBreakdown {
    let dimension = |keys: &[&str]| {
        let yes = keys
            .iter()
            .filter(|k| {
                answers
                    .get(**k)
                    .is_some_and(|a| a.trim().eq_ignore_ascii_case("YES"))
            })
            .count();
        round3(yes as f64 / keys.len() as f64)
    };

    SocraticBreakdown {
        regulatory_coverage: dimension(&REGULATORY_KEYS),
        expert_alignment: dimension(&EXPERT_KEYS),
        completeness: dimension(&COMPLETENESS_KEYS),
    }
}

/// Asks a [`LanguageModel`] the Socratic questions about one schema
pub struct SocraticScorer<'a> {
    llm: &'a dyn LanguageModel,
}

impl<'a> SocraticScorer<'a> {
    pub fn new(llm: &'a dyn LanguageModel) -> Self {
        Self { llm }
    }

    /// Score, surfacing LLM and parse failures
    pub fn try_score(
        &self,
        synthesis: &SynthesisResult,
        ctx: &SocraticContext,
    ) -> Result<SocraticBreakdown> {
        let prompt = build_socratic_prompt(synthesis, ctx);
        debug!("Sending Socratic review prompt ({} chars)", prompt.len());

        let response = self.llm.invoke(&prompt)?;
        let answers = parse_socratic_answers(&response)?;
        Ok(compute_score_from_socratic(&answers))
    }

    /// Score, failing safe to all zeros
    pub fn score(&self, synthesis: &SynthesisResult, ctx: &SocraticContext) -> SocraticBreakdown {
        self.try_score(synthesis, ctx).unwrap_or_else(|e| {
            warn!("Socratic scoring failed: {}", e);
            SocraticBreakdown::zero()
        })
    }
}
