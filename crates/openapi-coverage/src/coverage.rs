//! Capability coverage matrix and its aggregate summary.

use serde::Serialize;

use crate::matcher::{CapabilityMatch, Coverage, Evidence, round2};

const PARTIAL_GAP: &str =
    "Only partial endpoint support was found; the closest operations may not cover every field or step.";
const PARTIAL_QUESTION: &str =
    "Which fields, filters or sub-steps does this capability require beyond the matched endpoints?";
const MISSING_GAP: &str = "No endpoint in the spec clearly supports this capability.";
const MISSING_QUESTION: &str =
    "Is this capability available through another API, a webhook subscription or a manual process?";

const UNLOCATED_SPEC_GAP: &str =
    "No OpenAPI/Swagger spec URL could be located in the request, so no endpoints were evaluated.";
const UNLOCATED_SPEC_QUESTIONS: [&str; 2] = [
    "What is the URL of the target system's OpenAPI or Swagger document?",
    "Is the API documented under a different name or behind authentication?",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatrixRow {
    pub capability: String,
    pub coverage: Coverage,
    pub confidence: f64,
    pub evidence: Vec<Evidence>,
    pub gaps: Vec<String>,
    pub next_questions: Vec<String>,
}

impl MatrixRow {
    /// Row for a capability scored against the endpoint inventory
    #[must_use]
    pub fn from_match(capability: impl Into<String>, matched: CapabilityMatch) -> Self {
        let (gaps, next_questions) = match matched.coverage {
            Coverage::Full => (Vec::new(), Vec::new()),
            Coverage::Partial => (vec![PARTIAL_GAP.to_string()], vec![PARTIAL_QUESTION.to_string()]),
            Coverage::Missing => (vec![MISSING_GAP.to_string()], vec![MISSING_QUESTION.to_string()]),
        };

        MatrixRow {
            capability: capability.into(),
            coverage: matched.coverage,
            confidence: round2(matched.best_confidence),
            evidence: matched.evidence,
            gaps,
            next_questions,
        }
    }

    /// Row for a capability that could not be evaluated because no spec was found
    #[must_use]
    pub fn unlocated_spec(capability: impl Into<String>) -> Self {
        MatrixRow {
            capability: capability.into(),
            coverage: Coverage::Missing,
            confidence: 0.0,
            evidence: Vec::new(),
            gaps: vec![UNLOCATED_SPEC_GAP.to_string()],
            next_questions: UNLOCATED_SPEC_QUESTIONS
                .iter()
                .map(|q| q.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Overall {
    pub coverage_score: u32,
    pub full_count: usize,
    pub partial_count: usize,
    pub missing_count: usize,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint_count: Option<usize>,
}

impl Overall {
    /// Summarize a matrix; `endpoint_count` is reported as given
    #[must_use]
    pub fn from_rows(rows: &[MatrixRow], endpoint_count: Option<usize>) -> Self {
        let count = |coverage: Coverage| rows.iter().filter(|row| row.coverage == coverage).count();
        let full_count = count(Coverage::Full);
        let partial_count = count(Coverage::Partial);
        let missing_count = count(Coverage::Missing);

        let (coverage_score, confidence) = if rows.is_empty() {
            (0, 0.0)
        } else {
            let total = rows.len() as f64;
            let weighted = full_count as f64 + partial_count as f64 * 0.5;
            let mean = rows.iter().map(|row| row.confidence).sum::<f64>() / total;
            ((100.0 * weighted / total).round() as u32, round2(mean))
        };

        Overall {
            coverage_score,
            full_count,
            partial_count,
            missing_count,
            confidence,
            endpoint_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatrixInput {
    pub spec_url: Option<String>,
}

/// Complete capability matrix output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapabilityMatrix {
    pub input: MatrixInput,
    pub extracted_capabilities: Vec<String>,
    pub overall: Overall,
    pub matrix: Vec<MatrixRow>,
}

impl CapabilityMatrix {
    /// Assemble a matrix from scored rows
    #[must_use]
    pub fn new(spec_url: Option<String>, rows: Vec<MatrixRow>, endpoint_count: Option<usize>) -> Self {
        CapabilityMatrix {
            input: MatrixInput { spec_url },
            extracted_capabilities: rows.iter().map(|row| row.capability.clone()).collect(),
            overall: Overall::from_rows(&rows, endpoint_count),
            matrix: rows,
        }
    }

    /// Matrix produced when the request names no locatable spec: every
    /// capability is missing with a note explaining why.
    #[must_use]
    pub fn without_spec(capabilities: &[String]) -> Self {
        let rows = capabilities
            .iter()
            .map(|capability| MatrixRow::unlocated_spec(capability.as_str()))
            .collect();
        Self::new(None, rows, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(coverage: Coverage, confidence: f64) -> MatrixRow {
        MatrixRow {
            capability: "Create customer".to_string(),
            coverage,
            confidence,
            evidence: Vec::new(),
            gaps: Vec::new(),
            next_questions: Vec::new(),
        }
    }

    #[test]
    fn test_coverage_score_rounds_half_up() {
        let rows = vec![
            row(Coverage::Full, 1.0),
            row(Coverage::Full, 0.8),
            row(Coverage::Partial, 0.5),
            row(Coverage::Missing, 0.1),
        ];
        let overall = Overall::from_rows(&rows, Some(12));

        assert_eq!(overall.coverage_score, 63);
        assert_eq!(overall.full_count, 2);
        assert_eq!(overall.partial_count, 1);
        assert_eq!(overall.missing_count, 1);
        assert_eq!(overall.confidence, 0.6);
        assert_eq!(overall.endpoint_count, Some(12));
    }

    #[test]
    fn test_empty_matrix_has_zero_scores() {
        let overall = Overall::from_rows(&[], None);
        assert_eq!(overall.coverage_score, 0);
        assert_eq!(overall.confidence, 0.0);
    }

    #[test]
    fn test_row_templates_follow_coverage() {
        let full = MatrixRow::from_match(
            "Create customer",
            CapabilityMatch {
                best_confidence: 0.912,
                coverage: Coverage::Full,
                evidence: Vec::new(),
            },
        );
        assert!(full.gaps.is_empty());
        assert!(full.next_questions.is_empty());
        assert_eq!(full.confidence, 0.91);

        let missing = MatrixRow::from_match(
            "Create customer",
            CapabilityMatch {
                best_confidence: 0.2,
                coverage: Coverage::Missing,
                evidence: Vec::new(),
            },
        );
        assert_eq!(missing.gaps, vec![MISSING_GAP.to_string()]);
        assert_eq!(missing.next_questions, vec![MISSING_QUESTION.to_string()]);
    }

    #[test]
    fn test_without_spec_marks_everything_missing() {
        let capabilities = vec!["Create customer".to_string(), "Receive webhooks".to_string()];
        let matrix = CapabilityMatrix::without_spec(&capabilities);

        assert_eq!(matrix.matrix.len(), 2);
        assert_eq!(matrix.extracted_capabilities, capabilities);
        assert!(matrix.matrix.iter().all(|row| {
            row.coverage == Coverage::Missing && row.evidence.is_empty() && row.confidence == 0.0
        }));
        assert_eq!(matrix.overall.missing_count, 2);
        assert_eq!(matrix.overall.coverage_score, 0);

        let value = serde_json::to_value(&matrix).unwrap();
        assert_eq!(value["input"], json!({ "spec_url": null }));
        assert!(value["overall"].get("endpoint_count").is_none());
        assert_eq!(value["matrix"][0]["coverage"], "missing");
    }
}
