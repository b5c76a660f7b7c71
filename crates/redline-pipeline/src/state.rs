use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Sentinel for key terms the capability could not identify. Downstream
/// consumers never branch on field presence.
pub const NOT_SPECIFIED: &str = "Not specified";

/// A contiguous span of the document's text with an inferred category.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyTerms {
    #[serde(default)]
    pub parties: Vec<String>,
    pub effective_date: String,
    pub termination_date: String,
    pub payment_terms: String,
    pub governing_law: String,
}

impl Default for KeyTerms {
    fn default() -> Self {
        Self {
            parties: Vec::new(),
            effective_date: NOT_SPECIFIED.to_string(),
            termination_date: NOT_SPECIFIED.to_string(),
            payment_terms: NOT_SPECIFIED.to_string(),
            governing_law: NOT_SPECIFIED.to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structured excerpt of contract text with an assigned type and risk level.
///
/// `kind` is a free string: the clause-type vocabulary offered to the
/// capability is advisory, and types outside it pass through unchanged.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clause {
    #[serde(rename = "type")]
    pub kind: String,
    pub content: String,
    pub risk_level: RiskLevel,
    pub analysis: String,
}

/// Terminal verdict of the analytical stage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    pub overall_risk: RiskLevel,
    pub critical_issues: Vec<String>,
    pub recommendations: Vec<String>,
}

impl Default for RiskAssessment {
    fn default() -> Self {
        Self {
            overall_risk: RiskLevel::Low,
            critical_issues: Vec::new(),
            recommendations: Vec::new(),
        }
    }
}

impl RiskAssessment {
    /// Safe verdict substituted when the synthesis output cannot be parsed:
    /// the assessment must still read as "uncertain, needs human attention",
    /// never as an empty result.
    pub fn incomplete() -> Self {
        Self {
            overall_risk: RiskLevel::Medium,
            critical_issues: vec!["Unable to complete full risk assessment".to_string()],
            recommendations: vec!["Manual review recommended".to_string()],
        }
    }
}

/// Accretive state threaded through the four analysis stages.
///
/// Each stage writes only the fields it owns and treats everything written by
/// an earlier stage as read-only input. One instance belongs to exactly one
/// analysis and is discarded with the response.
#[derive(Clone, Debug, PartialEq)]
pub struct ContractState {
    pub document: Bytes,
    pub filename: String,
    pub extracted_text: String,
    pub sections: Vec<Section>,
    pub clauses: Vec<Clause>,
    pub risk_assessment: RiskAssessment,
    pub key_terms: KeyTerms,
    pub report: String,
}

impl ContractState {
    pub fn new(document: Bytes, filename: impl Into<String>) -> Self {
        Self {
            document,
            filename: filename.into(),
            extracted_text: String::new(),
            sections: Vec::new(),
            clauses: Vec::new(),
            risk_assessment: RiskAssessment::default(),
            key_terms: KeyTerms::default(),
            report: String::new(),
        }
    }
}
