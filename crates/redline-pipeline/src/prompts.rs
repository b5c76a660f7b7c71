//! Prompt templates for the analysis capability calls.
//!
//! Every call documents the exact JSON shape it expects back; the capability
//! is still free to return anything, so each call site parses defensively.

use crate::state::{Clause, KeyTerms, NOT_SPECIFIED, RiskLevel};

/// Advisory clause-type vocabulary offered to the extraction capability.
/// Output is not constrained to this set; unknown types pass through.
pub const CLAUSE_TYPES: [&str; 12] = [
    "indemnity",
    "limitation_of_liability",
    "termination",
    "payment_terms",
    "intellectual_property",
    "confidentiality",
    "force_majeure",
    "dispute_resolution",
    "governing_law",
    "warranties",
    "representations",
    "compliance",
];

pub(crate) const SECTION_SPLIT_SYSTEM: &str = r#"You are a legal document analyzer. Split the contract into logical sections and identify their types.

Return a JSON array of sections with the following structure:
[
  {
    "title": "Section title",
    "content": "Section content",
    "type": "section_type"
  }
]
Use lowercase section types such as "preamble", "definitions", "obligations" or "termination"."#;

pub(crate) fn section_split_prompt(text: &str) -> String {
    format!("Analyze this contract text and split it into logical sections:\n\n{text}")
}

pub(crate) const KEY_TERMS_SYSTEM: &str = r#"You are a legal document analyzer. Extract key terms from contracts.

Return a JSON object with the following structure:
{
  "parties": ["Party 1 Name", "Party 2 Name"],
  "effectiveDate": "Date or 'Not specified'",
  "terminationDate": "Date or 'Not specified'",
  "paymentTerms": "Payment terms summary or 'Not specified'",
  "governingLaw": "Governing law jurisdiction or 'Not specified'"
}"#;

pub(crate) fn key_terms_prompt(text: &str) -> String {
    format!("Extract key terms from this contract:\n\n{text}")
}

fn clause_shape() -> &'static str {
    r#"Return a JSON array with this structure:
[
  {
    "type": "clause_type",
    "content": "exact clause text",
    "riskLevel": "low|medium|high",
    "analysis": "brief analysis of the clause and why it has this risk level"
  }
]"#
}

pub(crate) fn section_clauses_system() -> String {
    format!(
        r#"You are a legal clause extraction expert. Identify and extract specific legal clauses from contract sections.

Focus on these clause types: {types}

For each clause found, assess its risk level:
- HIGH: Clauses that heavily favor one party, have unlimited liability, or lack important protections
- MEDIUM: Clauses with some concerning terms but reasonable overall
- LOW: Standard, balanced clauses with appropriate protections

{shape}"#,
        types = CLAUSE_TYPES.join(", "),
        shape = clause_shape(),
    )
}

pub(crate) fn section_clauses_prompt(content: &str, section_kind: &str) -> String {
    format!("Extract legal clauses from this contract section (type: {section_kind}):\n\n{content}")
}

pub(crate) fn full_text_clauses_system() -> String {
    format!(
        r#"You are a legal clause extraction expert. Perform a comprehensive analysis of the entire contract to identify any important clauses that might have been missed.

Focus on these clause types: {types}

Look for:
- Hidden or embedded clauses within larger paragraphs
- Cross-references between sections
- Implied terms or conditions

{shape}"#,
        types = CLAUSE_TYPES.join(", "),
        shape = clause_shape(),
    )
}

pub(crate) fn full_text_clauses_prompt(text: &str) -> String {
    format!("Perform a comprehensive clause extraction from this full contract text:\n\n{text}")
}

pub(crate) const RISK_FACTORS_SYSTEM: &str = r#"You are a legal risk assessment expert. Analyze the provided clauses and identify specific risk factors.

Return a JSON array of risk factors as strings."#;

pub(crate) fn risk_factors_prompt(high_risk: &[&Clause], medium_risk: &[&Clause]) -> String {
    format!(
        "Analyze these contract clauses and identify specific risk factors:\n\nHigh Risk Clauses:\n{}\n\nMedium Risk Clauses:\n{}",
        clause_lines(high_risk),
        clause_lines(medium_risk),
    )
}

fn clause_lines(clauses: &[&Clause]) -> String {
    clauses
        .iter()
        .map(|clause| format!("- {}: {}", clause.kind, clause.analysis))
        .collect::<Vec<_>>()
        .join("\n")
}

pub(crate) const STRUCTURAL_RISKS_SYSTEM: &str = r#"You are a contract structure analyst. Evaluate the contract for structural risks and missing protections.

Return a JSON object with this structure:
{
  "missingClauses": ["list of important missing clause types"],
  "imbalancedTerms": ["list of terms that heavily favor one party"],
  "structuralIssues": ["list of structural problems with the contract"]
}"#;

pub(crate) fn structural_risks_prompt(clause_kinds: &[String], key_terms: &KeyTerms) -> String {
    let parties = if key_terms.parties.is_empty() {
        NOT_SPECIFIED.to_string()
    } else {
        key_terms.parties.join(", ")
    };
    format!(
        "Analyze this contract structure:\n\nPresent Clause Types: {}\n\nKey Terms:\n- Parties: {}\n- Payment Terms: {}\n- Governing Law: {}\n- Effective Date: {}\n- Termination Date: {}",
        clause_kinds.join(", "),
        parties,
        or_not_specified(&key_terms.payment_terms),
        or_not_specified(&key_terms.governing_law),
        or_not_specified(&key_terms.effective_date),
        or_not_specified(&key_terms.termination_date),
    )
}

pub(crate) const OVERALL_ASSESSMENT_SYSTEM: &str = r#"You are a senior legal risk assessor. Provide a comprehensive risk assessment for this contract.

Consider:
- Number and severity of high-risk clauses
- Missing important protections
- Structural imbalances
- Overall contract fairness

Return a JSON object with this structure:
{
  "overallRisk": "low|medium|high",
  "criticalIssues": ["list of the most critical issues that need immediate attention"],
  "recommendations": ["list of specific recommendations to mitigate risks"]
}"#;

pub(crate) fn overall_assessment_prompt(
    high_risk_count: usize,
    medium_risk_count: usize,
    risk_factors: &[String],
    missing_clauses: &[String],
    imbalanced_terms: &[String],
    structural_issues: &[String],
) -> String {
    format!(
        "Provide overall risk assessment based on:\n\nClause Risks:\n- High Risk Clauses: {high_risk_count}\n- Medium Risk Clauses: {medium_risk_count}\n- Risk Factors: {}\n\nStructural Risks:\n- Missing Clauses: {}\n- Imbalanced Terms: {}\n- Structural Issues: {}",
        joined_or_none(risk_factors),
        joined_or_none(missing_clauses),
        joined_or_none(imbalanced_terms),
        joined_or_none(structural_issues),
    )
}

pub(crate) const REPORT_SYSTEM: &str = r#"You are a legal report writer. Generate a comprehensive, professional contract analysis report.

The report should include:
1. Executive Summary
2. Contract Overview
3. Key Terms Analysis
4. Clause-by-Clause Review
5. Risk Assessment
6. Recommendations
7. Conclusion

Use professional legal language but keep it accessible."#;

pub(crate) fn report_prompt(
    filename: &str,
    clauses: &[Clause],
    overall_risk: RiskLevel,
    critical_issues: &[String],
    recommendations: &[String],
    key_terms: &KeyTerms,
) -> String {
    let clause_summary = clauses
        .iter()
        .map(|clause| {
            format!(
                "{}: {} risk - {}",
                clause.kind, clause.risk_level, clause.analysis
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    let key_terms_json = serde_json::to_string_pretty(key_terms).unwrap_or_default();
    format!(
        "Generate a comprehensive contract analysis report for: {filename}\n\nKey Terms:\n{key_terms_json}\n\nExtracted Clauses:\n{clause_summary}\n\nRisk Assessment:\n- Overall Risk: {overall_risk}\n- Critical Issues: {}\n- Recommendations: {}",
        critical_issues.join(", "),
        recommendations.join(", "),
    )
}

fn or_not_specified(value: &str) -> &str {
    if value.is_empty() { NOT_SPECIFIED } else { value }
}

fn joined_or_none(values: &[String]) -> String {
    if values.is_empty() {
        "None identified".to_string()
    } else {
        values.join(", ")
    }
}
