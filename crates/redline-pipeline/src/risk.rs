use std::sync::Arc;

use serde::Deserialize;

use redline_llm::CompletionProvider;

use crate::config::PipelineConfig;
use crate::errors::{PipelineError, Stage};
use crate::events::EventEmitter;
use crate::parse;
use crate::prompts;
use crate::state::{Clause, KeyTerms, RiskAssessment, RiskLevel};

/// Stage three: aggregate clause-level risk, evaluate contract structure and
/// synthesize the overall verdict. Three capability calls, each independently
/// tolerant of malformed output.
pub struct RiskAnalyzer {
    provider: Arc<dyn CompletionProvider>,
    config: PipelineConfig,
    events: EventEmitter,
}

struct ClauseRiskSummary<'a> {
    high_risk: Vec<&'a Clause>,
    medium_risk: Vec<&'a Clause>,
    risk_factors: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StructuralRisks {
    #[serde(default)]
    missing_clauses: Vec<String>,
    #[serde(default)]
    imbalanced_terms: Vec<String>,
    #[serde(default)]
    structural_issues: Vec<String>,
}

impl RiskAnalyzer {
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        config: PipelineConfig,
        events: EventEmitter,
    ) -> Self {
        Self {
            provider,
            config,
            events,
        }
    }

    pub async fn analyze(
        &self,
        analysis_id: &str,
        clauses: &[Clause],
        key_terms: &KeyTerms,
    ) -> Result<RiskAssessment, PipelineError> {
        let clause_risks = self.analyze_clause_risks(analysis_id, clauses).await?;
        let structural_risks = self
            .analyze_structural_risks(analysis_id, clauses, key_terms)
            .await?;
        self.overall_assessment(analysis_id, &clause_risks, &structural_risks)
            .await
    }

    async fn analyze_clause_risks<'a>(
        &self,
        analysis_id: &str,
        clauses: &'a [Clause],
    ) -> Result<ClauseRiskSummary<'a>, PipelineError> {
        let high_risk: Vec<&Clause> = clauses
            .iter()
            .filter(|clause| clause.risk_level == RiskLevel::High)
            .collect();
        let medium_risk: Vec<&Clause> = clauses
            .iter()
            .filter(|clause| clause.risk_level == RiskLevel::Medium)
            .collect();

        let request = self.config.request(
            prompts::RISK_FACTORS_SYSTEM,
            prompts::risk_factors_prompt(&high_risk, &medium_risk),
        );
        let completion = self
            .provider
            .complete(request)
            .await
            .map_err(|source| PipelineError::capability(Stage::RiskAnalyzer, source))?;

        let risk_factors = match parse::structured::<Vec<String>>(&completion.text) {
            Ok(factors) => factors,
            Err(error) => {
                self.events.fallback(
                    analysis_id,
                    Stage::RiskAnalyzer,
                    "risk_factors",
                    &error.reason,
                );
                Vec::new()
            }
        };

        Ok(ClauseRiskSummary {
            high_risk,
            medium_risk,
            risk_factors,
        })
    }

    async fn analyze_structural_risks(
        &self,
        analysis_id: &str,
        clauses: &[Clause],
        key_terms: &KeyTerms,
    ) -> Result<StructuralRisks, PipelineError> {
        let clause_kinds: Vec<String> = clauses.iter().map(|clause| clause.kind.clone()).collect();
        let request = self.config.request(
            prompts::STRUCTURAL_RISKS_SYSTEM,
            prompts::structural_risks_prompt(&clause_kinds, key_terms),
        );
        let completion = self
            .provider
            .complete(request)
            .await
            .map_err(|source| PipelineError::capability(Stage::RiskAnalyzer, source))?;

        match parse::structured::<StructuralRisks>(&completion.text) {
            Ok(risks) => Ok(risks),
            Err(error) => {
                self.events.fallback(
                    analysis_id,
                    Stage::RiskAnalyzer,
                    "structural_risks",
                    &error.reason,
                );
                Ok(StructuralRisks::default())
            }
        }
    }

    async fn overall_assessment(
        &self,
        analysis_id: &str,
        clause_risks: &ClauseRiskSummary<'_>,
        structural_risks: &StructuralRisks,
    ) -> Result<RiskAssessment, PipelineError> {
        let request = self.config.request(
            prompts::OVERALL_ASSESSMENT_SYSTEM,
            prompts::overall_assessment_prompt(
                clause_risks.high_risk.len(),
                clause_risks.medium_risk.len(),
                &clause_risks.risk_factors,
                &structural_risks.missing_clauses,
                &structural_risks.imbalanced_terms,
                &structural_risks.structural_issues,
            ),
        );
        let completion = self
            .provider
            .complete(request)
            .await
            .map_err(|source| PipelineError::capability(Stage::RiskAnalyzer, source))?;

        match parse::structured::<RiskAssessment>(&completion.text) {
            Ok(assessment) => Ok(assessment),
            Err(error) => {
                self.events.fallback(
                    analysis_id,
                    Stage::RiskAnalyzer,
                    "overall_assessment",
                    &error.reason,
                );
                Ok(RiskAssessment::incomplete())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedProvider;
    use redline_llm::CapabilityError;

    fn analyzer(provider: &Arc<ScriptedProvider>) -> RiskAnalyzer {
        RiskAnalyzer::new(
            Arc::clone(provider) as Arc<dyn CompletionProvider>,
            PipelineConfig::default(),
            EventEmitter::default(),
        )
    }

    fn clause(kind: &str, risk_level: RiskLevel, analysis: &str) -> Clause {
        Clause {
            kind: kind.to_string(),
            content: format!("{kind} clause text"),
            risk_level,
            analysis: analysis.to_string(),
        }
    }

    #[tokio::test(flavor = "current_thread")]
    async fn analyze_threads_partitioned_clauses_through_the_prompts() {
        let provider = Arc::new(ScriptedProvider::new());
        provider.push_text(r#"["uncapped indemnity exposure"]"#);
        provider.push_text(
            r#"{"missingClauses":["payment_terms"],"imbalancedTerms":[],"structuralIssues":[]}"#,
        );
        provider.push_text(
            r#"{"overallRisk":"high","criticalIssues":["Indemnity is uncapped"],"recommendations":["Cap the indemnity"]}"#,
        );

        let clauses = vec![
            clause("indemnity", RiskLevel::High, "one-sided indemnity"),
            clause("warranties", RiskLevel::Medium, "broad warranty"),
            clause("governing_law", RiskLevel::Low, "standard"),
        ];
        let assessment = analyzer(&provider)
            .analyze("a-1", &clauses, &KeyTerms::default())
            .await
            .expect("analysis should succeed");

        assert_eq!(assessment.overall_risk, RiskLevel::High);
        assert_eq!(assessment.critical_issues, vec!["Indemnity is uncapped"]);

        let requests = provider.recorded_requests();
        assert_eq!(requests.len(), 3);
        assert!(requests[0].prompt.contains("- indemnity: one-sided indemnity"));
        assert!(requests[0].prompt.contains("- warranties: broad warranty"));
        assert!(!requests[0].prompt.contains("governing_law"));
        assert!(
            requests[1]
                .prompt
                .contains("indemnity, warranties, governing_law")
        );
        assert!(requests[2].prompt.contains("High Risk Clauses: 1"));
        assert!(requests[2].prompt.contains("Medium Risk Clauses: 1"));
        assert!(requests[2].prompt.contains("uncapped indemnity exposure"));
        assert!(requests[2].prompt.contains("payment_terms"));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn malformed_synthesis_expected_incomplete_verdict_exactly() {
        let provider = Arc::new(ScriptedProvider::new());
        provider.push_text("not a list");
        provider.push_text("not an object");
        provider.push_text("not an assessment");

        let assessment = analyzer(&provider)
            .analyze("a-1", &[], &KeyTerms::default())
            .await
            .expect("fallbacks should absorb parse misses");

        assert_eq!(assessment, RiskAssessment::incomplete());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn earlier_fallbacks_still_reach_synthesis() {
        let provider = Arc::new(ScriptedProvider::new());
        provider.push_text("garbled");
        provider.push_text("garbled");
        provider.push_text(
            r#"{"overallRisk":"low","criticalIssues":[],"recommendations":["No action needed"]}"#,
        );

        let assessment = analyzer(&provider)
            .analyze("a-1", &[], &KeyTerms::default())
            .await
            .expect("analysis should succeed");

        assert_eq!(assessment.overall_risk, RiskLevel::Low);
        let requests = provider.recorded_requests();
        assert!(requests[2].prompt.contains("Risk Factors: None identified"));
        assert!(requests[2].prompt.contains("Missing Clauses: None identified"));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn capability_call_failure_is_fatal() {
        let provider = Arc::new(ScriptedProvider::new());
        provider.push_error(CapabilityError::Api {
            status: 500,
            message: "upstream error".to_string(),
        });

        let error = analyzer(&provider)
            .analyze("a-1", &[], &KeyTerms::default())
            .await
            .expect_err("call failure should propagate");

        assert!(matches!(
            error,
            PipelineError::Capability {
                stage: Stage::RiskAnalyzer,
                ..
            }
        ));
        assert_eq!(provider.recorded_requests().len(), 1);
    }
}
