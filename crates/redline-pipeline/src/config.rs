use redline_llm::CompletionRequest;

/// Runtime configuration for one analysis pipeline.
#[derive(Clone, Debug, PartialEq)]
pub struct PipelineConfig {
    pub model: String,
    /// Leading-character cap applied to whole-document capability prompts.
    /// Per-section prompts are never capped.
    pub full_text_char_budget: usize,
    pub max_completion_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            full_text_char_budget: 8_000,
            max_completion_tokens: None,
            temperature: None,
        }
    }
}

impl PipelineConfig {
    pub(crate) fn request(
        &self,
        system: impl Into<String>,
        prompt: impl Into<String>,
    ) -> CompletionRequest {
        CompletionRequest {
            model: self.model.clone(),
            system: system.into(),
            prompt: prompt.into(),
            max_tokens: self.max_completion_tokens,
            temperature: self.temperature,
        }
    }

    /// Leading slice of `text` within the configured budget.
    pub(crate) fn capped<'a>(&self, text: &'a str) -> &'a str {
        truncate_chars(text, self.full_text_char_budget)
    }
}

pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_match_baseline() {
        let config = PipelineConfig::default();
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.full_text_char_budget, 8_000);
        assert_eq!(config.max_completion_tokens, None);
        assert_eq!(config.temperature, None);
    }

    #[test]
    fn truncate_chars_counts_characters_not_bytes() {
        let text = "ééééé";
        assert_eq!(truncate_chars(text, 3), "ééé");
        assert_eq!(truncate_chars(text, 10), text);
        assert_eq!(truncate_chars(text, 0), "");
    }
}
