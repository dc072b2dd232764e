//! Stage configuration.

use serde::{Deserialize, Serialize};

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// Output ceiling for a single completion.
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 4096;

/// Credential value that forces the fallback generator.
pub const MOCK_CREDENTIAL: &str = "mock";

/// Default branch pull requests target.
pub const DEFAULT_BASE_BRANCH: &str = "main";

/// Prefix for branches created by the submission stage.
pub const DEFAULT_BRANCH_PREFIX: &str = "issueflow/issue-";

/// Generation stage configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Force the fallback generator regardless of credential.
    pub mock_mode: bool,
    /// Backend credential. `None`, `""` and `"mock"` all select the fallback.
    #[serde(skip_serializing)]
    pub credential: Option<String>,
    pub model: String,
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        GenerationConfig {
            mock_mode: false,
            credential: None,
            model: DEFAULT_MODEL.to_string(),
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
        }
    }
}

impl GenerationConfig {
    /// Config that always routes to the fallback generator.
    pub fn mock() -> Self {
        Self::default().with_mock_mode(true)
    }

    pub fn with_mock_mode(mut self, mock_mode: bool) -> Self {
        self.mock_mode = mock_mode;
        self
    }

    pub fn with_credential(mut self, credential: impl Into<String>) -> Self {
        self.credential = Some(credential.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = max_output_tokens;
        self
    }
}

/// Submission stage configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionConfig {
    pub base_branch: String,
    pub branch_prefix: String,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        SubmissionConfig {
            base_branch: DEFAULT_BASE_BRANCH.to_string(),
            branch_prefix: DEFAULT_BRANCH_PREFIX.to_string(),
        }
    }
}

impl SubmissionConfig {
    pub fn with_base_branch(mut self, base_branch: impl Into<String>) -> Self {
        self.base_branch = base_branch.into();
        self
    }

    pub fn with_branch_prefix(mut self, branch_prefix: impl Into<String>) -> Self {
        self.branch_prefix = branch_prefix.into();
        self
    }

    /// Branch name for a work item.
    pub fn branch_for(&self, identifier: u64) -> String {
        format!("{}{}", self.branch_prefix, identifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_defaults() {
        let config = GenerationConfig::default();
        assert!(!config.mock_mode);
        assert!(config.credential.is_none());
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.max_output_tokens, 4096);
    }

    #[test]
    fn test_generation_builder() {
        let config = GenerationConfig::default()
            .with_credential("sk-test")
            .with_model("claude-test")
            .with_max_output_tokens(128);
        assert_eq!(config.credential.as_deref(), Some("sk-test"));
        assert_eq!(config.model, "claude-test");
        assert_eq!(config.max_output_tokens, 128);
        assert!(GenerationConfig::mock().mock_mode);
    }

    #[test]
    fn test_credential_not_serialized() {
        let config = GenerationConfig::default().with_credential("sk-secret");
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("sk-secret"));
    }

    #[test]
    fn test_branch_for() {
        let config = SubmissionConfig::default();
        assert_eq!(config.branch_for(12), "issueflow/issue-12");
        assert_eq!(config.base_branch, "main");

        let config = SubmissionConfig::default()
            .with_branch_prefix("bot/")
            .with_base_branch("develop");
        assert_eq!(config.branch_for(3), "bot/3");
        assert_eq!(config.base_branch, "develop");
    }
}
