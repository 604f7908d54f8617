//! Well-known OpenAI-compatible endpoints.

use serde::Serialize;

/// A named endpoint with suggested models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderPreset {
    /// Short lookup key, e.g. `ollama`.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Base URL without the `/chat/completions` suffix. Empty for custom.
    pub base_url: &'static str,
    /// Suggested model names, first is the usual pick.
    pub models: &'static [&'static str],
}

impl ProviderPreset {
    /// First suggested model, if any.
    #[must_use]
    pub fn default_model(&self) -> Option<&'static str> {
        self.models.first().copied()
    }

    /// Whether this preset leaves the endpoint to the user.
    #[must_use]
    pub fn is_custom(&self) -> bool {
        self.base_url.is_empty()
    }
}

/// All built-in presets, in display order.
pub const PROVIDER_PRESETS: &[ProviderPreset] = &[
    ProviderPreset {
        id: "openai",
        name: "OpenAI",
        base_url: "https://api.openai.com/v1",
        models: &["gpt-4o", "gpt-4o-mini", "gpt-4-turbo", "gpt-3.5-turbo"],
    },
    ProviderPreset {
        id: "azure",
        name: "Azure OpenAI",
        base_url: "https://your-resource.openai.azure.com/openai/deployments/your-deployment",
        models: &["gpt-4", "gpt-35-turbo"],
    },
    ProviderPreset {
        id: "anthropic",
        name: "Anthropic (compatible)",
        base_url: "https://api.anthropic.com/v1",
        models: &["claude-3-opus", "claude-3-sonnet", "claude-3-haiku"],
    },
    ProviderPreset {
        id: "ollama",
        name: "Local Ollama",
        base_url: "http://localhost:11434/v1",
        models: &["llama3", "mistral", "codellama"],
    },
    ProviderPreset {
        id: "deepseek",
        name: "DeepSeek",
        base_url: "https://api.deepseek.com/v1",
        models: &["deepseek-chat", "deepseek-coder"],
    },
    ProviderPreset {
        id: "moonshot",
        name: "Moonshot",
        base_url: "https://api.moonshot.cn/v1",
        models: &["moonshot-v1-8k", "moonshot-v1-32k", "moonshot-v1-128k"],
    },
    ProviderPreset {
        id: "zhipu",
        name: "Zhipu AI",
        base_url: "https://open.bigmodel.cn/api/paas/v4",
        models: &["glm-4", "glm-4-flash", "glm-3-turbo"],
    },
    ProviderPreset {
        id: "custom",
        name: "Custom",
        base_url: "",
        models: &[],
    },
];

/// Look up a preset by id or display name, ignoring case.
#[must_use]
pub fn find_preset(name: &str) -> Option<&'static ProviderPreset> {
    let name = name.trim();
    PROVIDER_PRESETS
        .iter()
        .find(|p| p.id.eq_ignore_ascii_case(name) || p.name.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("openai", "https://api.openai.com/v1")]
    #[case("OLLAMA", "http://localhost:11434/v1")]
    #[case("Zhipu AI", "https://open.bigmodel.cn/api/paas/v4")]
    #[case(" deepseek ", "https://api.deepseek.com/v1")]
    fn test_find_preset(#[case] name: &str, #[case] base_url: &str) {
        assert_eq!(find_preset(name).map(|p| p.base_url), Some(base_url));
    }

    #[test]
    fn test_unknown_preset() {
        assert!(find_preset("nope").is_none());
    }

    #[test]
    fn test_custom_preset() {
        let custom = find_preset("custom").unwrap();
        assert!(custom.is_custom());
        assert_eq!(custom.default_model(), None);
        assert_eq!(find_preset("moonshot").unwrap().default_model(), Some("moonshot-v1-8k"));
    }

    #[test]
    fn test_ids_unique() {
        let mut ids: Vec<_> = PROVIDER_PRESETS.iter().map(|p| p.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), PROVIDER_PRESETS.len());
    }
}
