use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::config::ContentConfig;
use crate::dialogue::DialogueScript;
use crate::error::{Result, TaidanError};
use super::RepoContent;

/// Converts repository content into podcast-style dialogue by driving an
/// LLM CLI in non-interactive mode.
pub struct DialogueConverter {
    config: ContentConfig,
}

impl DialogueConverter {
    pub fn new(config: ContentConfig) -> Self {
        Self { config }
    }

    /// Check if the converter CLI is available
    pub async fn check_availability(&self) -> Result<()> {
        let output = Command::new(&self.config.converter_binary)
            .arg("--version")
            .output()
            .await
            .map_err(|e| TaidanError::Content(format!("Converter CLI not found: {}", e)))?;

        if output.status.success() {
            info!(
                "Converter CLI available: {}",
                String::from_utf8_lossy(&output.stdout).trim()
            );
            Ok(())
        } else {
            Err(TaidanError::Content("Converter CLI version check failed".to_string()))
        }
    }

    /// Convert repository content to a dialogue script.
    pub async fn convert(&self, content: &RepoContent) -> Result<DialogueScript> {
        info!(
            "Converting repository content to dialogue (style: {}, length: {})",
            self.config.style, self.config.length
        );

        let prompt = self.build_prompt(content);

        let run = Command::new(&self.config.converter_binary)
            .arg("--print")
            .arg(&prompt)
            .stdin(Stdio::null())
            .output();

        let output = tokio::time::timeout(
            Duration::from_secs(self.config.converter_timeout_secs),
            run,
        )
        .await
        .map_err(|_| TaidanError::Content("Converter CLI timed out".to_string()))?
        .map_err(|e| TaidanError::Content(format!("Failed to execute converter CLI: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TaidanError::Content(format!("Converter CLI failed: {}", stderr)));
        }

        let response = String::from_utf8_lossy(&output.stdout);
        let mut script = DialogueScript::parse(&response);
        script.truncate(self.config.max_segments);
        script.validate().map_err(|e| {
            TaidanError::Content(format!("Converter produced unusable dialogue: {}", e))
        })?;

        info!("Converted content to {} dialogue segments", script.segments.len());
        Ok(script)
    }

    /// Static dialogue used when conversion fails, so the pipeline can
    /// still be exercised end to end.
    pub fn fallback_dialogue(&self, content: &RepoContent) -> DialogueScript {
        warn!("Using fallback dialogue due to conversion failure");

        let name = if content.name.is_empty() { "this repository" } else { &content.name };
        let description = if content.description.is_empty() {
            "a software project"
        } else {
            &content.description
        };
        let language = if content.language.is_empty() { "code" } else { &content.language };

        let lines = [
            format!("[S1]Today I want to talk about an interesting open source project called {}.", name),
            "[S2]Sounds good! What does it do?".to_string(),
            format!("[S1]It is a {} project. In short: {}.", language, description),
            "[S2]Is there anything special about it?".to_string(),
            "[S1]It is popular on GitHub, with solid code quality and documentation.".to_string(),
            "[S2]How would a developer get started with it?".to_string(),
            "[S1]Clone it from GitHub and follow the README for installation and setup.".to_string(),
            "[S2]Great, sounds like a project worth trying!".to_string(),
        ];

        DialogueScript::parse(&lines.join("\n"))
    }

    fn build_prompt(&self, content: &RepoContent) -> String {
        let length_instruction = match self.config.length.as_str() {
            "short" => "Generate 3-4 dialogue exchanges (6-8 total segments)",
            "long" => "Generate 8-12 dialogue exchanges (16-24 total segments)",
            _ => "Generate 5-7 dialogue exchanges (10-14 total segments)",
        };

        let style_instruction = match self.config.style.as_str() {
            "casual" => "Use conversational tone, personal opinions, and casual language",
            "technical" => "Include technical details, implementation specifics, and developer insights",
            "marketing" => "Emphasize benefits, use cases, and why people should use this project",
            _ => "Focus on explaining concepts, features, and benefits in an informative way",
        };

        let summary = content.summary(self.config.max_readme_length);
        debug!("Converter prompt summary length: {} chars", summary.len());

        format!(
            "Convert this GitHub repository information into a natural podcast-style \
             conversation between two speakers S1 and S2.\n\n\
             {summary}\n\n\
             Instructions:\n\
             - {length_instruction}\n\
             - Style: {style} - {style_instruction}\n\
             - Format each speaker line as: [S1]Text here or [S2]Text here\n\
             - Make it sound like a natural conversation where S1 introduces and explains \
             and S2 asks questions and responds\n\
             - Keep each individual segment under 200 characters for good speech synthesis\n\
             - Focus on the most interesting and important aspects of the repository\n\
             - Include specific details from the README when relevant\n\n\
             Output only the dialogue lines in the specified format, one per line. \
             Do not include any other text or explanations.",
            summary = summary,
            length_instruction = length_instruction,
            style = self.config.style,
            style_instruction = style_instruction,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> ContentConfig {
        ContentConfig {
            api_base: "https://api.github.com".to_string(),
            github_token: None,
            cache_hours: 1,
            max_readme_length: 5000,
            converter_binary: "claude".to_string(),
            converter_timeout_secs: 120,
            style: "educational".to_string(),
            length: "medium".to_string(),
            max_segments: 24,
        }
    }

    fn test_content() -> RepoContent {
        RepoContent {
            name: "demo".to_string(),
            description: "a demo tool".to_string(),
            stars: 10,
            language: "Rust".to_string(),
            topics: vec![],
            readme: "Demo README".to_string(),
            url: "https://github.com/x/demo".to_string(),
            owner: "x".to_string(),
            repo: "demo".to_string(),
        }
    }

    #[test]
    fn test_build_prompt_includes_summary_and_format() {
        let converter = DialogueConverter::new(test_config());
        let prompt = converter.build_prompt(&test_content());

        assert!(prompt.contains("Repository: demo"));
        assert!(prompt.contains("[S1]Text here or [S2]Text here"));
        assert!(prompt.contains("5-7 dialogue exchanges"));
        assert!(prompt.contains("educational"));
    }

    #[test]
    fn test_build_prompt_length_variants() {
        let mut config = test_config();
        config.length = "short".to_string();
        let prompt = DialogueConverter::new(config).build_prompt(&test_content());
        assert!(prompt.contains("3-4 dialogue exchanges"));
    }

    #[test]
    fn test_fallback_dialogue_is_valid() {
        let converter = DialogueConverter::new(test_config());
        let script = converter.fallback_dialogue(&test_content());

        assert!(script.validate().is_ok());
        assert!(script.segments[0].text.contains("demo"));
        assert_eq!(script.speakers(), vec!["S1".to_string(), "S2".to_string()]);
    }
}
