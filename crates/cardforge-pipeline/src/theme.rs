//! Set theme resolution
//!
//! The run either carries a complete theme override, used verbatim, or a
//! short theme prompt that the completion backend expands into the full
//! set theme used by card synthesis and art prompts.

use crate::backend::CompletionBackend;
use crate::config::{ForgeConfig, RunConfig};
use cardforge_core::Result;

/// Resolve the set theme for this run.
pub fn resolve_theme(
    completion: &dyn CompletionBackend,
    run: &RunConfig,
    forge: &ForgeConfig,
) -> Result<String> {
    if let Some(theme) = &run.complete_theme_override {
        if !theme.trim().is_empty() {
            println!("Using provided complete theme.");
            return Ok(theme.clone());
        }
    }

    let theme_prompt = run.theme_prompt.as_deref().ok_or_else(|| {
        cardforge_core::ForgeError::Config(
            "No theme prompt or complete theme provided".to_string(),
        )
    })?;

    println!("Generating set theme from prompt...");
    let request = build_theme_request(theme_prompt);
    let theme = completion.complete(&forge.generation.main_model, &request)?;
    Ok(theme.trim().to_string())
}

fn build_theme_request(theme_prompt: &str) -> String {
    format!(
        "Create a rich, detailed theme for a trading card set based on this idea:\n\n\
         {theme_prompt}\n\n\
         Describe the world, its factions and conflicts, the tone of the set, and \
         recurring visual motifs. Keep it to a few paragraphs. Return only the theme \
         description with no additional commentary.",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::mock::MockCompletion;

    #[test]
    fn test_override_used_verbatim() {
        let completion = MockCompletion::failing();
        let mut run = RunConfig::default();
        run.complete_theme_override = Some("A world of glass spires.".to_string());
        let forge = ForgeConfig::default();

        let theme = resolve_theme(&completion, &run, &forge).unwrap();
        assert_eq!(theme, "A world of glass spires.");
    }

    #[test]
    fn test_blank_override_falls_through_to_generation() {
        let completion = MockCompletion::with_replies(vec!["Generated theme.".to_string()]);
        let mut run = RunConfig::default();
        run.complete_theme_override = Some("   ".to_string());
        run.theme_prompt = Some("sunken cities".to_string());
        let forge = ForgeConfig::default();

        let theme = resolve_theme(&completion, &run, &forge).unwrap();
        assert_eq!(theme, "Generated theme.");
    }

    #[test]
    fn test_request_includes_theme_prompt() {
        let request = build_theme_request("sunken cities");
        assert!(request.contains("sunken cities"));
    }
}
