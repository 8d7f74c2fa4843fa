//! Presentation state for the panel shell.
//!
//! One explicit struct owned by the front end and passed to presentation
//! code, instead of scattered ambient toggles.

use serde::{Deserialize, Serialize};

/// Tab selection inside the analysis panel.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "lowercase")]
pub enum AnalysisTab {
    /// The canned thought-process sample.
    #[default]
    Thought,
    /// Placeholder supporting-content view.
    Content,
    /// Placeholder citation view.
    Citation,
}

/// Tunables surfaced in the settings panel.
///
/// Nothing in the echo pipeline reads these yet; they are carried so the
/// panel has real state to show and toggle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatSettings {
    pub prompt_template: String,
    pub temperature: f32,
    pub use_semantic_ranker: bool,
    pub use_semantic_captions: bool,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            prompt_template: String::new(),
            temperature: 0.3,
            use_semantic_ranker: true,
            use_semantic_captions: false,
        }
    }
}

/// Visibility and theme state for the shell around the transcript.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PanelShell {
    pub dark_mode: bool,
    pub settings_open: bool,
    pub analysis_open: bool,
    pub analysis_tab: AnalysisTab,
    pub settings: ChatSettings,
}

impl PanelShell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips dark mode and returns the new value.
    pub fn toggle_dark_mode(&mut self) -> bool {
        self.dark_mode = !self.dark_mode;
        self.dark_mode
    }

    /// Flips the settings panel and returns whether it is now open.
    pub fn toggle_settings(&mut self) -> bool {
        self.settings_open = !self.settings_open;
        self.settings_open
    }

    /// Flips the analysis panel and returns whether it is now open.
    pub fn toggle_analysis(&mut self) -> bool {
        self.analysis_open = !self.analysis_open;
        self.analysis_open
    }

    /// Selects a tab, opening the analysis panel if it was closed.
    pub fn select_analysis_tab(&mut self, tab: AnalysisTab) {
        self.analysis_open = true;
        self.analysis_tab = tab;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn toggles_flip_state() {
        let mut shell = PanelShell::new();
        assert!(shell.toggle_dark_mode());
        assert!(!shell.toggle_dark_mode());
        assert!(shell.toggle_settings());
        assert!(shell.toggle_analysis());
        assert!(!shell.toggle_analysis());
    }

    #[test]
    fn selecting_a_tab_opens_the_panel() {
        let mut shell = PanelShell::new();
        shell.select_analysis_tab(AnalysisTab::Citation);
        assert!(shell.analysis_open);
        assert_eq!(shell.analysis_tab, AnalysisTab::Citation);
    }

    #[test]
    fn tabs_parse_from_lowercase_names() {
        assert_eq!(AnalysisTab::from_str("thought").unwrap(), AnalysisTab::Thought);
        assert_eq!(AnalysisTab::from_str("citation").unwrap(), AnalysisTab::Citation);
        assert!(AnalysisTab::from_str("nope").is_err());
    }

    #[test]
    fn settings_default_matches_panel_defaults() {
        let settings = ChatSettings::default();
        assert_eq!(settings.temperature, 0.3);
        assert!(settings.use_semantic_ranker);
        assert!(!settings.use_semantic_captions);
        assert!(settings.prompt_template.is_empty());
    }
}
