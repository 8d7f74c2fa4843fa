//! The canned "thought process" shown next to the transcript.
//!
//! This is a fixed explanation sequence, not a real reasoning trace: step one
//! interpolates the raw input, the rest is constant text.

use serde::{Deserialize, Serialize};

/// A single explanatory line in the thought-process panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThoughtStep {
    /// Short step label, e.g. "Analyze Input".
    pub step: String,
    /// The explanatory text for the step.
    pub thought: String,
    /// Optional action annotation rendered below the thought.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

impl ThoughtStep {
    fn new(step: &str, thought: impl Into<String>, action: Option<&str>) -> Self {
        Self {
            step: step.to_string(),
            thought: thought.into(),
            action: action.map(str::to_string),
        }
    }
}

/// Produces the fixed three-step explanation for a submission.
///
/// Always returns exactly three steps. Step one's thought contains the raw
/// input verbatim; steps two and three do not depend on the input at all.
pub fn produce_steps(input: &str) -> Vec<ThoughtStep> {
    vec![
        ThoughtStep::new(
            "Analyze Input",
            format!("Received user input: \"{input}\""),
            Some("Parse and understand the user's request"),
        ),
        ThoughtStep::new(
            "Generate Response",
            "Formulating an appropriate response based on the input",
            Some("Create a response echoing the user's input"),
        ),
        ThoughtStep::new(
            "Review and Refine",
            "Ensuring the response is clear and relevant",
            None,
        ),
    ]
}

/// The static sample sequence shown in the analysis panel.
///
/// Intentionally unrelated to the live thought-process snapshot; the analysis
/// panel has always displayed this canned example.
pub fn sample_steps() -> Vec<ThoughtStep> {
    vec![
        ThoughtStep::new(
            "Understand the query",
            "The user is asking about the capital of France.",
            Some("Retrieve information about France and its capital."),
        ),
        ThoughtStep::new(
            "Gather information",
            "Paris is the capital and most populous city of France.",
            Some("Confirm this information from multiple sources."),
        ),
        ThoughtStep::new(
            "Formulate response",
            "I should provide a clear and concise answer, mentioning Paris as the capital.",
            Some("Compose a response stating that Paris is the capital of France."),
        ),
    ]
}
