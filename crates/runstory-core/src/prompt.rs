//! The story prompt sent to the text generator.

const STORY_INSTRUCTIONS: &str = "Using the following Markdown data, create a lighthearted and fun short story (2-3 paragraphs) about the parkrun journey of the runner. The story should be in the third person, include a notable news event from the week of their first parkrun, highlight key stats (total runs, best time), and mention a few locations they have visited. Add some playful running-related puns but keep it engaging and concise.";

/// Build the generation prompt around the athlete's raw profile markdown.
pub fn story_prompt(raw_data: &str) -> String {
  format!("{STORY_INSTRUCTIONS}\n\n{raw_data}")
}
