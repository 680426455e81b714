//! Suggested chat prompts.

use super::templates::Template;

const FALLBACK_PROMPTS: [&str; 3] = [
    "Continue the story",
    "Add a new character",
    "Develop the world",
];

/// Example chat prompts for a genre. Sessions without a template, or
/// templates that ship none, get a generic set.
#[must_use]
pub fn genre_prompts(template: Option<&Template>) -> Vec<String> {
    match template {
        Some(template) if !template.prompts.is_empty() => template.prompts.clone(),
        _ => FALLBACK_PROMPTS.iter().map(|p| (*p).to_owned()).collect(),
    }
}

/// Prompts offered once setup is complete.
#[must_use]
pub fn starter_prompts(template: &Template) -> Vec<String> {
    let genre = template.label.to_lowercase();
    vec![
        format!(
            "Start a complete {genre} story using my selected characters, world notes, and plot beats - give me the opening with next step options"
        ),
        "Generate the next chapter incorporating all my story elements with continuation choices"
            .to_owned(),
        format!("Continue my {genre} story weaving in these characters and plot beats"),
    ]
}

/// Further ideas listed under the starter prompts.
#[must_use]
pub fn follow_up_ideas(template: &Template) -> Vec<String> {
    let genre = template.label.to_lowercase();
    vec![
        "Add more characters fitting this genre".to_owned(),
        format!("Expand the world with {genre} elements"),
        "Continue the plot with genre-appropriate twists".to_owned(),
    ]
}
