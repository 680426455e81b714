//! Genre templates.

use serde::{Deserialize, Serialize};
use storyforge_story::domain::patch::StoryPatch;
use storyforge_story::domain::state::{ElementKind, StylePreset};

/// Identifier of a catalog template. The set is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TemplateId {
    Whimsical,
    Thriller,
    EpicLore,
    Romance,
    SciFi,
    Fantasy,
}

impl TemplateId {
    /// Every template id, in picker order.
    pub const ALL: [Self; 6] = [
        Self::Whimsical,
        Self::Thriller,
        Self::EpicLore,
        Self::Romance,
        Self::SciFi,
        Self::Fantasy,
    ];

    /// Wire form of the id.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Whimsical => "whimsical",
            Self::Thriller => "thriller",
            Self::EpicLore => "epic-lore",
            Self::Romance => "romance",
            Self::SciFi => "sci-fi",
            Self::Fantasy => "fantasy",
        }
    }

    /// Parses a wire id. Anything outside the catalog is `None`.
    #[must_use]
    pub fn parse(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|candidate| candidate.as_str() == id)
    }
}

impl std::fmt::Display for TemplateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Seed content of a template.
///
/// `characters`, `world_notes` and `plot_beats` are option pools for the
/// setup wizard, not initial story content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TemplatePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub characters: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub world_notes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plot_beats: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style_preset: Option<StylePreset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tone_hints: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub themes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canon_facts: Option<Vec<String>>,
}

/// Preview text shown on the template card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct TemplateExamples {
    pub characters: Vec<String>,
    pub world_notes: Vec<String>,
    pub plot_beats: Vec<String>,
}

/// An immutable catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Template {
    pub id: TemplateId,
    pub label: String,
    pub emoji: String,
    pub description: String,
    pub patch: TemplatePatch,
    #[serde(default)]
    pub examples: TemplateExamples,
    /// Suggested chat openers for the genre.
    #[serde(default)]
    pub prompts: Vec<String>,
}

impl Template {
    /// Option pool the setup wizard offers for `kind`. Empty when the
    /// template provides none.
    #[must_use]
    pub fn options(&self, kind: ElementKind) -> &[String] {
        let pool = match kind {
            ElementKind::Characters => &self.patch.characters,
            ElementKind::WorldNotes => &self.patch.world_notes,
            ElementKind::PlotBeats => &self.patch.plot_beats,
        };
        pool.as_deref().unwrap_or_default()
    }

    /// Patch applied when a story is seeded from this template.
    ///
    /// Style preset, tone hints, themes and canon facts are overwritten when
    /// the template provides them and left alone otherwise. The three
    /// primary lists are always cleared.
    #[must_use]
    pub fn seed_patch(&self) -> StoryPatch {
        StoryPatch {
            characters: Some(Vec::new()),
            world_notes: Some(Vec::new()),
            plot_beats: Some(Vec::new()),
            style_preset: self.patch.style_preset,
            tone_hints: self.patch.tone_hints.clone(),
            themes: self.patch.themes.clone(),
            canon_facts: self.patch.canon_facts.clone(),
            ..StoryPatch::default()
        }
    }
}
