//! The shared story state record and its enumerations.
//!
//! Every field carries a default, and deserialization fills in whatever is
//! missing, so a `StoryState` is never partially populated.

use serde::{Deserialize, Serialize};

use super::patch::StoryPatch;

/// Prose style; exactly one is active at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StylePreset {
    /// No particular stylistic bias.
    #[default]
    Neutral,
    /// Hard-boiled, shadowy.
    Noir,
    /// Playful and light.
    Whimsical,
    /// Technically grounded science fiction.
    HardSciFi,
    /// High fantasy.
    Fantasy,
}

/// Narrative point of view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pov {
    /// "I walked..."
    First,
    /// "You walk..."
    Second,
    /// "She walked..."
    #[default]
    Third,
}

/// Grammatical tense of the narration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tense {
    #[default]
    Past,
    Present,
    Future,
}

/// How quickly scenes move.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pacing {
    Slow,
    #[default]
    Balanced,
    Fast,
}

/// Target reading level of the prose.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadingLevel {
    Simple,
    #[default]
    Standard,
    Advanced,
}

/// Narrative settings. Missing keys take their defaults on deserialization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NarrativeSettings {
    pub pov: Pov,
    pub tense: Tense,
    pub pacing: Pacing,
    pub reading_level: ReadingLevel,
}

/// Content limits the agent must respect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Constraints {
    /// Topics the story must steer around.
    pub avoid_topics: Vec<String>,
    /// Warnings to surface before sensitive content.
    pub content_warnings: Vec<String>,
}

/// Who the story is being told for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    pub name: String,
    pub preferences: Vec<String>,
}

/// Narrative stage. Expected to move forward, but nothing enforces it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoryProgress {
    #[default]
    Beginning,
    Middle,
    Climax,
    Ending,
    Complete,
}

impl StoryProgress {
    /// Stage the storyteller should report after `resolved` plot beats.
    ///
    /// 0–2 beginning, 3–5 middle, 6–7 climax, 8 or more ending. `Complete` is
    /// only ever reached by an explicit conclusion.
    #[must_use]
    pub fn for_resolved_beats(resolved: u32) -> Self {
        match resolved {
            0..=2 => Self::Beginning,
            3..=5 => Self::Middle,
            6..=7 => Self::Climax,
            _ => Self::Ending,
        }
    }

    /// Whether "conclude the story" should be offered to the reader.
    #[must_use]
    pub fn offers_conclusion(self, resolved: u32) -> bool {
        match self {
            Self::Climax | Self::Ending => true,
            Self::Complete => false,
            Self::Beginning | Self::Middle => resolved >= 6,
        }
    }
}

/// The three ordered lists the setup wizard and story board operate on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ElementKind {
    Characters,
    WorldNotes,
    PlotBeats,
}

impl ElementKind {
    /// All kinds in wizard order.
    pub const ALL: [Self; 3] = [Self::Characters, Self::WorldNotes, Self::PlotBeats];

    /// Wire name of the corresponding `StoryState` field.
    #[must_use]
    pub fn field_name(self) -> &'static str {
        match self {
            Self::Characters => "characters",
            Self::WorldNotes => "worldNotes",
            Self::PlotBeats => "plotBeats",
        }
    }
}

/// The story state shared between the UI and the storytelling agent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoryState {
    pub characters: Vec<String>,
    pub world_notes: Vec<String>,
    /// Shown numbered from 1 in stored order.
    pub plot_beats: Vec<String>,
    pub style_preset: StylePreset,
    pub tone_hints: Vec<String>,
    /// Agent-authored next-beat suggestions.
    pub branches: Vec<String>,
    pub last_plan: String,
    pub story_progress: StoryProgress,
    pub plot_beats_resolved: u32,
    pub turn_count: u32,
    pub user_profile: UserProfile,
    pub narrative_settings: NarrativeSettings,
    pub constraints: Constraints,
    pub canon_facts: Vec<String>,
    pub themes: Vec<String>,
}

impl StoryState {
    /// Returns one of the three primary lists.
    #[must_use]
    pub fn elements(&self, kind: ElementKind) -> &[String] {
        match kind {
            ElementKind::Characters => &self.characters,
            ElementKind::WorldNotes => &self.world_notes,
            ElementKind::PlotBeats => &self.plot_beats,
        }
    }

    /// Applies a patch: every field present in the patch replaces the current
    /// value wholesale, absent fields are left alone.
    ///
    /// This is the only way story state changes. Lists are not appended to
    /// and nested records are not merged key by key; whoever applies last
    /// wins for the fields they send.
    pub fn merge(&mut self, patch: StoryPatch) {
        let StoryPatch {
            characters,
            world_notes,
            plot_beats,
            style_preset,
            tone_hints,
            branches,
            last_plan,
            story_progress,
            plot_beats_resolved,
            turn_count,
            user_profile,
            narrative_settings,
            constraints,
            canon_facts,
            themes,
        } = patch;

        if let Some(value) = characters {
            self.characters = value;
        }
        if let Some(value) = world_notes {
            self.world_notes = value;
        }
        if let Some(value) = plot_beats {
            self.plot_beats = value;
        }
        if let Some(value) = style_preset {
            self.style_preset = value;
        }
        if let Some(value) = tone_hints {
            self.tone_hints = value;
        }
        if let Some(value) = branches {
            self.branches = value;
        }
        if let Some(value) = last_plan {
            self.last_plan = value;
        }
        if let Some(value) = story_progress {
            self.story_progress = value;
        }
        if let Some(value) = plot_beats_resolved {
            self.plot_beats_resolved = value;
        }
        if let Some(value) = turn_count {
            self.turn_count = value;
        }
        if let Some(value) = user_profile {
            self.user_profile = value;
        }
        if let Some(value) = narrative_settings {
            self.narrative_settings = value;
        }
        if let Some(value) = constraints {
            self.constraints = value;
        }
        if let Some(value) = canon_facts {
            self.canon_facts = value;
        }
        if let Some(value) = themes {
            self.themes = value;
        }
    }
}
