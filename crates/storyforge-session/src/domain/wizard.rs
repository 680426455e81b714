//! The story setup wizard.
//!
//! After a template is chosen the wizard walks the three element categories
//! in order. For each one the reader first picks how many entries they want
//! (the count stage) and then picks or writes that many (the selection
//! stage). Reaching the target through a selection moves on to the next
//! category; after plot beats the wizard is complete and stays complete
//! until the session is reset or a template is chosen again.
//!
//! Everything here is pure: a transition inspects the current wizard and
//! story state and returns a [`WizardStep`] describing the story patch and
//! the stage change to record. Refused transitions leave everything as is.

use serde::{Deserialize, Serialize};
use storyforge_story::domain::patch::StoryPatch;
use storyforge_story::domain::state::{ElementKind, StoryState};
use thiserror::Error;

/// Position of the wizard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SetupStage {
    /// Waiting for a template.
    #[default]
    Intro,
    CharacterCount,
    CharacterSelection,
    WorldNoteCount,
    WorldNoteSelection,
    PlotBeatCount,
    PlotBeatSelection,
    Complete,
}

impl SetupStage {
    /// The stage asking how many `kind` entries are wanted.
    #[must_use]
    pub fn count_stage(kind: ElementKind) -> Self {
        match kind {
            ElementKind::Characters => Self::CharacterCount,
            ElementKind::WorldNotes => Self::WorldNoteCount,
            ElementKind::PlotBeats => Self::PlotBeatCount,
        }
    }

    /// The stage where `kind` entries are picked.
    #[must_use]
    pub fn selection_stage(kind: ElementKind) -> Self {
        match kind {
            ElementKind::Characters => Self::CharacterSelection,
            ElementKind::WorldNotes => Self::WorldNoteSelection,
            ElementKind::PlotBeats => Self::PlotBeatSelection,
        }
    }

    /// Where the wizard goes once `kind` is satisfied.
    #[must_use]
    pub fn after(kind: ElementKind) -> Self {
        match kind {
            ElementKind::Characters => Self::WorldNoteCount,
            ElementKind::WorldNotes => Self::PlotBeatCount,
            ElementKind::PlotBeats => Self::Complete,
        }
    }

    /// The category this stage works on, if any.
    #[must_use]
    pub fn category(self) -> Option<ElementKind> {
        match self {
            Self::CharacterCount | Self::CharacterSelection => Some(ElementKind::Characters),
            Self::WorldNoteCount | Self::WorldNoteSelection => Some(ElementKind::WorldNotes),
            Self::PlotBeatCount | Self::PlotBeatSelection => Some(ElementKind::PlotBeats),
            Self::Intro | Self::Complete => None,
        }
    }

    /// Whether this is one of the three count stages.
    #[must_use]
    pub fn is_count(self) -> bool {
        matches!(
            self,
            Self::CharacterCount | Self::WorldNoteCount | Self::PlotBeatCount
        )
    }

    /// Whether this is one of the three selection stages.
    #[must_use]
    pub fn is_selection(self) -> bool {
        matches!(
            self,
            Self::CharacterSelection | Self::WorldNoteSelection | Self::PlotBeatSelection
        )
    }
}

impl std::fmt::Display for SetupStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Intro => "intro",
            Self::CharacterCount => "character-count",
            Self::CharacterSelection => "character-selection",
            Self::WorldNoteCount => "world-note-count",
            Self::WorldNoteSelection => "world-note-selection",
            Self::PlotBeatCount => "plot-beat-count",
            Self::PlotBeatSelection => "plot-beat-selection",
            Self::Complete => "complete",
        };
        f.write_str(name)
    }
}

/// Largest count offered for `kind`.
#[must_use]
pub fn max_count(kind: ElementKind) -> u32 {
    match kind {
        ElementKind::Characters => 4,
        ElementKind::WorldNotes | ElementKind::PlotBeats => 2,
    }
}

/// Counts shown in the count menu for `kind`.
#[must_use]
pub fn count_menu(kind: ElementKind) -> Vec<u32> {
    (1..=max_count(kind)).collect()
}

/// Why a wizard action was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WizardError {
    /// The action belongs to a different stage.
    #[error("{action} is not available at stage {stage}")]
    WrongStage {
        action: &'static str,
        stage: SetupStage,
    },

    /// The count is larger than the menu offers.
    #[error("{kind:?} count {count} exceeds the maximum of {max}")]
    CountOutOfRange {
        kind: ElementKind,
        count: u32,
        max: u32,
    },

    /// The option is not offered by the selected template.
    #[error("{option:?} is not an option for {kind:?}")]
    UnknownOption { kind: ElementKind, option: String },

    /// The category already holds the requested number of entries.
    #[error("{kind:?} already has the {target} requested entries")]
    TargetReached { kind: ElementKind, target: u32 },

    /// Custom entries need some text.
    #[error("custom entry is empty")]
    EmptyEntry,
}

/// A stage transition, optionally recording a new category target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageChange {
    pub stage: SetupStage,
    /// Set when the transition comes from a count choice.
    pub target: Option<(ElementKind, u32)>,
}

/// Outcome of an accepted wizard action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WizardStep {
    /// Full-array replacement for the category, if it changed.
    pub patch: Option<StoryPatch>,
    pub stage_change: Option<StageChange>,
}

/// Wizard progress for one story session. Not writable by the agent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WizardSession {
    pub setup_stage: SetupStage,
    /// Zero until chosen.
    pub target_character_count: u32,
    pub target_world_note_count: u32,
    pub target_plot_beat_count: u32,
}

impl WizardSession {
    /// The wizard as it stands right after a template is chosen.
    #[must_use]
    pub fn started() -> Self {
        Self {
            setup_stage: SetupStage::CharacterCount,
            ..Self::default()
        }
    }

    /// Chosen target for `kind`.
    #[must_use]
    pub fn target(&self, kind: ElementKind) -> u32 {
        match kind {
            ElementKind::Characters => self.target_character_count,
            ElementKind::WorldNotes => self.target_world_note_count,
            ElementKind::PlotBeats => self.target_plot_beat_count,
        }
    }

    /// Records a stage change.
    pub fn apply(&mut self, change: StageChange) {
        self.setup_stage = change.stage;
        if let Some((kind, target)) = change.target {
            match kind {
                ElementKind::Characters => self.target_character_count = target,
                ElementKind::WorldNotes => self.target_world_note_count = target,
                ElementKind::PlotBeats => self.target_plot_beat_count = target,
            }
        }
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.setup_stage == SetupStage::Complete
    }

    /// Whether `kind` has room for another entry.
    #[must_use]
    pub fn has_room(&self, state: &StoryState, kind: ElementKind) -> bool {
        len_u32(state.elements(kind)) < self.target(kind)
    }

    /// Whether toggling `option` is currently possible. Selected options
    /// can always be deselected; unselected ones need room.
    #[must_use]
    pub fn option_enabled(&self, state: &StoryState, kind: ElementKind, option: &str) -> bool {
        self.setup_stage == SetupStage::selection_stage(kind)
            && (state.elements(kind).iter().any(|e| e == option) || self.has_room(state, kind))
    }

    /// Whether a custom entry can currently be added to `kind`.
    #[must_use]
    pub fn custom_entry_enabled(&self, state: &StoryState, kind: ElementKind) -> bool {
        self.setup_stage == SetupStage::selection_stage(kind) && self.has_room(state, kind)
    }

    /// Picks the target count for `kind`.
    ///
    /// If the category already holds `count` entries (always the case for
    /// zero) the selection stage is skipped.
    ///
    /// # Errors
    ///
    /// `WrongStage` outside the category's count stage, `CountOutOfRange`
    /// above the menu.
    pub fn choose_count(
        &self,
        state: &StoryState,
        kind: ElementKind,
        count: u32,
    ) -> Result<WizardStep, WizardError> {
        self.expect_stage("choose count", SetupStage::count_stage(kind))?;
        let max = max_count(kind);
        if count > max {
            return Err(WizardError::CountOutOfRange { kind, count, max });
        }

        let stage = if len_u32(state.elements(kind)) >= count {
            SetupStage::after(kind)
        } else {
            SetupStage::selection_stage(kind)
        };
        Ok(WizardStep {
            patch: None,
            stage_change: Some(StageChange {
                stage,
                target: Some((kind, count)),
            }),
        })
    }

    /// Selects (`select`) or deselects a template option.
    ///
    /// Both directions are idempotent: selecting an option already in the
    /// list, or deselecting one that is not, yields an empty step.
    /// Deselecting removes every copy of the option and never changes the
    /// stage. Selecting appends it and advances once the target is reached.
    ///
    /// # Errors
    ///
    /// `WrongStage` outside the selection stage, `UnknownOption` when
    /// `option` is not in `pool`, `TargetReached` when selecting into a full
    /// category.
    pub fn toggle_option(
        &self,
        state: &StoryState,
        kind: ElementKind,
        pool: &[String],
        option: &str,
        select: bool,
    ) -> Result<WizardStep, WizardError> {
        self.expect_stage("toggle option", SetupStage::selection_stage(kind))?;
        if !pool.iter().any(|candidate| candidate == option) {
            return Err(WizardError::UnknownOption {
                kind,
                option: option.to_owned(),
            });
        }

        let current = state.elements(kind);
        let is_selected = current.iter().any(|e| e == option);
        match (select, is_selected) {
            (true, true) | (false, false) => Ok(WizardStep::default()),
            (false, true) => {
                let remaining = current.iter().filter(|e| *e != option).cloned().collect();
                Ok(WizardStep {
                    patch: Some(StoryPatch::replacing(kind, remaining)),
                    stage_change: None,
                })
            }
            (true, false) => self.append(state, kind, option.to_owned()),
        }
    }

    /// Appends a free-text entry, trimmed.
    ///
    /// # Errors
    ///
    /// `WrongStage` outside the selection stage, `EmptyEntry` for blank
    /// text, `TargetReached` when the category is full.
    pub fn add_custom_entry(
        &self,
        state: &StoryState,
        kind: ElementKind,
        entry: &str,
    ) -> Result<WizardStep, WizardError> {
        self.expect_stage("add custom entry", SetupStage::selection_stage(kind))?;
        let entry = entry.trim();
        if entry.is_empty() {
            return Err(WizardError::EmptyEntry);
        }
        self.append(state, kind, entry.to_owned())
    }

    /// Leaves the selection stage for the category's count stage, clearing
    /// the category. The chosen target is kept until a new count is picked.
    ///
    /// # Errors
    ///
    /// `WrongStage` outside the category's selection stage.
    pub fn go_back(&self, kind: ElementKind) -> Result<WizardStep, WizardError> {
        self.expect_stage("go back", SetupStage::selection_stage(kind))?;
        Ok(WizardStep {
            patch: Some(StoryPatch::replacing(kind, Vec::new())),
            stage_change: Some(StageChange {
                stage: SetupStage::count_stage(kind),
                target: None,
            }),
        })
    }

    fn append(
        &self,
        state: &StoryState,
        kind: ElementKind,
        entry: String,
    ) -> Result<WizardStep, WizardError> {
        let target = self.target(kind);
        if !self.has_room(state, kind) {
            return Err(WizardError::TargetReached { kind, target });
        }

        let mut updated = state.elements(kind).to_vec();
        updated.push(entry);
        let stage_change = (len_u32(&updated) >= target).then(|| StageChange {
            stage: SetupStage::after(kind),
            target: None,
        });
        Ok(WizardStep {
            patch: Some(StoryPatch::replacing(kind, updated)),
            stage_change,
        })
    }

    fn expect_stage(&self, action: &'static str, expected: SetupStage) -> Result<(), WizardError> {
        if self.setup_stage == expected {
            Ok(())
        } else {
            Err(WizardError::WrongStage {
                action,
                stage: self.setup_stage,
            })
        }
    }
}

fn len_u32(entries: &[String]) -> u32 {
    u32::try_from(entries.len()).unwrap_or(u32::MAX)
}
