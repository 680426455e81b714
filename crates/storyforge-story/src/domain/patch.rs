//! Sparse story patches and their validation.
//!
//! A patch names only the fields it changes. Patches arriving from the agent
//! are untyped JSON; [`StoryPatch::from_json`] checks every field on its own
//! and drops the ones that do not fit the schema so the rest still apply.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::state::{
    Constraints, ElementKind, NarrativeSettings, StoryProgress, StoryState, StylePreset,
    UserProfile,
};

/// A sparse set of `StoryState` fields to overwrite.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoryPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub characters: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub world_notes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plot_beats: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style_preset: Option<StylePreset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tone_hints: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branches: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_plan: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub story_progress: Option<StoryProgress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plot_beats_resolved: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub turn_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_profile: Option<UserProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub narrative_settings: Option<NarrativeSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraints: Option<Constraints>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canon_facts: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub themes: Option<Vec<String>>,
}

/// A field dropped from an inbound patch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedField {
    /// The key as it appeared in the payload.
    pub field: String,
    /// Why it was dropped.
    pub reason: String,
}

/// Outcome of validating an inbound patch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidatedPatch {
    /// The fields that passed validation.
    pub patch: StoryPatch,
    /// The fields that were dropped.
    pub rejected: Vec<RejectedField>,
}

impl StoryPatch {
    /// Patch replacing one of the three primary lists.
    #[must_use]
    pub fn replacing(kind: ElementKind, items: Vec<String>) -> Self {
        let mut patch = Self::default();
        match kind {
            ElementKind::Characters => patch.characters = Some(items),
            ElementKind::WorldNotes => patch.world_notes = Some(items),
            ElementKind::PlotBeats => patch.plot_beats = Some(items),
        }
        patch
    }

    /// Patch that overwrites every field with the values of `state`.
    #[must_use]
    pub fn overwriting_all(state: &StoryState) -> Self {
        let state = state.clone();
        Self {
            characters: Some(state.characters),
            world_notes: Some(state.world_notes),
            plot_beats: Some(state.plot_beats),
            style_preset: Some(state.style_preset),
            tone_hints: Some(state.tone_hints),
            branches: Some(state.branches),
            last_plan: Some(state.last_plan),
            story_progress: Some(state.story_progress),
            plot_beats_resolved: Some(state.plot_beats_resolved),
            turn_count: Some(state.turn_count),
            user_profile: Some(state.user_profile),
            narrative_settings: Some(state.narrative_settings),
            constraints: Some(state.constraints),
            canon_facts: Some(state.canon_facts),
            themes: Some(state.themes),
        }
    }

    /// Returns `true` when the patch names no field.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.field_names().is_empty()
    }

    /// Wire names of the fields present in the patch.
    #[must_use]
    pub fn field_names(&self) -> Vec<&'static str> {
        let present = [
            self.characters.is_some(),
            self.world_notes.is_some(),
            self.plot_beats.is_some(),
            self.style_preset.is_some(),
            self.tone_hints.is_some(),
            self.branches.is_some(),
            self.last_plan.is_some(),
            self.story_progress.is_some(),
            self.plot_beats_resolved.is_some(),
            self.turn_count.is_some(),
            self.user_profile.is_some(),
            self.narrative_settings.is_some(),
            self.constraints.is_some(),
            self.canon_facts.is_some(),
            self.themes.is_some(),
        ];
        PATCH_FIELDS
            .into_iter()
            .zip(present)
            .filter_map(|(name, present)| present.then_some(name))
            .collect()
    }

    /// Validates an untyped inbound patch field by field.
    ///
    /// Unknown keys, `null` values and values of the wrong shape are dropped
    /// and reported; everything else is kept. A payload that is not a JSON
    /// object yields an empty patch.
    #[must_use]
    pub fn from_json(payload: &Value) -> ValidatedPatch {
        let Some(fields) = payload.as_object() else {
            return ValidatedPatch {
                patch: Self::default(),
                rejected: vec![RejectedField {
                    field: String::new(),
                    reason: "patch must be a JSON object".to_owned(),
                }],
            };
        };

        let mut validator = FieldValidator {
            fields,
            rejected: Vec::new(),
        };
        let patch = Self {
            characters: validator.take("characters"),
            world_notes: validator.take("worldNotes"),
            plot_beats: validator.take("plotBeats"),
            style_preset: validator.take("stylePreset"),
            tone_hints: validator.take("toneHints"),
            branches: validator.take("branches"),
            last_plan: validator.take("lastPlan"),
            story_progress: validator.take("storyProgress"),
            plot_beats_resolved: validator.take("plotBeatsResolved"),
            turn_count: validator.take("turnCount"),
            user_profile: validator.take("userProfile"),
            narrative_settings: validator.take("narrativeSettings"),
            constraints: validator.take("constraints"),
            canon_facts: validator.take("canonFacts"),
            themes: validator.take("themes"),
        };

        let mut rejected = validator.rejected;
        rejected.extend(
            fields
                .keys()
                .filter(|key| !PATCH_FIELDS.contains(&key.as_str()))
                .map(|key| RejectedField {
                    field: key.clone(),
                    reason: "unknown field".to_owned(),
                }),
        );

        ValidatedPatch { patch, rejected }
    }
}

/// Wire names of every patchable field, in declaration order.
pub const PATCH_FIELDS: [&str; 15] = [
    "characters",
    "worldNotes",
    "plotBeats",
    "stylePreset",
    "toneHints",
    "branches",
    "lastPlan",
    "storyProgress",
    "plotBeatsResolved",
    "turnCount",
    "userProfile",
    "narrativeSettings",
    "constraints",
    "canonFacts",
    "themes",
];

struct FieldValidator<'a> {
    fields: &'a Map<String, Value>,
    rejected: Vec<RejectedField>,
}

impl FieldValidator<'_> {
    fn take<T: DeserializeOwned>(&mut self, field: &str) -> Option<T> {
        let value = self.fields.get(field)?;
        if value.is_null() {
            self.reject(field, "null is not a valid value".to_owned());
            return None;
        }
        match serde_json::from_value(value.clone()) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                self.reject(field, e.to_string());
                None
            }
        }
    }

    fn reject(&mut self, field: &str, reason: String) {
        self.rejected.push(RejectedField {
            field: field.to_owned(),
            reason,
        });
    }
}
