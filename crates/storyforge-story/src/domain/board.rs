//! Story board projection.
//!
//! The board shows the three primary lists in stored order and lets the
//! reader remove individual entries. It holds no state of its own: removal
//! produces a patch that goes through the usual merge.

use serde::Serialize;

use super::patch::StoryPatch;
use super::state::{ElementKind, StoryState};

/// One rendered entry of a board section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardItem {
    /// Zero-based position, as passed back to [`removal_patch`].
    pub index: usize,
    /// One-based display number. Only plot beats are numbered.
    pub number: Option<usize>,
    pub text: String,
}

/// One of the three board columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardSection {
    pub kind: ElementKind,
    pub title: &'static str,
    pub items: Vec<BoardItem>,
    /// Shown instead of the items when the list is empty.
    pub placeholder: Option<&'static str>,
}

/// Entry counts, as shown in the footer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoryStats {
    pub characters: usize,
    pub world_notes: usize,
    pub plot_beats: usize,
}

/// The rendered board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoryBoard {
    pub sections: Vec<BoardSection>,
    pub stats: StoryStats,
}

fn title(kind: ElementKind) -> &'static str {
    match kind {
        ElementKind::Characters => "Characters",
        ElementKind::WorldNotes => "World Notes",
        ElementKind::PlotBeats => "Plot Beats",
    }
}

fn placeholder(kind: ElementKind) -> &'static str {
    match kind {
        ElementKind::Characters => "No characters yet. Select from the options in chat.",
        ElementKind::WorldNotes => "No world notes yet. Select from the options in chat.",
        ElementKind::PlotBeats => "No plot beats yet. Select from the options in chat.",
    }
}

impl StoryStats {
    /// Counts the primary lists of `state`.
    #[must_use]
    pub fn of(state: &StoryState) -> Self {
        Self {
            characters: state.characters.len(),
            world_notes: state.world_notes.len(),
            plot_beats: state.plot_beats.len(),
        }
    }
}

impl StoryBoard {
    /// Projects the board from the current story state.
    #[must_use]
    pub fn project(state: &StoryState) -> Self {
        let sections = ElementKind::ALL
            .into_iter()
            .map(|kind| {
                let entries = state.elements(kind);
                let items = entries
                    .iter()
                    .enumerate()
                    .map(|(index, text)| BoardItem {
                        index,
                        number: (kind == ElementKind::PlotBeats).then_some(index + 1),
                        text: text.clone(),
                    })
                    .collect();
                BoardSection {
                    kind,
                    title: title(kind),
                    items,
                    placeholder: entries.is_empty().then(|| placeholder(kind)),
                }
            })
            .collect();

        Self {
            sections,
            stats: StoryStats::of(state),
        }
    }
}

/// Builds the patch that removes entry `index` of the `kind` list.
///
/// Returns `None` when `index` is out of range. The remaining entries keep
/// their relative order.
#[must_use]
pub fn removal_patch(state: &StoryState, kind: ElementKind, index: usize) -> Option<StoryPatch> {
    let entries = state.elements(kind);
    if index >= entries.len() {
        return None;
    }
    let mut remaining = entries.to_vec();
    remaining.remove(index);
    Some(StoryPatch::replacing(kind, remaining))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with_entries() -> StoryState {
        StoryState {
            characters: vec![
                "Jade, an insomniac journalist".to_owned(),
                "The Caller, identity unknown".to_owned(),
                "Eleven, a girl with psychic powers".to_owned(),
            ],
            plot_beats: vec![
                "A distorted voicemail names Jade".to_owned(),
                "The scanner goes silent".to_owned(),
            ],
            ..StoryState::default()
        }
    }

    #[test]
    fn test_project_keeps_stored_order_and_numbers_plot_beats() {
        // Arrange
        let state = state_with_entries();

        // Act
        let board = StoryBoard::project(&state);

        // Assert
        assert_eq!(board.sections.len(), 3);

        let characters = &board.sections[0];
        assert_eq!(characters.kind, ElementKind::Characters);
        assert_eq!(characters.items[1].text, "The Caller, identity unknown");
        assert_eq!(characters.items[1].index, 1);
        assert_eq!(characters.items[1].number, None);
        assert_eq!(characters.placeholder, None);

        let beats = &board.sections[2];
        assert_eq!(beats.items[0].number, Some(1));
        assert_eq!(beats.items[1].number, Some(2));
    }

    #[test]
    fn test_project_shows_placeholder_for_empty_section() {
        let board = StoryBoard::project(&state_with_entries());

        let notes = &board.sections[1];
        assert!(notes.items.is_empty());
        assert_eq!(
            notes.placeholder,
            Some("No world notes yet. Select from the options in chat.")
        );
    }

    #[test]
    fn test_project_reports_stats() {
        let board = StoryBoard::project(&state_with_entries());

        assert_eq!(
            board.stats,
            StoryStats {
                characters: 3,
                world_notes: 0,
                plot_beats: 2,
            }
        );
    }

    #[test]
    fn test_removal_patch_drops_only_the_indexed_entry() {
        // Arrange
        let mut state = state_with_entries();

        // Act
        let patch = removal_patch(&state, ElementKind::Characters, 1).unwrap();
        state.merge(patch);

        // Assert
        assert_eq!(
            state.characters,
            vec![
                "Jade, an insomniac journalist".to_owned(),
                "Eleven, a girl with psychic powers".to_owned(),
            ]
        );
    }

    #[test]
    fn test_removal_patch_removes_one_of_duplicate_entries() {
        let state = StoryState {
            world_notes: vec!["Fog".to_owned(), "Fog".to_owned()],
            ..StoryState::default()
        };

        let patch = removal_patch(&state, ElementKind::WorldNotes, 0).unwrap();

        assert_eq!(patch.world_notes, Some(vec!["Fog".to_owned()]));
    }

    #[test]
    fn test_removal_patch_out_of_range_is_none() {
        let state = state_with_entries();

        assert!(removal_patch(&state, ElementKind::PlotBeats, 2).is_none());
        assert!(removal_patch(&state, ElementKind::WorldNotes, 0).is_none());
    }
}
