//! Commands for the Story Session context.

use storyforge_core::command::Command;
use storyforge_story::domain::state::ElementKind;
use uuid::Uuid;

/// Command to open a new story session.
#[derive(Debug, Clone)]
pub struct StartStory {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Identifier of the session to create.
    pub session_id: Uuid,
}

impl Command for StartStory {
    fn command_type(&self) -> &'static str {
        "story.start_story"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to seed the story from a catalog template.
#[derive(Debug, Clone)]
pub struct SelectTemplate {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    pub session_id: Uuid,
    /// Wire id; ids outside the catalog are ignored.
    pub template_id: String,
}

impl Command for SelectTemplate {
    fn command_type(&self) -> &'static str {
        "story.select_template"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to return the session to its defaults.
#[derive(Debug, Clone)]
pub struct ResetStory {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    pub session_id: Uuid,
}

impl Command for ResetStory {
    fn command_type(&self) -> &'static str {
        "story.reset_story"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to pick how many entries a category needs.
#[derive(Debug, Clone)]
pub struct ChooseCount {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    pub session_id: Uuid,
    pub category: ElementKind,
    pub count: u32,
}

impl Command for ChooseCount {
    fn command_type(&self) -> &'static str {
        "story.choose_count"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to select or deselect a template option.
#[derive(Debug, Clone)]
pub struct ToggleOption {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    pub session_id: Uuid,
    pub category: ElementKind,
    pub option: String,
    /// Desired state: `true` selects, `false` deselects.
    pub selected: bool,
}

impl Command for ToggleOption {
    fn command_type(&self) -> &'static str {
        "story.toggle_option"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to add a free-text entry during selection.
#[derive(Debug, Clone)]
pub struct AddCustomEntry {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    pub session_id: Uuid,
    pub category: ElementKind,
    pub entry: String,
}

impl Command for AddCustomEntry {
    fn command_type(&self) -> &'static str {
        "story.add_custom_entry"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to leave a selection stage for its count stage.
#[derive(Debug, Clone)]
pub struct GoBack {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    pub session_id: Uuid,
    pub category: ElementKind,
}

impl Command for GoBack {
    fn command_type(&self) -> &'static str {
        "story.go_back"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to remove one entry from the story board.
#[derive(Debug, Clone)]
pub struct RemoveBoardItem {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    pub session_id: Uuid,
    pub category: ElementKind,
    /// Zero-based position in the category.
    pub index: usize,
}

impl Command for RemoveBoardItem {
    fn command_type(&self) -> &'static str {
        "story.remove_board_item"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command carrying a patch proposed by the storytelling agent.
#[derive(Debug, Clone)]
pub struct ApplyAgentPatch {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    pub session_id: Uuid,
    /// The patch as received; validated field by field.
    pub payload: serde_json::Value,
}

impl Command for ApplyAgentPatch {
    fn command_type(&self) -> &'static str {
        "story.apply_agent_patch"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
