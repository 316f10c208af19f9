use serde::{Deserialize, Serialize};

/// Seconds the flow waits between messages and for a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timing {
    pub interval: u32,
    pub max_wait: u32,
}

impl Timing {
    pub const fn new(interval: u32, max_wait: u32) -> Self {
        Self { interval, max_wait }
    }
}

/// Canvas coordinates. Presentation only.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// The editable content of a message block.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
    pub title: String,
    pub message_purpose: String,
    pub examples: Vec<String>,
    /// Field names the block should elicit. Kept free of duplicates.
    pub data_collection: Vec<String>,
    pub has_condition: bool,
    pub condition_question: String,
    pub yes_destination: Option<String>,
    pub no_destination: Option<String>,
    pub timing: Timing,
    pub is_start_node: bool,
    pub manual_timing_edit: bool,
}

/// A single message block on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub position: Position,
    pub data: NodeData,
}

impl Node {
    pub fn new(id: impl Into<String>, data: NodeData) -> Self {
        Self {
            id: id.into(),
            position: Position::default(),
            data,
        }
    }

    /// A blank message block, as created by the "add block" action.
    pub fn blank(id: impl Into<String>, position: Position) -> Self {
        Self {
            id: id.into(),
            position,
            data: NodeData {
                title: "New message".to_string(),
                ..NodeData::default()
            },
        }
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }
}

/// A shallow update for [`NodeData`]. `None` leaves the field untouched.
///
/// Destination fields are `Option<Option<_>>`: `Some(None)` clears the branch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodePatch {
    pub title: Option<String>,
    pub message_purpose: Option<String>,
    pub examples: Option<Vec<String>>,
    pub data_collection: Option<Vec<String>>,
    pub has_condition: Option<bool>,
    pub condition_question: Option<String>,
    pub yes_destination: Option<Option<String>>,
    pub no_destination: Option<Option<String>>,
    pub timing: Option<Timing>,
    pub is_start_node: Option<bool>,
    pub manual_timing_edit: Option<bool>,
}

impl NodePatch {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn message_purpose(mut self, purpose: impl Into<String>) -> Self {
        self.message_purpose = Some(purpose.into());
        self
    }

    pub fn examples<I, S>(mut self, examples: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.examples = Some(examples.into_iter().map(Into::into).collect());
        self
    }

    pub fn data_collection<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.data_collection = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn has_condition(mut self, has_condition: bool) -> Self {
        self.has_condition = Some(has_condition);
        self
    }

    pub fn condition_question(mut self, question: impl Into<String>) -> Self {
        self.condition_question = Some(question.into());
        self
    }

    pub fn yes_destination(mut self, target: Option<String>) -> Self {
        self.yes_destination = Some(target);
        self
    }

    pub fn no_destination(mut self, target: Option<String>) -> Self {
        self.no_destination = Some(target);
        self
    }

    pub fn timing(mut self, timing: Timing) -> Self {
        self.timing = Some(timing);
        self
    }

    pub fn start_node(mut self, is_start_node: bool) -> Self {
        self.is_start_node = Some(is_start_node);
        self
    }

    /// Merges every field except the destinations, which must go through the edge
    /// operations of the store. Returns `true` if anything changed.
    pub(crate) fn merge_fields(&self, data: &mut NodeData) -> bool {
        let before = data.clone();
        if let Some(title) = &self.title {
            data.title = title.clone();
        }
        if let Some(purpose) = &self.message_purpose {
            data.message_purpose = purpose.clone();
        }
        if let Some(examples) = &self.examples {
            data.examples = examples.clone();
        }
        if let Some(fields) = &self.data_collection {
            data.data_collection = dedup_preserving_order(fields);
        }
        if let Some(has_condition) = self.has_condition {
            data.has_condition = has_condition;
        }
        if let Some(question) = &self.condition_question {
            data.condition_question = question.clone();
        }
        if let Some(timing) = self.timing {
            data.timing = timing;
            // A hand-edited timing sticks unless the caller says otherwise.
            data.manual_timing_edit = self.manual_timing_edit.unwrap_or(true);
        } else if let Some(manual) = self.manual_timing_edit {
            data.manual_timing_edit = manual;
        }
        if let Some(is_start) = self.is_start_node {
            data.is_start_node = is_start;
        }
        *data != before
    }
}

fn dedup_preserving_order(fields: &[String]) -> Vec<String> {
    let mut seen = ahash::AHashSet::new();
    fields
        .iter()
        .filter(|f| seen.insert(f.as_str()))
        .cloned()
        .collect()
}
