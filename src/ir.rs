use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::InvalidPeriodPolicy;

/// A wall-clock point in time. Timelines are timezone-free: a label reads the
/// same on every machine that renders it.
pub type Instant = NaiveDateTime;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Event,
    Period,
    Note,
}

impl ItemKind {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "event" | "milestone" => Some(Self::Event),
            "period" | "range" | "span" => Some(Self::Period),
            "note" => Some(Self::Note),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Event => "event",
            Self::Period => "period",
            Self::Note => "note",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TimelineItem {
    Event {
        id: ItemId,
        label: String,
        instant: Instant,
    },
    Period {
        id: ItemId,
        label: String,
        start: Instant,
        end: Instant,
    },
    Note {
        id: ItemId,
        label: String,
        instant: Instant,
    },
}

impl TimelineItem {
    pub fn event(id: impl Into<String>, label: impl Into<String>, instant: Instant) -> Self {
        Self::Event {
            id: ItemId::new(id),
            label: label.into(),
            instant,
        }
    }

    pub fn period(
        id: impl Into<String>,
        label: impl Into<String>,
        start: Instant,
        end: Instant,
    ) -> Self {
        Self::Period {
            id: ItemId::new(id),
            label: label.into(),
            start,
            end,
        }
    }

    pub fn note(id: impl Into<String>, label: impl Into<String>, instant: Instant) -> Self {
        Self::Note {
            id: ItemId::new(id),
            label: label.into(),
            instant,
        }
    }

    pub fn id(&self) -> &ItemId {
        match self {
            Self::Event { id, .. } | Self::Period { id, .. } | Self::Note { id, .. } => id,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Event { label, .. } | Self::Period { label, .. } | Self::Note { label, .. } => {
                label
            }
        }
    }

    pub fn kind(&self) -> ItemKind {
        match self {
            Self::Event { .. } => ItemKind::Event,
            Self::Period { .. } => ItemKind::Period,
            Self::Note { .. } => ItemKind::Note,
        }
    }

    /// Replaces the label. Identity and dates are untouched.
    pub fn rename(&mut self, new_label: impl Into<String>) {
        match self {
            Self::Event { label, .. } | Self::Period { label, .. } | Self::Note { label, .. } => {
                *label = new_label.into();
            }
        }
    }

    /// The instant the item is ordered by: its own instant, or a period's
    /// normalized start.
    pub fn sort_instant(&self, policy: InvalidPeriodPolicy) -> Instant {
        self.span(policy).0
    }

    /// Start and end of the item. Points return the same instant twice and
    /// periods are normalized so that `start <= end`.
    pub fn span(&self, policy: InvalidPeriodPolicy) -> (Instant, Instant) {
        match self {
            Self::Event { instant, .. } | Self::Note { instant, .. } => (*instant, *instant),
            Self::Period { start, end, .. } => {
                if start <= end {
                    (*start, *end)
                } else {
                    match policy {
                        InvalidPeriodPolicy::Clamp => (*start, *start),
                        InvalidPeriodPolicy::Swap => (*end, *start),
                    }
                }
            }
        }
    }

    /// Every instant the item occupies, with inverted periods resolved by
    /// `policy`.
    pub fn instants(&self, policy: InvalidPeriodPolicy) -> Vec<Instant> {
        match self {
            Self::Event { instant, .. } | Self::Note { instant, .. } => vec![*instant],
            Self::Period { .. } => {
                let (start, end) = self.span(policy);
                vec![start, end]
            }
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TimelineError {
    #[error("duplicate item id `{0}`")]
    DuplicateId(ItemId),
    #[error("unknown item id `{0}`")]
    UnknownId(ItemId),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeline {
    items: Vec<TimelineItem>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: Vec<TimelineItem>) -> Result<Self, TimelineError> {
        let mut timeline = Self::new();
        timeline.replace_all(items)?;
        Ok(timeline)
    }

    pub fn items(&self) -> &[TimelineItem] {
        &self.items
    }

    pub fn into_items(self) -> Vec<TimelineItem> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &ItemId) -> Option<&TimelineItem> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn push(&mut self, item: TimelineItem) -> Result<(), TimelineError> {
        if self.get(item.id()).is_some() {
            return Err(TimelineError::DuplicateId(item.id().clone()));
        }
        self.items.push(item);
        Ok(())
    }

    pub fn remove(&mut self, id: &ItemId) -> Option<TimelineItem> {
        let idx = self.items.iter().position(|item| item.id() == id)?;
        Some(self.items.remove(idx))
    }

    pub fn rename(&mut self, id: &ItemId, label: impl Into<String>) -> Result<(), TimelineError> {
        let item = self
            .items
            .iter_mut()
            .find(|item| item.id() == id)
            .ok_or_else(|| TimelineError::UnknownId(id.clone()))?;
        item.rename(label);
        Ok(())
    }

    /// Bulk replace. The previous items are kept if the new set has
    /// duplicate ids.
    pub fn replace_all(&mut self, items: Vec<TimelineItem>) -> Result<(), TimelineError> {
        let mut seen = std::collections::HashSet::new();
        for item in &items {
            if !seen.insert(item.id().clone()) {
                return Err(TimelineError::DuplicateId(item.id().clone()));
            }
        }
        self.items = items;
        Ok(())
    }
}
