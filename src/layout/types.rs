use serde::Serialize;
use std::collections::BTreeMap;

use crate::config::Band;
use crate::date::DateRange;
use crate::format::DateSpan;
use crate::ir::{ItemId, ItemKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Top,
    Bottom,
}

/// True position of an item on the axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RawPosition {
    Point { x: f32 },
    Span { x1: f32, x2: f32 },
}

impl RawPosition {
    /// Where the label is centered before any collision handling.
    pub fn anchor_x(&self) -> f32 {
        match *self {
            Self::Point { x } => x,
            Self::Span { x1, x2 } => (x1 + x2) / 2.0,
        }
    }

    pub fn start(&self) -> f32 {
        match *self {
            Self::Point { x } => x,
            Self::Span { x1, .. } => x1,
        }
    }

    pub fn end(&self) -> f32 {
        match *self {
            Self::Point { x } => x,
            Self::Span { x2, .. } => x2,
        }
    }

    pub fn translated(&self, dx: f32) -> Self {
        match *self {
            Self::Point { x } => Self::Point { x: x + dx },
            Self::Span { x1, x2 } => Self::Span {
                x1: x1 + dx,
                x2: x2 + dx,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutEntry {
    pub id: ItemId,
    pub kind: ItemKind,
    pub side: Side,
    pub raw: RawPosition,
    pub label_center_x: f32,
    pub vertical_offset: f32,
    pub half_width: f32,
    /// Unshifted band of the item's kind on its side.
    pub band: Band,
    pub date_label: String,
    /// Marker position for events and notes; periods draw their bar instead.
    pub marker_x: Option<f32>,
    /// Slide holding the label center.
    pub slide: usize,
    pub chronological_index: usize,
}

impl LayoutEntry {
    pub fn label_left(&self) -> f32 {
        self.label_center_x - self.half_width
    }

    pub fn label_right(&self) -> f32 {
        self.label_center_x + self.half_width
    }

    pub fn raw_x(&self) -> f32 {
        self.raw.anchor_x()
    }

    /// Distance from the axis to the near edge of the label, offset included.
    pub fn band_start(&self) -> f32 {
        self.band.start + self.vertical_offset
    }

    pub fn band_end(&self) -> f32 {
        self.band.end() + self.vertical_offset
    }

    pub fn overlaps_horizontally(&self, other: &LayoutEntry) -> bool {
        self.label_left() < other.label_right() && other.label_left() < self.label_right()
    }

    /// Label box top and bottom in canvas coordinates for an axis at `axis_y`.
    pub fn label_y_extent(&self, axis_y: f32) -> (f32, f32) {
        match self.side {
            Side::Top => (axis_y - self.band_end(), axis_y - self.band_start()),
            Side::Bottom => (axis_y + self.band_start(), axis_y + self.band_end()),
        }
    }

    pub fn translated(&self, dx: f32) -> Self {
        Self {
            raw: self.raw.translated(dx),
            label_center_x: self.label_center_x + dx,
            marker_x: self.marker_x.map(|x| x + dx),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineLayout {
    pub entries: BTreeMap<ItemId, LayoutEntry>,
    /// Pixel positions of compressed gaps, drawn as axis interruptions.
    pub breaks: Vec<f32>,
    pub date_span: DateSpan,
    pub domain: DateRange,
    pub width: f32,
    pub height: f32,
    pub slide_width: f32,
    pub total_slices: usize,
    pub axis_y: f32,
    pub range_start: f32,
    pub range_end: f32,
}

impl TimelineLayout {
    pub fn entry(&self, id: &ItemId) -> Option<&LayoutEntry> {
        self.entries.get(id)
    }

    /// Entries sorted by time.
    pub fn chronological(&self) -> Vec<&LayoutEntry> {
        let mut entries: Vec<&LayoutEntry> = self.entries.values().collect();
        entries.sort_by_key(|entry| entry.chronological_index);
        entries
    }

    pub fn side_entries(&self, side: Side) -> Vec<&LayoutEntry> {
        self.chronological()
            .into_iter()
            .filter(|entry| entry.side == side)
            .collect()
    }
}
