use super::{LayoutEntry, TimelineLayout};
use serde::Serialize;

/// Horizontal window of one slide on the full canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SliceViewport {
    pub index: usize,
    pub x_start: f32,
    pub x_end: f32,
}

impl SliceViewport {
    pub fn width(&self) -> f32 {
        self.x_end - self.x_start
    }

    pub fn contains(&self, x: f32) -> bool {
        x >= self.x_start && x <= self.x_end
    }

    /// Whether `[left, right]` reaches into the window at all.
    pub fn intersects(&self, left: f32, right: f32) -> bool {
        left < self.x_end && right > self.x_start
    }
}

/// One slide's share of a layout, in slide-local coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SliceLayout {
    pub viewport: SliceViewport,
    pub entries: Vec<LayoutEntry>,
    pub breaks: Vec<f32>,
}

pub fn slice_viewport(layout: &TimelineLayout, index: usize) -> Option<SliceViewport> {
    if index >= layout.total_slices.max(1) {
        return None;
    }
    let x_start = index as f32 * layout.slide_width;
    Some(SliceViewport {
        index,
        x_start,
        x_end: x_start + layout.slide_width,
    })
}

/// Entries visible on slide `index`, translated so the slide starts at 0.
///
/// An entry is visible when its label, bar or marker reaches into the
/// window. Nothing is recomputed: positions are the full-canvas ones
/// shifted by the slide offset.
pub fn project_slice(layout: &TimelineLayout, index: usize) -> Option<SliceLayout> {
    let viewport = slice_viewport(layout, index)?;
    let dx = -viewport.x_start;

    let entries = layout
        .chronological()
        .into_iter()
        .filter(|entry| is_visible(entry, &viewport))
        .map(|entry| entry.translated(dx))
        .collect();

    let breaks = layout
        .breaks
        .iter()
        .filter(|x| viewport.contains(**x))
        .map(|x| x + dx)
        .collect();

    Some(SliceLayout {
        viewport,
        entries,
        breaks,
    })
}

fn is_visible(entry: &LayoutEntry, viewport: &SliceViewport) -> bool {
    viewport.intersects(entry.label_left(), entry.label_right())
        || viewport.intersects(entry.raw.start(), entry.raw.end())
        || entry.marker_x.is_some_and(|x| viewport.contains(x))
}
