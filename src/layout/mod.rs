pub mod label_placement;
mod scale;
mod slice;
mod types;
pub use scale::{
    CompressedGaps, CompressedScale, LinearScale, TimeScale, compress_gaps, upper_median,
};
pub use slice::*;
pub use types::*;

use crate::config::{Band, InvalidPeriodPolicy, LayoutConfig, SidePolicy};
use crate::date::range_of;
use crate::format::{detect_span, format_item_date};
use crate::ir::{Instant, ItemKind, TimelineItem};
use crate::text_metrics::label_half_width;
use std::collections::BTreeMap;

/// Lay out `items` on the full (possibly multi-slide) canvas.
///
/// Pure and deterministic: nothing is cached between calls and the result
/// only depends on the arguments. Boundary snapping runs whenever the
/// configuration asks for it; callers are expected to turn it off first
/// when [`has_temporal_overlap`] reports overlapping items.
pub fn compute_layout(items: &[TimelineItem], config: &LayoutConfig) -> TimelineLayout {
    let policy = config.invalid_period;
    let scale_factor = config.scale();
    let slices = config.slices();
    let slide_width = config.canvas_width.max(1.0);
    let width = config.total_width();
    let height = config.canvas_height.max(1.0);
    let range_start = width * config.range_start_ratio;
    let range_end = width * config.range_end_ratio;

    let domain = range_of(items, policy);
    let time_scale = if config.compress_gaps && items.len() >= 2 {
        TimeScale::compressed(&referenced_instants(items, policy), &domain, range_start, range_end)
    } else {
        TimeScale::linear(&domain, range_start, range_end)
    };
    let date_span = detect_span(items, config.compact_dates, policy);

    let order = chronological_order(items, policy);
    let sides = assign_sides(items, &order, config);

    let mut entries: Vec<LayoutEntry> = Vec::with_capacity(items.len());
    for (rank, &idx) in order.iter().enumerate() {
        let item = &items[idx];
        let side = sides[rank];
        let raw = match item {
            TimelineItem::Period { .. } => {
                let (start, end) = item.span(policy);
                RawPosition::Span {
                    x1: time_scale.map(start),
                    x2: time_scale.map(end),
                }
            }
            TimelineItem::Event { instant, .. } | TimelineItem::Note { instant, .. } => {
                RawPosition::Point {
                    x: time_scale.map(*instant),
                }
            }
        };
        let date_label = format_item_date(item, date_span.mode, policy);
        let half_width = item_half_width(item, &date_label, config);
        entries.push(LayoutEntry {
            id: item.id().clone(),
            kind: item.kind(),
            side,
            raw,
            label_center_x: raw.anchor_x(),
            vertical_offset: 0.0,
            half_width,
            band: band_for(item.kind(), side, config).scaled(scale_factor),
            date_label,
            marker_x: match raw {
                RawPosition::Point { x } => Some(x),
                RawPosition::Span { .. } => None,
            },
            slide: 0,
            chronological_index: rank,
        });
    }

    label_placement::pack_sides(&mut entries, config.collision_gap * scale_factor);
    if config.is_carousel() {
        if config.avoid_split_across_slides {
            label_placement::snap_to_slide_boundaries(
                &mut entries,
                slide_width,
                slices,
                config.effective_boundary_clearance(),
            );
        }
    } else {
        label_placement::avoid_period_bars(&mut entries, config.bar_clearance * scale_factor);
    }
    label_placement::rebind_markers(&mut entries, slide_width, slices);

    log::debug!(
        "laid out {} items over {} slide(s), {} gap break(s), date mode {:?}",
        entries.len(),
        slices,
        time_scale.breaks().len(),
        date_span.mode
    );

    let entries: BTreeMap<_, _> = entries
        .into_iter()
        .map(|entry| (entry.id.clone(), entry))
        .collect();

    TimelineLayout {
        entries,
        breaks: time_scale.breaks().to_vec(),
        date_span,
        domain,
        width,
        height,
        slide_width,
        total_slices: slices,
        axis_y: height / 2.0,
        range_start,
        range_end,
    }
}

/// Item indices sorted by time; ties keep input order.
fn chronological_order(items: &[TimelineItem], policy: InvalidPeriodPolicy) -> Vec<usize> {
    let mut order: Vec<usize> = (0..items.len()).collect();
    order.sort_by_key(|&idx| (items[idx].sort_instant(policy), idx));
    order
}

fn referenced_instants(items: &[TimelineItem], policy: InvalidPeriodPolicy) -> Vec<Instant> {
    let mut instants = Vec::with_capacity(items.len() * 2);
    for item in items {
        let (start, end) = item.span(policy);
        instants.push(start);
        if end != start {
            instants.push(end);
        }
    }
    instants
}

fn assign_sides(items: &[TimelineItem], order: &[usize], config: &LayoutConfig) -> Vec<Side> {
    let mut sides = Vec::with_capacity(order.len());
    let mut top_height = 0.0f32;
    let mut bottom_height = 0.0f32;
    for (rank, &idx) in order.iter().enumerate() {
        let kind = items[idx].kind();
        let side = if kind == ItemKind::Period {
            Side::Top
        } else {
            match config.side_policy {
                SidePolicy::Alternate => {
                    if rank % 2 == 0 {
                        Side::Top
                    } else {
                        Side::Bottom
                    }
                }
                SidePolicy::Balanced => {
                    if top_height <= bottom_height {
                        Side::Top
                    } else {
                        Side::Bottom
                    }
                }
            }
        };
        let band = band_for(kind, side, config);
        match side {
            Side::Top => top_height += band.height,
            Side::Bottom => bottom_height += band.height,
        }
        sides.push(side);
    }
    sides
}

fn band_for(kind: ItemKind, side: Side, config: &LayoutConfig) -> Band {
    match (kind, side) {
        (ItemKind::Event, _) => config.bands.event,
        (ItemKind::Period, _) => config.bands.period,
        (ItemKind::Note, Side::Top) => config.bands.note_top,
        (ItemKind::Note, Side::Bottom) => config.bands.note_bottom,
    }
}

fn item_half_width(item: &TimelineItem, date_label: &str, config: &LayoutConfig) -> f32 {
    let metrics = &config.labels;
    let scale = config.scale();
    let (font_size, bold) = match item.kind() {
        ItemKind::Event => (metrics.event_font_size, true),
        ItemKind::Period => (metrics.period_font_size, true),
        ItemKind::Note => (metrics.note_font_size, false),
    };
    label_half_width(
        item.label(),
        font_size * scale,
        bold,
        date_label,
        metrics.date_font_size * scale,
        metrics.padding * scale,
        metrics,
    )
}

/// Whether any two periods overlap in time or any event or note falls
/// inside a period. Boundary snapping cannot settle such timelines and
/// should be disabled for them.
pub fn has_temporal_overlap(items: &[TimelineItem], policy: InvalidPeriodPolicy) -> bool {
    let periods: Vec<(Instant, Instant)> = items
        .iter()
        .filter(|item| item.kind() == ItemKind::Period)
        .map(|item| item.span(policy))
        .collect();

    for (i, a) in periods.iter().enumerate() {
        for b in &periods[i + 1..] {
            if a.0 < b.1 && b.0 < a.1 {
                return true;
            }
        }
    }

    items.iter().any(|item| match item {
        TimelineItem::Event { instant, .. } | TimelineItem::Note { instant, .. } => periods
            .iter()
            .any(|(start, end)| start <= instant && instant <= end),
        TimelineItem::Period { .. } => false,
    })
}
