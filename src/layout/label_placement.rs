// Label placement and collision avoidance for timeline labels.
// Every pass works on plain 1D intervals and bands; nothing here knows about
// dates or text.

use super::{LayoutEntry, Side};
use crate::ir::ItemKind;
use std::cmp::Ordering;

/// Stack overlapping labels outward, independently on each side.
///
/// Labels are visited left to right. A label is pushed past every earlier
/// label it overlaps whose band reaches into its own; earlier labels never
/// move in response to later ones.
pub fn pack_sides(entries: &mut [LayoutEntry], gap: f32) {
    pack_side(entries, Side::Top, gap);
    pack_side(entries, Side::Bottom, gap);
}

fn pack_side(entries: &mut [LayoutEntry], side: Side, gap: f32) {
    let mut order: Vec<usize> = (0..entries.len())
        .filter(|&idx| entries[idx].side == side)
        .collect();
    order.sort_by(|&a, &b| {
        entries[a]
            .label_center_x
            .partial_cmp(&entries[b].label_center_x)
            .unwrap_or(Ordering::Equal)
            .then(entries[a].chronological_index.cmp(&entries[b].chronological_index))
    });

    // Pushes only ever raise a band, so a label that cleared an earlier
    // one stays clear of it and one sweep suffices.
    for (pos, &later) in order.iter().enumerate() {
        for &earlier in &order[..pos] {
            if !entries[earlier].overlaps_horizontally(&entries[later]) {
                continue;
            }
            let earlier_end = entries[earlier].band_end();
            if earlier_end >= entries[later].band_start() {
                entries[later].vertical_offset = earlier_end + gap - entries[later].band.start;
            }
        }
    }
}

/// Move point labels off period bars they do not belong to.
///
/// A label whose own time lies outside a bar but whose box overlaps it is
/// moved just past the nearer bar edge, unless that would drag it more than
/// twice its half-width from where it was.
pub fn avoid_period_bars(entries: &mut [LayoutEntry], clearance: f32) {
    let mut bars: Vec<(usize, f32, f32)> = entries
        .iter()
        .filter(|entry| entry.kind == ItemKind::Period)
        .map(|entry| (entry.chronological_index, entry.raw.start(), entry.raw.end()))
        .collect();
    bars.sort_by_key(|bar| bar.0);

    for entry in entries.iter_mut() {
        if entry.kind == ItemKind::Period {
            continue;
        }
        let raw_x = entry.raw_x();
        for &(_, bar_start, bar_end) in &bars {
            let overlaps = entry.label_left() < bar_end && entry.label_right() > bar_start;
            let inside = raw_x >= bar_start && raw_x <= bar_end;
            if !overlaps || inside {
                continue;
            }
            let target = if raw_x < bar_start {
                bar_start - entry.half_width - clearance
            } else {
                bar_end + entry.half_width + clearance
            };
            if (target - entry.label_center_x).abs() <= 2.0 * entry.half_width {
                entry.label_center_x = target;
            }
        }
    }
}

/// Push labels that straddle a slide seam fully onto one slide.
///
/// Each label picks the side needing the smaller move (left on ties) and
/// keeps `clearance` from the seam. Labels are not re-checked against each
/// other afterwards.
///
/// Only the first straddled seam is resolved, so a label wider than a slide
/// still crosses the neighbouring seam after the move.
pub fn snap_to_slide_boundaries(
    entries: &mut [LayoutEntry],
    slide_width: f32,
    slices: usize,
    clearance: f32,
) {
    for entry in entries.iter_mut() {
        if let Some(center) =
            snapped_center(entry.label_center_x, entry.half_width, slide_width, slices, clearance)
        {
            log::trace!(
                "snapped {} from {:.1} to {:.1}",
                entry.id,
                entry.label_center_x,
                center
            );
            entry.label_center_x = center;
        }
    }
}

fn snapped_center(
    center: f32,
    half_width: f32,
    slide_width: f32,
    slices: usize,
    clearance: f32,
) -> Option<f32> {
    for idx in 1..slices {
        let seam = idx as f32 * slide_width;
        if center - half_width < seam && center + half_width > seam {
            let left = seam - clearance - half_width;
            let right = seam + clearance + half_width;
            return if (center - left).abs() <= (right - center).abs() {
                Some(left)
            } else {
                Some(right)
            };
        }
    }
    None
}

pub fn slide_index(x: f32, slide_width: f32, slices: usize) -> usize {
    if slide_width <= 0.0 || x <= 0.0 {
        return 0;
    }
    ((x / slide_width).floor() as usize).min(slices.saturating_sub(1))
}

/// Keep every marker on the same slide as its label.
///
/// When a label ended up on another slide than its true time position, the
/// marker moves to the point of the label nearest that position.
pub fn rebind_markers(entries: &mut [LayoutEntry], slide_width: f32, slices: usize) {
    for entry in entries.iter_mut() {
        let label_slide = slide_index(entry.label_center_x, slide_width, slices);
        entry.slide = label_slide;
        let Some(marker) = entry.marker_x else {
            continue;
        };
        if slide_index(marker, slide_width, slices) == label_slide {
            continue;
        }
        let slide_start = label_slide as f32 * slide_width;
        let slide_end = slide_start + slide_width;
        let lo = entry.label_left().max(slide_start);
        let hi = entry.label_right().min(slide_end);
        let rebound = if lo <= hi {
            marker.clamp(lo, hi)
        } else {
            entry.label_center_x
        };
        log::debug!(
            "marker of {} moved from slide {} to slide {label_slide}",
            entry.id,
            slide_index(marker, slide_width, slices)
        );
        entry.marker_x = Some(rebound);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Band;
    use crate::layout::RawPosition;

    fn point(id: &str, index: usize, x: f32, half_width: f32, side: Side) -> LayoutEntry {
        LayoutEntry {
            id: id.into(),
            kind: ItemKind::Event,
            side,
            raw: RawPosition::Point { x },
            label_center_x: x,
            vertical_offset: 0.0,
            half_width,
            band: Band::new(20.0, 40.0),
            date_label: String::new(),
            marker_x: Some(x),
            slide: 0,
            chronological_index: index,
        }
    }

    fn bar(id: &str, index: usize, x1: f32, x2: f32) -> LayoutEntry {
        LayoutEntry {
            kind: ItemKind::Period,
            raw: RawPosition::Span { x1, x2 },
            label_center_x: (x1 + x2) / 2.0,
            marker_x: None,
            ..point(id, index, x1, 30.0, Side::Top)
        }
    }

    #[test]
    fn cascading_labels_stack_monotonically() {
        let mut entries = vec![
            point("a", 0, 500.0, 50.0, Side::Top),
            point("b", 1, 501.0, 50.0, Side::Top),
            point("c", 2, 502.0, 50.0, Side::Top),
        ];
        pack_sides(&mut entries, 6.0);
        assert_eq!(entries[0].vertical_offset, 0.0);
        assert!(entries[1].vertical_offset > entries[0].vertical_offset);
        assert!(entries[2].vertical_offset > entries[1].vertical_offset);
        assert_eq!(entries[1].band_start(), entries[0].band_end() + 6.0);
        assert_eq!(entries[2].band_start(), entries[1].band_end() + 6.0);
    }

    #[test]
    fn sides_do_not_interact() {
        let mut entries = vec![
            point("a", 0, 500.0, 50.0, Side::Top),
            point("b", 1, 500.0, 50.0, Side::Bottom),
        ];
        pack_sides(&mut entries, 6.0);
        assert_eq!(entries[0].vertical_offset, 0.0);
        assert_eq!(entries[1].vertical_offset, 0.0);
    }

    #[test]
    fn disjoint_labels_stay_on_the_baseline() {
        let mut entries = vec![
            point("a", 0, 100.0, 40.0, Side::Top),
            point("b", 1, 181.0, 40.0, Side::Top),
        ];
        pack_sides(&mut entries, 6.0);
        assert_eq!(entries[1].vertical_offset, 0.0);
    }

    #[test]
    fn overlapping_labels_never_share_a_band() {
        let mut entries = vec![
            point("a", 0, 100.0, 40.0, Side::Top),
            point("b", 1, 150.0, 40.0, Side::Top),
            point("c", 2, 190.0, 40.0, Side::Top),
            point("d", 3, 120.0, 15.0, Side::Top),
            point("e", 4, 260.0, 60.0, Side::Top),
        ];
        entries[0].vertical_offset = 60.0;
        entries[3].band = Band::new(10.0, 20.0);
        pack_sides(&mut entries, 6.0);
        for i in 0..entries.len() {
            for j in (i + 1)..entries.len() {
                if entries[i].overlaps_horizontally(&entries[j]) {
                    let (lo, hi) = if entries[i].band_start() < entries[j].band_start() {
                        (&entries[i], &entries[j])
                    } else {
                        (&entries[j], &entries[i])
                    };
                    assert!(hi.band_start() >= lo.band_end());
                }
            }
        }
    }

    #[test]
    fn label_leaves_unrelated_bar() {
        let mut entries = vec![point("e", 0, 290.0, 30.0, Side::Top), bar("p", 1, 300.0, 600.0)];
        avoid_period_bars(&mut entries, 4.0);
        assert_eq!(entries[0].label_center_x, 300.0 - 30.0 - 4.0);
        assert_eq!(entries[1].label_center_x, 450.0);
    }

    #[test]
    fn label_inside_its_bar_is_not_moved() {
        let mut entries = vec![point("e", 0, 320.0, 30.0, Side::Top), bar("p", 1, 300.0, 600.0)];
        avoid_period_bars(&mut entries, 4.0);
        assert_eq!(entries[0].label_center_x, 320.0);
    }

    #[test]
    fn bar_avoidance_is_bounded_by_twice_the_half_width() {
        // Label 10px wide each side sits 1px before a bar; raw 299 < 300
        // but the label overlaps. Target is 286, a 13px move, allowed.
        let mut near = vec![point("e", 0, 299.0, 10.0, Side::Top), bar("p", 1, 300.0, 600.0)];
        avoid_period_bars(&mut near, 4.0);
        assert_eq!(near[0].label_center_x, 286.0);

        // Label already shifted far into the bar: required move exceeds 2x.
        let mut far = vec![point("e", 0, 299.0, 10.0, Side::Top), bar("p", 1, 300.0, 600.0)];
        far[0].label_center_x = 310.0;
        avoid_period_bars(&mut far, 4.0);
        assert_eq!(far[0].label_center_x, 310.0);
    }

    #[test]
    fn straddling_label_snaps_to_nearer_slide() {
        let mut entries = vec![point("e", 0, 1195.0, 50.0, Side::Top)];
        snap_to_slide_boundaries(&mut entries, 1200.0, 3, 8.0);
        let entry = &entries[0];
        assert!(entry.label_right() <= 1200.0 - 4.0);
        assert!(entry.label_left() >= 0.0);
        assert_eq!(entry.label_center_x, 1142.0);
    }

    #[test]
    fn snapping_prefers_right_when_closer() {
        let mut entries = vec![point("e", 0, 2410.0, 50.0, Side::Top)];
        snap_to_slide_boundaries(&mut entries, 1200.0, 3, 8.0);
        assert!(entries[0].label_left() >= 2400.0 + 4.0);
    }

    #[test]
    fn label_wider_than_a_slide_only_clears_the_first_seam() {
        let mut entries = vec![point("e", 0, 390.0, 150.0, Side::Top)];
        snap_to_slide_boundaries(&mut entries, 200.0, 4, 8.0);
        let entry = &entries[0];
        assert_eq!(entry.label_center_x, 242.0);
        assert_eq!(entry.label_right(), 392.0);
        assert!(entry.label_left() < 200.0 && entry.label_right() > 200.0);
    }

    #[test]
    fn no_snapping_on_single_slide() {
        let mut entries = vec![point("e", 0, 1195.0, 50.0, Side::Top)];
        snap_to_slide_boundaries(&mut entries, 1200.0, 1, 8.0);
        assert_eq!(entries[0].label_center_x, 1195.0);
    }

    #[test]
    fn marker_follows_label_across_seam() {
        // Exactly on the seam: both moves are equal, the label goes left.
        let mut entries = vec![point("e", 0, 1200.0, 50.0, Side::Top)];
        snap_to_slide_boundaries(&mut entries, 1200.0, 3, 8.0);
        assert_eq!(entries[0].label_center_x, 1142.0);
        rebind_markers(&mut entries, 1200.0, 3);
        let entry = &entries[0];
        assert_eq!(entry.slide, 0);
        let marker = entry.marker_x.unwrap();
        assert_eq!(slide_index(marker, 1200.0, 3), 0);
        assert!(marker >= entry.label_left() && marker <= entry.label_right());
        assert_eq!(marker, 1192.0);
    }

    #[test]
    fn slide_index_is_clamped() {
        assert_eq!(slide_index(-5.0, 1200.0, 3), 0);
        assert_eq!(slide_index(1200.0, 1200.0, 3), 1);
        assert_eq!(slide_index(9999.0, 1200.0, 3), 2);
    }
}
