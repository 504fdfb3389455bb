use crate::format::DateSpanMode;
use crate::ir::{ItemKind, TimelineItem};
use crate::layout::{RawPosition, Side, TimelineLayout, project_slice};
use serde::Serialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub title: Option<String>,
    pub width: f32,
    pub height: f32,
    pub slide_width: f32,
    pub total_slices: usize,
    pub axis_y: f32,
    pub range_start: f32,
    pub range_end: f32,
    pub domain_start: String,
    pub domain_end: String,
    pub date_mode: DateSpanMode,
    pub context_label: Option<String>,
    pub breaks: Vec<f32>,
    pub entries: Vec<EntryDump>,
    pub slices: Vec<SliceDump>,
}

#[derive(Debug, Serialize)]
pub struct EntryDump {
    pub id: String,
    pub kind: ItemKind,
    pub label: String,
    pub date_label: String,
    pub side: Side,
    pub raw: RawPosition,
    pub marker_x: Option<f32>,
    pub label_center_x: f32,
    pub label_left: f32,
    pub label_right: f32,
    pub label_top: f32,
    pub label_bottom: f32,
    pub vertical_offset: f32,
    pub slide: usize,
    pub chronological_index: usize,
}

#[derive(Debug, Serialize)]
pub struct SliceDump {
    pub index: usize,
    pub x_start: f32,
    pub x_end: f32,
    pub entries: Vec<String>,
    pub breaks: Vec<f32>,
}

impl LayoutDump {
    pub fn from_layout(layout: &TimelineLayout, items: &[TimelineItem], title: Option<&str>) -> Self {
        let labels: HashMap<&str, &str> = items
            .iter()
            .map(|item| (item.id().as_str(), item.label()))
            .collect();

        let entries = layout
            .chronological()
            .into_iter()
            .map(|entry| {
                let (label_top, label_bottom) = entry.label_y_extent(layout.axis_y);
                EntryDump {
                    id: entry.id.to_string(),
                    kind: entry.kind,
                    label: labels
                        .get(entry.id.as_str())
                        .map(|label| label.to_string())
                        .unwrap_or_default(),
                    date_label: entry.date_label.clone(),
                    side: entry.side,
                    raw: entry.raw,
                    marker_x: entry.marker_x,
                    label_center_x: entry.label_center_x,
                    label_left: entry.label_left(),
                    label_right: entry.label_right(),
                    label_top,
                    label_bottom,
                    vertical_offset: entry.vertical_offset,
                    slide: entry.slide,
                    chronological_index: entry.chronological_index,
                }
            })
            .collect();

        let slices = (0..layout.total_slices)
            .filter_map(|index| project_slice(layout, index))
            .map(|slice| SliceDump {
                index: slice.viewport.index,
                x_start: slice.viewport.x_start,
                x_end: slice.viewport.x_end,
                entries: slice.entries.iter().map(|entry| entry.id.to_string()).collect(),
                breaks: slice.breaks,
            })
            .collect();

        LayoutDump {
            title: title.map(str::to_string),
            width: layout.width,
            height: layout.height,
            slide_width: layout.slide_width,
            total_slices: layout.total_slices,
            axis_y: layout.axis_y,
            range_start: layout.range_start,
            range_end: layout.range_end,
            domain_start: layout.domain.min.format("%Y-%m-%dT%H:%M:%S").to_string(),
            domain_end: layout.domain.max.format("%Y-%m-%dT%H:%M:%S").to_string(),
            date_mode: layout.date_span.mode,
            context_label: layout.date_span.context_label.clone(),
            breaks: layout.breaks.clone(),
            entries,
            slices,
        }
    }

    pub fn to_json(&self, pretty: bool) -> serde_json::Result<String> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }
}

pub fn write_layout_dump(
    path: &Path,
    layout: &TimelineLayout,
    items: &[TimelineItem],
    title: Option<&str>,
    pretty: bool,
) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    let dump = LayoutDump::from_layout(layout, items, title);
    if pretty {
        serde_json::to_writer_pretty(&mut writer, &dump)?;
    } else {
        serde_json::to_writer(&mut writer, &dump)?;
    }
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
