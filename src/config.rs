use serde::{Deserialize, Serialize};
use std::path::Path;

/// How a period whose end precedes its start is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvalidPeriodPolicy {
    /// Zero-width period at `start`.
    #[default]
    Clamp,
    Swap,
}

/// Initial Top/Bottom assignment for non-period items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SidePolicy {
    /// Even chronological index goes on top, odd below.
    #[default]
    Alternate,
    /// Each item goes to the side with the smaller accumulated band height.
    Balanced,
}

/// Vertical interval a label occupies, measured outward from the axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub start: f32,
    pub height: f32,
}

impl Band {
    pub const fn new(start: f32, height: f32) -> Self {
        Self { start, height }
    }

    pub fn end(&self) -> f32 {
        self.start + self.height
    }

    pub fn scaled(&self, scale: f32) -> Self {
        Self {
            start: self.start * scale,
            height: self.height * scale,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandConfig {
    pub event: Band,
    pub period: Band,
    pub note_top: Band,
    pub note_bottom: Band,
}

impl Default for BandConfig {
    fn default() -> Self {
        Self {
            event: Band::new(24.0, 46.0),
            period: Band::new(40.0, 46.0),
            note_top: Band::new(18.0, 34.0),
            note_bottom: Band::new(22.0, 34.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelMetricsConfig {
    pub event_font_size: f32,
    pub period_font_size: f32,
    pub note_font_size: f32,
    pub date_font_size: f32,
    pub char_width_ratio: f32,
    pub bold_char_width_ratio: f32,
    /// Added to each side of the widest text line.
    pub padding: f32,
}

impl Default for LabelMetricsConfig {
    fn default() -> Self {
        Self {
            event_font_size: 14.0,
            period_font_size: 14.0,
            note_font_size: 12.0,
            date_font_size: 11.0,
            char_width_ratio: 0.55,
            bold_char_width_ratio: 0.6,
            padding: 8.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub canvas_width: f32,
    pub canvas_height: f32,
    pub total_slices: usize,
    pub compress_gaps: bool,
    pub avoid_split_across_slides: bool,
    pub content_scale: f32,
    pub compact_dates: bool,
    pub side_policy: SidePolicy,
    pub invalid_period: InvalidPeriodPolicy,
    /// Fractions of the full width where the time range starts and ends.
    pub range_start_ratio: f32,
    pub range_end_ratio: f32,
    /// Vertical clearance between stacked labels.
    pub collision_gap: f32,
    /// Distance kept between a snapped label and the slide seam.
    pub boundary_clearance: f32,
    /// Distance kept between a label and a period bar it was moved off.
    pub bar_clearance: f32,
    pub labels: LabelMetricsConfig,
    pub bands: BandConfig,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            canvas_width: 1200.0,
            canvas_height: 675.0,
            total_slices: 1,
            compress_gaps: false,
            avoid_split_across_slides: false,
            content_scale: 1.0,
            compact_dates: true,
            side_policy: SidePolicy::Alternate,
            invalid_period: InvalidPeriodPolicy::Clamp,
            range_start_ratio: 0.1,
            range_end_ratio: 0.9,
            collision_gap: 6.0,
            boundary_clearance: 8.0,
            bar_clearance: 4.0,
            labels: LabelMetricsConfig::default(),
            bands: BandConfig::default(),
        }
    }
}

impl LayoutConfig {
    pub fn slices(&self) -> usize {
        self.total_slices.max(1)
    }

    pub fn is_carousel(&self) -> bool {
        self.slices() > 1
    }

    pub fn total_width(&self) -> f32 {
        self.canvas_width.max(1.0) * self.slices() as f32
    }

    pub fn scale(&self) -> f32 {
        if self.content_scale.is_finite() && self.content_scale > 0.0 {
            self.content_scale
        } else {
            1.0
        }
    }

    /// Seam clearance never drops below 4px regardless of configuration.
    pub fn effective_boundary_clearance(&self) -> f32 {
        (self.boundary_clearance * self.scale()).max(4.0)
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct BandFile {
    start: Option<f32>,
    height: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct BandsFile {
    event: Option<BandFile>,
    period: Option<BandFile>,
    note_top: Option<BandFile>,
    note_bottom: Option<BandFile>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct LabelsFile {
    event_font_size: Option<f32>,
    period_font_size: Option<f32>,
    note_font_size: Option<f32>,
    date_font_size: Option<f32>,
    char_width_ratio: Option<f32>,
    bold_char_width_ratio: Option<f32>,
    padding: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    canvas_width: Option<f32>,
    canvas_height: Option<f32>,
    total_slices: Option<usize>,
    compress_gaps: Option<bool>,
    avoid_split_across_slides: Option<bool>,
    content_scale: Option<f32>,
    compact_dates: Option<bool>,
    side_policy: Option<SidePolicy>,
    invalid_period: Option<InvalidPeriodPolicy>,
    range_start_ratio: Option<f32>,
    range_end_ratio: Option<f32>,
    collision_gap: Option<f32>,
    boundary_clearance: Option<f32>,
    bar_clearance: Option<f32>,
    labels: Option<LabelsFile>,
    bands: Option<BandsFile>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<LayoutConfig> {
    let Some(path) = path else {
        return Ok(LayoutConfig::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

/// Merges a camelCase JSON override document onto the defaults.
pub fn parse_config(contents: &str) -> anyhow::Result<LayoutConfig> {
    let parsed: ConfigFile = serde_json::from_str(contents)?;
    apply_config_file(LayoutConfig::default(), parsed)
}

/// Merges an already parsed override object, such as a source's `%%{init}%%`
/// directive, onto `base`.
pub fn merge_overrides(
    base: LayoutConfig,
    overrides: &serde_json::Value,
) -> anyhow::Result<LayoutConfig> {
    let parsed = ConfigFile::deserialize(overrides)?;
    apply_config_file(base, parsed)
}

fn apply_config_file(mut config: LayoutConfig, parsed: ConfigFile) -> anyhow::Result<LayoutConfig> {
    if let Some(v) = parsed.canvas_width {
        config.canvas_width = v;
    }
    if let Some(v) = parsed.canvas_height {
        config.canvas_height = v;
    }
    if let Some(v) = parsed.total_slices {
        config.total_slices = v;
    }
    if let Some(v) = parsed.compress_gaps {
        config.compress_gaps = v;
    }
    if let Some(v) = parsed.avoid_split_across_slides {
        config.avoid_split_across_slides = v;
    }
    if let Some(v) = parsed.content_scale {
        config.content_scale = v;
    }
    if let Some(v) = parsed.compact_dates {
        config.compact_dates = v;
    }
    if let Some(v) = parsed.side_policy {
        config.side_policy = v;
    }
    if let Some(v) = parsed.invalid_period {
        config.invalid_period = v;
    }
    if let Some(v) = parsed.range_start_ratio {
        config.range_start_ratio = v;
    }
    if let Some(v) = parsed.range_end_ratio {
        config.range_end_ratio = v;
    }
    if let Some(v) = parsed.collision_gap {
        config.collision_gap = v;
    }
    if let Some(v) = parsed.boundary_clearance {
        config.boundary_clearance = v;
    }
    if let Some(v) = parsed.bar_clearance {
        config.bar_clearance = v;
    }

    if let Some(labels) = parsed.labels {
        if let Some(v) = labels.event_font_size {
            config.labels.event_font_size = v;
        }
        if let Some(v) = labels.period_font_size {
            config.labels.period_font_size = v;
        }
        if let Some(v) = labels.note_font_size {
            config.labels.note_font_size = v;
        }
        if let Some(v) = labels.date_font_size {
            config.labels.date_font_size = v;
        }
        if let Some(v) = labels.char_width_ratio {
            config.labels.char_width_ratio = v;
        }
        if let Some(v) = labels.bold_char_width_ratio {
            config.labels.bold_char_width_ratio = v;
        }
        if let Some(v) = labels.padding {
            config.labels.padding = v;
        }
    }

    if let Some(bands) = parsed.bands {
        merge_band(&mut config.bands.event, bands.event);
        merge_band(&mut config.bands.period, bands.period);
        merge_band(&mut config.bands.note_top, bands.note_top);
        merge_band(&mut config.bands.note_bottom, bands.note_bottom);
    }

    if config.range_end_ratio <= config.range_start_ratio {
        anyhow::bail!(
            "rangeEndRatio ({}) must be greater than rangeStartRatio ({})",
            config.range_end_ratio,
            config.range_start_ratio
        );
    }

    Ok(config)
}

fn merge_band(band: &mut Band, file: Option<BandFile>) {
    let Some(file) = file else {
        return;
    };
    if let Some(v) = file.start {
        band.start = v;
    }
    if let Some(v) = file.height {
        band.height = v;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = parse_config("{}").unwrap();
        assert_eq!(config, LayoutConfig::default());
    }

    #[test]
    fn overrides_merge_onto_defaults() {
        let config = parse_config(
            r#"{
                "canvasWidth": 1080,
                "totalSlices": 4,
                "avoidSplitAcrossSlides": true,
                "sidePolicy": "balanced",
                "invalidPeriod": "swap",
                "labels": { "eventFontSize": 18 },
                "bands": { "noteBottom": { "height": 40 } }
            }"#,
        )
        .unwrap();
        assert_eq!(config.canvas_width, 1080.0);
        assert_eq!(config.total_slices, 4);
        assert!(config.avoid_split_across_slides);
        assert_eq!(config.side_policy, SidePolicy::Balanced);
        assert_eq!(config.invalid_period, InvalidPeriodPolicy::Swap);
        assert_eq!(config.labels.event_font_size, 18.0);
        assert_eq!(config.labels.note_font_size, 12.0);
        assert_eq!(config.bands.note_bottom.height, 40.0);
        assert_eq!(config.bands.note_bottom.start, 22.0);
        assert_eq!(config.total_width(), 4320.0);
    }

    #[test]
    fn overrides_apply_on_top_of_an_existing_config() {
        let base = LayoutConfig {
            total_slices: 3,
            ..LayoutConfig::default()
        };
        let config =
            merge_overrides(base, &serde_json::json!({ "compressGaps": true })).unwrap();
        assert_eq!(config.total_slices, 3);
        assert!(config.compress_gaps);
        assert!(merge_overrides(LayoutConfig::default(), &serde_json::json!({ "totalSlices": "x" })).is_err());
    }

    #[test]
    fn inverted_range_ratios_are_rejected() {
        let err = parse_config(r#"{ "rangeStartRatio": 0.9, "rangeEndRatio": 0.1 }"#);
        assert!(err.is_err());
    }

    #[test]
    fn boundary_clearance_has_a_floor() {
        let config = LayoutConfig {
            boundary_clearance: 1.0,
            ..LayoutConfig::default()
        };
        assert_eq!(config.effective_boundary_clearance(), 4.0);
    }

    #[test]
    fn zero_slices_behaves_like_one() {
        let config = LayoutConfig {
            total_slices: 0,
            ..LayoutConfig::default()
        };
        assert_eq!(config.slices(), 1);
        assert!(!config.is_carousel());
    }
}
