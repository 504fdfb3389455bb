#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod date;
pub mod format;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod parser;
pub mod text_metrics;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{InvalidPeriodPolicy, LayoutConfig, SidePolicy, load_config};
pub use ir::{Instant, ItemId, ItemKind, Timeline, TimelineItem};
pub use layout::{LayoutEntry, TimelineLayout, compute_layout, has_temporal_overlap};
pub use layout_dump::LayoutDump;
pub use parser::{SourceError, parse_source, parse_timeline};

/// A parsed source together with the configuration it was laid out with.
#[derive(Debug, Clone)]
pub struct SourceLayout {
    pub title: Option<String>,
    pub items: Vec<TimelineItem>,
    pub config: LayoutConfig,
    pub layout: TimelineLayout,
}

impl SourceLayout {
    pub fn dump(&self) -> LayoutDump {
        LayoutDump::from_layout(&self.layout, &self.items, self.title.as_deref())
    }
}

/// Lays out `items`, turning boundary snapping off for timelines whose
/// items overlap in time.
pub fn layout_items(items: &[TimelineItem], config: &LayoutConfig) -> TimelineLayout {
    if config.is_carousel()
        && config.avoid_split_across_slides
        && has_temporal_overlap(items, config.invalid_period)
    {
        log::warn!("items overlap in time, laying out without slide boundary avoidance");
        let relaxed = LayoutConfig {
            avoid_split_across_slides: false,
            ..config.clone()
        };
        return compute_layout(items, &relaxed);
    }
    compute_layout(items, config)
}

/// Parses `source`, applies any layout overrides it carries on top of
/// `config`, and lays it out.
pub fn layout_source(source: &str, config: &LayoutConfig) -> anyhow::Result<SourceLayout> {
    let parsed = parse_source(source)?;
    let config = match &parsed.init_config {
        Some(overrides) => crate::config::merge_overrides(config.clone(), overrides)?,
        None => config.clone(),
    };
    let items = parsed.timeline.into_items();
    let layout = layout_items(&items, &config);
    Ok(SourceLayout {
        title: parsed.title,
        items,
        config,
        layout,
    })
}
