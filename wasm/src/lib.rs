use serde::Deserialize;
use timeline_rs_layout::config::{LayoutConfig, merge_overrides};
use timeline_rs_layout::layout::project_slice;
use timeline_rs_layout::layout_source;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimelineLayoutOptions {
    pretty: Option<bool>,
    /// Everything else is a layout config override.
    #[serde(flatten)]
    layout: serde_json::Map<String, serde_json::Value>,
}

fn parse_options(options_json: Option<String>) -> Result<(LayoutConfig, bool), String> {
    let options = match options_json {
        Some(raw) => serde_json::from_str::<TimelineLayoutOptions>(&raw)
            .map_err(|error| error.to_string())?,
        None => TimelineLayoutOptions::default(),
    };
    let config = merge_overrides(
        LayoutConfig::default(),
        &serde_json::Value::Object(options.layout),
    )
    .map_err(|error| error.to_string())?;
    Ok((config, options.pretty.unwrap_or(false)))
}

fn layout_json(source: &str, options_json: Option<String>) -> Result<String, String> {
    let (config, pretty) = parse_options(options_json)?;
    let laid_out = layout_source(source, &config).map_err(|error| error.to_string())?;
    laid_out.dump().to_json(pretty).map_err(|error| error.to_string())
}

fn slice_json(source: &str, options_json: Option<String>, index: usize) -> Result<String, String> {
    let (config, pretty) = parse_options(options_json)?;
    let laid_out = layout_source(source, &config).map_err(|error| error.to_string())?;
    let slice = project_slice(&laid_out.layout, index)
        .ok_or_else(|| format!("slide {index} out of range"))?;
    let json = if pretty {
        serde_json::to_string_pretty(&slice)
    } else {
        serde_json::to_string(&slice)
    };
    json.map_err(|error| error.to_string())
}

#[wasm_bindgen]
pub fn layout_timeline_json(source: &str, options_json: Option<String>) -> Result<String, JsValue> {
    layout_json(source, options_json).map_err(|error| JsValue::from_str(&error))
}

#[wasm_bindgen]
pub fn layout_timeline_slice_json(
    source: &str,
    options_json: Option<String>,
    index: usize,
) -> Result<String, JsValue> {
    slice_json(source, options_json, index).map_err(|error| JsValue::from_str(&error))
}
