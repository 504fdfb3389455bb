use crate::config::{LayoutConfig, load_config};
use crate::layout::project_slice;
use crate::{SourceLayout, layout_source};
use anyhow::Result;
use clap::Parser;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "tlrs", version, about = "Collision-aware timeline layout as JSON")]
pub struct Args {
    /// Input file (.tl, .json, .md) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. Defaults to stdout if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Layout config JSON file (camelCase overrides)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Width of one slide
    #[arg(short = 'w', long = "width")]
    pub width: Option<f32>,

    /// Height
    #[arg(short = 'H', long = "height")]
    pub height: Option<f32>,

    /// Number of slides the timeline is spread over
    #[arg(long = "slides")]
    pub slides: Option<usize>,

    /// Shorten unusually large gaps between items
    #[arg(long = "compress-gaps")]
    pub compress_gaps: bool,

    /// Keep labels from straddling slide boundaries
    #[arg(long = "avoid-split")]
    pub avoid_split: bool,

    /// Emit only this slide (0-based), in slide-local coordinates
    #[arg(long = "slide")]
    pub slide: Option<usize>,

    /// Pretty-print the JSON output
    #[arg(long = "pretty")]
    pub pretty: bool,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    let config = apply_args(load_config(args.config.as_deref())?, &args);

    let (input, is_markdown) = read_input(args.input.as_deref())?;
    let sources = if is_markdown {
        extract_timeline_blocks(&input)
    } else {
        vec![input]
    };

    if sources.is_empty() {
        return Err(anyhow::anyhow!("No timeline blocks found in input"));
    }

    if sources.len() == 1 {
        let laid_out = layout_source(&sources[0], &config)?;
        let json = render_json(&laid_out, args.slide, args.pretty)?;
        return write_output(&json, args.output.as_deref());
    }

    // Multiple timelines (Markdown input)
    let outputs = resolve_multi_outputs(args.output.as_deref(), sources.len())?;
    for (idx, source) in sources.iter().enumerate() {
        let laid_out = layout_source(source, &config)?;
        let json = render_json(&laid_out, args.slide, args.pretty)?;
        write_output(&json, Some(&outputs[idx]))?;
    }
    Ok(())
}

fn apply_args(mut config: LayoutConfig, args: &Args) -> LayoutConfig {
    if let Some(width) = args.width {
        config.canvas_width = width;
    }
    if let Some(height) = args.height {
        config.canvas_height = height;
    }
    if let Some(slides) = args.slides {
        config.total_slices = slides;
    }
    if args.compress_gaps {
        config.compress_gaps = true;
    }
    if args.avoid_split {
        config.avoid_split_across_slides = true;
    }
    config
}

fn render_json(laid_out: &SourceLayout, slide: Option<usize>, pretty: bool) -> Result<String> {
    let Some(index) = slide else {
        return Ok(laid_out.dump().to_json(pretty)?);
    };
    let projected = project_slice(&laid_out.layout, index).ok_or_else(|| {
        anyhow::anyhow!(
            "Slide {} out of range (timeline has {} slides)",
            index,
            laid_out.layout.total_slices
        )
    })?;
    let json = if pretty {
        serde_json::to_string_pretty(&projected)?
    } else {
        serde_json::to_string(&projected)?
    };
    Ok(json)
}

fn write_output(json: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, format!("{json}\n"))?,
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(json.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }
    Ok(())
}

fn read_input(path: Option<&Path>) -> Result<(String, bool)> {
    if let Some(path) = path {
        if path == Path::new("-") {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            return Ok((buf, false));
        }
        let content = std::fs::read_to_string(path)?;
        let is_md = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|ext| matches!(ext, "md" | "markdown"))
            .unwrap_or(false);
        return Ok((content, is_md));
    }

    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok((buf, false))
}

fn extract_timeline_blocks(input: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut in_block = false;
    let mut current = Vec::new();
    let mut fence = String::new();

    for line in input.lines() {
        let trimmed = line.trim();
        if !in_block {
            if let Some(start_fence) = detect_timeline_fence(trimmed) {
                in_block = true;
                fence = start_fence;
                continue;
            }
        } else if is_fence_end(trimmed, &fence) {
            in_block = false;
            blocks.push(current.join("\n"));
            current.clear();
            continue;
        }

        if in_block {
            current.push(line.to_string());
        }
    }

    blocks
}

fn detect_timeline_fence(line: &str) -> Option<String> {
    for marker in ['`', '~'] {
        let fence: String = std::iter::repeat_n(marker, 3).collect();
        if line.starts_with(&fence) {
            let rest = line.trim_start_matches(marker).trim();
            if rest.starts_with("timeline") {
                return Some(fence);
            }
        }
    }
    None
}

fn is_fence_end(line: &str, fence: &str) -> bool {
    if !line.starts_with(fence) {
        return false;
    }
    line[fence.len()..].trim().is_empty()
}

fn resolve_multi_outputs(output: Option<&Path>, count: usize) -> Result<Vec<PathBuf>> {
    let base = output.ok_or_else(|| anyhow::anyhow!("Output path required for markdown input"))?;
    if base.is_dir() {
        let mut outputs = Vec::new();
        for idx in 0..count {
            outputs.push(base.join(format!("timeline-{}.json", idx + 1)));
        }
        return Ok(outputs);
    }
    let stem = base.file_stem().and_then(|s| s.to_str()).unwrap_or("timeline");
    let parent = base.parent().unwrap_or_else(|| Path::new("."));
    let mut outputs = Vec::new();
    for idx in 0..count {
        outputs.push(parent.join(format!("{}-{}.json", stem, idx + 1)));
    }
    Ok(outputs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_timeline_blocks() {
        let input = r#"
intro
``` timeline
event Launch : 2025-01-01
```
ignored
```rust
fn main() {}
```
~~~timeline
note Later : 2025-02-01
~~~
"#;
        let blocks = extract_timeline_blocks(input);
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].contains("Launch"));
        assert!(blocks[1].contains("Later"));
    }

    #[test]
    fn flags_override_config() {
        let args = Args::parse_from([
            "tlrs",
            "-w",
            "1080",
            "--slides",
            "3",
            "--avoid-split",
            "--compress-gaps",
        ]);
        let config = apply_args(LayoutConfig::default(), &args);
        assert_eq!(config.canvas_width, 1080.0);
        assert_eq!(config.canvas_height, 675.0);
        assert_eq!(config.total_slices, 3);
        assert!(config.avoid_split_across_slides);
        assert!(config.compress_gaps);
    }

    #[test]
    fn markdown_outputs_are_numbered() {
        let outputs = resolve_multi_outputs(Some(Path::new("out/plan.json")), 2).unwrap();
        assert_eq!(
            outputs,
            vec![PathBuf::from("out/plan-1.json"), PathBuf::from("out/plan-2.json")]
        );
        assert!(resolve_multi_outputs(None, 2).is_err());
    }

    #[test]
    fn slide_output_is_range_checked() {
        let laid_out = layout_source("event A : 2025-01-01", &LayoutConfig::default()).unwrap();
        assert!(render_json(&laid_out, Some(0), false).is_ok());
        assert!(render_json(&laid_out, Some(1), false).is_err());
    }
}
