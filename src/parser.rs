use crate::date::parse_instant;
use crate::ir::{Instant, ItemKind, Timeline, TimelineError, TimelineItem};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

static INIT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^%%\{\s*init\s*:\s*(\{.*\})\s*\}%%").unwrap());
static ITEM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^(?P<kind>[A-Za-z]+)\s+(?:\[(?P<id>[^\]]*)\]\s*)?(?P<label>"[^"]*"|'[^']*'|[^:]*?)\s*:\s*(?P<date>.*)$"#,
    )
    .unwrap()
});
static RANGE_SEPARATOR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*->\s*").unwrap());

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("invalid JSON timeline: {0}")]
    Json(#[from] json5::Error),
    #[error("item {item}: unknown item type `{token}`")]
    UnknownKind { item: usize, token: String },
    #[error("line {line}: expected `<type> [id] <label> : <date>`, found `{text}`")]
    MalformedLine { line: usize, text: String },
    #[error("item {item}: missing `{field}`")]
    MissingField { item: usize, field: &'static str },
    #[error(transparent)]
    Timeline(#[from] TimelineError),
}

#[derive(Debug, Default)]
pub struct ParseOutput {
    pub timeline: Timeline,
    pub title: Option<String>,
    /// Layout overrides carried by the source itself.
    pub init_config: Option<serde_json::Value>,
}

/// Items of a timeline source, in source order.
pub fn parse_timeline(source: &str) -> Result<Vec<TimelineItem>, SourceError> {
    Ok(parse_source(source)?.timeline.into_items())
}

/// Parses either a JSON5 document or the line-oriented text format.
pub fn parse_source(source: &str) -> Result<ParseOutput, SourceError> {
    let trimmed = source.trim_start();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        parse_json_source(trimmed)
    } else {
        parse_text_source(source)
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonDocument {
    Bare(Vec<JsonItem>),
    Document {
        #[serde(default)]
        title: Option<String>,
        items: Vec<JsonItem>,
        #[serde(default)]
        config: Option<serde_json::Value>,
    },
}

#[derive(Debug, Deserialize)]
struct JsonItem {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    date: Option<JsonDate>,
    #[serde(default)]
    start: Option<JsonDate>,
    #[serde(default)]
    end: Option<JsonDate>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonDate {
    Text(String),
    Number(f64),
}

impl JsonDate {
    fn instant(&self) -> Instant {
        match self {
            Self::Text(text) => parse_instant(text),
            Self::Number(value) => parse_instant(&format!("{}", value.trunc() as i64)),
        }
    }
}

fn parse_json_source(source: &str) -> Result<ParseOutput, SourceError> {
    let (title, raw_items, init_config) = match json5::from_str::<JsonDocument>(source)? {
        JsonDocument::Bare(items) => (None, items, None),
        JsonDocument::Document {
            title,
            items,
            config,
        } => (title, items, config),
    };

    let mut items = Vec::with_capacity(raw_items.len());
    for (idx, raw) in raw_items.into_iter().enumerate() {
        let position = idx + 1;
        // Without an explicit type, start/end fields make a period.
        let kind = match raw.kind.as_deref() {
            Some(token) => {
                ItemKind::from_token(token).ok_or_else(|| SourceError::UnknownKind {
                    item: position,
                    token: token.to_string(),
                })?
            }
            None if raw.start.is_some() || raw.end.is_some() => ItemKind::Period,
            None => ItemKind::Event,
        };
        let id = raw
            .id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| default_id(position));
        let label = raw.label.ok_or(SourceError::MissingField {
            item: position,
            field: "label",
        })?;

        let item = match kind {
            ItemKind::Period => {
                let start = raw.start.or(raw.date).ok_or(SourceError::MissingField {
                    item: position,
                    field: "start",
                })?;
                let end = raw.end.ok_or(SourceError::MissingField {
                    item: position,
                    field: "end",
                })?;
                TimelineItem::period(id, label, start.instant(), end.instant())
            }
            ItemKind::Event | ItemKind::Note => {
                let date = raw.date.or(raw.start).ok_or(SourceError::MissingField {
                    item: position,
                    field: "date",
                })?;
                point_item(kind, id, label, date.instant())
            }
        };
        items.push(item);
    }

    Ok(ParseOutput {
        timeline: Timeline::from_items(items)?,
        title,
        init_config,
    })
}

fn parse_text_source(source: &str) -> Result<ParseOutput, SourceError> {
    let mut output = ParseOutput::default();
    let mut items = Vec::new();
    let mut seen_content = false;

    for (idx, raw_line) in source.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = raw_line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(caps) = INIT_RE.captures(trimmed) {
            if let Some(json) = caps.get(1).map(|m| m.as_str()) {
                if let Ok(value) = serde_json::from_str::<serde_json::Value>(json) {
                    output.init_config = Some(value);
                } else {
                    match json5::from_str::<serde_json::Value>(json) {
                        Ok(value) => output.init_config = Some(value),
                        Err(err) => log::warn!("line {line_no}: ignoring init directive: {err}"),
                    }
                }
            }
            continue;
        }
        if trimmed.starts_with("%%") {
            continue;
        }
        let line = strip_trailing_comment(trimmed);
        if line.is_empty() {
            continue;
        }

        let lower = line.to_ascii_lowercase();
        if !seen_content && lower == "timeline" {
            seen_content = true;
            continue;
        }
        seen_content = true;
        if lower == "title" || lower.starts_with("title ") {
            let rest = strip_quotes(line.get(5..).unwrap_or(""));
            if !rest.is_empty() {
                output.title = Some(rest);
            }
            continue;
        }

        let Some(caps) = ITEM_RE.captures(&line) else {
            return Err(SourceError::MalformedLine {
                line: line_no,
                text: line.clone(),
            });
        };
        let position = items.len() + 1;
        let token = &caps["kind"];
        let kind = ItemKind::from_token(token).ok_or_else(|| SourceError::UnknownKind {
            item: position,
            token: token.to_string(),
        })?;
        let id = caps
            .name("id")
            .map(|m| m.as_str().trim())
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| default_id(position));
        let label = strip_quotes(&caps["label"]);
        if label.is_empty() {
            return Err(SourceError::MissingField {
                item: position,
                field: "label",
            });
        }
        let date = caps["date"].trim();
        if date.is_empty() {
            return Err(SourceError::MissingField {
                item: position,
                field: "date",
            });
        }

        let item = match kind {
            ItemKind::Period => {
                let mut parts = RANGE_SEPARATOR_RE.splitn(date, 2);
                let start = parts.next().unwrap_or("").trim();
                let end = parts.next().map(str::trim).unwrap_or("");
                if start.is_empty() {
                    return Err(SourceError::MissingField {
                        item: position,
                        field: "start",
                    });
                }
                if end.is_empty() {
                    return Err(SourceError::MissingField {
                        item: position,
                        field: "end",
                    });
                }
                TimelineItem::period(id, label, parse_instant(start), parse_instant(end))
            }
            ItemKind::Event | ItemKind::Note => {
                point_item(kind, id, label, parse_instant(date))
            }
        };
        items.push(item);
    }

    output.timeline = Timeline::from_items(items)?;
    Ok(output)
}

fn point_item(kind: ItemKind, id: String, label: String, instant: Instant) -> TimelineItem {
    if kind == ItemKind::Note {
        TimelineItem::note(id, label, instant)
    } else {
        TimelineItem::event(id, label, instant)
    }
}

fn default_id(position: usize) -> String {
    format!("item-{position}")
}

fn strip_trailing_comment(line: &str) -> String {
    let mut quote: Option<char> = None;
    let mut chars = line.chars().peekable();
    let mut out = String::new();
    while let Some(ch) = chars.next() {
        if let Some(q) = quote {
            if ch == q {
                quote = None;
            }
            out.push(ch);
            continue;
        }
        if ch == '"' || ch == '\'' {
            quote = Some(ch);
            out.push(ch);
            continue;
        }
        if ch == '%'
            && let Some('%') = chars.peek().copied()
        {
            break;
        }
        out.push(ch);
    }
    out.trim_end().to_string()
}

fn strip_quotes(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.len() >= 2
        && ((trimmed.starts_with('"') && trimmed.ends_with('"'))
            || (trimmed.starts_with('\'') && trimmed.ends_with('\'')))
    {
        trimmed[1..trimmed.len() - 1].to_string()
    } else {
        trimmed.to_string()
    }
}
