use crate::config::LabelMetricsConfig;

/// Closed-form width estimate: characters × font size × per-character ratio.
///
/// No font is ever loaded, so a layout computed on a headless server matches
/// the one computed in a browser.
pub fn estimate_text_width(text: &str, font_size: f32, bold: bool, metrics: &LabelMetricsConfig) -> f32 {
    if text.is_empty() || font_size <= 0.0 {
        return 0.0;
    }
    let ratio = if bold {
        metrics.bold_char_width_ratio
    } else {
        metrics.char_width_ratio
    };
    let chars = text
        .chars()
        .filter(|ch| *ch != '\n')
        .map(|ch| if ch == '\t' { 4 } else { 1 })
        .sum::<usize>();
    chars as f32 * font_size * ratio
}

/// Half of a label box holding a title line and a date line.
pub fn label_half_width(
    title: &str,
    title_font_size: f32,
    title_bold: bool,
    date: &str,
    date_font_size: f32,
    padding: f32,
    metrics: &LabelMetricsConfig,
) -> f32 {
    let title_width = estimate_text_width(title, title_font_size, title_bold, metrics);
    let date_width = estimate_text_width(date, date_font_size, false, metrics);
    title_width.max(date_width) / 2.0 + padding
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_scales_with_length_and_size() {
        let metrics = LabelMetricsConfig::default();
        let short = estimate_text_width("abc", 10.0, false, &metrics);
        let long = estimate_text_width("abcdef", 10.0, false, &metrics);
        assert!((short - 16.5).abs() < 1e-4);
        assert!((long - 2.0 * short).abs() < 1e-4);
        let bigger = estimate_text_width("abc", 20.0, false, &metrics);
        assert!((bigger - 2.0 * short).abs() < 1e-4);
    }

    #[test]
    fn bold_is_wider() {
        let metrics = LabelMetricsConfig::default();
        let regular = estimate_text_width("Launch", 14.0, false, &metrics);
        let bold = estimate_text_width("Launch", 14.0, true, &metrics);
        assert!(bold > regular);
    }

    #[test]
    fn empty_text_has_no_width() {
        let metrics = LabelMetricsConfig::default();
        assert_eq!(estimate_text_width("", 14.0, true, &metrics), 0.0);
        assert_eq!(estimate_text_width("abc", 0.0, true, &metrics), 0.0);
    }

    #[test]
    fn half_width_uses_wider_line_plus_padding() {
        let metrics = LabelMetricsConfig::default();
        let half = label_half_width("Hi", 10.0, false, "Jun 7, 2025", 10.0, 8.0, &metrics);
        let date_width = estimate_text_width("Jun 7, 2025", 10.0, false, &metrics);
        assert!((half - (date_width / 2.0 + 8.0)).abs() < 1e-4);
    }
}
