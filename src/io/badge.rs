//! Shields-style SVG status badge.
//!
//! The badge's only content is the label and the aggregate verdict; colour and text map
//! 1:1 from the verdict.

use std::path::Path;

use crate::domain::Verdict;
use crate::error::AppError;

const LABEL_BACKGROUND: &str = "#555";
const HEIGHT: usize = 20;

/// Fill colour of the status half.
pub fn badge_color(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Pass => "#4c1",
        Verdict::Fail => "#e05d44",
        Verdict::InsufficientData => "#dfb317",
    }
}

/// Text of the status half.
pub fn badge_status(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Pass => "PASS",
        Verdict::Fail => "FAIL",
        Verdict::InsufficientData => "INSUFFICIENT DATA",
    }
}

/// Render the badge SVG.
pub fn render_badge(label: &str, verdict: Verdict) -> String {
    let status = badge_status(verdict);
    let color = badge_color(verdict);
    // Monospace approximation: 6px per glyph plus padding.
    let label_w = 6 * label.chars().count() + 20;
    let status_w = 6 * status.chars().count() + 20;
    let total_w = label_w + status_w;
    let label = escape_xml(label);

    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{total_w}\" height=\"{HEIGHT}\" role=\"img\" aria-label=\"{label}: {status}\">\n"
    ));
    svg.push_str("  <linearGradient id=\"s\" x2=\"0\" y2=\"100%\">\n");
    svg.push_str("    <stop offset=\"0\" stop-color=\"#bbb\" stop-opacity=\".1\"/>\n");
    svg.push_str("    <stop offset=\"1\" stop-opacity=\".1\"/>\n");
    svg.push_str("  </linearGradient>\n");
    svg.push_str("  <mask id=\"m\">\n");
    svg.push_str(&format!(
        "    <rect width=\"{total_w}\" height=\"{HEIGHT}\" rx=\"3\" fill=\"#fff\"/>\n"
    ));
    svg.push_str("  </mask>\n");
    svg.push_str("  <g mask=\"url(#m)\">\n");
    svg.push_str(&format!(
        "    <rect width=\"{label_w}\" height=\"{HEIGHT}\" fill=\"{LABEL_BACKGROUND}\"/>\n"
    ));
    svg.push_str(&format!(
        "    <rect x=\"{label_w}\" width=\"{status_w}\" height=\"{HEIGHT}\" fill=\"{color}\"/>\n"
    ));
    svg.push_str(&format!(
        "    <rect width=\"{total_w}\" height=\"{HEIGHT}\" fill=\"url(#s)\"/>\n"
    ));
    svg.push_str("  </g>\n");
    svg.push_str("  <g fill=\"#fff\" text-anchor=\"middle\" font-family=\"DejaVu Sans,Verdana,Geneva,sans-serif\" font-size=\"11\">\n");
    svg.push_str(&format!(
        "    <text x=\"{}\" y=\"14\">{label}</text>\n",
        half(label_w)
    ));
    svg.push_str(&format!(
        "    <text x=\"{}\" y=\"14\">{status}</text>\n",
        half(2 * label_w + status_w)
    ));
    svg.push_str("  </g>\n");
    svg.push_str("</svg>\n");
    svg
}

/// Render and write the badge to `path`.
pub fn write_badge(path: &Path, label: &str, verdict: Verdict) -> Result<(), AppError> {
    std::fs::write(path, render_badge(label, verdict))
        .map_err(|e| AppError::io(format!("Failed to write badge '{}': {e}", path.display())))
}

/// `n / 2` formatted without a trailing `.0`.
fn half(n: usize) -> String {
    if n % 2 == 0 {
        (n / 2).to_string()
    } else {
        format!("{}.5", n / 2)
    }
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}
