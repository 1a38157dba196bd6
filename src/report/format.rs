//! Formatted terminal output for `check` and `inspect`.
//!
//! Output is deterministic (fixed domain order, fixed float formats) so it can double as the
//! `checks.log` artifact.

use crate::domain::{CheckReport, DomainId, DomainReport, SummaryCheck};
use crate::error::DatasetError;
use crate::io::ingest::DatasetStats;
use crate::tolerances::SummaryBound;

/// Flagged rows listed per domain before eliding the rest.
const MAX_FLAGGED_SHOWN: usize = 10;

/// Format the full check report: per-domain table, then flagged rows and summaries.
pub fn format_check_report(report: &CheckReport) -> String {
    let mut out = String::new();

    out.push_str("=== CRU prediction checks ===\n");
    out.push_str(&format_domain_table(&report.domains));

    for domain in &report.domains {
        let details = format_domain_details(domain);
        if !details.is_empty() {
            out.push('\n');
            out.push_str(&details);
        }
    }

    out.push_str(&format!("\nAggregate: {}\n", report.aggregate));
    out
}

fn format_domain_table(domains: &[DomainReport]) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<12} {:<18} {:>6} {:>14} {:<16} {:>8}\n",
            "domain", "verdict", "rows", "max_dev", "rule", "bound"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:-<12} {:-<18} {:-<6} {:-<14} {:-<16} {:-<8}\n",
            "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for d in domains {
        out.push_str(
            format!(
                "{:<12} {:<18} {:>6} {:>14} {:<16} {:>8}\n",
                truncate(d.domain.display_name(), 12),
                d.verdict.as_str(),
                d.rows_evaluated,
                fmt_opt(d.max_deviation),
                d.rule,
                fmt_num(d.bound),
            )
            .trim_end(),
        );
        out.push('\n');
    }
    out
}

fn format_domain_details(d: &DomainReport) -> String {
    let mut out = String::new();
    let name = d.domain.display_name();

    if let Some(detail) = &d.detail {
        out.push_str(&format!("{name}: {detail}\n"));
    }

    if !d.flagged_rows.is_empty() {
        out.push_str(&format!("{name}: {} flagged row(s)\n", d.flagged_rows.len()));
        for row in d.flagged_rows.iter().take(MAX_FLAGGED_SHOWN) {
            out.push_str(&format!(
                "  line {:>5}  x={:<12} obs={:<12} pred={:<12} {}\n",
                row.line,
                fmt_num(row.x),
                fmt_num(row.observed),
                fmt_opt(row.predicted),
                row.reason
            ));
        }
        if d.flagged_rows.len() > MAX_FLAGGED_SHOWN {
            out.push_str(&format!(
                "  ... {} more\n",
                d.flagged_rows.len() - MAX_FLAGGED_SHOWN
            ));
        }
    }

    for s in &d.summaries {
        out.push_str(&format!("{name}: {}\n", format_summary(s)));
    }
    out
}

fn format_summary(s: &SummaryCheck) -> String {
    let outcome = match s.passed {
        Some(true) => "ok",
        Some(false) => "FAILED",
        None => "not evaluated",
    };
    let accept = match s.bound {
        Some(SummaryBound::Within(tolerance)) => {
            format!("expected {} +/- {}", fmt_opt(s.expected), fmt_num(tolerance))
        }
        Some(SummaryBound::Range { min, max }) => {
            format!("accept [{}, {}], model {}", fmt_num(min), fmt_num(max), fmt_opt(s.expected))
        }
        Some(SummaryBound::AtLeast { min }) => {
            format!("accept >= {}, model {}", fmt_num(min), fmt_opt(s.expected))
        }
        None => "no bound".to_string(),
    };
    let mut line = format!("{} = {} ({accept}) {outcome}", s.name, fmt_opt(s.value));
    if let Some(note) = &s.note {
        line.push_str(&format!(" [{note}]"));
    }
    line
}

/// Format the `inspect` table: one line per dataset.
pub fn format_inspection(entries: &[(DomainId, Result<DatasetStats, DatasetError>)]) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<20} {:>6} {:>12} {:>12} {:<10} {:<7} {:>8} {}\n",
            "file", "rows", "x_min", "x_max", "increasing", "falling", "neg_frac", "status"
        )
        .trim_end(),
    );
    out.push('\n');

    for (domain, result) in entries {
        let line = match result {
            Ok(stats) => format!(
                "{:<20} {:>6} {:>12} {:>12} {:<10} {:<7} {:>8.3} ok\n",
                domain.file_name(),
                stats.rows,
                fmt_num(stats.x_min),
                fmt_num(stats.x_max),
                yes_no(stats.strictly_increasing),
                yes_no(stats.non_increasing),
                stats.negative_fraction,
            ),
            Err(err) => format!(
                "{:<20} {:>6} {:>12} {:>12} {:<10} {:<7} {:>8} {err}\n",
                domain.file_name(),
                "-",
                "-",
                "-",
                "-",
                "-",
                "-"
            ),
        };
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

fn fmt_num(v: f64) -> String {
    if v == 0.0 {
        "0".to_string()
    } else if (1e-3..1e5).contains(&v.abs()) {
        format!("{v:.4}")
    } else {
        format!("{v:.4e}")
    }
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map(fmt_num).unwrap_or_else(|| "-".to_string())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
