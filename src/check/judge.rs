//! Turning comparisons into a domain verdict.

use crate::check::{Comparison, DerivedValue, Evidence};
use crate::domain::{DomainId, DomainReport, FlaggedRow, SummaryCheck, Verdict};
use crate::tolerances::{DomainTolerance, TolerancePolicy};

/// Apply `tolerance` to every comparison and derived value.
///
/// A row fails if its deviation exceeds the bound or it could not be evaluated. The domain
/// fails if any row or any evaluated summary fails. A summary that could not be evaluated
/// is reported but does not change the verdict.
pub fn judge(domain: DomainId, evidence: &Evidence, tolerance: &DomainTolerance) -> DomainReport {
    let policy = tolerance.row;
    let mut max_deviation: Option<f64> = None;
    let mut flagged_rows = Vec::new();

    for cmp in &evidence.rows {
        match judge_row(domain, &policy, cmp) {
            Ok(deviation) => {
                max_deviation = Some(max_deviation.map_or(deviation, |m| m.max(deviation)));
                if !policy.accepts(deviation) {
                    flagged_rows.push(flag(cmp, Some(deviation), format!("exceeds {policy}")));
                }
            }
            Err(reason) => flagged_rows.push(flag(cmp, None, reason)),
        }
    }

    let summaries: Vec<SummaryCheck> = evidence
        .derived
        .iter()
        .map(|d| judge_summary(d, tolerance))
        .collect();

    let verdict = if evidence.rows.is_empty() {
        Verdict::InsufficientData
    } else if !flagged_rows.is_empty() || summaries.iter().any(|s| s.passed == Some(false)) {
        Verdict::Fail
    } else {
        Verdict::Pass
    };

    DomainReport {
        domain,
        verdict,
        max_deviation,
        rows_evaluated: evidence.rows.len(),
        rule: policy.label().to_string(),
        bound: policy.bound(),
        flagged_rows,
        summaries,
        detail: None,
    }
}

fn judge_row(domain: DomainId, policy: &TolerancePolicy, cmp: &Comparison) -> Result<f64, String> {
    let evaluated = cmp
        .predicted
        .clone()
        .and_then(|predicted| policy.deviation(predicted, cmp.observed, cmp.sigma));
    evaluated.map_err(|err| {
        tracing::warn!(%domain, line = cmp.line, x = cmp.x, error = %err, "row not evaluable");
        err.to_string()
    })
}

fn flag(cmp: &Comparison, deviation: Option<f64>, reason: String) -> FlaggedRow {
    FlaggedRow {
        line: cmp.line,
        x: cmp.x,
        observed: cmp.observed,
        predicted: cmp.predicted.as_ref().ok().copied(),
        deviation,
        reason,
    }
}

fn judge_summary(derived: &DerivedValue, tolerance: &DomainTolerance) -> SummaryCheck {
    let bound = tolerance.summary.get(derived.name).copied();
    let passed = match (derived.value, bound) {
        (Some(value), Some(bound)) => bound.accepts(value, derived.expected),
        _ => None,
    };
    let note = match (&derived.note, bound) {
        (Some(note), _) => Some(note.clone()),
        (None, None) => Some(format!("no bound configured for `{}`", derived.name)),
        (None, Some(_)) if derived.value.is_some() && passed.is_none() => {
            Some("no expected value to compare against".to_string())
        }
        (None, Some(_)) => None,
    };
    if passed == Some(false) {
        tracing::warn!(summary = derived.name, value = ?derived.value, "summary out of bounds");
    }
    SummaryCheck {
        name: derived.name.to_string(),
        value: derived.value,
        expected: derived.expected,
        bound,
        passed,
        note,
    }
}
