//! Three-tier threshold evaluation.
//!
//! A measurement is classified against `low`/`design`/`engineered` bounds
//! into a severity level. Batch evaluation accumulates warnings across
//! entities but stops at the first engineered-limit breach: such a breach is
//! urgent enough that the remaining non-urgent checks are not worth running.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::Thresholds;

// ============================================================
// Core types
// ============================================================

/// Alert severity. `Fatal > Warn > None`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertLevel {
    #[default]
    None,
    Warn,
    Fatal,
}

impl AlertLevel {
    /// Label used for logging and metric labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertLevel::None => "none",
            AlertLevel::Warn => "warn",
            AlertLevel::Fatal => "fatal",
        }
    }
}

/// Which threshold bound a measurement crossed.
///
/// A breach is the intended signal of the engine, carried as data in the
/// result; it is never surfaced as an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Breach {
    BelowLow,
    AboveDesign,
    AboveEngineered,
}

/// Outcome of evaluating one measurement or a batch of them.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct AlertResult {
    pub level: AlertLevel,
    /// Human-readable description; entity-tagged and `; `-joined for batches.
    /// Empty when nothing crossed a bound.
    pub message: String,
    /// True whenever any bound was crossed.
    pub flagged: bool,
    /// The most severe bound crossed, if any. For a batch this is the bound
    /// behind the reported `level`.
    pub cause: Option<Breach>,
}

// ============================================================
// Evaluation
// ============================================================

/// Classify a single measurement against its thresholds.
///
/// Precedence: below `low` → warn; above `engineered` → fatal; above
/// `design` → warn; otherwise none. Degenerate configurations (e.g.
/// `low > design`) are not rejected — the precedence order alone decides.
pub fn evaluate(value: f64, t: &Thresholds) -> AlertResult {
    if value < t.low {
        return AlertResult {
            level: AlertLevel::Warn,
            message: format!("{:.1} below low design point {:.1}", value, t.low),
            flagged: true,
            cause: Some(Breach::BelowLow),
        };
    }
    if value > t.engineered {
        return AlertResult {
            level: AlertLevel::Fatal,
            message: format!("{:.1} above engineered point {:.1}", value, t.engineered),
            flagged: true,
            cause: Some(Breach::AboveEngineered),
        };
    }
    if value > t.design {
        return AlertResult {
            level: AlertLevel::Warn,
            message: format!("{:.1} above design point {:.1}", value, t.design),
            flagged: true,
            cause: Some(Breach::AboveDesign),
        };
    }
    AlertResult::default()
}

/// Evaluate a batch of `(entity, value, thresholds)` entries.
///
/// Entries are checked in the order given — callers iterate sorted maps so
/// the scan order is deterministic. Non-fatal findings accumulate into one
/// entity-tagged message with the highest severity seen; the first fatal
/// finding short-circuits the batch and is returned alone, referencing only
/// the entity that breached.
pub fn evaluate_all<'a, I>(entries: I) -> AlertResult
where
    I: IntoIterator<Item = (&'a str, f64, &'a Thresholds)>,
{
    let mut level = AlertLevel::None;
    let mut cause = None;
    let mut clauses: Vec<String> = Vec::new();

    for (entity, value, thresholds) in entries {
        let result = evaluate(value, thresholds);
        if result.level == AlertLevel::Fatal {
            return AlertResult {
                level: AlertLevel::Fatal,
                message: format!("{}: {}", entity, result.message),
                flagged: true,
                cause: result.cause,
            };
        }
        if result.flagged {
            if result.level > level {
                level = result.level;
                cause = result.cause;
            }
            clauses.push(format!("{}: {}", entity, result.message));
        }
    }

    AlertResult {
        level,
        message: clauses.join("; "),
        flagged: !clauses.is_empty(),
        cause,
    }
}

/// Evaluate every entity that has both a value and configured thresholds.
///
/// Joins on entity id in sorted key order. Entities missing from either map
/// are silently skipped — an unconfigured entity is not an error.
pub fn evaluate_map(
    values: &BTreeMap<String, f64>,
    thresholds: &BTreeMap<String, Thresholds>,
) -> AlertResult {
    evaluate_all(values.iter().filter_map(|(entity, value)| {
        thresholds
            .get(entity)
            .map(|t| (entity.as_str(), *value, t))
    }))
}

// ============================================================
// Tests
// ============================================================
