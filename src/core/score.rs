//! Score coercion - turns arbitrary roster cells into bounded, rounded scores
//!
//! Roster sheets are typed by hand, so score cells hold anything from clean
//! numbers to "-", "N/A" or "80 pts". Every cell goes through
//! [`process_score_value`], which never fails: anything unusable becomes the
//! configured default.

use crate::types::{cell_at, CellValue};
use serde::{Deserialize, Serialize};

/// Text values treated the same as an empty cell
const BLANK_MARKERS: [&str; 4] = ["", "-", "N/A", "NA"];

/// Options for [`process_score_value`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreOptions {
    /// Used for blank and unparsable cells (default 0)
    pub default_value: f64,
    /// Lower clamp bound (default 0)
    pub min_value: f64,
    /// Upper clamp bound (default 100)
    pub max_value: f64,
    /// Rounding precision (default 2)
    pub decimal_places: u32,
    /// When false, negative scores are replaced by the default (default false)
    pub allow_negative: bool,
}

impl Default for ScoreOptions {
    fn default() -> Self {
        Self {
            default_value: 0.0,
            min_value: 0.0,
            max_value: 100.0,
            decimal_places: 2,
            allow_negative: false,
        }
    }
}

/// Coerce a single cell into a score.
///
/// Pipeline: blank check → numeric parse → half-up rounding → negative
/// replacement → clamp into `[min_value, max_value]`.
pub fn process_score_value(value: &CellValue, options: &ScoreOptions) -> f64 {
    let raw = match value {
        CellValue::Empty => return options.default_value,
        CellValue::Number(n) => {
            if !n.is_finite() {
                return options.default_value;
            }
            *n
        }
        CellValue::Text(s) => {
            let trimmed = s.trim();
            if BLANK_MARKERS.contains(&trimmed) {
                return options.default_value;
            }
            match parse_leading_float(trimmed) {
                Some(n) => n,
                None => return options.default_value,
            }
        }
    };

    let mut score = round_half_up(raw, options.decimal_places);

    if !options.allow_negative && score < 0.0 {
        score = options.default_value;
    }

    score.max(options.min_value).min(options.max_value)
}

/// Coerce the inclusive column window `start..=end` of a row.
///
/// Cells past the end of a short row count as empty.
pub fn process_score_array(
    row: &[CellValue],
    start: usize,
    end: usize,
    options: &ScoreOptions,
) -> Vec<f64> {
    (start..=end)
        .map(|col| process_score_value(cell_at(row, col), options))
        .collect()
}

/// Round to `decimal_places`, halves toward positive infinity
pub fn round_half_up(value: f64, decimal_places: u32) -> f64 {
    let factor = 10f64.powi(decimal_places as i32);
    (value * factor + 0.5).floor() / factor
}

/// Parse the longest numeric prefix of `s` (sign, digits, fraction, exponent).
///
/// "80" → 80, "80.5abc" → 80.5, "-3e2" → -300, "abc" → None. Overflowing
/// exponents give ±infinity ("1e400"), which the caller clamps like any
/// other out-of-range value.
pub fn parse_leading_float(s: &str) -> Option<f64> {
    let bytes = s.trim_start().as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if digits > 0 || frac_end > frac_start {
            digits += frac_end - frac_start;
            end = frac_end;
        }
    }

    if digits == 0 {
        return None;
    }

    // Exponent only counts when followed by at least one digit
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    // The prefix is pure ASCII, so slicing on `end` is safe
    let prefix = std::str::from_utf8(&bytes[..end]).ok()?;
    prefix.parse::<f64>().ok()
}

//==============================================================================
// Diagnostics over produced scores
//==============================================================================

/// Result of [`validate_score_array`]. Errors are advisory only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreValidation {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

/// Report scores outside `[min_value, max_value]`
pub fn validate_score_array(scores: &[f64], min_value: f64, max_value: f64) -> ScoreValidation {
    let errors: Vec<String> = scores
        .iter()
        .enumerate()
        .filter(|(_, &score)| score < min_value || score > max_value)
        .map(|(idx, score)| {
            format!(
                "Score {} ({}) is outside valid range [{}-{}]",
                idx + 1,
                score,
                min_value,
                max_value
            )
        })
        .collect();

    ScoreValidation {
        is_valid: errors.is_empty(),
        errors,
    }
}

/// Format scores for display, dropping trailing zeros ("80.50" → "80.5")
pub fn format_scores_for_display(scores: &[f64], decimal_places: usize) -> Vec<String> {
    scores
        .iter()
        .map(|&score| {
            if score == 0.0 {
                return "0".to_string();
            }
            let fixed = format!("{:.*}", decimal_places, score);
            if fixed.contains('.') {
                fixed
                    .trim_end_matches('0')
                    .trim_end_matches('.')
                    .to_string()
            } else {
                fixed
            }
        })
        .collect()
}

/// Summary statistics over a score list
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreStatistics {
    pub min: f64,
    pub max: f64,
    pub average: f64,
    pub total: f64,
    /// Count of scores strictly greater than zero
    pub non_zero_count: usize,
}

pub fn calculate_score_statistics(scores: &[f64]) -> ScoreStatistics {
    if scores.is_empty() {
        return ScoreStatistics {
            min: 0.0,
            max: 0.0,
            average: 0.0,
            total: 0.0,
            non_zero_count: 0,
        };
    }

    let total: f64 = scores.iter().sum();
    ScoreStatistics {
        min: scores.iter().copied().fold(f64::INFINITY, f64::min),
        max: scores.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        average: total / scores.len() as f64,
        total,
        non_zero_count: scores.iter().filter(|&&s| s > 0.0).count(),
    }
}
