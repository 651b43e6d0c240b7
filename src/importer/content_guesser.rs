// ==========================================
// Fiber-splice billing - content guesser
// ==========================================
// Stage 4: statistical column matching for canonical fields the alias
// resolver left unfilled. Each field has a pure scoring function
// (column cells -> Option<score>); a shared argmax-above-threshold
// combinator picks the winner. All thresholds and weights live in the
// constants below so they can be tuned and tested in one place.
// ==========================================

use crate::domain::{CanonicalField, CellValue};
use std::collections::HashSet;

// ===== Thresholds / weights =====

/// Minimum vocabulary-hit fraction for a column to become `type`
/// (strictly greater than).
const TYPE_MIN_VOCAB_FRACTION: f64 = 0.25;
/// Columns with fewer numeric cells than this fraction are not
/// `splices` candidates.
const SPLICES_MIN_NUMERIC_FRACTION: f64 = 0.4;
/// Median splice counts at or below this earn the plausibility bonus.
const SPLICES_MEDIAN_LIMIT: f64 = 300.0;
const SPLICES_MEDIAN_BONUS: f64 = 1.0;
/// Minimum identifier-shaped fraction for a column to become `device`
/// (at least).
const DEVICE_MIN_SCORE: f64 = 0.25;
const MAP_COMMA_WEIGHT: f64 = 1.5;
const MAP_LENGTH_DIVISOR: f64 = 80.0;

/// Work-record type vocabulary (case-folded).
const TYPE_VOCAB: [&str; 5] = ["splice", "test", "placement", "service", "splicing"];

/// Guess order; `created_date` and `splicer` have no content signature
/// and are only ever filled by alias matching.
const GUESS_ORDER: [CanonicalField; 4] = [
    CanonicalField::Type,
    CanonicalField::Splices,
    CanonicalField::Device,
    CanonicalField::Map,
];

/// How a winning score qualifies for assignment.
enum Threshold {
    /// Best candidate always assigned.
    None,
    /// score > limit
    Above(f64),
    /// score >= limit
    AtLeast(f64),
}

impl Threshold {
    fn accepts(&self, score: f64) -> bool {
        match self {
            Threshold::None => true,
            Threshold::Above(limit) => score > *limit,
            Threshold::AtLeast(limit) => score >= *limit,
        }
    }
}

/// Fill canonical fields the alias resolver missed by scoring the
/// still-unmapped columns. `assignment` holds one entry per column;
/// `columns` is the column-major cell view of the sheet's data rows.
/// A column assigned here leaves the candidate pool for later fields
/// in the same pass.
pub fn guess_missing(assignment: &mut [Option<CanonicalField>], columns: &[Vec<CellValue>]) {
    if columns.is_empty() || columns.iter().all(|c| c.is_empty()) {
        return;
    }

    for field in GUESS_ORDER {
        if assignment.iter().any(|a| *a == Some(field)) {
            continue;
        }

        let candidates: Vec<usize> = (0..columns.len())
            .filter(|i| assignment[*i].is_none())
            .collect();

        let (score_fn, threshold): (fn(&[CellValue]) -> Option<f64>, Threshold) = match field {
            CanonicalField::Type => (score_type, Threshold::Above(TYPE_MIN_VOCAB_FRACTION)),
            CanonicalField::Splices => (score_splices, Threshold::None),
            CanonicalField::Device => (score_device, Threshold::AtLeast(DEVICE_MIN_SCORE)),
            CanonicalField::Map => (score_map, Threshold::None),
            _ => unreachable!("no content signature for {field}"),
        };

        if let Some(winner) = pick_best(&candidates, columns, score_fn, threshold) {
            assignment[winner] = Some(field);
        }
    }
}

/// Argmax combinator shared by all guessers: highest score wins, ties
/// resolved by first column in original order, winner kept only when
/// the threshold accepts it. A scoring function returns None to skip
/// a column entirely.
fn pick_best(
    candidates: &[usize],
    columns: &[Vec<CellValue>],
    score_fn: fn(&[CellValue]) -> Option<f64>,
    threshold: Threshold,
) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for &index in candidates {
        if let Some(score) = score_fn(&columns[index]) {
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((index, score));
            }
        }
    }
    best.filter(|(_, score)| threshold.accepts(*score))
        .map(|(index, _)| index)
}

// ===== Per-field scoring =====

/// Fraction of cells whose case-folded, trimmed text is in the work
/// type vocabulary.
fn score_type(cells: &[CellValue]) -> Option<f64> {
    if cells.is_empty() {
        return None;
    }
    let hits = cells
        .iter()
        .filter(|c| {
            let text = c.as_text();
            TYPE_VOCAB.contains(&text.trim().to_lowercase().as_str())
        })
        .count();
    Some(hits as f64 / cells.len() as f64)
}

/// Whole-integer fraction of the parsed values, plus a bonus when the
/// median is a plausible splice count. Columns that are mostly
/// non-numeric are skipped.
fn score_splices(cells: &[CellValue]) -> Option<f64> {
    if cells.is_empty() {
        return None;
    }
    let parsed: Vec<f64> = cells.iter().filter_map(CellValue::as_f64).collect();
    let numeric_fraction = parsed.len() as f64 / cells.len() as f64;
    if numeric_fraction < SPLICES_MIN_NUMERIC_FRACTION {
        return None;
    }

    let integer_fraction =
        parsed.iter().filter(|v| v.fract() == 0.0).count() as f64 / parsed.len() as f64;
    let bonus = if median(&parsed) <= SPLICES_MEDIAN_LIMIT {
        SPLICES_MEDIAN_BONUS
    } else {
        0.0
    };
    Some(integer_fraction + bonus)
}

/// Fraction of cells shaped like an equipment identifier: starts with
/// an alphanumeric, length >= 4, only alphanumerics/-_/. and spaces,
/// not purely numeric. Constant columns are skipped.
fn score_device(cells: &[CellValue]) -> Option<f64> {
    if cells.is_empty() || cardinality(cells) <= 1 {
        return None;
    }
    let hits = cells
        .iter()
        .filter(|c| is_device_like(c.as_text().trim()))
        .count();
    Some(hits as f64 / cells.len() as f64)
}

fn is_device_like(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphanumeric() => {}
        _ => return false,
    }
    if text.chars().count() < 4 {
        return false;
    }
    if !text
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '/' | '.') || c.is_whitespace())
    {
        return false;
    }
    // Purely numeric strings are counts or ids of something else.
    !text.chars().all(|c| c.is_ascii_digit())
}

/// Weighted comma frequency plus median text length: map columns hold
/// long, comma-separated street descriptions. Constant columns are
/// skipped; otherwise the best candidate is always assigned.
fn score_map(cells: &[CellValue]) -> Option<f64> {
    if cells.is_empty() || cardinality(cells) <= 1 {
        return None;
    }
    let texts: Vec<String> = cells.iter().map(CellValue::as_text).collect();
    let comma_fraction =
        texts.iter().filter(|t| t.contains(',')).count() as f64 / texts.len() as f64;
    let lengths: Vec<f64> = texts.iter().map(|t| t.chars().count() as f64).collect();
    Some(MAP_COMMA_WEIGHT * comma_fraction + median(&lengths) / MAP_LENGTH_DIVISOR)
}

// ===== Column statistics =====

/// Distinct display values in a column; all empty cells collapse into
/// one distinct "empty" value.
fn cardinality(cells: &[CellValue]) -> usize {
    let mut distinct: HashSet<String> = HashSet::new();
    for cell in cells {
        distinct.insert(cell.as_text());
    }
    distinct.len()
}

fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_col(values: &[&str]) -> Vec<CellValue> {
        values
            .iter()
            .map(|v| {
                if v.is_empty() {
                    CellValue::Empty
                } else {
                    CellValue::Text(v.to_string())
                }
            })
            .collect()
    }

    fn num_col(values: &[f64]) -> Vec<CellValue> {
        values.iter().map(|v| CellValue::Number(*v)).collect()
    }

    #[test]
    fn test_score_type_vocabulary_fraction() {
        let col = text_col(&["Splice", "test", "other", "SPLICING"]);
        assert_eq!(score_type(&col), Some(0.75));
    }

    #[test]
    fn test_score_splices_skips_non_numeric_columns() {
        let col = text_col(&["a", "b", "c", "10"]);
        assert!(score_splices(&col).is_none()); // 25% numeric < 40%
    }

    #[test]
    fn test_score_splices_integer_and_median_bonus() {
        let col = num_col(&[10.0, 20.0, 0.0]);
        // all integers (1.0) + median 10 <= 300 bonus (1.0)
        assert_eq!(score_splices(&col), Some(2.0));

        let big = num_col(&[400.0, 500.0, 600.0]);
        assert_eq!(score_splices(&big), Some(1.0)); // no bonus
    }

    #[test]
    fn test_score_device_identifier_shapes() {
        let col = text_col(&["ONT-123", "OLT/4.2", "ab", "12345"]);
        // "ab" too short, "12345" purely numeric
        assert_eq!(score_device(&col), Some(0.5));
    }

    #[test]
    fn test_score_device_skips_constant_columns() {
        let col = text_col(&["SAME", "SAME", "SAME"]);
        assert!(score_device(&col).is_none());
    }

    #[test]
    fn test_score_map_prefers_long_comma_text() {
        let streets = text_col(&["Rua A, Rua B", "Av. C, Tv. D"]);
        let codes = text_col(&["X1", "X2"]);
        let s_streets = score_map(&streets).unwrap();
        let s_codes = score_map(&codes).unwrap();
        assert!(s_streets > s_codes);
    }

    #[test]
    fn test_pick_best_first_wins_ties() {
        let columns = vec![num_col(&[1.0, 2.0]), num_col(&[3.0, 4.0])];
        let winner = pick_best(&[0, 1], &columns, score_splices, Threshold::None);
        assert_eq!(winner, Some(0));
    }

    #[test]
    fn test_guess_assignment_removes_column_from_pool() {
        // One numeric column: claimed by splices, so map must pick the
        // remaining text column even though the numbers scored too.
        let columns = vec![
            num_col(&[10.0, 20.0, 30.0]),
            text_col(&["Rua A, Rua B", "Rua C, Rua D", "Rua E"]),
        ];
        let mut assignment = vec![None, None];
        guess_missing(&mut assignment, &columns);
        assert_eq!(assignment[0], Some(CanonicalField::Splices));
        assert_eq!(assignment[1], Some(CanonicalField::Map));
    }

    #[test]
    fn test_guess_below_threshold_assigns_nothing() {
        // No vocabulary hits, nothing numeric, constant device column:
        // type and device stay unassigned.
        let columns = vec![text_col(&["foo", "bar", "baz"])];
        let mut assignment = vec![None];
        guess_missing(&mut assignment, &columns);
        // map has no minimum threshold, so the lone varied text column
        // ends up as map; type/device/splices never fire.
        assert_eq!(assignment[0], Some(CanonicalField::Map));
    }

    #[test]
    fn test_median_even_and_odd() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&[4.0, 1.0, 2.0, 3.0]), 2.5);
        assert_eq!(median(&[]), 0.0);
    }
}
