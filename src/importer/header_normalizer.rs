// ==========================================
// Fiber-splice billing - header normalizer
// ==========================================
// Stage 2: canonical comparison keys for column labels.
// normalize_label is pure and total; field teams mix Portuguese and
// English headers with inconsistent accents and spacing, so matching
// always happens on the normalized form.
// ==========================================

/// Canonical comparison key for a column label: trim, collapse internal
/// whitespace runs to a single space, lower-case, strip the fixed set of
/// Latin diacritics seen in field-team headers.
pub fn normalize_label(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .to_lowercase()
        .chars()
        .map(fold_diacritic)
        .collect()
}

fn fold_diacritic(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' => 'a',
        'é' | 'ê' => 'e',
        'í' | 'î' => 'i',
        'ó' | 'ô' | 'õ' => 'o',
        'ú' | 'û' => 'u',
        'ç' => 'c',
        other => other,
    }
}

/// Make repeated header labels unique before any further processing.
/// Scanning left to right, the first occurrence of a label (by original
/// string, pre-normalization) keeps it unchanged; the Nth repeat is
/// suffixed `_N` with N starting at 2.
pub fn dedup_headers(labels: &[String]) -> Vec<String> {
    let mut seen: std::collections::HashMap<&str, usize> = std::collections::HashMap::new();
    labels
        .iter()
        .map(|label| {
            let count = seen.entry(label.as_str()).or_insert(0);
            *count += 1;
            if *count == 1 {
                label.clone()
            } else {
                format!("{}_{}", label, count)
            }
        })
        .collect()
}
