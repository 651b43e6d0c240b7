// ==========================================
// Fiber-splice billing - alias resolver
// ==========================================
// Stage 3: normalized header keys -> canonical fields via a static
// alias table (Portuguese + English spellings seen in field-team
// exports). Substring match, first-match-wins in table order, each
// canonical field claimed at most once per table.
// ==========================================

use crate::domain::CanonicalField;
use crate::importer::header_normalizer::normalize_label;
use std::collections::HashSet;

/// Known alternate spellings per canonical field, already in normalized
/// form (lower-cased, diacritics stripped). Iteration order is the
/// match priority.
pub const ALIAS_TABLE: &[(CanonicalField, &[&str])] = &[
    (CanonicalField::Type, &["type", "tipo", "category", "classe"]),
    (
        CanonicalField::Map,
        &["map", "mapa", "map name", "nome do mapa"],
    ),
    (
        CanonicalField::Splices,
        &[
            "splices",
            "splice",
            "fusoes",
            "fusao",
            "qtd fusoes",
            "splice count",
            "splice qty",
        ],
    ),
    (
        CanonicalField::Device,
        &["device", "dispositivo", "equipamento", "serial"],
    ),
    (
        CanonicalField::CreatedDate,
        &["created", "created_at", "data", "date", "created date"],
    ),
    (
        CanonicalField::Splicer,
        &["splicer", "tecnico", "technician"],
    ),
];

/// Resolve deduplicated headers to canonical fields. Returns one entry
/// per column: Some(field) when the column's normalized key matched an
/// alias and the field was still unclaimed, None otherwise (the column
/// is preserved, unmapped, for content guessing).
pub fn resolve_aliases(headers: &[String]) -> Vec<Option<CanonicalField>> {
    let mut claimed: HashSet<CanonicalField> = HashSet::new();

    headers
        .iter()
        .map(|header| {
            let key = normalize_label(header);
            if key.is_empty() {
                return None;
            }
            for (field, aliases) in ALIAS_TABLE {
                if aliases.iter().any(|alias| key.contains(alias)) {
                    // A later column must not clobber an already-good
                    // match; it stays unresolved instead.
                    return claimed.insert(*field).then_some(*field);
                }
            }
            None
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(labels: &[&str]) -> Vec<String> {
        labels.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_exact_and_substring_match() {
        let resolved = resolve_aliases(&headers(&["Tipo", "Qtd Fusões", "Nome do Mapa"]));
        assert_eq!(
            resolved,
            vec![
                Some(CanonicalField::Type),
                Some(CanonicalField::Splices),
                Some(CanonicalField::Map),
            ]
        );
    }

    #[test]
    fn test_bilingual_aliases() {
        let resolved = resolve_aliases(&headers(&[
            "Equipamento",
            "Técnico",
            "Created Date",
            "splice count",
        ]));
        assert_eq!(
            resolved,
            vec![
                Some(CanonicalField::Device),
                Some(CanonicalField::Splicer),
                Some(CanonicalField::CreatedDate),
                Some(CanonicalField::Splices),
            ]
        );
    }

    #[test]
    fn test_field_claimed_at_most_once() {
        // The second splices-like column must stay unresolved rather
        // than overwriting the first match.
        let resolved = resolve_aliases(&headers(&["Splices", "Splice Qty"]));
        assert_eq!(resolved, vec![Some(CanonicalField::Splices), None]);
    }

    #[test]
    fn test_unknown_headers_stay_unresolved() {
        let resolved = resolve_aliases(&headers(&["Observações", "Coluna X"]));
        assert_eq!(resolved, vec![None, None]);
    }

    #[test]
    fn test_table_order_is_match_priority() {
        // "tipo de dispositivo" contains both a type alias and a device
        // alias; type comes first in the table.
        let resolved = resolve_aliases(&headers(&["Tipo de Dispositivo"]));
        assert_eq!(resolved, vec![Some(CanonicalField::Type)]);
    }
}
