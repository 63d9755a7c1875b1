//! Catalog loading and filename expansion.
//!
//! The catalog is a CSV sheet listing every piece with its base file name, the
//! number of versions stored for it, and whether it is played (in use). Only
//! in-use rows reach the booklet, in sheet order.
//!
//! ```text
//! JOUE,NOM_FICHIER,NBR_VERSIONS
//! 1,intro,1
//! 0,retired,1
//! 1,waltz,2        ──▶  waltz-1.pdf, waltz-2.pdf
//! ```

use crate::error::{BookletError, Result};
use crate::store::Store;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// One in-use catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRow {
    pub file_base_name: String,
    /// Number of stored versions. Validated by [`expand_filenames`].
    pub version_count: i64,
    pub in_use: bool,
}

impl CatalogRow {
    pub fn new(file_base_name: impl Into<String>, version_count: i64) -> Self {
        Self {
            file_base_name: file_base_name.into(),
            version_count,
            in_use: true,
        }
    }
}

/// Raw CSV record; every cell is kept as text until the row is known to be
/// in use.
#[derive(Debug, Deserialize)]
struct CatalogRecord {
    #[serde(rename = "JOUE", alias = "in_use", alias = "IN_USE")]
    in_use: String,
    #[serde(rename = "NOM_FICHIER", alias = "file_name", alias = "FILE_NAME")]
    file_name: String,
    #[serde(rename = "NBR_VERSIONS", alias = "version_count", alias = "VERSION_COUNT")]
    version_count: String,
}

/// Fetch the catalog at `key` from `store` and return its in-use rows.
pub fn load_catalog(store: &dyn Store, key: &str, delimiter: u8) -> Result<Vec<CatalogRow>> {
    let bytes = store.read(key)?;
    let rows = parse_catalog(&bytes, delimiter).map_err(|e| match e {
        BookletError::ResourceUnavailable { detail, .. } => {
            BookletError::unavailable(store.describe(key), detail)
        }
        other => other,
    })?;
    info!("Catalog {}: {} pieces in use", key, rows.len());
    Ok(rows)
}

/// Parse catalog CSV bytes and keep the in-use rows, in original order.
pub fn parse_catalog(bytes: &[u8], delimiter: u8) -> Result<Vec<CatalogRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let mut rows = Vec::new();
    for (line, record) in reader.deserialize::<CatalogRecord>().enumerate() {
        let record = record.map_err(|e| BookletError::unavailable("catalog", e))?;

        if !parse_flag(&record.in_use) {
            debug!("Catalog row {}: '{}' not in use", line + 1, record.file_name);
            continue;
        }

        let version_count = parse_version_count(&record.file_name, &record.version_count)?;
        rows.push(CatalogRow {
            file_base_name: record.file_name,
            version_count,
            in_use: true,
        });
    }
    Ok(rows)
}

/// `1`, `1.0`, `true` and `yes` mark a row as in use; everything else,
/// including an empty cell, does not.
fn parse_flag(raw: &str) -> bool {
    let raw = raw.trim();
    if let Ok(n) = raw.parse::<f64>() {
        return n == 1.0;
    }
    raw.eq_ignore_ascii_case("true") || raw.eq_ignore_ascii_case("yes")
}

/// Largest version count a catalog row may declare.
pub const MAX_VERSION_COUNT: i64 = u16::MAX as i64;

/// Accepts integral values up to [`MAX_VERSION_COUNT`], including
/// spreadsheet-style `2.0`.
fn parse_version_count(file_name: &str, raw: &str) -> Result<i64> {
    let invalid = || BookletError::InvalidVersionCount {
        file_name: file_name.to_string(),
        value: raw.to_string(),
    };
    let n = match raw.parse::<i64>() {
        Ok(n) => n,
        Err(_) => match raw.parse::<f64>() {
            Ok(f) if f.is_finite() && f.fract() == 0.0 && f.abs() <= MAX_VERSION_COUNT as f64 => {
                f as i64
            }
            _ => return Err(invalid()),
        },
    };
    if n > MAX_VERSION_COUNT {
        return Err(invalid());
    }
    Ok(n)
}

// ── Filename expansion ───────────────────────────────────────────────────

const PDF_EXTENSION: &str = ".pdf";

/// Expand a catalog row into the file names expected in the score folder.
///
/// * `version_count == 1` → `["{base}.pdf"]`
/// * `version_count == n > 1` → `["{base}-1.pdf", …, "{base}-n.pdf"]`
/// * `version_count <= 0` or above [`MAX_VERSION_COUNT`] →
///   [`BookletError::InvalidVersionCount`]
///
/// `.pdf` is appended only when the base name lacks it.
pub fn expand_filenames(row: &CatalogRow) -> Result<Vec<String>> {
    if row.version_count <= 0 || row.version_count > MAX_VERSION_COUNT {
        return Err(BookletError::InvalidVersionCount {
            file_name: row.file_base_name.clone(),
            value: row.version_count.to_string(),
        });
    }

    let base = &row.file_base_name;
    let stem = base.strip_suffix(PDF_EXTENSION).unwrap_or(base);

    if row.version_count == 1 {
        return Ok(vec![format!("{stem}{PDF_EXTENSION}")]);
    }

    Ok((1..=row.version_count)
        .map(|i| format!("{stem}-{i}{PDF_EXTENSION}"))
        .collect())
}

/// Expand every row, preserving catalog order.
pub fn expand_catalog(rows: &[CatalogRow]) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for row in rows {
        names.extend(expand_filenames(row)?);
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn single_version_appends_extension() {
        let names = expand_filenames(&CatalogRow::new("intro", 1)).unwrap();
        assert_eq!(names, vec!["intro.pdf"]);
    }

    #[test]
    fn single_version_is_idempotent_on_pdf_suffix() {
        let names = expand_filenames(&CatalogRow::new("intro.pdf", 1)).unwrap();
        assert_eq!(names, vec!["intro.pdf"]);
    }

    #[test]
    fn multi_version_numbers_from_one() {
        for n in 2..=6 {
            let names = expand_filenames(&CatalogRow::new("waltz", n)).unwrap();
            assert_eq!(names.len(), n as usize);
            for (i, name) in names.iter().enumerate() {
                assert_eq!(name, &format!("waltz-{}.pdf", i + 1));
            }
        }
    }

    #[test]
    fn multi_version_strips_existing_extension() {
        let names = expand_filenames(&CatalogRow::new("waltz.pdf", 2)).unwrap();
        assert_eq!(names, vec!["waltz-1.pdf", "waltz-2.pdf"]);
    }

    #[test]
    fn non_positive_version_count_is_rejected() {
        for n in [0, -1] {
            let err = expand_filenames(&CatalogRow::new("broken", n)).unwrap_err();
            assert!(matches!(err, BookletError::InvalidVersionCount { .. }));
        }
    }

    #[test]
    fn oversized_version_count_is_rejected() {
        let err = expand_filenames(&CatalogRow::new("huge", MAX_VERSION_COUNT + 1)).unwrap_err();
        assert!(matches!(err, BookletError::InvalidVersionCount { .. }));
        assert_eq!(
            expand_filenames(&CatalogRow::new("big", MAX_VERSION_COUNT))
                .unwrap()
                .len(),
            MAX_VERSION_COUNT as usize
        );

        for raw in ["1e12", "70000", "70000.0", "9223372036854775807"] {
            let csv = format!("JOUE,NOM_FICHIER,NBR_VERSIONS\n1,huge,{raw}\n");
            let err = parse_catalog(csv.as_bytes(), b',').unwrap_err();
            assert!(
                matches!(err, BookletError::InvalidVersionCount { ref value, .. } if value == raw),
                "{raw} accepted"
            );
        }
        let ok = "JOUE,NOM_FICHIER,NBR_VERSIONS\n1,waltz,3e0\n";
        assert_eq!(parse_catalog(ok.as_bytes(), b',').unwrap()[0].version_count, 3);
    }

    #[test]
    fn expand_catalog_preserves_order() {
        let rows = vec![CatalogRow::new("intro", 1), CatalogRow::new("waltz", 2)];
        assert_eq!(
            expand_catalog(&rows).unwrap(),
            vec!["intro.pdf", "waltz-1.pdf", "waltz-2.pdf"]
        );
    }

    #[test]
    fn parse_filters_in_use_rows() {
        let csv = "JOUE,NOM_FICHIER,NBR_VERSIONS,COMPOSITEUR\n\
                   1,intro,1,Anon\n\
                   0,retired,3,Anon\n\
                   1, waltz ,2.0,Strauss\n\
                   ,blank,1,\n";
        let rows = parse_catalog(csv.as_bytes(), b',').unwrap();
        assert_eq!(
            rows,
            vec![CatalogRow::new("intro", 1), CatalogRow::new("waltz", 2)]
        );
    }

    #[test]
    fn parse_accepts_aliases_and_delimiter() {
        let csv = "in_use;file_name;version_count\ntrue;march;1\nno;polka;1\n";
        let rows = parse_catalog(csv.as_bytes(), b';').unwrap();
        assert_eq!(rows, vec![CatalogRow::new("march", 1)]);
    }

    #[test]
    fn garbage_version_count_only_matters_when_in_use() {
        let ignored = "JOUE,NOM_FICHIER,NBR_VERSIONS\n0,old,abc\n1,new,1\n";
        assert_eq!(parse_catalog(ignored.as_bytes(), b',').unwrap().len(), 1);

        let fatal = "JOUE,NOM_FICHIER,NBR_VERSIONS\n1,old,1.5\n";
        let err = parse_catalog(fatal.as_bytes(), b',').unwrap_err();
        assert!(matches!(err, BookletError::InvalidVersionCount { ref value, .. } if value == "1.5"));
    }

    #[test]
    fn missing_column_is_unavailable() {
        let csv = "JOUE,NOM_FICHIER\n1,intro\n";
        let err = parse_catalog(csv.as_bytes(), b',').unwrap_err();
        assert!(matches!(err, BookletError::ResourceUnavailable { .. }));
    }

    #[test]
    fn load_reports_store_location() {
        let store = MemoryStore::new().with("liste.csv", "nonsense\n1\n");
        let err = load_catalog(&store, "liste.csv", b',').unwrap_err();
        assert!(err.to_string().contains("memory://liste.csv"), "got: {err}");

        let err = load_catalog(&MemoryStore::new(), "liste.csv", b',').unwrap_err();
        assert!(matches!(err, BookletError::ResourceUnavailable { .. }));
    }
}
