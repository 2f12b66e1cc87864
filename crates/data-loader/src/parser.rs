//! Parser for catalog files.
//!
//! One movie per line, fields separated by `::`:
//!
//! ```text
//! title::genres::rating::runtime::year::votes::language
//! ```
//!
//! - `genres` may be pipe- or comma-separated and may still carry list
//!   punctuation from an upstream export (`['Action', 'Drama']`)
//! - `year` is either a bare year or an ISO date (`2010-07-16`)
//! - empty fields and the literal `nan` mean "missing"
//! - blank lines and lines starting with `#` are skipped
//!
//! Rust concepts you'll learn here:
//! - String parsing and splitting
//! - Error handling with `?` operator
//! - Generic parsing through the `FromStr` trait

use crate::error::{DataLoadError, Result};
use std::collections::BTreeSet;
use std::path::Path;
use std::str::FromStr;

/// Field separator used by catalog files
pub const FIELD_SEPARATOR: &str = "::";

/// A parsed but not yet cleaned catalog line.
///
/// Numeric fields stay optional here; `Catalog::load_from_file` decides which
/// rows survive.
#[derive(Debug, Clone, PartialEq)]
pub struct RawMovieRow {
    /// 1-based line number in the source file
    pub line: usize,
    pub title: String,
    pub genres: BTreeSet<String>,
    pub rating: Option<f32>,
    pub runtime: Option<f32>,
    pub year: Option<u16>,
    pub votes: Option<f64>,
    pub language: Option<String>,
}

/// Read and parse a catalog file.
///
/// Invalid UTF-8 is replaced rather than rejected; exported catalogs are
/// frequently mixed-encoding.
pub fn parse_catalog(path: &Path) -> Result<Vec<RawMovieRow>> {
    let bytes = std::fs::read(path)?;
    let content = String::from_utf8_lossy(&bytes);
    let file = path
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    parse_catalog_str(&content, &file)
}

/// Parse catalog content already held in memory.
///
/// `file` is only used for error messages.
pub fn parse_catalog_str(content: &str, file: &str) -> Result<Vec<RawMovieRow>> {
    let mut rows = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        let line_no = idx + 1;
        let line_trimmed = line.trim();
        if line_trimmed.is_empty() || line_trimmed.starts_with('#') {
            continue;
        }
        rows.push(parse_line(line_trimmed, file, line_no)?);
    }

    Ok(rows)
}

fn parse_line(line: &str, file: &str, line_no: usize) -> Result<RawMovieRow> {
    let mut parts = line.split(FIELD_SEPARATOR).map(str::trim);

    let title = parts
        .next()
        .filter(|t| !t.is_empty() && !is_missing(t))
        .ok_or_else(|| DataLoadError::ParseError {
            file: file.to_string(),
            line: line_no,
            reason: "Missing title".to_string(),
        })?;

    // Trailing fields may be absent entirely; treat them like empty fields
    let genres = parts.next().map(clean_genres).unwrap_or_default();
    let rating = parse_optional::<f32>(parts.next(), "rating", file, line_no)?;
    let runtime = parse_optional::<f32>(parts.next(), "runtime", file, line_no)?;
    let year = parse_year(parts.next(), file, line_no)?;
    let votes = parse_optional::<f64>(parts.next(), "votes", file, line_no)?;
    let language = parts
        .next()
        .filter(|l| !l.is_empty() && !is_missing(l))
        .map(str::to_string);

    if let Some(v) = votes {
        if v < 0.0 {
            return Err(DataLoadError::ParseError {
                file: file.to_string(),
                line: line_no,
                reason: format!("Negative votes: {}", v),
            });
        }
    }

    Ok(RawMovieRow {
        line: line_no,
        title: title.to_string(),
        genres,
        rating,
        runtime,
        year,
        votes,
        language,
    })
}

/// `true` for the textual null marker that upstream exports produce
fn is_missing(s: &str) -> bool {
    s.eq_ignore_ascii_case("nan")
}

/// Parse an optional numeric field
///
/// - `None`, `""` and `"nan"` -> `Ok(None)`
/// - anything else must parse as `T` and be finite
fn parse_optional<T>(field: Option<&str>, name: &str, file: &str, line: usize) -> Result<Option<T>>
where
    T: FromStr + Into<f64> + Copy,
    T::Err: std::fmt::Display,
{
    let raw = match field {
        Some(s) if !s.is_empty() && !is_missing(s) => s,
        _ => return Ok(None),
    };

    let value: T = raw.parse().map_err(|e| DataLoadError::ParseError {
        file: file.to_string(),
        line,
        reason: format!("Invalid {}: {}", name, e),
    })?;

    if !value.into().is_finite() {
        return Err(DataLoadError::ParseError {
            file: file.to_string(),
            line,
            reason: format!("Invalid {}: {}", name, raw),
        });
    }
    Ok(Some(value))
}

/// Extract a release year from a bare year or an ISO date
///
/// Example: "2010" -> Some(2010)
///          "2010-07-16" -> Some(2010)
///          "" -> None
fn parse_year(field: Option<&str>, file: &str, line: usize) -> Result<Option<u16>> {
    let raw = match field {
        Some(s) if !s.is_empty() && !is_missing(s) => s,
        _ => return Ok(None),
    };

    let year_part = raw.split('-').next().unwrap_or(raw);
    // Exports sometimes write the year as a float ("2010.0")
    let year_part = year_part.split('.').next().unwrap_or(year_part);

    let year: u16 = year_part.parse().map_err(|e| DataLoadError::ParseError {
        file: file.to_string(),
        line,
        reason: format!("Invalid year '{}': {}", raw, e),
    })?;

    Ok((year > 0).then_some(year))
}

/// Clean a raw genre field into a set of tokens
///
/// Example: "['Action', 'Drama']" -> {"Action", "Drama"}
///          "Action|Sci-Fi"       -> {"Action", "Sci-Fi"}
///          "nan"                 -> {}
pub fn clean_genres(s: &str) -> BTreeSet<String> {
    s.chars()
        .filter(|c| !matches!(c, '[' | ']' | '\'' | '"'))
        .collect::<String>()
        .split([',', '|'])
        .map(|g| g.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|g| !g.is_empty() && !is_missing(g))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_genres_strips_list_punctuation() {
        let genres = clean_genres("['Action', 'Science  Fiction']");
        let expected: BTreeSet<String> = ["Action", "Science Fiction"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(genres, expected);
    }

    #[test]
    fn test_clean_genres_drops_nan_and_empty() {
        assert!(clean_genres("nan").is_empty());
        assert!(clean_genres("").is_empty());
        assert_eq!(clean_genres("Drama|NaN||Crime").len(), 2);
    }

    #[test]
    fn test_parse_full_line() {
        let rows = parse_catalog_str(
            "Inception::Action|Sci-Fi::8.8::148::2010-07-16::2400000::en\n",
            "test.dat",
        )
        .unwrap();

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.title, "Inception");
        assert_eq!(row.genres.len(), 2);
        assert_eq!(row.rating, Some(8.8));
        assert_eq!(row.runtime, Some(148.0));
        assert_eq!(row.year, Some(2010));
        assert_eq!(row.votes, Some(2_400_000.0));
        assert_eq!(row.language.as_deref(), Some("en"));
    }

    #[test]
    fn test_missing_fields_are_none() {
        let rows = parse_catalog_str("Untitled::nan::::nan\n", "test.dat").unwrap();
        let row = &rows[0];
        assert!(row.genres.is_empty());
        assert_eq!(row.rating, None);
        assert_eq!(row.runtime, None);
        assert_eq!(row.year, None);
        assert_eq!(row.votes, None);
        assert_eq!(row.language, None);
    }

    #[test]
    fn test_skips_comments_and_blank_lines() {
        let content = "# title::genres::rating\n\nA::Drama::7.0::100\n";
        let rows = parse_catalog_str(content, "test.dat").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].line, 3);
    }

    #[test]
    fn test_bad_number_reports_line() {
        let err = parse_catalog_str("A::Drama::seven::100\n", "test.dat").unwrap_err();
        match err {
            DataLoadError::ParseError { file, line, .. } => {
                assert_eq!(file, "test.dat");
                assert_eq!(line, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_title_is_an_error() {
        assert!(parse_catalog_str("::Drama::7.0::100\n", "test.dat").is_err());
    }

    #[test]
    fn test_float_year() {
        let rows = parse_catalog_str("A::Drama::7.0::100::1999.0\n", "test.dat").unwrap();
        assert_eq!(rows[0].year, Some(1999));
    }
}
