//! Batch render manifest declaration and parsing.
//!
//! # Responsibility
//! - Define the per-item render request record and its batch-level defaults.
//! - Parse manifests from JSON arrays or delimited tables with a header row.
//!
//! # Invariants
//! - `query` and `output` are mandatory on every item.
//! - Optional fields stay `None` through parsing; defaults are applied at
//!   consumption time via [`ManifestItem::effective`] and
//!   [`ManifestItem::effective_resolve`], never at parse time.

use crate::resolve::{MatchMode, ResolveOptions};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Output encoding for one rendered icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Svg,
    Png,
}

impl OutputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Png => "png",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "svg" => Some(Self::Svg),
            "png" => Some(Self::Png),
            _ => None,
        }
    }
}

/// One render request inside a batch manifest.
///
/// Every field other than `query` and `output` is optional and falls back to
/// the batch-level [`RenderDefaults`] (render fields) or the batch-level
/// [`ResolveOptions`] (resolution fields) when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestItem {
    /// Human query or full `prefix:name` identifier.
    pub query: String,
    /// Destination path for the rendered asset.
    pub output: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<OutputFormat>,
    /// Require this item's query to be a full identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exact: Option<bool>,
    /// Minimum score override for this item.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_score: Option<f64>,
    /// Preferred-collection override for this item.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefer: Option<Vec<String>>,
    /// Collection allow-set override for this item.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collections: Option<Vec<String>>,
}

impl ManifestItem {
    pub fn new(query: impl Into<String>, output: impl Into<PathBuf>) -> Self {
        Self {
            query: query.into(),
            output: output.into(),
            size: None,
            color: None,
            format: None,
            exact: None,
            min_score: None,
            prefer: None,
            collections: None,
        }
    }

    /// Merges this item with batch defaults into concrete render options.
    pub fn effective(&self, defaults: &RenderDefaults) -> EffectiveRenderOptions {
        EffectiveRenderOptions {
            size: self.size.unwrap_or(defaults.size),
            color: self.color.clone().or_else(|| defaults.color.clone()),
            format: self.format.unwrap_or(defaults.format),
        }
    }

    /// Merges this item's resolution overrides over the batch-level options.
    ///
    /// Fields the item leaves unset keep the batch value; a set field
    /// replaces it wholesale rather than being combined.
    pub fn effective_resolve(&self, base: &ResolveOptions) -> ResolveOptions {
        let mut opts = base.clone();
        if let Some(exact) = self.exact {
            opts.match_mode = if exact {
                MatchMode::Exact
            } else {
                MatchMode::Fuzzy
            };
        }
        if let Some(min_score) = self.min_score {
            opts.min_score = min_score;
        }
        if let Some(prefer) = &self.prefer {
            opts.preferred_prefixes = prefer.clone();
        }
        if let Some(collections) = &self.collections {
            opts.allowed_prefixes = Some(collections.iter().cloned().collect());
        }
        opts
    }
}

/// Batch-level fallbacks for optional manifest fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderDefaults {
    pub size: u32,
    pub color: Option<String>,
    pub format: OutputFormat,
}

impl Default for RenderDefaults {
    fn default() -> Self {
        Self {
            size: 128,
            color: None,
            format: OutputFormat::Svg,
        }
    }
}

/// Fully resolved render options for one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveRenderOptions {
    pub size: u32,
    pub color: Option<String>,
    pub format: OutputFormat,
}

/// Manifest parse error with enough context to point at the bad record.
#[derive(Debug)]
pub enum ManifestError {
    /// The JSON form failed to deserialize.
    Json(serde_json::Error),
    /// The tabular header row is missing a mandatory column.
    MissingColumn(&'static str),
    /// A tabular row is missing a mandatory value. Line numbers are 1-based.
    MissingValue { line: usize, field: &'static str },
    /// A tabular cell holds a value that does not parse for its column.
    InvalidValue {
        line: usize,
        field: &'static str,
        value: String,
    },
    /// The manifest has no items at all.
    Empty,
}

impl Display for ManifestError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "manifest JSON is invalid: {err}"),
            Self::MissingColumn(field) => {
                write!(f, "manifest header is missing the `{field}` column")
            }
            Self::MissingValue { line, field } => {
                write!(f, "manifest line {line} is missing a `{field}` value")
            }
            Self::InvalidValue { line, field, value } => {
                write!(f, "manifest line {line} has invalid `{field}` value `{value}`")
            }
            Self::Empty => write!(f, "manifest contains no items"),
        }
    }
}

impl Error for ManifestError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ManifestError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Parses a manifest from raw text.
///
/// A document starting with `[` is treated as a JSON array of items; anything
/// else is treated as a delimited table whose first non-empty line is the
/// header. The delimiter is a tab when the header contains one, else a comma.
/// Unknown columns are ignored; empty optional cells stay `None`. List cells
/// (`prefer`, `collections`) hold whitespace-separated prefixes.
pub fn parse_manifest(text: &str) -> Result<Vec<ManifestItem>, ManifestError> {
    let trimmed = text.trim_start();
    let items = if trimmed.starts_with('[') {
        serde_json::from_str::<Vec<ManifestItem>>(trimmed)?
    } else {
        parse_tabular(text)?
    };

    if items.is_empty() {
        return Err(ManifestError::Empty);
    }
    Ok(items)
}

fn parse_tabular(text: &str) -> Result<Vec<ManifestItem>, ManifestError> {
    let mut lines = text
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty());

    let Some((_, header)) = lines.next() else {
        return Err(ManifestError::Empty);
    };
    let delimiter = if header.contains('\t') { '\t' } else { ',' };
    let columns: Vec<String> = header
        .split(delimiter)
        .map(|cell| cell.trim().to_ascii_lowercase())
        .collect();

    let query_col = column_index(&columns, "query")?;
    let output_col = column_index(&columns, "output")?;
    let size_col = columns.iter().position(|c| c == "size");
    let color_col = columns.iter().position(|c| c == "color");
    let format_col = columns.iter().position(|c| c == "format");
    let exact_col = columns.iter().position(|c| c == "exact");
    let min_score_col = columns.iter().position(|c| c == "min_score");
    let prefer_col = columns.iter().position(|c| c == "prefer");
    let collections_col = columns.iter().position(|c| c == "collections");

    let mut items = Vec::new();
    for (index, line) in lines {
        let line_no = index + 1;
        let cells: Vec<&str> = line.split(delimiter).map(str::trim).collect();

        let query = required_cell(&cells, query_col, line_no, "query")?;
        let output = required_cell(&cells, output_col, line_no, "output")?;

        let size = match optional_cell(&cells, size_col) {
            Some(raw) => Some(raw.parse::<u32>().map_err(|_| ManifestError::InvalidValue {
                line: line_no,
                field: "size",
                value: raw.to_string(),
            })?),
            None => None,
        };
        let format = match optional_cell(&cells, format_col) {
            Some(raw) => Some(OutputFormat::parse(raw).ok_or(ManifestError::InvalidValue {
                line: line_no,
                field: "format",
                value: raw.to_string(),
            })?),
            None => None,
        };
        let exact = match optional_cell(&cells, exact_col) {
            Some(raw) => Some(parse_bool(raw).ok_or(ManifestError::InvalidValue {
                line: line_no,
                field: "exact",
                value: raw.to_string(),
            })?),
            None => None,
        };
        let min_score = match optional_cell(&cells, min_score_col) {
            Some(raw) => Some(raw.parse::<f64>().map_err(|_| ManifestError::InvalidValue {
                line: line_no,
                field: "min_score",
                value: raw.to_string(),
            })?),
            None => None,
        };

        items.push(ManifestItem {
            query: query.to_string(),
            output: PathBuf::from(output),
            size,
            color: optional_cell(&cells, color_col).map(str::to_string),
            format,
            exact,
            min_score,
            prefer: optional_cell(&cells, prefer_col).map(split_list),
            collections: optional_cell(&cells, collections_col).map(split_list),
        });
    }

    Ok(items)
}

fn column_index(columns: &[String], field: &'static str) -> Result<usize, ManifestError> {
    columns
        .iter()
        .position(|c| c == field)
        .ok_or(ManifestError::MissingColumn(field))
}

fn required_cell<'a>(
    cells: &[&'a str],
    index: usize,
    line: usize,
    field: &'static str,
) -> Result<&'a str, ManifestError> {
    match cells.get(index) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ManifestError::MissingValue { line, field }),
    }
}

fn optional_cell<'a>(cells: &[&'a str], index: Option<usize>) -> Option<&'a str> {
    let value = *cells.get(index?)?;
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

fn split_list(value: &str) -> Vec<String> {
    value.split_whitespace().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::{parse_manifest, ManifestError, ManifestItem, OutputFormat, RenderDefaults};
    use crate::resolve::{MatchMode, ResolveOptions};
    use std::path::PathBuf;

    #[test]
    fn effective_options_fall_back_per_field() {
        let defaults = RenderDefaults {
            size: 64,
            color: Some("#333".to_string()),
            format: OutputFormat::Svg,
        };

        let mut item = ManifestItem::new("home", "out/home.svg");
        let merged = item.effective(&defaults);
        assert_eq!(merged.size, 64);
        assert_eq!(merged.color.as_deref(), Some("#333"));
        assert_eq!(merged.format, OutputFormat::Svg);

        item.size = Some(256);
        item.format = Some(OutputFormat::Png);
        let merged = item.effective(&defaults);
        assert_eq!(merged.size, 256);
        assert_eq!(merged.color.as_deref(), Some("#333"));
        assert_eq!(merged.format, OutputFormat::Png);
    }

    #[test]
    fn resolution_overrides_replace_base_options_per_field() {
        let base = ResolveOptions {
            preferred_prefixes: vec!["mdi".to_string()],
            ..ResolveOptions::default()
        };

        let mut item = ManifestItem::new("home", "out/home.svg");
        let merged = item.effective_resolve(&base);
        assert_eq!(merged.match_mode, MatchMode::Fuzzy);
        assert_eq!(merged.preferred_prefixes, vec!["mdi"]);
        assert_eq!(merged.min_score, base.min_score);
        assert!(merged.allowed_prefixes.is_none());

        item.exact = Some(true);
        item.min_score = Some(0.9);
        item.prefer = Some(vec!["emoji".to_string()]);
        item.collections = Some(vec!["emoji".to_string()]);
        let merged = item.effective_resolve(&base);
        assert_eq!(merged.match_mode, MatchMode::Exact);
        assert_eq!(merged.min_score, 0.9);
        assert_eq!(merged.preferred_prefixes, vec!["emoji"]);
        let allowed = merged.allowed_prefixes.expect("allow-set should be set");
        assert!(allowed.contains("emoji"));
        assert!(!allowed.contains("mdi"));
    }

    #[test]
    fn parses_json_array_form() {
        let text = r#"[
            {"query": "mdi:home", "output": "out/home.svg"},
            {"query": "bacon", "output": "out/bacon.svg", "size": 48}
        ]"#;
        let items = parse_manifest(text).expect("JSON manifest should parse");
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].query, "mdi:home");
        assert_eq!(items[0].size, None);
        assert_eq!(items[1].size, Some(48));
    }

    #[test]
    fn parses_tabular_form_with_comma_delimiter() {
        let text = "query,output,size\nmdi:home,out/home.svg,32\nbacon,out/bacon.svg,\n";
        let items = parse_manifest(text).expect("tabular manifest should parse");
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].size, Some(32));
        assert_eq!(items[1].size, None);
        assert_eq!(items[1].output, PathBuf::from("out/bacon.svg"));
    }

    #[test]
    fn parses_tabular_form_with_tab_delimiter_and_ignores_unknown_columns() {
        let text = "query\toutput\tnotes\nmdi:home\tout/home.svg\tanything\n";
        let items = parse_manifest(text).expect("tab manifest should parse");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].query, "mdi:home");
    }

    #[test]
    fn rejects_missing_mandatory_column_and_values() {
        let missing_column = parse_manifest("query,size\nhome,12\n");
        assert!(matches!(
            missing_column,
            Err(ManifestError::MissingColumn("output"))
        ));

        let missing_value = parse_manifest("query,output\nhome,\n");
        assert!(matches!(
            missing_value,
            Err(ManifestError::MissingValue { field: "output", .. })
        ));
    }

    #[test]
    fn parses_tabular_resolution_override_columns() {
        let text = "query,output,exact,min_score,collections\n\
                    mdi:home,out/home.svg,true,0.75,emoji mdi\n\
                    bacon,out/bacon.svg,,,\n";
        let items = parse_manifest(text).expect("tabular manifest should parse");
        assert_eq!(items[0].exact, Some(true));
        assert_eq!(items[0].min_score, Some(0.75));
        assert_eq!(
            items[0].collections,
            Some(vec!["emoji".to_string(), "mdi".to_string()])
        );
        assert_eq!(items[1].exact, None);
        assert_eq!(items[1].min_score, None);
        assert_eq!(items[1].collections, None);
    }

    #[test]
    fn rejects_unparseable_optional_cell() {
        let result = parse_manifest("query,output,size\nhome,out.svg,huge\n");
        assert!(matches!(
            result,
            Err(ManifestError::InvalidValue { field: "size", .. })
        ));

        let result = parse_manifest("query,output,exact\nhome,out.svg,maybe\n");
        assert!(matches!(
            result,
            Err(ManifestError::InvalidValue { field: "exact", .. })
        ));

        let result = parse_manifest("query,output,min_score\nhome,out.svg,hot\n");
        assert!(matches!(
            result,
            Err(ManifestError::InvalidValue { field: "min_score", .. })
        ));
    }

    #[test]
    fn rejects_empty_manifest() {
        assert!(matches!(parse_manifest("[]"), Err(ManifestError::Empty)));
        assert!(matches!(parse_manifest("   \n"), Err(ManifestError::Empty)));
    }
}
