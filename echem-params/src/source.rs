//! Sources that parameter values can be built from: in-memory mappings and parameter tables.
//!
//! # Parameter tables
//!
//! A parameter table is a comma-separated file with a header row. The header must contain a
//! `Name` column and a `Value` column; any other columns (units, references, notes) are ignored.
//! Lines starting with `#` are comments, and blank lines are skipped. Fields are trimmed of
//! surrounding whitespace.
//!
//! ```text
//! # Physical constants
//! Name,Value,Units,Description
//! R,8.314,J.mol-1.K-1,Ideal gas constant
//! F,96487,C.mol-1,Faraday constant
//! ```
//!
//! Values are parsed with Rust's correctly rounded float parser, so `8.314` in a table is the
//! exact same `f64` as the literal `8.314` in code. Values must be finite: `nan`, `inf` and
//! `infinity` are rejected.

use crate::{
    error::{DuplicateParameter, MalformedSource, SourceUnreadable},
    value::ParameterValue,
};
use echem_error::Error;
use indexmap::IndexMap;
use std::{collections::HashMap, fs, ops::Range, path::{Path, PathBuf}};
use tracing::debug;

/// The name of the column holding parameter names.
pub const NAME_COLUMN: &str = "Name";

/// The name of the column holding parameter values.
pub const VALUE_COLUMN: &str = "Value";

/// Something that parameter values can be loaded from.
#[derive(Debug, Clone)]
pub enum ParameterSource {
    /// Values given directly, in order. Later entries win over earlier entries with the same name.
    Map(Vec<(String, ParameterValue)>),

    /// A parameter table on disk.
    Path(PathBuf),
}

impl ParameterSource {
    /// Loads the name / value pairs described by this source.
    pub fn load(self) -> Result<Vec<(String, ParameterValue)>, Error> {
        match self {
            Self::Map(entries) => Ok(entries),
            Self::Path(path) => Ok(read_parameters_csv(path)?
                .into_iter()
                .map(|(name, value)| (name, ParameterValue::Scalar(value)))
                .collect()),
        }
    }
}

impl<K: Into<String>, V: Into<ParameterValue>> From<Vec<(K, V)>> for ParameterSource {
    fn from(entries: Vec<(K, V)>) -> Self {
        Self::Map(entries.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<K: Into<String>, V: Into<ParameterValue>, const N: usize> From<[(K, V); N]> for ParameterSource {
    fn from(entries: [(K, V); N]) -> Self {
        Self::Map(entries.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<K: Into<String>, V: Into<ParameterValue>, S> From<HashMap<K, V, S>> for ParameterSource {
    fn from(entries: HashMap<K, V, S>) -> Self {
        Self::Map(entries.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<K: Into<String>, V: Into<ParameterValue>, S> From<IndexMap<K, V, S>> for ParameterSource {
    fn from(entries: IndexMap<K, V, S>) -> Self {
        Self::Map(entries.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl From<PathBuf> for ParameterSource {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<&Path> for ParameterSource {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

/// A string is treated as the path of a parameter table.
impl From<&str> for ParameterSource {
    fn from(path: &str) -> Self {
        Self::Path(PathBuf::from(path))
    }
}

/// Reads the parameter table at the given path. See the [module-level documentation](self) for
/// the format.
pub fn read_parameters_csv(path: impl AsRef<Path>) -> Result<IndexMap<String, f64>, Error> {
    let path = path.as_ref();
    let src = fs::read_to_string(path).map_err(|err| Error::spanless(SourceUnreadable {
        path: path.display().to_string(),
        reason: err.to_string(),
    }))?;

    let values = read_parameters_csv_str(&src)?;
    debug!(path = %path.display(), count = values.len(), "loaded parameter table");
    Ok(values)
}

/// Reads a parameter table from the given source text. See the
/// [module-level documentation](self) for the format.
///
/// The spans of any returned error are byte ranges into `src`.
pub fn read_parameters_csv_str(src: &str) -> Result<IndexMap<String, f64>, Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .comment(Some(b'#'))
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(src.as_bytes());

    let headers = reader.headers().map_err(|err| from_csv_error(src, &err))?.clone();
    let header_span = headers
        .position()
        .map_or(0..0, |pos| row_span(src, pos.byte() as usize));
    let name_col = headers.iter().position(|h| h == NAME_COLUMN);
    let value_col = headers.iter().position(|h| h == VALUE_COLUMN);
    let (Some(name_col), Some(value_col)) = (name_col, value_col) else {
        return Err(Error::new(vec![header_span], MalformedSource {
            reason: format!("the header has no `{}` or no `{}` column", NAME_COLUMN, VALUE_COLUMN),
        }));
    };

    let mut values = IndexMap::new();
    let mut defined_at: HashMap<String, Range<usize>> = HashMap::new();
    for record in reader.records() {
        let record = record.map_err(|err| from_csv_error(src, &err))?;
        if record.iter().all(str::is_empty) {
            continue;
        }

        let span = record
            .position()
            .map_or(0..0, |pos| row_span(src, pos.byte() as usize));
        let malformed = |reason: String| Error::new(vec![span.clone()], MalformedSource { reason });

        let name = record.get(name_col).unwrap_or_default();
        if name.is_empty() {
            return Err(malformed("the row has no parameter name".to_string()));
        }

        let value = match record.get(value_col) {
            Some(value) if !value.is_empty() => value,
            _ => return Err(malformed(format!("parameter `{}` has no value", name))),
        };
        let value = match value.parse::<f64>() {
            Ok(number) if number.is_finite() => number,
            Ok(_) => return Err(malformed(format!("`{}` is not a finite number", value))),
            Err(_) => return Err(malformed(format!("`{}` is not a number", value))),
        };

        if let Some(first) = defined_at.get(name) {
            return Err(Error::new(vec![first.clone(), span], DuplicateParameter {
                name: name.to_string(),
            }));
        }

        defined_at.insert(name.to_string(), span);
        values.insert(name.to_string(), value);
    }

    Ok(values)
}

/// Returns the byte range of the first row at or after `start`, excluding the line terminator.
///
/// The reader reports the position where it started looking for a row, so comment lines and
/// blank lines in front of the row are skipped here.
fn row_span(src: &str, start: usize) -> Range<usize> {
    let mut start = start.min(src.len());
    loop {
        let end = src[start..]
            .find(|c| c == '\n' || c == '\r')
            .map_or(src.len(), |len| start + len);
        let line = &src[start..end];
        if end == src.len() || !(line.trim().is_empty() || line.starts_with('#')) {
            return start..end;
        }
        start = end + 1;
    }
}

/// Converts an error from the CSV reader, pointing at the row it occurred on if known.
fn from_csv_error(src: &str, err: &csv::Error) -> Error {
    let spans = err
        .position()
        .map(|pos| vec![row_span(src, pos.byte() as usize)])
        .unwrap_or_default();
    Error::new(spans, MalformedSource { reason: err.to_string() })
}
