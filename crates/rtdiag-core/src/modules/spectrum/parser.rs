use crate::domain::{ParserResult, RtDiagError};
use crate::modules::serialization::normalize_text_artifact;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

const COMMENT_TOKEN: &str = "#";
const UNITS_MARKER: &str = "# Units:";

/// How a spectral table file is split and how strictly it is typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableOptions {
    /// Explicit field separator; `None` splits on runs of whitespace.
    pub delimiter: Option<String>,
    /// Return the raw string grid instead of failing on ragged rows,
    /// non-numeric values or duplicate columns.
    pub string_fallback: bool,
}

impl TableOptions {
    pub fn with_delimiter(delimiter: impl Into<String>) -> Self {
        Self {
            delimiter: Some(delimiter.into()),
            string_fallback: false,
        }
    }

    pub fn with_string_fallback(mut self) -> Self {
        self.string_fallback = true;
        self
    }
}

/// Typed table: unique column names and one numeric series per column.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectralTable {
    columns: Vec<String>,
    data: Vec<Vec<f64>>,
}

impl SpectralTable {
    /// Build a table from column names and same-length numeric series.
    pub fn from_columns(columns: Vec<String>, data: Vec<Vec<f64>>) -> ParserResult<Self> {
        if columns.len() != data.len() {
            return Err(RtDiagError::format(
                "FORMAT.SPEC_COLUMN_COUNT",
                format!(
                    "table has {} column names but {} data series",
                    columns.len(),
                    data.len()
                ),
            ));
        }
        if let Some(first) = data.first()
            && let Some(bad) = data.iter().position(|series| series.len() != first.len())
        {
            return Err(RtDiagError::format(
                "FORMAT.SPEC_ROW_LENGTH",
                format!(
                    "column '{}' has {} rows, expected {}",
                    columns[bad],
                    data[bad].len(),
                    first.len()
                ),
            ));
        }
        if let Some(duplicate) = first_duplicate(&columns) {
            return Err(RtDiagError::format(
                "FORMAT.SPEC_DUPLICATE_COLUMN",
                format!("column '{duplicate}' appears more than once in the header"),
            ));
        }
        Ok(Self { columns, data })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.data.first().map_or(0, Vec::len)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.column_index(name).map(|index| self.data[index].as_slice())
    }

    pub fn row(&self, index: usize) -> Option<Vec<f64>> {
        (index < self.row_count()).then(|| self.data.iter().map(|series| series[index]).collect())
    }

    /// Re-serialize as whitespace-delimited text with a header line.
    pub fn to_text(&self) -> String {
        let mut text = self.columns.join(" ");
        text.push('\n');
        for index in 0..self.row_count() {
            let row = self
                .data
                .iter()
                .map(|series| series[index].to_string())
                .collect::<Vec<_>>();
            text.push_str(&row.join(" "));
            text.push('\n');
        }
        normalize_text_artifact(&text)
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }
}

/// Untyped fallback: the header row followed by raw data rows of any length.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextGrid {
    rows: Vec<Vec<String>>,
}

impl TextGrid {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    pub fn header(&self) -> Option<&[String]> {
        self.rows.first().map(Vec::as_slice)
    }

    pub fn data_rows(&self) -> &[Vec<String>] {
        self.rows.get(1..).unwrap_or(&[])
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableData {
    Numeric(SpectralTable),
    Text(TextGrid),
}

impl TableData {
    pub fn columns(&self) -> &[String] {
        match self {
            Self::Numeric(table) => table.columns(),
            Self::Text(grid) => grid.header().unwrap_or(&[]),
        }
    }

    pub fn as_numeric(&self) -> Option<&SpectralTable> {
        match self {
            Self::Numeric(table) => Some(table),
            Self::Text(_) => None,
        }
    }
}

/// Apply the `A<name>P<suffix>` header rewrite to one token.
///
/// A token starting with `A` that contains a `P` becomes the text strictly
/// between the leading `A` and its first `P`; every other token is kept.
pub fn rewrite_header_token(token: &str) -> String {
    if let Some(rest) = token.strip_prefix('A')
        && let Some(end) = rest.find('P')
    {
        return rest[..end].to_string();
    }
    token.to_string()
}

pub fn read_source(path: &Path) -> ParserResult<String> {
    fs::read_to_string(path).map_err(|source| {
        RtDiagError::from_read_failure("NOT_FOUND.SPEC_FILE", "IO.SPEC_READ", path, &source)
    })
}

pub fn read_table(path: &Path, options: &TableOptions) -> ParserResult<TableData> {
    let source = read_source(path)?;
    parse_table(&source, options).map_err(|error| {
        RtDiagError::new(
            error.category(),
            error.placeholder(),
            format!("{}: {}", path.display(), error.message()),
        )
    })
}

/// Parse a table, requiring every value to be numeric.
pub fn parse_spectral_table(source: &str, delimiter: Option<&str>) -> ParserResult<SpectralTable> {
    let options = TableOptions {
        delimiter: delimiter.map(str::to_string),
        string_fallback: false,
    };
    match parse_table(source, &options)? {
        TableData::Numeric(table) => Ok(table),
        TableData::Text(_) => Err(RtDiagError::internal(
            "INTERNAL.SPEC_FALLBACK",
            "string grid returned without the fallback flag",
        )),
    }
}

pub fn parse_table(source: &str, options: &TableOptions) -> ParserResult<TableData> {
    let mut rows = retained_rows(source, options.delimiter.as_deref());
    let Some(header) = rows.first_mut() else {
        return Err(RtDiagError::format(
            "FORMAT.SPEC_HEADER",
            "table contains no header line",
        ));
    };
    for token in header.iter_mut() {
        *token = rewrite_header_token(token);
    }

    match coerce_numeric(&rows) {
        Ok(table) => Ok(TableData::Numeric(table)),
        Err(error) if options.string_fallback => {
            tracing::debug!(
                placeholder = error.placeholder(),
                "table kept as string grid: {}",
                error.message()
            );
            Ok(TableData::Text(TextGrid::new(rows)))
        }
        Err(error) => Err(error),
    }
}

/// Unit label declared by the first `# Units:` comment, brackets stripped.
pub fn spectrum_units_label(source: &str) -> Option<String> {
    let line = source.lines().find(|line| line.contains(UNITS_MARKER))?;
    let token = line.split_whitespace().nth(4)?;
    let mut chars = token.chars();
    chars.next()?;
    chars.next_back()?;
    let label = chars.as_str();
    (!label.is_empty()).then(|| label.to_string())
}

fn retained_rows(source: &str, delimiter: Option<&str>) -> Vec<Vec<String>> {
    source
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| split_fields(line, delimiter))
        .filter(|tokens| tokens.first().is_some_and(|first| first != COMMENT_TOKEN))
        .collect()
}

fn split_fields(line: &str, delimiter: Option<&str>) -> Vec<String> {
    match delimiter {
        Some(delimiter) if !delimiter.is_empty() => line
            .split(delimiter)
            .map(|token| token.trim().to_string())
            .collect(),
        _ => line.split_whitespace().map(str::to_string).collect(),
    }
}

fn coerce_numeric(rows: &[Vec<String>]) -> ParserResult<SpectralTable> {
    let header = &rows[0];
    let mut data = vec![Vec::with_capacity(rows.len().saturating_sub(1)); header.len()];

    for (row_index, row) in rows.iter().enumerate().skip(1) {
        if row.len() != header.len() {
            return Err(RtDiagError::format(
                "FORMAT.SPEC_ROW_LENGTH",
                format!(
                    "data row {} has {} fields but the header has {}",
                    row_index,
                    row.len(),
                    header.len()
                ),
            ));
        }
        for (column, token) in row.iter().enumerate() {
            let value = token.parse::<f64>().map_err(|_| {
                RtDiagError::format(
                    "FORMAT.SPEC_VALUE",
                    format!(
                        "value '{}' in column '{}' of data row {} is not numeric",
                        token, header[column], row_index
                    ),
                )
            })?;
            data[column].push(value);
        }
    }

    SpectralTable::from_columns(header.clone(), data)
}

fn first_duplicate(columns: &[String]) -> Option<&str> {
    let mut seen = HashSet::with_capacity(columns.len());
    columns
        .iter()
        .find(|column| !seen.insert(column.as_str()))
        .map(String::as_str)
}
