//! Row-level editing of the MATRIX of a NEXUS `DATA` block.
//!
//! [`MatrixDocument`] keeps the original text and records where the pieces it
//! edits live: the last `NTAX=<n>` before `MATRIX`, and the rows between the
//! `MATRIX` line and the line starting with `;`. Everything else is written back
//! untouched.

use crate::libs::counts::Counts;
use indexmap::IndexMap;
use lazy_static::lazy_static;
use itertools::Itertools;
use regex::Regex;
use std::fmt;
use std::ops::Range;

lazy_static! {
    static ref RE_BEGIN_DATA: Regex = Regex::new(r"(?i)begin\s+data\s*;").unwrap();
    static ref RE_END: Regex = Regex::new(r"(?i)\bend\s*;").unwrap();
    static ref RE_MATRIX_LINE: Regex = Regex::new(r"(?im)^[ \t]*matrix[ \t]*\r?$").unwrap();
    static ref RE_NTAX: Regex = Regex::new(r"(?i)\bntax\s*=\s*(\d+)").unwrap();
    static ref RE_ROW: Regex =
        Regex::new(r"^([ \t]*)('(?:[^']|'')*'|[^\s']\S*)([ \t]+)(\S.*)$").unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatrixError {
    /// No `BEGIN DATA;`
    NoDataBlock,
    /// `BEGIN DATA;` without a following `END;`
    NoDataEnd,
    /// No line holding only `MATRIX` inside the DATA block
    NoMatrix,
    /// No line starting with `;` after `MATRIX`
    NoMatrixEnd,
    /// A row that isn't `label<whitespace>data`
    MalformedRow {
        /// The line number (1-based)
        line: usize,
        content: String,
    },
}

impl fmt::Display for MatrixError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatrixError::NoDataBlock => write!(f, "no `BEGIN DATA;` block found"),
            MatrixError::NoDataEnd => write!(f, "the DATA block has no closing `END;`"),
            MatrixError::NoMatrix => write!(f, "no `MATRIX` line inside the DATA block"),
            MatrixError::NoMatrixEnd => {
                write!(f, "the MATRIX has no terminating `;` line")
            }
            MatrixError::MalformedRow { line, content } => {
                write!(f, "malformed matrix row at line {}: \"{}\"", line, content)
            }
        }
    }
}

impl std::error::Error for MatrixError {}

/// One taxon row, split into its parts. Joining them gives back the line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixRow<'a> {
    pub indent: &'a str,
    /// Label as written, quotes included
    pub label: &'a str,
    pub separator: &'a str,
    pub data: &'a str,
    pub eol: &'a str,
}

impl<'a> MatrixRow<'a> {
    /// The label without its quotes.
    pub fn name(&self) -> String {
        match crate::libs::nexus::split_label(self.label) {
            Some((name, _)) => name,
            None => self.label.to_string(),
        }
    }

    /// Label of the `k`-th copy: unchanged for the first, `_<k>` appended
    /// (inside the quotes, if any) for the others.
    ///
    /// ```
    /// use hapr::libs::matrix::MatrixRow;
    /// let row = MatrixRow { indent: "", label: "H1", separator: " ", data: "AC", eol: "\n" };
    /// assert_eq!(row.replicate_label(1), "H1");
    /// assert_eq!(row.replicate_label(3), "H1_3");
    /// let row = MatrixRow { label: "'H 1'", ..row };
    /// assert_eq!(row.replicate_label(2), "'H 1_2'");
    /// ```
    pub fn replicate_label(&self, k: usize) -> String {
        if k == 1 {
            self.label.to_string()
        } else if self.label.len() >= 2 && self.label.starts_with('\'') && self.label.ends_with('\'')
        {
            format!("{}_{}'", &self.label[..self.label.len() - 1], k)
        } else {
            format!("{}_{}", self.label, k)
        }
    }

    fn write_copy(&self, out: &mut String, k: usize) {
        out.push_str(self.indent);
        out.push_str(&self.replicate_label(k));
        out.push_str(self.separator);
        out.push_str(self.data);
        out.push_str(self.eol);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatrixLine<'a> {
    Row(MatrixRow<'a>),
    /// Blank lines and comments, kept as they are
    Verbatim(&'a str),
}

/// A NEXUS text with its DATA MATRIX parsed into rows.
#[derive(Debug, Clone)]
pub struct MatrixDocument<'a> {
    text: &'a str,
    ntax: Option<Range<usize>>,
    rows: Range<usize>,
    lines: Vec<MatrixLine<'a>>,
}

/// Output of [`MatrixDocument::expand`].
#[derive(Debug, Clone)]
pub struct Expanded {
    pub text: String,
    /// Number of distinct labels
    pub ntax: usize,
    /// Distinct labels, in the order first written
    pub labels: Vec<String>,
    /// Labels written for more than one source taxon
    pub collisions: Vec<String>,
}

impl<'a> MatrixDocument<'a> {
    pub fn parse(text: &'a str) -> Result<Self, MatrixError> {
        let begin = RE_BEGIN_DATA.find(text).ok_or(MatrixError::NoDataBlock)?;
        let end = RE_END
            .find_at(text, begin.end())
            .ok_or(MatrixError::NoDataEnd)?;
        let block = &text[begin.end()..end.start()];

        let matrix = RE_MATRIX_LINE.find(block).ok_or(MatrixError::NoMatrix)?;
        let matrix_start = begin.end() + matrix.start();
        let mut rows_start = begin.end() + matrix.end();
        if text[rows_start..].starts_with('\n') {
            rows_start += 1;
        }

        let ntax = RE_NTAX
            .captures_iter(&text[begin.end()..matrix_start])
            .last()
            .and_then(|caps| caps.get(1))
            .map(|m| begin.end() + m.start()..begin.end() + m.end());

        let mut lines = vec![];
        let mut offset = rows_start;
        let mut rows_end = None;
        for line in text[rows_start..end.start()].split_inclusive('\n') {
            if line.trim_start().starts_with(';') {
                rows_end = Some(offset);
                break;
            }
            lines.push(parse_line(text, offset, line)?);
            offset += line.len();
        }
        let rows_end = rows_end.ok_or(MatrixError::NoMatrixEnd)?;

        Ok(Self {
            text,
            ntax,
            rows: rows_start..rows_end,
            lines,
        })
    }

    pub fn rows(&self) -> impl Iterator<Item = &MatrixRow<'a>> {
        self.lines.iter().filter_map(|line| match line {
            MatrixLine::Row(row) => Some(row),
            MatrixLine::Verbatim(_) => None,
        })
    }

    /// The declared `NTAX`, if any.
    pub fn ntax(&self) -> Option<usize> {
        self.ntax
            .as_ref()
            .and_then(|range| self.text[range.clone()].parse().ok())
    }

    /// Distinct taxon names, in the order of their first row.
    pub fn taxa(&self) -> Vec<String> {
        self.rows().map(|row| row.name()).unique().collect()
    }

    /// Repeats every row by its count and updates `NTAX` to the new number of
    /// taxa.
    ///
    /// In an interleaved matrix a taxon has one row per block; each of them is
    /// repeated, and the taxon is counted once.
    pub fn expand(&self, counts: &Counts) -> Expanded {
        let mut body = String::new();
        // label -> (source taxon, copy)
        let mut source_of: IndexMap<String, (String, usize)> = IndexMap::new();
        let mut collisions = vec![];

        for line in &self.lines {
            match line {
                MatrixLine::Row(row) => {
                    let name = row.name();
                    for k in 1..=counts.count_of(&name) {
                        row.write_copy(&mut body, k);
                        let label = row.replicate_label(k);
                        match source_of.get(&label) {
                            Some((prev, copy)) if *prev != name || *copy != k => {
                                if !collisions.contains(&label) {
                                    collisions.push(label);
                                }
                            }
                            Some(_) => {}
                            None => {
                                source_of.insert(label, (name.clone(), k));
                            }
                        }
                    }
                }
                MatrixLine::Verbatim(raw) => body.push_str(raw),
            }
        }
        let labels: Vec<String> = source_of.into_keys().collect();
        let ntax = labels.len();

        let mut text = String::with_capacity(self.text.len() + body.len());
        match &self.ntax {
            Some(range) => {
                text.push_str(&self.text[..range.start]);
                text.push_str(&ntax.to_string());
                text.push_str(&self.text[range.end..self.rows.start]);
            }
            None => {
                log::warn!("No NTAX= before MATRIX, left as is");
                text.push_str(&self.text[..self.rows.start]);
            }
        }
        text.push_str(&body);
        text.push_str(&self.text[self.rows.end..]);

        Expanded {
            text,
            ntax,
            labels,
            collisions,
        }
    }
}

fn parse_line<'a>(text: &'a str, offset: usize, line: &'a str) -> Result<MatrixLine<'a>, MatrixError> {
    let content = line
        .strip_suffix("\r\n")
        .or_else(|| line.strip_suffix('\n'))
        .unwrap_or(line);
    let eol = &line[content.len()..];

    let trimmed = content.trim();
    if trimmed.is_empty() || trimmed.starts_with('[') {
        return Ok(MatrixLine::Verbatim(line));
    }

    match RE_ROW.captures(content) {
        Some(caps) => {
            let part = |i: usize| caps.get(i).map_or("", |m| m.as_str());
            Ok(MatrixLine::Row(MatrixRow {
                indent: part(1),
                label: part(2),
                separator: part(3),
                data: part(4),
                eol,
            }))
        }
        None => Err(MatrixError::MalformedRow {
            line: text[..offset].matches('\n').count() + 1,
            content: trimmed.to_string(),
        }),
    }
}
