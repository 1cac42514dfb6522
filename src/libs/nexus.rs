//! Reading and writing NEXUS alignments.
//!
//! Only the parts needed for DNA alignments are handled: the `DATA` (or
//! `CHARACTERS`) block with its `DIMENSIONS` and `MATRIX`. Bracketed comments
//! are skipped and interleaved matrices are merged by label.

use crate::libs::record::SeqRecord;
use anyhow::{anyhow, bail};
use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;
use std::io::Write;

lazy_static! {
    static ref RE_BLOCK: Regex = Regex::new(r"(?i)begin\s+(data|characters)\s*;").unwrap();
    static ref RE_MATRIX: Regex = Regex::new(r"(?i)\bmatrix\b").unwrap();
    static ref RE_NTAX: Regex = Regex::new(r"(?i)\bntax\s*=\s*(\d+)").unwrap();
}

/// Characters that force a label to be written between single quotes.
const PUNCTUATION: &str = "()[]{}/\\,;:=*'\"`<>^";

/// Parses the alignment of the first DATA/CHARACTERS block.
///
/// ```
/// let text = "#NEXUS\nbegin data;\n dimensions ntax=2 nchar=4;\nmatrix\nA ACGT\n'B c' AC-T\n;\nend;\n";
/// let records = hapr::libs::nexus::parse_nexus(text).unwrap();
/// assert_eq!(records.len(), 2);
/// assert_eq!(records[1].id, "B c");
/// assert_eq!(records[1].seq, "AC-T");
/// ```
pub fn parse_nexus(text: &str) -> anyhow::Result<Vec<SeqRecord>> {
    let block = RE_BLOCK
        .find(text)
        .ok_or_else(|| anyhow!("no DATA or CHARACTERS block found"))?;
    let rest = &text[block.end()..];
    let matrix = RE_MATRIX
        .find(rest)
        .ok_or_else(|| anyhow!("no MATRIX in the DATA block"))?;

    let declared = RE_NTAX
        .captures_iter(&rest[..matrix.start()])
        .last()
        .and_then(|caps| caps[1].parse::<usize>().ok());

    let body = matrix_body(&rest[matrix.end()..])?;

    let mut seq_of: IndexMap<String, String> = IndexMap::new();
    for (i, line) in body.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let (label, rest) =
            split_label(line.trim()).ok_or_else(|| anyhow!("unclosed quote in matrix row {}", i + 1))?;
        let chunk: String = rest.split_whitespace().collect();
        seq_of.entry(label).or_default().push_str(&chunk);
    }

    if seq_of.is_empty() {
        bail!("the MATRIX holds no sequences");
    }

    let records: Vec<SeqRecord> = seq_of
        .into_iter()
        .map(|(id, seq)| SeqRecord { id, seq })
        .collect();

    let nchar = records[0].seq.len();
    if let Some(rec) = records.iter().find(|rec| rec.seq.len() != nchar) {
        bail!(
            "sequences of unequal length in the alignment: {} has {}, expected {}",
            rec.id,
            rec.seq.len(),
            nchar
        );
    }

    if let Some(ntax) = declared {
        if ntax != records.len() {
            log::warn!(
                "NTAX={} declared but the MATRIX holds {} taxa",
                ntax,
                records.len()
            );
        }
    }

    Ok(records)
}

/// Reads a NEXUS alignment from a file.
pub fn read_nexus(infile: &str) -> anyhow::Result<Vec<SeqRecord>> {
    let text = crate::read_to_string(infile)?;
    parse_nexus(&text).map_err(|e| anyhow!("{}: {}", infile, e))
}

// Text after the MATRIX keyword up to its terminating `;`, comments removed
fn matrix_body(text: &str) -> anyhow::Result<String> {
    let mut body = String::new();
    let mut in_quote = false;
    let mut depth = 0usize;

    for c in text.chars() {
        match c {
            '[' if !in_quote => depth += 1,
            ']' if !in_quote && depth > 0 => depth -= 1,
            _ if depth > 0 => {}
            '\'' => {
                in_quote = !in_quote;
                body.push(c);
            }
            ';' if !in_quote => return Ok(body),
            _ => body.push(c),
        }
    }

    bail!("MATRIX is not terminated by ';'")
}

/// Splits a trimmed matrix row into its unquoted label and the remaining text.
///
/// Returns `None` when a quoted label is never closed.
///
/// ```
/// use hapr::libs::nexus::split_label;
/// assert_eq!(split_label("A1 ACGT"), Some(("A1".to_string(), " ACGT")));
/// assert_eq!(split_label("'it''s' AC"), Some(("it's".to_string(), " AC")));
/// assert_eq!(split_label("'open AC"), None);
/// ```
pub fn split_label(line: &str) -> Option<(String, &str)> {
    if let Some(quoted) = line.strip_prefix('\'') {
        let mut label = String::new();
        let mut chars = quoted.char_indices().peekable();
        while let Some((i, c)) = chars.next() {
            if c != '\'' {
                label.push(c);
            } else if let Some(&(_, '\'')) = chars.peek() {
                label.push('\'');
                chars.next();
            } else {
                return Some((label, &quoted[i + 1..]));
            }
        }
        None
    } else {
        match line.find(char::is_whitespace) {
            Some(pos) => Some((line[..pos].to_string(), &line[pos..])),
            None => Some((line.to_string(), "")),
        }
    }
}

/// Quotes a label when bare NEXUS tokens can't hold it.
///
/// ```
/// use hapr::libs::nexus::quote_label;
/// assert_eq!(quote_label("ABC_2"), "ABC_2");
/// assert_eq!(quote_label("A B"), "'A B'");
/// assert_eq!(quote_label("it's"), "'it''s'");
/// ```
pub fn quote_label(label: &str) -> String {
    let needs_quote = label.is_empty()
        || label
            .chars()
            .any(|c| c.is_whitespace() || PUNCTUATION.contains(c));

    if needs_quote {
        format!("'{}'", label.replace('\'', "''"))
    } else {
        label.to_string()
    }
}

/// Writes records as a single DATA block alignment.
pub fn write_nexus<W: Write + ?Sized>(writer: &mut W, records: &[SeqRecord]) -> anyhow::Result<()> {
    let nchar = records.iter().map(|rec| rec.seq.len()).max().unwrap_or(0);
    let labels: Vec<String> = records.iter().map(|rec| quote_label(&rec.id)).collect();
    let width = labels.iter().map(|l| l.len()).max().unwrap_or(0);

    writer.write_all(b"#NEXUS\n")?;
    writer.write_all(b"begin data;\n")?;
    writer.write_fmt(format_args!(
        "\tdimensions ntax={} nchar={};\n",
        records.len(),
        nchar
    ))?;
    writer.write_all(b"\tformat datatype=DNA missing=? gap=-;\n")?;
    writer.write_all(b"matrix\n")?;
    for (label, rec) in labels.iter().zip(records) {
        writer.write_fmt(format_args!("{:<width$}  {}\n", label, rec.seq, width = width))?;
    }
    writer.write_all(b";\n")?;
    writer.write_all(b"end;\n")?;

    Ok(())
}

/// Writes the haplotype matrix produced after renaming, with comments pointing
/// at its source FASTA and key file.
pub fn write_haps_nexus<W: Write + ?Sized>(
    writer: &mut W,
    records: &[SeqRecord],
    source: &str,
    keyfile: &str,
) -> anyhow::Result<()> {
    let nchar = records.iter().map(|rec| rec.seq.len()).max().unwrap_or(0);

    writer.write_all(b"#NEXUS\n")?;
    writer.write_fmt(format_args!("[Converted from {} by hapr]\n", source))?;
    writer.write_fmt(format_args!(
        "[{} holds the haplotype designations]\n\n",
        keyfile
    ))?;
    writer.write_all(b"Begin DATA;\n")?;
    writer.write_fmt(format_args!(
        "\tdimensions ntax={} nchar={};\n",
        records.len(),
        nchar
    ))?;
    writer.write_all(b"\tformat datatype=DNA missing=? gap=-;\n\tmatrix\n")?;
    for rec in records {
        writer.write_fmt(format_args!("\t\t{}\t\t{}\n", rec.id, rec.seq))?;
    }
    writer.write_all(b";\nEND;")?;

    Ok(())
}

/// Taxon names in the order they appear in the MATRIX: the first token of each
/// non-empty line after the `matrix` line, up to the line starting with `;`.
///
/// ```
/// let text = "#NEXUS\nBEGIN DATA;\nMATRIX\n  A ACGT\n\n  B ACGA\n;\nEND;\n";
/// assert_eq!(hapr::libs::nexus::matrix_taxa(text), vec!["A", "B"]);
/// ```
pub fn matrix_taxa(text: &str) -> Vec<String> {
    let mut taxa = vec![];
    let mut reading = false;

    for line in text.lines() {
        let stripped = line.trim();
        if !reading {
            if stripped.to_lowercase().starts_with("matrix") {
                reading = true;
            }
            continue;
        }
        if stripped.starts_with(';') {
            break;
        }
        if let Some(first) = stripped.split_whitespace().next() {
            taxa.push(first.to_string());
        }
    }

    taxa
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_interleaved_with_comments() {
        let text = "#NEXUS\n[written by hand]\nBEGIN DATA;\n\
                    DIMENSIONS NTAX=2 NCHAR=8;\n\
                    FORMAT DATATYPE=DNA INTERLEAVE;\n\
                    MATRIX\n\
                    A ACGT [first half]\n\
                    B ACGA\n\
                    \n\
                    A TTTT\n\
                    B TTTA\n\
                    ;\nEND;\n";
        let records = parse_nexus(text).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], SeqRecord::new("A", "ACGTTTTT"));
        assert_eq!(records[1], SeqRecord::new("B", "ACGATTTA"));
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_nexus("#NEXUS\n").is_err());
        assert!(parse_nexus("#NEXUS\nbegin data;\nend;\n").is_err());
        let err = parse_nexus("#NEXUS\nbegin data;\nmatrix\nA ACGT\nB AC\n;\nend;\n")
            .err()
            .unwrap();
        assert!(err.to_string().contains("unequal length"));
        let err = parse_nexus("#NEXUS\nbegin data;\nmatrix\nA ACGT\n").err().unwrap();
        assert!(err.to_string().contains("not terminated"));
    }

    #[test]
    fn test_write_then_parse() {
        let records = vec![
            SeqRecord::new("A_1", "ACGT"),
            SeqRecord::new("sp. x", "AC-T"),
        ];
        let mut out: Vec<u8> = vec![];
        write_nexus(&mut out, &records).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("#NEXUS\nbegin data;\n"));
        assert!(text.contains("dimensions ntax=2 nchar=4;"));
        assert!(text.contains("'sp. x'  AC-T\n"));
        assert_eq!(parse_nexus(&text).unwrap(), records);
    }

    #[test]
    fn test_write_haps_nexus() {
        let records = vec![SeqRecord::new("A_3", "ACGT"), SeqRecord::new("D_1", "ACGA")];
        let mut out: Vec<u8> = vec![];
        write_haps_nexus(&mut out, &records, "clear.fa", "out.hapkey.txt").unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("[out.hapkey.txt holds the haplotype designations]\n\n"));
        assert!(text.contains("\tdimensions ntax=2 nchar=4;\n"));
        assert!(text.contains("\t\tA_3\t\tACGT\n"));
        assert!(text.ends_with(";\nEND;"));
        assert_eq!(parse_nexus(&text).unwrap(), records);
    }

    #[test]
    fn test_matrix_taxa_stops_at_semicolon() {
        let text = "BEGIN DATA;\n\tMatrix\nX1 AC\nX2 AG\n;\nEND;\nBEGIN TRAITS;\nMatrix\nX1 1,0\n;\nEND;\n";
        assert_eq!(matrix_taxa(text), vec!["X1", "X2"]);
        assert!(matrix_taxa("no matrix here").is_empty());
    }
}
