//! Tab-separated sample tables.
//!
//! Two readers share the same file layout, a header row followed by one row
//! per sample:
//!
//! * [`load_counts`] reads replicate counts for the expanders;
//! * [`load_regions`] reads the sample/region/count table for trait blocks.

use anyhow::{anyhow, Context};
use indexmap::IndexMap;
use std::collections::HashMap;

/// Columns tried, in order, for the sample name of a counts table.
const NAME_COLUMNS: [&str; 3] = ["sample", "Sample", "taxon"];

/// Sample name to number of individuals.
#[derive(Debug, Default, Clone)]
pub struct Counts {
    count_of: HashMap<String, usize>,
}

impl Counts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, count: usize) {
        self.count_of.insert(name.to_string(), count);
    }

    /// The count of `name`, 1 when absent.
    ///
    /// ```
    /// let mut counts = hapr::libs::counts::Counts::new();
    /// counts.insert("A", 3);
    /// assert_eq!(counts.count_of("A"), 3);
    /// assert_eq!(counts.count_of("B"), 1);
    /// ```
    pub fn count_of(&self, name: &str) -> usize {
        self.count_of.get(name).copied().unwrap_or(1)
    }

    pub fn len(&self) -> usize {
        self.count_of.len()
    }

    pub fn is_empty(&self) -> bool {
        self.count_of.is_empty()
    }
}

fn tsv_reader(infile: &str) -> anyhow::Result<csv::Reader<Box<dyn std::io::BufRead>>> {
    let reader = crate::reader(infile)?;
    Ok(csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .from_reader(reader))
}

/// Parses a count field; blank or unparsable fields count as one individual.
///
/// ```
/// use hapr::libs::counts::parse_count;
/// assert_eq!(parse_count(" 4 "), 4);
/// assert_eq!(parse_count(""), 1);
/// assert_eq!(parse_count("n/a"), 1);
/// ```
pub fn parse_count(field: &str) -> usize {
    let field = field.trim();
    if field.is_empty() {
        return 1;
    }
    match field.parse::<usize>() {
        Ok(count) => count,
        Err(_) => {
            log::warn!("Unparsable count `{}`, using 1", field);
            1
        }
    }
}

/// Reads a counts table with a `sample` (or `Sample`, or `taxon`) column and a
/// `count` column.
pub fn load_counts(infile: &str) -> anyhow::Result<Counts> {
    let mut tsv = tsv_reader(infile)?;
    let headers = tsv
        .headers()
        .with_context(|| format!("could not read the header of {}", infile))?
        .clone();

    let name_cols: Vec<usize> = NAME_COLUMNS
        .iter()
        .filter_map(|name| headers.iter().position(|h| h == *name))
        .collect();
    if name_cols.is_empty() {
        return Err(anyhow!(
            "{}: no `sample`, `Sample` or `taxon` column in the header",
            infile
        ));
    }
    let count_col = headers.iter().position(|h| h == "count");

    let mut counts = Counts::new();
    for result in tsv.records() {
        let row = result?;
        let name = name_cols
            .iter()
            .filter_map(|&i| row.get(i))
            .map(str::trim)
            .find(|s| !s.is_empty());
        let Some(name) = name else {
            continue;
        };

        let count = count_col
            .and_then(|i| row.get(i))
            .map(parse_count)
            .unwrap_or(1);
        counts.insert(name, count);
    }

    Ok(counts)
}

/// Taxon names derived from a sample/region table.
#[derive(Debug, Default, Clone)]
pub struct RegionTable {
    /// Taxon label, with replicate suffix, to its normalized region.
    pub region_of: IndexMap<String, String>,
    /// Region of every taxon, duplicates included.
    pub regions: Vec<String>,
}

/// Normalizes a region code: `NA` and empty codes are dropped, codes
/// starting with `E` are kept whole and all others are cut to their first letter.
///
/// ```
/// use hapr::libs::counts::normalize_region;
/// assert_eq!(normalize_region("EB"), Some("EB".to_string()));
/// assert_eq!(normalize_region("A2"), Some("A".to_string()));
/// assert_eq!(normalize_region("E"), Some("E".to_string()));
/// assert_eq!(normalize_region("NA"), None);
/// ```
pub fn normalize_region(region: &str) -> Option<String> {
    if region == "NA" {
        return None;
    }
    let first = region.chars().next()?;
    if first == 'E' && region.chars().count() > 1 {
        Some(region.to_string())
    } else {
        Some(first.to_string())
    }
}

/// The label of the `idx`-th individual (1-based) of a sample.
pub fn replicate_name(sample: &str, idx: usize) -> String {
    if idx == 1 {
        sample.to_string()
    } else {
        format!("{}_{}", sample, idx)
    }
}

/// Reads a table with `sample`, `region` and `count` columns.
///
/// Each row adds `count` taxa: the sample name itself for the first individual,
/// then `<sample>_<i>`. A sample listed on several rows continues its numbering.
pub fn load_regions(infile: &str) -> anyhow::Result<RegionTable> {
    let mut tsv = tsv_reader(infile)?;
    let headers = tsv
        .headers()
        .with_context(|| format!("could not read the header of {}", infile))?
        .clone();

    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| anyhow!("{}: missing `{}` column", infile, name))
    };
    let sample_col = column("sample")?;
    let region_col = column("region")?;
    let count_col = column("count")?;

    let mut table = RegionTable::default();
    let mut seen_of: HashMap<String, usize> = HashMap::new();

    for (i, result) in tsv.records().enumerate() {
        let row = result?;
        let sample = row.get(sample_col).unwrap_or("").trim();
        let region = row.get(region_col).unwrap_or("").trim();
        let count_field = row.get(count_col).unwrap_or("").trim();

        let count = match count_field.parse::<usize>() {
            Ok(count) => count,
            Err(_) => {
                log::warn!(
                    "Skipping row {} ({}): unparsable count `{}`",
                    i + 2,
                    sample,
                    count_field
                );
                continue;
            }
        };

        let Some(region) = normalize_region(region) else {
            if region.is_empty() {
                log::warn!("Skipping row {} ({}): empty region", i + 2, sample);
            }
            continue;
        };

        let seen = seen_of.entry(sample.to_string()).or_insert(0);
        let start = *seen + 1;
        *seen += count;

        for idx in start..start + count {
            table
                .region_of
                .insert(replicate_name(sample, idx), region.clone());
            table.regions.push(region.clone());
        }
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_counts() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("counts.tsv");
        std::fs::write(
            &path,
            "sample\tregion\tcount\nA\tA1\t3\nB\tB\tn/a\nC\tC\t\nD\tD\n",
        )
        .unwrap();

        let counts = load_counts(path.to_str().unwrap()).unwrap();
        assert_eq!(counts.len(), 4);
        assert_eq!(counts.count_of("A"), 3);
        assert_eq!(counts.count_of("B"), 1);
        assert_eq!(counts.count_of("C"), 1);
        assert_eq!(counts.count_of("D"), 1);
        assert_eq!(counts.count_of("Z"), 1);
    }

    #[test]
    fn test_load_counts_alternative_columns() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("counts.tsv");
        std::fs::write(&path, "taxon\tcount\nH1\t2\n").unwrap();
        let counts = load_counts(path.to_str().unwrap()).unwrap();
        assert_eq!(counts.count_of("H1"), 2);

        std::fs::write(&path, "name\tcount\nH1\t2\n").unwrap();
        let err = load_counts(path.to_str().unwrap()).err().unwrap();
        assert!(err.to_string().contains("no `sample`"));
    }

    #[test]
    fn test_load_regions() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("regions.tsv");
        std::fs::write(
            &path,
            "sample\tregion\tcount\n\
             S1\tA2\t2\n\
             S2\tEB\t1\n\
             OUT\tNA\t1\n\
             S3\tB\tmany\n\
             S1\tEA\t1\n",
        )
        .unwrap();

        let table = load_regions(path.to_str().unwrap()).unwrap();
        let taxa: Vec<_> = table.region_of.keys().cloned().collect();
        assert_eq!(taxa, vec!["S1", "S1_2", "S2", "S1_3"]);
        assert_eq!(table.region_of["S1_2"], "A");
        assert_eq!(table.region_of["S1_3"], "EA");
        assert_eq!(table.regions, vec!["A", "A", "EB", "EA"]);
    }

    #[test]
    fn test_load_regions_missing_column() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("regions.tsv");
        std::fs::write(&path, "sample\tcount\nS1\t1\n").unwrap();
        let err = load_regions(path.to_str().unwrap()).err().unwrap();
        assert!(err.to_string().contains("missing `region` column"));
    }
}
