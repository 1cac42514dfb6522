use crate::libs::counts::Counts;
use crate::libs::record::SeqRecord;
use indexmap::IndexMap;
use itertools::Itertools;

/// Joins the identifiers of records sharing one sequence.
pub const SEPARATOR: char = '*';

/// Collapses identical sequences into one record per haplotype.
///
/// Sequences are upper-cased first. Those shorter than `min_len`, or with more
/// than `max_n_pct` percent of `N`, are left out, as are empty ones. Records
/// come out in the order their sequence was first seen, with all identifiers
/// sharing it joined by `*`.
///
/// ```
/// use hapr::libs::record::SeqRecord;
/// use hapr::libs::haplotype::collapse;
/// let records = vec![
///     SeqRecord::new("A", "acgt"),
///     SeqRecord::new("B", "ACGA"),
///     SeqRecord::new("C", "ACGT"),
/// ];
/// let haps = collapse(&records, 0, 100.0);
/// assert_eq!(haps, vec![SeqRecord::new("A*C", "ACGT"), SeqRecord::new("B", "ACGA")]);
/// ```
pub fn collapse(records: &[SeqRecord], min_len: usize, max_n_pct: f64) -> Vec<SeqRecord> {
    let mut ids_of: IndexMap<String, String> = IndexMap::new();

    for rec in records {
        let seq = rec.seq.to_uppercase();
        let upper = SeqRecord {
            id: rec.id.clone(),
            seq,
        };
        let Some(n_pct) = upper.n_percent() else {
            log::warn!("Skipping {}: empty sequence", rec.id);
            continue;
        };
        if upper.seq.len() < min_len || n_pct > max_n_pct {
            continue;
        }

        ids_of
            .entry(upper.seq)
            .and_modify(|ids| {
                ids.push(SEPARATOR);
                ids.push_str(&rec.id);
            })
            .or_insert_with(|| rec.id.clone());
    }

    ids_of
        .into_iter()
        .map(|(seq, id)| SeqRecord { id, seq })
        .collect()
}

/// A collapsed record renamed after its first member and its size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Haplotype {
    pub name: String,
    pub members: Vec<String>,
    pub seq: String,
}

impl Haplotype {
    /// ```
    /// use hapr::libs::record::SeqRecord;
    /// use hapr::libs::haplotype::Haplotype;
    /// let hap = Haplotype::from_collapsed(&SeqRecord::new("A*B*C", "ACGT"));
    /// assert_eq!(hap.name, "A_3");
    /// assert_eq!(hap.key_line(0), "0 A_3: ['A', 'B', 'C']");
    /// ```
    pub fn from_collapsed(rec: &SeqRecord) -> Self {
        let members: Vec<String> = rec.id.split(SEPARATOR).map(|s| s.to_string()).collect();
        let name = format!("{}_{}", members[0], members.len());
        Self {
            name,
            members,
            seq: rec.seq.clone(),
        }
    }

    pub fn count(&self) -> usize {
        self.members.len()
    }

    pub fn to_record(&self) -> SeqRecord {
        SeqRecord {
            id: self.name.clone(),
            seq: self.seq.clone(),
        }
    }

    /// Line of the key file: row index, haplotype name and its members as a
    /// list of quoted strings.
    pub fn key_line(&self, index: usize) -> String {
        format!(
            "{} {}: [{}]",
            index,
            self.name,
            self.members.iter().map(|m| quote_member(m)).join(", ")
        )
    }
}

/// Single-quoted, or double-quoted when the id holds a `'` and no `"`.
///
/// ```
/// use hapr::libs::haplotype::quote_member;
/// assert_eq!(quote_member("S1"), "'S1'");
/// assert_eq!(quote_member("O'Neil"), "\"O'Neil\"");
/// assert_eq!(quote_member(r#"a'b"c"#), r#"'a\'b"c'"#);
/// ```
pub fn quote_member(id: &str) -> String {
    let quote = if id.contains('\'') && !id.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut out = String::with_capacity(id.len() + 2);
    out.push(quote);
    for c in id.chars() {
        if c == '\\' || c == quote {
            out.push('\\');
        }
        out.push(c);
    }
    out.push(quote);
    out
}

/// Names collapsed records, sorted by their joined identifiers.
pub fn name_haplotypes(records: &[SeqRecord]) -> Vec<Haplotype> {
    records
        .iter()
        .sorted_by(|a, b| a.id.cmp(&b.id))
        .map(Haplotype::from_collapsed)
        .collect()
}

/// Repeats each record as many times as its count, labelling copies
/// `<id>_1`, `<id>_2` and so on.
///
/// ```
/// use hapr::libs::record::SeqRecord;
/// use hapr::libs::counts::Counts;
/// use hapr::libs::haplotype::expand_records;
/// let mut counts = Counts::new();
/// counts.insert("H1", 2);
/// let records = vec![SeqRecord::new("H1", "AC"), SeqRecord::new("H2", "AG")];
/// let ids: Vec<_> = expand_records(&records, &counts).into_iter().map(|r| r.id).collect();
/// assert_eq!(ids, vec!["H1_1", "H1_2", "H2_1"]);
/// ```
pub fn expand_records(records: &[SeqRecord], counts: &Counts) -> Vec<SeqRecord> {
    let mut expanded = vec![];
    for rec in records {
        for i in 1..=counts.count_of(&rec.id) {
            expanded.push(SeqRecord {
                id: format!("{}_{}", rec.id, i),
                seq: rec.seq.clone(),
            });
        }
    }
    expanded
}

/// Identifiers occurring more than once.
pub fn duplicated_ids<'a, I>(ids: I) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    ids.into_iter().duplicates().collect()
}
