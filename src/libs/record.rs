use std::io::Write;

/// One named sequence of an alignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeqRecord {
    pub id: String,
    pub seq: String,
}

impl SeqRecord {
    pub fn new(id: &str, seq: &str) -> Self {
        Self {
            id: id.to_string(),
            seq: seq.to_string(),
        }
    }

    /// Percentage of `N` among the residues, `None` for an empty sequence.
    ///
    /// ```
    /// use hapr::libs::record::SeqRecord;
    /// let rec = SeqRecord::new("a", "ACNN");
    /// assert_eq!(rec.n_percent(), Some(50.0));
    /// assert_eq!(SeqRecord::new("b", "").n_percent(), None);
    /// ```
    pub fn n_percent(&self) -> Option<f64> {
        if self.seq.is_empty() {
            return None;
        }
        let n = self.seq.bytes().filter(|&b| b == b'N' || b == b'n').count();
        Some(n as f64 / self.seq.len() as f64 * 100.0)
    }
}

/// Reads every record of a FASTA file.
pub fn read_fasta(infile: &str) -> anyhow::Result<Vec<SeqRecord>> {
    let reader = crate::reader(infile)?;
    let mut fa_in = noodles_fasta::io::Reader::new(reader);

    let mut records = vec![];
    for result in fa_in.records() {
        let record = result?;
        let id = String::from_utf8(record.name().into())?;
        let seq = String::from_utf8(record.sequence().as_ref().to_vec())?;
        records.push(SeqRecord { id, seq });
    }

    Ok(records)
}

/// Writes records as unwrapped FASTA, one `>id` line and one sequence line each.
pub fn write_fasta<'a, W, I>(writer: &mut W, records: I) -> anyhow::Result<()>
where
    W: Write + ?Sized,
    I: IntoIterator<Item = &'a SeqRecord>,
{
    for rec in records {
        writer.write_fmt(format_args!(">{}\n{}\n", rec.id, rec.seq))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_read_fasta() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("in.fa");
        std::fs::write(&path, ">s1 desc\nACGT\nAC\n>s2\nNNNN\n").unwrap();

        let records = read_fasta(path.to_str().unwrap()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], SeqRecord::new("s1", "ACGTAC"));
        assert_eq!(records[1].n_percent(), Some(100.0));
    }

    #[test]
    fn test_write_fasta() {
        let records = vec![SeqRecord::new("a", "AC"), SeqRecord::new("b", "GT")];
        let mut out: Vec<u8> = vec![];
        write_fasta(&mut out, &records).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), ">a\nAC\n>b\nGT\n");
    }
}
