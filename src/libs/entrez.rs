//! Outgroup accessions from the NCBI nucleotide database.
//!
//! The database is reached through the [`NucleotideDb`] trait; [`Entrez`]
//! implements it with the E-utilities `esearch`/`efetch` endpoints.

use anyhow::{anyhow, Context};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;

/// Voucher codes of the outgroup specimens.
pub const CODES: [&str; 9] = [
    "SGR3",
    "SGR4",
    "MVZ241596",
    "MVZ237413",
    "JWA338",
    "JWA470",
    "CAS229140",
    "CAS223822",
    "MVZ149956",
];

pub const ORGANISM: &str = "Sceloporus graciosus";

/// Accession range the published outgroup sequences fall in.
pub const ACCESSION_RANGE: &str = "KC853700:KC854199";

pub const CYTB_TERMS: &str = "cytochrome b[Title] OR cytb[Title]";

pub const ND1_TERMS: &str = r#"ND1[Gene] OR "NADH dehydrogenase subunit 1"[Title] OR NADH1[Title]"#;

const CYTB_KEYWORDS: [&str; 3] = ["cytochrome b", "cytb", "cob"];

const ND1_KEYWORDS: [&str; 4] = ["nd1", "nadh dehydrogenase subunit 1", "nadh1", "nadh"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Gene {
    Cytb,
    Nd1,
}

impl Gene {
    pub const ALL: [Gene; 2] = [Gene::Cytb, Gene::Nd1];

    pub fn name(&self) -> &'static str {
        match self {
            Gene::Cytb => "cytb",
            Gene::Nd1 => "nd1",
        }
    }
}

/// Guesses the gene of a record from its description.
///
/// Matching is case-insensitive. When both keyword sets match, cytb wins.
///
/// ```
/// use hapr::libs::entrez::{classify_gene, Gene};
/// assert_eq!(classify_gene("Sceloporus graciosus Cytochrome b gene"), Some(Gene::Cytb));
/// assert_eq!(classify_gene("voucher JWA338 NADH1 gene, partial cds"), Some(Gene::Nd1));
/// assert_eq!(classify_gene("12S ribosomal RNA gene"), None);
/// ```
pub fn classify_gene(description: &str) -> Option<Gene> {
    let defline = description.to_lowercase();
    if CYTB_KEYWORDS.iter().any(|k| defline.contains(k)) {
        Some(Gene::Cytb)
    } else if ND1_KEYWORDS.iter().any(|k| defline.contains(k)) {
        Some(Gene::Nd1)
    } else {
        None
    }
}

/// The parts of a GenBank record used here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenbankSummary {
    /// Versioned identifier, e.g. `KC853701.1`
    pub id: String,
    pub description: String,
    pub accessions: Vec<String>,
}

impl GenbankSummary {
    /// The primary accession, or the identifier when there is none.
    pub fn accession(&self) -> &str {
        self.accessions
            .first()
            .map(|s| s.as_str())
            .unwrap_or(self.id.as_str())
    }
}

pub trait NucleotideDb {
    /// Identifiers of the records matching an Entrez query.
    fn search(&self, term: &str) -> anyhow::Result<Vec<String>>;

    /// One record by identifier.
    fn fetch(&self, id: &str) -> anyhow::Result<GenbankSummary>;
}

/// Gene, then voucher code, to accessions.
pub type AccessionTable = BTreeMap<Gene, BTreeMap<String, BTreeSet<String>>>;

/// ```
/// let query = hapr::libs::entrez::build_query("cytb[Title]", "SGR3");
/// assert_eq!(
///     query,
///     r#""Sceloporus graciosus"[Organism] AND (cytb[Title]) AND (SGR3[All Fields]) AND (KC853700:KC854199[ACCN])"#
/// );
/// ```
pub fn build_query(gene_terms: &str, code: &str) -> String {
    format!(
        "\"{}\"[Organism] AND ({}) AND ({}[All Fields]) AND ({}[ACCN])",
        ORGANISM, gene_terms, code, ACCESSION_RANGE
    )
}

/// Searches every code with one set of gene terms and files each hit under
/// the gene its description names.
pub fn search_accessions<D: NucleotideDb + ?Sized>(
    db: &D,
    codes: &[&str],
    gene_terms: &str,
    table: &mut AccessionTable,
) -> anyhow::Result<()> {
    for code in codes {
        let query = build_query(gene_terms, code);
        let ids = db
            .search(&query)
            .with_context(|| format!("search failed for {}", code))?;

        for id in ids {
            log::info!("Fetching GI {} for code {}...", id, code);
            let record = db.fetch(&id)?;
            let defline = record.description.to_lowercase();
            log::debug!("{}: {}", record.accession(), defline);

            match classify_gene(&defline) {
                Some(gene) => {
                    table
                        .entry(gene)
                        .or_default()
                        .entry(code.to_string())
                        .or_default()
                        .insert(record.accession().to_string());
                }
                None => {
                    log::warn!(
                        "Could not determine gene for GI {} with defline: {}",
                        id,
                        defline
                    );
                }
            }
        }
    }

    Ok(())
}

/// Runs the cytb and ND1 searches for all outgroup codes.
pub fn fetch_outgroups<D: NucleotideDb + ?Sized>(db: &D, codes: &[&str]) -> anyhow::Result<AccessionTable> {
    let mut table = AccessionTable::new();
    search_accessions(db, codes, CYTB_TERMS, &mut table)?;
    search_accessions(db, codes, ND1_TERMS, &mut table)?;
    Ok(table)
}

/// Writes `code<TAB>accession` lines of one gene, sorted.
pub fn write_accessions<W: Write + ?Sized>(
    writer: &mut W,
    table: &AccessionTable,
    gene: Gene,
) -> anyhow::Result<()> {
    if let Some(code_of) = table.get(&gene) {
        for (code, accs) in code_of {
            for acc in accs {
                writer.write_fmt(format_args!("{}\t{}\n", code, acc))?;
            }
        }
    }
    Ok(())
}

/// Summary of the first record of a GenBank flat file.
pub fn parse_genbank(text: &str, id: &str) -> anyhow::Result<GenbankSummary> {
    let seq = gb_io::reader::SeqReader::new(text.as_bytes())
        .next()
        .ok_or_else(|| anyhow!("no GenBank record returned for {}", id))?
        .with_context(|| format!("could not parse the GenBank record of {}", id))?;

    let description = seq
        .definition
        .as_deref()
        .unwrap_or("")
        .trim()
        .trim_end_matches('.')
        .to_string();
    let accessions = seq
        .accession
        .as_deref()
        .unwrap_or("")
        .split_whitespace()
        .map(|s| s.to_string())
        .collect();
    let id = seq
        .version
        .clone()
        .or_else(|| seq.name.clone())
        .unwrap_or_else(|| id.to_string());

    Ok(GenbankSummary {
        id,
        description,
        accessions,
    })
}

#[derive(Debug, Deserialize)]
struct ESearchResponse {
    esearchresult: ESearchResult,
}

#[derive(Debug, Deserialize)]
struct ESearchResult {
    #[serde(default)]
    idlist: Vec<String>,
}

/// Identifiers listed in an `esearch` JSON body.
pub fn parse_esearch(body: &str) -> anyhow::Result<Vec<String>> {
    let response: ESearchResponse =
        serde_json::from_str(body).context("unexpected esearch response")?;
    Ok(response.esearchresult.idlist)
}

/// Blocking client of the NCBI E-utilities.
pub struct Entrez {
    client: reqwest::blocking::Client,
    base: String,
    email: Option<String>,
    api_key: Option<String>,
}

impl Entrez {
    pub const BASE_URL: &'static str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";

    /// Most matches a single search returns.
    pub const RETMAX: usize = 200;

    pub fn new(base: &str, email: Option<&str>, api_key: Option<&str>) -> anyhow::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("hapr/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("could not build the HTTP client")?;

        Ok(Self {
            client,
            base: base.trim_end_matches('/').to_string(),
            email: email.map(|s| s.to_string()),
            api_key: api_key.map(|s| s.to_string()),
        })
    }

    fn params(&self, extra: &[(&str, String)]) -> Vec<(String, String)> {
        let mut params: Vec<(String, String)> = vec![
            ("db".to_string(), "nuccore".to_string()),
            ("tool".to_string(), "hapr".to_string()),
        ];
        if let Some(email) = &self.email {
            params.push(("email".to_string(), email.clone()));
        }
        if let Some(key) = &self.api_key {
            params.push(("api_key".to_string(), key.clone()));
        }
        params.extend(extra.iter().map(|(k, v)| (k.to_string(), v.clone())));
        params
    }
}

impl NucleotideDb for Entrez {
    fn search(&self, term: &str) -> anyhow::Result<Vec<String>> {
        let url = format!("{}/esearch.fcgi", self.base);
        let params = self.params(&[
            ("term", term.to_string()),
            ("retmax", Self::RETMAX.to_string()),
            ("retmode", "json".to_string()),
        ]);

        let body = self
            .client
            .get(&url)
            .query(&params)
            .send()?
            .error_for_status()?
            .text()?;

        parse_esearch(&body)
    }

    fn fetch(&self, id: &str) -> anyhow::Result<GenbankSummary> {
        let url = format!("{}/efetch.fcgi", self.base);
        let params = self.params(&[
            ("id", id.to_string()),
            ("rettype", "gb".to_string()),
            ("retmode", "text".to_string()),
        ]);

        let text = self
            .client
            .get(&url)
            .query(&params)
            .send()?
            .error_for_status()?
            .text()?;

        parse_genbank(&text, id)
    }
}
