use anyhow::Context;
use clap::*;
use hapr::libs::counts::load_counts;
use hapr::libs::matrix::MatrixDocument;
use std::io::Write;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("expand-matrix")
        .about("Repeats MATRIX rows of a NEXUS file by per-sample counts, in place")
        .after_help(
            r###"
Edits only the MATRIX of the `BEGIN DATA;` block: each row is repeated as many
times as the count of its label. The first copy keeps the label, the others get
`_2`, `_3`, ... The last `NTAX=` before `MATRIX` is set to the new number of
taxa. In an interleaved matrix every block gets the copies. All other bytes of the file are written back unchanged.

The counts file is the same as for `hapr expand`.

Notes:
* The DATA block must have a `MATRIX` line of its own and end the matrix with a
  line starting with `;`
* Every row must be `label<whitespace>data`

Examples:
1. Expand rows of an alignment carrying other blocks:
   hapr expand-matrix -i mtDNA_concat.nex -c sample_to_region.tsv -o mtDNA_rows.nex

"###,
        )
        .arg(
            Arg::new("input")
                .long("input")
                .short('i')
                .num_args(1)
                .required(true)
                .help("Input NEXUS file"),
        )
        .arg(
            Arg::new("counts")
                .long("counts")
                .short('c')
                .num_args(1)
                .required(true)
                .help("TSV file with sample and count columns"),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .num_args(1)
                .required(true)
                .help("Output NEXUS file. [stdout] for screen"),
        )
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    //----------------------------
    // Args
    //----------------------------
    let input = args.get_one::<String>("input").unwrap();
    let counts = load_counts(args.get_one::<String>("counts").unwrap())?;

    //----------------------------
    // Operating
    //----------------------------
    let text = hapr::read_to_string(input)?;
    let doc = MatrixDocument::parse(&text).with_context(|| format!("{} is not usable", input))?;
    let expanded = doc.expand(&counts);

    for label in &expanded.collisions {
        log::warn!("Label {} is written for more than one taxon", label);
    }
    log::info!(
        "{} taxa in {} rows expanded to NTAX={}",
        doc.taxa().len(),
        doc.rows().count(),
        expanded.ntax
    );

    //----------------------------
    // Output
    //----------------------------
    let mut writer = hapr::writer(args.get_one::<String>("output").unwrap())?;
    writer.write_all(expanded.text.as_bytes())?;
    writer.flush()?;

    Ok(())
}
