use clap::*;
use hapr::libs::counts::load_counts;
use hapr::libs::haplotype::{duplicated_ids, expand_records};
use hapr::libs::nexus::{read_nexus, write_nexus};
use std::io::Write;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("expand")
        .about("Expands a collapsed NEXUS alignment by per-haplotype counts")
        .after_help(
            r###"
Reverses collapsing: every record of the alignment is repeated as many times as
the count of its identifier, and the copies are named `<id>_1`, `<id>_2`, ...

The counts file is tab-separated with a header. Names are read from the `sample`
column, or `Sample`, or `taxon`; counts from the `count` column. Blank or
unparsable counts, and identifiers missing from the table, count as 1.

The output is a new NEXUS file holding only the expanded DATA block. Use
`hapr expand-matrix` to keep every other part of the input as is.

Examples:
1. Expand a haplotype alignment:
   hapr expand -i mtDNA_concat.nex -c sample_to_region.tsv -o mtDNA_expanded.nex

"###,
        )
        .arg(
            Arg::new("input")
                .long("input")
                .short('i')
                .num_args(1)
                .required(true)
                .help("Input NEXUS file (collapsed alignment)"),
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
                .help("Output NEXUS file (expanded alignment). [stdout] for screen"),
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
    let records = read_nexus(input)?;
    let expanded = expand_records(&records, &counts);
    log::info!(
        "{} records expanded to {} with {} counts",
        records.len(),
        expanded.len(),
        counts.len()
    );
    for id in duplicated_ids(expanded.iter().map(|rec| rec.id.as_str())) {
        log::warn!("Label {} occurs more than once in the output", id);
    }

    //----------------------------
    // Output
    //----------------------------
    let mut writer = hapr::writer(args.get_one::<String>("output").unwrap())?;
    write_nexus(&mut writer, &expanded)?;
    writer.flush()?;

    Ok(())
}
