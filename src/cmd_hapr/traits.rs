use clap::*;
use hapr::libs::counts::load_regions;
use hapr::libs::nexus::matrix_taxa;
use hapr::libs::traits::{append_block, sort_regions, traits_block};
use std::io::Write;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("traits")
        .about("Appends a PopART TRAITS block of sample regions to a NEXUS alignment")
        .after_help(
            r###"
Reads a tab-separated table with `sample`, `region` and `count` columns and writes
a copy of the alignment followed by a TRAITS block, one 0/1 column per region.

Notes:
* Each row stands for `count` taxa: the sample itself, then `<sample>_2`,
  `<sample>_3`, ... A sample on several rows continues its numbering
* Regions starting with `E` are kept whole (EA, EB, ...); other regions are cut
  to their first letter
* Rows with region `NA` (outgroups) or an unparsable count are skipped
* Taxa of the MATRIX without a region are left out of the TRAITS matrix
* Trait labels are ordered by length, then alphabetically

Examples:
1. Add regions for PopART:
   hapr traits sample_to_region.tsv mtDNA.nex mtDNA_traits.nex

"###,
        )
        .arg(
            Arg::new("sample_table")
                .required(true)
                .num_args(1)
                .index(1)
                .help("Sample to region table"),
        )
        .arg(
            Arg::new("infile")
                .required(true)
                .num_args(1)
                .index(2)
                .help("Input NEXUS alignment"),
        )
        .arg(
            Arg::new("outfile")
                .required(true)
                .num_args(1)
                .index(3)
                .help("Output NEXUS file. [stdout] for screen"),
        )
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    //----------------------------
    // Args
    //----------------------------
    let sample_table = args.get_one::<String>("sample_table").unwrap();
    let infile = args.get_one::<String>("infile").unwrap();

    //----------------------------
    // Operating
    //----------------------------
    let table = load_regions(sample_table)?;
    let order = sort_regions(&table.regions);

    let nexus = hapr::read_to_string(infile)?;
    let taxa = matrix_taxa(&nexus);
    let block = traits_block(&taxa, &table.region_of, &order);
    log::info!(
        "{} taxa in the MATRIX, {} regions: {}",
        taxa.len(),
        order.len(),
        order.join(" ")
    );

    //----------------------------
    // Output
    //----------------------------
    let mut writer = hapr::writer(args.get_one::<String>("outfile").unwrap())?;
    writer.write_all(append_block(&nexus, &block).as_bytes())?;
    writer.flush()?;

    Ok(())
}
