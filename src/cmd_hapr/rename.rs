use anyhow::bail;
use clap::*;
use hapr::libs::haplotype::name_haplotypes;
use hapr::libs::nexus::write_haps_nexus;
use hapr::libs::record::{read_fasta, write_fasta};
use std::io::Write;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("rename")
        .about("Names collapsed haplotypes after their first member and size")
        .after_help(
            r###"
Renames the records of a collapsed FASTA file, whose headers join the original
identifiers with `*`, as `<first id>_<number of ids>`.

Outputs:
* <outroot>.haps.fasta - the renamed haplotypes, sorted by their original header
* <outroot>.hapkey.txt - `<row> <name>: ['<id>', ...]`, one line per haplotype
* <outroot>.haps.nex   - the same matrix as NEXUS, with `--nexus`

Examples:
1. Rename and write a NEXUS matrix:
   hapr rename clear_mtDNA.fa.fa --outroot mtDNA --nexus

"###,
        )
        .arg(
            Arg::new("infile")
                .required(true)
                .num_args(1)
                .index(1)
                .help("Collapsed FASTA file"),
        )
        .arg(
            Arg::new("outroot")
                .long("outroot")
                .short('r')
                .num_args(1)
                .required(true)
                .help("Root for the output filenames"),
        )
        .arg(
            Arg::new("nexus")
                .long("nexus")
                .action(ArgAction::SetTrue)
                .help("Also write a NEXUS matrix"),
        )
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    let infile = args.get_one::<String>("infile").unwrap();
    let outroot = args.get_one::<String>("outroot").unwrap();
    let make_nex = args.get_flag("nexus");

    reduce(infile, outroot, make_nex)
}

/// Writes the renamed haplotypes, their key and optionally a NEXUS matrix.
pub fn reduce(infile: &str, outroot: &str, make_nex: bool) -> anyhow::Result<()> {
    //----------------------------
    // Input
    //----------------------------
    let records = read_fasta(infile)?;
    if records.is_empty() {
        bail!("{} holds no haplotypes", infile);
    }
    let haps = name_haplotypes(&records);

    //----------------------------
    // Output
    //----------------------------
    let fasta_file = format!("{}.haps.fasta", outroot);
    let key_file = format!("{}.hapkey.txt", outroot);
    {
        let mut fasta_out = hapr::writer(&fasta_file)?;
        let mut key_out = hapr::writer(&key_file)?;

        let renamed: Vec<_> = haps.iter().map(|hap| hap.to_record()).collect();
        write_fasta(&mut fasta_out, &renamed)?;
        for (i, hap) in haps.iter().enumerate() {
            key_out.write_fmt(format_args!("{}\n", hap.key_line(i)))?;
        }
        fasta_out.flush()?;
        key_out.flush()?;
    }
    log::info!("{} and {} written", fasta_file, key_file);

    if make_nex {
        // Dimensions come from the file just written
        let cleaned = read_fasta(&fasta_file)?;
        let nchar = cleaned.iter().map(|rec| rec.seq.len()).max().unwrap_or(0);
        log::info!(
            "Generating Nexus matrix with {} seqs and {} basepairs",
            cleaned.len(),
            nchar
        );

        let nex_file = format!("{}.haps.nex", outroot);
        let mut nex_out = hapr::writer(&nex_file)?;
        write_haps_nexus(&mut nex_out, &cleaned, infile, &key_file)?;
        nex_out.flush()?;
    } else {
        log::info!("Not generating a Nexus file");
    }

    Ok(())
}
