use anyhow::{bail, Context};
use clap::*;
use hapr::libs::haplotype::collapse;
use hapr::libs::nexus::read_nexus;
use hapr::libs::record::{read_fasta, write_fasta};
use std::io::{BufRead, Write};
use std::path::Path;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("collapse")
        .about("Collapses identical sequences into haplotypes")
        .after_help(
            r###"
Collapses identical sequences of an alignment into one record per haplotype. The
header of each haplotype joins the identifiers of all records sharing its sequence
with `*`.

Notes:
* <filetype> containing `nex` reads NEXUS, containing `fa` reads FASTA.
  Anything else quits without doing anything
* Sequences are upper-cased before comparison
* Sequences shorter than <min_length>, or with more than <max_n> percent of `N`,
  are dropped
* Haplotypes go to `clear_<infile name>.fa`, next to the input
* The haplotypes are then renamed as in `hapr rename`. Without `--outroot` the
  root of the output names and whether to write a NEXUS matrix are asked for

Examples:
1. Collapse a FASTA alignment, answering the prompts:
   hapr collapse mtDNA.fa

2. Collapse a NEXUS alignment, dropping short and N-rich sequences:
   hapr collapse mtDNA.nex nexus 600 5 --outroot mtDNA --nexus

"###,
        )
        .arg(
            Arg::new("infile")
                .required(true)
                .num_args(1)
                .index(1)
                .help("Input alignment"),
        )
        .arg(
            Arg::new("filetype")
                .num_args(1)
                .index(2)
                .default_value("fasta")
                .help("Format of the input, `fasta` or `nexus`"),
        )
        .arg(
            Arg::new("min_length")
                .num_args(1)
                .index(3)
                .default_value("0")
                .value_parser(value_parser!(usize))
                .help("Minimum sequence length"),
        )
        .arg(
            Arg::new("max_n")
                .num_args(1)
                .index(4)
                .default_value("100")
                .value_parser(value_parser!(f64))
                .help("Maximum percentage of N"),
        )
        .arg(
            Arg::new("outroot")
                .long("outroot")
                .short('r')
                .num_args(1)
                .help("Root for the renamed outputs; skips the prompts"),
        )
        .arg(
            Arg::new("nexus")
                .long("nexus")
                .action(ArgAction::SetTrue)
                .requires("outroot")
                .help("With --outroot, also write a NEXUS matrix"),
        )
}

enum Format {
    Fasta,
    Nexus,
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    run(args).context("There is a problem")
}

fn run(args: &ArgMatches) -> anyhow::Result<()> {
    //----------------------------
    // Args
    //----------------------------
    let infile = args.get_one::<String>("infile").unwrap();
    let filetype = args.get_one::<String>("filetype").unwrap().to_lowercase();
    let min_length = *args.get_one::<usize>("min_length").unwrap();
    let max_n = *args.get_one::<f64>("max_n").unwrap();

    let format = if filetype.contains("nex") {
        Format::Nexus
    } else if filetype.contains("fa") {
        Format::Fasta
    } else {
        eprintln!("Unclear what filetype `{}` is... quitting", filetype);
        return Ok(());
    };

    //----------------------------
    // Collapse
    //----------------------------
    let records = match format {
        Format::Nexus => {
            log::info!("Infile is in Nexus format");
            read_nexus(infile)?
        }
        Format::Fasta => {
            log::info!("Infile is in fasta format");
            read_fasta(infile)?
        }
    };

    let haps = collapse(&records, min_length, max_n);

    let clear_file = clear_filename(infile);
    {
        let mut writer = hapr::writer(&clear_file)?;
        write_fasta(&mut writer, &haps)?;
        writer.flush()?;
    }
    log::info!(
        "{} holds your {} haplotypes from {} records",
        clear_file,
        haps.len(),
        records.len()
    );

    //----------------------------
    // Rename
    //----------------------------
    let (outroot, make_nex) = match args.get_one::<String>("outroot") {
        Some(outroot) => (outroot.to_string(), args.get_flag("nexus")),
        None => {
            println!("Now we'll clean up the taxon labels");
            let mut stdin = std::io::stdin().lock();
            let outroot = prompt(&mut stdin, "Root for outfiles: ")?;
            let answer = prompt(&mut stdin, "Make a Nexus file? y/n: ")?;
            (outroot, answer.contains(['y', 'Y']))
        }
    };
    if outroot.is_empty() {
        bail!("no root given for the output files");
    }

    super::rename::reduce(&clear_file, &outroot, make_nex)
}

// `clear_<file name>.fa` in the directory of the input
fn clear_filename(infile: &str) -> String {
    let path = Path::new(infile);
    let name = path
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| infile.to_string());

    path.with_file_name(format!("clear_{}.fa", name))
        .to_string_lossy()
        .to_string()
}

fn prompt<R: BufRead>(reader: &mut R, question: &str) -> anyhow::Result<String> {
    print!("{}", question);
    std::io::stdout().flush()?;

    let mut answer = String::new();
    reader.read_line(&mut answer)?;
    Ok(answer.trim().to_string())
}
