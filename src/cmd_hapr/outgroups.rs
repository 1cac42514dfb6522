use anyhow::Context;
use clap::*;
use hapr::libs::entrez::{fetch_outgroups, write_accessions, Entrez, Gene, CODES};
use std::io::Write;
use std::path::Path;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("outgroups")
        .about("Fetches cytb and ND1 accessions of the outgroup specimens from NCBI")
        .after_help(
            r###"
Searches the NCBI nucleotide database for the Sceloporus graciosus outgroup
vouchers (SGR3, SGR4, MVZ241596, MVZ237413, JWA338, JWA470, CAS229140,
CAS223822, MVZ149956) within the accessions KC853700:KC854199, once with
cytochrome b terms and once with ND1 terms.

Each hit is fetched and filed under cytb or nd1 according to its description;
hits naming neither gene are reported and dropped.

Outputs, as `code<TAB>accession` sorted lines:
* <outdir>/acc_outgroups_cytb.tsv
* <outdir>/acc_outgroups_nd1.tsv

Examples:
1. Fetch into the default directory:
   hapr outgroups --email me@example.org

"###,
        )
        .arg(
            Arg::new("outdir")
                .long("outdir")
                .short('o')
                .num_args(1)
                .default_value("../data/sequences_by_gene")
                .help("Output directory"),
        )
        .arg(
            Arg::new("email")
                .long("email")
                .num_args(1)
                .env("NCBI_EMAIL")
                .help("Contact address sent to NCBI"),
        )
        .arg(
            Arg::new("api_key")
                .long("api-key")
                .num_args(1)
                .env("NCBI_API_KEY")
                .hide_env_values(true)
                .help("NCBI API key"),
        )
        .arg(
            Arg::new("eutils")
                .long("eutils")
                .num_args(1)
                .default_value(Entrez::BASE_URL)
                .hide(true)
                .help("Base URL of the E-utilities"),
        )
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    //----------------------------
    // Args
    //----------------------------
    let outdir = Path::new(args.get_one::<String>("outdir").unwrap());
    let entrez = Entrez::new(
        args.get_one::<String>("eutils").unwrap(),
        args.get_one::<String>("email").map(|s| s.as_str()),
        args.get_one::<String>("api_key").map(|s| s.as_str()),
    )?;

    //----------------------------
    // Operating
    //----------------------------
    let table = fetch_outgroups(&entrez, &CODES)?;

    //----------------------------
    // Output
    //----------------------------
    std::fs::create_dir_all(outdir)
        .with_context(|| format!("could not create {}", outdir.display()))?;
    for gene in Gene::ALL {
        let path = outdir.join(format!("acc_outgroups_{}.tsv", gene.name()));
        let path = path.to_string_lossy();

        let mut writer = hapr::writer(&path)?;
        write_accessions(&mut writer, &table, gene)?;
        writer.flush()?;
        log::info!("Written: {}", path);
    }

    Ok(())
}
