extern crate clap;
use clap::*;

mod cmd_hapr;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let app = Command::new("hapr")
        .version(crate_version!())
        .author(crate_authors!())
        .about("`hapr` - Haplotype alignment preparation")
        .propagate_version(true)
        .arg_required_else_help(true)
        .color(ColorChoice::Auto)
        .subcommand(cmd_hapr::collapse::make_subcommand())
        .subcommand(cmd_hapr::rename::make_subcommand())
        .subcommand(cmd_hapr::expand::make_subcommand())
        .subcommand(cmd_hapr::expand_matrix::make_subcommand())
        .subcommand(cmd_hapr::traits::make_subcommand())
        .subcommand(cmd_hapr::outgroups::make_subcommand())
        .after_help(
            r###"Subcommand groups:

* Haplotypes:
    * collapse      - Collapse identical sequences into haplotypes
    * rename        - Name collapsed haplotypes and write the key file

* Individuals:
    * expand        - Repeat each NEXUS record by its count
    * expand-matrix - Repeat MATRIX rows in place, keeping the rest of the file

* Annotation:
    * traits        - Append a PopART TRAITS block of regions
    * outgroups     - Fetch outgroup accessions from NCBI

"###,
        );

    // Usage errors exit with 1, help and version with 0
    let matches = match app.try_get_matches() {
        Ok(matches) => matches,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            e.print()?;
            std::process::exit(code);
        }
    };

    // Check which subcommand the user ran...
    match matches.subcommand() {
        Some(("collapse", sub_matches)) => cmd_hapr::collapse::execute(sub_matches),
        Some(("rename", sub_matches)) => cmd_hapr::rename::execute(sub_matches),
        Some(("expand", sub_matches)) => cmd_hapr::expand::execute(sub_matches),
        Some(("expand-matrix", sub_matches)) => cmd_hapr::expand_matrix::execute(sub_matches),
        Some(("traits", sub_matches)) => cmd_hapr::traits::execute(sub_matches),
        Some(("outgroups", sub_matches)) => cmd_hapr::outgroups::execute(sub_matches),
        _ => unreachable!(),
    }?;

    Ok(())
}
