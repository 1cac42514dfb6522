use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

#[test]
fn command_collapse_fasta() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let input = temp.path().join("mt.fa");
    fs::copy("tests/fasta/haps.fa", &input)?;

    let mut cmd = Command::cargo_bin("hapr")?;
    cmd.current_dir(temp.path())
        .arg("collapse")
        .arg("mt.fa")
        .arg("--outroot")
        .arg("mt");
    cmd.assert().success();

    let clear = fs::read_to_string(temp.path().join("clear_mt.fa.fa"))?;
    assert_eq!(
        clear,
        ">S1*S2*S4\nACGTACGTAC\n>S3\nACGTACGTTC\n>S5\nNNNNNNGTAC\n"
    );

    let haps = fs::read_to_string(temp.path().join("mt.haps.fasta"))?;
    assert_eq!(
        haps,
        ">S1_3\nACGTACGTAC\n>S3_1\nACGTACGTTC\n>S5_1\nNNNNNNGTAC\n"
    );

    let key = fs::read_to_string(temp.path().join("mt.hapkey.txt"))?;
    assert_eq!(
        key,
        "0 S1_3: ['S1', 'S2', 'S4']\n1 S3_1: ['S3']\n2 S5_1: ['S5']\n"
    );

    assert!(!temp.path().join("mt.haps.nex").exists());

    Ok(())
}

#[test]
fn command_collapse_filters_and_nexus() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let input = temp.path().join("mt.fa");
    fs::copy("tests/fasta/haps.fa", &input)?;

    let mut cmd = Command::cargo_bin("hapr")?;
    cmd.current_dir(temp.path())
        .arg("collapse")
        .arg("mt.fa")
        .arg("fasta")
        .arg("10")
        .arg("50")
        .arg("--outroot")
        .arg("mt")
        .arg("--nexus");
    cmd.assert().success();

    let clear = fs::read_to_string(temp.path().join("clear_mt.fa.fa"))?;
    assert!(!clear.contains("S5"));
    assert_eq!(clear.lines().count(), 4);

    let nex = fs::read_to_string(temp.path().join("mt.haps.nex"))?;
    assert!(nex.starts_with("#NEXUS\n"));
    assert!(nex.contains("[mt.hapkey.txt holds the haplotype designations]"));
    assert!(nex.contains("\tdimensions ntax=2 nchar=10;\n"));
    assert!(nex.contains("\t\tS1_3\t\tACGTACGTAC\n\t\tS3_1\t\tACGTACGTTC\n;\nEND;"));

    Ok(())
}

#[test]
fn command_collapse_prompts() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    fs::copy("tests/nexus/collapsed.nex", temp.path().join("aln.nex"))?;

    let mut cmd = Command::cargo_bin("hapr")?;
    cmd.current_dir(temp.path())
        .arg("collapse")
        .arg("aln.nex")
        .arg("NEXUS")
        .write_stdin("aln\nY\n");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Root for outfiles: "))
        .stdout(predicate::str::contains("Make a Nexus file? y/n: "));

    assert!(temp.path().join("clear_aln.nex.fa").exists());
    assert!(temp.path().join("aln.haps.nex").exists());
    let haps = fs::read_to_string(temp.path().join("aln.haps.fasta"))?;
    assert_eq!(haps.lines().count(), 6);
    assert!(haps.contains(">H3_1\nACGTAC--TC\n"));

    Ok(())
}

#[test]
fn command_collapse_unknown_filetype() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    fs::copy("tests/fasta/haps.fa", temp.path().join("mt.fa"))?;

    let mut cmd = Command::cargo_bin("hapr")?;
    cmd.current_dir(temp.path())
        .arg("collapse")
        .arg("mt.fa")
        .arg("phylip");
    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Unclear what filetype"));

    assert!(!temp.path().join("clear_mt.fa.fa").exists());

    Ok(())
}

#[test]
fn command_collapse_missing_file() -> anyhow::Result<()> {
    let temp = TempDir::new()?;

    let mut cmd = Command::cargo_bin("hapr")?;
    cmd.current_dir(temp.path())
        .arg("collapse")
        .arg("absent.fa")
        .arg("--outroot")
        .arg("x");
    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("There is a problem"));

    Ok(())
}

#[test]
fn command_rename() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let input = temp.path().join("clear.fa");
    fs::write(&input, ">B*C\nACGT\n>A\nACGA\n")?;

    let mut cmd = Command::cargo_bin("hapr")?;
    cmd.current_dir(temp.path())
        .arg("rename")
        .arg("clear.fa")
        .arg("--outroot")
        .arg("out");
    cmd.assert().success();

    let haps = fs::read_to_string(temp.path().join("out.haps.fasta"))?;
    assert_eq!(haps, ">A_1\nACGA\n>B_2\nACGT\n");

    Ok(())
}
