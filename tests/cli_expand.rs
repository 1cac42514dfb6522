use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

#[test]
fn command_expand() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let output = temp.path().join("out.nex");

    let mut cmd = Command::cargo_bin("hapr")?;
    cmd.arg("expand")
        .arg("-i")
        .arg("tests/nexus/collapsed.nex")
        .arg("-c")
        .arg("tests/tsv/counts.tsv")
        .arg("-o")
        .arg(&output);
    cmd.assert().success();

    let nex = fs::read_to_string(&output)?;
    assert!(nex.contains("dimensions ntax=6 nchar=10;"));

    let labels: Vec<_> = nex
        .lines()
        .skip_while(|l| *l != "matrix")
        .skip(1)
        .take_while(|l| *l != ";")
        .map(|l| l.split_whitespace().next().unwrap().to_string())
        .collect();
    assert_eq!(labels, vec!["H1_1", "H1_2", "H1_3", "H2_1", "H2_2", "H3_1"]);

    Ok(())
}

#[test]
fn command_expand_stdout() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("hapr")?;
    let output = cmd
        .arg("expand")
        .arg("--input")
        .arg("tests/nexus/collapsed.nex")
        .arg("--counts")
        .arg("tests/tsv/counts.tsv")
        .arg("--output")
        .arg("stdout")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;

    assert_eq!(stdout.matches("ACGTACGTAC").count(), 3);
    assert_eq!(stdout.matches("ACGTAC--TC").count(), 1);

    Ok(())
}

#[test]
fn command_expand_missing_arg() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("hapr")?;
    cmd.arg("expand").arg("-i").arg("tests/nexus/collapsed.nex");
    cmd.assert().failure().code(1);

    Ok(())
}

#[test]
fn command_expand_not_nexus() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let output = temp.path().join("out.nex");

    let mut cmd = Command::cargo_bin("hapr")?;
    cmd.arg("expand")
        .arg("-i")
        .arg("tests/fasta/haps.fa")
        .arg("-c")
        .arg("tests/tsv/counts.tsv")
        .arg("-o")
        .arg(&output);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("no DATA or CHARACTERS block"));

    Ok(())
}

#[test]
fn command_expand_matrix() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let output = temp.path().join("out.nex");

    let mut cmd = Command::cargo_bin("hapr")?;
    cmd.arg("expand-matrix")
        .arg("-i")
        .arg("tests/nexus/collapsed.nex")
        .arg("-c")
        .arg("tests/tsv/counts.tsv")
        .arg("-o")
        .arg(&output);
    cmd.assert().success();

    let input = fs::read_to_string("tests/nexus/collapsed.nex")?;
    let nex = fs::read_to_string(&output)?;

    let expected = input
        .replace("NTAX=3 NCHAR=10", "NTAX=6 NCHAR=10")
        .replace(
            "\tH1\tACGTACGTAC\n",
            "\tH1\tACGTACGTAC\n\tH1_2\tACGTACGTAC\n\tH1_3\tACGTACGTAC\n",
        )
        .replace(
            "\tH2\tACGTACGTTC\n",
            "\tH2\tACGTACGTTC\n\tH2_2\tACGTACGTTC\n",
        );
    assert_eq!(nex, expected);
    // the TAXA block is left alone
    assert!(nex.contains("\tDIMENSIONS NTAX=3;\n"));

    Ok(())
}

#[test]
fn command_expand_matrix_interleaved() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let input = temp.path().join("interleaved.nex");
    fs::write(
        &input,
        "#NEXUS\nBEGIN DATA;\n  DIMENSIONS NTAX=2 NCHAR=8;\n  FORMAT DATATYPE=DNA INTERLEAVE;\nMATRIX\n\
         H1 ACGT\nH2 ACGA\n\nH1 TTTT\nH2 TTTA\n;\nEND;\n",
    )?;

    let mut cmd = Command::cargo_bin("hapr")?;
    let output = cmd
        .arg("expand-matrix")
        .arg("-i")
        .arg(&input)
        .arg("-c")
        .arg("tests/tsv/counts.tsv")
        .arg("-o")
        .arg("stdout")
        .output()?;
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;

    assert!(stdout.contains("DIMENSIONS NTAX=5 NCHAR=8;"));
    assert_eq!(stdout.matches("H1_3 ").count(), 2);
    assert_eq!(stdout.matches("H2_2 ").count(), 2);
    assert!(stdout.contains("H2_2 ACGA\n\nH1 TTTT\n"));

    Ok(())
}

#[test]
fn command_expand_matrix_errors() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let cases = [
        ("#NEXUS\n", "no `BEGIN DATA;` block found"),
        ("#NEXUS\nBEGIN DATA;\nMATRIX\nA AC\n;\n", "no closing `END;`"),
        ("#NEXUS\nBEGIN DATA;\nNTAX=1;\nEND;\n", "no `MATRIX` line"),
        ("#NEXUS\nBEGIN DATA;\nMATRIX\nA AC;\nEND;\n", "no terminating `;` line"),
        ("#NEXUS\nBEGIN DATA;\nMATRIX\nA\n;\nEND;\n", "malformed matrix row at line 4"),
    ];

    for (i, (text, message)) in cases.iter().enumerate() {
        let input = temp.path().join(format!("bad{}.nex", i));
        fs::write(&input, text)?;

        let mut cmd = Command::cargo_bin("hapr")?;
        cmd.arg("expand-matrix")
            .arg("-i")
            .arg(&input)
            .arg("-c")
            .arg("tests/tsv/counts.tsv")
            .arg("-o")
            .arg(temp.path().join("out.nex"));
        cmd.assert()
            .failure()
            .code(1)
            .stderr(predicate::str::contains(*message));
    }

    Ok(())
}
