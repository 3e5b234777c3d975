use assert_cmd::prelude::*;
use assert_fs::{prelude::*, TempDir};
use std::process::Command;

type TestResult = Result<(), Box<dyn std::error::Error>>;

const EXAMPLE: &str = "@article{key1, title={A Study}, author={Doe, Jane}, year={2023}}\n";

const TWO_ENTRIES: &str = "\
@software{tool2022,
  title   = {A Tool},
  author  = {Smith, John},
  year    = {2022},
  version = {2.1.0}
}

@article{key1, title={A Study}, author={Doe, Jane}, year={2023}}
";

fn bibtex2cff(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("bibtex2cff").expect("bibtex2cff binary is built for tests");
    cmd.current_dir(dir.path());
    cmd
}

fn temp_dir_with(name: &str, content: &str) -> Result<TempDir, Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    dir.child(name).write_str(content)?;
    Ok(dir)
}

fn read_yaml(dir: &TempDir, name: &str) -> Result<serde_yaml::Value, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(dir.child(name).path())?;
    Ok(serde_yaml::from_str(&content)?)
}

// We check the --help output in order to confirm that the clap cli is setup correctly.
// Any arguments that are incorrectly will cause clap to panic regardless of the arguments or
// options provided.
#[test]
fn check_clap_cli_help() -> TestResult {
    let mut cmd = Command::cargo_bin("bibtex2cff")?;

    cmd.arg("--help");
    cmd.assert().success();

    let mut cmd = Command::cargo_bin("bibtex2cff")?;
    cmd.args(["authors", "--help"]);
    cmd.assert().success();

    Ok(())
}

#[test]
fn converts_example_to_citation_cff() -> TestResult {
    let dir = temp_dir_with("refs.bib", EXAMPLE)?;

    bibtex2cff(&dir).arg("refs.bib").assert().success();

    let yaml = read_yaml(&dir, "CITATION.cff")?;
    assert_eq!(Some("1.2.0"), yaml["cff-version"].as_str());
    assert_eq!(Some("A Study"), yaml["title"].as_str());
    assert_eq!(Some("Doe"), yaml["authors"][0]["family-names"].as_str());
    assert_eq!(Some("Jane"), yaml["authors"][0]["given-names"].as_str());
    assert_eq!(Some("2023-01-01"), yaml["date-released"].as_str());

    Ok(())
}

#[test]
fn bibfile_without_extension_gets_bib() -> TestResult {
    let dir = temp_dir_with("refs.bib", EXAMPLE)?;

    bibtex2cff(&dir).arg("refs").assert().success();
    assert!(dir.child("CITATION.cff").path().exists());

    Ok(())
}

#[test]
fn bibfile_with_other_extension_is_rejected() -> TestResult {
    let dir = temp_dir_with("refs.txt", EXAMPLE)?;

    bibtex2cff(&dir).arg("refs.txt").assert().failure().code(2);
    assert!(!dir.child("CITATION.cff").path().exists());

    Ok(())
}

#[test]
fn outfile_option() -> TestResult {
    let dir = temp_dir_with("refs.bib", EXAMPLE)?;

    bibtex2cff(&dir)
        .args(["refs.bib", "-o", "cite.cff"])
        .assert()
        .success();

    assert!(dir.child("cite.cff").path().exists());
    assert!(!dir.child("CITATION.cff").path().exists());

    Ok(())
}

#[test]
fn existing_outfile_is_overwritten() -> TestResult {
    let dir = temp_dir_with("refs.bib", EXAMPLE)?;
    dir.child("CITATION.cff").write_str(&"stale contents\n".repeat(100))?;

    bibtex2cff(&dir).arg("refs.bib").assert().success();

    let content = std::fs::read_to_string(dir.child("CITATION.cff").path())?;
    assert!(!content.contains("stale contents"));

    Ok(())
}

#[test]
fn missing_title_fails_without_output() -> TestResult {
    let dir = temp_dir_with("refs.bib", "@article{key1, author={Doe, Jane}, year={2023}}\n")?;

    let output = bibtex2cff(&dir).arg("refs.bib").output()?;

    assert_eq!(Some(2), output.status.code());
    let stderr = String::from_utf8(output.stderr)?;
    assert!(stderr.contains("title"), "{stderr}");
    assert!(stderr.contains("key1"), "{stderr}");
    assert!(!dir.child("CITATION.cff").path().exists());

    Ok(())
}

#[test]
fn unbalanced_brace_fails_without_output() -> TestResult {
    let dir = temp_dir_with(
        "refs.bib",
        "@article{key1, title={A Study, author={Doe, Jane}, year={2023}}\n",
    )?;

    let output = bibtex2cff(&dir).arg("refs.bib").output()?;

    assert_eq!(Some(2), output.status.code());
    assert!(String::from_utf8(output.stderr)?.contains("Parse error"));
    assert!(!dir.child("CITATION.cff").path().exists());

    Ok(())
}

#[test]
fn unwritable_outfile_fails_and_keeps_input() -> TestResult {
    let dir = temp_dir_with("refs.bib", EXAMPLE)?;

    let output = bibtex2cff(&dir)
        .args(["refs.bib", "-o", "missing/dir/CITATION.cff"])
        .output()?;

    assert_eq!(Some(2), output.status.code());
    assert!(String::from_utf8(output.stderr)?.contains("IO error"));
    assert_eq!(
        EXAMPLE,
        std::fs::read_to_string(dir.child("refs.bib").path())?
    );

    Ok(())
}

#[test]
fn stdout_prints_instead_of_writing() -> TestResult {
    let dir = temp_dir_with("refs.bib", EXAMPLE)?;

    let output = bibtex2cff(&dir).args(["refs.bib", "--stdout"]).output()?;

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.starts_with("# This CITATION.cff file was generated with bibtex2cff"));
    assert!(stdout.contains("title: A Study"));
    assert!(!dir.child("CITATION.cff").path().exists());

    Ok(())
}

#[test]
fn finds_single_bib_file_in_current_directory() -> TestResult {
    let dir = temp_dir_with("refs.bib", EXAMPLE)?;

    bibtex2cff(&dir).assert().success();
    assert!(dir.child("CITATION.cff").path().exists());

    Ok(())
}

#[test]
fn no_bib_file_in_current_directory() -> TestResult {
    let dir = TempDir::new()?;

    let output = bibtex2cff(&dir).output()?;

    assert_eq!(Some(2), output.status.code());
    assert!(String::from_utf8(output.stderr)?.contains("No .bib file found"));

    Ok(())
}

#[test]
fn first_entry_is_converted_by_default() -> TestResult {
    let dir = temp_dir_with("refs.bib", TWO_ENTRIES)?;

    let output = bibtex2cff(&dir).arg("refs.bib").output()?;
    assert!(output.status.success());
    assert!(String::from_utf8(output.stderr)?.contains("Found 2 entries"));

    let yaml = read_yaml(&dir, "CITATION.cff")?;
    assert_eq!(Some("A Tool"), yaml["title"].as_str());
    assert_eq!(Some("software"), yaml["type"].as_str());
    assert_eq!(Some("2.1.0"), yaml["version"].as_str());

    Ok(())
}

#[test]
fn cite_selects_the_entry() -> TestResult {
    let dir = temp_dir_with("refs.bib", TWO_ENTRIES)?;

    bibtex2cff(&dir)
        .args(["refs.bib", "--cite", "key1"])
        .assert()
        .success();

    let yaml = read_yaml(&dir, "CITATION.cff")?;
    assert_eq!(Some("A Study"), yaml["title"].as_str());

    bibtex2cff(&dir)
        .args(["refs.bib", "-c", "unknown"])
        .assert()
        .failure()
        .code(2);

    Ok(())
}

#[test]
fn override_options() -> TestResult {
    let dir = temp_dir_with("refs.bib", EXAMPLE)?;

    bibtex2cff(&dir)
        .args([
            "refs.bib",
            "--license",
            "apache-2.0",
            "--version-string",
            "1.2.3",
            "--doi",
            "https://doi.org/10.5281/zenodo.42",
            "--repository-code",
            "https://github.com/acme/study",
            "--keyword",
            "bibtex",
            "--keyword",
            "cff",
            "--date-released",
            "2024-02-29",
        ])
        .assert()
        .success();

    let yaml = read_yaml(&dir, "CITATION.cff")?;
    assert_eq!(Some("Apache-2.0"), yaml["license"].as_str());
    assert_eq!(Some("1.2.3"), yaml["version"].as_str());
    assert_eq!(Some("10.5281/zenodo.42"), yaml["doi"].as_str());
    assert_eq!(
        Some("https://github.com/acme/study"),
        yaml["repository-code"].as_str()
    );
    assert_eq!(Some("cff"), yaml["keywords"][1].as_str());
    assert_eq!(Some("2024-02-29"), yaml["date-released"].as_str());

    Ok(())
}

#[test]
fn invalid_override_fails() -> TestResult {
    let dir = temp_dir_with("refs.bib", EXAMPLE)?;

    bibtex2cff(&dir)
        .args(["refs.bib", "--commit", "not-a-hash"])
        .assert()
        .failure()
        .code(2);
    assert!(!dir.child("CITATION.cff").path().exists());

    Ok(())
}

#[test]
fn authors_subcommand_replaces_authors() -> TestResult {
    let dir = temp_dir_with("refs.bib", EXAMPLE)?;

    bibtex2cff(&dir)
        .args([
            "refs.bib",
            "authors",
            "--family-name",
            "Smith",
            "--given-name",
            "John",
            "--orcid",
            "0000-0002-1825-0097",
            "--family-name",
            "Beethoven",
            "--name-particle",
            "van",
        ])
        .assert()
        .success();

    let yaml = read_yaml(&dir, "CITATION.cff")?;
    let authors = yaml["authors"].as_sequence().ok_or("authors is a sequence")?;
    assert_eq!(2, authors.len());
    assert_eq!(Some("Smith"), authors[0]["family-names"].as_str());
    assert_eq!(
        Some("https://orcid.org/0000-0002-1825-0097"),
        authors[0]["orcid"].as_str()
    );
    assert_eq!(Some("Beethoven"), authors[1]["family-names"].as_str());
    // particles are matched by position
    assert_eq!(Some("van"), authors[0]["name-particle"].as_str());

    Ok(())
}

#[test]
fn authors_subcommand_satisfies_missing_author() -> TestResult {
    let dir = temp_dir_with("refs.bib", "@misc{key1, title={A Study}, year={2023}}\n")?;

    bibtex2cff(&dir)
        .args(["refs.bib", "authors", "--family-name", "Doe"])
        .assert()
        .success();

    let yaml = read_yaml(&dir, "CITATION.cff")?;
    assert_eq!(Some("Doe"), yaml["authors"][0]["family-names"].as_str());
    assert_eq!(Some("dataset"), yaml["type"].as_str());

    Ok(())
}

#[test]
fn authors_columns_must_not_exceed_family_names() -> TestResult {
    let dir = temp_dir_with("refs.bib", EXAMPLE)?;

    bibtex2cff(&dir)
        .args([
            "refs.bib",
            "authors",
            "--family-name",
            "Doe",
            "--given-name",
            "Jane",
            "--given-name",
            "John",
        ])
        .assert()
        .failure()
        .code(2);

    Ok(())
}

#[test]
fn identifiers_subcommand() -> TestResult {
    let dir = temp_dir_with("refs.bib", EXAMPLE)?;

    bibtex2cff(&dir)
        .args([
            "refs.bib",
            "identifiers",
            "--type",
            "swh",
            "--value",
            "swh:1:rel:99f6850374dc6597af01bd0ee1d3fc0699301b9f",
            "--description",
            "The archived release",
        ])
        .assert()
        .success();

    let yaml = read_yaml(&dir, "CITATION.cff")?;
    assert_eq!(Some("swh"), yaml["identifiers"][0]["type"].as_str());
    assert_eq!(
        Some("The archived release"),
        yaml["identifiers"][0]["description"].as_str()
    );

    Ok(())
}

#[test]
fn output_is_deterministic() -> TestResult {
    let dir = temp_dir_with("refs.bib", TWO_ENTRIES)?;

    bibtex2cff(&dir).args(["refs.bib", "-o", "one.cff"]).assert().success();
    bibtex2cff(&dir).args(["refs.bib", "-o", "two.cff"]).assert().success();

    assert_eq!(
        std::fs::read(dir.child("one.cff").path())?,
        std::fs::read(dir.child("two.cff").path())?
    );

    Ok(())
}

#[test]
fn jabref_comment_is_not_an_entry() -> TestResult {
    let dir = temp_dir_with(
        "refs.bib",
        &format!("{EXAMPLE}\n@Comment{{jabref-meta: databaseType:bibtex;}}\n"),
    )?;

    let output = bibtex2cff(&dir).arg("refs.bib").output()?;
    assert!(output.status.success());
    assert!(!String::from_utf8(output.stderr)?.contains("Found 2 entries"));

    let yaml = read_yaml(&dir, "CITATION.cff")?;
    assert_eq!(Some("A Study"), yaml["title"].as_str());

    Ok(())
}

#[test]
fn dataset_misspelling_gets_dataset_type() -> TestResult {
    let dir = temp_dir_with(
        "refs.bib",
        "@datatset{obs2020, title={Observations}, author={Doe}, year={2020}, version={2.0}}\n",
    )?;

    bibtex2cff(&dir).arg("refs.bib").assert().success();

    let yaml = read_yaml(&dir, "CITATION.cff")?;
    assert_eq!(Some("dataset"), yaml["type"].as_str());
    assert_eq!(Some("0.0.1"), yaml["version"].as_str());

    Ok(())
}

#[test]
fn parenthesized_entry_fails_with_parse_error() -> TestResult {
    let dir = temp_dir_with(
        "refs.bib",
        "@misc(key1, title={A Study}, author={Doe, Jane}, year={2023})\n",
    )?;

    let output = bibtex2cff(&dir).arg("refs.bib").output()?;

    assert_eq!(Some(2), output.status.code());
    assert!(String::from_utf8(output.stderr)?.contains("Parse error"));
    assert!(!dir.child("CITATION.cff").path().exists());

    Ok(())
}
