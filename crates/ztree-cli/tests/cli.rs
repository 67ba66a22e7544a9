use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

const NAMESPACED: &str =
    "<ns:a xmlns:ns=\"urn:x\"><ns:b ns:id=\"1\">one</ns:b><ns:b>two</ns:b><ns:c><ns:d/></ns:c></ns:a>";

fn ztree() -> Result<Command, Box<dyn std::error::Error>> {
    Ok(Command::cargo_bin("ztree")?)
}

#[test]
fn strip_from_stdin() -> Result<(), Box<dyn std::error::Error>> {
    ztree()?
        .arg("strip")
        .write_stdin(NAMESPACED)
        .assert()
        .success()
        .stdout(predicate::str::contains("<a><b id=\"1\">one</b>"))
        .stdout(predicate::str::contains("xmlns").not());
    Ok(())
}

#[test]
fn object_collects_repeated_tags() -> Result<(), Box<dyn std::error::Error>> {
    ztree()?
        .args(["object", "--path", "b"])
        .write_stdin("<a><b><c>1</c><c>2</c></b></a>")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"c\": [\n"));
    Ok(())
}

#[test]
fn record_from_file() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let input = dir.path().join("in.xml");
    std::fs::write(&input, NAMESPACED)?;

    ztree()?
        .arg("record")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"name\": \"a\""))
        .stdout(predicate::str::contains("\"id\": \"1\""));
    Ok(())
}

#[test]
fn remove_with_clear_empty_to_file() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let output = dir.path().join("out.xml");

    ztree()?
        .args(["remove", "--path", "b", "--path", "c/d", "--clear-empty", "-o"])
        .arg(&output)
        .write_stdin(NAMESPACED)
        .assert()
        .success();

    let written = std::fs::read_to_string(&output)?;
    assert!(written.starts_with("<?xml"));
    assert!(written.contains("<a/>"));
    Ok(())
}

#[test]
fn insert_creates_missing_path() -> Result<(), Box<dyn std::error::Error>> {
    ztree()?
        .args(["insert", "--path", "x/y", "--text", "new", "--attr", "k=v"])
        .write_stdin("<a><b/></a>")
        .assert()
        .success()
        .stdout(predicate::str::contains("<a><x><y k=\"v\">new</y></x><b/></a>"));
    Ok(())
}

#[test]
fn insert_rejects_bad_attribute() -> Result<(), Box<dyn std::error::Error>> {
    ztree()?
        .args(["insert", "--path", "x", "--attr", "novalue"])
        .write_stdin("<a/>")
        .assert()
        .failure()
        .stderr(predicate::str::contains("NAME=VALUE"));
    Ok(())
}

#[test]
fn stream_count_by_tag() -> Result<(), Box<dyn std::error::Error>> {
    ztree()?
        .args(["stream-count", "--tag", "b"])
        .write_stdin("<a><b/><c><b/></c><b/></a>")
        .assert()
        .success()
        .stdout("3\n");

    ztree()?
        .arg("stream-count")
        .write_stdin("<a><b/><c><b/></c><b/></a>")
        .assert()
        .success()
        .stdout("5\n");
    Ok(())
}

#[test]
fn empty_stdin_fails() -> Result<(), Box<dyn std::error::Error>> {
    ztree()?
        .arg("strip")
        .write_stdin("   ")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no input provided"));
    Ok(())
}
