//! Integration tests for the `tgtext` command-line interface.
//!
//! Covers format selection by flag and environment, trimming, in-place
//! rewriting and error reporting.

use std::fs;

#[macro_use]
mod prelude;
use prelude::*;

fn tgtext() -> Command { Command::cargo_bin("tgtext").expect("Failed to create cargo command for tgtext") }

#[test]
fn test_cli_in_place_requires_file() { tgtext().arg("--in-place").assert().failure(); }

#[test]
fn test_cli_version_flag() {
    tgtext()
        .arg("--version")
        .assert()
        .success()
        .stdout(format!("tgtext {}\n", env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_cli_defaults_html_to_markdown() {
    tgtext()
        .write_stdin("<b>hi</b> <i>a_b</i>")
        .assert()
        .success()
        .stdout("*hi* _a\\_b_\n");
}

#[rstest]
#[case::md_to_html("markdown", "html", "*a* [l](https://x.y)", "<b>a</b> <a href=\"https://x.y\">l</a>\n")]
#[case::html_to_json(
    "html",
    "json",
    "<code>x</code>",
    "{\"text\":\"x\",\"entities\":[{\"type\":\"code\",\"offset\":0,\"length\":1}]}\n"
)]
#[case::json_to_plain("json", "plain", r#"{"text":"plain"}"#, "plain\n")]
fn test_cli_format_flags(#[case] from: &str, #[case] to: &str, #[case] input: &str, #[case] expected: &str) {
    tgtext()
        .args(["--from", from, "--to", to])
        .write_stdin(input)
        .assert()
        .success()
        .stdout(expected.to_string());
}

#[test]
fn test_cli_formats_from_environment() {
    tgtext()
        .env("TGTEXT_FROM", "markdown")
        .env("TGTEXT_TO", "html")
        .write_stdin("_x_")
        .assert()
        .success()
        .stdout("<i>x</i>\n");
}

#[rstest]
#[case::stdin_newline("<b>x</b>\n", "*x*\n")]
#[case::stdin_no_newline("<b>x</b>", "*x*\n")]
fn test_cli_does_not_add_trailing_newline(#[case] input: &str, #[case] expected: &str) {
    tgtext().write_stdin(input).assert().success().stdout(expected.to_string());
}

#[test]
fn test_cli_file_with_trailing_newline() {
    let (_dir, paths) = write_files(&[("msg.html", "<i>y</i>\n")]);
    tgtext().arg(&paths[0]).assert().success().stdout("_y_\n");
}

#[test]
fn test_cli_trim() {
    tgtext()
        .arg("--trim")
        .write_stdin("  <b> x</b>  ")
        .assert()
        .success()
        .stdout("*x*\n");
}

#[test]
fn test_cli_rejects_unknown_format() {
    tgtext()
        .args(["--from", "rtf"])
        .write_stdin("x")
        .assert()
        .failure()
        .stderr(predicate::str::contains("rtf"));
}

#[test]
fn test_cli_reports_syntax_error() {
    tgtext()
        .write_stdin("<b>no close")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid HTML at byte 0"));
}

#[test]
fn test_cli_process_file() {
    let (_dir, paths) = write_files(&[("msg.html", "<s>gone</s> &lt;3")]);
    tgtext()
        .arg(&paths[0])
        .assert()
        .success()
        .stdout("gone <3\n");
}

#[test]
fn test_cli_in_place() {
    let (_dir, paths) = write_files(&[("msg.md", "*bold* `code`")]);
    tgtext()
        .args(["--from", "markdown", "--to", "html", "--in-place"])
        .arg(&paths[0])
        .assert()
        .success()
        .stdout("");
    let out = fs::read_to_string(&paths[0]).expect("failed to read rewritten file");
    assert_eq!(out, "<b>bold</b> <code>code</code>");
}

#[test]
fn test_cli_in_place_leaves_broken_file() {
    let (_dir, paths) = write_files(&[("msg.md", "[dangling")]);
    tgtext()
        .args(["--from", "markdown", "--in-place"])
        .arg(&paths[0])
        .assert()
        .failure()
        .stderr(predicate::str::contains("msg.md"));
    assert_eq!(fs::read_to_string(&paths[0]).expect("failed to read file"), "[dangling");
}

#[test]
fn test_cli_verbose_logs_to_stderr() {
    tgtext()
        .arg("--verbose")
        .env_remove("TGTEXT_LOG")
        .env_remove("RUST_LOG")
        .write_stdin("<b>x</b>")
        .assert()
        .success()
        .stdout("*x*\n")
        .stderr(predicate::str::contains("parsed html"));
}
