use std::{
    fs,
    io::{self, Read},
    path::{Path, PathBuf},
};

use anyhow::{Context, bail};
use clap::Parser;
use rayon::prelude::*;
use tgtext::{Format, convert, logging, rewrite};

#[derive(Parser)]
#[command(version, about = "Convert Telegram formatted text between markup dialects")]
struct Cli {
    /// Rewrite files in place
    #[arg(long = "in-place", requires = "files")]
    in_place: bool,
    #[command(flatten)]
    opts: ConvertOpts,
    /// Log conversion details to stderr
    #[arg(short, long)]
    verbose: bool,
    /// Files to convert; standard input when absent
    files: Vec<PathBuf>,
}

#[derive(clap::Args, Clone, Copy)]
struct ConvertOpts {
    /// Format of the input
    #[arg(long, value_enum, env = "TGTEXT_FROM", default_value_t = Format::Html)]
    from: Format,
    /// Format of the output
    #[arg(long, value_enum, env = "TGTEXT_TO", default_value_t = Format::Markdown)]
    to: Format,
    /// Strip leading and trailing spaces, clipping entities
    #[arg(long)]
    trim: bool,
}

fn convert_path(path: &Path, opts: ConvertOpts) -> anyhow::Result<String> {
    let input = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    convert(&input, opts.from, opts.to, opts.trim).with_context(|| format!("converting {}", path.display()))
}

fn rewrite_path(path: &Path, opts: ConvertOpts) -> anyhow::Result<()> {
    rewrite(path, opts.from, opts.to, opts.trim).with_context(|| format!("rewriting {}", path.display()))
}

/// Print one conversion result, ending it with exactly one newline.
fn emit(output: &str) {
    if output.ends_with('\n') {
        print!("{output}");
    } else {
        println!("{output}");
    }
}

/// Entry point for the command-line converter.
///
/// Reads standard input when no files are given. Several files are
/// converted in parallel and printed in argument order; a failing file is
/// reported on stderr without stopping the others, and makes the process
/// exit non-zero.
///
/// # Examples
///
/// ```sh
/// # HTML on stdin to Markdown on stdout
/// echo '<b>hi</b>' | tgtext
///
/// # Markdown files to wire JSON
/// tgtext --from markdown --to json a.md b.md
///
/// # Convert in place
/// tgtext --from markdown --to html --in-place message.txt
/// ```
fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if cli.files.is_empty() {
        let mut input = String::new();
        io::stdin().read_to_string(&mut input).context("reading standard input")?;
        let output = convert(&input, cli.opts.from, cli.opts.to, cli.opts.trim)?;
        emit(&output);
        return Ok(());
    }

    let opts = cli.opts;
    let in_place = cli.in_place;
    let results: Vec<anyhow::Result<Option<String>>> = cli
        .files
        .par_iter()
        .map(|path| {
            if in_place {
                rewrite_path(path, opts).map(|()| None)
            } else {
                convert_path(path, opts).map(Some)
            }
        })
        .collect();

    let mut failed = 0_usize;
    for result in results {
        match result {
            Ok(Some(output)) => emit(&output),
            Ok(None) => {}
            Err(err) => {
                failed += 1;
                eprintln!("error: {err:#}");
            }
        }
    }
    if failed > 0 {
        bail!("{failed} of {} files failed", cli.files.len());
    }
    Ok(())
}
