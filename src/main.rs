//! cdoc: generate Markdown API documentation from commented C sources.
//!
//! `cdoc include/*.h src/ --ignore '_*' -o API.md`
//!
//! Every input file contributes its leading comment and its documented
//! macros, types and functions to one document, written to stdout or to
//! the `--output` file.

mod comment;
mod model;
mod parser;
mod render;
mod textbuf;
mod toc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use glob::Pattern;
use std::collections::HashSet;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "cdoc",
    about = "Generate Markdown API documentation from commented C headers and sources"
)]
struct Cli {
    /// Input files, directories or glob patterns (.c and .h)
    #[arg(required = true)]
    files: Vec<String>,

    /// Skip symbols whose names match PATTERN (* and ? supported).
    /// Can be specified multiple times.
    #[arg(long, value_name = "PATTERN")]
    ignore: Vec<String>,

    /// Write the document to FILE instead of stdout
    #[arg(short = 'o', long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Top-level heading of the document
    #[arg(short = 't', long, default_value = "API Documentation")]
    title: String,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let ignore = compile_patterns(&cli.ignore)?;
    let input_files = expand_inputs(&cli.files)?;
    if input_files.is_empty() {
        bail!("no input files");
    }

    let mut docs = Vec::new();
    for path in &input_files {
        let src = match fs::read(path) {
            Ok(src) => src,
            Err(e) => {
                log::warn!("skipping {}: {}", path.display(), e);
                continue;
            }
        };
        match parser::parse_file(path, &src) {
            Ok(mut doc) => {
                filter_entities(&mut doc, &ignore);
                log::info!("{}: {} entities", doc.path, doc.entities.len());
                docs.push(doc);
            }
            Err(e) => log::warn!("skipping {}: {}", path.display(), e),
        }
    }

    let output = render::render(&docs, &cli.title);
    match &cli.output {
        Some(out_path) => fs::write(out_path, &output)
            .with_context(|| format!("failed to write {}", out_path.display()))?,
        None => io::stdout()
            .write_all(output.as_bytes())
            .context("failed to write to stdout")?,
    }
    Ok(())
}

/// Compile the --ignore wildcards.
fn compile_patterns(patterns: &[String]) -> Result<Vec<Pattern>> {
    patterns
        .iter()
        .map(|p| Pattern::new(p).with_context(|| format!("invalid ignore pattern: {}", p)))
        .collect()
}

/// File extensions recognized as source files.
const SUPPORTED_EXTENSIONS: &[&str] = &["c", "h"];

/// Expand the command-line inputs into file paths, in argument order.
///
/// A directory is scanned (non-recursively) for supported files; anything
/// that is neither a file nor a directory is treated as a glob. Matches of
/// one argument are sorted; a path named twice is kept at its first position.
fn expand_inputs(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut seen = HashSet::new();
    for pattern in patterns {
        let path = Path::new(pattern);
        let mut matches = if path.is_file() {
            vec![path.to_path_buf()]
        } else if path.is_dir() {
            scan_dir(path)?
        } else {
            glob::glob(pattern)
                .with_context(|| format!("invalid glob pattern: {}", pattern))?
                .filter_map(|r| r.ok())
                .filter(|p| p.is_file())
                .collect()
        };
        if matches.is_empty() {
            log::warn!("no files matched: {}", pattern);
        }
        matches.sort();
        files.extend(matches.into_iter().filter(|p| seen.insert(p.clone())));
    }
    Ok(files)
}

fn scan_dir(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?;
    Ok(entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|p| p.is_file() && is_supported(p))
        .collect())
}

fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext))
}

/// Drop entities whose display name matches any ignore pattern.
fn filter_entities(doc: &mut model::Document, ignore: &[Pattern]) {
    doc.entities
        .retain(|entity| !ignore.iter().any(|p| p.matches(entity.display_name())));
}
