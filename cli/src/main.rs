//! djvuchunk CLI - DjVu page assembly tool

use std::fmt;
use std::path::{Path, PathBuf};

use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use log::warn;

use djvuchunk::model::ChunkContainer;
use djvuchunk::{
    create_raw_chunk_from_file, merge_iw44_chunks_from_file, read_file, render, Chunk, Container,
    JsonFormat, PageInfo, ParamMode, Signature,
};

#[derive(Parser)]
#[command(name = "djvuchunk")]
#[command(version)]
#[command(about = "Assemble DjVu pages from INFO parameters, chunk files and IW44 images", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Assemble a FORM:DJVU page
    Page {
        /// Output file
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// INFO chunk parameters: width,height,dpi,rotation,gamma
        #[arg(long, value_name = "PARAMS")]
        info: Option<String>,

        /// Add a file verbatim as a chunk (e.g. Sjbz=mask.jb2)
        #[arg(long = "chunk", value_name = "SIG=FILE", value_parser = parse_raw_spec)]
        chunks: Vec<RawSpec>,

        /// Add slices of an IW44 file, at most N if given (e.g. BG44=bg.iw4:3)
        #[arg(long = "iw44", value_name = "SIG=FILE[:N]", value_parser = parse_iw44_spec)]
        iw44: Vec<Iw44Spec>,

        /// Reject non-digit characters in --info
        #[arg(long)]
        strict_params: bool,

        /// Stop at the first chunk that cannot be added
        #[arg(long)]
        strict: bool,
    },

    /// Show the chunk tree of an IFF85 file
    Info {
        /// Input file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Print JSON instead of a tree
        #[arg(long)]
        json: bool,

        /// Output compact JSON
        #[arg(long, requires = "json")]
        compact: bool,
    },

    /// Show version information
    Version,
}

/// `SIG=FILE`
#[derive(Debug, Clone, PartialEq, Eq)]
struct RawSpec {
    signature: Signature,
    path: PathBuf,
}

/// `SIG=FILE[:N]`
#[derive(Debug, Clone, PartialEq, Eq)]
struct Iw44Spec {
    signature: Signature,
    path: PathBuf,
    max_items: usize,
}

fn split_spec(s: &str) -> Result<(Signature, &str), String> {
    let (sig, rest) = s
        .split_once('=')
        .ok_or_else(|| format!("expected SIG=FILE, got {:?}", s))?;
    let signature = sig.parse::<Signature>().map_err(|e| e.to_string())?;
    if rest.is_empty() {
        return Err(format!("missing file name in {:?}", s));
    }
    Ok((signature, rest))
}

fn parse_raw_spec(s: &str) -> Result<RawSpec, String> {
    let (signature, path) = split_spec(s)?;
    Ok(RawSpec {
        signature,
        path: PathBuf::from(path),
    })
}

fn parse_iw44_spec(s: &str) -> Result<Iw44Spec, String> {
    let (signature, rest) = split_spec(s)?;
    // only a trailing all-digit suffix is a count, so C:\x stays a path
    let (path, max_items) = match rest.rsplit_once(':') {
        Some((path, n)) if !path.is_empty() && !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()) => {
            let max_items = n.parse().map_err(|_| format!("invalid slice count {:?}", n))?;
            (path, max_items)
        }
        _ => (rest, 0),
    };
    Ok(Iw44Spec {
        signature,
        path: PathBuf::from(path),
        max_items,
    })
}

/// One step of page assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Directive {
    Info(String),
    Raw(RawSpec),
    Iw44(Iw44Spec),
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Directive::Info(params) => write!(f, "INFO {}", params),
            Directive::Raw(spec) => write!(f, "{} {}", spec.signature, spec.path.display()),
            Directive::Iw44(spec) => write!(f, "{} {}", spec.signature, spec.path.display()),
        }
    }
}

/// INFO first, then chunk and IW44 directives in command-line order.
fn ordered_directives(
    matches: Option<&ArgMatches>,
    info: Option<String>,
    chunks: Vec<RawSpec>,
    iw44: Vec<Iw44Spec>,
) -> Vec<Directive> {
    let indices = |id: &str| -> Vec<usize> {
        matches
            .and_then(|m| m.indices_of(id))
            .map(|i| i.collect())
            .unwrap_or_default()
    };
    let chunk_indices = indices("chunks");
    let iw44_indices = indices("iw44");

    let mut positioned: Vec<(usize, Directive)> = chunks
        .into_iter()
        .enumerate()
        .map(|(i, spec)| (chunk_indices.get(i).copied().unwrap_or(usize::MAX), Directive::Raw(spec)))
        .chain(iw44.into_iter().enumerate().map(|(i, spec)| {
            (iw44_indices.get(i).copied().unwrap_or(usize::MAX), Directive::Iw44(spec))
        }))
        .collect();
    positioned.sort_by_key(|(index, _)| *index);

    info.map(Directive::Info)
        .into_iter()
        .chain(positioned.into_iter().map(|(_, d)| d))
        .collect()
}

fn main() {
    env_logger::init();

    let matches = Cli::command().get_matches();
    let cli = match Cli::from_arg_matches(&matches) {
        Ok(cli) => cli,
        Err(e) => e.exit(),
    };

    let result = match cli.command {
        Some(Commands::Page {
            output,
            info,
            chunks,
            iw44,
            strict_params,
            strict,
        }) => {
            let directives =
                ordered_directives(matches.subcommand_matches("page"), info, chunks, iw44);
            let mode = if strict_params {
                ParamMode::Strict
            } else {
                ParamMode::Lenient
            };
            cmd_page(&output, &directives, mode, strict)
        }
        Some(Commands::Info {
            input,
            json,
            compact,
        }) => cmd_info(&input, json, compact),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            println!("{}", "Usage: djvuchunk page -o <FILE> [--info PARAMS] [--chunk SIG=FILE]... [--iw44 SIG=FILE[:N]]...".yellow());
            println!("       djvuchunk --help for more information");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn apply_directive(page: &mut Container, directive: &Directive, mode: ParamMode) -> djvuchunk::Result<()> {
    match directive {
        Directive::Info(params) => {
            let info = PageInfo::parse_with_mode(params, mode)?;
            page.append(info.to_chunk()?)
        }
        Directive::Raw(spec) => {
            let chunk = create_raw_chunk_from_file(spec.signature, &spec.path)?;
            page.append(chunk)
        }
        Directive::Iw44(spec) => {
            let report =
                merge_iw44_chunks_from_file(page, spec.signature, &spec.path, spec.max_items)?;
            if !report.is_complete() {
                warn!(
                    "{} of the {} slices in {} were not merged",
                    report.failed.len(),
                    spec.signature,
                    spec.path.display()
                );
            }
            Ok(())
        }
    }
}

fn cmd_page(
    output: &Path,
    directives: &[Directive],
    mode: ParamMode,
    strict: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut page = Container::page();

    let pb = ProgressBar::new(directives.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {msg}")?
            .progress_chars("#>-"),
    );

    let mut failed = 0;
    for directive in directives {
        pb.set_message(directive.to_string());
        if let Err(e) = apply_directive(&mut page, directive, mode) {
            if strict {
                pb.abandon();
                return Err(e.into());
            }
            warn!("skipping {}: {}", directive, e);
            failed += 1;
        }
        pb.inc(1);
    }
    pb.finish_with_message("Done!");

    render::write_file(&page, output)?;

    println!(
        "{} {} ({} chunks)",
        "Saved to".green(),
        output.display(),
        page.len()
    );
    if failed > 0 {
        println!(
            "{} {} of {} chunks could not be added",
            "Warning:".yellow().bold(),
            failed,
            directives.len()
        );
    }

    Ok(())
}

fn cmd_info(input: &Path, json: bool, compact: bool) -> Result<(), Box<dyn std::error::Error>> {
    let container = read_file(input)?;

    if json {
        let format = if compact {
            JsonFormat::Compact
        } else {
            JsonFormat::Pretty
        };
        println!("{}", djvuchunk::to_json(&container, format)?);
        return Ok(());
    }

    println!("{}", "Container Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "File".bold(), input.display());
    println!("{}: FORM:{}", "Type".bold(), container.form_type());
    println!("{}: {}", "Chunks".bold(), container.total_chunks());
    println!();
    print_tree(&container, 0);

    Ok(())
}

fn print_tree(container: &Container, depth: usize) {
    let indent = "  ".repeat(depth);
    println!("{}{}", indent, format!("FORM:{}", container.form_type()).cyan());
    for child in container.children() {
        match child {
            Chunk::Container(inner) => print_tree(inner, depth + 1),
            Chunk::Raw(raw) => {
                let mut line = format!("{}  {} {}", indent, raw.signature(), format!("[{}]", raw.len()).dimmed());
                if raw.signature() == Signature::INFO {
                    if let Ok(info) = PageInfo::decode(raw.data()) {
                        line.push_str(&format!(
                            " {}x{}, {} dpi, gamma {}, rotation {}",
                            info.width,
                            info.height,
                            info.dpi,
                            info.gamma as f32 / 10.0,
                            info.rotation
                        ));
                    }
                }
                println!("{}", line);
            }
        }
    }
}

fn cmd_version() {
    println!("{} {}", "djvuchunk".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("DjVu page chunk assembly tool");
    println!();
    println!("License: BSD-2-Clause");
}
