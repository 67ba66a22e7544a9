use std::fs::File;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use ztree::{Attributes, Element};

#[derive(Debug, Parser)]
#[command(
    name = "ztree",
    version,
    about = "Inspect and edit XML element trees"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Remove namespace declarations and prefixes
    Strip(Io),
    /// Convert to a generic JSON object
    Object {
        #[command(flatten)]
        io: Io,
        /// Slash-delimited path of the element to convert
        #[arg(short, long)]
        path: Option<String>,
    },
    /// Convert to a lossless JSON record
    Record {
        #[command(flatten)]
        io: Io,
        /// Slash-delimited path of the element to convert
        #[arg(short, long)]
        path: Option<String>,
    },
    /// Remove every element matching one or more paths
    Remove {
        #[command(flatten)]
        io: Io,
        /// Path to remove (repeatable)
        #[arg(short, long = "path", required = true)]
        paths: Vec<String>,
        /// Also remove ancestors left empty by the removal
        #[arg(long)]
        clear_empty: bool,
    },
    /// Insert an element, creating missing ancestors
    Insert {
        #[command(flatten)]
        io: Io,
        /// Path of the new element
        #[arg(short, long)]
        path: String,
        /// Position among the parent's children
        #[arg(short, long, default_value_t = 0)]
        index: usize,
        /// Text of the new element
        #[arg(short, long, default_value = "")]
        text: String,
        /// Attribute as NAME=VALUE (repeatable)
        #[arg(short, long = "attr", value_parser = parse_attribute)]
        attributes: Vec<(String, String)>,
    },
    /// Stream the input and count completed elements
    StreamCount {
        /// Input file (defaults to stdin)
        #[arg(value_name = "INPUT")]
        input: Option<PathBuf>,
        /// Only count elements with this tag
        #[arg(long)]
        tag: Option<String>,
    },
}

#[derive(Debug, Args)]
struct Io {
    /// Input file (defaults to stdin)
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,
    /// Output file (defaults to stdout)
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    debug!(command = ?cli.command, "running");

    match cli.command {
        Command::Strip(io) => {
            let input = read_input(&io.input)?;
            let stripped = ztree::strip_namespaces(&input);
            write_output(&io.output, stripped.as_bytes())
        }
        Command::Object { io, path } => {
            let input = read_input(&io.input)?;
            let (_, object) = ztree::to_object(input, path.as_deref())?;
            let json = serde_json::to_string_pretty(&object)?;
            write_output(&io.output, json.as_bytes())
        }
        Command::Record { io, path } => {
            let root = load(&io.input, path.as_deref())?;
            let json = match root {
                Some(root) => serde_json::to_string_pretty(&ztree::element_to_record(&root))?,
                None => "null".to_string(),
            };
            write_output(&io.output, json.as_bytes())
        }
        Command::Remove {
            io,
            paths,
            clear_empty,
        } => {
            let Some(mut root) = load(&io.input, None)? else {
                bail!("input contains no element");
            };
            let removed = ztree::remove_elements(&mut root, &paths, clear_empty);
            debug!(count = removed.len(), "elements removed");
            write_element(&io.output, &root)
        }
        Command::Insert {
            io,
            path,
            index,
            text,
            attributes,
        } => {
            let Some(mut root) = load(&io.input, None)? else {
                bail!("input contains no element");
            };
            let attributes: Attributes = attributes.into_iter().collect();
            if ztree::insert_element(&mut root, index, &path, &text, attributes).is_none() {
                bail!("nothing inserted at {path:?}");
            }
            write_element(&io.output, &root)
        }
        Command::StreamCount { input, tag } => {
            let reader: Box<dyn Read> = match &input {
                Some(path) => Box::new(
                    File::open(path)
                        .with_context(|| format!("failed to open input file {}", path.display()))?,
                ),
                None => Box::new(io::stdin()),
            };
            let mut count = 0usize;
            ztree::for_each_streamed(reader, |element| {
                if tag.as_deref().is_none_or(|tag| element.tag == tag) {
                    count += 1;
                }
                Ok::<_, anyhow::Error>(())
            })?;
            write_output(&None, format!("{count}\n").as_bytes())
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn load(input: &Option<PathBuf>, path: Option<&str>) -> Result<Option<Element>> {
    let text = read_input(input)?;
    let root = match path {
        Some(path) => ztree::resolve_path(text, path)?,
        None => ztree::resolve(text)?,
    };
    Ok(root)
}

fn read_input(path: &Option<PathBuf>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read input file {}", path.display())),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read stdin")?;
            if buffer.trim().is_empty() {
                bail!("no input provided on stdin");
            }
            Ok(buffer)
        }
    }
}

fn write_element(path: &Option<PathBuf>, root: &Element) -> Result<()> {
    let mut markup = ztree::element_to_string(root, true)?;
    markup.push('\n');
    write_output(path, markup.as_bytes())
}

fn write_output(path: &Option<PathBuf>, data: &[u8]) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, data)
            .with_context(|| format!("failed to write output file {}", path.display())),
        None => {
            let mut stdout = io::stdout();
            stdout.write_all(data).context("failed to write stdout")?;
            Ok(())
        }
    }
}

fn parse_attribute(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected NAME=VALUE, got {raw:?}")),
    }
}
