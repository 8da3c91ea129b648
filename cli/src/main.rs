//! docxflow CLI - DOCX to flow document conversion tool
//!
//! Converts Word documents to a flow tree and prints it as JSON or plain
//! text, or lists the editable controls it contains.

use clap::{Parser, Subcommand};
use colored::*;
use docxflow::docx::{ConvertOptions, DocxConverter};
use docxflow::render::{JsonFormat, RenderOptions};
use docxflow::{ConvertedDocument, Label, Node, NodeKind};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Word document conversion to a rich-text flow tree
#[derive(Parser)]
#[command(
    name = "docxflow",
    author = "iyulab",
    version,
    about = "Convert DOCX documents to a flow document tree",
    long_about = "docxflow - single-pass streaming DOCX conversion.\n\n\
                  Builds a paragraph/span/table flow tree and renders it as JSON or text."
)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct ConvertArgs {
    /// Input file path
    input: PathBuf,

    /// Inherited font size in pixels
    #[arg(long, default_value = "16")]
    font_size: f64,

    /// Do not give table cells a border
    #[arg(long)]
    no_borders: bool,
}

impl ConvertArgs {
    fn options(&self) -> ConvertOptions {
        ConvertOptions::new()
            .with_default_font_size(self.font_size)
            .with_cell_borders(!self.no_borders)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a document to JSON
    Json {
        #[command(flatten)]
        convert: ConvertArgs,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output compact JSON (no indentation)
        #[arg(long)]
        compact: bool,

        /// Leave the label registry out of the output
        #[arg(long)]
        no_labels: bool,
    },

    /// Convert a document to plain text
    Text {
        #[command(flatten)]
        convert: ConvertArgs,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Keep empty paragraphs as blank lines
        #[arg(long)]
        empty_paragraphs: bool,
    },

    /// List the editable controls of a document
    Labels {
        #[command(flatten)]
        convert: ConvertArgs,

        /// Print the label registry as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show document structure statistics
    Info {
        #[command(flatten)]
        convert: ConvertArgs,
    },

    /// Show version information
    Version,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Json {
            convert,
            output,
            compact,
            no_labels,
        } => {
            let doc = convert_with_progress(&convert)?;

            let format = if compact {
                JsonFormat::Compact
            } else {
                JsonFormat::Pretty
            };
            let options = RenderOptions::new()
                .with_json_format(format)
                .with_labels(!no_labels);
            let json = docxflow::render::to_json_with_options(&doc, &options)?;

            write_output(output.as_deref(), &json)?;
            if let Some(path) = output {
                println!("{} Converted to JSON: {}", "✓".green().bold(), path.display());
            }
        }

        Commands::Text {
            convert,
            output,
            empty_paragraphs,
        } => {
            let doc = convert_with_progress(&convert)?;

            let options = RenderOptions::new().with_empty_paragraphs(empty_paragraphs);
            let text = docxflow::render::to_text_with_options(&doc.document, &options);

            write_output(output.as_deref(), &text)?;
            if let Some(path) = output {
                println!("{} Converted to text: {}", "✓".green().bold(), path.display());
            }
        }

        Commands::Labels { convert, json } => {
            let doc = convert_with_progress(&convert)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&doc.labels)?);
                return Ok(());
            }
            if doc.labels.is_empty() {
                println!("{} No labels found in document", "!".yellow().bold());
            }
            for label in &doc.labels.entries {
                print_label(label, 0);
            }
        }

        Commands::Info { convert } => {
            let doc = convert_with_progress(&convert)?;
            print_info(&convert.input, &doc);
        }

        Commands::Version => {
            print_version();
        }
    }

    Ok(())
}

fn convert_with_progress(args: &ConvertArgs) -> docxflow::Result<ConvertedDocument> {
    let pb = create_spinner("Converting document...");
    let result = DocxConverter::open(&args.input).and_then(|converter| {
        converter.with_options(args.options()).convert()
    });
    pb.finish_and_clear();
    result
}

fn print_label(label: &Label, depth: usize) {
    let indent = "  ".repeat(depth);
    let kind = format!("{:?}", label.kind).to_lowercase();
    match &label.alias {
        Some(alias) => println!("{}{} {} ({})", indent, kind.cyan(), label.tag.bold(), alias),
        None => println!("{}{} {}", indent, kind.cyan(), label.tag.bold()),
    }
    for child in &label.children {
        print_label(child, depth + 1);
    }
}

fn print_info(input: &Path, doc: &ConvertedDocument) {
    let root = &doc.document;
    let count = |pred: fn(&Node) -> bool| root.count(pred);

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40));
    println!(
        "{}: {}",
        "File".bold(),
        input.file_name().unwrap_or_default().to_string_lossy()
    );
    println!("{}: {}", "Blocks".bold(), doc.blocks().len());
    println!(
        "{}: {}",
        "Paragraphs".bold(),
        count(|n| matches!(n.kind, NodeKind::Paragraph(_)))
    );
    println!("{}: {}", "Tables".bold(), count(|n| n.kind == NodeKind::Table));
    println!(
        "{}: {}",
        "Hyperlinks".bold(),
        count(|n| matches!(n.kind, NodeKind::Hyperlink { .. }))
    );
    println!(
        "{}: {}",
        "Placeholders".bold(),
        count(|n| n.placeholder_name().is_some())
    );
    println!("{}: {}", "Labels".bold(), doc.labels.len());

    let text = doc.plain_text();
    println!("\n{}", "Content Statistics".cyan().bold());
    println!("{}", "─".repeat(40));
    println!("{}: {}", "Words".bold(), text.split_whitespace().count());
    println!("{}: {}", "Characters".bold(), text.chars().count());
}

fn print_version() {
    println!("{} {}", "docxflow".green().bold(), env!("CARGO_PKG_VERSION"));
    println!("Single-pass DOCX to flow document conversion");
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
        .template("{spinner:.blue} {msg}")
    {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn write_output(path: Option<&Path>, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{}", content)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_convert_args() {
        let cli = Cli::parse_from(["docxflow", "json", "in.docx", "--compact", "--no-borders"]);
        match cli.command {
            Commands::Json {
                convert, compact, ..
            } => {
                assert!(compact);
                assert!(!convert.options().cell_borders);
                assert_eq!(convert.options().default_font_size, 16.0);
            }
            _ => panic!("expected json command"),
        }
    }

    #[test]
    fn test_labels_json_flag() {
        let cli = Cli::parse_from(["docxflow", "-vv", "labels", "in.docx", "--json"]);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Labels { json: true, .. }));
    }
}
