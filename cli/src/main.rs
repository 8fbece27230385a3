//! untex CLI - LaTeX manuscript conversion tool

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use untex::detect::read_source;
use untex::render::{self, RenderOptions};
use untex::{convert_sources, Bibliography, Document, ExtractionStats, JsonFormat, ParseOptions};

#[derive(Parser)]
#[command(name = "untex")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Convert LaTeX manuscripts to Markdown, text, and JSON", long_about = None)]
struct Cli {
    /// Chapter files, converted in order
    #[arg(value_name = "FILE")]
    inputs: Vec<PathBuf>,

    /// Bibliography file
    #[arg(short, long, value_name = "BIB", env = "UNTEX_BIB")]
    bib: Option<PathBuf>,

    /// Output directory
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct SourceArgs {
    /// Chapter files, converted in order
    #[arg(value_name = "FILE", required = true)]
    inputs: Vec<PathBuf>,

    /// Bibliography file
    #[arg(short, long, value_name = "BIB", env = "UNTEX_BIB")]
    bib: Option<PathBuf>,

    /// Fail on unreadable files instead of skipping them
    #[arg(long)]
    strict: bool,

    /// Do not append the references and missing references sections
    #[arg(long)]
    no_back_matter: bool,

    /// Number subsubsections (four-part numbers)
    #[arg(long)]
    number_subsubsections: bool,

    /// Emit the \title as a leading title paragraph
    #[arg(long)]
    title: bool,

    /// Title of the references section
    #[arg(long, value_name = "TEXT")]
    references_title: Option<String>,

    /// Title of the missing references report
    #[arg(long, value_name = "TEXT")]
    missing_title: Option<String>,
}

impl SourceArgs {
    fn parse_options(&self) -> ParseOptions {
        let mut options = ParseOptions::new()
            .with_back_matter(!self.no_back_matter)
            .with_subsubsection_numbers(self.number_subsubsections)
            .with_title(self.title);
        if self.strict {
            options = options.strict();
        }
        if self.references_title.is_some() || self.missing_title.is_some() {
            let references = self
                .references_title
                .clone()
                .unwrap_or_else(|| options.references_title.clone());
            let missing = self
                .missing_title
                .clone()
                .unwrap_or_else(|| options.missing_references_title.clone());
            options = options.with_section_titles(references, missing);
        }
        options
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Convert to all formats (Markdown, text, JSON)
    Convert {
        #[command(flatten)]
        source: SourceArgs,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,
    },

    /// Convert to Markdown
    #[command(alias = "md")]
    Markdown {
        #[command(flatten)]
        source: SourceArgs,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Include YAML frontmatter
        #[arg(short, long)]
        frontmatter: bool,

        /// Label before chapter numbers (e.g., "Chapter")
        #[arg(long, value_name = "LABEL")]
        chapter_label: Option<String>,

        /// Do not prefix headings with their numbers
        #[arg(long)]
        no_numbers: bool,

        /// Maximum heading level (1-6)
        #[arg(long, default_value = "6")]
        max_heading: u8,

        /// Render page breaks as horizontal rules
        #[arg(long)]
        page_rules: bool,
    },

    /// Convert to plain text
    Text {
        #[command(flatten)]
        source: SourceArgs,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Do not prefix headings with their numbers
        #[arg(long)]
        no_numbers: bool,
    },

    /// Convert to JSON
    Json {
        #[command(flatten)]
        source: SourceArgs,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Show document information and statistics
    Info {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// List cited and missing citation keys
    Refs {
        #[command(flatten)]
        source: SourceArgs,

        /// Print the citation sets as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Convert { source, output }) => cmd_convert(&source, output.as_deref()),
        Some(Commands::Markdown {
            source,
            output,
            frontmatter,
            chapter_label,
            no_numbers,
            max_heading,
            page_rules,
        }) => {
            let mut render_options = RenderOptions::new()
                .with_frontmatter(frontmatter)
                .with_heading_numbers(!no_numbers)
                .with_max_heading(max_heading)
                .with_page_break_rule(page_rules);
            if let Some(label) = chapter_label {
                render_options = render_options.with_chapter_label(label);
            }
            cmd_markdown(&source, output.as_deref(), &render_options)
        }
        Some(Commands::Text {
            source,
            output,
            no_numbers,
        }) => cmd_text(&source, output.as_deref(), no_numbers),
        Some(Commands::Json {
            source,
            output,
            compact,
        }) => cmd_json(&source, output.as_deref(), compact),
        Some(Commands::Info { source }) => cmd_info(&source),
        Some(Commands::Refs { source, json }) => cmd_refs(&source, json),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: convert if inputs are provided
            if cli.inputs.is_empty() {
                println!("{}", "Usage: untex <FILE>... [--bib BIB] [-o DIR]".yellow());
                println!("       untex --help for more information");
                Ok(())
            } else {
                let source = SourceArgs {
                    inputs: cli.inputs,
                    bib: cli.bib,
                    strict: false,
                    no_back_matter: false,
                    number_subsubsections: false,
                    title: false,
                    references_title: None,
                    missing_title: None,
                };
                cmd_convert(&source, cli.output.as_deref())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

/// Load the bibliography and every chapter file, then convert.
fn load_document(
    source: &SourceArgs,
    progress: Option<&ProgressBar>,
) -> Result<Document, Box<dyn std::error::Error>> {
    let options = source.parse_options();

    let bibliography = match &source.bib {
        Some(path) => {
            if let Some(pb) = progress {
                pb.set_message(format!("Reading {}", file_name(path)));
            }
            let bib = Bibliography::load(path, &options)?;
            if bib.is_truncated() {
                eprintln!(
                    "{} bibliography truncated at {} entries",
                    "Warning:".yellow().bold(),
                    options.max_bib_entries
                );
            }
            bib
        }
        None => Bibliography::new(),
    };

    let mut texts = Vec::with_capacity(source.inputs.len());
    for path in &source.inputs {
        if let Some(pb) = progress {
            pb.set_message(format!("Reading {}", file_name(path)));
        }
        texts.push(read_source(path, &options)?);
        if let Some(pb) = progress {
            pb.inc(1);
        }
    }

    log::debug!(
        "Converting {} files against {} bibliography entries",
        texts.len(),
        bibliography.len()
    );
    Ok(convert_sources(&texts, &bibliography, &options))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or(path.as_os_str())
        .to_string_lossy()
        .into_owned()
}

fn write_or_print(output: Option<&Path>, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = output {
        fs::write(path, content)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", content);
    }
    Ok(())
}

fn cmd_convert(
    source: &SourceArgs,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let output_dir = output.map(|p| p.to_path_buf()).unwrap_or_else(|| {
        let stem = source
            .inputs
            .first()
            .and_then(|p| p.file_stem())
            .unwrap_or_default()
            .to_string_lossy();
        PathBuf::from(format!("{}_output", stem))
    });

    fs::create_dir_all(&output_dir)?;

    let pb = ProgressBar::new(source.inputs.len() as u64 + 3);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {msg}")?
            .progress_chars("#>-"),
    );

    let doc = load_document(source, Some(&pb))?;

    let render_options = RenderOptions::new().with_frontmatter(true);

    pb.set_message("Generating Markdown...");
    let markdown = render::to_markdown(&doc, &render_options)?;
    fs::write(output_dir.join("extract.md"), &markdown)?;
    pb.inc(1);

    pb.set_message("Generating text...");
    let text = render::to_text(&doc, &render_options)?;
    fs::write(output_dir.join("extract.txt"), &text)?;
    pb.inc(1);

    pb.set_message("Generating JSON...");
    let json = render::to_json(&doc, JsonFormat::Pretty)?;
    fs::write(output_dir.join("content.json"), &json)?;
    pb.inc(1);

    pb.finish_with_message("Done!");

    println!("\n{}", "Output files:".green().bold());
    println!("  {} extract.md", "├─".dimmed());
    println!("  {} extract.txt", "├─".dimmed());
    println!("  {} content.json", "└─".dimmed());

    report_missing(&doc);

    Ok(())
}

fn cmd_markdown(
    source: &SourceArgs,
    output: Option<&Path>,
    render_options: &RenderOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let doc = load_document(source, None)?;
    let markdown = render::to_markdown(&doc, render_options)?;
    write_or_print(output, &markdown)
}

fn cmd_text(
    source: &SourceArgs,
    output: Option<&Path>,
    no_numbers: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let doc = load_document(source, None)?;
    let render_options = RenderOptions::new().with_heading_numbers(!no_numbers);
    let text = render::to_text(&doc, &render_options)?;
    write_or_print(output, &text)
}

fn cmd_json(
    source: &SourceArgs,
    output: Option<&Path>,
    compact: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let doc = load_document(source, None)?;

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };

    let json = render::to_json(&doc, format)?;
    write_or_print(output, &json)
}

fn cmd_info(source: &SourceArgs) -> Result<(), Box<dyn std::error::Error>> {
    let doc = load_document(source, None)?;

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    for path in &source.inputs {
        println!("{}: {}", "File".bold(), path.display());
    }
    if let Some(ref bib) = source.bib {
        println!("{}: {}", "Bibliography".bold(), bib.display());
    }
    if let Some(ref title) = doc.metadata.title {
        println!("{}: {}", "Title".bold(), title);
    }
    if let Some(ref author) = doc.metadata.author {
        println!("{}: {}", "Author".bold(), author);
    }
    if let Some(ref date) = doc.metadata.date {
        println!("{}: {}", "Date".bold(), date);
    }

    println!();
    println!("{}", "Content Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    let mut stats = ExtractionStats::from_document(&doc);
    stats.count_text(&doc.plain_text());

    println!("{}: {}", "Chapters".bold(), stats.chapter_count);
    println!("{}: {}", "Sections".bold(), stats.section_count);
    println!("{}: {}", "Paragraphs".bold(), stats.paragraph_count);
    println!("{}: {}", "Tables".bold(), stats.table_count);
    println!("{}: {}", "Bibliography entries".bold(), stats.bibliography_count);
    println!("{}: {}", "Citations".bold(), stats.citation_count);
    println!("{}: {}", "Missing".bold(), stats.missing_citation_count);
    println!("{}: {}", "Words".bold(), stats.word_count);
    println!("{}: {}", "Characters".bold(), stats.char_count);

    Ok(())
}

fn cmd_refs(source: &SourceArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let doc = load_document(source, None)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&doc.citations)?);
        return Ok(());
    }

    println!("{}", "Resolved citations".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for key in doc.citations.resolved() {
        println!("  {} {}", "✓".green(), key);
    }

    println!();
    report_missing(&doc);
    Ok(())
}

fn report_missing(doc: &Document) {
    if !doc.citations.has_missing() {
        println!("{}", "All citations resolved".green());
        return;
    }
    println!(
        "{} ({})",
        "Missing citations".red().bold(),
        doc.citations.missing.len()
    );
    for key in &doc.citations.missing {
        println!("  {} {}", "✗".red(), key);
    }
}

fn cmd_version() {
    println!("{} {}", "untex".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("LaTeX manuscript conversion tool");
    println!();
    println!("Repository: {}", "https://github.com/iyulab/untex".dimmed());
    println!("License: MIT");
}
