//! docpack CLI - PDF export package tool

mod progress;

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use docpack::dedup::DEFAULT_SIMILARITY_THRESHOLD;
use docpack::{
    BatchOptions, BatchRunner, ConversionConfig, ConverterRegistry, DedupStrategy, Deduplicator,
    DocumentConverter, ExitStatus, ExportFormat, ExportPackage, Exporter, FormatSet,
};

use progress::ProgressObserver;

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "docpack")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Package PDF documents into Markdown, HTML, and JSON exports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert one file into an export package
    Convert {
        /// Input PDF (or *_structure.json) file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output directory (defaults to <name>_output)
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        #[command(flatten)]
        formats: FormatArgs,

        #[command(flatten)]
        pipeline: PipelineArgs,
    },

    /// Convert every PDF in a directory
    Batch {
        /// Input directory
        #[arg(value_name = "DIR")]
        input: PathBuf,

        /// Output directory, one package per file
        #[arg(short, long, value_name = "DIR", default_value = "docpack_output")]
        output: PathBuf,

        /// Descend into subdirectories
        #[arg(short, long)]
        recursive: bool,

        /// Process files in parallel
        #[arg(short, long, env = "DOCPACK_PARALLEL")]
        parallel: bool,

        /// Number of workers when --parallel is set
        #[arg(short, long, default_value_t = 2, env = "DOCPACK_WORKERS")]
        workers: usize,

        /// Input extensions to pick up
        #[arg(long = "ext", value_name = "EXT", default_value = "pdf", value_delimiter = ',')]
        extensions: Vec<String>,

        #[command(flatten)]
        formats: FormatArgs,

        #[command(flatten)]
        pipeline: PipelineArgs,
    },

    /// Render one format to stdout or a file
    Render {
        /// Input PDF (or *_structure.json) file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "markdown")]
        format: FormatArg,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        #[command(flatten)]
        pipeline: PipelineArgs,
    },

    /// Show document information
    Info {
        /// Input PDF (or *_structure.json) file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Collapse repeated slide content
    Dedup {
        /// Input PDF (or *_structure.json) file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output Markdown file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// De-duplication strategy
        #[arg(short, long, value_enum, default_value = "smart-merge")]
        strategy: StrategyArg,

        /// Similarity threshold (0.0-1.0)
        #[arg(short, long, default_value_t = DEFAULT_SIMILARITY_THRESHOLD)]
        threshold: f64,

        /// Minimum text length to consider
        #[arg(long, default_value_t = 10)]
        min_length: usize,
    },

    /// Show version information
    Version,
}

#[derive(Args)]
struct FormatArgs {
    /// Export format (repeatable)
    #[arg(short, long = "format", value_enum, value_name = "FORMAT")]
    formats: Vec<FormatArg>,

    /// Export every format
    #[arg(long, conflicts_with = "formats")]
    all_formats: bool,
}

impl FormatArgs {
    fn to_set(&self) -> FormatSet {
        if self.all_formats {
            FormatSet::all()
        } else if self.formats.is_empty() {
            FormatSet::default()
        } else {
            self.formats.iter().map(|f| ExportFormat::from(*f)).collect()
        }
    }
}

#[derive(Args)]
struct PipelineArgs {
    /// Skip picture extraction
    #[arg(long, env = "DOCPACK_NO_IMAGES")]
    no_images: bool,

    /// Skip table structure recognition
    #[arg(long, env = "DOCPACK_NO_TABLES")]
    no_tables: bool,

    /// Request OCR for scanned pages
    #[arg(long, env = "DOCPACK_OCR")]
    ocr: bool,

    /// Picture resolution multiplier
    #[arg(long, default_value_t = 2.0, env = "DOCPACK_IMAGE_SCALE")]
    image_scale: f32,
}

impl PipelineArgs {
    fn config(&self) -> docpack::Result<ConversionConfig> {
        ConversionConfig::builder()
            .with_images(!self.no_images)
            .with_table_structure(!self.no_tables)
            .with_ocr(self.ocr)
            .with_image_scale(self.image_scale)
            .build()
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    /// Markdown with linked images
    #[value(alias = "md")]
    Markdown,
    /// Standalone HTML page
    #[value(alias = "htm")]
    Html,
    /// JSON document structure
    Json,
}

impl From<FormatArg> for ExportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Markdown => ExportFormat::Markdown,
            FormatArg::Html => ExportFormat::Html,
            FormatArg::Json => ExportFormat::Json,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum StrategyArg {
    /// Keep only what each slide adds to the previous one
    Sequential,
    /// Drop slides identical to an earlier one
    Hashing,
    /// Merge runs of similar slides into sections
    SmartMerge,
}

impl From<StrategyArg> for DedupStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Sequential => DedupStrategy::Sequential,
            StrategyArg::Hashing => DedupStrategy::Hashing,
            StrategyArg::SmartMerge => DedupStrategy::SmartMerge,
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Convert {
            input,
            output,
            formats,
            pipeline,
        } => cmd_convert(&input, output.as_deref(), formats.to_set(), &pipeline),
        Commands::Batch {
            input,
            output,
            recursive,
            parallel,
            workers,
            extensions,
            formats,
            pipeline,
        } => {
            let options = BatchOptions::new(output)
                .with_recursive(recursive)
                .with_parallelism(if parallel { workers } else { 1 })
                .with_formats(formats.to_set())
                .with_extensions(extensions);
            cmd_batch(&input, options, &pipeline)
        }
        Commands::Render {
            input,
            format,
            output,
            pipeline,
        } => cmd_render(&input, format.into(), output.as_deref(), &pipeline),
        Commands::Info { input } => cmd_info(&input),
        Commands::Dedup {
            input,
            output,
            strategy,
            threshold,
            min_length,
        } => cmd_dedup(&input, output.as_deref(), strategy.into(), threshold, min_length),
        Commands::Version => {
            cmd_version();
            Ok(ExitStatus::Success)
        }
    };

    let status = match result {
        Ok(status) => status,
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            match e.downcast_ref::<docpack::Error>() {
                Some(err) => ExitStatus::from_error(err),
                None => ExitStatus::Failure,
            }
        }
    };
    std::process::exit(status.code());
}

fn converter(config: ConversionConfig) -> DocumentConverter {
    DocumentConverter::new(ConverterRegistry::with_structure_json(), config)
}

fn file_stem(input: &Path) -> String {
    docpack::batch::sanitize_base_name(&input.file_stem().unwrap_or_default().to_string_lossy())
}

fn cmd_convert(
    input: &Path,
    output: Option<&Path>,
    formats: FormatSet,
    pipeline: &PipelineArgs,
) -> CliResult<ExitStatus> {
    let config = pipeline.config()?;
    let base_name = file_stem(input);
    let output_dir = output
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(format!("{}_output", base_name)));

    let pb = ProgressBar::new(2);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    pb.set_message("Converting document...");
    let doc = converter(config.clone()).convert(input)?;
    pb.inc(1);

    pb.set_message("Writing package...");
    let package = Exporter::new(config).export(&doc, &output_dir, &base_name, formats)?;
    pb.inc(1);
    pb.finish_with_message("Done!");

    print_package(&package);
    Ok(ExitStatus::Success)
}

fn print_package(package: &ExportPackage) {
    println!("\n{} {}", "Output files in".green().bold(), package.output_dir.display());
    let mut names: Vec<String> = [&package.markdown, &package.html, &package.json]
        .into_iter()
        .flatten()
        .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .collect();
    if let Some(dir) = package.images_dir.as_ref().and_then(|d| d.file_name()) {
        names.push(format!(
            "{}/ ({} images)",
            dir.to_string_lossy(),
            package.image_count()
        ));
    }
    names.push("README.md".to_string());

    let last = names.len() - 1;
    for (i, name) in names.iter().enumerate() {
        let branch = if i == last { "└─" } else { "├─" };
        println!("  {} {}", branch.dimmed(), name);
    }
    println!(
        "\n{} texts, {} tables, {} pictures",
        package.counts.texts, package.counts.tables, package.counts.pictures
    );
}

fn cmd_batch(input: &Path, options: BatchOptions, pipeline: &PipelineArgs) -> CliResult<ExitStatus> {
    let config = pipeline.config()?;
    let output_dir = options.output_dir.clone();

    println!(
        "{} {} ({} worker{})",
        "Processing".cyan().bold(),
        input.display(),
        options.parallelism,
        if options.parallelism == 1 { "" } else { "s" }
    );

    let runner = BatchRunner::new(
        converter(config.clone()),
        Exporter::new(config),
        options,
    );
    let report = runner.run_with_observer(input, &ProgressObserver::new())?;
    let (md_path, json_path) = report.write(&output_dir)?;

    println!();
    println!("{}", "Batch Summary".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "Total".bold(), report.total);
    println!("{}: {}", "Succeeded".bold(), report.succeeded.to_string().green());
    if report.failed > 0 {
        println!("{}: {}", "Failed".bold(), report.failed.to_string().red());
    } else {
        println!("{}: {}", "Failed".bold(), report.failed);
    }
    println!("{}: {:.1}%", "Success rate".bold(), report.success_rate);
    println!("{}: {:.2}s", "Time".bold(), report.elapsed_secs);
    println!();
    println!("{} {}", "Report".green(), md_path.display());
    println!("{} {}", "Report".green(), json_path.display());

    Ok(ExitStatus::from_report(&report))
}

fn cmd_render(
    input: &Path,
    format: ExportFormat,
    output: Option<&Path>,
    pipeline: &PipelineArgs,
) -> CliResult<ExitStatus> {
    let config = pipeline.config()?;
    let doc = converter(config.clone()).convert(input)?;
    let rendered = Exporter::new(config).render(&doc, format)?;

    if let Some(path) = output {
        fs::write(path, &rendered)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        print!("{}", rendered);
    }

    Ok(ExitStatus::Success)
}

fn cmd_info(input: &Path) -> CliResult<ExitStatus> {
    let doc = converter(ConversionConfig::default()).convert(input)?;
    let meta = &doc.metadata;

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    if let Some(ref version) = meta.format_version {
        println!("{}: PDF {}", "Format".bold(), version);
    }
    println!("{}: {}", "Pages".bold(), meta.page_count);
    if let Some(ref title) = meta.title {
        println!("{}: {}", "Title".bold(), title);
    }
    if let Some(ref author) = meta.author {
        println!("{}: {}", "Author".bold(), author);
    }
    if let Some(ref subject) = meta.subject {
        println!("{}: {}", "Subject".bold(), subject);
    }

    println!();
    println!("{}", "Content Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    let counts = doc.counts();
    let text = doc.plain_text();
    let embedded = doc.pictures.iter().filter(|p| p.has_image()).count();

    println!("{}: {}", "Text elements".bold(), counts.texts);
    println!("{}: {}", "Tables".bold(), counts.tables);
    println!("{}: {} ({} with image data)", "Pictures".bold(), counts.pictures, embedded);
    println!("{}: {}", "Words".bold(), text.split_whitespace().count());
    println!("{}: {}", "Characters".bold(), text.chars().count());

    Ok(ExitStatus::Success)
}

fn cmd_dedup(
    input: &Path,
    output: Option<&Path>,
    strategy: DedupStrategy,
    threshold: f64,
    min_length: usize,
) -> CliResult<ExitStatus> {
    let deduplicator = Deduplicator::new(threshold, min_length)?;
    let config = ConversionConfig::builder().with_images(false).build()?;
    let doc = converter(config).convert(input)?;

    let result = deduplicator.run(&doc, strategy);
    let markdown = result.to_markdown();

    if let Some(path) = output {
        fs::write(path, &markdown)?;
        println!("{} {}", "Saved to".green(), path.display());
        println!(
            "{} {} -> {} items ({:.1}% removed)",
            "Dedup".cyan().bold(),
            result.stats.original_items,
            result.stats.deduplicated_items,
            result.stats.reduction_percent()
        );
    } else {
        print!("{}", markdown);
    }

    Ok(ExitStatus::Success)
}

fn cmd_version() {
    println!("{} {}", "docpack".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("PDF export package tool");
    println!();
    println!("Repository: {}", "https://github.com/iyulab/docpack".dimmed());
    println!("License: MIT");
}
