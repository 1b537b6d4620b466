//! wordtest CLI - generate cumulative lesson tests from a word list.

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use wordtest_core::{
    build_context, load_config_from, parse_document, DocxTemplateRenderer, GeneratorConfig,
    JsonContextRenderer, TemplateRenderer, WordTestError,
};

#[derive(Parser)]
#[command(name = "wordtest", version, about = "Cumulative vocabulary test generator")]
struct Cli {
    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate quiz and answer pages for every lesson
    Generate {
        /// Word list (.docx, .xlsx, .csv)
        #[arg(long)]
        input: PathBuf,

        /// Word template (.docx)
        #[arg(long)]
        template: PathBuf,

        /// Output file (default: <output-dir>/<stem>_Answer.docx)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output directory when --output is not given
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Random seed for reproducible tests
        #[arg(long)]
        seed: Option<u64>,

        /// Also write the render context as JSON
        #[arg(long)]
        dump_context: Option<PathBuf>,
    },

    /// Show the lessons found in a word list
    Inspect {
        /// Word list (.docx, .xlsx, .csv)
        #[arg(long)]
        input: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        match e.downcast_ref::<WordTestError>() {
            Some(err) => eprintln!("{}\n  {:#}", err.user_message(), e),
            None => eprintln!("error: {:#}", e),
        }
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = load_config_from(cli.config.as_deref())?;

    match cli.command {
        Commands::Generate {
            input,
            template,
            output,
            output_dir,
            seed,
            dump_context,
        } => {
            if seed.is_some() {
                config.seed = seed;
            }
            if let Some(dir) = output_dir {
                config.output_dir = dir;
            }
            let output = match output {
                Some(path) => path,
                None => default_output(&input, &config)?,
            };
            generate(&input, &template, &output, dump_context.as_deref(), &config)
        }
        Commands::Inspect { input } => inspect(&input, &config),
    }
}

fn default_output(input: &Path, config: &GeneratorConfig) -> Result<PathBuf> {
    std::fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("failed to create {}", config.output_dir.display()))?;
    Ok(config.output_dir.join(config.answer_file_name(input)))
}

fn generate(
    input: &Path,
    template: &Path,
    output: &Path,
    dump_context: Option<&Path>,
    config: &GeneratorConfig,
) -> Result<()> {
    let renderer = DocxTemplateRenderer::open(template)?;
    let (context, summary) = build_context(input, config)?;

    if let Some(path) = dump_context {
        JsonContextRenderer.render(&context, path)?;
    }
    renderer.render(&context, output)?;

    println!(
        "{} lessons, {} word pairs -> {} pages written to {}",
        summary.lessons,
        summary.pairs,
        summary.pages,
        output.display()
    );
    Ok(())
}

fn inspect(input: &Path, config: &GeneratorConfig) -> Result<()> {
    let lessons = parse_document(input, config.parser_options())?;
    for (number, pairs) in lessons.iter() {
        println!("Lesson {:>3}: {:>4} pairs", number, pairs.len());
        for pair in pairs.iter().take(3) {
            println!("    {} - {}", pair.term, pair.translation);
        }
    }
    println!(
        "{} lessons, {} pairs",
        lessons.lesson_count(),
        lessons.pair_count()
    );
    Ok(())
}
