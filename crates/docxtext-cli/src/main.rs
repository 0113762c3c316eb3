use std::fs::File;
use std::io::{BufWriter, IsTerminal, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use docxtext_core::config_file::{self, ConfigFile, LoggingConfig, OutputConfig, ReaderConfig};
use docxtext_core::{JsonLinesSink, Reader, pipeline};
use docxtext_ingest::DocxPretrainReader;

mod logging;
mod output;

use logging::LogLevel;
use output::ColorMode;

/// docxtext - Extract pretraining text from MS Word documents
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extracts text from MS Word .docx files to use for pretraining
    #[command(name = "from-docx-pt")]
    FromDocxPt {
        /// Path to the MS Word .docx file(s) to read; glob syntax is supported
        #[arg(short = 'i', long = "input", num_args = 0..)]
        input: Vec<String>,

        /// Path to the text file(s) listing the MS Word .docx files to use
        #[arg(short = 'I', long = "input_list", num_args = 0..)]
        input_list: Vec<PathBuf>,

        /// Whether to output individual paragraphs rather than whole documents
        #[arg(long = "output_paragraphs")]
        output_paragraphs: bool,

        /// Output whole documents even if the config file asks for paragraphs
        #[arg(long = "no_output_paragraphs", conflicts_with = "output_paragraphs")]
        no_output_paragraphs: bool,

        /// Path to the JSON Lines output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// The logging level to use
        #[arg(short = 'l', long = "logging_level", value_enum, ignore_case = true)]
        logging_level: Option<LogLevel>,

        /// Disable colored output
        #[arg(long = "no_color")]
        no_color: bool,
    },

    /// Write the effective configuration to the platform config file
    InitConfig,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = config_file::load_config();

    match cli.command {
        Command::FromDocxPt {
            input,
            input_list,
            output_paragraphs,
            no_output_paragraphs,
            output,
            logging_level,
            no_color,
        } => {
            let use_color = !no_color && std::io::stderr().is_terminal();
            logging::init(
                logging::resolve_filter(logging_level, config.logging_level()),
                use_color,
            );

            // CLI flags > config file > defaults
            let output_paragraphs = resolve_output_paragraphs(
                output_paragraphs,
                no_output_paragraphs,
                config.output_paragraphs(),
            );
            let output = output.or_else(|| config.output_path());

            from_docx(
                input,
                input_list,
                output_paragraphs,
                output,
                ColorMode(use_color),
            )
        }
        Command::InitConfig => init_config(config),
    }
}

/// Either flag wins over the config file; neither falls back to it.
fn resolve_output_paragraphs(on: bool, off: bool, config: Option<bool>) -> bool {
    if on {
        true
    } else if off {
        false
    } else {
        config.unwrap_or(false)
    }
}

fn from_docx(
    input: Vec<String>,
    input_list: Vec<PathBuf>,
    output_paragraphs: bool,
    output: Option<PathBuf>,
    color: ColorMode,
) -> anyhow::Result<()> {
    tracing::debug!(
        inputs = input.len(),
        input_lists = input_list.len(),
        output_paragraphs,
        output = ?output,
        "resolved configuration"
    );

    let mut reader =
        DocxPretrainReader::new(input, input_list).with_output_paragraphs(output_paragraphs);

    let writer: Box<dyn Write> = if let Some(ref path) = output {
        let file = File::create(path)
            .with_context(|| format!("Failed to create output file {}", path.display()))?;
        Box::new(BufWriter::new(file))
    } else {
        Box::new(BufWriter::new(std::io::stdout().lock()))
    };

    let mut sink = JsonLinesSink::new(writer);
    let stats = pipeline::run(&mut reader, &mut sink)?;
    sink.into_inner().flush()?;

    output::print_summary(&mut std::io::stderr(), reader.name(), &stats, color)?;
    Ok(())
}

fn init_config(current: ConfigFile) -> anyhow::Result<()> {
    let config = ConfigFile {
        reader: Some(ReaderConfig {
            output_paragraphs: Some(current.output_paragraphs().unwrap_or(false)),
        }),
        logging: Some(LoggingConfig {
            level: Some(current.logging_level().unwrap_or("WARNING").to_string()),
        }),
        output: Some(OutputConfig {
            path: current.output.and_then(|o| o.path),
        }),
    };
    let path = config_file::save_config(&config)?;
    println!("Wrote {}", path.display());
    Ok(())
}
