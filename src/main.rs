use clap::{Args, Parser, Subcommand};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;
use tagscribe::config::{RcConfig, RcLoader};
use tagscribe::highlight::{decorate, render_ansi, render_html};
use tagscribe::srt;
use tagscribe::tags::{format_tags, parse_tags, validate_tag_syntax};
use tagscribe::{EditorSession, Error};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tagscribe", version, about = "Inline tag editing for TTS scripts and SRT subtitles")]
struct Cli {
    /// Read settings from this file instead of .tagscriberc
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List every tag with its parsed fields
    Tags { file: String },
    /// Check tag syntax, and SRT timing when the text is SRT
    Check { file: String },
    /// Print the decorated text
    Highlight {
        file: String,
        #[arg(long)]
        html: bool,
    },
    /// Set the character of the tag at the caret, or insert one
    Character {
        file: String,
        name: String,
        #[command(flatten)]
        caret: CaretArgs,
    },
    /// Set the language of the tag at the caret, or insert one
    Language {
        file: String,
        code: String,
        #[command(flatten)]
        caret: CaretArgs,
    },
    /// Set a parameter on the tag at the caret, or insert one
    Param {
        file: String,
        name: String,
        value: String,
        #[command(flatten)]
        caret: CaretArgs,
    },
    /// Normalise spacing around tags
    Format { file: String },
    /// SRT subtitle operations
    #[command(subcommand)]
    Srt(SrtCommand),
}

#[derive(Subcommand)]
enum SrtCommand {
    Validate {
        file: String,
    },
    /// Print the position of the entry containing a byte offset
    Locate {
        file: String,
        #[arg(long)]
        at: usize,
    },
    /// Replace the body of an entry
    Update {
        file: String,
        position: usize,
        body: String,
    },
    /// Prefix entry bodies with a tag
    Tag {
        file: String,
        tag: String,
        #[arg(long)]
        from: usize,
        #[arg(long)]
        to: Option<usize>,
    },
}

#[derive(Args)]
struct CaretArgs {
    /// Caret byte offset
    #[arg(long)]
    at: usize,
    /// Select from the caret to this offset
    #[arg(long)]
    select: Option<usize>,
}

fn init_logging() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .init();
}

/// Reads a file, or stdin for `-`.
fn read_input(file: &str) -> Result<String, Error> {
    if file == "-" {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text)?;
        Ok(text)
    } else {
        Ok(fs::read_to_string(file)?)
    }
}

fn open_session(config: &RcConfig, file: &str, caret: &CaretArgs) -> Result<EditorSession, Error> {
    let mut session = EditorSession::new(config);
    session.load(&read_input(file)?);
    match caret.select {
        Some(end) => session.select(caret.at, end),
        None => session.set_caret(caret.at),
    }
    Ok(session)
}

fn list_tags(text: &str) {
    for tag in parse_tags(text) {
        let params: Vec<String> = tag
            .parameters
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect();
        println!(
            "{}\t{}\tcharacter={}\tlanguage={}\t{}",
            tag.start,
            tag.full_text,
            tag.character,
            tag.language.as_deref().unwrap_or("-"),
            params.join(",")
        );
    }
}

/// Returns whether every check passed.
fn check(text: &str, config: &RcConfig) -> bool {
    let mut ok = true;

    match validate_tag_syntax(text) {
        Ok(()) => println!("Tag syntax OK"),
        Err(e) => {
            println!("{e}");
            ok = false;
        }
    }

    if srt::is_srt(text) {
        let report = srt::validate_with(text, config.gap_threshold_ms);
        println!("{report}");
        ok &= report.is_valid();
    }

    ok
}

fn run_srt(command: SrtCommand, config: &RcConfig) -> Result<(), Error> {
    match command {
        SrtCommand::Validate { file } => {
            let report = srt::validate_with(&read_input(&file)?, config.gap_threshold_ms);
            println!("{report}");
            if !report.is_valid() {
                process::exit(1);
            }
        }
        SrtCommand::Locate { file, at } => {
            let text = read_input(&file)?;
            let position = srt::locate_entry_at(&text, at);
            println!(
                "{}",
                srt::entry_indicator(position, srt::parse(&text).len())
            );
        }
        SrtCommand::Update {
            file,
            position,
            body,
        } => {
            let text = read_input(&file)?;
            if position >= srt::parse(&text).len() {
                return Err(Error::NoSuchEntry(position));
            }
            print!("{}", srt::update_entry(&text, position, &body));
        }
        SrtCommand::Tag { file, tag, from, to } => {
            let text = read_input(&file)?;
            print!("{}", srt::apply_tag_to_range(&text, &tag, from, to));
        }
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();
    let cli = Cli::parse();

    // Load RC configuration
    let config = match &cli.config {
        Some(path) => RcLoader::load_from(path)?,
        None => RcLoader::load_config(),
    };

    match cli.command {
        Command::Tags { file } => list_tags(&read_input(&file)?),
        Command::Check { file } => {
            if !check(&read_input(&file)?, &config) {
                process::exit(1);
            }
        }
        Command::Highlight { file, html } => {
            let text = read_input(&file)?;
            let view = decorate(&text);
            if html {
                println!("{}", render_html(&view));
            } else if config.color {
                print!("{}", render_ansi(&view));
            } else {
                print!("{text}");
            }
        }
        Command::Character { file, name, caret } => {
            let mut session = open_session(&config, &file, &caret)?;
            session.assign_character(&name);
            print!("{}", session.text());
        }
        Command::Language { file, code, caret } => {
            let mut session = open_session(&config, &file, &caret)?;
            session.assign_language(&code);
            print!("{}", session.text());
        }
        Command::Param {
            file,
            name,
            value,
            caret,
        } => {
            let mut session = open_session(&config, &file, &caret)?;
            session.assign_parameter(&name, &value)?;
            print!("{}", session.text());
        }
        Command::Format { file } => print!("{}", format_tags(&read_input(&file)?)),
        Command::Srt(command) => run_srt(command, &config)?,
    }

    Ok(())
}
