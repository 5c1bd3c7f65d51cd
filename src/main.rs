use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use lrcsync::alignment::{AlignConfig, SEARCH_WINDOW};
use lrcsync::lyric_parser::{LyricDocument, LyricParser};
use lrcsync::output::{write_lrc_file, RunStats};
use lrcsync::pipeline::{Outcome, Pipeline};
use lrcsync::reader::InputReader;
use lrcsync::retime::LrcSheet;
use lrcsync::timestamp::parse_tag_millis;
use lrcsync::tokenizer::space_cjk;

#[derive(Parser, Debug)]
#[command(name = "lrcsync")]
#[command(about = "Align reference lyrics with recognizer word timings and write word-level LRC")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Align lyrics against a recognizer transcript and render LRC
    Align(AlignArgs),
    /// Parse a lyric file and print its primary lines
    Parse {
        /// Lyric file (.lrc, .txt or .srt)
        file: PathBuf,
        /// Print the whole document (headers, lines, translations) as JSON
        #[arg(long)]
        json: bool,
    },
    /// Move one LRC row to a new start time, shifting its word-level tags
    Retime {
        /// Rendered LRC file
        file: PathBuf,
        /// 1-based row number, counting non-empty lines
        #[arg(long)]
        line: usize,
        /// New start time, e.g. 01:02.500
        #[arg(long)]
        at: String,
        /// Output file; defaults to stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print reference text with CJK characters space-separated for a forced aligner
    Prepare {
        /// Lyric file whose primary lines are used
        file: PathBuf,
    },
}

#[derive(Args, Debug)]
struct AlignArgs {
    /// Recognizer output JSON ({"segments": [...]} or a bare segment array)
    #[arg(long)]
    transcript: PathBuf,

    /// Reference lyric file; without it the transcription is rendered as-is
    #[arg(long)]
    lyrics: Option<PathBuf>,

    /// Global time offset in milliseconds (may be negative)
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    offset_ms: i64,

    /// Forward search window over recognizer words
    #[arg(long, default_value_t = SEARCH_WINDOW)]
    window: usize,

    /// Output LRC path; defaults to stdout
    #[arg(long)]
    out: Option<PathBuf>,

    /// Stats output file path
    #[arg(long)]
    stats_out: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // WHY: structured JSON logs go to stderr, stdout is reserved for LRC output
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();
    info!(?cli, "Parsed CLI arguments");

    match cli.command {
        Command::Align(args) => run_align(args).await,
        Command::Parse { file, json } => run_parse(file, json).await,
        Command::Retime { file, line, at, out } => run_retime(file, line, &at, out).await,
        Command::Prepare { file } => run_prepare(file).await,
    }
}

async fn run_align(args: AlignArgs) -> Result<()> {
    let start_time = Instant::now();
    let config = AlignConfig {
        search_window: args.window,
        ..AlignConfig::default()
    }
    .with_offset_millis(args.offset_ms);
    let pipeline = Pipeline::new(config)?;

    let reader = InputReader::default();
    let transcript = reader.read_transcript(&args.transcript).await?;
    let document = match &args.lyrics {
        Some(path) => {
            let parser = LyricParser::new()?;
            reader.read_document(path, &parser).await?
        }
        None => LyricDocument::default(),
    };
    if args.lyrics.is_some() && !document.has_reference() {
        warn!("Lyric file has no primary lines, falling back to transcription output");
    }

    // WHY: Ctrl-C only raises the flag; the worker notices between lines and drops its partial output
    let abort = Arc::new(AtomicBool::new(false));
    let signal_flag = Arc::clone(&abort);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal_flag.store(true, Ordering::Relaxed);
        }
    });

    let worker_flag = Arc::clone(&abort);
    let outcome = tokio::task::spawn_blocking(move || pipeline.run(&document, &transcript.segments, &worker_flag))
        .await
        .context("Alignment worker panicked")?;

    let mut stats = RunStats {
        lyrics_path: args.lyrics.as_ref().map(|p| p.display().to_string()),
        transcript_path: args.transcript.display().to_string(),
        output_path: None,
        status: String::new(),
        processing_time_ms: 0,
        summary: None,
        error: None,
    };

    let result = match outcome {
        Outcome::Completed(aligned) => {
            let written = match &args.out {
                Some(path) => write_lrc_file(path, &aligned.lrc).await.map(|_| {
                    stats.output_path = Some(path.display().to_string());
                }),
                None => {
                    println!("{}", aligned.lrc);
                    Ok(())
                }
            };
            stats.summary = Some(aligned.summary);
            written
        }
        Outcome::Aborted => {
            stats.status = "aborted".to_string();
            stats.processing_time_ms = start_time.elapsed().as_millis() as u64;
            if let Some(path) = &args.stats_out {
                stats.write_json(path).await?;
            }
            eprintln!("Alignment aborted, no output written");
            std::process::exit(130);
        }
    };

    stats.processing_time_ms = start_time.elapsed().as_millis() as u64;
    match &result {
        Ok(()) => stats.status = "success".to_string(),
        Err(e) => {
            stats.status = "failed".to_string();
            stats.error = Some(e.to_string());
        }
    }
    if let Some(path) = &args.stats_out {
        stats.write_json(path).await?;
    }
    info!(status = %stats.status, elapsed_ms = stats.processing_time_ms, "Align run finished");
    result
}

async fn run_parse(file: PathBuf, json: bool) -> Result<()> {
    let parser = LyricParser::new()?;
    let document = InputReader::default().read_document(&file, &parser).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&document)?);
    } else {
        println!("{}", document.seed_text());
    }
    Ok(())
}

async fn run_retime(file: PathBuf, line: usize, at: &str, out: Option<PathBuf>) -> Result<()> {
    let new_start_ms = parse_tag_millis(at).with_context(|| format!("Invalid time '{at}', expected mm:ss.xxx"))?;
    if line == 0 {
        anyhow::bail!("--line is 1-based");
    }

    let (content, _stats) = InputReader::default().read_text(&file).await?;
    let mut sheet = LrcSheet::parse(&content)?;
    let propagated = sheet.restamp(line - 1, new_start_ms)?;
    info!(row = line, new_start_ms, propagated, "Row retimed");

    let rendered = sheet.render();
    match out {
        Some(path) => write_lrc_file(&path, &rendered).await?,
        None => println!("{rendered}"),
    }
    Ok(())
}

async fn run_prepare(file: PathBuf) -> Result<()> {
    let parser = LyricParser::new()?;
    let document = InputReader::default().read_document(&file, &parser).await?;
    println!("{}", space_cjk(&document.seed_text()));
    Ok(())
}
