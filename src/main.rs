//! dlt-checker command line.
//!
//! `image` runs OCR on ticket photos, `text` takes lines recognized
//! elsewhere, `draw` prints the official result for a period.

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;

use dlt_checker::check::{
    render_json, render_text_all, run_batch, BatchContext, TicketReport,
};
use dlt_checker::config::{self, AppConfig};
use dlt_checker::draw::{
    CachedDrawSource, DrawSource, ManualDrawSource, PrizeTable, WebDrawSource,
};
use dlt_checker::ocr::{TesseractSource, TextFileSource, STDIN_PATH};
use dlt_checker::ticket::DrawPeriod;
use dlt_checker::{log, paths};

#[derive(Parser)]
#[command(name = "dlt-checker", version, about = "Check Super Lotto tickets against official results")]
struct Cli {
    /// Config file (defaults to config.json next to the executable)
    #[arg(long, global = true, env = "DLT_CHECKER_CONFIG")]
    config: Option<PathBuf>,

    /// Don't read or write the on-disk draw cache
    #[arg(long, global = true)]
    no_cache: bool,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Recognize ticket photos and check them
    Image {
        #[arg(required = true)]
        images: Vec<PathBuf>,

        #[command(flatten)]
        draw: DrawArgs,

        /// Worker threads (defaults to the config value)
        #[arg(long)]
        workers: Option<usize>,
    },
    /// Check tickets from recognized text files, one OCR line per line ("-" for stdin)
    Text {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[command(flatten)]
        draw: DrawArgs,
    },
    /// Fetch and print the official result for a period
    Draw { period: String },
}

#[derive(Args, Default)]
struct DrawArgs {
    /// Winning numbers to check against instead of fetching, e.g. "03 08 15 22 31 + 04 11"
    #[arg(long)]
    draw: Option<String>,

    /// First-tier amount for --draw
    #[arg(long, requires = "draw")]
    first: Option<u64>,

    /// Second-tier amount for --draw
    #[arg(long, requires = "draw")]
    second: Option<u64>,
}

fn main() -> Result<()> {
    // Set up panic hook to log panics
    std::panic::set_hook(Box::new(|panic_info| {
        let msg = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        let location = if let Some(loc) = panic_info.location() {
            format!(" at {}:{}:{}", loc.file(), loc.line(), loc.column())
        } else {
            String::new()
        };
        log(&format!("[PANIC]{} {}", location, msg));
    }));

    let cli = Cli::parse();

    // Logging still works to stderr if this fails
    let _ = paths::ensure_directories();

    config::init_config(cli.config.as_deref());
    let config = config::get_config();

    match &cli.command {
        Command::Image {
            images,
            draw,
            workers,
        } => {
            let draws = build_draw_source(config, draw, cli.no_cache)?;
            let text = TesseractSource::from_config(config)?;
            let rules = config.extract_rules();
            let ctx = BatchContext {
                text: &text,
                draws: draws.as_ref(),
                rules: &rules,
            };
            let reports = run_batch(images, &ctx, workers.unwrap_or(config.workers));
            print_reports(&reports, cli.json)
        }
        Command::Text { files, draw } => {
            let draws = build_draw_source(config, draw, cli.no_cache)?;
            let rules = config.extract_rules();

            // Tickets keep their argument order; "-" is read once up front.
            let text = if files.iter().any(|f| f.as_os_str() == STDIN_PATH) {
                let mut contents = String::new();
                std::io::stdin()
                    .read_to_string(&mut contents)
                    .context("Failed to read stdin")?;
                TextFileSource::with_stdin(&contents)
            } else {
                TextFileSource::new()
            };

            let ctx = BatchContext {
                text: &text,
                draws: draws.as_ref(),
                rules: &rules,
            };
            let reports = run_batch(files, &ctx, config.workers);
            print_reports(&reports, cli.json)
        }
        Command::Draw { period } => {
            let period = DrawPeriod::parse(period)
                .ok_or_else(|| anyhow!("Not a draw period: {}", period))?;
            let draws = build_draw_source(config, &DrawArgs::default(), cli.no_cache)?;
            let record = draws
                .fetch(&period)
                .ok_or_else(|| anyhow!("No result available for period {}", period))?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&record)?);
            } else {
                println!("{}", record);
            }
            Ok(())
        }
    }
}

/// Picks where winning numbers come from: hand-entered numbers, or the
/// result page behind the cache.
fn build_draw_source(
    config: &AppConfig,
    args: &DrawArgs,
    no_cache: bool,
) -> Result<Box<dyn DrawSource>> {
    if let Some(numbers) = &args.draw {
        let prizes = match (args.first, args.second) {
            (Some(first), Some(second)) => PrizeTable::new(first, second),
            (first, second) => PrizeTable::fallback(
                first.unwrap_or(config.fallback_first_prize),
                second.unwrap_or(config.fallback_second_prize),
            ),
        };
        let manual = ManualDrawSource::parse(numbers, prizes)
            .ok_or_else(|| anyhow!("Could not read winning numbers: {}", numbers))?;
        return Ok(Box::new(manual));
    }

    let web = WebDrawSource::new(
        &config.draw_url_template,
        config.fetch_timeout(),
        config.fallback_prizes(),
    )?;

    if config.cache_draws && !no_cache {
        Ok(Box::new(CachedDrawSource::with_dir(
            web,
            paths::get_draw_cache_dir(),
        )))
    } else {
        Ok(Box::new(CachedDrawSource::new(web)))
    }
}

fn print_reports(reports: &[TicketReport], json: bool) -> Result<()> {
    if json {
        println!("{}", render_json(reports)?);
    } else {
        print!("{}", render_text_all(reports));
    }
    Ok(())
}
