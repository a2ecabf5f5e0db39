//! cpmfs CLI - Inspect CP/M file control blocks from the command line.
//!
//! Usage:
//!   cpmfs parse <name>
//!   cpmfs find <pattern> [--root DIR | --per-drive DIR | --config FILE]
//!   cpmfs offset <name> (--sequential N | --random N)
//!
//! Examples:
//!   cpmfs parse B:HELLO.COM          # Show the 36-byte FCB for a filename
//!   cpmfs find "*.COM" --root ./a    # List matching host files
//!   cpmfs find "B:*.*" --per-drive . # Search ./B
//!   cpmfs offset FOO --sequential 16384

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use log::{Level, LevelFilter, Log, Metadata, Record};

use cpmfs_core::{DriveMap, Fcb, FindResult, FCB_SIZE};

/// CP/M file control block tool
#[derive(Parser, Debug)]
#[command(name = "cpmfs")]
#[command(about = "Inspect CP/M file control blocks and search host directories")]
struct Cli {
    /// Enable trace logging
    #[arg(short, long, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a filename and dump the resulting FCB
    Parse {
        /// Filename, e.g. B:FOO.TXT or *.COM
        name: String,
    },

    /// Search host directories for files matching a pattern
    Find {
        /// Pattern, e.g. *.COM or B:TEST.C*
        pattern: String,

        #[command(flatten)]
        drives: DriveArgs,

        /// Print results as JSON
        #[arg(long)]
        json: bool,

        /// Give up after this many seconds
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Show how a file position is stored in the FCB
    Offset {
        /// Filename to build the FCB from
        name: String,

        /// Sequential byte offset
        #[arg(long, conflicts_with = "random", required_unless_present = "random")]
        sequential: Option<u32>,

        /// Random record number
        #[arg(long)]
        random: Option<u32>,
    },
}

/// Where drives live on the host.
#[derive(Args, Debug)]
#[group(multiple = false)]
struct DriveArgs {
    /// Use one directory for every drive
    #[arg(long)]
    root: Option<PathBuf>,

    /// Use <DIR>/A, <DIR>/B, ... for drives A:, B:, ...
    #[arg(long, value_name = "DIR")]
    per_drive: Option<PathBuf>,

    /// Load a JSON drive map
    #[arg(long)]
    config: Option<PathBuf>,
}

impl DriveArgs {
    fn drive_map(&self) -> cpmfs_core::CpmResult<DriveMap> {
        if let Some(path) = &self.config {
            DriveMap::load(path)
        } else if let Some(dir) = &self.per_drive {
            Ok(DriveMap::per_drive(dir))
        } else {
            Ok(DriveMap::single(
                self.root.clone().unwrap_or_else(|| PathBuf::from(".")),
            ))
        }
    }
}

/// Logger writing `[LEVEL] message` lines to stderr.
struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn init_logging(trace: bool) {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(if trace {
            LevelFilter::Trace
        } else {
            Level::Warn.to_level_filter()
        });
    }
}

fn hex_dump(bytes: &[u8]) -> String {
    bytes
        .chunks(12)
        .enumerate()
        .map(|(row, chunk)| {
            let hex: Vec<String> = chunk.iter().map(|b| format!("{:02X}", b)).collect();
            format!("  {:02X}: {}", row * 12, hex.join(" "))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn print_fcb(fcb: &Fcb) {
    println!("drive:  {}", fcb.drive());
    println!("name:   \"{}\"", String::from_utf8_lossy(fcb.raw_name()));
    println!("type:   \"{}\"", String::from_utf8_lossy(fcb.raw_ext()));
    println!(
        "ex: {}  s1: {}  s2: {:#04X}  rc: {}  cr: {}",
        fcb.ex(),
        fcb.s1(),
        fcb.s2(),
        fcb.rc(),
        fcb.cr()
    );
    println!(
        "sequential offset: {}  random record: {}",
        fcb.sequential_offset(),
        fcb.random_offset()
    );
    if fcb.has_wildcards() {
        println!("(wildcard pattern)");
    }
    println!("bytes ({}):", FCB_SIZE);
    println!("{}", hex_dump(fcb.as_bytes()));
}

fn print_results(results: &[FindResult], json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(results)?);
        return Ok(());
    }

    for r in results {
        println!("{:<12} {:>10}  {}", r.name, r.size, r.host.display());
    }
    println!("{} file(s)", results.len());
    Ok(())
}

/// Run blocking work on the runtime's blocking pool, giving up after
/// `limit`.
///
/// The runtime is shut down without joining its blocking threads, so a
/// walk that outlives the limit cannot hold the process open.
fn run_bounded<T, F>(work: F, limit: Option<Duration>) -> Result<T, Box<dyn std::error::Error>>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let rt = tokio::runtime::Runtime::new()?;
    let outcome: Result<T, Box<dyn std::error::Error>> = rt.block_on(async move {
        let task = tokio::task::spawn_blocking(work);
        let joined = match limit {
            Some(limit) => tokio::time::timeout(limit, task)
                .await
                .map_err(|_| format!("timed out after {:?}", limit))?,
            None => task.await,
        };
        Ok::<T, Box<dyn std::error::Error>>(joined?)
    });
    rt.shutdown_background();
    outcome
}

fn run_find(
    pattern: String,
    drives: DriveArgs,
    json: bool,
    timeout: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let map = drives.drive_map()?;
    let text = pattern.clone();

    // Directory walks block, so run them off the async runtime
    let mut results = run_bounded(
        move || map.find_name(&text),
        timeout.map(Duration::from_secs),
    )
    .map_err(|e| format!("search for {}: {}", pattern, e))??;

    results.sort();
    print_results(&results, json)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.trace);

    match cli.command {
        Command::Parse { name } => {
            print_fcb(&Fcb::parse(&name));
        }
        Command::Find {
            pattern,
            drives,
            json,
            timeout,
        } => {
            run_find(pattern, drives, json, timeout)?;
        }
        Command::Offset {
            name,
            sequential,
            random,
        } => {
            let mut fcb = Fcb::parse(&name);
            if let Some(offset) = sequential {
                fcb.set_sequential_offset(offset);
                if fcb.sequential_offset() != offset {
                    log::warn!(
                        "offset {} is stored as {}",
                        offset,
                        fcb.sequential_offset()
                    );
                }
            }
            if let Some(record) = random {
                fcb.set_random_offset(record);
                if fcb.random_offset() != record {
                    log::warn!("record {} truncated to 24 bits", record);
                }
            }
            print_fcb(&fcb);
        }
    }

    Ok(())
}
