use blobscope::options::{
    sanitize_preview_len, DEFAULT_DECOMPRESSED_OUTPUT_CAP, DEFAULT_ENTROPY_SAMPLE_CAP,
    DEFAULT_MAX_BODY_LEN, DEFAULT_PREVIEW_MAX_LEN,
};
use blobscope::report::Summary;
use blobscope::{blob_id, Classification, InspectOptions, InspectionRecord, Inspector};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(name = "blobscope")]
#[command(author, version, about = "Classify stored objects and flag the ones that look encrypted")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// File or directory to inspect (directories are walked recursively)
    path: Option<PathBuf>,

    /// Output report file (.csv, .json)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Text preview length in characters (1-4000)
    #[arg(long, default_value_t = DEFAULT_PREVIEW_MAX_LEN)]
    max_len: usize,

    /// Bytes sampled for the entropy estimate
    #[arg(long, default_value_t = DEFAULT_ENTROPY_SAMPLE_CAP)]
    entropy_sample: usize,

    /// Maximum decompressed bytes per codec attempt
    #[arg(long, default_value_t = DEFAULT_DECOMPRESSED_OUTPUT_CAP)]
    decompress_cap: usize,

    /// Declared content type for every object, instead of guessing from the extension
    #[arg(long)]
    content_type: Option<String>,

    /// Number of parallel workers (default: number of CPUs)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Show reasons, notes and hashes; enables debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Only show summary
    #[arg(short, long)]
    quiet: bool,

    /// Print full verdicts as JSON on stdout instead of the table
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve an inspection API over a directory
    Serve {
        /// Directory whose objects may be inspected
        path: PathBuf,

        /// Port to listen on
        #[arg(short, long, default_value = "3001")]
        port: u16,

        /// Largest accepted upload for POST /api/inspect, in bytes
        #[arg(long, default_value_t = DEFAULT_MAX_BODY_LEN)]
        max_body: usize,
    },

    /// Convert a base64url blob id to its decimal form
    BlobId {
        /// Blob id (or decimal integer with --reverse)
        id: String,

        /// Convert decimal back to base64url
        #[arg(short, long)]
        reverse: bool,
    },
}

impl Args {
    fn inspect_options(&self) -> InspectOptions {
        InspectOptions::new()
            .with_preview_max_len(sanitize_preview_len(Some(self.max_len)))
            .with_entropy_sample_cap(self.entropy_sample)
            .with_decompressed_output_cap(self.decompress_cap)
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(default_level))
                .unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    // Handle subcommands first
    if let Some(ref cmd) = args.command {
        match cmd {
            Command::Serve { path, port, max_body } => {
                let options = args.inspect_options().with_max_body_len(*max_body);
                if let Err(e) = blobscope::serve::start(*port, path.clone(), options) {
                    eprintln!("Server error: {}", e);
                    std::process::exit(1);
                }
                return;
            }
            Command::BlobId { id, reverse } => {
                let converted = if *reverse {
                    blob_id::from_decimal(id)
                } else {
                    blob_id::to_decimal(id)
                };
                match converted {
                    Ok(value) => println!("{}", value),
                    Err(e) => {
                        eprintln!("{}", e);
                        std::process::exit(1);
                    }
                }
                return;
            }
        }
    }

    let path = if let Some(p) = args.path.clone() {
        p
    } else {
        eprintln!("Usage: blobscope <PATH>");
        eprintln!("Run 'blobscope --help' for more options.");
        std::process::exit(1);
    };

    // Set up thread pool
    if let Some(jobs) = args.jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()
            .ok();
    }

    let files: Vec<PathBuf> = if path.is_dir() {
        WalkDir::new(&path)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.path().to_path_buf())
            .collect()
    } else {
        vec![path.clone()]
    };

    if files.is_empty() {
        eprintln!("No objects found in {}", path.display());
        std::process::exit(1);
    }

    let show_table = !args.quiet && !args.json;

    if show_table {
        eprintln!("\x1b[1mblobscope - Stored Object Inspector\x1b[0m");
        eprintln!("{}", "─".repeat(70));
        eprintln!("Found {} object(s)\n", files.len());
    }

    // Set up progress bar
    let pb = if !args.quiet && files.len() > 1 {
        let pb = ProgressBar::new(files.len() as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-");
        pb.set_style(style);
        Some(pb)
    } else {
        None
    };

    let inspector = Inspector::new().with_options(args.inspect_options());
    let content_type = args.content_type.as_deref();

    // Inspect in parallel, order preserved
    let records: Vec<InspectionRecord> = files
        .par_iter()
        .map(|path| {
            let record = inspector.inspect_file_as(path, content_type);
            if let Some(ref pb) = pb {
                pb.inc(1);
                pb.set_message(record.file_name.clone());
            }
            record
        })
        .collect();

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    if args.json {
        match serde_json::to_string_pretty(&records) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Failed to serialize verdicts: {}", e),
        }
    } else if show_table {
        for r in &records {
            print_record(r, args.verbose);
        }
    }

    let summary = Summary::from_records(&records);

    if !args.quiet && !args.json {
        eprintln!("\n{}", "─".repeat(70));
        eprintln!("\x1b[1mSummary:\x1b[0m");
        eprintln!("  \x1b[34mMedia:\x1b[0m       {}", summary.media);
        eprintln!("  \x1b[32mText:\x1b[0m        {}", summary.text);
        eprintln!("  \x1b[36mKnown:\x1b[0m       {}", summary.known_binary);
        eprintln!("  \x1b[33mCompressed:\x1b[0m  {}", summary.compressed);
        eprintln!("  \x1b[31mEncrypted?:\x1b[0m  {}", summary.likely_encrypted);
        eprintln!("  Opaque:      {}", summary.opaque);
        if summary.error > 0 {
            eprintln!("  \x1b[90mErrors:\x1b[0m      {}", summary.error);
        }
    }

    if let Some(ref output_path) = args.output {
        if let Err(e) = blobscope::report::generate(output_path, &records) {
            eprintln!("Failed to write report: {}", e);
            std::process::exit(1);
        }
        if !args.quiet {
            eprintln!("\n\x1b[32mReport saved: {}\x1b[0m", output_path.display());
        }
    }

    // Exit with appropriate code
    if summary.likely_encrypted > 0 {
        std::process::exit(2);
    } else if summary.error > 0 {
        std::process::exit(1);
    }
}

fn print_record(r: &InspectionRecord, verbose: bool) {
    let reset = "\x1b[0m";

    let Some(ref v) = r.verdict else {
        println!(
            "\x1b[90m{:<24}{}  {}  {}",
            "[error]",
            reset,
            &r.file_name,
            r.error.as_deref().unwrap_or("")
        );
        return;
    };

    let classification = v.classification();
    let color = if v.likely_encrypted() {
        "\x1b[31m" // Red
    } else {
        match classification {
            c if c.is_media() => "\x1b[34m",  // Blue
            c if c.is_text() => "\x1b[32m",   // Green
            c if c.is_compressed() => "\x1b[33m", // Yellow
            Classification::BinaryKnown | Classification::BinaryArchive => "\x1b[36m", // Cyan
            _ => "\x1b[90m", // Gray
        }
    };

    let guess = &v.encryption_guess;
    let entropy = guess
        .entropy_bits_per_byte
        .map(|e| format!("{:.2}", e))
        .unwrap_or_else(|| "-".to_string());
    let ratio = guess
        .compression_ratio
        .map(|r| format!("{:.3}", r))
        .unwrap_or_else(|| "-".to_string());

    println!(
        "{}{:<24}{} {:>5}  {:>6}  {:>10}  {}",
        color,
        format!("[{}]", classification),
        reset,
        entropy,
        ratio,
        human_size(v.size_bytes),
        &r.file_name
    );

    if verbose {
        eprintln!("    Reason: {}", guess.reason);
        if let Some(ref note) = v.note {
            eprintln!("    Note: {}", note);
        }
        eprintln!("    sha256: {}", v.hashes.sha256);
    }
}

fn human_size(bytes: usize) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", size, UNITS[unit])
    }
}
