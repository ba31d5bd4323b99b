// fanrec-cli/src/main.rs

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use anyhow::Result;
use log::info;

use convert::{convert_dir, write_jsonl};
use extract::{extract_archives, list_lzh_archive};
use fanrec_common::common_config::{DEFAULT_INTERIM_DIR, DEFAULT_PROCESSED_DIR, DEFAULT_RAW_DIR};
use fanrec_common::{ConvertConfig, FanFile, ReleaseInfo, ReleaseTerm, YearBounds};

#[derive(Parser)]
#[command(name = "fanrec")]
#[command(about = "fanrec: LZH fan record archives to JSON Lines", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract, parse and write every archive in the raw directory
    Convert {
        #[arg(long, env = "FANREC_RAW_DIR", default_value = DEFAULT_RAW_DIR)]
        raw: PathBuf,

        #[arg(long, env = "FANREC_INTERIM_DIR", default_value = DEFAULT_INTERIM_DIR)]
        interim: PathBuf,

        #[arg(long, env = "FANREC_PROCESSED_DIR", default_value = DEFAULT_PROCESSED_DIR)]
        processed: PathBuf,

        /// Also write all records, filtered and sorted, to this file
        #[arg(long, env = "FANREC_COMBINED_OUTPUT")]
        combined_output: Option<PathBuf>,

        #[arg(long)]
        min_year: Option<i32>,

        #[arg(long)]
        max_year: Option<i32>,
    },

    /// Only extract the archives
    Extract {
        #[arg(long, env = "FANREC_RAW_DIR", default_value = DEFAULT_RAW_DIR)]
        raw: PathBuf,

        #[arg(long, env = "FANREC_INTERIM_DIR", default_value = DEFAULT_INTERIM_DIR)]
        interim: PathBuf,
    },

    /// Parse a single text file
    Parse {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,

        /// Overrides the year inferred from the file name
        #[arg(long)]
        year: Option<i32>,

        /// Overrides the month inferred from the file name
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: Option<u32>,
    },

    /// List the members of an archive
    List {
        #[arg(short, long)]
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Convert { raw, interim, processed, combined_output, min_year, max_year } => {
            let config = ConvertConfig {
                raw_dir: raw,
                interim_dir: interim,
                processed_dir: processed,
                combined_output,
                year_bounds: YearBounds::new(min_year, max_year),
            };
            info!("convert with {:?}", config);
            let report = convert_dir(&config)?;
            println!("\n✅ Conversion done:");
            println!("📦 Archives:            {}", report.archives);
            println!("📂 Extracted files:     {}", report.extracted_files);
            println!("📄 Text files:          {}", report.text_files);
            println!("📝 Files written:       {}", report.files_written);
            println!("🔢 Records:             {}", report.records);
            if let Some(path) = &config.combined_output {
                println!("🧮 Combined records:    {} ({})", report.combined_records, path.display());
            }
        }

        Commands::Extract { raw, interim } => {
            let files = extract_archives(&raw, &interim)?;
            println!("\n✅ Extraction done:");
            println!("📂 Extracted files:     {}", files.len());
        }

        Commands::Parse { input, output, year, month } => {
            let explicit = ReleaseInfo {
                year,
                month,
                term: month.map(ReleaseTerm::from_month),
            };
            let records = FanFile::with_release(&input, explicit).read_all()?;
            let written = write_jsonl(&records, &output)?;
            println!("\n✅ Parsed {} → {}", input.display(), output.display());
            println!("🔢 Records:             {}", written);
        }

        Commands::List { input } => {
            for entry in list_lzh_archive(&input)? {
                let mark = if entry.supported { "" } else { "  (unsupported method)" };
                println!("{:<40} {:>10} bytes{}", entry.name, entry.size, mark);
            }
        }
    }

    Ok(())
}
