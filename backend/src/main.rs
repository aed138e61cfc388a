//! Leadmap CLI - Convert Real Intent lead exports to CRM import CSV files
//!
//! ```bash
//! leadmap convert leads.csv                      # Rechat CSV on stdout
//! leadmap convert leads.csv -o converted_file.csv
//! leadmap convert leads.csv -m realty-juggler --encoding auto
//! leadmap mappings                               # List mapping presets
//! leadmap columns -m rechat                      # Show a preset's columns
//! leadmap serve                                  # Start HTTP server (port 3000)
//! ```

use clap::{Parser, Subcommand};
use leadmap::api::logs::LOG_BROADCASTER;
use leadmap::{
    convert_bytes, convert_file, Conversion, ConvertOptions, InputEncoding, MappingPreset,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "leadmap")]
#[command(about = "Convert Real Intent lead exports into CRM import CSV files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a lead export CSV
    Convert {
        /// Input CSV file
        input: PathBuf,

        /// Mapping preset
        #[arg(short, long, value_enum, default_value_t = MappingPreset::Rechat)]
        mapping: MappingPreset,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Input encoding: utf-8, auto, or a label such as windows-1252
        #[arg(short, long, default_value = "utf-8")]
        encoding: String,

        /// Number of converted rows to preview
        #[arg(long, default_value = "5")]
        preview: usize,

        /// Only print errors
        #[arg(short, long)]
        quiet: bool,
    },

    /// List available mapping presets
    Mappings,

    /// Show the source and target columns of a preset
    Columns {
        /// Mapping preset
        #[arg(short, long, value_enum, default_value_t = MappingPreset::Rechat)]
        mapping: MappingPreset,

        /// Print the full mapping as JSON
        #[arg(long)]
        json: bool,
    },

    /// Start HTTP server
    Serve {
        /// Port to listen on (default: $LEADMAP_PORT or 3000)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Convert {
            input,
            mapping,
            output,
            encoding,
            preview,
            quiet,
        } => cmd_convert(&input, mapping, output.as_deref(), &encoding, preview, quiet),

        Commands::Mappings => cmd_mappings(),

        Commands::Columns { mapping, json } => cmd_columns(mapping, json),

        Commands::Serve { port } => cmd_serve(port).await,
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_convert(
    input: &Path,
    mapping: MappingPreset,
    output: Option<&Path>,
    encoding: &str,
    preview: usize,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if quiet {
        LOG_BROADCASTER.set_echo(false);
    }

    let options = ConvertOptions {
        preset: mapping,
        encoding: encoding.parse::<InputEncoding>()?,
        preview_rows: 0,
    };

    let conversion = match output {
        Some(path) => convert_file(input, path, &options)?,
        None => {
            let bytes = fs::read(input)?;
            let conversion = convert_bytes(&bytes, &options)?;
            print!("{}", String::from_utf8_lossy(&conversion.to_csv_bytes()?));
            conversion
        }
    };

    if !quiet {
        print_preview(&conversion, preview);
    }

    Ok(())
}

fn print_preview(conversion: &Conversion, rows: usize) {
    let preview = conversion.preview(rows);
    if preview.is_empty() {
        return;
    }

    eprintln!("\n📋 Preview ({} of {} rows):", preview.len(), conversion.table.len());
    for row in &preview {
        eprintln!();
        for (name, value) in conversion.table.header.iter().zip(row) {
            if !value.is_empty() {
                eprintln!("   {:<18} {}", name, value);
            }
        }
    }
    eprintln!("\n✨ Done!");
}

fn cmd_mappings() -> Result<(), Box<dyn std::error::Error>> {
    for preset in MappingPreset::ALL {
        let config = preset.config();
        println!("  📄 {}", preset.id());
        println!("     {}", config.description);
        println!("     Required: {}", config.required_columns.join(", "));
        println!();
    }
    Ok(())
}

fn cmd_columns(mapping: MappingPreset, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = mapping.config();

    if json {
        println!("{}", config.to_json()?);
        return Ok(());
    }

    println!("📄 {} - {}\n", config.name, config.description);
    println!("Required source columns:");
    for col in &config.required_columns {
        println!("   {}", col);
    }
    println!("\nOptional source columns:");
    for col in &config.optional_columns {
        println!("   {}", col);
    }
    println!("\nTarget columns:");
    for (i, col) in config.columns.iter().enumerate() {
        let sources = col.rule.sources();
        if sources.is_empty() {
            println!("   [{:2}] {}", i + 1, col.name);
        } else {
            println!("   [{:2}] {} ← {}", i + 1, col.name, sources.join(", "));
        }
    }
    Ok(())
}

async fn cmd_serve(port: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let port = port
        .or_else(|| std::env::var("LEADMAP_PORT").ok().and_then(|p| p.parse().ok()))
        .unwrap_or(leadmap::server::DEFAULT_PORT);
    leadmap::server::start_server(port).await?;
    Ok(())
}
