use anyhow::Result;
use clap::{Parser, Subcommand};
use perkons_cli::{
    card::DEFAULT_SD_PATH,
    commands::{self, delete::DeleteOptions, randomise::RandomiseOptions, vary::VaryOptions},
    OutputFormat,
};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "perkons")]
#[command(about = "Perkons - Inspect, edit and mix Erica Synths Perkons HD-01 kits", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the format, header and voice controls of a kit file
    Inspect {
        /// Kit file to inspect
        #[arg(short, long)]
        input: String,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Set one control of one voice
    Set {
        /// Kit file to edit
        #[arg(short, long)]
        input: String,

        /// Output file (defaults to editing in place)
        #[arg(short, long)]
        output: Option<String>,

        /// Voice number (1-4)
        #[arg(long)]
        voice: usize,

        /// Control name (algo, mode, vcf, tune, param1, param2, fx_send, decay, cutoff, drive, level)
        #[arg(long)]
        control: String,

        /// New value (0-2 for toggles, 0-255 for pots)
        #[arg(long, allow_hyphen_values = true)]
        value: i32,
    },

    /// Build a kit from voices of several kit files
    Mix {
        /// Source kit files; the first one provides header and format
        #[arg(short, long, num_args = 1.., required = true)]
        kits: Vec<String>,

        /// Voice picks as KIT:VOICE per slot, 0-based (e.g. 0:0,1:2,0:1,2:3)
        #[arg(short, long)]
        select: String,

        /// Output kit file
        #[arg(short, long)]
        output: String,
    },

    /// Fill a bank with kits mixed at random from source banks 01 and 02
    Randomise {
        /// Destination bank (00-63, not 01 or 02)
        #[arg(short, long)]
        output_bank: String,

        /// Number of kits to generate
        #[arg(short, long, default_value = "32")]
        n: usize,

        /// Random seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,

        /// Layout of generated kits
        #[arg(long, value_enum, default_value = "2")]
        format: OutputFormat,

        /// SD card mount point
        #[arg(long, default_value = DEFAULT_SD_PATH)]
        sd_path: String,

        /// Overwrite a bank that already holds kits and skip the confirmation
        #[arg(long)]
        force: bool,

        /// Show a progress bar
        #[arg(long)]
        progress: bool,
    },

    /// Fill a bank with variations of one kit
    Vary {
        /// Source kit as BANK:KIT (e.g. 01:05)
        #[arg(long)]
        source: String,

        /// Destination bank (00-63, not 01 or 02)
        #[arg(short, long)]
        output_bank: String,

        /// Number of variations to generate
        #[arg(long, default_value = "32")]
        n_variants: usize,

        /// Voices replaced per variation (1-4)
        #[arg(long, default_value = "2")]
        n_mutations: usize,

        /// Random seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,

        /// SD card mount point
        #[arg(long, default_value = DEFAULT_SD_PATH)]
        sd_path: String,

        /// Overwrite a bank that already holds kits and skip the confirmation
        #[arg(long)]
        force: bool,
    },

    /// List banks and kits on the SD card
    List {
        /// SD card mount point
        #[arg(long, default_value = DEFAULT_SD_PATH)]
        sd_path: String,

        /// Print the listing as JSON
        #[arg(long)]
        json: bool,

        /// Show per-bank sizes
        #[arg(long)]
        detailed: bool,
    },

    /// Delete a bank, or clean source bank 01/02 back to its factory kits
    Delete {
        /// Bank to delete (00-63)
        #[arg(short, long)]
        bank: String,

        /// SD card mount point
        #[arg(long, default_value = DEFAULT_SD_PATH)]
        sd_path: String,

        /// Skip the typed confirmation
        #[arg(long)]
        yes: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    // Execute command
    match cli.command {
        Commands::Inspect { input, json } => commands::inspect::execute(&input, json),

        Commands::Set {
            input,
            output,
            voice,
            control,
            value,
        } => commands::set::execute(&input, output.as_deref(), voice, &control, value),

        Commands::Mix {
            kits,
            select,
            output,
        } => commands::mix::execute(&kits, &select, &output),

        Commands::Randomise {
            output_bank,
            n,
            seed,
            format,
            sd_path,
            force,
            progress,
        } => commands::randomise::execute(&RandomiseOptions {
            sd_path,
            output_bank,
            count: n,
            seed,
            format,
            force,
            progress,
        }),

        Commands::Vary {
            source,
            output_bank,
            n_variants,
            n_mutations,
            seed,
            sd_path,
            force,
        } => commands::vary::execute(&VaryOptions {
            sd_path,
            source,
            output_bank,
            variants: n_variants,
            mutations: n_mutations,
            seed,
            force,
        }),

        Commands::List {
            sd_path,
            json,
            detailed,
        } => commands::list::execute(&sd_path, json, detailed),

        Commands::Delete { bank, sd_path, yes } => {
            commands::delete::execute(&DeleteOptions { sd_path, bank, yes })
        }
    }
}
