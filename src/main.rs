use clap::{Parser, Subcommand};
use hapimeta::Result;
use hapimeta::config::Settings;
use hapimeta::fetch::HapiClient;
use hapimeta::pipeline::{abouts, catalogs};
use hapimeta::{availability, logging, servers, spase};

#[derive(Parser)]
#[command(name = "hapimeta")]
#[command(about = "Harvest and republish HAPI server metadata", long_about = None)]
struct Cli {
    #[command(flatten)]
    settings: Settings,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Refresh a server list from each server's /about.
    Abouts {
        /// List to read, relative to the servers directory.
        #[arg(long, default_value = "abouts.json")]
        file: String,

        /// Write the updated list here instead of over the input.
        #[arg(short = 'o', long)]
        out: Option<String>,
    },

    /// Harvest /catalog, /capabilities and /info from every server.
    Catalogs {
        /// Server lists to read (comma separated).
        #[arg(long = "about-files", value_delimiter = ',', default_values_t = servers::ABOUT_FILES.map(String::from))]
        about_files: Vec<String>,

        /// Stop after this many /info requests per server.
        #[arg(long)]
        max_infos: Option<usize>,
    },

    /// Write per-server availability tables and pages from catalogs-all.json.
    Availability,

    /// Write SPASE NumericalData documents from catalogs-all.json.
    Spase {
        /// Use the infos under data/infos/ instead of those in catalogs-all.json.
        #[arg(long)]
        reread_info: bool,
    },
}

impl Commands {
    fn job(&self) -> &'static str {
        match self {
            Commands::Abouts { .. } => abouts::JOB,
            Commands::Catalogs { .. } => catalogs::JOB,
            Commands::Availability => "availability",
            Commands::Spase { .. } => "spase",
        }
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let guard = logging::init(&cli.settings.log_dir, cli.cmd.job())?;
    let result = run(cli);
    if let Err(e) = &result {
        tracing::error!("{:#}", e);
    }
    guard.finish()?;
    result
}

fn run(cli: Cli) -> Result<()> {
    let settings = cli.settings;

    match cli.cmd {
        Commands::Abouts { file, out } => {
            let client = HapiClient::new(settings.timeout(), settings.retries)?;
            let opts = abouts::AboutsOptions { file, out };
            let report = abouts::run(&settings, &opts, &client)?;
            tracing::info!(
                "{} servers: {} updated, {} failed",
                report.records,
                report.updated + report.created,
                report.failed
            );
        }
        Commands::Catalogs {
            about_files,
            max_infos,
        } => {
            let client = HapiClient::new(settings.timeout(), settings.retries)?;
            let opts = catalogs::CatalogsOptions {
                about_files,
                max_infos,
            };
            let report = catalogs::run(&settings, &opts, &client)?;
            tracing::info!(
                "{} records: {} created, {} updated, {} failed",
                report.records,
                report.created,
                report.updated,
                report.failed
            );
        }
        Commands::Availability => {
            for server in availability::run(&settings)? {
                tracing::info!(
                    "{}: {} datasets, {} skipped",
                    server.server,
                    server.datasets,
                    server.skipped
                );
            }
        }
        Commands::Spase { reread_info } => {
            spase::run(&settings, &spase::SpaseOptions { reread_info })?;
        }
    }

    Ok(())
}
