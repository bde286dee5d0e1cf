//! ecoroute-sim: the EcoRoute live map without a screen.
//!
//! Runs the truck simulation, proximity tray and pickup confirmation end to
//! end, and manages the stored user session.

use chrono::Weekday;
use clap::{ArgAction, Args, Parser, Subcommand};
use ecoroute_core::config::Config;
use ecoroute_core::error::exit_codes;
use ecoroute_geo::Coordinate;
use ecoroute_telemetry::TelemetryConfig;
use ecoroute_api_client::RegisterRequest;
use ecoroute_tracker::VehicleCategory;
use owo_colors::OwoColorize;
use std::process::ExitCode;

mod commands;
mod output;

use commands::{account, distance, operators, run, schedule};

/// Headless EcoRoute map simulator
#[derive(Parser)]
#[command(name = "ecoroute-sim")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Emit JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Configuration file (searches ecoroute.toml when omitted)
    #[arg(short, long, global = true, env = "ECOROUTE_CONFIG")]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the live map until the pickup completes or the ticks run out
    Run {
        /// Home point as "lat,lng"
        #[arg(long, allow_hyphen_values = true)]
        anchor: Coordinate,

        /// Request a pickup of this category right away
        #[arg(long, conflicts_with = "operator")]
        category: Option<VehicleCategory>,

        /// Request a pickup through this operator
        #[arg(long)]
        operator: Option<u32>,

        /// Number of simulation ticks to run
        #[arg(long, default_value = "60")]
        ticks: u32,

        /// Confirm the pickup as soon as the tray is visible
        #[arg(long)]
        auto_confirm: bool,

        /// Seed for reproducible runs
        #[arg(long)]
        seed: Option<u64>,
    },

    /// List pickup operators
    Operators,

    /// Great-circle distance between two "lat,lng" points
    Distance {
        #[arg(allow_hyphen_values = true)]
        from: Coordinate,
        #[arg(allow_hyphen_values = true)]
        to: Coordinate,
    },

    /// Sign in and store the session
    Login {
        #[arg(long)]
        email: String,

        #[arg(long, env = "ECOROUTE_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account
    Register(RegisterArgs),

    /// Clear the stored session
    Logout,

    /// Show the stored session and citizen level
    Status,

    /// Show the weekly collection schedule and the next pickup
    Schedule {
        /// Only this weekday (mon, tue, ...)
        #[arg(long)]
        day: Option<Weekday>,

        /// Only this sector
        #[arg(long)]
        sector: Option<String>,
    },
}

#[derive(Args)]
struct RegisterArgs {
    #[arg(long)]
    username: String,

    #[arg(long)]
    email: String,

    #[arg(long)]
    first_name: String,

    #[arg(long)]
    last_name: String,

    #[arg(long, env = "ECOROUTE_PASSWORD", hide_env_values = true)]
    password: String,

    /// Defaults to --password
    #[arg(long)]
    confirm_password: Option<String>,

    #[arg(long)]
    phone: String,

    #[arg(long)]
    address: String,

    #[arg(long)]
    sector: String,
}

impl From<RegisterArgs> for RegisterRequest {
    fn from(args: RegisterArgs) -> Self {
        Self {
            password2: args.confirm_password.unwrap_or_else(|| args.password.clone()),
            username: args.username,
            email: args.email,
            first_name: args.first_name,
            last_name: args.last_name,
            password: args.password,
            phone: args.phone,
            address: args.address,
            sector: args.sector,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let _telemetry = match ecoroute_telemetry::init_with_config(
        TelemetryConfig::default().with_verbosity(cli.verbose),
    ) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("{} {}", "Warning:".yellow().bold(), e);
            None
        }
    };

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            if cli.json {
                match serde_json::to_string_pretty(&e.to_report()) {
                    Ok(report) => eprintln!("{report}"),
                    Err(_) => eprintln!("{e}"),
                }
            } else {
                eprintln!("{} {}", "Error:".red().bold(), e);
            }
            return ExitCode::from(e.exit_code() as u8);
        }
    };
    let schema = &config.schema;

    let result = match cli.command {
        Commands::Run {
            anchor,
            category,
            operator,
            ticks,
            auto_confirm,
            seed,
        } => {
            let options = run::RunOptions {
                anchor,
                category,
                operator,
                ticks,
                auto_confirm,
                seed,
                json: cli.json,
            };
            run::run(options, schema).await
        }
        Commands::Operators => operators::run(cli.json),
        Commands::Distance { from, to } => distance::run(from, to, cli.json),
        Commands::Login { email, password } => {
            account::login(&email, &password, schema, cli.json).await
        }
        Commands::Register(args) => {
            account::register(&RegisterRequest::from(args), schema, cli.json).await
        }
        Commands::Logout => account::logout(schema),
        Commands::Status => account::status(schema, cli.json),
        Commands::Schedule { day, sector } => schedule::run(day, sector.as_deref(), cli.json),
    };

    match result {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            ExitCode::from(exit_codes::FAILURE as u8)
        }
    }
}
