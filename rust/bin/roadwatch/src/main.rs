//! `roadwatch` — the road condition monitoring CLI client.
//!
//! Manages contexts and drives the roadwatchd REST API: device
//! registry CRUD, reading queries, a headless route-hazard monitor
//! (`watch`) and the LoRa gateway forwarder (`forward`).

mod commands;
mod config;

use clap::{Parser, Subcommand};

/// Roadwatch CLI tool.
#[derive(Parser, Debug)]
#[command(name = "roadwatch", about = "Road condition monitoring CLI client")]
struct Cli {
    /// Path to client config file (default: ~/.roadwatch/config.toml).
    #[arg(long = "config", global = true)]
    config: Option<String>,

    /// Output format: table or json.
    #[arg(long = "output", short = 'o', global = true, default_value = "table")]
    output: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Context management (named server connections).
    #[command(name = "context")]
    Context {
        #[command(subcommand)]
        action: ContextAction,
    },

    /// Switch the current context.
    #[command(name = "use")]
    Use {
        #[command(subcommand)]
        what: UseWhat,
    },

    /// Check admin credentials against the current context's server.
    Login {
        /// Username.
        #[arg(long)]
        user: Option<String>,
        /// Password (not recommended — use interactive prompt).
        #[arg(long)]
        password: Option<String>,
    },

    /// Get resource(s): devices, readings, latest.
    Get {
        /// Resource type (devices, readings, latest).
        resource: String,
        /// Optional device ID (readings filter / latest lookup).
        id: Option<i64>,
        /// Limit results (readings only).
        #[arg(long)]
        limit: Option<u32>,
    },

    /// Register a device or submit a reading.
    Create {
        /// Resource type (device, reading).
        resource: String,
        /// JSON body.
        #[arg(long = "json")]
        json_body: Option<String>,
        /// Read JSON from file.
        #[arg(short = 'f', long = "file")]
        file: Option<String>,
    },

    /// Update a device (full replacement).
    Update {
        /// Resource type (device).
        resource: String,
        /// Device ID.
        id: i64,
        /// JSON body.
        #[arg(long = "json")]
        json_body: String,
    },

    /// Delete a device (cascades to its readings).
    Delete {
        /// Resource type (device).
        resource: String,
        /// Device ID.
        id: i64,
        /// Skip confirmation.
        #[arg(long = "yes", short = 'y')]
        yes: bool,
    },

    /// Poll the latest readings and watch a route for hazards.
    Watch {
        /// Device ids on the route, comma-separated (e.g. 1,4,16).
        #[arg(long = "devices", required = true)]
        devices: String,
        /// Poll interval in seconds.
        #[arg(long, default_value_t = 60)]
        interval: u64,
        /// Minimum seconds between two reroute prompts.
        #[arg(long, default_value_t = 600)]
        cooldown: u64,
        /// Evaluate once and exit.
        #[arg(long)]
        once: bool,
    },

    /// Forward LoRa +RCV frames from stdin to the server.
    Forward {
        /// Device id to stamp on forwarded readings.
        #[arg(long, required = true)]
        device: i64,
    },

    /// Check server status.
    Status,

    /// Show version.
    Version,
}

#[derive(Subcommand, Debug)]
enum ContextAction {
    /// Create a new context.
    Create {
        /// Context name.
        name: String,
        /// Server URL (e.g. http://localhost:5157).
        #[arg(long)]
        server: Option<String>,
    },
    /// List all contexts.
    List,
    /// Set properties on a context.
    Set {
        name: String,
        #[arg(long)]
        server: Option<String>,
    },
    /// Delete a context.
    Delete { name: String },
}

#[derive(Subcommand, Debug)]
enum UseWhat {
    /// Switch to a context.
    Context { name: String },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .map(std::path::PathBuf::from)
        .unwrap_or_else(config::ClientConfig::default_path);

    match cli.command {
        Commands::Context { action } => match action {
            ContextAction::Create { name, server } => {
                commands::context::create(&name, server.as_deref(), &config_path)?;
            }
            ContextAction::List => {
                commands::context::list(&config_path)?;
            }
            ContextAction::Set { name, server } => {
                commands::context::set(&name, server.as_deref(), &config_path)?;
            }
            ContextAction::Delete { name } => {
                commands::context::delete(&name, &config_path)?;
            }
        },

        Commands::Use { what } => match what {
            UseWhat::Context { name } => {
                commands::context::use_context(&name, &config_path)?;
            }
        },

        Commands::Login { user, password } => {
            let username = user.unwrap_or_else(|| {
                eprint!("Username: ");
                let mut s = String::new();
                std::io::stdin().read_line(&mut s).unwrap();
                s.trim().to_string()
            });
            let password = password.unwrap_or_else(|| {
                rpassword::prompt_password("Password: ").unwrap_or_default()
            });
            commands::login::login(&username, &password, &config_path)?;
        }

        Commands::Get {
            resource,
            id,
            limit,
        } => {
            let json_output = cli.output == "json";
            commands::resource::get(&resource, id, limit, json_output, &config_path)?;
        }

        Commands::Create {
            resource,
            json_body,
            file,
        } => {
            let body = if let Some(path) = file {
                std::fs::read_to_string(&path)?
            } else if let Some(json) = json_body {
                json
            } else {
                anyhow::bail!("Provide --json or -f <file>.");
            };
            commands::resource::create(&resource, &body, &config_path)?;
        }

        Commands::Update {
            resource,
            id,
            json_body,
        } => {
            commands::resource::update(&resource, id, &json_body, &config_path)?;
        }

        Commands::Delete { resource, id, yes } => {
            if !yes {
                eprint!("Are you sure? [y/N]: ");
                let mut s = String::new();
                std::io::stdin().read_line(&mut s).unwrap();
                if !s.trim().eq_ignore_ascii_case("y") {
                    println!("Cancelled.");
                    return Ok(());
                }
            }
            commands::resource::delete(&resource, id, &config_path)?;
        }

        Commands::Watch {
            devices,
            interval,
            cooldown,
            once,
        } => {
            let device_ids = commands::watch::parse_device_list(&devices)?;
            commands::watch::watch(
                &device_ids,
                std::time::Duration::from_secs(interval),
                std::time::Duration::from_secs(cooldown),
                once,
                &config_path,
            )?;
        }

        Commands::Forward { device } => {
            commands::forward::forward(device, &config_path)?;
        }

        Commands::Status => {
            commands::resource::status(&config_path)?;
        }

        Commands::Version => {
            println!("roadwatch cli v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
