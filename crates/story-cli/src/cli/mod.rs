//! CLI entry and dispatch.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use story_core::config;

mod commands;

#[derive(Parser)]
#[command(name = "story")]
#[command(version)]
#[command(about = "Share and browse photo stories from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Log in and remember the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "STORY_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the current session
    Logout,
    /// Create an account (does not log in)
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "STORY_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Show the logged-in user
    Whoami,
    /// Browse and publish stories
    Stories {
        #[command(subcommand)]
        command: StoryCommands,
    },
    /// Show or change the interface language
    Locale {
        #[command(subcommand)]
        command: LocaleCommands,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum StoryCommands {
    /// List a page of the feed
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 10)]
        size: u32,
        /// Only stories that carry a location
        #[arg(long)]
        location: bool,
        /// Print raw JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
    /// Show a single story
    Show {
        #[arg(value_name = "STORY_ID")]
        id: String,
    },
    /// Publish a story with a photo (max 1MB)
    Add {
        #[arg(short, long)]
        description: String,
        #[arg(short, long, value_name = "PATH")]
        photo: PathBuf,
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,
        /// Post without an account
        #[arg(long)]
        guest: bool,
    },
}

#[derive(clap::Subcommand)]
enum LocaleCommands {
    /// Print the active locale
    Get,
    /// Switch locale (id, en)
    Set {
        #[arg(value_name = "TAG")]
        tag: String,
    },
    /// Print a message from the active catalog
    Message {
        #[arg(value_name = "KEY")]
        key: String,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
    /// Persist the API base URL
    SetBaseUrl {
        #[arg(value_name = "URL")]
        url: String,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;
    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    // Config commands must work even when the config file is broken.
    if let Commands::Config { command } = &cli.command {
        return match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
            ConfigCommands::SetBaseUrl { url } => commands::config::set_base_url(url),
        };
    }

    let config = config::Config::load().context("load config")?;
    let app = commands::open_app(&config)?;

    match cli.command {
        Commands::Login { email, password } => commands::auth::login(&app, &email, &password).await,
        Commands::Logout => commands::auth::logout(&app).await,
        Commands::Register {
            name,
            email,
            password,
        } => commands::auth::register(&app, &name, &email, &password).await,
        Commands::Whoami => commands::auth::whoami(&app),

        Commands::Stories { command } => match command {
            StoryCommands::List {
                page,
                size,
                location,
                json,
            } => commands::stories::list(&app, page, size, location, json).await,
            StoryCommands::Show { id } => commands::stories::show(&app, &id).await,
            StoryCommands::Add {
                description,
                photo,
                lat,
                lon,
                guest,
            } => {
                let location = lat.zip(lon);
                commands::stories::add(&app, &description, &photo, location, guest).await
            }
        },

        Commands::Locale { command } => match command {
            LocaleCommands::Get => {
                commands::locale::get(&app);
                Ok(())
            }
            LocaleCommands::Set { tag } => commands::locale::set(&app, &tag),
            LocaleCommands::Message { key } => {
                commands::locale::message(&app, &key);
                Ok(())
            }
        },

        // Handled before the config is loaded.
        Commands::Config { .. } => Ok(()),
    }
}
