#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command line for exploring and maintaining Indonesian boundary data.
//!
//! With a subcommand it runs that tool directly; without one it asks
//! which tool to run. Uses `indicatif-log-bridge` (via
//! [`wilayah_cli_utils::init_logger`]) so log lines and progress bars
//! never fight for the terminal.

mod commands;
mod explore;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use dialoguer::Select;
use wilayah_layout::{GenerateOptions, LayoutFilter};
use wilayah_loader::LoaderConfig;

#[derive(Parser)]
#[command(name = "wilayah", about = "Indonesian administrative boundary toolkit")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Drill down province → district → subdistricts interactively
    Explore,

    /// Check a local data tree for district directories with missing files
    Validate {
        /// Only this province code (e.g. 51)
        #[arg(long)]
        province: Option<String>,

        /// Only the province directory with this slug (e.g. bali)
        #[arg(long)]
        slug: Option<String>,

        /// Static root holding the `data/` directory
        #[arg(long, default_value = "public")]
        root: PathBuf,
    },

    /// Generate a province registry file from a local data tree
    Generate {
        /// Province code (e.g. 51)
        #[arg(long)]
        province: String,

        /// Province directory slug (e.g. bali)
        #[arg(long)]
        slug: String,

        /// Province display name (default: derived from the slug)
        #[arg(long)]
        name: Option<String>,

        /// District boundary file for the province
        #[arg(long)]
        districts_file: Option<String>,

        /// Static root holding the `data/` directory
        #[arg(long, default_value = "public")]
        root: PathBuf,

        /// Write the TOML here instead of standard output
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Start the API server
    Serve,

    /// List registered provinces and districts
    Registry {
        /// Only this province (code or name)
        #[arg(long)]
        province: Option<String>,
    },
}

/// Tools offered when no subcommand is given.
enum Tool {
    Explore,
    Validate,
    Generate,
    Registry,
    Server,
}

impl Tool {
    const ALL: &[Self] = &[
        Self::Explore,
        Self::Validate,
        Self::Generate,
        Self::Registry,
        Self::Server,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Explore => "Explore provinces and districts",
            Self::Validate => "Validate data tree",
            Self::Generate => "Generate province registry file",
            Self::Registry => "List registry",
            Self::Server => "Start server",
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = wilayah_cli_utils::init_logger();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("Wilayah Toolkit");
        println!();

        let labels: Vec<&str> = Tool::ALL.iter().map(Tool::label).collect();

        let idx = Select::new()
            .with_prompt("What would you like to do?")
            .items(&labels)
            .default(0)
            .interact()?;

        match Tool::ALL[idx] {
            Tool::Explore => explore::run(&multi).await?,
            Tool::Validate => commands::interactive_validate()?,
            Tool::Generate => commands::interactive_generate()?,
            Tool::Registry => commands::list_registry(None)?,
            Tool::Server => serve(true).await?,
        }
        return Ok(());
    };

    match command {
        Commands::Explore => explore::run(&multi).await?,
        Commands::Validate {
            province,
            slug,
            root,
        } => commands::validate(&root, &LayoutFilter { province, slug })?,
        Commands::Generate {
            province,
            slug,
            name,
            districts_file,
            root,
            out,
        } => {
            let options = GenerateOptions {
                province,
                slug,
                name,
                districts_file,
            };
            commands::generate(&root, &options, out.as_deref())?;
        }
        Commands::Serve => serve(false).await?,
        Commands::Registry { province } => commands::list_registry(province.as_deref())?,
    }

    Ok(())
}

/// Runs the server on its own actix system so it does not nest inside the
/// tokio runtime.
async fn serve(interactive: bool) -> Result<(), Box<dyn std::error::Error>> {
    tokio::task::spawn_blocking(move || {
        actix_web::rt::System::new().block_on(async move {
            if interactive {
                wilayah_server::interactive::run().await
            } else {
                wilayah_server::serve(LoaderConfig::from_env()).await
            }
        })
    })
    .await??;
    Ok(())
}
