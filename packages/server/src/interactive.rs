//! Interactive mode for the server.
//!
//! Prompts for the bind address, port and data location before starting
//! the server.

use std::path::PathBuf;

use dialoguer::{Confirm, Input, Select};
use wilayah_loader::{DataLocation, LoaderConfig};

/// Runs the server in interactive mode, prompting for configuration.
///
/// Asks for a bind address and port, sets the corresponding environment
/// variables (`BIND_ADDR`, `PORT`), asks where boundary files are read
/// from, and delegates to [`super::serve`].
///
/// # Errors
///
/// Returns an `std::io::Result` error if the underlying server fails to
/// start.
#[allow(clippy::future_not_send)]
pub async fn run() -> std::io::Result<()> {
    println!("Wilayah Server");
    println!();

    let bind_addr: String = Input::new()
        .with_prompt("Bind address")
        .default("127.0.0.1".to_string())
        .interact_text()
        .unwrap_or_else(|_| "127.0.0.1".to_string());

    let port_str: String = Input::new()
        .with_prompt("Port")
        .default("8080".to_string())
        .interact_text()
        .unwrap_or_else(|_| "8080".to_string());

    // SAFETY: We are single-threaded at this point (before server starts) and
    // these variables are only read once during server initialisation.
    unsafe {
        std::env::set_var("BIND_ADDR", &bind_addr);
        std::env::set_var("PORT", &port_str);
    }

    let mut config = LoaderConfig::from_env();
    config.location = prompt_location(&config.location);

    if !Confirm::new()
        .with_prompt(format!("Start server on {bind_addr}:{port_str}?"))
        .default(true)
        .interact()
        .unwrap_or(true)
    {
        println!("Cancelled.");
        return Ok(());
    }

    super::serve(config).await
}

fn prompt_location(current: &DataLocation) -> DataLocation {
    let (default_index, default_dir, default_url) = match current {
        DataLocation::Dir(dir) => (0, dir.display().to_string(), String::new()),
        DataLocation::Url(url) => (1, "public".to_string(), url.clone()),
    };

    let choice = Select::new()
        .with_prompt("Read boundary files from")
        .items(&["Local directory", "Remote URL"])
        .default(default_index)
        .interact()
        .unwrap_or(default_index);

    if choice == 1 {
        let url: String = Input::new()
            .with_prompt("Base URL")
            .with_initial_text(default_url.clone())
            .interact_text()
            .unwrap_or(default_url);
        DataLocation::Url(url)
    } else {
        let dir: String = Input::new()
            .with_prompt("Data directory")
            .default(default_dir.clone())
            .interact_text()
            .unwrap_or(default_dir);
        DataLocation::Dir(PathBuf::from(dir))
    }
}
