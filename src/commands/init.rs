use std::io::{self, Write};

use crate::config::{Config, DEFAULT_BASE_URL, DEFAULT_PAGE_SIZE};
use crate::error::{CourtsideError, Result};

pub async fn run() -> Result<()> {
    let config_path = Config::config_path()?;

    if config_path.exists() {
        print!(
            "Config file already exists at {}. Overwrite? [y/N] ",
            config_path.display()
        );
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return Ok(());
        }
    }

    println!("Courtside Configuration");
    println!("=======================\n");

    print!("API base URL [{DEFAULT_BASE_URL}]: ");
    io::stdout().flush()?;

    let mut base_url = String::new();
    io::stdin().read_line(&mut base_url)?;
    let base_url = base_url.trim();

    print!("Default page size [{DEFAULT_PAGE_SIZE}]: ");
    io::stdout().flush()?;

    let mut page_size = String::new();
    io::stdin().read_line(&mut page_size)?;
    let page_size = page_size.trim();

    print!("Reset to the first page when the page size changes? [y/N] ");
    io::stdout().flush()?;

    let mut reset = String::new();
    io::stdin().read_line(&mut reset)?;
    let reset = reset.trim().eq_ignore_ascii_case("y");

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| CourtsideError::ConfigRead {
            path: config_path.clone(),
            source: e,
        })?;
    }

    let mut config_content = String::new();
    if !base_url.is_empty() {
        config_content.push_str(&format!("base_url = \"{base_url}\"\n"));
    }
    if let Ok(size) = page_size.parse::<u32>() {
        if size > 0 {
            config_content.push_str(&format!("page_size = {size}\n"));
        }
    }
    if reset {
        config_content.push_str("reset_page_on_resize = true\n");
    }

    std::fs::write(&config_path, config_content).map_err(|e| CourtsideError::ConfigRead {
        path: config_path.clone(),
        source: e,
    })?;

    println!("\nConfig saved to {}", config_path.display());
    println!("You can now run 'courtside teams' or 'courtside browse'!");

    Ok(())
}
