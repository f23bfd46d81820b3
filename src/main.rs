//! Main application entry point for the Online Accounts panel
//!
//! Usage mirrors the control center: `credentials-panel [credentials [ARGUMENT]]`
//! where ARGUMENT is `account-details=<id>` or `application=<name>`.

use std::path::PathBuf;

use anyhow::{bail, Context};
use eframe::egui;
use log::info;

use credentials_panel::config::default_accounts_dir;
use credentials_panel::{
    CredentialsPanel, LoginServer, PanelConfig, StartupAction, PANEL_NAME, PANEL_TITLE,
};

fn print_help() {
    println!("{PANEL_TITLE} - credentials control panel");
    println!();
    println!("Usage: credentials-panel [OPTIONS] [{PANEL_NAME} [ARGUMENT]]");
    println!();
    println!("Arguments:");
    println!("  account-details=<id>        Open the details of an account");
    println!("  application=<name>          Only offer providers usable by <name>");
    println!();
    println!("Options:");
    println!("  --config <path> or -c <path>  Read configuration from <path>");
    println!("  --accounts-dir <path>         Persist accounts in <path>");
    println!("  --mock-server                 Also run the mock login server");
    println!("  --help or -h                  Show this help message");
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut config_path: Option<PathBuf> = None;
    let mut accounts_dir: Option<PathBuf> = None;
    let mut mock_server = false;
    let mut positional = Vec::new();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                i += 1;
                let path = args.get(i).context("--config requires a path")?;
                config_path = Some(PathBuf::from(path));
            }
            "--accounts-dir" => {
                i += 1;
                let path = args.get(i).context("--accounts-dir requires a path")?;
                accounts_dir = Some(PathBuf::from(path));
            }
            "--mock-server" => mock_server = true,
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            other => positional.push(other.to_string()),
        }
        i += 1;
    }

    let startup = match positional.as_slice() {
        [] => StartupAction::Default,
        [panel] if panel == PANEL_NAME => StartupAction::Default,
        [panel, argument] if panel == PANEL_NAME => StartupAction::parse(Some(argument.as_str())),
        [panel, ..] if panel != PANEL_NAME => bail!("unknown panel '{panel}'"),
        _ => bail!("too many arguments"),
    };

    let mut config = match &config_path {
        Some(path) => PanelConfig::load_from(path)?,
        None => PanelConfig::load()?,
    };
    if config_path.is_some() {
        config.apply_env_overrides()?;
    }
    config.accounts_dir = accounts_dir
        .or(config.accounts_dir)
        .or_else(|| Some(default_accounts_dir()));

    if mock_server {
        let server = LoginServer::bind(&config.server)?.run()?;
        info!("Mock login server at {}", server.base_url());
    }

    let panel = CredentialsPanel::from_config(config, startup)?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(PANEL_TITLE)
            .with_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(PANEL_TITLE, options, Box::new(move |_cc| Ok(Box::new(panel))))
        .map_err(|e| anyhow::anyhow!("failed to run {PANEL_TITLE}: {e}"))
}
