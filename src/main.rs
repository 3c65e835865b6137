#![deny(dead_code)] // DO NOT REMOVE THIS EVER
use anyhow::Result;
use log::{info, warn, debug, LevelFilter};
use std::io;
use clap::Parser;
use std::path::{Path, PathBuf};

mod ui;
mod utils;

use crate::ui::{ChatUI, UiEvent};
use parley::settings::{default_settings_path, Settings};
use parley::state::{AppState, Effect, Paths};

/// Command line arguments for Parley
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Parley: a terminal messenger front-end with built-in sample chats.",
    long_about = "Parley is a terminal messenger front-end. It signs in locally, shows a set of\n\
    built-in sample chats and contacts, and lets you search them and pick members for a group.\n\n\
    Nothing is sent over the network and nothing is encrypted.\n\
    Use -h or --help to see all options."
)]
struct Args {
    /// Settings file (defaults to parley/settings.json in the user config directory)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// File that receives the log
    #[arg(long, value_name = "PATH", default_value = "parley.log")]
    log_file: PathBuf,

    /// Log level: off, error, warn, info, debug or trace
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    log_level: LevelFilter,

    /// Email to pre-fill on the sign-in screen
    #[arg(long, env = "PARLEY_EMAIL")]
    email: Option<String>,
}

fn main() -> Result<()> {
    // Parse command line arguments FIRST
    let args = Args::parse();

    utils::setup_logging(&args.log_file, args.log_level)?;
    info!("Parley starting up");
    info!("System information: {} {}", std::env::consts::OS, std::env::consts::ARCH);
    info!("Logging to file: {}", args.log_file.display());

    let settings_path = match args.config {
        Some(path) => Some(path),
        None => match default_settings_path() {
            Ok(path) => Some(path),
            Err(e) => {
                warn!("Settings will not be saved: {}", e);
                None
            }
        },
    };

    let settings = match &settings_path {
        Some(path) => Settings::load(path).unwrap_or_else(|e| {
            warn!("Failed to load settings from {}: {}", path.display(), e);
            Settings::default()
        }),
        None => Settings::default(),
    };

    // The state falls back to the remembered email when none is given here.
    let email = args.email;
    let paths = Paths {
        settings: settings_path.clone(),
        log: Some(args.log_file.clone()),
    };
    let mut chat_ui = ChatUI::new(AppState::new(settings, email.as_deref(), paths));

    // Setup terminal UI
    let mut terminal = ui::setup_terminal()?;

    // Main event loop. The terminal is restored even if the loop fails.
    let result = run_main_loop(&mut chat_ui, &mut terminal, settings_path.as_deref());

    // Restore terminal
    ui::restore_terminal(terminal)?;

    result?;
    info!("Parley shutting down");
    println!("Chat session ended.");
    Ok(())
}

fn run_main_loop(
    chat_ui: &mut ChatUI,
    terminal: &mut ui::Terminal<ui::CrosstermBackend<io::Stdout>>,
    settings_path: Option<&Path>,
) -> Result<()> {
    loop {
        // Draw the UI
        terminal.draw(|f| chat_ui.draw(f))?;

        // Handle user input
        match chat_ui.handle_input()? {
            UiEvent::Quit => {
                info!("Quit requested");
                break;
            }
            UiEvent::Effect(effect) => handle_effect(chat_ui, effect, settings_path),
            UiEvent::Continue => {}
        }
    }

    Ok(())
}

fn handle_effect(chat_ui: &mut ChatUI, effect: Effect, settings_path: Option<&Path>) {
    match effect {
        Effect::SignedIn { email, settings_changed } => {
            info!("Session started for {}", email);
            if settings_changed {
                save_settings(chat_ui, settings_path);
            }
        }
        Effect::Registered { email } => {
            info!("Account created for {}", email);
        }
        Effect::SignedOut => {
            info!("Session ended, back to sign-in");
        }
        Effect::MembersAdded { group, ids } => {
            let names: Vec<String> = ids
                .iter()
                .filter_map(|&id| parley::directory::contact(id))
                .map(|c| c.name.clone())
                .collect();
            let group = group.unwrap_or_else(|| "the group".to_string());
            info!("Adding {:?} to {}", ids, group);
            chat_ui.set_notice(format!("Added {} to {}", names.join(", "), group));
        }
        Effect::MessageQueued { chat_id } => {
            debug!("Message queued in chat {}", chat_id);
        }
        Effect::None => {}
    }
}

fn save_settings(chat_ui: &mut ChatUI, settings_path: Option<&Path>) {
    let Some(path) = settings_path else {
        warn!("No settings file, the remembered email is kept for this session only");
        return;
    };

    match chat_ui.state().settings.save(path) {
        Ok(()) => info!("Saved settings to {}", path.display()),
        Err(e) => {
            warn!("Failed to save settings to {}: {}", path.display(), e);
            chat_ui.set_notice(format!("Could not save settings: {}", e));
        }
    }
}
