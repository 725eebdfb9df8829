mod ai;
mod app;
mod config;
mod editor;
mod event;
mod export;
mod html;
mod logging;
mod settings;
mod store;
mod theme;
mod ui;

use std::env;
use std::io;
use std::time::Instant;

use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use app::App;
use config::Config;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn print_help() {
    println!("focusx {}", VERSION);
    println!("A focused terminal notebook with folders, rich-text notes and AI-assisted rewriting");
    println!();
    println!("USAGE:");
    println!("    focusx [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help         Print help information");
    println!("    -v, --version      Print version information");
    println!("    -c, --config       Print config file path");
    println!("    -e, --export-dir   Print export directory path");
    println!();
    println!("ENVIRONMENT:");
    println!("    API_KEY, GEMINI_API_KEY   Key for AI assist (or [ai] api_key in config)");
    println!("    FOCUSX_LOG                Log filter, e.g. debug (log file next to config)");
}

fn main() -> io::Result<()> {
    // Handle CLI arguments
    let args: Vec<String> = env::args().collect();
    if args.len() > 1 {
        match args[1].as_str() {
            "-v" | "--version" => {
                println!("focusx {}", VERSION);
                return Ok(());
            }
            "-h" | "--help" => {
                print_help();
                return Ok(());
            }
            "-c" | "--config" => {
                println!("{}", Config::config_path().display());
                return Ok(());
            }
            "-e" | "--export-dir" => {
                let config = Config::load();
                println!("{}", config.export_path().display());
                return Ok(());
            }
            _ => {
                eprintln!("Unknown option: {}", args[1]);
                eprintln!("Run 'focusx --help' for usage information");
                return Ok(());
            }
        }
    }

    logging::init(&Config::log_path());
    let config = Config::load_or_create();
    log::info!("focusx {} starting, theme {}", VERSION, config.theme);
    let mut app = App::new(config, Some(Config::config_path()));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let result = event::run_app(&mut terminal, &mut app);
    if result.is_err() {
        app.shutdown(Instant::now());
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        log::error!("event loop failed: {}", err);
        eprintln!("Error: {err:?}");
    }

    Ok(())
}
