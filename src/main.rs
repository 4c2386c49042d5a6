//! praecordi - terminal editor with live token substitution and language markup

mod display;
mod editor;
mod input;
mod logging;
mod style;
mod terminal;

use std::env;
use std::path::PathBuf;
use std::process;

use praecordi::buffer::Buffer;
use praecordi::render::render_document;
use praecordi::{FileStore, Plugin, PraecordiError, Result, SettingsStore};

use editor::{EditorState, Session};
use terminal::Terminal;

/// What the command line asked for
#[derive(Debug, PartialEq, Eq)]
enum Mode {
    Help,
    Version,
    Render(PathBuf),
    Edit(Option<PathBuf>),
}

#[derive(Debug, PartialEq, Eq)]
struct Args {
    config: Option<PathBuf>,
    mode: Mode,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Args> {
    let mut config = None;
    let mut render = None;
    let mut file = None;
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--help" | "-h" => {
                return Ok(Args { config, mode: Mode::Help });
            }
            "--version" | "-V" => {
                return Ok(Args { config, mode: Mode::Version });
            }
            "--config" | "-c" => {
                let path = args.next().ok_or_else(|| missing_value(&arg))?;
                config = Some(PathBuf::from(path));
            }
            "--render" | "-r" => {
                let path = args.next().ok_or_else(|| missing_value(&arg))?;
                render = Some(PathBuf::from(path));
            }
            other if other.starts_with('-') => {
                return Err(PraecordiError::Message(format!("unknown option: {}", other)));
            }
            _ if file.is_none() => file = Some(PathBuf::from(&arg)),
            _ => {
                return Err(PraecordiError::Message(format!("unexpected argument: {}", arg)));
            }
        }
    }

    let mode = match render {
        Some(path) => Mode::Render(path),
        None => Mode::Edit(file),
    };
    Ok(Args { config, mode })
}

fn missing_value(option: &str) -> PraecordiError {
    PraecordiError::Message(format!("{} requires a path", option))
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = parse_args(env::args().skip(1))?;

    match args.mode {
        Mode::Help => {
            print_usage();
            return Ok(());
        }
        Mode::Version => {
            println!("praecordi {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        _ => {}
    }

    logging::init(&env::temp_dir())?;
    let plugin = Plugin::load(settings_store(args.config)?)?;

    match args.mode {
        Mode::Render(path) => {
            let document = std::fs::read_to_string(&path)?;
            let html = render_document(&document, &plugin.settings().default_language);
            println!("{}", html);
        }
        Mode::Edit(file) => {
            let buffer = match file {
                Some(path) => open_buffer(path),
                None => Buffer::default(),
            };
            let terminal = Terminal::new()?;
            let mut editor = EditorState::new(terminal, Session::new(buffer, plugin));
            editor.run()?;
            tracing::info!("praecordi exiting");
        }
        Mode::Help | Mode::Version => {}
    }

    Ok(())
}

fn settings_store(config: Option<PathBuf>) -> Result<Box<dyn SettingsStore>> {
    let store = match config {
        Some(path) => FileStore::new(path),
        None => FileStore::default_location().ok_or_else(|| {
            PraecordiError::Message("cannot locate home directory; use --config PATH".to_string())
        })?,
    };
    tracing::debug!(path = %store.path().display(), "settings file");
    Ok(Box::new(store))
}

/// Open a file, or start an empty buffer that will be saved to it
fn open_buffer(path: PathBuf) -> Buffer {
    match Buffer::from_file(&path) {
        Ok(buffer) => buffer,
        Err(e) => {
            tracing::info!(path = %path.display(), error = %e, "starting new file");
            let name = path
                .file_name()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "unnamed".to_string());
            let mut buffer = Buffer::new(name);
            buffer.set_filename(path);
            buffer
        }
    }
}

fn print_usage() {
    println!("praecordi {} - token substitution and language markup editor", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Usage: praecordi [OPTIONS] [FILE]");
    println!("       praecordi --render FILE");
    println!();
    println!("Options:");
    println!("  -c, --config PATH  Settings file (default ~/.praecordi.toml)");
    println!("  -r, --render FILE  Print FILE as HTML with language spans");
    println!("  -h, --help         Show this help message");
    println!("  -V, --version      Show version information");
    println!();
    println!("Key bindings:");
    println!("  C-t            Toggle token replacement");
    println!("  C-d            Switch decoration style (replace/mark)");
    println!("  C-s            Save");
    println!("  C-l            Redraw screen");
    println!("  C-q            Quit");
    println!();
    println!("Type :th; to get θ. Write {{{{fr:bonjour}}}} or {{{{ni hao}}}} for language spans.");
    println!("Log file: {} (filter with {})", logging::log_path().display(), logging::LOG_ENV);
}
