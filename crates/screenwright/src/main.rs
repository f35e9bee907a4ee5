use anyhow::Result;
use crossterm::{
    event::{self, DisableBracketedPaste, EnableBracketedPaste, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::LevelFilter;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use screencore::Classifier;
use screenwright::{file_manager::FileManager, ui, App, Config};
use std::{env, io, path::PathBuf, time::Duration};

const USAGE: &str = "usage: screenwright [FILE] [--structured] [--dump]";

#[derive(Debug, Default)]
struct Args {
    file: Option<PathBuf>,
    structured: bool,
    dump: bool,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Args> {
    let mut parsed = Args::default();
    for arg in args {
        match arg.as_str() {
            "--structured" => parsed.structured = true,
            "--dump" => parsed.dump = true,
            "-h" | "--help" => anyhow::bail!(USAGE),
            flag if flag.starts_with("--") => {
                anyhow::bail!("unknown option {}\n{}", flag, USAGE)
            }
            _ if parsed.file.is_some() => anyhow::bail!("only one FILE may be given\n{}", USAGE),
            path => parsed.file = Some(PathBuf::from(path)),
        }
    }
    Ok(parsed)
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut logger = env_logger::Builder::from_default_env();
    if std::env::var_os("RUST_LOG").is_none() {
        logger.filter_level(LevelFilter::Info);
        logger.filter_module("screenwright", LevelFilter::Debug);
    }
    logger.init();

    let args = parse_args(env::args().skip(1))?;
    let config = Config::load().await?;

    if args.dump {
        return dump(&args, &config).await;
    }

    let mut app = App::new(config);
    if let Some(path) = args.file.clone() {
        if let Err(e) = app.open(path.clone()).await {
            log::error!("Failed to load file '{}': {}", path.display(), e);
            app.status.error(format!("Could not open {}: {}", path.display(), e));
        }
    } else {
        log::info!("No file specified, starting with empty buffer");
    }
    if args.structured || app.config.editor.start_structured {
        app.enter_structured();
    }

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        original_hook(panic_info);
    }));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    if let Err(e) = execute!(stdout, EnterAlternateScreen, EnableBracketedPaste) {
        let _ = disable_raw_mode();
        return Err(e.into());
    }
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let res = run_app(&mut terminal, &mut app).await;
    restore_terminal()?;

    if let Err(err) = res {
        log::error!("Application error: {}", err);
        eprintln!("screenwright: {}", err);
    }
    Ok(())
}

/// Prints the parsed document as JSON instead of starting the editor.
async fn dump(args: &Args, config: &Config) -> Result<()> {
    let Some(path) = args.file.clone() else {
        anyhow::bail!("--dump needs a FILE\n{}", USAGE);
    };
    let markup = FileManager::new().open_file(path).await?;
    let classifier = Classifier::new(config.session_options().classifier);
    println!("{}", classifier.parse(&markup).to_json()?);
    Ok(())
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        if let Err(e) = terminal.draw(|f| ui::draw(f, app)) {
            log::error!("Terminal draw error: {}", e);
        }

        app.update_status();
        if app.should_quit() {
            log::info!("Application shutdown requested");
            break;
        }

        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) => {
                    if let Err(e) = app.handle_key_event(key).await {
                        log::error!("Key event handling error: {}", e);
                        app.status.error(format!("Key handling failed: {}", e));
                    }
                }
                Event::Paste(text) => app.handle_paste(&text),
                _ => {}
            }
        }
    }
    Ok(())
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen, DisableBracketedPaste)?;
    let _ = execute!(stdout, crossterm::cursor::Show);
    Ok(())
}
