use anyhow::{Context, Result};
use edx::buffer::Buffer;
use edx::cli::{parse_args, Args};
use edx::config::{self, Config};
use edx::context::{EditContext, PatternOptions};
use edx::input::ReaderSource;
use edx::logger;
use edx::session::Session;
use std::io;
use std::path::PathBuf;

fn main() -> Result<()> {
    let args = parse_args()?;

    match args {
        Args::Edit {
            file,
            prompt,
            ignore_case,
            debug,
        } => {
            edit(file, prompt, ignore_case, debug)?;
        }
        Args::Config { show, path } => {
            show_config(show, path)?;
        }
    }

    Ok(())
}

fn edit(
    file: Option<PathBuf>,
    prompt: Option<String>,
    ignore_case: bool,
    debug: bool,
) -> Result<()> {
    let config = config::load_config()?;
    config::validate_config(&config).context("Invalid configuration")?;

    if let Some(log_path) = logger::init_debug_logging(debug || config.logging.debug)? {
        tracing::info!(log = %log_path.display(), "edx {} starting", env!("CARGO_PKG_VERSION"));
    }

    let options = PatternOptions {
        case_insensitive: ignore_case || config.regex.case_insensitive,
    };
    let ctx = EditContext::new(Buffer::new(), options);

    let stdin = io::stdin();
    let input = ReaderSource::new(stdin.lock());
    let mut session = Session::new(ctx, input, io::stdout().lock(), io::stderr().lock());

    // -p on the command line wins over the config file
    let prompt = prompt.or_else(|| config.prompt().map(str::to_string));
    if let Some(prompt) = prompt {
        session = session.with_prompt(prompt);
    }

    if let Some(path) = file {
        session.open(&path)?;
    }
    session.run()?;

    tracing::info!("session ended");
    Ok(())
}

fn show_config(show: bool, path: bool) -> Result<()> {
    let config_path = config::config_file_path()?;

    if path {
        println!("{}", config_path.display());
        return Ok(());
    }

    let config: Config = config::load_config()?;
    config::validate_config(&config)
        .with_context(|| format!("Invalid configuration in {}", config_path.display()))?;

    if !show {
        println!("Configuration file: {}\n", config_path.display());
    }
    print!("{}", config::render_config(&config)?);

    Ok(())
}
