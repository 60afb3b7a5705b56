use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "

License: MIT
Rust Edition: 2024"
);

#[derive(Parser)]
#[command(name = "edx")]
#[command(about = "Line-oriented text editor in the style of ed")]
#[command(long_about = "edx is a line editor modeled on classic ed.

Commands are read one per line from standard input. Each command is an
optional address or range followed by an operation letter. Output goes to
stdout; errors are reported on stderr as a single line starting with '?'.

ADDRESSES:
  N         Line N (1-based)            .      Current line
  $         Last line                   +N -N  Relative to the current line
  /re/      Next line matching re       ?re?   Previous line matching re
  A,B       Lines A through B           ,      Whole buffer (1,$)

OPERATIONS:
  p  n      Print, print with line numbers
  d         Delete
  a  i  c   Append, insert, change (text ends with a line holding only '.')
  s/re/rep/[g][p][1-9]   Substitute ('%' as rep reuses the last one)
  mA        Move lines after address A (m0 moves to the top)
  g/re/cmd  Run p, n, d or s on every matching line (v/re/cmd: non-matching)
  r [file]  Read a file into the buffer
  w [file]  Write the buffer
  q  Q      Quit (q refuses while there are unsaved changes)

EXAMPLES:
  edx notes.txt                     Edit notes.txt
  edx -p '*' notes.txt              Show a '*' prompt before each command
  printf ',s/foo/bar/g\\nw\\nq\\n' | edx file.txt
  edx config --show                 Show the effective configuration")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_version = LONG_VERSION)]
#[command(propagate_version = true)]
struct Cli {
    /// File to read into the buffer at startup
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Prompt string
    #[arg(short = 'p', long, value_name = "STRING")]
    #[arg(help = "Print STRING before reading each command\nOverrides [session] prompt in the config file")]
    prompt: Option<String>,

    /// Case-insensitive patterns
    #[arg(short = 'i', long = "ignore-case")]
    #[arg(help = "Compile every search and substitution pattern case-insensitively")]
    ignore_case: bool,

    /// Debug logging
    #[arg(long)]
    #[arg(help = "Write a debug log to ~/.edx/edx.log\nThe EDX_LOG variable sets a custom filter")]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show configuration
    #[command(long_about = "Show the edx configuration.

The configuration lives in ~/.edx/config.toml and is created with
commented defaults on first use.

CONFIGURATION OPTIONS:
  [session]
    prompt = \"*\"               # Prompt text
    show_prompt = false         # Print the prompt before each command

  [regex]
    case_insensitive = false    # Compile patterns case-insensitively

  [logging]
    debug = false               # Write a debug log to ~/.edx/edx.log

EXAMPLES:
  edx config --show             Print the effective configuration
  edx config --path             Print the configuration file location")]
    Config {
        /// Print the effective configuration
        #[arg(long = "show", conflicts_with = "path")]
        show: bool,

        /// Print the configuration file location
        #[arg(long = "path")]
        path: bool,
    },
}

pub fn parse_args() -> Result<Args> {
    let cli = Cli::parse();
    Ok(args_from(cli))
}

fn args_from(cli: Cli) -> Args {
    match cli.command {
        Some(Commands::Config { show, path }) => Args::Config { show, path },
        None => Args::Edit {
            file: cli.file,
            prompt: cli.prompt,
            ignore_case: cli.ignore_case,
            debug: cli.debug,
        },
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Args {
    Edit {
        file: Option<PathBuf>,
        prompt: Option<String>,
        ignore_case: bool,
        debug: bool,
    },
    Config {
        show: bool,
        path: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(argv: &[&str]) -> Args {
        args_from(Cli::try_parse_from(argv).unwrap())
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_arguments() {
        assert_eq!(
            parse(&["edx"]),
            Args::Edit {
                file: None,
                prompt: None,
                ignore_case: false,
                debug: false,
            }
        );
    }

    #[test]
    fn test_file_and_flags() {
        assert_eq!(
            parse(&["edx", "-p", "> ", "-i", "--debug", "notes.txt"]),
            Args::Edit {
                file: Some(PathBuf::from("notes.txt")),
                prompt: Some("> ".to_string()),
                ignore_case: true,
                debug: true,
            }
        );
    }

    #[test]
    fn test_config_subcommand() {
        assert_eq!(
            parse(&["edx", "config", "--show"]),
            Args::Config {
                show: true,
                path: false
            }
        );
        assert!(Cli::try_parse_from(["edx", "config", "--show", "--path"]).is_err());
    }
}
