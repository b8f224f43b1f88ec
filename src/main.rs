// std imports
use std::collections::VecDeque;
use std::io::{Read, Write, stdin, stdout};
use std::process::exit;
// library imports
use indoc::indoc;
use thiserror::Error;
use tracing_subscriber::EnvFilter;
// our imports
use string_stream::prelude::*;

const USAGE: &str = indoc! {r"
    USAGE:
        string-stream [--charset <label>] [--unmappable <policy>] <text>
        string-stream [--charset <label>] [--unmappable <policy>] -

    Writes <text>, or the contents of stdin when given `-`, to stdout encoded in
    the charset named by <label> (e.g. utf-8, shift_jis, utf-16le). Without
    `--charset` the charset of the current locale is used.

    <policy> decides what happens to characters the charset cannot represent:
        replace   write `?` (default)
        ncr       write an HTML numeric character reference such as `&#26085;`
        report    stop with an error
"};

#[derive(Debug, Error)]
enum Error {
    #[error("{0}")]
    Stream(#[from] string_stream::prelude::Error),
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq)]
struct MainConfig {
    command: Command,
    charset: Option<String>,
    unmappable: Unmappable,
    help_flag: bool,
}

#[derive(Debug, Clone, PartialEq)]
enum Command {
    Stdin,
    Text(String),
    Error(Vec<String>),
}

fn parse_unmappable(policy: &str) -> Option<Unmappable> {
    match policy {
        "replace" => Some(Unmappable::Replace),
        "ncr" => Some(Unmappable::NumericCharRef),
        "report" => Some(Unmappable::Report),
        _ => None,
    }
}

impl MainConfig {
    pub fn new(mut args: VecDeque<String>) -> Self {
        // The executable name.
        args.pop_front();
        let mut help_flag = false;
        let mut charset = None;
        let mut unmappable = Unmappable::default();
        let mut rest = Vec::new();
        let mut alien = Vec::new();
        while let Some(arg) = args.pop_front() {
            match arg.as_str() {
                "--help" | "-h" => help_flag = true,
                "--charset" => match args.pop_front() {
                    Some(label) => charset = Some(label),
                    None => alien.push(arg),
                },
                "--unmappable" => match args.pop_front() {
                    Some(policy) => match parse_unmappable(&policy) {
                        Some(policy) => unmappable = policy,
                        None => alien.extend([arg, policy]),
                    },
                    None => alien.push(arg),
                },
                _ => rest.push(arg),
            }
        }
        let command = match (&rest[..], alien.is_empty()) {
            ([dash], true) if dash == "-" => Command::Stdin,
            ([text], true) => Command::Text(text.clone()),
            _ => {
                alien.extend(rest);
                Command::Error(alien)
            }
        };
        Self {
            command,
            charset,
            unmappable,
            help_flag,
        }
    }
}

fn run_text(text: &str, config: &MainConfig) -> Result<()> {
    let mut builder = StringInputStream::builder()
        .string(text)
        .unmappable(config.unmappable);
    if let Some(label) = &config.charset {
        builder = builder.charset_label(label.as_str());
    }
    let mut stream = builder.build()?;
    let mut out = stdout().lock();
    std::io::copy(&mut stream, &mut out)?;
    out.flush()?;
    Ok(())
}

fn handle_error<T, E: std::fmt::Display>(res: Result<T, E>) -> T {
    match res {
        Ok(value) => value,
        Err(err) => {
            eprintln!("Error: {err}");
            exit(1);
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();
    let config = MainConfig::new(std::env::args().collect());

    if config.help_flag {
        println!("{USAGE}");
        exit(0);
    }

    match &config.command {
        Command::Stdin => {
            let mut text = String::new();
            handle_error(stdin().read_to_string(&mut text));
            handle_error(run_text(&text, &config));
        }
        Command::Text(text) => {
            handle_error(run_text(text, &config));
        }
        Command::Error(items) => {
            let items = items.join("\n");
            eprintln!("Error: could not understand the command");
            eprintln!("Alien arguments: {items}");
            eprintln!("{USAGE}");
            exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(args: &[&str]) -> MainConfig {
        MainConfig::new(
            std::iter::once("string-stream")
                .chain(args.iter().copied())
                .map(String::from)
                .collect(),
        )
    }

    #[test]
    fn text_with_defaults() {
        let config = config(&["hello"]);
        assert_eq!(config.command, Command::Text("hello".into()));
        assert_eq!(config.charset, None);
        assert_eq!(config.unmappable, Unmappable::Replace);
        assert!(!config.help_flag);
    }

    #[test]
    fn stdin_with_options() {
        let config = config(&["--charset", "sjis", "--unmappable", "ncr", "-"]);
        assert_eq!(config.command, Command::Stdin);
        assert_eq!(config.charset.as_deref(), Some("sjis"));
        assert_eq!(config.unmappable, Unmappable::NumericCharRef);
    }

    #[test]
    fn help() {
        assert!(config(&["-h"]).help_flag);
        assert!(config(&["x", "--help"]).help_flag);
    }

    #[test]
    fn bad_arguments() {
        assert_eq!(
            config(&["--unmappable", "ignore", "x"]).command,
            Command::Error(vec!["--unmappable".into(), "ignore".into(), "x".into()])
        );
        assert_eq!(
            config(&["a", "b"]).command,
            Command::Error(vec!["a".into(), "b".into()])
        );
        assert_eq!(config(&[]).command, Command::Error(vec![]));
    }
}
