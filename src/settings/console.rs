//! Console front end, a stdin REPL over the settings operations.

use std::io::BufRead;
use std::sync::Arc;

use secrecy::SecretString;
use tokio::sync::mpsc::{self, UnboundedReceiver};

use super::presenter::SettingsPresenter;
use super::view::{labels, short_id};

/// A parsed console command. Profile references are full ids or unique
/// prefixes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Add,
    Server { target: String, url: String },
    Token { target: String, token: String },
    Test { target: String },
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        // Values may be empty: clearing a field is allowed.
        let target_and_value = |usage: &str| -> Result<(String, String), String> {
            let (target, value) = match rest.split_once(char::is_whitespace) {
                Some((target, value)) => (target, value.trim()),
                None => (rest, ""),
            };
            if target.is_empty() {
                return Err(format!("usage: {usage}"));
            }
            Ok((target.to_string(), value.to_string()))
        };

        match verb.to_ascii_lowercase().as_str() {
            "list" | "ls" => Ok(Self::List),
            "add" => Ok(Self::Add),
            "server" | "url" => {
                let (target, url) = target_and_value("server <id> <url>")?;
                Ok(Self::Server { target, url })
            }
            "token" | "pat" => {
                let (target, token) = target_and_value("token <id> <token>")?;
                Ok(Self::Token { target, token })
            }
            "test" => {
                if rest.is_empty() {
                    return Err("usage: test <id>".to_string());
                }
                Ok(Self::Test {
                    target: rest.to_string(),
                })
            }
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" | "/quit" => Ok(Self::Quit),
            "" => Err("empty command".to_string()),
            other => Err(format!("unknown command '{other}', try 'help'")),
        }
    }
}

/// Run one command and return the text to show.
pub async fn execute(presenter: &SettingsPresenter, command: Command) -> String {
    match command {
        Command::List => render_list(presenter).await,
        Command::Add => match presenter.add_profile().await {
            Ok(id) => format!("Added {} ({})", short_id(id), id),
            Err(e) => format!("Error: {e}"),
        },
        Command::Server { target, url } => match presenter.resolve(&target).await {
            Ok(id) => match presenter.set_endpoint(id, url).await {
                Ok(()) => format!("{} updated for {}", labels::SERVER_NAME, short_id(id)),
                Err(e) => format!("Error: {e}"),
            },
            Err(e) => format!("Error: {e}"),
        },
        Command::Token { target, token } => match presenter.resolve(&target).await {
            Ok(id) => match presenter.set_credential(id, SecretString::from(token)).await {
                Ok(()) => format!("{} updated for {}", labels::TOKEN_NAME, short_id(id)),
                Err(e) => format!("Error: {e}"),
            },
            Err(e) => format!("Error: {e}"),
        },
        Command::Test { target } => match presenter.resolve(&target).await {
            Ok(id) => match presenter.test_connection(id).await {
                Ok(report) => format!("{}: {}", report.endpoint, report.outcome),
                Err(e) => format!("Error: {e}"),
            },
            Err(e) => format!("Error: {e}"),
        },
        Command::Help => help_text(),
        Command::Quit => "Bye.".to_string(),
    }
}

async fn render_list(presenter: &SettingsPresenter) -> String {
    let rows = presenter.rows().await;
    if rows.is_empty() {
        return format!("No servers yet. Use 'add' ({}).", labels::ADD_BUTTON);
    }

    let mut out = vec![labels::HEADING.to_string()];
    for row in rows {
        let token = if row.credential_set {
            row.credential_hint.as_str()
        } else {
            "(no token)"
        };
        let mut line = format!("  {}  {}  {}", short_id(row.id), row.endpoint, token);
        if let Some(report) = row.last_probe {
            line.push_str(&format!("  [{}]", report.outcome));
        }
        out.push(line);
    }
    out.join("\n")
}

fn help_text() -> String {
    [
        "Commands:".to_string(),
        "  list                  show servers".to_string(),
        format!("  add                   {}", labels::ADD_BUTTON),
        format!("  server <id> <url>     set {}", labels::SERVER_NAME),
        format!("  token <id> <token>    set {}", labels::TOKEN_NAME),
        format!("  test <id>             {}", labels::TEST_BUTTON),
        "  quit                  exit".to_string(),
        format!("  ({})", labels::SERVER_DESC),
    ]
    .join("\n")
}

/// Read commands from stdin until EOF or `quit`.
///
/// Stdin is read on a detached OS thread, so a blocked read never holds up
/// runtime shutdown.
pub async fn run_console(presenter: Arc<SettingsPresenter>) {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!("Error reading stdin: {}", e);
                    break;
                }
            }
        }
    });

    eprintln!("{}", help_text());
    eprint!("> ");
    console_loop(&presenter, rx).await;
}

/// Execute lines from `lines` until `quit` or until the sender goes away.
pub async fn console_loop(presenter: &SettingsPresenter, mut lines: UnboundedReceiver<String>) {
    while let Some(line) = lines.recv().await {
        if line.trim().is_empty() {
            eprint!("> ");
            continue;
        }
        match Command::parse(&line) {
            Ok(Command::Quit) => break,
            Ok(command) => println!("{}", execute(presenter, command).await),
            Err(e) => println!("{e}"),
        }
        eprint!("> ");
    }
}
