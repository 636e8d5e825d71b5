//! `rline`: interactive demo host for the line editor.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Once};

use anyhow::Result;
use clap::Parser;
use core_actions::CompletionSource;
use core_config::load_from;
use core_session::{LineEditor, SessionError};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;

const LOG_FILE: &str = "rline.log";
const DEMO_HISTORY: [&str; 3] = ["ls -a", "dotnet run", "git init"];
const FIRST_WORD_STYLE: &str = "\x1b[36m";
const STYLE_RESET: &str = "\x1b[0m";

#[derive(Parser, Debug)]
#[command(name = "rline", version, about = "Interactive line editor demo")]
struct Args {
    /// Optional configuration file path (overrides discovery of rline.toml).
    #[arg(long = "config")]
    config: Option<PathBuf>,
    #[arg(long = "prompt", default_value = "> ")]
    prompt: String,
    /// Read a single masked password instead of looping over lines.
    #[arg(long = "password")]
    password: bool,
}

/// Offers git subcommands once the line starts with `git `.
struct GitCompleter;

impl CompletionSource for GitCompleter {
    fn separators(&self) -> &[char] {
        &[' ', '.', '/', '\\', ':']
    }

    fn suggestions(&self, text: &str, _start: usize, _end: usize) -> Vec<String> {
        if text.starts_with("git ") {
            ["init", "clone", "pull", "push"].map(String::from).to_vec()
        } else {
            Vec::new()
        }
    }
}

/// Colours the first word of the line.
fn highlight_first_word(text: &str) -> String {
    let trimmed = text.trim_start();
    let lead = text.len() - trimmed.len();
    let word_end = trimmed
        .find(char::is_whitespace)
        .map_or(text.len(), |i| lead + i);
    if word_end == lead {
        return text.to_string();
    }
    format!(
        "{}{FIRST_WORD_STYLE}{}{STYLE_RESET}{}",
        &text[..lead],
        &text[lead..word_end],
        &text[word_end..]
    )
}

fn configure_logging() -> Option<WorkerGuard> {
    let log_dir = Path::new(".");
    let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_ansi(false)
        .with_writer(nb_writer)
        .try_init()
        .ok()
        .map(|_| guard)
}

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(target: "runtime.panic", ?info, "panic");
            default_panic(info);
        }));
    });
}

fn build_editor(args: &Args) -> Result<LineEditor> {
    let config = load_from(args.config.clone())?;
    let mut editor = LineEditor::from_config(&config);
    editor.add_history(DEMO_HISTORY);
    editor.set_completion_source(Some(Arc::new(GitCompleter)));
    editor.set_highlighter(Some(Arc::new(highlight_first_word)));
    Ok(editor)
}

/// True when the error ends the session normally (Ctrl-C or closed input).
fn is_session_end(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<SessionError>(),
        Some(SessionError::Interrupted | SessionError::InputClosed)
    )
}

fn main() -> Result<()> {
    let _log_guard = configure_logging();
    install_panic_hook();
    let args = Args::parse();
    info!(target: "runtime", password = args.password, "startup");

    let mut editor = build_editor(&args)?;
    let mut stdout = io::stdout();

    if args.password {
        match editor.read_password(&args.prompt) {
            Ok(secret) => writeln!(stdout, "read {} chars", secret.chars().count())?,
            Err(e) if is_session_end(&e) => {}
            Err(e) => return Err(e),
        }
        return Ok(());
    }

    loop {
        let line = match editor.read(&args.prompt, "") {
            Ok(line) => line,
            Err(e) if is_session_end(&e) => break,
            Err(e) => return Err(e),
        };
        if line.trim() == "exit" {
            break;
        }
        writeln!(stdout, "{line}")?;
    }
    info!(target: "runtime", history_len = editor.history().len(), "shutdown");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_events::{KeyCode, KeyEvent};
    use core_input::ScriptedKeys;
    use core_terminal::Viewport;
    use pretty_assertions::assert_eq;

    #[test]
    fn first_word_is_wrapped_in_style() {
        assert_eq!(
            highlight_first_word("git init"),
            "\x1b[36mgit\x1b[0m init"
        );
        assert_eq!(highlight_first_word("  ls"), "  \x1b[36mls\x1b[0m");
        assert_eq!(highlight_first_word("   "), "   ");
        assert_eq!(highlight_first_word(""), "");
    }

    #[test]
    fn completer_splits_on_path_separators() {
        assert_eq!(GitCompleter.completion_start("cd a/b.c", 8), 7);
        assert!(GitCompleter.suggestions("ls ", 3, 3).is_empty());
        assert_eq!(GitCompleter.suggestions("git p", 4, 5).len(), 4);
    }

    #[test]
    fn demo_editor_recalls_seeded_history() {
        let args = Args {
            config: Some(PathBuf::from("__missing_rline_config__.toml")),
            prompt: "> ".to_string(),
            password: false,
        };
        let mut editor = build_editor(&args).unwrap();
        let mut keys = ScriptedKeys::new();
        keys.push_key(KeyEvent::plain(KeyCode::Up)).push_text("\n");
        let line = editor
            .read_with(&mut keys, Vec::new(), Viewport::new(2, 40, 24), "")
            .unwrap();
        assert_eq!(line, "git init");
    }
}
