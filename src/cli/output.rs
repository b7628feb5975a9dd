//! Terminal rendering for the `init` and `config` subcommands.
//!
//! Every line is built by a `render_*` function that returns a `String`, so
//! the plain (`--no-color`) form can be asserted on directly.

use crate::utils::toml_config::ConfigWarning;
use owo_colors::OwoColorize;
use std::path::Path;

/// Width of the key column in `field` lines
const KEY_WIDTH: usize = 10;

/// Leading marker of a status line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    Ok,
    Info,
    Warn,
    Fail,
    Skip,
}

impl Mark {
    fn symbol(self) -> &'static str {
        match self {
            Mark::Ok => "✓",
            Mark::Info => "•",
            Mark::Warn => "⚠",
            Mark::Fail => "✗",
            Mark::Skip => "○",
        }
    }

    fn tag(self) -> &'static str {
        match self {
            Mark::Ok => "[ok]",
            Mark::Info => "[..]",
            Mark::Warn => "[warn]",
            Mark::Fail => "[fail]",
            Mark::Skip => "[skip]",
        }
    }
}

/// What `init` did with one scaffolded file
#[derive(Debug, Clone, Copy)]
pub enum FileAction {
    Created,
    Kept,
}

pub struct Output {
    pub colored: bool,
}

impl Output {
    pub fn new(colored: bool) -> Self {
        Self { colored }
    }

    pub fn render_status(&self, mark: Mark, text: &str) -> String {
        if !self.colored {
            return format!("  {} {}", mark.tag(), text);
        }
        let symbol = mark.symbol();
        match mark {
            Mark::Ok => format!("  {} {}", symbol.green().bold(), text),
            Mark::Info => format!("  {} {}", symbol.blue(), text),
            Mark::Warn => format!("  {} {}", symbol.yellow().bold(), text.yellow()),
            Mark::Fail => format!("  {} {}", symbol.red().bold(), text.red()),
            Mark::Skip => format!("  {} {}", symbol.dimmed(), text.dimmed()),
        }
    }

    pub fn render_field(&self, key: &str, value: &str) -> String {
        let key = format!("{:<width$}", key, width = KEY_WIDTH);
        if self.colored {
            format!("    {} {}", key.dimmed(), value.bright_white())
        } else {
            format!("    {} {}", key, value)
        }
    }

    pub fn render_file(&self, path: &Path, action: FileAction) -> String {
        let path = path.display().to_string();
        match action {
            FileAction::Created => self.render_status(Mark::Ok, &format!("wrote {}", path)),
            FileAction::Kept => self.render_status(Mark::Skip, &format!("kept {}", path)),
        }
    }

    /// Failures go to stderr, everything else to stdout
    pub fn status(&self, mark: Mark, text: &str) {
        let line = self.render_status(mark, text);
        if mark == Mark::Fail {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }

    pub fn success(&self, text: &str) {
        self.status(Mark::Ok, text);
    }

    pub fn info(&self, text: &str) {
        self.status(Mark::Info, text);
    }

    pub fn warning(&self, text: &str) {
        self.status(Mark::Warn, text);
    }

    pub fn error(&self, text: &str) {
        self.status(Mark::Fail, text);
    }

    pub fn config_warning(&self, warning: &ConfigWarning) {
        self.warning(&format!("{} ({})", warning.message, warning.kind));
    }

    pub fn file(&self, path: &Path, action: FileAction) {
        println!("{}", self.render_file(path, action));
    }

    pub fn field(&self, key: &str, value: &str) {
        println!("{}", self.render_field(key, value));
    }

    pub fn section(&self, title: &str) {
        if self.colored {
            println!("\n  {}", title.bright_white().bold().underline());
        } else {
            println!("\n  {}\n  {}", title, "-".repeat(title.len()));
        }
    }

    /// Numbered follow-up instruction, optionally with a shell command
    pub fn step(&self, n: usize, text: &str, command: Option<&str>) {
        println!("  {}. {}", n, text);
        if let Some(command) = command {
            if self.colored {
                println!("     {}", format!("$ {}", command).bright_cyan());
            } else {
                println!("     $ {}", command);
            }
        }
    }

    pub fn banner(&self) {
        let version = format!("v{}", env!("CARGO_PKG_VERSION"));
        if self.colored {
            println!(
                "\n   {} {}  {}\n",
                "UDX3".bright_cyan().bold(),
                version.dimmed(),
                "chat proxy + dashboard API".dimmed()
            );
        } else {
            println!("\n   UDX3 {}  chat proxy + dashboard API\n", version);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::toml_config::ConfigWarningKind;

    #[test]
    fn test_plain_lines_use_tags() {
        let out = Output::new(false);
        assert_eq!(out.render_status(Mark::Warn, "no key"), "  [warn] no key");
        assert_eq!(
            out.render_file(Path::new("udx3.toml"), FileAction::Kept),
            "  [skip] kept udx3.toml"
        );
        assert_eq!(out.render_field("model", "gemini-pro"), "    model      gemini-pro");
    }

    #[test]
    fn test_colored_lines_keep_text() {
        let out = Output::new(true);
        let line = out.render_status(Mark::Ok, "valid");
        assert!(line.contains("valid"));
        assert!(line.contains('\u{1b}'));
    }

    #[test]
    fn test_printing_does_not_panic() {
        let warning = ConfigWarning {
            kind: ConfigWarningKind::MissingCredential,
            message: "GEMINI_API_KEY is not set".to_string(),
        };
        for out in [Output::new(true), Output::new(false)] {
            out.banner();
            out.section("Configuration");
            out.config_warning(&warning);
            out.step(1, "Start the server", Some("udx3-server"));
            out.error("boom");
        }
    }
}
