use console::{Style, Term};
use prisma_schema_syntax::ParseError;

use crate::cli::GlobalOpts;
use crate::diagnostic::render_diagnostic;
use crate::error::CliError;

/// Output format selected with `--format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
    Plain,
}

impl OutputMode {
    fn from_flag(flag: &str) -> Self {
        match flag {
            "json" => Self::Json,
            "plain" => Self::Plain,
            _ => Self::Human,
        }
    }
}

/// Where command results and messages go.
///
/// Results go to stdout; status lines, warnings and diagnostics go to
/// stderr so that `format` output can be piped.
pub struct OutputContext {
    pub mode: OutputMode,
    pub quiet: bool,
    pub use_color: bool,
}

impl OutputContext {
    pub fn from_global(global: &GlobalOpts) -> Self {
        let use_color = !global.no_color
            && std::env::var("TERM").map_or(true, |t| t != "dumb")
            && Term::stderr().is_term();

        Self {
            mode: OutputMode::from_flag(&global.format),
            quiet: global.quiet,
            use_color,
        }
    }

    fn chatty(&self) -> bool {
        !self.quiet && self.mode == OutputMode::Human
    }

    /// `label` in `style` when color is on, plain otherwise.
    fn tag(&self, label: &str, style: Style) -> String {
        if self.use_color {
            style.apply_to(label).to_string()
        } else {
            label.to_string()
        }
    }

    /// Final "ok" line of a command (human mode, not quiet).
    pub fn success(&self, msg: &str) {
        if self.chatty() {
            eprintln!("{} {msg}", self.tag("ok", Style::new().green().bold()));
        }
    }

    /// Progress line for a single file (human mode, not quiet).
    pub fn status(&self, msg: &str) {
        if self.chatty() {
            eprintln!("{msg}");
        }
    }

    pub fn warn(&self, msg: &str) {
        if self.quiet {
            return;
        }
        match self.mode {
            OutputMode::Human => {
                eprintln!("{} {msg}", self.tag("warning:", Style::new().yellow().bold()))
            }
            OutputMode::Json => eprintln!("{}", serde_json::json!({ "warning": msg })),
            OutputMode::Plain => eprintln!("warning\t{msg}"),
        }
    }

    /// Report a file that failed to parse while a command keeps going.
    ///
    /// JSON mode stays silent here: the command folds the failure into its
    /// final document instead.
    pub fn parse_failure(&self, error: &ParseError, filename: &str) {
        match self.mode {
            OutputMode::Human => eprintln!("{:?}", render_diagnostic(error, filename)),
            OutputMode::Plain => {
                eprintln!("{filename}:{}\terror\t{}", error.position(), error.message())
            }
            OutputMode::Json => {}
        }
    }

    /// Report the error that ended the command.
    pub fn print_error(&self, err: &CliError) {
        match (self.mode, err) {
            (OutputMode::Human, CliError::Parse { error, file }) => {
                self.parse_failure(error, &file.display().to_string());
            }
            (OutputMode::Human, _) => {
                eprintln!("{} {err}", self.tag("error:", Style::new().red().bold()));
            }
            (OutputMode::Json, _) => eprintln!("{}", err.to_json()),
            (OutputMode::Plain, _) => eprintln!("error\t{err}"),
        }
    }

    pub fn print_json(&self, value: &serde_json::Value) {
        if let Ok(s) = serde_json::to_string_pretty(value) {
            println!("{s}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn global(format: &str, quiet: bool, no_color: bool) -> GlobalOpts {
        GlobalOpts {
            format: format.into(),
            verbose: 0,
            quiet,
            no_color,
        }
    }

    fn context(mode: OutputMode, quiet: bool) -> OutputContext {
        OutputContext {
            mode,
            quiet,
            use_color: false,
        }
    }

    #[test]
    fn mode_follows_the_format_flag() {
        assert_eq!(OutputMode::from_flag("human"), OutputMode::Human);
        assert_eq!(OutputMode::from_flag("json"), OutputMode::Json);
        assert_eq!(OutputMode::from_flag("plain"), OutputMode::Plain);
    }

    #[test]
    fn from_global_keeps_quiet_and_mode() {
        let ctx = OutputContext::from_global(&global("json", true, false));
        assert_eq!(ctx.mode, OutputMode::Json);
        assert!(ctx.quiet);
    }

    #[test]
    fn no_color_disables_color() {
        let ctx = OutputContext::from_global(&global("human", false, true));
        assert!(!ctx.use_color);
    }

    #[test]
    fn tags_are_plain_without_color() {
        let ctx = context(OutputMode::Human, false);
        assert_eq!(ctx.tag("ok", Style::new().green()), "ok");
    }

    #[test]
    fn only_human_mode_without_quiet_is_chatty() {
        assert!(context(OutputMode::Human, false).chatty());
        assert!(!context(OutputMode::Human, true).chatty());
        assert!(!context(OutputMode::Json, false).chatty());
        assert!(!context(OutputMode::Plain, false).chatty());
    }
}
