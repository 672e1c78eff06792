use clap::builder::styling::{AnsiColor, Effects, Style, Styles};

#[derive(clap::Parser, Debug, Clone, Default)]
#[clap(styles = CARGO_STYLING)]
pub struct Cli {
    /// Evaluate expressions from a file, one per line
    pub file: Option<String>,

    /// Read expressions from stdin
    #[arg(long, default_value_t = false)]
    pub stdin: bool,

    /// Tolerate malformed input instead of reporting errors
    #[arg(long, default_value_t = false)]
    pub lenient: bool,

    /// Token capacity per expression
    #[arg(long, value_name = "N", default_value_t = shuntvm::DEFAULT_CAPACITY)]
    pub capacity: usize,

    /// Print the postfix form of each expression
    #[arg(long, default_value_t = false)]
    pub rpn: bool,

    /// Do not print diagnostics
    #[arg(short, long, default_value_t = false)]
    pub quiet: bool,

    /// Maximum amount of errors to report
    #[arg(long, value_name = "max-errors", default_value_t = 4)]
    pub max_errors: usize,
}

const HEADER: Style = AnsiColor::Green.on_default().effects(Effects::BOLD);
const USAGE: Style = AnsiColor::Green.on_default().effects(Effects::BOLD);
const LITERAL: Style = AnsiColor::Cyan.on_default().effects(Effects::BOLD);
const PLACEHOLDER: Style = AnsiColor::Cyan.on_default();
const ERROR: Style = AnsiColor::Red.on_default().effects(Effects::BOLD);
const VALID: Style = AnsiColor::Cyan.on_default().effects(Effects::BOLD);
const INVALID: Style = AnsiColor::Yellow.on_default().effects(Effects::BOLD);

/// Cargo's color style
/// [source](https://github.com/crate-ci/clap-cargo/blob/master/src/style.rs)
const CARGO_STYLING: Styles = Styles::styled()
    .header(HEADER)
    .usage(USAGE)
    .literal(LITERAL)
    .placeholder(PLACEHOLDER)
    .error(ERROR)
    .valid(VALID)
    .invalid(INVALID);
