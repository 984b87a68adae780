//! Terminal styling for CLI output.
//!
//! [`CliStyle`] wraps the `colored` crate so the binary can style strings
//! directly. `colored` honors `NO_COLOR` and non-tty output on its own.

use colored::{ColoredString, Colorize};
use textwrap::{Options, fill, termwidth, wrap_algorithms::Penalties};

pub trait CliStyle {
    fn rendered_style(&self) -> ColoredString;
    fn markup_style(&self) -> ColoredString;
    fn heading_style(&self) -> ColoredString;
    fn note_style(&self) -> ColoredString;
    fn issue_style(&self) -> ColoredString;
    fn ok_style(&self) -> ColoredString;
}

impl CliStyle for &str {
    fn rendered_style(&self) -> ColoredString {
        self.italic().truecolor(102, 208, 250)
    }
    fn markup_style(&self) -> ColoredString {
        self.truecolor(220, 180, 40)
    }
    fn heading_style(&self) -> ColoredString {
        self.truecolor(223, 77, 10).underline()
    }
    fn note_style(&self) -> ColoredString {
        self.dimmed().italic()
    }
    fn issue_style(&self) -> ColoredString {
        self.bold().truecolor(230, 80, 80)
    }
    fn ok_style(&self) -> ColoredString {
        self.truecolor(110, 220, 110)
    }
}

impl CliStyle for String {
    fn rendered_style(&self) -> ColoredString {
        self.as_str().rendered_style()
    }
    fn markup_style(&self) -> ColoredString {
        self.as_str().markup_style()
    }
    fn heading_style(&self) -> ColoredString {
        self.as_str().heading_style()
    }
    fn note_style(&self) -> ColoredString {
        self.as_str().note_style()
    }
    fn issue_style(&self) -> ColoredString {
        self.as_str().issue_style()
    }
    fn ok_style(&self) -> ColoredString {
        self.as_str().ok_style()
    }
}

/// Wrap rendered text to `width` columns, capped at the terminal width.
/// A width of 0 leaves the text unwrapped.
pub fn wrap_text(text: &str, width: usize) -> String {
    if width == 0 {
        return text.to_string();
    }
    let options = Options::new(width.min(termwidth()))
        .wrap_algorithm(textwrap::WrapAlgorithm::OptimalFit(Penalties::new()));
    fill(text, options)
}
