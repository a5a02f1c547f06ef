//! Terminal output of the CLI: status messages and timed steps.

use std::{
    io::{stdout, Write},
    time::{Duration, Instant},
};

use term_painter::{Color, Style, ToStyle};


macro_rules! info {
    ($($t:tt)+) => { crate::ui::message(crate::ui::Status::Info, &format!($($t)+)) };
}

macro_rules! warn {
    ($($t:tt)+) => { crate::ui::message(crate::ui::Status::Warning, &format!($($t)+)) };
}

macro_rules! error {
    () => { crate::ui::message(crate::ui::Status::Error, "") };
    ($($t:tt)+) => { crate::ui::message(crate::ui::Status::Error, &format!($($t)+)) };
}

/// Kind of a message, determining its marker and colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Error,
    Warning,
    Info,
    Step,
}

impl Status {
    fn marker(self) -> &'static str {
        match self {
            Status::Error => "[!]",
            Status::Warning => "[w]",
            Status::Info => "[i]",
            Status::Step => "[…]",
        }
    }

    fn marker_style(self) -> Style {
        match self {
            Status::Error => Color::Red.bold(),
            Status::Warning => Color::Yellow.bold(),
            Status::Info => Color::Blue.bold(),
            Status::Step => Color::Green.bold(),
        }
    }

    fn text_style(self) -> Style {
        match self {
            Status::Error => Color::BrightRed.to_style(),
            Status::Warning => Color::BrightYellow.to_style(),
            Status::Info | Status::Step => Color::NotSet.to_style(),
        }
    }
}

/// Width available for message text, next to the marker.
fn text_width() -> usize {
    let columns = term_size::dimensions().map(|(w, _)| w).unwrap_or(80);
    columns.min(100).saturating_sub(6).max(20)
}

/// Splits `text` into lines of at most `width` characters, breaking at
/// whitespace. Words longer than `width` (e.g. long paths) get a line of
/// their own.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        let needed = if line.is_empty() { 0 } else { line.chars().count() + 1 };
        if needed > 0 && needed + word.chars().count() > width {
            lines.push(std::mem::replace(&mut line, String::new()));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    lines.push(line);
    lines
}

/// Prints a message, continuation lines indented below the marker.
pub fn message(status: Status, text: &str) {
    let marker = status.marker_style();
    let lines = wrap(text, text_width());
    let last = lines.len() - 1;
    for (i, line) in lines.iter().enumerate() {
        let prefix = match i {
            0 => status.marker(),
            _ if i == last => "  └",
            _ => "  │",
        };
        println!("{} {}", marker.paint(prefix), status.text_style().paint(line));
    }
}

/// A step that takes a while, like reading or writing a mesh. Printed as an
/// open line that [`Step::done`] completes with a summary and the elapsed
/// time. A step dropped without `done` (because of an error) just ends the
/// line.
pub struct Step {
    label: String,
    start: Instant,
    finished: bool,
}

impl Step {
    pub fn start(label: String) -> Self {
        print!("{} {} ... ", Status::Step.marker_style().paint(Status::Step.marker()), label);
        let _ = stdout().flush();

        Self {
            label,
            start: Instant::now(),
            finished: false,
        }
    }

    /// Completes the line and returns how long the step took.
    pub fn done(mut self, summary: &str) -> Duration {
        let elapsed = self.start.elapsed();
        let style = Status::Step.marker_style();
        println!(
            "\r{} {} ... {} ({}, in {:.2?})",
            style.paint("[✓]"),
            self.label,
            style.paint("done"),
            summary,
            elapsed,
        );
        self.finished = true;
        elapsed
    }
}

impl Drop for Step {
    fn drop(&mut self) {
        if !self.finished {
            println!("{}", Status::Error.marker_style().paint("failed"));
        }
    }
}

/// Formats the given integer with `,` as thousand separator.
pub fn fmt_with_thousand_sep(mut v: u64) -> String {
    let mut groups = vec![v % 1000];
    v /= 1000;
    while v != 0 {
        groups.push(v % 1000);
        v /= 1000;
    }

    let mut out = groups.pop().unwrap_or(0).to_string();
    for group in groups.iter().rev() {
        out.push_str(&format!(",{:03}", group));
    }

    out
}
