use std::io::{self, Write};
use std::sync::LazyLock;

use regex::Regex;

use super::render::RenderContext;
use super::styles::{Role, Styles};
use super::{BrowserLog, RuntimeError};
use crate::models::{Stats, StatsAggregator, StoredFailure, Suite};
use crate::terminal::Terminal;

/// Covers whatever a longer previous frame left behind.
const TRAILING_PAD: &str = "            ";

/// Message text followed by its own stack trace; the tail from the last
/// `...Error:` on is what matters.
static COMBINED_MESSAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^.+\r?\n\r?\n(\w*Error:)").expect("regex is valid"));

/// Short, fixed-width browser label: the first word of the name without `Headless`.
fn browser_label(name: &str) -> String {
    let word_end = name
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(name.len());
    let word = if word_end == 0 { name } else { &name[..word_end] };
    format!("{:<7}", word.replace("Headless", ""))
}

fn stats_line(styles: &Styles, label: Option<&str>, meaning: &str, first: usize, stats: &Stats) -> String {
    let label = match label {
        Some(name) => format!("{}  ", styles.paint(Role::BrowserLabel, &browser_label(name))),
        None => String::new(),
    };
    format!(
        "{label}{}  {}  {}  {}{}\n",
        styles.paint(Role::Pending, &format!("{first:>5} {meaning}")),
        styles.paint(Role::Passed, &format!("{:>5} passed", stats.success)),
        styles.paint(Role::Failed, &format!("{:>5} failed", stats.failed)),
        styles.paint(Role::Skipped, &format!("{:>5} skipped", stats.skipped)),
        TRAILING_PAD,
    )
}

/// Write one line per browser (or one unlabeled line for a single browser),
/// each produced by `line`. Returns the number of lines written.
fn write_stats_block<W: Write>(
    terminal: &mut Terminal<W>,
    stats: &StatsAggregator,
    line: impl Fn(Option<&str>, &Stats) -> String,
) -> io::Result<usize> {
    let browsers = stats.browsers();
    if browsers.len() > 1 {
        for browser in browsers {
            terminal.write(&line(Some(&browser.name), &browser.latest))?;
        }
        Ok(browsers.len())
    } else {
        terminal.write(&line(None, &stats.global()))?;
        Ok(1)
    }
}

/// Draw the live progress frame and park the cursor at its top, so the next
/// frame overwrites it.
pub fn print_progress<W: Write>(
    terminal: &mut Terminal<W>,
    stats: &StatsAggregator,
    styles: &Styles,
) -> io::Result<()> {
    let lines = write_stats_block(terminal, stats, |label, s| {
        stats_line(styles, label, "pending", s.pending(), s)
    })?;
    terminal.move_up(u16::try_from(lines).unwrap_or(u16::MAX))
}

pub fn print_stats<W: Write>(
    terminal: &mut Terminal<W>,
    stats: &StatsAggregator,
    styles: &Styles,
) -> io::Result<()> {
    write_stats_block(terminal, stats, |label, s| {
        stats_line(styles, label, "total  ", s.total, s)
    })?;
    terminal.write("\n")
}

/// Human-readable text for a runtime error payload of any shape.
pub fn error_message(error: &serde_json::Value) -> String {
    use serde_json::Value;

    match error {
        Value::String(message) => message.clone(),
        Value::Object(fields) => match fields.get("message") {
            Some(Value::String(message)) if !message.is_empty() => {
                COMBINED_MESSAGE.replace(message, "${1}").into_owned()
            }
            _ => pretty_json(error),
        },
        other => pretty_json(other),
    }
}

fn pretty_json(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

pub fn print_runtime_errors<W: Write>(
    terminal: &mut Terminal<W>,
    errors: &[RuntimeError],
    name_browsers: bool,
    styles: &Styles,
) -> io::Result<()> {
    for error in errors {
        if name_browsers {
            terminal.write(&styles.paint(Role::Failed, &error.browser))?;
            terminal.write("\n\n")?;
        }
        terminal.write(&styles.paint(Role::Failed, &error_message(&error.error)))?;
        terminal.write("\n\n")?;
    }
    Ok(())
}

pub fn print_failure_during_run<W: Write>(
    terminal: &mut Terminal<W>,
    failure: &StoredFailure<'_>,
    cx: &RenderContext<'_>,
) -> io::Result<()> {
    let message = failure
        .browser
        .render_standalone(failure.suite, failure.test, cx);
    terminal.write(&format!("\n\n{message}\n\n"))
}

pub fn print_test_failures<W: Write>(
    terminal: &mut Terminal<W>,
    suites: &[Suite],
    cx: &mut RenderContext<'_>,
) -> io::Result<()> {
    if suites.is_empty() {
        return Ok(());
    }
    terminal.write(&cx.paint(Role::Heading, "Failed Tests:"))?;
    terminal.write("\n")?;
    for suite in suites {
        terminal.write(&suite.render(cx))?;
    }
    Ok(())
}

pub fn print_browser_logs<W: Write>(
    terminal: &mut Terminal<W>,
    logs: &[BrowserLog],
    styles: &Styles,
) -> io::Result<()> {
    for log in logs {
        terminal.write(&format!(
            "LOG MESSAGES FOR: {} INSTANCE #: {}\n",
            log.name, log.id
        ))?;
        for message in &log.messages {
            terminal.write(&format!("   {}\n", styles.paint(Role::LogMessage, message)))?;
        }
    }
    Ok(())
}
