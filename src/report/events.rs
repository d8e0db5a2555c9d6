use std::io::Write;

use crate::models::HostEvent;

use super::Reporter;

/// Process one lifecycle event from the host.
pub fn handle_host_event<W: Write>(reporter: &mut Reporter<W>, event: HostEvent) {
    match event {
        HostEvent::RunStart { browsers } => reporter.on_run_start(&browsers),

        HostEvent::BrowserStart { browser } => reporter.on_browser_start(&browser),

        HostEvent::BrowserError { browser, error } => reporter.on_browser_error(&browser, error),

        HostEvent::BrowserLog {
            browser,
            log,
            level,
        } => {
            tracing::trace!(id = %browser.id, level = ?level, "browser log");
            reporter.on_browser_log(&browser, log);
        }

        HostEvent::SpecComplete { browser, result } => {
            reporter.on_spec_complete(&browser, &result);
        }

        HostEvent::RunComplete => reporter.on_run_complete(),
    }
}
