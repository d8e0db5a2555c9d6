use std::io::{self, Write};

use crate::config::ReporterOptions;
use crate::models::{Browser, ResultStore, SpecResult, StatsAggregator};
use crate::terminal::Terminal;

pub mod canonicalize;
pub mod events;
pub mod printers;
pub mod render;
pub mod styles;

pub use canonicalize::Canonicalizer;
pub use events::handle_host_event;
pub use render::RenderContext;
pub use styles::Styles;

/// Console output captured from one browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserLog {
    pub id: String,
    pub name: String,
    pub messages: Vec<String>,
}

/// A browser crash not tied to any spec.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeError {
    pub browser: String,
    pub error: serde_json::Value,
}

/// Everything accumulated during one run. Replaced wholesale at run start.
#[derive(Debug, Default)]
struct RunState {
    store: ResultStore,
    stats: StatsAggregator,
    logs: Vec<BrowserLog>,
    errors: Vec<RuntimeError>,
    /// Last failure number handed out in the report.
    failures: usize,
}

impl RunState {
    fn ensure_log(&mut self, browser: &Browser) -> &mut BrowserLog {
        let idx = match self.logs.iter().position(|log| log.id == browser.id) {
            Some(idx) => idx,
            None => {
                self.logs.push(BrowserLog {
                    id: browser.id.clone(),
                    name: browser.name.clone(),
                    messages: Vec::new(),
                });
                self.logs.len() - 1
            }
        };
        &mut self.logs[idx]
    }
}

/// Turns host lifecycle events into a live progress display and a final
/// failure report.
pub struct Reporter<W: Write> {
    options: ReporterOptions,
    styles: Styles,
    canonicalizer: Canonicalizer,
    terminal: Terminal<W>,
    run: RunState,
    cursor_hidden: bool,
}

impl<W: Write> Reporter<W> {
    pub fn new(options: ReporterOptions, terminal: Terminal<W>) -> Self {
        let mut canonicalizer = Canonicalizer::new();
        if options.suppress_error_highlighting {
            canonicalizer.suppress_highlighting();
        }
        if options.omit_external_stack_frames {
            canonicalizer.omit_external_frames();
        }
        Self {
            options,
            styles: Styles::for_terminal(terminal.is_tty()),
            canonicalizer,
            terminal,
            run: RunState::default(),
            cursor_hidden: false,
        }
    }

    pub fn with_styles(mut self, styles: Styles) -> Self {
        self.styles = styles;
        self
    }

    /// Install the host's formatter as the first stage for stack frames.
    pub fn with_formatter(
        mut self,
        formatter: impl Fn(&str) -> String + Send + Sync + 'static,
    ) -> Self {
        self.canonicalizer.set_formatter(formatter);
        self
    }

    #[cfg(test)]
    pub fn terminal(&self) -> &Terminal<W> {
        &self.terminal
    }

    /// Whether the run so far has failed specs or crashed browsers.
    pub fn has_failures(&self) -> bool {
        self.run.stats.global().failed > 0 || !self.run.errors.is_empty()
    }

    pub fn on_run_start(&mut self, browsers: &[Browser]) {
        tracing::debug!(browsers = browsers.len(), "run started");
        self.run = RunState::default();
        let result = self.write_run_start();
        log_write_failure("run start", result);
    }

    pub fn on_browser_start(&mut self, browser: &Browser) {
        tracing::debug!(id = %browser.id, name = %browser.name, "browser started");
        self.run.stats.start(browser);
        self.run.ensure_log(browser);
    }

    pub fn on_browser_error(&mut self, browser: &Browser, error: serde_json::Value) {
        tracing::debug!(id = %browser.id, "browser error");
        self.run.stats.register(browser);
        self.run.ensure_log(browser);
        self.run.errors.push(RuntimeError {
            browser: browser.name.clone(),
            error,
        });
    }

    pub fn on_browser_log(&mut self, browser: &Browser, log: String) {
        self.run.stats.register(browser);
        self.run.ensure_log(browser).messages.push(log);
    }

    pub fn on_spec_complete(&mut self, browser: &Browser, result: &SpecResult) {
        self.run.stats.update(browser);
        self.run.ensure_log(browser);
        let written = self.write_spec_complete(browser, result);
        log_write_failure("spec complete", written);
    }

    pub fn on_run_complete(&mut self) {
        tracing::debug!(
            failed = self.run.stats.global().failed,
            errors = self.run.errors.len(),
            "run complete"
        );
        let written = self.write_run_complete();
        log_write_failure("run complete", written);
    }

    /// Put the cursor back if a run was cut short.
    pub fn finish(&mut self) {
        if self.cursor_hidden {
            tracing::debug!("event stream ended mid-run, restoring cursor");
            let result = self.show_cursor();
            log_write_failure("finish", result);
        }
    }

    fn write_run_start(&mut self) -> io::Result<()> {
        self.terminal.hide_cursor()?;
        self.cursor_hidden = true;
        self.terminal.write("\n")?;
        self.terminal.flush()
    }

    fn write_spec_complete(&mut self, browser: &Browser, result: &SpecResult) -> io::Result<()> {
        if !self.options.suppress_error_report {
            let stored = self.run.store.save(browser, result);
            if self.options.early_error_report
                && let Some(failure) = stored
            {
                let cx = RenderContext::new(&self.styles, &self.canonicalizer, &mut self.run.failures);
                printers::print_failure_during_run(&mut self.terminal, &failure, &cx)?;
            }
        }

        if !self.options.render_on_run_complete_only {
            printers::print_progress(&mut self.terminal, &self.run.stats, &self.styles)?;
        }
        self.terminal.flush()
    }

    fn write_run_complete(&mut self) -> io::Result<()> {
        let run = &mut self.run;
        printers::print_stats(&mut self.terminal, &run.stats, &self.styles)?;

        if !run.errors.is_empty() {
            let name_browsers = run.stats.browsers().len() > 1;
            printers::print_runtime_errors(&mut self.terminal, &run.errors, name_browsers, &self.styles)?;
        } else {
            if !self.options.early_error_report {
                let mut cx = RenderContext::new(&self.styles, &self.canonicalizer, &mut run.failures);
                printers::print_test_failures(&mut self.terminal, run.store.data(), &mut cx)?;
            }
            if !self.options.suppress_browser_logs {
                printers::print_browser_logs(&mut self.terminal, &run.logs, &self.styles)?;
            }
        }

        self.show_cursor()
    }

    fn show_cursor(&mut self) -> io::Result<()> {
        self.terminal.show_cursor()?;
        self.cursor_hidden = false;
        self.terminal.flush()
    }
}

fn log_write_failure(stage: &str, result: io::Result<()>) {
    if let Err(e) = result {
        tracing::warn!(stage, error = %e, "failed to write report");
    }
}
