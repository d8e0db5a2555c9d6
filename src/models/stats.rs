use serde::Deserialize;

use super::event::Browser;

/// Spec counters for one browser, or summed over all of them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Stats {
    pub total: usize,
    pub success: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl Stats {
    /// Specs not yet reported. Saturates rather than underflowing on a
    /// snapshot that claims more outcomes than specs.
    pub fn pending(&self) -> usize {
        self.total
            .saturating_sub(self.success)
            .saturating_sub(self.failed)
            .saturating_sub(self.skipped)
    }
}

impl std::ops::Add for Stats {
    type Output = Stats;

    fn add(self, other: Stats) -> Stats {
        Stats {
            total: self.total + other.total,
            success: self.success + other.success,
            failed: self.failed + other.failed,
            skipped: self.skipped + other.skipped,
        }
    }
}

impl std::iter::Sum for Stats {
    fn sum<I: Iterator<Item = Stats>>(iter: I) -> Stats {
        iter.fold(Stats::default(), |acc, s| acc + s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowserState {
    /// Seen (for example through a log line) but not started.
    Registered,
    Running,
    /// At least one spec has completed.
    Reported,
}

#[derive(Debug, Clone)]
pub struct BrowserStats {
    pub id: String,
    pub name: String,
    pub state: BrowserState,
    pub latest: Stats,
}

/// Per-browser snapshots in registration order. Each completed spec replaces
/// the browser's snapshot wholesale; the aggregate is always re-summed.
#[derive(Debug, Default)]
pub struct StatsAggregator {
    browsers: Vec<BrowserStats>,
}

impl StatsAggregator {
    /// Register `browser` if unseen. Returns its index.
    pub fn register(&mut self, browser: &Browser) -> usize {
        if let Some(idx) = self.browsers.iter().position(|b| b.id == browser.id) {
            return idx;
        }
        self.browsers.push(BrowserStats {
            id: browser.id.clone(),
            name: browser.name.clone(),
            state: BrowserState::Registered,
            latest: Stats::default(),
        });
        self.browsers.len() - 1
    }

    pub fn start(&mut self, browser: &Browser) {
        let idx = self.register(browser);
        let entry = &mut self.browsers[idx];
        if entry.state == BrowserState::Registered {
            entry.state = BrowserState::Running;
        }
    }

    /// Record the browser's latest counters, replacing whatever it reported before.
    pub fn update(&mut self, browser: &Browser) {
        let idx = self.register(browser);
        let entry = &mut self.browsers[idx];
        entry.state = BrowserState::Reported;
        entry.latest = browser.last_result;
    }

    pub fn browsers(&self) -> &[BrowserStats] {
        &self.browsers
    }

    pub fn global(&self) -> Stats {
        self.browsers.iter().map(|b| b.latest).sum()
    }
}
