use super::event::{Browser, SpecResult};
use super::node::{BrowserResult, Named, Suite, Test};

/// The nodes touched by the latest [`ResultStore::save`].
#[derive(Debug, Clone, Copy)]
pub struct StoredFailure<'a> {
    pub suite: &'a Suite,
    pub test: &'a Test,
    pub browser: &'a BrowserResult,
}

/// Failed specs of one run, nested by suite, test and browser in the order
/// they were first seen.
#[derive(Debug, Default)]
pub struct ResultStore {
    suites: Vec<Suite>,
}

impl ResultStore {
    pub fn data(&self) -> &[Suite] {
        &self.suites
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.suites.is_empty()
    }

    /// File a failed spec under its suite chain, test and browser. Passing,
    /// skipped and unplaced results are ignored.
    pub fn save(&mut self, browser: &Browser, result: &SpecResult) -> Option<StoredFailure<'_>> {
        if !result.is_reportable_failure() {
            return None;
        }

        let suite = find_suite(&mut self.suites, &result.suite)?;

        let test_idx = find_or_create(&mut suite.tests, &result.description);
        let test = &mut suite.tests[test_idx];
        test.depth = suite.depth + 1;

        let browser_idx = find_or_create(&mut test.browsers, &browser.name);
        let browser_result = &mut test.browsers[browser_idx];
        browser_result.depth = test.depth + 1;

        if let Some(log) = result.first_log() {
            browser_result.errors = log.split('\n').map(str::to_owned).collect();
        }

        let suite: &Suite = suite;
        let test = &suite.tests[test_idx];
        Some(StoredFailure {
            suite,
            test,
            browser: &test.browsers[browser_idx],
        })
    }
}

/// Walk `chain` from the outermost suite inwards, creating missing levels.
fn find_suite<'a>(mut scope: &'a mut Vec<Suite>, chain: &[String]) -> Option<&'a mut Suite> {
    let (innermost, parents) = chain.split_last()?;
    for (depth, name) in parents.iter().enumerate() {
        let idx = find_or_create(scope, name);
        let suite = &mut scope[idx];
        suite.depth = depth;
        scope = &mut suite.suites;
    }
    let idx = find_or_create(scope, innermost);
    let suite = &mut scope[idx];
    suite.depth = parents.len();
    Some(suite)
}

/// Index of the first node named `name`, appending a new one if none is.
fn find_or_create<T: Named>(nodes: &mut Vec<T>, name: &str) -> usize {
    let name = name.trim();
    if let Some(idx) = nodes.iter().position(|node| node.name() == name) {
        return idx;
    }
    nodes.push(T::new(name));
    nodes.len() - 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn browser(name: &str) -> Browser {
        Browser {
            id: name.to_lowercase(),
            name: name.into(),
            ..Browser::default()
        }
    }

    fn failure(suite: &[&str], description: &str, log: Option<&str>) -> SpecResult {
        SpecResult {
            success: false,
            skipped: false,
            suite: suite.iter().map(|s| s.to_string()).collect(),
            description: description.into(),
            log: vec![log.map(str::to_owned)],
        }
    }

    fn names<T: Named>(nodes: &[T]) -> Vec<&str> {
        nodes.iter().map(|n| n.name()).collect()
    }

    #[test]
    fn ignores_results_that_are_not_failures() {
        let mut store = ResultStore::default();
        let chrome = browser("Chrome");

        let mut passed = failure(&["A"], "t", Some("x"));
        passed.success = true;
        assert!(store.save(&chrome, &passed).is_none());

        let mut skipped = failure(&["A"], "t", Some("x"));
        skipped.skipped = true;
        assert!(store.save(&chrome, &skipped).is_none());

        assert!(store.save(&chrome, &failure(&[], "t", Some("x"))).is_none());
        assert!(store.data().is_empty());
    }

    #[test]
    fn same_triple_is_stored_once() {
        let mut store = ResultStore::default();
        let chrome = browser("Chrome");
        store.save(&chrome, &failure(&["A", "B"], "t", Some("first")));
        store.save(&chrome, &failure(&["A", "B"], "t", Some("second")));

        let data = store.data();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0].suites.len(), 1);
        let tests = &data[0].suites[0].tests;
        assert_eq!(tests.len(), 1);
        assert_eq!(tests[0].browsers.len(), 1);
        // Each save is one attempt; the latest one wins.
        assert_eq!(tests[0].browsers[0].errors, vec!["second".to_owned()]);
    }

    #[test]
    fn another_browser_becomes_a_sibling() {
        let mut store = ResultStore::default();
        store.save(&browser("Chrome"), &failure(&["A"], "t", Some("x")));
        store.save(&browser("Firefox"), &failure(&["A"], "t", Some("y")));

        let test = &store.data()[0].tests[0];
        assert_eq!(names(&test.browsers), vec!["Chrome", "Firefox"]);
    }

    #[test]
    fn discovery_order_is_kept() {
        let mut store = ResultStore::default();
        let chrome = browser("Chrome");
        store.save(&chrome, &failure(&["B"], "t", None));
        store.save(&chrome, &failure(&["A"], "t", None));
        store.save(&chrome, &failure(&["B"], "s", None));

        assert_eq!(names(store.data()), vec!["B", "A"]);
        assert_eq!(names(&store.data()[0].tests), vec!["t", "s"]);
    }

    #[test]
    fn depths_follow_nesting() {
        let mut store = ResultStore::default();
        let stored = store
            .save(&browser("Chrome"), &failure(&["A", "B", "C"], "t", Some("boom")))
            .unwrap();

        assert_eq!(stored.suite.name, "C");
        assert_eq!(stored.suite.depth, 2);
        assert_eq!(stored.test.depth, 3);
        assert_eq!(stored.browser.depth, 4);

        let a = &store.data()[0];
        assert_eq!((a.name.as_str(), a.depth), ("A", 0));
        assert_eq!((a.suites[0].name.as_str(), a.suites[0].depth), ("B", 1));
    }

    #[test]
    fn log_is_split_into_lines() {
        let mut store = ResultStore::default();
        let stored = store
            .save(
                &browser("Chrome"),
                &failure(&["Math"], "add", Some("AssertionError: 1 !== 2\nActual: 1")),
            )
            .unwrap();
        assert_eq!(stored.browser.errors, vec!["AssertionError: 1 !== 2", "Actual: 1"]);
    }

    #[test]
    fn null_log_keeps_previous_lines() {
        let mut store = ResultStore::default();
        let chrome = browser("Chrome");
        store.save(&chrome, &failure(&["A"], "t", Some("kept")));
        let stored = store.save(&chrome, &failure(&["A"], "t", None)).unwrap();
        assert_eq!(stored.browser.errors, vec!["kept"]);

        let mut no_log = failure(&["A"], "t", None);
        no_log.log.clear();
        let stored = store.save(&chrome, &no_log).unwrap();
        assert_eq!(stored.browser.errors, vec!["kept"]);
    }

    #[test]
    fn padded_names_match_their_trimmed_node() {
        let mut store = ResultStore::default();
        let chrome = browser("Chrome");
        store.save(&chrome, &failure(&[" A "], " t", None));
        store.save(&chrome, &failure(&["A"], "t ", None));

        assert_eq!(store.data().len(), 1);
        assert_eq!(store.data()[0].tests.len(), 1);
    }
}
