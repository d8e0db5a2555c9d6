//! Cleanup of failure messages and stack frames.
//!
//! Frames served by the host carry absolute URLs and cache-busting query
//! strings, e.g. `http://localhost:9876/base/src/foo.js?abcd1234:12:3`. The
//! helpers here reduce those to `src/foo.js:12:3`, decide whether a frame
//! belongs to the project or to a dependency, and pick its highlight.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use super::styles::{Role, Styles};

static QUERY_BEFORE_COLON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\?.+?:").expect("regex is valid"));
static QUERY_BEFORE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\?.+( \(line \d+\))").expect("regex is valid"));

static ORIGIN_IN_PARENS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r" \(\w+://[^:]+:\d+/base/([^)]+)\)$").expect("regex is valid")
});
static ORIGIN_AFTER_IN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r" in \w+://[^:]+:\d+/base/([^)]+\))$").expect("regex is valid")
});
static ORIGIN_BARE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\w+://[^:]+:\d+/base/([^:]+:\d+:\d+)").expect("regex is valid")
});

static ANONYMOUS_FRAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:at )?<\w+>$").expect("regex is valid"));

const DEPENDENCY_DIR: &str = "node_modules/";

/// Drop `?query` segments that sit in front of a `:line:col` suffix or a
/// trailing `(line N)` marker.
pub fn strip_query(line: &str) -> String {
    let line = QUERY_BEFORE_COLON.replace_all(line, ":");
    QUERY_BEFORE_LINE.replace(&line, "${1}").into_owned()
}

/// Rewrite `scheme://host:port/base/<rest>` file references down to `<rest>`,
/// then strip query strings. Repeats until nothing changes, since removing one
/// origin can expose another.
pub fn strip_origin(line: &str) -> String {
    let mut line = line.to_owned();
    loop {
        // Every rewrite shortens the line, so this terminates.
        let next = strip_origin_once(&line);
        if next == line {
            return line;
        }
        line = next;
    }
}

fn strip_origin_once(line: &str) -> String {
    let line = ORIGIN_IN_PARENS.replace(line, " (${1})");
    let line = ORIGIN_AFTER_IN.replace(&line, " in ${1}");
    let line = ORIGIN_BARE.replace_all(&line, "${1}");
    strip_query(&line)
}

/// Whether a frame points into a dependency or an anonymous runtime frame.
pub fn is_external_frame(line: &str) -> bool {
    line.contains(DEPENDENCY_DIR) || ANONYMOUS_FRAME.is_match(line)
}

fn default_formatter(line: &str) -> String {
    strip_query(line).trim().to_owned()
}

pub type Formatter = Box<dyn Fn(&str) -> String + Send + Sync>;

/// Formatting pipeline for everything below a failure's headline.
pub struct Canonicalizer {
    formatter: Formatter,
    highlighting: bool,
    external_frames: bool,
}

impl Default for Canonicalizer {
    fn default() -> Self {
        Self {
            formatter: Box::new(default_formatter),
            highlighting: true,
            external_frames: true,
        }
    }
}

impl fmt::Debug for Canonicalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Canonicalizer")
            .field("highlighting", &self.highlighting)
            .field("external_frames", &self.external_frames)
            .finish_non_exhaustive()
    }
}

impl Canonicalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the first stage of the pipeline.
    pub fn set_formatter(&mut self, formatter: impl Fn(&str) -> String + Send + Sync + 'static) {
        self.formatter = Box::new(formatter);
    }

    pub fn suppress_highlighting(&mut self) {
        self.highlighting = false;
    }

    pub fn omit_external_frames(&mut self) {
        self.external_frames = false;
    }

    /// Canonicalize and style one line. An empty result means the line must
    /// not be printed at all.
    pub fn format(&self, line: &str, styles: &Styles) -> String {
        let line = (self.formatter)(line);
        let line = line.trim();
        if line.is_empty() {
            return String::new();
        }

        let internal = !is_external_frame(line);
        if !internal && !self.external_frames {
            return String::new();
        }
        if internal && self.highlighting {
            styles.paint(Role::InternalFrame, line)
        } else {
            styles.paint(Role::ExternalFrame, line)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case(
        "http://localhost:9876/base/src/foo.js?abcd1234:12:3",
        "src/foo.js:12:3"
        ; "bare reference"
    )]
    #[test_case(
        "at add (http://localhost:9876/base/src/math.js?5f1e:4:11)",
        "at add (src/math.js:4:11)"
        ; "parenthesized location"
    )]
    #[test_case(
        "Error thrown in http://localhost:9876/base/test/a.spec.js?x=1 (line 7)",
        "Error thrown in test/a.spec.js (line 7)"
        ; "in suffix"
    )]
    #[test_case(
        "http://a:1/base/http://b:2/base/c.js:1:2",
        "c.js:1:2"
        ; "nested origins"
    )]
    #[test_case("src/foo.js:12:3", "src/foo.js:12:3" ; "already clean")]
    #[test_case("expected true to be false", "expected true to be false" ; "no url at all")]
    fn strip_origin_cases(input: &str, expected: &str) {
        assert_eq!(strip_origin(input), expected);
    }

    #[test_case("at f (src/a.js?v=3:1:2)", "at f (src/a.js:1:2)" ; "before line and column")]
    #[test_case("at src/a.js?123 (line 9)", "at src/a.js (line 9)" ; "before line marker")]
    #[test_case("", "" ; "empty")]
    fn strip_query_cases(input: &str, expected: &str) {
        assert_eq!(strip_query(input), expected);
    }

    #[test_case("at node_modules/mocha/index.js:10:3", true ; "dependency path")]
    #[test_case("at <anonymous>", true ; "anonymous frame")]
    #[test_case("<Jasmine>", true ; "bracketed runtime frame")]
    #[test_case("at add (src/math.js:4:11)", false ; "project frame")]
    #[test_case("at <anonymous> in src/math.js", false ; "marker not at end")]
    fn external_frame_cases(line: &str, external: bool) {
        assert_eq!(is_external_frame(line), external);
    }

    #[test]
    fn blank_lines_are_suppressed() {
        let c = Canonicalizer::new();
        assert_eq!(c.format("   ", &Styles::plain()), "");
        assert_eq!(c.format("   ", &Styles::colored()), "");
    }

    #[test]
    fn external_frames_are_omitted_when_asked() {
        let mut c = Canonicalizer::new();
        let line = "at Context.<anonymous> (node_modules/mocha/index.js:1:1)";
        assert_eq!(c.format(line, &Styles::plain()), line);

        c.omit_external_frames();
        assert_eq!(c.format(line, &Styles::plain()), "");
        assert_eq!(c.format("at add (src/math.js:4:11)", &Styles::plain()), "at add (src/math.js:4:11)");
    }

    #[test]
    fn highlight_follows_frame_kind() {
        let styles = Styles::colored();
        let mut c = Canonicalizer::new();
        let internal = "at add (src/math.js:4:11)";
        let external = "at node_modules/mocha/index.js:10:3";

        assert_eq!(c.format(internal, &styles), styles.paint(Role::InternalFrame, internal));
        assert_eq!(c.format(external, &styles), styles.paint(Role::ExternalFrame, external));

        c.suppress_highlighting();
        assert_eq!(c.format(internal, &styles), styles.paint(Role::ExternalFrame, internal));
    }

    #[test]
    fn custom_formatter_runs_first() {
        let mut c = Canonicalizer::new();
        c.set_formatter(|line| strip_origin(line).trim().to_owned());
        assert_eq!(
            c.format("  at f (http://localhost:9876/base/src/a.js?abc:1:2)  ", &Styles::plain()),
            "at f (src/a.js:1:2)"
        );
    }

    #[test]
    fn format_is_idempotent() {
        let mut with_origin = Canonicalizer::new();
        with_origin.set_formatter(|line| strip_origin(line).trim().to_owned());
        let lines = [
            "",
            "   ",
            "AssertionError: expected 1 to equal 2",
            "    at Context.<anonymous> (http://localhost:9876/base/test/a.js?0d1f:3:9)",
            "at http://localhost:9876/base/src/foo.js?abcd1234:12:3",
            "at f (src/a.js?v=3:1:2) at g (src/b.js?w=4:5:6)",
            "at node_modules/chai/chai.js:100:2",
            "at <anonymous>",
            "what? really",
            "at http://a:1/base/http://b:2/base/c.js:1:2",
            "x in http://a:1/base/http://b:2/base/y.js (line 3)",
        ];
        let styles = Styles::plain();
        for c in [Canonicalizer::new(), with_origin] {
            for line in lines {
                let once = c.format(line, &styles);
                assert_eq!(c.format(&once, &styles), once, "input: {line:?}");
            }
        }
    }
}
