use crate::report::canonicalize::strip_origin;
use crate::report::render::{RenderContext, indent};
use crate::report::styles::Role;

/// A node found by name among its siblings.
pub trait Named {
    fn new(name: &str) -> Self;
    fn name(&self) -> &str;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Suite {
    pub name: String,
    /// 0 for a top-level suite.
    pub depth: usize,
    pub suites: Vec<Suite>,
    pub tests: Vec<Test>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Test {
    pub name: String,
    pub depth: usize,
    pub browsers: Vec<BrowserResult>,
}

/// The failure output of one test in one browser.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrowserResult {
    pub name: String,
    pub depth: usize,
    /// Raw failure lines; the first is the headline.
    pub errors: Vec<String>,
}

impl Named for Suite {
    fn new(name: &str) -> Self {
        Self {
            name: name.trim().to_owned(),
            ..Self::default()
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for Test {
    fn new(name: &str) -> Self {
        Self {
            name: name.trim().to_owned(),
            ..Self::default()
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for BrowserResult {
    fn new(name: &str) -> Self {
        Self {
            name: name.trim().to_owned(),
            ..Self::default()
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Suite {
    /// Draw this suite, its tests, then its nested suites, each followed by a
    /// blank line. The block ends with two more blank lines.
    pub fn render(&self, cx: &mut RenderContext<'_>) -> String {
        let role = if self.depth == 0 {
            Role::RootSuite
        } else {
            Role::Suite
        };
        let mut out = vec![format!("{}{}", indent(self.depth), cx.paint(role, &self.name))];

        for test in &self.tests {
            out.push(test.render(cx).trim_end().to_owned());
            out.push(String::new());
        }
        for suite in &self.suites {
            out.push(suite.render(cx).trim_end().to_owned());
            out.push(String::new());
        }

        out.push(String::new());
        out.push(String::new());
        out.join("\n")
    }
}

impl Test {
    pub fn render(&self, cx: &mut RenderContext<'_>) -> String {
        let mut out = vec![format!(
            "{}{}",
            indent(self.depth),
            cx.paint(Role::Test, &self.name)
        )];
        for browser in &self.browsers {
            out.push(browser.render(cx).trim_end().to_owned());
        }
        out.join("\n")
    }
}

impl BrowserResult {
    /// Draw the browser name and its failure. The headline is numbered from
    /// the run-wide counter; an `Actual:` line right after it is aligned
    /// under the headline text; every further line goes through the frame
    /// formatter and is dropped if that empties it.
    pub fn render(&self, cx: &mut RenderContext<'_>) -> String {
        let mut out = vec![format!(
            "{}{}",
            indent(self.depth),
            cx.paint(Role::Browser, &self.name)
        )];
        let mut number = 0;

        for (i, error) in self.errors.iter().enumerate() {
            let error = error.trim();
            if i == 0 {
                number = cx.next_failure_number();
                out.push(format!(
                    "{}{number}) {}",
                    indent(self.depth + 1),
                    cx.paint(Role::ErrorHeadline, &strip_origin(error))
                ));
            } else if i == 1 && is_actual_line(error) {
                let pad = " ".repeat(number.to_string().len());
                out.push(format!("{}{pad}  {error}", indent(self.depth + 1)));
            } else {
                let line = cx.format_frame(error);
                if !line.is_empty() {
                    out.push(format!("{}{line}", indent(self.depth + 2)));
                }
            }
        }

        out.join("\n")
    }

    /// Draw this failure on its own, headed by its suite and test names, for
    /// printing while the run is still going.
    pub fn render_standalone(&self, suite: &Suite, test: &Test, cx: &RenderContext<'_>) -> String {
        let mut out = vec![
            cx.paint(Role::Suite, &suite.name),
            format!("{}{}", indent(1), cx.paint(Role::Test, &test.name)),
            format!("{}{}", indent(2), cx.paint(Role::Browser, &self.name)),
        ];

        for (i, error) in self.errors.iter().enumerate() {
            let error = error.trim();
            if i == 0 {
                out.push(format!(
                    "{}{}",
                    indent(3),
                    cx.paint(Role::ErrorHeadline, &strip_origin(error))
                ));
            } else if i == 1 && is_actual_line(error) {
                out.push(format!("{}{error}", indent(3)));
            } else {
                let line = cx.format_frame(error);
                if !line.is_empty() {
                    out.push(format!("{}{line}", indent(4)));
                }
            }
        }

        out.join("\n")
    }
}

fn is_actual_line(line: &str) -> bool {
    line.starts_with("Actual:")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::canonicalize::Canonicalizer;
    use crate::report::styles::Styles;
    use pretty_assertions::assert_eq;

    fn browser_result(depth: usize, errors: &[&str]) -> BrowserResult {
        BrowserResult {
            name: "Chrome".into(),
            depth,
            errors: errors.iter().map(|e| e.to_string()).collect(),
        }
    }

    #[test]
    fn names_are_trimmed() {
        assert_eq!(Suite::new("  Math ").name, "Math");
        assert_eq!(Test::new("\tadds\n").name, "adds");
        assert_eq!(BrowserResult::new(" Chrome ").name, "Chrome");
    }

    #[test]
    fn headline_is_numbered_and_actual_is_aligned() {
        let styles = Styles::plain();
        let canonicalizer = Canonicalizer::new();
        let mut failures = 0;
        let mut cx = RenderContext::new(&styles, &canonicalizer, &mut failures);

        let rendered = browser_result(2, &["AssertionError: 1 !== 2", "Actual: 1"]).render(&mut cx);
        assert_eq!(
            rendered,
            "       Chrome\n          1) AssertionError: 1 !== 2\n             Actual: 1"
        );
    }

    #[test]
    fn numbering_continues_across_nodes() {
        let styles = Styles::plain();
        let canonicalizer = Canonicalizer::new();
        let mut failures = 9;
        let mut cx = RenderContext::new(&styles, &canonicalizer, &mut failures);

        let rendered = browser_result(0, &["boom", "Actual: x"]).render(&mut cx);
        assert_eq!(rendered, " Chrome\n    10) boom\n        Actual: x");
        assert_eq!(failures, 10);
    }

    #[test]
    fn actual_only_counts_on_the_second_line() {
        let styles = Styles::plain();
        let canonicalizer = Canonicalizer::new();
        let mut failures = 0;
        let mut cx = RenderContext::new(&styles, &canonicalizer, &mut failures);

        let rendered = browser_result(0, &["boom", "at f (src/a.js:1:1)", "Actual: 2"]).render(&mut cx);
        assert_eq!(
            rendered,
            " Chrome\n    1) boom\n       at f (src/a.js:1:1)\n       Actual: 2"
        );
    }

    #[test]
    fn suppressed_frames_leave_no_gap() {
        let styles = Styles::plain();
        let mut canonicalizer = Canonicalizer::new();
        canonicalizer.omit_external_frames();
        let mut failures = 0;
        let mut cx = RenderContext::new(&styles, &canonicalizer, &mut failures);

        let rendered = browser_result(
            0,
            &[
                "Error: nope",
                "at node_modules/mocha/index.js:1:1",
                "   ",
                "at go (src/go.js?abc:2:3)",
            ],
        )
        .render(&mut cx);
        assert_eq!(rendered, " Chrome\n    1) Error: nope\n       at go (src/go.js:2:3)");
    }

    #[test]
    fn headline_is_stripped_of_origin() {
        let styles = Styles::plain();
        let canonicalizer = Canonicalizer::new();
        let mut failures = 0;
        let mut cx = RenderContext::new(&styles, &canonicalizer, &mut failures);

        let rendered =
            browser_result(0, &["Error at http://localhost:9876/base/src/a.js?f00:3:4"]).render(&mut cx);
        assert_eq!(rendered, " Chrome\n    1) Error at src/a.js:3:4");
    }

    #[test]
    fn suite_renders_tests_before_nested_suites() {
        let styles = Styles::plain();
        let canonicalizer = Canonicalizer::new();
        let mut failures = 0;
        let mut cx = RenderContext::new(&styles, &canonicalizer, &mut failures);

        let suite = Suite {
            name: "Outer".into(),
            depth: 0,
            suites: vec![Suite {
                name: "Inner".into(),
                depth: 1,
                suites: vec![],
                tests: vec![Test {
                    name: "deep".into(),
                    depth: 2,
                    browsers: vec![browser_result(3, &["second"])],
                }],
            }],
            tests: vec![Test {
                name: "shallow".into(),
                depth: 1,
                browsers: vec![browser_result(2, &["first"])],
            }],
        };

        let expected = [
            " Outer",
            "    shallow",
            "       Chrome",
            "          1) first",
            "",
            "    Inner",
            "       deep",
            "          Chrome",
            "             2) second",
            "",
            "",
            "",
        ]
        .join("\n");
        assert_eq!(suite.render(&mut cx), expected);
    }

    #[test]
    fn standalone_has_its_own_header() {
        let styles = Styles::plain();
        let canonicalizer = Canonicalizer::new();
        let mut failures = 0;
        let cx = RenderContext::new(&styles, &canonicalizer, &mut failures);

        let suite = Suite::new("Math");
        let test = Test::new("add");
        let rendered = browser_result(2, &["AssertionError: 1 !== 2", "Actual: 1", "at add (src/m.js:1:1)"])
            .render_standalone(&suite, &test, &cx);
        assert_eq!(
            rendered,
            [
                "Math",
                "    add",
                "       Chrome",
                "          AssertionError: 1 !== 2",
                "          Actual: 1",
                "             at add (src/m.js:1:1)",
            ]
            .join("\n")
        );
        assert_eq!(failures, 0);
    }
}
