use super::canonicalize::Canonicalizer;
use super::styles::{Role, Styles};

const TAB: usize = 3;

/// Leading whitespace for a node at `depth`.
pub fn indent(depth: usize) -> String {
    " ".repeat(depth * TAB + 1)
}

/// Everything a node needs to draw itself. The failure counter belongs to the
/// current run, so numbering continues across every node drawn in it.
pub struct RenderContext<'a> {
    styles: &'a Styles,
    canonicalizer: &'a Canonicalizer,
    failures: &'a mut usize,
}

impl<'a> RenderContext<'a> {
    pub fn new(
        styles: &'a Styles,
        canonicalizer: &'a Canonicalizer,
        failures: &'a mut usize,
    ) -> Self {
        Self {
            styles,
            canonicalizer,
            failures,
        }
    }

    pub fn paint(&self, role: Role, text: &str) -> String {
        self.styles.paint(role, text)
    }

    /// See [`Canonicalizer::format`].
    pub fn format_frame(&self, line: &str) -> String {
        self.canonicalizer.format(line, self.styles)
    }

    pub fn next_failure_number(&mut self) -> usize {
        *self.failures += 1;
        *self.failures
    }
}
