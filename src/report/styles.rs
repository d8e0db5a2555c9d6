use crossterm::style::{Attribute, Attributes, Color, ContentStyle};

/// What a piece of output means, independent of how it is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// A top-level suite name.
    RootSuite,
    Suite,
    Test,
    Browser,
    /// The first line of a failure, usually the assertion message.
    ErrorHeadline,
    /// A stack frame in the project under test.
    InternalFrame,
    /// A stack frame in a dependency or the runtime.
    ExternalFrame,
    Pending,
    Passed,
    Failed,
    Skipped,
    BrowserLabel,
    LogMessage,
    Heading,
}

/// Styling strategy, picked once from the terminal's capabilities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Styles {
    is_colorized: bool,
}

impl Styles {
    /// Pass text through untouched.
    pub fn plain() -> Self {
        Self {
            is_colorized: false,
        }
    }

    pub fn colored() -> Self {
        Self { is_colorized: true }
    }

    pub fn for_terminal(is_tty: bool) -> Self {
        if is_tty { Self::colored() } else { Self::plain() }
    }

    #[cfg(test)]
    pub fn is_colorized(&self) -> bool {
        self.is_colorized
    }

    pub fn paint(&self, role: Role, text: &str) -> String {
        if !self.is_colorized {
            return text.to_owned();
        }
        style_for(role).apply(text).to_string()
    }
}

fn style_for(role: Role) -> ContentStyle {
    match role {
        Role::RootSuite => styled(Some(Color::Grey), None, Attribute::Underlined.into()),
        Role::Suite => fg(Color::Grey),
        Role::Test | Role::Failed | Role::Heading => fg(Color::DarkRed),
        Role::Browser | Role::Pending => fg(Color::DarkYellow),
        Role::ErrorHeadline => fg(Color::Red),
        Role::InternalFrame => styled(
            Some(Color::Black),
            Some(Color::DarkRed),
            Attributes::default(),
        ),
        Role::ExternalFrame | Role::BrowserLabel => fg(Color::DarkGrey),
        Role::Passed => fg(Color::DarkGreen),
        Role::Skipped | Role::LogMessage => fg(Color::DarkCyan),
    }
}

fn fg(color: Color) -> ContentStyle {
    styled(Some(color), None, Attributes::default())
}

fn styled(fg: Option<Color>, bg: Option<Color>, attributes: Attributes) -> ContentStyle {
    let mut style = ContentStyle::new();
    style.foreground_color = fg;
    style.background_color = bg;
    style.attributes = attributes;
    style
}
