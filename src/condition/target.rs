use std::fmt;

/// The two navigation buttons a page can gate with its own rule-group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NavButton {
    Next,
    Submit,
}

impl fmt::Display for NavButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavButton::Next => write!(f, "next"),
            NavButton::Submit => write!(f, "submit"),
        }
    }
}

/// Owner of a rule-group: a field, a whole page, or one of a page's buttons.
///
/// Pages are addressed by their position in the form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Target {
    Field(String),
    Page(usize),
    Button { page: usize, button: NavButton },
}

impl Target {
    pub fn field(id: impl Into<String>) -> Self {
        Target::Field(id.into())
    }

    pub fn next_button(page: usize) -> Self {
        Target::Button {
            page,
            button: NavButton::Next,
        }
    }

    pub fn submit_button(page: usize) -> Self {
        Target::Button {
            page,
            button: NavButton::Submit,
        }
    }

    /// Page and button rule-groups may only reference earlier pages.
    pub fn is_page_level(&self) -> bool {
        !matches!(self, Target::Field(_))
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Field(id) => write!(f, "field '{}'", id),
            Target::Page(index) => write!(f, "page {}", index),
            Target::Button { page, button } => write!(f, "{} button of page {}", button, page),
        }
    }
}
