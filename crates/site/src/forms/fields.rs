//! Form input descriptions for dashboard templates.
//!
//! Records describe their form as a list of [`FieldView`]s; the shared form
//! template renders each one by its `kind`.

/// One form input, pre-filled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldView {
    pub name: &'static str,
    pub label: &'static str,
    /// Input flavour: `text`, `textarea`, `markdown`, `number`, `checkbox`,
    /// `select`, `url`, `image`, `email`, `json`, `lines` or `tags`.
    pub kind: &'static str,
    pub value: String,
    pub checked: bool,
    pub required: bool,
    pub help: Option<&'static str>,
    pub options: Vec<SelectOption>,
    /// Inline error from the last submission.
    pub error: Option<String>,
}

/// Option of a select input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl SelectOption {
    #[must_use]
    pub fn new(value: impl Into<String>, label: impl Into<String>, selected: bool) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            selected,
        }
    }
}

impl FieldView {
    fn of(kind: &'static str, name: &'static str, label: &'static str, value: String) -> Self {
        Self {
            name,
            label,
            kind,
            value,
            checked: false,
            required: false,
            help: None,
            options: Vec::new(),
            error: None,
        }
    }

    #[must_use]
    pub fn text(name: &'static str, label: &'static str, value: impl Into<String>) -> Self {
        Self::of("text", name, label, value.into())
    }

    #[must_use]
    pub fn textarea(name: &'static str, label: &'static str, value: impl Into<String>) -> Self {
        Self::of("textarea", name, label, value.into())
    }

    /// A textarea whose content is rendered as markdown.
    #[must_use]
    pub fn markdown(name: &'static str, label: &'static str, value: impl Into<String>) -> Self {
        Self::of("markdown", name, label, value.into()).help("Markdown is supported.")
    }

    #[must_use]
    pub fn url(name: &'static str, label: &'static str, value: impl Into<String>) -> Self {
        Self::of("url", name, label, value.into())
    }

    /// A URL input with an upload button next to it.
    #[must_use]
    pub fn image(name: &'static str, label: &'static str, value: impl Into<String>) -> Self {
        Self::of("image", name, label, value.into())
    }

    #[must_use]
    pub fn email(name: &'static str, label: &'static str, value: impl Into<String>) -> Self {
        Self::of("email", name, label, value.into())
    }

    #[must_use]
    pub fn number(name: &'static str, label: &'static str, value: impl ToString) -> Self {
        Self::of("number", name, label, value.to_string())
    }

    #[must_use]
    pub fn checkbox(name: &'static str, label: &'static str, checked: bool) -> Self {
        Self {
            checked,
            ..Self::of("checkbox", name, label, String::new())
        }
    }

    #[must_use]
    pub fn select(name: &'static str, label: &'static str, options: Vec<SelectOption>) -> Self {
        let value = options
            .iter()
            .find(|o| o.selected)
            .map(|o| o.value.clone())
            .unwrap_or_default();
        Self {
            options,
            ..Self::of("select", name, label, value)
        }
    }

    /// Free-text JSON, pretty-printed.
    #[must_use]
    pub fn json<T: serde::Serialize>(name: &'static str, label: &'static str, value: &T) -> Self {
        let value = serde_json::to_string_pretty(value).unwrap_or_default();
        Self::of("json", name, label, value)
    }

    /// One entry per line.
    #[must_use]
    pub fn lines(name: &'static str, label: &'static str, values: &[String]) -> Self {
        Self::of("lines", name, label, values.join("\n")).help("One per line.")
    }

    #[must_use]
    pub fn tags(name: &'static str, label: &'static str, values: &[String]) -> Self {
        Self::of("tags", name, label, values.join(", ")).help("Separate with commas.")
    }

    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub const fn help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }

    /// Whether the input is multi-line.
    #[must_use]
    pub fn is_multiline(&self) -> bool {
        matches!(self.kind, "textarea" | "markdown" | "json" | "lines")
    }
}

/// Attach submission errors to their inputs.
#[must_use]
pub fn with_errors(mut fields: Vec<FieldView>, errors: &super::FormErrors) -> Vec<FieldView> {
    for field in &mut fields {
        field.error = errors.for_field(field.name);
    }
    fields
}
