//! Platform independent reply model.
//!
//! Every addressed message is answered with exactly one [`Reply`], rendered from an [`Outcome`]
//! by [`Reply::render`]. Failed outcomes always carry the usage hint as footer.

use std::time::Duration;

/// Maximum length, in characters, of a Discord embed field value.
pub const MAX_FIELD_VALUE_LEN: usize = 1024;
const ELLIPSIS: &str = "...";

pub const SUCCESS_COLOUR: u32 = 5_025_616;
pub const ERROR_COLOUR: u32 = 16_007_990;

pub const BOT_DESCRIPTION: &str = "Resolves A, AAAA and CNAME records over a public DNS \
                                   resolver. Mention me with a record type and a domain name.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl Field {
    /// Creates a field, truncating `value` to [`MAX_FIELD_VALUE_LEN`] characters.
    pub fn new(name: impl Into<String>, value: impl AsRef<str>, inline: bool) -> Self {
        Field {
            name: name.into(),
            value: truncate(value.as_ref()),
            inline,
        }
    }

    /// A field whose value is user input or an error message, shown quoted.
    pub fn quoted(name: impl Into<String>, value: impl AsRef<str>) -> Self {
        Self::new(name, format!("{:?}", value.as_ref()), true)
    }
}

/// Values longer than [`MAX_FIELD_VALUE_LEN`] characters are cut to exactly that length, the
/// last characters replaced by an ellipsis.
pub fn truncate(value: &str) -> String {
    if value.chars().count() <= MAX_FIELD_VALUE_LEN {
        return value.to_string();
    }
    let mut truncated: String = value
        .chars()
        .take(MAX_FIELD_VALUE_LEN - ELLIPSIS.len())
        .collect();
    truncated.push_str(ELLIPSIS);
    truncated
}

/// The result of handling one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The resolver answered with at least one record.
    Answered { fields: Vec<Field>, elapsed: Duration },
    /// Validation, transport or protocol failure.
    Failed(Vec<Field>),
    /// Wrong number of parameters.
    Syntax,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub title: String,
    pub colour: u32,
    pub description: Option<String>,
    /// Where to read more about the upstream resolver.
    pub url: Option<String>,
    pub fields: Vec<Field>,
    pub footer: String,
}

impl Reply {
    pub fn render(outcome: Outcome, title: &str, syntax: &str) -> Self {
        match outcome {
            Outcome::Answered { fields, elapsed } => Reply {
                title: title.to_string(),
                colour: SUCCESS_COLOUR,
                description: None,
                url: None,
                fields,
                footer: format!("Got answer in {elapsed:?}."),
            },
            Outcome::Failed(fields) => Reply {
                title: title.to_string(),
                colour: ERROR_COLOUR,
                description: None,
                url: None,
                fields,
                footer: syntax.to_string(),
            },
            Outcome::Syntax => Reply {
                title: title.to_string(),
                colour: ERROR_COLOUR,
                description: Some(BOT_DESCRIPTION.to_string()),
                url: None,
                fields: vec![],
                footer: syntax.to_string(),
            },
        }
    }

    #[must_use]
    pub fn with_url(mut self, url: Option<String>) -> Self {
        self.url = url;
        self
    }

    pub fn is_success(&self) -> bool {
        self.colour == SUCCESS_COLOUR
    }
}
