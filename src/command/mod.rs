//! Chat command parsing.
//!
//! A command is addressed to the bot either by mentioning it (`<@id>` or `<@!id>`) or with the
//! configured [`Config::command_prefix`][`crate::config::Config::command_prefix`], followed by
//! exactly two whitespace separated parameters:
//!
//! ```text
//! @DNS-Bot <A|AAAA|CNAME> <domain>
//! ```
//!
//! The record type is matched case-insensitively against a fixed whitelist. The domain may be an
//! internationalized name, in which case it is punycode encoded before being queried.

mod domain;

use lazy_static::lazy_static;
use std::collections::BTreeMap;
use trust_dns_proto::rr::{Name, RecordType};

pub use domain::parse_domain;

/// Number of parameters expected after the address token.
pub const PARAM_COUNT: usize = 2;

lazy_static! {
    /// Record types users may query, keyed by their upper case mnemonic.
    static ref ALLOWED_RECORD_TYPES: BTreeMap<&'static str, RecordType> = BTreeMap::from([
        ("A", RecordType::A),
        ("AAAA", RecordType::AAAA),
        ("CNAME", RecordType::CNAME),
    ]);
}

#[derive(thiserror::Error, Debug)]
pub enum CommandError {
    #[error("invalid DNS record type {0:?}")]
    InvalidRecordType(String),
    #[error("invalid domain name {0:?}")]
    InvalidDomain(String),
    #[error("could not encode domain name {domain:?}: {source}")]
    EncodeDomain {
        domain: String,
        #[source]
        source: idna::Errors,
    },
}

/// The bot's own Discord user, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotIdentity {
    pub id: u64,
    pub name: String,
}

impl BotIdentity {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// A chat message as seen by the [`CommandHandler`][crate::handler::CommandHandler].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    pub author_id: u64,
    pub channel_id: u64,
    pub content: String,
}

/// The tokens a message may start with to address the bot.
#[derive(Debug, Clone)]
pub struct Address {
    mention: String,
    nick_mention: String,
    prefix: Option<String>,
}

impl Address {
    pub fn new(identity: &BotIdentity, prefix: Option<String>) -> Self {
        Address {
            mention: format!("<@{}>", identity.id),
            nick_mention: format!("<@!{}>", identity.id),
            prefix,
        }
    }

    pub fn matches(&self, content: &str) -> bool {
        content.starts_with(&self.mention)
            || content.starts_with(&self.nick_mention)
            || self
                .prefix
                .as_deref()
                .map_or(false, |prefix| content.starts_with(prefix))
    }
}

/// A validated command, ready to be queried.
#[derive(Debug, Clone)]
pub struct Command {
    /// The record type token as the user typed it.
    pub record_type_token: String,
    pub record_type: RecordType,
    /// The domain as the user typed it.
    pub domain: String,
    /// Fully qualified, punycode encoded query name.
    pub name: Name,
}

impl Command {
    pub fn parse(record_type: &str, domain: &str) -> Result<Self, CommandError> {
        let parsed_type = parse_record_type(record_type)?;
        let mut name = parse_domain(domain)?;
        name.set_fqdn(true);
        Ok(Command {
            record_type_token: record_type.to_string(),
            record_type: parsed_type,
            domain: domain.to_string(),
            name,
        })
    }
}

/// Collapses whitespace runs and returns every token after the leading address token.
pub fn split_params(content: &str) -> Vec<&str> {
    content.split_whitespace().skip(1).collect()
}

pub fn parse_record_type(token: &str) -> Result<RecordType, CommandError> {
    ALLOWED_RECORD_TYPES
        .get(token.to_uppercase().as_str())
        .copied()
        .ok_or_else(|| CommandError::InvalidRecordType(token.to_string()))
}

/// Usage hint shown in the footer of every failed reply.
pub fn syntax(identity: &BotIdentity, prefix: Option<&str>) -> String {
    let types = ALLOWED_RECORD_TYPES
        .keys()
        .copied()
        .collect::<Vec<_>>()
        .join("|");
    match prefix {
        Some(prefix) => format!("{prefix} <{types}> <domain>"),
        None => format!("@{} <{types}> <domain>", identity.name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> BotIdentity {
        BotIdentity::new(42, "DNS-Bot")
    }

    #[test]
    fn address_matches_mentions() {
        let address = Address::new(&identity(), None);
        assert!(address.matches("<@42> A example.com"));
        assert!(address.matches("<@!42> A example.com"));
        assert!(!address.matches("<@43> A example.com"));
        assert!(!address.matches("hello <@42>"));
        assert!(!address.matches("!dns A example.com"));
    }

    #[test]
    fn address_matches_prefix() {
        let address = Address::new(&identity(), Some("!dns".to_string()));
        assert!(address.matches("!dns A example.com"));
        assert!(address.matches("<@42> A example.com"));
        assert!(!address.matches("dns A example.com"));
    }

    #[test]
    fn split_params_collapses_whitespace() {
        assert_eq!(
            split_params("<@42>   A \t\n example.com"),
            vec!["A", "example.com"]
        );
        assert_eq!(split_params("<@42>"), Vec::<&str>::new());
        assert_eq!(split_params("<@42> A b c"), vec!["A", "b", "c"]);
    }

    #[test]
    fn record_types_are_case_insensitive() {
        assert_eq!(parse_record_type("A").unwrap(), RecordType::A);
        assert_eq!(parse_record_type("a").unwrap(), RecordType::A);
        assert_eq!(parse_record_type("aAaA").unwrap(), RecordType::AAAA);
        assert_eq!(parse_record_type("cname").unwrap(), RecordType::CNAME);
    }

    #[test]
    fn record_types_outside_whitelist_are_rejected() {
        for token in ["MX", "TXT", "ANY", "", "AA"] {
            match parse_record_type(token) {
                Err(CommandError::InvalidRecordType(t)) => assert_eq!(t, token),
                other => panic!("unexpected result for {token:?}: {other:?}"),
            }
        }
    }

    #[test]
    fn syntax_lists_types_in_order() {
        assert_eq!(
            syntax(&identity(), None),
            "@DNS-Bot <A|AAAA|CNAME> <domain>"
        );
        assert_eq!(
            syntax(&identity(), Some("!dns")),
            "!dns <A|AAAA|CNAME> <domain>"
        );
    }

    #[test]
    fn command_query_name_is_fqdn() {
        let command = Command::parse("aaaa", "Example.com").unwrap();
        assert_eq!(command.record_type, RecordType::AAAA);
        assert_eq!(command.record_type_token, "aaaa");
        assert_eq!(command.domain, "Example.com");
        assert!(command.name.is_fqdn());
        assert_eq!(command.name.to_ascii().to_lowercase(), "example.com.");
    }

    #[test]
    fn command_checks_record_type_first() {
        assert!(matches!(
            Command::parse("MX", "not_a_domain!!"),
            Err(CommandError::InvalidRecordType(_))
        ));
    }
}
