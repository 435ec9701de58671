//! The command pipeline.
//!
//! [`CommandHandler::handle`] classifies a single chat message and, when it is addressed to the
//! bot, produces exactly one [`Reply`]. Every failure is terminal for the message and reported
//! to the user; nothing is retried.

use crate::command::{self, Address, BotIdentity, Command, CommandError, IncomingMessage};
use crate::reply::{Field, Outcome, Reply};
use crate::resolver::{self, rcode, DynResolver};
use std::time::Instant;

#[derive(Clone)]
pub struct CommandHandler {
    identity: BotIdentity,
    address: Address,
    syntax: String,
    url: Option<String>,
    resolver: DynResolver,
}

impl CommandHandler {
    pub fn new(identity: BotIdentity, prefix: Option<String>, resolver: DynResolver) -> Self {
        let syntax = command::syntax(&identity, prefix.as_deref());
        let address = Address::new(&identity, prefix);
        CommandHandler {
            identity,
            address,
            syntax,
            url: None,
            resolver,
        }
    }

    /// Link every reply to `url`.
    #[must_use]
    pub fn with_url(mut self, url: Option<String>) -> Self {
        self.url = url;
        self
    }

    pub fn identity(&self) -> &BotIdentity {
        &self.identity
    }

    pub fn syntax(&self) -> &str {
        &self.syntax
    }

    /// Returns the reply for `message`, or `None` when the message isn't addressed to the bot.
    pub async fn handle(&self, message: &IncomingMessage) -> Option<Reply> {
        if message.author_id == self.identity.id {
            return None;
        }
        if !self.address.matches(&message.content) {
            return None;
        }
        let outcome = self.dispatch(&message.content).await;
        let reply = Reply::render(outcome, &self.identity.name, &self.syntax);
        Some(reply.with_url(self.url.clone()))
    }

    async fn dispatch(&self, content: &str) -> Outcome {
        let params = command::split_params(content);
        let [record_type, domain] = params.as_slice() else {
            tracing::debug!("rejected command with {} parameters", params.len());
            return Outcome::Syntax;
        };
        match Command::parse(record_type, domain) {
            Ok(command) => self.resolve(&command).await,
            Err(err) => {
                tracing::debug!("rejected command: {err}");
                Outcome::Failed(vec![invalid_command_field(&err)])
            }
        }
    }

    async fn resolve(&self, command: &Command) -> Outcome {
        let query = resolver::build_query(command.name.clone(), command.record_type);
        let started = Instant::now();
        let result = self.resolver.exchange(query).await;
        let elapsed = started.elapsed();

        let response = match result {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!("could not execute DNS request for \"{}\": {err}", command.name);
                return Outcome::Failed(vec![Field::quoted(
                    "Unknown error while executing the DNS request",
                    err.to_string(),
                )]);
            }
        };

        if let Some(message) = rcode::describe(response.response_code()) {
            return Outcome::Failed(vec![Field::new(
                "DNS server returned an error response code",
                message,
                true,
            )]);
        }

        if response.answers().is_empty() {
            return Outcome::Failed(vec![Field::quoted(
                "Could not find DNS entry for question type",
                command.record_type_token.to_uppercase(),
            )]);
        }

        tracing::debug!(
            "resolved {} {} with {} answers in {elapsed:?}",
            command.record_type,
            command.name,
            response.answers().len()
        );
        let fields = response
            .answers()
            .iter()
            .map(|answer| Field::new(&command.domain, resolver::render_answer(answer), false))
            .collect();
        Outcome::Answered { fields, elapsed }
    }
}

fn invalid_command_field(err: &CommandError) -> Field {
    match err {
        CommandError::InvalidRecordType(token) => Field::quoted("Invalid DNS record type", token),
        CommandError::InvalidDomain(domain) => Field::quoted("Invalid domain name", domain),
        CommandError::EncodeDomain { source, .. } => {
            Field::quoted("Could not encode domain name", source.to_string())
        }
    }
}
