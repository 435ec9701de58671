//! DNS Bot
//!
//! A Discord bot that answers DNS questions. Mention the bot with a record type and a domain
//! name and it replies with the records returned by a public recursive resolver:
//!
//! ```text
//! @DNS-Bot A example.com
//! ```
//!
//! Queries go to a single fixed upstream, by default [Cloudflare's 1.1.1.1][1.1.1.1] over
//! [DNS-over-TLS][RFC-7858]. Only `A`, `AAAA` and `CNAME` questions are accepted.
//!
//! [1.1.1.1]: https://1.1.1.1/
//! [RFC-7858]: https://www.rfc-editor.org/rfc/rfc7858
//!
#![warn(clippy::pedantic)]

pub mod command;
pub mod config;
pub mod discord;
pub mod error;
pub mod handler;
pub mod reply;
pub mod resolver;
pub mod stats;

pub use command::{BotIdentity, IncomingMessage};
pub use config::{Config, Shared};
pub use handler::CommandHandler;
pub use reply::{Outcome, Reply};
pub use resolver::{DynResolver, Resolver, UpstreamResolver};
pub use stats::StatsReporter;
