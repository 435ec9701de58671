//! Upstream DNS resolution.
//!
//! Commands are answered by a single recursive query to a fixed upstream resolver, by default
//! Cloudflare's `1.1.1.1` over TLS. The [`Resolver`] trait is the seam between the
//! [command handler][crate::handler] and the transport; [`UpstreamResolver`] is the
//! production implementation.

pub mod rcode;
pub mod upstream;

use crate::error::Error;
use std::sync::Arc;
use trust_dns_proto::op::{Message, MessageType, OpCode, Query};
use trust_dns_proto::rr::{Name, RData, Record, RecordType};

#[allow(clippy::module_name_repetitions)]
pub use upstream::UpstreamResolver;

/// `DynResolver` is a type alias for a [`Resolver`] shared by concurrent message handlers.
#[allow(clippy::module_name_repetitions)]
pub type DynResolver = Arc<dyn Resolver + Send + Sync>;

pub const UNPARSABLE_ANSWER: &str = "unparsable answer type";

#[async_trait::async_trait]
pub trait Resolver {
    /// Send `query` upstream and return the response message.
    async fn exchange(&self, query: Message) -> Result<Message, Error>;
}

/// A recursive, class `IN` query with a single question.
pub fn build_query(name: Name, record_type: RecordType) -> Message {
    let mut message = Message::new();
    message
        .add_query(Query::query(name, record_type))
        .set_message_type(MessageType::Query)
        .set_op_code(OpCode::Query)
        .set_recursion_desired(true);
    message
}

/// Render an answer record as `TYPE - `value``.
pub fn render_answer(record: &Record) -> String {
    match record.data() {
        Some(RData::A(ip)) => format!("A - `{ip}`"),
        Some(RData::AAAA(ip)) => format!("AAAA - `{ip}`"),
        Some(RData::CNAME(target)) => format!("CNAME - `{target}`"),
        _ => {
            tracing::warn!(
                "could not render {} answer for \"{}\"",
                record.record_type(),
                record.name()
            );
            UNPARSABLE_ANSWER.to_string()
        }
    }
}
