use crate::config::{Transport, UpstreamConfig};
use crate::error::Error;
use crate::resolver::Resolver;
use rustls::{ClientConfig, OwnedTrustAnchor, RootCertStore};
use std::sync::Arc;
use tokio::net::{TcpStream, UdpSocket};
use trust_dns_client::client::AsyncClient;
use trust_dns_client::tcp::TcpClientStream;
use trust_dns_client::udp::UdpClientStream;
use trust_dns_proto::error::{ProtoError, ProtoErrorKind};
use trust_dns_proto::iocompat::AsyncIoTokioAsStd;
use trust_dns_proto::op::Message;
use trust_dns_proto::rustls::tls_client_connect;
use trust_dns_proto::xfer::{DnsHandle, DnsRequest, DnsRequestOptions, FirstAnswer};

/// Queries a fixed upstream resolver over UDP, TCP or DNS-over-TLS.
///
/// A fresh connection is made for every exchange and nothing is retried. The configured timeout
/// bounds the whole exchange, including connection setup and the TLS handshake.
#[derive(Clone)]
pub struct UpstreamResolver {
    config: UpstreamConfig,
    tls_config: Arc<ClientConfig>,
}

impl UpstreamResolver {
    pub fn new(config: UpstreamConfig) -> Self {
        UpstreamResolver {
            config,
            tls_config: Arc::new(Self::tls_config()),
        }
    }

    fn tls_config() -> ClientConfig {
        let mut root_store = RootCertStore::empty();
        root_store.add_server_trust_anchors(webpki_roots::TLS_SERVER_ROOTS.0.iter().map(|ta| {
            OwnedTrustAnchor::from_subject_spki_name_constraints(
                ta.subject,
                ta.spki,
                ta.name_constraints,
            )
        }));
        ClientConfig::builder()
            .with_safe_defaults()
            .with_root_certificates(root_store)
            .with_no_client_auth()
    }

    async fn connect(&self) -> Result<AsyncClient, Error> {
        let addr = self.config.addr;
        let timeout = self.config.timeout;
        let client = match self.config.transport {
            Transport::Udp => {
                let stream = UdpClientStream::<UdpSocket>::with_timeout(addr, timeout);
                let (client, background) = AsyncClient::connect(stream).await?;
                tokio::spawn(background);
                client
            }
            Transport::Tcp => {
                let (stream, sender) =
                    TcpClientStream::<AsyncIoTokioAsStd<TcpStream>>::with_timeout(addr, timeout);
                let (client, background) =
                    AsyncClient::with_timeout(stream, sender, timeout, None).await?;
                tokio::spawn(background);
                client
            }
            Transport::Tls => {
                // NB: presence is checked when the config is loaded.
                let tls_name = self.config.tls_name.clone().unwrap_or_default();
                let (stream, sender) = tls_client_connect::<AsyncIoTokioAsStd<TcpStream>>(
                    addr,
                    tls_name,
                    self.tls_config.clone(),
                );
                let (client, background) =
                    AsyncClient::with_timeout(stream, sender, timeout, None).await?;
                tokio::spawn(background);
                client
            }
        };
        Ok(client)
    }

    async fn send(&self, query: Message) -> Result<Message, Error> {
        let mut client = self.connect().await?;
        let response = client
            .send(DnsRequest::new(query, DnsRequestOptions::default()))
            .first_answer()
            .await?;
        Ok(Message::clone(&response))
    }
}

#[async_trait::async_trait]
impl Resolver for UpstreamResolver {
    async fn exchange(&self, query: Message) -> Result<Message, Error> {
        tracing::debug!(
            "querying {} over {:?} for {:?}",
            self.config.addr,
            self.config.transport,
            query.queries()
        );
        match tokio::time::timeout(self.config.timeout, self.send(query)).await {
            Ok(result) => result,
            Err(_) => Err(ProtoError::from(ProtoErrorKind::Timeout).into()),
        }
    }
}
