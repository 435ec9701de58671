//! Background server count reporting.
//!
//! When [`Config::stats`][`crate::config::Config::stats`] is set, a [`StatsReporter`] task
//! periodically counts the guilds the bot is a member of and `POST`s the total to a bot listing
//! site, by default [top.gg](https://top.gg):
//!
//! ```json
//! { "server_count": 1234 }
//! ```
//!
//! Failures are logged and retried on the next interval. The reporter shares only the Discord
//! HTTP client with the rest of the bot.

use crate::config::StatsConfig;
use crate::error::Error;
use reqwest::header::AUTHORIZATION;
use reqwest::StatusCode;
use serde::Serialize;
use serenity::http::{GuildPagination, Http};
use serenity::model::id::GuildId;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;

/// Discord's maximum page size when listing the current user's guilds.
pub const PAGE_SIZE: u64 = 100;

#[allow(clippy::module_name_repetitions)]
pub type DynGuildLister = Arc<dyn GuildLister + Send + Sync>;

/// Paginated listing of the guild IDs the bot is a member of.
#[async_trait::async_trait]
pub trait GuildLister {
    /// List up to `limit` guild IDs, in ascending order, starting after the guild `after`.
    async fn list_guilds(&self, after: Option<u64>, limit: u64) -> Result<Vec<u64>, Error>;
}

#[async_trait::async_trait]
impl GuildLister for Http {
    async fn list_guilds(&self, after: Option<u64>, limit: u64) -> Result<Vec<u64>, Error> {
        let target = after.map(|id| GuildPagination::After(GuildId::new(id)));
        let guilds = self.get_guilds(target, Some(limit)).await?;
        Ok(guilds.iter().map(|guild| guild.id.get()).collect())
    }
}

/// Count every guild, requesting pages until one comes back short. Any failed page fails the
/// whole count.
pub async fn count_guilds(lister: &(dyn GuildLister + Send + Sync)) -> Result<usize, Error> {
    let mut count = 0;
    let mut after = None;
    loop {
        let page = lister.list_guilds(after, PAGE_SIZE).await?;
        count += page.len();
        match page.last() {
            Some(last) if page.len() as u64 >= PAGE_SIZE => after = Some(*last),
            _ => return Ok(count),
        }
    }
}

#[derive(Serialize, Debug)]
struct StatsUpdate {
    server_count: usize,
}

pub struct StatsReporter {
    client: reqwest::Client,
    endpoint: String,
    token: String,
    interval: Duration,
    lister: DynGuildLister,
}

impl StatsReporter {
    pub fn new(config: &StatsConfig, bot_id: u64, lister: DynGuildLister) -> Self {
        StatsReporter {
            client: reqwest::Client::new(),
            endpoint: config.endpoint_for(bot_id),
            token: config.token.clone(),
            interval: config.interval,
            lister,
        }
    }

    /// `POST` the server count to the stats endpoint.
    pub async fn report(&self, server_count: usize) -> Result<(), Error> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(AUTHORIZATION, self.token.as_str())
            .json(&StatsUpdate { server_count })
            .send()
            .await?;
        match response.status() {
            StatusCode::OK => Ok(()),
            status => Err(Error::UnexpectedStatus(status)),
        }
    }

    /// Count guilds and report the total, returning it.
    pub async fn update(&self) -> Result<usize, Error> {
        let count = count_guilds(self.lister.as_ref()).await?;
        self.report(count).await?;
        Ok(count)
    }

    /// Update once per interval until `stop` fires or its sender is dropped.
    pub async fn run(self, mut stop: oneshot::Receiver<()>) {
        tracing::info!("reporting server count to {} every {:?}", self.endpoint, self.interval);
        loop {
            tokio::select! {
                _ = &mut stop => {
                    tracing::debug!("stats reporter stopped");
                    return;
                }
                () = tokio::time::sleep(self.interval) => {
                    match self.update().await {
                        Ok(count) => tracing::debug!("reported server count {count}"),
                        Err(err) => tracing::warn!("could not update server count: {err}"),
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Serves `total` guilds with IDs `1..=total`, failing the page after `fail_after` if set.
    struct StubLister {
        total: u64,
        fail_after: Option<u64>,
        requests: Mutex<Vec<(Option<u64>, u64)>>,
    }

    impl StubLister {
        fn new(total: u64) -> Self {
            StubLister {
                total,
                fail_after: None,
                requests: Mutex::new(vec![]),
            }
        }
    }

    #[async_trait::async_trait]
    impl GuildLister for StubLister {
        async fn list_guilds(&self, after: Option<u64>, limit: u64) -> Result<Vec<u64>, Error> {
            self.requests.lock().unwrap().push((after, limit));
            if self.fail_after.is_some() && self.fail_after == after {
                return Err(Error::InvalidConfig("listing failed".into()));
            }
            let start = after.unwrap_or(0) + 1;
            let end = (start + limit).min(self.total + 1);
            Ok((start..end).collect())
        }
    }

    #[tokio::test]
    async fn counts_single_short_page() {
        let lister = StubLister::new(42);
        assert_eq!(count_guilds(&lister).await.unwrap(), 42);
        assert_eq!(*lister.requests.lock().unwrap(), vec![(None, PAGE_SIZE)]);
    }

    #[tokio::test]
    async fn counts_no_guilds() {
        assert_eq!(count_guilds(&StubLister::new(0)).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn follows_full_pages() {
        let lister = StubLister::new(250);
        assert_eq!(count_guilds(&lister).await.unwrap(), 250);
        assert_eq!(
            *lister.requests.lock().unwrap(),
            vec![(None, 100), (Some(100), 100), (Some(200), 100)]
        );
    }

    #[tokio::test]
    async fn exact_multiple_requests_trailing_empty_page() {
        let lister = StubLister::new(200);
        assert_eq!(count_guilds(&lister).await.unwrap(), 200);
        assert_eq!(lister.requests.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn failed_page_fails_count() {
        let lister = StubLister {
            fail_after: Some(100),
            ..StubLister::new(250)
        };
        assert!(count_guilds(&lister).await.is_err());
    }

    #[tokio::test]
    async fn run_stops_on_signal() {
        let config = StatsConfig {
            token: "token".to_string(),
            interval: Duration::from_secs(3600),
            endpoint: "http://127.0.0.1:9/{id}".to_string(),
        };
        let reporter = StatsReporter::new(&config, 1, Arc::new(StubLister::new(1)));
        let (stop_tx, stop_rx) = oneshot::channel();
        let task = tokio::spawn(reporter.run(stop_rx));
        stop_tx.send(()).unwrap();
        tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .unwrap()
            .unwrap();
    }
}
