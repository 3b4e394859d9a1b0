//! Actor front for the web-search proxy client.
//!
//! Serializes queries through one mailbox and replies per command, so
//! the UI never blocks on the proxy. Failures go back on the reply
//! channel instead of stopping the actor.

use crate::actor::{Actor, Context};
use crate::SearchCmd;
use anyhow::Result;
use mentor_search::SearchClient;

pub struct SearchActor {
    client: SearchClient,
}

impl SearchActor {
    pub fn new(client: SearchClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Actor for SearchActor {
    type Msg = SearchCmd;

    async fn handle(&mut self, msg: Self::Msg, _ctx: &mut Context<Self>) -> Result<()> {
        let SearchCmd { query, reply } = msg;
        tracing::info!(query_len = query.len(), "search.cmd");

        let outcome = self
            .client
            .search(&query)
            .await
            .map_err(anyhow::Error::new);
        let _ = reply.send(outcome);
        Ok(())
    }
}
