use mentor_actors::actor::Addr;
use mentor_actors::search::SearchActor;
use mentor_actors::SearchCmd;
use mentor_stream::{CumulativeStream, Transport};

/// Routes the web-search panel through the search actor.
///
/// The proxy answers in one shot, so the "stream" is a single cumulative
/// snapshot followed by close; the reveal presenter still animates it.
pub struct SearchTransport {
    search: Addr<SearchActor>,
}

impl SearchTransport {
    pub fn new(search: Addr<SearchActor>) -> Self {
        Self { search }
    }
}

impl Transport for SearchTransport {
    fn open(&self, prompt: &str, _system: Option<&str>) -> CumulativeStream {
        let addr = self.search.clone();
        let query = prompt.to_string();
        Box::pin(async_stream::try_stream! {
            let (tx, rx) = tokio::sync::oneshot::channel();
            addr.send(SearchCmd { query, reply: tx })
                .await
                .map_err(|_| anyhow::anyhow!("search mailbox dropped"))?;
            let result = rx
                .await
                .map_err(|_| anyhow::anyhow!("search reply dropped"))??;
            yield result;
        })
    }
}
