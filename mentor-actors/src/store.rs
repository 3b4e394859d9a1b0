//! Saved-session persistence over the key-value store.
//!
//! Records live under `session:<uuid>` as JSON; listing scans the prefix
//! and sorts newest-first. The store is last-write-wins by contract, so
//! the actor does no locking beyond its own mailbox serialization.

use crate::actor::{Actor, Context};
use crate::{SavedSession, StoreMsg};
use anyhow::{anyhow, Result};
use mentor_common::kv::KvStore;
use std::sync::Arc;
use uuid::Uuid;

const SESSION_PREFIX: &str = "session:";

pub struct StoreActor {
    kv: Arc<dyn KvStore>,
}

impl StoreActor {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }

    fn key(id: &Uuid) -> String {
        format!("{SESSION_PREFIX}{id}")
    }

    fn save(&self, record: &SavedSession) -> Result<()> {
        let value = serde_json::to_string(record)?;
        self.kv.set(&Self::key(&record.id), &value)?;
        Ok(())
    }

    fn get(&self, id: &Uuid) -> Result<SavedSession> {
        let raw = self
            .kv
            .get(&Self::key(id))?
            .ok_or_else(|| anyhow!("no saved session {id}"))?;
        Ok(serde_json::from_str(&raw)?)
    }

    fn list(&self, panel: Option<&str>, limit: usize) -> Result<Vec<SavedSession>> {
        let mut records = Vec::new();
        for key in self.kv.keys(SESSION_PREFIX)? {
            let Some(raw) = self.kv.get(&key)? else {
                continue;
            };
            match serde_json::from_str::<SavedSession>(&raw) {
                Ok(record) => {
                    if panel.map_or(true, |p| record.panel == p) {
                        records.push(record);
                    }
                }
                Err(e) => {
                    // A corrupt record must not hide the rest.
                    tracing::warn!(key, error = %e, "store.list.skipping_corrupt_record");
                }
            }
        }
        records.sort_by(|a, b| b.saved_at.cmp(&a.saved_at));
        records.truncate(limit);
        Ok(records)
    }
}

#[async_trait::async_trait]
impl Actor for StoreActor {
    type Msg = StoreMsg;

    async fn handle(&mut self, msg: Self::Msg, _ctx: &mut Context<Self>) -> Result<()> {
        match msg {
            StoreMsg::SaveSession { record, reply } => {
                tracing::debug!(id = %record.id, panel = %record.panel, "store.save");
                let _ = reply.send(self.save(&record));
            }
            StoreMsg::ListSessions {
                panel,
                limit,
                reply,
            } => {
                let _ = reply.send(self.list(panel.as_deref(), limit));
            }
            StoreMsg::GetSession { id, reply } => {
                let _ = reply.send(self.get(&id));
            }
            StoreMsg::DeleteSession { id, reply } => {
                let _ = reply.send(self.kv.remove(&Self::key(&id)).map_err(Into::into));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::spawn_actor;
    use chrono::{TimeZone, Utc};
    use mentor_common::kv::MemoryKv;
    use tokio::sync::oneshot;

    fn record(panel: &str, hour: u32) -> SavedSession {
        SavedSession {
            id: Uuid::new_v4(),
            panel: panel.to_string(),
            input: "input".into(),
            content: "content".into(),
            saved_at: Utc.with_ymd_and_hms(2025, 6, 1, hour, 0, 0).unwrap(),
        }
    }

    async fn save(addr: &crate::actor::Addr<StoreActor>, record: SavedSession) {
        let (tx, rx) = oneshot::channel();
        addr.send(StoreMsg::SaveSession { record, reply: tx })
            .await
            .map_err(|_| ())
            .unwrap();
        rx.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn save_then_get_round_trips() {
        let handle = spawn_actor(StoreActor::new(Arc::new(MemoryKv::default())), 8);
        let rec = record("career-coach", 9);
        let id = rec.id;
        save(&handle.addr, rec.clone()).await;

        let (tx, rx) = oneshot::channel();
        handle
            .addr
            .send(StoreMsg::GetSession { id, reply: tx })
            .await
            .map_err(|_| ())
            .unwrap();
        assert_eq!(rx.await.unwrap().unwrap(), rec);
    }

    #[tokio::test]
    async fn list_filters_by_panel_and_sorts_newest_first() {
        let handle = spawn_actor(StoreActor::new(Arc::new(MemoryKv::default())), 8);
        let older = record("skills-forecast", 8);
        let newer = record("skills-forecast", 14);
        let other = record("concepts", 10);
        save(&handle.addr, older.clone()).await;
        save(&handle.addr, newer.clone()).await;
        save(&handle.addr, other).await;

        let (tx, rx) = oneshot::channel();
        handle
            .addr
            .send(StoreMsg::ListSessions {
                panel: Some("skills-forecast".into()),
                limit: 10,
                reply: tx,
            })
            .await
            .map_err(|_| ())
            .unwrap();
        let listed = rx.await.unwrap().unwrap();
        assert_eq!(
            listed.iter().map(|r| r.id).collect::<Vec<_>>(),
            vec![newer.id, older.id]
        );
    }

    #[tokio::test]
    async fn delete_then_get_fails() {
        let handle = spawn_actor(StoreActor::new(Arc::new(MemoryKv::default())), 8);
        let rec = record("simulation", 11);
        let id = rec.id;
        save(&handle.addr, rec).await;

        let (tx, rx) = oneshot::channel();
        handle
            .addr
            .send(StoreMsg::DeleteSession { id, reply: tx })
            .await
            .map_err(|_| ())
            .unwrap();
        rx.await.unwrap().unwrap();

        let (tx, rx) = oneshot::channel();
        handle
            .addr
            .send(StoreMsg::GetSession { id, reply: tx })
            .await
            .map_err(|_| ())
            .unwrap();
        assert!(rx.await.unwrap().is_err());
    }
}
