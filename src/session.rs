use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::error::Result;
use crate::models::ChatSession;
use crate::redis::RedisManager;

const SESSION_KEY_PREFIX: &str = "artlens:session:";

/// Where chat sessions live between requests
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Unknown ids yield a fresh session.
    async fn load(&self, id: &str) -> Result<ChatSession>;
    async fn save(&self, session: &ChatSession) -> Result<()>;
}

/// Process-local store; a session expires `ttl` after its last save
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, (ChatSession, Instant)>>,
    ttl: Duration,
}

impl MemorySessionStore {
    pub fn new(ttl_seconds: u64) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl: Duration::from_secs(ttl_seconds),
        }
    }

    fn is_live(&self, saved_at: Instant, now: Instant) -> bool {
        now.duration_since(saved_at) < self.ttl
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, id: &str) -> Result<ChatSession> {
        let now = Instant::now();
        {
            let sessions = self.sessions.read().await;
            match sessions.get(id) {
                Some((session, saved_at)) if self.is_live(*saved_at, now) => {
                    return Ok(session.clone());
                }
                None => return Ok(ChatSession::new(id)),
                Some(_) => {}
            }
        }

        let mut sessions = self.sessions.write().await;
        if sessions
            .get(id)
            .is_some_and(|(_, saved_at)| !self.is_live(*saved_at, now))
        {
            sessions.remove(id);
            tracing::debug!("Session {} expired", id);
        }
        Ok(ChatSession::new(id))
    }

    async fn save(&self, session: &ChatSession) -> Result<()> {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, (_, saved_at)| self.is_live(*saved_at, now));
        sessions.insert(session.id.clone(), (session.clone(), now));
        Ok(())
    }
}

/// Redis-backed store; every save refreshes the TTL
pub struct RedisSessionStore {
    redis: Arc<RedisManager>,
    ttl_seconds: u64,
}

impl RedisSessionStore {
    pub fn new(redis: Arc<RedisManager>, ttl_seconds: u64) -> Self {
        Self { redis, ttl_seconds }
    }

    fn key(id: &str) -> String {
        format!("{SESSION_KEY_PREFIX}{id}")
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn load(&self, id: &str) -> Result<ChatSession> {
        let session = self.redis.get_json::<ChatSession>(&Self::key(id)).await?;
        Ok(session.unwrap_or_else(|| ChatSession::new(id)))
    }

    async fn save(&self, session: &ChatSession) -> Result<()> {
        self.redis
            .set_json_ex(&Self::key(&session.id), session, self.ttl_seconds)
            .await
    }
}
