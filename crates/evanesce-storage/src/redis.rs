use async_trait::async_trait;
use evanesce_core::error::{Result, StorageError};
use evanesce_core::{PasteId, PasteRecord, Repository, ViewedPaste};
use jiff::Timestamp;
use redis::Script;
use std::time::Duration;
use tracing::{debug, trace, warn};

const DEFAULT_KEY_PREFIX: &str = "paste:";

/// Stores a paste hash if the key is free, and applies its TTL in the same
/// step.
///
/// KEYS[1] paste key
/// ARGV[1] content, ARGV[2] created_at (unix ms),
/// ARGV[3] remaining views or "" for unbounded, ARGV[4] ttl seconds or "".
///
/// Returns 1 when stored, 0 when the key is taken.
const INSERT_SCRIPT: &str = r#"
if redis.call('EXISTS', KEYS[1]) == 1 then
  return 0
end
redis.call('HSET', KEYS[1], 'content', ARGV[1], 'created_at', ARGV[2])
if ARGV[3] ~= '' then
  redis.call('HSET', KEYS[1], 'remaining_views', ARGV[3])
end
if ARGV[4] ~= '' then
  local reply = redis.pcall('EXPIRE', KEYS[1], ARGV[4])
  if type(reply) == 'table' and reply.err then
    redis.call('DEL', KEYS[1])
    return reply
  end
end
return 1
"#;

/// Consumes one view of a paste.
///
/// KEYS[1] paste key
///
/// Returns nil when the paste is absent, otherwise
/// `{content, created_at, remaining}` where `remaining` is nil for unbounded
/// pastes and the views left after this read otherwise. The key is deleted
/// when `remaining` reaches 0.
const CONSUME_SCRIPT: &str = r#"
local paste = redis.call('HMGET', KEYS[1], 'content', 'created_at', 'remaining_views')
if not paste[1] then
  return false
end
if not paste[3] then
  return {paste[1], paste[2], false}
end
local remaining = redis.call('HINCRBY', KEYS[1], 'remaining_views', -1)
if remaining <= 0 then
  redis.call('DEL', KEYS[1])
  remaining = 0
end
return {paste[1], paste[2], remaining}
"#;

type ConsumeReply = Option<(String, Option<i64>, Option<i64>)>;

fn invalid_data(key: &str, field: &str) -> StorageError {
    StorageError::InvalidData(format!("'{key}' has a missing or invalid {field}"))
}

fn map_redis_error(operation: &str, err: redis::RedisError) -> StorageError {
    let message = format!("{operation}: {err}");
    if err.is_timeout() || message.to_ascii_lowercase().contains("timed out") {
        StorageError::Timeout(message)
    } else if err.is_io_error() {
        StorageError::Unavailable(message)
    } else {
        StorageError::Operation(message)
    }
}

/// A Redis-backed [`Repository`].
///
/// Each paste is a hash with the fields `content`, `created_at` (unix
/// milliseconds) and, for view-limited pastes, `remaining_views`. TTLs are
/// native Redis key expiry. Inserts and reads each run as one Lua script, so
/// concurrent readers of the same paste are serialized by Redis.
#[derive(Debug, Clone)]
pub struct RedisRepository {
    conn: redis::aio::MultiplexedConnection,
    key_prefix: String,
    insert_script: Script,
    consume_script: Script,
}

impl RedisRepository {
    /// Creates a repository using the default `paste:` key prefix.
    pub fn new(conn: redis::aio::MultiplexedConnection) -> Self {
        Self::with_prefix(conn, DEFAULT_KEY_PREFIX)
    }

    /// Creates a repository with a custom key prefix.
    ///
    /// # Arguments
    ///
    /// * `conn` - A multiplexed Redis connection
    /// * `key_prefix` - Prefix for paste keys (e.g., "myapp:paste:")
    pub fn with_prefix(
        conn: redis::aio::MultiplexedConnection,
        key_prefix: impl Into<String>,
    ) -> Self {
        Self {
            conn,
            key_prefix: key_prefix.into(),
            insert_script: Script::new(INSERT_SCRIPT),
            consume_script: Script::new(CONSUME_SCRIPT),
        }
    }

    /// Opens a connection to `redis_url` and creates a repository on it.
    pub async fn connect(redis_url: &str, key_prefix: impl Into<String>) -> Result<Self> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| map_redis_error("invalid redis url", e))?;
        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| map_redis_error("failed to connect to Redis", e))?;
        Ok(Self::with_prefix(conn, key_prefix))
    }

    /// Generates the storage key for a paste id.
    fn paste_key(&self, id: &PasteId) -> String {
        format!("{}{}", self.key_prefix, id.as_str())
    }
}

#[async_trait]
impl Repository for RedisRepository {
    async fn insert(&self, id: &PasteId, record: PasteRecord, ttl: Option<Duration>) -> Result<()> {
        let key = self.paste_key(id);
        trace!(id = %id, "Storing paste in Redis");

        let views = record
            .views
            .remaining()
            .map(|views| views.to_string())
            .unwrap_or_default();
        let ttl = ttl.map(|ttl| ttl.as_secs().to_string()).unwrap_or_default();

        let mut conn = self.conn.clone();
        let stored: i64 = self
            .insert_script
            .key(&key)
            .arg(&record.content)
            .arg(record.created_at.as_millisecond())
            .arg(views)
            .arg(ttl)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| {
                warn!(id = %id, error = %e, "Failed to store paste in Redis");
                map_redis_error("failed to store paste", e)
            })?;

        if stored == 0 {
            debug!(id = %id, "Paste id already taken");
            return Err(StorageError::Conflict(id.to_string()));
        }

        debug!(id = %id, "Stored paste in Redis");
        Ok(())
    }

    async fn consume(&self, id: &PasteId) -> Result<Option<ViewedPaste>> {
        let key = self.paste_key(id);
        trace!(id = %id, "Consuming paste view in Redis");

        let mut conn = self.conn.clone();
        let reply: ConsumeReply = self
            .consume_script
            .key(&key)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| {
                warn!(id = %id, error = %e, "Failed to consume paste in Redis");
                map_redis_error("failed to consume paste", e)
            })?;

        let Some((content, created_at, remaining)) = reply else {
            trace!(id = %id, "Paste not found in Redis");
            return Ok(None);
        };

        let created_at = created_at
            .and_then(|ms| Timestamp::from_millisecond(ms).ok())
            .ok_or_else(|| invalid_data(&key, "created_at"))?;
        let remaining_views = remaining.map(u32::try_from).transpose();
        let remaining_views = remaining_views.map_err(|_| invalid_data(&key, "remaining_views"))?;

        if remaining_views == Some(0) {
            debug!(id = %id, "Paste exhausted its views");
        }

        Ok(Some(ViewedPaste {
            content,
            created_at,
            remaining_views,
        }))
    }
}
