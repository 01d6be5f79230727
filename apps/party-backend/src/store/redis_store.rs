//! Redis-backed store.
//!
//! Every call borrows the supervisor's current `ConnectionManager` and runs
//! under the configured deadline. Hash commands map one-to-one onto the
//! `KvStore` operations; `apply` runs its batch inside MULTI/EXEC and
//! `apply_guarded` runs it as a Lua script so the guard check and the
//! writes cannot interleave with other clients.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, RedisError};
use tokio::time::timeout;

use super::redis_errors::map_redis_err;
use super::{Guard, KvStore, Mutation, StoreResult};
use crate::config::StoreConfig;
use crate::errors::domain::{DomainError, InfraErrorKind};
use crate::infra::supervisor::{ConnectionSupervisor, Connector};

const SCAN_BATCH: usize = 100;

// KEYS[1] is the guarded collection, KEYS[2..] one per mutation.
// ARGV[1..3] is the guard (kind, field, value), then three slots per
// mutation (op, field, value).
const GUARDED_BATCH: &str = r#"
if ARGV[1] == 'absent' then
  if redis.call('EXISTS', KEYS[1]) == 1 then return 0 end
elseif redis.call('HGET', KEYS[1], ARGV[2]) ~= ARGV[3] then
  return 0
end
local arg = 4
for k = 2, #KEYS do
  local op = ARGV[arg]
  if op == 'hset' then
    redis.call('HSET', KEYS[k], ARGV[arg + 1], ARGV[arg + 2])
  elseif op == 'hdel' then
    redis.call('HDEL', KEYS[k], ARGV[arg + 1])
  else
    redis.call('DEL', KEYS[k])
  end
  arg = arg + 3
end
return 1
"#;

/// Opens `ConnectionManager` handles for one Redis endpoint.
pub struct RedisConnector {
    client: Client,
    target: String,
}

impl RedisConnector {
    pub fn new(config: &StoreConfig) -> Result<Self, DomainError> {
        let client = Client::open(config.redis_url()).map_err(|err| {
            DomainError::infra(
                InfraErrorKind::Other("config".to_string()),
                format!("invalid store address {}: {err}", config.display_target()),
            )
        })?;

        Ok(Self {
            client,
            target: config.display_target(),
        })
    }
}

#[async_trait]
impl Connector for RedisConnector {
    type Conn = ConnectionManager;

    fn target(&self) -> String {
        self.target.clone()
    }

    async fn connect(&self) -> Result<ConnectionManager, DomainError> {
        ConnectionManager::new(self.client.clone())
            .await
            .map_err(|err| map_redis_err("CONNECT", err))
    }

    async fn ping(&self, conn: &mut ConnectionManager) -> Result<(), DomainError> {
        let _pong: String = redis::cmd("PING")
            .query_async(conn)
            .await
            .map_err(|err| map_redis_err("PING", err))?;
        Ok(())
    }
}

pub struct RedisStore {
    supervisor: Arc<ConnectionSupervisor<RedisConnector>>,
    timeout: Duration,
}

impl RedisStore {
    pub fn new(supervisor: Arc<ConnectionSupervisor<RedisConnector>>) -> Self {
        let timeout = supervisor.settings().timeout;
        Self {
            supervisor,
            timeout,
        }
    }

    fn conn(&self) -> ConnectionManager {
        self.supervisor.connection()
    }

    async fn bounded<T, F>(&self, op: &'static str, fut: F) -> StoreResult<T>
    where
        F: Future<Output = Result<T, RedisError>>,
    {
        match timeout(self.timeout, fut).await {
            Ok(result) => result.map_err(|err| map_redis_err(op, err)),
            Err(_) => Err(DomainError::infra(
                InfraErrorKind::Timeout,
                format!("{op} exceeded {}ms", self.timeout.as_millis()),
            )),
        }
    }
}

#[async_trait]
impl KvStore for RedisStore {
    async fn set_field(&self, collection: &str, field: &str, value: &str) -> StoreResult<()> {
        let mut conn = self.conn();
        let _added: i64 = self
            .bounded("HSET", conn.hset(collection, field, value))
            .await?;
        Ok(())
    }

    async fn get_field(&self, collection: &str, field: &str) -> StoreResult<Option<String>> {
        let mut conn = self.conn();
        let value: Option<String> = self.bounded("HGET", conn.hget(collection, field)).await?;
        Ok(value)
    }

    async fn delete_field(&self, collection: &str, field: &str) -> StoreResult<()> {
        let mut conn = self.conn();
        let _removed: i64 = self.bounded("HDEL", conn.hdel(collection, field)).await?;
        Ok(())
    }

    async fn field_exists(&self, collection: &str, field: &str) -> StoreResult<bool> {
        let mut conn = self.conn();
        let exists: bool = self
            .bounded("HEXISTS", conn.hexists(collection, field))
            .await?;
        Ok(exists)
    }

    async fn get_all_fields(&self, collection: &str) -> StoreResult<HashMap<String, String>> {
        let mut conn = self.conn();
        let fields: HashMap<String, String> =
            self.bounded("HGETALL", conn.hgetall(collection)).await?;
        Ok(fields)
    }

    async fn delete_collection(&self, collection: &str) -> StoreResult<()> {
        let mut conn = self.conn();
        let _removed: i64 = self.bounded("DEL", conn.del(collection)).await?;
        Ok(())
    }

    async fn collection_exists(&self, collection: &str) -> StoreResult<bool> {
        let mut conn = self.conn();
        let exists: bool = self.bounded("EXISTS", conn.exists(collection)).await?;
        Ok(exists)
    }

    async fn list_collection_keys(&self, pattern: &str) -> StoreResult<Vec<String>> {
        let mut conn = self.conn();
        let mut cursor: u64 = 0;
        let mut keys = Vec::new();

        loop {
            let (next, batch): (u64, Vec<String>) = self
                .bounded(
                    "SCAN",
                    redis::cmd("SCAN")
                        .arg(cursor)
                        .arg("MATCH")
                        .arg(pattern)
                        .arg("COUNT")
                        .arg(SCAN_BATCH)
                        .query_async(&mut conn),
                )
                .await?;
            keys.extend(batch);
            if next == 0 {
                break;
            }
            cursor = next;
        }

        // SCAN may return a key more than once.
        keys.sort();
        keys.dedup();
        Ok(keys)
    }

    async fn apply(&self, batch: Vec<Mutation>) -> StoreResult<()> {
        if batch.is_empty() {
            return Ok(());
        }

        let mut pipe = redis::pipe();
        pipe.atomic();
        for mutation in &batch {
            match mutation {
                Mutation::SetField {
                    collection,
                    field,
                    value,
                } => {
                    pipe.hset(collection, field, value).ignore();
                }
                Mutation::DeleteField { collection, field } => {
                    pipe.hdel(collection, field).ignore();
                }
                Mutation::DeleteCollection { collection } => {
                    pipe.del(collection).ignore();
                }
            }
        }

        let mut conn = self.conn();
        let () = self.bounded("MULTI", pipe.query_async(&mut conn)).await?;
        Ok(())
    }

    async fn apply_guarded(&self, guard: Guard, batch: Vec<Mutation>) -> StoreResult<bool> {
        let (guarded, kind, field, value) = match &guard {
            Guard::Absent { collection } => (collection.as_str(), "absent", "", ""),
            Guard::FieldEquals {
                collection,
                field,
                value,
            } => (collection.as_str(), "equals", field.as_str(), value.as_str()),
        };

        let mut cmd = redis::cmd("EVAL");
        cmd.arg(GUARDED_BATCH).arg(1 + batch.len()).arg(guarded);
        for mutation in &batch {
            cmd.arg(mutation.collection());
        }
        cmd.arg(kind).arg(field).arg(value);
        for mutation in &batch {
            match mutation {
                Mutation::SetField { field, value, .. } => {
                    cmd.arg("hset").arg(field).arg(value);
                }
                Mutation::DeleteField { field, .. } => {
                    cmd.arg("hdel").arg(field).arg("");
                }
                Mutation::DeleteCollection { .. } => {
                    cmd.arg("del").arg("").arg("");
                }
            }
        }

        let mut conn = self.conn();
        let applied: i64 = self.bounded("EVAL", cmd.query_async(&mut conn)).await?;
        Ok(applied == 1)
    }

    async fn ping(&self) -> StoreResult<()> {
        let mut conn = self.conn();
        let _pong: String = self
            .bounded("PING", redis::cmd("PING").query_async(&mut conn))
            .await?;
        Ok(())
    }
}
