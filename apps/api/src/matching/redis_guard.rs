use async_trait::async_trait;
use redis::Client as RedisClient;
use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::guard::RunGuard;

const KEY_PREFIX: &str = "dealflow:run:";

/// Compare-and-delete, so a run never releases a lock taken over after its TTL expired.
const RELEASE_SCRIPT: &str = r#"
if redis.call('GET', KEYS[1]) == ARGV[1] then
    return redis.call('DEL', KEYS[1])
else
    return 0
end
"#;

/// Redis-backed run guard. Locks are `SET NX EX` with a TTL so a crashed run
/// cannot block its key forever.
pub struct RedisRunGuard {
    client: RedisClient,
    ttl_secs: u64,
    release_script: redis::Script,
}

impl RedisRunGuard {
    pub fn new(client: RedisClient, ttl_secs: u64) -> Self {
        Self {
            client,
            ttl_secs,
            release_script: redis::Script::new(RELEASE_SCRIPT),
        }
    }
}

#[async_trait]
impl RunGuard for RedisRunGuard {
    async fn acquire(&self, key: &str, run_id: Uuid) -> Result<bool, AppError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let reply: Option<String> = redis::cmd("SET")
            .arg(format!("{KEY_PREFIX}{key}"))
            .arg(run_id.to_string())
            .arg("NX")
            .arg("EX")
            .arg(self.ttl_secs)
            .query_async(&mut conn)
            .await?;
        Ok(reply.is_some())
    }

    async fn release(&self, key: &str, run_id: Uuid) -> Result<(), AppError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: i64 = self
            .release_script
            .key(format!("{KEY_PREFIX}{key}"))
            .arg(run_id.to_string())
            .invoke_async(&mut conn)
            .await?;
        Ok(())
    }
}
