use crate::abstract_trait::SessionStoreTrait;
use async_trait::async_trait;
use chrono::Duration;
use deadpool_redis::{Connection, Pool, redis};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: i64,
    pub username: String,
    pub role: String,
}

impl Session {
    pub fn is_admin(&self) -> bool {
        self.role == crate::model::ROLE_ADMIN
    }
}

fn session_key(session_id: &str) -> String {
    format!("session:{session_id}")
}

fn user_session_key(user_id: i64) -> String {
    format!("user_session:{user_id}")
}

#[derive(Clone)]
pub struct SessionStore {
    pool: Pool,
}

impl SessionStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    async fn get_conn(&self) -> Option<Connection> {
        match self.pool.get().await {
            Ok(conn) => Some(conn),
            Err(e) => {
                error!("Failed to get Redis connection from pool: {:?}", e);
                None
            }
        }
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> bool {
        let Some(mut conn) = self.get_conn().await else {
            return false;
        };

        let result: redis::RedisResult<()> = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("EX")
            .arg(ttl.num_seconds().max(1))
            .query_async(&mut conn)
            .await;

        match result {
            Ok(_) => true,
            Err(e) => {
                error!("Failed to write key '{}': {:?}", key, e);
                false
            }
        }
    }

    async fn get(&self, key: &str) -> Option<String> {
        let mut conn = self.get_conn().await?;
        let result: redis::RedisResult<Option<String>> =
            redis::cmd("GET").arg(key).query_async(&mut conn).await;

        match result {
            Ok(value) => value,
            Err(e) => {
                error!("Redis get error for key '{}': {:?}", key, e);
                None
            }
        }
    }

    async fn del(&self, key: &str) -> bool {
        let Some(mut conn) = self.get_conn().await else {
            return false;
        };

        match redis::cmd("DEL").arg(key).query_async::<()>(&mut conn).await {
            Ok(_) => true,
            Err(e) => {
                error!("Failed to delete key '{}': {:?}", key, e);
                false
            }
        }
    }
}

#[async_trait]
impl SessionStoreTrait for SessionStore {
    async fn create_session(&self, session_id: &str, session: &Session, ttl: Duration) -> bool {
        let json_data = match serde_json::to_string(session) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize session: {:?}", e);
                return false;
            }
        };

        let created = self.set_ex(&session_key(session_id), &json_data, ttl).await;
        if created {
            debug!("Session created for user_id: {}", session.user_id);
        }
        created
    }

    async fn get_session(&self, session_id: &str) -> Option<Session> {
        let data = self.get(&session_key(session_id)).await?;

        match serde_json::from_str::<Session>(&data) {
            Ok(session) => Some(session),
            Err(e) => {
                error!("Failed to deserialize session: {:?}", e);
                None
            }
        }
    }

    async fn refresh_session(&self, session_id: &str, ttl: Duration) -> bool {
        let Some(mut conn) = self.get_conn().await else {
            return false;
        };

        match redis::cmd("EXPIRE")
            .arg(session_key(session_id))
            .arg(ttl.num_seconds().max(1))
            .query_async::<i64>(&mut conn)
            .await
        {
            Ok(updated) => updated == 1,
            Err(e) => {
                error!("Failed to refresh session TTL: {:?}", e);
                false
            }
        }
    }

    async fn delete_session(&self, session_id: &str) -> bool {
        self.del(&session_key(session_id)).await
    }

    async fn get_user_session(&self, user_id: i64) -> Option<String> {
        self.get(&user_session_key(user_id)).await
    }

    async fn set_user_session(&self, user_id: i64, session_id: &str, ttl: Duration) -> bool {
        self.set_ex(&user_session_key(user_id), session_id, ttl).await
    }

    async fn delete_user_session(&self, user_id: i64) -> bool {
        self.del(&user_session_key(user_id)).await
    }
}
