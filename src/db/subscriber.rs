use crate::{errors::AppError, models::redis::RedisKey, state::RedisClient};

pub async fn add_whatsapp_subscriber(phone: &str, redis: &RedisClient) -> Result<bool, AppError> {
    let mut conn = redis.get().await.map_err(|e| match e {
        bb8::RunError::User(err) => AppError::RedisCommandError(err),
        bb8::RunError::TimedOut => AppError::RedisPoolError("Redis connection timed out".into()),
    })?;

    let added: u32 = redis::cmd("SADD")
        .arg(RedisKey::whatsapp_subscribers())
        .arg(phone)
        .query_async(&mut *conn)
        .await
        .map_err(AppError::RedisCommandError)?;

    Ok(added > 0)
}
