use crate::{
    errors::AppError,
    models::{Record, redis::RedisKey},
    state::RedisClient,
};

pub async fn insert_record(record: &Record, redis: &RedisClient) -> Result<(), AppError> {
    let mut conn = redis.get().await.map_err(|e| match e {
        bb8::RunError::User(err) => AppError::RedisCommandError(err),
        bb8::RunError::TimedOut => AppError::RedisPoolError("Redis connection timed out".into()),
    })?;

    let key = RedisKey::collection(record.collection());
    let serialized =
        serde_json::to_string(record).map_err(|e| AppError::Serialization(e.to_string()))?;

    // Creation order is list order
    let _: () = redis::cmd("RPUSH")
        .arg(&key)
        .arg(&serialized)
        .query_async(&mut *conn)
        .await
        .map_err(AppError::RedisCommandError)?;

    tracing::debug!("Stored record {} in {}", record.id, key);
    Ok(())
}
