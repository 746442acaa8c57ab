use crate::{
    errors::AppError,
    models::{CollectionName, Record, redis::RedisKey},
    state::RedisClient,
};

pub async fn get_records(
    collection: CollectionName,
    redis: &RedisClient,
) -> Result<Vec<Record>, AppError> {
    let mut conn = redis.get().await.map_err(|e| match e {
        bb8::RunError::User(err) => AppError::RedisCommandError(err),
        bb8::RunError::TimedOut => AppError::RedisPoolError("Redis connection timed out".into()),
    })?;

    let key = RedisKey::collection(collection);

    let entries: Vec<String> = redis::cmd("LRANGE")
        .arg(&key)
        .arg(0)
        .arg(-1)
        .query_async(&mut *conn)
        .await
        .map_err(AppError::RedisCommandError)?;

    let mut records = Vec::with_capacity(entries.len());
    for entry in entries {
        match serde_json::from_str::<Record>(&entry) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!("Failed to deserialize record in {}: {}", collection, e);
            }
        }
    }

    Ok(records)
}
