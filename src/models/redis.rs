use crate::models::record::CollectionName;

pub struct RedisKey;

impl RedisKey {
    pub fn collection(name: CollectionName) -> String {
        format!("collection:{}", name.as_str())
    }

    pub fn whatsapp_subscribers() -> String {
        "subscribers:whatsapp".to_string()
    }
}
