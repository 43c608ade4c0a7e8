use chrono::{DateTime, Utc};
use uuid::Uuid;

pub type Timestamp = DateTime<Utc>;

pub fn get_uuid() -> Uuid {
    Uuid::new_v4()
}

/// Time-ordered id, listings keyed by it come out roughly in creation order.
pub fn get_ordered_uuid() -> Uuid {
    Uuid::now_v7()
}

pub fn now() -> Timestamp {
    Utc::now()
}
