//! Drop rows with malformed reviewer ids.

use crate::traits::Filter;
use data_loader::{ActorId, InteractionRecord};

/// Keeps records whose actor id is at or above the namespace floor.
///
/// Ids below the floor are placeholders or corrupted values; they are dropped
/// silently and only counted.
#[derive(Debug, Clone, Copy)]
pub struct ActorIdFilter {
    min_actor_id: ActorId,
}

impl ActorIdFilter {
    pub fn new(min_actor_id: ActorId) -> Self {
        Self { min_actor_id }
    }
}

impl Filter for ActorIdFilter {
    fn name(&self) -> &str {
        "ActorIdFilter"
    }

    fn keeps(&self, record: &InteractionRecord) -> bool {
        record.actor_id >= self.min_actor_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MIN_VALID_ACTOR_ID;

    fn record(actor_id: ActorId) -> InteractionRecord {
        InteractionRecord {
            item_id: 1,
            item_name: "GameA".to_string(),
            review_id: 1,
            language: "english".to_string(),
            actor_id,
            timestamp: 0,
            playtime: 1_000_000.0,
            recommended: Some(true),
        }
    }

    #[test]
    fn test_actor_id_floor() {
        let filter = ActorIdFilter::new(MIN_VALID_ACTOR_ID);
        let records = vec![
            record(12345),
            record(MIN_VALID_ACTOR_ID - 1),
            record(MIN_VALID_ACTOR_ID),
            record(76_561_198_000_000_001),
        ];

        let kept = filter.apply(records);
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|r| r.actor_id >= MIN_VALID_ACTOR_ID));
    }
}
