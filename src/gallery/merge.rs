//! Deterministic merging of fan-out results.

use std::collections::{HashMap, HashSet};

use super::model::{ObjectId, ObjectRecord};

/// Concatenate per-keyword id lists in keyword order, drop repeats keeping
/// the first occurrence, and keep at most `max` ids.
pub fn merge_keyword_ids(per_keyword: &[Vec<ObjectId>], max: usize) -> Vec<ObjectId> {
    let mut seen = HashSet::new();
    per_keyword
        .iter()
        .flatten()
        .copied()
        .filter(|id| seen.insert(*id))
        .take(max)
        .collect()
}

/// Put records back into `ids` order. Records with ids not in the list
/// sort after the rest, by id.
pub fn order_by_ids(mut records: Vec<ObjectRecord>, ids: &[ObjectId]) -> Vec<ObjectRecord> {
    let position: HashMap<ObjectId, usize> = ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();
    records.sort_by_key(|r| (position.get(&r.object_id).copied().unwrap_or(usize::MAX), r.object_id));
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: ObjectId) -> ObjectRecord {
        ObjectRecord {
            object_id: id,
            ..Default::default()
        }
    }

    #[test]
    fn test_merge_keeps_first_seen_order() {
        assert_eq!(merge_keyword_ids(&[vec![1, 2], vec![2, 3]], 15), vec![1, 2, 3]);
    }

    #[test]
    fn test_merge_respects_keyword_order() {
        let merged = merge_keyword_ids(&[vec![9], vec![], vec![4, 9, 1]], 15);
        assert_eq!(merged, vec![9, 4, 1]);
    }

    #[test]
    fn test_merge_truncates_after_dedup() {
        let merged = merge_keyword_ids(&[vec![1, 1, 2, 2, 3, 4]], 3);
        assert_eq!(merged, vec![1, 2, 3]);
    }

    #[test]
    fn test_order_by_ids() {
        let records = vec![record(3), record(7), record(1)];
        let ordered: Vec<_> = order_by_ids(records, &[1, 3, 7])
            .into_iter()
            .map(|r| r.object_id)
            .collect();
        assert_eq!(ordered, vec![1, 3, 7]);
    }

    #[test]
    fn test_unknown_ids_sort_last() {
        let records = vec![record(50), record(2), record(40)];
        let ordered: Vec<_> = order_by_ids(records, &[2])
            .into_iter()
            .map(|r| r.object_id)
            .collect();
        assert_eq!(ordered, vec![2, 40, 50]);
    }
}
