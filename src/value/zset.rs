//! Sorted set storage: mapping member -> score, iterated by
//! (score ascending, member lexicographic) (spec §3 "SortedSet").
//!
//! The teacher's `ZSetStorageType::SkipList(HashMap<RedisObject, f64>,
//! SkipList)` paired a hash lookup with an ordered index; we keep that same
//! dual-structure shape but back the ordered index with a `BTreeSet` of
//! `(ScoreKey, member)` pairs instead of reimplementing a skip list, since a
//! balanced tree gives the same O(log n) rank/range operations.

use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, Copy, PartialEq)]
struct ScoreKey(f64);

impl Eq for ScoreKey {}
impl PartialOrd for ScoreKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for ScoreKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ZSet {
    scores: HashMap<Vec<u8>, f64>,
    index: BTreeSet<(ScoreKey, Vec<u8>)>,
}

impl ZSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn score(&self, member: &[u8]) -> Option<f64> {
        self.scores.get(member).copied()
    }

    /// Insert or update a member's score. Returns `true` if the member was
    /// newly added (not previously present).
    pub fn insert(&mut self, member: Vec<u8>, score: f64) -> bool {
        if let Some(old) = self.scores.insert(member.clone(), score) {
            self.index.remove(&(ScoreKey(old), member.clone()));
            self.index.insert((ScoreKey(score), member));
            false
        } else {
            self.index.insert((ScoreKey(score), member));
            true
        }
    }

    pub fn remove(&mut self, member: &[u8]) -> bool {
        if let Some(old) = self.scores.remove(member) {
            self.index.remove(&(ScoreKey(old), member.to_vec()));
            true
        } else {
            false
        }
    }

    pub fn iter_ordered(&self) -> impl Iterator<Item = (&[u8], f64)> {
        self.index.iter().map(|(score, member)| (member.as_slice(), score.0))
    }

    /// Rank (0-based position in ascending order) of `member`, if present.
    pub fn rank(&self, member: &[u8]) -> Option<usize> {
        let score = self.score(member)?;
        self.index.iter().position(|(s, m)| s.0 == score && m == member)
    }

    pub fn range_by_rank(&self, start: i64, stop: i64) -> Vec<(Vec<u8>, f64)> {
        let len = self.len() as i64;
        if len == 0 {
            return Vec::new();
        }
        let norm = |i: i64| -> i64 {
            if i < 0 {
                (len + i).max(0)
            } else {
                i
            }
        };
        let start = norm(start).min(len - 1).max(0);
        let stop = norm(stop).min(len - 1);
        if stop < start {
            return Vec::new();
        }
        self.index
            .iter()
            .skip(start as usize)
            .take((stop - start + 1) as usize)
            .map(|(s, m)| (m.clone(), s.0))
            .collect()
    }

    pub fn range_by_score(&self, min: f64, max: f64) -> Vec<(Vec<u8>, f64)> {
        self.index
            .iter()
            .filter(|(s, _)| s.0 >= min && s.0 <= max)
            .map(|(s, m)| (m.clone(), s.0))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orders_by_score_then_member() {
        let mut z = ZSet::new();
        z.insert(b"b".to_vec(), 1.0);
        z.insert(b"a".to_vec(), 1.0);
        z.insert(b"c".to_vec(), 0.5);
        let ordered: Vec<_> = z.iter_ordered().map(|(m, s)| (m.to_vec(), s)).collect();
        assert_eq!(
            ordered,
            vec![(b"c".to_vec(), 0.5), (b"a".to_vec(), 1.0), (b"b".to_vec(), 1.0)]
        );
    }

    #[test]
    fn negative_rank_range_clamps_like_lists() {
        let mut z = ZSet::new();
        for (m, s) in [("a", 1.0), ("b", 2.0), ("c", 3.0)] {
            z.insert(m.as_bytes().to_vec(), s);
        }
        let r = z.range_by_rank(-2, -1);
        assert_eq!(r, vec![(b"b".to_vec(), 2.0), (b"c".to_vec(), 3.0)]);
    }

    #[test]
    fn reinsert_updates_score_and_index() {
        let mut z = ZSet::new();
        assert!(z.insert(b"a".to_vec(), 1.0));
        assert!(!z.insert(b"a".to_vec(), 5.0));
        assert_eq!(z.score(b"a"), Some(5.0));
        assert_eq!(z.rank(b"a"), Some(0));
    }
}
