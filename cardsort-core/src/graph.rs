/// The "beats" relation over a fixed item set, kept transitively closed.
///
/// One row per item, keyed by caller ID: `beats[a]` is the set of IDs that
/// `a` is known to beat, directly judged or inferred. BTree containers give
/// a stable node ordering, so closure passes and serialized rows come out
/// deterministic.
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreferenceGraph {
    beats: BTreeMap<i64, BTreeSet<i64>>,
}

impl PreferenceGraph {
    /// Empty relation over the given items.
    pub fn new(ids: impl IntoIterator<Item = i64>) -> Self {
        PreferenceGraph {
            beats: ids.into_iter().map(|id| (id, BTreeSet::new())).collect(),
        }
    }

    /// Number of items the relation covers.
    pub fn len(&self) -> usize {
        self.beats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.beats.is_empty()
    }

    /// Whether the relation has a row for `id`.
    pub fn contains(&self, id: i64) -> bool {
        self.beats.contains_key(&id)
    }

    /// True when `a` is known to beat `b`, directly or transitively.
    pub fn beats(&self, a: i64, b: i64) -> bool {
        self.beats.get(&a).is_some_and(|row| row.contains(&b))
    }

    /// True when the relative order of `a` and `b` is already known in
    /// either direction.
    pub fn knows_order(&self, a: i64, b: i64) -> bool {
        self.beats(a, b) || self.beats(b, a)
    }

    /// Win count for an item: how many others it beats after closure.
    pub fn wins(&self, id: i64) -> usize {
        self.beats.get(&id).map_or(0, |row| row.len())
    }

    /// Record `winner` beating `loser`, then restore transitive closure.
    ///
    /// Closure is one full pass over candidate intermediate nodes: for each
    /// node k, every row that beats k inherits k's entire beats set. The
    /// relation is closed on entry (only this method adds edges), so a
    /// single full pass reaches the fixed point again — any path through
    /// the new edge is picked up either when k is the winner or, one
    /// inheritance later, when k is the loser.
    pub fn add_win(&mut self, winner: i64, loser: i64) {
        if let Some(row) = self.beats.get_mut(&winner) {
            row.insert(loser);
        }

        let ids: Vec<i64> = self.beats.keys().copied().collect();
        for &k in &ids {
            let via = match self.beats.get(&k) {
                Some(row) if !row.is_empty() => row.clone(),
                _ => continue,
            };
            for &i in &ids {
                if i == k {
                    continue;
                }
                if let Some(row) = self.beats.get_mut(&i) {
                    if row.contains(&k) {
                        row.extend(via.iter().copied());
                    }
                }
            }
        }
    }

    /// Rows as (item id, beaten ids) pairs, ready for serialization.
    pub fn to_rows(&self) -> Vec<(i64, Vec<i64>)> {
        self.beats
            .iter()
            .map(|(&id, row)| (id, row.iter().copied().collect()))
            .collect()
    }

    /// Rebuild from serialized rows. Shape only — callers validate IDs and
    /// contradictions against their item list before trusting the result.
    pub fn from_rows(rows: &[(i64, Vec<i64>)]) -> Self {
        PreferenceGraph {
            beats: rows
                .iter()
                .map(|(id, beaten)| (*id, beaten.iter().copied().collect()))
                .collect(),
        }
    }

    /// Item IDs the relation covers, in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.beats.keys().copied()
    }
}
