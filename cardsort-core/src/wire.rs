/// Serializable snapshot of a sorter session.
///
/// This is the exact shape a surrounding application persists between
/// judgments: graph rows, the remaining queue, the current pair, the round
/// counter, and the finished ranking as ID groups. Encoding (JSON, base64,
/// whatever the transport wants) is the caller's concern; this module only
/// fixes the typed schema and validates it on the way back in.
use std::collections::{BTreeSet, VecDeque};

use crate::graph::PreferenceGraph;
use crate::sorter::{check_unique_ids, SorterState};
use crate::types::{Item, Pair, SorterError};

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WireState {
    /// One (item id, beaten ids) row per item.
    pub graph: Vec<(i64, Vec<i64>)>,
    /// Unresolved pairs in presentation order.
    pub pending: Vec<Pair>,
    /// Head of the queue, or `None` once finished.
    pub current: Option<Pair>,
    pub round: u32,
    /// Rank groups as ID lists, most wins first. Present exactly when the
    /// session is finished.
    pub ranking: Option<Vec<Vec<i64>>>,
}

impl SorterState {
    /// Lossless snapshot for persistence.
    pub fn to_wire(&self) -> WireState {
        WireState {
            graph: self.graph().to_rows(),
            pending: self.pending().iter().copied().collect(),
            current: self.current_pair(),
            round: self.round(),
            ranking: self.ranking().map(|groups| {
                groups
                    .iter()
                    .map(|g| g.members.iter().map(|m| m.id).collect())
                    .collect()
            }),
        }
    }

    /// Rebuild a session from a snapshot plus a freshly supplied item list.
    ///
    /// Display metadata always comes from `items` — the snapshot only
    /// carries IDs. Validation is strict in both directions: every ID the
    /// snapshot mentions must exist in `items`, every item must have a
    /// graph row, and the graph must not claim both orders for any pair.
    /// A stale or hand-edited snapshot fails here instead of producing a
    /// half-valid session; the caller's recovery is a fresh start.
    pub fn resume(items: Vec<Item>, wire: &WireState) -> Result<Self, SorterError> {
        check_unique_ids(&items)?;
        let known: BTreeSet<i64> = items.iter().map(|item| item.id).collect();

        for (id, beaten) in &wire.graph {
            if !known.contains(id) {
                return Err(SorterError::StateItemMismatch(*id));
            }
            for b in beaten {
                if !known.contains(b) {
                    return Err(SorterError::StateItemMismatch(*b));
                }
            }
        }
        let graph = PreferenceGraph::from_rows(&wire.graph);
        for &id in &known {
            if !graph.contains(id) {
                return Err(SorterError::StateItemMismatch(id));
            }
        }

        for a in graph.ids() {
            for b in graph.ids() {
                if a < b && graph.beats(a, b) && graph.beats(b, a) {
                    return Err(SorterError::CorruptState(format!(
                        "items {a} and {b} beat each other"
                    )));
                }
            }
        }

        for &(a, b) in &wire.pending {
            if !known.contains(&a) {
                return Err(SorterError::StateItemMismatch(a));
            }
            if !known.contains(&b) {
                return Err(SorterError::StateItemMismatch(b));
            }
        }

        let finished = wire.ranking.is_some();
        if finished && !wire.pending.is_empty() {
            return Err(SorterError::CorruptState(
                "finished state still has pending pairs".into(),
            ));
        }
        if !finished && wire.pending.is_empty() {
            return Err(SorterError::CorruptState(
                "unfinished state has an empty queue".into(),
            ));
        }

        let pending: VecDeque<Pair> = wire.pending.iter().copied().collect();
        if wire.current != pending.front().copied() {
            return Err(SorterError::CorruptState(
                "current pair does not match the head of the queue".into(),
            ));
        }

        // The ranking is recomputed from the restored graph rather than
        // trusted from the snapshot, so grouping can never drift from the
        // edges that justify it.
        Ok(SorterState::from_parts(
            items,
            graph,
            pending,
            wire.round,
            finished,
        ))
    }
}
