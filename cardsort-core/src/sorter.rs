/// Sorter state machine.
///
/// Adapted for a pure computation crate — no async, no IO. The caller
/// renders the current pair, collects one judgment, and feeds it back;
/// every transition consumes the state and returns its successor. A caller
/// that keeps a clone of the previous state holds fully independent data,
/// which is what back/undo navigation builds on.
use std::collections::{BTreeSet, VecDeque};

use rand::seq::SliceRandom;
use rand::Rng;

use crate::graph::PreferenceGraph;
use crate::types::{Item, Judgment, Pair, RankGroup, SorterError};

#[derive(Debug, Clone, PartialEq)]
pub struct SorterState {
    /// Items in caller order. Metadata is carried through untouched.
    items: Vec<Item>,
    graph: PreferenceGraph,
    /// Unresolved pairs; the head is always the pair being presented.
    pending: VecDeque<Pair>,
    /// Judgments folded in so far. Does not count the finishing judgment.
    round: u32,
    /// Present exactly when the queue has drained.
    ranking: Option<Vec<RankGroup>>,
}

impl SorterState {
    /// Start a session over `items` with a fresh entropy source.
    ///
    /// Zero or one items yields an immediately finished state. Duplicate
    /// IDs are rejected — downstream graph rows would alias otherwise.
    pub fn new(items: Vec<Item>) -> Result<Self, SorterError> {
        Self::new_with_rng(items, &mut rand::rng())
    }

    /// Start a session with a caller-supplied RNG.
    ///
    /// The RNG drives the one randomized step: the Fisher–Yates shuffle of
    /// all C(n,2) pairs, so comparison order carries no structural bias
    /// toward input position. Tests pass a seeded RNG to pin the order;
    /// `new` is the production entry point.
    pub fn new_with_rng<R: Rng + ?Sized>(
        items: Vec<Item>,
        rng: &mut R,
    ) -> Result<Self, SorterError> {
        check_unique_ids(&items)?;
        let graph = PreferenceGraph::new(items.iter().map(|item| item.id));

        if items.len() < 2 {
            // Nothing to compare: finished from the start, with an empty
            // ranking or the lone item as a single group.
            let ranking = Some(rank_groups(&items, &graph));
            return Ok(SorterState {
                items,
                graph,
                pending: VecDeque::new(),
                round: 0,
                ranking,
            });
        }

        let mut pairs: Vec<Pair> = Vec::with_capacity(items.len() * (items.len() - 1) / 2);
        for i in 0..items.len() {
            for j in (i + 1)..items.len() {
                pairs.push((items[i].id, items[j].id));
            }
        }
        pairs.shuffle(rng);

        Ok(SorterState {
            items,
            graph,
            pending: pairs.into(),
            round: 0,
            ranking: None,
        })
    }

    /// The pair being presented, or `None` once finished.
    pub fn current_pair(&self) -> Option<Pair> {
        if self.ranking.is_some() {
            None
        } else {
            self.pending.front().copied()
        }
    }

    /// Left item of the current pair.
    pub fn left_item(&self) -> Option<&Item> {
        self.current_pair().and_then(|(left, _)| self.item_by_id(left))
    }

    /// Right item of the current pair.
    pub fn right_item(&self) -> Option<&Item> {
        self.current_pair().and_then(|(_, right)| self.item_by_id(right))
    }

    pub fn is_finished(&self) -> bool {
        self.ranking.is_some()
    }

    /// Final rank groups, most wins first. Present once finished.
    pub fn ranking(&self) -> Option<&[RankGroup]> {
        self.ranking.as_deref()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Judgments folded in so far.
    pub fn round(&self) -> u32 {
        self.round
    }

    /// Pairs still awaiting a judgment. An upper bound on the judgments
    /// left: a single win can prune many of these through inference.
    pub fn remaining_comparisons(&self) -> usize {
        self.pending.len()
    }

    pub fn submit_left_wins(self) -> Self {
        self.apply(Judgment::LeftWins)
    }

    pub fn submit_right_wins(self) -> Self {
        self.apply(Judgment::RightWins)
    }

    pub fn submit_tie(self) -> Self {
        self.apply(Judgment::Tie)
    }

    /// Fold one judgment on the current pair into the state.
    ///
    /// A finished state (or one with nothing to compare) is returned
    /// unchanged — the defensive no-op for callers that double-submit.
    pub fn apply(mut self, judgment: Judgment) -> Self {
        let Some((left, right)) = self.current_pair() else {
            return self;
        };

        match judgment {
            Judgment::LeftWins => self.graph.add_win(left, right),
            Judgment::RightWins => self.graph.add_win(right, left),
            Judgment::Tie => {}
        }

        // The judged pair always leaves the queue. After a win the closure
        // may now answer other pending pairs, so those leave too; a tie
        // changed nothing, so nothing else can have become answerable.
        self.pending.pop_front();
        if judgment != Judgment::Tie {
            let graph = &self.graph;
            self.pending.retain(|&(a, b)| !graph.knows_order(a, b));
        }

        if self.pending.is_empty() {
            self.ranking = Some(rank_groups(&self.items, &self.graph));
        } else {
            self.round += 1;
        }
        self
    }

    pub(crate) fn graph(&self) -> &PreferenceGraph {
        &self.graph
    }

    pub(crate) fn pending(&self) -> &VecDeque<Pair> {
        &self.pending
    }

    pub(crate) fn item_by_id(&self, id: i64) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    pub(crate) fn from_parts(
        items: Vec<Item>,
        graph: PreferenceGraph,
        pending: VecDeque<Pair>,
        round: u32,
        finished: bool,
    ) -> Self {
        let ranking = finished.then(|| rank_groups(&items, &graph));
        SorterState {
            items,
            graph,
            pending,
            round,
            ranking,
        }
    }
}

pub(crate) fn check_unique_ids(items: &[Item]) -> Result<(), SorterError> {
    let mut seen = BTreeSet::new();
    for item in items {
        if !seen.insert(item.id) {
            return Err(SorterError::DuplicateItemId(item.id));
        }
    }
    Ok(())
}

/// Partition items into tie groups by win count, most wins first.
///
/// The sort is stable, so members of a group keep caller order. Two items
/// connected only through a chain containing a tie can land in different
/// groups even though neither beats the other — counts alone arbitrate.
/// That is the documented behavior, not a defect.
fn rank_groups(items: &[Item], graph: &PreferenceGraph) -> Vec<RankGroup> {
    let mut scored: Vec<(usize, &Item)> = items
        .iter()
        .map(|item| (graph.wins(item.id), item))
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0));

    let mut groups: Vec<RankGroup> = Vec::new();
    for (wins, item) in scored {
        match groups.last_mut() {
            Some(group) if group.wins == wins => group.members.push(item.clone()),
            _ => groups.push(RankGroup {
                members: vec![item.clone()],
                wins,
            }),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn items(n: i64) -> Vec<Item> {
        (1..=n).map(|id| Item::new(id, format!("Item {id}"))).collect()
    }

    /// Session with a pinned pair order for deterministic scenarios.
    fn seeded(n: i64, seed: u64) -> SorterState {
        SorterState::new_with_rng(items(n), &mut SmallRng::seed_from_u64(seed)).unwrap()
    }

    /// Drive `state` so the item with the lower ID always wins.
    fn finish_lower_id_wins(mut state: SorterState) -> SorterState {
        while let Some((left, right)) = state.current_pair() {
            state = if left < right {
                state.submit_left_wins()
            } else {
                state.submit_right_wins()
            };
        }
        state
    }

    #[test]
    fn test_empty_item_list_finishes_immediately() {
        let state = SorterState::new(vec![]).unwrap();
        assert!(state.is_finished());
        assert_eq!(state.ranking(), Some(&[][..]));
        assert!(state.current_pair().is_none());
    }

    #[test]
    fn test_single_item_finishes_immediately() {
        let state = SorterState::new(vec![Item::new(1, "Only")]).unwrap();
        assert!(state.is_finished());

        let ranking = state.ranking().unwrap();
        assert_eq!(ranking.len(), 1);
        assert_eq!(ranking[0].members.len(), 1);
        assert_eq!(ranking[0].members[0].id, 1);
        assert_eq!(ranking[0].wins, 0);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let list = vec![Item::new(1, "A"), Item::new(2, "B"), Item::new(1, "C")];
        assert_eq!(
            SorterState::new(list).unwrap_err(),
            SorterError::DuplicateItemId(1)
        );
    }

    #[test]
    fn test_initial_queue_has_all_pairs() {
        let state = seeded(4, 1);
        assert!(!state.is_finished());
        assert_eq!(state.remaining_comparisons(), 6);
        assert!(state.current_pair().is_some());
        assert_eq!(state.round(), 0);

        // Every unordered pair appears exactly once, in some orientation.
        for a in 1..=4i64 {
            for b in (a + 1)..=4 {
                let count = state
                    .pending()
                    .iter()
                    .filter(|&&p| p == (a, b) || p == (b, a))
                    .count();
                assert_eq!(count, 1, "pair ({a}, {b}) enqueued {count} times");
            }
        }
    }

    #[test]
    fn test_left_and_right_items_match_current_pair() {
        let state = seeded(3, 7);
        let (left, right) = state.current_pair().unwrap();
        assert_eq!(state.left_item().unwrap().id, left);
        assert_eq!(state.right_item().unwrap().id, right);
    }

    #[test]
    fn test_unrelated_pair_still_presented() {
        // 1 beats 2, then 1 beats 3. Nothing relates 2 and 3, so (2, 3)
        // must still be asked before the session can finish.
        let order: Vec<Pair> = vec![(1, 2), (1, 3), (2, 3)];
        let mut state = with_fixed_queue(items(3), order);

        state = state.submit_left_wins();
        state = state.submit_left_wins();

        assert!(!state.is_finished());
        assert_eq!(state.pending().iter().copied().collect::<Vec<_>>(), vec![(2, 3)]);
        assert_eq!(state.current_pair(), Some((2, 3)));
    }

    #[test]
    fn test_transitive_inference_prunes_queue() {
        // 1 beats 2, then 2 beats 3: closure answers (1, 3), so the
        // session finishes after exactly two judgments.
        let order: Vec<Pair> = vec![(1, 2), (2, 3), (1, 3)];
        let mut state = with_fixed_queue(items(3), order);

        state = state.submit_left_wins();
        assert!(state
            .pending()
            .iter()
            .any(|&p| p == (1, 3)), "(1, 3) should still be pending after one judgment");

        state = state.submit_left_wins();
        assert!(state.is_finished(), "(1, 3) should have been inferred, not asked");

        let ranking = state.ranking().unwrap();
        let ids: Vec<Vec<i64>> = ranking
            .iter()
            .map(|g| g.members.iter().map(|m| m.id).collect())
            .collect();
        assert_eq!(ids, vec![vec![1], vec![2], vec![3]]);
        assert_eq!(ranking[0].wins, 2);
        assert_eq!(ranking[1].wins, 1);
        assert_eq!(ranking[2].wins, 0);
    }

    #[test]
    fn test_chain_order_judgments_skip_most_pairs() {
        // All 10 pairs queued, but the adjacent pairs of the total order
        // come first. Each judgment links the next item under the previous
        // one and closure prunes every non-adjacent pair, so the session
        // takes n-1 = 4 judgments instead of 10.
        let order: Vec<Pair> = vec![
            (1, 2), (2, 3), (3, 4), (4, 5),
            (1, 3), (1, 4), (1, 5), (2, 4), (2, 5), (3, 5),
        ];
        let mut state = with_fixed_queue(items(5), order);

        let mut judged = 0;
        while !state.is_finished() {
            state = state.submit_left_wins();
            judged += 1;
        }
        assert_eq!(judged, 4);

        let ids: Vec<Vec<i64>> = state
            .ranking()
            .unwrap()
            .iter()
            .map(|g| g.members.iter().map(|m| m.id).collect())
            .collect();
        assert_eq!(ids, vec![vec![1], vec![2], vec![3], vec![4], vec![5]]);
    }

    #[test]
    fn test_adversarial_order_needs_every_pair() {
        // 4 items with the lower ID always winning, pairs presented so no
        // prefix ever forms a chain closure could extend: all of 1's pairs
        // first, then the 2/3/4 triangle top-down. Nothing is inferable at
        // any point, so all C(4,2) = 6 pairs must be asked.
        let order: Vec<Pair> = vec![(1, 2), (1, 3), (1, 4), (2, 3), (2, 4), (3, 4)];
        let mut state = with_fixed_queue(items(4), order);

        let mut judged = 0;
        while !state.is_finished() {
            state = state.submit_left_wins();
            judged += 1;
        }
        assert_eq!(judged, 6);
    }

    #[test]
    fn test_queue_shrinks_on_every_judgment() {
        let mut state = seeded(5, 23);
        let mut prev = state.remaining_comparisons();
        let mut toggle = false;
        while !state.is_finished() {
            // Alternate wins and ties; both must shrink the queue.
            state = if toggle {
                state.submit_tie()
            } else {
                state.submit_left_wins()
            };
            toggle = !toggle;

            let now = state.remaining_comparisons();
            assert!(now < prev, "queue went from {prev} to {now}");
            prev = now;
        }
    }

    #[test]
    fn test_terminates_within_pair_bound() {
        let n = 6i64;
        let bound = (n * (n - 1) / 2) as u32;
        let mut state = seeded(n, 41);
        let mut calls = 0u32;
        while !state.is_finished() {
            assert!(calls < bound, "session exceeded C(n,2) judgments");
            state = state.submit_left_wins();
            calls += 1;
        }

        let total: usize = state
            .ranking()
            .unwrap()
            .iter()
            .map(|g| g.members.len())
            .sum();
        assert_eq!(total, n as usize);
    }

    #[test]
    fn test_deterministic_given_fixed_shuffle() {
        let a = finish_lower_id_wins(seeded(5, 99));
        let b = finish_lower_id_wins(seeded(5, 99));
        assert_eq!(a.ranking(), b.ranking());
        assert_eq!(a.round(), b.round());
    }

    #[test]
    fn test_all_ties_yield_single_group() {
        let mut state = seeded(4, 5);
        while !state.is_finished() {
            state = state.submit_tie();
        }

        let ranking = state.ranking().unwrap();
        assert_eq!(ranking.len(), 1);
        assert_eq!(ranking[0].members.len(), 4);
        assert_eq!(ranking[0].wins, 0);
    }

    #[test]
    fn test_tie_adds_no_order_information() {
        let list = items(3);
        let order: Vec<Pair> = vec![(1, 2), (1, 3), (2, 3)];
        let mut state = with_fixed_queue(list, order);

        // Tie on (1, 2) leaves both later pairs unanswered.
        state = state.submit_tie();
        assert_eq!(state.remaining_comparisons(), 2);

        // 1 beats 3, then 2 beats 3: the tied items end up in the same
        // group here — but only because their win counts agree.
        state = state.submit_left_wins();
        state = state.submit_left_wins();

        let ranking = state.ranking().unwrap();
        assert_eq!(ranking.len(), 2);
        assert_eq!(ranking[0].members.len(), 2);
        assert_eq!(ranking[0].wins, 1);
        assert_eq!(ranking[1].members[0].id, 3);
    }

    #[test]
    fn test_tied_items_can_still_separate() {
        // Tie on (2, 3), then 2 beats 1 while 3 loses to 1: the tie did
        // not glue 2 and 3 together — counts separate them.
        let list = items(3);
        let order: Vec<Pair> = vec![(2, 3), (2, 1), (1, 3)];
        let mut state = with_fixed_queue(list, order);

        state = state.submit_tie();
        state = state.submit_left_wins(); // 2 beats 1
        state = state.submit_left_wins(); // 1 beats 3

        let ids: Vec<Vec<i64>> = state
            .ranking()
            .unwrap()
            .iter()
            .map(|g| g.members.iter().map(|m| m.id).collect())
            .collect();
        assert_eq!(ids, vec![vec![2], vec![1], vec![3]]);
    }

    #[test]
    fn test_submit_on_finished_state_is_noop() {
        let state = finish_lower_id_wins(seeded(3, 2));
        assert!(state.is_finished());

        let again = state.clone().submit_left_wins();
        assert_eq!(again, state);
        let again = state.clone().submit_tie();
        assert_eq!(again, state);
    }

    #[test]
    fn test_retained_clone_is_independent() {
        let before = seeded(4, 17);
        let checkpoint = before.clone();

        let after = before.submit_left_wins();
        assert_ne!(after.remaining_comparisons(), checkpoint.remaining_comparisons());

        // The checkpoint still replays to the same place.
        let replayed = checkpoint.submit_left_wins();
        assert_eq!(replayed, after);
    }

    #[test]
    fn test_round_counts_continuing_judgments() {
        let list = items(3);
        let order: Vec<Pair> = vec![(1, 2), (2, 3), (1, 3)];
        let mut state = with_fixed_queue(list, order);
        assert_eq!(state.round(), 0);

        state = state.submit_left_wins();
        assert_eq!(state.round(), 1);

        // Second judgment finishes the session (closure drops (1, 3));
        // the counter does not advance past the last presented pair.
        state = state.submit_left_wins();
        assert!(state.is_finished());
        assert_eq!(state.round(), 1);
    }

    #[test]
    fn test_metadata_carried_into_ranking() {
        let mut left = Item::new(1, "Tagged");
        left.image = Some("covers/tagged.png".into());
        left.tags.push(crate::types::Tag {
            id: 10,
            name: "keeper".into(),
        });
        let list = vec![left, Item::new(2, "Plain")];

        let state = SorterState::new_with_rng(list, &mut SmallRng::seed_from_u64(1))
            .unwrap()
            .apply(Judgment::LeftWins);
        assert!(state.is_finished());

        let winner = &state.ranking().unwrap()[0].members[0];
        let tagged = if winner.id == 1 {
            winner
        } else {
            &state.ranking().unwrap()[1].members[0]
        };
        assert_eq!(tagged.image.as_deref(), Some("covers/tagged.png"));
        assert_eq!(tagged.tags[0].name, "keeper");
    }

    /// Build a state with a hand-picked queue order, bypassing the
    /// shuffle, for scenarios that depend on presentation order.
    fn with_fixed_queue(list: Vec<Item>, order: Vec<Pair>) -> SorterState {
        let graph = PreferenceGraph::new(list.iter().map(|item| item.id));
        SorterState::from_parts(list, graph, order.into(), 0, false)
    }
}
