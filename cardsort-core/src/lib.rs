/// cardsort-core: Pure-computation pairwise ranking engine.
///
/// Pairwise judgments → transitively closed preference graph → rank groups
/// by win count. No IO, no HTTP, no filesystem — just the state machine.
/// Bring your own judgment source.
///
/// Items are identified by caller-provided `i64` IDs. Display metadata
/// (name, image reference, tags) rides along untouched. Every judgment a
/// user makes is folded into a "beats" graph kept transitively closed, and
/// every pending pair the closure can already answer is skipped — one
/// judgment can resolve many comparisons.
///
/// # Quick start
///
/// ```rust
/// use cardsort_core::{Item, SorterState};
///
/// let items = vec![
///     Item::new(1, "Alpha"),
///     Item::new(2, "Beta"),
///     Item::new(3, "Gamma"),
/// ];
///
/// let mut state = SorterState::new(items).unwrap();
/// while !state.is_finished() {
///     // Render state.left_item() / state.right_item() and ask the user.
///     // Here the left card always wins.
///     state = state.submit_left_wins();
/// }
///
/// let ranked: usize = state.ranking().unwrap().iter().map(|g| g.members.len()).sum();
/// assert_eq!(ranked, 3);
/// ```

pub mod constants;
pub mod graph;
pub mod sorter;
pub mod types;
pub mod wire;

// Re-export primary public API at crate root.
pub use constants::LARGE_SET_THRESHOLD;
pub use graph::PreferenceGraph;
pub use sorter::SorterState;
pub use types::{Item, Judgment, Pair, RankGroup, SorterError, Tag};
pub use wire::WireState;
