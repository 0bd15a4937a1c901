/// Item-count threshold above which callers should warn before starting a
/// session.
///
/// Both the preference graph and the pending-pair queue are O(n²) in the
/// item count: n = 300 already means 44,850 pairs enqueued up front. The
/// engine stays correct beyond this, but a session that size asks the user
/// for tens of thousands of judgments in the worst case, and the intended
/// use is user-curated sets, not bulk collections.
pub const LARGE_SET_THRESHOLD: usize = 300;
