/// Output formatting: terminal table and JSON.
use cardsort_core::SorterState;
use serde::Serialize;

#[derive(Serialize)]
struct JsonRankedItem {
    rank: usize,
    id: i64,
    name: String,
    wins: usize,
    tags: Vec<String>,
}

#[derive(Serialize)]
struct JsonOutput {
    items: Vec<JsonRankedItem>,
    total_items: usize,
    judgments: usize,
    comparisons_inferred: usize,
}

fn tag_names(item: &cardsort_core::Item) -> Vec<String> {
    item.tags.iter().map(|t| t.name.clone()).collect()
}

/// Judgments actually made: the round counter counts continuing judgments,
/// so the one that drained the queue adds one more. Trivial sessions (fewer
/// than two items) never saw a judgment.
fn judgment_count(state: &SorterState) -> usize {
    if state.items().len() < 2 {
        0
    } else {
        state.round() as usize + 1
    }
}

fn inferred_count(state: &SorterState) -> usize {
    let n = state.items().len();
    (n * n.saturating_sub(1) / 2).saturating_sub(judgment_count(state))
}

/// Print the finished ranking as a formatted terminal table.
///
/// Tied items share a rank number, marked with '='.
pub fn print_table(state: &SorterState) {
    let Some(groups) = state.ranking() else {
        return;
    };

    let name_width = groups
        .iter()
        .flat_map(|g| g.members.iter())
        .map(|m| m.name.len())
        .max()
        .unwrap_or(4)
        .max(4); // at least "Item"

    println!("Rank | {:<name_width$} | Wins | Tags", "Item");
    println!("-----|-{}-|------|-----", "-".repeat(name_width));

    for (group_idx, group) in groups.iter().enumerate() {
        let tied = group.members.len() > 1;
        for member in &group.members {
            let rank = if tied {
                format!("={}", group_idx + 1)
            } else {
                format!("{}", group_idx + 1)
            };
            println!(
                "{:>4} | {:<name_width$} | {:>4} | {}",
                rank,
                member.name,
                group.wins,
                tag_names(member).join(", "),
            );
        }
    }

    println!(
        "\n{} items ranked in {} groups after {} judgments ({} comparisons inferred)",
        state.items().len(),
        groups.len(),
        judgment_count(state),
        inferred_count(state),
    );
}

/// Print the finished ranking as JSON.
pub fn print_json(state: &SorterState) {
    let Some(groups) = state.ranking() else {
        return;
    };

    let items: Vec<JsonRankedItem> = groups
        .iter()
        .enumerate()
        .flat_map(|(group_idx, group)| {
            group.members.iter().map(move |member| JsonRankedItem {
                rank: group_idx + 1,
                id: member.id,
                name: member.name.clone(),
                wins: group.wins,
                tags: tag_names(member),
            })
        })
        .collect();

    let output = JsonOutput {
        total_items: state.items().len(),
        judgments: judgment_count(state),
        comparisons_inferred: inferred_count(state),
        items,
    };

    match serde_json::to_string_pretty(&output) {
        Ok(json) => println!("{json}"),
        Err(e) => crate::bail(format!("Failed to encode output: {e}")),
    }
}
