/// Interactive judging session: the judgment source for the engine.
///
/// Reads one command per line from stdin. Undo works by retaining a clone
/// of each predecessor state — transitions consume the state, so retained
/// copies share nothing with the live one. Also owns the two transport
/// encodings for suspended sessions: a pretty-JSON state file and a
/// URL-safe base64 continuation token.
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use cardsort_core::{Item, SorterState, WireState};
use std::io::{self, BufRead, Write};
use std::path::Path;

use crate::bail;

pub enum SessionEnd {
    Finished(SorterState),
    /// Quit (or stdin closed) before the queue drained.
    Suspended(SorterState),
}

const HELP: &str = "\
  1 or l   left item wins
  2 or r   right item wins
  t or =   tie (no preference)
  u        undo the previous judgment
  q        quit, keeping the session resumable
  ?        show this help";

fn format_item(item: &Item) -> String {
    if item.tags.is_empty() {
        item.name.clone()
    } else {
        let tags: Vec<&str> = item.tags.iter().map(|t| t.name.as_str()).collect();
        format!("{} [{}]", item.name, tags.join(", "))
    }
}

/// Drive `state` to completion or suspension against stdin.
pub fn run(
    mut state: SorterState,
    criterion: &str,
    state_path: Option<&Path>,
    verbose: bool,
) -> SessionEnd {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut undo_stack: Vec<SorterState> = Vec::new();

    while !state.is_finished() {
        let (left, right) = match (state.left_item(), state.right_item()) {
            (Some(l), Some(r)) => (format_item(l), format_item(r)),
            // Unfinished states always expose a pair; bail rather than spin.
            _ => bail("session state lost its current pair"),
        };

        println!();
        println!("{criterion}");
        println!("  [1] {left}");
        println!("  [2] {right}");
        print!("(1/2/t/u/q/?) > ");
        if let Err(e) = io::stdout().flush() {
            bail(format!("Failed to write prompt: {e}"));
        }

        let Some(line) = lines.next() else {
            // stdin closed mid-session: treat like quit.
            return SessionEnd::Suspended(state);
        };
        let line = line.unwrap_or_else(|e| bail(format!("Failed to read from stdin: {e}")));

        match line.trim() {
            "1" | "l" => {
                undo_stack.push(state.clone());
                state = state.submit_left_wins();
            }
            "2" | "r" => {
                undo_stack.push(state.clone());
                state = state.submit_right_wins();
            }
            "t" | "=" => {
                undo_stack.push(state.clone());
                state = state.submit_tie();
            }
            "u" => match undo_stack.pop() {
                Some(previous) => state = previous,
                None => {
                    println!("Nothing to undo.");
                    continue;
                }
            },
            "q" => return SessionEnd::Suspended(state),
            "?" | "h" | "help" => {
                println!("{HELP}");
                continue;
            }
            "" => continue,
            other => {
                println!("Unrecognized input \"{other}\". Type ? for help.");
                continue;
            }
        }

        if let Some(path) = state_path {
            save_state_file(path, &state);
        }
        if verbose && !state.is_finished() {
            eprintln!(
                "  {} judged, at most {} to go",
                state.round(),
                state.remaining_comparisons(),
            );
        }
    }

    SessionEnd::Finished(state)
}

/// Write the session snapshot as pretty JSON.
pub fn save_state_file(path: &Path, state: &SorterState) {
    let json = serde_json::to_string_pretty(&state.to_wire())
        .unwrap_or_else(|e| bail(format!("Failed to encode session state: {e}")));
    std::fs::write(path, json)
        .unwrap_or_else(|e| bail(format!("Failed to write state to {}: {e}", path.display())));
}

/// Read a session snapshot written by `save_state_file`.
pub fn load_state_file(path: &Path) -> WireState {
    let content = std::fs::read_to_string(path)
        .unwrap_or_else(|e| bail(format!("Failed to read state from {}: {e}", path.display())));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| bail(format!("State file {} is not valid: {e}", path.display())))
}

/// URL-safe continuation token: base64 over the JSON snapshot.
pub fn encode_token(state: &SorterState) -> String {
    let json = serde_json::to_vec(&state.to_wire())
        .unwrap_or_else(|e| bail(format!("Failed to encode session token: {e}")));
    URL_SAFE_NO_PAD.encode(json)
}

pub fn decode_token(token: &str) -> WireState {
    let bytes = URL_SAFE_NO_PAD
        .decode(token.trim())
        .unwrap_or_else(|e| bail(format!("Invalid session token: {e}")));
    serde_json::from_slice(&bytes)
        .unwrap_or_else(|e| bail(format!("Invalid session token: {e}")))
}
