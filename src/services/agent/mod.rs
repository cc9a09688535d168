//! Supervisor-driven conversation graph.
//!
//! ```text
//! supervisor ──information_node──> information handler ──┐
//!     ^      ──booking_node──────> booking handler ──────┤
//!     └──────────────────────────────────────────────────┘
//!     └──FINISH──> end
//! ```

pub mod handlers;
pub mod supervisor;

use crate::models::{ConversationState, Route};
use crate::state::AppState;

/// Drives one user turn through the graph until the supervisor answers FINISH.
///
/// Every node execution counts against `recursion_limit`; exceeding it is an error.
pub async fn run(state: &AppState, conversation: &mut ConversationState) -> anyhow::Result<()> {
    let limit = state.config.recursion_limit;
    let mut steps = 0usize;

    loop {
        advance(&mut steps, limit)?;
        let decision = supervisor::supervise(state.llm.as_ref(), conversation).await?;

        match decision.route {
            Route::Finish => return Ok(()),
            Route::Information => {
                advance(&mut steps, limit)?;
                handlers::information_node(state, conversation).await?;
            }
            Route::Booking => {
                advance(&mut steps, limit)?;
                handlers::booking_node(state, conversation).await;
            }
        }
    }
}

fn advance(steps: &mut usize, limit: usize) -> anyhow::Result<()> {
    *steps += 1;
    if *steps > limit {
        anyhow::bail!("Recursion limit of {limit} reached without hitting a stop condition");
    }
    Ok(())
}
