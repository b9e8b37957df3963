use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

use crate::store::CaseStore;
use crate::undo::{UNDO_TICK, UndoState};

/// Drive the pending undo window of `store` until it closes.
///
/// Ticks every [`UNDO_TICK`]. Returns the window's final state: `Expired` when
/// the countdown runs out, or `Undone`/`Dismissed` when another task closed it
/// through the store in the meantime. Returns `None` if nothing was pending.
pub async fn run_undo_countdown(store: Arc<Mutex<CaseStore>>) -> Option<UndoState> {
    if store.lock().await.pending_undo().is_none() {
        return None;
    }

    let mut interval = tokio::time::interval_at(Instant::now() + UNDO_TICK, UNDO_TICK);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        interval.tick().await;
        let mut store = store.lock().await;
        match store.tick_undo() {
            Some(state) if state.is_active() => continue,
            Some(state) => {
                debug!(?state, "undo countdown finished");
                return Some(state);
            }
            None => {
                let state = store.last_closed_undo();
                debug!(?state, "undo window closed elsewhere");
                return state;
            }
        }
    }
}
