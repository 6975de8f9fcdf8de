//! Ambient loops: scarcity drift and the activity ticker
//!
//! Two independent periodic tasks that run for the whole session
//! lifetime regardless of stage. The scarcity loop nudges the slot and
//! player counts; the ticker loop swaps the banner activity and jitters
//! the bonus target, chasing the badge display after it.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, sleep, MissedTickBehavior};

use crate::core::session::{lock, retarget_badge, Shared};
use crate::{SCARCITY_PERIOD_MS, TICKER_PERIOD_MS, TICKER_SWAP_MS};

pub(crate) struct AmbientTicker {
    scarcity: JoinHandle<()>,
    ticker: JoinHandle<()>,
}

impl AmbientTicker {
    pub fn spawn(shared: Arc<Shared>) -> Self {
        Self {
            scarcity: tokio::spawn(scarcity_loop(shared.clone())),
            ticker: tokio::spawn(ticker_loop(shared)),
        }
    }
}

impl Drop for AmbientTicker {
    fn drop(&mut self) {
        self.scarcity.abort();
        self.ticker.abort();
    }
}

async fn scarcity_loop(shared: Arc<Shared>) {
    let mut period = interval(Duration::from_millis(SCARCITY_PERIOD_MS));
    period.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // First fire is immediate; the loop starts one period in
    period.tick().await;
    loop {
        period.tick().await;
        let event = {
            let mut state = lock(&shared.state);
            let mut gen = lock(&shared.gen);
            state.scarcity_tick(gen.rng())
        };
        shared.emit_one(event);
    }
}

async fn ticker_loop(shared: Arc<Shared>) {
    let mut period = interval(Duration::from_millis(TICKER_PERIOD_MS));
    period.set_missed_tick_behavior(MissedTickBehavior::Skip);
    period.tick().await;
    loop {
        // Hide on the period boundary, swap after the fade window. The
        // interval keeps an absolute schedule, so the inner sleep does
        // not drift the cycle.
        period.tick().await;
        let hidden = lock(&shared.state).ticker_hide();
        shared.emit_one(hidden);

        sleep(Duration::from_millis(TICKER_SWAP_MS)).await;
        let (events, target) = {
            let mut state = lock(&shared.state);
            let mut gen = lock(&shared.gen);
            state.ticker_swap(&mut gen)
        };
        shared.emit(events);
        retarget_badge(&shared, target);
    }
}
