//! Cancellable one-shot timers for the timed phases of a battle.
//!
//! The runner hands out a fresh [`TimerTicket`] for every scheduled
//! [`TimerEvent`] and only accepts the ticket it is waiting for, so a timer
//! that fires after it was replaced does nothing.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::trace;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerTicket(pub u64);

/// The timed continuations of the battle state machine.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// The coin result has been shown; the first turn begins.
    CoinTossSettled,
    /// The acting side is still recharging and loses this turn.
    RechargeSkip,
    /// The CPU picks its move.
    CpuAct,
    /// The move animation is over; apply its effects.
    ResolveMove,
    /// End-of-turn effects have been shown; hand the turn over.
    EndTurn,
}

pub trait Scheduler: Send {
    fn schedule(&mut self, ticket: TimerTicket, delay: Duration);
    fn cancel(&mut self, ticket: TimerTicket);
}

#[derive(Debug, Default)]
struct ManualRecord {
    scheduled: Vec<(TimerTicket, Duration)>,
    canceled: Vec<TimerTicket>,
}

/// Records requests without ever firing. Tests fire the pending timer by hand.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    record: Arc<Mutex<ManualRecord>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every schedule call so far, in order.
    pub fn scheduled(&self) -> Vec<(TimerTicket, Duration)> {
        self.record
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .scheduled
            .clone()
    }

    pub fn canceled(&self) -> Vec<TimerTicket> {
        self.record
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .canceled
            .clone()
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&mut self, ticket: TimerTicket, delay: Duration) {
        self.record
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .scheduled
            .push((ticket, delay));
    }

    fn cancel(&mut self, ticket: TimerTicket) {
        self.record
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .canceled
            .push(ticket);
    }
}

/// Sleeps on the tokio runtime and delivers due tickets over a channel.
///
/// Must be used from within a tokio runtime.
pub struct TokioScheduler {
    sender: UnboundedSender<TimerTicket>,
    tasks: HashMap<TimerTicket, JoinHandle<()>>,
}

impl TokioScheduler {
    pub fn new() -> (Self, UnboundedReceiver<TimerTicket>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (
            Self {
                sender,
                tasks: HashMap::new(),
            },
            receiver,
        )
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&mut self, ticket: TimerTicket, delay: Duration) {
        self.tasks.retain(|_, task| !task.is_finished());
        let sender = self.sender.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // The receiver is gone once the front-end shuts down.
            let _ = sender.send(ticket);
        });
        self.tasks.insert(ticket, task);
    }

    fn cancel(&mut self, ticket: TimerTicket) {
        if let Some(task) = self.tasks.remove(&ticket) {
            task.abort();
            trace!(ticket = ticket.0, "timer aborted");
        }
    }
}
