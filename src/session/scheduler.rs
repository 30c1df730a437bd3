// Copyright 2026 Dissent Contributors.
//
// This file is licensed under the GNU General Public License v3.0 or later
// <https://www.gnu.org/licenses/gpl-3.0.html>. This file may not be copied,
// modified, or distributed except according to that license.

//! `Scheduler`: the explicit-timer seam spec.md §9's Design Note asks
//! for ("the source uses `QTimer`/`TimerEvent`; in the spec and port
//! these are explicit `schedule_once`/`schedule_periodic` submissions"),
//! grounded on the timer-token idiom of
//! `examples/fakelionel-safe_network/src/node/stage/joining.rs`
//! (`core.timer.schedule(..) -> token`, `handle_timeout(core, token)`).
//!
//! Every caller that arms a timer stores the returned [`TimerToken`] and
//! compares it against whatever token later fires, so a timer that fires
//! after its owner already moved on (cancelled, replaced, or the owning
//! session stopped) is silently ignored rather than acted on twice
//! (spec.md §5, "a fired-but-queued timer whose owner has stopped must
//! be ignored").

use std::collections::HashMap;
use std::time::Duration;

pub type TimerToken = u64;

/// Registers a one-shot timer and allows cancelling it. Cancelling an
/// already-fired or unknown token is always safe (spec.md §5).
pub trait Scheduler: Send {
    fn schedule_once(&mut self, after: Duration) -> TimerToken;
    fn cancel(&mut self, token: TimerToken);
}

/// A real scheduler backed by `tokio::time`: each `schedule_once` spawns
/// a task that sleeps and then posts its token on an unbounded channel,
/// which the owning event loop polls alongside its other event sources.
pub struct TokioScheduler {
    next_token: TimerToken,
    sender: tokio::sync::mpsc::UnboundedSender<TimerToken>,
    handles: HashMap<TimerToken, tokio::task::JoinHandle<()>>,
}

impl TokioScheduler {
    pub fn new() -> (Self, tokio::sync::mpsc::UnboundedReceiver<TimerToken>) {
        let (sender, receiver) = tokio::sync::mpsc::unbounded_channel();
        (
            TokioScheduler {
                next_token: 0,
                sender,
                handles: HashMap::new(),
            },
            receiver,
        )
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_once(&mut self, after: Duration) -> TimerToken {
        let token = self.next_token;
        self.next_token += 1;
        let sender = self.sender.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(after).await;
            let _ = sender.send(token);
        });
        self.handles.insert(token, handle);
        token
    }

    fn cancel(&mut self, token: TimerToken) {
        if let Some(handle) = self.handles.remove(&token) {
            handle.abort();
        }
    }
}

/// A manual scheduler for tests: `schedule_once` just hands out the next
/// token, and the test fires it explicitly by calling the handler under
/// test with that token.
#[derive(Default)]
pub struct ManualScheduler {
    next_token: TimerToken,
    pub scheduled: Vec<(TimerToken, Duration)>,
    pub cancelled: Vec<TimerToken>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_once(&mut self, after: Duration) -> TimerToken {
        let token = self.next_token;
        self.next_token += 1;
        self.scheduled.push((token, after));
        token
    }

    fn cancel(&mut self, token: TimerToken) {
        self.cancelled.push(token);
    }
}
