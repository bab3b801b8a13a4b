//! The client feedback queue: a single-threaded cooperative FIFO
//! that guarantees one plan plays at a time, strictly in arrival order,
//! even if a new server update lands mid-playback.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use crate::overlay::Overlay;
use crate::plan::{self, FeedbackEvent};

/// One executed step, handed to the caller's sink as playback proceeds so
/// a renderer can react without owning the queue loop itself.
pub trait FeedbackSink: Send + 'static {
    fn on_event(&mut self, overlay: &Overlay, event: &FeedbackEvent);
}

enum Job {
    Plan { plan: Vec<FeedbackEvent>, done: oneshot::Sender<()> },
}

/// A handle to the background task that drains plans one at a time.
/// Cloning is cheap; every clone enqueues onto the same executor.
#[derive(Clone)]
pub struct FeedbackQueue {
    sender: mpsc::UnboundedSender<Job>,
    battle_in_progress: Arc<AtomicBool>,
}

impl FeedbackQueue {
    /// Spawns the executor task against `overlay`'s starting state, driving
    /// each settled step through `sink`.
    pub fn spawn(overlay: Overlay, mut sink: impl FeedbackSink) -> Self {
        let (sender, mut receiver) = mpsc::unbounded_channel::<Job>();
        let battle_in_progress = Arc::new(AtomicBool::new(false));
        let flag = battle_in_progress.clone();

        tokio::spawn(async move {
            let mut overlay = overlay;
            while let Some(Job::Plan { plan, done }) = receiver.recv().await {
                for event in &plan {
                    if matches!(event, FeedbackEvent::Conquest { .. }) {
                        flag.store(true, Ordering::SeqCst);
                    }
                    sink.on_event(&overlay, event);
                    let delay = event.total_delay_ms();
                    if delay > 0 {
                        tokio::time::sleep(Duration::from_millis(delay)).await;
                    }
                    plan::settle(&mut overlay, event);
                    if matches!(event, FeedbackEvent::Conquest { .. }) {
                        flag.store(false, Ordering::SeqCst);
                    }
                }
                // The sender may already be gone if the caller dropped its
                // completion handle; that's fine, it just means nobody is
                // awaiting this particular plan.
                let _ = done.send(());
            }
            debug!("feedback queue executor exiting: no more senders");
        });

        Self { sender, battle_in_progress }
    }

    /// Enqueues `plan` and returns a future that resolves once it (and
    /// every plan queued ahead of it) has finished playing.
    pub fn enqueue(&self, plan: Vec<FeedbackEvent>) -> oneshot::Receiver<()> {
        let (done, receiver) = oneshot::channel();
        // An executor that has shut down silently drops the job; the
        // caller's receiver then resolves to `Err`, which callers treat
        // the same as "already settled" since there's nothing left to wait
        // on.
        let _ = self.sender.send(Job::Plan { plan, done });
        receiver
    }

    /// True while a conquest step's battle animation is mid-playback.
    /// Local end-of-turn must be deferred while this holds.
    pub fn battle_in_progress(&self) -> bool {
        self.battle_in_progress.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::model::player::Player;
    use common::model::region::Region;
    use common::model::state::GameState;
    use common::rng::RngSeed;

    struct CountingSink {
        count: std::sync::Arc<std::sync::atomic::AtomicUsize>,
    }

    impl FeedbackSink for CountingSink {
        fn on_event(&mut self, _overlay: &Overlay, _event: &FeedbackEvent) {
            self.count.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn empty_state() -> GameState {
        let regions = vec![Region::new(0, 0.0, 0.0)];
        let players = vec![Player::human(0, "P0", "red")];
        GameState::new(regions, players, 0, RngSeed::from_u64(1))
    }

    #[tokio::test]
    async fn plans_execute_in_enqueue_order_and_signal_completion() {
        let count = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let queue = FeedbackQueue::spawn(Overlay::new(empty_state()), CountingSink { count: count.clone() });

        let plan_a = vec![FeedbackEvent::Recruitment { region: 0, delay_ms: 0 }];
        let plan_b = vec![FeedbackEvent::Upgrade { region: 0, delay_ms: 0 }];

        let first = queue.enqueue(plan_a);
        let second = queue.enqueue(plan_b);
        first.await.unwrap();
        second.await.unwrap();

        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn battle_in_progress_clears_after_conquest_settles() {
        let queue = FeedbackQueue::spawn(Overlay::new(empty_state()), CountingSink { count: Default::default() });
        let plan = vec![FeedbackEvent::Conquest {
                source: None,
                target: 0,
                count: 0,
                attack_sequence: Vec::new(),
                new_owner: 0,
        }];
        let done = queue.enqueue(plan);
        done.await.unwrap();
        assert!(!queue.battle_in_progress());
    }
}

