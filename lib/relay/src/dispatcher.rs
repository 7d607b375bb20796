//! Webhook update dispatch.
//!
//! The webhook must acknowledge quickly or the platform redelivers. The
//! dispatcher checks the path credential, pushes the update onto a bounded
//! queue without waiting, and returns. A fixed pool of worker tasks drains
//! the queues and runs the orchestrator for each update.
//!
//! Each worker owns its own queue and updates are routed by chat id, so all
//! updates for one chat are handled by the same worker in arrival order.
//! Different chats spread across the pool.
//!
//! Workers are supervised: a panic inside one orchestration run is caught,
//! logged, reported to the chat with the generic error reply, and the worker
//! moves on to the next update. When a queue is full the update is dropped
//! with a warning rather than growing memory without bound.

use crate::error::DispatchError;
use crate::orchestrator::Orchestrator;
use futures::FutureExt;
use serde::Deserialize;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use voxbridge_messaging::Update;

/// Worker pool sizing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DispatchConfig {
    /// Number of concurrent orchestration workers.
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Updates that may wait for each worker before new ones are dropped.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

fn default_workers() -> usize {
    8
}

fn default_queue_capacity() -> usize {
    64
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

/// Cloneable entry point used by the webhook handler.
#[derive(Clone)]
pub struct DispatchHandle {
    token: Arc<str>,
    lanes: Arc<[mpsc::Sender<Update>]>,
}

impl std::fmt::Debug for DispatchHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let queued: usize = self
            .lanes
            .iter()
            .map(|lane| lane.max_capacity() - lane.capacity())
            .sum();
        f.debug_struct("DispatchHandle")
            .field("workers", &self.lanes.len())
            .field("queued", &queued)
            .finish_non_exhaustive()
    }
}

impl DispatchHandle {
    /// Checks the path credential of a webhook call.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::InvalidToken`] when `token` is not the bot
    /// token.
    pub fn authorize(&self, token: &str) -> Result<(), DispatchError> {
        if token != &*self.token {
            warn!("Rejected webhook call with invalid token");
            return Err(DispatchError::InvalidToken);
        }
        Ok(())
    }

    /// Accepts an update delivered under `token`.
    ///
    /// Returns as soon as the update is queued; processing happens later on a
    /// worker.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::InvalidToken`] when `token` is not the bot
    /// token, and [`DispatchError::QueueFull`] or [`DispatchError::Closed`]
    /// when the update cannot be queued.
    pub fn accept(&self, token: &str, update: Update) -> Result<(), DispatchError> {
        self.authorize(token)?;

        let lane = self.lane_for(&update);
        self.lanes[lane].try_send(update).map_err(|e| match e {
            mpsc::error::TrySendError::Full(update) => {
                warn!(
                    worker = lane,
                    update_id = ?update.update_id,
                    "Update queue full, dropping update"
                );
                DispatchError::QueueFull
            }
            mpsc::error::TrySendError::Closed(_) => DispatchError::Closed,
        })
    }

    /// Picks the worker for an update. Updates without a chat go to the
    /// first worker; the orchestrator ignores them anyway.
    fn lane_for(&self, update: &Update) -> usize {
        let lanes = self.lanes.len() as i64;
        update
            .chat_id()
            .map_or(0, |chat_id| chat_id.get().rem_euclid(lanes) as usize)
    }
}

/// Owns the worker pool.
pub struct Dispatcher {
    handle: DispatchHandle,
    workers: Vec<JoinHandle<()>>,
}

impl Dispatcher {
    /// Starts the worker pool. Must be called inside a tokio runtime.
    ///
    /// Zero workers or zero capacity are raised to one.
    pub fn start(
        orchestrator: Arc<Orchestrator>,
        token: impl Into<String>,
        config: &DispatchConfig,
    ) -> Self {
        let capacity = config.queue_capacity.max(1);
        let (lanes, workers): (Vec<_>, Vec<_>) = (0..config.workers.max(1))
            .map(|worker| {
                let (sender, receiver) = mpsc::channel(capacity);
                let task = tokio::spawn(run_worker(worker, receiver, Arc::clone(&orchestrator)));
                (sender, task)
            })
            .unzip();

        info!(
            workers = workers.len(),
            queue_capacity = capacity,
            "Update dispatcher started"
        );

        Self {
            handle: DispatchHandle {
                token: Arc::from(token.into()),
                lanes: Arc::from(lanes),
            },
            workers,
        }
    }

    /// Returns a handle for queueing updates.
    #[must_use]
    pub fn handle(&self) -> DispatchHandle {
        self.handle.clone()
    }

    /// Stops accepting work and waits for queued updates to finish.
    ///
    /// Handles cloned from this dispatcher keep the queues open; drop them
    /// first or this waits until they are gone.
    pub async fn shutdown(self) {
        let Self { handle, workers } = self;
        drop(handle);

        for worker in workers {
            if let Err(e) = worker.await {
                error!(error = %e, "Dispatcher worker ended abnormally");
            }
        }
        info!("Update dispatcher stopped");
    }
}

async fn run_worker(
    worker: usize,
    mut receiver: mpsc::Receiver<Update>,
    orchestrator: Arc<Orchestrator>,
) {
    while let Some(update) = receiver.recv().await {
        let run = AssertUnwindSafe(orchestrator.handle_update(&update)).catch_unwind();
        if run.await.is_ok() {
            continue;
        }

        error!(
            worker,
            update_id = ?update.update_id,
            chat_id = ?update.chat_id(),
            "Update processing panicked"
        );
        let report = AssertUnwindSafe(orchestrator.report_failure(&update)).catch_unwind();
        if report.await.is_err() {
            error!(worker, "Reporting a failed update panicked");
        }
    }
    debug!(worker, "Update queue closed, worker exiting");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::GENERIC_ERROR_REPLY;
    use crate::testing::{FakeSpeech, RecordingDelivery, ScriptedCompletion};
    use std::time::Duration;
    use voxbridge_conversation::{ConversationStore, InMemoryConversationStore, MessageRole};
    use voxbridge_core::ChatId;

    const TOKEN: &str = "123:secret";

    fn orchestrator(
        store: Arc<InMemoryConversationStore>,
        completion: ScriptedCompletion,
        delivery: RecordingDelivery,
    ) -> Arc<Orchestrator> {
        Arc::new(Orchestrator::new(
            store,
            Arc::new(completion),
            Arc::new(delivery),
            Arc::new(FakeSpeech::new()),
        ))
    }

    #[tokio::test]
    async fn wrong_token_is_rejected_before_queueing() {
        let completion = ScriptedCompletion::echo();
        let delivery = RecordingDelivery::new();
        let store = Arc::new(InMemoryConversationStore::new());
        let dispatcher = Dispatcher::start(
            orchestrator(store.clone(), completion.clone(), delivery.clone()),
            TOKEN,
            &DispatchConfig::default(),
        );

        let result = dispatcher
            .handle()
            .accept("not-the-token", Update::text(ChatId::new(1), "hi"));
        assert_eq!(result, Err(DispatchError::InvalidToken));

        dispatcher.shutdown().await;
        assert!(completion.calls().is_empty());
        assert!(delivery.calls().is_empty());
        assert_eq!(store.chat_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn accepted_updates_are_processed_before_shutdown_completes() {
        let delivery = RecordingDelivery::new();
        let store = Arc::new(InMemoryConversationStore::new());
        let dispatcher = Dispatcher::start(
            orchestrator(store.clone(), ScriptedCompletion::echo(), delivery.clone()),
            TOKEN,
            &DispatchConfig::default(),
        );

        let handle = dispatcher.handle();
        for chat in 1..=3 {
            handle
                .accept(TOKEN, Update::text(ChatId::new(chat), "hi"))
                .unwrap();
        }
        drop(handle);
        dispatcher.shutdown().await;

        assert_eq!(store.chat_count().await.unwrap(), 3);
        assert_eq!(delivery.texts().len(), 3);
    }

    #[tokio::test]
    async fn same_chat_updates_through_pool_keep_pairs_together() {
        let store = Arc::new(InMemoryConversationStore::new());
        let dispatcher = Dispatcher::start(
            orchestrator(
                store.clone(),
                ScriptedCompletion::echo().with_delay(Duration::from_millis(20)),
                RecordingDelivery::new(),
            ),
            TOKEN,
            &DispatchConfig {
                workers: 4,
                queue_capacity: 16,
            },
        );

        let handle = dispatcher.handle();
        handle.accept(TOKEN, Update::text(ChatId::new(7), "hi")).unwrap();
        handle.accept(TOKEN, Update::text(ChatId::new(7), "bye")).unwrap();
        drop(handle);
        dispatcher.shutdown().await;

        let transcript = store.snapshot(ChatId::new(7)).await.unwrap().unwrap();
        assert_eq!(transcript.len(), 5);
        let roles: Vec<_> = transcript.messages().iter().map(|m| m.role()).collect();
        assert_eq!(
            roles,
            [
                MessageRole::System,
                MessageRole::User,
                MessageRole::Assistant,
                MessageRole::User,
                MessageRole::Assistant,
            ]
        );
    }

    #[tokio::test]
    async fn full_queue_drops_update() {
        let store = Arc::new(InMemoryConversationStore::new());
        let dispatcher = Dispatcher::start(
            orchestrator(
                store.clone(),
                ScriptedCompletion::echo().with_delay(Duration::from_millis(200)),
                RecordingDelivery::new(),
            ),
            TOKEN,
            &DispatchConfig {
                workers: 1,
                queue_capacity: 1,
            },
        );
        let handle = dispatcher.handle();

        // First update occupies the single worker.
        handle.accept(TOKEN, Update::text(ChatId::new(1), "a")).unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        // Second fills the queue, third has nowhere to go.
        handle.accept(TOKEN, Update::text(ChatId::new(2), "b")).unwrap();
        let overflow = handle.accept(TOKEN, Update::text(ChatId::new(3), "c"));
        assert_eq!(overflow, Err(DispatchError::QueueFull));

        drop(handle);
        dispatcher.shutdown().await;
        assert_eq!(store.chat_count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn worker_survives_a_panicking_update() {
        let delivery = RecordingDelivery::new();
        let store = Arc::new(InMemoryConversationStore::new());
        let dispatcher = Dispatcher::start(
            orchestrator(
                store.clone(),
                ScriptedCompletion::panicking_on("boom"),
                delivery.clone(),
            ),
            TOKEN,
            &DispatchConfig {
                workers: 1,
                queue_capacity: 4,
            },
        );

        let handle = dispatcher.handle();
        handle.accept(TOKEN, Update::text(ChatId::new(1), "boom")).unwrap();
        handle.accept(TOKEN, Update::text(ChatId::new(2), "fine")).unwrap();
        drop(handle);
        dispatcher.shutdown().await;

        assert_eq!(
            delivery.texts(),
            [
                (ChatId::new(1), GENERIC_ERROR_REPLY.to_string()),
                (ChatId::new(2), "echo: fine".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn panic_is_reported_and_chat_history_stays_paired() {
        let delivery = RecordingDelivery::new();
        let store = Arc::new(InMemoryConversationStore::new());
        let dispatcher = Dispatcher::start(
            orchestrator(
                store.clone(),
                ScriptedCompletion::panicking_on("boom"),
                delivery.clone(),
            ),
            TOKEN,
            &DispatchConfig::default(),
        );

        let chat = ChatId::new(1);
        let handle = dispatcher.handle();
        handle.accept(TOKEN, Update::text(chat, "boom")).unwrap();
        handle.accept(TOKEN, Update::text(chat, "fine")).unwrap();
        drop(handle);
        dispatcher.shutdown().await;

        assert_eq!(
            delivery.texts(),
            [
                (chat, GENERIC_ERROR_REPLY.to_string()),
                (chat, "echo: fine".to_string()),
            ]
        );
        let transcript = store.snapshot(chat).await.unwrap().unwrap();
        assert_eq!(transcript.len() % 2, 1);
        let contents: Vec<_> = transcript.messages()[1..]
            .iter()
            .map(|m| m.content())
            .collect();
        assert_eq!(contents, ["fine", "echo: fine"]);
    }

    #[tokio::test]
    async fn same_chat_updates_are_processed_in_arrival_order() {
        let store = Arc::new(InMemoryConversationStore::new());
        let dispatcher = Dispatcher::start(
            orchestrator(
                store.clone(),
                ScriptedCompletion::echo().with_delay(Duration::from_millis(5)),
                RecordingDelivery::new(),
            ),
            TOKEN,
            &DispatchConfig {
                workers: 4,
                queue_capacity: 32,
            },
        );

        let handle = dispatcher.handle();
        for i in 0..10 {
            handle
                .accept(TOKEN, Update::text(ChatId::new(7), format!("m{i}")))
                .unwrap();
            // Other chats interleave on the remaining workers.
            handle
                .accept(TOKEN, Update::text(ChatId::new(100 + i), "noise"))
                .unwrap();
        }
        drop(handle);
        dispatcher.shutdown().await;

        let transcript = store.snapshot(ChatId::new(7)).await.unwrap().unwrap();
        let users: Vec<_> = transcript
            .messages()
            .iter()
            .filter(|m| m.role() == MessageRole::User)
            .map(|m| m.content().to_string())
            .collect();
        let expected: Vec<_> = (0..10).map(|i| format!("m{i}")).collect();
        assert_eq!(users, expected);
    }

    #[test]
    fn negative_chat_ids_route_to_a_valid_worker() {
        let (sender, _receiver) = mpsc::channel(1);
        let handle = DispatchHandle {
            token: Arc::from(TOKEN),
            lanes: Arc::from(vec![sender.clone(), sender.clone(), sender]),
        };

        let group = Update::text(ChatId::new(-1_001_234_567_890), "hi");
        assert!(handle.lane_for(&group) < 3);
        assert_eq!(handle.lane_for(&Update::default()), 0);
    }
}
