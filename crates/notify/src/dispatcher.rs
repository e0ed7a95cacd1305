//! Best-effort delivery across configured channels.
//!
//! Channels are tried in order; an individual channel failure is logged and
//! never blocks the remaining channels.

use std::time::Instant;

use crate::traits::{DispatchResult, Notification, Notifier};

/// Dispatches one notification to every configured channel.
pub struct Dispatcher {
    channels: Vec<Box<dyn Notifier>>,
}

impl Dispatcher {
    pub fn new(channels: Vec<Box<dyn Notifier>>) -> Self {
        Self { channels }
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Deliver a notification to all channels in order.
    ///
    /// Returns results for each channel delivery. Individual failures
    /// don't block other channels.
    pub async fn dispatch(&self, notification: &Notification) -> Vec<DispatchResult> {
        if self.channels.is_empty() {
            tracing::debug!("no notification channels configured");
            return Vec::new();
        }

        let mut results = Vec::with_capacity(self.channels.len());

        for channel in &self.channels {
            let start = Instant::now();
            let result = channel.send(notification).await;
            let duration_ms = start.elapsed().as_millis() as u64;

            let (success, error) = match result {
                Ok(()) => {
                    tracing::info!(
                        channel = channel.channel_name(),
                        duration_ms,
                        "notification delivered"
                    );
                    (true, None)
                }
                Err(e) => {
                    tracing::warn!(
                        channel = channel.channel_name(),
                        error = %e,
                        duration_ms,
                        "notification delivery failed"
                    );
                    (false, Some(e.to_string()))
                }
            };

            results.push(DispatchResult {
                channel: channel.channel_name().to_string(),
                success,
                error,
                duration_ms,
            });
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::NotifyError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct MockNotifier {
        name: String,
        send_count: Arc<AtomicUsize>,
        should_fail: bool,
    }

    #[async_trait::async_trait]
    impl Notifier for MockNotifier {
        async fn send(&self, _notification: &Notification) -> Result<(), NotifyError> {
            self.send_count.fetch_add(1, Ordering::SeqCst);
            if self.should_fail {
                Err(NotifyError::Config("mock failure".to_string()))
            } else {
                Ok(())
            }
        }
        fn channel_name(&self) -> &str {
            &self.name
        }
    }

    #[tokio::test]
    async fn dispatch_to_all_channels() {
        let count_a = Arc::new(AtomicUsize::new(0));
        let count_b = Arc::new(AtomicUsize::new(0));

        let dispatcher = Dispatcher::new(vec![
            Box::new(MockNotifier {
                name: "a".to_string(),
                send_count: count_a.clone(),
                should_fail: false,
            }),
            Box::new(MockNotifier {
                name: "b".to_string(),
                send_count: count_b.clone(),
                should_fail: false,
            }),
        ]);

        let notification = Notification::text("subject", "body");
        let results = dispatcher.dispatch(&notification).await;
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.success));
        assert_eq!(count_a.load(Ordering::SeqCst), 1);
        assert_eq!(count_b.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn partial_failure_doesnt_block() {
        let count = Arc::new(AtomicUsize::new(0));

        let dispatcher = Dispatcher::new(vec![
            Box::new(MockNotifier {
                name: "fail".to_string(),
                send_count: Arc::new(AtomicUsize::new(0)),
                should_fail: true,
            }),
            Box::new(MockNotifier {
                name: "ok".to_string(),
                send_count: count.clone(),
                should_fail: false,
            }),
        ]);

        let notification = Notification::text("subject", "body");
        let results = dispatcher.dispatch(&notification).await;
        assert_eq!(results.len(), 2);
        assert!(!results[0].success);
        assert!(results[0].error.as_deref().unwrap().contains("mock failure"));
        assert!(results[1].success);
        assert_eq!(count.load(Ordering::SeqCst), 1); // second channel still sent
    }

    #[tokio::test]
    async fn empty_dispatcher_returns_no_results() {
        let dispatcher = Dispatcher::new(Vec::new());
        let notification = Notification::text("subject", "body");
        let results = dispatcher.dispatch(&notification).await;
        assert!(results.is_empty());
    }
}
