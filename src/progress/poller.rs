//! Fixed-interval progress polling, cancellable at any time.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::api::{ProgressSource, ProgressUpdate};

/// A running poll loop.
pub struct PollHandle {
    job_id: String,
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl PollHandle {
    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// Stop polling. Safe to call more than once.
    pub fn stop(&self) {
        self.token.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the loop to exit.
    pub async fn join(self) {
        if let Err(e) = self.task.await {
            warn!("Progress poller for {} ended abnormally: {}", self.job_id, e);
        }
    }
}

/// Poll `source` for `job_id` every `interval` until the job reports done
/// or the handle is stopped. Fetch failures are logged and retried on the
/// next tick.
pub fn spawn<S, F>(source: Arc<S>, job_id: impl Into<String>, interval: Duration, mut on_update: F) -> PollHandle
where
    S: ProgressSource,
    F: FnMut(ProgressUpdate) + Send + 'static,
{
    let job_id = job_id.into();
    let token = CancellationToken::new();

    let task = tokio::spawn({
        let token = token.clone();
        let job_id = job_id.clone();
        async move {
            info!("Polling progress for job {} every {:?}", job_id, interval);
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        info!("Progress polling for job {} stopped", job_id);
                        break;
                    }
                    _ = ticker.tick() => {}
                }

                // An in-flight fetch is abandoned as soon as the handle is stopped
                let result = tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        info!("Progress polling for job {} stopped mid-request", job_id);
                        break;
                    }
                    result = source.fetch(&job_id) => result,
                };

                match result {
                    Ok(update) => {
                        if token.is_cancelled() {
                            break;
                        }
                        debug!("Job {} progress: {}%", job_id, update.percent());
                        let done = update.done;
                        on_update(update);
                        if done {
                            info!("Job {} complete", job_id);
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("Failed to fetch progress for job {}: {}", job_id, e);
                    }
                }
            }
        }
    });

    PollHandle { job_id, token, task }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::future::Future;
    use std::sync::Mutex;

    use super::*;
    use crate::progress::api::ProgressError;

    struct ScriptedSource {
        replies: Mutex<VecDeque<Result<ProgressUpdate, ProgressError>>>,
    }

    impl ScriptedSource {
        fn new(replies: Vec<Result<ProgressUpdate, ProgressError>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
            })
        }
    }

    impl ProgressSource for ScriptedSource {
        fn fetch(&self, _job_id: &str) -> impl Future<Output = Result<ProgressUpdate, ProgressError>> + Send {
            let reply = self.replies.lock().unwrap().pop_front().unwrap_or_else(|| {
                Ok(ProgressUpdate {
                    status: "Waiting".into(),
                    ..Default::default()
                })
            });
            async move { reply }
        }
    }

    fn update(completed: u64, done: bool) -> ProgressUpdate {
        ProgressUpdate {
            completed,
            total: 4,
            status: "Syncing".into(),
            done,
        }
    }

    #[tokio::test]
    async fn test_stops_when_done_and_survives_errors() {
        let source = ScriptedSource::new(vec![
            Ok(update(1, false)),
            Err(ProgressError::Status(502)),
            Ok(update(4, true)),
            Ok(update(9, false)),
        ]);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();

        let handle = spawn(source, "job-1", Duration::from_millis(5), move |u| {
            sink.lock().unwrap().push(u.percent());
        });
        tokio::time::timeout(Duration::from_secs(2), handle.join())
            .await
            .unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![25, 100]);
    }

    #[tokio::test]
    async fn test_stop_cancels() {
        let source = ScriptedSource::new(vec![]);
        let handle = spawn(source, "job-2", Duration::from_millis(5), |_| {});
        assert_eq!(handle.job_id(), "job-2");

        handle.stop();
        handle.stop();
        tokio::time::timeout(Duration::from_secs(2), handle.join())
            .await
            .unwrap();
    }

    struct StalledSource {
        delay: Duration,
    }

    impl ProgressSource for StalledSource {
        fn fetch(&self, _job_id: &str) -> impl Future<Output = Result<ProgressUpdate, ProgressError>> + Send {
            let delay = self.delay;
            async move {
                tokio::time::sleep(delay).await;
                Ok(ProgressUpdate {
                    status: "late".into(),
                    done: true,
                    ..Default::default()
                })
            }
        }
    }

    #[tokio::test]
    async fn test_stop_abandons_request_in_flight() {
        let source = Arc::new(StalledSource {
            delay: Duration::from_millis(200),
        });
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();

        let handle = spawn(source, "job-3", Duration::from_millis(5), move |u| {
            sink.lock().unwrap().push(u.status);
        });
        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.stop();

        let started = std::time::Instant::now();
        tokio::time::timeout(Duration::from_secs(2), handle.join())
            .await
            .unwrap();

        assert!(started.elapsed() < Duration::from_millis(100));
        // Give a late reply the chance to arrive
        tokio::time::sleep(Duration::from_millis(250)).await;
        assert!(seen.lock().unwrap().is_empty());
    }
}
