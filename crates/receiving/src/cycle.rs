use async_trait::async_trait;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::ReceiveError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Received,
    /// Diffing receivers report this when the remote state matches the
    /// committed snapshot; nothing was written, no event fired.
    NoChange,
}

/// One periodic polling task against a remote resource.
#[async_trait]
pub trait CyclicReceiver: Send {
    /// Diagnostic label. Never used for control decisions.
    fn name(&self) -> String;

    /// Current polling interval. Called before every wait so configuration
    /// changes apply to the next cycle without restarting the loop.
    fn interval(&self) -> Duration;

    async fn do_receive(&mut self) -> Result<CycleOutcome, ReceiveError>;
}

pub struct ReceiverHandle {
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl ReceiverHandle {
    /// Cooperative stop: a pending wait is cancelled immediately, an
    /// in-flight cycle runs to completion before the loop exits.
    pub async fn stop(self) {
        self.token.cancel();
        if let Err(e) = self.task.await {
            warn!("receiver task ended abnormally: {e}");
        }
    }
}

/// Drives one receiver: wait, execute, handle outcome, repeat. The receiver
/// is owned by the loop task and invoked sequentially, so at most one
/// `do_receive` per receiver is ever in flight.
pub fn spawn_receiver<R>(mut receiver: R, token: CancellationToken) -> ReceiverHandle
where
    R: CyclicReceiver + 'static,
{
    let loop_token = token.clone();
    let task = tokio::spawn(async move {
        let name = receiver.name();
        debug!(receiver = %name, "receiver loop started");
        loop {
            let wait = receiver.interval();
            tokio::select! {
                _ = loop_token.cancelled() => break,
                _ = tokio::time::sleep(wait) => {}
            }

            // 周期一旦开始就跑完，取消只在下一次等待前生效
            match receiver.do_receive().await {
                Ok(CycleOutcome::Received) => {
                    debug!(receiver = %name, "receive cycle completed");
                }
                Ok(CycleOutcome::NoChange) => {
                    debug!(receiver = %name, "receive cycle completed, no change");
                }
                // 单个周期失败不终止循环，下一个周期就是重试
                Err(e) => warn!(receiver = %name, "receive cycle failed: {e}"),
            }

            if loop_token.is_cancelled() {
                break;
            }
        }
        debug!(receiver = %name, "receiver loop stopped");
    });

    ReceiverHandle { token, task }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use tokio::sync::Notify;
    use tokio::time::Instant;

    struct Probe {
        interval_secs: Arc<AtomicU64>,
        calls: Arc<AtomicUsize>,
        active: Arc<AtomicUsize>,
        max_active: Arc<AtomicUsize>,
        started_at: Arc<Mutex<Vec<Instant>>>,
        cycle_time: Duration,
        fail: bool,
        on_first_call: Option<Box<dyn FnOnce() + Send>>,
    }

    impl Probe {
        fn new(interval_secs: u64) -> Self {
            Self {
                interval_secs: Arc::new(AtomicU64::new(interval_secs)),
                calls: Arc::new(AtomicUsize::new(0)),
                active: Arc::new(AtomicUsize::new(0)),
                max_active: Arc::new(AtomicUsize::new(0)),
                started_at: Arc::new(Mutex::new(Vec::new())),
                cycle_time: Duration::ZERO,
                fail: false,
                on_first_call: None,
            }
        }
    }

    #[async_trait]
    impl CyclicReceiver for Probe {
        fn name(&self) -> String {
            "probe".into()
        }

        fn interval(&self) -> Duration {
            Duration::from_secs(self.interval_secs.load(Ordering::SeqCst))
        }

        async fn do_receive(&mut self) -> Result<CycleOutcome, ReceiveError> {
            let running = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_active.fetch_max(running, Ordering::SeqCst);
            self.started_at.lock().unwrap().push(Instant::now());
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                if let Some(hook) = self.on_first_call.take() {
                    hook();
                }
            }
            if !self.cycle_time.is_zero() {
                tokio::time::sleep(self.cycle_time).await;
            }
            self.active.fetch_sub(1, Ordering::SeqCst);
            if self.fail {
                Err(ReceiveError::Transport("probe failure".into()))
            } else {
                Ok(CycleOutcome::Received)
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn cycles_never_overlap() {
        let mut probe = Probe::new(1);
        // 周期耗时远超间隔，逼出任何重叠
        probe.cycle_time = Duration::from_secs(5);
        let calls = Arc::clone(&probe.calls);
        let max_active = Arc::clone(&probe.max_active);

        let handle = spawn_receiver(probe, CancellationToken::new());
        tokio::time::sleep(Duration::from_secs(30)).await;
        handle.stop().await;

        assert!(calls.load(Ordering::SeqCst) >= 3);
        assert_eq!(max_active.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_cancels_a_pending_wait() {
        let probe = Probe::new(3600);
        let calls = Arc::clone(&probe.calls);

        let handle = spawn_receiver(probe, CancellationToken::new());
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
        handle.stop().await;

        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_lets_an_inflight_cycle_finish() {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());

        struct Blocking {
            entered: Arc<Notify>,
            release: Arc<Notify>,
            finished: Arc<AtomicUsize>,
        }

        #[async_trait]
        impl CyclicReceiver for Blocking {
            fn name(&self) -> String {
                "blocking".into()
            }
            fn interval(&self) -> Duration {
                Duration::from_secs(1)
            }
            async fn do_receive(&mut self) -> Result<CycleOutcome, ReceiveError> {
                self.entered.notify_one();
                self.release.notified().await;
                self.finished.fetch_add(1, Ordering::SeqCst);
                Ok(CycleOutcome::Received)
            }
        }

        let finished = Arc::new(AtomicUsize::new(0));
        let receiver = Blocking {
            entered: Arc::clone(&entered),
            release: Arc::clone(&release),
            finished: Arc::clone(&finished),
        };

        let handle = spawn_receiver(receiver, CancellationToken::new());
        entered.notified().await;

        let stop = tokio::spawn(handle.stop());
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
        // 停止请求不得中断进行中的周期
        assert_eq!(finished.load(Ordering::SeqCst), 0);

        release.notify_one();
        stop.await.unwrap();
        assert_eq!(finished.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failures_keep_the_normal_schedule() {
        let mut probe = Probe::new(1);
        probe.fail = true;
        let calls = Arc::clone(&probe.calls);
        let started_at = Arc::clone(&probe.started_at);

        let handle = spawn_receiver(probe, CancellationToken::new());
        tokio::time::sleep(Duration::from_secs(5)).await;
        handle.stop().await;

        assert!(calls.load(Ordering::SeqCst) >= 4);
        let times = started_at.lock().unwrap();
        for pair in times.windows(2) {
            // 失败既不加速重试也不退避
            assert_eq!(pair[1] - pair[0], Duration::from_secs(1));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn interval_change_applies_to_the_next_wait() {
        let mut probe = Probe::new(60);
        let interval = Arc::clone(&probe.interval_secs);
        let started_at = Arc::clone(&probe.started_at);
        probe.on_first_call = Some(Box::new(move || {
            interval.store(10, Ordering::SeqCst);
        }));

        let start = Instant::now();
        let handle = spawn_receiver(probe, CancellationToken::new());
        tokio::time::sleep(Duration::from_secs(85)).await;
        handle.stop().await;

        let times = started_at.lock().unwrap();
        assert!(times.len() >= 3);
        // 第一轮用旧间隔，改动在其后的每一次等待生效
        assert_eq!(times[0] - start, Duration::from_secs(60));
        assert_eq!(times[1] - times[0], Duration::from_secs(10));
        assert_eq!(times[2] - times[1], Duration::from_secs(10));
    }
}
