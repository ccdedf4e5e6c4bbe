//! Live packet capture: a background poller feeding a bounded queue that the
//! render path drains into a bounded display buffer.
//!
//! The worker is a plain OS thread because every poll blocks on an external
//! command. It only ever talks to the UI through [`BoundedQueue`]; stopping it
//! cancels its [`CancellationToken`], which the loop checks between polls, so a
//! stop takes effect within one in-flight poll.

use std::{
    collections::VecDeque,
    panic::{self, AssertUnwindSafe},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use tokio_util::sync::CancellationToken;

use crate::{providers::Providers, widgets::draw::WARNING_PREFIX};

pub const QUEUE_CAPACITY: usize = 50;
pub const DISPLAY_CAPACITY: usize = 25;

const CANCEL_CHECK: Duration = Duration::from_millis(25);

/// Thread-safe FIFO that drops its oldest entries once full.
#[derive(Debug)]
pub struct BoundedQueue<T> {
    inner: Arc<Mutex<VecDeque<T>>>,
    capacity: usize,
}

impl<T> Clone for BoundedQueue<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            capacity: self.capacity,
        }
    }
}

impl<T> BoundedQueue<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    // A producer that panicked mid-push leaves a valid deque behind.
    fn lock(&self) -> MutexGuard<'_, VecDeque<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn push(&self, item: T) {
        self.extend(std::iter::once(item));
    }

    pub fn extend(&self, items: impl IntoIterator<Item = T>) {
        let mut queue = self.lock();
        for item in items {
            queue.push_back(item);
            while queue.len() > self.capacity {
                queue.pop_front();
            }
        }
    }

    /// Take everything queued so far, oldest first.
    pub fn drain(&self) -> Vec<T> {
        self.lock().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Lines currently shown by the sniffer.
#[derive(Debug, Clone)]
pub struct DisplayBuffer {
    lines: VecDeque<String>,
    capacity: usize,
}

impl Default for DisplayBuffer {
    fn default() -> Self {
        Self::new(DISPLAY_CAPACITY)
    }
}

impl DisplayBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn extend(&mut self, lines: impl IntoIterator<Item = String>) {
        for line in lines {
            self.lines.push_back(line);
            while self.lines.len() > self.capacity {
                self.lines.pop_front();
            }
        }
    }

    pub fn lines(&self) -> impl Iterator<Item = &String> {
        self.lines.iter()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

/// What a worker captures. Fixed for the lifetime of one worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureParams {
    pub interface: String,
    pub batch: usize,
    pub interval: Duration,
}

struct Worker {
    params: CaptureParams,
    token: CancellationToken,
    handle: JoinHandle<()>,
}

pub struct LiveCapture {
    providers: Arc<dyn Providers>,
    queue: BoundedQueue<String>,
    display: DisplayBuffer,
    worker: Option<Worker>,
}

impl LiveCapture {
    pub fn new(providers: Arc<dyn Providers>) -> Self {
        Self {
            providers,
            queue: BoundedQueue::new(QUEUE_CAPACITY),
            display: DisplayBuffer::default(),
            worker: None,
        }
    }

    /// Whether a worker has been started and not stopped since.
    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    /// Whether the worker thread is still alive.
    pub fn is_alive(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|worker| !worker.handle.is_finished())
    }

    pub fn params(&self) -> Option<&CaptureParams> {
        self.worker.as_ref().map(|worker| &worker.params)
    }

    /// Spawn a worker for `params`. Does nothing and returns `false` when one
    /// is already running; to change parameters, [`stop`](Self::stop) first.
    pub fn start(&mut self, params: CaptureParams) -> bool {
        if self.worker.is_some() {
            log::debug!("Capture already running, start ignored");
            return false;
        }

        // A stopped worker may still finish its last poll; give it nowhere to write.
        self.queue = BoundedQueue::new(QUEUE_CAPACITY);
        let token = CancellationToken::new();
        let providers = Arc::clone(&self.providers);
        let queue = self.queue.clone();
        let worker_token = token.clone();
        let worker_params = params.clone();

        let spawned = thread::Builder::new()
            .name("netdeck-capture".into())
            .spawn(move || poll_loop(providers.as_ref(), &worker_params, &queue, &worker_token));

        match spawned {
            Ok(handle) => {
                log::info!("Capture started on {} (batch {})", params.interface, params.batch);
                self.worker = Some(Worker {
                    params,
                    token,
                    handle,
                });
                true
            }
            Err(e) => {
                log::error!("Could not spawn capture thread: {e}");
                self.display
                    .extend([format!("{WARNING_PREFIX}Could not start capture: {e}")]);
                false
            }
        }
    }

    /// Signal the worker to stop. Safe to call at any time, any number of times.
    pub fn stop(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.token.cancel();
            log::info!("Capture on {} stopped", worker.params.interface);
        }
    }

    /// Move queued lines into the display buffer. Never waits on the worker
    /// beyond the queue lock.
    pub fn drain_into_display(&mut self) -> usize {
        let lines = self.queue.drain();
        let count = lines.len();
        self.display.extend(lines);
        count
    }

    pub fn display(&self) -> &DisplayBuffer {
        &self.display
    }

    pub fn clear(&mut self) {
        self.queue.drain();
        self.display.clear();
    }
}

impl Drop for LiveCapture {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Sleep for `interval`, waking early on cancellation. Returns `false` if cancelled.
fn sleep_unless_cancelled(token: &CancellationToken, interval: Duration) -> bool {
    let deadline = Instant::now() + interval;
    loop {
        if token.is_cancelled() {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        thread::sleep(CANCEL_CHECK.min(deadline - now));
    }
}

fn poll_loop(
    providers: &dyn Providers,
    params: &CaptureParams,
    queue: &BoundedQueue<String>,
    token: &CancellationToken,
) {
    let _span = tracing::info_span!("capture", interface = %params.interface).entered();
    let mut last_warning: Option<String> = None;
    while !token.is_cancelled() {
        let polled = panic::catch_unwind(AssertUnwindSafe(|| {
            providers.capture_packets(&params.interface, params.batch)
        }));
        if token.is_cancelled() {
            break;
        }
        match polled {
            Ok(fetched) => {
                queue.extend(fetched.data);
                if fetched.warnings.is_empty() {
                    last_warning = None;
                }
                for warning in fetched.warnings {
                    // Repeat failures would otherwise flood the display once per poll.
                    if last_warning.as_deref() != Some(warning.as_str()) {
                        log::warn!("Capture on {}: {}", params.interface, warning);
                        queue.push(format!("{WARNING_PREFIX}{warning}"));
                        last_warning = Some(warning);
                    }
                }
            }
            Err(_) => log::error!("Capture poll on {} panicked, retrying", params.interface),
        }
        if !sleep_unless_cancelled(token, params.interval) {
            break;
        }
    }
    log::debug!("Capture loop on {} exited", params.interface);
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::providers::{fake::FakeProviders, Fetched};
    use pretty_assertions::assert_eq;

    fn params(interface: &str) -> CaptureParams {
        CaptureParams {
            interface: interface.to_string(),
            batch: 5,
            interval: Duration::from_millis(5),
        }
    }

    fn wait_for(mut condition: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if condition() {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        false
    }

    #[test]
    fn queue_keeps_the_newest_fifty() {
        let queue = BoundedQueue::new(QUEUE_CAPACITY);
        for i in 0..120 {
            queue.push(i);
            assert!(queue.len() <= QUEUE_CAPACITY);
        }
        let drained = queue.drain();
        assert_eq!(drained, (70..120).collect::<Vec<_>>());
        assert!(queue.is_empty());
    }

    #[test]
    fn display_keeps_the_newest_twenty_five() {
        let mut display = DisplayBuffer::default();
        display.extend((0..40).map(|i| i.to_string()));
        assert_eq!(display.len(), DISPLAY_CAPACITY);
        assert_eq!(display.lines().next().map(String::as_str), Some("15"));
        assert_eq!(display.lines().last().map(String::as_str), Some("39"));
    }

    #[test]
    fn stop_is_idempotent() {
        let mut capture = LiveCapture::new(Arc::new(FakeProviders::default()));
        capture.stop();
        capture.stop();
        assert!(!capture.is_running());

        assert!(capture.start(params("eth0")));
        capture.stop();
        capture.stop();
        assert!(!capture.is_running());
    }

    #[test]
    fn starting_twice_runs_one_loop() {
        let providers = Arc::new(FakeProviders::default());
        let mut capture = LiveCapture::new(providers.clone());
        assert!(capture.start(params("eth0")));
        assert!(!capture.start(params("eth0")));

        assert!(wait_for(|| providers.capture_threads().len() >= 5));
        capture.stop();
        let threads: HashSet<_> = providers.capture_threads().into_iter().collect();
        assert_eq!(threads.len(), 1);
    }

    #[test]
    fn captured_lines_reach_the_display() {
        let providers = Arc::new(FakeProviders {
            packets: Fetched::ok(vec!["IP 10.0.0.2.22 > 10.0.0.3.50000: tcp 36".to_string()]),
            ..FakeProviders::default()
        });
        let mut capture = LiveCapture::new(providers);
        capture.start(params("eth0"));
        assert!(wait_for(|| {
            capture.drain_into_display();
            !capture.display().is_empty()
        }));
        capture.stop();
        assert!(capture.display().len() <= DISPLAY_CAPACITY);
        assert!(capture.display().lines().all(|l| l.contains("tcp 36")));
    }

    #[test]
    fn repeated_warnings_are_shown_once() {
        let providers = Arc::new(FakeProviders {
            packets: Fetched::warning("tcpdump is not installed"),
            ..FakeProviders::default()
        });
        let mut capture = LiveCapture::new(providers.clone());
        capture.start(params("eth0"));
        assert!(wait_for(|| providers.capture_threads().len() >= 4));
        capture.stop();
        capture.drain_into_display();
        let lines: Vec<&String> = capture.display().lines().collect();
        assert_eq!(lines, vec!["⚠ tcpdump is not installed"]);
    }

    #[test]
    fn a_panicking_poll_does_not_kill_the_worker() {
        let providers = Arc::new(FakeProviders {
            panic_on_capture: true,
            ..FakeProviders::default()
        });
        let mut capture = LiveCapture::new(providers.clone());
        capture.start(params("eth0"));
        assert!(wait_for(|| providers.capture_threads().len() >= 3));
        assert!(capture.is_alive());
        capture.stop();
    }

    #[test]
    fn restart_uses_the_new_interface() {
        let providers = Arc::new(FakeProviders::default());
        let mut capture = LiveCapture::new(providers.clone());
        capture.start(params("eth0"));
        capture.stop();
        capture.start(params("wlan0"));
        assert_eq!(capture.params().map(|p| p.interface.as_str()), Some("wlan0"));
        assert!(wait_for(|| providers
            .calls()
            .contains(&"capture_packets wlan0 5".to_string())));
        capture.stop();
    }
}
