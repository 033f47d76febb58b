//! Stream receiver - UDP datagrams in, published frames out
//!
//! The receive loop runs on its own tokio task. Bad datagrams are logged and
//! dropped; only socket-level failures end the loop.

use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::net::UdpSocket;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;

use rigstream_core::{DecodeError, RigConfig, RigError, RigResult};
use rigstream_state::LatestFrameStore;
use rigstream_wire::decode_frame;

/// Receive buffer size; covers the largest possible UDP payload
pub const RECV_BUFFER_SIZE: usize = 65_536;

/// Receiver configuration
#[derive(Clone, Debug)]
pub struct ReceiverConfig {
    /// Local bind address
    pub bind_addr: SocketAddr,
    /// Receive buffer length
    pub recv_buffer: usize,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        ReceiverConfig::from(&RigConfig::default())
    }
}

impl From<&RigConfig> for ReceiverConfig {
    fn from(config: &RigConfig) -> Self {
        ReceiverConfig {
            bind_addr: config.socket_addr(),
            recv_buffer: RECV_BUFFER_SIZE,
        }
    }
}

/// Lifecycle state of the receive loop
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReceiverState {
    Running,
    /// Stopped on request
    Stopped,
    /// Ended by a fatal socket error
    Failed(String),
}

/// Snapshot of receiver counters
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReceiverStats {
    pub datagrams: u64,
    pub bytes: u64,
    pub frames_published: u64,
    pub decode_failures: u64,
    pub transient_errors: u64,
    /// Reason of the most recent decode failure
    pub last_decode_error: Option<String>,
}

#[derive(Debug, Default)]
struct ReceiverCounters {
    datagrams: AtomicU64,
    bytes: AtomicU64,
    frames_published: AtomicU64,
    decode_failures: AtomicU64,
    transient_errors: AtomicU64,
    last_decode_error: Mutex<Option<String>>,
}

impl ReceiverCounters {
    fn snapshot(&self) -> ReceiverStats {
        ReceiverStats {
            datagrams: self.datagrams.load(Ordering::Relaxed),
            bytes: self.bytes.load(Ordering::Relaxed),
            frames_published: self.frames_published.load(Ordering::Relaxed),
            decode_failures: self.decode_failures.load(Ordering::Relaxed),
            transient_errors: self.transient_errors.load(Ordering::Relaxed),
            last_decode_error: self.last_decode_error.lock().clone(),
        }
    }
}

/// A bound, not yet running receiver
pub struct StreamReceiver {
    socket: UdpSocket,
    local_addr: SocketAddr,
    store: Arc<LatestFrameStore>,
    config: ReceiverConfig,
}

impl StreamReceiver {
    /// Bind the socket. Failure here is surfaced to whoever starts the engine.
    pub async fn bind(config: ReceiverConfig, store: Arc<LatestFrameStore>) -> RigResult<Self> {
        let socket = UdpSocket::bind(config.bind_addr)
            .await
            .map_err(|e| RigError::SocketError(format!("bind {}: {}", config.bind_addr, e)))?;

        let local_addr = socket
            .local_addr()
            .map_err(|e| RigError::SocketError(e.to_string()))?;

        tracing::info!(%local_addr, "pose receiver bound");

        Ok(StreamReceiver {
            socket,
            local_addr,
            store,
            config,
        })
    }

    /// Get local address
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Start the receive loop on a background task
    pub fn spawn(self) -> ReceiverHandle {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let (state_tx, state_rx) = watch::channel(ReceiverState::Running);
        let counters = Arc::new(ReceiverCounters::default());

        let task = tokio::spawn(receive_loop(
            self.socket,
            self.store,
            Arc::clone(&counters),
            self.config.recv_buffer.max(1),
            shutdown_rx,
            state_tx,
        ));

        ReceiverHandle {
            local_addr: self.local_addr,
            shutdown: Some(shutdown_tx),
            task: Some(task),
            counters,
            state: state_rx,
        }
    }
}

/// Owner-side control of a running receiver
pub struct ReceiverHandle {
    local_addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
    counters: Arc<ReceiverCounters>,
    state: watch::Receiver<ReceiverState>,
}

impl ReceiverHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn state(&self) -> ReceiverState {
        self.state.borrow().clone()
    }

    pub fn is_running(&self) -> bool {
        *self.state.borrow() == ReceiverState::Running
    }

    pub fn stats(&self) -> ReceiverStats {
        self.counters.snapshot()
    }

    /// Wait until the loop ends, by request or failure
    pub async fn finished(&mut self) -> ReceiverState {
        loop {
            let state = self.state.borrow_and_update().clone();
            if state != ReceiverState::Running {
                return state;
            }
            if self.state.changed().await.is_err() {
                return self.state.borrow().clone();
            }
        }
    }

    /// Stop the loop and release the socket.
    ///
    /// Idempotent: later calls return the final counters without side effects.
    pub async fn stop(&mut self) -> RigResult<ReceiverStats> {
        if let Some(shutdown) = self.shutdown.take() {
            // The loop may already have exited on its own
            let _ = shutdown.send(());
        }

        if let Some(task) = self.task.take() {
            task.await.map_err(|_| RigError::ReceiverPanicked)?;
        }

        Ok(self.stats())
    }
}

async fn receive_loop(
    socket: UdpSocket,
    store: Arc<LatestFrameStore>,
    counters: Arc<ReceiverCounters>,
    recv_buffer: usize,
    mut shutdown: oneshot::Receiver<()>,
    state: watch::Sender<ReceiverState>,
) {
    let mut buf = vec![0u8; recv_buffer];

    let outcome = loop {
        tokio::select! {
            biased;

            // Fires on explicit stop and when the handle is dropped
            _ = &mut shutdown => break ReceiverState::Stopped,

            received = socket.recv_from(&mut buf) => match received {
                Ok((len, peer)) => {
                    if let Err(e) = handle_datagram(&buf[..len], &store, &counters) {
                        tracing::warn!(%peer, len, "dropping datagram: {}", e);
                    }
                }
                Err(e) if is_transient(&e) => {
                    counters.transient_errors.fetch_add(1, Ordering::Relaxed);
                    tracing::warn!("UDP receive error: {}", e);
                }
                Err(e) => {
                    tracing::error!("UDP receive failed, stopping receiver: {}", e);
                    break ReceiverState::Failed(e.to_string());
                }
            },
        }
    };

    drop(socket);
    tracing::info!(state = ?outcome, "pose receiver exited");
    state.send_replace(outcome);
}

/// Decode one datagram and publish it on success.
///
/// Failures are counted here; the caller decides how to report them.
fn handle_datagram(
    datagram: &[u8],
    store: &LatestFrameStore,
    counters: &ReceiverCounters,
) -> Result<u64, DecodeError> {
    counters.datagrams.fetch_add(1, Ordering::Relaxed);
    counters
        .bytes
        .fetch_add(datagram.len() as u64, Ordering::Relaxed);

    match decode_frame(datagram) {
        Ok(frame) => {
            let seq = store.publish(frame);
            counters.frames_published.fetch_add(1, Ordering::Relaxed);
            Ok(seq)
        }
        Err(e) => {
            counters.decode_failures.fetch_add(1, Ordering::Relaxed);
            *counters.last_decode_error.lock() = Some(e.to_string());
            Err(e)
        }
    }
}

/// Errors that affect one datagram rather than the socket.
///
/// ICMP port-unreachable from an earlier send surfaces as a reset on some
/// platforms.
fn is_transient(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionRefused
            | io::ErrorKind::Interrupted
            | io::ErrorKind::WouldBlock
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn loopback() -> ReceiverConfig {
        ReceiverConfig {
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            recv_buffer: RECV_BUFFER_SIZE,
        }
    }

    fn pose_only(x: f32) -> Vec<u8> {
        let points: Vec<String> = (0..33).map(|_| format!("[{}, 0.5, 0.0]", x)).collect();
        format!(r#"{{"pose": [{}]}}"#, points.join(",")).into_bytes()
    }

    async fn wait_until(mut cond: impl FnMut() -> bool) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while !cond() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("condition not reached in time");
    }

    async fn sender() -> UdpSocket {
        UdpSocket::bind("127.0.0.1:0").await.unwrap()
    }

    #[tokio::test]
    async fn test_receiver_bind() {
        let store = Arc::new(LatestFrameStore::new());
        let receiver = StreamReceiver::bind(loopback(), store).await.unwrap();
        assert_ne!(receiver.local_addr().port(), 0);
    }

    #[tokio::test]
    async fn test_bind_conflict_is_socket_error() {
        let taken = std::net::UdpSocket::bind("127.0.0.1:0").unwrap();
        let config = ReceiverConfig {
            bind_addr: taken.local_addr().unwrap(),
            recv_buffer: RECV_BUFFER_SIZE,
        };

        let result = StreamReceiver::bind(config, Arc::new(LatestFrameStore::new())).await;
        assert!(matches!(result, Err(RigError::SocketError(_))));
    }

    #[tokio::test]
    async fn test_valid_datagram_is_published() {
        let store = Arc::new(LatestFrameStore::new());
        let mut handle = StreamReceiver::bind(loopback(), Arc::clone(&store))
            .await
            .unwrap()
            .spawn();

        let tx = sender().await;
        tx.send_to(&pose_only(0.25), handle.local_addr()).await.unwrap();

        wait_until(|| store.sequence() == 1).await;
        let frame = store.read().unwrap();
        assert_eq!(frame.pose.as_ref().unwrap().get(0).unwrap().x, 0.25);
        assert!(frame.left_hand.is_none());

        let stats = handle.stop().await.unwrap();
        assert_eq!(stats.frames_published, 1);
        assert_eq!(stats.decode_failures, 0);
    }

    #[tokio::test]
    async fn test_garbage_after_valid_keeps_prior_frame() {
        let store = Arc::new(LatestFrameStore::new());
        let mut handle = StreamReceiver::bind(loopback(), Arc::clone(&store))
            .await
            .unwrap()
            .spawn();
        let tx = sender().await;

        tx.send_to(&pose_only(0.75), handle.local_addr()).await.unwrap();
        wait_until(|| store.sequence() == 1).await;

        for garbage in [&b"\x00\x01garbage"[..], &b""[..], &b"{\"pose\": [[0.1, 0.2"[..]] {
            tx.send_to(garbage, handle.local_addr()).await.unwrap();
        }
        wait_until(|| handle.stats().decode_failures == 3).await;

        assert!(handle.is_running());
        assert_eq!(store.sequence(), 1);
        assert_eq!(store.read().unwrap().pose.as_ref().unwrap().get(5).unwrap().x, 0.75);
        assert!(handle.stats().last_decode_error.unwrap().contains("Malformed"));

        // Still ingesting
        tx.send_to(&pose_only(0.5), handle.local_addr()).await.unwrap();
        wait_until(|| store.sequence() == 2).await;

        handle.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_stop_while_blocked_releases_socket() {
        let store = Arc::new(LatestFrameStore::new());
        let mut handle = StreamReceiver::bind(loopback(), Arc::clone(&store))
            .await
            .unwrap()
            .spawn();
        let addr = handle.local_addr();

        let tx = sender().await;
        tx.send_to(&pose_only(0.1), addr).await.unwrap();
        wait_until(|| store.sequence() == 1).await;

        // Loop is now parked in recv_from
        tokio::time::timeout(Duration::from_secs(2), handle.stop())
            .await
            .expect("stop did not complete")
            .unwrap();

        assert_eq!(handle.state(), ReceiverState::Stopped);
        assert!(!handle.is_running());
        assert!(store.read().is_some());

        // Port is free again
        let rebound = UdpSocket::bind(addr).await;
        assert!(rebound.is_ok());
    }

    #[tokio::test]
    async fn test_stop_is_idempotent() {
        let store = Arc::new(LatestFrameStore::new());
        let mut handle = StreamReceiver::bind(loopback(), store).await.unwrap().spawn();

        let first = handle.stop().await.unwrap();
        let second = handle.stop().await.unwrap();
        assert_eq!(first, second);
        assert_eq!(handle.finished().await, ReceiverState::Stopped);
    }

    #[tokio::test]
    async fn test_datagrams_after_stop_are_ignored() {
        let store = Arc::new(LatestFrameStore::new());
        let mut handle = StreamReceiver::bind(loopback(), Arc::clone(&store))
            .await
            .unwrap()
            .spawn();
        let addr = handle.local_addr();
        handle.stop().await.unwrap();

        let tx = sender().await;
        let _ = tx.send_to(&pose_only(0.3), addr).await;
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(store.read().is_none());
        assert_eq!(handle.stats().datagrams, 0);
    }

    #[test]
    fn test_handle_datagram_counts() {
        let store = LatestFrameStore::new();
        let counters = ReceiverCounters::default();

        assert_eq!(handle_datagram(&pose_only(0.2), &store, &counters), Ok(1));
        let err = handle_datagram(b"nope", &store, &counters).unwrap_err();

        let stats = counters.snapshot();
        assert_eq!(stats.datagrams, 2);
        assert_eq!(stats.frames_published, 1);
        assert_eq!(stats.decode_failures, 1);
        assert_eq!(stats.last_decode_error, Some(err.to_string()));
        assert_eq!(store.sequence(), 1);
    }

    #[test]
    fn test_transient_error_classification() {
        assert!(is_transient(&io::Error::from(io::ErrorKind::ConnectionReset)));
        assert!(is_transient(&io::Error::from(io::ErrorKind::Interrupted)));
        assert!(!is_transient(&io::Error::from(io::ErrorKind::NotConnected)));
        assert!(!is_transient(&io::Error::from(io::ErrorKind::PermissionDenied)));
    }
}
