//! Channel-backed observers for hosts that want asynchronous delivery

use tokio::sync::mpsc;
use tracing::warn;

use super::traits::EventObserver;
use super::types::WatchEvent;

/// Default channel buffer size
pub const DEFAULT_CHANNEL_SIZE: usize = 1000;

/// Observer that forwards every event it receives into an mpsc channel
///
/// Delivery never blocks the scheduler: if the channel is full or the
/// receiver is gone, the event is dropped and a warning is logged.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    sender: mpsc::Sender<WatchEvent>,
}

impl ChannelObserver {
    pub fn new(sender: mpsc::Sender<WatchEvent>) -> Self {
        Self { sender }
    }
}

impl EventObserver for ChannelObserver {
    fn on_event(&mut self, event: &WatchEvent) {
        if let Err(e) = self.sender.try_send(event.clone()) {
            match e {
                mpsc::error::TrySendError::Full(ev) => {
                    warn!(kind = %ev.kind(), "Event channel full, dropping event")
                }
                mpsc::error::TrySendError::Closed(ev) => {
                    warn!(kind = %ev.kind(), "Event channel closed, dropping event")
                }
            }
        }
    }
}

/// Create a new event channel with the default buffer size
pub fn create_event_channel() -> (ChannelObserver, mpsc::Receiver<WatchEvent>) {
    create_event_channel_with_size(DEFAULT_CHANNEL_SIZE)
}

/// Create a new event channel with a custom buffer size
pub fn create_event_channel_with_size(size: usize) -> (ChannelObserver, mpsc::Receiver<WatchEvent>) {
    let (tx, rx) = mpsc::channel(size);
    (ChannelObserver::new(tx), rx)
}
