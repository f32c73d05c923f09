//! In-process switch event bus backed by a tokio broadcast channel.

use std::future::Future;

use tokio::sync::broadcast;

use pkone_domain::error::PkoneError;
use pkone_domain::switch_state::SwitchStateEvent;

use crate::ports::SwitchEventPublisher;

/// In-process switch event bus using a tokio [`broadcast`] channel.
///
/// Publishing succeeds even when there are no active subscribers
/// (the event is simply dropped). A subscriber that falls more than
/// `capacity` events behind loses the oldest ones.
pub struct InProcessSwitchBus {
    sender: broadcast::Sender<SwitchStateEvent>,
}

impl InProcessSwitchBus {
    /// Create a new bus with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to switch events published *after* this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SwitchStateEvent> {
        self.sender.subscribe()
    }
}

impl SwitchEventPublisher for InProcessSwitchBus {
    fn publish(
        &self,
        event: SwitchStateEvent,
    ) -> impl Future<Output = Result<(), PkoneError>> + Send {
        // send only fails with zero receivers
        let _ = self.sender.send(event);
        async { Ok(()) }
    }
}
