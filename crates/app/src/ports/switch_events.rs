//! Switch event port — hands decoded switch transitions to the application.

use std::future::Future;

use pkone_domain::error::PkoneError;
use pkone_domain::switch_state::SwitchStateEvent;

/// Publishes switch transitions to interested subscribers.
pub trait SwitchEventPublisher {
    /// Publish an event to all current subscribers.
    fn publish(
        &self,
        event: SwitchStateEvent,
    ) -> impl Future<Output = Result<(), PkoneError>> + Send;
}

impl<T: SwitchEventPublisher + Send + Sync> SwitchEventPublisher for std::sync::Arc<T> {
    fn publish(
        &self,
        event: SwitchStateEvent,
    ) -> impl Future<Output = Result<(), PkoneError>> + Send {
        (**self).publish(event)
    }
}
