//! Inbound pump from a [`FrameReader`] into the platform service.

use tokio::io::AsyncRead;

use pkone_app::ports::{CommandSink, SwitchEventPublisher};
use pkone_app::services::platform_service::PlatformService;
use pkone_domain::error::PkoneError;

use crate::reader::FrameReader;

/// Feed every inbound frame to `service` until the stream ends.
///
/// Frames the service rejects as malformed or from an unknown board are
/// skipped; the service has already logged them.
///
/// # Errors
///
/// Returns a transport error when reading fails, or any non-recoverable
/// error reported by the service.
pub async fn forward_frames<R, S, P>(
    reader: &mut FrameReader<R>,
    service: &PlatformService<S, P>,
) -> Result<(), PkoneError>
where
    R: AsyncRead + Unpin,
    S: CommandSink + Send + Sync + 'static,
    P: SwitchEventPublisher,
{
    while let Some(frame) = reader.next_frame().await? {
        match service.receive_frame(&frame).await {
            Ok(_) => {}
            Err(err) if err.is_recoverable() => {}
            Err(err) => return Err(err),
        }
    }
    tracing::info!("inbound stream ended");
    Ok(())
}
