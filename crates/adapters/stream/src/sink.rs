//! Command sink writing to an [`AsyncWrite`].

use std::future::Future;

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

use pkone_app::ports::CommandSink;
use pkone_domain::command::Command;
use pkone_domain::error::PkoneError;

use crate::error::StreamError;

/// Writes each command whole, then flushes.
///
/// Concurrent senders (the watchdog and the application) are serialised so
/// commands never interleave on the wire.
pub struct StreamCommandSink<W> {
    writer: Mutex<W>,
}

impl<W> StreamCommandSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Give back the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl<W: AsyncWrite + Unpin + Send> CommandSink for StreamCommandSink<W> {
    fn send(&self, command: &Command) -> impl Future<Output = Result<(), PkoneError>> + Send {
        let encoded = command.to_string();
        async move {
            let mut writer = self.writer.lock().await;
            write_command(&mut *writer, &encoded).await?;
            Ok(())
        }
    }
}

async fn write_command<W: AsyncWrite + Unpin>(
    writer: &mut W,
    encoded: &str,
) -> Result<(), StreamError> {
    writer.write_all(encoded.as_bytes()).await?;
    writer.flush().await?;
    tracing::trace!(command = encoded, "written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pkone_domain::address::CoilAddress;
    use pkone_domain::error::ErrorKind;
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn should_write_commands_back_to_back() {
        let (client, mut server) = tokio::io::duplex(256);
        let sink = StreamCommandSink::new(client);

        sink.send(&Command::Heartbeat).await.unwrap();
        sink.send(&Command::RuleClear {
            coil: CoilAddress::new(2, 7),
        })
        .await
        .unwrap();
        drop(sink);

        let mut written = String::new();
        server.read_to_string(&mut written).await.unwrap();
        assert_eq!(written, "PWDEPHD207E");
    }

    #[tokio::test]
    async fn should_report_transport_error_when_peer_is_gone() {
        let (client, server) = tokio::io::duplex(16);
        drop(server);
        let sink = StreamCommandSink::new(client);

        let err = sink.send(&Command::Reset).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
    }
}
