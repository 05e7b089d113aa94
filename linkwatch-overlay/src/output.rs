//! Output sinks for highlight messages.

use std::path::PathBuf;

use linkwatch_types::HighlightMessage;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};

use crate::error::OverlayError;

/// Destination for the highlight messages an overlay emits.
#[derive(Debug)]
pub enum Output {
    /// Send messages through a channel to the session transport.
    ///
    /// Use `Output::channel()` to create this variant and get the receiver.
    Channel(mpsc::Sender<HighlightMessage>),

    /// Write each message to a JSON file, overwriting the previous one.
    File(PathBuf),
}

impl Output {
    /// Create a channel output and return both the output and receiver.
    ///
    /// # Example
    ///
    /// ```rust
    /// use linkwatch_overlay::Output;
    ///
    /// let (output, mut rx) = Output::channel(16);
    ///
    /// // Later, forward messages to the client
    /// // while let Some(message) = rx.recv().await {
    /// //     println!("{} highlighted links", message.payload.len());
    /// // }
    /// ```
    pub fn channel(buffer: usize) -> (Self, mpsc::Receiver<HighlightMessage>) {
        let (tx, rx) = mpsc::channel(buffer);
        (Output::Channel(tx), rx)
    }

    /// Create a file output.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Output::File(path.into())
    }

    /// Emit a message to this output.
    pub(crate) async fn emit(&self, message: &HighlightMessage) -> Result<(), OverlayError> {
        match self {
            Output::Channel(tx) => match tx.try_send(message.clone()) {
                Ok(()) => {}
                // Don't block the tick on a slow client
                Err(TrySendError::Full(_)) => {
                    warn!("Highlight channel full, dropping message");
                }
                Err(TrySendError::Closed(_)) => {
                    debug!("Highlight channel closed, dropping message");
                }
            },
            Output::File(path) => {
                let json = serde_json::to_string_pretty(message).map_err(std::io::Error::from)?;
                tokio::fs::write(path, json).await?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkwatch_types::Highlights;

    #[tokio::test]
    async fn channel_delivers_message() {
        let (output, mut rx) = Output::channel(4);
        output
            .emit(&HighlightMessage::new(Highlights::clear()))
            .await
            .unwrap();

        let message = rx.recv().await.unwrap();
        assert!(message.is_clear());
    }

    #[tokio::test]
    async fn full_channel_drops_without_error() {
        let (output, mut rx) = Output::channel(1);
        let message = HighlightMessage::new(Highlights::clear());
        output.emit(&message).await.unwrap();
        output.emit(&message).await.unwrap();

        assert!(rx.recv().await.is_some());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn closed_channel_is_not_an_error() {
        let (output, rx) = Output::channel(1);
        drop(rx);
        assert!(output
            .emit(&HighlightMessage::new(Highlights::clear()))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn file_output_overwrites() {
        let path = std::env::temp_dir().join(format!(
            "linkwatch-output-{}.json",
            std::process::id()
        ));
        let output = Output::file(&path);

        output
            .emit(&HighlightMessage::new(Highlights::builder().timestamp_ms(1).build()))
            .await
            .unwrap();
        output
            .emit(&HighlightMessage::new(Highlights::builder().timestamp_ms(2).build()))
            .await
            .unwrap();

        let written: HighlightMessage =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written.payload.timestamp_ms, 2);
        let _ = std::fs::remove_file(&path);
    }
}
