use async_trait::async_trait;
use engine_processing::envelope::{InboundMessage, OutboundMessage};
use engine_runtime::{
    channel::{MemoryReceiver, OutboundChannel, memory_channel},
    error::ChannelError,
};
use model::core::value::{non_null, stringify};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::Path;
use tokio::{
    fs::OpenOptions,
    io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader},
    sync::Mutex,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

/// One line of input. `body` may be the JSON text itself or a JSON value.
/// Header values may be any JSON scalar; they are carried as strings and
/// null headers are left out.
#[derive(Debug, Deserialize)]
struct LineEnvelope {
    body: Value,
    #[serde(default)]
    headers: Map<String, Value>,
}

/// Parses one envelope. Text that is not an envelope object becomes the
/// body as-is so the worker's own decoding can accept or reject it.
pub fn parse_envelope(text: &str) -> InboundMessage {
    match serde_json::from_str::<LineEnvelope>(text) {
        Ok(envelope) => InboundMessage {
            body: match envelope.body {
                Value::String(body) => body,
                other => other.to_string(),
            },
            headers: envelope
                .headers
                .iter()
                .filter_map(|(name, value)| {
                    non_null(Some(value)).map(|value| (name.clone(), stringify(value)))
                })
                .collect(),
        },
        Err(e) => {
            warn!(error = %e, "Input is not an envelope object, passing it through as the body");
            InboundMessage::new(text)
        }
    }
}

/// Feeds newline-delimited envelopes from `source` into an in-process
/// channel. Reading stops at end of input or when `cancel` fires.
pub fn json_lines_inbound<R>(
    name: &str,
    source: R,
    capacity: usize,
    cancel: CancellationToken,
) -> MemoryReceiver<InboundMessage>
where
    R: AsyncRead + Send + Unpin + 'static,
{
    let (tx, rx) = memory_channel(name, capacity);

    tokio::spawn(async move {
        let mut lines = BufReader::new(source).lines();
        let mut line_no = 0usize;
        loop {
            let line = tokio::select! {
                _ = cancel.cancelled() => break,
                line = lines.next_line() => line,
            };

            match line {
                Ok(Some(line)) => {
                    line_no += 1;
                    if line.trim().is_empty() {
                        continue;
                    }
                    if tx.send(parse_envelope(&line)).await.is_err() {
                        debug!(line = line_no, "Worker stopped reading, closing input");
                        break;
                    }
                }
                Ok(None) => {
                    debug!(lines = line_no, "End of input");
                    break;
                }
                Err(e) => {
                    error!(line = line_no + 1, error = %e, "Failed to read input");
                    break;
                }
            }
        }
    });

    rx
}

/// Writes each status report as one JSON line.
pub struct JsonLinesOutbound {
    name: String,
    writer: Mutex<Box<dyn AsyncWrite + Send + Unpin>>,
}

impl JsonLinesOutbound {
    pub fn stdout(name: impl Into<String>) -> Self {
        Self::new(name, Box::new(tokio::io::stdout()))
    }

    /// Appends to `path`, creating it if needed.
    pub async fn file(name: impl Into<String>, path: &Path) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;
        Ok(Self::new(name, Box::new(file)))
    }

    pub fn new(name: impl Into<String>, writer: Box<dyn AsyncWrite + Send + Unpin>) -> Self {
        Self {
            name: name.into(),
            writer: Mutex::new(writer),
        }
    }
}

#[async_trait]
impl OutboundChannel for JsonLinesOutbound {
    fn name(&self) -> &str {
        &self.name
    }

    async fn publish(&self, message: OutboundMessage) -> Result<(), ChannelError> {
        let mut line = serde_json::to_vec(&message).map_err(|e| {
            error!(error = %e, "Failed to serialize outbound envelope");
            ChannelError::Closed(self.name.clone())
        })?;
        line.push(b'\n');

        let mut writer = self.writer.lock().await;
        let written = async {
            writer.write_all(&line).await?;
            writer.flush().await
        }
        .await;

        written.map_err(|e| {
            error!(channel = %self.name, error = %e, "Failed to write status report");
            match e.kind() {
                std::io::ErrorKind::Interrupted | std::io::ErrorKind::WouldBlock => {
                    ChannelError::Busy(self.name.clone())
                }
                _ => ChannelError::Closed(self.name.clone()),
            }
        })
    }
}
