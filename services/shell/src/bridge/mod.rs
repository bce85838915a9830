pub mod countdown;
pub mod payment_task;
pub mod protocol;
pub mod session;
pub mod state;

pub use protocol::{ShellEvent, ViewMessage};
pub use session::ShellSession;
pub use state::{EventReceiver, EventSender};

use crate::error::{ShellError, ShellResult};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{error, info};

/// Runs the bridge until the view closes its end of `reader`.
///
/// Incoming lines are handled in order; events are written to `writer` as they
/// are produced, including those raised later by background tasks.
pub async fn serve<R, W>(
    mut session: ShellSession,
    events: EventReceiver,
    reader: R,
    writer: W,
) -> ShellResult<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let writer_task = tokio::spawn(write_events(events, writer));

    session.announce().await;
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        session.handle_line(&line).await;
    }

    info!("View disconnected.");
    session.shutdown();
    // Dropping the session releases its event sender so the writer can finish.
    drop(session);
    writer_task
        .await
        .map_err(|e| ShellError::Internal(e.to_string()))?
}

async fn write_events<W>(mut events: EventReceiver, mut writer: W) -> ShellResult<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(event) = events.recv().await {
        let mut line = serde_json::to_string(&event)?;
        line.push('\n');
        if let Err(e) = writer.write_all(line.as_bytes()).await {
            error!("Failed to write event to the view: {}", e);
            return Err(e.into());
        }
        writer.flush().await?;
    }
    Ok(())
}
