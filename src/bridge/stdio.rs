//! Line-delimited carrier for bridge frames.
//!
//! Lets an execution context living in another process attach to the bridge:
//! request frames go out one per line, reply frames come back one per line.

use crate::bridge::context::ContextChannel;
use std::io;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info, trace};

/// Pump frames between `channel` and a byte stream until either side closes.
///
/// Returning drops both channel ends, so the bridge reports the context as
/// gone and fails any call still waiting with `Disconnected`.
pub async fn carry<R, W>(channel: ContextChannel, reader: R, mut writer: W) -> io::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let ContextChannel {
        mut requests,
        replies,
    } = channel;
    let mut lines = BufReader::new(reader).lines();

    info!("Carrying bridge frames over stream");

    loop {
        tokio::select! {
            frame = requests.recv() => {
                let Some(frame) = frame else {
                    debug!("Bridge detached, closing carrier");
                    break;
                };
                trace!("Sending frame: {}", frame);
                writer.write_all(frame.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    info!("Execution context closed its end");
                    break;
                };
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                trace!("Received frame: {}", line);
                if replies.send(line.to_string()).is_err() {
                    debug!("Bridge replaced this link, closing carrier");
                    break;
                }
            }
        }
    }

    Ok(())
}
