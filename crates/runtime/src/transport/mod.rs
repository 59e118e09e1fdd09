//! Length-prefixed JSON framing over a byte pipe.
//!
//! Each frame is a little-endian `u32` byte length followed by that many
//! bytes of UTF-8 JSON. The writer half is used by one task; the reader half
//! runs as its own loop and forwards decoded values over a channel.


use serde_json::Value;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;

use crate::error::{Error, Result};

/// Upper bound on a single frame.
pub const MAX_FRAME_LEN: usize = 16 * 1024 * 1024;

/// A bidirectional pipe to an agent, before being split for use.
pub struct PipeTransport<W, R> {
	writer: W,
	reader: R,
	message_tx: mpsc::UnboundedSender<Value>,
}

impl<W, R> PipeTransport<W, R>
where
	W: AsyncWrite + Unpin + Send + 'static,
	R: AsyncRead + Unpin + Send + 'static,
{
	/// Wraps `writer` (agent stdin) and `reader` (agent stdout).
	///
	/// Returns the transport and the receiver inbound frames are delivered on.
	pub fn new(writer: W, reader: R) -> (Self, mpsc::UnboundedReceiver<Value>) {
		let (message_tx, message_rx) = mpsc::unbounded_channel();
		(
			Self {
				writer,
				reader,
				message_tx,
			},
			message_rx,
		)
	}

	pub fn into_parts(self) -> (PipeTransportSender<W>, PipeTransportReceiver<R>) {
		(
			PipeTransportSender { writer: self.writer },
			PipeTransportReceiver {
				reader: self.reader,
				message_tx: self.message_tx,
			},
		)
	}
}

/// Writing half of a [`PipeTransport`].
pub struct PipeTransportSender<W> {
	writer: W,
}

impl<W: AsyncWrite + Unpin + Send> PipeTransportSender<W> {
	/// Writes one frame and flushes.
	pub async fn send(&mut self, message: &Value) -> Result<()> {
		let bytes = serde_json::to_vec(message)?;
		let len = u32::try_from(bytes.len())
			.ok()
			.filter(|len| *len as usize <= MAX_FRAME_LEN)
			.ok_or_else(|| Error::Transport(format!("frame of {} bytes exceeds limit", bytes.len())))?;

		self.writer.write_all(&len.to_le_bytes()).await?;
		self.writer.write_all(&bytes).await?;
		self.writer.flush().await?;
		Ok(())
	}
}

/// Reading half of a [`PipeTransport`].
pub struct PipeTransportReceiver<R> {
	reader: R,
	message_tx: mpsc::UnboundedSender<Value>,
}

impl<R: AsyncRead + Unpin + Send> PipeTransportReceiver<R> {
	/// Reads frames until the pipe closes or the consumer goes away.
	///
	/// A clean EOF between frames ends the loop with `Ok(())`; EOF inside a
	/// frame, an oversized length, or invalid JSON is an error.
	pub async fn run(mut self) -> Result<()> {
		loop {
			let Some(len_buf) = self.read_header().await? else {
				return Ok(());
			};

			let len = u32::from_le_bytes(len_buf) as usize;
			if len > MAX_FRAME_LEN {
				return Err(Error::Transport(format!("incoming frame of {len} bytes exceeds limit")));
			}

			let mut body = vec![0u8; len];
			self.reader
				.read_exact(&mut body)
				.await
				.map_err(|err| Error::Transport(format!("truncated frame: {err}")))?;

			let value: Value = serde_json::from_slice(&body)?;
			if self.message_tx.send(value).is_err() {
				return Ok(());
			}
		}
	}

	/// Reads a length prefix, or `None` on EOF before its first byte.
	async fn read_header(&mut self) -> Result<Option<[u8; 4]>> {
		let mut len_buf = [0u8; 4];
		let mut filled = 0;
		while filled < len_buf.len() {
			match self.reader.read(&mut len_buf[filled..]).await? {
				0 if filled == 0 => return Ok(None),
				0 => return Err(Error::Transport(format!("truncated frame: EOF after {filled} header bytes"))),
				n => filled += n,
			}
		}
		Ok(Some(len_buf))
	}
}
