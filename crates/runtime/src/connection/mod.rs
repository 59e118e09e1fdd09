//! Request/response correlation with an out-of-process signer agent.
//!
//! # Message Flow
//!
//! 1. Caller invokes [`AgentConnection::request`] with a method and params
//! 2. The connection assigns the next id and parks a oneshot sender under it
//! 3. The request is queued to the writer task and framed onto the pipe
//! 4. The dispatch loop decodes each inbound frame as an [`AgentResponse`]
//! 5. The response is routed to the parked sender by id
//!
//! When the pipe closes every parked request fails with
//! [`Error::ChannelClosed`] and later requests fail immediately.


use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::task::{Context, Poll};

use parking_lot::Mutex;
use serde_json::Value;
use swk_protocol::agent::{AgentMethod, AgentParams, AgentRequest, AgentResponse};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, warn};

use crate::error::{Error, Result};
use crate::transport::PipeTransport;

type CallbackMap = Arc<Mutex<HashMap<u32, oneshot::Sender<Result<Value>>>>>;

/// Removes the parked sender if the request future is dropped before completion.
struct CancelGuard {
	id: u32,
	callbacks: CallbackMap,
	completed: bool,
}

impl Drop for CancelGuard {
	fn drop(&mut self) {
		if !self.completed && self.callbacks.lock().remove(&self.id).is_some() {
			debug!(target = "swk.runtime", id = self.id, "dropped pending agent request");
		}
	}
}

struct ResponseFuture {
	rx: oneshot::Receiver<Result<Value>>,
	guard: CancelGuard,
}

impl Future for ResponseFuture {
	type Output = Result<Value>;

	fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
		match Pin::new(&mut self.rx).poll(cx) {
			Poll::Ready(result) => {
				self.guard.completed = true;
				Poll::Ready(result.map_err(|_| Error::ChannelClosed).and_then(|r| r))
			}
			Poll::Pending => Poll::Pending,
		}
	}
}

/// Correlated request channel to one agent process.
pub struct AgentConnection {
	last_id: AtomicU32,
	callbacks: CallbackMap,
	outbound_tx: mpsc::UnboundedSender<Value>,
	closed: Arc<AtomicBool>,
}

impl AgentConnection {
	/// Starts writer, reader, and dispatch tasks over the given pipe halves.
	///
	/// `writer` is the agent's stdin, `reader` its stdout. Must be called
	/// within a tokio runtime.
	pub fn start<W, R>(writer: W, reader: R) -> Arc<Self>
	where
		W: AsyncWrite + Unpin + Send + 'static,
		R: AsyncRead + Unpin + Send + 'static,
	{
		let (transport, mut message_rx) = PipeTransport::new(writer, reader);
		let (mut sender, receiver) = transport.into_parts();
		let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Value>();

		let connection = Arc::new(Self {
			last_id: AtomicU32::new(0),
			callbacks: Arc::new(Mutex::new(HashMap::new())),
			outbound_tx,
			closed: Arc::new(AtomicBool::new(false)),
		});

		tokio::spawn(async move {
			if let Err(err) = receiver.run().await {
				error!(target = "swk.runtime", error = %err, "agent read failed");
			}
		});

		tokio::spawn(async move {
			while let Some(message) = outbound_rx.recv().await {
				if let Err(err) = sender.send(&message).await {
					error!(target = "swk.runtime", error = %err, "agent write failed");
					break;
				}
			}
		});

		let dispatcher = Arc::clone(&connection);
		tokio::spawn(async move {
			while let Some(value) = message_rx.recv().await {
				match serde_json::from_value::<AgentResponse>(value) {
					Ok(response) => {
						if let Err(err) = dispatcher.dispatch(response) {
							warn!(target = "swk.runtime", error = %err, "unroutable agent response");
						}
					}
					Err(err) => warn!(target = "swk.runtime", error = %err, "malformed agent frame"),
				}
			}
			dispatcher.close();
		});

		connection
	}

	/// Whether the pipe has closed.
	pub fn is_closed(&self) -> bool {
		self.closed.load(Ordering::SeqCst)
	}

	/// Sends `method` and awaits the correlated result.
	pub async fn request(&self, method: AgentMethod, params: AgentParams) -> Result<Value> {
		if self.is_closed() {
			return Err(Error::ChannelClosed);
		}

		let id = self.last_id.fetch_add(1, Ordering::SeqCst);
		let (tx, rx) = oneshot::channel();
		self.callbacks.lock().insert(id, tx);
		let guard = CancelGuard {
			id,
			callbacks: Arc::clone(&self.callbacks),
			completed: false,
		};

		let request = serde_json::to_value(AgentRequest { id, method, params })?;
		debug!(target = "swk.runtime", id, ?method, "agent request");
		if self.outbound_tx.send(request).is_err() {
			return Err(Error::ChannelClosed);
		}

		ResponseFuture { rx, guard }.await
	}

	fn dispatch(&self, response: AgentResponse) -> Result<()> {
		let callback = self
			.callbacks
			.lock()
			.remove(&response.id)
			.ok_or_else(|| Error::Protocol(format!("no pending request with id {}", response.id)))?;

		let result = match (response.error, response.result) {
			(Some(err), _) => Err(Error::Remote {
				code: err.code,
				message: err.message,
			}),
			(None, result) => Ok(result.unwrap_or(Value::Null)),
		};

		let _ = callback.send(result);
		Ok(())
	}

	fn close(&self) {
		self.closed.store(true, Ordering::SeqCst);
		let pending: Vec<_> = self.callbacks.lock().drain().collect();
		if !pending.is_empty() {
			debug!(target = "swk.runtime", count = pending.len(), "failing pending agent requests");
		}
		for (_, callback) in pending {
			let _ = callback.send(Err(Error::ChannelClosed));
		}
	}
}
