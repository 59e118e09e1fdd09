//! Process-wide subscribable session cell.
//!
//! [`SessionStore`] holds the current [`Session`] snapshot. Readers call
//! [`get`](SessionStore::get) or register a listener with
//! [`subscribe`](SessionStore::subscribe); only the session manager commits.
//!
//! Listeners live in an [`IndexMap`] so they are notified in registration
//! order and removed in O(1). Every commit carries the epoch of the
//! transition that produced it; a commit older than the stored epoch is
//! discarded so late publications never regress the cell.
//!
//! Fan-out is serialized: a commit notifies only after any fan-out already in
//! progress on another thread has finished or stepped aside, so listeners
//! never observe an older snapshot after a newer one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use indexmap::IndexMap;
use parking_lot::{Mutex, ReentrantMutex};
use swk_protocol::Session;
use tracing::trace;

/// Unique identifier for a registered listener.
pub type ListenerId = u64;

/// Callback invoked with each committed session.
pub type Listener = Arc<dyn Fn(&Session) + Send + Sync>;

type ListenerMap = Arc<Mutex<IndexMap<ListenerId, Listener>>>;

struct Cell {
	session: Session,
	epoch: u64,
}

struct StoreInner {
	cell: Mutex<Cell>,
	// Reentrant so a listener may commit from inside its own notification.
	fanout: ReentrantMutex<()>,
	listeners: ListenerMap,
	next_id: AtomicU64,
}

/// Read-only handle to the session cell. Clones share the same cell.
#[derive(Clone)]
pub struct SessionStore {
	inner: Arc<StoreInner>,
}

impl SessionStore {
	pub(crate) fn new() -> Self {
		Self {
			inner: Arc::new(StoreInner {
				cell: Mutex::new(Cell {
					session: Session::disconnected(),
					epoch: 0,
				}),
				fanout: ReentrantMutex::new(()),
				listeners: Arc::new(Mutex::new(IndexMap::new())),
				next_id: AtomicU64::new(1),
			}),
		}
	}

	/// Current snapshot.
	pub fn get(&self) -> Session {
		self.inner.cell.lock().session.clone()
	}

	/// Registers `listener` for every subsequent committed change.
	///
	/// The listener is not called with the current value. It runs on the
	/// committing task without the cell or listener locks held, so it may read
	/// the store or call back into the manager.
	pub fn subscribe<F>(&self, listener: F) -> Subscription
	where
		F: Fn(&Session) + Send + Sync + 'static,
	{
		let id = self.inner.next_id.fetch_add(1, Ordering::SeqCst);
		self.inner.listeners.lock().insert(id, Arc::new(listener));
		Subscription::from_listener_map(id, &self.inner.listeners)
	}

	/// Number of registered listeners.
	pub fn listener_count(&self) -> usize {
		self.inner.listeners.lock().len()
	}

	/// Stores `session` as of `epoch` and notifies listeners if it changed.
	///
	/// Returns whether listeners were notified. Notification stops early if a
	/// newer epoch is committed by a listener or another task mid-loop; that
	/// commit notifies with its own value.
	pub(crate) fn commit(&self, epoch: u64, session: Session) -> bool {
		{
			let mut cell = self.inner.cell.lock();
			if epoch < cell.epoch {
				trace!(target = "swk.session", epoch, current = cell.epoch, "discarding stale commit");
				return false;
			}
			cell.epoch = epoch;
			if cell.session == session {
				return false;
			}
			cell.session = session.clone();
		}

		let _fanout = self.inner.fanout.lock();
		let listeners: Vec<Listener> = self.inner.listeners.lock().values().cloned().collect();
		trace!(target = "swk.session", epoch, status = %session.status(), listeners = listeners.len(), "session committed");
		for listener in listeners {
			if self.inner.cell.lock().epoch != epoch {
				break;
			}
			listener(&session);
		}
		true
	}
}

impl std::fmt::Debug for SessionStore {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let cell = self.inner.cell.lock();
		f.debug_struct("SessionStore")
			.field("session", &cell.session)
			.field("epoch", &cell.epoch)
			.finish()
	}
}

/// RAII handle that unregisters a listener on drop.
///
/// Holds a weak reference to the listener map, so outliving the store is
/// safe (dropping becomes a no-op).
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
	id: ListenerId,
	listeners: Option<Weak<Mutex<IndexMap<ListenerId, Listener>>>>,
}

impl Subscription {
	fn from_listener_map(id: ListenerId, listeners: &ListenerMap) -> Self {
		Self {
			id,
			listeners: Some(Arc::downgrade(listeners)),
		}
	}

	pub fn id(&self) -> ListenerId {
		self.id
	}

	/// Explicitly unsubscribes. Equivalent to dropping.
	pub fn unsubscribe(mut self) {
		self.release();
	}

	/// Keeps the listener registered for the lifetime of the store.
	pub fn detach(mut self) {
		self.listeners = None;
	}

	fn release(&mut self) {
		if let Some(map) = self.listeners.take().and_then(|weak| weak.upgrade()) {
			map.lock().shift_remove(&self.id);
		}
	}
}

impl Drop for Subscription {
	fn drop(&mut self) {
		self.release();
	}
}

impl std::fmt::Debug for Subscription {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Subscription").field("id", &self.id).finish()
	}
}
