//! End-to-end session lifecycle through the public manager API.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use swk::{Selection, SelectionPrompt, SessionConfig, SessionError, WalletSessionManager};
use swk_protocol::{Session, SessionStatus, SignerOption};
use swk_runtime::{BackendsLoader, InitPhase, ScriptedOutcome, ScriptedSigner, SignerAgentAdapter, SignerBackend};
use tokio::sync::Notify;

#[derive(Default)]
struct ScriptPrompt {
	answers: Mutex<VecDeque<Selection>>,
	calls: AtomicUsize,
	gate: Option<Arc<Notify>>,
}

impl ScriptPrompt {
	fn answering(answers: impl IntoIterator<Item = Selection>) -> Arc<Self> {
		Arc::new(Self {
			answers: Mutex::new(answers.into_iter().collect()),
			..Self::default()
		})
	}

	fn gated(answers: impl IntoIterator<Item = Selection>, gate: Arc<Notify>) -> Arc<Self> {
		Arc::new(Self {
			answers: Mutex::new(answers.into_iter().collect()),
			gate: Some(gate),
			..Self::default()
		})
	}

	fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}

#[async_trait]
impl SelectionPrompt for ScriptPrompt {
	async fn select(&self, _options: &[SignerOption]) -> Selection {
		self.calls.fetch_add(1, Ordering::SeqCst);
		if let Some(gate) = &self.gate {
			gate.notified().await;
		}
		self.answers.lock().pop_front().unwrap_or(Selection::Cancelled)
	}
}

fn freighter() -> Arc<ScriptedSigner> {
	Arc::new(ScriptedSigner::new("freighter", "Freighter", "G...ABCD"))
}

fn manager_with(signers: &[Arc<ScriptedSigner>], prompt: &Arc<ScriptPrompt>, config: SessionConfig) -> WalletSessionManager {
	let backends = signers.iter().cloned().map(SignerBackend::from).collect();
	let adapter = SignerAgentAdapter::new(BackendsLoader::new(backends), config.kit_config());
	WalletSessionManager::from_prompt(adapter, prompt.clone(), config)
}

fn manager(signers: &[Arc<ScriptedSigner>], prompt: &Arc<ScriptPrompt>) -> WalletSessionManager {
	manager_with(signers, prompt, SessionConfig::default())
}

fn record(manager: &WalletSessionManager) -> (swk::Subscription, Arc<Mutex<Vec<Session>>>) {
	let seen = Arc::new(Mutex::new(Vec::new()));
	let sink = Arc::clone(&seen);
	let sub = manager.on_session_change(move |session| sink.lock().push(session.clone()));
	(sub, seen)
}

async fn wait_for(manager: &WalletSessionManager, status: SessionStatus) {
	tokio::time::timeout(Duration::from_secs(5), async {
		while manager.status() != status {
			tokio::task::yield_now().await;
		}
	})
	.await
	.expect("manager never reached expected status");
}

#[tokio::test]
async fn selecting_freighter_connects_and_notifies_once() {
	let prompt = ScriptPrompt::answering([Selection::selected("freighter")]);
	let manager = manager(&[freighter()], &prompt);
	let (_sub, seen) = record(&manager);

	let session = manager.connect().await.unwrap();

	let expected = Session::connected("G...ABCD", "freighter");
	assert_eq!(session, expected);
	assert_eq!(manager.get_session(), expected);
	assert_eq!(manager.status(), SessionStatus::Connected);
	assert_eq!(*seen.lock(), vec![expected]);
}

#[tokio::test]
async fn concurrent_connects_share_one_prompt() {
	let prompt = ScriptPrompt::answering([Selection::selected("freighter")]);
	let manager = manager(&[freighter()], &prompt);

	let (first, second) = tokio::join!(manager.connect(), manager.connect());

	assert_eq!(prompt.calls(), 1);
	assert_eq!(first.unwrap(), second.unwrap());
	assert_eq!(manager.adapter().load_count(), 1);
}

#[tokio::test]
async fn concurrent_connects_share_a_failure() {
	let prompt = ScriptPrompt::answering([Selection::Cancelled]);
	let manager = manager(&[freighter()], &prompt);

	let (first, second, third) = tokio::join!(manager.connect(), manager.connect(), manager.connect());

	assert_eq!(prompt.calls(), 1);
	assert_eq!(first, Err(SessionError::Cancelled));
	assert_eq!(second, Err(SessionError::Cancelled));
	assert_eq!(third, Err(SessionError::Cancelled));
}

#[tokio::test]
async fn connect_while_connected_returns_current_session() {
	let prompt = ScriptPrompt::answering([Selection::selected("freighter")]);
	let signer = freighter();
	let manager = manager(&[Arc::clone(&signer)], &prompt);

	let first = manager.connect().await.unwrap();
	let second = manager.connect().await.unwrap();

	assert_eq!(first, second);
	assert_eq!(prompt.calls(), 1);
	assert_eq!(signer.address_calls(), 1);
}

#[tokio::test]
async fn no_installed_signer_is_reported_without_prompting() {
	let prompt = ScriptPrompt::answering([]);
	let signer = freighter();
	signer.set_available(false);
	let manager = manager(&[signer], &prompt);
	let (_sub, seen) = record(&manager);

	let err = manager.connect().await.unwrap_err();

	assert_eq!(err, SessionError::NoSignerAvailable);
	assert_eq!(prompt.calls(), 0);
	assert_eq!(manager.get_session(), Session::disconnected());
	assert!(seen.lock().is_empty());
}

#[tokio::test]
async fn cancelled_prompt_leaves_session_untouched() {
	let prompt = ScriptPrompt::answering([Selection::Cancelled]);
	let manager = manager(&[freighter()], &prompt);
	let (_sub, seen) = record(&manager);

	let err = manager.connect().await.unwrap_err();

	assert_eq!(err, SessionError::Cancelled);
	assert!(err.is_benign());
	assert_eq!(manager.status(), SessionStatus::Disconnected);
	assert_eq!(manager.get_session(), Session::disconnected());
	assert!(seen.lock().is_empty());
}

#[tokio::test]
async fn stale_selection_reprompts() {
	let prompt = ScriptPrompt::answering([Selection::selected("ghost"), Selection::selected("freighter")]);
	let manager = manager(&[freighter()], &prompt);

	let session = manager.connect().await.unwrap();

	assert_eq!(prompt.calls(), 2);
	assert_eq!(session.signer_id().map(|id| id.as_str()), Some("freighter"));
}

#[tokio::test]
async fn stale_selection_gives_up_after_max_attempts() {
	let prompt = ScriptPrompt::answering([Selection::selected("ghost"), Selection::selected("ghost"), Selection::selected("freighter")]);
	let manager = manager_with(&[freighter()], &prompt, SessionConfig::default().with_max_prompt_attempts(2));

	let err = manager.connect().await.unwrap_err();

	assert_eq!(err, SessionError::UnknownSigner { id: "ghost".into() });
	assert!(err.is_retryable());
	assert_eq!(prompt.calls(), 2);
	assert_eq!(manager.status(), SessionStatus::Disconnected);
}

#[tokio::test]
async fn rejection_at_signer_is_benign() {
	let prompt = ScriptPrompt::answering([Selection::selected("freighter")]);
	let signer = freighter();
	signer.set_address_outcome(ScriptedOutcome::Reject("user declined".into()));
	let manager = manager(&[signer], &prompt);

	let err = manager.connect().await.unwrap_err();

	assert_eq!(
		err,
		SessionError::SignerRejected {
			signer: "freighter".into(),
			reason: "user declined".into(),
		}
	);
	assert!(err.is_benign());
	assert_eq!(manager.get_session(), Session::disconnected());
}

#[tokio::test]
async fn signer_removed_mid_flow_is_retryable() {
	let prompt = ScriptPrompt::answering([Selection::selected("freighter"), Selection::selected("freighter")]);
	let signer = freighter();
	signer.set_address_outcome(ScriptedOutcome::Unavailable("extension disabled".into()));
	let manager = manager(&[Arc::clone(&signer)], &prompt);

	let err = manager.connect().await.unwrap_err();
	assert!(matches!(err, SessionError::SignerUnavailable { signer: Some(ref id), .. } if *id == "freighter"));
	assert!(err.is_retryable());
	assert_eq!(manager.status(), SessionStatus::Disconnected);

	signer.set_address_outcome(ScriptedOutcome::Approve);
	assert!(manager.connect().await.unwrap().is_connected());
}

#[tokio::test]
async fn disconnect_resets_when_teardown_fails() {
	let prompt = ScriptPrompt::answering([Selection::selected("freighter")]);
	let signer = freighter();
	signer.set_disconnect_outcome(ScriptedOutcome::Unavailable("already gone".into()));
	let manager = manager(&[Arc::clone(&signer)], &prompt);
	manager.connect().await.unwrap();
	let (_sub, seen) = record(&manager);

	manager.disconnect().await;

	assert_eq!(signer.disconnect_calls(), 1);
	assert_eq!(manager.status(), SessionStatus::Disconnected);
	assert_eq!(manager.get_session(), Session::disconnected());
	assert_eq!(*seen.lock(), vec![Session::disconnected()]);
}

#[tokio::test(start_paused = true)]
async fn disconnect_resets_when_teardown_hangs() {
	let prompt = ScriptPrompt::answering([Selection::selected("freighter")]);
	let signer = freighter();
	signer.set_disconnect_outcome(ScriptedOutcome::Hang);
	let config = SessionConfig::default().with_teardown_timeout(Duration::from_millis(250));
	let manager = manager_with(&[signer], &prompt, config);
	manager.connect().await.unwrap();

	let started = tokio::time::Instant::now();
	manager.disconnect().await;

	assert!(started.elapsed() >= Duration::from_millis(250));
	assert_eq!(manager.get_session(), Session::disconnected());
}

#[tokio::test]
async fn disconnect_when_never_connected_does_nothing() {
	let prompt = ScriptPrompt::answering([]);
	let manager = manager(&[freighter()], &prompt);

	manager.disconnect().await;

	assert_eq!(manager.status(), SessionStatus::Disconnected);
	assert_eq!(manager.adapter().phase(), InitPhase::Uninitialized);
}

#[tokio::test]
async fn adapter_is_loaded_lazily_and_once() {
	let prompt = ScriptPrompt::answering([Selection::selected("freighter"), Selection::selected("freighter")]);
	let manager = manager(&[freighter()], &prompt);
	assert_eq!(manager.adapter().load_count(), 0);

	manager.connect().await.unwrap();
	manager.disconnect().await;
	manager.connect().await.unwrap();

	assert_eq!(manager.adapter().load_count(), 1);
	assert_eq!(manager.adapter().phase(), InitPhase::Ready);
	assert_eq!(prompt.calls(), 2);
}

#[tokio::test]
async fn abandoned_connect_still_commits() {
	let gate = Arc::new(Notify::new());
	let prompt = ScriptPrompt::gated([Selection::selected("freighter")], Arc::clone(&gate));
	let manager = manager(&[freighter()], &prompt);
	let (_sub, seen) = record(&manager);

	let abandoned = tokio::time::timeout(Duration::from_millis(20), manager.connect()).await;
	assert!(abandoned.is_err());
	assert_eq!(manager.status(), SessionStatus::Connecting);

	gate.notify_one();
	wait_for(&manager, SessionStatus::Connected).await;

	assert_eq!(manager.get_session(), Session::connected("G...ABCD", "freighter"));
	assert_eq!(seen.lock().len(), 1);
}

#[tokio::test]
async fn disconnect_during_connect_waits_then_tears_down() {
	let gate = Arc::new(Notify::new());
	let prompt = ScriptPrompt::gated([Selection::selected("freighter")], Arc::clone(&gate));
	let signer = freighter();
	let manager = manager(&[Arc::clone(&signer)], &prompt);

	let connecting = tokio::spawn({
		let manager = manager.clone();
		async move { manager.connect().await }
	});
	wait_for(&manager, SessionStatus::Connecting).await;

	gate.notify_one();
	manager.disconnect().await;

	assert!(connecting.await.unwrap().unwrap().is_connected());
	assert_eq!(signer.disconnect_calls(), 1);
	assert_eq!(manager.get_session(), Session::disconnected());
}

#[tokio::test(start_paused = true)]
async fn connect_during_disconnect_waits_for_teardown() {
	let prompt = ScriptPrompt::answering([Selection::selected("freighter"), Selection::selected("freighter")]);
	let signer = Arc::new(ScriptedSigner::new("freighter", "Freighter", "G...ABCD").with_latency(Duration::from_millis(100)));
	let manager = manager(&[Arc::clone(&signer)], &prompt);
	manager.connect().await.unwrap();

	let (_, reconnected) = tokio::join!(manager.disconnect(), async {
		wait_for(&manager, SessionStatus::Disconnecting).await;
		manager.connect().await
	});

	assert!(reconnected.unwrap().is_connected());
	assert_eq!(signer.disconnect_calls(), 1);
	assert_eq!(prompt.calls(), 2);
	assert_eq!(manager.status(), SessionStatus::Connected);
}
