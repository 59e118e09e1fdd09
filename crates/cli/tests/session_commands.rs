//! Integration tests driving the `swk` binary against scripted signers.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use serde_json::{Value, json};
use tempfile::TempDir;

fn swk_binary() -> PathBuf {
	PathBuf::from(env!("CARGO_BIN_EXE_swk"))
}

fn write_config(dir: &TempDir, config: Value) -> PathBuf {
	let path = dir.path().join("config.json");
	std::fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();
	path
}

fn two_signers(dir: &TempDir) -> PathBuf {
	write_config(
		dir,
		json!({
			"signers": [
				{ "kind": "scripted", "id": "freighter", "name": "Freighter", "address": "G...ABCD" },
				{ "kind": "scripted", "id": "albedo", "name": "Albedo", "address": "G...ALBE" },
				{ "kind": "scripted", "id": "xbull", "name": "xBull", "address": "G...XBUL", "available": false }
			]
		}),
	)
}

fn run_swk(config: &Path, args: &[&str], stdin: &str) -> Output {
	let mut child = Command::new(swk_binary())
		.arg("--config")
		.arg(config)
		.args(args)
		.env("NO_COLOR", "1")
		.env_remove("RUST_LOG")
		.stdin(Stdio::piped())
		.stdout(Stdio::piped())
		.stderr(Stdio::piped())
		.spawn()
		.expect("failed to execute swk");

	child.stdin.take().unwrap().write_all(stdin.as_bytes()).unwrap();
	child.wait_with_output().unwrap()
}

fn envelopes(output: &Output) -> Vec<Value> {
	let stdout = String::from_utf8_lossy(&output.stdout);
	stdout
		.lines()
		.filter(|line| !line.trim().is_empty())
		.map(|line| serde_json::from_str(line).unwrap_or_else(|err| panic!("invalid envelope {line:?}: {err}")))
		.collect()
}

fn single_envelope(output: &Output) -> Value {
	let mut all = envelopes(output);
	assert_eq!(all.len(), 1, "expected one envelope, got {all:?}");
	all.remove(0)
}

#[test]
fn options_lists_available_signers_in_order() {
	let tmp = TempDir::new().unwrap();
	let config = two_signers(&tmp);

	let output = run_swk(&config, &["options"], "");
	assert!(output.status.success());

	let result = single_envelope(&output);
	assert_eq!(result["ok"], true);
	assert_eq!(result["command"], "options");
	assert_eq!(result["data"]["network"], "testnet");
	assert_eq!(result["data"]["config"], config.to_str().unwrap());
	assert_eq!(
		result["data"]["options"],
		json!([
			{ "id": "freighter", "displayName": "Freighter" },
			{ "id": "albedo", "displayName": "Albedo" }
		])
	);
}

#[test]
fn missing_config_means_no_signers() {
	let tmp = TempDir::new().unwrap();
	let missing = tmp.path().join("absent.json");

	let output = run_swk(&missing, &["options"], "");
	assert!(output.status.success());
	assert_eq!(single_envelope(&output)["data"]["options"], json!([]));

	let output = run_swk(&missing, &["connect", "--signer", "freighter"], "");
	assert_eq!(output.status.code(), Some(1));
	let result = single_envelope(&output);
	assert_eq!(result["ok"], false);
	assert_eq!(result["error"]["code"], "NO_SIGNER_AVAILABLE");
}

#[test]
fn connect_with_signer_flag() {
	let tmp = TempDir::new().unwrap();
	let config = two_signers(&tmp);

	let output = run_swk(&config, &["connect", "--signer", "freighter", "--network", "mainnet"], "");
	assert!(output.status.success());

	let result = single_envelope(&output);
	assert_eq!(
		result["data"],
		json!({ "status": "connected", "address": "G...ABCD", "signerId": "freighter", "network": "mainnet" })
	);
}

#[test]
fn connect_prompts_on_stdin() {
	let tmp = TempDir::new().unwrap();
	let config = two_signers(&tmp);

	let output = run_swk(&config, &["connect"], "2\n");
	assert!(output.status.success());
	assert_eq!(single_envelope(&output)["data"]["signerId"], "albedo");

	let stderr = String::from_utf8_lossy(&output.stderr);
	assert!(stderr.contains("1) Freighter [freighter]"));
	assert!(!stderr.contains("xBull"));
}

#[test]
fn closed_prompt_is_cancelled_and_benign() {
	let tmp = TempDir::new().unwrap();
	let config = two_signers(&tmp);

	let output = run_swk(&config, &["connect"], "");
	assert!(output.status.success());

	let result = single_envelope(&output);
	assert_eq!(result["ok"], false);
	assert_eq!(result["error"]["code"], "CANCELLED");
}

#[test]
fn stale_selection_is_reprompted_then_reported() {
	let tmp = TempDir::new().unwrap();
	let config = two_signers(&tmp);

	let output = run_swk(&config, &["connect"], "xbull\nfreighter\n");
	assert!(output.status.success());
	assert_eq!(single_envelope(&output)["data"]["signerId"], "freighter");

	let output = run_swk(&config, &["connect", "--signer", "xbull"], "");
	assert_eq!(output.status.code(), Some(1));
	let result = single_envelope(&output);
	assert_eq!(result["error"]["code"], "UNKNOWN_SIGNER");
	assert_eq!(result["error"]["details"]["signer"], "xbull");
}

#[test]
fn signer_rejection_exits_zero() {
	let tmp = TempDir::new().unwrap();
	let config = write_config(
		&tmp,
		json!({
			"signers": [{
				"kind": "scripted", "id": "freighter", "name": "Freighter", "address": "G...ABCD",
				"outcome": { "kind": "reject", "reason": "user declined" }
			}]
		}),
	);

	let output = run_swk(&config, &["connect", "--signer", "freighter"], "");
	assert!(output.status.success());

	let result = single_envelope(&output);
	assert_eq!(result["error"]["code"], "SIGNER_REJECTED");
	assert_eq!(result["error"]["message"], "freighter rejected the connection: user declined");
}

#[test]
fn missing_agent_binary_is_not_listed() {
	let tmp = TempDir::new().unwrap();
	let config = write_config(
		&tmp,
		json!({
			"signers": [{ "kind": "process", "id": "agent", "name": "Agent", "command": "swk-agent-that-does-not-exist" }]
		}),
	);

	let output = run_swk(&config, &["options"], "");
	assert!(output.status.success());
	assert_eq!(single_envelope(&output)["data"]["options"], json!([]));
}

#[test]
fn malformed_config_is_reported() {
	let tmp = TempDir::new().unwrap();
	let path = tmp.path().join("config.json");
	std::fs::write(&path, "{ not json").unwrap();

	let output = run_swk(&path, &["options"], "");
	assert_eq!(output.status.code(), Some(1));

	let result = single_envelope(&output);
	assert_eq!(result["command"], "options");
	assert_eq!(result["error"]["code"], "CONFIG_ERROR");
}

#[test]
fn text_format_prints_plain_lines() {
	let tmp = TempDir::new().unwrap();
	let config = two_signers(&tmp);

	let output = run_swk(&config, &["-f", "text", "connect", "--signer", "freighter"], "");
	assert!(output.status.success());
	let stdout = String::from_utf8_lossy(&output.stdout);
	assert_eq!(stdout.trim(), "connected G...ABCD via freighter (testnet)");

	let output = run_swk(&config, &["-f", "text", "options"], "");
	let stdout = String::from_utf8_lossy(&output.stdout);
	assert_eq!(stdout.lines().collect::<Vec<_>>(), ["freighter\tFreighter", "albedo\tAlbedo"]);
}

#[test]
fn shell_runs_one_session_across_commands() {
	let tmp = TempDir::new().unwrap();
	let config = two_signers(&tmp);

	let script = "status\nconnect\n1\nconnect\nstatus\nbogus\ndisconnect\nstatus\nquit\n";
	let output = run_swk(&config, &["shell"], script);
	assert!(output.status.success());

	let results = envelopes(&output);
	let summary: Vec<(String, Value)> = results
		.iter()
		.map(|result| {
			let command = result["command"].as_str().unwrap().to_owned();
			let outcome = if result["ok"] == true {
				result["data"]["status"].clone()
			} else {
				result["error"]["code"].clone()
			};
			(command, outcome)
		})
		.collect();

	assert_eq!(
		summary,
		vec![
			("status".to_owned(), json!("disconnected")),
			("connect".to_owned(), json!("connected")),
			("connect".to_owned(), json!("connected")),
			("status".to_owned(), json!("connected")),
			("shell".to_owned(), json!("INVALID_INPUT")),
			("disconnect".to_owned(), json!("disconnected")),
			("status".to_owned(), json!("disconnected")),
		]
	);
}

#[test]
fn shell_cancelled_connect_keeps_looping() {
	let tmp = TempDir::new().unwrap();
	let config = two_signers(&tmp);

	let output = run_swk(&config, &["shell"], "connect\nq\nconnect\nalbedo\nstatus\n");
	assert!(output.status.success());

	let results = envelopes(&output);
	assert_eq!(results.len(), 3);
	assert_eq!(results[0]["error"]["code"], "CANCELLED");
	assert_eq!(results[1]["data"]["signerId"], "albedo");
	assert_eq!(results[2]["data"]["status"], "connected");
}
