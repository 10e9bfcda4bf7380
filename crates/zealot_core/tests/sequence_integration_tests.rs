//! End-to-end sequencing tests over the in-memory store and a scripted
//! provisioner.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use tempfile::tempdir;
use zealot_core::{keys, ApplyOutcome, CoreError, RunSequence, RunSpec, RunState, MAIN_FILE};
use zealot_runner::{MockProvisioner, RunnerError, Stage};
use zealot_store::{MemoryTransport, StoreError};
use zealot_templates::TemplateError;

const JOB_BASE: &str = "jobconfig/zealot/demo/";

const TEMPLATE: &str = r#"terraform {
  backend "consul" {
    path = "{{StatePath}}"
  }
}

resource "local_file" "{{ResourceName}}" {
  content  = "{{Content}}"
  filename = "{{Filename}}"
}
"#;

fn seed_run(store: &MemoryTransport, workdir: &Path, autoapply: &str) {
    store.seed(format!("{JOB_BASE}module/ResourceName"), "web");
    store.seed(format!("{JOB_BASE}module/Content"), "hello world");
    store.seed(format!("{JOB_BASE}module/Filename"), "index.html");
    store.seed(
        format!("{JOB_BASE}WorkingDir"),
        workdir.to_string_lossy().into_owned(),
    );
    store.seed(format!("{JOB_BASE}autoapply"), autoapply);
    store.seed("appconfig/zealot/local_file/template", TEMPLATE);
}

fn sequence(store: &MemoryTransport, mock: &MockProvisioner) -> RunSequence {
    RunSequence::new(
        RunSpec::new("demo", "local_file"),
        Arc::new(store.clone()),
        Arc::new(mock.clone()),
    )
}

fn job_key(key: &str) -> String {
    format!("{JOB_BASE}{key}")
}

#[tokio::test]
async fn init_renders_and_writes_the_provisioning_file() {
    let dir = tempdir().unwrap();
    let store = MemoryTransport::new();
    seed_run(&store, dir.path(), "true");
    let mock = MockProvisioner::new();
    let mut run = sequence(&store, &mock);

    run.init().await.unwrap();

    assert_eq!(run.state(), RunState::Initialized);
    let rendered = fs::read_to_string(dir.path().join(MAIN_FILE)).unwrap();
    assert!(rendered.contains("resource \"local_file\" \"web\""));
    assert!(rendered.contains("content  = \"hello world\""));
    assert!(rendered.contains("filename = \"index.html\""));
    assert!(rendered.contains("path = \"jobconfig/zealot/demo/state\""));
    assert!(!rendered.contains("{{"));

    assert!(mock.was_called("fetch_tool"));
    assert!(mock.was_called("init"));
    assert_eq!(mock.calls()[0].workdir, dir.path());
    assert_eq!(run.rendered_file(), Some(rendered.as_str()));
}

#[tokio::test]
async fn init_creates_a_missing_working_directory() {
    let dir = tempdir().unwrap();
    let nested = dir.path().join("runs/demo");
    let store = MemoryTransport::new();
    seed_run(&store, &nested, "true");
    let mock = MockProvisioner::new();
    let mut run = sequence(&store, &mock);

    run.init().await.unwrap();

    assert!(nested.join(MAIN_FILE).is_file());
}

#[tokio::test]
async fn missing_required_key_aborts_before_any_tool_call() {
    let dir = tempdir().unwrap();
    let store = MemoryTransport::new();
    seed_run(&store, dir.path(), "true");
    // Remove one required key by reseeding everything except Content.
    let partial = MemoryTransport::new();
    for key in store.keys() {
        if key != job_key("module/Content") {
            partial.seed(key.clone(), store.value(&key).unwrap());
        }
    }
    let mock = MockProvisioner::new();
    let mut run = sequence(&partial, &mock);

    let err = run.init().await.unwrap_err();
    match err {
        CoreError::Template(TemplateError::Store(StoreError::MissingRequired { ref key })) => {
            assert_eq!(key, "jobconfig/zealot/demo/module/Content");
        }
        ref other => panic!("expected MissingRequired, got {:?}", other),
    }
    assert!(err.is_fatal());

    assert_eq!(mock.call_count(), 0);
    assert!(!dir.path().join(MAIN_FILE).exists());
    assert_eq!(run.state(), RunState::Uninitialized);
}

#[tokio::test]
async fn store_outage_during_init_is_fatal() {
    let dir = tempdir().unwrap();
    let store = MemoryTransport::new();
    seed_run(&store, dir.path(), "true");
    let store = store.fail_reads("connection refused");
    let mock = MockProvisioner::new();
    let mut run = sequence(&store, &mock);

    let err = run.init().await.unwrap_err();
    assert!(err.is_fatal());
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn plan_with_no_changes_persists_plan_text_only() {
    let dir = tempdir().unwrap();
    let store = MemoryTransport::new();
    seed_run(&store, dir.path(), "true");
    let mock = MockProvisioner::new()
        .with_plan_exit_code(0)
        .with_plan_output("No changes. Infrastructure is up-to-date.");
    let mut run = sequence(&store, &mock);

    run.init().await.unwrap();
    run.plan().await.unwrap();

    assert_eq!(run.state(), RunState::Planned);
    assert!(!run.changes_available());
    assert_eq!(
        store.value(&job_key(keys::PLAN_TEXT)),
        Some(b"No changes. Infrastructure is up-to-date.".to_vec())
    );
    assert_eq!(store.value(&job_key(keys::CHANGES_AVAILABLE)), None);
    assert_eq!(store.value(&job_key(keys::PLANFILE)), None);
}

#[tokio::test]
async fn plan_with_changes_persists_flag_text_and_artifact() {
    let dir = tempdir().unwrap();
    let store = MemoryTransport::new();
    seed_run(&store, dir.path(), "true");
    let artifact: Vec<u8> = vec![0x00, 0x9f, 0x42, 0xff];
    let mock = MockProvisioner::new()
        .with_plan_exit_code(2)
        .with_plan_output("Plan: 1 to add, 0 to change, 0 to destroy.")
        .with_plan_artifact(artifact.clone());
    let mut run = sequence(&store, &mock);

    run.init().await.unwrap();
    run.plan().await.unwrap();

    assert!(run.changes_available());
    assert_eq!(
        store.value(&job_key(keys::CHANGES_AVAILABLE)),
        Some(b"true".to_vec())
    );
    assert_eq!(
        store.value(&job_key(keys::PLAN_TEXT)),
        Some(b"Plan: 1 to add, 0 to change, 0 to destroy.".to_vec())
    );
    // The binary artifact must round-trip byte for byte.
    assert_eq!(store.value(&job_key(keys::PLANFILE)), Some(artifact));
}

#[tokio::test]
async fn failed_plan_persists_nothing() {
    let dir = tempdir().unwrap();
    let store = MemoryTransport::new();
    seed_run(&store, dir.path(), "true");
    let mock = MockProvisioner::new().with_plan_exit_code(1);
    let mut run = sequence(&store, &mock);

    run.init().await.unwrap();
    let err = run.plan().await.unwrap_err();

    assert!(matches!(
        err,
        CoreError::Runner(RunnerError::PlanFailed { .. })
    ));
    assert!(!err.is_fatal());
    assert_eq!(store.value(&job_key(keys::PLAN_TEXT)), None);
    assert_eq!(store.value(&job_key(keys::CHANGES_AVAILABLE)), None);
    assert_eq!(store.value(&job_key(keys::PLANFILE)), None);
    assert_eq!(run.state(), RunState::Initialized);
}

#[tokio::test]
async fn unknown_plan_exit_code_fails_and_persists_nothing() {
    let dir = tempdir().unwrap();
    let store = MemoryTransport::new();
    seed_run(&store, dir.path(), "true");
    let mock = MockProvisioner::new().with_plan_exit_code(3);
    let mut run = sequence(&store, &mock);

    run.init().await.unwrap();
    let err = run.plan().await.unwrap_err();

    assert!(matches!(
        err,
        CoreError::Runner(RunnerError::UnexpectedExitCode { code: 3, .. })
    ));
    assert_eq!(store.value(&job_key(keys::PLAN_TEXT)), None);
}

#[tokio::test]
async fn store_write_failure_during_plan_is_fatal() {
    let dir = tempdir().unwrap();
    let store = MemoryTransport::new();
    seed_run(&store, dir.path(), "true");
    let mock = MockProvisioner::new().with_plan_exit_code(0);
    let mut run = sequence(&store, &mock);

    run.init().await.unwrap();
    let _ = store.clone().fail_writes("agent down");
    let err = run.plan().await.unwrap_err();

    assert!(matches!(
        err,
        CoreError::Store(StoreError::WriteFailed { .. })
    ));
    assert!(err.is_fatal());
}

#[tokio::test]
async fn apply_runs_when_changes_pending_and_autoapply_set() {
    let dir = tempdir().unwrap();
    let store = MemoryTransport::new();
    seed_run(&store, dir.path(), "true");
    let mock = MockProvisioner::new().with_plan_exit_code(2);
    let mut run = sequence(&store, &mock);

    run.init().await.unwrap();
    run.plan().await.unwrap();
    let outcome = run.apply().await.unwrap();

    assert_eq!(outcome, ApplyOutcome::Applied);
    assert_eq!(run.state(), RunState::Applied);
    assert!(mock.was_called("apply"));
    assert!(run.apply_output().is_some());
}

#[tokio::test]
async fn apply_is_skipped_without_autoapply() {
    let dir = tempdir().unwrap();
    let store = MemoryTransport::new();
    seed_run(&store, dir.path(), "false");
    let mock = MockProvisioner::new().with_plan_exit_code(2);
    let mut run = sequence(&store, &mock);

    run.init().await.unwrap();
    run.plan().await.unwrap();
    let outcome = run.apply().await.unwrap();

    assert_eq!(outcome, ApplyOutcome::Skipped);
    assert_eq!(run.state(), RunState::Skipped);
    assert!(!mock.was_called("apply"));
}

#[tokio::test]
async fn apply_is_skipped_without_changes() {
    let dir = tempdir().unwrap();
    let store = MemoryTransport::new();
    seed_run(&store, dir.path(), "true");
    let mock = MockProvisioner::new().with_plan_exit_code(0);
    let mut run = sequence(&store, &mock);

    run.init().await.unwrap();
    run.plan().await.unwrap();
    let outcome = run.apply().await.unwrap();

    assert_eq!(outcome, ApplyOutcome::Skipped);
    assert!(!mock.was_called("apply"));
}

#[tokio::test]
async fn autoapply_accepts_only_literal_true_spellings() {
    for (raw, expected) in [
        ("true", ApplyOutcome::Applied),
        ("True", ApplyOutcome::Applied),
        ("TRUE", ApplyOutcome::Skipped),
        ("yes", ApplyOutcome::Skipped),
        ("1", ApplyOutcome::Skipped),
    ] {
        let dir = tempdir().unwrap();
        let store = MemoryTransport::new();
        seed_run(&store, dir.path(), raw);
        let mock = MockProvisioner::new().with_plan_exit_code(2);
        let mut run = sequence(&store, &mock);

        run.init().await.unwrap();
        run.plan().await.unwrap();
        assert_eq!(run.apply().await.unwrap(), expected, "autoapply {:?}", raw);
    }
}

#[tokio::test]
async fn apply_failure_is_fatal_and_leaves_state_planned() {
    let dir = tempdir().unwrap();
    let store = MemoryTransport::new();
    seed_run(&store, dir.path(), "true");
    let mock = MockProvisioner::new()
        .with_plan_exit_code(2)
        .with_apply_exit_code(1);
    let mut run = sequence(&store, &mock);

    run.init().await.unwrap();
    run.plan().await.unwrap();
    let err = run.apply().await.unwrap_err();

    assert!(matches!(
        err,
        CoreError::Runner(RunnerError::StageFailed { stage: Stage::Apply, .. })
    ));
    assert!(err.is_fatal());
    assert_eq!(run.state(), RunState::Planned);
    // The lock stays with the failed run; the session TTL reclaims it.
    assert!(store.lock_holder("jobconfig/zealot/demo/.lock").is_some());
}

#[tokio::test]
async fn plan_requires_a_completed_init() {
    let store = MemoryTransport::new();
    let mock = MockProvisioner::new();
    let mut run = sequence(&store, &mock);

    let err = run.plan().await.unwrap_err();
    assert!(matches!(err, CoreError::InvalidState { .. }));
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn apply_requires_a_completed_plan() {
    let dir = tempdir().unwrap();
    let store = MemoryTransport::new();
    seed_run(&store, dir.path(), "true");
    let mock = MockProvisioner::new();
    let mut run = sequence(&store, &mock);

    run.init().await.unwrap();
    let err = run.apply().await.unwrap_err();
    assert!(matches!(err, CoreError::InvalidState { .. }));
    assert!(!mock.was_called("apply"));
}

#[tokio::test]
async fn failed_init_blocks_the_rest_of_the_run() {
    let dir = tempdir().unwrap();
    let store = MemoryTransport::new();
    seed_run(&store, dir.path(), "true");
    let mock = MockProvisioner::new().with_init_exit_code(1);
    let mut run = sequence(&store, &mock);

    let err = run.init().await.unwrap_err();
    assert!(matches!(
        err,
        CoreError::Runner(RunnerError::StageFailed { stage: Stage::Init, code: 1, .. })
    ));
    assert!(!err.is_fatal());
    assert_eq!(run.state(), RunState::Uninitialized);

    let err = run.plan().await.unwrap_err();
    assert!(matches!(err, CoreError::InvalidState { .. }));
    assert!(!mock.was_called("plan"));
}

#[tokio::test]
async fn tool_fetch_failure_stops_the_run_before_rendering() {
    let dir = tempdir().unwrap();
    let store = MemoryTransport::new();
    seed_run(&store, dir.path(), "true");
    let mock = MockProvisioner::new().fail_fetch("mirror unreachable");
    let mut run = sequence(&store, &mock);

    let err = run.init().await.unwrap_err();
    assert!(matches!(
        err,
        CoreError::Runner(RunnerError::InstallFailed(_))
    ));
    assert!(err.is_fatal());
    assert!(!dir.path().join(MAIN_FILE).exists());
}

#[tokio::test]
async fn concurrent_run_on_the_same_resource_is_locked_out() {
    let dir = tempdir().unwrap();
    let store = MemoryTransport::new();
    seed_run(&store, dir.path(), "true");
    let mock = MockProvisioner::new().with_plan_exit_code(2);

    let mut first = sequence(&store, &mock);
    first.init().await.unwrap();

    let mut second = sequence(&store, &MockProvisioner::new());
    let err = second.init().await.unwrap_err();
    assert!(matches!(
        err,
        CoreError::Store(StoreError::LockHeld { .. })
    ));
    assert!(err.is_fatal());

    // The lock clears once the first run completes.
    first.plan().await.unwrap();
    first.apply().await.unwrap();
    assert_eq!(store.lock_holder("jobconfig/zealot/demo/.lock"), None);

    let mut third = sequence(&store, &MockProvisioner::new().with_plan_exit_code(0));
    third.init().await.unwrap();
}

#[tokio::test]
async fn lock_is_released_after_a_skipped_apply() {
    let dir = tempdir().unwrap();
    let store = MemoryTransport::new();
    seed_run(&store, dir.path(), "false");
    let mock = MockProvisioner::new().with_plan_exit_code(0);
    let mut run = sequence(&store, &mock);

    run.init().await.unwrap();
    assert!(store.lock_holder("jobconfig/zealot/demo/.lock").is_some());

    run.plan().await.unwrap();
    run.apply().await.unwrap();
    assert_eq!(store.lock_holder("jobconfig/zealot/demo/.lock"), None);
}

#[tokio::test]
async fn runs_against_different_resources_do_not_contend() {
    let dir_a = tempdir().unwrap();
    let dir_b = tempdir().unwrap();
    let store = MemoryTransport::new();
    seed_run(&store, dir_a.path(), "true");

    store.seed("jobconfig/zealot/other/module/ResourceName", "db");
    store.seed("jobconfig/zealot/other/module/Content", "data");
    store.seed("jobconfig/zealot/other/module/Filename", "db.txt");
    store.seed(
        "jobconfig/zealot/other/WorkingDir",
        dir_b.path().to_string_lossy().into_owned(),
    );
    store.seed("jobconfig/zealot/other/autoapply", "true");

    let mut demo = sequence(&store, &MockProvisioner::new());
    demo.init().await.unwrap();

    let mut other = RunSequence::new(
        RunSpec::new("other", "local_file"),
        Arc::new(store.clone()),
        Arc::new(MockProvisioner::new()),
    );
    other.init().await.unwrap();

    // Each rendered file derives its state path from its own namespace.
    let rendered = fs::read_to_string(dir_b.path().join(MAIN_FILE)).unwrap();
    assert!(rendered.contains("jobconfig/zealot/other/state"));
}
