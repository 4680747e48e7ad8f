//! Tests for the Juju CLI backend
//!
//! A shell script stands in for the `juju` binary. It appends every argv to
//! `calls.log` next to itself and keeps the deployed application in
//! `state.json`, which it serves back from `status --format json`.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;

use tempfile::TempDir;

use falcosidekick_deploy::{
    deploy::{DeploymentInvoker, APP_NAME, CHARM_NAME, MODEL_NAME},
    juju::JujuClient,
    models::DeployParams,
    provider::ProviderHandle,
};

const FAKE_JUJU: &str = r#"#!/bin/sh
dir=$(dirname "$0")
echo "$*" >> "$dir/calls.log"
cmd=$1
case "$cmd" in
  show-model)
    exit 0
    ;;
  status)
    if [ -f "$dir/state.json" ]; then
      cat "$dir/state.json"
    else
      echo '{"applications":{}}'
    fi
    ;;
  deploy|refresh)
    if [ "$cmd" = refresh ] && [ -f "$dir/already-running" ]; then
      echo 'ERROR already running charm "falcosidekick-k8s"' >&2
      exit 1
    fi
    if [ "$cmd" = deploy ]; then app=$3; else app=$2; fi
    channel=""
    revision=7
    while [ $# -gt 0 ]; do
      case "$1" in
        --channel) channel=$2; shift ;;
        --revision) revision=$2; shift ;;
      esac
      shift
    done
    printf '{"applications":{"%s":{"charm":"falcosidekick-k8s","charm-channel":"%s","charm-rev":%s,"application-status":{"current":"active"}}}}\n' "$app" "$channel" "$revision" > "$dir/state.json"
    ;;
  remove-application)
    if [ -f "$dir/state.json" ]; then
      rm "$dir/state.json"
    else
      echo "ERROR application \"$2\" not found" >&2
      exit 1
    fi
    ;;
  *)
    echo "ERROR unexpected command $cmd" >&2
    exit 2
    ;;
esac
"#;

struct FakeJuju {
    dir: TempDir,
    handle: ProviderHandle,
}

impl FakeJuju {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("juju");
        fs::write(&path, FAKE_JUJU).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();

        let client = JujuClient::new(path.to_string_lossy().into_owned(), CHARM_NAME);
        let handle = ProviderHandle::bind(client).unwrap();
        Self { dir, handle }
    }

    /// Commands issued since the last call, oldest first
    fn take_calls(&self) -> Vec<String> {
        let log = self.dir.path().join("calls.log");
        let calls = fs::read_to_string(&log)
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect();
        let _ = fs::remove_file(&log);
        calls
    }

    fn mutating(calls: &[String]) -> Vec<&String> {
        calls
            .iter()
            .filter(|c| c.starts_with("deploy") || c.starts_with("refresh"))
            .collect()
    }
}

fn params(channel: &str, revision: Option<i64>) -> DeployParams {
    DeployParams {
        channel: channel.to_string(),
        revision,
    }
}

#[tokio::test]
async fn test_deploy_skip_then_refresh() {
    let juju = FakeJuju::new();
    let invoker = DeploymentInvoker::new(&juju.handle);

    let deployed = invoker.deploy(&params("latest/edge", Some(1))).await.unwrap();
    assert_eq!(deployed.app_name, APP_NAME);
    assert_eq!(deployed.channel, "latest/edge");
    assert_eq!(deployed.revision_resolved, 1);

    let calls = juju.take_calls();
    assert_eq!(calls[0], format!("show-model {}", MODEL_NAME));
    assert_eq!(
        FakeJuju::mutating(&calls),
        vec![&format!(
            "deploy {} {} --model {} --channel latest/edge --revision 1",
            CHARM_NAME, APP_NAME, MODEL_NAME
        )]
    );

    // same pin again: only reads
    let again = invoker.deploy(&params("latest/edge", Some(1))).await.unwrap();
    assert_eq!(again, deployed);
    let calls = juju.take_calls();
    assert!(!calls.is_empty());
    assert!(FakeJuju::mutating(&calls).is_empty());

    let refreshed = invoker.deploy(&params("latest/stable", None)).await.unwrap();
    assert_eq!(refreshed.channel, "latest/stable");
    assert_eq!(refreshed.revision_resolved, 7);
    let calls = juju.take_calls();
    assert_eq!(
        FakeJuju::mutating(&calls),
        vec![&format!(
            "refresh {} --model {} --channel latest/stable",
            APP_NAME, MODEL_NAME
        )]
    );
}

#[tokio::test]
async fn test_refresh_already_running_is_success() {
    let juju = FakeJuju::new();
    let invoker = DeploymentInvoker::new(&juju.handle);

    invoker.deploy(&params("latest/edge", Some(1))).await.unwrap();
    fs::write(juju.dir.path().join("already-running"), "").unwrap();
    juju.take_calls();

    let deployed = invoker.deploy(&params("latest/edge", None)).await.unwrap();
    assert_eq!(deployed.channel, "latest/edge");
    assert_eq!(deployed.revision_resolved, 1);

    let calls = juju.take_calls();
    assert_eq!(FakeJuju::mutating(&calls).len(), 1);
    assert!(FakeJuju::mutating(&calls)[0].starts_with("refresh"));
}

#[tokio::test]
async fn test_teardown_of_absent_app_succeeds() {
    let juju = FakeJuju::new();
    let invoker = DeploymentInvoker::new(&juju.handle);

    invoker.teardown().await.unwrap();
    let calls = juju.take_calls();
    assert_eq!(
        calls,
        vec![format!(
            "remove-application {} --model {} --no-prompt",
            APP_NAME, MODEL_NAME
        )]
    );

    invoker.deploy(&params("latest/edge", Some(1))).await.unwrap();
    invoker.teardown().await.unwrap();
    assert!(invoker.status().await.unwrap().is_none());
}
