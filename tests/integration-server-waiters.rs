// Copyright 2024 Dmitry Tantsur <dtantsur@protonmail.com>
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, Once};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use rackstack::compute::{
    Compute, ComputeApi, Flavor, ImageSummary, Server, ServerStatus, ServerSummary,
};
use rackstack::{Error, ErrorKind, Result};

static INIT: Once = Once::new();

/// Server states returned by consecutive fetches; `None` means "not found".
///
/// The last state is repeated forever.
type Script = VecDeque<Option<&'static str>>;

#[derive(Debug, Default)]
struct FakeCompute {
    scripts: Mutex<HashMap<String, Script>>,
    calls: Mutex<HashMap<String, usize>>,
}

impl FakeCompute {
    fn with_server(self, id: &str, states: &[Option<&'static str>]) -> FakeCompute {
        let _ = self
            .scripts
            .lock()
            .unwrap()
            .insert(id.to_string(), states.iter().copied().collect());
        self
    }

    fn calls(&self, id: &str) -> usize {
        self.calls.lock().unwrap().get(id).copied().unwrap_or(0)
    }
}

#[async_trait]
impl ComputeApi for FakeCompute {
    async fn get_server(&self, id: &str) -> Result<Server> {
        *self.calls.lock().unwrap().entry(id.to_string()).or_default() += 1;
        let state = {
            let mut scripts = self.scripts.lock().unwrap();
            let script = scripts
                .get_mut(id)
                .ok_or_else(|| Error::new_not_found(format!("server {}", id)))?;
            if script.len() > 1 {
                script.pop_front().unwrap()
            } else {
                script[0]
            }
        };
        match state {
            Some(status) => Ok(serde_json::from_value(json!({
                "id": id,
                "name": format!("test-{}", id),
                "status": status,
            }))?),
            None => Err(Error::new_not_found(format!("server {}", id))),
        }
    }

    async fn list_servers(
        &self,
        _marker: Option<String>,
        _limit: Option<usize>,
    ) -> Result<Vec<ServerSummary>> {
        Ok(Vec::new())
    }

    async fn list_servers_detailed(
        &self,
        _marker: Option<String>,
        _limit: Option<usize>,
    ) -> Result<Vec<Server>> {
        Ok(Vec::new())
    }

    async fn list_flavors(
        &self,
        _marker: Option<String>,
        _limit: Option<usize>,
    ) -> Result<Vec<Flavor>> {
        Ok(Vec::new())
    }

    async fn list_images(
        &self,
        _marker: Option<String>,
        _limit: Option<usize>,
    ) -> Result<Vec<ImageSummary>> {
        Ok(Vec::new())
    }
}

fn set_up(provider: FakeCompute) -> Compute<FakeCompute> {
    INIT.call_once(|| {
        env_logger::init();
    });

    Compute::new(provider)
}

#[tokio::test(start_paused = true)]
async fn test_server_already_active() {
    let compute = set_up(FakeCompute::default().with_server("srv", &[Some("ACTIVE")]));
    let start = Instant::now();

    let server = compute
        .wait_for_server_active("srv")
        .wait()
        .await
        .expect("Server did not become active");

    assert_eq!(server.status, ServerStatus::Active);
    assert_eq!(compute.provider().calls("srv"), 1);
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_server_build_then_active() {
    let compute = set_up(FakeCompute::default().with_server(
        "srv",
        &[Some("BUILD"), Some("BUILD"), Some("ACTIVE")],
    ));
    let start = Instant::now();

    let server = compute
        .wait_for_server_active("srv")
        .with_poll_interval(Duration::from_secs(1))
        .wait()
        .await
        .expect("Server did not become active");

    assert_eq!(server.name, "test-srv");
    assert_eq!(compute.provider().calls("srv"), 3);
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_secs(2), "{:?}", elapsed);
    assert!(elapsed < Duration::from_secs(3), "{:?}", elapsed);
}

#[tokio::test(start_paused = true)]
async fn test_server_error_is_fatal() {
    let compute = set_up(FakeCompute::default().with_server(
        "srv",
        &[Some("BUILD"), Some("ERROR"), Some("ACTIVE")],
    ));

    let err = compute
        .wait_for_server_active("srv")
        .wait()
        .await
        .expect_err("ERROR must be fatal");

    assert_eq!(err.kind(), ErrorKind::OperationFailed);
    assert_eq!(err.observed_state(), Some("ERROR"));
    let last = err.last_seen::<Server>().expect("last seen server");
    assert_eq!(last.status, ServerStatus::Error);
    assert_eq!(compute.provider().calls("srv"), 2);
}

#[tokio::test(start_paused = true)]
async fn test_server_wait_times_out() {
    let compute = set_up(FakeCompute::default().with_server("srv", &[Some("BUILD")]));
    let start = Instant::now();

    let err = compute
        .wait_for_server_active("srv")
        .with_poll_interval(Duration::from_secs(5))
        .with_timeout(Duration::from_secs(30))
        .wait()
        .await
        .expect_err("Wait must time out");

    assert_eq!(err.kind(), ErrorKind::OperationTimedOut);
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_secs(30), "{:?}", elapsed);
    assert!(elapsed <= Duration::from_secs(35), "{:?}", elapsed);
}

#[tokio::test(start_paused = true)]
async fn test_missing_server_is_an_error_for_state_waits() {
    let compute = set_up(FakeCompute::default());

    let err = compute
        .wait_for_server_active("missing")
        .wait()
        .await
        .expect_err("Missing server must fail");

    assert_eq!(err.kind(), ErrorKind::ResourceNotFound);
    assert_eq!(compute.provider().calls("missing"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_server_deleted_when_gone() {
    let compute = set_up(FakeCompute::default().with_server(
        "srv",
        &[Some("ACTIVE"), Some("ACTIVE"), None],
    ));

    compute
        .wait_for_server_deleted("srv")
        .wait()
        .await
        .expect("Server was not deleted");

    assert_eq!(compute.provider().calls("srv"), 3);
}

#[tokio::test(start_paused = true)]
async fn test_server_deleted_via_deleted_state() {
    let compute = set_up(FakeCompute::default().with_server(
        "srv",
        &[Some("ACTIVE"), Some("DELETED")],
    ));

    compute
        .wait_for_server_deleted("srv")
        .wait()
        .await
        .expect("Server was not deleted");

    assert_eq!(compute.provider().calls("srv"), 2);
}

#[tokio::test(start_paused = true)]
async fn test_server_deleted_via_soft_delete() {
    let compute = set_up(FakeCompute::default().with_server(
        "srv",
        &[Some("ACTIVE"), Some("SOFT_DELETED")],
    ));

    compute
        .wait_for_server_deleted("srv")
        .wait()
        .await
        .expect("Soft-deleted server must count as deleted");

    assert_eq!(compute.provider().calls("srv"), 2);
}

#[tokio::test(start_paused = true)]
async fn test_wait_for_shelved_server() {
    let compute = set_up(FakeCompute::default().with_server(
        "srv",
        &[Some("SHELVED"), Some("SHELVED_OFFLOADED")],
    ));

    let server = compute
        .wait_for_server_state("srv", ServerStatus::ShelvedOffloaded)
        .wait()
        .await
        .expect("Server was not offloaded");
    assert_eq!(server.status, ServerStatus::ShelvedOffloaded);
}

#[tokio::test(start_paused = true)]
async fn test_server_deletion_fails_on_error() {
    let compute = set_up(FakeCompute::default().with_server(
        "srv",
        &[Some("ACTIVE"), Some("ERROR")],
    ));

    let err = compute
        .wait_for_server_deleted("srv")
        .wait()
        .await
        .expect_err("ERROR must be fatal");

    assert_eq!(err.kind(), ErrorKind::OperationFailed);
    assert_eq!(err.observed_state(), Some("ERROR"));
}

#[tokio::test(start_paused = true)]
async fn test_server_shut_off_and_resize() {
    let compute = set_up(
        FakeCompute::default()
            .with_server("off", &[Some("ACTIVE"), Some("SHUTOFF")])
            .with_server("resized", &[Some("RESIZE"), Some("VERIFY_RESIZE")]),
    );

    let off = compute
        .wait_for_server_shut_off("off")
        .wait()
        .await
        .expect("Server was not shut off");
    assert_eq!(off.status, ServerStatus::ShutOff);

    let resized = compute
        .wait_for_server_verify_resize("resized")
        .wait()
        .await
        .expect("Server was not resized");
    assert_eq!(resized.status, ServerStatus::VerifyingResize);
}

#[tokio::test(start_paused = true)]
async fn test_wait_for_suspended_is_not_fatal() {
    let compute = set_up(FakeCompute::default().with_server(
        "srv",
        &[Some("ACTIVE"), Some("SUSPENDED")],
    ));

    let server = compute
        .wait_for_server_state("srv", ServerStatus::Suspended)
        .wait()
        .await
        .expect("Server was not suspended");
    assert_eq!(server.status, ServerStatus::Suspended);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_waits_are_independent() {
    let compute = set_up(
        FakeCompute::default()
            .with_server("a", &[Some("BUILD"), Some("BUILD"), Some("ACTIVE")])
            .with_server("b", &[Some("BUILD"), Some("ERROR")]),
    );

    let (a, b) = tokio::join!(
        compute.wait_for_server_active("a").wait(),
        compute.wait_for_server_active("b").wait(),
    );

    assert_eq!(a.expect("a must become active").status, ServerStatus::Active);
    assert_eq!(
        b.expect_err("b must fail").kind(),
        ErrorKind::OperationFailed
    );
    assert_eq!(compute.provider().calls("a"), 3);
    assert_eq!(compute.provider().calls("b"), 2);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_server_wait() {
    let compute = set_up(FakeCompute::default().with_server("srv", &[Some("BUILD")]));
    let cancel = CancellationToken::new();

    let waiter = compute
        .wait_for_server_active("srv")
        .without_timeout()
        .with_cancellation(cancel.clone());
    let (result, ()) = tokio::join!(waiter.wait(), async {
        tokio::time::sleep(Duration::from_secs(12)).await;
        cancel.cancel();
    });

    assert_eq!(
        result.expect_err("Wait must be cancelled").kind(),
        ErrorKind::OperationCancelled
    );
    assert_eq!(compute.provider().calls("srv"), 3);
}

#[test]
fn test_server_wait_blocking() {
    let compute = set_up(FakeCompute::default().with_server(
        "srv",
        &[Some("BUILD"), Some("ACTIVE")],
    ));

    let server = compute
        .wait_for_server_active("srv")
        .with_poll_interval(Duration::from_millis(10))
        .wait_blocking()
        .expect("Server did not become active");
    assert_eq!(server.status, ServerStatus::Active);

    let provider = FakeCompute::default().with_server("gone", &[None]);
    let compute = Compute::new(provider);
    compute
        .wait_for_server_deleted("gone")
        .wait_blocking()
        .expect("Server was not deleted");
}
