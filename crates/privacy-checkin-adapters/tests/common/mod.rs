#![allow(dead_code)]

use std::io::Read;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;

use serde_json::{json, Value};
use tiny_http::{Method, Response, Server, StatusCode};

use privacy_checkin_adapters::{ContractAdapter, FheAdapter, WalletAdapter};
use privacy_checkin_core::{CheckInController, CheckInService, ClockPort, Dashboard, PortError};

pub const START_MS: u64 = 1_739_750_400_000;

#[derive(Debug)]
pub struct TestClock {
    now: AtomicU64,
}

impl Default for TestClock {
    fn default() -> Self {
        Self {
            now: AtomicU64::new(START_MS),
        }
    }
}

impl ClockPort for TestClock {
    fn now_ms(&self) -> Result<u64, PortError> {
        Ok(self.now.fetch_add(1, Ordering::SeqCst))
    }
}

pub type TestController = CheckInController<WalletAdapter, ContractAdapter, FheAdapter, TestClock>;

pub fn controller_with(contract: ContractAdapter, fhe: FheAdapter) -> TestController {
    CheckInController::new(
        CheckInService::new(
            WalletAdapter::deterministic(11155111),
            contract,
            fhe,
            TestClock::default(),
        ),
        Dashboard::default(),
    )
}

pub fn new_controller() -> TestController {
    controller_with(ContractAdapter::in_memory(), FheAdapter::deterministic())
}

pub fn fill_draft(controller: &mut TestController, name: &str, lat: &str, lng: &str) {
    controller.dashboard.draft.name = name.to_owned();
    controller.dashboard.draft.latitude = lat.to_owned();
    controller.dashboard.draft.longitude = lng.to_owned();
}

/// Serves JSON requests until the test process exits. The handler gets the
/// method, path and parsed body and returns a status code and JSON payload.
pub fn spawn_mock_server<H>(handler: H) -> String
where
    H: Fn(&Method, &str, &Value) -> (u16, Value) + Send + 'static,
{
    let server = Server::http("127.0.0.1:0").expect("start server");
    let addr = format!("http://{}", server.server_addr());

    thread::spawn(move || loop {
        let mut req = match server.recv() {
            Ok(r) => r,
            Err(_) => break,
        };
        let mut raw = String::new();
        let _ = req.as_reader().read_to_string(&mut raw);
        let body: Value = serde_json::from_str(&raw).unwrap_or(Value::Null);
        let (code, payload) = handler(req.method(), req.url(), &body);
        let response =
            Response::from_string(payload.to_string()).with_status_code(StatusCode(code));
        let _ = req.respond(response);
    });

    addr
}

/// JSON-RPC node mock: the handler answers `Ok(result)` or `Err(error object)`.
pub fn spawn_json_rpc<H>(handler: H) -> String
where
    H: Fn(&str, &Value) -> Result<Value, Value> + Send + 'static,
{
    spawn_mock_server(move |_, _, body| {
        let id = body.get("id").cloned().unwrap_or(Value::Null);
        let method = body.get("method").and_then(Value::as_str).unwrap_or_default();
        let params = body.get("params").cloned().unwrap_or(Value::Null);
        match handler(method, &params) {
            Ok(result) => (200, json!({ "jsonrpc": "2.0", "id": id, "result": result })),
            Err(error) => (200, json!({ "jsonrpc": "2.0", "id": id, "error": error })),
        }
    })
}
