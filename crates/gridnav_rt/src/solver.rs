use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use gridnav_core::model::{Plan, PlanRequest};
use reqwest::blocking::Client;
use tracing::debug;

use crate::error::{Result, RtError};
use crate::health::HealthProbe;
use crate::wire::{PathRequest, PathResponse};

pub trait Solver: Send + Sync {
    fn solve(&self, request: &PlanRequest) -> Result<Plan>;
    fn backend_name(&self) -> &'static str;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SolverConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub retrying: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5001".to_string(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(2),
            retrying: false,
        }
    }
}

fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path)
}

pub struct HttpSolver {
    client: Client,
    path_url: String,
    status_url: String,
    retrying: bool,
}

impl HttpSolver {
    pub fn new(config: &SolverConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            path_url: endpoint(&config.base_url, "path"),
            status_url: endpoint(&config.base_url, "status"),
            retrying: config.retrying,
        })
    }

    #[cfg(test)]
    fn path_url(&self) -> &str {
        &self.path_url
    }

    #[cfg(test)]
    fn status_url(&self) -> &str {
        &self.status_url
    }
}

impl Solver for HttpSolver {
    fn solve(&self, request: &PlanRequest) -> Result<Plan> {
        let body = PathRequest::new(request, self.retrying);
        debug!(
            url = %self.path_url,
            obstacles = body.obstacles.len(),
            "posting path request"
        );

        let response = self.client.post(&self.path_url).json(&body).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(RtError::Status(status.as_u16()));
        }

        let text = response.text()?;
        let parsed: PathResponse = serde_json::from_str(&text)?;
        parsed.into_plan()
    }

    fn backend_name(&self) -> &'static str {
        "http"
    }
}

impl HealthProbe for HttpSolver {
    fn probe(&self) -> Result<()> {
        let status = self.client.get(&self.status_url).send()?.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(RtError::Status(status.as_u16()))
        }
    }

    fn backend_name(&self) -> &'static str {
        "http"
    }
}

/// Stands in for the service when no network is wanted; every call fails.
#[derive(Clone, Copy, Debug, Default)]
pub struct OfflineSolver;

impl Solver for OfflineSolver {
    fn solve(&self, _request: &PlanRequest) -> Result<Plan> {
        Err(RtError::Offline)
    }

    fn backend_name(&self) -> &'static str {
        "offline"
    }
}

impl HealthProbe for OfflineSolver {
    fn probe(&self) -> Result<()> {
        Err(RtError::Offline)
    }

    fn backend_name(&self) -> &'static str {
        "offline"
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Replays queued outcomes in order. An optional gate holds every call until
/// the paired sender releases it, which lets callers observe a request while
/// it is still in flight.
pub struct ScriptedSolver {
    outcomes: Mutex<VecDeque<Result<Plan>>>,
    requests: Mutex<Vec<PlanRequest>>,
    calls: AtomicUsize,
    healthy: AtomicBool,
    gate: Option<Mutex<Receiver<()>>>,
}

impl Default for ScriptedSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedSolver {
    pub fn new() -> Self {
        Self {
            outcomes: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            healthy: AtomicBool::new(true),
            gate: None,
        }
    }

    pub fn gated() -> (Self, Sender<()>) {
        let (release, gate) = channel();
        let solver = Self {
            gate: Some(Mutex::new(gate)),
            ..Self::new()
        };
        (solver, release)
    }

    pub fn push_plan(&self, plan: Plan) {
        lock(&self.outcomes).push_back(Ok(plan));
    }

    pub fn push_failure(&self, error: RtError) {
        lock(&self.outcomes).push_back(Err(error));
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<PlanRequest> {
        lock(&self.requests).clone()
    }
}

impl Solver for ScriptedSolver {
    fn solve(&self, request: &PlanRequest) -> Result<Plan> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        lock(&self.requests).push(request.clone());

        if let Some(gate) = &self.gate {
            // A dropped sender opens the gate for good.
            let _ = lock(gate).recv();
        }

        lock(&self.outcomes)
            .pop_front()
            .unwrap_or(Err(RtError::MissingData))
    }

    fn backend_name(&self) -> &'static str {
        "scripted"
    }
}

impl HealthProbe for ScriptedSolver {
    fn probe(&self) -> Result<()> {
        if self.healthy.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(RtError::Status(503))
        }
    }

    fn backend_name(&self) -> &'static str {
        "scripted"
    }
}
