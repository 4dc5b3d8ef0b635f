use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use gridnav_core::engine::{EditRejected, Engine, EngineCommand, SessionMode};
use gridnav_core::model::Plan;
use gridnav_rt::health::{HealthIndicator, HealthProbe, HealthStatus};
use gridnav_rt::solver::Solver;
use gridnav_rt::RtError;
use tracing::{debug, info, warn};

#[derive(Clone, Debug, PartialEq)]
pub enum ComputeOutcome {
    Loaded {
        steps: usize,
        commands: usize,
        distance: Option<f64>,
    },
    Failed(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct TickReport {
    pub computing: bool,
    pub finished: Option<ComputeOutcome>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RuntimeSnapshot {
    pub health: HealthStatus,
    pub requests_issued: u64,
    pub last_outcome: Option<ComputeOutcome>,
    pub solver_backend: &'static str,
}

/// The in-flight request. Its presence is the computing state.
struct ComputeTask {
    handle: JoinHandle<Result<Plan, RtError>>,
    obstacles: usize,
}

pub struct RuntimeCoordinator {
    solver: Arc<dyn Solver>,
    probe: Arc<dyn HealthProbe>,
    compute: Option<ComputeTask>,
    health_task: Option<JoinHandle<Result<(), RtError>>>,
    health: HealthIndicator,
    requests_issued: u64,
    last_outcome: Option<ComputeOutcome>,
}

impl RuntimeCoordinator {
    pub fn new(solver: Arc<dyn Solver>, probe: Arc<dyn HealthProbe>, clear_after: Duration) -> Self {
        Self {
            solver,
            probe,
            compute: None,
            health_task: None,
            health: HealthIndicator::new(clear_after),
            requests_issued: 0,
            last_outcome: None,
        }
    }

    pub fn is_computing(&self) -> bool {
        self.compute.is_some()
    }

    pub fn mode(&self, engine: &Engine) -> SessionMode {
        if self.is_computing() {
            SessionMode::Computing
        } else {
            engine.mode()
        }
    }

    /// Freezes the current scenario and hands it to the solver on a worker
    /// thread. A second call while one is outstanding is rejected, not queued.
    pub fn start_compute(&mut self, engine: &Engine) -> Result<(), EditRejected> {
        if self.is_computing() {
            debug!("compute already in flight");
            return Err(EditRejected::Busy);
        }

        let request = engine.plan_request().inspect_err(|reason| {
            debug!(%reason, "compute not started");
        })?;
        let obstacles = request.obstacles.len();
        info!(
            obstacles,
            robot_x = request.robot.x,
            robot_y = request.robot.y,
            robot_dir = %request.robot.direction,
            backend = self.solver.backend_name(),
            "starting path computation"
        );

        let solver = Arc::clone(&self.solver);
        let handle = thread::spawn(move || solver.solve(&request));
        self.compute = Some(ComputeTask { handle, obstacles });
        self.requests_issued = self.requests_issued.saturating_add(1);
        Ok(())
    }

    /// Scenario edits wait for the solver; playback seeks do not.
    pub fn apply_edit(
        &self,
        engine: &mut Engine,
        command: EngineCommand,
    ) -> Result<(), EditRejected> {
        if command.is_edit() && self.is_computing() {
            debug!(?command, "edit rejected while computing");
            return Err(EditRejected::Busy);
        }

        engine.apply_command(command).inspect_err(|reason| {
            debug!(%reason, "edit rejected");
        })
    }

    pub fn run_tick(&mut self, engine: &mut Engine) -> TickReport {
        let finished = match self.compute.take() {
            Some(task) if task.handle.is_finished() => Some(self.finish_compute(task, engine)),
            pending => {
                self.compute = pending;
                None
            }
        };

        if self
            .health_task
            .as_ref()
            .is_some_and(JoinHandle::is_finished)
        {
            self.finish_health();
        }

        TickReport {
            computing: self.is_computing(),
            finished,
        }
    }

    /// Blocks until the outstanding request settles.
    pub fn wait_for_compute(&mut self, engine: &mut Engine) -> Option<ComputeOutcome> {
        let task = self.compute.take()?;
        Some(self.finish_compute(task, engine))
    }

    /// Returns false when a probe is already running.
    pub fn check_health(&mut self) -> bool {
        if !self.health.begin() {
            return false;
        }

        let probe = Arc::clone(&self.probe);
        debug!(backend = probe.backend_name(), "checking planning service");
        self.health_task = Some(thread::spawn(move || probe.probe()));
        true
    }

    pub fn wait_for_health(&mut self) -> HealthStatus {
        if self.health_task.is_some() {
            self.finish_health();
        }
        self.health.status(Instant::now())
    }

    pub fn snapshot(&self) -> RuntimeSnapshot {
        self.snapshot_at(Instant::now())
    }

    pub fn snapshot_at(&self, now: Instant) -> RuntimeSnapshot {
        RuntimeSnapshot {
            health: self.health.status(now),
            requests_issued: self.requests_issued,
            last_outcome: self.last_outcome.clone(),
            solver_backend: self.solver.backend_name(),
        }
    }

    fn finish_compute(&mut self, task: ComputeTask, engine: &mut Engine) -> ComputeOutcome {
        let outcome = match task.handle.join() {
            Ok(Ok(plan)) => {
                let steps = plan.path.len();
                let commands = plan.commands.len();
                let distance = plan.distance;
                match engine.apply_command(EngineCommand::LoadPlan(plan)) {
                    Ok(()) => {
                        info!(
                            obstacles = task.obstacles,
                            steps, commands, "path computation finished"
                        );
                        ComputeOutcome::Loaded {
                            steps,
                            commands,
                            distance,
                        }
                    }
                    Err(reason) => {
                        warn!(%reason, "computed path could not be loaded");
                        ComputeOutcome::Failed(reason.to_string())
                    }
                }
            }
            Ok(Err(error)) => {
                warn!(
                    %error,
                    obstacles = task.obstacles,
                    transport = error.is_transport(),
                    "path computation failed"
                );
                if error.is_transport() {
                    ComputeOutcome::Failed(format!("planning service unreachable ({error})"))
                } else {
                    ComputeOutcome::Failed(error.to_string())
                }
            }
            Err(_) => {
                warn!("path computation worker panicked");
                ComputeOutcome::Failed("solver worker panicked".to_string())
            }
        };

        self.last_outcome = Some(outcome.clone());
        outcome
    }

    fn finish_health(&mut self) {
        let Some(task) = self.health_task.take() else {
            return;
        };

        let healthy = match task.join() {
            Ok(Ok(())) => true,
            Ok(Err(error)) => {
                warn!(%error, "planning service health check failed");
                false
            }
            Err(_) => {
                warn!("health check worker panicked");
                false
            }
        };
        self.health.finish(healthy, Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::{ComputeOutcome, RuntimeCoordinator};
    use gridnav_core::coords::LogicalCoord;
    use gridnav_core::engine::{EditRejected, Engine, EngineCommand, SessionMode};
    use gridnav_core::model::{Direction, Plan, RobotPose};
    use gridnav_rt::health::HealthStatus;
    use gridnav_rt::solver::ScriptedSolver;
    use gridnav_rt::RtError;
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    fn runtime_for(solver: &Arc<ScriptedSolver>) -> RuntimeCoordinator {
        RuntimeCoordinator::new(solver.clone(), solver.clone(), Duration::from_secs(10))
    }

    fn engine_with_obstacle() -> Engine {
        let mut engine = Engine::new();
        engine
            .apply_command(EngineCommand::AddObstacle {
                at: LogicalCoord::new(10, 10),
                direction: Direction::South,
            })
            .unwrap();
        engine
    }

    fn sample_plan() -> Plan {
        Plan::from_solver(
            vec![
                RobotPose::new(1, 1, Direction::North),
                RobotPose::new(1, 2, Direction::North),
                RobotPose::new(2, 2, Direction::East),
            ],
            ["SNAP0", "FW10", "SNAP1", "TR90"].map(String::from),
            Some(20.0),
        )
    }

    #[test]
    fn second_start_while_in_flight_issues_no_request() {
        let (solver, release) = ScriptedSolver::gated();
        let solver = Arc::new(solver);
        solver.push_plan(sample_plan());
        let mut runtime = runtime_for(&solver);
        let mut engine = engine_with_obstacle();

        runtime.start_compute(&engine).unwrap();
        assert_eq!(runtime.start_compute(&engine), Err(EditRejected::Busy));
        assert_eq!(runtime.mode(&engine), SessionMode::Computing);

        release.send(()).unwrap();
        let outcome = runtime.wait_for_compute(&mut engine).unwrap();

        assert_eq!(solver.calls(), 1);
        assert_eq!(runtime.snapshot().requests_issued, 1);
        assert!(matches!(outcome, ComputeOutcome::Loaded { steps: 3, commands: 2, .. }));
        assert_eq!(engine.snapshot().playback.commands(), ["FW10", "TR90"]);
        assert_eq!(engine.snapshot().playback.cursor(), 0);
        assert_eq!(runtime.mode(&engine), SessionMode::Playback);
    }

    #[test]
    fn edits_are_rejected_while_computing_but_seeks_are_not() {
        let (solver, release) = ScriptedSolver::gated();
        let solver = Arc::new(solver);
        solver.push_plan(sample_plan());
        let mut runtime = runtime_for(&solver);
        let mut engine = engine_with_obstacle();

        runtime.start_compute(&engine).unwrap();
        let edits = [
            EngineCommand::AddObstacle {
                at: LogicalCoord::new(5, 5),
                direction: Direction::North,
            },
            EngineCommand::SetRobot {
                x: 4,
                y: 4,
                direction: Direction::East,
            },
            EngineCommand::ResetAll,
        ];
        for command in edits {
            assert_eq!(
                runtime.apply_edit(&mut engine, command),
                Err(EditRejected::Busy)
            );
        }
        assert_eq!(engine.snapshot().obstacles.len(), 1);
        assert_eq!(
            runtime.apply_edit(&mut engine, EngineCommand::SeekStep(0)),
            Err(EditRejected::PageOutOfRange { page: 0, len: 0 })
        );

        release.send(()).unwrap();
        runtime.wait_for_compute(&mut engine);
        runtime
            .apply_edit(&mut engine, EngineCommand::SeekStep(2))
            .unwrap();
        assert_eq!(engine.robot_pose(), RobotPose::new(2, 2, Direction::East));
    }

    #[test]
    fn request_carries_active_pose_and_obstacles() {
        let solver = Arc::new(ScriptedSolver::new());
        solver.push_plan(sample_plan());
        let mut runtime = runtime_for(&solver);
        let mut engine = engine_with_obstacle();
        engine
            .apply_command(EngineCommand::SetRobot {
                x: 6,
                y: 3,
                direction: Direction::West,
            })
            .unwrap();

        runtime.start_compute(&engine).unwrap();
        runtime.wait_for_compute(&mut engine);

        let sent = solver.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].robot, RobotPose::new(6, 3, Direction::West));
        assert_eq!(sent[0].obstacles[0].position(), LogicalCoord::new(10, 10));
    }

    #[test]
    fn empty_scenario_never_reaches_solver() {
        let solver = Arc::new(ScriptedSolver::new());
        let mut runtime = runtime_for(&solver);
        let engine = Engine::new();

        assert_eq!(
            runtime.start_compute(&engine),
            Err(EditRejected::NoObstacles)
        );
        assert!(!runtime.is_computing());
        assert_eq!(solver.calls(), 0);
    }

    #[test]
    fn failure_returns_to_editing_with_state_intact() {
        let solver = Arc::new(ScriptedSolver::new());
        solver.push_failure(RtError::Status(500));
        let mut runtime = runtime_for(&solver);
        let mut engine = engine_with_obstacle();

        runtime.start_compute(&engine).unwrap();
        let outcome = runtime.wait_for_compute(&mut engine).unwrap();

        assert!(matches!(outcome, ComputeOutcome::Failed(_)));
        assert_eq!(runtime.mode(&engine), SessionMode::Editing);
        assert!(engine.snapshot().playback.is_empty());
        assert_eq!(engine.robot_pose(), RobotPose::default());
        assert_eq!(runtime.snapshot().last_outcome, Some(outcome));
    }

    #[test]
    fn unreachable_service_is_worded_apart_from_bad_answers() {
        let solver = Arc::new(ScriptedSolver::new());
        solver.push_failure(RtError::Offline);
        solver.push_failure(RtError::MissingData);
        let mut runtime = runtime_for(&solver);
        let mut engine = engine_with_obstacle();

        runtime.start_compute(&engine).unwrap();
        let offline = runtime.wait_for_compute(&mut engine).unwrap();
        runtime.start_compute(&engine).unwrap();
        let missing = runtime.wait_for_compute(&mut engine).unwrap();

        assert_eq!(
            offline,
            ComputeOutcome::Failed(
                "planning service unreachable (running offline, no solver available)".to_string()
            )
        );
        assert_eq!(
            missing,
            ComputeOutcome::Failed("solver response carried no data".to_string())
        );
    }

    #[test]
    fn run_tick_picks_up_finished_compute() {
        let solver = Arc::new(ScriptedSolver::new());
        solver.push_plan(sample_plan());
        let mut runtime = runtime_for(&solver);
        let mut engine = engine_with_obstacle();

        runtime.start_compute(&engine).unwrap();
        let mut report = runtime.run_tick(&mut engine);
        while report.finished.is_none() {
            std::thread::yield_now();
            report = runtime.run_tick(&mut engine);
        }

        assert!(!report.computing);
        assert_eq!(engine.mode(), SessionMode::Playback);
    }

    #[test]
    fn start_from_playback_replaces_path() {
        let solver = Arc::new(ScriptedSolver::new());
        solver.push_plan(sample_plan());
        solver.push_plan(Plan::from_solver(
            vec![RobotPose::new(3, 3, Direction::South)],
            ["FW50".to_string()],
            None,
        ));
        let mut runtime = runtime_for(&solver);
        let mut engine = engine_with_obstacle();

        runtime.start_compute(&engine).unwrap();
        runtime.wait_for_compute(&mut engine);
        runtime
            .apply_edit(&mut engine, EngineCommand::SeekStep(2))
            .unwrap();

        runtime.start_compute(&engine).unwrap();
        runtime.wait_for_compute(&mut engine);

        assert_eq!(engine.snapshot().playback.len(), 1);
        assert_eq!(engine.snapshot().playback.cursor(), 0);
        assert_eq!(engine.snapshot().playback.commands(), ["FW50"]);
    }

    #[test]
    fn health_check_settles_and_clears() {
        let solver = Arc::new(ScriptedSolver::new());
        let mut runtime = runtime_for(&solver);

        assert!(runtime.check_health());
        assert_eq!(runtime.wait_for_health(), HealthStatus::Success);

        solver.set_healthy(false);
        assert!(runtime.check_health());
        assert_eq!(runtime.wait_for_health(), HealthStatus::Error);

        let later = Instant::now() + Duration::from_secs(11);
        assert_eq!(runtime.snapshot_at(later).health, HealthStatus::Idle);
    }

    #[test]
    fn health_check_runs_alongside_compute() {
        let (solver, release) = ScriptedSolver::gated();
        let solver = Arc::new(solver);
        solver.push_plan(sample_plan());
        let mut runtime = runtime_for(&solver);
        let mut engine = engine_with_obstacle();

        runtime.start_compute(&engine).unwrap();
        assert!(runtime.check_health());
        assert_eq!(runtime.wait_for_health(), HealthStatus::Success);
        assert!(runtime.is_computing());

        release.send(()).unwrap();
        assert!(runtime.wait_for_compute(&mut engine).is_some());
    }
}
