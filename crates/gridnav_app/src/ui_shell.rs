use std::io::{self, Write};

use crate::runtime::{ComputeOutcome, RuntimeCoordinator};
use crate::ui::{UiAction, UiController, UiError, UiSnapshot};
use gridnav_core::coords::{GridIndex, GRID_SIZE};
use gridnav_core::engine::{CellKind, Engine, Scenario, SessionMode};
use gridnav_core::model::Direction;

const RULE: &str = "----------------------------------------------------------------\n";
const HELP: &str = "click <row> <col> | robot <x> <y> [dir] | set | obstacle <x> <y> [dir] | add | rm <id> | go | wait | n/p | step <k> | reset | reset-all | check | q";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShellCommandResult {
    Continue(String),
    Exit,
}

pub fn run_interactive_shell(
    ui: &mut UiController,
    engine: &mut Engine,
    runtime: &mut RuntimeCoordinator,
) -> io::Result<()> {
    let mut status = String::from("Shell ready. Type ? for commands.");

    loop {
        let report = runtime.run_tick(engine);
        if let Some(outcome) = report.finished {
            status = outcome_label(&outcome);
        } else if report.computing {
            status = String::from("compute -> waiting for solver (enter to refresh)");
        }

        let snapshot = ui.snapshot(engine, runtime);
        let frame = render_frame(engine.snapshot(), &snapshot, &status);

        print!("\x1B[2J\x1B[H{frame}");
        io::stdout().flush()?;

        let mut line = String::new();
        let read = io::stdin().read_line(&mut line)?;
        if read == 0 {
            break;
        }

        match apply_shell_command(line.trim(), ui, engine, runtime) {
            Ok(ShellCommandResult::Continue(next_status)) => status = next_status,
            Ok(ShellCommandResult::Exit) => break,
            Err(err) => status = format!("ignored: {err}"),
        }
    }

    Ok(())
}

pub fn apply_shell_command(
    command: &str,
    ui: &mut UiController,
    engine: &mut Engine,
    runtime: &mut RuntimeCoordinator,
) -> Result<ShellCommandResult, UiError> {
    let tokens: Vec<&str> = command.split_whitespace().collect();

    match tokens.as_slice() {
        [] => Ok(ShellCommandResult::Continue(String::from("refreshed"))),
        ["q"] => Ok(ShellCommandResult::Exit),
        ["?"] => Ok(ShellCommandResult::Continue(HELP.to_string())),
        ["click", row, col] => {
            let (Ok(row), Ok(col)) = (row.parse::<i32>(), col.parse::<i32>()) else {
                return Ok(usage("click <row> <col>"));
            };
            ui.handle_action(UiAction::ClickCell(GridIndex::new(row, col)), engine, runtime)?;
            Ok(ShellCommandResult::Continue(format!(
                "grid -> clicked row {row} col {col}"
            )))
        }
        ["robot", x, y, rest @ ..] if rest.len() <= 1 => {
            ui.handle_action(UiAction::EditRobotX(x.to_string()), engine, runtime)?;
            ui.handle_action(UiAction::EditRobotY(y.to_string()), engine, runtime)?;
            if let Some(raw) = rest.first() {
                let Ok(direction) = raw.parse::<Direction>() else {
                    return Ok(usage("robot <x> <y> [n|e|s|w]"));
                };
                ui.handle_action(UiAction::EditRobotDirection(direction), engine, runtime)?;
            }
            let draft = ui.robot_draft();
            Ok(ShellCommandResult::Continue(format!(
                "robot draft -> ({}, {}) {}",
                draft.x, draft.y, draft.direction
            )))
        }
        ["set"] => {
            ui.handle_action(UiAction::ApplyRobot, engine, runtime)?;
            let pose = engine.robot_pose();
            Ok(ShellCommandResult::Continue(format!(
                "robot -> ({}, {}) {}",
                pose.x, pose.y, pose.direction
            )))
        }
        ["obstacle", x, y, rest @ ..] if rest.len() <= 1 => {
            ui.handle_action(UiAction::EditObstacleX(x.to_string()), engine, runtime)?;
            ui.handle_action(UiAction::EditObstacleY(y.to_string()), engine, runtime)?;
            if let Some(raw) = rest.first() {
                let Ok(direction) = raw.parse::<Direction>() else {
                    return Ok(usage("obstacle <x> <y> [n|e|s|w|x]"));
                };
                ui.handle_action(UiAction::EditObstacleDirection(direction), engine, runtime)?;
            }
            let draft = ui.obstacle_draft();
            Ok(ShellCommandResult::Continue(format!(
                "obstacle draft -> ({}, {}) {}",
                draft.x, draft.y, draft.direction
            )))
        }
        ["add"] => {
            ui.handle_action(UiAction::AddObstacle, engine, runtime)?;
            let draft = ui.obstacle_draft();
            Ok(ShellCommandResult::Continue(format!(
                "obstacle -> added at ({}, {})",
                draft.x, draft.y
            )))
        }
        ["rm", id] => {
            let Ok(id) = id.parse() else {
                return Ok(usage("rm <id>"));
            };
            ui.handle_action(UiAction::RemoveObstacle { id }, engine, runtime)?;
            Ok(ShellCommandResult::Continue(format!("obstacle -> removed #{id}")))
        }
        ["go"] => {
            ui.handle_action(UiAction::StartPathfinding, engine, runtime)?;
            Ok(ShellCommandResult::Continue(String::from(
                "compute -> started (wait or press enter to refresh)",
            )))
        }
        ["wait"] => Ok(ShellCommandResult::Continue(
            match runtime.wait_for_compute(engine) {
                Some(outcome) => outcome_label(&outcome),
                None => String::from("compute -> nothing in flight"),
            },
        )),
        ["n"] => {
            ui.handle_action(UiAction::NextStep, engine, runtime)?;
            Ok(ShellCommandResult::Continue(String::from("step -> next")))
        }
        ["p"] => {
            ui.handle_action(UiAction::PreviousStep, engine, runtime)?;
            Ok(ShellCommandResult::Continue(String::from("step -> previous")))
        }
        ["step", k] => {
            let Some(page) = k.parse::<usize>().ok().and_then(|k| k.checked_sub(1)) else {
                return Ok(usage("step <k>, counting from 1"));
            };
            ui.handle_action(UiAction::GoToStep(page), engine, runtime)?;
            Ok(ShellCommandResult::Continue(format!("step -> {}", page + 1)))
        }
        ["reset"] => {
            ui.handle_action(UiAction::ResetRobot, engine, runtime)?;
            Ok(ShellCommandResult::Continue(String::from("reset -> robot")))
        }
        ["reset-all"] => {
            ui.handle_action(UiAction::ResetAll, engine, runtime)?;
            Ok(ShellCommandResult::Continue(String::from(
                "reset -> robot and obstacles",
            )))
        }
        ["check"] => {
            ui.handle_action(UiAction::CheckApi, engine, runtime)?;
            Ok(ShellCommandResult::Continue(String::from("api -> checking")))
        }
        _ => Ok(ShellCommandResult::Continue(format!(
            "unknown command: {command} (? for help)"
        ))),
    }
}

fn usage(form: &str) -> ShellCommandResult {
    ShellCommandResult::Continue(format!("usage: {form}"))
}

pub fn outcome_label(outcome: &ComputeOutcome) -> String {
    match outcome {
        ComputeOutcome::Loaded {
            steps: 0,
            commands,
            ..
        } => format!("compute -> empty path ({commands} commands)"),
        ComputeOutcome::Loaded {
            steps,
            commands,
            distance: Some(distance),
        } => format!("compute -> {steps} steps, {commands} commands, distance {distance}"),
        ComputeOutcome::Loaded {
            steps, commands, ..
        } => format!("compute -> {steps} steps, {commands} commands"),
        ComputeOutcome::Failed(reason) => format!("compute -> failed: {reason}"),
    }
}

pub fn render_frame(scenario: &Scenario, snapshot: &UiSnapshot, status: &str) -> String {
    let mut out = String::new();

    out.push_str("Gridnav Scenario Shell\n");
    let pose = scenario.robot.pose();
    out.push_str(&format!(
        "Mode: {} | API: {} ({}) | Requests: {}\n",
        mode_label(snapshot.mode),
        snapshot.health.label(),
        snapshot.solver_backend,
        snapshot.requests_issued,
    ));
    out.push_str(&format!(
        "Robot: ({}, {}) {} | Draft: ({}, {}) {} | Obstacle draft: ({}, {}) {}\n",
        pose.x,
        pose.y,
        pose.direction,
        snapshot.robot_draft.x,
        snapshot.robot_draft.y,
        snapshot.robot_draft.direction,
        snapshot.obstacle_draft.x,
        snapshot.obstacle_draft.y,
        snapshot.obstacle_draft.direction,
    ));
    out.push_str(RULE);

    render_grid(&mut out, scenario);

    out.push_str(RULE);
    render_obstacle_list(&mut out, scenario);
    render_step_panel(&mut out, snapshot);

    out.push_str(RULE);
    out.push_str(&format!("Status: {status}\n"));
    out.push_str(&format!("Commands: {HELP}\n> "));

    out
}

fn render_grid(out: &mut String, scenario: &Scenario) {
    for row in 0..GRID_SIZE {
        let grid_row = GridIndex::new(row, 0);
        out.push_str(&format!("{:>2} ", grid_row.to_logical().y));
        for col in 0..GRID_SIZE {
            out.push(' ');
            out.push_str(cell_glyph(scenario.cell_at(GridIndex::new(row, col))));
        }
        out.push('\n');
    }

    out.push_str("   ");
    for col in 0..GRID_SIZE {
        out.push_str(&format!(" {col:>2}"));
    }
    out.push('\n');
}

fn render_obstacle_list(out: &mut String, scenario: &Scenario) {
    out.push_str(&format!("Obstacles ({}):\n", scenario.obstacles.len()));
    if scenario.obstacles.is_empty() {
        out.push_str("  (none)\n");
    }
    for obstacle in scenario.obstacles.iter() {
        out.push_str(&format!(
            "  #{:<3} x={:<2} y={:<2} {}\n",
            obstacle.id, obstacle.x, obstacle.y, obstacle.direction
        ));
    }
}

fn render_step_panel(out: &mut String, snapshot: &UiSnapshot) {
    let Some(step) = &snapshot.step else {
        out.push_str("Path: none\n");
        if let Some(outcome) = &snapshot.last_outcome {
            out.push_str(&format!("Last {}\n", outcome_label(outcome)));
        }
        return;
    };

    out.push_str(&step.label());
    match &step.command {
        Some(command) => out.push_str(&format!(" | {command} | {}", step.description)),
        None => out.push_str(" | -"),
    }
    out.push_str(&format!(
        " [{}{}]\n",
        if step.has_previous { "p" } else { "-" },
        if step.has_next { "n" } else { "-" },
    ));
    if let Some(distance) = snapshot.distance {
        out.push_str(&format!("Distance: {distance}\n"));
    }
}

fn mode_label(mode: SessionMode) -> &'static str {
    match mode {
        SessionMode::Editing => "EDITING",
        SessionMode::Computing => "COMPUTING",
        SessionMode::Playback => "PLAYBACK",
    }
}

fn cell_glyph(kind: CellKind) -> &'static str {
    match kind {
        CellKind::Empty => " .",
        CellKind::Obstacle { direction, .. } => match direction {
            Direction::North => "O^",
            Direction::East => "O>",
            Direction::South => "Ov",
            Direction::West => "O<",
            Direction::Skip => "O ",
        },
        CellKind::RobotBody => "##",
        // `S` marks a pose that takes a scan.
        CellKind::RobotMarker { direction, scanned } => match (direction, scanned) {
            (Direction::North, false) => "R^",
            (Direction::East, false) => "R>",
            (Direction::South, false) => "Rv",
            (Direction::West, false) => "R<",
            (Direction::North, true) => "S^",
            (Direction::East, true) => "S>",
            (Direction::South, true) => "Sv",
            (Direction::West, true) => "S<",
            (Direction::Skip, _) => "R ",
        },
    }
}
