use crate::engine::EditRejected;
use crate::model::{Plan, RobotPose};

#[derive(Clone, Debug, Default)]
pub struct PathPlayback {
    path: Vec<RobotPose>,
    commands: Vec<String>,
    distance: Option<f64>,
    cursor: usize,
}

impl PathPlayback {
    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    pub fn len(&self) -> usize {
        self.path.len()
    }

    pub fn path(&self) -> &[RobotPose] {
        &self.path
    }

    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    pub fn distance(&self) -> Option<f64> {
        self.distance
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Replaces the sequence and rewinds to the first step.
    pub fn load(&mut self, plan: Plan) -> Option<RobotPose> {
        self.path = plan.path;
        self.commands = plan.commands;
        self.distance = plan.distance;
        self.cursor = 0;
        self.current_pose()
    }

    pub fn clear(&mut self) {
        self.path.clear();
        self.commands.clear();
        self.distance = None;
        self.cursor = 0;
    }

    pub fn advance(&mut self, page: usize) -> Result<RobotPose, EditRejected> {
        let pose = *self.path.get(page).ok_or(EditRejected::PageOutOfRange {
            page,
            len: self.path.len(),
        })?;
        self.cursor = page;
        Ok(pose)
    }

    pub fn has_previous(&self) -> bool {
        !self.is_empty() && self.cursor > 0
    }

    pub fn has_next(&self) -> bool {
        self.cursor + 1 < self.path.len()
    }

    pub fn previous_page(&self) -> Option<usize> {
        self.cursor.checked_sub(1)
    }

    pub fn next_page(&self) -> usize {
        self.cursor.saturating_add(1)
    }

    pub fn current_pose(&self) -> Option<RobotPose> {
        self.path.get(self.cursor).copied()
    }

    /// The solver may return fewer commands than poses.
    pub fn current_command(&self) -> Option<&str> {
        if self.is_empty() {
            return None;
        }
        self.commands.get(self.cursor).map(String::as_str)
    }
}

pub fn describe_command(command: &str) -> String {
    if command.is_empty() {
        return String::new();
    }

    let (Some(opcode), Some(magnitude)) = (command.get(..2), command.get(2..)) else {
        return command.to_string();
    };

    match opcode {
        "FW" => format!("Move forward {magnitude}cm"),
        "BW" => format!("Move backward {magnitude}cm"),
        "FR" => format!("Turn forward-right {magnitude}cm"),
        "FL" => format!("Turn forward-left {magnitude}cm"),
        "BR" => format!("Turn backward-right {magnitude}cm"),
        "BL" => format!("Turn backward-left {magnitude}cm"),
        _ => command.to_string(),
    }
}
