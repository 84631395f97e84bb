use crate::direction::{Direction, DirectionTable};

/// Logical input the host maps its keys onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Move(Direction),
    YawLeft,
    YawRight,
}

impl Action {
    pub const ALL: [Action; 8] = [
        Action::Move(Direction::Forward),
        Action::Move(Direction::Back),
        Action::Move(Direction::Right),
        Action::Move(Direction::Left),
        Action::Move(Direction::Up),
        Action::Move(Direction::Down),
        Action::YawLeft,
        Action::YawRight,
    ];
}

/// Pressed state of every action for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InputFrame {
    moves: DirectionTable<bool>,
    yaw_left: bool,
    yaw_right: bool,
}

impl InputFrame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pressed(actions: impl IntoIterator<Item = Action>) -> Self {
        let mut frame = Self::new();
        for action in actions {
            frame.set(action, true);
        }
        frame
    }

    pub fn press(mut self, action: Action) -> Self {
        self.set(action, true);
        self
    }

    pub fn set(&mut self, action: Action, pressed: bool) {
        match action {
            Action::Move(direction) => self.moves[direction] = pressed,
            Action::YawLeft => self.yaw_left = pressed,
            Action::YawRight => self.yaw_right = pressed,
        }
    }

    pub fn is_pressed(&self, action: Action) -> bool {
        match action {
            Action::Move(direction) => self.moves[direction],
            Action::YawLeft => self.yaw_left,
            Action::YawRight => self.yaw_right,
        }
    }

    pub fn moving(&self, direction: Direction) -> bool {
        self.moves[direction]
    }

    pub fn any_pressed(&self) -> bool {
        Action::ALL.iter().any(|&action| self.is_pressed(action))
    }
}
