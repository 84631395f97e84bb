use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

pub const DIRECTION_COUNT: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Forward,
    Back,
    Right,
    Left,
    Up,
    Down,
}

/// Tilt axis of the drone attitude that a horizontal direction leans into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeanAxis {
    Pitch,
    Roll,
}

/// How a horizontal direction leans: moving pushes the attitude component
/// along `-sign`, leveling pulls it back to zero from that side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lean {
    pub axis: LeanAxis,
    pub sign: f32,
}

impl Lean {
    /// How far `attitude` currently leans toward this direction.
    pub fn amount(&self, attitude: Vec3) -> f32 {
        match self.axis {
            LeanAxis::Pitch => attitude.x * self.sign,
            LeanAxis::Roll => attitude.z * self.sign,
        }
    }

    pub fn set_amount(&self, attitude: &mut Vec3, amount: f32) {
        match self.axis {
            LeanAxis::Pitch => attitude.x = amount * self.sign,
            LeanAxis::Roll => attitude.z = amount * self.sign,
        }
    }
}

impl Direction {
    pub const ALL: [Direction; DIRECTION_COUNT] = [
        Direction::Forward,
        Direction::Back,
        Direction::Right,
        Direction::Left,
        Direction::Up,
        Direction::Down,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    /// Model-space unit vector before yaw is applied. Forward is -Z.
    pub fn unit_vector(self) -> Vec3 {
        match self {
            Direction::Forward => Vec3::NEG_Z,
            Direction::Back => Vec3::Z,
            Direction::Right => Vec3::X,
            Direction::Left => Vec3::NEG_X,
            Direction::Up => Vec3::Y,
            Direction::Down => Vec3::NEG_Y,
        }
    }

    /// Vertical directions never tilt the drone.
    pub fn lean(self) -> Option<Lean> {
        match self {
            Direction::Forward => Some(Lean {
                axis: LeanAxis::Pitch,
                sign: -1.0,
            }),
            Direction::Back => Some(Lean {
                axis: LeanAxis::Pitch,
                sign: 1.0,
            }),
            Direction::Right => Some(Lean {
                axis: LeanAxis::Roll,
                sign: -1.0,
            }),
            Direction::Left => Some(Lean {
                axis: LeanAxis::Roll,
                sign: 1.0,
            }),
            Direction::Up | Direction::Down => None,
        }
    }
}

/// Fixed-size per-direction storage.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DirectionTable<T> {
    values: [T; DIRECTION_COUNT],
}

impl<T: Copy> DirectionTable<T> {
    pub fn splat(value: T) -> Self {
        Self {
            values: [value; DIRECTION_COUNT],
        }
    }
}

impl<T> DirectionTable<T> {
    pub fn iter(&self) -> impl Iterator<Item = (Direction, &T)> {
        Direction::ALL.into_iter().zip(self.values.iter())
    }
}

impl<T> Index<Direction> for DirectionTable<T> {
    type Output = T;

    fn index(&self, direction: Direction) -> &T {
        &self.values[direction.index()]
    }
}

impl<T> IndexMut<Direction> for DirectionTable<T> {
    fn index_mut(&mut self, direction: Direction) -> &mut T {
        &mut self.values[direction.index()]
    }
}
