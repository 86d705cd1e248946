use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

/// A location in integer grid coordinates. Any pair is valid, including
/// negative ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal component.
    pub x: i32,
    /// Vertical component, growing downwards.
    pub y: i32,
}

impl Position {
    /// The origin.
    pub const ZERO: Position = Position::new(0, 0);
    /// One step along the x axis.
    pub const UNIT_X: Position = Position::new(1, 0);
    /// One step along the y axis.
    pub const UNIT_Y: Position = Position::new(0, 1);

    /// Create a position.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl Add for Position {
    type Output = Position;

    fn add(self, rhs: Position) -> Position {
        Position::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Position {
    type Output = Position;

    fn sub(self, rhs: Position) -> Position {
        Position::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<i32> for Position {
    type Output = Position;

    fn mul(self, rhs: i32) -> Position {
        Position::new(self.x * rhs, self.y * rhs)
    }
}

impl Mul<Position> for i32 {
    type Output = Position;

    fn mul(self, rhs: Position) -> Position {
        rhs * self
    }
}

impl Neg for Position {
    type Output = Position;

    fn neg(self) -> Position {
        Position::new(-self.x, -self.y)
    }
}

impl AddAssign for Position {
    fn add_assign(&mut self, rhs: Position) {
        *self = *self + rhs;
    }
}

impl SubAssign for Position {
    fn sub_assign(&mut self, rhs: Position) {
        *self = *self - rhs;
    }
}

impl From<(i32, i32)> for Position {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn unit_vectors() {
        assert_eq!(Position::UNIT_X + Position::UNIT_Y, Position::new(1, 1));
        assert_eq!(Position::ZERO - Position::UNIT_X, Position::new(-1, 0));
    }

    #[test]
    fn display_shows_pair() {
        assert_eq!(Position::new(-3, 7).to_string(), "(-3, 7)");
    }

    #[test]
    fn assign_operators() {
        let mut p = Position::new(2, 2);
        p += Position::new(1, -1);
        assert_eq!(p, Position::new(3, 1));
        p -= Position::UNIT_X * 3;
        assert_eq!(p, Position::new(0, 1));
    }

    fn small() -> impl Strategy<Value = Position> {
        (-10_000i32..10_000, -10_000i32..10_000).prop_map(Position::from)
    }

    proptest! {
        #[test]
        fn scalar_multiplication_commutes(p in small(), k in -100i32..100) {
            prop_assert_eq!(p * k, k * p);
        }

        #[test]
        fn subtraction_undoes_addition(a in small(), b in small()) {
            prop_assert_eq!(a + b - b, a);
            prop_assert_eq!(a - b, a + -b);
        }
    }
}
