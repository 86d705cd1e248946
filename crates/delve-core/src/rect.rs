use std::fmt;

use serde::{Deserialize, Serialize};

use crate::position::Position;

/// An axis-aligned region of grid cells.
///
/// Covers `left <= x < right` and `top <= y < bottom`. Rectangles with zero
/// width or height contain nothing and are valid no-op arguments to region
/// edits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rectangle {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Horizontal extent.
    pub width: i32,
    /// Vertical extent.
    pub height: i32,
}

impl Rectangle {
    /// Create a rectangle from its top-left corner and size.
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle from its edges. Inverted edges give an empty
    /// rectangle.
    pub fn from_edges(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self::new(
            left,
            top,
            right.saturating_sub(left).max(0),
            bottom.saturating_sub(top).max(0),
        )
    }

    /// A rectangle at the origin.
    pub const fn sized(width: i32, height: i32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Left edge (inclusive).
    pub const fn left(&self) -> i32 {
        self.x
    }

    /// Top edge (inclusive).
    pub const fn top(&self) -> i32 {
        self.y
    }

    /// Right edge (exclusive). Clamped to the coordinate range, so cells
    /// past `i32::MAX` are never covered.
    pub const fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    /// Bottom edge (exclusive), clamped like [`Rectangle::right`].
    pub const fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    /// Top-left corner.
    pub const fn top_left(&self) -> Position {
        Position::new(self.x, self.y)
    }

    /// Returns true if the rectangle covers no cells.
    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Number of cells covered.
    pub fn area(&self) -> i32 {
        if self.is_empty() {
            0
        } else {
            self.width.saturating_mul(self.height)
        }
    }

    /// Returns true if `pos` is inside the rectangle.
    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= self.left() && pos.x < self.right() && pos.y >= self.top() && pos.y < self.bottom()
    }

    /// The overlap of two rectangles, empty if they do not overlap.
    pub fn intersection(&self, other: &Rectangle) -> Rectangle {
        Rectangle::from_edges(
            self.left().max(other.left()),
            self.top().max(other.top()),
            self.right().min(other.right()),
            self.bottom().min(other.bottom()),
        )
    }

    /// Returns true if the rectangles share at least one cell.
    pub fn intersects(&self, other: &Rectangle) -> bool {
        !self.intersection(other).is_empty()
    }

    /// The same rectangle moved by `offset`.
    pub fn translate(&self, offset: Position) -> Rectangle {
        Rectangle::new(
            self.x.saturating_add(offset.x),
            self.y.saturating_add(offset.y),
            self.width,
            self.height,
        )
    }

    /// Shrink by `amount` on every side. Never goes below zero size.
    pub fn inset(&self, amount: i32) -> Rectangle {
        Rectangle::from_edges(
            self.left().saturating_add(amount),
            self.top().saturating_add(amount),
            self.right().saturating_sub(amount),
            self.bottom().saturating_sub(amount),
        )
    }

    /// Every cell, row by row.
    pub fn positions(&self) -> impl Iterator<Item = Position> + use<> {
        let (left, right) = (self.left(), self.right());
        (self.top()..self.bottom()).flat_map(move |py| (left..right).map(move |px| Position::new(px, py)))
    }
}

impl fmt::Display for Rectangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {} {}x{}]", self.x, self.y, self.width, self.height)
    }
}
