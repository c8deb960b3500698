//! Coordinate algebra - rotation and translation of integer points
//!
//! Points are treated as Gaussian integers `x + yi`. Multiplying by a unit
//! (`i`, `-i`, `-1`) rotates about the origin without leaving the integer
//! lattice, so block rotation never needs trigonometry or rounding.

use crate::types::Point;

/// Rotation used for a clockwise quarter turn
pub const ROTATE_CW: Point = Point::new(0, 1);

/// Rotation used for a counter-clockwise quarter turn
pub const ROTATE_CCW: Point = Point::new(0, -1);

/// Rotation used for a half turn
pub const ROTATE_180: Point = Point::new(-1, 0);

/// Complex product of `basis` and `rotation`
#[inline]
pub fn rotate(basis: Point, rotation: Point) -> Point {
    Point::new(
        basis.x * rotation.x - basis.y * rotation.y,
        basis.x * rotation.y + basis.y * rotation.x,
    )
}

/// Component-wise sum
#[inline]
pub fn translate(basis: Point, delta: Point) -> Point {
    Point::new(basis.x + delta.x, basis.y + delta.y)
}
