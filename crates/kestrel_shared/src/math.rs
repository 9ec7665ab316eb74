//! Mathematical types shared by the ECS, the collision layer and the game.
//!
//! `Vec2` and `Point` are plain data (`Pod`) so they can be copied straight
//! into GPU buffers by a renderer. `Vector2D` carries a cached length and is
//! used for steering and movement directions.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Converts radians to whole degrees, truncating toward zero.
#[inline]
#[must_use]
pub fn radians_to_degrees(radians: f64) -> i16 {
    (radians * (180.0 / std::f64::consts::PI)) as i16
}

/// Converts whole degrees to radians.
#[inline]
#[must_use]
pub fn degrees_to_radians(degrees: i16) -> f64 {
    f64::from(degrees) * (std::f64::consts::PI / 180.0)
}

// =============================================================================
// Vec2
// =============================================================================

/// 2D Vector - world positions, box corners
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Vec2 {
    /// X component
    pub x: f32,
    /// Y component
    pub y: f32,
}

impl Vec2 {
    /// Creates a new Vec2
    #[inline]
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Zero vector
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// Converts to array
    #[must_use]
    pub const fn to_array(self) -> [f32; 2] {
        [self.x, self.y]
    }

    /// Dot product
    #[must_use]
    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// Length squared (avoids sqrt)
    #[must_use]
    pub fn length_squared(self) -> f32 {
        self.dot(self)
    }

    /// Length
    #[must_use]
    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    /// Component-wise minimum.
    #[must_use]
    pub fn min(self, other: Self) -> Self {
        Self::new(self.x.min(other.x), self.y.min(other.y))
    }

    /// Component-wise maximum.
    #[must_use]
    pub fn max(self, other: Self) -> Self {
        Self::new(self.x.max(other.x), self.y.max(other.y))
    }
}

impl std::ops::Add for Vec2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::Mul<f32> for Vec2 {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

// =============================================================================
// Vector2D
// =============================================================================

/// Direction vector with a cached length.
///
/// The components are private so the cached length can never go stale;
/// use [`Vector2D::set`] to change them.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Vector2D {
    x: f64,
    y: f64,
    length: f64,
}

impl Vector2D {
    /// Creates a vector and computes its length.
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            length: x.hypot(y),
        }
    }

    /// Zero vector
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        length: 0.0,
    };

    /// X component
    #[inline]
    #[must_use]
    pub const fn x(&self) -> f64 {
        self.x
    }

    /// Y component
    #[inline]
    #[must_use]
    pub const fn y(&self) -> f64 {
        self.y
    }

    /// Cached length.
    #[inline]
    #[must_use]
    pub const fn length(&self) -> f64 {
        self.length
    }

    /// Replaces both components and refreshes the cached length.
    pub fn set(&mut self, x: f64, y: f64) {
        *self = Self::new(x, y);
    }

    /// Returns the unit vector in the same direction.
    ///
    /// The zero vector normalizes to itself.
    #[must_use]
    pub fn normalize(&self) -> Self {
        if self.length == 0.0 {
            Self::ZERO
        } else {
            Self::new(self.x / self.length, self.y / self.length)
        }
    }

    /// Rotates the vector counter-clockwise by `degrees`.
    pub fn rotate(&mut self, degrees: i16) {
        let (sin, cos) = degrees_to_radians(degrees).sin_cos();
        let x = self.x * cos - self.y * sin;
        let y = self.x * sin + self.y * cos;
        self.set(x, y);
    }

    /// Dot product
    #[must_use]
    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Heading in whole degrees, measured from the positive X axis.
    #[must_use]
    pub fn angle(&self) -> i16 {
        radians_to_degrees(self.y.atan2(self.x))
    }
}

impl PartialEq for Vector2D {
    fn eq(&self, other: &Self) -> bool {
        self.x == other.x && self.y == other.y
    }
}

impl std::ops::Sub for Vector2D {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::Add for Vector2D {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Mul<f64> for Vector2D {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl From<[f64; 2]> for Vector2D {
    fn from(arr: [f64; 2]) -> Self {
        Self::new(arr[0], arr[1])
    }
}

impl From<Vector2D> for [f64; 2] {
    fn from(v: Vector2D) -> Self {
        [v.x, v.y]
    }
}

// =============================================================================
// Point / Rect
// =============================================================================

/// Integer point - tile coordinates, pixel positions
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate
    pub x: i32,
    /// Y coordinate
    pub y: i32,
}

impl Point {
    /// Creates a new point
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Divides both coordinates, returning `None` for a zero divisor.
    #[must_use]
    pub fn checked_div(self, divisor: i32) -> Option<Self> {
        Some(Self::new(
            self.x.checked_div(divisor)?,
            self.y.checked_div(divisor)?,
        ))
    }
}

impl std::ops::Add for Point {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Point {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::Mul<i32> for Point {
    type Output = Self;
    fn mul(self, rhs: i32) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl std::ops::Div<i32> for Point {
    type Output = Self;

    /// Divides both coordinates.
    ///
    /// # Panics
    ///
    /// Panics if `rhs` is zero. Use [`Point::checked_div`] for divisors that
    /// come from data.
    fn div(self, rhs: i32) -> Self {
        Self::new(self.x / rhs, self.y / rhs)
    }
}

/// Integer rectangle - sprite source/destination regions
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub x: i32,
    /// Top edge
    pub y: i32,
    /// Width
    pub w: i32,
    /// Height
    pub h: i32,
}

impl Rect {
    /// Creates a new rectangle
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Top-left corner
    #[must_use]
    pub const fn origin(self) -> Point {
        Point::new(self.x, self.y)
    }
}
