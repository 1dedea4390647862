use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

macro_rules! vec2_type {
    ($name:ident, $scalar:ty) => {
        #[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
        pub struct $name {
            pub x: $scalar,
            pub y: $scalar,
        }

        impl $name {
            pub const fn new(x: $scalar, y: $scalar) -> Self {
                Self { x, y }
            }

            pub fn dot(self, other: Self) -> $scalar {
                self.x * other.x + self.y * other.y
            }

            pub fn length_squared(self) -> f32 {
                (self.x as f32) * (self.x as f32) + (self.y as f32) * (self.y as f32)
            }

            pub fn length(self) -> f32 {
                self.length_squared().sqrt()
            }

            /// Unit vector pointing the same way; the zero vector stays zero.
            pub fn normalized(self) -> Vec2f {
                let length = self.length();
                if length > 0.0 {
                    Vec2f::new(self.x as f32 / length, self.y as f32 / length)
                } else {
                    Vec2f::default()
                }
            }
        }

        impl Add for $name {
            type Output = Self;
            fn add(self, rhs: Self) -> Self {
                Self::new(self.x + rhs.x, self.y + rhs.y)
            }
        }

        impl AddAssign for $name {
            fn add_assign(&mut self, rhs: Self) {
                self.x += rhs.x;
                self.y += rhs.y;
            }
        }

        impl Sub for $name {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self {
                Self::new(self.x - rhs.x, self.y - rhs.y)
            }
        }

        impl SubAssign for $name {
            fn sub_assign(&mut self, rhs: Self) {
                self.x -= rhs.x;
                self.y -= rhs.y;
            }
        }

        impl Mul<$scalar> for $name {
            type Output = Self;
            fn mul(self, rhs: $scalar) -> Self {
                Self::new(self.x * rhs, self.y * rhs)
            }
        }

        impl Div<$scalar> for $name {
            type Output = Self;
            fn div(self, rhs: $scalar) -> Self {
                Self::new(self.x / rhs, self.y / rhs)
            }
        }

        impl Neg for $name {
            type Output = Self;
            fn neg(self) -> Self {
                Self::new(-self.x, -self.y)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "({}, {})", self.x, self.y)
            }
        }
    };
}

vec2_type!(Vec2i, i32);
vec2_type!(Vec2f, f32);

impl Eq for Vec2i {}

impl Vec2i {
    pub fn to_f32(self) -> Vec2f {
        Vec2f::new(self.x as f32, self.y as f32)
    }

    /// Componentwise max with zero.
    pub fn clamp_non_negative(self) -> Self {
        Self::new(self.x.max(0), self.y.max(0))
    }
}

impl Vec2f {
    pub fn round(self) -> Vec2i {
        Vec2i::new(self.x.round() as i32, self.y.round() as i32)
    }
}

impl From<Vec2i> for Vec2f {
    fn from(value: Vec2i) -> Self {
        value.to_f32()
    }
}

/// Axis aligned integer rectangle stored by its edges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn from_pos_size(position: Vec2i, size: Vec2i) -> Self {
        Self::new(
            position.x,
            position.y,
            position.x + size.x,
            position.y + size.y,
        )
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    pub fn top_left(&self) -> Vec2i {
        Vec2i::new(self.left, self.top)
    }

    pub fn size(&self) -> Vec2i {
        Vec2i::new(self.width(), self.height())
    }

    pub fn center(&self) -> Vec2f {
        Vec2f::new(
            (self.left + self.right) as f32 / 2.0,
            (self.top + self.bottom) as f32 / 2.0,
        )
    }

    pub fn union(&self, other: &Rect) -> Rect {
        Rect::new(
            self.left.min(other.left),
            self.top.min(other.top),
            self.right.max(other.right),
            self.bottom.max(other.bottom),
        )
    }

    /// True when the interiors overlap; touching edges do not count.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left < other.right
            && other.left < self.right
            && self.top < other.bottom
            && other.top < self.bottom
    }
}
