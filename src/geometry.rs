use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

pub type SelectionId = u64;

/// A point on the image's integer pixel grid. Selections are stored in
/// image space so the export stays pixel-exact regardless of zoom.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vector2 {
    pub x: i32,
    pub y: i32,
}

impl Vector2 {
    pub const ZERO: Self = Self { x: 0, y: 0 };

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn to_pos2(self) -> egui::Pos2 {
        egui::Pos2::new(self.x as f32, self.y as f32)
    }
}

impl Add for Vector2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vector2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Identity of a rectangle vertex. `A` and `C` are the independently
/// stored corners; `B` and `D` are derived from them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Corner {
    A,
    B,
    C,
    D,
}

impl Corner {
    pub const ALL: [Corner; 4] = [Corner::A, Corner::B, Corner::C, Corner::D];
}

/// One user-drawn rectangular region.
///
/// Only `a` (the drag anchor) and `c` (the opposite corner) are stored;
/// `b = (c.x, a.y)` and `d = (a.x, c.y)` are computed on demand, so two
/// logical corners can never alias the same storage. Moving any corner
/// through [`Selection::set_point`] pivots the rectangle around that
/// corner and keeps it axis-aligned.
#[derive(Clone, Debug, PartialEq)]
pub struct Selection {
    pub id: SelectionId,
    a: Vector2,
    c: Vector2,
    /// Transient hover emphasis driven by the tag panel; never exported.
    pub is_highlighted: bool,
}

impl Selection {
    /// A fresh selection with all four corners collapsed onto `pos`.
    pub fn new(id: SelectionId, pos: Vector2) -> Self {
        Self {
            id,
            a: pos,
            c: pos,
            is_highlighted: false,
        }
    }

    pub fn a(&self) -> Vector2 {
        self.a
    }

    pub fn b(&self) -> Vector2 {
        Vector2::new(self.c.x, self.a.y)
    }

    pub fn c(&self) -> Vector2 {
        self.c
    }

    pub fn d(&self) -> Vector2 {
        Vector2::new(self.a.x, self.c.y)
    }

    pub fn point(&self, corner: Corner) -> Vector2 {
        match corner {
            Corner::A => self.a(),
            Corner::B => self.b(),
            Corner::C => self.c(),
            Corner::D => self.d(),
        }
    }

    /// Pivots the rectangle so `corner` lands on `pos`. Setting `B` or
    /// `D` splits the move across the stored corners: the new corner
    /// keeps one axis of `a` and one of `c`.
    pub fn set_point(&mut self, corner: Corner, pos: Vector2) {
        match corner {
            Corner::A => self.a = pos,
            Corner::B => {
                self.a.y = pos.y;
                self.c.x = pos.x;
            }
            Corner::C => self.c = pos,
            Corner::D => {
                self.a.x = pos.x;
                self.c.y = pos.y;
            }
        }
    }

    // The original labeling tool's output contract spans "height" along
    // x and "width" along y; the exporter depends on that, so the names
    // stick.
    pub fn abs_height(&self) -> i32 {
        (self.a.x - self.c.x).abs()
    }

    pub fn abs_width(&self) -> i32 {
        (self.a.y - self.c.y).abs()
    }

    /// Signed extent: negative when the drag ran from `c`'s side toward
    /// `a`'s, so a rectangle drawn from `a` renders the same either way.
    pub fn rel_height(&self) -> i32 {
        if self.a.x > self.c.x {
            -self.abs_height()
        } else {
            self.abs_height()
        }
    }

    pub fn rel_width(&self) -> i32 {
        if self.a.y > self.c.y {
            -self.abs_width()
        } else {
            self.abs_width()
        }
    }

    /// Normalized top-left corner, independent of drag direction.
    pub fn top_left(&self) -> Vector2 {
        Vector2::new(self.a.x.min(self.c.x), self.a.y.min(self.c.y))
    }

    pub fn bottom_right(&self) -> Vector2 {
        Vector2::new(self.a.x.max(self.c.x), self.a.y.max(self.c.y))
    }

    /// Zero-area selections are legal mid-drag but are not worth keeping.
    pub fn is_degenerate(&self) -> bool {
        self.abs_height() == 0 || self.abs_width() == 0
    }
}
