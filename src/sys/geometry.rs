use serde::{Deserialize, Serialize};

use crate::model::vspace::SpaceOffset;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Point { Point { x, y } }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Size { Size { width, height } }
}

/// Axis-aligned rectangle in display-global coordinates. Kept in single
/// precision end to end; rounding happens only when a frame is handed to the
/// window server.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Rect {
        Rect { x, y, width, height }
    }

    pub fn from_parts(origin: Point, size: Size) -> Rect {
        Rect::new(origin.x, origin.y, size.width, size.height)
    }

    pub fn origin(&self) -> Point { Point::new(self.x, self.y) }

    pub fn size(&self) -> Size { Size::new(self.width, self.height) }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn area(&self) -> f32 { self.width * self.height }

    /// Edge-inclusive containment, matching the cursor-in-region test.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.y >= self.y
            && point.x <= self.x + self.width
            && point.y <= self.y + self.height
    }

    pub fn round(&self) -> Rect {
        Rect::new(
            self.x.round(),
            self.y.round(),
            self.width.round(),
            self.height.round(),
        )
    }
}

/// Splits `rect` at `ratio` along the vertical axis. The first half keeps
/// `ratio * width - gap / 2`; the second starts one full gap after it.
pub fn split_vertical(rect: Rect, ratio: f32, gap: f32) -> (Rect, Rect) {
    let first_width = ratio * rect.width - gap / 2.0;
    let first = Rect::new(rect.x, rect.y, first_width, rect.height);
    let second = Rect::new(
        rect.x + first_width + gap,
        rect.y,
        rect.width - first_width - gap,
        rect.height,
    );
    (first, second)
}

/// Splits `rect` at `ratio` along the horizontal axis.
pub fn split_horizontal(rect: Rect, ratio: f32, gap: f32) -> (Rect, Rect) {
    let first_height = ratio * rect.height - gap / 2.0;
    let first = Rect::new(rect.x, rect.y, rect.width, first_height);
    let second = Rect::new(
        rect.x,
        rect.y + first_height + gap,
        rect.width,
        rect.height - first_height - gap,
    );
    (first, second)
}

/// Shrinks `rect` by the workspace padding.
pub fn pad(rect: Rect, offset: SpaceOffset) -> Rect {
    Rect::new(
        rect.x + offset.left,
        rect.y + offset.top,
        rect.width - offset.left - offset.right,
        rect.height - offset.top - offset.bottom,
    )
}

/// Rescales a window frame when it crosses displays. Content moving to a
/// smaller display is shrunk; content moving to a larger one keeps its pixel
/// offset from the display edge untouched.
pub fn normalize_to_display(frame: Rect, source: Rect, destination: Rect) -> Rect {
    let offset_x = frame.x - source.x;
    let offset_y = frame.y - source.y;

    let scale_x = source.width / destination.width;
    let x = if scale_x > 1.0 {
        offset_x / scale_x + destination.x
    } else {
        offset_x + destination.x
    };

    let scale_y = source.height / destination.height;
    let y = if scale_y > 1.0 {
        offset_y / scale_y + destination.y
    } else {
        offset_y + destination.y
    };

    Rect::new(x, y, frame.width / scale_x, frame.height / scale_y)
}
