use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A binary segmentation mask stored as a row-major grid.
///
/// Any non-zero value counts as foreground. Out-of-bounds reads return
/// background, so callers can probe freely without bounds arithmetic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    data: Vec<u8>,
    width: usize,
    height: usize,
}

impl Mask {
    pub fn new(data: Vec<u8>, width: usize, height: usize) -> Self {
        debug_assert_eq!(data.len(), width * height);
        Self {
            data,
            width,
            height,
        }
    }

    /// Build a mask by evaluating `f` at every (x, y).
    pub fn from_fn<F>(width: usize, height: usize, f: F) -> Self
    where
        F: Fn(usize, usize) -> u8,
    {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self {
            data,
            width,
            height,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Value at (x, y); background for out-of-bounds coordinates.
    pub fn get(&self, x: usize, y: usize) -> u8 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        self.data[y * self.width + x]
    }

    pub fn is_foreground(&self, x: usize, y: usize) -> bool {
        self.get(x, y) > 0
    }

    /// One full row of the grid.
    pub fn row(&self, y: usize) -> &[u8] {
        let start = y * self.width;
        &self.data[start..start + self.width]
    }

    /// Copy the rectangle starting at (x, y) into a new mask. The rectangle
    /// must lie within bounds.
    pub fn crop(&self, x: usize, y: usize, width: usize, height: usize) -> Mask {
        debug_assert!(x + width <= self.width && y + height <= self.height);
        let mut data = Vec::with_capacity(width * height);
        for row in y..y + height {
            let start = row * self.width + x;
            data.extend_from_slice(&self.data[start..start + width]);
        }
        Mask {
            data,
            width,
            height,
        }
    }
}

/// A detection box in mask coordinates, encoded the way the detector emits
/// it: center point plus full width and height, all fractional.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub center_x: f32,
    pub center_y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    pub const fn new(center_x: f32, center_y: f32, width: f32, height: f32) -> Self {
        Self {
            center_x,
            center_y,
            width,
            height,
        }
    }

    /// Box covering the pixel rectangle `[x, x + width) x [y, y + height)`.
    pub fn from_corner(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            center_x: x as f32 + width as f32 / 2.0,
            center_y: y as f32 + height as f32 / 2.0,
            width: width as f32,
            height: height as f32,
        }
    }

    /// Leftmost pixel column covered by the box. Can be negative when the
    /// detector places the center close to the mask edge.
    pub fn top_x(&self) -> i64 {
        (self.center_x - self.width / 2.0).ceil() as i64
    }

    /// Topmost pixel row covered by the box.
    pub fn top_y(&self) -> i64 {
        (self.center_y - self.height / 2.0).ceil() as i64
    }

    /// Pixel width of the box.
    pub fn pixel_width(&self) -> usize {
        self.width.ceil().max(0.0) as usize
    }

    /// Pixel height of the box.
    pub fn pixel_height(&self) -> usize {
        self.height.ceil().max(0.0) as usize
    }
}

/// Which way the animal faces in the frame. The anatomical zone layout
/// mirrors horizontally between the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "left" => Ok(Direction::Left),
            "right" => Ok(Direction::Right),
            other => Err(format!(
                "unknown direction '{}', expected 'left' or 'right'",
                other
            )),
        }
    }
}
