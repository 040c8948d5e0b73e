use crate::error::{Error, Result};
use crate::types::{BoundingBox, Mask};

/// A detection crop prepared for landmark search.
///
/// The crop is the bounding-box region of the full mask with empty margin
/// columns trimmed away. `top` and `bottom` hold the first and last
/// foreground row per remaining column; `None` marks an interior column
/// with no foreground, which a silhouette with gaps can produce.
#[derive(Debug, Clone)]
pub struct MaskProfile {
    crop: Mask,
    offset: (usize, usize),
    top: Vec<Option<usize>>,
    bottom: Vec<Option<usize>>,
}

impl MaskProfile {
    /// Crop `mask` to `bbox`, trim empty margin columns and build the row
    /// profiles.
    ///
    /// Returns `Ok(None)` when the box misses the mask entirely or the
    /// cropped region contains no foreground pixel; such a detection is
    /// treated as empty rather than as an error. Boxes without positive
    /// finite extent are rejected.
    pub fn from_mask(mask: &Mask, bbox: &BoundingBox) -> Result<Option<MaskProfile>> {
        if !(bbox.width > 0.0 && bbox.height > 0.0)
            || !bbox.width.is_finite()
            || !bbox.height.is_finite()
            || !bbox.center_x.is_finite()
            || !bbox.center_y.is_finite()
        {
            return Err(Error::InvalidBox {
                center_x: bbox.center_x,
                center_y: bbox.center_y,
                width: bbox.width,
                height: bbox.height,
            });
        }

        // Clamp the pixel rectangle to mask bounds. The corner sums are
        // taken in i128: a corner saturated to i64::MIN plus an extent
        // saturated to usize::MAX overflows an i64 add.
        let x0 = bbox.top_x().max(0) as usize;
        let y0 = bbox.top_y().max(0) as usize;
        let x1 =
            (bbox.top_x() as i128 + bbox.pixel_width() as i128).clamp(0, mask.width() as i128)
                as usize;
        let y1 =
            (bbox.top_y() as i128 + bbox.pixel_height() as i128).clamp(0, mask.height() as i128)
                as usize;
        if x0 >= x1 || y0 >= y1 {
            return Ok(None);
        }

        let crop = mask.crop(x0, y0, x1 - x0, y1 - y0);
        let Some((first, last)) = foreground_bounds(&crop) else {
            return Ok(None);
        };
        let trimmed = crop.crop(first, 0, last - first + 1, crop.height());

        let mut top = Vec::with_capacity(trimmed.width());
        let mut bottom = Vec::with_capacity(trimmed.width());
        for col in 0..trimmed.width() {
            top.push(first_foreground_row(&trimmed, col));
            bottom.push(last_foreground_row(&trimmed, col));
        }

        Ok(Some(MaskProfile {
            crop: trimmed,
            offset: (x0 + first, y0),
            top,
            bottom,
        }))
    }

    /// Width of the trimmed crop. At least 1, and the first and last
    /// columns both contain foreground.
    pub fn width(&self) -> usize {
        self.crop.width()
    }

    pub fn height(&self) -> usize {
        self.crop.height()
    }

    /// Origin of the trimmed crop in full-mask coordinates.
    pub fn offset(&self) -> (usize, usize) {
        self.offset
    }

    /// The cropped and trimmed mask region.
    pub fn crop(&self) -> &Mask {
        &self.crop
    }

    /// First foreground row in a column, if the column has any.
    pub fn top(&self, col: usize) -> Option<usize> {
        self.top.get(col).copied().flatten()
    }

    /// Last foreground row in a column, if the column has any.
    pub fn bottom(&self, col: usize) -> Option<usize> {
        self.bottom.get(col).copied().flatten()
    }

    /// Top and bottom foreground rows of a column in one call.
    pub fn column_span(&self, col: usize) -> Option<(usize, usize)> {
        Some((self.top(col)?, self.bottom(col)?))
    }
}

/// First and last column containing any foreground pixel.
fn foreground_bounds(mask: &Mask) -> Option<(usize, usize)> {
    let first = (0..mask.width()).find(|&col| column_has_foreground(mask, col))?;
    let last = (0..mask.width()).rfind(|&col| column_has_foreground(mask, col))?;
    Some((first, last))
}

fn column_has_foreground(mask: &Mask, col: usize) -> bool {
    (0..mask.height()).any(|row| mask.is_foreground(col, row))
}

fn first_foreground_row(mask: &Mask, col: usize) -> Option<usize> {
    (0..mask.height()).find(|&row| mask.is_foreground(col, row))
}

fn last_foreground_row(mask: &Mask, col: usize) -> Option<usize> {
    (0..mask.height()).rfind(|&row| mask.is_foreground(col, row))
}
