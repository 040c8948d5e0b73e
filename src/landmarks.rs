//! Anatomical landmark search over a mask profile.
//!
//! The trimmed silhouette is split into head, shoulder, rump and tail
//! zones by fixed width fractions; their horizontal order depends on which
//! way the animal faces. Landmark columns come from the foot line of the
//! profile, the hill column from the back line.

use tracing::warn;

use crate::profile::MaskProfile;
use crate::types::Direction;

const HEAD_FRACTION: f32 = 0.2;
const SHOULDER_FRACTION: f32 = 0.4;
const RUMP_FRACTION: f32 = 0.4;
const TAIL_FRACTION: f32 = 0.1;

/// A half-open range of pixel columns covering one anatomical zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Zone {
    pub start: usize,
    pub end: usize,
}

impl Zone {
    pub fn columns(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }
}

/// The four anatomical zones over a trimmed silhouette, in crop
/// coordinates. Exposed for overlay rendering; the landmark search uses it
/// internally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneLayout {
    pub head: Zone,
    pub shoulder: Zone,
    pub rump: Zone,
    pub tail: Zone,
}

impl ZoneLayout {
    /// Partition a silhouette of the given width for an animal facing
    /// `direction`. Zone widths are fixed fractions of the total width,
    /// truncated to whole columns; the tail overlays the trailing tenth.
    pub fn new(width: usize, direction: Direction) -> Self {
        let head_w = (width as f32 * HEAD_FRACTION) as usize;
        let shoulder_w = (width as f32 * SHOULDER_FRACTION) as usize;
        let rump_w = (width as f32 * RUMP_FRACTION) as usize;
        let tail_w = (width as f32 * TAIL_FRACTION) as usize;

        match direction {
            Direction::Left => ZoneLayout {
                head: Zone {
                    start: 0,
                    end: head_w,
                },
                shoulder: Zone {
                    start: head_w,
                    end: head_w + shoulder_w,
                },
                rump: Zone {
                    start: head_w + shoulder_w,
                    end: head_w + shoulder_w + rump_w,
                },
                tail: Zone {
                    start: width - tail_w,
                    end: width,
                },
            },
            Direction::Right => ZoneLayout {
                rump: Zone {
                    start: 0,
                    end: rump_w,
                },
                shoulder: Zone {
                    start: rump_w,
                    end: rump_w + shoulder_w,
                },
                head: Zone {
                    start: rump_w + shoulder_w,
                    end: rump_w + shoulder_w + head_w,
                },
                tail: Zone {
                    start: 0,
                    end: tail_w,
                },
            },
        }
    }
}

/// A landmark column with the silhouette's vertical extent at that column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Landmark {
    pub column: usize,
    pub top: usize,
    pub bottom: usize,
}

/// The landmark set measurements are taken from, in crop coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Landmarks {
    /// Lowest foot point within the shoulder zone.
    pub shoulder: Landmark,
    /// Lowest foot point within the rump zone.
    pub rump: Landmark,
    /// Front edge of the rump on the back line.
    pub hill: Landmark,
    /// Vertical reference column halfway between shoulder and rump.
    pub middle: usize,
    /// Set when the back line never rises within the rump zone and the
    /// hill fell back to the zone's leading foreground column.
    pub hill_fallback: bool,
}

impl Landmarks {
    /// Locate the landmark columns for a silhouette facing `direction`.
    ///
    /// Returns `None` when the shoulder or rump zone contains no
    /// foreground column; such a detection is too degenerate to measure.
    pub fn locate(profile: &MaskProfile, direction: Direction) -> Option<Landmarks> {
        let zones = ZoneLayout::new(profile.width(), direction);

        let shoulder = lowest_foot_point(profile, &zones.shoulder)?;
        let rump = lowest_foot_point(profile, &zones.rump)?;
        let (hill, hill_fallback) = hill_column(profile, &zones.rump, direction)?;
        let middle = (shoulder.column + rump.column) / 2;

        Some(Landmarks {
            shoulder,
            rump,
            hill,
            middle,
            hill_fallback,
        })
    }
}

/// Column with the lowest foreground pixel (greatest row index) in the
/// zone. Earlier columns win ties, matching a stable argmax.
fn lowest_foot_point(profile: &MaskProfile, zone: &Zone) -> Option<Landmark> {
    let mut best: Option<Landmark> = None;
    for col in zone.columns() {
        let Some((top, bottom)) = profile.column_span(col) else {
            continue;
        };
        if best.map_or(true, |b| bottom > b.bottom) {
            best = Some(Landmark { column: col, top, bottom });
        }
    }
    best
}

/// First column where the back line rises (top row index drops against the
/// previously examined column) while scanning the rump zone from its
/// leading edge. Falls back to the zone's first foreground column in scan
/// order when the back line never rises.
fn hill_column(
    profile: &MaskProfile,
    zone: &Zone,
    direction: Direction,
) -> Option<(Landmark, bool)> {
    let columns: Vec<usize> = match direction {
        Direction::Left => zone.columns().collect(),
        Direction::Right => zone.columns().rev().collect(),
    };

    let mut previous: Option<usize> = None;
    for &col in &columns {
        let Some(top) = profile.top(col) else {
            continue;
        };
        if previous.is_some_and(|prev_top| top < prev_top) {
            let bottom = profile.bottom(col)?;
            return Some((Landmark { column: col, top, bottom }, false));
        }
        previous = Some(top);
    }

    let first = columns.iter().find_map(|&col| {
        let (top, bottom) = profile.column_span(col)?;
        Some(Landmark { column: col, top, bottom })
    })?;
    warn!(
        column = first.column,
        "back line never rises in the rump zone, using its leading column"
    );
    Some((first, true))
}
