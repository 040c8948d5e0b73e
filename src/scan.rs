/// A contiguous run of foreground values in a scan line.
///
/// The range is half-open: `start` is the first foreground index and `end`
/// is one past the last, so `len()` counts the covered pixels with no +1
/// adjustment anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Run {
    pub start: usize,
    pub end: usize,
}

impl Run {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Find the longest contiguous run of non-zero values in a scan line.
///
/// Returns `None` when the line contains no foreground. Ties are won by
/// the earliest run.
pub fn longest_run(values: &[u8]) -> Option<Run> {
    let mut best: Option<Run> = None;
    let mut current: Option<usize> = None;

    for (i, &v) in values.iter().enumerate() {
        if v > 0 {
            if current.is_none() {
                current = Some(i);
            }
        } else if let Some(start) = current.take() {
            let run = Run { start, end: i };
            if best.map_or(true, |b| run.len() > b.len()) {
                best = Some(run);
            }
        }
    }

    // A run touching the end of the line has no terminating background pixel.
    if let Some(start) = current {
        let run = Run {
            start,
            end: values.len(),
        };
        if best.map_or(true, |b| run.len() > b.len()) {
            best = Some(run);
        }
    }

    best
}
