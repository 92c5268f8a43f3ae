//! Non-maximum suppression on response maps.

use crate::candidate::response::ResponseMap;

/// A strict local maximum of a response map.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocalMaximum {
    /// Map column of the maximum.
    pub x: usize,
    /// Map row of the maximum.
    pub y: usize,
    /// Response at the maximum.
    pub score: f32,
}

/// The two highest strict local maxima of a response map.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MaximaSummary {
    pub best: Option<LocalMaximum>,
    /// Score of the runner-up maximum. Equals `best.score` when two maxima tie.
    pub second_best: Option<f32>,
}

/// Finds the best and second-best strict 8-connected local maxima.
///
/// Only interior cells are candidates; the outermost ring of the map has no
/// full neighborhood. A cell qualifies only if it is strictly greater than all
/// eight neighbors, so plateaus produce no maximum.
pub fn best_two_maxima(map: &ResponseMap) -> MaximaSummary {
    let mut summary = MaximaSummary::default();
    let width = map.width();
    let height = map.height();
    if width < 3 || height < 3 {
        return summary;
    }

    for y in 1..height - 1 {
        'cells: for x in 1..width - 1 {
            let c = map.get(x, y);
            for ny in y - 1..=y + 1 {
                for nx in x - 1..=x + 1 {
                    if (nx != x || ny != y) && c <= map.get(nx, ny) {
                        continue 'cells;
                    }
                }
            }

            match summary.best {
                Some(best) if c <= best.score => {
                    if summary.second_best.is_none_or(|s| c > s) {
                        summary.second_best = Some(c);
                    }
                }
                previous => {
                    summary.second_best = previous.map(|b| b.score);
                    summary.best = Some(LocalMaximum { x, y, score: c });
                }
            }
        }
    }

    summary
}
