//! Integer placement between two neighbouring positions.
//!
//! Positions are integers, so the space between two neighbours runs out.
//! When they are adjacent (`|n1 - n2| == 1`) a record is still placed one
//! above the lower neighbour, which ties it with the upper one; from there
//! on the scope needs an external resequence before it can be reordered
//! reliably. Equal neighbours are rejected outright.

use tracing::warn;

use crate::error::SortError;

/// Position centred between `n1` and `n2`, given in any order.
///
/// Rounds towards the lower neighbour on odd gaps.
///
/// ```
/// use gapsort::plan::center;
///
/// assert_eq!(center(100, 200).unwrap(), 150);
/// assert_eq!(center(200, 100).unwrap(), 150);
/// assert_eq!(center(7, 8).unwrap(), 8);
/// assert!(center(5, 5).is_err());
/// ```
pub fn center(n1: i64, n2: i64) -> Result<i64, SortError> {
    let lower = n1.min(n2);
    // i128 keeps |n1 - n2| exact across the whole i64 range.
    let delta = (n1 as i128 - n2 as i128).abs();
    if delta == 0 {
        return Err(SortError::DegenerateGap { position: n1 });
    }
    if delta == 1 {
        warn!(lower, upper = lower + 1, "gap exhausted; placing on the upper neighbour");
        return Ok(lower + 1);
    }
    let position = lower as i128 + delta / 2;
    return Ok(position as i64);
}

/// `count` positions placed evenly strictly between `from` and `to`, in
/// sequence order (from `from` towards `to`).
///
/// A single position is the [`center`] of the gap. When the gap holds fewer
/// than `count` free integers some positions tie; this is reported with a
/// warning and left for a resequence.
pub fn spread(from: i64, to: i64, count: usize) -> Result<Vec<i64>, SortError> {
    if count == 0 {
        return Ok(Vec::new());
    }
    if from == to {
        return Err(SortError::DegenerateGap { position: from });
    }
    if count == 1 {
        return Ok(vec![center(from, to)?]);
    }

    let span = to as i128 - from as i128;
    let slots = count as i128 + 1;
    if span.abs() < slots {
        warn!(from, to, count, "gap exhausted; positions will tie");
    }

    let mut positions = Vec::with_capacity(count);
    for i in 1..slots {
        // |span * i / slots| < |span|, so the result stays between the ends.
        let offset = span * i / slots;
        positions.push((from as i128 + offset) as i64);
    }
    return Ok(positions);
}
