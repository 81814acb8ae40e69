use crate::C;

/// Upper bound on the number of values [`stations`] will produce.
pub const MAX_STATIONS: usize = 1 << 20;

/// Returns `0, step, 2 * step, ...` up to and including `length`.
///
/// Each value is computed as `i * step` rather than accumulated, so
/// the same `(length, step)` always yields bit-for-bit identical
/// positions.
///
/// Returns `None` when that would be more than [`MAX_STATIONS`]
/// values, or when `length / step` is not a finite, non-negative
/// number.
pub fn stations(length: C, step: C) -> Option<impl Iterator<Item = C>> {
    let last = (length / step).floor();
    #[allow(clippy::cast_precision_loss)]
    let bound = MAX_STATIONS as C;
    if !(last >= 0.0 && last < bound) {
        return None;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let count = last as usize + 1;
    #[allow(clippy::cast_precision_loss)]
    Some((0..count).map(move |i| i as C * step))
}
