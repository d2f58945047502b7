//! Weighted random selection over static tables.

use super::RandomSource;

/// Entry of a weighted table. Weights are relative and need not sum to 1.
pub trait Weighted {
    fn weight(&self) -> f64;
}

impl Weighted for f64 {
    fn weight(&self) -> f64 {
        *self
    }
}

/// Draw an index with probability proportional to its weight.
///
/// Draws `r` in [0, total) and walks the table subtracting weights until
/// `r <= 0`. Entries with a non-positive weight are never selected. If
/// floating point drift leaves the walk unterminated, `r` sits at the top of
/// the range and the last positive entry is returned. Returns `None` for an
/// empty table or one without positive weight.
pub fn select<R: RandomSource, W: Weighted>(rng: &mut R, table: &[W]) -> Option<usize> {
    let total: f64 = table
        .iter()
        .map(|entry| entry.weight())
        .filter(|w| *w > 0.0)
        .sum();
    if !(total > 0.0 && total.is_finite()) {
        return None;
    }

    let mut r = rng.next_f64() * total;
    let mut last = None;
    for (idx, entry) in table.iter().enumerate() {
        let weight = entry.weight();
        if weight <= 0.0 {
            continue;
        }
        r -= weight;
        if r <= 0.0 {
            return Some(idx);
        }
        last = Some(idx);
    }
    last
}

/// Like [`select`], returning the entry itself.
pub fn pick<'a, R: RandomSource, W: Weighted>(rng: &mut R, table: &'a [W]) -> Option<&'a W> {
    select(rng, table).map(|idx| &table[idx])
}
