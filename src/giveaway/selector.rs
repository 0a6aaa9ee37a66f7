use std::collections::BTreeSet;

use rand::Rng;

/// Picks up to `winner_count` distinct winners from `entries`.
///
/// Duplicates in the input are ignored. The pool is shuffled with an unbiased
/// Fisher-Yates pass, so every ordering of the entries is equally likely.
pub fn select_winners<T, R>(
    entries: impl IntoIterator<Item = T>,
    winner_count: usize,
    rng: &mut R,
) -> Vec<T>
where
    T: Ord,
    R: Rng + ?Sized,
{
    let mut pool = entries
        .into_iter()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect::<Vec<_>>();

    if pool.is_empty() || winner_count == 0 {
        return Vec::new();
    }

    for i in (1..pool.len()).rev() {
        let j = rng.gen_range(0..=i);
        pool.swap(i, j);
    }

    pool.truncate(winner_count.min(pool.len()));
    pool
}
