//! Ratcliff/Obershelp sequence similarity.
//!
//! The ratio is `2 * M / T` where `T` is the combined length of both
//! sequences and `M` the number of elements in the matching blocks: the
//! longest common block, then recursively the longest blocks to its left and
//! to its right. Ties prefer the block starting earliest in `a`, then in `b`.

/// Similarity of two strings in `0.0..=1.0`, compared char by char.
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_chars(&a, &b) as f64 / total as f64
}

fn matching_chars<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    let mut matched = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];
    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, size) = longest_match(a, b, alo, ahi, blo, bhi);
        if size == 0 {
            continue;
        }
        matched += size;
        if alo < i && blo < j {
            pending.push((alo, i, blo, j));
        }
        if i + size < ahi && j + size < bhi {
            pending.push((i + size, ahi, j + size, bhi));
        }
    }
    matched
}

/// Longest block `a[i..i + size] == b[j..j + size]` inside the given ranges.
fn longest_match<T: PartialEq>(
    a: &[T],
    b: &[T],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best) = (alo, blo, 0);
    // current[j + 1 - blo] is the length of the match ending at a[i], b[j]
    let mut previous = vec![0usize; bhi - blo + 1];
    let mut current = vec![0usize; bhi - blo + 1];
    for i in alo..ahi {
        for j in blo..bhi {
            let slot = j + 1 - blo;
            current[slot] = if a[i] == b[j] { previous[slot - 1] + 1 } else { 0 };
            if current[slot] > best {
                best = current[slot];
                best_i = i + 1 - best;
                best_j = j + 1 - best;
            }
        }
        std::mem::swap(&mut previous, &mut current);
    }
    (best_i, best_j, best)
}
