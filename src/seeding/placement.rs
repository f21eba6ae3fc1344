/// Computes the slot assignment order for a bracket of `n` slots.
///
/// The i-th element is the slot index that receives the i-th strongest
/// seed. The four corner slots (`0`, `n-1`, `n/4-1`, `3n/4`) take the top
/// four seeds so they can only meet from the semifinals on; the remaining
/// slots are dealt round-robin across the four quadrant blocks so later
/// seeds spread away from earlier ones.
pub fn placement_order(n: usize) -> Vec<usize> {
    debug_assert!(n <= 2 || n.is_power_of_two());

    if n <= 1 {
        return (0..n).collect();
    }
    if n == 2 {
        return vec![0, 1];
    }

    let corners = corner_slots(n);
    let remaining: Vec<usize> = (0..n).filter(|s| !corners.contains(s)).collect();

    let mut order = corners;
    order.extend(interleave_quadrants(&remaining, (n - 4) / 4));
    order
}

/// Corner slots in priority order, clamped and de-duplicated (n = 4
/// collapses them to two).
fn corner_slots(n: usize) -> Vec<usize> {
    let mut corners = Vec::with_capacity(4);
    for slot in [0, n - 1, n / 4 - 1, 3 * n / 4] {
        let slot = slot.min(n - 1);
        if !corners.contains(&slot) {
            corners.push(slot);
        }
    }
    corners
}

fn interleave_quadrants(remaining: &[usize], block_size: usize) -> Vec<usize> {
    if block_size == 0 {
        return remaining.to_vec();
    }

    // Inexact division leaves a tail that is appended verbatim; only
    // non-power-of-two inputs reach it.
    let split = (block_size * 4).min(remaining.len());
    let (blocked, leftover) = remaining.split_at(split);

    let ordered: Vec<Vec<usize>> = blocked
        .chunks(block_size)
        .enumerate()
        .map(|(k, block)| order_within_block(block, k))
        .collect();

    // Quadrants adjacent to seeds 1 and 2 fill first.
    const BLOCK_PRIORITY: [usize; 4] = [0, 3, 1, 2];

    let mut out = Vec::with_capacity(remaining.len());
    for position in 0..block_size {
        for &block in &BLOCK_PRIORITY {
            out.push(ordered[block][position]);
        }
    }
    out.extend_from_slice(leftover);
    out
}

/// Two-ends-alternating order: even blocks lead with their low end, odd
/// blocks with their high end.
fn order_within_block(block: &[usize], block_index: usize) -> Vec<usize> {
    let mut out = Vec::with_capacity(block.len());
    let mut lo = 0;
    let mut hi = block.len();
    let mut from_low = block_index % 2 == 0;

    while lo < hi {
        if from_low {
            out.push(block[lo]);
            lo += 1;
        } else {
            hi -= 1;
            out.push(block[hi]);
        }
        from_low = !from_low;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_is_a_permutation_with_anchored_top_seeds() {
        for n in [2usize, 4, 8, 16, 32, 64, 128] {
            let order = placement_order(n);
            assert_eq!(order.len(), n);

            let mut sorted = order.clone();
            sorted.sort_unstable();
            assert_eq!(sorted, (0..n).collect::<Vec<_>>(), "n = {n}");

            assert_eq!(order[0], 0, "seed 1 anchors slot 0 (n = {n})");
            assert_eq!(order[1], n - 1, "seed 2 anchors slot n-1 (n = {n})");
        }
    }

    #[test]
    fn trivial_sizes() {
        assert_eq!(placement_order(0), Vec::<usize>::new());
        assert_eq!(placement_order(1), vec![0]);
        assert_eq!(placement_order(2), vec![0, 1]);
        assert_eq!(placement_order(4), vec![0, 3, 1, 2]);
    }

    #[test]
    fn eight_slot_bracket() {
        assert_eq!(placement_order(8), vec![0, 7, 1, 6, 2, 5, 3, 4]);
    }

    #[test]
    fn sixteen_slot_bracket() {
        assert_eq!(
            placement_order(16),
            vec![0, 15, 3, 12, 1, 14, 7, 8, 4, 11, 5, 10, 2, 13, 6, 9]
        );
    }

    #[test]
    fn seeds_three_and_four_take_the_quarter_corners() {
        for n in [8usize, 16, 32, 64] {
            let order = placement_order(n);
            assert_eq!(order[2], n / 4 - 1, "n = {n}");
            assert_eq!(order[3], 3 * n / 4, "n = {n}");
        }
    }

    #[test]
    fn block_order_alternates_from_both_ends() {
        assert_eq!(order_within_block(&[1, 2, 4], 0), vec![1, 4, 2]);
        assert_eq!(order_within_block(&[5, 6, 7], 1), vec![7, 5, 6]);
        assert_eq!(order_within_block(&[8, 9, 10, 11], 0), vec![8, 11, 9, 10]);
        assert_eq!(order_within_block(&[8, 9, 10, 11], 1), vec![11, 8, 10, 9]);
    }
}
