//! Fixed-stride downsampling for chart legibility.
//!
//! This is deliberately not a statistical reducer: no averaging, no min/max
//! binning. With `step = n / target` it keeps indices `0, step, 2*step, ...`,
//! so the output may hold more than `target` points and may miss the last one.

use std::num::NonZeroUsize;

pub fn downsample<T: Clone>(items: &[T], target: NonZeroUsize) -> Vec<T> {
    let target = target.get();
    if items.len() <= target {
        return items.to_vec();
    }

    let step = items.len() / target;
    items.iter().step_by(step).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nz(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn short_input_is_returned_unchanged() {
        let items: Vec<u32> = (0..10).collect();
        assert_eq!(downsample(&items, nz(10)), items);
        assert_eq!(downsample(&items, nz(50)), items);
        assert!(downsample::<u32>(&[], nz(1)).is_empty());
    }

    #[test]
    fn exact_multiple_keeps_target_points() {
        let items: Vec<u32> = (0..100).collect();
        let out = downsample(&items, nz(10));
        assert_eq!(out.len(), 10);
        assert_eq!(out[0], items[0]);
        assert_eq!(out, vec![0, 10, 20, 30, 40, 50, 60, 70, 80, 90]);
    }

    #[test]
    fn stride_may_exceed_target_and_drop_last() {
        // step = 15 / 10 = 1, so every point survives.
        let items: Vec<u32> = (0..15).collect();
        assert_eq!(downsample(&items, nz(10)).len(), 15);

        // step = 25 / 10 = 2 -> 13 points, last index 24 kept only because 24 % 2 == 0.
        let items: Vec<u32> = (0..25).collect();
        let out = downsample(&items, nz(10));
        assert_eq!(out.len(), 13);
        assert_eq!(out.last(), Some(&24));

        // step = 26 / 10 = 2 -> index 25 is dropped.
        let items: Vec<u32> = (0..26).collect();
        assert_eq!(downsample(&items, nz(10)).last(), Some(&24));
    }

    #[test]
    fn target_of_one_keeps_only_first() {
        let items = vec!['a', 'b', 'c'];
        assert_eq!(downsample(&items, nz(1)), vec!['a']);
    }
}
