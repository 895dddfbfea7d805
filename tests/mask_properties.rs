use bluemask::{MaskError, RankMask, generate_mask};
use rand::{SeedableRng, rngs::SmallRng};

fn mask(width: usize, seed: u64) -> RankMask {
    let mut rng = SmallRng::seed_from_u64(seed);
    generate_mask(width, &mut rng).unwrap()
}

fn assert_permutation(mask: &RankMask) {
    let len = mask.width() * mask.width();
    let mut sorted: Vec<u32> = mask.ranks().to_vec();
    sorted.sort_unstable();
    let expected: Vec<u32> = (0..len as u32).collect();
    assert_eq!(sorted, expected, "ranks are not a permutation");
}

#[test]
fn ranks_form_a_permutation() {
    for width in [2, 4, 8, 9, 16, 32] {
        let mask = mask(width, 42);
        assert_eq!(mask.width(), width);
        assert_permutation(&mask);
    }
}

#[test]
fn generation_terminates_across_seeds() {
    // The relaxation termination condition is a heuristic equilibrium
    // test with no formal bound, so exercise it across many seeds.
    for seed in 0..16 {
        assert_permutation(&mask(8, seed));
        assert_permutation(&mask(13, seed));
    }
}

#[test]
fn same_seed_gives_identical_masks() {
    let a = mask(16, 7);
    let b = mask(16, 7);
    assert_eq!(a, b);
}

#[test]
fn different_seeds_give_different_masks() {
    let a = mask(16, 1);
    let b = mask(16, 2);
    assert_ne!(a, b);
}

#[test]
fn byte_output_covers_full_range() {
    let mask = mask(16, 3);
    let bytes = mask.to_bytes();
    assert_eq!(bytes.len(), 256);
    assert!(bytes.contains(&0));
    assert!(bytes.contains(&255));

    // Quantization is order-preserving.
    let mut pairs: Vec<(u32, u8)> =
        mask.ranks().iter().copied().zip(bytes).collect();
    pairs.sort_unstable_by_key(|&(rank, _)| rank);
    for window in pairs.windows(2) {
        assert!(window[0].1 <= window[1].1);
    }
}

#[test]
fn float_output_is_normalized() {
    let mask = mask(8, 3);
    let floats = mask.to_float();
    assert!(floats.iter().all(|&v| (0.0..=1.0).contains(&v)));
    assert!(floats.contains(&0.0));
    assert!(floats.contains(&1.0));
}

#[test]
fn low_ranks_are_spread_out() {
    // The defining property of blue noise: early-threshold pixels are
    // well separated. Check that no two of the first N pixels are
    // directly adjacent (toroidally) on a grid with room to spare.
    let width = 32;
    let mask = mask(width, 5);
    let first: Vec<(usize, usize)> = (0..width)
        .flat_map(|y| (0..width).map(move |x| (x, y)))
        .filter(|&(x, y)| (mask.rank(x, y) as usize) < width)
        .collect();
    assert_eq!(first.len(), width);

    for (i, &(ax, ay)) in first.iter().enumerate() {
        for &(bx, by) in &first[i + 1..] {
            let dx = ax.abs_diff(bx).min(width - ax.abs_diff(bx));
            let dy = ay.abs_diff(by).min(width - ay.abs_diff(by));
            assert!(
                dx + dy > 1,
                "ranks 0..{width} contain adjacent pixels ({ax}, {ay}) and ({bx}, {by})"
            );
        }
    }
}

#[test]
fn degenerate_widths_are_rejected() {
    let mut rng = SmallRng::seed_from_u64(0);
    assert_eq!(
        generate_mask(0, &mut rng),
        Err(MaskError::InvalidGridSize(0))
    );
    assert_eq!(
        generate_mask(1, &mut rng),
        Err(MaskError::InvalidGridSize(1))
    );
}
