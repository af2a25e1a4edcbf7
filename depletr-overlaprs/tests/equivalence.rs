use std::sync::Arc;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rstest::*;

use depletr_core::models::{IntervalStore, RawInterval};
use depletr_overlaprs::{BruteForceOverlapper, ReadOverlapper, SweepCursor, SweepIndex};

const CHROMS: [&str; 4] = ["chr1", "chr2", "chr3", "chrX"];

fn random_features(rng: &mut StdRng, n: usize) -> IntervalStore {
    let mut raw = Vec::with_capacity(n + 2);
    for i in 0..n {
        let chr = CHROMS[rng.random_range(0..CHROMS.len())];
        let start = rng.random_range(0..50_000i64);
        let len = rng.random_range(1..3_000i64);
        raw.push(RawInterval::new(chr, start, start + len, &format!("f{}", i)));
    }
    // a couple of intervals that swallow many others
    raw.push(RawInterval::new("chr1", 100, 40_000, "wide1"));
    raw.push(RawInterval::new("chr3", 20_000, 45_000, "wide3"));
    IntervalStore::build(raw).store
}

fn random_reads(rng: &mut StdRng, n: usize) -> Vec<(usize, u32, u32)> {
    let mut reads: Vec<(usize, u32, u32)> = (0..n)
        .map(|_| {
            let chr = rng.random_range(0..CHROMS.len() + 1);
            let start = rng.random_range(0..55_000u32);
            let len = rng.random_range(20..400u32);
            (chr, start, start + len)
        })
        .collect();
    reads.sort();
    reads
}

fn chrom_name(idx: usize) -> &'static str {
    // the extra index maps to a chromosome without features
    CHROMS.get(idx).copied().unwrap_or("chrUn")
}

fn answers<'a, O: ReadOverlapper<'a>>(
    overlapper: &mut O,
    reads: &[(usize, u32, u32)],
) -> Vec<(bool, Vec<String>)> {
    reads
        .iter()
        .map(|&(chr, s, e)| {
            let name = chrom_name(chr);
            let hit = overlapper.overlaps(name, s, e);
            let names = overlapper
                .overlapping(name, s, e)
                .iter()
                .map(|iv| iv.name().to_string())
                .collect();
            (hit, names)
        })
        .collect()
}

#[rstest]
#[case(7)]
#[case(42)]
#[case(1234)]
fn sweep_matches_brute_force_sorted(#[case] seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    let store = random_features(&mut rng, 150);
    let reads = random_reads(&mut rng, 2_000);

    let index = SweepIndex::new(&store);
    let mut sweep = SweepCursor::new(&index);
    let mut brute = BruteForceOverlapper::new(&store);

    let got = answers(&mut sweep, &reads);
    let expected = answers(&mut brute, &reads);
    assert_eq!(got, expected);

    // the data should exercise both outcomes
    assert!(got.iter().any(|(hit, _)| *hit));
    assert!(got.iter().any(|(hit, _)| !*hit));
}

#[rstest]
fn sweep_matches_brute_force_unsorted() {
    let mut rng = StdRng::seed_from_u64(99);
    let store = random_features(&mut rng, 120);
    let mut reads = random_reads(&mut rng, 1_500);
    reads.shuffle(&mut rng);

    let index = SweepIndex::new(&store);
    let mut sweep = SweepCursor::new(&index);
    let mut brute = BruteForceOverlapper::new(&store);

    assert_eq!(answers(&mut sweep, &reads), answers(&mut brute, &reads));
}

fn sweep_and_brute_work(seed: u64, reads: usize, features: usize) -> (u64, u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    let store = random_features(&mut rng, features);
    let reads = random_reads(&mut rng, reads);

    let index = SweepIndex::new(&store);
    let mut sweep = SweepCursor::new(&index);
    let mut brute = BruteForceOverlapper::new(&store);
    for &(chr, s, e) in reads.iter() {
        let a = sweep.overlaps(chrom_name(chr), s, e);
        let b = brute.overlaps(chrom_name(chr), s, e);
        assert_eq!(a, b);
    }
    (sweep.work().total(), brute.work().total())
}

#[rstest]
fn sweep_work_is_subquadratic() {
    let (sweep_small, brute_small) = sweep_and_brute_work(5, 1_000, 100);
    let (sweep_large, brute_large) = sweep_and_brute_work(5, 4_000, 400);

    // a sorted stream costs about one comparison per read plus one step per feature
    assert!(sweep_small <= 2 * (1_000 + 102) + 64);
    assert!(sweep_large <= 2 * (4_000 + 402) + 64);

    // 4x the input: linear work grows ~4x, the all-pairs reference grows 16x
    assert!(sweep_large < 6 * sweep_small);
    assert!(brute_large > 15 * brute_small);
    assert!(sweep_large * 50 < brute_large);
}
