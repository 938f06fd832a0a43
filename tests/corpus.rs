//! Test corpus: every filter over various patterns, sizes and dispatch settings.

mod common;

use std::num::NonZeroUsize;

use common::{BmpBuilder, checkerboard, noise_pattern};
use enough::Unstoppable;
use parbmp::*;

const SIZES: [(usize, usize); 7] = [(1, 1), (1, 7), (7, 1), (2, 2), (5, 3), (16, 9), (33, 17)];

fn filters() -> [Filter; 5] {
    [
        Filter::brightness_contrast(0.0, 1.0),
        Filter::brightness_contrast(-35.5, 1.7),
        Filter::Sepia,
        Filter::median(),
        Filter::Median { window: 5 },
    ]
}

fn decoded(w: usize, h: usize, bpp: u16, pattern: fn(usize, usize, usize) -> Vec<u8>) -> Image {
    let packed = pattern(w, h, usize::from(bpp / 8));
    decode_bmp(&BmpBuilder::new(w, h as i32, bpp).build(&packed), Unstoppable).unwrap()
}

fn options(rows_per_task: usize, wait: WaitMode, strategy: Strategy) -> DispatchOptions {
    DispatchOptions {
        rows_per_task: NonZeroUsize::new(rows_per_task).unwrap(),
        wait,
        strategy,
    }
}

// ── Parallel equals sequential ───────────────────────────────────────

#[test]
fn dispatch_matches_sequential_everywhere() {
    let pool = WorkerPool::new(4).unwrap();
    for &(w, h) in &SIZES {
        for pattern in [checkerboard as fn(usize, usize, usize) -> Vec<u8>, noise_pattern] {
            let source = decoded(w, h, 24, pattern);
            for filter in filters() {
                let mut expected = source.pixels().clone();
                filter.apply(&mut expected, Strategy::Scalar).unwrap();

                for rows_per_task in [1, 2, 3, 64] {
                    for wait in [WaitMode::Spin, WaitMode::Block] {
                        let mut actual = source.pixels().clone();
                        let report = dispatch(
                            &pool,
                            &mut actual,
                            &filter,
                            &options(rows_per_task, wait, Strategy::Scalar),
                        )
                        .unwrap();
                        assert_eq!(report.rows, h);
                        assert_eq!(report.tasks, h.div_ceil(rows_per_task));
                        assert_eq!(
                            actual,
                            expected,
                            "{} on {w}x{h}, {rows_per_task} rows/task, {wait:?}",
                            filter.name()
                        );
                    }
                }
            }
        }
    }
}

#[test]
fn single_worker_pool_handles_many_tasks() {
    let pool = WorkerPool::new(1).unwrap();
    let mut image = decoded(64, 64, 32, noise_pattern);
    let mut expected = image.pixels().clone();
    Filter::Sepia.apply(&mut expected, Strategy::Scalar).unwrap();
    let report = dispatch(
        &pool,
        image.pixels_mut(),
        &Filter::Sepia,
        &DispatchOptions::default(),
    )
    .unwrap();
    assert_eq!(report.tasks, 64);
    assert_eq!(image.pixels(), &expected);
}

#[test]
fn pool_is_reusable_across_dispatches() {
    let pool = WorkerPool::new(3).unwrap();
    let mut image = decoded(10, 10, 24, checkerboard);
    let mut expected = image.pixels().clone();
    for _ in 0..20 {
        Filter::brightness_contrast(3.0, 1.0)
            .apply(&mut expected, Strategy::Scalar)
            .unwrap();
        dispatch(
            &pool,
            image.pixels_mut(),
            &Filter::brightness_contrast(3.0, 1.0),
            &options(4, WaitMode::Block, Strategy::Scalar),
        )
        .unwrap();
    }
    assert_eq!(image.pixels(), &expected);
}

#[test]
fn concurrent_dispatchers_share_one_pool() {
    let pool = WorkerPool::new(4).unwrap();
    std::thread::scope(|s| {
        for i in 0..4 {
            let pool = &pool;
            s.spawn(move || {
                let mut image = decoded(20 + i, 15, 24, noise_pattern);
                let mut expected = image.pixels().clone();
                Filter::median().apply(&mut expected, Strategy::Scalar).unwrap();
                dispatch(
                    pool,
                    image.pixels_mut(),
                    &Filter::median(),
                    &options(2, WaitMode::Block, Strategy::Scalar),
                )
                .unwrap();
                assert_eq!(image.pixels(), &expected);
            });
        }
    });
}

// ── Codec + filter ───────────────────────────────────────────────────

#[test]
fn filtered_images_roundtrip_through_the_codec() {
    let pool = WorkerPool::new(2).unwrap();
    for bpp in [24u16, 32] {
        for filter in filters() {
            let mut image = decoded(9, 6, bpp, noise_pattern);
            dispatch(&pool, image.pixels_mut(), &filter, &DispatchOptions::default()).unwrap();
            let bytes = encode_bmp(&image, Unstoppable).unwrap();
            let back = decode_bmp(&bytes, Unstoppable).unwrap();
            assert_eq!(back.pixels(), image.pixels(), "{} @ {bpp}", filter.name());
        }
    }
}

#[test]
fn alpha_is_preserved_by_point_filters() {
    let pool = WorkerPool::new(2).unwrap();
    let source = decoded(8, 8, 32, noise_pattern);
    for filter in [Filter::brightness_contrast(40.0, 0.5), Filter::Sepia] {
        let mut pixels = source.pixels().clone();
        dispatch(&pool, &mut pixels, &filter, &DispatchOptions::default()).unwrap();
        for y in 0..8 {
            let before = source.pixels().row_pixels(y).iter().map(|p| p.a);
            let after = pixels.row_pixels(y).iter().map(|p| p.a);
            assert!(before.eq(after), "{} row {y}", filter.name());
        }
    }
}

// ── Vector strategy ──────────────────────────────────────────────────

#[cfg(feature = "simd")]
#[test]
fn wide_matches_scalar_within_one() {
    let pool = WorkerPool::new(2).unwrap();
    for &(w, h) in &SIZES {
        let source = decoded(w, h, 32, noise_pattern);
        for filter in filters() {
            let mut scalar = source.pixels().clone();
            filter.apply(&mut scalar, Strategy::Scalar).unwrap();

            let mut wide = source.pixels().clone();
            dispatch(
                &pool,
                &mut wide,
                &filter,
                &options(2, WaitMode::Spin, Strategy::Wide),
            )
            .unwrap();

            for (a, b) in scalar.as_bytes().iter().zip(wide.as_bytes()) {
                assert!(
                    a.abs_diff(*b) <= 1,
                    "{} on {w}x{h}: scalar {a} vs wide {b}",
                    filter.name()
                );
            }
        }
    }
}
