//! File-to-file processing.

mod common;

use std::fs;

use common::{BmpBuilder, checkerboard, noise_pattern};
use enough::Unstoppable;
use parbmp::*;

fn processor() -> Processor {
    Processor::new(ProcessorConfig::default().with_threads(3).with_rows_per_task(2)).unwrap()
}

#[test]
fn processes_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("in.bmp");
    let destination = dir.path().join("out.bmp");
    let data = BmpBuilder::new(11, 7, 24).build(&noise_pattern(11, 7, 3));
    fs::write(&source, &data).unwrap();

    let report = processor()
        .process_file(&source, &destination, &Filter::Sepia)
        .unwrap();
    assert_eq!(report.rows, 7);
    assert_eq!(report.tasks, 4);

    let mut expected = decode_bmp(&data, Unstoppable).unwrap();
    Filter::Sepia
        .apply(expected.pixels_mut(), Strategy::Scalar)
        .unwrap();
    let written = fs::read(&destination).unwrap();
    assert_eq!(written, encode_bmp(&expected, Unstoppable).unwrap());
}

#[test]
fn every_filter_and_wait_mode() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("in.bmp");
    fs::write(
        &source,
        BmpBuilder::new(6, -6, 32).build(&checkerboard(6, 6, 4)),
    )
    .unwrap();

    for wait in [WaitMode::Spin, WaitMode::Block] {
        let processor = Processor::new(ProcessorConfig::default().with_threads(2).with_wait(wait)).unwrap();
        for filter in [
            Filter::brightness_contrast(-10.0, 2.0),
            Filter::Sepia,
            Filter::median(),
        ] {
            let destination = dir.path().join(format!("{}-{wait:?}.bmp", filter.name()));
            processor
                .process_file(&source, &destination, &filter)
                .unwrap();
            let out = decode_bmp(&fs::read(&destination).unwrap(), Unstoppable).unwrap();
            assert_eq!((out.width(), out.height()), (6, 6));
            assert_eq!(out.orientation(), Orientation::TopDown);
        }
    }
}

#[test]
fn missing_source_is_an_open_error() {
    let dir = tempfile::tempdir().unwrap();
    let destination = dir.path().join("out.bmp");
    let err = processor()
        .process_file(&dir.path().join("nope.bmp"), &destination, &Filter::Sepia)
        .unwrap_err();
    assert!(matches!(err, ProcessError::Open { .. }), "{err}");
    assert!(!destination.exists());
}

#[test]
fn corrupt_source_leaves_no_destination() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("in.bmp");
    let destination = dir.path().join("out.bmp");
    fs::write(&source, b"BM not really a bitmap").unwrap();

    let err = processor()
        .process_file(&source, &destination, &Filter::Sepia)
        .unwrap_err();
    assert!(matches!(
        err,
        ProcessError::Bitmap {
            source: BitmapError::ShortRead { .. },
            ..
        }
    ));
    assert!(!destination.exists());
}

#[test]
fn unsupported_depth_is_reported_with_the_path() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("sixteen.bmp");
    fs::write(&source, BmpBuilder::new(2, 2, 16).build(&[0; 8])).unwrap();

    let err = processor()
        .process_file(&source, &dir.path().join("out.bmp"), &Filter::Sepia)
        .unwrap_err();
    assert!(err.to_string().contains("sixteen.bmp"));
    assert!(matches!(
        err,
        ProcessError::Bitmap {
            source: BitmapError::UnsupportedColorDepth { bits_per_pixel: 16 },
            ..
        }
    ));
}

#[test]
fn invalid_parameters_fail_before_reading() {
    let dir = tempfile::tempdir().unwrap();
    let destination = dir.path().join("out.bmp");
    let err = processor()
        .process_file(
            &dir.path().join("nope.bmp"),
            &destination,
            &Filter::Median { window: 2 },
        )
        .unwrap_err();
    assert!(matches!(
        err,
        ProcessError::Filter(FilterError::InvalidParameter(_))
    ));
}

#[test]
fn unwritable_destination_is_a_create_error() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("in.bmp");
    fs::write(&source, BmpBuilder::new(2, 2, 24).build(&[0; 12])).unwrap();

    let err = processor()
        .process_file(&source, &dir.path().join("missing/dir/out.bmp"), &Filter::Sepia)
        .unwrap_err();
    assert!(matches!(err, ProcessError::Create { .. }));
}

#[test]
fn limits_from_the_config_apply() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("in.bmp");
    fs::write(&source, BmpBuilder::new(8, 8, 24).build(&noise_pattern(8, 8, 3))).unwrap();

    let processor = Processor::new(
        ProcessorConfig::default()
            .with_threads(1)
            .with_limits(Limits {
                max_pixels: Some(16),
                ..Default::default()
            }),
    )
    .unwrap();
    let err = processor
        .process_file(&source, &dir.path().join("out.bmp"), &Filter::Sepia)
        .unwrap_err();
    assert!(matches!(
        err,
        ProcessError::Bitmap {
            source: BitmapError::LimitExceeded(_),
            ..
        }
    ));
}
