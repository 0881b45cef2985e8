use criterion::{black_box, criterion_group, criterion_main, Criterion};
use opencv::{
    core::{Mat, Rect, Scalar, CV_8UC3},
    imgproc::{rectangle, LINE_8},
};
use sketch_sorter::{ExtractionConfig, RoiExtractor};

fn sketch_sheet() -> Mat {
    let mut page =
        Mat::new_rows_cols_with_default(1000, 2000, CV_8UC3, Scalar::all(255.0)).unwrap();
    for row in 0..3 {
        for col in 0..4 {
            let rect = Rect::new(850 + col * 280, 60 + row * 300, 220, 220);
            rectangle(&mut page, rect, Scalar::all(0.0), 3, LINE_8, 0).unwrap();
        }
    }
    page
}

fn benchmark_roi_extraction(c: &mut Criterion) {
    let page = sketch_sheet();

    let sketch = RoiExtractor::new(ExtractionConfig::sketch());
    c.bench_function("sketch_contours", |b| {
        b.iter(|| {
            let region = sketch.working_region(black_box(&page)).unwrap();
            let contours = sketch.find_contours(&region).unwrap();
            sketch.select_regions(&contours).unwrap()
        })
    });

    let objects = RoiExtractor::new(ExtractionConfig::object_detection());
    c.bench_function("object_contours", |b| {
        b.iter(|| {
            let contours = objects.find_contours(black_box(&page)).unwrap();
            objects.select_regions(&contours).unwrap()
        })
    });
}

criterion_group!(benches, benchmark_roi_extraction);
criterion_main!(benches);
