use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use nfp_arrange_core::prelude::*;
use nfp_arrange_core::decompose;
use nfp_arrange_core::kernel::GravityKernel;
use nfp_arrange_core::selection;

fn square_item(side_mm: f64) -> Item {
    let s = to_scaled(side_mm);
    let poly = Polygon::new(vec![
        Point::new(0, 0),
        Point::new(s, 0),
        Point::new(s, s),
        Point::new(0, s),
    ]);
    let parts = decompose::decompose(&ExPolygon::from_contour(poly.clone()), 1).unwrap();
    Item::new(Shape::new(ExPolygon::from_contour(poly), parts))
}

fn bench_first_fit_packing(c: &mut Criterion) {
    let mut group = c.benchmark_group("first_fit_packing");

    for count in [10usize, 50, 150] {
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("20mm_cubes_on_a4_bed", count), &count, |b, &count| {
            b.iter(|| {
                let bed = Bed::Rectangle(BoundingBox::new(
                    Point::new(0, 0),
                    Point::new(to_scaled(600.0), to_scaled(600.0)),
                ));
                let settings = Settings::default();
                let cancel = CancellationToken::new();
                let items: Vec<Item> = (0..count).map(|_| square_item(20.0)).collect();
                let result = selection::run(
                    items,
                    vec![],
                    &bed,
                    &settings,
                    &cancel,
                    || Box::new(GravityKernel::new()),
                    |_| {},
                );
                black_box(result)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_first_fit_packing);
criterion_main!(benches);
