mod common;

use common::{FakeHost, FakeObject};
use nfp_arrange_core::bed::{Bed, SegmentedRectangle, XlAlignment};
use nfp_arrange_core::cancellation::CancellationToken;
use nfp_arrange_core::geometry::{to_mm, to_scaled, BoundingBox, Point};
use nfp_arrange_core::scene::Scene;
use nfp_arrange_core::segmented_alignment;
use nfp_arrange_core::settings::Settings;
use nfp_arrange_core::tasks::{arrange, fill_bed, multiply_selection};

fn rect_bed(width_mm: f64, height_mm: f64) -> Bed {
    Bed::Rectangle(BoundingBox::new(
        Point::new(0, 0),
        Point::new(to_scaled(width_mm), to_scaled(height_mm)),
    ))
}

fn disjoint_after_inward_offset(boxes: &[BoundingBox], epsilon: i64) -> bool {
    for i in 0..boxes.len() {
        for j in (i + 1)..boxes.len() {
            let a = BoundingBox::new(
                Point::new(boxes[i].min.x + epsilon, boxes[i].min.y + epsilon),
                Point::new(boxes[i].max.x - epsilon, boxes[i].max.y - epsilon),
            );
            if a.intersects(&boxes[j]) {
                return false;
            }
        }
    }
    true
}

/// S1 — Single 20mm cube on a 250x210mm rectangle.
#[test]
fn s1_single_cube_lands_on_bed_zero() {
    let mut host = FakeHost::new(vec![FakeObject::square(0, 20.0)]);
    let scene = Scene::new(rect_bed(250.0, 210.0), Settings::default());
    let cancel = CancellationToken::new();
    let result = arrange::run(&mut host, &scene, &cancel, |_| {});
    assert!(result.apply_on(&mut host));

    assert_eq!(host.objects.len(), 1);
    assert_eq!(host.objects[0].bed_index, 0);
}

/// S2 — Ten 20mm cubes on 250x210mm: all placed on bed 0, pairwise
/// non-overlapping after an inward 1-unit offset.
#[test]
fn s2_ten_cubes_all_fit_bed_zero_without_overlap() {
    let objects: Vec<FakeObject> = (0..10).map(|i| FakeObject::square(i, 20.0)).collect();
    let mut host = FakeHost::new(objects);
    let scene = Scene::new(rect_bed(250.0, 210.0), Settings::default());
    let cancel = CancellationToken::new();
    let result = arrange::run(&mut host, &scene, &cancel, |_| {});
    assert!(result.apply_on(&mut host));

    assert!(host.objects.iter().all(|o| o.bed_index == 0));

    let boxes: Vec<BoundingBox> = host
        .objects
        .iter()
        .map(|o| {
            let side = to_scaled(20.0);
            BoundingBox::new(o.translation, Point::new(o.translation.x + side, o.translation.y + side))
        })
        .collect();
    assert!(disjoint_after_inward_offset(&boxes, 1));
}

/// S3 — Fill a 100x100mm bed with 10mm cubes, zero clearance: exactly 100
/// land on bed 0, pairwise disjoint.
#[test]
fn s3_fill_bed_places_exactly_the_area_quotient() {
    let mut host = FakeHost::new(vec![FakeObject::square(0, 10.0)]);
    let settings = Settings {
        distance_from_objects: 0.0,
        ..Settings::default()
    };
    let scene = Scene::new(rect_bed(100.0, 100.0), settings);
    let cancel = CancellationToken::new();
    let result = fill_bed::run(&mut host, &scene, &cancel, |_| {});
    assert!(result.apply_on(&mut host));

    let on_bed_zero: Vec<&FakeObject> = host.objects.iter().filter(|o| o.bed_index == 0).collect();
    assert_eq!(on_bed_zero.len(), 100);

    let boxes: Vec<BoundingBox> = on_bed_zero
        .iter()
        .map(|o| {
            let side = to_scaled(10.0);
            BoundingBox::new(o.translation, Point::new(o.translation.x + side, o.translation.y + side))
        })
        .collect();
    assert!(disjoint_after_inward_offset(&boxes, 1));
}

/// S4 — Three pre-arranged primitives plus one oversize cube on
/// 250x210mm: the three keep bed 0, the oversize one overflows to bed 1.
#[test]
fn s4_oversize_item_overflows_while_pre_arranged_items_stay_put() {
    let mut small_a = FakeObject::square(0, 20.0);
    small_a.bed_index = 0;
    small_a.translation = Point::new(0, 0);
    let mut small_b = FakeObject::square(1, 20.0);
    small_b.bed_index = 0;
    small_b.translation = Point::new(to_scaled(30.0), 0);
    let mut small_c = FakeObject::square(2, 20.0);
    small_c.bed_index = 0;
    small_c.translation = Point::new(0, to_scaled(30.0));
    // None of these three are selected: they are fixed obstacles already
    // placed on bed 0.
    small_a.selected = false;
    small_b.selected = false;
    small_c.selected = false;

    // An oversize cube that cannot coexist with the three on a 250x210mm
    // bed alongside them.
    let big = FakeObject::square(3, 240.0);

    let mut host = FakeHost::new(vec![small_a, small_b, small_c, big]);
    let scene = Scene::new(rect_bed(250.0, 210.0), Settings::default());
    let cancel = CancellationToken::new();
    let result = arrange::run(&mut host, &scene, &cancel, |_| {});
    assert!(result.apply_on(&mut host));

    assert_eq!(host.objects[0].bed_index, 0);
    assert_eq!(host.objects[1].bed_index, 0);
    assert_eq!(host.objects[2].bed_index, 0);
    assert!(host.objects[3].bed_index >= 1);
}

/// S5 — Multiply the selection by k: total count is (k+1)*initial, every
/// new item lands on a finite (non-negative) bed index.
#[test]
fn s5_multiply_selection_adds_k_copies_all_placed() {
    let mut host = FakeHost::new(vec![FakeObject::square(0, 10.0)]);
    let initial_count = host.objects.len();
    let k = 5usize;
    let scene = Scene::new(rect_bed(250.0, 210.0), Settings::default());
    let cancel = CancellationToken::new();
    let result = multiply_selection::run(&mut host, &scene, k, &cancel, |_| {});
    assert!(result.apply_on(&mut host));

    assert_eq!(host.objects.len(), (k + 1) * initial_count);
    assert!(host.objects.iter().all(|o| o.bed_index >= 0));
}

/// S6 — Segmented bed alignment: a pile smaller than one cell ends up
/// contained in the bottom-left (front-left) cell after post-processing.
#[test]
fn s6_segmented_bed_pile_aligns_to_front_left_cell() {
    let seg = SegmentedRectangle {
        bb: BoundingBox::new(Point::new(0, 0), Point::new(to_scaled(40.0), to_scaled(40.0))),
        segments_x: 4,
        segments_y: 4,
        pivot: XlAlignment::FrontLeft,
    };
    let mut host = FakeHost::new(vec![FakeObject::square(0, 5.0)]);
    let scene = Scene::new(Bed::Segmented(seg), Settings::default());
    let cancel = CancellationToken::new();
    let result = arrange::run(&mut host, &scene, &cancel, |_| {});
    assert!(result.apply_on(&mut host));

    let side = to_scaled(5.0);
    let mut items = vec![{
        let mut item = nfp_arrange_core::item::Item::new(nfp_arrange_core::item::Shape::new(
            nfp_arrange_core::geometry::ExPolygon::from_contour(nfp_arrange_core::geometry::Polygon::new(vec![
                Point::new(0, 0),
                Point::new(side, 0),
                Point::new(side, side),
                Point::new(0, side),
            ])),
            vec![],
        ));
        item.bed_index = host.objects[0].bed_index;
        item.set_translation(host.objects[0].translation);
        item
    }];
    segmented_alignment::align_bed(&seg, host.objects[0].bed_index, &mut items, 0);

    let cell_w = to_mm(seg.cell_width());
    let cell_h = to_mm(seg.cell_height());
    let bb = items[0].transformed_bbox().unwrap();
    assert!(to_mm(bb.min.x) >= -1e-6 && to_mm(bb.max.x) <= cell_w + 1e-6);
    assert!(to_mm(bb.min.y) >= -1e-6 && to_mm(bb.max.y) <= cell_h + 1e-6);
}
