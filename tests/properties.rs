mod common;

use common::{FakeHost, FakeObject};
use nfp_arrange_core::bed::Bed;
use nfp_arrange_core::cancellation::CancellationToken;
use nfp_arrange_core::geometry::{to_scaled, BoundingBox, Point};
use nfp_arrange_core::scene::Scene;
use nfp_arrange_core::settings::Settings;
use nfp_arrange_core::tasks::{arrange, multiply_selection};

fn rect_bed(width_mm: f64, height_mm: f64) -> Bed {
    Bed::Rectangle(BoundingBox::new(
        Point::new(0, 0),
        Point::new(to_scaled(width_mm), to_scaled(height_mm)),
    ))
}

fn bbox_of(object: &FakeObject) -> BoundingBox {
    let side = to_scaled(object.side_mm);
    BoundingBox::new(
        object.translation,
        Point::new(object.translation.x + side, object.translation.y + side),
    )
}

/// Placed items on the same bed never overlap (checked by an inward 1-unit
/// shrink, which tolerates the NFP's exact edge-touching placements without
/// flagging them as a collision).
#[test]
fn collision_freeness_within_a_bed() {
    let objects: Vec<FakeObject> = (0..12).map(|i| FakeObject::square(i, 15.0)).collect();
    let mut host = FakeHost::new(objects);
    let scene = Scene::new(rect_bed(250.0, 210.0), Settings::default());
    let cancel = CancellationToken::new();
    let result = arrange::run(&mut host, &scene, &cancel, |_| {});
    assert!(result.apply_on(&mut host));

    let by_bed: std::collections::HashMap<i32, Vec<&FakeObject>> =
        host.objects.iter().fold(Default::default(), |mut acc, o| {
            acc.entry(o.bed_index).or_default().push(o);
            acc
        });

    for (bed_index, group) in by_bed {
        if bed_index < 0 {
            continue;
        }
        for i in 0..group.len() {
            for j in (i + 1)..group.len() {
                let a = bbox_of(group[i]);
                let shrunk = BoundingBox::new(
                    Point::new(a.min.x + 1, a.min.y + 1),
                    Point::new(a.max.x - 1, a.max.y - 1),
                );
                assert!(
                    !shrunk.intersects(&bbox_of(group[j])),
                    "items {} and {} overlap on bed {bed_index}",
                    group[i].id,
                    group[j].id
                );
            }
        }
    }
}

/// Every placed item's bounding box lies within the bed's bounding box.
#[test]
fn placed_items_stay_inside_the_bed() {
    let objects: Vec<FakeObject> = (0..8).map(|i| FakeObject::square(i, 20.0)).collect();
    let mut host = FakeHost::new(objects);
    let bed = rect_bed(250.0, 210.0);
    let bed_bb = bed.bounding_box();
    let scene = Scene::new(bed, Settings::default());
    let cancel = CancellationToken::new();
    let result = arrange::run(&mut host, &scene, &cancel, |_| {});
    assert!(result.apply_on(&mut host));

    for object in &host.objects {
        if object.bed_index != 0 {
            continue;
        }
        let bb = bbox_of(object);
        assert!(bb.min.x >= bed_bb.min.x - 1 && bb.max.x <= bed_bb.max.x + 1);
        assert!(bb.min.y >= bed_bb.min.y - 1 && bb.max.y <= bed_bb.max.y + 1);
    }
}

/// Running the same arrangement twice from the same initial state, with the
/// same seed, produces the same placements.
#[test]
fn arranging_is_deterministic_for_a_fixed_seed() {
    let make_host = || {
        let objects: Vec<FakeObject> = (0..9).map(|i| FakeObject::square(i, 18.0)).collect();
        FakeHost::new(objects)
    };
    let settings = Settings {
        seed: 42,
        ..Settings::default()
    };

    let mut host_a = make_host();
    let scene_a = Scene::new(rect_bed(250.0, 210.0), settings.clone());
    let cancel_a = CancellationToken::new();
    let result_a = arrange::run(&mut host_a, &scene_a, &cancel_a, |_| {});
    assert!(result_a.apply_on(&mut host_a));

    let mut host_b = make_host();
    let scene_b = Scene::new(rect_bed(250.0, 210.0), settings);
    let cancel_b = CancellationToken::new();
    let result_b = arrange::run(&mut host_b, &scene_b, &cancel_b, |_| {});
    assert!(result_b.apply_on(&mut host_b));

    for (a, b) in host_a.objects.iter().zip(host_b.objects.iter()) {
        assert_eq!(a.bed_index, b.bed_index);
        assert_eq!(a.translation, b.translation);
        assert!((a.rotation - b.rotation).abs() < 1e-9);
    }
}

/// Reapplying an already-applied placement result is a no-op: the host
/// state after the second `apply_on` matches the state after the first.
#[test]
fn reapplying_placements_is_idempotent() {
    let objects: Vec<FakeObject> = (0..5).map(|i| FakeObject::square(i, 20.0)).collect();
    let mut host = FakeHost::new(objects);
    let scene = Scene::new(rect_bed(250.0, 210.0), Settings::default());
    let cancel = CancellationToken::new();
    let result = arrange::run(&mut host, &scene, &cancel, |_| {});
    assert!(result.apply_on(&mut host));

    let after_first: Vec<(i32, Point, f64)> = host
        .objects
        .iter()
        .map(|o| (o.bed_index, o.translation, o.rotation))
        .collect();

    assert!(result.apply_on(&mut host));
    let after_second: Vec<(i32, Point, f64)> = host
        .objects
        .iter()
        .map(|o| (o.bed_index, o.translation, o.rotation))
        .collect();

    assert_eq!(after_first, after_second);
}

/// Reapplying a `new_item_requests`-bearing result (on a host that
/// implements request tagging) does not create a second batch of copies.
#[test]
fn reapplying_new_item_requests_is_idempotent() {
    let mut host = FakeHost::new(vec![FakeObject::square(0, 20.0)]);
    let scene = Scene::new(rect_bed(250.0, 210.0), Settings::default());
    let cancel = CancellationToken::new();
    let result = multiply_selection::run(&mut host, &scene, 3, &cancel, |_| {});
    assert!(result.apply_on(&mut host));
    let count_after_first = host.objects.len();

    assert!(result.apply_on(&mut host));
    assert_eq!(host.objects.len(), count_after_first);
}

/// An item with an explicit bed constraint never lands on any other bed,
/// even if that means it stays unarranged.
#[test]
fn bed_constraint_is_always_respected() {
    let mut constrained = FakeObject::square(0, 20.0);
    constrained.bed_constraint = Some(3);
    let mut host = FakeHost::new(vec![constrained]);
    let scene = Scene::new(rect_bed(250.0, 210.0), Settings::default());
    let cancel = CancellationToken::new();
    let result = arrange::run(&mut host, &scene, &cancel, |_| {});
    assert!(result.apply_on(&mut host));

    assert!(host.objects[0].bed_index == 3 || host.objects[0].bed_index == -1);
}

/// Higher-priority items are never pushed to a later bed than a
/// lower-priority item when both would otherwise compete for the same
/// limited space.
#[test]
fn higher_priority_items_are_not_disadvantaged() {
    // A bed that can only fit one 100mm square at a time.
    let bed = rect_bed(110.0, 110.0);
    let mut low = FakeObject::square(0, 100.0);
    low.priority = 0;
    let mut high = FakeObject::square(1, 100.0);
    high.priority = 10;

    let mut host = FakeHost::new(vec![low, high]);
    let scene = Scene::new(bed, Settings::default());
    let cancel = CancellationToken::new();
    let result = arrange::run(&mut host, &scene, &cancel, |_| {});
    assert!(result.apply_on(&mut host));

    let high_bed = host.objects[1].bed_index;
    let low_bed = host.objects[0].bed_index;
    // The high-priority item is placed first, so it claims the earliest
    // available bed; the low-priority item cannot claim an earlier one.
    assert!(high_bed <= low_bed || low_bed == -1);
}
