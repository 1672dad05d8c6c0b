//! A minimal in-memory host model used only by the integration tests, so
//! the arrange/fill-bed/multiply-selection tasks can be exercised through
//! their real `ArrangeableHost` boundary instead of the engine's internal
//! `Item` type directly.

use nfp_arrange_core::converter::{Arrangeable, ArrangeableHost};
use nfp_arrange_core::data_store::DataStore;
use nfp_arrange_core::geometry::{to_scaled, ExPolygon, Point, Polygon};

#[derive(Clone)]
pub struct FakeObject {
    pub id: u64,
    pub geometry_id: u64,
    pub outline: ExPolygon,
    pub side_mm: f64,
    pub printable: bool,
    pub selected: bool,
    pub priority: i32,
    pub bed_index: i32,
    pub bed_constraint: Option<i32>,
    pub translation: Point,
    pub rotation: f64,
    pub request_tag: Option<u64>,
}

impl FakeObject {
    pub fn square(id: u64, side_mm: f64) -> Self {
        let s = to_scaled(side_mm);
        let outline = ExPolygon::from_contour(Polygon::new(vec![
            Point::new(0, 0),
            Point::new(s, 0),
            Point::new(s, s),
            Point::new(0, s),
        ]));
        Self {
            id,
            geometry_id: id,
            outline,
            side_mm,
            printable: true,
            selected: true,
            priority: 0,
            bed_index: -1,
            bed_constraint: None,
            translation: Point::new(0, 0),
            rotation: 0.0,
            request_tag: None,
        }
    }
}

impl Arrangeable for FakeObject {
    fn id(&self) -> u64 {
        self.id
    }
    fn geometry_id(&self) -> u64 {
        self.geometry_id
    }
    fn full_outline(&self) -> ExPolygon {
        self.outline.clone()
    }
    fn convex_outline(&self) -> Polygon {
        self.outline.contour.convex_hull()
    }
    fn is_printable(&self) -> bool {
        self.printable
    }
    fn is_selected(&self) -> bool {
        self.selected
    }
    fn priority(&self) -> i32 {
        self.priority
    }
    fn get_bed_index(&self) -> i32 {
        self.bed_index
    }
    fn bed_constraint(&self) -> Option<i32> {
        self.bed_constraint
    }
    fn imbue_data(&self, _store: &mut DataStore) {}
    fn transform(&mut self, translation: Point, rotation: f64) {
        self.translation = translation;
        self.rotation = rotation;
    }
    fn assign_bed(&mut self, bed_index: i32) -> bool {
        self.bed_index = bed_index;
        true
    }
    fn request_tag(&self) -> Option<u64> {
        self.request_tag
    }
    fn set_request_tag(&mut self, tag: u64) {
        self.request_tag = Some(tag);
    }
}

#[derive(Default)]
pub struct FakeHost {
    pub objects: Vec<FakeObject>,
    next_id: u64,
}

impl FakeHost {
    pub fn new(objects: Vec<FakeObject>) -> Self {
        let next_id = objects.iter().map(|o| o.id).max().map_or(0, |m| m + 1);
        Self { objects, next_id }
    }
}

impl ArrangeableHost for FakeHost {
    fn for_each(&self, visit: &mut dyn FnMut(&dyn Arrangeable)) {
        for object in &self.objects {
            visit(object);
        }
    }

    fn visit(&self, id: u64) -> Option<&dyn Arrangeable> {
        self.objects
            .iter()
            .find(|o| o.id == id)
            .map(|o| o as &dyn Arrangeable)
    }

    fn visit_mut(&mut self, id: u64) -> Option<&mut dyn Arrangeable> {
        self.objects
            .iter_mut()
            .find(|o| o.id == id)
            .map(|o| o as &mut dyn Arrangeable)
    }

    fn add(&mut self, prototype_id: u64) -> Option<u64> {
        let prototype = self.objects.iter().find(|o| o.id == prototype_id)?.clone();
        let new_id = self.next_id;
        self.next_id += 1;
        let mut copy = prototype;
        copy.id = new_id;
        copy.bed_index = -1;
        copy.request_tag = None;
        self.objects.push(copy);
        Some(new_id)
    }
}
