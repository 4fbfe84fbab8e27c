//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! A binary tree over shared primitives. Each split sorts its objects by
//! bounding-box minimum along a randomly chosen axis and halves the list at
//! the median, so expected build cost is O(n log n).

use std::cmp::Ordering;
use std::sync::Arc;

use crate::{HitRecord, Hittable, Primitive, RenderError, RenderResult};
use pyre_math::{Aabb, Interval, Ray};
use rand::{Rng, RngCore};

/// An object paired with its bounds over the build's time interval.
type Entry = (Aabb, Arc<Primitive>);

/// BVH node with two children, each a primitive or a subtree.
///
/// A node built over a single object points both children at it.
pub struct BvhNode {
    left: Arc<Primitive>,
    right: Arc<Primitive>,
    bbox: Aabb,
}

impl BvhNode {
    /// Build a BVH over `objects`, with bounds taken over `[time0, time1]`.
    ///
    /// Fails on an empty list or if any object has no bounding box.
    pub fn new(
        objects: Vec<Arc<Primitive>>,
        time0: f32,
        time1: f32,
        rng: &mut dyn RngCore,
    ) -> RenderResult<Self> {
        if objects.is_empty() {
            return Err(RenderError::EmptyBvh);
        }

        let mut entries = objects
            .into_iter()
            .map(|object| {
                object
                    .bounding_box(time0, time1)
                    .map(|bbox| (bbox, object))
                    .ok_or(RenderError::MissingBoundingBox)
            })
            .collect::<RenderResult<Vec<Entry>>>()?;

        Ok(Self::build(&mut entries, rng))
    }

    /// Recursive median split on a random axis.
    fn build(entries: &mut [Entry], rng: &mut dyn RngCore) -> Self {
        let axis = rng.gen_range(0..3);
        let by_axis_min = |a: &Entry, b: &Entry| {
            a.0.axis_interval(axis)
                .min
                .partial_cmp(&b.0.axis_interval(axis).min)
                .unwrap_or(Ordering::Equal)
        };

        let (left, right) = match entries {
            [only] => (only.clone(), only.clone()),
            [a, b] => {
                if by_axis_min(a, b) == Ordering::Greater {
                    (b.clone(), a.clone())
                } else {
                    (a.clone(), b.clone())
                }
            }
            _ => {
                entries.sort_unstable_by(by_axis_min);
                let mid = entries.len() / 2;
                let (lo, hi) = entries.split_at_mut(mid);
                (Self::subtree(lo, rng), Self::subtree(hi, rng))
            }
        };

        Self {
            bbox: Aabb::surrounding(&left.0, &right.0),
            left: left.1,
            right: right.1,
        }
    }

    fn subtree(entries: &mut [Entry], rng: &mut dyn RngCore) -> Entry {
        let node = Self::build(entries, rng);
        (node.bbox, Arc::new(Primitive::Bvh(node)))
    }

    pub fn bbox(&self) -> Aabb {
        self.bbox
    }
}

impl Hittable for BvhNode {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        if !self.bbox.hit(ray, ray_t) {
            return None;
        }

        let hit_left = self.left.hit(ray, ray_t, rng);

        // Only check right up to closest hit
        let right_t = hit_left.map_or(ray_t, |rec| ray_t.with_max(rec.t));
        let hit_right = self.right.hit(ray, right_t, rng);

        hit_right.or(hit_left)
    }

    fn bounding_box(&self, _time0: f32, _time1: f32) -> Option<Aabb> {
        Some(self.bbox)
    }
}
