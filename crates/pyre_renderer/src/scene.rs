//! A renderable scene: world geometry behind a BVH, a camera and a background.

use crate::integrator::ray_color;
use crate::{Background, BvhNode, Camera, HittableList, RenderResult};
use pyre_math::{Color, Ray};
use rand::RngCore;

/// Everything a render worker reads. Built once, then shared immutably.
pub struct Scene {
    world: BvhNode,
    camera: Camera,
    background: Background,
}

impl Scene {
    /// Wrap `objects` in a BVH over the camera's shutter interval and
    /// initialize the camera.
    pub fn build(
        objects: HittableList,
        mut camera: Camera,
        background: Background,
        rng: &mut dyn RngCore,
    ) -> RenderResult<Self> {
        let count = objects.len();
        let (time0, time1) = camera.shutter();
        let world = BvhNode::new(objects.into_objects(), time0, time1, rng)?;
        camera.initialize();

        log::info!(
            "Built scene: {} top-level objects, bounds {:?}",
            count,
            world.bbox()
        );

        Ok(Self {
            world,
            camera,
            background,
        })
    }

    pub fn world(&self) -> &BvhNode {
        &self.world
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn background(&self) -> &Background {
        &self.background
    }

    /// Estimate the radiance along `ray` with at most `max_depth` bounces.
    pub fn trace(&self, ray: &Ray, max_depth: u32, rng: &mut dyn RngCore) -> Color {
        ray_color(ray, &self.world, &self.background, max_depth, rng)
    }
}
