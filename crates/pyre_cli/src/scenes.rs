//! Built-in demo scenes.

use std::path::Path;
use std::sync::Arc;

use clap::ValueEnum;
use pyre_core::load_raster_or_empty;
use pyre_renderer::{
    AxisRect, Axis, Background, BvhNode, Camera, CheckerTexture, Color, ConstantMedium, Cuboid,
    Dielectric, DiffuseLight, HittableList, ImageTexture, Lambertian, Material, Metal,
    MovingSphere, NoiseTexture, Primitive, RenderResult, Rotate, Sphere, Texture, Translate, Vec3,
};
use rand::{Rng, RngCore};

/// Sky color for scenes that do not set their own.
const DEFAULT_BACKGROUND: Color = Color::new(0.7, 0.8, 1.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SceneName {
    /// Field of small random spheres around three large ones
    RandomSpheres,
    /// Two checkered spheres stacked vertically
    CheckerSpheres,
    /// Marble-textured sphere on a marble ground
    PerlinSpheres,
    /// Image-textured globe lit by a distant sun
    Earth,
    /// Textured sphere surrounded by colored area lights
    SimpleLight,
    /// Cornell box with two rotated boxes
    Cornell,
    /// Cornell box with the boxes replaced by smoke
    CornellSmoke,
    /// Everything at once: instancing, media, motion blur, nested BVHs
    Final,
    /// Three spheres around a bright central light
    Hdr,
}

/// Objects, camera and background of a demo scene, ready for
/// [`pyre_renderer::Scene::build`].
pub struct SceneSetup {
    pub objects: HittableList,
    pub camera: Camera,
    pub background: Background,
}

/// Camera placement shared by every scene.
struct View {
    look_from: Vec3,
    look_at: Vec3,
    vfov: f32,
    aperture: f32,
}

impl View {
    fn new(look_from: Vec3, look_at: Vec3, vfov: f32) -> Self {
        Self {
            look_from,
            look_at,
            vfov,
            aperture: 0.0,
        }
    }

    fn with_aperture(mut self, aperture: f32) -> Self {
        self.aperture = aperture;
        self
    }

    /// Focused on the look-at point, shutter open over [0, 1].
    fn camera(&self, aspect_ratio: f32) -> Camera {
        Camera::new()
            .with_position(self.look_from, self.look_at, Vec3::Y)
            .with_lens(self.vfov, self.aperture, 10.0)
            .focused_on_target()
            .with_aspect_ratio(aspect_ratio)
            .with_shutter(0.0, 1.0)
    }
}

/// Assemble scene `name`. `texture` is the image used by the textured
/// globes; a missing or unreadable file renders as the debug color.
pub fn build(
    name: SceneName,
    aspect_ratio: f32,
    texture: &Path,
    rng: &mut dyn RngCore,
) -> RenderResult<SceneSetup> {
    let sky = Background::Solid(DEFAULT_BACKGROUND);
    let black = Background::Solid(Color::ZERO);

    let (objects, view, background) = match name {
        SceneName::RandomSpheres => (
            random_spheres(rng),
            View::new(Vec3::new(13.0, 2.0, 3.0), Vec3::ZERO, 20.0).with_aperture(0.075),
            sky,
        ),
        SceneName::CheckerSpheres => (
            checker_spheres(),
            View::new(Vec3::new(13.0, 2.0, 3.0), Vec3::ZERO, 20.0),
            sky,
        ),
        SceneName::PerlinSpheres => (
            perlin_spheres(rng),
            View::new(Vec3::new(13.0, 2.0, 3.0), Vec3::ZERO, 20.0),
            sky,
        ),
        SceneName::Earth => (
            earth(texture),
            View::new(Vec3::new(13.0, 6.666, -3.0), Vec3::ZERO, 20.0).with_aperture(0.075),
            sky,
        ),
        SceneName::SimpleLight => (
            simple_light(texture, rng),
            View::new(Vec3::new(26.0, 3.0, 6.0), Vec3::new(0.0, 2.0, 0.0), 20.0),
            black,
        ),
        SceneName::Cornell => (cornell_box(false), cornell_view(), black),
        SceneName::CornellSmoke => (cornell_box(true), cornell_view(), black),
        SceneName::Final => (
            final_scene(texture, rng)?,
            View::new(Vec3::new(478.0, 278.0, -600.0), Vec3::new(278.0, 278.0, 0.0), 40.0),
            black,
        ),
        SceneName::Hdr => (
            hdr(rng),
            View::new(Vec3::new(-10.0, 0.01, 20.0), Vec3::ZERO, 30.0).with_aperture(0.1),
            Background::Solid(Color::splat(0.1)),
        ),
    };

    log::info!("Assembled scene {:?} with {} objects", name, objects.len());

    Ok(SceneSetup {
        objects,
        camera: view.camera(aspect_ratio),
        background,
    })
}

fn lambertian(color: Color) -> Arc<dyn Material> {
    Arc::new(Lambertian::new(color))
}

fn random_color(rng: &mut dyn RngCore, min: f32, max: f32) -> Color {
    Color::new(
        rng.gen_range(min..max),
        rng.gen_range(min..max),
        rng.gen_range(min..max),
    )
}

fn earth_texture(path: &Path, modifier: f32) -> Arc<dyn Texture> {
    let raster = Arc::new(load_raster_or_empty(path));
    Arc::new(ImageTexture::with_modifier(raster, modifier))
}

fn checker() -> Arc<dyn Texture> {
    Arc::new(CheckerTexture::from_colors(
        Color::new(0.2, 0.3, 0.1),
        Color::splat(0.9),
    ))
}

fn random_spheres(rng: &mut dyn RngCore) -> HittableList {
    let mut world = HittableList::new();
    world.add(Sphere::new(
        Vec3::new(0.0, -1000.0, 0.0),
        1000.0,
        Arc::new(Lambertian::textured(checker())),
    ));

    let glass: Arc<dyn Material> = Arc::new(Dielectric::tinted(Color::splat(0.95), 1.5));

    for a in -11..11 {
        for b in -11..11 {
            let choose_mat: f32 = rng.gen();
            let center = Vec3::new(
                a as f32 + 0.9 * rng.gen::<f32>(),
                0.2,
                b as f32 + 0.9 * rng.gen::<f32>(),
            );

            if (center - Vec3::new(4.0, 0.2, 0.0)).length() <= 0.9 {
                continue;
            }

            if choose_mat < 0.8 {
                // Diffuse, bouncing upward over the shutter
                let albedo = random_color(rng, 0.0, 1.0) * random_color(rng, 0.0, 1.0);
                let center1 = center + Vec3::new(0.0, rng.gen_range(0.0..0.5), 0.0);
                world.add(MovingSphere::new(
                    (center, 0.0),
                    (center1, 1.0),
                    0.2,
                    lambertian(albedo),
                ));
            } else if choose_mat < 0.95 {
                let albedo = random_color(rng, 0.5, 1.0);
                let fuzz = rng.gen_range(0.0..0.5);
                world.add(Sphere::new(center, 0.2, Arc::new(Metal::new(albedo, fuzz))));
            } else {
                world.add(Sphere::new(center, 0.2, glass.clone()));
            }
        }
    }

    world.add(Sphere::new(Vec3::new(0.0, 1.0, 0.0), 1.0, glass));
    world.add(Sphere::new(
        Vec3::new(-4.0, 1.0, 0.0),
        1.0,
        lambertian(Color::new(0.4, 0.2, 0.1)),
    ));
    world.add(Sphere::new(
        Vec3::new(4.0, 1.0, 0.0),
        1.0,
        Arc::new(Metal::new(Color::new(0.7, 0.6, 0.5), 0.0)),
    ));

    world
}

fn checker_spheres() -> HittableList {
    let surface: Arc<dyn Material> = Arc::new(Lambertian::textured(checker()));

    let mut objects = HittableList::new();
    objects.add(Sphere::new(Vec3::new(0.0, -10.0, 0.0), 10.0, surface.clone()));
    objects.add(Sphere::new(Vec3::new(0.0, 10.0, 0.0), 10.0, surface));
    objects
}

fn perlin_spheres(rng: &mut dyn RngCore) -> HittableList {
    let marble: Arc<dyn Material> = Arc::new(Lambertian::textured(Arc::new(NoiseTexture::new(5.0, rng))));

    let mut objects = HittableList::new();
    objects.add(Sphere::new(Vec3::new(0.0, -1000.0, 0.0), 1000.0, marble.clone()));
    objects.add(Sphere::new(Vec3::new(0.0, 2.0, 0.0), 2.0, marble));
    objects
}

fn earth(texture: &Path) -> HittableList {
    let mut objects = HittableList::new();
    objects.add(Sphere::new(
        Vec3::ZERO,
        2.0,
        Arc::new(Metal::textured(earth_texture(texture, 0.5), 1.0)),
    ));

    let floor = Arc::new(CheckerTexture::from_colors(
        Color::new(0.3, 0.2, 0.1) / 10.0,
        Color::splat(0.004),
    ));
    objects.add(AxisRect::xz(
        -1000.0,
        1000.0,
        -1000.0,
        1000.0,
        -2.0,
        Arc::new(Metal::textured(floor, 0.5)),
    ));

    let sunlight = Color::new(1.0, 0.95, 0.75);
    // Faint sky dome around the camera
    objects.add(Sphere::new(Vec3::ZERO, 20.0, Arc::new(DiffuseLight::new(sunlight, 0.05))));

    let sun_center = Vec3::new(13.0, 0.0, -3.0) * 3.0 + Vec3::new(0.0, 28.0258, 0.0);
    objects.add(Sphere::new(sun_center, 45.0, Arc::new(DiffuseLight::new(sunlight, 1.0))).outside_only());

    objects
}

fn simple_light(texture: &Path, rng: &mut dyn RngCore) -> HittableList {
    let mut objects = HittableList::new();

    let marble = Arc::new(NoiseTexture::new(5.0, rng));
    objects.add(AxisRect::xz(-250.0, 250.0, -250.0, 250.0, 0.0, Arc::new(Lambertian::textured(marble))));
    objects.add(Sphere::new(
        Vec3::new(0.0, 2.0, 0.0),
        2.0,
        Arc::new(Lambertian::textured(earth_texture(texture, 0.5))),
    ));

    let light = |color: Color, intensity: f32| -> Arc<dyn Material> {
        Arc::new(DiffuseLight::new(color, intensity))
    };

    objects.add(AxisRect::xy(-1.0, 1.0, 1.0, 3.0, -3.0, light(Color::new(0.3, 0.3, 1.0), 5.0)));
    objects.add(AxisRect::xy(-1.0, 1.0, 1.0, 3.0, 3.0, light(Color::new(1.0, 0.3, 0.3), 5.0)));
    objects.add(Sphere::new(Vec3::new(0.0, 5.0, 0.0), 0.5, light(Color::new(0.3, 1.0, 0.3), 3.0)));
    objects.add(AxisRect::yz(0.0, 15.0, -15.0, 15.0, -25.0, light(Color::new(0.91, 0.38, 0.0), 1.0)));
    objects.add(AxisRect::yz(0.0, 15.0, -15.0, 15.0, 35.0, light(Color::new(0.0, 0.72, 0.92), 1.0)));

    objects
}

fn cornell_view() -> View {
    View::new(Vec3::new(278.0, 278.0, -800.0), Vec3::new(278.0, 278.0, 0.0), 40.0)
}

/// Box from the origin to `size`, turned about Y and moved to `offset`.
fn placed_box(size: Vec3, degrees: f32, offset: Vec3, material: Arc<dyn Material>) -> Primitive {
    let cuboid = Primitive::from(Cuboid::new(Vec3::ZERO, size, material));
    let rotated = Primitive::from(Rotate::new(cuboid, Axis::Y, degrees));
    Primitive::from(Translate::new(rotated, offset))
}

fn cornell_box(smoke: bool) -> HittableList {
    let red = lambertian(Color::new(0.65, 0.05, 0.05));
    let white = lambertian(Color::splat(0.73));
    let green = lambertian(Color::new(0.12, 0.45, 0.15));
    let light: Arc<dyn Material> = Arc::new(DiffuseLight::new(Color::new(0.95, 0.95, 1.0), 10.0));

    let mut objects = HittableList::new();
    objects.add(AxisRect::yz(0.0, 555.0, 0.0, 555.0, 555.0, green));
    objects.add(AxisRect::yz(0.0, 555.0, 0.0, 555.0, 0.0, red));
    objects.add(AxisRect::xz(113.0, 443.0, 127.0, 432.0, 554.0, light));
    objects.add(AxisRect::xz(0.0, 555.0, 0.0, 555.0, 0.0, white.clone()));
    objects.add(AxisRect::xz(0.0, 555.0, 0.0, 555.0, 555.0, white.clone()));
    objects.add(AxisRect::xy(0.0, 555.0, 0.0, 555.0, 555.0, white.clone()));

    let tall = placed_box(
        Vec3::new(165.0, 330.0, 165.0),
        15.0,
        Vec3::new(265.0, 0.0, 295.0),
        white.clone(),
    );
    let short = placed_box(Vec3::splat(165.0), -18.0, Vec3::new(130.0, 0.0, 65.0), white);

    if smoke {
        objects.add(ConstantMedium::with_color(tall, 0.01, Color::ZERO));
        objects.add(ConstantMedium::with_color(short, 0.005, Color::ONE));
    } else {
        objects.add(tall);
        objects.add(short);
    }

    objects
}

fn final_scene(texture: &Path, rng: &mut dyn RngCore) -> RenderResult<HittableList> {
    const BOXES_PER_SIDE: usize = 10;

    let ground = lambertian(Color::new(0.48, 0.83, 0.53));
    let mut boxes = HittableList::new();
    let w = 2000.0 / BOXES_PER_SIDE as f32;
    for i in 0..BOXES_PER_SIDE {
        for j in 0..BOXES_PER_SIDE {
            let x0 = -1000.0 + i as f32 * w;
            let z0 = -1000.0 + j as f32 * w;
            let y1 = rng.gen_range(1.0..101.0);
            boxes.add(Cuboid::new(
                Vec3::new(x0, 0.0, z0),
                Vec3::new(x0 + w, y1, z0 + w),
                ground.clone(),
            ));
        }
    }

    let mut objects = HittableList::new();
    objects.add(BvhNode::new(boxes.into_objects(), 0.0, 1.0, rng)?);

    let light: Arc<dyn Material> = Arc::new(DiffuseLight::new(Color::splat(7.0), 1.0));
    objects.add(AxisRect::xz(123.0, 423.0, 147.0, 412.0, 554.0, light));

    let center0 = Vec3::new(400.0, 400.0, 200.0);
    let center1 = center0 + Vec3::new(30.0, 0.0, 0.0);
    objects.add(MovingSphere::new(
        (center0, 0.0),
        (center1, 1.0),
        50.0,
        lambertian(Color::new(0.7, 0.3, 0.1)),
    ));

    let glass: Arc<dyn Material> = Arc::new(Dielectric::new(1.5));
    objects.add(Sphere::new(Vec3::new(260.0, 150.0, 45.0), 50.0, glass.clone()));
    objects.add(Sphere::new(
        Vec3::new(0.0, 150.0, 145.0),
        50.0,
        Arc::new(Metal::new(Color::new(0.8, 0.8, 0.9), 1.0)),
    ));

    // Glass shell filled with blue fog
    let boundary = Arc::new(Primitive::from(Sphere::new(
        Vec3::new(360.0, 150.0, 145.0),
        70.0,
        glass.clone(),
    )));
    objects.add_shared(Arc::clone(&boundary));
    objects.add(ConstantMedium::with_color(boundary, 0.2, Color::new(0.2, 0.4, 0.9)));

    // Thin haze over the whole scene
    let haze = Primitive::from(Sphere::new(Vec3::ZERO, 5000.0, glass));
    objects.add(ConstantMedium::with_color(haze, 0.0001, Color::ONE));

    objects.add(Sphere::new(
        Vec3::new(400.0, 200.0, 400.0),
        100.0,
        Arc::new(Lambertian::textured(earth_texture(texture, 0.0))),
    ));
    objects.add(Sphere::new(
        Vec3::new(220.0, 280.0, 300.0),
        80.0,
        Arc::new(Lambertian::textured(Arc::new(NoiseTexture::new(0.1, rng)))),
    ));

    let white = lambertian(Color::splat(0.73));
    let mut cluster = HittableList::new();
    for _ in 0..1000 {
        let center = Vec3::new(
            rng.gen_range(0.0..165.0),
            rng.gen_range(0.0..165.0),
            rng.gen_range(0.0..165.0),
        );
        cluster.add(Sphere::new(center, 10.0, white.clone()));
    }
    let cluster = Primitive::from(BvhNode::new(cluster.into_objects(), 0.0, 1.0, rng)?);
    let cluster = Primitive::from(Rotate::new(cluster, Axis::Y, 15.0));
    objects.add(Translate::new(cluster, Vec3::new(-100.0, 270.0, 395.0)));

    Ok(objects)
}

fn hdr(rng: &mut dyn RngCore) -> HittableList {
    let mut world = HittableList::new();

    let marble = Arc::new(NoiseTexture::new(0.333, rng));
    world.add(AxisRect::xz(
        -1000.0,
        1000.0,
        -1000.0,
        1000.0,
        -3.0,
        Arc::new(Lambertian::textured(marble)),
    ));

    world.add(Sphere::new(
        Vec3::new(0.0, 0.0, 5.0),
        0.5,
        Arc::new(Dielectric::tinted(Color::ONE, 1.5)),
    ));
    world.add(Sphere::new(
        Vec3::ZERO,
        3.0,
        Arc::new(DiffuseLight::new(Color::new(1.0, 1.0, 0.85), 5.0)),
    ));
    world.add(Sphere::new(
        Vec3::new(-4.0, 0.0, 0.0),
        3.0,
        lambertian(Color::new(0.255, 0.412, 0.882)),
    ));
    world.add(Sphere::new(
        Vec3::new(4.0, 0.0, 0.0),
        3.0,
        Arc::new(Metal::new(Color::new(0.196, 0.804, 0.196), 0.5)),
    ));

    world
}

#[cfg(test)]
mod tests {
    use super::*;
    use pyre_renderer::{Hittable, Interval, Ray, Scene, T_MIN};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const NO_TEXTURE: &str = "does-not-exist.jpg";

    #[test]
    fn test_every_scene_builds() {
        for name in SceneName::value_variants() {
            let mut rng = StdRng::seed_from_u64(5);
            let setup = build(*name, 16.0 / 9.0, Path::new(NO_TEXTURE), &mut rng).unwrap();
            assert!(!setup.objects.is_empty(), "{:?} has no objects", name);
            assert!((setup.camera.aspect_ratio() - 16.0 / 9.0).abs() < 1e-6);

            let scene = Scene::build(setup.objects, setup.camera, setup.background, &mut rng);
            assert!(scene.is_ok(), "{:?} failed to build", name);
        }
    }

    #[test]
    fn test_scene_names_parse_from_kebab_case() {
        assert_eq!(SceneName::from_str("cornell-smoke", false), Ok(SceneName::CornellSmoke));
        assert_eq!(SceneName::from_str("hdr", false), Ok(SceneName::Hdr));
        assert!(SceneName::from_str("teapot", false).is_err());
    }

    #[test]
    fn test_cornell_camera_sees_the_back_wall() {
        let mut rng = StdRng::seed_from_u64(1);
        let setup = build(SceneName::Cornell, 1.0, Path::new(NO_TEXTURE), &mut rng).unwrap();
        let scene = Scene::build(setup.objects, setup.camera, setup.background, &mut rng).unwrap();

        let ray = Ray::new(Vec3::new(278.0, 278.0, -800.0), Vec3::Z, 0.5);
        let rec = scene.world().hit(&ray, Interval::new(T_MIN, f32::INFINITY), &mut rng);
        assert!(rec.is_some_and(|rec| rec.t > 800.0 && rec.t <= 1355.0));
    }
}
