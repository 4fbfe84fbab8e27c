//! Parallel renderer.
//!
//! Pixels are split statically across N workers by stride: worker `i` takes
//! pixel indices `i, i + N, i + 2N, ...`. Each worker owns its generator and
//! its output buffer, so the only shared mutable state is the progress
//! counter. Once every worker has returned, the buffers are interleaved back
//! into a single row-major image.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use crate::color::to_bgr8;
use crate::{gen_f32, ColorGrade, RenderError, RenderResult, Scene, ToneMap};
use pyre_core::raster::BYTES_PER_PIXEL;
use pyre_math::Color;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Worker count when hardware concurrency cannot be detected.
pub const FALLBACK_THREADS: usize = 4;

/// Render configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Samples per pixel for anti-aliasing
    pub samples_per_pixel: u32,
    /// Maximum ray bounce depth
    pub max_depth: u32,
    /// HDR to display mapping
    pub tone_map: ToneMap,
    /// Optional grading applied after gamma
    pub grade: Option<ColorGrade>,
    /// Worker count; `None` uses every available core
    pub threads: Option<usize>,
    /// Base seed; `None` seeds every worker from OS entropy
    pub seed: Option<u64>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            samples_per_pixel: 100,
            max_depth: 32,
            tone_map: ToneMap::Aces,
            grade: None,
            threads: None,
            seed: None,
        }
    }
}

impl RenderConfig {
    /// Reject settings that cannot produce an image.
    pub fn validate(&self) -> RenderResult<()> {
        let invalid = |msg: &str| Err(RenderError::InvalidConfig(msg.to_string()));

        if self.width == 0 || self.height == 0 {
            return invalid("image dimensions must be non-zero");
        }
        if self.samples_per_pixel == 0 {
            return invalid("samples_per_pixel must be at least 1");
        }
        if self.max_depth == 0 {
            return invalid("max_depth must be at least 1");
        }
        if self.threads == Some(0) {
            return invalid("threads must be at least 1");
        }
        Ok(())
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Number of render workers.
    pub fn thread_count(&self) -> usize {
        self.threads.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(FALLBACK_THREADS)
        })
    }
}

/// Shared completed-pixel counter, readable from any thread while a render
/// is running.
#[derive(Debug)]
pub struct RenderProgress {
    completed: AtomicUsize,
    total: usize,
    started: Instant,
}

/// Point-in-time view of a [`RenderProgress`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSnapshot {
    pub elapsed: Duration,
    pub completed: usize,
    pub total: usize,
}

impl RenderProgress {
    pub fn new(total: usize) -> Self {
        Self {
            completed: AtomicUsize::new(0),
            total,
            started: Instant::now(),
        }
    }

    /// A counter sized for `config`'s image.
    pub fn for_config(config: &RenderConfig) -> Self {
        Self::new(config.pixel_count())
    }

    #[inline]
    pub fn record_pixel(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            elapsed: self.started.elapsed(),
            completed: self.completed.load(Ordering::Relaxed),
            total: self.total,
        }
    }
}

impl ProgressSnapshot {
    /// Completed fraction in [0, 1].
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        (self.completed as f64 / self.total as f64).min(1.0)
    }

    /// Linear extrapolation of the time left, once any pixel has finished.
    pub fn remaining(&self) -> Option<Duration> {
        let fraction = self.fraction();
        if fraction <= 0.0 {
            return None;
        }
        Some(self.elapsed.mul_f64((1.0 - fraction) / fraction))
    }
}

/// A finished render: row-major, top row first, three bytes per pixel in
/// B, G, R order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedImage {
    pub width: u32,
    pub height: u32,
    bgr: Vec<u8>,
}

impl RenderedImage {
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL;
        let px = self.bgr.get(offset..offset + BYTES_PER_PIXEL)?;
        Some([px[0], px[1], px[2]])
    }

    pub fn as_bgr(&self) -> &[u8] {
        &self.bgr
    }
}

/// The pixel indices owned by `worker` out of `workers`.
pub fn strided_indices(worker: usize, workers: usize, total: usize) -> impl Iterator<Item = usize> {
    (worker..total).step_by(workers.max(1))
}

/// Render `scene` on a dedicated pool of `config.thread_count()` workers.
///
/// `progress` is bumped once per finished pixel; size it with
/// [`RenderProgress::for_config`].
pub fn render(scene: &Scene, config: &RenderConfig, progress: &RenderProgress) -> RenderResult<RenderedImage> {
    config.validate()?;

    let workers = config.thread_count();
    let total = config.pixel_count();
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("pyre-worker-{}", i))
        .build()?;

    log::info!(
        "Rendering {}x{} @ {} spp, max depth {}, {} threads",
        config.width,
        config.height,
        config.samples_per_pixel,
        config.max_depth,
        workers
    );
    let start = Instant::now();

    // collect() returns only after every worker is done
    let partitions: Vec<Vec<u8>> = pool.install(|| {
        (0..workers)
            .into_par_iter()
            .map(|worker| render_partition(scene, config, worker, workers, progress))
            .collect()
    });

    let bgr = merge_partitions(&partitions, total);
    log::info!("Render finished in {:.2?}", start.elapsed());

    Ok(RenderedImage {
        width: config.width,
        height: config.height,
        bgr,
    })
}

fn worker_rng(seed: Option<u64>, worker: usize) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(worker as u64)),
        None => StdRng::from_entropy(),
    }
}

/// Render every pixel owned by `worker` into a private buffer, in stride
/// order.
fn render_partition(
    scene: &Scene,
    config: &RenderConfig,
    worker: usize,
    workers: usize,
    progress: &RenderProgress,
) -> Vec<u8> {
    let mut rng = worker_rng(config.seed, worker);
    let width = config.width as usize;
    let total = config.pixel_count();
    let share = total.saturating_sub(worker).div_ceil(workers);

    let mut buffer = Vec::with_capacity(share * BYTES_PER_PIXEL);
    for index in strided_indices(worker, workers, total) {
        let (x, y) = ((index % width) as u32, (index / width) as u32);
        let radiance = render_pixel(scene, config, x, y, &mut rng);
        buffer.extend_from_slice(&to_bgr8(radiance, config.tone_map, config.grade.as_ref()));
        progress.record_pixel();
    }

    log::debug!("Worker {} finished {} pixels", worker, buffer.len() / BYTES_PER_PIXEL);
    buffer
}

/// Interleave per-worker buffers back into row-major order. Buffer `i` holds
/// the pixels of worker `i`, in stride order.
fn merge_partitions(partitions: &[Vec<u8>], total: usize) -> Vec<u8> {
    let workers = partitions.len();
    let mut image = vec![0u8; total * BYTES_PER_PIXEL];

    for (worker, buffer) in partitions.iter().enumerate() {
        let pixels = buffer.chunks_exact(BYTES_PER_PIXEL);
        for (px, index) in pixels.zip(strided_indices(worker, workers, total)) {
            let offset = index * BYTES_PER_PIXEL;
            image[offset..offset + BYTES_PER_PIXEL].copy_from_slice(px);
        }
    }

    image
}

/// Average `samples_per_pixel` jittered radiance estimates for pixel
/// `(x, y)`, where row 0 is the top of the image.
pub fn render_pixel(scene: &Scene, config: &RenderConfig, x: u32, y: u32, rng: &mut dyn RngCore) -> Color {
    let span_x = config.width.saturating_sub(1).max(1) as f32;
    let span_y = config.height.saturating_sub(1).max(1) as f32;
    let row_from_bottom = config.height.saturating_sub(1 + y) as f32;

    let mut pixel_color = Color::ZERO;
    for _ in 0..config.samples_per_pixel {
        let s = (x as f32 + gen_f32(rng)) / span_x;
        let t = (row_from_bottom + gen_f32(rng)) / span_y;
        let ray = scene.camera().get_ray(s, t, rng);
        pixel_color += scene.trace(&ray, config.max_depth, rng);
    }

    pixel_color / config.samples_per_pixel.max(1) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Background, Camera, DiffuseLight, HittableList, Lambertian, Sphere};
    use pyre_math::Vec3;
    use std::sync::Arc;

    fn small_config(width: u32, height: u32, samples: u32) -> RenderConfig {
        RenderConfig {
            width,
            height,
            samples_per_pixel: samples,
            max_depth: 8,
            tone_map: ToneMap::Clamp,
            grade: None,
            threads: Some(3),
            seed: Some(7),
        }
    }

    /// One diffuse sphere lit by one emissive sphere, black background.
    fn lit_sphere_scene(aspect: f32) -> Scene {
        let mut objects = HittableList::new();
        objects.add(Sphere::new(
            Vec3::new(0.0, 0.0, -3.0),
            1.0,
            Arc::new(Lambertian::new(Color::new(0.7, 0.6, 0.5))),
        ));
        objects.add(Sphere::new(
            Vec3::new(0.0, 2.5, -2.0),
            1.0,
            Arc::new(DiffuseLight::new(Color::ONE, 4.0)),
        ));
        let camera = Camera::new()
            .with_position(Vec3::ZERO, Vec3::new(0.0, 0.0, -3.0), Vec3::Y)
            .with_lens(50.0, 0.0, 3.0)
            .with_aspect_ratio(aspect);

        let mut rng = StdRng::seed_from_u64(99);
        Scene::build(objects, camera, Background::Solid(Color::ZERO), &mut rng).unwrap()
    }

    fn render_with(scene: &Scene, config: &RenderConfig) -> RenderedImage {
        let progress = RenderProgress::for_config(config);
        let image = render(scene, config, &progress).unwrap();
        assert_eq!(progress.snapshot().completed, config.pixel_count());
        image
    }

    fn mean_abs_diff(a: &RenderedImage, b: &RenderedImage) -> f64 {
        let sum: u64 = a
            .as_bgr()
            .iter()
            .zip(b.as_bgr())
            .map(|(&x, &y)| (x as i64 - y as i64).unsigned_abs())
            .sum();
        sum as f64 / a.as_bgr().len() as f64
    }

    #[test]
    fn test_strided_partition_covers_every_pixel_once() {
        for total in [0, 1, 7, 17, 100, 1000] {
            for workers in 1..=9 {
                let mut seen = vec![0u32; total];
                for worker in 0..workers {
                    for index in strided_indices(worker, workers, total) {
                        assert_eq!(index % workers, worker);
                        seen[index] += 1;
                    }
                }
                assert!(seen.iter().all(|&n| n == 1), "total {} workers {}", total, workers);
            }
        }
    }

    #[test]
    fn test_merge_restores_row_major_order() {
        let total = 23;
        let workers = 4;
        // Each worker writes its pixel's global index into all three bytes
        let partitions: Vec<Vec<u8>> = (0..workers)
            .map(|w| {
                strided_indices(w, workers, total)
                    .flat_map(|i| [i as u8; 3])
                    .collect()
            })
            .collect();

        let image = merge_partitions(&partitions, total);
        for (index, px) in image.chunks_exact(3).enumerate() {
            assert_eq!(px, [index as u8; 3]);
        }
    }

    #[test]
    fn test_validate_rejects_degenerate_configs() {
        assert!(RenderConfig::default().validate().is_ok());

        let bad = [
            RenderConfig { width: 0, ..small_config(4, 4, 1) },
            RenderConfig { height: 0, ..small_config(4, 4, 1) },
            RenderConfig { samples_per_pixel: 0, ..small_config(4, 4, 1) },
            RenderConfig { max_depth: 0, ..small_config(4, 4, 1) },
            RenderConfig { threads: Some(0), ..small_config(4, 4, 1) },
        ];
        for config in bad {
            assert!(matches!(config.validate(), Err(RenderError::InvalidConfig(_))));
        }
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: RenderConfig =
            serde_json::from_str(r#"{ "width": 320, "height": 200, "tone_map": "filmic", "seed": 3 }"#).unwrap();
        assert_eq!(config.width, 320);
        assert_eq!(config.tone_map, ToneMap::Filmic);
        assert_eq!(config.seed, Some(3));
        assert_eq!(config.samples_per_pixel, RenderConfig::default().samples_per_pixel);
        assert_eq!(config.grade, None);
    }

    #[test]
    fn test_progress_snapshot() {
        let progress = RenderProgress::new(4);
        assert_eq!(progress.snapshot().remaining(), None);
        progress.record_pixel();
        progress.record_pixel();
        let snap = progress.snapshot();
        assert_eq!(snap.completed, 2);
        assert!((snap.fraction() - 0.5).abs() < 1e-9);
        assert!(snap.remaining().is_some());
    }

    #[test]
    fn test_seeded_render_is_reproducible() {
        let scene = lit_sphere_scene(1.0);
        let config = small_config(8, 8, 4);
        let a = render_with(&scene, &config);
        let b = render_with(&scene, &config);
        assert_eq!(a, b);
        assert_eq!(a.as_bgr().len(), 8 * 8 * 3);
    }

    #[test]
    fn test_worker_count_does_not_change_layout() {
        // A sky-only scene is deterministic per pixel regardless of seeding
        let mut objects = HittableList::new();
        objects.add(Sphere::new(
            Vec3::new(0.0, 0.0, 50.0),
            0.1,
            Arc::new(Lambertian::new(Color::ONE)),
        ));
        let camera = Camera::new()
            .with_position(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), Vec3::Y)
            .with_lens(90.0, 0.0, 1.0)
            .with_aspect_ratio(1.0);
        let sky = Background::Gradient {
            horizon: Color::ZERO,
            zenith: Color::ONE,
        };
        let mut rng = StdRng::seed_from_u64(0);
        let scene = Scene::build(objects, camera, sky, &mut rng).unwrap();

        let one = render_with(&scene, &RenderConfig { threads: Some(1), ..small_config(6, 6, 64) });
        let many = render_with(&scene, &RenderConfig { threads: Some(5), ..small_config(6, 6, 64) });
        let diff = mean_abs_diff(&one, &many);
        assert!(diff < 4.0, "layouts differ by {}", diff);

        // Row 0 is the top of the image, looking up into the bright zenith
        let top = one.pixel(3, 0).unwrap();
        let bottom = one.pixel(3, 5).unwrap();
        assert!(top[0] > bottom[0], "top {:?} bottom {:?}", top, bottom);
        assert_eq!(one.pixel(6, 0), None);
    }

    #[test]
    fn test_render_converges_with_more_samples() {
        let scene = lit_sphere_scene(1.0);
        let config = |spp| RenderConfig {
            tone_map: ToneMap::Aces,
            ..small_config(12, 12, spp)
        };
        let reference = render_with(&scene, &RenderConfig { seed: Some(1000), ..config(512) });

        let errors: Vec<f64> = [4, 16, 64]
            .iter()
            .map(|&spp| {
                let image = render_with(&scene, &config(spp));
                mean_abs_diff(&image, &reference)
            })
            .collect();

        assert!(
            errors.windows(2).all(|w| w[1] < w[0]),
            "error should shrink with sample count: {:?}",
            errors
        );
    }
}
