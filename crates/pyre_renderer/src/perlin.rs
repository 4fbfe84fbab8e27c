//! Gradient (Perlin) noise and turbulence.

use crate::sampling::random_vec3;
use pyre_math::Vec3;
use rand::seq::SliceRandom;
use rand::RngCore;

const POINT_COUNT: usize = 256;

/// Octaves summed by [`Perlin::turb`].
pub const DEFAULT_TURBULENCE_DEPTH: u32 = 7;

/// Lattice of random gradient vectors addressed by three shuffled
/// permutation tables.
pub struct Perlin {
    gradients: Vec<Vec3>,
    perm_x: Vec<usize>,
    perm_y: Vec<usize>,
    perm_z: Vec<usize>,
}

impl Perlin {
    pub fn new(rng: &mut dyn RngCore) -> Self {
        let gradients = (0..POINT_COUNT)
            .map(|_| random_vec3(rng, -1.0, 1.0).normalize_or_zero())
            .collect();

        Self {
            gradients,
            perm_x: permutation(rng),
            perm_y: permutation(rng),
            perm_z: permutation(rng),
        }
    }

    /// Smooth noise in roughly [-1, 1].
    pub fn noise(&self, p: Vec3) -> f32 {
        let cell = p.floor();
        let frac = p - cell;
        let (i, j, k) = (cell.x as i64, cell.y as i64, cell.z as i64);

        let mut corners = [[[Vec3::ZERO; 2]; 2]; 2];
        for (di, plane) in corners.iter_mut().enumerate() {
            for (dj, row) in plane.iter_mut().enumerate() {
                for (dk, corner) in row.iter_mut().enumerate() {
                    let index = self.perm_x[lattice(i + di as i64)]
                        ^ self.perm_y[lattice(j + dj as i64)]
                        ^ self.perm_z[lattice(k + dk as i64)];
                    *corner = self.gradients[index];
                }
            }
        }

        trilinear(&corners, frac)
    }

    /// Sum of `depth` octaves of absolute noise, each at double the
    /// frequency and half the weight of the last.
    pub fn turb(&self, p: Vec3, depth: u32) -> f32 {
        let mut accum = 0.0;
        let mut temp = p;
        let mut weight = 1.0;

        for _ in 0..depth {
            accum += weight * self.noise(temp);
            weight *= 0.5;
            temp *= 2.0;
        }

        accum.abs()
    }
}

#[inline]
fn lattice(coord: i64) -> usize {
    (coord & (POINT_COUNT as i64 - 1)) as usize
}

fn permutation(rng: &mut dyn RngCore) -> Vec<usize> {
    let mut perm: Vec<usize> = (0..POINT_COUNT).collect();
    perm.shuffle(rng);
    perm
}

/// Hermite-smoothed trilinear blend of the corner gradients' dot products.
fn trilinear(corners: &[[[Vec3; 2]; 2]; 2], frac: Vec3) -> f32 {
    let smooth = frac * frac * (Vec3::splat(3.0) - 2.0 * frac);
    let mut accum = 0.0;

    for (i, plane) in corners.iter().enumerate() {
        for (j, row) in plane.iter().enumerate() {
            for (k, gradient) in row.iter().enumerate() {
                let (fi, fj, fk) = (i as f32, j as f32, k as f32);
                let weight = frac - Vec3::new(fi, fj, fk);
                accum += (fi * smooth.x + (1.0 - fi) * (1.0 - smooth.x))
                    * (fj * smooth.y + (1.0 - fj) * (1.0 - smooth.y))
                    * (fk * smooth.z + (1.0 - fk) * (1.0 - smooth.z))
                    * gradient.dot(weight);
            }
        }
    }

    accum
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_noise_is_bounded_and_deterministic() {
        let a = Perlin::new(&mut StdRng::seed_from_u64(3));
        let b = Perlin::new(&mut StdRng::seed_from_u64(3));
        let mut rng = StdRng::seed_from_u64(4);

        for _ in 0..1000 {
            let p = random_vec3(&mut rng, -50.0, 50.0);
            let n = a.noise(p);
            assert!(n.abs() <= 1.5, "noise {} out of range", n);
            assert_eq!(n, b.noise(p));
        }
    }

    #[test]
    fn test_noise_vanishes_on_lattice_points() {
        let perlin = Perlin::new(&mut StdRng::seed_from_u64(8));
        assert!(perlin.noise(Vec3::new(3.0, -2.0, 7.0)).abs() < 1e-6);
    }

    #[test]
    fn test_noise_is_continuous() {
        let perlin = Perlin::new(&mut StdRng::seed_from_u64(8));
        let p = Vec3::new(1.3, 2.7, -0.4);
        let q = p + Vec3::splat(1e-4);
        assert!((perlin.noise(p) - perlin.noise(q)).abs() < 1e-2);
    }

    #[test]
    fn test_turbulence_is_non_negative() {
        let perlin = Perlin::new(&mut StdRng::seed_from_u64(12));
        let mut rng = StdRng::seed_from_u64(13);
        for _ in 0..200 {
            let p = random_vec3(&mut rng, -5.0, 5.0);
            assert!(perlin.turb(p, DEFAULT_TURBULENCE_DEPTH) >= 0.0);
        }
    }
}
