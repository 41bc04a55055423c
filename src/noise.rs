use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

const GRADIENTS: [(f32, f32); 8] = [
    (1.0, 1.0),
    (-1.0, 1.0),
    (1.0, -1.0),
    (-1.0, -1.0),
    (1.0, 0.0),
    (-1.0, 0.0),
    (0.0, 1.0),
    (0.0, -1.0),
];

// Skew/unskew factors for the 2D simplex grid: (sqrt(3) - 1) / 2 and (3 - sqrt(3)) / 6.
const F2: f32 = 0.366_025_42;
const G2: f32 = 0.211_324_87;
const OUTPUT_SCALE: f32 = 70.0;

/// Seeded 2D simplex noise. Output is clamped to `[-1, 1]`.
#[derive(Clone)]
pub struct SimplexNoise {
    perm: [u8; 512],
}

impl SimplexNoise {
    pub fn new(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut table: Vec<u8> = (0..=255u8).collect();
        table.shuffle(&mut rng);
        let mut perm = [0u8; 512];
        for (idx, slot) in perm.iter_mut().enumerate() {
            *slot = table[idx & 255];
        }
        Self { perm }
    }

    pub fn sample(&self, x: f32, y: f32) -> f32 {
        let s = (x + y) * F2;
        let i = (x + s).floor();
        let j = (y + s).floor();
        let t = (i + j) * G2;
        let x0 = x - (i - t);
        let y0 = y - (j - t);

        let (i1, j1) = if x0 > y0 { (1usize, 0usize) } else { (0, 1) };
        let x1 = x0 - i1 as f32 + G2;
        let y1 = y0 - j1 as f32 + G2;
        let x2 = x0 - 1.0 + 2.0 * G2;
        let y2 = y0 - 1.0 + 2.0 * G2;

        let ii = (i as i64 & 255) as usize;
        let jj = (j as i64 & 255) as usize;
        let g0 = self.gradient(ii, jj);
        let g1 = self.gradient(ii + i1, jj + j1);
        let g2 = self.gradient(ii + 1, jj + 1);

        let total = corner(g0, x0, y0) + corner(g1, x1, y1) + corner(g2, x2, y2);
        (OUTPUT_SCALE * total).clamp(-1.0, 1.0)
    }

    fn gradient(&self, i: usize, j: usize) -> (f32, f32) {
        let hash = self.perm[i + self.perm[j] as usize];
        GRADIENTS[(hash & 7) as usize]
    }
}

impl std::fmt::Debug for SimplexNoise {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimplexNoise")
            .field("perm", &&self.perm[..8])
            .finish_non_exhaustive()
    }
}

fn corner(gradient: (f32, f32), x: f32, y: f32) -> f32 {
    let falloff = 0.5 - x * x - y * y;
    if falloff < 0.0 {
        return 0.0;
    }
    let f2 = falloff * falloff;
    f2 * f2 * (gradient.0 * x + gradient.1 * y)
}

/// One animated stroke. Each strand owns its own noise field so strands
/// drawn between the same anchors do not move in lockstep.
#[derive(Debug, Clone)]
pub struct Strand {
    pub seed: u64,
    noise: SimplexNoise,
}

impl Strand {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            noise: SimplexNoise::new(seed),
        }
    }

    /// Builds `count` strands. A pinned `seed` makes the set reproducible.
    pub fn spawn(count: usize, seed: Option<u64>) -> Vec<Strand> {
        let base = seed.unwrap_or_else(fresh_seed);
        (0..count)
            .map(|idx| Strand::new(strand_seed(base, idx)))
            .collect()
    }

    /// Two-band sample: `low * (1 - weight) + high * weight`, where the high
    /// band samples at `multiplier` times the coordinates.
    pub fn displacement(&self, t: f32, time: f32, multiplier: f32, weight: f32) -> f32 {
        let low = self.noise.sample(t, time);
        let high = self.noise.sample(t * multiplier, time * multiplier);
        low * (1.0 - weight) + high * weight
    }
}

pub fn strand_seed(base: u64, index: usize) -> u64 {
    splitmix64(base ^ (index as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

pub fn splitmix64(value: u64) -> u64 {
    let mut z = value.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[cfg(feature = "thread-rng")]
pub fn fresh_seed() -> u64 {
    rand::random()
}

#[cfg(not(feature = "thread-rng"))]
pub fn fresh_seed() -> u64 {
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(0x5EED_2520);
    splitmix64(COUNTER.fetch_add(1, Ordering::Relaxed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noise_stays_in_unit_range() {
        let noise = SimplexNoise::new(7);
        for xi in -50..50 {
            for yi in -50..50 {
                let v = noise.sample(xi as f32 * 0.173, yi as f32 * 0.311);
                assert!((-1.0..=1.0).contains(&v), "value {v} out of range");
            }
        }
    }

    #[test]
    fn noise_is_coherent() {
        let noise = SimplexNoise::new(11);
        let mut max_jump: f32 = 0.0;
        let mut prev = noise.sample(0.0, 0.5);
        for step in 1..1000 {
            let v = noise.sample(step as f32 * 0.001, 0.5);
            max_jump = max_jump.max((v - prev).abs());
            prev = v;
        }
        assert!(max_jump < 0.1, "adjacent samples jumped by {max_jump}");
    }

    #[test]
    fn noise_is_not_flat() {
        let noise = SimplexNoise::new(3);
        let values: Vec<f32> = (0..64).map(|i| noise.sample(i as f32 * 0.37, 1.3)).collect();
        let min = values.iter().cloned().fold(f32::MAX, f32::min);
        let max = values.iter().cloned().fold(f32::MIN, f32::max);
        assert!(max - min > 0.2);
    }

    #[test]
    fn same_seed_reproduces_samples() {
        let a = SimplexNoise::new(42);
        let b = SimplexNoise::new(42);
        for i in 0..32 {
            let (x, y) = (i as f32 * 0.21, i as f32 * 0.05);
            assert_eq!(a.sample(x, y), b.sample(x, y));
        }
    }

    #[test]
    fn strands_get_distinct_seeds() {
        let strands = Strand::spawn(3, Some(99));
        assert_eq!(strands.len(), 3);
        assert_ne!(strands[0].seed, strands[1].seed);
        assert_ne!(strands[1].seed, strands[2].seed);
        let differs = (0..32).any(|i| {
            let t = i as f32 * 0.03;
            strands[0].displacement(t, 0.7, 8.0, 0.4) != strands[1].displacement(t, 0.7, 8.0, 0.4)
        });
        assert!(differs);
    }

    #[test]
    fn displacement_blends_bands() {
        let strand = Strand::new(5);
        let low_only = strand.displacement(0.3, 0.2, 8.0, 0.0);
        assert_eq!(low_only, strand.noise.sample(0.3, 0.2));
        let high_only = strand.displacement(0.3, 0.2, 8.0, 1.0);
        assert_eq!(high_only, strand.noise.sample(2.4, 1.6));
        let mixed = strand.displacement(0.3, 0.2, 8.0, 0.4);
        assert!((mixed - (low_only * 0.6 + high_only * 0.4)).abs() < 1e-6);
    }
}
