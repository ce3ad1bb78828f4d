//! Seeded random stream for optimizer runs.
//!
//! Every run owns its generator; nothing here is global. Ensemble members
//! get independent sub-streams via [`Xoshiro256::split`], which makes the
//! sequential and parallel execution paths draw identical numbers.

/// xoshiro256** PRNG.
#[derive(Debug, Clone)]
pub struct Xoshiro256 {
    s: [u64; 4],
}

impl Xoshiro256 {
    /// Create a generator from a 64-bit seed (expanded with SplitMix64).
    pub fn new(seed: u64) -> Self {
        let mut z = seed;
        let mut s = [0u64; 4];
        for item in &mut s {
            z = z.wrapping_add(0x9e3779b97f4a7c15);
            let mut x = z;
            x = (x ^ (x >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
            x = (x ^ (x >> 27)).wrapping_mul(0x94d049bb133111eb);
            *item = x ^ (x >> 31);
        }
        Self { s }
    }

    /// Advance the state by 2^128 draws.
    pub fn jump(&mut self) {
        const JUMP: [u64; 4] =
            [0x180ec6d33cfd0aba, 0xd5a61266f0c9392c, 0xa9582618e03fc9aa, 0x39abdc4529b1661c];
        let mut acc = [0u64; 4];
        for j in &JUMP {
            for b in 0..64 {
                if j & (1u64 << b) != 0 {
                    for (a, s) in acc.iter_mut().zip(self.s.iter()) {
                        *a ^= *s;
                    }
                }
                self.next_u64();
            }
        }
        self.s = acc;
    }

    /// Hand out a copy of the current stream and jump past it.
    ///
    /// Successive calls yield non-overlapping sub-streams.
    pub fn split(&mut self) -> Self {
        let child = self.clone();
        self.jump();
        child
    }

    pub fn next_u64(&mut self) -> u64 {
        let result = (self.s[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
        let t = self.s[1] << 17;
        self.s[2] ^= self.s[0];
        self.s[3] ^= self.s[1];
        self.s[1] ^= self.s[2];
        self.s[0] ^= self.s[3];
        self.s[2] ^= t;
        self.s[3] = self.s[3].rotate_left(45);
        result
    }

    /// Uniform f64 in [0, 1).
    #[inline]
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Uniform index in `0..n`. `n` must be non-zero.
    #[inline]
    pub fn next_index(&mut self, n: usize) -> usize {
        ((self.next_f64() * n as f64) as usize).min(n - 1)
    }

    /// Uniform value in `[-scale/2, scale/2)`.
    #[inline]
    pub fn next_centered(&mut self, scale: f64) -> f64 {
        (self.next_f64() - 0.5) * scale
    }
}
