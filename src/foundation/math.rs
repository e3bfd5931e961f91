#[derive(Clone, Copy, Debug)]
pub(crate) struct Fnv1a64(u64);

impl Fnv1a64 {
    const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01B3;

    pub(crate) fn new(seed: u64) -> Self {
        Self(Self::OFFSET_BASIS ^ seed)
    }

    pub(crate) fn write_str(&mut self, s: &str) {
        self.write_bytes(s.as_bytes());
        // Separator so ("ab", "c") and ("a", "bc") hash differently.
        self.write_bytes(&[0xff]);
    }

    pub(crate) fn write_bytes(&mut self, bytes: &[u8]) {
        let mut h = self.0;
        for &b in bytes {
            h ^= u64::from(b);
            h = h.wrapping_mul(Self::PRIME);
        }
        self.0 = h;
    }

    pub(crate) fn finish(self) -> u64 {
        self.0
    }
}

/// Stable seed derived from a base seed and a list of identifiers.
pub(crate) fn stable_seed(base: u64, parts: &[&str]) -> u64 {
    let mut h = Fnv1a64::new(base);
    for p in parts {
        h.write_str(p);
    }
    h.finish()
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct Rng64 {
    state: u64,
}

impl Rng64 {
    pub(crate) fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub(crate) fn next_u64(&mut self) -> u64 {
        // SplitMix64
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    pub(crate) fn next_f64_01(&mut self) -> f64 {
        // 53 bits of precision.
        let v = self.next_u64() >> 11;
        (v as f64) * (1.0 / ((1u64 << 53) as f64))
    }
}

/// Hash-indexed lattice value in `[-1, 1]`.
pub(crate) fn lattice(seed: u64, i: u64) -> f64 {
    let mut rng = Rng64::new(seed ^ i.wrapping_mul(0xD6E8_FEB8_6659_FD93));
    rng.next_f64_01() * 2.0 - 1.0
}

/// Smooth 1D value noise in `[-1, 1]`, periodic with `period` lattice cells.
pub(crate) fn periodic_value_noise(seed: u64, x: f64, period: u64) -> f64 {
    let period = period.max(1);
    let x = x.rem_euclid(period as f64);
    let i0 = x.floor();
    let t = x - i0;
    let i0u = (i0 as u64) % period;
    let i1u = (i0u + 1) % period;
    let a = lattice(seed, i0u);
    let b = lattice(seed, i1u);
    // Smoothstep so the walk has no corners at lattice points.
    let s = t * t * (3.0 - 2.0 * t);
    lerp(a, b, s)
}

pub(crate) fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
