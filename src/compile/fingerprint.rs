use xxhash_rust::xxh3::Xxh3;

use crate::{
    compile::ir::{FixtureSegment, SegmentBody},
    curve::semantic::CurveSemantic,
    foundation::core::Channel,
};

const XXH3_SEED: u64 = 0x6a1c_3e5f_92d4_b07d;

/// Stable digest of a compiled segment list.
///
/// Two compiles of the same inputs must produce the same fingerprint regardless
/// of thread count; tests and caches compare these instead of whole IR dumps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub struct IrFingerprint {
    pub hi: u64,
    pub lo: u64,
}

impl std::fmt::Display for IrFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}{:016x}", self.hi, self.lo)
    }
}

pub fn fingerprint_segments(segments: &[FixtureSegment]) -> IrFingerprint {
    let mut h = StableHasher::new();
    h.write_u64(segments.len() as u64);
    for s in segments {
        write_segment(&mut h, s);
    }
    h.finish()
}

struct StableHasher {
    inner: Xxh3,
}

impl StableHasher {
    fn new() -> Self {
        Self {
            inner: Xxh3::with_seed(XXH3_SEED),
        }
    }

    fn write_bytes(&mut self, b: &[u8]) {
        self.inner.update(b);
    }

    fn write_u8(&mut self, v: u8) {
        self.write_bytes(&[v]);
    }

    fn write_bool(&mut self, v: bool) {
        self.write_u8(u8::from(v));
    }

    fn write_u64(&mut self, v: u64) {
        self.write_bytes(&v.to_le_bytes());
    }

    fn write_f64(&mut self, v: f64) {
        self.write_u64(v.to_bits());
    }

    fn write_str(&mut self, s: &str) {
        self.write_u64(s.len() as u64);
        self.write_bytes(s.as_bytes());
    }

    fn write_opt_f64(&mut self, v: Option<f64>) {
        match v {
            Some(x) => {
                self.write_u8(1);
                self.write_f64(x);
            }
            None => self.write_u8(0),
        }
    }

    fn finish(self) -> IrFingerprint {
        let v = self.inner.digest128();
        IrFingerprint {
            hi: (v >> 64) as u64,
            lo: v as u64,
        }
    }
}

fn write_segment(h: &mut StableHasher, s: &FixtureSegment) {
    h.write_str(&s.fixture_id);
    h.write_u8(match s.channel {
        Channel::Pan => 0,
        Channel::Tilt => 1,
        Channel::Dimmer => 2,
    });
    h.write_f64(s.t0_ms);
    h.write_f64(s.t1_ms);
    match &s.body {
        SegmentBody::Static(v) => {
            h.write_u8(0);
            h.write_f64(*v);
        }
        SegmentBody::Curve(c) => {
            h.write_u8(1);
            h.write_u64(c.len() as u64);
            for p in c.points() {
                h.write_f64(p.t);
                h.write_f64(p.v);
            }
        }
    }
    h.write_u8(match s.semantic {
        CurveSemantic::MovementOffset => 0,
        CurveSemantic::DimmerAbsolute => 1,
    });
    h.write_opt_f64(s.base_dmx);
    h.write_opt_f64(s.amplitude_dmx);
    h.write_opt_f64(s.floor_dmx);
    h.write_opt_f64(s.ceiling_dmx);
    h.write_f64(s.clamp_min);
    h.write_f64(s.clamp_max);
    h.write_bool(s.is_transition);
    h.write_u64(s.layer as u64);
    h.write_str(&s.source.template_id);
    match &s.source.step_id {
        Some(id) => {
            h.write_u8(1);
            h.write_str(id);
        }
        None => h.write_u8(0),
    }
    match s.source.cycle_index {
        Some(c) => {
            h.write_u8(1);
            h.write_u64(c as u64);
        }
        None => h.write_u8(0),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compile/fingerprint.rs"]
mod tests;
