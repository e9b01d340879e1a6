use loam_world::noise::{NoiseField, NoiseSettings, redistribution};
use loam_world::SeedOffset;
use proptest::prelude::*;

fn coord() -> impl Strategy<Value = f32> {
    -50_000.0f32..50_000.0
}

proptest! {
    // (v * m) ^ e is non-decreasing on [0, 1] for e >= 1, m > 0
    #[test]
    fn redistribution_is_monotone(a in 0.0f32..=1.0, b in 0.0f32..=1.0, m in 0.1f32..3.0, e in 1.0f32..6.0) {
        let s = NoiseSettings { redistribution_modifier: m, exponent: e, ..NoiseSettings::default() };
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(redistribution(lo, &s) <= redistribution(hi, &s));
    }

    // Output stays in [0, 1] for any coordinate and world offset
    #[test]
    fn sample_in_unit_range(x in coord(), z in coord(), ox in -1000i32..1000, oz in -1000i32..1000, octaves in 1u32..6) {
        let field = NoiseField::new(NoiseSettings { octaves, ..NoiseSettings::default() });
        let v = field.sample(x, z, SeedOffset::new(ox, oz));
        prop_assert!((0.0..=1.0).contains(&v));
    }

    // Two fields built from equal settings agree bit for bit
    #[test]
    fn sample_is_deterministic(x in coord(), z in coord(), seed in any::<i32>()) {
        let s = NoiseSettings { seed, ..NoiseSettings::default() };
        let a = NoiseField::new(s.clone());
        let b = NoiseField::new(s);
        let off = SeedOffset::new(4, -2);
        prop_assert_eq!(a.sample(x, z, off).to_bits(), b.sample(x, z, off).to_bits());
    }
}
