//! End-to-end requests against the public API, including the failure paths.

use vecnoise_core::{
    AlignedBuffer, CancelToken, CapabilityDescriptor, CoordBatch, FractalType, GridRegion, Noise,
    NoiseConfig, NoiseError, NoiseType, PointSet, bind, detect, fill,
};

const SENTINEL: f32 = -1234.5;

fn sentinel_buffer(len: usize) -> AlignedBuffer {
    let mut buffer = AlignedBuffer::new(len);
    buffer.fill(SENTINEL);
    buffer
}

fn untouched(buffer: &[f32]) -> bool {
    buffer.iter().all(|v| v.to_bits() == SENTINEL.to_bits())
}

#[test]
fn perlin_grid_element_matches_direct_evaluation() {
    let config = NoiseConfig {
        seed: 42,
        frequency: 0.01,
        ..NoiseConfig::new(NoiseType::Perlin)
    };
    let binding = bind(detect(), &config).unwrap();
    let region = GridRegion::new_3d([0.0; 3], [4, 4, 4], [1.0; 3]);

    let mut out = AlignedBuffer::new(64);
    fill(&region, &config, &binding, &mut out).unwrap();

    let batch = CoordBatch::from_point(&[2.0, 1.0, 3.0]).unwrap();
    let direct = binding.evaluate(&batch, &config).unwrap();
    assert_eq!(region.offset(&[2, 1, 3]), 54);
    assert_eq!(out[54].to_bits(), direct.0[0].to_bits());
}

#[test]
fn zero_octaves_rejected_without_touching_buffer() {
    let good = NoiseConfig::new(NoiseType::Perlin);
    let binding = bind(detect(), &good).unwrap();
    let bad = NoiseConfig { octaves: 0, ..good };
    let region = GridRegion::new_2d([0.0; 2], [8, 8], [1.0; 2]);

    let mut out = sentinel_buffer(64);
    let err = fill(&region, &bad, &binding, &mut out).unwrap_err();
    assert!(matches!(err, NoiseError::InvalidConfig(_)), "{err}");
    assert!(untouched(&out));

    assert!(matches!(Noise::new(bad), Err(NoiseError::InvalidConfig(_))));
}

#[test]
fn cancelling_gain_rejected() {
    let config = NoiseConfig {
        fractal: FractalType::Fbm,
        octaves: 2,
        gain: -1.0,
        ..NoiseConfig::new(NoiseType::Perlin)
    };
    assert!(matches!(Noise::new(config), Err(NoiseError::InvalidConfig(_))));

    let binding = bind(detect(), &NoiseConfig::new(NoiseType::Perlin)).unwrap();
    let region = GridRegion::new_2d([10.3, 4.7], [4, 4], [1.0; 2]);
    let mut out = sentinel_buffer(16);
    assert!(fill(&region, &config, &binding, &mut out).is_err());
    assert!(untouched(&out));
}

#[test]
fn invalid_regions_rejected_without_touching_buffer() {
    let config = NoiseConfig::default();
    let binding = bind(detect(), &config).unwrap();
    let mut out = sentinel_buffer(64);

    let regions = [
        GridRegion::new_2d([0.0; 2], [0, 8], [1.0; 2]),
        GridRegion::new_2d([0.0, f32::NAN], [8, 8], [1.0; 2]),
        GridRegion::new_2d([0.0; 2], [8, 8], [f32::INFINITY, 1.0]),
        GridRegion::new_2d([3.0e38, 0.0], [8, 8], [1.0e38, 1.0]),
        GridRegion::new_3d([0.0; 3], [usize::MAX, usize::MAX, 2], [1.0; 3]),
    ];
    for region in regions {
        assert!(
            matches!(
                fill(&region, &config, &binding, &mut out),
                Err(NoiseError::InvalidRegion(_))
            ),
            "{region:?}"
        );
    }
    assert!(untouched(&out));
}

#[test]
fn mismatched_binding_rejected() {
    let binding = bind(detect(), &NoiseConfig::new(NoiseType::Perlin)).unwrap();
    let region = GridRegion::new_2d([0.0; 2], [4, 4], [1.0; 2]);
    let mut out = sentinel_buffer(16);
    assert!(fill(&region, &NoiseConfig::new(NoiseType::Value), &binding, &mut out).is_err());
    assert!(untouched(&out));
}

#[test]
fn small_buffer_rejected() {
    let engine = Noise::new(NoiseConfig::default()).unwrap();
    let region = GridRegion::new_2d([0.0; 2], [10, 10], [1.0; 2]);
    let mut out = sentinel_buffer(99);
    assert_eq!(
        engine.fill(&region, &mut out),
        Err(NoiseError::BufferTooSmall {
            required: 100,
            actual: 99
        })
    );
    assert!(untouched(&out));
}

#[test]
fn misaligned_buffer_rejected_on_vector_tiers() {
    let engine = Noise::new(NoiseConfig::default()).unwrap();
    let required = engine.binding().alignment();
    if required <= size_of::<f32>() {
        return;
    }
    let region = GridRegion::new_2d([0.0; 2], [10, 10], [1.0; 2]);
    let mut out = sentinel_buffer(101);
    let err = engine.fill(&region, &mut out[1..]).unwrap_err();
    assert!(matches!(err, NoiseError::BufferMisaligned { required: r, .. } if r == required));
    assert!(untouched(&out));
}

#[test]
fn cancelled_fill_reports_cancellation() {
    let mut engine = Noise::new(NoiseConfig::default()).unwrap();
    let token = CancelToken::new();
    engine.set_cancel_token(Some(token.clone()));
    let region = GridRegion::new_2d([0.0; 2], [256, 256], [1.0; 2]);

    assert!(engine.generate(&region).is_ok());
    token.cancel();
    assert_eq!(engine.generate(&region), Err(NoiseError::Cancelled));

    engine.set_cancel_token(None);
    assert!(engine.generate(&region).is_ok());
}

#[test]
fn point_sets_match_single_samples() {
    let engine = Noise::new(NoiseConfig::new(NoiseType::Cubic)).unwrap();
    let xs = [0.5, 17.25, -300.0, 1e4, 3.0];
    let ys = [1.5, -2.0, 42.0, 7.0, 3.0];
    let zs = [0.0, 0.0, 9.5, -1.0, 3.0];
    let points = PointSet::new(&[&xs, &ys, &zs]).unwrap();
    let values = engine.generate_points(&points).unwrap();

    for i in 0..xs.len() {
        let direct = engine.sample(&[xs[i], ys[i], zs[i]]).unwrap();
        assert_eq!(values[i].to_bits(), direct.to_bits(), "point {i}");
    }
}

#[test]
fn invalid_point_sets_rejected() {
    let xs = [0.0, 1.0];
    let ys = [0.0];
    assert!(matches!(PointSet::new(&[&xs, &ys]), Err(NoiseError::InvalidRegion(_))));
    assert!(matches!(PointSet::new(&[&[], &[]]), Err(NoiseError::InvalidRegion(_))));
    assert!(matches!(
        PointSet::new(&[&[f32::NAN], &[0.0]]),
        Err(NoiseError::InvalidRegion(_))
    ));
}

#[test]
fn scalar_engine_accepts_unaligned_buffer() {
    let engine = Noise::with_capabilities(NoiseConfig::default(), CapabilityDescriptor::scalar_only())
        .unwrap();
    let region = GridRegion::new_2d([0.0; 2], [10, 10], [1.0; 2]);
    let mut out = sentinel_buffer(101);
    engine.fill(&region, &mut out[1..]).unwrap();
    assert!(out[1..].iter().all(|v| v.to_bits() != SENTINEL.to_bits()));
}

#[test]
fn config_loads_from_json() {
    let config: NoiseConfig = serde_json::from_str(
        r#"{
            "type": "cellular",
            "fractal": "none",
            "seed": 5,
            "cellular": { "distance": "manhattan", "return_type": "distance2_add" },
            "perturb": { "type": "gradient", "amplitude": 2.0 }
        }"#,
    )
    .unwrap();
    let engine = Noise::new(config).unwrap();
    assert_eq!(engine.binding().algorithm(), NoiseType::Cellular);
    assert!(engine.sample(&[1.0, 2.0]).unwrap().is_finite());
}
