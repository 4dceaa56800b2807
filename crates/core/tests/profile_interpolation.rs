//! Property checks for profile interpolation onto bin heights
//!
//! Random inputs come from a seeded `StdRng` so failures reproduce.

use approx::assert_relative_eq;
use radar_pid_core::geometry::ray_bin_heights;
use radar_pid_core::interpolation::{interp_sorted, interpolate_profile, sort_permutation};
use radar_pid_core::{Degrees, Meters, ProfileError, TemperatureProfile};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

#[ctor::ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

const PHEIGHT: [f64; 4] = [0.0, 100.0, 200.0, 300.0];
const PTEMPC: [f64; 4] = [20.0, 10.0, 0.0, -10.0];

/// Standard-atmosphere-like sounding with an inversion near the surface
fn sounding() -> TemperatureProfile {
    TemperatureProfile::new(
        vec![0.0, 250.0, 600.0, 1500.0, 3000.0, 5500.0, 9000.0, 12000.0],
        vec![8.0, 10.5, 9.0, 3.2, -6.5, -22.0, -45.0, -56.5],
    )
    .unwrap()
}

fn random_heights(rng: &mut StdRng, n: usize) -> Vec<f64> {
    (0..n).map(|_| rng.random_range(-500.0..14_000.0)).collect()
}

#[test]
fn test_linear_segment_values() {
    let t = interpolate_profile(&PHEIGHT, &PTEMPC, &[50.0, 25.0, 150.0, 225.0, 275.0]).unwrap();
    let expected = [15.0, 17.5, 5.0, -2.5, -7.5];
    for (got, want) in t.iter().zip(expected) {
        assert_relative_eq!(*got, want, epsilon = 1e-12);
    }
}

#[test]
fn test_order_preservation_under_permutation() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let profile = sounding();

    for _ in 0..50 {
        let heights = random_heights(&mut rng, 120);
        let reference = profile.interpolate(&heights).unwrap();

        let mut order: Vec<usize> = (0..heights.len()).collect();
        order.shuffle(&mut rng);
        let shuffled: Vec<f64> = order.iter().map(|&i| heights[i]).collect();
        let shuffled_out = profile.interpolate(&shuffled).unwrap();

        // Undo the shuffle and compare position by position
        let mut restored = vec![0.0; heights.len()];
        for (k, &i) in order.iter().enumerate() {
            restored[i] = shuffled_out[k];
        }
        assert_eq!(restored, reference);
    }
}

#[test]
fn test_exact_at_every_knot() {
    let profile = sounding();
    let mut knots = profile.heights().to_vec();
    knots.reverse();
    let out = profile.interpolate(&knots).unwrap();
    let mut expected = profile.temperatures().to_vec();
    expected.reverse();
    assert_eq!(out, expected);
}

#[test]
fn test_clamping_beyond_sounding() {
    let profile = sounding();
    let out = profile.interpolate(&[-1000.0, 20_000.0, 12_000.1]).unwrap();
    assert_eq!(out, vec![8.0, -56.5, -56.5]);
}

#[test]
fn test_length_invariant() {
    let mut rng = StdRng::seed_from_u64(7);
    for n in [1, 2, 17, 500] {
        let heights = random_heights(&mut rng, n);
        assert_eq!(interpolate_profile(&PHEIGHT, &PTEMPC, &heights).unwrap().len(), n);
        assert_eq!(sounding().interpolate(&heights).unwrap().len(), n);
    }
}

#[test]
fn test_sorting_is_idempotent_for_ascending_queries() {
    let profile = sounding();
    let heights = ray_bin_heights(Degrees::new(1.5), 0.0, 250.0, 480, Meters::new(35.0));
    assert!(heights.windows(2).all(|w| w[0] < w[1]));

    let with_sort = profile.interpolate(&heights).unwrap();
    let without_sort = interp_sorted(&heights, profile.heights(), profile.temperatures());
    assert_eq!(with_sort, without_sort);
    assert_eq!(sort_permutation(&heights), (0..heights.len()).collect::<Vec<_>>());
}

#[test]
fn test_folded_low_tilt_matches_pointwise_lookup() {
    let profile = sounding();
    let heights = ray_bin_heights(Degrees::new(-0.4), 0.0, 500.0, 600, Meters::new(900.0));
    assert!(heights.windows(2).any(|w| w[0] > w[1]));

    let out = profile.interpolate(&heights).unwrap();
    for (h, t) in heights.iter().zip(&out) {
        assert_relative_eq!(*profile.temperature_at(Meters::new(*h)), *t, epsilon = 1e-9);
    }
}

#[test]
fn test_invalid_shapes_fail_fast() {
    assert!(matches!(
        interpolate_profile(&PHEIGHT, &PTEMPC[..3], &[10.0]),
        Err(ProfileError::LengthMismatch { .. })
    ));
    assert!(matches!(
        interpolate_profile(&[0.0], &[1.0], &[10.0]),
        Err(ProfileError::TooFewPoints(1))
    ));
    assert!(matches!(
        interpolate_profile(&PHEIGHT, &PTEMPC, &[]),
        Err(ProfileError::EmptyQuery)
    ));
}

#[test]
fn test_profile_round_trips_through_json() {
    let profile = sounding();
    let json = serde_json::to_string(&profile).unwrap();
    let back: TemperatureProfile = serde_json::from_str(&json).unwrap();
    assert_eq!(back, profile);

    let bad = r#"{"heights":[0.0,10.0,5.0],"temperatures":[1.0,2.0,3.0]}"#;
    assert!(serde_json::from_str::<TemperatureProfile>(bad).is_err());
}
