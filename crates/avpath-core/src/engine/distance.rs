use super::volume::{AccessibleVolume, WeightedPoint};
use crate::core::fret::{fret_distance, fret_efficiency};
use rand::distributions::{Distribution, WeightedIndex};
use rand::{Rng, thread_rng};
use std::str::FromStr;
use tracing::instrument;

/// Reductions of the sampled distance between two accessible volumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DistanceType {
    /// Arithmetic mean of the sampled distances.
    #[default]
    Mean,
    /// FRET-averaged distance: the mean efficiency converted back to a distance.
    FretAveraged,
    /// Mean FRET efficiency of the sampled distances.
    Efficiency,
    /// Distance between the two mean positions; no sampling involved.
    MeanPosition,
}

impl FromStr for DistanceType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mean" => Ok(DistanceType::Mean),
            "fret_averaged" | "fret-averaged" | "distance_e" => Ok(DistanceType::FretAveraged),
            "efficiency" => Ok(DistanceType::Efficiency),
            "mean_position" | "mean-position" | "mp" => Ok(DistanceType::MeanPosition),
            _ => Err(()),
        }
    }
}

/// Importance sampler over the accessible set of one AV.
///
/// `None` when the AV is empty; sampling an empty AV is a documented
/// zero-length result, not an error.
fn weighted_sampler<'a>(
    av: &'a AccessibleVolume,
) -> Option<(WeightedIndex<f64>, &'a [WeightedPoint])> {
    let points = av.accessible_points();
    let weights = WeightedIndex::new(points.iter().map(|point| point.weight)).ok()?;
    Some((weights, points))
}

/// Draws `n_samples` voxels from the accessible set, with replacement,
/// with probability proportional to the voxel weight.
///
/// An empty AV yields an empty vector regardless of `n_samples`.
pub fn random_points(
    av: &AccessibleVolume,
    n_samples: usize,
    rng: &mut impl Rng,
) -> Vec<WeightedPoint> {
    let Some((weights, points)) = weighted_sampler(av) else {
        return Vec::new();
    };
    (0..n_samples)
        .map(|_| points[weights.sample(rng)])
        .collect()
}

/// Draws `n_samples` independent point pairs, one point from each AV, and
/// returns the Euclidean distances between them.
///
/// If either AV is empty the result is empty.
pub fn random_distances(
    av1: &AccessibleVolume,
    av2: &AccessibleVolume,
    n_samples: usize,
    rng: &mut impl Rng,
) -> Vec<f64> {
    let Some((weights1, points1)) = weighted_sampler(av1) else {
        return Vec::new();
    };
    let Some((weights2, points2)) = weighted_sampler(av2) else {
        return Vec::new();
    };
    (0..n_samples)
        .map(|_| {
            let a = points1[weights1.sample(rng)].position;
            let b = points2[weights2.sample(rng)].position;
            (a - b).norm()
        })
        .collect()
}

/// Reduces the sampled inter-AV distance according to `distance_type`.
///
/// Returns NaN if either AV is empty. `MeanPosition` uses the cached mean
/// positions and draws no samples.
pub fn distance(
    av1: &AccessibleVolume,
    av2: &AccessibleVolume,
    forster_radius: f64,
    distance_type: DistanceType,
    n_samples: usize,
) -> f64 {
    distance_with_rng(
        av1,
        av2,
        forster_radius,
        distance_type,
        n_samples,
        &mut thread_rng(),
    )
}

/// [`distance`] with a caller-supplied random source, for reproducible runs.
#[instrument(level = "trace", skip(av1, av2, rng))]
pub fn distance_with_rng(
    av1: &AccessibleVolume,
    av2: &AccessibleVolume,
    forster_radius: f64,
    distance_type: DistanceType,
    n_samples: usize,
    rng: &mut impl Rng,
) -> f64 {
    if distance_type == DistanceType::MeanPosition {
        return match (av1.mean_position(), av2.mean_position()) {
            (Some(a), Some(b)) => (a - b).norm(),
            _ => f64::NAN,
        };
    }

    let samples = random_distances(av1, av2, n_samples, rng);
    if samples.is_empty() {
        return f64::NAN;
    }
    let n = samples.len() as f64;

    match distance_type {
        DistanceType::Mean => samples.iter().sum::<f64>() / n,
        DistanceType::Efficiency => {
            samples
                .iter()
                .map(|&r| fret_efficiency(r, forster_radius))
                .sum::<f64>()
                / n
        }
        DistanceType::FretAveraged => {
            let mean_efficiency = samples
                .iter()
                .map(|&r| fret_efficiency(r, forster_radius))
                .sum::<f64>()
                / n;
            fret_distance(mean_efficiency, forster_radius)
        }
        DistanceType::MeanPosition => unreachable!("handled before sampling"),
    }
}

/// Histograms `n_samples` sampled distances onto a caller-supplied axis.
///
/// `bin_edges` must be monotonically increasing; the result holds one
/// unnormalized count per bin (`bin_edges.len() - 1` entries). Samples
/// outside the axis are dropped. Either AV empty yields all-zero counts.
pub fn distance_distribution(
    av1: &AccessibleVolume,
    av2: &AccessibleVolume,
    bin_edges: &[f64],
    n_samples: usize,
) -> Vec<f64> {
    distance_distribution_with_rng(av1, av2, bin_edges, n_samples, &mut thread_rng())
}

/// [`distance_distribution`] with a caller-supplied random source.
pub fn distance_distribution_with_rng(
    av1: &AccessibleVolume,
    av2: &AccessibleVolume,
    bin_edges: &[f64],
    n_samples: usize,
    rng: &mut impl Rng,
) -> Vec<f64> {
    let mut counts = vec![0.0; bin_edges.len().saturating_sub(1)];
    if counts.is_empty() {
        return counts;
    }
    let (first, last) = (bin_edges[0], bin_edges[bin_edges.len() - 1]);
    for sample in random_distances(av1, av2, n_samples, rng) {
        if sample < first || sample >= last {
            continue;
        }
        let bin = bin_edges.partition_point(|edge| *edge <= sample) - 1;
        counts[bin] += 1.0;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::obstacle::Obstacle;
    use crate::engine::config::AvParameters;
    use nalgebra::Point3;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn parameters(linker_length: f64) -> AvParameters {
        AvParameters::builder()
            .linker_length(linker_length)
            .linker_width(0.0)
            .radii([0.0, 0.0, 0.0])
            .allowed_sphere_radius(0.0)
            .grid_spacing(1.0)
            .build()
            .unwrap()
    }

    fn open_av(source: Point3<f64>, linker_length: f64) -> AccessibleVolume<'static> {
        let mut av = AccessibleVolume::new(&[], source, parameters(linker_length)).unwrap();
        av.resample().unwrap();
        av
    }

    fn empty_av(source: Point3<f64>) -> AccessibleVolume<'static> {
        let blocker: &'static [Obstacle] =
            Box::leak(Box::new([Obstacle::new(source, 50.0)]));
        let mut av = AccessibleVolume::new(blocker, source, parameters(5.0)).unwrap();
        av.resample().unwrap();
        assert!(av.is_empty());
        av
    }

    #[test]
    fn distance_type_parses_from_str() {
        assert_eq!(DistanceType::from_str("mean"), Ok(DistanceType::Mean));
        assert_eq!(
            DistanceType::from_str("distance_e"),
            Ok(DistanceType::FretAveraged)
        );
        assert_eq!(
            DistanceType::from_str("Efficiency"),
            Ok(DistanceType::Efficiency)
        );
        assert_eq!(DistanceType::from_str("mp"), Ok(DistanceType::MeanPosition));
        assert_eq!(DistanceType::from_str("nonsense"), Err(()));
    }

    #[test]
    fn random_points_returns_exactly_n_samples() {
        let av = open_av(Point3::origin(), 4.0);
        let mut rng = StdRng::seed_from_u64(1);
        let points = random_points(&av, 100, &mut rng);
        assert_eq!(points.len(), 100);
        assert!(points.iter().all(|p| p.weight > 0.0));
    }

    #[test]
    fn random_points_of_empty_av_is_empty() {
        let av = empty_av(Point3::origin());
        let mut rng = StdRng::seed_from_u64(1);
        assert!(random_points(&av, 100, &mut rng).is_empty());
    }

    #[test]
    fn mean_position_distance_is_exact() {
        let av1 = open_av(Point3::origin(), 4.0);
        let av2 = open_av(Point3::new(30.0, 0.0, 0.0), 4.0);
        let expected =
            (av1.mean_position().unwrap() - av2.mean_position().unwrap()).norm();
        let value = distance(&av1, &av2, 52.0, DistanceType::MeanPosition, 0);
        assert_eq!(value, expected);
    }

    #[test]
    fn mean_distance_converges_to_separation() {
        let separation = 60.0;
        let av1 = open_av(Point3::origin(), 10.0);
        let av2 = open_av(Point3::new(separation, 0.0, 0.0), 10.0);
        let mut rng = StdRng::seed_from_u64(42);
        let value = distance_with_rng(
            &av1,
            &av2,
            52.0,
            DistanceType::Mean,
            100_000,
            &mut rng,
        );
        // Transverse spread adds under 2% at this separation.
        assert!((value - separation).abs() / separation < 0.02);
    }

    #[test]
    fn fret_averaged_inverts_mean_efficiency() {
        let av1 = open_av(Point3::origin(), 4.0);
        let av2 = open_av(Point3::new(52.0, 0.0, 0.0), 4.0);
        let mut rng1 = StdRng::seed_from_u64(7);
        let mut rng2 = StdRng::seed_from_u64(7);
        let efficiency = distance_with_rng(
            &av1,
            &av2,
            52.0,
            DistanceType::Efficiency,
            20_000,
            &mut rng1,
        );
        let fret_averaged = distance_with_rng(
            &av1,
            &av2,
            52.0,
            DistanceType::FretAveraged,
            20_000,
            &mut rng2,
        );
        assert!(
            (fret_averaged - crate::core::fret::fret_distance(efficiency, 52.0)).abs() < 1e-9
        );
        assert!(efficiency > 0.3 && efficiency < 0.7);
    }

    #[test]
    fn every_reduction_is_nan_against_an_empty_av() {
        let av = open_av(Point3::origin(), 4.0);
        let empty = empty_av(Point3::new(20.0, 0.0, 0.0));
        for distance_type in [
            DistanceType::Mean,
            DistanceType::FretAveraged,
            DistanceType::Efficiency,
            DistanceType::MeanPosition,
        ] {
            let value = distance(&av, &empty, 52.0, distance_type, 1000);
            assert!(value.is_nan(), "{distance_type:?} should be NaN");
        }
    }

    #[test]
    fn distribution_counts_every_in_range_sample() {
        let av1 = open_av(Point3::origin(), 4.0);
        let av2 = open_av(Point3::new(30.0, 0.0, 0.0), 4.0);
        let edges: Vec<f64> = (0..=100).map(f64::from).collect();
        let mut rng = StdRng::seed_from_u64(3);
        let counts = distance_distribution_with_rng(&av1, &av2, &edges, 5000, &mut rng);
        assert_eq!(counts.len(), 100);
        assert_eq!(counts.iter().sum::<f64>(), 5000.0);
        // All mass near the separation of 30.
        let near: f64 = counts[20..40].iter().sum();
        assert_eq!(near, 5000.0);
    }

    #[test]
    fn distribution_of_empty_av_is_all_zero() {
        let av = open_av(Point3::origin(), 4.0);
        let empty = empty_av(Point3::new(20.0, 0.0, 0.0));
        let edges = [0.0, 10.0, 20.0, 30.0];
        let counts = distance_distribution(&av, &empty, &edges, 1000);
        assert_eq!(counts, vec![0.0, 0.0, 0.0]);
    }
}
