use crate::core::models::obstacle::Obstacle;
use crate::engine::config::AvParameters;
use crate::engine::distance::{self, DistanceType};
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::volume::AccessibleVolume;
use nalgebra::Point3;
use rand::Rng;
use rand::thread_rng;
use tracing::{info, instrument};

/// Everything needed to compute one dye-pair observable.
#[derive(Debug, Clone)]
pub struct PairDistanceRequest {
    pub source_1: Point3<f64>,
    pub source_2: Point3<f64>,
    pub parameters_1: AvParameters,
    pub parameters_2: AvParameters,
    pub forster_radius: f64,
    pub distance_type: DistanceType,
    pub n_samples: usize,
}

impl PairDistanceRequest {
    /// A request with default AV parameters, Förster radius 52 Angstroms,
    /// the mean-distance reduction, and 10000 samples.
    pub fn new(source_1: Point3<f64>, source_2: Point3<f64>) -> Self {
        Self {
            source_1,
            source_2,
            parameters_1: AvParameters::default(),
            parameters_2: AvParameters::default(),
            forster_radius: 52.0,
            distance_type: DistanceType::default(),
            n_samples: 10_000,
        }
    }
}

/// Result of a pair-distance workflow run.
///
/// `distance` is NaN when either site's accessible volume is empty; the
/// per-site diagnostics tell which one.
#[derive(Debug, Clone)]
pub struct PairDistanceResult {
    pub distance: f64,
    pub mean_position_1: Option<Point3<f64>>,
    pub mean_position_2: Option<Point3<f64>>,
    pub accessible_voxels_1: usize,
    pub accessible_voxels_2: usize,
}

/// Runs the full dye-pair pipeline with the thread-local random source.
pub fn run(
    obstacles: &[Obstacle],
    request: &PairDistanceRequest,
    reporter: &ProgressReporter,
) -> Result<PairDistanceResult, EngineError> {
    run_with_rng(obstacles, request, reporter, &mut thread_rng())
}

/// [`run`] with a caller-supplied random source, for reproducible runs.
#[instrument(skip_all, name = "pair_distance_workflow")]
pub fn run_with_rng(
    obstacles: &[Obstacle],
    request: &PairDistanceRequest,
    reporter: &ProgressReporter,
    rng: &mut impl Rng,
) -> Result<PairDistanceResult, EngineError> {
    reporter.report(Progress::PhaseStart { name: "Site 1" });
    let mut av1 = AccessibleVolume::new(obstacles, request.source_1, request.parameters_1.clone())?;
    av1.resample()?;
    reporter.report(Progress::VolumeResampled {
        accessible_voxels: av1.accessible_points().len(),
    });
    reporter.report(Progress::PhaseFinish);

    reporter.report(Progress::PhaseStart { name: "Site 2" });
    let mut av2 = AccessibleVolume::new(obstacles, request.source_2, request.parameters_2.clone())?;
    av2.resample()?;
    reporter.report(Progress::VolumeResampled {
        accessible_voxels: av2.accessible_points().len(),
    });
    reporter.report(Progress::PhaseFinish);

    reporter.report(Progress::PhaseStart { name: "Reduction" });
    let value = distance::distance_with_rng(
        &av1,
        &av2,
        request.forster_radius,
        request.distance_type,
        request.n_samples,
        rng,
    );
    reporter.report(Progress::PhaseFinish);

    info!(
        distance = value,
        ?request.distance_type,
        accessible_1 = av1.accessible_points().len(),
        accessible_2 = av2.accessible_points().len(),
        "pair distance workflow finished"
    );
    Ok(PairDistanceResult {
        distance: value,
        mean_position_1: av1.mean_position(),
        mean_position_2: av2.mean_position(),
        accessible_voxels_1: av1.accessible_points().len(),
        accessible_voxels_2: av2.accessible_points().len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::sync::Mutex;

    fn small_parameters() -> AvParameters {
        AvParameters::builder()
            .linker_length(5.0)
            .linker_width(0.0)
            .radii([0.0, 0.0, 0.0])
            .allowed_sphere_radius(0.0)
            .grid_spacing(1.0)
            .build()
            .unwrap()
    }

    fn request(separation: f64) -> PairDistanceRequest {
        let mut request =
            PairDistanceRequest::new(Point3::origin(), Point3::new(separation, 0.0, 0.0));
        request.parameters_1 = small_parameters();
        request.parameters_2 = small_parameters();
        request.n_samples = 5_000;
        request
    }

    #[test]
    fn workflow_computes_a_finite_distance_in_open_space() {
        let reporter = ProgressReporter::new();
        let mut rng = StdRng::seed_from_u64(11);
        let result = run_with_rng(&[], &request(25.0), &reporter, &mut rng).unwrap();
        assert!(result.distance.is_finite());
        assert!((result.distance - 25.0).abs() < 2.0);
        assert!(result.accessible_voxels_1 > 0);
        assert!(result.accessible_voxels_2 > 0);
        assert!(result.mean_position_1.is_some());
    }

    #[test]
    fn mean_position_reduction_matches_engine_value() {
        let reporter = ProgressReporter::new();
        let mut req = request(25.0);
        req.distance_type = DistanceType::MeanPosition;
        let mut rng = StdRng::seed_from_u64(11);
        let result = run_with_rng(&[], &req, &reporter, &mut rng).unwrap();
        let expected = (result.mean_position_1.unwrap() - result.mean_position_2.unwrap()).norm();
        assert_eq!(result.distance, expected);
    }

    #[test]
    fn buried_site_reports_nan_distance() {
        let obstacles = [Obstacle::new(Point3::origin(), 50.0)];
        let reporter = ProgressReporter::new();
        let mut rng = StdRng::seed_from_u64(11);
        let result = run_with_rng(&obstacles, &request(25.0), &reporter, &mut rng).unwrap();
        assert!(result.distance.is_nan());
        assert_eq!(result.accessible_voxels_1, 0);
    }

    #[test]
    fn reporter_sees_all_three_phases() {
        let phases: Mutex<Vec<&'static str>> = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            if let Progress::PhaseStart { name } = event {
                phases.lock().unwrap().push(name);
            }
        }));
        let mut rng = StdRng::seed_from_u64(11);
        run_with_rng(&[], &request(25.0), &reporter, &mut rng).unwrap();
        drop(reporter);
        assert_eq!(
            phases.into_inner().unwrap(),
            vec!["Site 1", "Site 2", "Reduction"]
        );
    }

    #[test]
    fn invalid_parameters_abort_before_any_work() {
        let mut req = request(25.0);
        req.parameters_1.grid_spacing = 0.0;
        let reporter = ProgressReporter::new();
        assert!(run(&[], &req, &reporter).is_err());
    }
}
