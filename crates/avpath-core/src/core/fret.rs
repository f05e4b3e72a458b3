/// Converts a donor-acceptor distance into a FRET efficiency.
///
/// `E = 1 / (1 + (R / R0)^6)` where `R0` is the Förster radius.
pub fn fret_efficiency(distance: f64, forster_radius: f64) -> f64 {
    let rda_r0_6 = (distance / forster_radius).powi(6);
    1.0 / (1.0 + rda_r0_6)
}

/// Converts a FRET efficiency back into a distance.
///
/// Inverse of [`fret_efficiency`]: `R = R0 * (1/E - 1)^(1/6)`.
pub fn fret_distance(efficiency: f64, forster_radius: f64) -> f64 {
    forster_radius * (1.0 / efficiency - 1.0).powf(1.0 / 6.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn efficiency_is_half_at_forster_radius() {
        assert!(f64_approx_equal(fret_efficiency(52.0, 52.0), 0.5));
    }

    #[test]
    fn efficiency_approaches_one_at_contact() {
        assert!(fret_efficiency(1.0, 52.0) > 0.999_999);
    }

    #[test]
    fn efficiency_approaches_zero_far_away() {
        assert!(fret_efficiency(520.0, 52.0) < 1e-5);
    }

    #[test]
    fn distance_inverts_efficiency() {
        for r in [20.0, 45.0, 52.0, 80.0] {
            let e = fret_efficiency(r, 52.0);
            assert!(f64_approx_equal(fret_distance(e, 52.0), r));
        }
    }
}
