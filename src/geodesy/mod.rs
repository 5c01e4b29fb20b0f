//! Geodesic distances and the shared physical constants table.
//!
//! Every TD in the pipeline is derived from `SPEED_OF_LIGHT_KM_PER_US` and
//! distances computed here; no other module defines its own copies, so a
//! constant tweak cannot introduce cross-module bias.
//!
//! The distance model of record is the Vincenty inverse formula on the WGS84
//! ellipsoid. A spherical great-circle fallback exists only for the
//! non-convergent near-antipodal case, which cannot occur between points of
//! one chart-scale region; it is a guard, not a second model.

use crate::error::GridError;

/// Speed of light in vacuum, m/s.
pub const SPEED_OF_LIGHT_M_PER_S: f64 = 299_792_458.0;

/// Speed of light in km/µs. All TD math uses this form.
pub const SPEED_OF_LIGHT_KM_PER_US: f64 = 0.299_792_458;

/// WGS84 semi-major axis, meters.
pub const WGS84_A: f64 = 6_378_137.0;

/// WGS84 flattening.
pub const WGS84_F: f64 = 1.0 / 298.257_223_563;

/// WGS84 semi-minor axis, meters.
pub const WGS84_B: f64 = WGS84_A * (1.0 - WGS84_F);

/// Mean Earth radius, meters (spherical fallback only).
pub const MEAN_EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Convergence threshold for the Vincenty lambda iteration.
const VINCENTY_EPS: f64 = 1e-12;

/// Iteration cap; non-convergence beyond this means near-antipodal input.
const VINCENTY_MAX_ITERS: usize = 200;

/// Geodesic distance between two `(lat, lon)` points in kilometers.
///
/// Identical points yield exactly 0.0.
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    if lat1 == lat2 && lon1 == lon2 {
        return 0.0;
    }
    match vincenty_inverse_m(lat1, lon1, lat2, lon2) {
        Some(meters) => meters / 1000.0,
        None => haversine_m(lat1, lon1, lat2, lon2) / 1000.0,
    }
}

/// Baseline length between two stations in kilometers.
///
/// Unlike `distance_km`, a zero baseline is an error here: the hyperbolic
/// geometry of a master/secondary pair is undefined when the two coincide.
pub fn baseline_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> Result<f64, GridError> {
    let km = distance_km(lat1, lon1, lat2, lon2);
    if km == 0.0 {
        return Err(GridError::degenerate(format!(
            "coincident stations at ({lat1}, {lon1}): zero baseline"
        )));
    }
    Ok(km)
}

/// Vincenty inverse on WGS84. Returns `None` when the lambda iteration does
/// not converge (near-antipodal points).
fn vincenty_inverse_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> Option<f64> {
    let u1 = ((1.0 - WGS84_F) * lat1.to_radians().tan()).atan();
    let u2 = ((1.0 - WGS84_F) * lat2.to_radians().tan()).atan();
    let l = (lon2 - lon1).to_radians();

    let (sin_u1, cos_u1) = u1.sin_cos();
    let (sin_u2, cos_u2) = u2.sin_cos();

    let mut lambda = l;
    let mut iter = 0;
    let (cos_sq_alpha, sin_sigma, cos_sigma, sigma, cos_2sigma_m) = loop {
        let (sin_lambda, cos_lambda) = lambda.sin_cos();
        let sin_sigma = ((cos_u2 * sin_lambda).powi(2)
            + (cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda).powi(2))
        .sqrt();
        if sin_sigma == 0.0 {
            // Coincident points; caller already handles exact equality, this
            // catches numerically identical inputs.
            return Some(0.0);
        }
        let cos_sigma = sin_u1 * sin_u2 + cos_u1 * cos_u2 * cos_lambda;
        let sigma = sin_sigma.atan2(cos_sigma);
        let sin_alpha = cos_u1 * cos_u2 * sin_lambda / sin_sigma;
        let cos_sq_alpha = 1.0 - sin_alpha * sin_alpha;
        let cos_2sigma_m = if cos_sq_alpha == 0.0 {
            0.0 // equatorial line
        } else {
            cos_sigma - 2.0 * sin_u1 * sin_u2 / cos_sq_alpha
        };
        let c = WGS84_F / 16.0 * cos_sq_alpha * (4.0 + WGS84_F * (4.0 - 3.0 * cos_sq_alpha));
        let lambda_prev = lambda;
        lambda = l
            + (1.0 - c)
                * WGS84_F
                * sin_alpha
                * (sigma
                    + c * sin_sigma
                        * (cos_2sigma_m
                            + c * cos_sigma * (-1.0 + 2.0 * cos_2sigma_m * cos_2sigma_m)));

        if (lambda - lambda_prev).abs() < VINCENTY_EPS {
            break (cos_sq_alpha, sin_sigma, cos_sigma, sigma, cos_2sigma_m);
        }
        iter += 1;
        if iter >= VINCENTY_MAX_ITERS {
            return None;
        }
    };

    let u_sq = cos_sq_alpha * (WGS84_A * WGS84_A - WGS84_B * WGS84_B) / (WGS84_B * WGS84_B);
    let a = 1.0 + u_sq / 16384.0 * (4096.0 + u_sq * (-768.0 + u_sq * (320.0 - 175.0 * u_sq)));
    let b = u_sq / 1024.0 * (256.0 + u_sq * (-128.0 + u_sq * (74.0 - 47.0 * u_sq)));
    let delta_sigma = b
        * sin_sigma
        * (cos_2sigma_m
            + b / 4.0
                * (cos_sigma * (-1.0 + 2.0 * cos_2sigma_m * cos_2sigma_m)
                    - b / 6.0
                        * cos_2sigma_m
                        * (-3.0 + 4.0 * sin_sigma * sin_sigma)
                        * (-3.0 + 4.0 * cos_2sigma_m * cos_2sigma_m)));

    Some(WGS84_B * a * (sigma - delta_sigma))
}

/// Spherical great-circle distance in meters (fallback path only).
fn haversine_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    2.0 * MEAN_EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
}
