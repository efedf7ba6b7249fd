//! Earth orientation: precession, nutation, obliquity and sidereal time.
//!
//! All matrices returned here are **frame** rotations acting on column vectors:
//!
//! ```text
//! x_mean_of_date = prec(t) · x_J2000
//! x_true_of_date = rnut80(t) · x_mean_of_date
//! ```
//!
//! Time arguments named `tjm` are Modified Julian Dates in the TT scale unless
//! stated otherwise. UT1 is approximated by UTC by the callers.
use nalgebra::{Matrix3, Rotation3, Vector3};

use crate::{
    constants::{ArcSec, Radian, DPI, RADEG, RADSEC, T2000},
    time::gmst,
};

/// Coordinate axis of an elementary rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Elementary rotation matrix of angle `alpha` (radians) around `axis`.
///
/// The matrix rotates a vector counter-clockwise; the matching frame rotation of
/// angle `a` is therefore `rotmt(-a, axis)`.
pub fn rotmt(alpha: Radian, axis: Axis) -> Matrix3<f64> {
    let axis = match axis {
        Axis::X => Vector3::x_axis(),
        Axis::Y => Vector3::y_axis(),
        Axis::Z => Vector3::z_axis(),
    };

    Rotation3::from_axis_angle(&axis, alpha).into()
}

/// Compute the mean obliquity of the ecliptic at a given epoch (IAU 1976 model).
///
/// Arguments
/// ---------
/// * `tjm`: Modified Julian Date (TT scale).
///
/// Returns
/// --------
/// * Mean obliquity of the ecliptic in radians.
pub fn obleq(tjm: f64) -> Radian {
    let ob0 = ((23.0 * 3600.0 + 26.0 * 60.0) + 21.448) * RADSEC;
    let ob1 = -46.815 * RADSEC;
    let ob2 = -0.0006 * RADSEC;
    let ob3 = 0.00181 * RADSEC;

    let t = (tjm - T2000) / 36525.0;

    ((ob3 * t + ob2) * t + ob1) * t + ob0
}

/// One periodic term of the IAU 1980 nutation series.
///
/// Multipliers of the fundamental arguments `(D, M, M', F, Ω)` followed by the
/// sine coefficients of Δψ and the cosine coefficients of Δε, in 0.0001″
/// (constant part and rate per Julian century).
struct NutationTerm {
    args: [i8; 5],
    psi: (f64, f64),
    eps: (f64, f64),
}

const fn term(args: [i8; 5], psi: (f64, f64), eps: (f64, f64)) -> NutationTerm {
    NutationTerm { args, psi, eps }
}

/// Terms of the IAU 1980 series down to 0.0003″.
#[rustfmt::skip]
const NUTATION_TERMS: [NutationTerm; 63] = [
    term([ 0,  0,  0,  0, 1], (-171996.0, -174.2), (92025.0,  8.9)),
    term([-2,  0,  0,  2, 2], ( -13187.0,   -1.6), ( 5736.0, -3.1)),
    term([ 0,  0,  0,  2, 2], (  -2274.0,   -0.2), (  977.0, -0.5)),
    term([ 0,  0,  0,  0, 2], (   2062.0,    0.2), ( -895.0,  0.5)),
    term([ 0,  1,  0,  0, 0], (   1426.0,   -3.4), (   54.0, -0.1)),
    term([ 0,  0,  1,  0, 0], (    712.0,    0.1), (   -7.0,  0.0)),
    term([-2,  1,  0,  2, 2], (   -517.0,    1.2), (  224.0, -0.6)),
    term([ 0,  0,  0,  2, 1], (   -386.0,   -0.4), (  200.0,  0.0)),
    term([ 0,  0,  1,  2, 2], (   -301.0,    0.0), (  129.0, -0.1)),
    term([-2, -1,  0,  2, 2], (    217.0,   -0.5), (  -95.0,  0.3)),
    term([-2,  0,  1,  0, 0], (   -158.0,    0.0), (    0.0,  0.0)),
    term([-2,  0,  0,  2, 1], (    129.0,    0.1), (  -70.0,  0.0)),
    term([ 0,  0, -1,  2, 2], (    123.0,    0.0), (  -53.0,  0.0)),
    term([ 2,  0,  0,  0, 0], (     63.0,    0.0), (    0.0,  0.0)),
    term([ 0,  0,  1,  0, 1], (     63.0,    0.1), (  -33.0,  0.0)),
    term([ 2,  0, -1,  2, 2], (    -59.0,    0.0), (   26.0,  0.0)),
    term([ 0,  0, -1,  0, 1], (    -58.0,   -0.1), (   32.0,  0.0)),
    term([ 0,  0,  1,  2, 1], (    -51.0,    0.0), (   27.0,  0.0)),
    term([-2,  0,  2,  0, 0], (     48.0,    0.0), (    0.0,  0.0)),
    term([ 0,  0, -2,  2, 1], (     46.0,    0.0), (  -24.0,  0.0)),
    term([ 2,  0,  0,  2, 2], (    -38.0,    0.0), (   16.0,  0.0)),
    term([ 0,  0,  2,  2, 2], (    -31.0,    0.0), (   13.0,  0.0)),
    term([ 0,  0,  2,  0, 0], (     29.0,    0.0), (    0.0,  0.0)),
    term([-2,  0,  1,  2, 2], (     29.0,    0.0), (  -12.0,  0.0)),
    term([ 0,  0,  0,  2, 0], (     26.0,    0.0), (    0.0,  0.0)),
    term([-2,  0,  0,  2, 0], (    -22.0,    0.0), (    0.0,  0.0)),
    term([ 0,  0, -1,  2, 1], (     21.0,    0.0), (  -10.0,  0.0)),
    term([ 0,  2,  0,  0, 0], (     17.0,   -0.1), (    0.0,  0.0)),
    term([ 2,  0, -1,  0, 1], (     16.0,    0.0), (   -8.0,  0.0)),
    term([-2,  2,  0,  2, 2], (    -16.0,    0.1), (    7.0,  0.0)),
    term([ 0,  1,  0,  0, 1], (    -15.0,    0.0), (    9.0,  0.0)),
    term([-2,  0,  1,  0, 1], (    -13.0,    0.0), (    7.0,  0.0)),
    term([ 0, -1,  0,  0, 1], (    -12.0,    0.0), (    6.0,  0.0)),
    term([ 0,  0,  2, -2, 0], (     11.0,    0.0), (    0.0,  0.0)),
    term([ 2,  0, -1,  2, 1], (    -10.0,    0.0), (    5.0,  0.0)),
    term([ 2,  0,  1,  2, 2], (     -8.0,    0.0), (    3.0,  0.0)),
    term([ 0,  1,  0,  2, 2], (      7.0,    0.0), (   -3.0,  0.0)),
    term([-2,  1,  1,  0, 0], (     -7.0,    0.0), (    0.0,  0.0)),
    term([ 0, -1,  0,  2, 2], (     -7.0,    0.0), (    3.0,  0.0)),
    term([ 2,  0,  0,  2, 1], (     -7.0,    0.0), (    3.0,  0.0)),
    term([ 2,  0,  1,  0, 0], (      6.0,    0.0), (    0.0,  0.0)),
    term([-2,  0,  2,  2, 2], (      6.0,    0.0), (   -3.0,  0.0)),
    term([-2,  0,  1,  2, 1], (      6.0,    0.0), (   -3.0,  0.0)),
    term([ 2,  0, -2,  0, 1], (     -6.0,    0.0), (    3.0,  0.0)),
    term([ 2,  0,  0,  0, 1], (     -6.0,    0.0), (    3.0,  0.0)),
    term([ 0, -1,  1,  0, 0], (      5.0,    0.0), (    0.0,  0.0)),
    term([-2, -1,  0,  2, 1], (     -5.0,    0.0), (    3.0,  0.0)),
    term([-2,  0,  0,  0, 1], (     -5.0,    0.0), (    3.0,  0.0)),
    term([ 0,  0,  2,  2, 1], (     -5.0,    0.0), (    3.0,  0.0)),
    term([-2,  0,  2,  0, 1], (      4.0,    0.0), (    0.0,  0.0)),
    term([-2,  1,  0,  2, 1], (      4.0,    0.0), (    0.0,  0.0)),
    term([ 0,  0,  1, -2, 0], (      4.0,    0.0), (    0.0,  0.0)),
    term([-1,  0,  1,  0, 0], (     -4.0,    0.0), (    0.0,  0.0)),
    term([-2,  1,  0,  0, 0], (     -4.0,    0.0), (    0.0,  0.0)),
    term([ 1,  0,  0,  0, 0], (     -4.0,    0.0), (    0.0,  0.0)),
    term([ 0,  0,  1,  2, 0], (      3.0,    0.0), (    0.0,  0.0)),
    term([ 0,  0, -2,  2, 2], (     -3.0,    0.0), (    0.0,  0.0)),
    term([-1, -1,  1,  0, 0], (     -3.0,    0.0), (    0.0,  0.0)),
    term([ 0,  1,  1,  0, 0], (     -3.0,    0.0), (    0.0,  0.0)),
    term([ 0, -1,  1,  2, 2], (     -3.0,    0.0), (    0.0,  0.0)),
    term([ 2, -1, -1,  2, 2], (     -3.0,    0.0), (    0.0,  0.0)),
    term([ 0,  0,  3,  2, 2], (     -3.0,    0.0), (    0.0,  0.0)),
    term([ 2, -1,  0,  2, 2], (     -3.0,    0.0), (    0.0,  0.0)),
];

/// Compute the nutation angles in longitude and obliquity (IAU 1980, Wahr).
///
/// The five fundamental lunisolar arguments are cubic polynomials in Julian
/// centuries from J2000; the angles are sums of the periodic terms of
/// [`NUTATION_TERMS`].
///
/// Arguments
/// ---------
/// * `tjm`: Modified Julian Date (TT scale).
///
/// Returns
/// --------
/// * `(Δψ, Δε)` in arcseconds.
pub fn nutn80(tjm: f64) -> (ArcSec, ArcSec) {
    let t = (tjm - T2000) / 36525.0;
    let t2 = t * t;
    let t3 = t2 * t;

    // Mean elongation of the Moon from the Sun
    let d = ((1072261.307 + 1602961601.328 * t - 6.891 * t2 + 0.019 * t3) * RADSEC) % DPI;
    // Mean anomaly of the Sun
    let m = ((1287099.804 + 129596581.224 * t - 0.577 * t2 - 0.012 * t3) * RADSEC) % DPI;
    // Mean anomaly of the Moon
    let mp = ((485866.733 + 1717915922.633 * t + 31.310 * t2 + 0.064 * t3) * RADSEC) % DPI;
    // Moon's argument of latitude
    let f = ((335778.877 + 1739527263.137 * t - 13.257 * t2 + 0.011 * t3) * RADSEC) % DPI;
    // Longitude of the Moon's ascending node
    let om = ((450160.280 - 6962890.539 * t + 7.455 * t2 + 0.008 * t3) * RADSEC) % DPI;

    let fundamentals = [d, m, mp, f, om];

    let (dpsi, deps) = NUTATION_TERMS.iter().fold((0.0, 0.0), |(dpsi, deps), nt| {
        let arg: f64 = nt
            .args
            .iter()
            .zip(fundamentals.iter())
            .map(|(&k, &a)| k as f64 * a)
            .sum();
        (
            dpsi + (nt.psi.0 + nt.psi.1 * t) * arg.sin(),
            deps + (nt.eps.0 + nt.eps.1 * t) * arg.cos(),
        )
    });

    // 0.0001″ → ″
    (dpsi * 1e-4, deps * 1e-4)
}

/// True obliquity of the ecliptic (mean obliquity plus nutation in obliquity), radians.
pub fn true_obliquity(tjm: f64) -> Radian {
    let (_, deps) = nutn80(tjm);
    obleq(tjm) + deps * RADSEC
}

/// Nutation matrix (IAU 1980) from the mean to the true equator and equinox of date.
///
/// Built from three frame rotations: about X by the mean obliquity ε, about Z by
/// −Δψ, and back about X by −(ε + Δε).
///
/// Arguments
/// ---------
/// * `tjm`: Modified Julian Date (TT scale).
///
/// Returns
/// --------
/// * `N` such that `x_true = N · x_mean`.
pub fn rnut80(tjm: f64) -> Matrix3<f64> {
    let epsm = obleq(tjm);
    let (dpsi, deps) = nutn80(tjm);

    let dpsi = dpsi * RADSEC;
    let epst = epsm + deps * RADSEC;

    rotmt(epst, Axis::X) * rotmt(dpsi, Axis::Z) * rotmt(-epsm, Axis::X)
}

/// Compute the equation of the equinoxes in radians.
///
/// ```text
/// Eq_eq = Δψ · cos(ε)
/// ```
pub fn equequ(tjm: f64) -> Radian {
    let oblm = obleq(tjm);
    let (dpsi, _deps) = nutn80(tjm);

    RADSEC * dpsi * oblm.cos()
}

/// Precession matrix (IAU 1976) from J2000 to the mean equator and equinox of date.
///
/// ```text
/// ζ(T) = (0.6406161 + 0.0000839·T + 0.0000050·T²) · T  [deg]
/// θ(T) = (0.5567530 - 0.0001185·T - 0.0000116·T²) · T  [deg]
/// z(T) = (0.6406161 + 0.0003041·T + 0.0000051·T²) · T  [deg]
/// P    = R3(−z) · R2(θ) · R3(−ζ)
/// ```
///
/// Arguments
/// ---------
/// * `tjm`: Modified Julian Date (TT scale).
///
/// Returns
/// --------
/// * `P` such that `x_mean_of_date = P · x_J2000`.
pub fn prec(tjm: f64) -> Matrix3<f64> {
    let zed = 0.6406161 * RADEG;
    let zd = 0.6406161 * RADEG;
    let thd = 0.5567530 * RADEG;

    let zedd = 0.0000839 * RADEG;
    let zdd = 0.0003041 * RADEG;
    let thdd = -0.0001185 * RADEG;

    let zeddd = 0.0000050 * RADEG;
    let zddd = 0.0000051 * RADEG;
    let thddd = -0.0000116 * RADEG;

    let t = (tjm - T2000) / 36525.0;

    let zeta = ((zeddd * t + zedd) * t + zed) * t;
    let z = ((zddd * t + zdd) * t + zd) * t;
    let theta = ((thddd * t + thdd) * t + thd) * t;

    rotmt(z, Axis::Z) * rotmt(-theta, Axis::Y) * rotmt(zeta, Axis::Z)
}

/// Rotation from the J2000 equator (ICRF axes) to the true equator and equinox of date.
pub fn j2000_to_true_of_date(tjm: f64) -> Matrix3<f64> {
    rnut80(tjm) * prec(tjm)
}

/// Greenwich apparent sidereal time in radians, normalized to `[0, 2π)`.
///
/// Arguments
/// ---------
/// * `tjm_ut1`: Modified Julian Date in UT1 (UTC is used as a proxy).
/// * `tjm_tt`: the same instant as a TT Modified Julian Date.
pub fn gast(tjm_ut1: f64, tjm_tt: f64) -> Radian {
    (gmst(tjm_ut1) + equequ(tjm_tt)).rem_euclid(DPI)
}
