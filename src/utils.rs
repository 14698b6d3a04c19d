/// Signed shortest difference `to - from` in degrees, in (-180, 180].
pub fn angle_diff(from_deg: f64, to_deg: f64) -> f64 {
    let mut diff = (to_deg - from_deg).rem_euclid(360.0);
    if diff > 180.0 {
        diff -= 360.0;
    }
    diff
}

/// True if `angle_deg` lies within `half_width_deg` of `center_deg`.
pub fn within_arc(center_deg: f64, half_width_deg: f64, angle_deg: f64) -> bool {
    angle_diff(center_deg, angle_deg).abs() <= half_width_deg + 1e-9
}

/// Counts a timer down towards zero, never below it.
pub fn tick_down(timer: &mut f64, dt: f64) {
    *timer = (*timer - dt).max(0.0);
}
