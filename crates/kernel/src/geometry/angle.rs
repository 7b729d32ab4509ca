/// Wrap an angle in degrees into `[-180, 180)`.
pub fn normalize_degrees(angle: f64) -> f64 {
    (angle + 180.0).rem_euclid(360.0) - 180.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_degrees() {
        assert_eq!(normalize_degrees(0.0), 0.0);
        assert_eq!(normalize_degrees(180.0), -180.0);
        assert_eq!(normalize_degrees(-180.0), -180.0);
        assert_eq!(normalize_degrees(270.0), -90.0);
        assert_eq!(normalize_degrees(-450.0), -90.0);
        assert_eq!(normalize_degrees(725.0), 5.0);
    }
}
