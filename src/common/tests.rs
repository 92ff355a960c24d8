use super::{Periodic, Vec2D, secs_f64};
use chrono::{TimeDelta, Utc};

#[test]
fn test_vec2d_distance_and_direction() {
    let a = Vec2D::new(0.0_f64, 0.0);
    let b = Vec2D::new(3.0_f64, 4.0);
    assert!((a.euclid_distance(&b) - 5.0).abs() < 1e-12);
    let dir = a.to(&b).normalize();
    assert!((dir.north() - 0.6).abs() < 1e-12);
    assert!((dir.east() - 0.8).abs() < 1e-12);
    assert!(b.in_radius_of(&Vec2D::new(3.1, 4.0), 0.2));
    assert!(!b.in_radius_of(&a, 4.99));
}

#[test]
fn test_vec2d_zero_normalize_is_identity() {
    let z: Vec2D<f64> = Vec2D::zero();
    assert_eq!(z.normalize(), z);
}

#[test]
fn test_periodic_fires_once_per_period() {
    let start = Utc::now();
    let mut p = Periodic::new(TimeDelta::milliseconds(500));
    assert!(p.due(start));
    assert!(!p.due(start + TimeDelta::milliseconds(499)));
    assert!(p.due(start + TimeDelta::milliseconds(500)));
    assert!(!p.due(start + TimeDelta::milliseconds(700)));
    p.reset();
    assert!(p.due(start + TimeDelta::milliseconds(701)));
}

#[test]
fn test_secs_f64() {
    assert!((secs_f64(TimeDelta::milliseconds(1500)) - 1.5).abs() < 1e-12);
    assert!((secs_f64(TimeDelta::milliseconds(-20)) + 0.02).abs() < 1e-12);
}
