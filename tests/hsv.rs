//! Host-level tests for HSV to RGB conversion.

use pio_strip::{Rgb, hsv};

#[test]
fn primary_hues() {
    assert_eq!(hsv(0.0, 1.0, 1.0), Rgb::new(255, 0, 0));
    assert_eq!(hsv(120.0, 1.0, 1.0), Rgb::new(0, 255, 0));
    assert_eq!(hsv(240.0, 1.0, 1.0), Rgb::new(0, 0, 255));
}

#[test]
fn secondary_hues() {
    assert_eq!(hsv(60.0, 1.0, 1.0), Rgb::new(255, 255, 0));
    assert_eq!(hsv(180.0, 1.0, 1.0), Rgb::new(0, 255, 255));
    assert_eq!(hsv(300.0, 1.0, 1.0), Rgb::new(255, 0, 255));
}

#[test]
fn hue_wraps() {
    assert_eq!(hsv(-120.0, 1.0, 1.0), hsv(240.0, 1.0, 1.0));
    assert_eq!(hsv(720.0, 1.0, 1.0), hsv(0.0, 1.0, 1.0));
    assert_eq!(hsv(360.0, 1.0, 1.0), Rgb::new(255, 0, 0));
}

#[test]
fn zero_saturation_is_grey() {
    for hue in [0.0, 45.0, 200.0, 359.0] {
        assert_eq!(hsv(hue, 0.0, 0.5), Rgb::new(128, 128, 128));
    }
}

#[test]
fn zero_value_is_black() {
    assert_eq!(hsv(90.0, 1.0, 0.0), Rgb::new(0, 0, 0));
}

#[test]
fn out_of_range_inputs_clamp() {
    assert_eq!(hsv(0.0, 2.0, 5.0), hsv(0.0, 1.0, 1.0));
    assert_eq!(hsv(0.0, -1.0, 1.0), Rgb::new(255, 255, 255));
    assert_eq!(hsv(0.0, 1.0, -3.0), Rgb::new(0, 0, 0));
}
