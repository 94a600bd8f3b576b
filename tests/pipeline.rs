//! Host-level tests for the pixel pipeline: gamma, brightness, and word packing.

use pio_strip::{ColorPipeline, GammaTable, Variant, rgbw, scale_brightness};

#[test]
fn brightness_255_is_identity() {
    for value in 0..=u8::MAX {
        assert_eq!(scale_brightness(value, 255), value);
    }
}

#[test]
fn brightness_0_is_black() {
    for value in 0..=u8::MAX {
        assert_eq!(scale_brightness(value, 0), 0);
    }
}

#[test]
fn brightness_rounds_to_nearest() {
    assert_eq!(scale_brightness(255, 128), 128);
    // 128 / 255 = 0.502 rounds up, 127 / 255 = 0.498 rounds down.
    assert_eq!(scale_brightness(1, 128), 1);
    assert_eq!(scale_brightness(1, 127), 0);
    assert_eq!(scale_brightness(100, 50), 20);
}

#[test]
fn identity_table_maps_every_level_to_itself() {
    let table = GammaTable::identity();
    for level in 0..=u8::MAX {
        assert_eq!(table.get(level), level);
    }
}

#[test]
fn gamma_table_is_monotonic_with_fixed_ends() {
    let table = GammaTable::power_2_2();
    assert_eq!(table.get(0), 0);
    assert_eq!(table.get(255), 255);
    assert!(table.as_array().is_sorted(), "gamma table must be non-decreasing");
    assert!(table.get(128) < 128, "midtones get darker");
}

#[test]
fn enable_gamma_switches_tables() {
    let mut pipeline = ColorPipeline::new(Variant::Rgb);
    assert!(!pipeline.gamma_enabled());
    assert_eq!(pipeline.gamma_table(), &GammaTable::identity());

    pipeline.enable_gamma(true);
    assert!(pipeline.gamma_enabled());
    assert_eq!(pipeline.gamma_table(), &GammaTable::power_2_2());

    pipeline.enable_gamma(false);
    assert_eq!(pipeline.gamma_table(), &GammaTable::identity());
}

#[test]
fn rgb_word_is_grb_shifted_into_top_bits() {
    let pipeline = ColorPipeline::new(Variant::Rgb);
    assert_eq!(pipeline.encode(rgbw(10, 20, 30, 0)), 0x140A_1E00);
}

#[test]
fn rgb_word_drops_white() {
    let pipeline = ColorPipeline::new(Variant::Rgb);
    assert_eq!(pipeline.encode(rgbw(10, 20, 30, 40)), 0x140A_1E00);
}

#[test]
fn rgbw_word_is_grbw_unshifted() {
    let pipeline = ColorPipeline::new(Variant::Rgbw);
    assert_eq!(pipeline.encode(rgbw(10, 20, 30, 40)), 0x140A_1E28);
}

#[test]
fn full_brightness_without_gamma_round_trips_channels() {
    let pipeline = ColorPipeline::new(Variant::Rgbw);
    for value in [0u8, 1, 77, 128, 254, 255] {
        let color = rgbw(value, value.wrapping_add(1), value / 2, 255 - value);
        let [g, r, b, w] = pipeline.encode(color).to_be_bytes();
        assert_eq!((r, g, b, w), (color.r, color.g, color.b, color.a.0));
    }
}

#[test]
fn gamma_applies_before_brightness() {
    let mut pipeline = ColorPipeline::new(Variant::Rgb);
    pipeline.enable_gamma(true);
    pipeline.set_brightness(128);

    let expected = scale_brightness(GammaTable::power_2_2().get(200), 128);
    let [g, r, b, pad] = pipeline.encode(rgbw(200, 0, 0, 0)).to_be_bytes();
    assert_eq!((g, r, b, pad), (0, expected, 0, 0));
}
