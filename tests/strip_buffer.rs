//! Host-level tests for the strip's pixel buffer and rendering settings.

use embassy_futures::block_on;
use pio_strip::sim::{SimBus, SimResources};
use pio_strip::{BLACK, Error, Rgb, Strip, StripConfig, StripStatic, rgbw};

type SimStrip<'a, const N: usize> = Strip<SimResources<'a>, N>;

#[test]
fn new_strip_is_black_and_idle() {
    static STRIP_STATIC: StripStatic<5> = StripStatic::new_static();
    let strip: SimStrip<'_, 5> = Strip::new(&STRIP_STATIC, 16, StripConfig::new()).unwrap();

    assert_eq!(strip.len(), 5);
    assert_eq!(SimStrip::<5>::LEN, 5);
    assert!(!strip.is_empty());
    assert!(!strip.is_started());
    assert!(!strip.is_busy());
    assert_eq!(strip.brightness(), 255);
    assert!(!strip.gamma_enabled());
    assert!(strip.pixels().iter().all(|pixel| *pixel == BLACK));
}

#[test]
fn static_backs_only_one_strip() {
    static STRIP_STATIC: StripStatic<3> = StripStatic::new_static();
    let _first: SimStrip<'_, 3> = Strip::new(&STRIP_STATIC, 0, StripConfig::new()).unwrap();
    let second: Result<SimStrip<'_, 3>, Error> = Strip::new(&STRIP_STATIC, 1, StripConfig::new());
    assert!(matches!(second, Err(Error::StaticAlreadyUsed)));
}

#[test]
fn set_pixel_stores_color() {
    static STRIP_STATIC: StripStatic<4> = StripStatic::new_static();
    let mut strip: SimStrip<'_, 4> = Strip::new(&STRIP_STATIC, 0, StripConfig::new()).unwrap();

    strip.set_pixel(0, Rgb::new(1, 2, 3));
    strip.set_pixel(1, rgbw(4, 5, 6, 7));
    strip.set_pixel_rgb(3, 8, 9, 10);

    assert_eq!(strip.pixel(0), Some(rgbw(1, 2, 3, 0)));
    assert_eq!(strip.pixel(1), Some(rgbw(4, 5, 6, 7)));
    assert_eq!(strip.pixel(2), Some(BLACK));
    assert_eq!(strip.pixel(3), Some(rgbw(8, 9, 10, 0)));
    assert_eq!(strip.pixel(4), None);
}

#[test]
fn out_of_range_set_pixel_is_ignored() {
    static STRIP_STATIC: StripStatic<4> = StripStatic::new_static();
    let mut strip: SimStrip<'_, 4> = Strip::new(&STRIP_STATIC, 0, StripConfig::new()).unwrap();
    strip.set_all(Rgb::new(9, 9, 9));
    let before = *strip.pixels();

    strip.set_pixel(4, Rgb::new(255, 0, 0));
    strip.set_pixel(usize::MAX, rgbw(1, 1, 1, 1));
    strip.set_pixel_rgb(100, 1, 2, 3);

    assert_eq!(*strip.pixels(), before);
}

#[test]
fn rgb_strip_keeps_white_in_buffer() {
    static STRIP_STATIC: StripStatic<2> = StripStatic::new_static();
    let mut strip: SimStrip<'_, 2> = Strip::new(&STRIP_STATIC, 0, StripConfig::new()).unwrap();
    strip.set_pixel(0, rgbw(10, 20, 30, 40));
    assert_eq!(strip.pixel(0), Some(rgbw(10, 20, 30, 40)));
}

#[test]
fn set_all_and_clear() {
    static STRIP_STATIC: StripStatic<6> = StripStatic::new_static();
    let mut strip: SimStrip<'_, 6> = Strip::new(&STRIP_STATIC, 0, StripConfig::new().rgbw()).unwrap();

    strip.set_all((1, 2, 3, 4));
    assert!(strip.pixels().iter().all(|pixel| *pixel == rgbw(1, 2, 3, 4)));

    strip.clear();
    assert!(strip.pixels().iter().all(|pixel| *pixel == BLACK));
}

#[test]
fn brightness_and_gamma_do_not_touch_buffer() {
    static STRIP_STATIC: StripStatic<2> = StripStatic::new_static();
    let mut strip: SimStrip<'_, 2> = Strip::new(&STRIP_STATIC, 0, StripConfig::new()).unwrap();
    strip.set_pixel(0, Rgb::new(200, 100, 50));

    strip.set_brightness(10);
    strip.enable_gamma(true);

    assert_eq!(strip.brightness(), 10);
    assert!(strip.gamma_enabled());
    assert_eq!(strip.pixel(0), Some(rgbw(200, 100, 50, 0)));
}

#[test]
fn clear_then_show_sends_zero_words() {
    static STRIP_STATIC: StripStatic<8> = StripStatic::new_static();
    let bus = SimBus::new();
    let mut resources = SimResources::new(&bus, 1);
    let mut strip = Strip::new(&STRIP_STATIC, 0, StripConfig::new()).unwrap();
    strip.begin(&mut resources).unwrap();

    strip.set_all(Rgb::new(255, 255, 255));
    strip.clear();
    block_on(strip.show()).unwrap();

    assert_eq!(strip.frame(), &[0u32; 8]);
    let wire = bus.wire();
    assert_eq!(wire.len(), 8);
    assert!(wire.iter().all(|wire_word| wire_word.word == 0));
}

#[test]
fn show_sends_buffer_in_index_order() {
    static STRIP_STATIC: StripStatic<3> = StripStatic::new_static();
    let bus = SimBus::new();
    let mut resources = SimResources::new(&bus, 0);
    let mut strip = Strip::new(&STRIP_STATIC, 0, StripConfig::new().rgbw()).unwrap();
    strip.begin(&mut resources).unwrap();

    strip.set_pixel(0, rgbw(10, 20, 30, 40));
    strip.set_pixel(2, Rgb::new(1, 2, 3));
    block_on(strip.show()).unwrap();

    let words = bus.words_from(0);
    assert_eq!(words.as_slice(), &[0x140A_1E28, 0, 0x0201_0300]);
    assert!(bus.wire().iter().all(|wire_word| wire_word.bits == 32));
}

#[test]
fn show_applies_brightness_at_send_time() {
    static STRIP_STATIC: StripStatic<1> = StripStatic::new_static();
    let bus = SimBus::new();
    let mut resources = SimResources::new(&bus, 0);
    let mut strip = Strip::new(&STRIP_STATIC, 0, StripConfig::new()).unwrap();
    strip.begin(&mut resources).unwrap();

    strip.set_pixel(0, Rgb::new(255, 255, 255));
    strip.set_brightness(128);
    block_on(strip.show()).unwrap();
    assert_eq!(strip.frame(), &[0x8080_8000]);

    strip.set_brightness(255);
    block_on(strip.show()).unwrap();
    assert_eq!(strip.frame(), &[0xFFFF_FF00]);
}

#[test]
fn begin_clears_buffer() {
    static STRIP_STATIC: StripStatic<2> = StripStatic::new_static();
    let bus = SimBus::new();
    let mut resources = SimResources::new(&bus, 0);
    let mut strip = Strip::new(&STRIP_STATIC, 0, StripConfig::new()).unwrap();
    strip.set_all(Rgb::new(5, 5, 5));

    strip.begin(&mut resources).unwrap();

    assert!(strip.pixels().iter().all(|pixel| *pixel == BLACK));
    assert!(bus.wire().is_empty(), "begin sends nothing");
}
