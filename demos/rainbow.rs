#![no_std]
#![no_main]

use defmt::info;
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_time::Timer;
use panic_probe as _;
use pio_strip::rp::PioResources;
use pio_strip::{Result, Strip, StripConfig, StripStatic, hsv};

const LED_COUNT: usize = 30;
const HUE_SPREAD: f32 = 8.0;
const HUE_STEP: f32 = 2.5;
const VALUE: f32 = 0.4;

#[embassy_executor::main]
async fn main(_spawner: Spawner) -> ! {
    match inner_main().await {
        Ok(never) => match never {},
        Err(e) => panic!("Fatal error: {:?}", e),
    }
}

async fn inner_main() -> Result<core::convert::Infallible> {
    let p = embassy_rp::init(Default::default());

    let mut pio0 = PioResources::new(p.PIO0, [p.DMA_CH0.into()]);
    let pin = pio0.make_pin(p.PIN_16);

    static STRIP_STATIC: StripStatic<LED_COUNT> = StripStatic::new_static();
    let mut strip = Strip::new(&STRIP_STATIC, pin, StripConfig::new())?;
    strip.begin(&mut pio0)?;
    strip.enable_gamma(true);
    strip.set_brightness(128);

    info!("Rainbow demo starting ({} LEDs on GPIO16)", LED_COUNT);

    let mut hue = 0.0_f32;
    loop {
        for index in 0..strip.len() {
            strip.set_pixel(index, hsv(hue + index as f32 * HUE_SPREAD, 1.0, VALUE));
        }
        strip.show().await?;

        hue = (hue + HUE_STEP) % 360.0;
        Timer::after_millis(15).await;
    }
}
