//! RP2040/RP2350 backend: PIO state machines drive the data pin, DMA
//! channels feed them.
//!
//! One [`PioResources`] wraps one PIO block. It owns the block's four state
//! machines, the DMA channels you hand it, and the slot the WS2812 timing
//! program is loaded into (once, on the first claim).

use core::sync::atomic::{Ordering, compiler_fence};

use embassy_rp::Peri;
use embassy_rp::clocks::clk_sys_freq;
use embassy_rp::dma::{AnyChannel, Channel};
use embassy_rp::pac;
use embassy_rp::pio::program::{Assembler, JmpCondition, OutDestination, SetDestination, SideSet};
use embassy_rp::pio::{
    Common, Config, FifoJoin, Instance, LoadedProgram, Pin, Pio, PioPin, ShiftConfig,
    ShiftDirection, StateMachine,
};
use fixed::types::U24F8;
use heapless::Vec;

use crate::frame::FrameWords;
use crate::hardware::{
    BitStreamTransmitter, ChannelSelect, OffloadEngine, StripResources, T1, T2, T3, WireTiming,
};
use crate::{Error, Result};

/// Most DMA channels any supported chip has.
pub const MAX_DMA_CHANNELS: usize = 16;

/// PIO peripherals a strip can run on.
#[doc(hidden)] // Plumbing for PioResources; implemented for every PIO block.
pub trait StripPio: Instance {
    /// The interrupt binding type for this PIO
    type Irqs: embassy_rp::interrupt::typelevel::Binding<
            <Self as Instance>::Interrupt,
            embassy_rp::pio::InterruptHandler<Self>,
        >;

    /// Block number, used to compute DMA request lines.
    const BLOCK: u8;

    fn irqs() -> Self::Irqs;

    fn regs() -> pac::pio::Pio;
}

impl StripPio for embassy_rp::peripherals::PIO0 {
    type Irqs = crate::pio_irqs::Pio0Irqs;
    const BLOCK: u8 = 0;

    fn irqs() -> Self::Irqs {
        crate::pio_irqs::Pio0Irqs
    }

    fn regs() -> pac::pio::Pio {
        pac::PIO0
    }
}

impl StripPio for embassy_rp::peripherals::PIO1 {
    type Irqs = crate::pio_irqs::Pio1Irqs;
    const BLOCK: u8 = 1;

    fn irqs() -> Self::Irqs {
        crate::pio_irqs::Pio1Irqs
    }

    fn regs() -> pac::pio::Pio {
        pac::PIO1
    }
}

#[cfg(feature = "pico2")]
impl StripPio for embassy_rp::peripherals::PIO2 {
    type Irqs = crate::pio_irqs::Pio2Irqs;
    const BLOCK: u8 = 2;

    fn irqs() -> Self::Irqs {
        crate::pio_irqs::Pio2Irqs
    }

    fn regs() -> pac::pio::Pio {
        pac::PIO2
    }
}

fn load_ws2812_program<'d, PIO: Instance>(
    common: &mut Common<'d, PIO>,
) -> Result<LoadedProgram<'d, PIO>> {
    let side_set = SideSet::new(false, 1, false);
    let mut assembler: Assembler<32> = Assembler::new_with_side_set(side_set);

    let mut wrap_target = assembler.label();
    let mut wrap_source = assembler.label();
    let mut do_zero = assembler.label();
    assembler.set_with_side_set(SetDestination::PINDIRS, 1, 0);
    assembler.bind(&mut wrap_target);
    assembler.out_with_delay_and_side_set(OutDestination::X, 1, T3 - 1, 0);
    assembler.jmp_with_delay_and_side_set(JmpCondition::XIsZero, &mut do_zero, T1 - 1, 1);
    assembler.jmp_with_delay_and_side_set(JmpCondition::Always, &mut wrap_target, T2 - 1, 1);
    assembler.bind(&mut do_zero);
    assembler.nop_with_delay_and_side_set(T2 - 1, 0);
    assembler.bind(&mut wrap_source);

    let program = assembler.assemble_with_wrap(wrap_source, wrap_target);
    common
        .try_load_program(&program)
        .map_err(|_| Error::ProgramLoad)
}

/// Claim pool for one PIO block.
///
/// ```ignore
/// let mut pio0 = PioResources::new(p.PIO0, [p.DMA_CH0.into(), p.DMA_CH1.into()]);
/// let pin = pio0.make_pin(p.PIN_16);
/// ```
pub struct PioResources<'d, PIO: StripPio> {
    common: Common<'d, PIO>,
    program: Option<LoadedProgram<'d, PIO>>,
    sm0: Option<StateMachine<'d, PIO, 0>>,
    sm1: Option<StateMachine<'d, PIO, 1>>,
    sm2: Option<StateMachine<'d, PIO, 2>>,
    sm3: Option<StateMachine<'d, PIO, 3>>,
    dma_channels: Vec<Peri<'d, AnyChannel>, MAX_DMA_CHANNELS>,
}

impl<'d, PIO: StripPio> PioResources<'d, PIO> {
    /// Splits the PIO block (binding its interrupt) and takes ownership of the DMA channels.
    ///
    /// At most [`MAX_DMA_CHANNELS`] channels are kept.
    pub fn new<const DMA: usize>(
        pio: Peri<'d, PIO>,
        dma_channels: [Peri<'d, AnyChannel>; DMA],
    ) -> Self {
        let Pio {
            common,
            sm0,
            sm1,
            sm2,
            sm3,
            ..
        } = Pio::new(pio, PIO::irqs());
        let mut channels = Vec::new();
        for channel in dma_channels {
            if channels.push(channel).is_err() {
                break;
            }
        }
        Self {
            common,
            program: None,
            sm0: Some(sm0),
            sm1: Some(sm1),
            sm2: Some(sm2),
            sm3: Some(sm3),
            dma_channels: channels,
        }
    }

    /// Hands a GPIO to this PIO block so a strip can drive it.
    pub fn make_pin(&mut self, pin: Peri<'d, impl PioPin>) -> Pin<'d, PIO> {
        self.common.make_pio_pin(pin)
    }

    #[must_use]
    pub const fn program_loaded(&self) -> bool {
        self.program.is_some()
    }

    #[must_use]
    pub fn free_dma_channels(&self) -> usize {
        self.dma_channels.len()
    }

    fn ensure_program(&mut self) -> Result<()> {
        if self.program.is_none() {
            let program = load_ws2812_program(&mut self.common)?;
            #[cfg(feature = "defmt")]
            defmt::debug!("WS2812 program loaded on PIO{}", PIO::BLOCK);
            self.program = Some(program);
        }
        Ok(())
    }

    fn pick(&self, channel: ChannelSelect) -> Result<u8> {
        let free = [
            self.sm0.is_some(),
            self.sm1.is_some(),
            self.sm2.is_some(),
            self.sm3.is_some(),
        ];
        match channel {
            ChannelSelect::Index(index) => match free.get(usize::from(index)) {
                None => Err(Error::NoSuchStateMachine(index)),
                Some(false) => Err(Error::StateMachineInUse(index)),
                Some(true) => Ok(index),
            },
            ChannelSelect::Auto => (0u8..)
                .zip(free)
                .find(|(_, is_free)| *is_free)
                .map(|(index, _)| index)
                .ok_or(Error::NoFreeStateMachine),
        }
    }

    fn take(&mut self, index: u8) -> Option<PioTransmitter<'d, PIO>> {
        match index {
            0 => self.sm0.take().map(PioTransmitter::Sm0),
            1 => self.sm1.take().map(PioTransmitter::Sm1),
            2 => self.sm2.take().map(PioTransmitter::Sm2),
            3 => self.sm3.take().map(PioTransmitter::Sm3),
            _ => None,
        }
    }
}

impl<'d, PIO: StripPio> StripResources for PioResources<'d, PIO> {
    type Pin = Pin<'d, PIO>;
    type Transmitter = PioTransmitter<'d, PIO>;
    type Offload = DmaOffload<'d>;

    fn claim_transmitter(
        &mut self,
        pin: &Pin<'d, PIO>,
        channel: ChannelSelect,
        timing: WireTiming,
    ) -> Result<PioTransmitter<'d, PIO>> {
        let index = self.pick(channel)?;
        let clock_divider = U24F8::from_bits(timing.clock_divider_bits(clk_sys_freq())?);
        self.ensure_program()?;
        let Some(mut transmitter) = self.take(index) else {
            return Err(Error::StateMachineInUse(index));
        };
        let Some(program) = self.program.as_ref() else {
            return Err(Error::ProgramLoad);
        };
        transmitter.configure(pin, program, clock_divider, timing.bits_per_word);
        Ok(transmitter)
    }

    fn claim_offload(&mut self, transmitter: &PioTransmitter<'d, PIO>) -> Option<DmaOffload<'d>> {
        let channel = self.dma_channels.pop()?;
        let state_machine = transmitter.index();
        let fifo_address = PIO::regs().txf(usize::from(state_machine)).as_ptr() as u32;
        Some(DmaOffload {
            channel,
            fifo_address,
            dreq: PIO::BLOCK * 8 + state_machine,
        })
    }

    fn release_transmitter(&mut self, transmitter: PioTransmitter<'d, PIO>) {
        match transmitter {
            PioTransmitter::Sm0(mut sm) => {
                sm.set_enable(false);
                sm.clear_fifos();
                self.sm0 = Some(sm);
            }
            PioTransmitter::Sm1(mut sm) => {
                sm.set_enable(false);
                sm.clear_fifos();
                self.sm1 = Some(sm);
            }
            PioTransmitter::Sm2(mut sm) => {
                sm.set_enable(false);
                sm.clear_fifos();
                self.sm2 = Some(sm);
            }
            PioTransmitter::Sm3(mut sm) => {
                sm.set_enable(false);
                sm.clear_fifos();
                self.sm3 = Some(sm);
            }
        }
    }

    fn release_offload(&mut self, offload: DmaOffload<'d>) {
        // Capacity was checked when the channel came out of this Vec.
        let _ = self.dma_channels.push(offload.channel);
    }
}

/// A claimed PIO state machine running the WS2812 program.
pub enum PioTransmitter<'d, PIO: Instance> {
    Sm0(StateMachine<'d, PIO, 0>),
    Sm1(StateMachine<'d, PIO, 1>),
    Sm2(StateMachine<'d, PIO, 2>),
    Sm3(StateMachine<'d, PIO, 3>),
}

macro_rules! with_state_machine {
    ($transmitter:expr, $sm:ident => $body:expr) => {
        match $transmitter {
            PioTransmitter::Sm0($sm) => $body,
            PioTransmitter::Sm1($sm) => $body,
            PioTransmitter::Sm2($sm) => $body,
            PioTransmitter::Sm3($sm) => $body,
        }
    };
}

impl<'d, PIO: StripPio> PioTransmitter<'d, PIO> {
    /// Reprograms the state machine and starts it from an empty FIFO, so
    /// nothing queued by a previous owner reaches the wire.
    fn configure(
        &mut self,
        pin: &Pin<'d, PIO>,
        program: &LoadedProgram<'d, PIO>,
        clock_divider: U24F8,
        bits_per_word: u8,
    ) {
        let mut cfg = Config::default();
        cfg.set_out_pins(&[pin]);
        cfg.set_set_pins(&[pin]);
        cfg.use_program(program, &[pin]);
        cfg.clock_divider = clock_divider;
        cfg.fifo_join = FifoJoin::TxOnly;
        cfg.shift_out = ShiftConfig {
            auto_fill: true,
            threshold: bits_per_word,
            direction: ShiftDirection::Left,
        };

        with_state_machine!(self, sm => {
            sm.set_enable(false);
            sm.set_config(&cfg);
            sm.clear_fifos();
            sm.restart();
            sm.set_enable(true);
        });
    }
}

impl<PIO: StripPio> BitStreamTransmitter for PioTransmitter<'_, PIO> {
    async fn push(&mut self, word: u32) {
        with_state_machine!(self, sm => sm.tx().wait_push(word).await);
    }

    fn is_fifo_empty(&self) -> bool {
        let empty_mask = PIO::regs().fstat().read().txempty();
        empty_mask & (1 << self.index()) != 0
    }

    fn index(&self) -> u8 {
        match self {
            Self::Sm0(_) => 0,
            Self::Sm1(_) => 1,
            Self::Sm2(_) => 2,
            Self::Sm3(_) => 3,
        }
    }
}

/// A claimed DMA channel paced by one state machine's TX request line.
pub struct DmaOffload<'d> {
    channel: Peri<'d, AnyChannel>,
    fifo_address: u32,
    dreq: u8,
}

impl OffloadEngine for DmaOffload<'_> {
    fn start(&mut self, words: FrameWords<'_>) {
        let words = words.as_slice();
        let regs = self.channel.regs();
        compiler_fence(Ordering::SeqCst);
        regs.read_addr().write_value(words.as_ptr() as u32);
        regs.write_addr().write_value(self.fifo_address);
        #[allow(clippy::cast_possible_truncation, reason = "frames are far shorter than 2^32 words")]
        let count = words.len() as u32;
        #[cfg(feature = "pico1")]
        regs.trans_count().write(|w| *w = count);
        #[cfg(feature = "pico2")]
        regs.trans_count().write(|w| {
            w.set_mode(0.into());
            w.set_count(count);
        });
        regs.ctrl_trig().write(|w| {
            w.set_treq_sel(pac::dma::vals::TreqSel::from(self.dreq));
            w.set_data_size(pac::dma::vals::DataSize::SIZE_WORD);
            w.set_incr_read(true);
            w.set_incr_write(false);
            w.set_chain_to(self.channel.number());
            w.set_en(true);
        });
        compiler_fence(Ordering::SeqCst);
    }

    fn is_busy(&self) -> bool {
        self.channel.regs().ctrl_trig().read().busy()
    }

    fn abort(&mut self) {
        pac::DMA
            .chan_abort()
            .modify(|m| m.set_chan_abort(1 << self.channel.number()));
        while self.channel.regs().ctrl_trig().read().busy() {}
    }
}
