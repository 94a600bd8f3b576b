//! Host-side stand-in for a PIO block and its DMA channels.
//!
//! [`SimBus`] records every word that reaches "the wire" together with the
//! state machine that sent it and when. [`SimResources`] is the claim pool a
//! [`Strip`](crate::Strip) begins against. A simulated DMA transfer stays busy
//! for a configurable number of `is_busy` polls, which is enough to exercise
//! the in-flight paths without real hardware. A bus built with
//! [`SimBus::with_fifo`] also holds CPU-pushed words in a TX FIFO until the
//! transmitter is polled, one word per poll.

use core::cell::{Cell, RefCell};

use embassy_time::Instant;
use heapless::Vec;

use crate::frame::FrameWords;
use crate::hardware::{
    BitStreamTransmitter, ChannelSelect, OffloadEngine, StripResources, WireTiming,
};
use crate::{Error, Result};

/// State machines per simulated block, as on the RP2040.
pub const STATE_MACHINE_COUNT: u8 = 4;
/// Words the wire log keeps; later words are dropped.
pub const WIRE_CAPACITY: usize = 1024;
/// System clock the simulated block derives its bit clock from, in Hz.
pub const SYS_CLOCK_HZ: u32 = 125_000_000;

/// One word as it left a state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WireWord {
    pub state_machine: u8,
    pub word: u32,
    /// Top bits of `word` the state machine was configured to shift out.
    pub bits: u8,
    /// `true` when the word came through the DMA engine.
    pub via_offload: bool,
}

/// Shared simulated hardware block.
pub struct SimBus {
    program_fits: bool,
    program_offset: Cell<Option<u8>>,
    program_loads: Cell<u32>,
    transfer_polls: u32,
    holds_fifo: bool,
    fifo: RefCell<Vec<WireWord, WIRE_CAPACITY>>,
    wire: RefCell<Vec<WireWord, WIRE_CAPACITY>>,
    last_word_at: Cell<Option<Instant>>,
    aborts: Cell<u32>,
    configured: RefCell<Vec<(u8, u8, WireTiming), { STATE_MACHINE_COUNT as usize }>>,
}

impl SimBus {
    /// A block whose DMA transfers finish after three polls.
    #[must_use]
    pub const fn new() -> Self {
        Self::with_transfer_polls(3)
    }

    /// A block whose DMA transfers report busy for `polls` calls to `is_busy`.
    #[must_use]
    pub const fn with_transfer_polls(polls: u32) -> Self {
        Self {
            program_fits: true,
            program_offset: Cell::new(None),
            program_loads: Cell::new(0),
            transfer_polls: polls,
            holds_fifo: false,
            fifo: RefCell::new(Vec::new()),
            wire: RefCell::new(Vec::new()),
            last_word_at: Cell::new(None),
            aborts: Cell::new(0),
            configured: RefCell::new(Vec::new()),
        }
    }

    /// A block whose instruction memory is already full.
    #[must_use]
    pub const fn without_program_space() -> Self {
        let mut bus = Self::new();
        bus.program_fits = false;
        bus
    }

    /// A block whose state machines queue CPU-pushed words in their TX FIFO.
    ///
    /// Each `is_fifo_empty` poll shifts one queued word out onto the wire.
    #[must_use]
    pub const fn with_fifo() -> Self {
        let mut bus = Self::new();
        bus.holds_fifo = true;
        bus
    }

    /// Words still queued in one state machine's TX FIFO.
    #[must_use]
    pub fn fifo_len(&self, state_machine: u8) -> usize {
        self.fifo
            .borrow()
            .iter()
            .filter(|wire_word| wire_word.state_machine == state_machine)
            .count()
    }

    /// How many times the timing program was written into instruction memory.
    #[must_use]
    pub fn program_loads(&self) -> u32 {
        self.program_loads.get()
    }

    /// Every word sent so far, in wire order.
    #[must_use]
    pub fn wire(&self) -> Vec<WireWord, WIRE_CAPACITY> {
        self.wire.borrow().clone()
    }

    /// Words sent by one state machine, in wire order.
    #[must_use]
    pub fn words_from(&self, state_machine: u8) -> Vec<u32, WIRE_CAPACITY> {
        self.wire
            .borrow()
            .iter()
            .filter(|wire_word| wire_word.state_machine == state_machine)
            .map(|wire_word| wire_word.word)
            .collect()
    }

    pub fn clear_wire(&self) {
        self.wire.borrow_mut().clear();
    }

    /// When the most recent word finished going out.
    #[must_use]
    pub fn last_word_at(&self) -> Option<Instant> {
        self.last_word_at.get()
    }

    /// Number of DMA transfers aborted.
    #[must_use]
    pub fn aborts(&self) -> u32 {
        self.aborts.get()
    }

    /// `(pin, timing)` the state machine was last configured with.
    #[must_use]
    pub fn configuration(&self, state_machine: u8) -> Option<(u8, WireTiming)> {
        self.configured
            .borrow()
            .iter()
            .find(|(index, _, _)| *index == state_machine)
            .map(|(_, pin, timing)| (*pin, *timing))
    }

    fn load_program(&self) -> Result<u8> {
        if let Some(offset) = self.program_offset.get() {
            return Ok(offset);
        }
        if !self.program_fits {
            return Err(Error::ProgramLoad);
        }
        self.program_loads.set(self.program_loads.get().saturating_add(1));
        self.program_offset.set(Some(0));
        Ok(0)
    }

    fn configure(&self, state_machine: u8, pin: u8, timing: WireTiming) {
        let mut configured = self.configured.borrow_mut();
        configured.retain(|(index, _, _)| *index != state_machine);
        let _ = configured.push((state_machine, pin, timing));
    }

    fn enqueue(&self, wire_word: WireWord) {
        if self.holds_fifo {
            let _ = self.fifo.borrow_mut().push(wire_word);
        } else {
            self.record(wire_word);
        }
    }

    /// Moves the oldest queued word of `state_machine` onto the wire.
    /// Returns `false` when its FIFO was already empty.
    fn shift_out(&self, state_machine: u8) -> bool {
        let mut fifo = self.fifo.borrow_mut();
        let Some(position) = fifo
            .iter()
            .position(|wire_word| wire_word.state_machine == state_machine)
        else {
            return false;
        };
        let wire_word = fifo.remove(position);
        drop(fifo);
        self.record(wire_word);
        true
    }

    fn clear_fifo(&self, state_machine: u8) {
        self.fifo
            .borrow_mut()
            .retain(|wire_word| wire_word.state_machine != state_machine);
    }

    fn record(&self, wire_word: WireWord) {
        let _ = self.wire.borrow_mut().push(wire_word);
        self.last_word_at.set(Some(Instant::now()));
    }
}

impl Default for SimBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Claim pool over a [`SimBus`]: four state machines and `dma_channels` DMA channels.
pub struct SimResources<'a> {
    bus: &'a SimBus,
    state_machines_claimed: [bool; STATE_MACHINE_COUNT as usize],
    dma_claimed: Vec<bool, 16>,
}

impl<'a> SimResources<'a> {
    #[must_use]
    pub fn new(bus: &'a SimBus, dma_channels: usize) -> Self {
        let mut dma_claimed = Vec::new();
        for _ in 0..dma_channels.min(16) {
            let _ = dma_claimed.push(false);
        }
        Self {
            bus,
            state_machines_claimed: [false; STATE_MACHINE_COUNT as usize],
            dma_claimed,
        }
    }

    #[must_use]
    pub fn free_state_machines(&self) -> usize {
        self.state_machines_claimed
            .iter()
            .filter(|claimed| !**claimed)
            .count()
    }

    #[must_use]
    pub fn free_dma_channels(&self) -> usize {
        self.dma_claimed.iter().filter(|claimed| !**claimed).count()
    }

    fn pick_state_machine(&self, channel: ChannelSelect) -> Result<u8> {
        match channel {
            ChannelSelect::Index(index) => match self.state_machines_claimed.get(usize::from(index)) {
                None => Err(Error::NoSuchStateMachine(index)),
                Some(true) => Err(Error::StateMachineInUse(index)),
                Some(false) => Ok(index),
            },
            ChannelSelect::Auto => (0..STATE_MACHINE_COUNT)
                .zip(self.state_machines_claimed.iter())
                .find(|(_, claimed)| !**claimed)
                .map(|(index, _)| index)
                .ok_or(Error::NoFreeStateMachine),
        }
    }

    fn set_state_machine(&mut self, index: u8, claimed: bool) {
        if let Some(slot) = self.state_machines_claimed.get_mut(usize::from(index)) {
            *slot = claimed;
        }
    }
}

impl<'a> StripResources for SimResources<'a> {
    type Pin = u8;
    type Transmitter = SimTransmitter<'a>;
    type Offload = SimOffload<'a>;

    fn claim_transmitter(
        &mut self,
        pin: &u8,
        channel: ChannelSelect,
        timing: WireTiming,
    ) -> Result<SimTransmitter<'a>> {
        let index = self.pick_state_machine(channel)?;
        timing.clock_divider_bits(SYS_CLOCK_HZ)?;
        self.bus.load_program()?;
        self.bus.clear_fifo(index);
        self.bus.configure(index, *pin, timing);
        self.set_state_machine(index, true);
        Ok(SimTransmitter {
            bus: self.bus,
            index,
            bits: timing.bits_per_word,
        })
    }

    fn claim_offload(&mut self, transmitter: &SimTransmitter<'a>) -> Option<SimOffload<'a>> {
        let (channel, slot) = self
            .dma_claimed
            .iter_mut()
            .enumerate()
            .find(|(_, claimed)| !**claimed)?;
        *slot = true;
        Some(SimOffload {
            bus: self.bus,
            channel,
            state_machine: transmitter.index,
            bits: transmitter.bits,
            polls_left: Cell::new(0),
        })
    }

    fn release_transmitter(&mut self, transmitter: SimTransmitter<'a>) {
        self.bus.clear_fifo(transmitter.index);
        self.set_state_machine(transmitter.index, false);
    }

    fn release_offload(&mut self, offload: SimOffload<'a>) {
        if let Some(slot) = self.dma_claimed.get_mut(offload.channel) {
            *slot = false;
        }
    }
}

/// Simulated state machine. Pushed words go straight to the wire, or into the
/// TX FIFO on a [`SimBus::with_fifo`] bus.
pub struct SimTransmitter<'a> {
    bus: &'a SimBus,
    index: u8,
    bits: u8,
}

impl BitStreamTransmitter for SimTransmitter<'_> {
    async fn push(&mut self, word: u32) {
        self.bus.enqueue(WireWord {
            state_machine: self.index,
            word,
            bits: self.bits,
            via_offload: false,
        });
    }

    fn is_fifo_empty(&self) -> bool {
        !self.bus.shift_out(self.index)
    }

    fn index(&self) -> u8 {
        self.index
    }
}

/// Simulated DMA channel.
///
/// Snapshots the words when the transfer starts and then reports busy for the
/// bus's configured number of polls.
pub struct SimOffload<'a> {
    bus: &'a SimBus,
    channel: usize,
    state_machine: u8,
    bits: u8,
    polls_left: Cell<u32>,
}

impl SimOffload<'_> {
    #[must_use]
    pub const fn channel(&self) -> usize {
        self.channel
    }
}

impl OffloadEngine for SimOffload<'_> {
    fn start(&mut self, words: FrameWords<'_>) {
        for word in words.as_slice() {
            let _ = self.bus.wire.borrow_mut().push(WireWord {
                state_machine: self.state_machine,
                word: *word,
                bits: self.bits,
                via_offload: true,
            });
        }
        if self.bus.transfer_polls == 0 {
            self.bus.last_word_at.set(Some(Instant::now()));
        }
        self.polls_left.set(self.bus.transfer_polls);
    }

    fn is_busy(&self) -> bool {
        let polls_left = self.polls_left.get();
        if polls_left == 0 {
            return false;
        }
        self.polls_left.set(polls_left - 1);
        if polls_left == 1 {
            self.bus.last_word_at.set(Some(Instant::now()));
        }
        true
    }

    fn abort(&mut self) {
        if self.polls_left.get() > 0 {
            self.polls_left.set(0);
            self.bus.aborts.set(self.bus.aborts.get().saturating_add(1));
        }
    }
}
