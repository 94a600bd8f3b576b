use derive_more::derive::{Display, Error};

/// A specialized `Result` where the error is this crate's `Error` type.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Define a unified error type for this crate.
#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Every state machine on the hardware block is already claimed.
    #[display("No free state machine on this PIO block")]
    NoFreeStateMachine,

    /// The explicitly requested state machine is claimed by someone else.
    #[display("State machine {_0} is already claimed")]
    StateMachineInUse(#[error(not(source))] u8),

    /// State machine indexes run from 0 to 3.
    #[display("State machine index {_0} does not exist")]
    NoSuchStateMachine(#[error(not(source))] u8),

    /// The bit rate needs a PIO clock divider outside `1..=65536`.
    #[display("Bit rate {_0} Hz is out of range for the system clock")]
    BitRateOutOfRange(#[error(not(source))] u32),

    /// The timing program could not be placed in instruction memory.
    #[display("PIO instruction memory is full")]
    ProgramLoad,

    /// The strip's static frame storage already backs another strip.
    #[display("StripStatic is already in use by another strip")]
    StaticAlreadyUsed,

    /// A send was requested before `begin` succeeded (or after `end`).
    #[display("Strip has not been started")]
    NotStarted,

    /// A send was requested while the offload engine still reads the previous frame.
    #[display("A transfer is still in flight")]
    TransferInFlight,
}
