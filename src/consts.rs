pub const DMX_NULL_START: u8 = 0x00;
pub const SC_RDM: u8 = 0xCC;
pub const SC_SUB_MESSAGE: u8 = 0x01;

pub const PREAMBLE_BYTE: u8 = 0xFE;
pub const SEPARATOR_BYTE: u8 = 0xAA;

pub const DMX_BAUD: u32 = 250_000;
/// Fallback uart input clock when the configured clock does not divide down to 250 kbaud.
pub const UART_CLOCK_FALLBACK_HZ: u32 = 4_000_000;

pub const DMX_UNIVERSE_SIZE: usize = 512;
/// start code + 512 byte package
pub const DMX_MAX_PACKAGE_SIZE: usize = 513;

pub const RDM_MAX_PACKAGE_SIZE: usize = 257;
/// Smallest legal value of the message length field (all header fields, no checksum).
pub const RDM_MIN_MESSAGE_LENGTH: u8 = 24;
/// Largest message length that still leaves room for the two checksum bytes.
pub const RDM_MAX_MESSAGE_LENGTH: u8 = (RDM_MAX_PACKAGE_SIZE - 2) as u8;
/// Offset of the message length field in an RDM package.
pub const RDM_MESSAGE_LENGTH_OFFSET: usize = 2;

pub const RDM_UID_SIZE: usize = 6;
/// Encoded euid field of a discovery response, 2 bytes per uid byte.
pub const RDM_DISCOVERY_EUID_SIZE: usize = 2 * RDM_UID_SIZE;
/// Encoded checksum field of a discovery response.
pub const RDM_DISCOVERY_CHECKSUM_SIZE: usize = 4;
/// A discovery response carries at most 7 preamble bytes before the separator.
pub const RDM_DISCOVERY_PREAMBLE_MAX: usize = 7;

/// One slot time at 250 kbaud: start bit + 8 data bits + 2 stop bits.
pub const DMX_SLOT_TIME_MICROS: u32 = 44;
/// Interrupt latency floor; slot-to-slot measurements below this are clamped up.
pub const DMX_SLOT_TO_SLOT_FLOOR_MICROS: u32 = 44;
/// Margin added on top of slot-to-slot when arming the inter-slot watchdog.
pub const RECEIVE_SLOT_MARGIN_MICROS: u32 = 12;

pub const DMX_TRANSMIT_BREAK_TIME_MIN_MICROS: u32 = 92;
pub const DMX_TRANSMIT_MAB_TIME_MIN_MICROS: u32 = 12;
pub const DMX_TRANSMIT_BREAK_TO_BREAK_MIN_MICROS: u32 = 1204;
/// Slack added when (re)arming the first transmit tick after a direction change.
pub const TRANSMIT_START_DELAY_MICROS: u32 = 4;

pub const MICROS_PER_SECOND: u32 = 1_000_000;

/// Ring depths. Must be powers of two; one entry is always kept free.
pub const DMX_RING_ENTRIES: usize = 4;
pub const RDM_RING_ENTRIES: usize = 4;
