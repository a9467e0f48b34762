//! Hardware contract consumed by the driver.
//!
//! Implementations are thin bindings over memory-mapped uart, system-timer and gpio
//! registers. All methods take `&self` because they are called from the uart receive
//! interrupt, the timer interrupt and the foreground alike; an implementation must be
//! safe to poke from any of those contexts.

/// One event delivered by the uart receive interrupt.
///
/// The uart signals a break as a framing error flagged on the same read as the data
/// byte. When both are flagged at once the break wins: map such a read to
/// [`UartEvent::Break`], not to the garbage byte.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UartEvent {
    /// Line-low condition longer than one character time.
    Break,
    /// A regular data byte.
    Byte(u8),
}

/// Object to implement access to the uart, the microsecond clock, two single-shot
/// timer compare channels, the RS485 driver-enable gpio and the receive interrupt
/// gate.
///
/// The uart has to communicate at 250000 baud, 8 data bits, no parity, 2 stop bits,
/// with break detection on receive.
pub trait DmxLineHal {
    /// Free-running microsecond counter. Wraps around; all driver arithmetic is
    /// wrapping.
    fn micros(&self) -> u32;

    /// Arm the slot timer compare channel to fire once at `deadline_micros`.
    /// Re-arming replaces the previous deadline.
    fn arm_slot_timer(&self, deadline_micros: u32);

    /// Cancel a pending slot timer compare.
    fn disarm_slot_timer(&self);

    /// Arm the once-per-second timer compare channel to fire at `deadline_micros`.
    fn arm_pps_timer(&self, deadline_micros: u32);

    /// The uart input clock currently programmed, in Hz.
    fn uart_clock_hz(&self) -> u32;

    /// Try to reprogram the uart input clock. Returns the rate actually achieved.
    fn set_uart_clock_hz(&self, hz: u32) -> u32;

    /// Program the uart for 8-N-2 with the given integer baud divisor and enable it.
    fn configure_uart(&self, integer_divisor: u32);

    /// Push one byte into the transmit fifo. Only called after
    /// [`uart_tx_fifo_full`](DmxLineHal::uart_tx_fifo_full) returned false.
    fn uart_write_byte(&self, byte: u8);

    /// true while the transmit fifo cannot take another byte.
    fn uart_tx_fifo_full(&self) -> bool;

    /// true while the transmitter is still shifting bits out.
    fn uart_tx_busy(&self) -> bool;

    /// Drive or release the break condition on the transmit line.
    fn uart_set_break(&self, enabled: bool);

    /// RS485 driver-enable gpio: false = receive, true = transmit.
    fn set_direction_pin(&self, transmit: bool);

    /// Gate the uart receive interrupt (the highest-priority interrupt slot).
    fn set_receiver_interrupt(&self, enabled: bool);
}
