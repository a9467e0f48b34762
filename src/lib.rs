//! Rust library implementing a bidirectional DMX512 (ANSI E1.11) / DMX-RDM (ANSI E1.20)
//! line driver for a half-duplex RS485 bus behind a single hardware uart. This library
//! features no-std as well as no-alloc support (no heap allocation) to target bare-metal
//! platforms where receive framing runs in the highest-priority interrupt.
//!
//! Please refer to the [official specifications](https://tsp.esta.org/) published by the ESTA.
//!
//! # Architecture
//!
//! All state lives in one owning [`DmxLine`](dmx_line::DmxLine) struct. The platform
//! installs three trampolines that call into the same handle the foreground uses:
//!
//! * the uart receive interrupt (highest priority) forwards every character and break
//!   condition to [`DmxLine::on_uart_event`](dmx_line::DmxLine::on_uart_event),
//! * the slot timer compare calls [`DmxLine::on_slot_tick`](dmx_line::DmxLine::on_slot_tick)
//!   (inter-slot watchdog while receiving, packet pacer while transmitting),
//! * the one-second timer compare calls
//!   [`DmxLine::on_pps_tick`](dmx_line::DmxLine::on_pps_tick).
//!
//! Received frames travel through fixed-capacity single-producer/single-consumer rings;
//! the interrupt publishes a completed frame with a release store and the foreground pops
//! it through a guard that frees the ring slot on drop. No locks are taken anywhere.
//!
//! # Usage
//!
//! ```no_run
//! use dmx_rdm_line::direction::PortDirection;
//! use dmx_rdm_line::dmx_line::DmxLine;
//! use dmx_rdm_line::hal::DmxLineHal;
//!
//! struct NullHal;
//!
//! impl DmxLineHal for NullHal {
//!     fn micros(&self) -> u32 { 0 }
//!     fn arm_slot_timer(&self, _deadline_micros: u32) {}
//!     fn disarm_slot_timer(&self) {}
//!     fn arm_pps_timer(&self, _deadline_micros: u32) {}
//!     fn uart_clock_hz(&self) -> u32 { 48_000_000 }
//!     fn set_uart_clock_hz(&self, hz: u32) -> u32 { hz }
//!     fn configure_uart(&self, _integer_divisor: u32) {}
//!     fn uart_write_byte(&self, _byte: u8) {}
//!     fn uart_tx_fifo_full(&self) -> bool { false }
//!     fn uart_tx_busy(&self) -> bool { false }
//!     fn uart_set_break(&self, _enabled: bool) {}
//!     fn set_direction_pin(&self, _transmit: bool) {}
//!     fn set_receiver_interrupt(&self, _enabled: bool) {}
//! }
//!
//! let line = DmxLine::new(NullHal);
//! line.init();
//! line.set_direction(PortDirection::Input, true);
//!
//! loop {
//!     if let Some(frame) = line.get_available_dmx() {
//!         // frame is freed for the receive interrupt again when dropped
//!         let _level = frame.slots().first().copied();
//!     }
//!
//!     if let Some(frame) = line.get_available_rdm() {
//!         let _bytes = frame.as_slice();
//!     }
//! }
//! ```
//!
//! For transmission, switch the port around and stage a universe:
//!
//! ```no_run
//! # use dmx_rdm_line::direction::PortDirection;
//! # use dmx_rdm_line::dmx_line::DmxLine;
//! # use dmx_rdm_line::hal::DmxLineHal;
//! # struct NullHal;
//! # impl DmxLineHal for NullHal {
//! #     fn micros(&self) -> u32 { 0 }
//! #     fn arm_slot_timer(&self, _deadline_micros: u32) {}
//! #     fn disarm_slot_timer(&self) {}
//! #     fn arm_pps_timer(&self, _deadline_micros: u32) {}
//! #     fn uart_clock_hz(&self) -> u32 { 48_000_000 }
//! #     fn set_uart_clock_hz(&self, hz: u32) -> u32 { hz }
//! #     fn configure_uart(&self, _integer_divisor: u32) {}
//! #     fn uart_write_byte(&self, _byte: u8) {}
//! #     fn uart_tx_fifo_full(&self) -> bool { false }
//! #     fn uart_tx_busy(&self) -> bool { false }
//! #     fn uart_set_break(&self, _enabled: bool) {}
//! #     fn set_direction_pin(&self, _transmit: bool) {}
//! #     fn set_receiver_interrupt(&self, _enabled: bool) {}
//! # }
//! # let line = DmxLine::new(NullHal);
//! # line.init();
//! let universe = [0xE4u8, 0xE4, 0x00, 0xCA];
//! let mut packet = [0u8; 5];
//! packet[1..].copy_from_slice(&universe);
//!
//! line.set_send_data(&packet).unwrap();
//! line.set_direction(PortDirection::Output, true);
//! ```
//!

#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(docsrs, feature(doc_cfg))]

#[cfg(test)]
extern crate std;

pub mod consts;
/// Module for switching the RS485 transceiver between receiving and transmitting.
pub mod direction;
/// Module holding the owning driver struct and the foreground API.
pub mod dmx_line;
/// Module with the frame types handed to the consumer.
pub mod frame;
/// Module for binding the driver to concrete uart/timer/gpio hardware.
pub mod hal;
mod layouts;
/// The uart receive state machine. Runs entirely in interrupt context.
pub mod receiver;
mod ring;
pub mod statistics;
/// The timer-driven transmit pacer.
pub mod transmitter;
pub mod unique_identifier;
mod utils;

#[cfg(test)]
pub(crate) mod test_hal;
