//! Start/stop and direction-switch choreography.
//!
//! One uart serves both directions of the half-duplex line, so receiving and
//! transmitting are never enabled at the same time. Switching away from output
//! waits for the packet in flight to drain (bounded by one period); switching away
//! from input gates the receive interrupt and discards partially received frames.
//!
//! Direction changes are not reentrant; the caller serializes them.

use core::sync::atomic::Ordering;

use crate::consts::{MICROS_PER_SECOND, TRANSMIT_START_DELAY_MICROS};
use crate::dmx_line::DmxLine;
use crate::hal::DmxLineHal;
use crate::receiver::ReceiveState;
use crate::transmitter::SendState;

/// Direction of the RS485 transceiver.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum PortDirection {
    #[default]
    Input = 0,
    Output = 1,
}

impl<H: DmxLineHal> DmxLine<H> {
    pub fn port_direction(&self) -> PortDirection {
        match self.direction.load(Ordering::Relaxed) {
            1 => PortDirection::Output,
            _ => PortDirection::Input,
        }
    }

    /// Stops the current activity, flips the RS485 driver-enable pin and, when
    /// `enable_data` is set, starts receiving or transmitting in the new direction.
    ///
    /// Foreground context only; blocks for at most one period while a transmitted
    /// packet drains.
    pub fn set_direction(&self, direction: PortDirection, enable_data: bool) {
        self.stop_data();

        self.hal
            .set_direction_pin(direction == PortDirection::Output);
        self.direction.store(direction as u8, Ordering::Relaxed);

        if enable_data {
            self.start_data();
        }
    }

    pub(crate) fn stop_data(&self) {
        if self.tx.sending.load(Ordering::Relaxed) {
            // let the packet in flight finish; a hung transmitter is cut off after
            // one period
            let started = self.hal.micros();
            let period = self.tx.period_micros.load(Ordering::Relaxed);
            while self.tx.state() != SendState::Idle
                && self.hal.micros().wrapping_sub(started) < period
            {}

            #[cfg(feature = "defmt")]
            if self.tx.state() != SendState::Idle {
                defmt::warn!("transmit drain exceeded one period, forcing stop");
            }

            self.tx.sending.store(false, Ordering::Relaxed);
            self.hal.disarm_slot_timer();
        }

        self.hal.set_receiver_interrupt(false);
        self.rx.set_state(ReceiveState::Idle);

        // discard anything the receiver had staged or committed; the consumer must
        // not pop frames across a direction change
        self.dmx_ring.reset();
        unsafe {
            self.dmx_ring.for_each_slot(|frame| frame.reset());
        }
    }

    pub(crate) fn start_data(&self) {
        match self.port_direction() {
            PortDirection::Output => {
                self.tx.set_state(SendState::Idle);
                self.tx.sending.store(true, Ordering::Relaxed);

                let now = self.hal.micros();
                let last_break = self.tx.break_micros.load(Ordering::Relaxed);
                let period = self.tx.period_micros.load(Ordering::Relaxed);

                // a burst right after a direction change still respects the
                // break-to-break distance from the previous run
                let deadline = if now.wrapping_sub(last_break) > period {
                    now.wrapping_add(TRANSMIT_START_DELAY_MICROS)
                } else {
                    last_break
                        .wrapping_add(period)
                        .wrapping_add(TRANSMIT_START_DELAY_MICROS)
                };
                self.hal.arm_slot_timer(deadline);
            },
            PortDirection::Input => {
                self.rx.set_state(ReceiveState::Idle);
                self.hal
                    .arm_pps_timer(self.hal.micros().wrapping_add(MICROS_PER_SECOND));
                self.hal.set_receiver_interrupt(true);
            },
        }
    }
}
