//! The timer-driven transmit pacer.
//!
//! Sending walks break -> mark-after-break -> data once per period. The two line
//! conditions are timed by the slot timer; the data bytes are pushed in a tight
//! fifo poll because at 250 kbaud the uart drains faster than any per-byte
//! interrupt scheme could feed it. The poll is bounded by `data_len * 44 us`
//! (about 23 ms for a full universe).

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, AtomicUsize, Ordering};

use crate::consts::{
    DMX_MAX_PACKAGE_SIZE, DMX_SLOT_TIME_MICROS, DMX_TRANSMIT_BREAK_TIME_MIN_MICROS,
    DMX_TRANSMIT_BREAK_TO_BREAK_MIN_MICROS, DMX_TRANSMIT_MAB_TIME_MIN_MICROS,
};
use crate::dmx_line::DmxLine;
use crate::frame::FrameSizeError;
use crate::hal::DmxLineHal;

/// State of the transmit cycle. Data bytes are pushed inline at the end of the
/// mark-after-break, so there is no data state.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum SendState {
    Idle = 0,
    /// Driving the line low.
    Break,
    /// Releasing the line before the start code.
    Mab,
}

impl SendState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Break,
            2 => Self::Mab,
            _ => Self::Idle,
        }
    }
}

/// Transmit-side scalars plus the staging buffer the pacer reads from.
pub(crate) struct TransmitContext {
    state: AtomicU8,
    /// True while the pacer owns the slot timer.
    pub sending: AtomicBool,
    /// Timestamp of the most recent break start.
    pub break_micros: AtomicU32,
    pub break_time_micros: AtomicU32,
    pub mab_time_micros: AtomicU32,
    /// Effective period, derived.
    pub period_micros: AtomicU32,
    /// Period as configured; zero means "as fast as allowed".
    pub period_requested_micros: AtomicU32,
    /// Bytes to send per packet: start code + slots, 1..=513.
    pub data_length: AtomicUsize,
    /// Start code + universe staged by the foreground. Read by the pacer interrupt.
    staging: UnsafeCell<[u8; DMX_MAX_PACKAGE_SIZE]>,
}

impl Default for TransmitContext {
    fn default() -> Self {
        Self {
            state: AtomicU8::new(SendState::Idle as u8),
            sending: AtomicBool::new(false),
            break_micros: AtomicU32::new(0),
            break_time_micros: AtomicU32::new(DMX_TRANSMIT_BREAK_TIME_MIN_MICROS),
            mab_time_micros: AtomicU32::new(DMX_TRANSMIT_MAB_TIME_MIN_MICROS),
            period_micros: AtomicU32::new(0),
            period_requested_micros: AtomicU32::new(0),
            data_length: AtomicUsize::new(DMX_MAX_PACKAGE_SIZE),
            staging: UnsafeCell::new([0; DMX_MAX_PACKAGE_SIZE]),
        }
    }
}

impl TransmitContext {
    pub fn state(&self) -> SendState {
        SendState::from_u8(self.state.load(Ordering::Relaxed))
    }

    pub fn set_state(&self, state: SendState) {
        self.state.store(state as u8, Ordering::Relaxed);
    }

    pub fn reset_state(&self) {
        self.set_state(SendState::Idle);
        self.sending.store(false, Ordering::Relaxed);
    }

    pub fn recompute_period(&self) {
        let period = derive_period(
            self.break_time_micros.load(Ordering::Relaxed),
            self.mab_time_micros.load(Ordering::Relaxed),
            self.data_length.load(Ordering::Relaxed),
            self.period_requested_micros.load(Ordering::Relaxed),
        );
        self.period_micros.store(period, Ordering::Relaxed);
    }
}

/// Effective packet period for the given configuration. A requested period shorter
/// than the packet itself (or zero) falls back to the packet length plus one slot
/// time of gap, never less than the break-to-break minimum of the standard.
pub(crate) fn derive_period(
    break_time: u32,
    mab_time: u32,
    data_length: usize,
    requested: u32,
) -> u32 {
    let package_length =
        break_time + mab_time + data_length as u32 * DMX_SLOT_TIME_MICROS;

    if requested == 0 || requested < package_length {
        (package_length + DMX_SLOT_TIME_MICROS).max(DMX_TRANSMIT_BREAK_TO_BREAK_MIN_MICROS)
    } else {
        requested
    }
}

impl<H: DmxLineHal> DmxLine<H> {
    /// One step of the transmit cycle, driven by the slot timer while the port
    /// transmits.
    pub(crate) fn transmit_slot_tick(&self, now: u32) {
        if !self.tx.sending.load(Ordering::Relaxed) {
            return;
        }

        match self.tx.state() {
            SendState::Idle => {
                self.hal.uart_set_break(true);
                self.tx.break_micros.store(now, Ordering::Relaxed);
                self.hal.arm_slot_timer(
                    now.wrapping_add(self.tx.break_time_micros.load(Ordering::Relaxed)),
                );
                self.tx.set_state(SendState::Break);
            },
            SendState::Break => {
                self.hal.uart_set_break(false);
                self.hal.arm_slot_timer(
                    now.wrapping_add(self.tx.mab_time_micros.load(Ordering::Relaxed)),
                );
                self.tx.set_state(SendState::Mab);
            },
            SendState::Mab => {
                let length = self.tx.data_length.load(Ordering::Relaxed);
                // the pacer interrupt is the only reader; set_send_data must not
                // race a running cycle
                let staging = unsafe { &*self.tx.staging.get() };

                for &byte in &staging[..length] {
                    while self.hal.uart_tx_fifo_full() {}
                    self.hal.uart_write_byte(byte);
                }
                while self.hal.uart_tx_busy() {}

                self.hal.arm_slot_timer(
                    self.tx
                        .break_micros
                        .load(Ordering::Relaxed)
                        .wrapping_add(self.tx.period_micros.load(Ordering::Relaxed)),
                );
                self.tx.set_state(SendState::Idle);
            },
        }
    }

    /// Copies `data` (start code first) into the transmit staging slot and adapts
    /// the period to the new length.
    ///
    /// Call before enabling output, or between packets; the staging slot is read by
    /// the pacer interrupt during the data phase.
    pub fn set_send_data(&self, data: &[u8]) -> Result<(), FrameSizeError> {
        if data.is_empty() || data.len() > DMX_MAX_PACKAGE_SIZE {
            return Err(FrameSizeError);
        }

        let staging = unsafe { &mut *self.tx.staging.get() };
        staging[..data.len()].copy_from_slice(data);

        self.tx.data_length.store(data.len(), Ordering::Relaxed);
        self.recompute_period();

        Ok(())
    }

    /// Zeroes the staging slot without touching the configured length.
    pub fn clear_send_data(&self) {
        let staging = unsafe { &mut *self.tx.staging.get() };
        staging.fill(0);
    }

    /// Break duration, clamped up to the transmit minimum of 92 us.
    pub fn set_break_time_us(&self, break_time: u32) {
        self.tx.break_time_micros.store(
            break_time.max(DMX_TRANSMIT_BREAK_TIME_MIN_MICROS),
            Ordering::Relaxed,
        );
        self.recompute_period();
    }

    /// Mark-after-break duration, clamped up to the transmit minimum of 12 us.
    pub fn set_mab_time_us(&self, mab_time: u32) {
        self.tx.mab_time_micros.store(
            mab_time.max(DMX_TRANSMIT_MAB_TIME_MIN_MICROS),
            Ordering::Relaxed,
        );
        self.recompute_period();
    }

    /// Requested break-to-break period. Zero selects the fastest standard-compliant
    /// rate for the staged length.
    pub fn set_period_us(&self, period: u32) {
        self.tx
            .period_requested_micros
            .store(period, Ordering::Relaxed);
        self.recompute_period();
    }

    pub fn get_break_time_us(&self) -> u32 {
        self.tx.break_time_micros.load(Ordering::Relaxed)
    }

    pub fn get_mab_time_us(&self) -> u32 {
        self.tx.mab_time_micros.load(Ordering::Relaxed)
    }

    /// The effective period the pacer runs at.
    pub fn get_period_us(&self) -> u32 {
        self.tx.period_micros.load(Ordering::Relaxed)
    }

    /// Bytes sent per packet, start code included.
    pub fn get_send_data_length(&self) -> usize {
        self.tx.data_length.load(Ordering::Relaxed)
    }
}
