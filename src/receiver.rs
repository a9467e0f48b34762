//! The uart receive state machine.
//!
//! Framing on a DMX line is ambiguous until several bytes past the event: a break is
//! just a framing error flagged by the uart, and only the start code that follows
//! decides whether the frame is DMX, RDM or a discovery response. The machine below
//! classifies one byte/break event per invocation, writes into the head slot of the
//! matching ring and publishes the slot on the terminal edge. It runs in the
//! highest-priority interrupt and must finish within one slot time (44 us), so it
//! never allocates, loops or calls back into foreground-visible operations.

use core::sync::atomic::{AtomicBool, AtomicU16, AtomicU32, AtomicU8, Ordering};

use crate::consts::{
    DMX_NULL_START, DMX_SLOT_TO_SLOT_FLOOR_MICROS, MICROS_PER_SECOND, PREAMBLE_BYTE,
    RDM_DISCOVERY_CHECKSUM_SIZE, RDM_DISCOVERY_EUID_SIZE, RDM_DISCOVERY_PREAMBLE_MAX,
    RDM_MAX_MESSAGE_LENGTH, RDM_MESSAGE_LENGTH_OFFSET, RDM_MIN_MESSAGE_LENGTH,
    RECEIVE_SLOT_MARGIN_MICROS, SC_RDM, SC_SUB_MESSAGE, SEPARATOR_BYTE,
};
use crate::dmx_line::DmxLine;
use crate::hal::{DmxLineHal, UartEvent};

/// State of receiving DMX/RDM bytes.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ReceiveState {
    Idle = 0,
    /// Break seen, start code pending.
    Break,
    /// Filling a null-start-code frame.
    DmxData,
    /// Filling a `0xCC` frame, message length not yet reached.
    RdmData,
    /// Expecting the high checksum byte.
    ChecksumHigh,
    /// Expecting the low checksum byte.
    ChecksumLow,
    /// Inside the `0xFE` preamble of a discovery response.
    DiscoveryPreamble,
    /// Collecting the 12 encoded euid bytes.
    DiscoveryEuid,
    /// Collecting the 4 encoded checksum bytes.
    DiscoveryChecksum,
}

impl ReceiveState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Break,
            2 => Self::DmxData,
            3 => Self::RdmData,
            4 => Self::ChecksumHigh,
            5 => Self::ChecksumLow,
            6 => Self::DiscoveryPreamble,
            7 => Self::DiscoveryEuid,
            8 => Self::DiscoveryChecksum,
            _ => Self::Idle,
        }
    }
}

/// Receive-side scalars shared between the uart interrupt, the watchdog tick and the
/// direction switch. Everything is atomic; the uart interrupt is the only writer
/// while data is enabled.
pub(crate) struct ReceiveContext {
    state: AtomicU8,
    /// Timestamp of the last uart event, break or byte.
    pub last_byte_micros: AtomicU32,
    /// Timestamp of the most recent break.
    pub last_break_micros: AtomicU32,
    /// Timestamp of the break that opened the previous DMX frame.
    pub previous_break_micros: AtomicU32,
    pub previous_break_was_dmx: AtomicBool,
    /// Running 16-bit sum over the RDM bytes received so far.
    pub rdm_checksum: AtomicU16,
    /// Message length field once byte 2 has arrived.
    pub rdm_message_length: AtomicU8,
    /// Byte counter inside the euid/checksum fields of a discovery response.
    pub discovery_index: AtomicU8,
    /// Timestamp of the last completed RDM/discovery capture.
    pub rdm_receive_end_micros: AtomicU32,
}

impl Default for ReceiveContext {
    fn default() -> Self {
        Self {
            state: AtomicU8::new(ReceiveState::Idle as u8),
            last_byte_micros: AtomicU32::new(0),
            last_break_micros: AtomicU32::new(0),
            previous_break_micros: AtomicU32::new(0),
            previous_break_was_dmx: AtomicBool::new(false),
            rdm_checksum: AtomicU16::new(0),
            rdm_message_length: AtomicU8::new(0),
            discovery_index: AtomicU8::new(0),
            rdm_receive_end_micros: AtomicU32::new(0),
        }
    }
}

impl ReceiveContext {
    pub fn state(&self) -> ReceiveState {
        ReceiveState::from_u8(self.state.load(Ordering::Relaxed))
    }

    pub fn set_state(&self, state: ReceiveState) {
        self.state.store(state as u8, Ordering::Relaxed);
    }

    pub fn receive_end_micros(&self) -> u32 {
        self.rdm_receive_end_micros.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.set_state(ReceiveState::Idle);
        self.previous_break_was_dmx.store(false, Ordering::Relaxed);
        self.rdm_checksum.store(0, Ordering::Relaxed);
        self.rdm_message_length.store(0, Ordering::Relaxed);
        self.discovery_index.store(0, Ordering::Relaxed);
    }
}

impl<H: DmxLineHal> DmxLine<H> {
    /// Uart receive trampoline. Highest-priority interrupt context only; one
    /// byte/break event per invocation.
    pub fn on_uart_event(&self, event: UartEvent) {
        let now = self.hal.micros();

        match event {
            UartEvent::Break => {
                // a frame in flight is abandoned without publish; the slot is reused
                self.rx.last_break_micros.store(now, Ordering::Relaxed);
                self.rx.set_state(ReceiveState::Break);
            },
            UartEvent::Byte(byte) => self.on_byte(byte, now),
        }

        self.rx.last_byte_micros.store(now, Ordering::Relaxed);
    }

    fn on_byte(&self, byte: u8, now: u32) {
        match self.rx.state() {
            ReceiveState::Idle => {
                if byte == PREAMBLE_BYTE {
                    let frame = unsafe { self.rdm_ring.head_slot() };
                    frame.reset();
                    let _ = frame.data.push(PREAMBLE_BYTE);
                    self.rx.set_state(ReceiveState::DiscoveryPreamble);
                }
            },
            ReceiveState::Break => self.on_start_code(byte),
            ReceiveState::DmxData => self.on_dmx_byte(byte, now),
            ReceiveState::RdmData => self.on_rdm_byte(byte),
            ReceiveState::ChecksumHigh => self.on_checksum_high(byte),
            ReceiveState::ChecksumLow => self.on_checksum_low(byte, now),
            ReceiveState::DiscoveryPreamble => self.on_discovery_preamble(byte),
            ReceiveState::DiscoveryEuid => self.on_discovery_euid(byte),
            ReceiveState::DiscoveryChecksum => self.on_discovery_checksum(byte, now),
        }
    }

    fn on_start_code(&self, byte: u8) {
        match byte {
            DMX_NULL_START => {
                let frame = unsafe { self.dmx_ring.head_slot() };
                frame.reset();
                let _ = frame.data.push(DMX_NULL_START);

                self.totals.count_dmx();

                let latest_break = self.rx.last_break_micros.load(Ordering::Relaxed);
                if self.rx.previous_break_was_dmx.load(Ordering::Relaxed) {
                    frame.statistics.break_to_break = latest_break
                        .wrapping_sub(self.rx.previous_break_micros.load(Ordering::Relaxed));
                } else {
                    self.rx.previous_break_was_dmx.store(true, Ordering::Relaxed);
                }
                self.rx
                    .previous_break_micros
                    .store(latest_break, Ordering::Relaxed);

                self.rx.set_state(ReceiveState::DmxData);
            },
            SC_RDM => {
                let frame = unsafe { self.rdm_ring.head_slot() };
                frame.reset();
                let _ = frame.data.push(SC_RDM);

                self.totals.count_rdm();
                self.rx.rdm_checksum.store(SC_RDM as u16, Ordering::Relaxed);
                self.rx.rdm_message_length.store(0, Ordering::Relaxed);
                self.rx.previous_break_was_dmx.store(false, Ordering::Relaxed);

                self.rx.set_state(ReceiveState::RdmData);
            },
            _ => {
                self.rx.previous_break_was_dmx.store(false, Ordering::Relaxed);
                self.rx.set_state(ReceiveState::Idle);
            },
        }
    }

    fn on_dmx_byte(&self, byte: u8, now: u32) {
        let frame = unsafe { self.dmx_ring.head_slot() };

        let mut slot_to_slot =
            now.wrapping_sub(self.rx.last_byte_micros.load(Ordering::Relaxed));
        if slot_to_slot < DMX_SLOT_TO_SLOT_FLOOR_MICROS {
            // late interrupt delivery makes the cadence look shorter than the wire allows
            slot_to_slot = DMX_SLOT_TO_SLOT_FLOOR_MICROS;
        }
        frame.statistics.slot_to_slot = slot_to_slot;

        let _ = frame.data.push(byte);
        self.hal.arm_slot_timer(
            now.wrapping_add(slot_to_slot)
                .wrapping_add(RECEIVE_SLOT_MARGIN_MICROS),
        );

        if frame.data.is_full() {
            // slot 512 reached; the watchdog handles every shorter frame
            self.dmx_ring.publish_head();
            self.rx.set_state(ReceiveState::Idle);
        }
    }

    fn on_rdm_byte(&self, byte: u8) {
        let frame = unsafe { self.rdm_ring.head_slot() };

        if frame.data.push(byte).is_err() {
            self.rx.set_state(ReceiveState::Idle);
            return;
        }

        let checksum = self.rx.rdm_checksum.load(Ordering::Relaxed);
        self.rx
            .rdm_checksum
            .store(checksum.wrapping_add(byte as u16), Ordering::Relaxed);

        if frame.data.len() == RDM_MESSAGE_LENGTH_OFFSET + 1 {
            if !(RDM_MIN_MESSAGE_LENGTH..=RDM_MAX_MESSAGE_LENGTH).contains(&byte) {
                self.rx.set_state(ReceiveState::Idle);
                return;
            }
            self.rx.rdm_message_length.store(byte, Ordering::Relaxed);
        }

        if frame.data.len() == self.rx.rdm_message_length.load(Ordering::Relaxed) as usize {
            self.rx.set_state(ReceiveState::ChecksumHigh);
        }
    }

    fn on_checksum_high(&self, byte: u8) {
        let frame = unsafe { self.rdm_ring.head_slot() };

        if frame.data.push(byte).is_err() {
            self.rx.set_state(ReceiveState::Idle);
            return;
        }

        let checksum = self.rx.rdm_checksum.load(Ordering::Relaxed);
        self.rx.rdm_checksum.store(
            checksum.wrapping_sub((byte as u16) << 8),
            Ordering::Relaxed,
        );

        self.rx.set_state(ReceiveState::ChecksumLow);
    }

    fn on_checksum_low(&self, byte: u8, now: u32) {
        let frame = unsafe { self.rdm_ring.head_slot() };

        if frame.data.push(byte).is_err() {
            self.rx.set_state(ReceiveState::Idle);
            return;
        }

        let checksum = self
            .rx
            .rdm_checksum
            .load(Ordering::Relaxed)
            .wrapping_sub(byte as u16);
        self.rx.rdm_checksum.store(checksum, Ordering::Relaxed);

        if checksum == 0 && frame.data.get(1) == Some(&SC_SUB_MESSAGE) {
            self.rdm_ring.publish_head();
            self.rx.rdm_receive_end_micros.store(now, Ordering::Relaxed);
        }

        self.rx.set_state(ReceiveState::Idle);
    }

    fn on_discovery_preamble(&self, byte: u8) {
        let frame = unsafe { self.rdm_ring.head_slot() };

        match byte {
            PREAMBLE_BYTE => {
                if frame.data.len() == RDM_DISCOVERY_PREAMBLE_MAX {
                    // more preamble bytes than the encoding allows
                    self.rx.set_state(ReceiveState::Idle);
                    return;
                }
                let _ = frame.data.push(PREAMBLE_BYTE);
            },
            SEPARATOR_BYTE => {
                let _ = frame.data.push(SEPARATOR_BYTE);
                self.rx.discovery_index.store(0, Ordering::Relaxed);
                self.rx.set_state(ReceiveState::DiscoveryEuid);
            },
            _ => {
                self.rx.set_state(ReceiveState::Idle);
            },
        }
    }

    fn on_discovery_euid(&self, byte: u8) {
        let frame = unsafe { self.rdm_ring.head_slot() };

        if frame.data.push(byte).is_err() {
            self.rx.set_state(ReceiveState::Idle);
            return;
        }

        let index = self.rx.discovery_index.load(Ordering::Relaxed) + 1;
        self.rx.discovery_index.store(index, Ordering::Relaxed);

        if index as usize == RDM_DISCOVERY_EUID_SIZE {
            self.rx.discovery_index.store(0, Ordering::Relaxed);
            self.rx.set_state(ReceiveState::DiscoveryChecksum);
        }
    }

    fn on_discovery_checksum(&self, byte: u8, now: u32) {
        let frame = unsafe { self.rdm_ring.head_slot() };

        if frame.data.push(byte).is_err() {
            self.rx.set_state(ReceiveState::Idle);
            return;
        }

        let index = self.rx.discovery_index.load(Ordering::Relaxed) + 1;
        self.rx.discovery_index.store(index, Ordering::Relaxed);

        if index as usize == RDM_DISCOVERY_CHECKSUM_SIZE {
            self.rdm_ring.publish_head();
            self.rx.rdm_receive_end_micros.store(now, Ordering::Relaxed);
            self.rx.set_state(ReceiveState::Idle);
        }
    }

    /// Inter-slot watchdog, driven by the slot timer while the port receives. A DMX
    /// sender may stop after any slot; once the line stays silent for longer than the
    /// measured slot-to-slot time the frame is complete up to the last slot received.
    pub(crate) fn receive_slot_tick(&self, now: u32) {
        if self.rx.state() != ReceiveState::DmxData {
            return;
        }

        let frame = unsafe { self.dmx_ring.head_slot() };
        let slot_to_slot = frame.statistics.slot_to_slot;

        if now.wrapping_sub(self.rx.last_byte_micros.load(Ordering::Relaxed)) > slot_to_slot {
            if frame.data.len() > 1 {
                self.dmx_ring.publish_head();
            }
            self.rx.set_state(ReceiveState::Idle);
        } else {
            self.hal.arm_slot_timer(now.wrapping_add(slot_to_slot));
        }
    }

    /// Once-per-second trampoline: samples the update rate and rearms itself. Timer
    /// interrupt context only.
    pub fn on_pps_tick(&self) {
        let now = self.hal.micros();
        self.hal
            .arm_pps_timer(now.wrapping_add(MICROS_PER_SECOND));

        self.pps
            .sample(self.totals.dmx_packets.load(Ordering::Relaxed));
    }

    /// Current state of the receive machine.
    pub fn get_receive_state(&self) -> ReceiveState {
        self.rx.state()
    }
}

#[cfg(test)]
mod tests {
    use super::ReceiveState;
    use crate::hal::UartEvent;
    use crate::test_hal::{
        build_discovery_response, build_rdm_message, feed, feed_dmx_packet, input_line,
        run_watchdog_after_silence,
    };
    use crate::unique_identifier::UniqueIdentifier;
    use crate::utils::calculate_checksum;

    #[test]
    fn test_short_frame_finalized_by_watchdog() {
        let line = input_line();

        feed_dmx_packet(&line, &[0x11, 0x22, 0x33]);
        assert_eq!(line.get_receive_state(), ReceiveState::DmxData);

        run_watchdog_after_silence(&line, 1_500);
        assert_eq!(line.get_receive_state(), ReceiveState::Idle);

        let frame = line.get_available_dmx().unwrap();
        assert_eq!(frame.as_slice(), &[0x00, 0x11, 0x22, 0x33]);
        assert_eq!(frame.slots_in_packet(), 3);
        assert_eq!(frame.statistics().slot_to_slot, 44);
        drop(frame);

        assert!(line.get_available_dmx().is_none());
    }

    #[test]
    fn test_two_slot_frame_finalized_by_watchdog() {
        let line = input_line();

        feed_dmx_packet(&line, &[0x11, 0x22]);
        run_watchdog_after_silence(&line, 2_000);

        let frame = line.get_available_dmx().unwrap();
        assert_eq!(frame.as_slice(), &[0x00, 0x11, 0x22]);
        assert_eq!(frame.slots_in_packet(), 2);
    }

    #[test]
    fn test_full_universe_finalized_in_interrupt() {
        let line = input_line();

        let slots: std::vec::Vec<u8> = (0u32..512).map(|i| (i % 256) as u8).collect();
        feed_dmx_packet(&line, &slots);

        // slot 512 completes the frame without the watchdog
        assert_eq!(line.get_receive_state(), ReceiveState::Idle);

        let frame = line.get_available_dmx().unwrap();
        assert_eq!(frame.slots_in_packet(), 512);
        assert!(frame
            .slots()
            .iter()
            .enumerate()
            .all(|(index, &slot)| slot == (index % 256) as u8));
    }

    #[test]
    fn test_slot_to_slot_clamped_to_interrupt_floor() {
        let line = input_line();

        feed(&line, UartEvent::Break);
        feed(&line, UartEvent::Byte(0x00));
        // bytes arriving back to back because the interrupt was held off
        line.hal.advance(2);
        line.on_uart_event(UartEvent::Byte(0x11));
        line.hal.advance(2);
        line.on_uart_event(UartEvent::Byte(0x22));

        run_watchdog_after_silence(&line, 1_500);

        let frame = line.get_available_dmx().unwrap();
        assert_eq!(frame.statistics().slot_to_slot, 44);
    }

    #[test]
    fn test_break_to_break_statistics() {
        let line = input_line();

        feed(&line, UartEvent::Break);
        let first_break = line.hal.now();
        feed(&line, UartEvent::Byte(0x00));
        feed(&line, UartEvent::Byte(0x01));
        run_watchdog_after_silence(&line, 1_500);

        feed(&line, UartEvent::Break);
        let second_break = line.hal.now();
        feed(&line, UartEvent::Byte(0x00));
        feed(&line, UartEvent::Byte(0x02));
        run_watchdog_after_silence(&line, 1_500);

        let first = line.get_available_dmx().unwrap();
        assert_eq!(first.statistics().break_to_break, 0);
        drop(first);

        let second = line.get_available_dmx().unwrap();
        assert_eq!(
            second.statistics().break_to_break,
            second_break.wrapping_sub(first_break)
        );
    }

    #[test]
    fn test_mid_frame_break_abandons_frame() {
        let line = input_line();

        feed(&line, UartEvent::Break);
        feed(&line, UartEvent::Byte(0x00));
        feed(&line, UartEvent::Byte(0x11));
        // sender restarts mid-frame
        feed(&line, UartEvent::Break);
        feed(&line, UartEvent::Byte(0x00));
        feed(&line, UartEvent::Byte(0x77));
        run_watchdog_after_silence(&line, 1_500);

        let frame = line.get_available_dmx().unwrap();
        assert_eq!(frame.as_slice(), &[0x00, 0x77]);
        drop(frame);
        assert!(line.get_available_dmx().is_none());

        // both frames count as started
        assert_eq!(line.get_total_statistics().dmx_packets, 2);
    }

    #[test]
    fn test_unknown_start_code_ignored() {
        let line = input_line();

        feed(&line, UartEvent::Break);
        feed(&line, UartEvent::Byte(0x55));
        assert_eq!(line.get_receive_state(), ReceiveState::Idle);
        feed(&line, UartEvent::Byte(0x10));

        run_watchdog_after_silence(&line, 1_500);
        assert!(line.get_available_dmx().is_none());
        assert!(line.get_available_rdm().is_none());

        let totals = line.get_total_statistics();
        assert_eq!(totals.dmx_packets, 0);
        assert_eq!(totals.rdm_packets, 0);
    }

    #[test]
    fn test_rdm_message_captured() {
        let line = input_line();

        let message = build_rdm_message(0x1000);
        feed(&line, UartEvent::Break);
        for &byte in &message {
            feed(&line, UartEvent::Byte(byte));
        }

        let frame = line.get_available_rdm().unwrap();
        assert_eq!(frame.as_slice(), message.as_slice());
        assert_eq!(frame.message_length(), Some(24));
        assert_eq!(frame.parameter_id(), Some(0x1000));
        assert!(!frame.is_discovery_response());
        drop(frame);

        let totals = line.get_total_statistics();
        assert_eq!(totals.rdm_packets, 1);
        assert_eq!(totals.dmx_packets, 0);
        assert_ne!(line.rdm_receive_end_micros(), 0);
    }

    #[test]
    fn test_rdm_checksum_verified() {
        // frames[0..message_length) must sum to the trailing 16-bit checksum
        let message = build_rdm_message(0x0200);
        let length = message[2] as usize;
        let expected = u16::from_be_bytes([message[length], message[length + 1]]);
        assert_eq!(calculate_checksum(&message[..length]), expected);
    }

    #[test]
    fn test_rdm_bad_checksum_dropped() {
        let line = input_line();

        let mut message = build_rdm_message(0x1000);
        let last = message.len() - 1;
        message[last] = message[last].wrapping_add(1);

        feed(&line, UartEvent::Break);
        for &byte in &message {
            feed(&line, UartEvent::Byte(byte));
        }

        // counted as started, but the consumer sees nothing
        assert!(line.get_available_rdm().is_none());
        assert_eq!(line.get_total_statistics().rdm_packets, 1);
    }

    #[test]
    fn test_rdm_wrong_sub_start_code_dropped() {
        let line = input_line();

        let mut message = build_rdm_message(0x1000);
        message[1] = 0x02;
        let length = message[2] as usize;
        let checksum = calculate_checksum(&message[..length]);
        message[length] = (checksum >> 8) as u8;
        message[length + 1] = checksum as u8;

        feed(&line, UartEvent::Break);
        for &byte in &message {
            feed(&line, UartEvent::Byte(byte));
        }

        assert!(line.get_available_rdm().is_none());
    }

    #[test]
    fn test_rdm_message_length_out_of_range_aborts() {
        let line = input_line();

        for bad_length in [0u8, 2, 23] {
            let mut message = build_rdm_message(0x1000);
            message[2] = bad_length;

            feed(&line, UartEvent::Break);
            for &byte in &message {
                feed(&line, UartEvent::Byte(byte));
            }

            assert_eq!(line.get_receive_state(), ReceiveState::Idle);
            assert!(line.get_available_rdm().is_none());
        }
    }

    #[test]
    fn test_discovery_response_captured() {
        let line = input_line();

        let uid = UniqueIdentifier::new(0x02AC, 0x00000007).unwrap();
        let response = build_discovery_response(uid);

        // discovery responses arrive without a break
        for &byte in &response {
            feed(&line, UartEvent::Byte(byte));
        }

        let frame = line.get_available_rdm().unwrap();
        assert_eq!(frame.as_slice(), response.as_slice());
        assert!(frame.is_discovery_response());
        assert_eq!(frame.discovery_uid(), Ok(uid));
    }

    #[test]
    fn test_discovery_preamble_overflow_aborts() {
        let line = input_line();

        // an eighth preamble byte is one more than the encoding allows
        for _ in 0..8 {
            feed(&line, UartEvent::Byte(0xFE));
        }
        assert_eq!(line.get_receive_state(), ReceiveState::Idle);

        feed(&line, UartEvent::Byte(0xAA));
        assert!(line.get_available_rdm().is_none());
    }

    #[test]
    fn test_watchdog_rearms_while_cadence_holds() {
        let line = input_line();

        feed_dmx_packet(&line, &[0x11]);

        // the timer fires early; the line has not been silent for a slot yet
        line.hal.slot_timer.take().unwrap();
        line.hal.advance(10);
        line.on_slot_tick();

        assert_eq!(line.get_receive_state(), ReceiveState::DmxData);
        assert!(line.hal.slot_timer.get().is_some());
        assert!(line.get_available_dmx().is_none());
    }

    #[test]
    fn test_watchdog_never_publishes_empty_frame() {
        let line = input_line();

        feed(&line, UartEvent::Break);
        feed(&line, UartEvent::Byte(0x00));

        // silence straight after the start code: nothing worth delivering
        line.hal.advance(2_000);
        line.on_slot_tick();

        assert!(line.get_available_dmx().is_none());
        assert_eq!(line.get_receive_state(), ReceiveState::Idle);
    }

    #[test]
    fn test_ring_overrun_drops_newest_frame() {
        let line = input_line();

        for value in 1u8..=4 {
            feed_dmx_packet(&line, &[value]);
            run_watchdog_after_silence(&line, 1_500);
        }

        // one ring entry stays free: three frames committed, the fourth refused
        for value in 1u8..=3 {
            let frame = line.get_available_dmx().unwrap();
            assert_eq!(frame.slots(), &[value]);
        }
        assert!(line.get_available_dmx().is_none());

        let totals = line.get_total_statistics();
        assert_eq!(totals.dmx_packets, 4);
        assert_eq!(totals.dmx_frames_dropped, 1);
    }

    #[test]
    fn test_updates_per_second_sampling() {
        let line = input_line();
        assert_eq!(line.get_updates_per_second(), 0);

        for _ in 0..3 {
            feed_dmx_packet(&line, &[0x01]);
            run_watchdog_after_silence(&line, 1_500);
        }

        line.hal.pps_timer.take().unwrap();
        line.on_pps_tick();

        assert_eq!(line.get_updates_per_second(), 3);
        assert!(line.hal.pps_timer.get().is_some());
    }
}
