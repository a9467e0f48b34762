//! Recording mock of the hardware contract plus wire-level packet builders shared by
//! the module tests.

use core::cell::{Cell, RefCell};

use std::vec::Vec;

use crate::dmx_line::DmxLine;
use crate::hal::{DmxLineHal, UartEvent};
use crate::unique_identifier::UniqueIdentifier;
use crate::utils::calculate_checksum;

pub(crate) struct TestHal {
    now: Cell<u32>,
    /// Added to the clock on every read so busy-wait loops terminate.
    auto_advance: Cell<u32>,
    pub slot_timer: Cell<Option<u32>>,
    pub pps_timer: Cell<Option<u32>>,
    pub break_active: Cell<bool>,
    /// Timestamps at which a break condition was asserted.
    pub break_starts: RefCell<Vec<u32>>,
    pub tx_bytes: RefCell<Vec<u8>>,
    pub direction_pin: Cell<bool>,
    pub receiver_interrupt: Cell<bool>,
    pub uart_clock: Cell<u32>,
    pub divisor: Cell<Option<u32>>,
}

impl TestHal {
    pub fn new() -> Self {
        Self {
            now: Cell::new(1_000),
            auto_advance: Cell::new(0),
            slot_timer: Cell::new(None),
            pps_timer: Cell::new(None),
            break_active: Cell::new(false),
            break_starts: RefCell::new(Vec::new()),
            tx_bytes: RefCell::new(Vec::new()),
            direction_pin: Cell::new(false),
            receiver_interrupt: Cell::new(false),
            uart_clock: Cell::new(48_000_000),
            divisor: Cell::new(None),
        }
    }

    pub fn now(&self) -> u32 {
        self.now.get()
    }

    pub fn advance(&self, micros: u32) {
        self.now.set(self.now.get().wrapping_add(micros));
    }

    pub fn set_auto_advance(&self, micros: u32) {
        self.auto_advance.set(micros);
    }
}

impl DmxLineHal for TestHal {
    fn micros(&self) -> u32 {
        let now = self.now.get();
        self.now.set(now.wrapping_add(self.auto_advance.get()));
        now
    }

    fn arm_slot_timer(&self, deadline_micros: u32) {
        self.slot_timer.set(Some(deadline_micros));
    }

    fn disarm_slot_timer(&self) {
        self.slot_timer.set(None);
    }

    fn arm_pps_timer(&self, deadline_micros: u32) {
        self.pps_timer.set(Some(deadline_micros));
    }

    fn uart_clock_hz(&self) -> u32 {
        self.uart_clock.get()
    }

    fn set_uart_clock_hz(&self, hz: u32) -> u32 {
        self.uart_clock.set(hz);
        hz
    }

    fn configure_uart(&self, integer_divisor: u32) {
        self.divisor.set(Some(integer_divisor));
    }

    fn uart_write_byte(&self, byte: u8) {
        self.tx_bytes.borrow_mut().push(byte);
    }

    fn uart_tx_fifo_full(&self) -> bool {
        false
    }

    fn uart_tx_busy(&self) -> bool {
        false
    }

    fn uart_set_break(&self, enabled: bool) {
        if enabled && !self.break_active.get() {
            self.break_starts.borrow_mut().push(self.now.get());
        }
        self.break_active.set(enabled);
    }

    fn set_direction_pin(&self, transmit: bool) {
        self.direction_pin.set(transmit);
    }

    fn set_receiver_interrupt(&self, enabled: bool) {
        self.receiver_interrupt.set(enabled);
    }
}

/// A fresh driver, initialized and receiving.
pub(crate) fn input_line() -> DmxLine<TestHal> {
    let line = DmxLine::new(TestHal::new());
    line.init();
    line.set_direction(crate::direction::PortDirection::Input, true);

    line
}

/// Delivers one event with one slot time of line silence in front of it.
pub(crate) fn feed(line: &DmxLine<TestHal>, event: UartEvent) {
    line.hal.advance(44);
    line.on_uart_event(event);
}

/// Break, null start code, then the given slots at wire cadence.
pub(crate) fn feed_dmx_packet(line: &DmxLine<TestHal>, slots: &[u8]) {
    feed(line, UartEvent::Break);
    feed(line, UartEvent::Byte(0x00));
    for &slot in slots {
        feed(line, UartEvent::Byte(slot));
    }
}

/// Lets the line go quiet and fires the armed slot timer, as the inter-slot
/// watchdog would.
pub(crate) fn run_watchdog_after_silence(line: &DmxLine<TestHal>, silence_micros: u32) {
    line.hal.advance(silence_micros);
    if line.hal.slot_timer.take().is_some() {
        line.on_slot_tick();
    }
}

/// Fires the armed slot timer at its deadline. Panics when nothing is armed.
pub(crate) fn run_due_slot_timer(line: &DmxLine<TestHal>) {
    let deadline = line.hal.slot_timer.take().expect("no slot timer armed");
    let late = deadline.wrapping_sub(line.hal.now());
    line.hal.advance(late);
    line.on_slot_tick();
}

pub(crate) fn encode_disc_unique(src: &[u8], dest: &mut [u8]) {
    for (index, byte) in src.iter().enumerate() {
        dest[2 * index] = byte | 0xAA;
        dest[2 * index + 1] = byte | 0x55;
    }
}

/// Full discovery response: 7 preamble bytes, separator, encoded euid, encoded
/// checksum.
pub(crate) fn build_discovery_response(uid: UniqueIdentifier) -> Vec<u8> {
    let mut response = std::vec![0xFEu8; 7];
    response.push(0xAA);

    let mut euid = [0u8; 12];
    encode_disc_unique(&uid.to_bytes(), &mut euid);
    response.extend_from_slice(&euid);

    let mut checksum = [0u8; 4];
    encode_disc_unique(&calculate_checksum(&euid).to_be_bytes(), &mut checksum);
    response.extend_from_slice(&checksum);

    response
}

/// Minimal GET_COMMAND request with an empty parameter data section, checksum
/// appended.
pub(crate) fn build_rdm_message(parameter_id: u16) -> Vec<u8> {
    let mut message = std::vec![0u8; 24];
    message[0] = 0xCC;
    message[1] = 0x01;
    message[2] = 24; // message length
    message[3..9].copy_from_slice(&[0xFF; 6]); // destination: broadcast
    message[9..15]
        .copy_from_slice(&UniqueIdentifier::new(0x02AC, 7).unwrap().to_bytes());
    message[15] = 1; // transaction number
    message[16] = 1; // port id
    message[20] = 0x20; // GET_COMMAND
    message[21..23].copy_from_slice(&parameter_id.to_be_bytes());
    message[23] = 0; // parameter data length

    let checksum = calculate_checksum(&message);
    message.extend_from_slice(&checksum.to_be_bytes());

    message
}
