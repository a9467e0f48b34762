use core::cell::UnsafeCell;
use core::ops::Deref;
use core::sync::atomic::{AtomicU8, Ordering};

use crate::consts::{
    DMX_BAUD, DMX_MAX_PACKAGE_SIZE, DMX_RING_ENTRIES, RDM_RING_ENTRIES, UART_CLOCK_FALLBACK_HZ,
};
use crate::direction::PortDirection;
use crate::frame::{DmxFrame, RdmFrame};
use crate::hal::DmxLineHal;
use crate::receiver::ReceiveContext;
use crate::ring::FrameRing;
use crate::statistics::{PpsCounter, TotalCounters, TotalStatistics};
use crate::transmitter::TransmitContext;

/// The line driver: rings, receive and transmit contexts, and the hardware handle.
///
/// One instance owns the uart. Interrupt trampolines and foreground callers share the
/// same `&DmxLine`; everything inside is atomics, rings and interior-mutable slots, so
/// no method needs `&mut self`.
///
/// Context discipline (not enforceable by the compiler, see the method docs):
/// [`on_uart_event`](Self::on_uart_event) is called from exactly one interrupt
/// context, [`on_slot_tick`](Self::on_slot_tick)/[`on_pps_tick`](Self::on_pps_tick)
/// from one lower-priority timer interrupt, and the remaining methods from one
/// foreground context.
pub struct DmxLine<H: DmxLineHal> {
    pub(crate) hal: H,
    pub(crate) direction: AtomicU8,
    pub(crate) rx: ReceiveContext,
    pub(crate) tx: TransmitContext,
    pub(crate) dmx_ring: FrameRing<DmxFrame, DMX_RING_ENTRIES>,
    pub(crate) rdm_ring: FrameRing<RdmFrame, RDM_RING_ENTRIES>,
    pub(crate) totals: TotalCounters,
    pub(crate) pps: PpsCounter,
    /// Copy of the last frame handed out by [`is_data_changed`](Self::is_data_changed).
    /// Foreground-only.
    shadow: UnsafeCell<heapless::Vec<u8, DMX_MAX_PACKAGE_SIZE>>,
}

// The UnsafeCell members are covered by the context discipline documented above.
unsafe impl<H: DmxLineHal + Sync> Sync for DmxLine<H> {}

impl<H: DmxLineHal> DmxLine<H> {
    /// Creates the driver without touching the hardware. Call
    /// [`init`](Self::init) before use.
    pub fn new(hal: H) -> Self {
        let line = Self {
            hal,
            direction: AtomicU8::new(PortDirection::Input as u8),
            rx: ReceiveContext::default(),
            tx: TransmitContext::default(),
            dmx_ring: FrameRing::new(),
            rdm_ring: FrameRing::new(),
            totals: TotalCounters::default(),
            pps: PpsCounter::default(),
            shadow: UnsafeCell::new(heapless::Vec::new()),
        };
        line.recompute_period();

        line
    }

    /// Programs the uart for 250 kbaud 8-N-2, empties the rings and counters, and
    /// leaves the port in input direction with data disabled. Idempotent.
    ///
    /// Falls back to the 4 MHz uart input clock when the programmed clock does not
    /// divide down to an integer 250 kbaud divisor.
    pub fn init(&self) {
        self.stop_data();

        self.dmx_ring.reset();
        self.rdm_ring.reset();
        unsafe {
            self.dmx_ring.for_each_slot(|frame| frame.reset());
            self.rdm_ring.for_each_slot(|frame| frame.reset());
            (*self.shadow.get()).clear();
        }
        self.rx.reset();
        self.tx.reset_state();
        self.totals.reset();
        self.pps.reset();
        self.dmx_ring.reset_dropped();
        self.rdm_ring.reset_dropped();

        let divider = 16 * DMX_BAUD;
        let mut clock = self.hal.uart_clock_hz();
        if clock % divider != 0 {
            clock = self.hal.set_uart_clock_hz(UART_CLOCK_FALLBACK_HZ);
        }
        self.hal.configure_uart(clock / divider);

        self.hal.set_direction_pin(false);
        self.direction
            .store(PortDirection::Input as u8, Ordering::Relaxed);
    }

    /// Slot timer trampoline: the inter-slot watchdog while receiving, the packet
    /// pacer while transmitting. Timer interrupt context only.
    pub fn on_slot_tick(&self) {
        let now = self.hal.micros();

        match self.port_direction() {
            PortDirection::Output => self.transmit_slot_tick(now),
            PortDirection::Input => self.receive_slot_tick(now),
        }
    }

    /// Pops the oldest received DMX frame. The ring slot is handed back to the
    /// receiver when the returned guard is dropped.
    pub fn get_available_dmx(&self) -> Option<DmxFrameRef<'_>> {
        let frame = self.dmx_ring.peek_tail()?;

        Some(DmxFrameRef {
            ring: &self.dmx_ring,
            frame,
        })
    }

    /// Pops the oldest captured RDM frame (message or discovery response).
    pub fn get_available_rdm(&self) -> Option<RdmFrameRef<'_>> {
        let frame = self.rdm_ring.peek_tail()?;

        Some(RdmFrameRef {
            ring: &self.rdm_ring,
            frame,
        })
    }

    /// Pops the next DMX frame and compares it against the last frame this method
    /// returned. Returns the frame when the slot count or any slot value changed,
    /// consumes it silently otherwise.
    ///
    /// This is the only diff operation; it combines pop and compare so the shadow
    /// copy always matches the last frame the caller saw.
    pub fn is_data_changed(&self) -> Option<DmxFrameRef<'_>> {
        let frame = self.get_available_dmx()?;

        // &self methods of this driver run in a single foreground context
        let shadow = unsafe { &mut *self.shadow.get() };
        if shadow.as_slice() == frame.as_slice() {
            return None;
        }

        shadow.clear();
        let _ = shadow.extend_from_slice(frame.as_slice());

        Some(frame)
    }

    /// Totals since init or the last reset. The packet counters count *started*
    /// frames: a frame aborted after its start code was seen is still counted.
    pub fn get_total_statistics(&self) -> TotalStatistics {
        TotalStatistics {
            dmx_packets: self.totals.dmx_packets.load(Ordering::Relaxed),
            rdm_packets: self.totals.rdm_packets.load(Ordering::Relaxed),
            dmx_frames_dropped: self.dmx_ring.dropped(),
            rdm_frames_dropped: self.rdm_ring.dropped(),
        }
    }

    /// Zeroes all totals. Only call while receiving is stopped; the counters are
    /// owned by the receive interrupt while it runs.
    pub fn reset_total_statistics(&self) {
        self.totals.reset();
        self.pps.reset();
        self.dmx_ring.reset_dropped();
        self.rdm_ring.reset_dropped();
    }

    /// DMX frames started during the last full second.
    pub fn get_updates_per_second(&self) -> u32 {
        self.pps.updates_per_second()
    }

    /// Timestamp of the last completed RDM or discovery capture.
    pub fn rdm_receive_end_micros(&self) -> u32 {
        self.rx.receive_end_micros()
    }

    pub(crate) fn recompute_period(&self) {
        self.tx.recompute_period();
    }
}

/// Borrow of one received DMX frame. Dropping it frees the ring slot, so hold on to
/// it only as long as the payload is needed.
pub struct DmxFrameRef<'a> {
    ring: &'a FrameRing<DmxFrame, DMX_RING_ENTRIES>,
    frame: &'a DmxFrame,
}

impl Deref for DmxFrameRef<'_> {
    type Target = DmxFrame;

    fn deref(&self) -> &DmxFrame {
        self.frame
    }
}

impl Drop for DmxFrameRef<'_> {
    fn drop(&mut self) {
        self.ring.consume_tail();
    }
}

/// Borrow of one captured RDM frame. Dropping it frees the ring slot.
pub struct RdmFrameRef<'a> {
    ring: &'a FrameRing<RdmFrame, RDM_RING_ENTRIES>,
    frame: &'a RdmFrame,
}

impl Deref for RdmFrameRef<'_> {
    type Target = RdmFrame;

    fn deref(&self) -> &RdmFrame {
        self.frame
    }
}

impl Drop for RdmFrameRef<'_> {
    fn drop(&mut self) {
        self.ring.consume_tail();
    }
}
