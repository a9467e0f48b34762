//! Line-wide packet counters.
//!
//! Per-frame timing lives inside the frame slots (see
//! [`PacketStatistics`](crate::frame::PacketStatistics)); this module only holds the
//! totals that outlive individual frames. All counters are written from a single
//! interrupt context and read from anywhere.

use core::sync::atomic::{AtomicU32, Ordering};

/// Snapshot of the totals since init or the last reset.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TotalStatistics {
    /// DMX frames started (break followed by a null start code).
    pub dmx_packets: u32,
    /// RDM frames started (break followed by `0xCC`).
    pub rdm_packets: u32,
    /// Completed DMX frames refused because the ring was full.
    pub dmx_frames_dropped: u32,
    /// Completed RDM frames refused because the ring was full.
    pub rdm_frames_dropped: u32,
}

#[derive(Default)]
pub(crate) struct TotalCounters {
    pub dmx_packets: AtomicU32,
    pub rdm_packets: AtomicU32,
}

impl TotalCounters {
    pub fn count_dmx(&self) {
        self.dmx_packets.fetch_add(1, Ordering::Relaxed);
    }

    pub fn count_rdm(&self) {
        self.rdm_packets.fetch_add(1, Ordering::Relaxed);
    }

    pub fn reset(&self) {
        self.dmx_packets.store(0, Ordering::Relaxed);
        self.rdm_packets.store(0, Ordering::Relaxed);
    }
}

/// Sampling state for the once-per-second update counter.
#[derive(Default)]
pub(crate) struct PpsCounter {
    updates_per_second: AtomicU32,
    dmx_packets_sample: AtomicU32,
}

impl PpsCounter {
    /// Called from the one-second timer with the current started-frame total.
    pub fn sample(&self, dmx_packets: u32) {
        let previous = self.dmx_packets_sample.swap(dmx_packets, Ordering::Relaxed);
        self.updates_per_second
            .store(dmx_packets.wrapping_sub(previous), Ordering::Relaxed);
    }

    pub fn updates_per_second(&self) -> u32 {
        self.updates_per_second.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.updates_per_second.store(0, Ordering::Relaxed);
        self.dmx_packets_sample.store(0, Ordering::Relaxed);
    }
}
