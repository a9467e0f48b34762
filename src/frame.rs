use crate::consts::{
    DMX_MAX_PACKAGE_SIZE, PREAMBLE_BYTE, RDM_DISCOVERY_CHECKSUM_SIZE, RDM_DISCOVERY_EUID_SIZE,
    RDM_MAX_PACKAGE_SIZE, RDM_UID_SIZE, SC_RDM, SEPARATOR_BYTE,
};
use crate::layouts::rdm_message_layout;
use crate::unique_identifier::UniqueIdentifier;
use crate::utils::{calculate_checksum, decode_disc_unique};

/// Raised when a staged transmit packet is empty or larger than start code + universe.
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameSizeError;

impl core::fmt::Display for FrameSizeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "packet size must be between 1 and 513 bytes")
    }
}

#[cfg(feature = "std")]
#[cfg_attr(docsrs, doc(cfg(feature = "std")))]
impl std::error::Error for FrameSizeError {}

/// Timing measured while one DMX frame was on the wire. Travels inside the ring slot,
/// so the consumer receives it atomically with the payload.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PacketStatistics {
    /// Microseconds between start bits of successive slots, clamped to the
    /// interrupt latency floor.
    pub slot_to_slot: u32,
    /// Microseconds between this frame's break and the previous DMX frame's break.
    /// Zero on the first frame of a sequence.
    pub break_to_break: u32,
}

/// One received DMX package: the start code plus up to 512 slots, and the timing
/// captured while it arrived.
#[derive(Debug, Default, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DmxFrame {
    pub(crate) data: heapless::Vec<u8, DMX_MAX_PACKAGE_SIZE>,
    pub(crate) statistics: PacketStatistics,
}

impl DmxFrame {
    /// Start code and slots as they came off the wire.
    pub fn as_slice(&self) -> &[u8] {
        self.data.as_slice()
    }

    pub fn start_code(&self) -> Option<u8> {
        self.data.first().copied()
    }

    /// The data slots, excluding the start code.
    pub fn slots(&self) -> &[u8] {
        self.data.get(1..).unwrap_or(&[])
    }

    /// Number of data slots in this frame, 1..=512 for delivered frames.
    pub fn slots_in_packet(&self) -> usize {
        self.data.len().saturating_sub(1)
    }

    pub fn statistics(&self) -> &PacketStatistics {
        &self.statistics
    }

    pub(crate) fn reset(&mut self) {
        self.data.clear();
        self.statistics = PacketStatistics::default();
    }
}

/// Errors produced when decoding a captured discovery response.
#[derive(Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DiscoveryDecodeError {
    /// The frame carries no separator byte, so it is not a discovery response.
    NotDiscovery,
    /// Separator found but the euid or checksum field is cut short.
    Truncated,
    /// The interleaved checksum does not match the euid field.
    WrongChecksum,
    /// The decoded uid is a broadcast address.
    BroadcastUid,
}

impl core::fmt::Display for DiscoveryDecodeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let error_message = match self {
            DiscoveryDecodeError::NotDiscovery => "frame is not a discovery response",
            DiscoveryDecodeError::Truncated => "discovery response is cut short",
            DiscoveryDecodeError::WrongChecksum => "checksum is incorrect",
            DiscoveryDecodeError::BroadcastUid => "decoded uid is a broadcast",
        };

        write!(f, "{}", error_message)
    }
}

#[cfg(feature = "std")]
#[cfg_attr(docsrs, doc(cfg(feature = "std")))]
impl std::error::Error for DiscoveryDecodeError {}

/// One captured RDM package, either a checksum-verified `0xCC` message or a raw
/// discovery response (`0xFE` preamble, `0xAA` separator, encoded euid).
#[derive(Debug, Default, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RdmFrame {
    pub(crate) data: heapless::Vec<u8, RDM_MAX_PACKAGE_SIZE>,
}

impl RdmFrame {
    pub fn as_slice(&self) -> &[u8] {
        self.data.as_slice()
    }

    pub fn start_code(&self) -> Option<u8> {
        self.data.first().copied()
    }

    pub fn is_discovery_response(&self) -> bool {
        matches!(self.start_code(), Some(PREAMBLE_BYTE) | Some(SEPARATOR_BYTE))
    }

    /// Value of the message length field. None for discovery responses.
    pub fn message_length(&self) -> Option<u8> {
        self.header_view().map(|view| view.message_length().read())
    }

    /// Source uid of a `0xCC` message. None for discovery responses and
    /// broadcast sources.
    pub fn source_uid(&self) -> Option<UniqueIdentifier> {
        let view = self.header_view()?;
        UniqueIdentifier::from_bytes(view.source_uid())
    }

    /// Parameter id of a `0xCC` message.
    pub fn parameter_id(&self) -> Option<u16> {
        self.header_view().map(|view| view.parameter_id().read())
    }

    /// Decodes and verifies the euid of a discovery response.
    pub fn discovery_uid(&self) -> Result<UniqueIdentifier, DiscoveryDecodeError> {
        if !self.is_discovery_response() {
            return Err(DiscoveryDecodeError::NotDiscovery);
        }

        let buffer = self.data.as_slice();
        let separator_index = buffer
            .iter()
            .position(|&byte| byte == SEPARATOR_BYTE)
            .ok_or(DiscoveryDecodeError::NotDiscovery)?;

        let euid_start = separator_index + 1;
        let euid = buffer
            .get(euid_start..euid_start + RDM_DISCOVERY_EUID_SIZE)
            .ok_or(DiscoveryDecodeError::Truncated)?;
        let checksum_field = buffer
            .get(
                euid_start + RDM_DISCOVERY_EUID_SIZE
                    ..euid_start + RDM_DISCOVERY_EUID_SIZE + RDM_DISCOVERY_CHECKSUM_SIZE,
            )
            .ok_or(DiscoveryDecodeError::Truncated)?;

        let mut checksum_bytes = [0u8; 2];
        decode_disc_unique(checksum_field, &mut checksum_bytes);
        if u16::from_be_bytes(checksum_bytes) != calculate_checksum(euid) {
            return Err(DiscoveryDecodeError::WrongChecksum);
        }

        let mut uid_bytes = [0u8; RDM_UID_SIZE];
        decode_disc_unique(euid, &mut uid_bytes);

        UniqueIdentifier::from_bytes(&uid_bytes).ok_or(DiscoveryDecodeError::BroadcastUid)
    }

    fn header_view(&self) -> Option<rdm_message_layout::View<&[u8]>> {
        // the fixed header plus the two checksum bytes
        if self.start_code() != Some(SC_RDM) || self.data.len() < 26 {
            return None;
        }

        Some(rdm_message_layout::View::new(self.data.as_slice()))
    }

    pub(crate) fn reset(&mut self) {
        self.data.clear();
    }
}
