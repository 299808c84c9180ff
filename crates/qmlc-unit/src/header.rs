//! Compiled unit header (64 bytes).

use super::codec::{read_i32_le, read_u32_le};
use super::{HEADER_SIZE, MAGIC, VERSION};

/// Header flags (bit field).
pub mod flags {
    /// Bit 0: the unit was compiled from a QML document.
    pub const IS_QML: u32 = 0x0001;
    /// Bit 1: the document declared `pragma Singleton`.
    pub const IS_SINGLETON: u32 = 0x0002;
}

/// Unit header - first 64 bytes of every compiled unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Header {
    /// Magic bytes: b"QMLU"
    pub magic: [u8; 4],
    /// Format version (currently 1)
    pub version: u32,
    /// Total unit size in bytes
    pub unit_size: u32,
    /// Header flags (see `flags` module for bit definitions).
    pub flags: u32,
    /// CRC32 of the structural portion: everything after the header up to
    /// the string table.
    pub checksum: u32,

    pub offset_to_imports: u32,
    pub import_count: u32,
    /// Start of the object offset table.
    pub offset_to_objects: u32,
    pub object_count: u32,
    pub index_of_root_object: u32,
    pub offset_to_string_table: u32,
    pub string_count: u32,

    /// Externally computed checksum over the types this unit depends on.
    /// All zeroes when no dependency information was supplied.
    pub dependency_checksum: [u8; 16],
}

impl Default for Header {
    fn default() -> Self {
        Self {
            magic: MAGIC,
            version: VERSION,
            unit_size: 0,
            flags: 0,
            checksum: 0,
            offset_to_imports: 0,
            import_count: 0,
            offset_to_objects: 0,
            object_count: 0,
            index_of_root_object: 0,
            offset_to_string_table: 0,
            string_count: 0,
            dependency_checksum: [0; 16],
        }
    }
}

impl Header {
    /// Decode header from 64 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        assert!(bytes.len() >= HEADER_SIZE, "header too short");

        let mut dependency_checksum = [0u8; 16];
        dependency_checksum.copy_from_slice(&bytes[48..64]);

        Self {
            magic: [bytes[0], bytes[1], bytes[2], bytes[3]],
            version: read_u32_le(bytes, 4),
            unit_size: read_u32_le(bytes, 8),
            flags: read_u32_le(bytes, 12),
            checksum: read_u32_le(bytes, 16),
            offset_to_imports: read_u32_le(bytes, 20),
            import_count: read_u32_le(bytes, 24),
            offset_to_objects: read_u32_le(bytes, 28),
            object_count: read_u32_le(bytes, 32),
            index_of_root_object: read_i32_le(bytes, 36) as u32,
            offset_to_string_table: read_u32_le(bytes, 40),
            string_count: read_u32_le(bytes, 44),
            dependency_checksum,
        }
    }

    /// Encode header to 64 bytes.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[0..4].copy_from_slice(&self.magic);
        bytes[4..8].copy_from_slice(&self.version.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.unit_size.to_le_bytes());
        bytes[12..16].copy_from_slice(&self.flags.to_le_bytes());
        bytes[16..20].copy_from_slice(&self.checksum.to_le_bytes());
        bytes[20..24].copy_from_slice(&self.offset_to_imports.to_le_bytes());
        bytes[24..28].copy_from_slice(&self.import_count.to_le_bytes());
        bytes[28..32].copy_from_slice(&self.offset_to_objects.to_le_bytes());
        bytes[32..36].copy_from_slice(&self.object_count.to_le_bytes());
        bytes[36..40].copy_from_slice(&self.index_of_root_object.to_le_bytes());
        bytes[40..44].copy_from_slice(&self.offset_to_string_table.to_le_bytes());
        bytes[44..48].copy_from_slice(&self.string_count.to_le_bytes());
        bytes[48..64].copy_from_slice(&self.dependency_checksum);
        bytes
    }

    pub fn validate_magic(&self) -> bool {
        self.magic == MAGIC
    }

    pub fn validate_version(&self) -> bool {
        self.version == VERSION
    }

    pub fn is_qml(&self) -> bool {
        self.flags & flags::IS_QML != 0
    }

    /// Returns true if the document declared `pragma Singleton`.
    pub fn is_singleton(&self) -> bool {
        self.flags & flags::IS_SINGLETON != 0
    }

    /// Set the singleton flag. Once set by the generator it is never cleared.
    pub fn set_singleton(&mut self, singleton: bool) {
        if singleton {
            self.flags |= flags::IS_SINGLETON;
        } else {
            self.flags &= !flags::IS_SINGLETON;
        }
    }

    /// Byte range the structural checksum covers.
    pub fn checksum_range(&self) -> std::ops::Range<usize> {
        HEADER_SIZE..self.offset_to_string_table as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_default() {
        let h = Header::default();
        assert!(h.validate_magic());
        assert!(h.validate_version());
        assert_eq!(h.unit_size, 0);
        assert!(!h.is_qml());
    }

    #[test]
    fn header_roundtrip() {
        let h = Header {
            magic: MAGIC,
            version: VERSION,
            unit_size: 1024,
            flags: flags::IS_QML,
            checksum: 0x12345678,
            offset_to_imports: 64,
            import_count: 2,
            offset_to_objects: 120,
            object_count: 3,
            index_of_root_object: 0,
            offset_to_string_table: 900,
            string_count: 12,
            dependency_checksum: [7; 16],
        };

        let bytes = h.to_bytes();
        assert_eq!(bytes.len(), 64);

        let decoded = Header::from_bytes(&bytes);
        assert_eq!(decoded, h);
    }

    #[test]
    fn header_singleton_flag() {
        let mut h = Header {
            flags: flags::IS_QML,
            ..Default::default()
        };
        assert!(!h.is_singleton());

        h.set_singleton(true);
        assert!(h.is_singleton());
        assert!(h.is_qml());
        assert_eq!(h.flags, flags::IS_QML | flags::IS_SINGLETON);

        h.set_singleton(false);
        assert!(!h.is_singleton());
        assert_eq!(h.flags, flags::IS_QML);
    }

    #[test]
    fn checksum_range_stops_at_string_table() {
        let h = Header {
            offset_to_string_table: 200,
            ..Default::default()
        };
        assert_eq!(h.checksum_range(), 64..200);
    }
}
