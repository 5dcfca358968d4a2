//! Per-volume capacity statistics.

use serde::{Deserialize, Serialize};

/// Capacity of one mounted volume, in sectors.
///
/// Flash filesystems report byte counts with `sector_size = 1`; FAT volumes
/// report real sectors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VfsStat {
    pub mounted: bool,
    pub sector_size: u64,
    pub total_sectors: u64,
    pub used_sectors: u64,
    pub free_sectors: u64,
}

impl VfsStat {
    pub fn total_bytes(&self) -> u64 {
        self.sector_size.saturating_mul(self.total_sectors)
    }

    pub fn used_bytes(&self) -> u64 {
        self.sector_size.saturating_mul(self.used_sectors)
    }

    pub fn free_bytes(&self) -> u64 {
        self.sector_size.saturating_mul(self.free_sectors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_counts_scale_by_sector_size() {
        let stat = VfsStat {
            mounted: true,
            sector_size: 512,
            total_sectors: 100,
            used_sectors: 30,
            free_sectors: 70,
        };
        assert_eq!(stat.total_bytes(), 51_200);
        assert_eq!(stat.used_bytes(), 15_360);
        assert_eq!(stat.free_bytes(), 35_840);
    }

    #[test]
    fn unmounted_volume_decodes_with_zeroes() {
        let stat: VfsStat = serde_json::from_str(r#"{"mounted": false}"#).unwrap();
        assert!(!stat.mounted);
        assert_eq!(stat.total_bytes(), 0);
    }
}
