//! Listings shared by the test suites.

use vfstree_types::{FileItem, VfsStat, VolumeListing};

/// `/sd` holding `a/b.txt` (10 bytes), as a server would list it.
pub fn sd_with_nested_file() -> VolumeListing {
    VolumeListing::new("/sd", vec![FileItem::file("a/b.txt", 10)])
}

/// A small device: a flat config volume and an SD card with some depth.
pub fn device_volumes() -> Vec<VolumeListing> {
    vec![
        VolumeListing {
            path: "/sd".to_string(),
            files: vec![
                FileItem::file("boot.fseq", 4096),
                FileItem::file("logs/2024/01.log", 120),
                FileItem::file("logs/2024/02.log", 80),
                FileItem::directory("empty/"),
                FileItem::file("show/intro.fseq", 2048),
            ],
            vfs_stat: Some(VfsStat {
                mounted: true,
                sector_size: 512,
                total_sectors: 1000,
                used_sectors: 13,
                free_sectors: 987,
            }),
        },
        VolumeListing {
            path: "/config".to_string(),
            files: vec![
                FileItem::file("config.ini", 512),
                FileItem::file("wifi.ini", 64),
            ],
            vfs_stat: Some(VfsStat {
                mounted: true,
                sector_size: 1,
                total_sectors: 65536,
                used_sectors: 576,
                free_sectors: 64960,
            }),
        },
    ]
}
