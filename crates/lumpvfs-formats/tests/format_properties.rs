//! Property tests for the WAD and zip readers
#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

use lumpvfs_formats::sniff::{self, ContainerFormat};
use lumpvfs_formats::wad::{ContainerRole, WadDirectory, WadError, normalize_name};
use lumpvfs_formats::zip::{ZipDirectory, read_entry};
use lumpvfs_test_utils::{WadBuilder, ZipBuilder};
use proptest::prelude::*;
use std::io::Cursor;

fn lumps() -> impl Strategy<Value = Vec<(String, Vec<u8>)>> {
    prop::collection::vec(
        ("[a-zA-Z0-9_]{1,8}", prop::collection::vec(any::<u8>(), 0..64)),
        0..12,
    )
}

proptest! {
    #[test]
    fn wad_directory_describes_built_lumps(lumps in lumps(), iwad in any::<bool>()) {
        let builder = if iwad { WadBuilder::iwad() } else { WadBuilder::pwad() };
        let data = lumps
            .iter()
            .fold(builder, |wad, (name, payload)| wad.lump(name, payload))
            .build();

        prop_assert_eq!(sniff::classify_bytes(&data), ContainerFormat::Wad);
        let directory = WadDirectory::parse_bytes(&data).unwrap();
        let role = if iwad { ContainerRole::Base } else { ContainerRole::Patch };
        prop_assert_eq!(directory.role, role);
        prop_assert_eq!(directory.entries.len(), lumps.len());

        for (entry, (name, payload)) in directory.entries.iter().zip(&lumps) {
            prop_assert_eq!(entry.name_str(), name.to_ascii_uppercase());
            let start = entry.offset as usize;
            prop_assert_eq!(&data[start..start + entry.size as usize], payload.as_slice());
        }
    }

    #[test]
    fn truncated_wad_directory_rejected(lumps in lumps(), cut in 1usize..16) {
        prop_assume!(!lumps.is_empty());
        let data = lumps
            .iter()
            .fold(WadBuilder::pwad(), |wad, (name, payload)| wad.lump(name, payload))
            .build();

        let result = WadDirectory::parse_bytes(&data[..data.len() - cut]);
        prop_assert!(
            matches!(result, Err(WadError::DirectoryOutOfBounds { .. })),
            "expected DirectoryOutOfBounds, got {:?}",
            result
        );
    }

    #[test]
    fn normalize_name_is_idempotent(raw in any::<[u8; 8]>()) {
        let once = normalize_name(&raw);
        prop_assert_eq!(normalize_name(&once), once);
        prop_assert!(once.iter().all(|b| !b.is_ascii_lowercase()));
        let end = once.iter().position(|&b| b == 0).unwrap_or(8);
        prop_assert!(once[end..].iter().all(|&b| b == 0));
    }

    #[test]
    fn end_record_found_behind_any_comment(
        comment in "[a-z ]{0,2048}",
        payload in "[a-z]{1,64}",
    ) {
        let data = ZipBuilder::new()
            .stored("readme.txt", payload.as_bytes())
            .comment(comment.as_bytes())
            .build();

        let directory = ZipDirectory::parse_bytes(&data).unwrap();
        prop_assert_eq!(directory.entries.len(), 1);
        let mut cursor = Cursor::new(&data);
        let content = read_entry(&mut cursor, &directory.entries[0]).unwrap();
        prop_assert_eq!(content, payload.as_bytes());
    }
}
