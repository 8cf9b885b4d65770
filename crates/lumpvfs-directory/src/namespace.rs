//! Namespace classification
//!
//! Every record lands in exactly one [`Namespace`]. Zip and loose-directory
//! records are classified by their leading path segment; WAD records by the
//! marker lumps (`S_START` .. `S_END` and friends) that bracket them.

use lumpvfs_formats::WadEntry;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Logical partition of the record space
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Namespace {
    /// Default namespace
    Global,
    /// Sprite frames
    Sprites,
    /// Flat textures
    Flats,
    /// Palette-swap colormaps
    Colormaps,
    /// Translation tables
    Translations,
    /// Demo recordings
    Demos,
    /// Compiled script modules
    Acs,
    /// Input device profiles
    Pads,
    /// Wall textures
    Textures,
    /// Sound effects
    Sounds,
    /// High-resolution overlays
    Hires,
    /// Paths with no namespace mapping; reachable by full path only
    Hidden,
}

impl Namespace {
    /// Number of namespaces
    pub const COUNT: usize = 12;

    /// All namespaces in declaration order
    pub const ALL: [Self; Self::COUNT] = [
        Self::Global,
        Self::Sprites,
        Self::Flats,
        Self::Colormaps,
        Self::Translations,
        Self::Demos,
        Self::Acs,
        Self::Pads,
        Self::Textures,
        Self::Sounds,
        Self::Hires,
        Self::Hidden,
    ];

    /// Search order for lookups without a namespace filter
    ///
    /// Specialised namespaces first, global last. `Hidden` has no short names.
    pub const LOOKUP_ORDER: [Self; 11] = [
        Self::Sprites,
        Self::Flats,
        Self::Colormaps,
        Self::Translations,
        Self::Demos,
        Self::Acs,
        Self::Pads,
        Self::Textures,
        Self::Sounds,
        Self::Hires,
        Self::Global,
    ];

    /// Dense index for per-namespace tables
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Lowercase name
    pub const fn name(self) -> &'static str {
        match self {
            Self::Global => "global",
            Self::Sprites => "sprites",
            Self::Flats => "flats",
            Self::Colormaps => "colormaps",
            Self::Translations => "translations",
            Self::Demos => "demos",
            Self::Acs => "acs",
            Self::Pads => "pads",
            Self::Textures => "textures",
            Self::Sounds => "sounds",
            Self::Hires => "hires",
            Self::Hidden => "hidden",
        }
    }

    /// Whether records in this namespace get a short name
    pub const fn is_indexed(self) -> bool {
        !matches!(self, Self::Hidden)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Namespace {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|ns| ns.name() == lower)
            .ok_or_else(|| format!("unknown namespace: {s}"))
    }
}

/// Leading path segments recognised in zip and loose-directory containers
pub const PATH_PREFIXES: [(&str, Namespace); 12] = [
    ("acs/", Namespace::Acs),
    ("colormaps/", Namespace::Colormaps),
    ("demos/", Namespace::Demos),
    ("flats/", Namespace::Flats),
    ("graphics/", Namespace::Global),
    ("hires/", Namespace::Hires),
    ("music/", Namespace::Global),
    ("sounds/", Namespace::Sounds),
    ("sprites/", Namespace::Sprites),
    ("translations/", Namespace::Translations),
    ("gamepads/", Namespace::Pads),
    ("textures/", Namespace::Textures),
];

/// Classify a normalised (lower-case, forward slash) container path
///
/// Top-level files are global. Files under an unrecognised directory are
/// [`Namespace::Hidden`].
pub fn classify_path(path: &str) -> Namespace {
    PATH_PREFIXES
        .iter()
        .find(|(prefix, _)| path.starts_with(prefix))
        .map_or_else(
            || {
                if path.contains('/') {
                    Namespace::Hidden
                } else {
                    Namespace::Global
                }
            },
            |(_, ns)| *ns,
        )
}

/// Start and end markers bracketing a WAD namespace range
#[derive(Debug, Clone, Copy)]
pub struct MarkerPair {
    /// Start marker name
    pub start: &'static str,
    /// End marker name
    pub end: &'static str,
    /// Namespace of records between the markers
    pub namespace: Namespace,
}

/// Marker pairs in claim order
pub const WAD_MARKERS: [MarkerPair; 7] = [
    MarkerPair {
        start: "S_START",
        end: "S_END",
        namespace: Namespace::Sprites,
    },
    MarkerPair {
        start: "F_START",
        end: "F_END",
        namespace: Namespace::Flats,
    },
    MarkerPair {
        start: "C_START",
        end: "C_END",
        namespace: Namespace::Colormaps,
    },
    MarkerPair {
        start: "T_START",
        end: "T_END",
        namespace: Namespace::Translations,
    },
    MarkerPair {
        start: "A_START",
        end: "A_END",
        namespace: Namespace::Acs,
    },
    MarkerPair {
        start: "TX_START",
        end: "TX_END",
        namespace: Namespace::Textures,
    },
    MarkerPair {
        start: "HI_START",
        end: "HI_END",
        namespace: Namespace::Hires,
    },
];

/// Whether `name` is `marker`, or `marker` with its first letter doubled
///
/// `SS_START` and `FF_END` are common in older patch WADs.
pub fn is_marker(marker: &str, name: &[u8; 8]) -> bool {
    let mut padded = [0u8; 8];
    let bytes = marker.as_bytes();
    padded[..bytes.len()].copy_from_slice(bytes);

    *name == padded || (name[0] == padded[0] && name[1..] == padded[..7])
}

fn is_any_marker(name: &[u8; 8]) -> bool {
    WAD_MARKERS
        .iter()
        .any(|pair| is_marker(pair.start, name) || is_marker(pair.end, name))
}

/// Whether a record of `size` bytes may join a marker range for `namespace`
///
/// Tiny sprites and empty flats were used as placeholders and sub-markers;
/// they stay global.
const fn admits(namespace: Namespace, size: u32) -> bool {
    match namespace {
        Namespace::Sprites => size > 8,
        Namespace::Flats => size > 0,
        _ => true,
    }
}

/// Assign a namespace to each entry of one WAD directory
///
/// Marker lumps of every pair stay global, including those nested inside
/// another pair's range. When ranges overlap, the first pair in
/// [`WAD_MARKERS`] claims the entry. An unterminated range runs to the end of
/// the directory.
pub fn classify_wad_entries(entries: &[WadEntry]) -> Vec<Namespace> {
    let mut namespaces = vec![Namespace::Global; entries.len()];
    let mut claimed: Vec<bool> = entries.iter().map(|e| is_any_marker(&e.name)).collect();

    for pair in &WAD_MARKERS {
        let mut inside = false;
        for (index, entry) in entries.iter().enumerate() {
            if is_marker(pair.start, &entry.name) {
                inside = true;
            } else if is_marker(pair.end, &entry.name) {
                inside = false;
            } else if inside && !claimed[index] && admits(pair.namespace, entry.size) {
                namespaces[index] = pair.namespace;
                claimed[index] = true;
            }
        }
    }

    namespaces
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn entry(name: &str, size: u32) -> WadEntry {
        let mut raw = [0u8; 8];
        raw[..name.len()].copy_from_slice(name.as_bytes());
        WadEntry {
            name: raw,
            offset: 12,
            size,
        }
    }

    #[test]
    fn test_classify_path() {
        assert_eq!(classify_path("sprites/trooa1.png"), Namespace::Sprites);
        assert_eq!(classify_path("sprites/monsters/trooa1.png"), Namespace::Sprites);
        assert_eq!(classify_path("acs/scripts.o"), Namespace::Acs);
        assert_eq!(classify_path("music/d_runnin.ogg"), Namespace::Global);
        assert_eq!(classify_path("graphics/titlepic.png"), Namespace::Global);
        assert_eq!(classify_path("gamepads/xbox.txt"), Namespace::Pads);
        assert_eq!(classify_path("mapinfo.txt"), Namespace::Global);
        assert_eq!(classify_path("maps/map01.wad"), Namespace::Hidden);
        assert_eq!(classify_path("spritesheet/a.png"), Namespace::Hidden);
    }

    #[test]
    fn test_is_marker() {
        assert!(is_marker("S_START", b"S_START\0"));
        assert!(is_marker("S_START", b"SS_START"));
        assert!(is_marker("F_END", b"FF_END\0\0"));
        assert!(is_marker("TX_START", b"TX_START"));
        assert!(!is_marker("S_START", b"S_STAR\0\0"));
        assert!(!is_marker("S_END", b"XS_END\0\0"));
    }

    #[test]
    fn test_marker_ranges() {
        let entries = vec![
            entry("PLAYPAL", 768),
            entry("S_START", 0),
            entry("TROOA1", 100),
            entry("TINY", 8),
            entry("S_END", 0),
            entry("F_START", 0),
            entry("F1_START", 0),
            entry("FLOOR0_1", 4096),
            entry("F_END", 0),
            entry("ENDOOM", 4000),
        ];
        let namespaces = classify_wad_entries(&entries);
        assert_eq!(
            namespaces,
            vec![
                Namespace::Global,
                Namespace::Global,
                Namespace::Sprites,
                Namespace::Global,
                Namespace::Global,
                Namespace::Global,
                Namespace::Global,
                Namespace::Flats,
                Namespace::Global,
                Namespace::Global,
            ]
        );
    }

    #[test]
    fn test_doubled_markers_and_unterminated_range() {
        let entries = vec![
            entry("SS_START", 0),
            entry("POSSA1", 64),
            entry("SS_END", 0),
            entry("TX_START", 0),
            entry("BRICK", 32),
        ];
        let namespaces = classify_wad_entries(&entries);
        assert_eq!(namespaces[1], Namespace::Sprites);
        assert_eq!(namespaces[4], Namespace::Textures);
        assert_eq!(namespaces[0], Namespace::Global);
    }

    #[test]
    fn test_nested_markers_stay_global() {
        let entries = vec![
            entry("TX_START", 0),
            entry("S_START", 0),
            entry("S_END", 0),
            entry("WALL", 16),
            entry("A_START", 0),
            entry("A_END", 0),
            entry("HI_END", 0),
            entry("TX_END", 0),
        ];
        let namespaces = classify_wad_entries(&entries);
        assert_eq!(
            namespaces,
            vec![
                Namespace::Global,
                Namespace::Global,
                Namespace::Global,
                Namespace::Textures,
                Namespace::Global,
                Namespace::Global,
                Namespace::Global,
                Namespace::Global,
            ]
        );
    }

    #[test]
    fn test_from_str() {
        assert_eq!("Sprites".parse::<Namespace>().unwrap(), Namespace::Sprites);
        assert!("voxels".parse::<Namespace>().is_err());
        for ns in Namespace::ALL {
            assert_eq!(ns.to_string().parse::<Namespace>().unwrap(), ns);
            assert_eq!(Namespace::ALL[ns.index()], ns);
        }
    }
}
