//! Fixed-width lump names

use crate::namespace::Namespace;
use std::fmt;

/// Width of a short lump name
pub const LUMP_NAME_LEN: usize = 8;

/// Case-insensitive short lump name
///
/// Stored upper-cased and zero-padded, so byte equality is case-insensitive
/// equality. Input longer than eight bytes is cut, matching how lump names
/// have always been compared.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct LumpName([u8; LUMP_NAME_LEN]);

impl LumpName {
    /// Build from a string, up to the first NUL or eight bytes
    pub fn new(name: &str) -> Self {
        let mut raw = [0u8; LUMP_NAME_LEN];
        for (dst, &src) in raw
            .iter_mut()
            .zip(name.as_bytes().iter().take_while(|&&b| b != 0))
        {
            *dst = src.to_ascii_uppercase();
        }
        Self(raw)
    }

    /// Build from a raw directory field
    pub fn from_raw(raw: [u8; LUMP_NAME_LEN]) -> Self {
        Self(lumpvfs_formats::wad::normalize_name(&raw))
    }

    /// Derive a short name from a path inside a zip or loose directory
    ///
    /// Uses the basename up to its first `.`. In the sprite namespace `^` is
    /// rewritten to `\`, since frame names may contain a backslash that file
    /// systems do not allow.
    pub fn from_path(path: &str, namespace: Namespace) -> Self {
        let base = path
            .rsplit(['/', '\\', ':'])
            .next()
            .unwrap_or(path);
        let stem = base.split('.').next().unwrap_or(base);
        let mut name = Self::new(stem);
        if namespace == Namespace::Sprites {
            for byte in &mut name.0 {
                if *byte == b'^' {
                    *byte = b'\\';
                }
            }
        }
        name
    }

    /// Raw zero-padded bytes
    pub const fn as_bytes(&self) -> &[u8; LUMP_NAME_LEN] {
        &self.0
    }

    /// Name without padding
    pub fn as_str(&self) -> String {
        let end = self.0.iter().position(|&b| b == 0).unwrap_or(LUMP_NAME_LEN);
        String::from_utf8_lossy(&self.0[..end]).into_owned()
    }

    /// Whether the name is empty
    pub fn is_empty(&self) -> bool {
        self.0[0] == 0
    }
}

impl From<&str> for LumpName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for LumpName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str())
    }
}

impl fmt::Debug for LumpName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LumpName({:?})", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive() {
        assert_eq!(LumpName::new("playpal"), LumpName::new("PLAYPAL"));
        assert_eq!(LumpName::new("PlayPal").as_str(), "PLAYPAL");
    }

    #[test]
    fn test_truncates_to_eight() {
        assert_eq!(LumpName::new("TEXTURE1X").as_str(), "TEXTURE1");
        assert_eq!(LumpName::new("TEXTURE1X"), LumpName::new("texture1"));
    }

    #[test]
    fn test_from_raw_matches_new() {
        assert_eq!(LumpName::from_raw(*b"e1m1\0abc"), LumpName::new("E1M1"));
    }

    #[test]
    fn test_from_path() {
        assert_eq!(
            LumpName::from_path("sounds/dspistol.ogg", Namespace::Sounds).as_str(),
            "DSPISTOL"
        );
        assert_eq!(
            LumpName::from_path("graphics/titlepic.v2.png", Namespace::Global).as_str(),
            "TITLEPIC"
        );
        assert_eq!(
            LumpName::from_path("flats/verylongflatname.png", Namespace::Flats).as_str(),
            "VERYLONG"
        );
        assert_eq!(LumpName::from_path("mapinfo", Namespace::Global).as_str(), "MAPINFO");
    }

    #[test]
    fn test_sprite_caret() {
        assert_eq!(
            LumpName::from_path("sprites/vile^1.png", Namespace::Sprites).as_str(),
            "VILE\\1"
        );
        assert_eq!(
            LumpName::from_path("graphics/vile^1.png", Namespace::Global).as_str(),
            "VILE^1"
        );
    }
}
