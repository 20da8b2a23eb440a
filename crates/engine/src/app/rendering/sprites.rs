use std::collections::HashMap;
use std::path::{Path, PathBuf};

use image::ImageReader;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpriteKeyError {
    #[error("sprite key must not be empty")]
    Empty,
    #[error("sprite key must not start with '/'")]
    LeadingSlash,
    #[error("sprite key must not contain '..'")]
    ParentTraversal,
    #[error("sprite key contains invalid character '{character}'")]
    InvalidCharacter { character: char },
}

/// Keys are relative asset paths without extension, e.g. `doodads/tree`.
pub fn validate_sprite_key(key: &str) -> Result<(), SpriteKeyError> {
    if key.is_empty() {
        return Err(SpriteKeyError::Empty);
    }
    if key.starts_with('/') {
        return Err(SpriteKeyError::LeadingSlash);
    }
    if key.contains("..") {
        return Err(SpriteKeyError::ParentTraversal);
    }
    let invalid = key.chars().find(|&ch| {
        !(ch.is_ascii_lowercase() || ch.is_ascii_digit() || matches!(ch, '_' | '/' | '-'))
    });
    match invalid {
        Some(character) => Err(SpriteKeyError::InvalidCharacter { character }),
        None => Ok(()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LoadedSprite {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) rgba: Vec<u8>,
}

impl LoadedSprite {
    pub(crate) fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let bytes = self.rgba.get(offset..offset + 4)?;
        Some([bytes[0], bytes[1], bytes[2], bytes[3]])
    }
}

#[derive(Debug, Error)]
enum SpriteLoadError {
    #[error("invalid key: {0}")]
    InvalidKey(#[from] SpriteKeyError),
    #[error("failed to open image: {0}")]
    Open(#[source] std::io::Error),
    #[error("failed to decode image: {0}")]
    Decode(#[source] image::ImageError),
}

#[derive(Debug)]
enum SpriteSlot {
    Loaded(LoadedSprite),
    /// Load failed once; stays missing so the warning is not repeated.
    Missing,
}

/// PNG sprites under the asset root, loaded on first use.
#[derive(Debug)]
pub(crate) struct SpriteCache {
    asset_root: PathBuf,
    slots: HashMap<String, SpriteSlot>,
}

impl SpriteCache {
    pub(crate) fn new(asset_root: PathBuf) -> Self {
        Self {
            asset_root,
            slots: HashMap::new(),
        }
    }

    pub(crate) fn resolve(&mut self, key: &str) -> Option<&LoadedSprite> {
        if !self.slots.contains_key(key) {
            let slot = match load_sprite(&self.asset_root, key) {
                Ok(sprite) => SpriteSlot::Loaded(sprite),
                Err(error) => {
                    warn!(
                        sprite_key = key,
                        asset_root = %self.asset_root.display(),
                        error = %error,
                        "sprite_load_failed_using_placeholder"
                    );
                    SpriteSlot::Missing
                }
            };
            self.slots.insert(key.to_string(), slot);
        }
        match self.slots.get(key)? {
            SpriteSlot::Loaded(sprite) => Some(sprite),
            SpriteSlot::Missing => None,
        }
    }

    #[cfg(test)]
    fn missing_count(&self) -> usize {
        self.slots
            .values()
            .filter(|slot| matches!(slot, SpriteSlot::Missing))
            .count()
    }
}

fn load_sprite(asset_root: &Path, key: &str) -> Result<LoadedSprite, SpriteLoadError> {
    validate_sprite_key(key)?;
    let path = asset_root.join(format!("{key}.png"));
    let image = ImageReader::open(&path)
        .map_err(SpriteLoadError::Open)?
        .decode()
        .map_err(SpriteLoadError::Decode)?
        .to_rgba8();
    Ok(LoadedSprite {
        width: image.width(),
        height: image.height(),
        rgba: image.into_raw(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use tempfile::TempDir;

    #[test]
    fn accepts_valid_keys() {
        for key in ["maps/pallet_town", "units/trainer_walk_down", "doodads/sign-post"] {
            assert!(validate_sprite_key(key).is_ok(), "key={key}");
        }
    }

    #[test]
    fn rejects_invalid_keys() {
        for key in ["", "/maps/a", "..", "maps/../x", "Maps/a", "maps/a.png", "maps\\a"] {
            assert!(validate_sprite_key(key).is_err(), "key={key}");
        }
    }

    #[test]
    fn loads_png_once_and_caches() {
        let dir = TempDir::new().expect("tempdir");
        std::fs::create_dir_all(dir.path().join("doodads")).expect("mkdir");
        RgbaImage::from_pixel(2, 3, Rgba([10, 20, 30, 255]))
            .save(dir.path().join("doodads").join("sign.png"))
            .expect("save png");

        let mut cache = SpriteCache::new(dir.path().to_path_buf());
        let sprite = cache.resolve("doodads/sign").expect("sprite");
        assert_eq!((sprite.width, sprite.height), (2, 3));
        assert_eq!(sprite.pixel(1, 2), Some([10, 20, 30, 255]));
        assert_eq!(sprite.pixel(2, 0), None);

        std::fs::remove_file(dir.path().join("doodads").join("sign.png")).expect("remove");
        assert!(cache.resolve("doodads/sign").is_some(), "served from cache");
    }

    #[test]
    fn failed_loads_are_remembered_per_key() {
        let dir = TempDir::new().expect("tempdir");
        let mut cache = SpriteCache::new(dir.path().to_path_buf());
        assert!(cache.resolve("doodads/missing").is_none());
        assert!(cache.resolve("doodads/missing").is_none());
        assert!(cache.resolve("").is_none());
        assert_eq!(cache.missing_count(), 2);

        std::fs::create_dir_all(dir.path().join("doodads")).expect("mkdir");
        RgbaImage::from_pixel(1, 1, Rgba([1, 2, 3, 255]))
            .save(dir.path().join("doodads").join("missing.png"))
            .expect("save png");
        assert!(
            cache.resolve("doodads/missing").is_none(),
            "no retry once marked missing"
        );
    }
}
