use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use overworld_engine::{
    validate_sprite_key, Action, AnimatedEntity, AnimationSet, Area, AreaLoader, EventTrigger,
    Facing, PassabilityMap, SpriteFrame, SpriteKeyError, TileCoord, TileEvent, TileEventKind,
    Vec2, TILE_SIZE_PX,
};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

const MAPS_FILE: &str = "maps.json";

#[derive(Debug, Error)]
pub(crate) enum ContentError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {path} at {at}: {source}")]
    Decode {
        path: PathBuf,
        at: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("area '{name}' is not defined in {path}")]
    UnknownArea { name: String, path: PathBuf },
    #[error("failed to load image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("'{key}' is not a usable sprite key: {source}")]
    SpriteKey {
        key: String,
        #[source]
        source: SpriteKeyError,
    },
    #[error("sprite sheet {path} has no room for a {frame_width}px frame")]
    EmptySheet { path: PathBuf, frame_width: u32 },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MapsFile {
    areas: Vec<AreaRecord>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AreaRecord {
    name: String,
    start_location: [f32; 2],
    #[serde(default)]
    doodads: Vec<DoodadRecord>,
    #[serde(default)]
    events: Vec<EventRecord>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DoodadRecord {
    #[serde(rename = "type")]
    doodad_type: String,
    locations: Vec<[f32; 2]>,
    #[serde(default)]
    show_in_front_of_trainer: bool,
    /// Horizontal frame count of the doodad image.
    #[serde(default = "single_frame")]
    frames: u32,
}

fn single_frame() -> u32 {
    1
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventRecord {
    location: [i32; 2],
    trigger: TriggerRecord,
    #[serde(default)]
    facing: Option<Facing>,
    #[serde(default)]
    priority: i32,
    action: EventActionRecord,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum TriggerRecord {
    Active,
    Passive,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
enum EventActionRecord {
    ChangeMap {
        destination: String,
        arrival: [f32; 2],
    },
    Dialog {
        pages: Vec<String>,
    },
}

impl EventRecord {
    fn to_tile_event(&self) -> TileEvent {
        let kind = match &self.action {
            EventActionRecord::ChangeMap {
                destination,
                arrival,
            } => TileEventKind::ChangeMap {
                destination: destination.clone(),
                arrival: vec2(*arrival),
            },
            EventActionRecord::Dialog { pages } => TileEventKind::Dialog {
                pages: pages.clone(),
            },
        };
        TileEvent {
            location: TileCoord::new(self.location[0], self.location[1]),
            trigger: match self.trigger {
                TriggerRecord::Active => EventTrigger::Active,
                TriggerRecord::Passive => EventTrigger::Passive,
            },
            facing: self.facing,
            priority: self.priority,
            kind,
        }
    }
}

/// Lower case with spaces as underscores; names the map images on disk.
pub(crate) fn formatted_name(name: &str) -> String {
    name.to_lowercase().replace(' ', "_")
}

fn vec2(pair: [f32; 2]) -> Vec2 {
    Vec2::new(pair[0], pair[1])
}

/// Builds areas from `data/maps.json` plus the PNGs under `maps/` and
/// `doodads/`. The JSON is parsed once; images are read per load.
#[derive(Debug)]
pub(crate) struct ContentAreaLoader {
    assets_dir: PathBuf,
    maps_path: PathBuf,
    areas: Vec<AreaRecord>,
    doodad_sizes: HashMap<String, (u32, u32)>,
}

impl ContentAreaLoader {
    pub(crate) fn open(assets_dir: &Path) -> Result<Self, ContentError> {
        let maps_path = assets_dir.join("data").join(MAPS_FILE);
        let raw = fs::read_to_string(&maps_path).map_err(|source| ContentError::Read {
            path: maps_path.clone(),
            source,
        })?;
        let maps = parse_maps_json(&raw, &maps_path)?;
        info!(
            path = %maps_path.display(),
            area_count = maps.areas.len(),
            "maps_loaded"
        );
        Ok(Self {
            assets_dir: assets_dir.to_path_buf(),
            maps_path,
            areas: maps.areas,
            doodad_sizes: HashMap::new(),
        })
    }

    pub(crate) fn area_names(&self) -> impl Iterator<Item = &str> {
        self.areas.iter().map(|area| area.name.as_str())
    }

    fn build_area(&mut self, record: &AreaRecord) -> Result<Area, ContentError> {
        let formatted = formatted_name(&record.name);
        let maps_dir = self.assets_dir.join("maps");

        let base_path = maps_dir.join(format!("{formatted}.png"));
        let (width_px, height_px) = image::image_dimensions(&base_path)
            .map_err(|source| ContentError::Image {
                path: base_path.clone(),
                source,
            })?;

        let passable_path = maps_dir.join(format!("{formatted}_passable.png"));
        let passable_image = image::open(&passable_path)
            .map_err(|source| ContentError::Image {
                path: passable_path.clone(),
                source,
            })?
            .to_rgb8();
        let passability = PassabilityMap::from_image(&passable_image);

        let mut doodads = Vec::new();
        for doodad in &record.doodads {
            let key = sprite_key(format!("doodads/{}", doodad.doodad_type))?;
            let (width, height) = self.doodad_size(&doodad.doodad_type)?;
            let frame_count = doodad.frames.max(1);
            let frame_width = width / frame_count;
            if frame_width == 0 {
                return Err(ContentError::EmptySheet {
                    path: self
                        .assets_dir
                        .join("doodads")
                        .join(format!("{}.png", doodad.doodad_type)),
                    frame_width: 1,
                });
            }
            let animations = AnimationSet::idle_loop(SpriteFrame::strip(
                &key,
                frame_count,
                frame_width,
                height,
                false,
            ));
            for location in &doodad.locations {
                doodads.push(AnimatedEntity::decoration(
                    vec2(*location),
                    doodad.show_in_front_of_trainer,
                    animations.clone(),
                ));
            }
        }

        let tile_events = record.events.iter().map(EventRecord::to_tile_event).collect();

        debug!(
            area = record.name.as_str(),
            width_px,
            height_px,
            doodads = doodads.len(),
            events = record.events.len(),
            "area_built"
        );
        let base_key = sprite_key(format!("maps/{formatted}"))?;
        Ok(Area::new(record.name.clone(), base_key, passability)
            .with_dimensions_px(width_px, height_px)
            .with_doodads(doodads)
            .with_tile_events(tile_events)
            .with_start_location(vec2(record.start_location)))
    }

    fn doodad_size(&mut self, doodad_type: &str) -> Result<(u32, u32), ContentError> {
        if let Some(size) = self.doodad_sizes.get(doodad_type) {
            return Ok(*size);
        }
        let path = self
            .assets_dir
            .join("doodads")
            .join(format!("{doodad_type}.png"));
        let size = image::image_dimensions(&path)
            .map_err(|source| ContentError::Image { path, source })?;
        self.doodad_sizes.insert(doodad_type.to_string(), size);
        Ok(size)
    }
}

impl AreaLoader for ContentAreaLoader {
    type Error = ContentError;

    fn load_area(&mut self, name: &str) -> Result<Area, Self::Error> {
        let record = self
            .areas
            .iter()
            .find(|area| area.name == name)
            .cloned()
            .ok_or_else(|| ContentError::UnknownArea {
                name: name.to_string(),
                path: self.maps_path.clone(),
            })?;
        self.build_area(&record)
    }
}

fn sprite_key(key: String) -> Result<String, ContentError> {
    match validate_sprite_key(&key) {
        Ok(()) => Ok(key),
        Err(source) => Err(ContentError::SpriteKey { key, source }),
    }
}

fn parse_maps_json(raw: &str, path: &Path) -> Result<MapsFile, ContentError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize::<_, MapsFile>(&mut deserializer).map_err(|error| {
        let at = error.path().to_string();
        ContentError::Decode {
            path: path.to_path_buf(),
            at: if at.is_empty() { ".".to_string() } else { at },
            source: error.into_inner(),
        }
    })
}

/// Sheets live at `units/<unit>_<action>_<facing>.png` as 16px-wide frame
/// strips. There are no right-facing sheets: right mirrors left.
pub(crate) fn load_unit_animations(
    assets_dir: &Path,
    unit: &str,
) -> Result<AnimationSet, ContentError> {
    let mut set = AnimationSet::default();
    for action in Action::ALL {
        for facing in Facing::ALL {
            let (sheet_facing, flip_x) = match facing {
                Facing::Right => (Facing::Left, true),
                other => (other, false),
            };
            let key = sprite_key(format!(
                "units/{unit}_{}_{}",
                action.token(),
                sheet_facing.token()
            ))?;
            let path = assets_dir.join(format!("{key}.png"));
            let (width, height) = image::image_dimensions(&path).map_err(|source| {
                ContentError::Image {
                    path: path.clone(),
                    source,
                }
            })?;
            let frame_count = width / TILE_SIZE_PX;
            if frame_count == 0 {
                return Err(ContentError::EmptySheet {
                    path,
                    frame_width: TILE_SIZE_PX,
                });
            }
            set.set_frames(
                action,
                facing,
                SpriteFrame::strip(&key, frame_count, TILE_SIZE_PX, height, flip_x),
            );
        }
    }
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};
    use tempfile::TempDir;

    const MAPS_JSON: &str = r#"{
        "areas": [
            {
                "name": "Pallet Town",
                "startLocation": [1, 1],
                "doodads": [
                    { "type": "tree", "locations": [[3, 2], [0, 0]], "showInFrontOfTrainer": true },
                    { "type": "sign", "locations": [[2, 1]] },
                    { "type": "flower", "locations": [[1, 2]], "frames": 2 }
                ],
                "events": [
                    {
                        "location": [2, 1],
                        "trigger": "active",
                        "facing": "up",
                        "action": { "dialog": { "pages": ["PALLET TOWN", "Shades of your journey await!"] } }
                    },
                    {
                        "location": [3, 3],
                        "trigger": "passive",
                        "priority": 2,
                        "action": { "changeMap": { "destination": "Route 1", "arrival": [5, 9] } }
                    }
                ]
            }
        ]
    }"#;

    fn write_png_rgb(path: &Path, image: &RgbImage) {
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        image.save(path).expect("save png");
    }

    fn write_png_rgba(path: &Path, width: u32, height: u32) {
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        RgbaImage::from_pixel(width, height, Rgba([10, 120, 40, 255]))
            .save(path)
            .expect("save png");
    }

    fn pallet_town_assets() -> TempDir {
        let dir = TempDir::new().expect("tempdir");
        let assets = dir.path();
        fs::create_dir_all(assets.join("data")).expect("mkdir data");
        fs::write(assets.join("data").join(MAPS_FILE), MAPS_JSON).expect("write maps");

        write_png_rgb(
            &assets.join("maps").join("pallet_town.png"),
            &RgbImage::from_pixel(64, 48, Rgb([90, 160, 90])),
        );
        let mut passable = RgbImage::from_pixel(4, 3, Rgb([255, 255, 255]));
        passable.put_pixel(2, 1, Rgb([0, 0, 0]));
        write_png_rgb(&assets.join("maps").join("pallet_town_passable.png"), &passable);

        write_png_rgba(&assets.join("doodads").join("tree.png"), 16, 32);
        write_png_rgba(&assets.join("doodads").join("sign.png"), 16, 16);
        write_png_rgba(&assets.join("doodads").join("flower.png"), 32, 16);
        dir
    }

    #[test]
    fn formatted_name_lowercases_and_joins_words() {
        assert_eq!(formatted_name("Pallet Town"), "pallet_town");
        assert_eq!(formatted_name("Route 1"), "route_1");
    }

    #[test]
    fn loads_area_from_json_and_images() {
        let dir = pallet_town_assets();
        let mut loader = ContentAreaLoader::open(dir.path()).expect("open loader");
        assert_eq!(loader.area_names().collect::<Vec<_>>(), vec!["Pallet Town"]);

        let area = loader.load_area("Pallet Town").expect("area");
        assert_eq!(area.name(), "Pallet Town");
        assert_eq!(area.base_sprite_key(), "maps/pallet_town");
        assert_eq!(area.dimensions(), (64, 48));
        assert_eq!(area.start_location(), Vec2::new(1.0, 1.0));
        assert_eq!(
            (area.passability().width(), area.passability().height()),
            (4, 3)
        );
        assert!(!area.passability().is_tile_passable(TileCoord::new(2, 1)));
        assert!(area.passability().is_tile_passable(TileCoord::new(1, 1)));
    }

    #[test]
    fn doodads_expand_locations_and_sort_by_row() {
        let dir = pallet_town_assets();
        let mut loader = ContentAreaLoader::open(dir.path()).expect("open loader");
        let area = loader.load_area("Pallet Town").expect("area");

        let rows: Vec<f32> = area
            .doodads()
            .iter()
            .map(|doodad| doodad.grid_location().y)
            .collect();
        assert_eq!(rows, vec![0.0, 1.0, 2.0, 2.0]);

        let tree = &area.doodads()[0];
        assert!(tree.shows_in_front());
        assert_eq!((tree.rect().width, tree.rect().height), (16, 32));
        let sign = &area.doodads()[1];
        assert!(!sign.shows_in_front());
        assert_eq!(
            sign.current_frame().map(|frame| frame.sprite_key.as_str()),
            Some("doodads/sign")
        );

        let flower = area
            .doodads()
            .iter()
            .find(|doodad| doodad.grid_location() == Vec2::new(1.0, 2.0))
            .expect("flower");
        assert_eq!(flower.current_frame().map(|frame| frame.width), Some(16));
        assert!(flower
            .capabilities()
            .contains(overworld_engine::Capabilities::ANIMATED));
    }

    #[test]
    fn events_map_to_tile_events() {
        let dir = pallet_town_assets();
        let mut loader = ContentAreaLoader::open(dir.path()).expect("open loader");
        let area = loader.load_area("Pallet Town").expect("area");

        let sign = area
            .active_event_at(Vec2::new(2.0, 1.0), Facing::Up)
            .expect("sign event");
        assert_eq!(sign.kind.token(), "dialog");
        assert!(area
            .active_event_at(Vec2::new(2.0, 1.0), Facing::Left)
            .is_none());

        let warp = area
            .passive_event_at(Vec2::new(3.0, 3.0))
            .expect("warp event");
        assert_eq!(warp.priority, 2);
        assert_eq!(
            warp.kind,
            TileEventKind::ChangeMap {
                destination: "Route 1".to_string(),
                arrival: Vec2::new(5.0, 9.0),
            }
        );
    }

    #[test]
    fn unknown_area_is_reported() {
        let dir = pallet_town_assets();
        let mut loader = ContentAreaLoader::open(dir.path()).expect("open loader");
        let error = loader.load_area("Cerulean City").expect_err("unknown");
        assert!(matches!(error, ContentError::UnknownArea { ref name, .. } if name == "Cerulean City"));
    }

    #[test]
    fn missing_map_image_is_reported_with_path() {
        let dir = pallet_town_assets();
        fs::remove_file(dir.path().join("maps").join("pallet_town_passable.png"))
            .expect("remove");
        let mut loader = ContentAreaLoader::open(dir.path()).expect("open loader");
        let error = loader.load_area("Pallet Town").expect_err("missing image");
        assert!(
            error.to_string().contains("pallet_town_passable.png"),
            "error={error}"
        );
    }

    #[test]
    fn doodad_type_must_form_a_sprite_key() {
        let dir = pallet_town_assets();
        let raw = MAPS_JSON.replace(r#""type": "sign""#, r#""type": "Big Sign""#);
        fs::write(dir.path().join("data").join(MAPS_FILE), raw).expect("rewrite maps");

        let mut loader = ContentAreaLoader::open(dir.path()).expect("open loader");
        let error = loader.load_area("Pallet Town").expect_err("bad key");
        assert!(
            matches!(error, ContentError::SpriteKey { ref key, .. } if key == "doodads/Big Sign"),
            "error={error}"
        );
    }

    #[test]
    fn decode_error_names_json_path() {
        let raw = r#"{ "areas": [ { "name": "Pallet Town", "startLocation": "north" } ] }"#;
        let error = parse_maps_json(raw, Path::new("maps.json")).expect_err("bad json");
        match error {
            ContentError::Decode { at, .. } => assert_eq!(at, "areas[0].startLocation"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_maps_file_is_a_read_error() {
        let dir = TempDir::new().expect("tempdir");
        let error = ContentAreaLoader::open(dir.path()).expect_err("no maps");
        assert!(matches!(error, ContentError::Read { .. }));
    }

    #[test]
    fn unit_animations_mirror_left_sheets_for_right() {
        let dir = TempDir::new().expect("tempdir");
        for action in Action::ALL {
            for facing in ["up", "down", "left"] {
                let path = dir
                    .path()
                    .join("units")
                    .join(format!("trainer_{}_{facing}.png", action.token()));
                write_png_rgba(&path, 48, 32);
            }
        }

        let set = load_unit_animations(dir.path(), "trainer").expect("animations");
        let right = set.frames(Action::Walk, Facing::Right);
        assert_eq!(right.len(), 3);
        assert!(right.iter().all(|frame| frame.flip_x));
        assert_eq!(right[0].sprite_key, "units/trainer_walk_left");
        assert_eq!(right[2].source_x, 32);
        assert_eq!(right[0].height, 32);

        let down = set.frames(Action::Stand, Facing::Down);
        assert!(down.iter().all(|frame| !frame.flip_x));
        assert_eq!(down[0].sprite_key, "units/trainer_stand_down");
    }

    #[test]
    fn shipped_assets_load_every_area() {
        let assets = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("assets");
        let mut loader = ContentAreaLoader::open(&assets).expect("open shipped maps");
        let names: Vec<String> = loader.area_names().map(str::to_string).collect();
        assert!(names.iter().any(|name| name == "Pallet Town"));
        for name in names {
            let area = loader.load_area(&name).expect("shipped area");
            let (width, height) = area.dimensions();
            assert_eq!(width, area.passability().width() * TILE_SIZE_PX, "{name}");
            assert_eq!(height, area.passability().height() * TILE_SIZE_PX, "{name}");
        }
        load_unit_animations(&assets, "trainer").expect("shipped trainer sheets");
    }

    #[test]
    fn unit_animations_require_every_sheet() {
        let dir = TempDir::new().expect("tempdir");
        let error = load_unit_animations(dir.path(), "trainer").expect_err("no sheets");
        assert!(matches!(error, ContentError::Image { .. }));
    }
}
