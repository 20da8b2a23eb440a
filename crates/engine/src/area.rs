use crate::entity::AnimatedEntity;
use crate::grid::{Facing, Passability, PassabilityMap, TileCoord, Vec2, TILE_SIZE_PX};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventTrigger {
    /// Needs a confirm press while facing the tile.
    Active,
    /// Fires on stepping onto the tile.
    Passive,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TileEventKind {
    ChangeMap { destination: String, arrival: Vec2 },
    Dialog { pages: Vec<String> },
}

impl TileEventKind {
    pub fn token(&self) -> &'static str {
        match self {
            TileEventKind::ChangeMap { .. } => "change_map",
            TileEventKind::Dialog { .. } => "dialog",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TileEvent {
    pub location: TileCoord,
    pub trigger: EventTrigger,
    pub facing: Option<Facing>,
    pub priority: i32,
    pub kind: TileEventKind,
}

impl TileEvent {
    fn accepts_facing(&self, facing: Facing) -> bool {
        self.facing.map_or(true, |required| required == facing)
    }
}

/// One loaded map: base art, walkability and everything placed on it.
#[derive(Debug, Clone)]
pub struct Area {
    name: String,
    dimensions_px: (u32, u32),
    base_sprite_key: String,
    passability: PassabilityMap,
    doodads: Vec<AnimatedEntity>,
    tile_events: Vec<TileEvent>,
    start_location: Vec2,
}

impl Area {
    pub fn new(
        name: impl Into<String>,
        base_sprite_key: impl Into<String>,
        passability: PassabilityMap,
    ) -> Self {
        let dimensions_px = (
            passability.width() * TILE_SIZE_PX,
            passability.height() * TILE_SIZE_PX,
        );
        Self {
            name: name.into(),
            dimensions_px,
            base_sprite_key: base_sprite_key.into(),
            passability,
            doodads: Vec::new(),
            tile_events: Vec::new(),
            start_location: Vec2::default(),
        }
    }

    pub fn with_dimensions_px(mut self, width: u32, height: u32) -> Self {
        self.dimensions_px = (width, height);
        self
    }

    /// Stable-sorts by grid Y so draw-order partitioning can keep list order.
    pub fn with_doodads(mut self, mut doodads: Vec<AnimatedEntity>) -> Self {
        doodads.sort_by(|a, b| a.grid_location().y.total_cmp(&b.grid_location().y));
        self.doodads = doodads;
        self
    }

    pub fn with_tile_events(mut self, tile_events: Vec<TileEvent>) -> Self {
        self.tile_events = tile_events;
        self
    }

    pub fn with_start_location(mut self, start_location: Vec2) -> Self {
        self.start_location = start_location;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.dimensions_px
    }

    pub fn base_sprite_key(&self) -> &str {
        &self.base_sprite_key
    }

    pub fn passability(&self) -> &PassabilityMap {
        &self.passability
    }

    pub fn doodads(&self) -> &[AnimatedEntity] {
        &self.doodads
    }

    pub fn tile_events(&self) -> &[TileEvent] {
        &self.tile_events
    }

    pub fn start_location(&self) -> Vec2 {
        self.start_location
    }

    /// Steps every doodad's idle animation once.
    pub fn tick_doodads(&mut self) {
        for doodad in &mut self.doodads {
            doodad.draw();
        }
    }

    pub fn get_tile_events(&self, position: Vec2, active: bool) -> Vec<&TileEvent> {
        let trigger = if active {
            EventTrigger::Active
        } else {
            EventTrigger::Passive
        };
        if !position.is_finite() {
            return Vec::new();
        }
        let tile = TileCoord::from_position(position);
        self.tile_events
            .iter()
            .filter(|event| event.trigger == trigger && event.location == tile)
            .collect()
    }

    pub fn passive_event_at(&self, position: Vec2) -> Option<&TileEvent> {
        highest_priority(self.get_tile_events(position, false))
    }

    pub fn active_event_at(&self, position: Vec2, facing: Facing) -> Option<&TileEvent> {
        highest_priority(
            self.get_tile_events(position, true)
                .into_iter()
                .filter(|event| event.accepts_facing(facing))
                .collect(),
        )
    }
}

fn highest_priority(events: Vec<&TileEvent>) -> Option<&TileEvent> {
    let mut best: Option<&TileEvent> = None;
    for event in events {
        match best {
            Some(current) if current.priority >= event.priority => {}
            _ => best = Some(event),
        }
    }
    best
}

impl Passability for Area {
    fn is_passable(&self, position: Vec2) -> bool {
        self.passability.is_passable(position)
    }
}

/// Seam through which the overworld asks for the next map by name.
pub trait AreaLoader {
    type Error: std::error::Error;

    fn load_area(&mut self, name: &str) -> Result<Area, Self::Error>;
}
