use std::collections::HashMap;

use bitflags::bitflags;

use crate::grid::{Facing, Vec2, TILE_SIZE_PX};

pub const STAND_FRAME_DELAY_TICKS: u32 = 16;
pub const WALK_FRAME_DELAY_TICKS: u32 = 7;
pub const RUN_FRAME_DELAY_TICKS: u32 = 4;
pub const WALK_STEP_TILES_PER_TICK: f32 = 0.1;
pub const RUN_STEP_TILES_PER_TICK: f32 = WALK_STEP_TILES_PER_TICK * 2.0;

/// Units are drawn two tiles tall while standing on the lower tile.
pub const UNIT_GRID_OFFSET_Y: f32 = -1.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Action {
    #[default]
    Stand,
    Walk,
    Run,
}

impl Action {
    pub const ALL: [Action; 3] = [Action::Stand, Action::Walk, Action::Run];

    pub const fn is_moving(self) -> bool {
        matches!(self, Action::Walk | Action::Run)
    }

    pub const fn token(self) -> &'static str {
        match self {
            Action::Stand => "stand",
            Action::Walk => "walk",
            Action::Run => "run",
        }
    }

    pub const fn profile(self) -> ActionProfile {
        match self {
            Action::Stand => ActionProfile {
                frame_delay_ticks: STAND_FRAME_DELAY_TICKS,
                step_tiles_per_tick: 0.0,
            },
            Action::Walk => ActionProfile {
                frame_delay_ticks: WALK_FRAME_DELAY_TICKS,
                step_tiles_per_tick: WALK_STEP_TILES_PER_TICK,
            },
            Action::Run => ActionProfile {
                frame_delay_ticks: RUN_FRAME_DELAY_TICKS,
                step_tiles_per_tick: RUN_STEP_TILES_PER_TICK,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActionProfile {
    pub frame_delay_ticks: u32,
    pub step_tiles_per_tick: f32,
}

bitflags! {
    pub struct Capabilities: u8 {
        const ANIMATED = 0b0001;
        const INPUT_CONTROLLED = 0b0010;
        const FOREGROUND_OCCLUSION = 0b0100;
    }
}

impl Capabilities {
    pub fn unit() -> Self {
        Capabilities::ANIMATED | Capabilities::INPUT_CONTROLLED
    }

    pub fn decoration(animated: bool, show_in_front: bool) -> Self {
        let mut capabilities = Capabilities::empty();
        capabilities.set(Capabilities::ANIMATED, animated);
        capabilities.set(Capabilities::FOREGROUND_OCCLUSION, show_in_front);
        capabilities
    }
}

/// One cell of a horizontal sprite strip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteFrame {
    pub sprite_key: String,
    pub source_x: u32,
    pub width: u32,
    pub height: u32,
    pub flip_x: bool,
}

impl SpriteFrame {
    pub fn strip(
        sprite_key: &str,
        frame_count: u32,
        width: u32,
        height: u32,
        flip_x: bool,
    ) -> Vec<SpriteFrame> {
        (0..frame_count)
            .map(|n| SpriteFrame {
                sprite_key: sprite_key.to_string(),
                source_x: n * width,
                width,
                height,
                flip_x,
            })
            .collect()
    }
}

/// Per-action frame lists, indexed by [`Facing::index`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimationSet {
    frames: HashMap<Action, [Vec<SpriteFrame>; 4]>,
}

impl AnimationSet {
    pub fn set_frames(&mut self, action: Action, facing: Facing, frames: Vec<SpriteFrame>) {
        self.frames.entry(action).or_default()[facing.index()] = frames;
    }

    pub fn with_frames(mut self, action: Action, facing: Facing, frames: Vec<SpriteFrame>) -> Self {
        self.set_frames(action, facing, frames);
        self
    }

    /// Same frames regardless of facing; what decorations use.
    pub fn idle_loop(frames: Vec<SpriteFrame>) -> Self {
        let mut set = Self::default();
        for facing in Facing::ALL {
            set.set_frames(Action::Stand, facing, frames.clone());
        }
        set
    }

    pub fn frames(&self, action: Action, facing: Facing) -> &[SpriteFrame] {
        self.frames
            .get(&action)
            .map(|by_facing| by_facing[facing.index()].as_slice())
            .unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScreenRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl ScreenRect {
    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    pub fn center(&self) -> (f32, f32) {
        (
            self.x as f32 + self.width as f32 / 2.0,
            self.y as f32 + self.height as f32 / 2.0,
        )
    }

    pub fn intersects(&self, other: &ScreenRect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

#[derive(Debug, Clone)]
pub struct AnimatedEntity {
    pub(crate) grid_location: Vec2,
    pub(crate) target_location: Vec2,
    pub(crate) facing: Facing,
    pub(crate) action: Action,
    pub(crate) frame: usize,
    pub(crate) frame_counter: u32,
    pub(crate) input_counter: u32,
    shown_frame: usize,
    grid_offset_y: f32,
    capabilities: Capabilities,
    animations: AnimationSet,
    rect: ScreenRect,
}

impl AnimatedEntity {
    pub fn new(
        location: Vec2,
        grid_offset_y: f32,
        capabilities: Capabilities,
        animations: AnimationSet,
    ) -> Self {
        let mut entity = Self {
            grid_location: location,
            target_location: location,
            facing: Facing::Down,
            action: Action::Stand,
            frame: 0,
            frame_counter: 0,
            input_counter: 0,
            shown_frame: 0,
            grid_offset_y,
            capabilities,
            animations,
            rect: ScreenRect::default(),
        };
        entity.refresh_rect();
        entity
    }

    pub fn unit(location: Vec2, animations: AnimationSet) -> Self {
        Self::new(location, UNIT_GRID_OFFSET_Y, Capabilities::unit(), animations)
    }

    pub fn decoration(location: Vec2, show_in_front: bool, animations: AnimationSet) -> Self {
        let animated = Facing::ALL
            .iter()
            .any(|facing| animations.frames(Action::Stand, *facing).len() > 1);
        Self::new(
            location,
            0.0,
            Capabilities::decoration(animated, show_in_front),
            animations,
        )
    }

    pub fn grid_location(&self) -> Vec2 {
        self.grid_location
    }

    pub fn target_location(&self) -> Vec2 {
        self.target_location
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn frame_index(&self) -> usize {
        self.frame
    }

    pub fn input_counter(&self) -> u32 {
        self.input_counter
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn shows_in_front(&self) -> bool {
        self.capabilities
            .contains(Capabilities::FOREGROUND_OCCLUSION)
    }

    pub fn rect(&self) -> ScreenRect {
        self.rect
    }

    pub fn set_facing(&mut self, facing: Facing) {
        self.facing = facing;
    }

    /// Switching to a different action restarts its animation.
    pub fn set_action(&mut self, action: Action) {
        if self.action == action {
            return;
        }
        self.action = action;
        self.frame_counter = 0;
        self.frame = 0;
    }

    pub fn advance_animation(&mut self) {
        if !self.capabilities.contains(Capabilities::ANIMATED) {
            return;
        }
        self.frame_counter = self.frame_counter.saturating_add(1);
        if self.frame_counter >= self.action.profile().frame_delay_ticks {
            self.frame_counter = 0;
            self.frame += 1;
            let frame_count = self.animations.frames(self.action, self.facing).len();
            if self.frame >= frame_count {
                self.frame = 0;
            }
        }
    }

    /// Per-tick entry point: step toward the target, pick the frame to show,
    /// refresh the bounding rect, then advance the animation counter.
    pub fn draw(&mut self) {
        if self.action.is_moving() {
            let step = self.action.profile().step_tiles_per_tick;
            self.grid_location = self.grid_location.move_toward(self.target_location, step);
        }
        let frame_count = self.animations.frames(self.action, self.facing).len();
        self.shown_frame = if frame_count == 0 {
            0
        } else {
            self.frame % frame_count
        };
        self.refresh_rect();
        self.advance_animation();
    }

    pub fn current_frame(&self) -> Option<&SpriteFrame> {
        self.animations
            .frames(self.action, self.facing)
            .get(self.shown_frame)
    }

    /// Top-left corner in map pixels.
    pub fn coords(&self) -> (f32, f32) {
        let tile = TILE_SIZE_PX as f32;
        (
            self.grid_location.x * tile,
            (self.grid_location.y + self.grid_offset_y) * tile,
        )
    }

    pub fn center(&self) -> (f32, f32) {
        self.rect.center()
    }

    pub fn is_nearby(&self, point: Vec2, threshold_tiles: f32) -> bool {
        (self.grid_location.x - point.x).abs() <= threshold_tiles
            && (self.grid_location.y - point.y).abs() <= threshold_tiles
    }

    pub fn is_colliding_with(&self, rect: &ScreenRect) -> bool {
        self.rect.intersects(rect)
    }

    fn refresh_rect(&mut self) {
        let (width, height) = self
            .current_frame()
            .map(|frame| (frame.width, frame.height))
            .unwrap_or((TILE_SIZE_PX, TILE_SIZE_PX));
        let (x, y) = self.coords();
        self.rect = ScreenRect {
            x: x.floor() as i32,
            y: y.floor() as i32,
            width,
            height,
        };
    }
}
