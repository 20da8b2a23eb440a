pub mod app;
pub mod area;
pub mod camera;
pub mod entity;
pub mod grid;
pub mod movement;
pub mod overworld;
mod paths;

pub use app::{
    run_app, validate_sprite_key, AppError, DirectionStack, FrameDescription, InputAction,
    InputSnapshot, LoopConfig, Renderer, Scene, SceneCommand, SpriteDraw, SpriteKeyError,
    TextPanel, SLOW_FRAME_ENV_VAR,
};
pub use area::{Area, AreaLoader, EventTrigger, TileEvent, TileEventKind};
pub use camera::{
    camera_offset, compose_draw_list, CameraOffset, DrawItem, DrawList,
    FOREGROUND_PROXIMITY_TILES, VIEWPORT_HEIGHT_PX, VIEWPORT_WIDTH_PX,
};
pub use entity::{
    Action, ActionProfile, AnimatedEntity, AnimationSet, Capabilities, ScreenRect, SpriteFrame,
};
pub use grid::{
    Facing, Passability, PassabilityError, PassabilityMap, TileCoord, Vec2, TILE_SIZE_PX,
};
pub use movement::{INPUT_DEBOUNCE_TICKS, SNAP_EPSILON};
pub use overworld::{
    compose_frame, Dialog, DialogState, Menu, MenuKind, MenuStack, OverworldContext,
    OverworldState, TickOutcome, FADE_TICKS,
};
pub use paths::{resolve_app_paths, AppPaths, StartupError, ROOT_ENV_VAR};
