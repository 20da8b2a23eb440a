mod input;
mod loop_runner;
mod metrics;
mod pacing;
mod rendering;
mod scene;

pub use input::{DirectionStack, InputAction};
pub use loop_runner::{run_app, AppError, LoopConfig, SLOW_FRAME_ENV_VAR};
pub use rendering::{
    validate_sprite_key, FrameDescription, Renderer, SpriteDraw, SpriteKeyError, TextPanel,
};
pub use scene::{InputSnapshot, Scene, SceneCommand};
