mod canvas;
mod font;
mod frame;
mod renderer;
mod sprites;

pub use frame::{FrameDescription, SpriteDraw, TextPanel};
pub use renderer::Renderer;
pub use sprites::{validate_sprite_key, SpriteKeyError};
