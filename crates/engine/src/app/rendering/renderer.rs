use std::path::PathBuf;
use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture};
use winit::window::Window;

use super::canvas::{
    apply_fade, draw_filled_rect, draw_rect_outline, fill, write_pixel_rgba_clipped,
};
use super::font::{draw_text, GLYPH_ADVANCE, GLYPH_HEIGHT};
use super::frame::{FrameDescription, SpriteDraw, TextPanel};
use super::sprites::{LoadedSprite, SpriteCache};

const PLACEHOLDER_COLOR: [u8; 4] = [220, 80, 220, 255];
const PANEL_FILL_COLOR: [u8; 4] = [248, 248, 248, 255];
const PANEL_BORDER_COLOR: [u8; 4] = [72, 80, 104, 255];
const PANEL_TEXT_COLOR: [u8; 4] = [64, 64, 64, 255];
const PANEL_INSET_X: i32 = 8;
const PANEL_INSET_Y: i32 = 8;
const PANEL_LINE_ADVANCE: i32 = 14;

/// Software renderer: paints a fixed logical frame that `pixels` scales up
/// to the window surface.
pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    logical_size: (u32, u32),
    sprites: SpriteCache,
}

impl Renderer {
    pub fn new(
        window: Arc<Window>,
        asset_root: PathBuf,
        logical_size: (u32, u32),
    ) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), logical_size, size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            logical_size,
            sprites: SpriteCache::new(asset_root),
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), self.logical_size, width, height)?;
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        logical_size: (u32, u32),
        surface_width: u32,
        surface_height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(surface_width, surface_height, window);
        Pixels::new(logical_size.0, logical_size.1, surface)
    }

    pub fn render_frame(&mut self, description: &FrameDescription) -> Result<(), Error> {
        let (width, height) = self.logical_size;
        paint_frame(
            self.pixels.frame_mut(),
            width,
            height,
            description,
            &mut self.sprites,
        );
        self.pixels.render()
    }
}

pub(crate) fn paint_frame(
    frame: &mut [u8],
    width: u32,
    height: u32,
    description: &FrameDescription,
    sprites: &mut SpriteCache,
) {
    if width == 0 || height == 0 {
        return;
    }
    fill(frame, description.clear_color);
    for draw in &description.sprites {
        match sprites.resolve(&draw.sprite_key) {
            Some(sprite) => blit_sprite(frame, width, height, sprite, draw),
            None => draw_placeholder(frame, width, height, draw),
        }
    }
    for panel in &description.panels {
        draw_panel(frame, width, height, panel);
    }
    apply_fade(frame, description.fade_alpha);
}

fn blit_sprite(frame: &mut [u8], width: u32, height: u32, sprite: &LoadedSprite, draw: &SpriteDraw) {
    let first_row = (-draw.y).clamp(0, draw.height as i32) as u32;
    let last_row = (height as i32 - draw.y).clamp(0, draw.height as i32) as u32;
    let first_col = (-draw.x).clamp(0, draw.width as i32) as u32;
    let last_col = (width as i32 - draw.x).clamp(0, draw.width as i32) as u32;

    for dy in first_row..last_row {
        for dx in first_col..last_col {
            let column = if draw.flip_x { draw.width - 1 - dx } else { dx };
            let Some(pixel) = sprite.pixel(draw.source_x + column, draw.source_y + dy) else {
                continue;
            };
            if pixel[3] == 0 {
                continue;
            }
            write_pixel_rgba_clipped(
                frame,
                width,
                height,
                draw.x + dx as i32,
                draw.y + dy as i32,
                [pixel[0], pixel[1], pixel[2], 255],
            );
        }
    }
}

fn draw_placeholder(frame: &mut [u8], width: u32, height: u32, draw: &SpriteDraw) {
    draw_rect_outline(
        frame,
        width,
        height,
        draw.x,
        draw.y,
        draw.width,
        draw.height,
        PLACEHOLDER_COLOR,
    );
}

fn draw_panel(frame: &mut [u8], width: u32, height: u32, panel: &TextPanel) {
    draw_filled_rect(
        frame,
        width,
        height,
        panel.x,
        panel.y,
        panel.width,
        panel.height,
        PANEL_FILL_COLOR,
    );
    draw_rect_outline(
        frame,
        width,
        height,
        panel.x,
        panel.y,
        panel.width,
        panel.height,
        PANEL_BORDER_COLOR,
    );

    let cursor_width = if panel.cursor_row.is_some() {
        GLYPH_ADVANCE
    } else {
        0
    };
    let text_x = panel.x + PANEL_INSET_X + cursor_width;
    for (row, line) in panel.lines.iter().enumerate() {
        let row_y = panel.y + PANEL_INSET_Y + row as i32 * PANEL_LINE_ADVANCE;
        draw_text(frame, width, height, text_x, row_y, line, PANEL_TEXT_COLOR);
        if panel.cursor_row == Some(row) {
            draw_text(
                frame,
                width,
                height,
                panel.x + PANEL_INSET_X,
                row_y,
                ">",
                PANEL_TEXT_COLOR,
            );
        }
    }

    if panel.continue_marker {
        draw_text(
            frame,
            width,
            height,
            panel.x + panel.width as i32 - PANEL_INSET_X - GLYPH_ADVANCE,
            panel.y + panel.height as i32 - PANEL_INSET_Y - GLYPH_HEIGHT,
            "V",
            PANEL_TEXT_COLOR,
        );
    }
}
