/// A sub-rectangle of a cached sprite placed at viewport pixel `(x, y)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteDraw {
    pub sprite_key: String,
    pub source_x: u32,
    pub source_y: u32,
    pub width: u32,
    pub height: u32,
    pub x: i32,
    pub y: i32,
    pub flip_x: bool,
}

/// Boxed text such as the dialog window or a menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextPanel {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub lines: Vec<String>,
    pub cursor_row: Option<usize>,
    pub continue_marker: bool,
}

/// Everything the renderer needs for one presented frame, in paint order:
/// sprites, then panels, then the fade overlay.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameDescription {
    pub clear_color: [u8; 4],
    pub sprites: Vec<SpriteDraw>,
    pub panels: Vec<TextPanel>,
    pub fade_alpha: u8,
}
