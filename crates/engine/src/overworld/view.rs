use crate::app::{FrameDescription, SpriteDraw, TextPanel};
use crate::camera::{CameraOffset, DrawItem};
use crate::entity::AnimatedEntity;
use crate::grid::TILE_SIZE_PX;

use super::{DialogState, OverworldContext, OverworldState};

const CLEAR_COLOR: [u8; 4] = [0, 0, 0, 255];

const DIALOG_BOX_X: i32 = 5;
const DIALOG_BOX_Y: i32 = 106;
const DIALOG_BOX_WIDTH: u32 = 230;
const DIALOG_BOX_HEIGHT: u32 = 48;

const SIDEBAR_X: i32 = 159;
const SIDEBAR_Y: i32 = 1;
const SIDEBAR_WIDTH: u32 = 80;
const SIDEBAR_ROW_HEIGHT: u32 = 14;
const SIDEBAR_PADDING: u32 = 8;

/// Builds the renderer's view of the current tick, back to front.
pub fn compose_frame(context: &OverworldContext) -> FrameDescription {
    let camera = context.camera();
    let area = context.area();
    let (map_width, map_height) = area.dimensions();
    let mut sprites = vec![SpriteDraw {
        sprite_key: area.base_sprite_key().to_string(),
        source_x: 0,
        source_y: 0,
        width: map_width,
        height: map_height,
        x: camera.x,
        y: camera.y,
        flip_x: false,
    }];

    let draw_list = context.draw_list();
    for item in &draw_list.order {
        let entity = match item {
            DrawItem::Focal => Some(context.player()),
            DrawItem::Doodad(index) => area.doodads().get(*index),
        };
        if let Some(entity) = entity {
            sprites.push(entity_sprite(entity, camera, None));
        }
    }
    for index in &draw_list.foreground {
        if let Some(doodad) = area.doodads().get(*index) {
            sprites.push(entity_sprite(doodad, camera, Some(TILE_SIZE_PX)));
        }
    }

    let mut panels = Vec::new();
    if matches!(context.state(), OverworldState::Dialog) {
        if let Some(dialog) = context.dialog() {
            let (first, second) = dialog.visible_lines();
            panels.push(TextPanel {
                x: DIALOG_BOX_X,
                y: DIALOG_BOX_Y,
                width: DIALOG_BOX_WIDTH,
                height: DIALOG_BOX_HEIGHT,
                lines: vec![first, second],
                cursor_row: None,
                continue_marker: dialog.state() == DialogState::NextPage,
            });
        }
    }
    if let Some(menu) = context.menus().top() {
        let rows = menu.items().len() as u32;
        panels.push(TextPanel {
            x: SIDEBAR_X,
            y: SIDEBAR_Y,
            width: SIDEBAR_WIDTH,
            height: rows * SIDEBAR_ROW_HEIGHT + SIDEBAR_PADDING * 2,
            lines: menu.items().to_vec(),
            cursor_row: Some(menu.cursor()),
            continue_marker: false,
        });
    }

    FrameDescription {
        clear_color: CLEAR_COLOR,
        sprites,
        panels,
        fade_alpha: context.fade_alpha(),
    }
}

fn entity_sprite(
    entity: &AnimatedEntity,
    camera: CameraOffset,
    max_height: Option<u32>,
) -> SpriteDraw {
    let rect = entity.rect();
    let (sprite_key, source_x, width, height, flip_x) = match entity.current_frame() {
        Some(frame) => (
            frame.sprite_key.clone(),
            frame.source_x,
            frame.width,
            frame.height,
            frame.flip_x,
        ),
        None => (String::new(), 0, rect.width, rect.height, false),
    };
    SpriteDraw {
        sprite_key,
        source_x,
        source_y: 0,
        width,
        height: max_height.map_or(height, |limit| height.min(limit)),
        x: rect.x + camera.x,
        y: rect.y + camera.y,
        flip_x,
    }
}
