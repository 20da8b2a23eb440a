use crate::entity::AnimatedEntity;

/// Logical viewport of the handheld the art is drawn for.
pub const VIEWPORT_WIDTH_PX: u32 = 240;
pub const VIEWPORT_HEIGHT_PX: u32 = 160;

/// Doodads farther than this (per axis, in tiles) from the focal entity
/// never draw a foreground slice.
pub const FOREGROUND_PROXIMITY_TILES: f32 = 4.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CameraOffset {
    pub x: i32,
    pub y: i32,
}

/// Offset added to map-pixel coordinates to get viewport coordinates.
pub fn camera_offset(
    map_dimensions_px: (u32, u32),
    viewport_px: (u32, u32),
    focal_point: (f32, f32),
) -> CameraOffset {
    CameraOffset {
        x: axis_offset(map_dimensions_px.0, viewport_px.0, focal_point.0),
        y: axis_offset(map_dimensions_px.1, viewport_px.1, focal_point.1),
    }
}

fn axis_offset(map_extent: u32, viewport_extent: u32, focal: f32) -> i32 {
    let map_extent = map_extent as f32;
    let viewport_extent = viewport_extent as f32;
    if map_extent <= viewport_extent {
        return ((viewport_extent - map_extent) / 2.0).floor() as i32;
    }
    let raw = viewport_extent / 2.0 - focal;
    let raw = if raw.is_finite() { raw } else { 0.0 };
    raw.clamp(viewport_extent - map_extent, 0.0).floor() as i32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawItem {
    Doodad(usize),
    Focal,
}

/// Back-to-front draw order for one tick plus the doodads whose foreground
/// slice is painted over the composite.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrawList {
    pub order: Vec<DrawItem>,
    pub foreground: Vec<usize>,
}

/// `doodads` must already be sorted by grid Y; the partition keeps that order.
pub fn compose_draw_list(doodads: &[AnimatedEntity], focal: &AnimatedEntity) -> DrawList {
    let focal_y = focal.grid_location().y;
    let mut order = Vec::with_capacity(doodads.len() + 1);
    order.extend(
        doodads
            .iter()
            .enumerate()
            .filter(|(_, doodad)| doodad.grid_location().y <= focal_y)
            .map(|(index, _)| DrawItem::Doodad(index)),
    );
    order.push(DrawItem::Focal);
    order.extend(
        doodads
            .iter()
            .enumerate()
            .filter(|(_, doodad)| doodad.grid_location().y > focal_y)
            .map(|(index, _)| DrawItem::Doodad(index)),
    );

    let focal_rect = focal.rect();
    let foreground = doodads
        .iter()
        .enumerate()
        .filter(|(_, doodad)| {
            doodad.shows_in_front()
                && doodad.is_nearby(focal.grid_location(), FOREGROUND_PROXIMITY_TILES)
                && doodad.is_colliding_with(&focal_rect)
        })
        .map(|(index, _)| index)
        .collect();

    DrawList { order, foreground }
}
