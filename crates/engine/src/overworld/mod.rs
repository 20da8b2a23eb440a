mod dialog;
mod menu;
mod view;

use tracing::{debug, info, warn};

use crate::app::{InputAction, InputSnapshot};
use crate::area::{Area, AreaLoader, TileEvent, TileEventKind};
use crate::camera::{
    camera_offset, compose_draw_list, CameraOffset, DrawList, VIEWPORT_HEIGHT_PX,
    VIEWPORT_WIDTH_PX,
};
use crate::entity::{AnimatedEntity, AnimationSet};
use crate::grid::{TileCoord, Vec2};
use crate::movement;

pub use dialog::{
    wrap_page, Dialog, DialogState, WrappedPage, CHARS_PER_LINE, DIALOG_REVEAL_DELAY_TICKS,
};
pub use menu::{
    increment_with_wrap, Menu, MenuAction, MenuKind, MenuResponse, MenuStack, NavigateDirection,
};
pub use view::compose_frame;

/// Length of each half of a map transition.
pub const FADE_TICKS: u32 = 20;

#[derive(Debug, Clone, PartialEq)]
pub struct PendingMapChange {
    pub destination: String,
    pub arrival: Vec2,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OverworldState {
    Loop,
    FadeOut {
        remaining: u32,
        pending: PendingMapChange,
    },
    FadeIn {
        remaining: u32,
    },
    Dialog,
    Menu,
}

impl OverworldState {
    pub fn token(&self) -> &'static str {
        match self {
            OverworldState::Loop => "loop",
            OverworldState::FadeOut { .. } => "fade_out",
            OverworldState::FadeIn { .. } => "fade_in",
            OverworldState::Dialog => "dialog",
            OverworldState::Menu => "menu",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// Held input must be dropped so it does not carry across a transition.
    pub clear_input: bool,
}

/// Everything one overworld session mutates, passed explicitly each tick.
#[derive(Debug)]
pub struct OverworldContext {
    area: Area,
    player: AnimatedEntity,
    state: OverworldState,
    dialog: Option<Dialog>,
    menus: MenuStack,
    viewport: (u32, u32),
    camera: CameraOffset,
    draw_list: DrawList,
    last_event_tile: Option<TileCoord>,
}

impl OverworldContext {
    pub fn new(area: Area, player_animations: AnimationSet) -> Self {
        let start = area.start_location();
        let mut player = AnimatedEntity::unit(start, player_animations);
        player.draw();
        let mut context = Self {
            area,
            player,
            state: OverworldState::Loop,
            dialog: None,
            menus: MenuStack::default(),
            viewport: (VIEWPORT_WIDTH_PX, VIEWPORT_HEIGHT_PX),
            camera: CameraOffset::default(),
            draw_list: DrawList::default(),
            last_event_tile: Some(TileCoord::from_position(start)),
        };
        context.compose();
        context
    }

    pub fn area(&self) -> &Area {
        &self.area
    }

    pub fn player(&self) -> &AnimatedEntity {
        &self.player
    }

    pub fn state(&self) -> &OverworldState {
        &self.state
    }

    pub fn dialog(&self) -> Option<&Dialog> {
        self.dialog.as_ref()
    }

    pub fn menus(&self) -> &MenuStack {
        &self.menus
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    pub fn camera(&self) -> CameraOffset {
        self.camera
    }

    pub fn draw_list(&self) -> &DrawList {
        &self.draw_list
    }

    /// Overlay opacity for the current transition frame.
    pub fn fade_alpha(&self) -> u8 {
        let opaque_fraction = match &self.state {
            OverworldState::FadeOut { remaining, .. } => FADE_TICKS.saturating_sub(*remaining),
            OverworldState::FadeIn { remaining } => (*remaining).min(FADE_TICKS),
            _ => 0,
        };
        (opaque_fraction * 255 / FADE_TICKS) as u8
    }

    /// One fixed tick: state update (movement and events) then camera and
    /// draw-order composition.
    pub fn update<L: AreaLoader>(&mut self, input: &InputSnapshot, loader: &mut L) -> TickOutcome {
        let mut outcome = TickOutcome::default();
        match self.state.clone() {
            OverworldState::Loop => self.update_loop(input, &mut outcome),
            OverworldState::FadeOut { remaining, pending } => {
                outcome.clear_input = true;
                self.player.draw();
                let remaining = remaining.saturating_sub(1);
                if remaining == 0 {
                    self.finish_map_change(pending, loader);
                    self.state = OverworldState::FadeIn {
                        remaining: FADE_TICKS,
                    };
                    debug!(area = self.area.name(), "fade_in_started");
                } else {
                    self.state = OverworldState::FadeOut { remaining, pending };
                }
            }
            OverworldState::FadeIn { remaining } => {
                self.player.draw();
                let remaining = remaining.saturating_sub(1);
                self.state = if remaining == 0 {
                    debug!(area = self.area.name(), "fade_in_finished");
                    OverworldState::Loop
                } else {
                    OverworldState::FadeIn { remaining }
                };
            }
            OverworldState::Dialog => self.update_dialog(input),
            OverworldState::Menu => {
                self.player.draw();
                self.menus.handle_input(input.pressed());
                if self.menus.is_empty() {
                    self.state = OverworldState::Loop;
                    debug!("menu_closed");
                }
            }
        }

        self.area.tick_doodads();
        self.compose();
        outcome
    }

    fn update_loop(&mut self, input: &InputSnapshot, outcome: &mut TickOutcome) {
        // Arrival is only observable before movement re-targets the next tile.
        self.player.snap_location_to_grid();
        if let Some(event) = self.take_passive_event_on_arrival() {
            self.player.draw();
            self.fire_event(event, outcome);
            return;
        }

        let standing = !self.player.action().is_moving();

        let opening_press = input
            .pressed()
            .iter()
            .position(|press| *press == InputAction::Start);
        if let (true, Some(at)) = (standing, opening_press) {
            self.player.stop();
            self.player.draw();
            self.menus.push(Menu::new(MenuKind::OverworldSidebar));
            self.state = OverworldState::Menu;
            debug!("menu_opened");
            self.menus.handle_input(&input.pressed()[at + 1..]);
            if self.menus.is_empty() {
                self.state = OverworldState::Loop;
                debug!("menu_closed");
            }
            return;
        }

        if standing && input.was_pressed(InputAction::Confirm) {
            let facing = self.player.facing();
            if let Some(event) = self
                .area
                .active_event_at(self.player.facing_tile(), facing)
                .cloned()
            {
                self.player.draw();
                self.fire_event(event, outcome);
                return;
            }
        }

        movement::update(
            &mut self.player,
            &self.area,
            input.direction(),
            input.run_held(),
        );
    }

    /// Passive events fire once per newly entered tile, and only while the
    /// player rests exactly on it.
    fn take_passive_event_on_arrival(&mut self) -> Option<TileEvent> {
        if !self.player.has_arrived() {
            return None;
        }
        let tile = TileCoord::from_position(self.player.grid_location());
        if self.last_event_tile == Some(tile) {
            return None;
        }
        self.last_event_tile = Some(tile);
        self.area
            .passive_event_at(self.player.grid_location())
            .cloned()
    }

    fn update_dialog(&mut self, input: &InputSnapshot) {
        self.player.draw();
        let Some(dialog) = self.dialog.as_mut() else {
            self.state = OverworldState::Loop;
            return;
        };
        dialog.tick();
        let confirms = input
            .pressed()
            .iter()
            .filter(|press| **press == InputAction::Confirm)
            .count();
        for _ in 0..confirms {
            if dialog.confirm() {
                self.dialog = None;
                self.state = OverworldState::Loop;
                debug!("dialog_closed");
                return;
            }
        }
    }

    fn fire_event(&mut self, event: TileEvent, outcome: &mut TickOutcome) {
        debug!(
            kind = event.kind.token(),
            x = event.location.x,
            y = event.location.y,
            priority = event.priority,
            "tile_event_fired"
        );
        match event.kind {
            TileEventKind::ChangeMap {
                destination,
                arrival,
            } => {
                self.player.stop();
                outcome.clear_input = true;
                debug!(destination = destination.as_str(), "fade_out_started");
                self.state = OverworldState::FadeOut {
                    remaining: FADE_TICKS,
                    pending: PendingMapChange {
                        destination,
                        arrival,
                    },
                };
            }
            TileEventKind::Dialog { pages } => {
                self.player.stop();
                self.dialog = Some(Dialog::new(&pages));
                self.state = OverworldState::Dialog;
                debug!(pages = pages.len(), "dialog_opened");
            }
        }
    }

    fn finish_map_change<L: AreaLoader>(&mut self, pending: PendingMapChange, loader: &mut L) {
        match loader.load_area(&pending.destination) {
            Ok(area) => {
                info!(
                    from = self.area.name(),
                    to = area.name(),
                    arrival_x = pending.arrival.x,
                    arrival_y = pending.arrival.y,
                    "map_changed"
                );
                self.area = area;
                self.player.set_grid_location(pending.arrival);
                self.player.stop();
                self.player.draw();
                self.last_event_tile = Some(TileCoord::from_position(pending.arrival));
            }
            Err(error) => {
                warn!(
                    destination = pending.destination.as_str(),
                    error = %error,
                    "map_load_failed_keeping_current_area"
                );
            }
        }
    }

    fn compose(&mut self) {
        self.camera = camera_offset(self.area.dimensions(), self.viewport, self.player.center());
        self.draw_list = compose_draw_list(self.area.doodads(), &self.player);
    }
}
