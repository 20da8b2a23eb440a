use std::collections::HashSet;
use std::mem;

use winit::event::{ElementState, KeyEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use super::scene::InputSnapshot;
use crate::grid::Facing;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    /// The "A" button.
    Confirm,
    /// The "B" button; held means run.
    Cancel,
    Start,
    Quit,
}

const ACTION_COUNT: usize = 8;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ActionStates {
    down: [bool; ACTION_COUNT],
}

impl ActionStates {
    pub(crate) fn set(&mut self, action: InputAction, is_down: bool) {
        self.down[action.index()] = is_down;
    }

    pub(crate) fn is_down(&self, action: InputAction) -> bool {
        self.down[action.index()]
    }
}

impl InputAction {
    const fn index(self) -> usize {
        match self {
            InputAction::MoveUp => 0,
            InputAction::MoveDown => 1,
            InputAction::MoveLeft => 2,
            InputAction::MoveRight => 3,
            InputAction::Confirm => 4,
            InputAction::Cancel => 5,
            InputAction::Start => 6,
            InputAction::Quit => 7,
        }
    }

    pub const fn direction(self) -> Option<Facing> {
        match self {
            InputAction::MoveUp => Some(Facing::Up),
            InputAction::MoveDown => Some(Facing::Down),
            InputAction::MoveLeft => Some(Facing::Left),
            InputAction::MoveRight => Some(Facing::Right),
            _ => None,
        }
    }

    pub const fn from_direction(facing: Facing) -> InputAction {
        match facing {
            Facing::Up => InputAction::MoveUp,
            Facing::Down => InputAction::MoveDown,
            Facing::Left => InputAction::MoveLeft,
            Facing::Right => InputAction::MoveRight,
        }
    }
}

/// Held directions in press order; the last entry is the active one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectionStack {
    held: Vec<Facing>,
}

impl DirectionStack {
    pub fn press(&mut self, facing: Facing) {
        self.held.retain(|held| *held != facing);
        self.held.push(facing);
    }

    pub fn release(&mut self, facing: Facing) {
        self.held.retain(|held| *held != facing);
    }

    pub fn current(&self) -> Option<Facing> {
        self.held.last().copied()
    }

    pub fn clear(&mut self) {
        self.held.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }
}

const KEY_BINDINGS: [(KeyCode, InputAction); 15] = [
    (KeyCode::KeyW, InputAction::MoveUp),
    (KeyCode::ArrowUp, InputAction::MoveUp),
    (KeyCode::KeyS, InputAction::MoveDown),
    (KeyCode::ArrowDown, InputAction::MoveDown),
    (KeyCode::KeyA, InputAction::MoveLeft),
    (KeyCode::ArrowLeft, InputAction::MoveLeft),
    (KeyCode::KeyD, InputAction::MoveRight),
    (KeyCode::ArrowRight, InputAction::MoveRight),
    (KeyCode::KeyU, InputAction::Confirm),
    (KeyCode::KeyZ, InputAction::Confirm),
    (KeyCode::KeyH, InputAction::Cancel),
    (KeyCode::KeyX, InputAction::Cancel),
    (KeyCode::Space, InputAction::Start),
    (KeyCode::Enter, InputAction::Start),
    (KeyCode::Escape, InputAction::Quit),
];

pub(crate) fn binding_for_key(code: KeyCode) -> Option<InputAction> {
    KEY_BINDINGS
        .iter()
        .find(|(bound, _)| *bound == code)
        .map(|(_, action)| *action)
}

/// Keyboard state gathered between ticks. Press edges are kept in arrival
/// order and handed out once per tick. An action stays down while any key
/// bound to it is down.
#[derive(Debug, Default)]
pub(crate) struct InputCollector {
    quit_requested: bool,
    keys_down: HashSet<KeyCode>,
    held: ActionStates,
    directions: DirectionStack,
    edges: Vec<InputAction>,
}

impl InputCollector {
    pub(crate) fn request_quit(&mut self) {
        self.quit_requested = true;
    }

    pub(crate) fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub(crate) fn on_key_event(&mut self, key_event: &KeyEvent) {
        // Auto-repeat would re-press a key dropped by `clear_held`.
        if key_event.repeat {
            return;
        }
        if let PhysicalKey::Code(code) = key_event.physical_key {
            self.apply(code, key_event.state == ElementState::Pressed);
        }
    }

    fn apply(&mut self, code: KeyCode, pressed: bool) {
        let Some(action) = binding_for_key(code) else {
            return;
        };
        if pressed {
            self.keys_down.insert(code);
        } else {
            self.keys_down.remove(&code);
        }

        let still_down = self
            .keys_down
            .iter()
            .any(|key| binding_for_key(*key) == Some(action));
        let was_down = self.held.is_down(action);
        if still_down == was_down {
            return;
        }
        self.held.set(action, still_down);

        match (action.direction(), still_down) {
            (Some(facing), true) => self.directions.press(facing),
            (Some(facing), false) => self.directions.release(facing),
            (None, _) => {}
        }

        match action {
            InputAction::Quit if still_down => self.request_quit(),
            InputAction::Quit => {}
            _ if still_down => self.edges.push(action),
            _ => {}
        }
    }

    pub(crate) fn snapshot_for_tick(&mut self) -> InputSnapshot {
        InputSnapshot::new(
            self.quit_requested,
            self.held,
            self.directions.current(),
            mem::take(&mut self.edges),
        )
    }

    /// A key still physically down only counts again after a fresh press.
    pub(crate) fn clear_held(&mut self) {
        self.keys_down.clear();
        self.held = ActionStates::default();
        self.directions.clear();
        self.edges.clear();
    }
}
