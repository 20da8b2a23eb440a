use super::input::{ActionStates, InputAction};
use super::rendering::FrameDescription;
use crate::grid::Facing;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    None,
    /// Drop held directions and pending press edges.
    ClearInput,
    Quit,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    quit_requested: bool,
    actions: ActionStates,
    direction: Option<Facing>,
    pressed: Vec<InputAction>,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn new(
        quit_requested: bool,
        actions: ActionStates,
        direction: Option<Facing>,
        pressed: Vec<InputAction>,
    ) -> Self {
        Self {
            quit_requested,
            actions,
            direction,
            pressed,
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    /// Most recently pressed direction that is still held.
    pub fn direction(&self) -> Option<Facing> {
        self.direction
    }

    pub fn run_held(&self) -> bool {
        self.is_down(InputAction::Cancel)
    }

    /// Press edges since the previous tick, in arrival order.
    pub fn pressed(&self) -> &[InputAction] {
        &self.pressed
    }

    pub fn was_pressed(&self, action: InputAction) -> bool {
        self.pressed.contains(&action)
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.actions.set(action, is_down);
        self
    }

    /// Holds `direction` as the active direction (or releases all with `None`).
    pub fn with_direction(mut self, direction: Option<Facing>) -> Self {
        for facing in Facing::ALL {
            self.actions
                .set(InputAction::from_direction(facing), direction == Some(facing));
        }
        self.direction = direction;
        self
    }

    pub fn with_pressed(mut self, action: InputAction) -> Self {
        self.pressed.push(action);
        self
    }

    pub fn with_quit_requested(mut self, quit_requested: bool) -> Self {
        self.quit_requested = quit_requested;
        self
    }
}

pub trait Scene {
    fn load(&mut self);
    fn update(&mut self, fixed_dt_seconds: f32, input: &InputSnapshot) -> SceneCommand;
    fn render(&self) -> FrameDescription;
    fn unload(&mut self);
    fn debug_title(&self) -> Option<String> {
        None
    }
}

/// Owns the running scene and guards its load/unload lifecycle.
pub(crate) struct SceneHost {
    scene: Box<dyn Scene>,
    is_loaded: bool,
}

impl SceneHost {
    pub(crate) fn new(scene: Box<dyn Scene>) -> Self {
        Self {
            scene,
            is_loaded: false,
        }
    }

    pub(crate) fn load(&mut self) {
        if self.is_loaded {
            return;
        }
        self.scene.load();
        self.is_loaded = true;
    }

    pub(crate) fn update(&mut self, fixed_dt_seconds: f32, input: &InputSnapshot) -> SceneCommand {
        if !self.is_loaded {
            return SceneCommand::None;
        }
        self.scene.update(fixed_dt_seconds, input)
    }

    pub(crate) fn render(&self) -> Option<FrameDescription> {
        self.is_loaded.then(|| self.scene.render())
    }

    pub(crate) fn debug_title(&self) -> Option<String> {
        self.scene.debug_title()
    }

    pub(crate) fn shutdown(&mut self) {
        if self.is_loaded {
            self.scene.unload();
            self.is_loaded = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[derive(Default)]
    struct Calls {
        loads: u32,
        updates: u32,
        unloads: u32,
    }

    struct CountingScene {
        calls: Rc<RefCell<Calls>>,
    }

    impl Scene for CountingScene {
        fn load(&mut self) {
            self.calls.borrow_mut().loads += 1;
        }

        fn update(&mut self, _fixed_dt_seconds: f32, input: &InputSnapshot) -> SceneCommand {
            self.calls.borrow_mut().updates += 1;
            if input.quit_requested() {
                SceneCommand::Quit
            } else {
                SceneCommand::None
            }
        }

        fn render(&self) -> FrameDescription {
            FrameDescription::default()
        }

        fn unload(&mut self) {
            self.calls.borrow_mut().unloads += 1;
        }
    }

    fn host() -> (SceneHost, Rc<RefCell<Calls>>) {
        let calls = Rc::new(RefCell::new(Calls::default()));
        let scene = CountingScene {
            calls: Rc::clone(&calls),
        };
        (SceneHost::new(Box::new(scene)), calls)
    }

    #[test]
    fn load_runs_once_and_shutdown_unloads_once() {
        let (mut host, calls) = host();
        host.load();
        host.load();
        host.shutdown();
        host.shutdown();
        let calls = calls.borrow();
        assert_eq!((calls.loads, calls.unloads), (1, 1));
    }

    #[test]
    fn update_is_skipped_until_loaded() {
        let (mut host, calls) = host();
        assert_eq!(host.update(0.033, &InputSnapshot::empty()), SceneCommand::None);
        assert!(host.render().is_none());
        host.load();
        let quit = InputSnapshot::empty().with_quit_requested(true);
        assert_eq!(host.update(0.033, &quit), SceneCommand::Quit);
        assert!(host.render().is_some());
        assert_eq!(calls.borrow().updates, 1);
    }

    #[test]
    fn snapshot_reports_presses_in_order_and_direction() {
        let snapshot = InputSnapshot::empty()
            .with_direction(Some(Facing::Left))
            .with_pressed(InputAction::Confirm)
            .with_pressed(InputAction::Start);
        assert_eq!(snapshot.direction(), Some(Facing::Left));
        assert!(snapshot.is_down(InputAction::MoveLeft));
        assert!(!snapshot.is_down(InputAction::MoveRight));
        assert!(snapshot.was_pressed(InputAction::Confirm));
        assert_eq!(
            snapshot.pressed(),
            &[InputAction::Confirm, InputAction::Start]
        );
    }

    #[test]
    fn cancel_held_means_run() {
        let snapshot = InputSnapshot::empty().with_action_down(InputAction::Cancel, true);
        assert!(snapshot.run_held());
        assert!(!InputSnapshot::empty().run_held());
    }
}
