use crate::entity::{Action, AnimatedEntity, Capabilities};
use crate::grid::{Facing, Passability, Vec2};

/// Consecutive held ticks before a standing entity starts walking.
pub const INPUT_DEBOUNCE_TICKS: u32 = 3;
pub const SNAP_EPSILON: f32 = 0.1;

impl AnimatedEntity {
    pub fn set_grid_location(&mut self, location: Vec2) {
        self.grid_location = location;
        self.target_location = location;
    }

    /// Interpolation approaches the target asymptotically; each axis within
    /// [`SNAP_EPSILON`] is pinned to the exact target value.
    pub fn snap_location_to_grid(&mut self) {
        if (self.grid_location.x - self.target_location.x).abs() <= SNAP_EPSILON {
            self.grid_location.x = self.target_location.x;
        }
        if (self.grid_location.y - self.target_location.y).abs() <= SNAP_EPSILON {
            self.grid_location.y = self.target_location.y;
        }
    }

    pub fn stop(&mut self) {
        self.action = Action::Stand;
        self.frame_counter = 0;
        self.frame = 0;
        self.input_counter = 0;
        self.target_location = self.grid_location;
    }

    pub fn has_arrived(&self) -> bool {
        self.grid_location == self.target_location
    }

    pub fn facing_tile(&self) -> Vec2 {
        self.grid_location + self.facing.unit_vector()
    }

    fn begin_step(&mut self, area: &impl Passability, run_requested: bool) {
        self.set_action(if run_requested {
            Action::Run
        } else {
            Action::Walk
        });
        let target = self.facing_tile();
        // A blocked step still enters the moving state so the bump plays in place.
        self.target_location = if area.is_passable(target) {
            target
        } else {
            self.grid_location
        };
    }

    fn set_action_from_input(
        &mut self,
        area: &impl Passability,
        direction: Option<Facing>,
        run_requested: bool,
    ) {
        match self.action {
            Action::Stand => match direction {
                None => self.stop(),
                Some(direction) => {
                    self.facing = direction;
                    self.input_counter = self.input_counter.saturating_add(1);
                    if self.input_counter >= INPUT_DEBOUNCE_TICKS {
                        self.begin_step(area, run_requested);
                    }
                }
            },
            Action::Walk | Action::Run => {
                if !self.has_arrived() {
                    return;
                }
                match direction {
                    None => self.stop(),
                    Some(direction) => {
                        self.facing = direction;
                        self.begin_step(area, run_requested);
                    }
                }
            }
        }
    }
}

/// One movement tick: snap, re-evaluate the action from input, then draw
/// (which steps and animates exactly once). Entities without
/// [`Capabilities::INPUT_CONTROLLED`] see no input and stay put.
pub fn update(
    entity: &mut AnimatedEntity,
    area: &impl Passability,
    direction: Option<Facing>,
    run_requested: bool,
) {
    let controlled = entity
        .capabilities()
        .contains(Capabilities::INPUT_CONTROLLED);
    let (direction, run_requested) = if controlled {
        (direction, run_requested)
    } else {
        (None, false)
    };
    entity.snap_location_to_grid();
    entity.set_action_from_input(area, direction, run_requested);
    entity.draw();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{AnimationSet, SpriteFrame, RUN_STEP_TILES_PER_TICK};
    use crate::grid::PassabilityMap;

    fn trainer_at(x: f32, y: f32) -> AnimatedEntity {
        let mut set = AnimationSet::default();
        for action in Action::ALL {
            for facing in Facing::ALL {
                set.set_frames(
                    action,
                    facing,
                    SpriteFrame::strip("unit/trainer", 3, 16, 32, false),
                );
            }
        }
        AnimatedEntity::unit(Vec2::new(x, y), set)
    }

    fn open_field() -> PassabilityMap {
        PassabilityMap::filled(10, 10, true)
    }

    fn field_with_wall_at(x: u32, y: u32) -> PassabilityMap {
        let mut cells = vec![true; 100];
        cells[(y * 10 + x) as usize] = false;
        PassabilityMap::new(10, 10, cells).expect("map")
    }

    #[test]
    fn decorations_ignore_direction_input() {
        let area = open_field();
        let mut sign = AnimatedEntity::decoration(
            Vec2::new(5.0, 5.0),
            false,
            AnimationSet::idle_loop(SpriteFrame::strip("doodads/sign", 1, 16, 16, false)),
        );
        for _ in 0..(INPUT_DEBOUNCE_TICKS * 2) {
            update(&mut sign, &area, Some(Facing::Left), true);
        }
        assert_eq!(sign.action(), Action::Stand);
        assert_eq!(sign.facing(), Facing::Down);
        assert_eq!(sign.grid_location(), Vec2::new(5.0, 5.0));
    }

    #[test]
    fn tapping_turns_without_moving() {
        let area = open_field();
        let mut trainer = trainer_at(5.0, 5.0);

        update(&mut trainer, &area, Some(Facing::Left), false);
        assert_eq!(trainer.facing(), Facing::Left, "facing updates on first tick");
        update(&mut trainer, &area, Some(Facing::Left), false);
        assert_eq!(trainer.action(), Action::Stand);
        assert_eq!(trainer.grid_location(), Vec2::new(5.0, 5.0));

        update(&mut trainer, &area, None, false);
        assert_eq!(trainer.input_counter(), 0, "release resets the hold counter");
        update(&mut trainer, &area, Some(Facing::Left), false);
        update(&mut trainer, &area, Some(Facing::Left), false);
        assert_eq!(trainer.action(), Action::Stand);
        assert_eq!(trainer.grid_location(), Vec2::new(5.0, 5.0));
    }

    #[test]
    fn holding_down_walks_one_tile_then_stands() {
        let area = open_field();
        let mut trainer = trainer_at(5.0, 5.0);

        update(&mut trainer, &area, Some(Facing::Down), false);
        update(&mut trainer, &area, Some(Facing::Down), false);
        assert_eq!(trainer.action(), Action::Stand);
        update(&mut trainer, &area, Some(Facing::Down), false);
        assert_eq!(trainer.action(), Action::Walk);
        assert_eq!(trainer.target_location(), Vec2::new(5.0, 6.0));

        let mut ticks = 0;
        while trainer.grid_location() != trainer.target_location() {
            update(&mut trainer, &area, None, false);
            assert!(trainer.grid_location().y <= 6.0, "overshot target");
            ticks += 1;
            assert!(ticks < 20, "never arrived");
        }
        assert_eq!(trainer.grid_location(), Vec2::new(5.0, 6.0));

        update(&mut trainer, &area, None, false);
        assert_eq!(trainer.action(), Action::Stand);
        assert_eq!(trainer.grid_location(), Vec2::new(5.0, 6.0));
    }

    #[test]
    fn one_tile_at_walk_speed_converges_within_bound() {
        let area = open_field();
        let mut trainer = trainer_at(5.0, 5.0);
        trainer.set_facing(Facing::Down);
        trainer.begin_step(&area, false);
        let bound = ((1.0f32 - 0.1) / 0.1).ceil() as usize + 1;

        let mut reached_at = None;
        for tick in 1..=bound {
            trainer.snap_location_to_grid();
            trainer.draw();
            assert!(trainer.grid_location().y <= 6.0, "overshot at tick {tick}");
            if trainer.grid_location().y == 6.0 {
                reached_at = Some(tick);
                break;
            }
        }
        assert!(reached_at.is_some(), "not at target within {bound} ticks");
    }

    #[test]
    fn bumping_into_wall_enters_walk_without_displacement() {
        let area = field_with_wall_at(5, 6);
        let mut trainer = trainer_at(5.0, 5.0);

        for _ in 0..INPUT_DEBOUNCE_TICKS {
            update(&mut trainer, &area, Some(Facing::Down), false);
        }
        assert_eq!(trainer.action(), Action::Walk);
        assert_eq!(trainer.target_location(), trainer.grid_location());
        assert_eq!(trainer.grid_location(), Vec2::new(5.0, 5.0));

        update(&mut trainer, &area, None, false);
        assert_eq!(trainer.action(), Action::Stand);
        assert_eq!(trainer.grid_location(), Vec2::new(5.0, 5.0));
    }

    #[test]
    fn held_bump_keeps_walking_in_place() {
        let area = field_with_wall_at(5, 6);
        let mut trainer = trainer_at(5.0, 5.0);
        for _ in 0..INPUT_DEBOUNCE_TICKS + 5 {
            update(&mut trainer, &area, Some(Facing::Down), false);
        }
        assert_eq!(trainer.action(), Action::Walk);
        assert_eq!(trainer.grid_location(), Vec2::new(5.0, 5.0));
    }

    #[test]
    fn map_edge_is_a_wall() {
        let area = open_field();
        let mut trainer = trainer_at(0.0, 0.0);
        for _ in 0..INPUT_DEBOUNCE_TICKS {
            update(&mut trainer, &area, Some(Facing::Up), false);
        }
        assert_eq!(trainer.action(), Action::Walk);
        assert_eq!(trainer.target_location(), Vec2::new(0.0, 0.0));
    }

    #[test]
    fn continuous_hold_chains_steps_without_debounce() {
        let area = open_field();
        let mut trainer = trainer_at(1.0, 1.0);
        for _ in 0..INPUT_DEBOUNCE_TICKS {
            update(&mut trainer, &area, Some(Facing::Right), false);
        }
        for tick in 0..25 {
            update(&mut trainer, &area, Some(Facing::Right), false);
            assert!(trainer.action().is_moving(), "stood still at tick {tick}");
            assert!(trainer.grid_location().x <= trainer.target_location().x);
        }
        assert!(trainer.grid_location().x >= 3.0);
        assert_eq!(trainer.grid_location().y, 1.0);
    }

    #[test]
    fn turning_mid_walk_applies_on_arrival() {
        let area = open_field();
        let mut trainer = trainer_at(4.0, 4.0);
        for _ in 0..INPUT_DEBOUNCE_TICKS {
            update(&mut trainer, &area, Some(Facing::Right), false);
        }
        update(&mut trainer, &area, Some(Facing::Up), false);
        assert_eq!(trainer.facing(), Facing::Right, "no turn before arrival");
        assert_eq!(trainer.target_location(), Vec2::new(5.0, 4.0));

        for _ in 0..15 {
            update(&mut trainer, &area, Some(Facing::Up), false);
        }
        assert_eq!(trainer.facing(), Facing::Up);
        assert_eq!(trainer.target_location(), Vec2::new(5.0, 3.0));
    }

    #[test]
    fn run_request_selects_run_and_doubles_step() {
        let area = open_field();
        let mut trainer = trainer_at(2.0, 2.0);
        for _ in 0..INPUT_DEBOUNCE_TICKS {
            update(&mut trainer, &area, Some(Facing::Right), true);
        }
        assert_eq!(trainer.action(), Action::Run);
        assert!((trainer.grid_location().x - (2.0 + RUN_STEP_TILES_PER_TICK)).abs() < 1.0e-5);
    }

    #[test]
    fn stop_is_idempotent() {
        let mut trainer = trainer_at(3.0, 3.0);
        trainer.stop();
        let once = (trainer.action(), trainer.target_location(), trainer.input_counter());
        trainer.stop();
        let twice = (trainer.action(), trainer.target_location(), trainer.input_counter());
        assert_eq!(once, twice);
        assert_eq!(trainer.target_location(), Vec2::new(3.0, 3.0));
    }

    #[test]
    fn snap_pins_each_axis_independently() {
        let mut trainer = trainer_at(0.0, 0.0);
        trainer.target_location = Vec2::new(1.0, 2.0);
        trainer.grid_location = Vec2::new(0.95, 1.5);
        trainer.snap_location_to_grid();
        assert_eq!(trainer.grid_location(), Vec2::new(1.0, 1.5));
    }
}
