use overworld_engine::{
    compose_frame, AreaLoader, FrameDescription, InputSnapshot, OverworldContext, Scene,
    SceneCommand,
};
use tracing::info;

/// Hosts one overworld session inside the engine loop.
pub(crate) struct OverworldScene<L: AreaLoader> {
    context: OverworldContext,
    loader: L,
}

impl<L: AreaLoader> OverworldScene<L> {
    pub(crate) fn new(context: OverworldContext, loader: L) -> Self {
        Self { context, loader }
    }
}

impl<L: AreaLoader> Scene for OverworldScene<L> {
    fn load(&mut self) {
        let start = self.context.player().grid_location();
        info!(
            area = self.context.area().name(),
            start_x = start.x,
            start_y = start.y,
            doodads = self.context.area().doodads().len(),
            "overworld_ready"
        );
    }

    fn update(&mut self, _fixed_dt_seconds: f32, input: &InputSnapshot) -> SceneCommand {
        if input.quit_requested() {
            return SceneCommand::Quit;
        }
        let outcome = self.context.update(input, &mut self.loader);
        if outcome.clear_input {
            SceneCommand::ClearInput
        } else {
            SceneCommand::None
        }
    }

    fn render(&self) -> FrameDescription {
        compose_frame(&self.context)
    }

    fn unload(&mut self) {
        info!(area = self.context.area().name(), "overworld_unloaded");
    }

    fn debug_title(&self) -> Option<String> {
        Some(format!(
            "Overworld - {} [{}]",
            self.context.area().name(),
            self.context.state().token()
        ))
    }
}
