mod bootstrap;
mod content;
mod loop_runner;
mod overworld_scene;

pub(crate) use bootstrap::build_app;
pub(crate) use loop_runner::run;
