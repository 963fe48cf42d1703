use arrow_burst::config;
use arrow_burst::constants::{
    DEFAULT_PLAY_HEIGHT, DEFAULT_PLAY_WIDTH, GAME_CONFIG_PATH, LEADERBOARD_LIMIT,
    LEADERBOARD_PATH,
};
use arrow_burst::graphics;
use arrow_burst::launcher::PointerInputPlugin;
use arrow_burst::leaderboard::{FileLeaderboard, Leaderboard, LeaderboardPlugin};
use arrow_burst::menu::GameOverPlugin;
use arrow_burst::rendering::RenderingPlugin;
use arrow_burst::simulation::{SimulationPlugin, TeardownRequested};
use bevy::prelude::*;
use bevy::window::{WindowCloseRequested, WindowResolution};
use bevy_rapier2d::prelude::*;

/// Turn a window close into an orderly simulation teardown.
fn teardown_on_close(
    mut closes: MessageReader<WindowCloseRequested>,
    mut teardown: MessageWriter<TeardownRequested>,
) {
    if closes.read().count() > 0 {
        teardown.write(TeardownRequested);
    }
}

fn main() {
    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Arrow Burst".into(),
            resolution: WindowResolution::new(
                DEFAULT_PLAY_WIDTH as u32,
                DEFAULT_PLAY_HEIGHT as u32,
            ),
            ..Default::default()
        }),
        ..Default::default()
    }));

    // Logging is up once DefaultPlugins is built; the config has to be in
    // place before the simulation plugin starts the first round.
    let config = config::load_game_config(GAME_CONFIG_PATH);
    let path = if config.leaderboard_path.is_empty() {
        LEADERBOARD_PATH.to_string()
    } else {
        config.leaderboard_path.clone()
    };
    let limit = if config.leaderboard_limit == 0 {
        LEADERBOARD_LIMIT
    } else {
        config.leaderboard_limit
    };

    app.insert_resource(ClearColor(Color::srgb(0.04, 0.05, 0.10)))
        .insert_resource(config)
        .insert_resource(Leaderboard::new(FileLeaderboard::new(path, limit)))
        // pixels_per_meter(1.0) keeps world units equal to screen pixels, so the
        // per-step speeds in GameConfig convert with a plain multiply.
        .add_plugins(RapierPhysicsPlugin::<NoUserData>::pixels_per_meter(1.0))
        .add_plugins((
            SimulationPlugin,
            LeaderboardPlugin,
            PointerInputPlugin,
            RenderingPlugin,
            GameOverPlugin,
        ))
        .add_systems(Startup, (graphics::setup_camera, graphics::setup_physics))
        .add_systems(Update, teardown_on_close);

    app.run();
}
