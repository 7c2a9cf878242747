/*
Viking Run
*/
use bevy::prelude::*;

use crate::config::RunnerConfig;
use crate::ground::{make_ground_assets, spawn_segment, GroundTrack};
use crate::level::Level;
use crate::obstacles::ObstacleSpawner;
use crate::pickups::PickupSpawner;
use crate::player::spawn_player;
use crate::wolf::spawn_wolf;

/// Everything Torn Down When a Level is Rebuilt
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct LevelEntity;

/// Spawns a Fresh Level: Ground, Runner, Wolf, Spawner Timers
pub fn build_level(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    config: &RunnerConfig,
    level: Level,
) {
    commands.insert_resource(ClearColor(level.sky_color()));

    let ground_assets =
        make_ground_assets(meshes, materials, level.ground_color(), config.segment_length);
    let mut ground = GroundTrack::new(config);
    for start in ground.take_due(0.0) {
        spawn_segment(commands, &ground_assets, start, ground.segment_length);
    }
    commands.insert_resource(ground);
    commands.insert_resource(ground_assets);

    spawn_player(commands, meshes, materials, config);
    spawn_wolf(commands, meshes, materials, config);

    commands.insert_resource(ObstacleSpawner::new(config.obstacle_interval));
    commands.insert_resource(PickupSpawner::new(config.pickup_interval));

    info!("Level built: {}", level.name());
}

pub fn despawn_level(commands: &mut Commands, q_level: &Query<Entity, With<LevelEntity>>) {
    for e in q_level.iter() {
        commands.entity(e).try_despawn();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ground::GroundSegment;
    use crate::player::Player;
    use crate::wolf::Wolf;
    use bevy::ecs::system::RunSystemOnce;

    fn build(
        mut commands: Commands,
        mut meshes: ResMut<Assets<Mesh>>,
        mut materials: ResMut<Assets<StandardMaterial>>,
    ) {
        build_level(
            &mut commands,
            &mut meshes,
            &mut materials,
            &RunnerConfig::default(),
            Level::Wilderness,
        );
    }

    #[test]
    fn fresh_level_has_runner_wolf_and_ground_ahead() {
        let mut app = App::new();
        app.init_resource::<Assets<Mesh>>()
            .init_resource::<Assets<StandardMaterial>>()
            .add_systems(Update, build);
        app.update();

        let world = app.world_mut();
        assert_eq!(world.query::<&Player>().iter(world).count(), 1);
        assert_eq!(world.query::<&Wolf>().iter(world).count(), 1);
        assert_eq!(world.query::<&GroundSegment>().iter(world).count(), 3);
        assert!(world.contains_resource::<ObstacleSpawner>());
        assert_eq!(
            world.resource::<ClearColor>().0,
            Level::Wilderness.sky_color()
        );
    }

    #[test]
    fn despawning_level_takes_the_runner_with_it() {
        let mut app = App::new();
        app.init_resource::<Assets<Mesh>>()
            .init_resource::<Assets<StandardMaterial>>()
            .add_systems(Update, build);
        app.update();

        let world = app.world_mut();
        let tagged = world
            .query_filtered::<(), (With<Player>, With<LevelEntity>)>()
            .iter(world)
            .count();
        assert_eq!(tagged, 1);

        world
            .run_system_once(|mut commands: Commands, q: Query<Entity, With<LevelEntity>>| {
                despawn_level(&mut commands, &q);
            })
            .unwrap();
        assert_eq!(world.query::<&Player>().iter(world).count(), 0);
        assert_eq!(world.query::<&Wolf>().iter(world).count(), 0);
    }
}
