/*
Viking Run
*/
pub mod audio;
pub mod boss;
pub mod camera;
pub mod config;
pub mod game_state;
pub mod ground;
pub mod leaderboard;
pub mod level;
pub mod obstacles;
pub mod pickups;
pub mod player;
pub mod profile;
pub mod restart;
pub mod storage;
pub mod track;
pub mod ui;
pub mod wolf;
pub mod world;
