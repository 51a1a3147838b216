pub mod auth;
pub mod codec;
pub mod config;
pub mod domain;
pub mod errors;
pub mod game_model;
pub mod game_module;
pub mod http;
pub mod match_worker;
pub mod persistence;
pub mod repository;
pub mod supervisor;
