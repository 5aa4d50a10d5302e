pub mod api;
pub mod config;
pub mod db;
pub mod http_server;
pub mod redis_keys;
pub mod redis_utils;
