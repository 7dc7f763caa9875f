pub mod catalog;
pub mod clustering;
pub mod config;
pub mod db;
pub mod environment;
pub mod export;
pub mod history;
pub mod job;
pub mod logging;
pub mod mail;
pub mod popularity;
pub mod report;

pub const TARGET_WEB_REQUEST: &str = "web_request";
pub const TARGET_DB: &str = "db_query";
