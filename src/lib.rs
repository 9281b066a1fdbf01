pub mod cli;
pub mod config;
pub mod fetch;
pub mod literal;
pub mod logging;
pub mod mapdata;
pub mod output;
pub mod preload;
pub mod temples;
