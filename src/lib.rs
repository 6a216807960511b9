// Library for tests to access modules

pub mod composer;
pub mod config;
pub mod display;
pub mod frame;
pub mod models;
pub mod refresh;
pub mod sampler;
