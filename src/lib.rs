//! Seafarer library - a boat on an endless animated ocean under a day-night sky

pub mod boat;
pub mod camera;
pub mod cli;
pub mod clouds;
pub mod daynight;
pub mod error;
pub mod input;
pub mod math;
pub mod ocean;
pub mod params;
pub mod reflection;
pub mod rendering;
pub mod scene;
