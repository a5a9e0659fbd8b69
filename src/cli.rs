//! Command-line argument parsing.

use clap::Parser;
use log::info;

use crate::params::SceneParams;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "Seafarer")]
#[command(about = "Sail a boat across an endless ocean through day and night", long_about = None)]
pub struct Args {
    /// Starting day-night phase (radians; 0 = noon, PI = midnight)
    #[arg(long, value_name = "RADIANS")]
    pub time_of_day: Option<f32>,

    /// Day-night cycle speed (radians per second)
    #[arg(long, value_name = "RAD_PER_S")]
    pub cycle_speed: Option<f32>,

    /// Number of drifting clouds
    #[arg(long, value_name = "N")]
    pub clouds: Option<usize>,

    /// Pin the sea state (0 = calm, 1 = rough) instead of letting it oscillate
    #[arg(long, value_name = "0..1")]
    pub wave_strength: Option<f32>,

    /// Window width (pixels)
    #[arg(long, value_name = "PIXELS")]
    pub width: Option<u32>,

    /// Window height (pixels)
    #[arg(long, value_name = "PIXELS")]
    pub height: Option<u32>,

    /// Simulated boat model load time (milliseconds)
    #[arg(long, value_name = "MS", default_value = "300")]
    pub load_delay_ms: u64,
}

impl Args {
    /// Overlay the flags that were given on top of `params`
    pub fn apply(&self, params: &mut SceneParams) {
        if let Some(phase) = self.time_of_day {
            info!("Time of day: phase {:.2} rad", phase);
            params.sky.initial_phase = phase;
        }
        if let Some(speed) = self.cycle_speed {
            info!("Cycle speed: {} rad/s", speed);
            params.sky.cycle_speed = speed;
        }
        if let Some(count) = self.clouds {
            params.clouds.count = count;
        }
        if let Some(strength) = self.wave_strength {
            info!("Wave strength pinned at {:.2}", strength);
            params.ocean.fixed_strength = Some(strength);
        }
        if let Some(width) = self.width {
            params.render.window_width = width;
        }
        if let Some(height) = self.height {
            params.render.window_height = height;
        }
    }
}
