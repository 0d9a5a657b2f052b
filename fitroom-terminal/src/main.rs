/// Fitroom Terminal Demo - Rotating Cube
///
/// Runs the viewer transform pipeline against a colored cube in the terminal.
/// Controls:
///   - Mouse drag: Rotate the cube
///   - Mouse wheel: Zoom
///   - Space: Toggle auto-rotation
///   - R: Reset
///   - Q/ESC: Quit

use clap::Parser;
use fitroom_core::{IndexedMesh, ViewerConfig};
use fitroom_terminal::TerminalApp;
use log::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Terminal garment-viewer demo", long_about = None)]
struct Args {
    /// Vertical field of view in degrees
    #[arg(long, default_value_t = 45.0)]
    fov: f32,

    /// Initial camera distance
    #[arg(short, long, default_value_t = 5.0)]
    distance: f32,

    /// Auto-rotation speed in radians per frame
    #[arg(short, long, default_value_t = 0.01)]
    speed: f32,

    /// Drag sensitivity in radians per pixel
    #[arg(long, default_value_t = 0.01)]
    sensitivity: f32,

    /// Let vertical drag tilt the model
    #[arg(long)]
    tilt: bool,

    /// Start with auto-rotation off
    #[arg(long)]
    paused: bool,

    /// Target frames per second
    #[arg(long, default_value_t = 30)]
    fps: u32,
}

impl Args {
    fn config(&self) -> ViewerConfig {
        ViewerConfig::new()
            .with_fov(self.fov.to_radians())
            .with_camera_distance(self.distance)
            .with_auto_rotate_increment(self.speed)
            .with_drag_sensitivity(self.sensitivity)
            .with_drag_tilt(self.tilt)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let config = args.config();
    config.validate()?;
    info!("starting with {config:?}");

    let mut app = TerminalApp::new(IndexedMesh::cube(2.0), config, args.fps)?;
    if args.paused {
        app.handle(fitroom_terminal::Command::ToggleRotation);
    }
    app.run()?;

    println!("Thank you for using the Fitroom terminal viewer!");
    Ok(())
}
