/// Example: show a 20 mm demo cube with its estimate
///
/// Usage: cargo run --example demo_cube
use std::io;
use stlmass_core::{volume, Estimate, Mesh, DEFAULT_DENSITY_G_PER_CM3};
use stlmass_terminal::TerminalApp;

fn main() -> io::Result<()> {
    let cube = Mesh::cube(20.0);
    let estimate = Estimate::from_volume(
        cube.len(),
        volume::to_cm3(cube.signed_volume_mm3()),
        DEFAULT_DENSITY_G_PER_CM3,
    );

    println!("{estimate}");
    println!("Starting terminal renderer (press Q to quit)...");
    std::thread::sleep(std::time::Duration::from_secs(1));

    let mut app = TerminalApp::new(cube, estimate, "demo cube (20 mm)")?;
    app.run()
}
