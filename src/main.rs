//! Kova workshop. Runs the workshop_scene app.

use workshop_scene::prelude::*;

fn main() {
    let _ = dotenvy::dotenv();

    WorkshopBuilder::new()
        .env_config()
        .window_title("Kova Workshop")
        .build()
        .run();
}
