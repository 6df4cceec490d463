use campus_tiled::{LoadOptions, MapModel, MapRenderer};
use macroquad::prelude::*;

fn window_conf() -> Conf {
    Conf {
        window_title: "Basic Map".into(),
        window_width: 1280,
        window_height: 720,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "assets/campus.tmj".to_owned());
    let map = MapModel::load(&path, &LoadOptions::default()).expect("Failed to load map");
    let renderer = MapRenderer::new(&map);

    let mut camera_pos = Vec2::ZERO;

    loop {
        clear_background(BLACK);

        let speed = 200.0 * get_frame_time();
        if is_key_down(KeyCode::Right) {
            camera_pos.x += speed;
        }
        if is_key_down(KeyCode::Left) {
            camera_pos.x -= speed;
        }
        if is_key_down(KeyCode::Down) {
            camera_pos.y += speed;
        }
        if is_key_down(KeyCode::Up) {
            camera_pos.y -= speed;
        }

        let screen_size = vec2(screen_width(), screen_height());
        set_camera(&Camera2D::from_display_rect(Rect::new(
            camera_pos.x,
            camera_pos.y + screen_size.y,
            screen_size.x,
            -screen_size.y,
        )));
        renderer.draw(&map, camera_pos, camera_pos + screen_size);
        renderer.draw_labels(&map);

        set_default_camera();
        draw_text(
            &format!("FPS: {}", get_fps()),
            screen_width() - 135.0,
            55.0,
            30.0,
            RED,
        );

        next_frame().await;
    }
}
