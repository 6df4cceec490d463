use campus_tiled::{LoadOptions, MapModel, MapRenderer};
use macroquad::prelude::*;

fn window_conf() -> Conf {
    Conf {
        window_title: "Objects Example".into(),
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

    println!("entrances={}", map.entrances().len());
    println!("labels={}", map.labels().len());
    println!("collision regions={}", map.collision().len());
    for w in map.warnings() {
        println!("warning: {w}");
    }

    let mut player = map.spawn_point().unwrap_or_else(|| {
        vec2(map.pixel_width() as f32, map.pixel_height() as f32) / 2.0
    });

    loop {
        clear_background(BLACK);

        let mut step = Vec2::ZERO;
        if is_key_down(KeyCode::Right) {
            step.x += 1.0;
        }
        if is_key_down(KeyCode::Left) {
            step.x -= 1.0;
        }
        if is_key_down(KeyCode::Down) {
            step.y += 1.0;
        }
        if is_key_down(KeyCode::Up) {
            step.y -= 1.0;
        }
        let next = player + step * 120.0 * get_frame_time();
        if !map.is_blocked(next) {
            player = next;
        }

        let screen_size = vec2(screen_width(), screen_height());
        let view_min = player - screen_size / 2.0;
        set_camera(&Camera2D::from_display_rect(Rect::new(
            view_min.x,
            view_min.y + screen_size.y,
            screen_size.x,
            -screen_size.y,
        )));

        renderer.draw(&map, view_min, view_min + screen_size);
        renderer.draw_actors(&map);
        renderer.draw_labels(&map);
        renderer.draw_debug(&map);
        draw_circle(player.x, player.y, 4.0, WHITE);

        set_default_camera();
        let status = if let Some(e) = map.entrance_at(player) {
            format!("entrance: {} -> {}", e.name, e.target.as_deref().unwrap_or("?"))
        } else if let Some(i) = map.interaction_at(player) {
            format!("{}: {}", i.name, i.options.join(", "))
        } else if let Some(m) = map.minigame_at(player) {
            format!("minigame: {}", m.game)
        } else {
            "objects example".to_owned()
        };
        draw_text(&status, 20.0, 30.0, 32.0, WHITE);

        next_frame().await;
    }
}
