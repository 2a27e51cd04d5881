use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::Utc;
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};
use tracing::{info, warn};

use crate::cell::CellInfo;
use crate::color::Rgba;
use crate::compositor::BACKGROUND;
use crate::config::ViewerConfig;
use crate::error::FetchError;
use crate::font;
use crate::session::{Direction, Session, Toggle};
use crate::source::{HttpTerrainSource, MinimapResponse};
use crate::surface::Surface;
use crate::viewport::{ViewportState, ViewportWindow};

/// Gap between the minimap inset and the canvas edge.
const MINIMAP_MARGIN: i64 = 10;
const PANEL: Rgba = Rgba::new(0, 0, 0, 0.8);
const TEXT: Rgba = Rgba::new(255, 255, 255, 1.0);
const LINE_HEIGHT: i64 = 10;
const ZOOM_STEP: f64 = 1.25;

/// Fetch completions sent back from the runtime to the UI loop
enum Fetched {
    Viewport(Result<Arc<ViewportWindow>, FetchError>),
    Minimap(Result<MinimapResponse, FetchError>),
}

/// Draw a translucent panel with one text line per entry.
fn draw_panel(surface: &mut Surface, x: i64, y: i64, lines: &[String]) {
    let width = lines.iter().map(|l| font::text_width(l)).max().unwrap_or(0) as i64 + 8;
    let height = lines.len() as i64 * LINE_HEIGHT + 6;
    // Keep the panel on screen.
    let x = x.min(surface.width() as i64 - width).max(0);
    let y = y.min(surface.height() as i64 - height).max(0);

    surface.fill_rect(x as f64, y as f64, width as f64, height as f64, PANEL);
    for (i, line) in lines.iter().enumerate() {
        surface.draw_text(x + 4, y + 4 + i as i64 * LINE_HEIGHT, line, 1, TEXT);
    }
}

fn draw_tooltip(surface: &mut Surface, info: &CellInfo) {
    let (px, py) = info.pointer;
    draw_panel(surface, px as i64 + 10, py as i64 + 10, &info.describe());
}

fn minimap_origin(canvas_width: u32, minimap_size: u32) -> (i64, i64) {
    (canvas_width as i64 - minimap_size as i64 - MINIMAP_MARGIN, MINIMAP_MARGIN)
}

fn in_minimap(pos: (f32, f32), origin: (i64, i64), size: u32) -> Option<(f64, f64)> {
    let x = pos.0 as f64 - origin.0 as f64;
    let y = pos.1 as f64 - origin.1 as f64;
    let size = size as f64;
    (x >= 0.0 && y >= 0.0 && x < size && y < size).then_some((x, y))
}

fn spawn_viewport_fetch(runtime: &tokio::runtime::Runtime, state: &Arc<ViewportState<HttpTerrainSource>>, tx: &Sender<Fetched>) {
    let state = Arc::clone(state);
    let tx = tx.clone();
    runtime.spawn(async move {
        let result = state.window().await;
        // The UI may have shut down.
        let _ = tx.send(Fetched::Viewport(result));
    });
}

fn spawn_minimap_fetch(
    runtime: &tokio::runtime::Runtime,
    state: &Arc<ViewportState<HttpTerrainSource>>,
    resolution: u32,
    tx: &Sender<Fetched>,
) {
    let state = Arc::clone(state);
    let tx = tx.clone();
    runtime.spawn(async move {
        let result = state.fetch_minimap(resolution).await;
        let _ = tx.send(Fetched::Minimap(result));
    });
}

fn drain(session: &mut Session<HttpTerrainSource>, rx: &Receiver<Fetched>) {
    while let Ok(fetched) = rx.try_recv() {
        match fetched {
            Fetched::Viewport(result) => {
                session.apply_viewport(result);
            }
            Fetched::Minimap(result) => {
                session.apply_minimap(result);
            }
        }
    }
}

fn handle_keys(window: &Window, session: &mut Session<HttpTerrainSource>) {
    for (key, direction) in [
        (Key::Left, Direction::Left),
        (Key::Right, Direction::Right),
        (Key::Up, Direction::Up),
        (Key::Down, Direction::Down),
    ] {
        if window.is_key_pressed(key, KeyRepeat::Yes) {
            let (x, y) = session.step(direction);
            info!(x, y, "viewport moved");
        }
    }

    if window.is_key_pressed(Key::M, KeyRepeat::No) {
        session.cycle_color_mode();
        println!("Colour mode: {}", session.settings().color_mode);
    }

    for (key, toggle) in [
        (Key::Key1, Toggle::Rivers),
        (Key::Key2, Toggle::Contours),
        (Key::Key3, Toggle::Clouds),
        (Key::Key4, Toggle::Precipitation),
        (Key::Key5, Toggle::Elevation),
        (Key::Key6, Toggle::Moisture),
        (Key::W, Toggle::Wireframe),
    ] {
        if window.is_key_pressed(key, KeyRepeat::No) {
            session.toggle(toggle);
        }
    }

    if window.is_key_pressed(Key::Equal, KeyRepeat::Yes) || window.is_key_pressed(Key::NumPadPlus, KeyRepeat::Yes) {
        session.zoom(ZOOM_STEP);
    }
    if window.is_key_pressed(Key::Minus, KeyRepeat::Yes) || window.is_key_pressed(Key::NumPadMinus, KeyRepeat::Yes) {
        session.zoom(1.0 / ZOOM_STEP);
    }
}

/// Run the interactive viewer against a terrain backend.
/// Arrows move, M cycles colour modes, 1-6 and W toggle layers, +/- zoom, Esc exits.
pub fn run_viewer(config: ViewerConfig) -> Result<()> {
    let config = config.normalized();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    let source = Arc::new(
        HttpTerrainSource::new(&config.api_url, config.request_timeout())
            .context("failed to build HTTP client")?,
    );
    let state = Arc::new(ViewportState::new(Arc::clone(&source), config.world_size));
    let mut session = Session::new(Arc::clone(&state), &config);

    match runtime.block_on(source.fetch_config()) {
        Ok(backend) => {
            if let Some(interval) = backend.refresh_interval() {
                info!(?interval, "following backend update interval");
                session.set_viewport_refresh(interval);
            }
        }
        Err(err) => warn!(error = %err, "backend config unavailable, using local refresh interval"),
    }

    let (width, height) = session.canvas();
    let mut window = Window::new(
        "Terrain Viewer - Arrows: Move, M: Mode, 1-6/W: Layers, +/-: Zoom, Esc: Exit",
        width as usize,
        height as usize,
        WindowOptions {
            resize: false,
            scale: minifb::Scale::X1,
            ..WindowOptions::default()
        },
    )
    .context("failed to create window")?;

    // Limit to ~60fps
    window.set_target_fps(60);

    println!("Viewer started against {}. Controls:", config.api_url);
    println!("  Arrows: Move viewport by {} cells", config.move_step);
    println!("  Click: Select cell, click again to clear");
    println!("  Minimap click: Centre view");
    println!("  M: Cycle colour mode");
    println!("  1-6: Rivers, Contours, Clouds, Rain, Elevation, Moisture");
    println!("  W: Wireframe");
    println!("  +/-: Zoom");
    println!("  Esc: Exit");

    let (tx, rx) = mpsc::channel();
    let mut canvas = Surface::new(width, height);
    let mut minimap = Surface::new(config.minimap_size, config.minimap_size);
    let minimap_at = minimap_origin(width, config.minimap_size);
    let mut was_down = false;

    while window.is_open() && !window.is_key_down(Key::Escape) {
        let pending = session.poll_refresh(Instant::now());
        if pending.viewport {
            spawn_viewport_fetch(&runtime, &state, &tx);
        }
        if pending.minimap {
            spawn_minimap_fetch(&runtime, &state, config.minimap_resolution, &tx);
        }
        drain(&mut session, &rx);

        handle_keys(&window, &mut session);

        let down = window.get_mouse_down(MouseButton::Left);
        match window.get_mouse_pos(MouseMode::Discard) {
            Some(pos) => match in_minimap(pos, minimap_at, config.minimap_size) {
                Some((mx, my)) => {
                    session.pointer_left();
                    if down && !was_down {
                        session.minimap_click(mx, my);
                    }
                }
                None => {
                    let (px, py) = (pos.0 as f64, pos.1 as f64);
                    session.pointer_moved(px, py);
                    if down && !was_down {
                        session.click(px, py);
                    }
                }
            },
            None => session.pointer_left(),
        }
        was_down = down;

        session.advance();
        session.render(&mut canvas);
        session.render_minimap(&mut minimap, Utc::now());
        canvas.blit(minimap.image(), minimap_at.0, minimap_at.1);

        if session.is_loading() || session.window().is_none() {
            draw_panel(&mut canvas, 10, 10, &["LOADING...".to_string()]);
        }
        let mode = session.settings().color_mode.name().to_string();
        draw_panel(&mut canvas, 10, height as i64, &[format!("MODE: {mode}")]);
        if let Some(hovered) = &session.selection().hovered {
            draw_tooltip(&mut canvas, hovered);
        }

        let buffer = canvas.to_0rgb(BACKGROUND);
        window
            .update_with_buffer(&buffer, width as usize, height as usize)
            .context("failed to update window")?;
    }

    Ok(())
}

/// Fetch once, render the main view and minimap, and write them as PNGs.
/// The minimap lands next to `path` as `<stem>_minimap.png`.
pub fn export_snapshot(config: ViewerConfig, path: &std::path::Path) -> Result<()> {
    let config = config.normalized();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    let source = Arc::new(
        HttpTerrainSource::new(&config.api_url, config.request_timeout())
            .context("failed to build HTTP client")?,
    );
    let state = Arc::new(ViewportState::new(source, config.world_size));
    let mut session = Session::new(Arc::clone(&state), &config);

    println!("Fetching minimap from {}...", config.api_url);
    let minimap = runtime.block_on(state.fetch_minimap(config.minimap_resolution));
    session.apply_minimap(minimap);

    println!("Fetching viewport at {:?}...", state.origin());
    let window = runtime
        .block_on(state.window())
        .context("viewport fetch failed")?;
    session.apply_viewport(Ok(window));

    let (width, height) = session.canvas();
    let mut canvas = Surface::new(width, height);
    session.render(&mut canvas);
    canvas
        .save_png(path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    println!("Main view written to {}", path.display());

    let mut minimap_surface = Surface::new(config.minimap_size, config.minimap_size);
    session.render_minimap(&mut minimap_surface, Utc::now());
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("snapshot");
    let minimap_path = path.with_file_name(format!("{stem}_minimap.png"));
    minimap_surface
        .save_png(&minimap_path)
        .with_context(|| format!("failed to write {}", minimap_path.display()))?;
    println!("Minimap written to {}", minimap_path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;

    #[test]
    fn test_minimap_hit_test() {
        let origin = minimap_origin(800, 150);
        assert_eq!(origin, (640, 10));
        assert_eq!(in_minimap((645.0, 20.0), origin, 150), Some((5.0, 10.0)));
        assert_eq!(in_minimap((639.0, 20.0), origin, 150), None);
        assert_eq!(in_minimap((700.0, 160.0), origin, 150), None);
    }

    #[test]
    fn test_panel_stays_on_screen() {
        let mut surface = Surface::new(100, 50);
        surface.clear(Rgb::new(200, 200, 200));
        draw_panel(&mut surface, 95, 45, &["HELLO".to_string()]);
        // Pushed back inside: the bottom-right corner is panel-dark.
        let p = surface.pixel(99, 49).unwrap();
        assert!(p.r < 100);
    }
}
