//! Flow tests across the controller, driver and persistence client.
//!
//! Every test runs against the in-memory backend and a 20x20 canvas shown at
//! zoom 10 on a 200x200 screen, so world coordinates are screen coordinates
//! divided by ten.


use image::{Rgb, Rgba};

use crate::app::AtlasApp;
use crate::canvas::GridCanvas;
use crate::config::AppConfig;
use crate::driver::AtlasDriver;
use crate::message::{Message, PointerButton};
use crate::persistence::SelectionClient;
use crate::testing::{MemoryBackend, RecordingSink, ScriptedPrompt};
use crate::viewport::{Place, ScreenPos, ScreenRect, Viewport};
use crate::zoom_math::Transform;

type TestDriver = AtlasDriver<GridCanvas, RecordingSink, MemoryBackend, ScriptedPrompt>;

fn canvas() -> GridCanvas {
    let mut canvas = GridCanvas::new(
        20,
        20,
        Rgba([255, 255, 255, 255]),
        ScreenRect::new(0.0, 0.0, 200.0, 200.0),
    )
    .with_transform(Transform::new(10.0, -100.0, -100.0));
    canvas.set_pixel(1, 1, Rgb([255, 0, 0]));
    canvas.set_pixel(2, 2, Rgb([0, 255, 0]));
    canvas
}

fn driver_with(backend: &MemoryBackend, prompt: ScriptedPrompt, config: &AppConfig) -> TestDriver {
    let app = AtlasApp::new(
        canvas(),
        RecordingSink::default(),
        RecordingSink::default(),
        config,
    );
    AtlasDriver::new(app, SelectionClient::new(backend.clone()), prompt)
}

fn driver(backend: &MemoryBackend) -> TestDriver {
    driver_with(backend, ScriptedPrompt::default(), &AppConfig::default())
}

fn at(x: f32, y: f32) -> ScreenPos {
    ScreenPos::new(x, y)
}

/// Enter selection mode and drag through the given screen points.
async fn drag_select(driver: &mut TestDriver, points: &[(f32, f32)]) {
    driver.dispatch(Message::StartSelection).await;
    let mut last = at(0.0, 0.0);
    for (i, &(x, y)) in points.iter().enumerate() {
        last = at(x, y);
        if i == 0 {
            driver
                .dispatch(Message::PointerDown {
                    pos: last,
                    button: PointerButton::Primary,
                    ctrl: false,
                })
                .await;
        } else {
            driver
                .dispatch(Message::PointerMoved {
                    pos: last,
                    ctrl: false,
                })
                .await;
        }
    }
    driver.dispatch(Message::PointerUp { pos: last }).await;
}

/// Commit the current selection and name it through the dialog.
async fn commit_named(driver: &mut TestDriver, name: &str) {
    driver.dispatch(Message::Commit).await;
    driver.dispatch(Message::NameChanged(name.to_string())).await;
    driver.dispatch(Message::SubmitName).await;
}
