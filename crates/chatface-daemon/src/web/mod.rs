//! JSON control API.

use axum::{
    extract::{Json, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chatface_hw::{Button, ButtonEvent};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::warn;

use crate::state::AppState;

/// Creates the web router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/status", get(status))
        .route("/face", post(face_set))
        .route("/status-hidden", post(status_hidden_set))
        .route("/button", post(button_press))
        .route("/charging", post(charging_set))
        .route("/brightness", post(brightness_set))
        .route("/lcd.png", get(lcd_png))
        .with_state(state)
}

/// Maps an application error to a response. A busy display lock is
/// reported as 503 so clients can retry.
fn error_response(context: &str, e: anyhow::Error) -> Response {
    let code = match e.downcast_ref::<chatface_core::Error>() {
        Some(chatface_core::Error::LockTimeout(_)) => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    warn!("{}: {:#}", context, e);
    (
        code,
        Json(json!({ "error": format!("{}: {:#}", context, e) })),
    )
        .into_response()
}

fn bad_request(message: String) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
}

/// GET /status - Display, audio and power status
async fn status(State(state): State<Arc<AppState>>) -> Response {
    match state.status() {
        Ok(status) => Json(status).into_response(),
        Err(e) => error_response("Failed to read status", e),
    }
}

#[derive(Deserialize)]
struct FaceRequest {
    emotion: String,
}

/// POST /face - Switch emotion; unknown names show the default face
async fn face_set(
    State(state): State<Arc<AppState>>,
    Json(request): Json<FaceRequest>,
) -> Response {
    match state.set_face(&request.emotion) {
        Ok(emotion) => Json(json!({ "emotion": emotion, "code": emotion.code() })).into_response(),
        Err(e) => error_response("Failed to set face", e),
    }
}

#[derive(Deserialize)]
struct StatusHiddenRequest {
    hidden: bool,
}

/// POST /status-hidden - Show or hide the status bar
async fn status_hidden_set(
    State(state): State<Arc<AppState>>,
    Json(request): Json<StatusHiddenRequest>,
) -> Response {
    match state.set_status_hidden(request.hidden) {
        Ok(()) => Json(json!({ "hidden": request.hidden })).into_response(),
        Err(e) => error_response("Failed to set status bar", e),
    }
}

#[derive(Deserialize)]
struct ButtonRequest {
    button: String,
    event: String,
}

/// POST /button - Inject a button event
async fn button_press(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ButtonRequest>,
) -> Response {
    let button: Button = match request.button.parse() {
        Ok(button) => button,
        Err(e) => return bad_request(format!("{}", e)),
    };
    let event: ButtonEvent = match request.event.parse() {
        Ok(event) => event,
        Err(e) => return bad_request(format!("{}", e)),
    };

    match state.handle_button(button, event) {
        Ok(command) => Json(json!({ "command": command })).into_response(),
        Err(e) => error_response("Failed to handle button", e),
    }
}

#[derive(Deserialize)]
struct ChargingRequest {
    charging: bool,
}

/// POST /charging - Report charger status; charging disables power saving
async fn charging_set(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChargingRequest>,
) -> Response {
    match state.set_charging(request.charging) {
        Ok(()) => Json(json!({ "charging": request.charging })).into_response(),
        Err(e) => error_response("Failed to set charging", e),
    }
}

#[derive(Deserialize)]
struct BrightnessRequest {
    brightness: u8,
}

/// POST /brightness - Set and save the backlight level (0-100)
async fn brightness_set(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BrightnessRequest>,
) -> Response {
    let brightness = state.set_brightness(request.brightness);
    Json(json!({ "brightness": brightness })).into_response()
}

/// GET /lcd.png - Panel image as PNG
async fn lcd_png(State(state): State<Arc<AppState>>) -> Response {
    match state.screen_png() {
        Ok(png_data) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "image/png"),
                (header::CACHE_CONTROL, "no-cache"),
            ],
            png_data,
        )
            .into_response(),
        Err(e) => error_response("Failed to generate PNG", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::timer::TokioTimerDriver;
    use tokio::sync::mpsc;

    fn app_state() -> Arc<AppState> {
        let (fatal_tx, _fatal_rx) = mpsc::unbounded_channel();
        let timers = Arc::new(TokioTimerDriver::new(fatal_tx));
        Arc::new(AppState::new(Config::default(), timers).unwrap())
    }

    #[tokio::test]
    async fn test_face_and_status() {
        let state = app_state();
        let response = face_set(
            State(state.clone()),
            Json(FaceRequest {
                emotion: "happy".into(),
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = status(State(state.clone())).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            state.status().unwrap().display.animation.emotion,
            chatface_core::Emotion::Happy
        );
    }

    #[tokio::test]
    async fn test_bad_button_is_rejected() {
        let state = app_state();
        let response = button_press(
            State(state.clone()),
            Json(ButtonRequest {
                button: "power".into(),
                event: "click".into(),
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = button_press(
            State(state),
            Json(ButtonRequest {
                button: "boot".into(),
                event: "press-down".into(),
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_brightness_is_clamped() {
        let state = app_state();
        let response = brightness_set(
            State(state.clone()),
            Json(BrightnessRequest { brightness: 150 }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(state.status().unwrap().brightness, 100);
    }

    #[tokio::test]
    async fn test_lcd_png() {
        let state = app_state();
        state.render().unwrap();
        let response = lcd_png(State(state)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "image/png"
        );
    }

    #[test]
    fn test_error_codes() {
        let busy = anyhow::Error::from(chatface_core::Error::LockTimeout(
            std::time::Duration::from_millis(100),
        ))
        .context("Failed to read status");
        assert_eq!(
            error_response("status", busy).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );

        let broken = anyhow::anyhow!("panel released");
        assert_eq!(
            error_response("png", broken).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
