#![forbid(unsafe_code)]

use seanet_core::{ConfigError, SceneConfig, SeaError};
use tracing::Level;
use wasm_bindgen::prelude::*;
use web_sys::HtmlCanvasElement;

use crate::console::init_logging;
use crate::driver::{App, Driver};

const NO_CONTEXT_ALERT: &str =
    "Unable to initialize WebGPU. Your browser or machine may not support it.";

fn to_js(err: &SeaError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Scene options from JS. `undefined`/`null` keep every default.
fn parse_options(options: Option<JsValue>) -> Result<SceneConfig, SeaError> {
    let Some(value) = options.filter(|v| !v.is_undefined() && !v.is_null()) else {
        return Ok(SceneConfig::default());
    };
    let json: String = js_sys::JSON::stringify(&value)
        .map_err(|e| ConfigError::Unserializable(format!("{e:?}")))?
        .into();
    Ok(SceneConfig::from_json_str(&json)?)
}

/// The animated text sea, bound to one `<canvas>`.
#[wasm_bindgen]
pub struct SeaOfNet {
    driver: Option<Driver>,
}

#[wasm_bindgen]
impl SeaOfNet {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self { driver: None }
    }

    /// Set up WebGPU on `canvas`, start loading fonts and content, and begin
    /// animating. Resolves once the loop is running; assets keep loading in
    /// the background.
    pub async fn init(
        &mut self,
        canvas: HtmlCanvasElement,
        options: Option<JsValue>,
    ) -> Result<(), JsValue> {
        init_logging(if cfg!(debug_assertions) {
            Level::DEBUG
        } else {
            Level::INFO
        });
        self.destroy();

        let config = parse_options(options).map_err(|e| to_js(&e))?;
        let app = match App::new(canvas, config).await {
            Ok(app) => app,
            Err(err) => {
                tracing::error!(error = %err, "initialisation failed");
                if matches!(err, SeaError::RenderContextUnavailable(_)) {
                    if let Some(window) = web_sys::window() {
                        let _ = window.alert_with_message(NO_CONTEXT_ALERT);
                    }
                }
                return Err(to_js(&err));
            }
        };

        let mut driver = Driver::new(app);
        driver.start().map_err(|e| to_js(&e))?;
        self.driver = Some(driver);
        Ok(())
    }

    /// Refetch the page content. The current text stays up until it lands.
    pub fn reload(&self) {
        if let Some(driver) = &self.driver {
            driver.reload();
        }
    }

    /// Stop animating and release the canvas and GPU resources.
    pub fn destroy(&mut self) {
        if let Some(mut driver) = self.driver.take() {
            driver.stop();
        }
    }
}
