use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Debug, Error)]
pub enum PageError {
    #[error("element `{0}` not found")]
    MissingElement(String),

    #[error("WebGL2 not supported")]
    WebGlUnavailable,

    #[error("shader compile failed: {0}")]
    Shader(String),

    #[error("program link failed: {0}")]
    Link(String),

    #[error("javascript error: {0}")]
    Js(String),
}

pub type Result<T> = std::result::Result<T, PageError>;

impl From<JsValue> for PageError {
    fn from(value: JsValue) -> Self {
        match value.as_string() {
            Some(message) => PageError::Js(message),
            None => PageError::Js(format!("{value:?}")),
        }
    }
}

impl From<PageError> for JsValue {
    fn from(err: PageError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}
