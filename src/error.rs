//! Error types shared by the DOM glue and the console.

use thiserror::Error;
use wasm_bindgen::JsValue;

/// Failures that can surface while wiring the site into the page.
///
/// Nearly all of these are logged and skipped by the caller; only a missing
/// `window` / `document` at startup is reported back to JS.
#[derive(Debug, Error)]
pub enum SiteError {
    #[error("missing DOM element: {0}")]
    MissingElement(&'static str),
    #[error("javascript error: {0}")]
    Js(String),
    #[error("preference store error: {0}")]
    Storage(String),
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl From<JsValue> for SiteError {
    fn from(value: JsValue) -> Self {
        SiteError::Js(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}

impl From<SiteError> for JsValue {
    fn from(err: SiteError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

/// Errors from the `calc` command. These only ever become console lines.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    #[error("invalid characters")]
    InvalidCharacters,
    #[error("empty expression")]
    Empty,
    #[error("unexpected token at {0}")]
    UnexpectedToken(usize),
    #[error("unbalanced parentheses")]
    Unbalanced,
    #[error("division by zero")]
    DivisionByZero,
    #[error("expression too deeply nested")]
    TooDeep,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calc_errors_render_as_console_text() {
        assert_eq!(CalcError::InvalidCharacters.to_string(), "invalid characters");
        assert_eq!(CalcError::UnexpectedToken(3).to_string(), "unexpected token at 3");
    }

    #[test]
    fn missing_element_names_the_target() {
        let err = SiteError::MissingElement("animationCanvas");
        assert_eq!(err.to_string(), "missing DOM element: animationCanvas");
    }
}
