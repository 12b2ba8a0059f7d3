use crate::interop::{num, object};
use tizkit::DiagramError;
use wasm_bindgen::prelude::*;

pub fn ok(value: JsValue) -> JsValue {
    object(&[("ok", JsValue::TRUE), ("value", value)])
}

pub fn err(code: &str, message: impl Into<String>, data: Option<JsValue>) -> JsValue {
    let mut fields = vec![
        ("code", JsValue::from_str(code)),
        ("message", JsValue::from_str(&message.into())),
    ];
    if let Some(d) = data {
        fields.push(("data", d));
    }
    object(&[("ok", JsValue::FALSE), ("error", object(&fields))])
}

/// Envelope for a core error, with the offending parameter or id attached.
pub fn from_diagram(e: &DiagramError) -> JsValue {
    let data = match e {
        DiagramError::InvalidId { kind, id } => {
            Some(object(&[("kind", JsValue::from_str(kind)), ("id", num(*id))]))
        }
        DiagramError::SelfConnection { node } => Some(object(&[("node", num(*node))])),
        DiagramError::NonFinite { param } => Some(object(&[("param", JsValue::from_str(param))])),
        DiagramError::OutOfRange { param, min, max, got } => Some(object(&[
            ("param", JsValue::from_str(param)),
            ("min", num(*min)),
            ("max", num(*max)),
            ("got", num(*got)),
        ])),
        DiagramError::DanglingConnection { connection, node } => {
            Some(object(&[("connection", num(*connection)), ("node", num(*node))]))
        }
        DiagramError::DuplicateId { kind, id } => {
            Some(object(&[("kind", JsValue::from_str(kind)), ("id", num(*id))]))
        }
        DiagramError::CapsExceeded { what, max } => {
            Some(object(&[("what", JsValue::from_str(what)), ("max", num(*max as f64))]))
        }
        _ => None,
    };
    err(e.code(), e.to_string(), data)
}

pub fn from_result<T: Into<JsValue>>(r: tizkit::Result<T>) -> JsValue {
    match r {
        Ok(v) => ok(v.into()),
        Err(e) => from_diagram(&e),
    }
}

#[inline]
pub fn invalid_payload(message: impl Into<String>) -> JsValue {
    err("invalid_payload", message, None)
}
