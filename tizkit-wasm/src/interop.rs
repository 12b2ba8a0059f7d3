use js_sys::{Float32Array, Object, Reflect, Uint32Array, Uint8Array};
use serde::Serialize;
use wasm_bindgen::JsValue;

/// Plain JS object with the given own properties.
pub fn object(fields: &[(&str, JsValue)]) -> JsValue {
    let obj = Object::new();
    for (key, value) in fields {
        let _ = Reflect::set(&obj, &JsValue::from_str(key), value);
    }
    obj.into()
}

// Typed-array copies handed to the canvas renderer
pub fn u32s(v: &[u32]) -> JsValue {
    Uint32Array::from(v).into()
}
pub fn f32s(v: &[f32]) -> JsValue {
    Float32Array::from(v).into()
}
pub fn u8s(v: &[u8]) -> JsValue {
    Uint8Array::from(v).into()
}

#[inline]
pub fn num(v: impl Into<f64>) -> JsValue {
    JsValue::from_f64(v.into())
}

/// Plain JS objects (not `Map`s) for anything serde can serialize.
pub fn to_js<T: Serialize + ?Sized>(v: &T) -> JsValue {
    v.serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .unwrap_or(JsValue::NULL)
}
