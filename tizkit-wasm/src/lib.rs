use wasm_bindgen::prelude::*;
mod api;
mod error;
mod interop;

pub use api::{resolve_anchor, set_panic_hook};

/// Browser handle over one diagram plus its editor-side state.
#[wasm_bindgen]
pub struct Diagram {
    pub(crate) inner: tizkit::Diagram,
    pub(crate) gesture: tizkit::ConnectGesture,
    pub(crate) sync: tizkit::LatexSync,
    pub(crate) tikz_opts: tizkit::TikzOptions,
    pub(crate) import_opts: tizkit::ImportOptions,
}

impl Diagram {
    pub fn rs_new() -> Diagram {
        Diagram {
            inner: tizkit::Diagram::new(),
            gesture: tizkit::ConnectGesture::default(),
            sync: tizkit::LatexSync::new(),
            tikz_opts: tizkit::TikzOptions::default(),
            import_opts: tizkit::ImportOptions::default(),
        }
    }
    pub fn rs_version(&self) -> u64 { self.inner.version() }
}
