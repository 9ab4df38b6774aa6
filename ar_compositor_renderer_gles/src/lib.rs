/*!
# AR Compositor - OpenGL ES Backend

OpenGL ES 3.0 implementation of the `ar_compositor` graphics API boundary,
built on the `gl` bindings crate.

The constant translation table lives in `gles_format`; `GlesGraphicsApi`
forwards each call to the driver unchanged.

## Example

```no_run
use std::sync::{Arc, Mutex};
use ar_compositor::ar::{RenderConfig, graphics_api::SharedGraphicsApi, render::RenderContext};
use ar_compositor_renderer_gles::GlesGraphicsApi;

# fn get_proc_address(_name: &str) -> *const std::ffi::c_void { std::ptr::null() }
let api: SharedGraphicsApi = Arc::new(Mutex::new(GlesGraphicsApi::load_with(get_proc_address)));
let ctx = RenderContext::new(api, RenderConfig::default());
```
*/

mod gles_graphics_api;
pub mod gles_format;

pub use gles_graphics_api::GlesGraphicsApi;
