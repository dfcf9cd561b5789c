//! # ta-render
//!
//! Invokes the rendering engine on a script file.
//!
//! ```text
//! manim -ql --media_dir <out>/media -o <base> <script> TheoremScene
//!   └──> <out>/media/videos/<base>/480p15/<base>.mp4
//! ```
//!
//! Each call is one awaited child process bounded by a timeout. A render
//! only succeeds when the video exists on disk afterwards.

pub mod config;
pub mod manim;

pub use config::RenderConfig;
pub use manim::{extract_render_error, ManimRenderer, RENDER_ERROR_CHARS_MAX};
