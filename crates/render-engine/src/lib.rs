//! CamScribe Render Engine
//!
//! Live compositing of webcam video and caption overlays, and export
//! of the finished recording.
//!
//! # Pipeline Architecture
//!
//! ```text
//! webcam frames ──┐
//!                 ├── FrameComposition (per refresh tick)
//! transcript ─────┤        │ resize / clear / draw frame
//! caption style ──┘        │ wrapped lines, stroke + fill
//!                          ▼
//!                     RenderSink (caption overlay / canvas)
//!                          │
//!                          ▼
//!                  Composite Stream → encoder → chunks
//! ```

pub mod compositor;
pub mod export;
pub mod render_loop;

pub use compositor::*;
pub use export::*;
pub use render_loop::*;
