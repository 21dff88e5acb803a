//! Draftforge Export Engine
//!
//! Turns an ordered clip timeline into a `draft_content.json` document for
//! an external video editor.
//!
//! ```text
//! timeline.json ──┐
//!                 ├── synthesize (catalogs, templates)
//! templates ──────┘         │
//!                           ├── validate
//!                           │
//!                           ▼
//!                  project folder / download
//! ```

pub mod engine;
pub mod paths;
pub mod pipeline;
pub mod sink;
pub mod template;
pub mod validate;

pub use engine::*;
pub use paths::*;
pub use pipeline::*;
pub use sink::*;
pub use template::*;
pub use validate::*;
