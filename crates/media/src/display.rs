//! The display side of the pipeline: [render] turns a captured frame into a
//! [DisplayableImage] and [DisplayScheduler] polls the channels on every UI
//! tick, keeping a [DisplayState] up to date.

mod renderer;
mod scheduler;

pub use renderer::*;
pub use scheduler::*;
