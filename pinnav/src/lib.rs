// Include handlers module directly from handlers.rs
#[path = "handlers.rs"]
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{
    StampSettings, UpdateReport, UpdateSettings, build_options, expand_path, run_analyze,
    run_convert, run_update, selection_from_flags,
};
