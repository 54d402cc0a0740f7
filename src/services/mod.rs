pub mod encoding;
pub mod lookup;
pub mod pipeline;
pub mod project;
pub mod qa;
pub mod rebuild;
pub mod sync;
pub mod translation_memory;
