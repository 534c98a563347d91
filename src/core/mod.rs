pub mod bridge;
pub mod compliance;
pub mod evidence;
pub mod generation;
pub mod llm;
pub mod memory;
pub mod rts;
pub mod terminal;
pub mod view;
pub mod workspace;
