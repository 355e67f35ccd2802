pub mod bridge;
pub mod dock;
pub mod geometry;
pub mod screen;
