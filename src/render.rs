pub mod compositor;
pub mod surface;
