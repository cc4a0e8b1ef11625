pub mod geometry;
pub mod prerender;
