//! Image region tagging: draw rectangular selections over uploaded
//! images, label them with user-defined tags, and export the bounding
//! boxes as JSON for downstream dataset tooling.

pub mod app;
pub mod canvas;
pub mod export;
pub mod geometry;
pub mod hit;
pub mod session;
pub mod viewport;
pub mod workspace;
