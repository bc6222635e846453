//! mapclip3d - Project a captured map snapshot onto a 3D mesh clipped to a drawn polygon

pub mod cancel;
pub mod capture;
pub mod config;
pub mod domain;
pub mod geometry;
pub mod mesh;
pub mod pipeline;
pub mod texture;
