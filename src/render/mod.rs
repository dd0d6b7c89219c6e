//! Emission of a finished configuration tree.

pub mod ini;

pub use ini::render_ini;
