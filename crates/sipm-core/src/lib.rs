pub mod binding;
pub mod common;
pub mod domain;
pub mod model;
pub mod numerics;
