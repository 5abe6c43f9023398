pub mod constants;
pub mod entity;
pub mod entities;
pub mod error;
pub mod fluid;
pub mod noise_curve;
pub mod system;
pub mod temp_utils;
