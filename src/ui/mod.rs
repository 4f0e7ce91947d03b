pub mod icons;
pub mod input;
pub mod layout;
pub mod render;
pub mod trigger;
pub mod wayland;
