pub mod taskbar;
pub mod timer;
pub mod window_system;

pub use taskbar::create_taskbar;
