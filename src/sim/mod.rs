pub mod clock;
pub mod countdown;
pub mod event;
pub mod fireworks;
pub mod surface;
pub mod timer;
