pub mod ring;
pub mod scheduler;
pub mod sound_loop;

pub use ring::{AlarmRing, RingState};
pub use scheduler::{local_now, next_fire_at, AlarmScheduler};
