// Git sync: command worker and the stage/commit/push synchronizer.

pub mod sync;
pub mod worker;
