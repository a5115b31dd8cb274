mod stale;
pub use stale::stale;
