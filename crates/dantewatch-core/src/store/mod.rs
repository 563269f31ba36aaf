// ── Device storage ──

mod cache;
mod refresh;

pub use cache::DeviceCache;
