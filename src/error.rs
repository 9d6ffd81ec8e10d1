#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Failed to allocate {width}x{height} atlas surface")]
    SurfaceAllocation { width: u32, height: u32 },
    #[error("Release without a matching outstanding acquire")]
    UnbalancedRelease,
}
