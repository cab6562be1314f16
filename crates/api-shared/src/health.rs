use crate::dto::HealthRes;

/// Simple health service shared by the HTTP surfaces.
///
/// Provides a standardised way to check that the medassist service is up.
pub struct HealthService;

impl HealthService {
    /// Check health without creating an instance.
    ///
    /// The context is loaded before any server starts, so a running process is always able to
    /// diagnose.
    ///
    /// # Returns
    /// A `HealthRes` indicating the service is healthy.
    pub fn check_health() -> HealthRes {
        HealthRes {
            ok: true,
            message: "medassist is alive".into(),
        }
    }
}
