use folio_core_health_contracts::{HealthFeatureService, HealthStatus};
use folio_shared_contracts::time::TimeService;

/// Liveness check. Only the process answering is verified here, the smtp
/// relay is checked once at startup.
#[derive(Debug, Clone)]
pub struct HealthFeatureServiceImpl<Time> {
    time: Time,
}

impl<Time> HealthFeatureServiceImpl<Time> {
    pub fn new(time: Time) -> Self {
        Self { time }
    }
}

impl<Time> HealthFeatureService for HealthFeatureServiceImpl<Time>
where
    Time: TimeService,
{
    async fn get_status(&self) -> HealthStatus {
        HealthStatus {
            timestamp: self.time.now(),
        }
    }
}
