//! Health check aggregation.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};

/// Health status for a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy)
    }
}

/// Component health state.
#[derive(Debug)]
pub struct ComponentHealth {
    name: &'static str,
    healthy: AtomicBool,
    message: parking_lot::RwLock<Option<String>>,
}

impl ComponentHealth {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            healthy: AtomicBool::new(false),
            message: parking_lot::RwLock::new(None),
        }
    }

    pub fn set_healthy(&self) {
        self.healthy.store(true, Ordering::Relaxed);
        *self.message.write() = None;
    }

    pub fn set_unhealthy(&self, msg: impl Into<String>) {
        self.healthy.store(false, Ordering::Relaxed);
        *self.message.write() = Some(msg.into());
    }

    pub fn is_healthy(&self) -> bool {
        self.healthy.load(Ordering::Relaxed)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn message(&self) -> Option<String> {
        self.message.read().clone()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub components: Vec<ComponentHealthReport>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealthReport {
    pub name: String,
    pub healthy: bool,
    pub message: Option<String>,
}

/// Global health registry: the database we checkpoint against and the
/// scoring service.
pub struct HealthRegistry {
    pub postgres: ComponentHealth,
    pub model: ComponentHealth,
}

impl HealthRegistry {
    pub const fn new() -> Self {
        Self {
            postgres: ComponentHealth::new("postgres"),
            model: ComponentHealth::new("model"),
        }
    }

    /// Generate a health report.
    pub fn report(&self) -> HealthReport {
        let components = vec![
            ComponentHealthReport {
                name: self.postgres.name().to_string(),
                healthy: self.postgres.is_healthy(),
                message: self.postgres.message(),
            },
            ComponentHealthReport {
                name: self.model.name().to_string(),
                healthy: self.model.is_healthy(),
                message: self.model.message(),
            },
        ];

        let all_healthy = components.iter().all(|c| c.healthy);
        let any_healthy = components.iter().any(|c| c.healthy);

        let status = if all_healthy {
            HealthStatus::Healthy
        } else if any_healthy {
            // The engine can limp along without the model (runs fail and
            // retry on the next trigger), not without the checkpoint store.
            HealthStatus::Degraded
        } else {
            HealthStatus::Unhealthy
        };

        HealthReport { status, components }
    }

    /// Whether the engine can make progress: the checkpoint store is the
    /// hard dependency.
    pub fn is_ready(&self) -> bool {
        self.postgres.is_healthy()
    }

    /// Whether the process is alive.
    pub fn is_alive(&self) -> bool {
        true
    }
}

impl Default for HealthRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Global health registry.
pub static HEALTH: std::sync::LazyLock<HealthRegistry> =
    std::sync::LazyLock::new(HealthRegistry::new);

/// Get the global health registry.
pub fn health() -> &'static HealthRegistry {
    &HEALTH
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degraded_when_only_model_is_down() {
        let registry = HealthRegistry::new();
        registry.postgres.set_healthy();
        registry.model.set_unhealthy("connection refused");

        let report = registry.report();
        assert_eq!(report.status, HealthStatus::Degraded);
        assert!(registry.is_ready());
    }

    #[test]
    fn unhealthy_when_postgres_is_down() {
        let registry = HealthRegistry::new();
        registry.postgres.set_unhealthy("pool exhausted");
        registry.model.set_unhealthy("down");

        assert_eq!(registry.report().status, HealthStatus::Unhealthy);
        assert!(!registry.is_ready());
    }
}
