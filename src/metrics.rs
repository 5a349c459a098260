//! Prometheus counters for the link service.
//!
//! Covers cache behavior, redirect volume, link creation, API key
//! validation, and password gate outcomes. Exposition lives in the
//! handlers module at `/metrics`.

use prometheus::{Counter, CounterVec, Opts, Registry};

const NAMESPACE: &str = "linkgate";

fn counter(registry: &Registry, name: &str, help: &str) -> Result<Counter, prometheus::Error> {
    let c = Counter::with_opts(Opts::new(name, help).namespace(NAMESPACE))?;
    registry.register(Box::new(c.clone()))?;
    Ok(c)
}

fn counter_vec(
    registry: &Registry,
    name: &str,
    help: &str,
    labels: &[&str],
) -> Result<CounterVec, prometheus::Error> {
    let c = CounterVec::new(Opts::new(name, help).namespace(NAMESPACE), labels)?;
    registry.register(Box::new(c.clone()))?;
    Ok(c)
}

#[derive(Clone)]
pub struct AppMetrics {
    /// Labeled by cache_type: "link" or "api_key"
    pub cache_hits_total: CounterVec,
    pub cache_misses_total: CounterVec,
    /// Target and expiration-fallback redirects combined
    pub redirects_total: Counter,
    pub links_created_total: Counter,
    /// Labeled by result: "success" or "invalid"
    pub api_key_validations_total: CounterVec,
    pub password_verifications_total: CounterVec,
}

impl AppMetrics {
    /// Create and register every counter with the given registry.
    ///
    /// Registering twice against the same registry fails; the registry is
    /// built once at startup alongside this struct.
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        Ok(Self {
            cache_hits_total: counter_vec(
                registry,
                "cache_hits_total",
                "Total cache hits",
                &["cache_type"],
            )?,
            cache_misses_total: counter_vec(
                registry,
                "cache_misses_total",
                "Total cache misses",
                &["cache_type"],
            )?,
            redirects_total: counter(registry, "redirects_total", "Total redirects performed")?,
            links_created_total: counter(registry, "links_created_total", "Total links created")?,
            api_key_validations_total: counter_vec(
                registry,
                "api_key_validations_total",
                "Total API key validation attempts",
                &["result"],
            )?,
            password_verifications_total: counter_vec(
                registry,
                "password_verifications_total",
                "Total link password verification attempts",
                &["result"],
            )?,
        })
    }

    pub fn record_cache_hit(&self, cache_type: &str) {
        self.cache_hits_total.with_label_values(&[cache_type]).inc();
    }

    pub fn record_cache_miss(&self, cache_type: &str) {
        self.cache_misses_total
            .with_label_values(&[cache_type])
            .inc();
    }

    pub fn record_redirect(&self) {
        self.redirects_total.inc();
    }

    pub fn record_link_created(&self) {
        self.links_created_total.inc();
    }

    pub fn record_api_key_validation(&self, result: &str) {
        self.api_key_validations_total
            .with_label_values(&[result])
            .inc();
    }

    pub fn record_password_verification(&self, result: &str) {
        self.password_verifications_total
            .with_label_values(&[result])
            .inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let registry = Registry::new();
        let metrics = AppMetrics::new(&registry).unwrap();

        metrics.record_redirect();
        metrics.record_redirect();
        metrics.record_link_created();
        metrics.record_cache_hit("link");
        metrics.record_cache_miss("api_key");
        metrics.record_api_key_validation("success");
        metrics.record_password_verification("invalid");

        assert_eq!(metrics.redirects_total.get() as u64, 2);
        assert_eq!(metrics.links_created_total.get() as u64, 1);
        assert_eq!(
            metrics.cache_hits_total.with_label_values(&["link"]).get() as u64,
            1
        );
        assert_eq!(
            metrics
                .password_verifications_total
                .with_label_values(&["invalid"])
                .get() as u64,
            1
        );
    }

    #[test]
    fn gathered_families_carry_the_namespace() {
        let registry = Registry::new();
        let metrics = AppMetrics::new(&registry).unwrap();
        metrics.record_redirect();

        let families = registry.gather();
        assert!(families
            .iter()
            .any(|f| f.get_name() == "linkgate_redirects_total"));
    }

    #[test]
    fn double_registration_fails() {
        let registry = Registry::new();
        AppMetrics::new(&registry).unwrap();
        assert!(AppMetrics::new(&registry).is_err());
    }
}
