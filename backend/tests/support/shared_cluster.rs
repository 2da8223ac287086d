//! One embedded PostgreSQL cluster per test binary.
//!
//! `pg-embed-setup-unpriv` keeps the shared cluster alive for the life of the
//! process; this wrapper adds start-up retries and pins the superuser
//! password so a reused data directory still accepts connections.

use std::time::Duration;

use pg_embedded_setup_unpriv::{BootstrapResult, ClusterHandle};

const SHARED_CLUSTER_RETRIES: usize = 5;
const SHARED_CLUSTER_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Returns the process-wide cluster, bootstrapping it on first use.
pub fn shared_cluster_handle() -> BootstrapResult<&'static ClusterHandle> {
    ensure_stable_password();
    let mut attempt = 1;
    loop {
        match pg_embedded_setup_unpriv::test_support::shared_cluster_handle() {
            Ok(handle) => return Ok(handle),
            Err(error) if attempt >= SHARED_CLUSTER_RETRIES => return Err(error),
            Err(_) => {
                std::thread::sleep(SHARED_CLUSTER_RETRY_DELAY);
                attempt += 1;
            }
        }
    }
}

/// `initdb` only runs for a fresh data directory, so a random password per
/// process would lock later runs out of an existing cluster.
fn ensure_stable_password() {
    if std::env::var_os("PG_PASSWORD").is_none() {
        // SAFETY: runs before the cluster bootstrap spawns any threads.
        unsafe {
            std::env::set_var("PG_PASSWORD", "moneysaver_embedded_test");
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for cluster bootstrap helpers.

    #[test]
    fn ensure_stable_password_keeps_an_existing_value() {
        let _guard = env_lock::lock_env([("PG_PASSWORD", Some("custom_value"))]);

        super::ensure_stable_password();

        assert_eq!(
            std::env::var("PG_PASSWORD").expect("PG_PASSWORD should be set"),
            "custom_value"
        );
    }
}
