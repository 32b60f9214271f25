use std::collections::HashMap;
use std::sync::Arc;

use planilha_core::Tenant;
use tokio::sync::{OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock};

/// One reader/writer lock per registered tenant.
///
/// Writers (cell writes, clears, imports, housekeeping) are exclusive per
/// tenant; readers of the same tenant wait for them, so nobody observes a
/// half-replaced grid. Different tenants never contend.
pub struct TenantLocks {
    locks: HashMap<Tenant, Arc<RwLock<()>>>,
}

impl TenantLocks {
    pub fn new() -> Self {
        let locks = Tenant::all()
            .map(|tenant| (tenant, Arc::new(RwLock::new(()))))
            .collect();
        Self { locks }
    }

    /// Shared access to a tenant's dataset
    pub async fn read(&self, tenant: Tenant) -> OwnedRwLockReadGuard<()> {
        Arc::clone(self.lock(tenant)).read_owned().await
    }

    /// Exclusive access to a tenant's dataset
    pub async fn write(&self, tenant: Tenant) -> OwnedRwLockWriteGuard<()> {
        Arc::clone(self.lock(tenant)).write_owned().await
    }

    fn lock(&self, tenant: Tenant) -> &Arc<RwLock<()>> {
        // Tenants can only be built from the registry, which seeded the map.
        &self.locks[&tenant]
    }

    /// Get lock count
    pub fn count(&self) -> usize {
        self.locks.len()
    }
}

impl Default for TenantLocks {
    fn default() -> Self {
        Self::new()
    }
}
