//! Drive Group Evaluator
//!
//! Gathers a host's drive group, inventory and virtualization facts from
//! the collaborator ports and evaluates the drive group against them.

use super::drive_group::{DriveGroup, DriveGroupSelection};
use crate::domain::ports::{
    DriveGroupSourceRef, HostFactsSourceRef, InventorySourceRef, Role, Selection,
};
use crate::error::Result;
use crate::hardware::discovery::host_is_virtual;
use crate::hardware::selection::SelectorConfig;
use tracing::{debug, info};

/// Evaluates drive groups for hosts using pluggable sources
pub struct DriveGroupEvaluator {
    /// Device inventory per host
    inventory: InventorySourceRef,
    /// Drive group spec per host
    drive_groups: DriveGroupSourceRef,
    /// Virtualization facts
    facts: HostFactsSourceRef,
    /// Base selector settings; the virtualization flag is decided per host
    config: SelectorConfig,
}

impl DriveGroupEvaluator {
    pub fn new(
        inventory: InventorySourceRef,
        drive_groups: DriveGroupSourceRef,
        facts: HostFactsSourceRef,
        config: SelectorConfig,
    ) -> Self {
        Self {
            inventory,
            drive_groups,
            facts,
            config,
        }
    }

    /// Whether missing attributes are tolerated on `host`
    pub async fn virtual_tolerant(&self, host: &str) -> Result<bool> {
        let facts = self.facts.facts().await?;
        let flag = host_is_virtual(host, &facts);
        debug!("Host {} virtual: {}", host, flag);
        Ok(flag)
    }

    /// Evaluate the drive group of `host` against its inventory
    pub async fn evaluate(&self, host: &str) -> Result<DriveGroupSelection> {
        let spec = self.drive_groups.drive_group(host).await?;
        let inventory = self.inventory.inventory(host).await?;
        let virtual_tolerant = self.virtual_tolerant(host).await?;

        info!(
            "Evaluating drive group for {} over {} devices",
            host,
            inventory.len()
        );

        let config = self.config.clone().virtual_tolerant(virtual_tolerant);
        DriveGroup::new(config).evaluate(host, &spec, &inventory)
    }

    /// Evaluate a single role of the drive group of `host`
    pub async fn evaluate_role(&self, host: &str, role: Role) -> Result<Selection> {
        let spec = self.drive_groups.drive_group(host).await?;
        let inventory = self.inventory.inventory(host).await?;
        let virtual_tolerant = self.virtual_tolerant(host).await?;

        let config = self.config.clone().virtual_tolerant(virtual_tolerant);
        DriveGroup::new(config).evaluate_role(host, role, &spec, &inventory)
    }
}
