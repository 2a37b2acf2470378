//! Virtualization Detection
//!
//! Decides from host facts whether missing device attributes should be
//! tolerated. Inventory on virtual machines is sourced from the hypervisor's
//! device layer, which leaves fields such as the model unpopulated.

use crate::domain::ports::HostFacts;
use std::collections::BTreeMap;
use tracing::debug;

/// Fact value reported by bare-metal hosts
pub const PHYSICAL: &str = "physical";

impl HostFacts {
    pub fn physical() -> Self {
        Self {
            virtualization: Some(PHYSICAL.to_string()),
        }
    }

    pub fn virtualized(kind: impl Into<String>) -> Self {
        Self {
            virtualization: Some(kind.into()),
        }
    }

    /// A host is virtual unless it reports itself as physical
    pub fn is_virtual(&self) -> bool {
        self.virtualization.as_deref() != Some(PHYSICAL)
    }
}

/// Whether any host in `facts` is virtual
pub fn any_virtual(facts: &BTreeMap<String, HostFacts>) -> bool {
    let mut flag = false;
    for (host, host_facts) in facts {
        if host_facts.is_virtual() {
            debug!("Host {} seems to be a VM", host);
            flag = true;
        }
    }
    flag
}

/// Virtualization flag for `host`
///
/// Uses the host's own facts when present, otherwise falls back to whether
/// any host in scope is virtual.
pub fn host_is_virtual(host: &str, facts: &BTreeMap<String, HostFacts>) -> bool {
    match facts.get(host) {
        Some(host_facts) => host_facts.is_virtual(),
        None => any_virtual(facts),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facts(entries: &[(&str, HostFacts)]) -> BTreeMap<String, HostFacts> {
        entries
            .iter()
            .map(|(host, facts)| (host.to_string(), facts.clone()))
            .collect()
    }

    #[test]
    fn test_is_virtual() {
        assert!(!HostFacts::physical().is_virtual());
        assert!(HostFacts::virtualized("kvm").is_virtual());
        assert!(HostFacts::default().is_virtual());
    }

    #[test]
    fn test_any_virtual() {
        let mixed = facts(&[
            ("minion1", HostFacts::physical()),
            ("minion2", HostFacts::virtualized("kvm")),
        ]);
        assert!(any_virtual(&mixed));

        let physical = facts(&[("minion1", HostFacts::physical())]);
        assert!(!any_virtual(&physical));

        assert!(!any_virtual(&BTreeMap::new()));
    }

    #[test]
    fn test_host_is_virtual() {
        let mixed = facts(&[
            ("minion1", HostFacts::physical()),
            ("minion2", HostFacts::virtualized("VirtualBox")),
        ]);
        assert!(!host_is_virtual("minion1", &mixed));
        assert!(host_is_virtual("minion2", &mixed));
        assert!(host_is_virtual("minion3", &mixed));
    }

    #[test]
    fn test_facts_from_json() {
        let parsed: BTreeMap<String, HostFacts> =
            serde_json::from_str(r#"{"node1": {"virtual": "physical"}, "node2": {"virtual": "kvm", "os": "SUSE"}}"#)
                .unwrap();
        assert!(!parsed["node1"].is_virtual());
        assert!(parsed["node2"].is_virtual());
    }
}
