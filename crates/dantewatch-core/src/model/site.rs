// ── Domain (site) model ──

use serde::{Deserialize, Serialize};

/// Aggregate health of a domain as reported by the Director.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainStatus {
    pub clocking: Option<String>,
    pub connectivity: Option<String>,
    pub latency: Option<String>,
    pub subscriptions: Option<String>,
}

/// One Director domain, the unit of site selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Domain {
    pub id: String,
    pub name: String,
    pub device_ids: Vec<String>,
    pub status: DomainStatus,
}

/// Known domains plus the one currently selected.
///
/// The selection always refers to a domain in `domains`, or is unset
/// when no domains are known.
#[derive(Debug, Clone, Default)]
pub struct SiteSelection {
    domains: Vec<Domain>,
    current: Option<String>,
}

impl SiteSelection {
    /// Replace the domain list, keeping the selection if it still exists.
    ///
    /// Falls back to the first domain otherwise.
    pub fn replace(&mut self, domains: Vec<Domain>) {
        let keep = self
            .current
            .as_deref()
            .is_some_and(|id| domains.iter().any(|d| d.id == id));
        if !keep {
            self.current = domains.first().map(|d| d.id.clone());
        }
        self.domains = domains;
    }

    pub fn domains(&self) -> &[Domain] {
        &self.domains
    }

    pub fn current(&self) -> Option<&Domain> {
        let id = self.current.as_deref()?;
        self.domains.iter().find(|d| d.id == id)
    }

    /// Select a domain by display name. Returns the selected domain.
    pub fn select_by_name(&mut self, name: &str) -> Option<&Domain> {
        let idx = self.domains.iter().position(|d| d.name == name)?;
        self.current = Some(self.domains[idx].id.clone());
        self.domains.get(idx)
    }

    pub fn clear(&mut self) {
        self.domains.clear();
        self.current = None;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn domain(id: &str, name: &str) -> Domain {
        Domain {
            id: id.into(),
            name: name.into(),
            device_ids: Vec::new(),
            status: DomainStatus::default(),
        }
    }

    #[test]
    fn first_domain_selected_by_default() {
        let mut sites = SiteSelection::default();
        assert!(sites.current().is_none());

        sites.replace(vec![domain("a", "Site A"), domain("b", "Site B")]);
        assert_eq!(sites.current().unwrap().id, "a");
    }

    #[test]
    fn selection_survives_refresh() {
        let mut sites = SiteSelection::default();
        sites.replace(vec![domain("a", "Site A"), domain("b", "Site B")]);
        sites.select_by_name("Site B").unwrap();

        sites.replace(vec![domain("a", "Site A"), domain("b", "Site B (renamed)")]);
        assert_eq!(sites.current().unwrap().name, "Site B (renamed)");
    }

    #[test]
    fn vanished_selection_falls_back_to_first() {
        let mut sites = SiteSelection::default();
        sites.replace(vec![domain("a", "Site A"), domain("b", "Site B")]);
        sites.select_by_name("Site B").unwrap();

        sites.replace(vec![domain("c", "Site C")]);
        assert_eq!(sites.current().unwrap().id, "c");
    }

    #[test]
    fn unknown_name_leaves_selection_alone() {
        let mut sites = SiteSelection::default();
        sites.replace(vec![domain("a", "Site A")]);
        assert!(sites.select_by_name("Nowhere").is_none());
        assert_eq!(sites.current().unwrap().id, "a");
    }
}
