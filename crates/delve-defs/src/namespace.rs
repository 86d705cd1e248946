use serde::{Deserialize, Serialize};

use crate::element::Element;

/// Namespace URI bound to the reserved `server` prefix.
pub const SERVER_NAMESPACE: &str = "/server";

/// Namespace URI bound to the reserved `client` prefix.
pub const CLIENT_NAMESPACE: &str = "/client";

/// Which side of the client/server split a load is performed for.
///
/// Untagged content and content in any other namespace is always kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefinitionsNamespace {
    /// Keep client-tagged content, drop server-tagged content.
    Client,
    /// Keep server-tagged content, drop client-tagged content.
    Server,
    /// Keep everything.
    Shared,
}

impl DefinitionsNamespace {
    /// Returns true if server-tagged content survives this filter.
    pub fn includes_server(self) -> bool {
        matches!(self, Self::Server | Self::Shared)
    }

    /// Returns true if client-tagged content survives this filter.
    pub fn includes_client(self) -> bool {
        matches!(self, Self::Client | Self::Shared)
    }

    /// Returns true if a node in `namespace` survives this filter.
    pub fn accepts(self, namespace: Option<&str>) -> bool {
        match namespace {
            Some(SERVER_NAMESPACE) => self.includes_server(),
            Some(CLIENT_NAMESPACE) => self.includes_client(),
            _ => true,
        }
    }

    /// Remove every attribute and descendant element of `root` that this
    /// filter excludes. An excluded element goes with its whole subtree.
    ///
    /// `root` itself is never removed.
    pub fn purge(self, root: &mut Element) -> usize {
        if self == Self::Shared {
            return 0;
        }
        let mut removed = 0;
        purge_element(self, root, &mut removed);
        removed
    }
}

fn purge_element(filter: DefinitionsNamespace, elem: &mut Element, removed: &mut usize) {
    let before = elem.attributes.len() + elem.children.len();
    elem.attributes
        .retain(|a| filter.accepts(a.name.namespace()));
    elem.children.retain(|c| filter.accepts(c.name.namespace()));
    *removed += before - (elem.attributes.len() + elem.children.len());

    for child in &mut elem.children {
        purge_element(filter, child, removed);
    }
}
