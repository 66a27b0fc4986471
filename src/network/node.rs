//! Graph nodes and links.

use serde::Serialize;

/// One rendered page in the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphNode {
    pub id: String,
    /// Insertion order, kept across updates.
    pub seq: usize,
    /// Display title.
    pub name: String,
    /// Root-relative page URL.
    pub url: String,
    /// Vault path of the source note.
    #[serde(skip)]
    pub path: String,
    /// Snapshot of the note's tags at registration time.
    pub tags: Vec<String>,
    /// Ids of nodes linking here.
    pub inward: Vec<String>,
    /// Ids of nodes this page links to.
    pub outward: Vec<String>,
}

impl GraphNode {
    /// A node with empty adjacency; `seq` is assigned on insertion.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        url: impl Into<String>,
        path: impl Into<String>,
        tags: Vec<String>,
    ) -> Self {
        Self {
            id: id.into(),
            seq: 0,
            name: name.into(),
            url: url.into(),
            path: path.into(),
            tags,
            inward: Vec::new(),
            outward: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
    Reference,
    Inclusion,
}

/// Directed edge between two node ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphLink {
    pub source: String,
    pub target: String,
    #[serde(rename = "kind")]
    pub link_type: LinkType,
}

impl GraphLink {
    pub fn new(source: impl Into<String>, target: impl Into<String>, link_type: LinkType) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            link_type,
        }
    }
}
