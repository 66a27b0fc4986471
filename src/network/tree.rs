//! NetworkTree.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;

use super::{GraphLink, GraphNode};
use crate::config::SlugMode;
use crate::utils::path::slug::slugify;

#[derive(Debug, Default)]
pub struct NetworkTree {
    nodes: Vec<GraphNode>,
    by_id: FxHashMap<String, usize>,
    by_slug: FxHashMap<String, usize>,
    links: Vec<GraphLink>,
    link_keys: FxHashSet<(String, String)>,
}

/// Serialized form written to `graph.json`.
#[derive(Debug, Serialize)]
pub struct GraphExport<'a> {
    pub nodes: Vec<&'a GraphNode>,
    pub links: Vec<&'a GraphLink>,
}

impl NetworkTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or update a node by id.
    ///
    /// An update replaces the metadata but keeps the original sequence
    /// number and adjacency. Returns the sequence number.
    pub fn add_node(&mut self, mut node: GraphNode) -> usize {
        if let Some(&pos) = self.by_id.get(&node.id) {
            let existing = &mut self.nodes[pos];
            node.seq = existing.seq;
            node.inward = std::mem::take(&mut existing.inward);
            node.outward = std::mem::take(&mut existing.outward);
            *existing = node;
            return pos;
        }

        let seq = self.nodes.len();
        node.seq = seq;
        self.by_id.insert(node.id.clone(), seq);
        self.nodes.push(node);
        seq
    }

    /// Insert a link unless one with the same (source, target) exists.
    pub fn add_link(&mut self, link: GraphLink) -> bool {
        let key = (link.source.clone(), link.target.clone());
        if !self.link_keys.insert(key) {
            return false;
        }
        self.links.push(link);
        true
    }

    /// Build the id and slugified-id lookup tables.
    pub fn compile_lookup(&mut self, mode: SlugMode) {
        self.by_id.clear();
        self.by_slug.clear();
        for (pos, node) in self.nodes.iter().enumerate() {
            self.by_id.insert(node.id.clone(), pos);
            self.by_slug.entry(slugify(&node.id, mode)).or_insert(pos);
        }
    }

    /// Fill inward/outward adjacency from the link list.
    ///
    /// Adjacency is rebuilt from scratch, so calling this again gives the
    /// same result. Links to ids without a node and self-links are skipped.
    pub fn compute_crosslinks(&mut self) {
        for node in &mut self.nodes {
            node.inward.clear();
            node.outward.clear();
        }

        for link in &self.links {
            if link.source == link.target {
                continue;
            }
            let (Some(&source), Some(&target)) =
                (self.by_id.get(&link.source), self.by_id.get(&link.target))
            else {
                continue;
            };
            push_unique(&mut self.nodes[source].outward, &link.target);
            push_unique(&mut self.nodes[target].inward, &link.source);
        }
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.by_id.get(id).map(|&pos| &self.nodes[pos])
    }

    pub fn node_by_slug(&self, slug: &str) -> Option<&GraphNode> {
        self.by_slug.get(slug).map(|&pos| &self.nodes[pos])
    }

    /// Nodes linking to `id`, in link insertion order.
    pub fn backlinks(&self, id: &str) -> Vec<&GraphNode> {
        self.node(id)
            .map(|node| node.inward.iter().filter_map(|src| self.node(src)).collect())
            .unwrap_or_default()
    }

    /// Nodes in sequence order.
    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn links(&self) -> &[GraphLink] {
        &self.links
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes plus the links whose both ends are nodes.
    pub fn export(&self) -> GraphExport<'_> {
        GraphExport {
            nodes: self.nodes.iter().collect(),
            links: self
                .links
                .iter()
                .filter(|l| self.by_id.contains_key(&l.source) && self.by_id.contains_key(&l.target))
                .collect(),
        }
    }
}

fn push_unique(list: &mut Vec<String>, id: &str) {
    if !list.iter().any(|existing| existing == id) {
        list.push(id.to_string());
    }
}
