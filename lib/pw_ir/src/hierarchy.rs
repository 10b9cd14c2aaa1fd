//! Classes hierarchy graph representation.

use crate::errors::{IrError, IrResult};
use crate::program::{ClassUid, Program};
use petgraph::algo::is_cyclic_directed;
use petgraph::dot::{Config, Dot};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Dfs, EdgeRef, Reversed};
use petgraph::Direction;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use Direction::{Incoming, Outgoing};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inheritance {
    Extends,
    Implements,
}

impl fmt::Display for Inheritance {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Extends => write!(f, "<extends>"),
            Self::Implements => write!(f, "<implements>"),
        }
    }
}

/// Edges go from a class to its direct parents.
#[derive(Debug, Default)]
pub struct Hierarchy {
    inner: DiGraph<ClassUid, Inheritance>,
    node_ids: BTreeMap<ClassUid, NodeIndex>,
}

impl Hierarchy {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert_class(&mut self, class: ClassUid) -> IrResult<()> {
        if self.node_ids.contains_key(&class) {
            return Err(IrError::Internal(
                "duplicate object in hierarchy graph".to_string(),
            ));
        }
        let id = self.inner.add_node(class);
        self.node_ids.insert(class, id);
        Ok(())
    }

    pub(crate) fn insert_extends(&mut self, class: ClassUid, superclass: ClassUid) -> IrResult<()> {
        if self.superclass(class).is_some() {
            return Err(IrError::Internal(format!(
                "class {class} already has a superclass"
            )));
        }
        self.insert_link(class, superclass, Inheritance::Extends)
    }

    pub(crate) fn insert_implements(&mut self, class: ClassUid, interface: ClassUid) -> IrResult<()> {
        self.insert_link(class, interface, Inheritance::Implements)
    }

    fn insert_link(&mut self, from: ClassUid, to: ClassUid, link: Inheritance) -> IrResult<()> {
        let src = self.node(from)?;
        let dst = self.node(to)?;
        self.inner.add_edge(src, dst, link);
        Ok(())
    }

    fn node(&self, class: ClassUid) -> IrResult<NodeIndex> {
        self.node_ids
            .get(&class)
            .copied()
            .ok_or_else(|| IrError::ClassNotFound(class.to_string()))
    }

    /// Makes every class without parent inherit from `root`, and checks
    /// that the resulting graph has no inheritance cycle.
    pub(crate) fn close(&mut self, root: ClassUid, program: &Program) -> IrResult<()> {
        let id_orphans: Vec<NodeIndex> = self
            .inner
            .externals(Outgoing)
            .filter(|id| self.inner[*id] != root)
            .collect();

        for id in id_orphans {
            let class = self.inner[id];
            log::debug!(
                "add missing java.lang.Object inheritance to {}",
                program[class].name()
            );
            self.insert_extends(class, root)?;
        }

        if is_cyclic_directed(&self.inner) {
            return Err(IrError::Internal("cyclic class hierarchy".to_string()));
        }
        Ok(())
    }

    #[must_use]
    pub fn contains_class(&self, class: ClassUid) -> bool {
        self.node_ids.contains_key(&class)
    }

    /// The direct superclass of a class, `None` for the hierarchy root.
    #[must_use]
    pub fn superclass(&self, class: ClassUid) -> Option<ClassUid> {
        let id = self.node_ids.get(&class)?;
        self.inner
            .edges_directed(*id, Outgoing)
            .find(|edge| *edge.weight() == Inheritance::Extends)
            .map(|edge| self.inner[edge.target()])
    }

    /// The interfaces directly implemented (or extended, for an interface) by a class.
    #[must_use]
    pub fn interfaces(&self, class: ClassUid) -> Vec<ClassUid> {
        let Some(id) = self.node_ids.get(&class) else {
            return Vec::new();
        };
        let mut interfaces: Vec<ClassUid> = self
            .inner
            .edges_directed(*id, Outgoing)
            .filter(|edge| *edge.weight() == Inheritance::Implements)
            .map(|edge| self.inner[edge.target()])
            .collect();
        interfaces.sort();
        interfaces
    }

    /// The classes and interfaces that directly inherit from `class`.
    #[must_use]
    pub fn direct_subtypes(&self, class: ClassUid) -> BTreeSet<ClassUid> {
        let Some(id) = self.node_ids.get(&class) else {
            return BTreeSet::new();
        };
        self.inner
            .neighbors_directed(*id, Incoming)
            .map(|n| self.inner[n])
            .collect()
    }

    /// All the parents of a class, including itself.
    #[must_use]
    pub fn all_parents(&self, class: ClassUid) -> BTreeSet<ClassUid> {
        let mut parents = BTreeSet::new();
        let Some(id) = self.node_ids.get(&class) else {
            return parents;
        };
        let mut dfs = Dfs::new(&self.inner, *id);
        while let Some(id) = dfs.next(&self.inner) {
            parents.insert(self.inner[id]);
        }
        parents
    }

    /// All the transitive subtypes of a class, including itself.
    #[must_use]
    pub fn all_subtypes(&self, class: ClassUid) -> BTreeSet<ClassUid> {
        let mut subtypes = BTreeSet::new();
        let Some(id) = self.node_ids.get(&class) else {
            return subtypes;
        };
        let reversed = Reversed(&self.inner);
        let mut dfs = Dfs::new(reversed, *id);
        while let Some(id) = dfs.next(reversed) {
            subtypes.insert(self.inner[id]);
        }
        subtypes
    }

    #[must_use]
    pub fn is_subtype(&self, class: ClassUid, parent: ClassUid) -> bool {
        class == parent || self.all_parents(class).contains(&parent)
    }

    #[must_use]
    pub fn to_dot(&self, program: &Program) -> String {
        let named = self
            .inner
            .map(|_, class| program[*class].name().to_string(), |_, link| *link);
        format!(
            "{}",
            Dot::with_attr_getters(
                &named,
                &[Config::EdgeNoLabel],
                &|_, edge| {
                    let style = match edge.weight() {
                        Inheritance::Extends => "solid",
                        Inheritance::Implements => "dashed",
                    };
                    format!("arrowType=empty,style={style}")
                },
                &|_, (id, _)| {
                    let class = &program[self.inner[id]];
                    let (color, shape) = if class.is_defined() {
                        if class.is_interface() {
                            ("#00000088", "box")
                        } else {
                            ("black", "box")
                        }
                    } else {
                        ("black", "none")
                    };
                    format!("color={color},shape={shape}")
                }
            )
        )
    }
}
