//! Lazy computed-property graph
//!
//! A small pull-based evaluator for configuration objects: stored properties
//! are set directly, derived properties declare the set of property names
//! they compute from. Evaluation is demand-driven and memoized; setting a
//! stored property invalidates exactly the derived properties that
//! transitively depend on it.
//!
//! Compute functions receive only the values of their declared dependencies,
//! so a derived property cannot read state it did not declare. Dependency
//! edges live in a petgraph `DiGraph` (dep -> dependent); a declaration that
//! would close a cycle is rejected before it is committed.
//!
//! Derived properties may be re-declared. Platform variants use this to
//! override exactly the properties that are platform-specific while keeping
//! the rest of the base declarations.

use crate::error::{Error, Result};
use petgraph::algo;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Bfs, EdgeRef};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Values of a derived property's declared dependencies, keyed by name
pub type DepValues = HashMap<String, Value>;

type ComputeFn = Box<dyn Fn(&DepValues) -> Result<Value> + Send + Sync>;

enum Slot {
    Stored(Option<Value>),
    Derived { deps: Vec<String>, compute: ComputeFn },
}

/// Dependency-aware property store
pub struct PropertyGraph {
    slots: HashMap<String, Slot>,

    /// Dependency edges, dep -> dependent
    graph: DiGraph<String, ()>,

    /// Property name to graph node
    nodes: HashMap<String, NodeIndex>,

    /// Memoized derived values. Reads take `&self`, so a fully built
    /// configuration can be shared across concurrent publisher tasks.
    cache: Mutex<HashMap<String, Value>>,
}

impl PropertyGraph {
    pub fn new() -> Self {
        Self {
            slots: HashMap::new(),
            graph: DiGraph::new(),
            nodes: HashMap::new(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Declare a stored property with no value yet
    pub fn declare_stored(&mut self, name: &str) {
        self.ensure_node(name);
        self.slots.insert(name.to_string(), Slot::Stored(None));
    }

    /// Declare (or override) a derived property.
    ///
    /// Fails with [`Error::PropertyCycle`] when the declared dependency
    /// edges, followed transitively, would reach `name` itself; the graph is
    /// left unchanged in that case.
    pub fn declare_derived<F>(&mut self, name: &str, deps: &[&str], compute: F) -> Result<()>
    where
        F: Fn(&DepValues) -> Result<Value> + Send + Sync + 'static,
    {
        let node = self.ensure_node(name);
        for dep in deps {
            self.ensure_node(dep);
        }

        // Stage the edge rewrite on a copy so a rejected declaration leaves
        // the committed graph untouched.
        let mut staged = self.graph.clone();
        // Edge indices shift on removal, so old edges go one at a time.
        loop {
            let Some(edge) = staged
                .edges_directed(node, petgraph::Direction::Incoming)
                .map(|e| e.id())
                .next()
            else {
                break;
            };
            staged.remove_edge(edge);
        }
        for dep in deps {
            staged.add_edge(self.nodes[*dep], node, ());
        }

        if let Err(cycle) = algo::toposort(&staged, None) {
            let property = staged[cycle.node_id()].clone();
            return Err(Error::property_cycle(property));
        }

        self.graph = staged;
        self.slots.insert(
            name.to_string(),
            Slot::Derived {
                deps: deps.iter().map(|d| d.to_string()).collect(),
                compute: Box::new(compute),
            },
        );
        // An override invalidates whatever was memoized downstream of it.
        self.invalidate(name);
        Ok(())
    }

    /// Set a stored property and invalidate its transitive dependents
    pub fn set(&mut self, name: &str, value: Value) -> Result<()> {
        match self.slots.get_mut(name) {
            Some(Slot::Stored(slot)) => {
                *slot = Some(value);
                self.invalidate(name);
                Ok(())
            }
            Some(Slot::Derived { .. }) => Err(Error::NotStored {
                name: name.to_string(),
            }),
            None => Err(Error::unknown_property(name)),
        }
    }

    /// Read a property, evaluating and memoizing stale derived values
    pub fn get(&self, name: &str) -> Result<Value> {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        self.eval(name, &mut cache)
    }

    /// Whether a property with this name was declared
    pub fn contains(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    /// All declared property names, unordered
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.slots.keys().map(String::as_str)
    }

    fn eval(&self, name: &str, cache: &mut HashMap<String, Value>) -> Result<Value> {
        match self.slots.get(name) {
            None => Err(Error::unknown_property(name)),
            // An unset stored property reads as null, like any optional input.
            Some(Slot::Stored(value)) => Ok(value.clone().unwrap_or(Value::Null)),
            Some(Slot::Derived { deps, compute }) => {
                if let Some(hit) = cache.get(name) {
                    return Ok(hit.clone());
                }
                let mut values = DepValues::with_capacity(deps.len());
                for dep in deps {
                    values.insert(dep.clone(), self.eval(dep, cache)?);
                }
                let value = compute(&values)?;
                cache.insert(name.to_string(), value.clone());
                Ok(value)
            }
        }
    }

    fn ensure_node(&mut self, name: &str) -> NodeIndex {
        if let Some(idx) = self.nodes.get(name) {
            return *idx;
        }
        let idx = self.graph.add_node(name.to_string());
        self.nodes.insert(name.to_string(), idx);
        idx
    }

    /// Drop memoized values for everything reachable from `name`
    fn invalidate(&mut self, name: &str) {
        let Some(&start) = self.nodes.get(name) else {
            return;
        };
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        cache.remove(name);
        let mut bfs = Bfs::new(&self.graph, start);
        while let Some(node) = bfs.next(&self.graph) {
            if node != start {
                cache.remove(&self.graph[node]);
            }
        }
    }
}

impl Default for PropertyGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PropertyGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyGraph")
            .field("properties", &self.slots.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn dep_str(values: &DepValues, name: &str) -> String {
        values[name].as_str().unwrap_or_default().to_string()
    }

    #[test]
    fn test_stored_round_trip() {
        let mut graph = PropertyGraph::new();
        graph.declare_stored("version");
        assert_eq!(graph.get("version").unwrap(), Value::Null);

        graph.set("version", json!("1.2.0")).unwrap();
        assert_eq!(graph.get("version").unwrap(), json!("1.2.0"));
    }

    #[test]
    fn test_derived_memoization() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let mut graph = PropertyGraph::new();
        graph.declare_stored("version");
        graph
            .declare_derived("tag", &["version"], move |values| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(json!(format!("v{}", dep_str(values, "version"))))
            })
            .unwrap();

        graph.set("version", json!("3.1.0")).unwrap();
        assert_eq!(graph.get("tag").unwrap(), json!("v3.1.0"));
        assert_eq!(graph.get("tag").unwrap(), json!("v3.1.0"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_set_invalidates_transitive_dependents_only() {
        let label_calls = Arc::new(AtomicUsize::new(0));
        let other_calls = Arc::new(AtomicUsize::new(0));

        let mut graph = PropertyGraph::new();
        graph.declare_stored("version");
        graph.declare_stored("name");
        {
            let calls = label_calls.clone();
            graph
                .declare_derived("tag", &["version"], move |values| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(json!(format!("v{}", dep_str(values, "version"))))
                })
                .unwrap();
        }
        graph
            .declare_derived("title", &["tag", "name"], |values| {
                Ok(json!(format!(
                    "{} {}",
                    dep_str(values, "name"),
                    dep_str(values, "tag")
                )))
            })
            .unwrap();
        {
            let calls = other_calls.clone();
            graph
                .declare_derived("slug", &["name"], move |values| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(json!(dep_str(values, "name").to_lowercase()))
                })
                .unwrap();
        }

        graph.set("version", json!("1.0.0")).unwrap();
        graph.set("name", json!("Vessel")).unwrap();
        assert_eq!(graph.get("title").unwrap(), json!("Vessel v1.0.0"));
        assert_eq!(graph.get("slug").unwrap(), json!("vessel"));

        // Changing version recomputes tag and title but not slug.
        graph.set("version", json!("2.0.0")).unwrap();
        assert_eq!(graph.get("title").unwrap(), json!("Vessel v2.0.0"));
        assert_eq!(graph.get("slug").unwrap(), json!("vessel"));
        assert_eq!(label_calls.load(Ordering::SeqCst), 2);
        assert_eq!(other_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_cycle_rejected_at_declaration() {
        let mut graph = PropertyGraph::new();
        graph.declare_stored("seed");
        graph
            .declare_derived("a", &["seed", "c"], |_| Ok(Value::Null))
            .unwrap();
        graph
            .declare_derived("b", &["a"], |_| Ok(Value::Null))
            .unwrap();

        // Closing the loop c -> a is the declaration that must fail.
        let err = graph
            .declare_derived("c", &["b"], |_| Ok(Value::Null))
            .unwrap_err();
        assert!(matches!(err, Error::PropertyCycle { .. }));

        // The rejected declaration left the graph usable: c can still be
        // declared with an acyclic dependency set.
        graph
            .declare_derived("c", &["seed"], |_| Ok(Value::Null))
            .unwrap();
        graph.set("seed", json!(1)).unwrap();
        assert_eq!(graph.get("b").unwrap(), Value::Null);
    }

    #[test]
    fn test_self_cycle_rejected() {
        let mut graph = PropertyGraph::new();
        let err = graph
            .declare_derived("x", &["x"], |_| Ok(Value::Null))
            .unwrap_err();
        assert!(matches!(err, Error::PropertyCycle { .. }));
    }

    #[test]
    fn test_override_replaces_deps_and_compute() {
        let mut graph = PropertyGraph::new();
        graph.declare_stored("base");
        graph.declare_stored("extra");
        graph
            .declare_derived("label", &["base"], |values| {
                Ok(json!(dep_str(values, "base")))
            })
            .unwrap();

        graph.set("base", json!("one")).unwrap();
        graph.set("extra", json!("two")).unwrap();
        assert_eq!(graph.get("label").unwrap(), json!("one"));

        // Variant-style override: new deps, new compute.
        graph
            .declare_derived("label", &["base", "extra"], |values| {
                Ok(json!(format!(
                    "{}-{}",
                    dep_str(values, "base"),
                    dep_str(values, "extra")
                )))
            })
            .unwrap();
        assert_eq!(graph.get("label").unwrap(), json!("one-two"));

        // The old edge set is gone: extra now invalidates label.
        graph.set("extra", json!("three")).unwrap();
        assert_eq!(graph.get("label").unwrap(), json!("one-three"));
    }

    #[test]
    fn test_unknown_property() {
        let graph = PropertyGraph::new();
        assert!(matches!(
            graph.get("ghost").unwrap_err(),
            Error::UnknownProperty { .. }
        ));
    }

    #[test]
    fn test_set_derived_rejected() {
        let mut graph = PropertyGraph::new();
        graph
            .declare_derived("computed", &[], |_| Ok(json!(42)))
            .unwrap();
        assert!(matches!(
            graph.set("computed", json!(7)).unwrap_err(),
            Error::NotStored { .. }
        ));
    }

    #[test]
    fn test_compute_error_propagates_and_is_not_cached() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let mut graph = PropertyGraph::new();
        graph.declare_stored("input");
        graph
            .declare_derived("strict", &["input"], move |values| {
                counter.fetch_add(1, Ordering::SeqCst);
                match values["input"].as_str() {
                    Some(s) => Ok(json!(s.len())),
                    None => Err(Error::property_type("input", "string")),
                }
            })
            .unwrap();

        assert!(graph.get("strict").is_err());
        assert!(graph.get("strict").is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        graph.set("input", json!("four")).unwrap();
        assert_eq!(graph.get("strict").unwrap(), json!(4));
    }
}
