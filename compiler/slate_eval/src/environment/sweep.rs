//! Finding frames kept alive only by closures stored inside detached frames.
//!
//! Trial deletion over the detached frames and every shared object
//! reachable from their bindings. A node's holds that no edge inside this
//! graph accounts for come from outside (the global frame, an active
//! frame, the host or the interpreter's own stack), which makes it a root.
//! Frames not reachable from a root are garbage.

use std::rc::Rc;

use rustc_hash::FxHashMap;

use super::{Environment, ScopeId};
use crate::value::Value;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
enum Node {
    Frame(ScopeId),
    /// Shared object, by address.
    Object(usize),
}

#[derive(Default)]
struct Counts {
    /// Frame holds, or the object's strong count.
    held: usize,
    /// Edges into this node from inside the graph.
    internal: usize,
    edges: Vec<Node>,
    /// Contents could not be inspected; treat as reachable.
    pinned: bool,
    reachable: bool,
}

struct Graph<'e> {
    env: &'e Environment,
    nodes: FxHashMap<Node, Counts>,
    /// Objects discovered but not yet inspected.
    pending: Vec<Value>,
}

/// Detached frames no root can reach.
pub(super) fn unreachable_frames(env: &Environment) -> Vec<ScopeId> {
    let mut graph = Graph {
        env,
        nodes: FxHashMap::default(),
        pending: Vec::new(),
    };
    let active = &env.active;
    let detached: Vec<ScopeId> = (1..=env.frames.len())
        .filter_map(|slot| u32::try_from(slot).ok().map(ScopeId))
        .filter(|id| env.scope(*id).holds > 0 && !active.contains(id))
        .collect();
    for &id in &detached {
        let counts = Counts {
            held: env.scope(id).holds,
            ..Counts::default()
        };
        graph.nodes.insert(Node::Frame(id), counts);
    }
    for &id in &detached {
        let scope = env.scope(id);
        let mut edges = Vec::new();
        if let Some(parent) = scope.parent {
            graph.link_frame(&mut edges, parent);
        }
        for value in scope.bindings.values() {
            graph.link_value(&mut edges, value);
        }
        if let Some(counts) = graph.nodes.get_mut(&Node::Frame(id)) {
            counts.edges = edges;
        }
    }
    while let Some(value) = graph.pending.pop() {
        graph.inspect(&value);
    }
    graph.mark();
    detached
        .into_iter()
        .filter(|id| {
            graph
                .nodes
                .get(&Node::Frame(*id))
                .is_some_and(|counts| !counts.reachable)
        })
        .collect()
}

/// The shared object behind `value`, with its strong count.
fn object_of(value: &Value) -> Option<(Node, usize)> {
    let (address, strong) = match value {
        Value::List(list) => (Rc::as_ptr(list).cast::<()>(), Rc::strong_count(list)),
        Value::Tuple(items) => (Rc::as_ptr(items).cast::<()>(), Rc::strong_count(items)),
        Value::Dict(dict) => (Rc::as_ptr(dict).cast::<()>(), Rc::strong_count(dict)),
        Value::Procedure(procedure) => {
            (Rc::as_ptr(procedure).cast::<()>(), Rc::strong_count(procedure))
        }
        Value::BoundMethod(method) => (Rc::as_ptr(method).cast::<()>(), Rc::strong_count(method)),
        _ => return None,
    };
    Some((Node::Object(address as usize), strong))
}

impl Graph<'_> {
    fn link_frame(&mut self, edges: &mut Vec<Node>, id: ScopeId) {
        let node = Node::Frame(id);
        if let Some(counts) = self.nodes.get_mut(&node) {
            counts.internal += 1;
            edges.push(node);
        }
    }

    fn link_value(&mut self, edges: &mut Vec<Node>, value: &Value) {
        let Some((node, strong)) = object_of(value) else {
            return;
        };
        let counts = self.nodes.entry(node).or_insert_with(|| {
            // Counted before the clone below adds its own reference.
            self.pending.push(value.clone());
            Counts {
                held: strong,
                ..Counts::default()
            }
        });
        counts.internal += 1;
        edges.push(node);
    }

    /// Record the outgoing edges of the object `value` refers to.
    fn inspect(&mut self, value: &Value) {
        let Some((node, _)) = object_of(value) else {
            return;
        };
        let mut edges = Vec::new();
        let mut pinned = false;
        match value {
            Value::List(list) => match list.try_borrow() {
                Ok(items) => items.iter().for_each(|item| self.link_value(&mut edges, item)),
                Err(_) => pinned = true,
            },
            Value::Tuple(items) => items.iter().for_each(|item| self.link_value(&mut edges, item)),
            Value::Dict(dict) => match dict.try_borrow() {
                Ok(dict) => {
                    for (key, item) in dict.iter() {
                        self.link_value(&mut edges, key);
                        self.link_value(&mut edges, item);
                    }
                }
                Err(_) => pinned = true,
            },
            Value::Procedure(procedure) => {
                if self.env.owns(&procedure.closure) {
                    self.link_frame(&mut edges, procedure.closure.scope());
                }
                for default in procedure.params.iter().filter_map(|param| param.default.as_ref()) {
                    self.link_value(&mut edges, default);
                }
            }
            Value::BoundMethod(method) => self.link_value(&mut edges, &method.receiver),
            _ => {}
        }
        if let Some(counts) = self.nodes.get_mut(&node) {
            counts.edges = edges;
            counts.pinned = pinned;
        }
    }

    fn mark(&mut self) {
        let mut stack: Vec<Node> = self
            .nodes
            .iter()
            .filter(|(_, counts)| counts.pinned || counts.held > counts.internal)
            .map(|(&node, _)| node)
            .collect();
        while let Some(node) = stack.pop() {
            let Some(counts) = self.nodes.get_mut(&node) else {
                continue;
            };
            if counts.reachable {
                continue;
            }
            counts.reachable = true;
            stack.extend(counts.edges.iter().copied());
        }
    }
}
