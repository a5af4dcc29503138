use super::context::reference_limit;
use crate::condition::Target;
use crate::error::DependencyError;
use crate::form::Form;
use crate::tree::{ContainerSlot, walk};
use ahash::{AHashMap, AHashSet};
use std::collections::VecDeque;
use std::fmt;
use tracing::{debug, warn};

/// A vertex of the dependency graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Node {
    Target(Target),
    Variable(String),
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Target(Target::Field(id)) => write!(f, "{}", id),
            Node::Target(Target::Page(page)) => write!(f, "page[{}]", page),
            Node::Target(Target::Button { page, button }) => write!(f, "page[{}].{}", page, button),
            Node::Variable(name) => write!(f, "${}", name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edge {
    /// Rule `index` of the dependent's group references the dependency.
    Rule(usize),
    /// The dependent sits inside the dependency (container or page).
    Structural,
}

/// Who depends on whom across a whole form.
///
/// Nodes are fields, pages, navigation buttons and variables. An edge points
/// from a dependent to what it depends on: a rule reference, the enclosing
/// container or page of a field, or the page of a button. Rules whose edge
/// lies on a cycle, and page-level rules referencing a field on the same or a
/// later page, are blocked and reported as [`DependencyError`]s.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: Vec<Node>,
    index: AHashMap<Node, usize>,
    edges: Vec<Vec<(usize, Edge)>>,
    reverse: Vec<Vec<usize>>,
    blocked: AHashSet<(Target, usize)>,
    errors: Vec<DependencyError>,
}

impl DependencyGraph {
    pub fn build(form: &Form) -> Self {
        let mut graph = Self::default();

        let mut page_of: AHashMap<&str, usize> = AHashMap::new();
        for (page_index, page) in form.pages.iter().enumerate() {
            let page_node = graph.intern(Node::Target(Target::Page(page_index)));
            walk::visit(&page.fields, &ContainerSlot::Root, &mut |field, slot, _| {
                page_of.insert(field.id.as_str(), page_index);
                let node = graph.intern(Node::Target(Target::field(field.id.as_str())));
                let parent = match slot.container_id() {
                    Some(container) => graph.intern(Node::Target(Target::field(container))),
                    None => page_node,
                };
                graph.connect(node, parent, Edge::Structural);
            });
            for button in [Target::next_button(page_index), Target::submit_button(page_index)] {
                let node = graph.intern(Node::Target(button));
                graph.connect(node, page_node, Edge::Structural);
            }
        }

        for (target, group) in form.rule_groups() {
            if !group.enabled {
                continue;
            }
            let owner = graph.intern(Node::Target(target.clone()));
            let limit = reference_limit(form, &target);
            for (index, rule) in group.rules.iter().enumerate() {
                let reference = rule.depends_on.as_str();
                match page_of.get(reference).copied() {
                    Some(page) if page < limit => {
                        let node = graph.intern(Node::Target(Target::field(reference)));
                        graph.connect(owner, node, Edge::Rule(index));
                    }
                    Some(page) if target.is_page_level() => {
                        graph.blocked.insert((target.clone(), index));
                        graph.errors.push(DependencyError::PageOrder {
                            target: target.clone(),
                            depends_on: reference.to_string(),
                            owner_page: limit,
                            referenced_page: page,
                        });
                    }
                    // Fields on later pages are not in scope for field rules,
                    // so the name can only mean a variable.
                    _ => {
                        let node = graph.intern(Node::Variable(reference.to_string()));
                        graph.connect(owner, node, Edge::Rule(index));
                    }
                }
            }
        }

        graph.block_cycles();
        for error in &graph.errors {
            warn!(%error, "dependency error");
        }
        debug!(
            nodes = graph.nodes.len(),
            edges = graph.edge_count(),
            errors = graph.errors.len(),
            "built dependency graph"
        );
        graph
    }

    fn intern(&mut self, node: Node) -> usize {
        if let Some(&id) = self.index.get(&node) {
            return id;
        }
        let id = self.nodes.len();
        self.index.insert(node.clone(), id);
        self.nodes.push(node);
        self.edges.push(Vec::new());
        self.reverse.push(Vec::new());
        id
    }

    fn connect(&mut self, from: usize, to: usize, edge: Edge) {
        self.edges[from].push((to, edge));
        self.reverse[to].push(from);
    }

    /// Blocks every rule edge whose two ends share a strongly connected
    /// component, self-references included.
    fn block_cycles(&mut self) {
        let component = StronglyConnected::run(&self.edges);
        let mut found = Vec::new();
        for (from, out) in self.edges.iter().enumerate() {
            for &(to, edge) in out {
                let Edge::Rule(index) = edge else { continue };
                if component[from] != component[to] {
                    continue;
                }
                if let (Node::Target(owner), Node::Target(Target::Field(depends_on))) =
                    (&self.nodes[from], &self.nodes[to])
                {
                    found.push((from, to, owner.clone(), index, depends_on.clone()));
                }
            }
        }
        for (from, to, target, index, depends_on) in found {
            let cycle = self.cycle_through(from, to, &component);
            self.blocked.insert((target.clone(), index));
            self.errors.push(DependencyError::Circular {
                target,
                depends_on,
                cycle,
            });
        }
    }

    /// Shortest walk `from -> to -> ... -> from` inside one component.
    fn cycle_through(&self, from: usize, to: usize, component: &[usize]) -> Vec<String> {
        let mut previous: AHashMap<usize, usize> = AHashMap::new();
        let mut queue = VecDeque::from([to]);
        let mut seen = AHashSet::new();
        seen.insert(to);
        while let Some(current) = queue.pop_front() {
            if current == from {
                break;
            }
            for &(next, _) in &self.edges[current] {
                if component[next] == component[from] && seen.insert(next) {
                    previous.insert(next, current);
                    queue.push_back(next);
                }
            }
        }

        let mut path = vec![from];
        let mut current = from;
        while current != to {
            match previous.get(&current) {
                Some(&p) => {
                    path.push(p);
                    current = p;
                }
                None => break,
            }
        }
        path.push(from);
        // `path` runs backwards from `from` to `to`; the walk is its reverse.
        let mut labels: Vec<String> = path.iter().map(|&i| self.nodes[i].to_string()).collect();
        labels.reverse();
        labels
    }

    pub fn errors(&self) -> &[DependencyError] {
        &self.errors
    }

    pub fn errors_for<'a>(&'a self, target: &'a Target) -> impl Iterator<Item = &'a DependencyError> {
        self.errors.iter().filter(move |e| e.target() == target)
    }

    pub fn has_cycles(&self) -> bool {
        self.errors
            .iter()
            .any(|e| matches!(e, DependencyError::Circular { .. }))
    }

    /// Whether rule `rule` of `target`'s group must not be evaluated.
    pub fn is_blocked(&self, target: &Target, rule: usize) -> bool {
        self.blocked.contains(&(target.clone(), rule))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.iter().map(Vec::len).sum()
    }

    pub fn contains(&self, node: &Node) -> bool {
        self.index.contains_key(node)
    }

    /// Direct dependencies of `node`, in edge order.
    pub fn dependencies_of(&self, node: &Node) -> Vec<&Node> {
        self.index
            .get(node)
            .map(|&id| self.edges[id].iter().map(|&(to, _)| &self.nodes[to]).collect())
            .unwrap_or_default()
    }

    /// Every target whose visibility can change when one of `seeds` changes:
    /// direct and transitive dependents. Seeds themselves are included only if
    /// they depend on another seed.
    pub fn affected_by<I>(&self, seeds: I) -> AHashSet<Target>
    where
        I: IntoIterator<Item = Node>,
    {
        let mut seen: AHashSet<usize> = AHashSet::new();
        let mut queue: VecDeque<usize> = seeds
            .into_iter()
            .filter_map(|node| self.index.get(&node).copied())
            .collect();
        while let Some(current) = queue.pop_front() {
            for &dependent in &self.reverse[current] {
                if seen.insert(dependent) {
                    queue.push_back(dependent);
                }
            }
        }
        seen.into_iter()
            .filter_map(|id| match &self.nodes[id] {
                Node::Target(target) => Some(target.clone()),
                Node::Variable(_) => None,
            })
            .collect()
    }
}

/// Tarjan's strongly connected components. Returns the component id of every
/// node.
struct StronglyConnected<'a> {
    edges: &'a [Vec<(usize, Edge)>],
    index: Vec<Option<usize>>,
    low: Vec<usize>,
    on_stack: Vec<bool>,
    stack: Vec<usize>,
    component: Vec<usize>,
    next_index: usize,
    next_component: usize,
}

impl<'a> StronglyConnected<'a> {
    fn run(edges: &'a [Vec<(usize, Edge)>]) -> Vec<usize> {
        let n = edges.len();
        let mut scc = Self {
            edges,
            index: vec![None; n],
            low: vec![0; n],
            on_stack: vec![false; n],
            stack: Vec::new(),
            component: vec![usize::MAX; n],
            next_index: 0,
            next_component: 0,
        };
        for node in 0..n {
            if scc.index[node].is_none() {
                scc.connect(node);
            }
        }
        scc.component
    }

    fn connect(&mut self, node: usize) {
        self.index[node] = Some(self.next_index);
        self.low[node] = self.next_index;
        self.next_index += 1;
        self.stack.push(node);
        self.on_stack[node] = true;

        let edges = self.edges;
        for &(next, _) in &edges[node] {
            match self.index[next] {
                None => {
                    self.connect(next);
                    self.low[node] = self.low[node].min(self.low[next]);
                }
                Some(next_index) if self.on_stack[next] => {
                    self.low[node] = self.low[node].min(next_index);
                }
                Some(_) => {}
            }
        }

        if Some(self.low[node]) == self.index[node] {
            while let Some(member) = self.stack.pop() {
                self.on_stack[member] = false;
                self.component[member] = self.next_component;
                if member == node {
                    break;
                }
            }
            self.next_component += 1;
        }
    }
}
