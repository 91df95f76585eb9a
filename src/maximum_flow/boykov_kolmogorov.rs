use crate::error::{CutError, Result};
use crate::maximum_flow::arena::{Arena, ARC_BLOCK_SIZE, NODE_BLOCK_SIZE};
use num_traits::{NumAssign, Signed};
use std::collections::VecDeque;
use tracing::debug;

// infinite distance to the terminal
const INFINITE_D: usize = usize::MAX;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct ArcId(usize);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl ArcId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }

    // sister arcs occupy the two slots of one pair allocation
    #[inline]
    fn sister(self) -> ArcId {
        ArcId(self.0 ^ 1)
    }
}

/// Side of the minimum cut a node ends up on.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Segment {
    #[default]
    Source,
    Sink,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
enum Parent {
    #[default]
    Free,
    Terminal,
    Orphan,
    Arc(ArcId),
}

struct Node<Flow> {
    first: Option<ArcId>,
    parent: Parent,
    // next active node; a self-link marks the last node of a queue
    next: Option<NodeId>,
    ts: u64,
    dist: usize,
    is_sink: bool,
    tr_cap: Flow,
}

impl<Flow: NumAssign> Default for Node<Flow> {
    fn default() -> Self {
        Self { first: None, parent: Parent::Free, next: None, ts: 0, dist: 0, is_sink: false, tr_cap: Flow::zero() }
    }
}

struct Arc<Flow> {
    head: NodeId,
    next: Option<ArcId>,
    r_cap: Flow,
}

impl<Flow: NumAssign> Default for Arc<Flow> {
    fn default() -> Self {
        Self { head: NodeId(0), next: None, r_cap: Flow::zero() }
    }
}

/// Augmenting-path max-flow / min-cut solver with two search trees
/// (Boykov–Kolmogorov). Nodes and arcs live in block arenas and are
/// addressed through [`NodeId`] / [`ArcId`].
pub struct FlowNetwork<Flow> {
    nodes: Arena<Node<Flow>>,
    arcs: Arena<Arc<Flow>>,
    flow: Flow,

    queue_first: [Option<NodeId>; 2],
    queue_last: [Option<NodeId>; 2],
    orphans: VecDeque<NodeId>,
    time: u64,
    solved: bool,

    num_augmentations: usize,
    num_adopted: usize,
    num_freed: usize,
}

impl<Flow> Default for FlowNetwork<Flow>
where
    Flow: NumAssign + Signed + PartialOrd + Copy,
{
    fn default() -> Self {
        Self::with_limits(usize::MAX, usize::MAX)
    }
}

impl<Flow> FlowNetwork<Flow>
where
    Flow: NumAssign + Signed + PartialOrd + Copy,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Network whose arenas refuse to grow past `max_nodes` nodes / `max_arcs` arcs.
    pub fn with_limits(max_nodes: usize, max_arcs: usize) -> Self {
        Self {
            nodes: Arena::with_limit("node", NODE_BLOCK_SIZE, max_nodes),
            arcs: Arena::with_limit("arc", ARC_BLOCK_SIZE, max_arcs),
            flow: Flow::zero(),
            queue_first: [None; 2],
            queue_last: [None; 2],
            orphans: VecDeque::new(),
            time: 0,
            solved: false,
            num_augmentations: 0,
            num_adopted: 0,
            num_freed: 0,
        }
    }

    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn num_arcs(&self) -> usize {
        self.arcs.len()
    }

    #[inline]
    pub fn flow(&self) -> Flow {
        self.flow
    }

    pub fn add_node(&mut self) -> Result<NodeId> {
        let index = self.nodes.allocate(1)?;
        Ok(NodeId(index))
    }

    // return the forward arc; its sister carries rev_cap
    pub fn add_edge(&mut self, from: NodeId, to: NodeId, cap: Flow, rev_cap: Flow) -> Result<ArcId> {
        self.check_node("from", from)?;
        self.check_node("to", to)?;
        if from == to {
            return Err(CutError::invalid_argument("to", to.0, "self loops are not allowed"));
        }
        Self::check_arc_capacity("cap", cap)?;
        Self::check_arc_capacity("rev_cap", rev_cap)?;

        let a = ArcId(self.arcs.allocate(2)?);
        let a_rev = a.sister();

        let first_from = self.node(from).first;
        let first_to = self.node(to).first;
        *self.arcs.get_mut(a.0) = Arc { head: to, next: first_from, r_cap: cap };
        *self.arcs.get_mut(a_rev.0) = Arc { head: from, next: first_to, r_cap: rev_cap };
        self.node_mut(from).first = Some(a);
        self.node_mut(to).first = Some(a_rev);

        Ok(a)
    }

    pub fn set_tweights(&mut self, u: NodeId, cap_source: Flow, cap_sink: Flow) -> Result<()> {
        self.check_node("node", u)?;
        Self::check_capacity("cap_source", cap_source)?;
        Self::check_capacity("cap_sink", cap_sink)?;

        self.flow += min(cap_source, cap_sink);
        self.node_mut(u).tr_cap = cap_source - cap_sink;
        Ok(())
    }

    // the current terminal capacity is folded into the new pair before the minimum is taken
    pub fn add_tweights(&mut self, u: NodeId, cap_source: Flow, cap_sink: Flow) -> Result<()> {
        self.check_node("node", u)?;
        Self::check_capacity("cap_source", cap_source)?;
        Self::check_capacity("cap_sink", cap_sink)?;

        let (mut cap_source, mut cap_sink) = (cap_source, cap_sink);
        let delta = self.node(u).tr_cap;
        if delta > Flow::zero() {
            cap_source += delta;
        } else {
            cap_sink -= delta;
        }
        self.flow += min(cap_source, cap_sink);
        self.node_mut(u).tr_cap = cap_source - cap_sink;
        Ok(())
    }

    #[inline]
    pub fn terminal_capacity(&self, u: NodeId) -> Flow {
        self.node(u).tr_cap
    }

    pub fn out_arcs(&self, u: NodeId) -> OutArcs<'_, Flow> {
        OutArcs { network: self, current: self.node(u).first }
    }

    #[inline]
    pub fn arc_head(&self, a: ArcId) -> NodeId {
        self.arc(a).head
    }

    #[inline]
    pub fn arc_sister(&self, a: ArcId) -> ArcId {
        a.sister()
    }

    #[inline]
    pub fn residual_capacity(&self, a: ArcId) -> Flow {
        self.arc(a).r_cap
    }

    pub fn what_segment(&self, u: NodeId) -> Segment {
        self.what_segment_or(u, Segment::Source)
    }

    // nodes that ended up in neither tree take `default`
    pub fn what_segment_or(&self, u: NodeId, default: Segment) -> Segment {
        let node = self.node(u);
        match node.parent {
            Parent::Free => default,
            _ if node.is_sink => Segment::Sink,
            _ => Segment::Source,
        }
    }

    pub fn maxflow(&mut self) -> Flow {
        if self.solved {
            return self.flow;
        }
        self.maxflow_init();

        let mut current_node: Option<NodeId> = None;
        loop {
            let mut i = current_node.take();
            if let Some(u) = i {
                // remove active flag
                self.node_mut(u).next = None;
                if self.node(u).parent == Parent::Free {
                    i = None;
                }
            }
            let i = match i {
                Some(u) => u,
                None => match self.next_active() {
                    Some(u) => u,
                    None => break,
                },
            };

            let middle = self.grow(i);
            self.time += 1;

            if let Some(middle) = middle {
                // set active flag
                self.node_mut(i).next = Some(i);
                current_node = Some(i);

                self.augment(middle);
                self.adopt();
            }
        }

        self.solved = true;
        debug!(
            nodes = self.num_nodes(),
            arcs = self.num_arcs(),
            augmentations = self.num_augmentations,
            adopted = self.num_adopted,
            freed = self.num_freed,
            "maxflow finished"
        );
        self.flow
    }

    fn maxflow_init(&mut self) {
        self.queue_first = [None; 2];
        self.queue_last = [None; 2];
        self.orphans.clear();
        self.time = 0;

        for index in 0..self.nodes.len() {
            let u = NodeId(index);
            let tr_cap = self.node(u).tr_cap;
            let node = self.node_mut(u);
            node.next = None;
            node.ts = 0;
            if tr_cap > Flow::zero() {
                // connected to the source
                node.is_sink = false;
                node.parent = Parent::Terminal;
                node.dist = 1;
                self.set_active(u);
            } else if tr_cap < Flow::zero() {
                // connected to the sink
                node.is_sink = true;
                node.parent = Parent::Terminal;
                node.dist = 1;
                self.set_active(u);
            } else {
                node.parent = Parent::Free;
            }
        }
    }

    // active nodes are appended to the second queue and read from the first one
    fn set_active(&mut self, u: NodeId) {
        if self.node(u).next.is_some() {
            return;
        }
        match self.queue_last[1] {
            Some(last) => self.node_mut(last).next = Some(u),
            None => self.queue_first[1] = Some(u),
        }
        self.queue_last[1] = Some(u);
        self.node_mut(u).next = Some(u);
    }

    // a node in the queues is active iff it has a parent
    fn next_active(&mut self) -> Option<NodeId> {
        loop {
            let u = match self.queue_first[0] {
                Some(u) => u,
                None => {
                    self.queue_first[0] = self.queue_first[1].take();
                    self.queue_last[0] = self.queue_last[1].take();
                    self.queue_first[0]?
                }
            };

            let next = self.node(u).next;
            if next == Some(u) {
                self.queue_first[0] = None;
                self.queue_last[0] = None;
            } else {
                self.queue_first[0] = next;
            }
            self.node_mut(u).next = None;

            if self.node(u).parent != Parent::Free {
                return Some(u);
            }
        }
    }

    // grow the tree of u; return the arc (source tree -> sink tree) that closes a path
    fn grow(&mut self, u: NodeId) -> Option<ArcId> {
        let is_sink = self.node(u).is_sink;
        let (ts, dist) = (self.node(u).ts, self.node(u).dist);

        let mut current = self.node(u).first;
        while let Some(a) = current {
            current = self.arc(a).next;

            // residual capacity in the direction of growth
            let cap = if is_sink { self.arc(a.sister()).r_cap } else { self.arc(a).r_cap };
            if cap == Flow::zero() {
                continue;
            }

            let v = self.arc(a).head;
            let node = self.node(v);
            if node.parent == Parent::Free {
                let node = self.node_mut(v);
                node.is_sink = is_sink;
                node.parent = Parent::Arc(a.sister());
                node.ts = ts;
                node.dist = dist + 1;
                self.set_active(v);
            } else if node.is_sink != is_sink {
                return Some(if is_sink { a.sister() } else { a });
            } else if node.ts <= ts && node.dist > dist {
                // heuristic: shorten the distance from v to its terminal
                let node = self.node_mut(v);
                node.parent = Parent::Arc(a.sister());
                node.ts = ts;
                node.dist = dist + 1;
            }
        }
        None
    }

    // middle: arc from a source-tree node to a sink-tree node
    fn augment(&mut self, middle: ArcId) {
        // 1. bottleneck capacity
        let mut bottleneck = self.arc(middle).r_cap;

        let mut u = self.arc(middle.sister()).head;
        while let Parent::Arc(a) = self.node(u).parent {
            bottleneck = min(bottleneck, self.arc(a.sister()).r_cap);
            u = self.arc(a).head;
        }
        bottleneck = min(bottleneck, self.node(u).tr_cap);

        let mut u = self.arc(middle).head;
        while let Parent::Arc(a) = self.node(u).parent {
            bottleneck = min(bottleneck, self.arc(a).r_cap);
            u = self.arc(a).head;
        }
        bottleneck = min(bottleneck, -self.node(u).tr_cap);

        // 2. augmenting
        self.arc_mut(middle.sister()).r_cap += bottleneck;
        self.arc_mut(middle).r_cap -= bottleneck;

        // the source tree
        let mut u = self.arc(middle.sister()).head;
        while let Parent::Arc(a) = self.node(u).parent {
            self.arc_mut(a).r_cap += bottleneck;
            self.arc_mut(a.sister()).r_cap -= bottleneck;
            if self.arc(a.sister()).r_cap == Flow::zero() {
                self.set_orphan_front(u);
            }
            u = self.arc(a).head;
        }
        self.node_mut(u).tr_cap -= bottleneck;
        if self.node(u).tr_cap == Flow::zero() {
            self.set_orphan_front(u);
        }

        // the sink tree
        let mut u = self.arc(middle).head;
        while let Parent::Arc(a) = self.node(u).parent {
            self.arc_mut(a.sister()).r_cap += bottleneck;
            self.arc_mut(a).r_cap -= bottleneck;
            if self.arc(a).r_cap == Flow::zero() {
                self.set_orphan_front(u);
            }
            u = self.arc(a).head;
        }
        self.node_mut(u).tr_cap += bottleneck;
        if self.node(u).tr_cap == Flow::zero() {
            self.set_orphan_front(u);
        }

        self.flow += bottleneck;
        self.num_augmentations += 1;
    }

    fn adopt(&mut self) {
        while let Some(u) = self.orphans.pop_front() {
            self.process_orphan(u);
        }
    }

    fn set_orphan_front(&mut self, u: NodeId) {
        self.node_mut(u).parent = Parent::Orphan;
        self.orphans.push_front(u);
    }

    fn set_orphan_rear(&mut self, u: NodeId) {
        self.node_mut(u).parent = Parent::Orphan;
        self.orphans.push_back(u);
    }

    // residual capacity between u and the neighbour behind `a` in the direction flow travels in u's tree
    #[inline]
    fn tree_capacity(&self, is_sink: bool, a: ArcId) -> Flow {
        if is_sink {
            self.arc(a).r_cap
        } else {
            self.arc(a.sister()).r_cap
        }
    }

    fn process_orphan(&mut self, u: NodeId) {
        let is_sink = self.node(u).is_sink;
        let mut a0_min: Option<ArcId> = None;
        let mut d_min = INFINITE_D;

        // trying to find a new parent
        let mut current = self.node(u).first;
        while let Some(a0) = current {
            current = self.arc(a0).next;
            if self.tree_capacity(is_sink, a0) == Flow::zero() {
                continue;
            }
            let v = self.arc(a0).head;
            if self.node(v).is_sink != is_sink || self.node(v).parent == Parent::Free {
                continue;
            }

            // checking the origin of v
            let mut d = 0;
            let mut w = v;
            loop {
                let (ts, dist, parent) = (self.node(w).ts, self.node(w).dist, self.node(w).parent);
                if ts == self.time {
                    d += dist;
                    break;
                }
                d += 1;
                match parent {
                    Parent::Terminal => {
                        let time = self.time;
                        let node = self.node_mut(w);
                        node.ts = time;
                        node.dist = 1;
                        break;
                    }
                    Parent::Arc(a) => w = self.arc(a).head,
                    Parent::Orphan | Parent::Free => {
                        d = INFINITE_D;
                        break;
                    }
                }
            }

            if d < INFINITE_D {
                if d < d_min {
                    a0_min = Some(a0);
                    d_min = d;
                }
                // set marks along the path
                let mut w = v;
                while self.node(w).ts != self.time {
                    let time = self.time;
                    let node = self.node_mut(w);
                    node.ts = time;
                    node.dist = d;
                    d -= 1;
                    let parent = node.parent;
                    match parent {
                        Parent::Arc(a) => w = self.arc(a).head,
                        _ => break,
                    }
                }
            }
        }

        if let Some(a) = a0_min {
            let time = self.time;
            let node = self.node_mut(u);
            node.parent = Parent::Arc(a);
            node.ts = time;
            node.dist = d_min + 1;
            self.num_adopted += 1;
            return;
        }

        // no parent is found; process neighbors
        self.node_mut(u).parent = Parent::Free;
        self.num_freed += 1;

        let mut current = self.node(u).first;
        while let Some(a0) = current {
            current = self.arc(a0).next;
            let v = self.arc(a0).head;
            let parent = self.node(v).parent;
            if self.node(v).is_sink != is_sink || parent == Parent::Free {
                continue;
            }
            if self.tree_capacity(is_sink, a0) > Flow::zero() {
                self.set_active(v);
            }
            if let Parent::Arc(a) = parent {
                if self.arc(a).head == u {
                    self.set_orphan_rear(v);
                }
            }
        }
    }

    fn check_node(&self, name: &'static str, u: NodeId) -> Result<()> {
        if u.0 >= self.nodes.len() {
            return Err(CutError::invalid_argument(name, u.0, "unknown node"));
        }
        Ok(())
    }

    fn check_capacity(name: &'static str, cap: Flow) -> Result<()> {
        // rejects NaN as well
        if !(cap >= Flow::zero()) {
            return Err(CutError::invalid_argument(name, "negative", "capacities must be non-negative"));
        }
        Ok(())
    }

    // arcs must stay finite; only terminal capacities may be infinite
    fn check_arc_capacity(name: &'static str, cap: Flow) -> Result<()> {
        Self::check_capacity(name, cap)?;
        if cap - cap != Flow::zero() {
            return Err(CutError::invalid_argument(name, "infinite", "arc capacities must be finite"));
        }
        Ok(())
    }

    #[inline]
    fn node(&self, u: NodeId) -> &Node<Flow> {
        self.nodes.get(u.0)
    }

    #[inline]
    fn node_mut(&mut self, u: NodeId) -> &mut Node<Flow> {
        self.nodes.get_mut(u.0)
    }

    #[inline]
    fn arc(&self, a: ArcId) -> &Arc<Flow> {
        self.arcs.get(a.0)
    }

    #[inline]
    fn arc_mut(&mut self, a: ArcId) -> &mut Arc<Flow> {
        self.arcs.get_mut(a.0)
    }
}

pub struct OutArcs<'a, Flow> {
    network: &'a FlowNetwork<Flow>,
    current: Option<ArcId>,
}

impl<Flow> Iterator for OutArcs<'_, Flow>
where
    Flow: NumAssign + Signed + PartialOrd + Copy,
{
    type Item = ArcId;

    fn next(&mut self) -> Option<ArcId> {
        let a = self.current?;
        self.current = self.network.arc(a).next;
        Some(a)
    }
}

#[inline]
fn min<Flow: PartialOrd>(a: Flow, b: Flow) -> Flow {
    if b < a {
        b
    } else {
        a
    }
}
