//! Genetic representation of neural networks:
//! node and connection genes, the historic ledger
//! of structural mutations, and the [`Genome`]
//! tying them together.
mod config;
mod context;
mod crossover;
mod distance;
mod errors;
mod genes;
mod history;
mod mutation;
mod nodes;

pub use config::GeneticConfig;
pub use context::EvolutionContext;
pub use errors::MutationError;
pub use genes::ConnectionGene;
pub use history::{HistoricEntry, HistoricLedger, Modification};
pub use nodes::{Layer, NodeGene, NodeType};

use crate::{Innovation, NodeId};

use ahash::RandomState;
use rtneat::{Dominance, Evolvable};
use tracing::debug;

use std::collections::{HashMap, VecDeque};
use std::fmt;

/// A genome is the collection of node and connection
/// genes describing a neural network.
///
/// Nodes are kept in insertion order, connections
/// in ascending innovation order.
#[derive(Clone, Debug, Default)]
pub struct Genome {
    nodes: Vec<NodeGene>,
    connections: Vec<ConnectionGene>,
    node_index: HashMap<NodeId, usize, RandomState>,
}

impl Genome {
    /// Generates an unconnected genome. Nodes `0..inputs` are
    /// inputs, and the following `outputs` ids are outputs.
    /// If the context's configuration asks for a bias, it gets
    /// the id after the last output.
    ///
    /// Every genome generated with the same counts in a run
    /// shares the same node ids, and those ids are never
    /// handed out to hidden nodes.
    ///
    /// # Examples
    /// ```
    /// use rtneat_nn::genomics::{EvolutionContext, GeneticConfig, Genome, NodeType};
    ///
    /// let mut context = EvolutionContext::seeded(
    ///     GeneticConfig {
    ///         bias: true,
    ///         ..GeneticConfig::zero()
    ///     },
    ///     0,
    /// );
    /// let genome = Genome::generate(&mut context, 3, 2);
    ///
    /// let types: Vec<_> = genome.nodes().iter().map(|n| (n.id(), n.node_type())).collect();
    /// assert_eq!(types, vec![
    ///     (0, NodeType::Input),
    ///     (1, NodeType::Input),
    ///     (2, NodeType::Input),
    ///     (3, NodeType::Output),
    ///     (4, NodeType::Output),
    ///     (5, NodeType::Bias),
    /// ]);
    /// assert!(genome.connections().is_empty());
    /// assert_eq!(context.next_node(), 6);
    /// ```
    pub fn generate(context: &mut EvolutionContext, inputs: usize, outputs: usize) -> Genome {
        let mut genome = Genome::default();
        for id in 0..inputs {
            genome.push_node(NodeGene::new(id, NodeType::Input));
        }
        for id in inputs..inputs + outputs {
            genome.push_node(NodeGene::new(id, NodeType::Output));
        }
        let mut next_node = inputs + outputs;
        if context.config().bias {
            genome.push_node(NodeGene::new(next_node, NodeType::Bias));
            next_node += 1;
        }
        context.reserve_nodes(next_node);
        genome
    }

    /// Adds a new enabled connection between two nodes, with a
    /// random weight within ±[`weight_bound`]. Its recurrence is
    /// derived from the layers of its endpoints.
    ///
    /// If `reuse` is given, the connection takes that innovation
    /// number. Otherwise a new number is drawn from the context,
    /// and the mutation is recorded in the ledger.
    ///
    /// Returns the innovation number of the connection.
    ///
    /// # Errors
    /// Fails without changing the genome if either endpoint does
    /// not exist, if the output node does not accept inputs, if
    /// the nodes are already connected, or if the reused innovation
    /// number is already present.
    ///
    /// [`weight_bound`]: GeneticConfig::weight_bound
    ///
    /// # Examples
    /// ```
    /// use rtneat_nn::genomics::{EvolutionContext, GeneticConfig, Genome, MutationError};
    ///
    /// let mut context = EvolutionContext::seeded(GeneticConfig::zero(), 0);
    /// let mut genome = Genome::generate(&mut context, 2, 1);
    ///
    /// assert_eq!(genome.add_connection(&mut context, 0, 2, None), Ok(0));
    /// assert_eq!(genome.add_connection(&mut context, 1, 2, None), Ok(1));
    ///
    /// // Already connected.
    /// assert_eq!(
    ///     genome.add_connection(&mut context, 0, 2, None),
    ///     Err(MutationError::DuplicateConnection(0, 2))
    /// );
    /// // Inputs can't be connected into.
    /// assert_eq!(
    ///     genome.add_connection(&mut context, 2, 0, None),
    ///     Err(MutationError::InvalidTarget(0))
    /// );
    /// assert_eq!(genome.connections().len(), 2);
    /// ```
    pub fn add_connection(
        &mut self,
        context: &mut EvolutionContext,
        input: NodeId,
        output: NodeId,
        reuse: Option<Innovation>,
    ) -> Result<Innovation, MutationError> {
        let (input_layer, output_node) = match (self.node(input), self.node(output)) {
            (Some(i), Some(o)) => (i.layer(), o),
            _ => return Err(MutationError::NonexistentEndpoints(input, output)),
        };
        if !output_node.node_type().accepts_input() {
            return Err(MutationError::InvalidTarget(output));
        }
        if self.are_connected(input, output) {
            return Err(MutationError::DuplicateConnection(input, output));
        }
        let recurrent = output_node.layer() <= input_layer;

        let innovation = match reuse {
            Some(innovation) if self.connection(innovation).is_some() => {
                return Err(MutationError::DuplicateInnovation(innovation));
            }
            Some(innovation) => innovation,
            None => {
                let innovation = context.new_innovation();
                context.ledger_mut().record(HistoricEntry {
                    modification: Modification::Add,
                    innovation,
                    in_node: input,
                    out_node: output,
                    new_node: None,
                });
                innovation
            }
        };
        let (config, rng) = context.config_and_rng();
        let weight = ConnectionGene::random_weight(config, rng);

        self.insert_connection(ConnectionGene::new(
            innovation, input, output, weight, recurrent,
        ));
        debug!(innovation, input, output, recurrent, "added connection");
        Ok(innovation)
    }

    /// Splits a connection in two by inserting a new hidden
    /// node in its path. The split connection is disabled,
    /// and two enabled connections are created: one into the
    /// new node, with a weight of 1, and one out of it,
    /// carrying the split connection's weight.
    ///
    /// The new node is placed right after the input node's
    /// layer, or right after the output node's layer if the
    /// split connection is recurrent. Layers of the nodes
    /// around it are then pushed forward wherever needed to
    /// keep every connection's recurrence unchanged.
    ///
    /// If `reuse_innovation` and `reuse_node` are given (as
    /// recorded in the ledger for an identical split), the
    /// incoming connection and new node take those ids, and the
    /// outgoing connection takes the one recorded for it. If the
    /// genome already holds `reuse_node`, fresh ids are used.
    ///
    /// Returns the innovation number of the incoming connection,
    /// the new node's id, and the outgoing connection's innovation
    /// number, in that order.
    ///
    /// # Errors
    /// Fails without changing the genome if there is
    /// no connection with the given innovation number.
    ///
    /// # Examples
    /// ```
    /// use rtneat_nn::genomics::{EvolutionContext, GeneticConfig, Genome, Layer, NodeType};
    ///
    /// let mut context = EvolutionContext::seeded(GeneticConfig::zero(), 0);
    /// let mut genome = Genome::generate(&mut context, 1, 1);
    /// let split = genome.add_connection(&mut context, 0, 1, None).unwrap();
    /// genome.connection_mut(split).unwrap().set_weight(0.7);
    ///
    /// let (incoming, node, outgoing) = genome
    ///     .split_connection(&mut context, split, None, None)
    ///     .unwrap();
    ///
    /// let connections: Vec<_> = genome
    ///     .connections()
    ///     .iter()
    ///     .map(|c| (c.input(), c.output(), c.weight(), c.enabled()))
    ///     .collect();
    /// assert_eq!(connections, vec![
    ///     (0, 1, 0.7, false),
    ///     (0, node, 1.0, true),
    ///     (node, 1, 0.7, true),
    /// ]);
    /// assert_eq!((incoming, outgoing), (1, 2));
    ///
    /// let node = genome.node(node).unwrap();
    /// assert_eq!(node.node_type(), NodeType::Hidden);
    /// assert_eq!(node.layer(), Layer::Hidden(0));
    /// ```
    pub fn split_connection(
        &mut self,
        context: &mut EvolutionContext,
        innovation: Innovation,
        reuse_innovation: Option<Innovation>,
        reuse_node: Option<NodeId>,
    ) -> Result<(Innovation, NodeId, Innovation), MutationError> {
        let index = self
            .connection_position(innovation)
            .map_err(|_| MutationError::UnknownConnection(innovation))?;
        let split = self.connections[index].clone();
        let (input, output) = split.endpoints();
        let (input_layer, output_node) = match (self.node(input), self.node(output)) {
            (Some(i), Some(o)) => (i.layer(), o),
            _ => return Err(MutationError::NonexistentEndpoints(input, output)),
        };
        let (output_layer, output_type) = (output_node.layer(), output_node.node_type());

        let reuse = match (reuse_innovation, reuse_node) {
            (Some(innovation), Some(node)) if self.node(node).is_none() => Some((innovation, node)),
            _ => None,
        };
        let (incoming, new_node, outgoing) = match reuse {
            Some((incoming, new_node)) => {
                let recorded = context
                    .ledger()
                    .find(new_node, Modification::Add, output)
                    .map(|e| e.innovation);
                let outgoing = match recorded {
                    Some(outgoing) => outgoing,
                    None => Self::record_add(context, new_node, output),
                };
                (incoming, new_node, outgoing)
            }
            None => Self::record_split(context, input, output),
        };

        let base = if split.recurrent() { output_layer } else { input_layer };
        let layer = base
            .successor()
            .unwrap_or_else(|| self.layer_past_hidden_neighbours(output));

        self.connections[index].set_enabled(false);
        self.push_node(NodeGene::with_layer(new_node, NodeType::Hidden, layer));
        let outgoing_recurrent = if output_type == NodeType::Hidden {
            split.recurrent()
        } else {
            output_layer <= layer
        };
        self.insert_connection(ConnectionGene::new(
            incoming,
            input,
            new_node,
            1.0,
            layer <= input_layer,
        ));
        self.insert_connection(ConnectionGene::new(
            outgoing,
            new_node,
            output,
            split.weight(),
            outgoing_recurrent,
        ));
        self.propagate_layers(new_node);
        debug_assert!(self.is_recurrence_consistent(), "inconsistent layers in {}", self);

        debug!(innovation, input, output, new_node, %layer, "split connection");
        Ok((incoming, new_node, outgoing))
    }

    fn record_add(context: &mut EvolutionContext, input: NodeId, output: NodeId) -> Innovation {
        let innovation = context.new_innovation();
        context.ledger_mut().record(HistoricEntry {
            modification: Modification::Add,
            innovation,
            in_node: input,
            out_node: output,
            new_node: None,
        });
        innovation
    }

    fn record_split(
        context: &mut EvolutionContext,
        input: NodeId,
        output: NodeId,
    ) -> (Innovation, NodeId, Innovation) {
        let incoming = context.new_innovation();
        let new_node = context.new_node();
        context.ledger_mut().record(HistoricEntry {
            modification: Modification::Split,
            innovation: incoming,
            in_node: input,
            out_node: output,
            new_node: Some(new_node),
        });
        context.ledger_mut().record(HistoricEntry {
            modification: Modification::Add,
            innovation: incoming,
            in_node: input,
            out_node: new_node,
            new_node: None,
        });
        let outgoing = Self::record_add(context, new_node, output);
        (incoming, new_node, outgoing)
    }

    /// Returns the hidden layer right after every hidden
    /// neighbour of `id`, or `Hidden(0)` if it has none.
    fn layer_past_hidden_neighbours(&self, id: NodeId) -> Layer {
        let node = match self.node(id) {
            Some(node) => node,
            None => return Layer::Hidden(0),
        };
        node.inputs()
            .iter()
            .chain(node.outputs())
            .filter_map(|innovation| self.connection(*innovation))
            .flat_map(|c| [c.input(), c.output()])
            .filter_map(|n| self.node(n).and_then(|n| n.layer().depth()))
            .max()
            .map_or(Layer::Hidden(0), |depth| Layer::Hidden(depth + 1))
    }

    /// Pushes hidden layers forward, starting at the node `start`,
    /// until every connection's layers agree with its recurrence:
    /// feed-forward connections must end on a later layer than
    /// they start, and recurrent ones must not.
    fn propagate_layers(&mut self, start: NodeId) {
        let mut queue = VecDeque::from([start]);
        while let Some(id) = queue.pop_front() {
            let node = match self.node(id) {
                Some(node) => node,
                None => continue,
            };
            let layer = node.layer();
            let mut moves = vec![];
            if let Some(next) = layer.successor() {
                for connection in node.outputs().iter().filter_map(|i| self.connection(*i)) {
                    if !connection.recurrent() {
                        moves.push((connection.output(), next));
                    }
                }
            }
            for connection in node.inputs().iter().filter_map(|i| self.connection(*i)) {
                if connection.recurrent() {
                    moves.push((connection.input(), layer));
                }
            }

            for (neighbour, minimum) in moves {
                if let Some(node) = self.node_mut(neighbour) {
                    if node.node_type() == NodeType::Hidden && node.layer() < minimum {
                        node.set_layer(minimum);
                        queue.push_back(neighbour);
                    }
                }
            }
        }
    }

    /// Adds a node to the genome. Its id is reserved in the
    /// context, so later splits never hand it out again.
    ///
    /// # Errors
    /// Fails if a node with the same id is already present.
    pub fn add_node(
        &mut self,
        context: &mut EvolutionContext,
        node: NodeGene,
    ) -> Result<(), MutationError> {
        if self.node(node.id()).is_some() {
            return Err(MutationError::DuplicateNode(node.id()));
        }
        context.reserve_nodes(node.id() + 1);
        debug!(node = node.id(), "added node");
        self.push_node(node.detached());
        Ok(())
    }

    /// Sets whether a connection is expressed in the phenotype.
    ///
    /// # Errors
    /// Fails if there is no connection with the
    /// given innovation number.
    pub fn activate_connection(
        &mut self,
        innovation: Innovation,
        enabled: bool,
    ) -> Result<(), MutationError> {
        self.connection_mut(innovation)
            .map(|c| c.set_enabled(enabled))
            .ok_or(MutationError::UnknownConnection(innovation))
    }

    /// Returns whether every connection's recurrence agrees with
    /// the layers of its endpoints: a connection is recurrent
    /// exactly when its output node does not sit on a later
    /// layer than its input node.
    pub fn is_recurrence_consistent(&self) -> bool {
        self.connections.iter().all(|c| {
            match (self.node(c.input()), self.node(c.output())) {
                (Some(i), Some(o)) => c.recurrent() == (o.layer() <= i.layer()),
                _ => false,
            }
        })
    }

    /// Derives every connection's recurrence from
    /// the layers of its endpoints.
    pub(crate) fn refresh_recurrence(&mut self) {
        for index in 0..self.connections.len() {
            let (input, output) = self.connections[index].endpoints();
            if let (Some(i), Some(o)) = (self.node(input), self.node(output)) {
                let recurrent = o.layer() <= i.layer();
                self.connections[index].set_recurrent(recurrent);
            }
        }
    }

    /// Returns whether a connection from `input`
    /// to `output` would be recurrent.
    pub(crate) fn would_be_recurrent(&self, input: NodeId, output: NodeId) -> bool {
        match (self.node(input), self.node(output)) {
            (Some(i), Some(o)) => o.layer() <= i.layer(),
            _ => false,
        }
    }

    /// Returns whether `input` is connected to `output`,
    /// whether the connection is enabled or not.
    pub fn are_connected(&self, input: NodeId, output: NodeId) -> bool {
        self.node(input).map_or(false, |node| {
            node.outputs()
                .iter()
                .filter_map(|i| self.connection(*i))
                .any(|c| c.output() == output)
        })
    }

    fn push_node(&mut self, node: NodeGene) {
        self.node_index.insert(node.id(), self.nodes.len());
        self.nodes.push(node);
    }

    /// Inserts a connection at its place in innovation order,
    /// and registers it with its endpoints. Both endpoints
    /// must be present.
    fn insert_connection(&mut self, connection: ConnectionGene) {
        let (innovation, (input, output)) = (connection.innovation(), connection.endpoints());
        match self.connection_position(innovation) {
            Ok(_) => debug_assert!(false, "duplicate innovation {}", innovation),
            Err(index) => {
                self.connections.insert(index, connection);
                if let Some(node) = self.node_mut(input) {
                    node.add_output(innovation);
                }
                if let Some(node) = self.node_mut(output) {
                    node.add_input(innovation);
                }
            }
        }
    }

    fn connection_position(&self, innovation: Innovation) -> Result<usize, usize> {
        self.connections
            .binary_search_by_key(&innovation, ConnectionGene::innovation)
    }

    pub fn node(&self, id: NodeId) -> Option<&NodeGene> {
        self.node_index.get(&id).map(|&i| &self.nodes[i])
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut NodeGene> {
        match self.node_index.get(&id) {
            Some(&i) => Some(&mut self.nodes[i]),
            None => None,
        }
    }

    pub fn connection(&self, innovation: Innovation) -> Option<&ConnectionGene> {
        self.connection_position(innovation)
            .ok()
            .map(|i| &self.connections[i])
    }

    /// Returns a mutable reference to a connection,
    /// to adjust its weight or expression.
    pub fn connection_mut(&mut self, innovation: Innovation) -> Option<&mut ConnectionGene> {
        match self.connection_position(innovation) {
            Ok(i) => Some(&mut self.connections[i]),
            Err(_) => None,
        }
    }

    /// Returns the genome's nodes.
    pub fn nodes(&self) -> &[NodeGene] {
        &self.nodes
    }

    /// Returns the genome's connections, in
    /// ascending innovation order.
    pub fn connections(&self) -> &[ConnectionGene] {
        &self.connections
    }
}

impl Evolvable for Genome {
    type Context = EvolutionContext;

    fn cross_over(&self, other: &Genome, dominance: Dominance, context: &mut EvolutionContext) -> Genome {
        Genome::cross_over(self, other, dominance, context)
    }

    fn mutate(&mut self, context: &mut EvolutionContext) {
        Genome::mutate(self, context)
    }

    fn distance(&self, other: &Genome, context: &EvolutionContext) -> Option<f64> {
        Some(Genome::distance(self, other, context.config()))
    }
}

impl fmt::Display for Genome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Genome {{ nodes: [")?;
        for (i, node) in self.nodes.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}@{}", node.id(), node.layer())?;
        }
        write!(f, "], connections: [")?;
        for (i, connection) in self.connections.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", connection)?;
        }
        write!(f, "] }}")
    }
}
