//! A network is the phenotype of a genome: its enabled
//! connections compiled into links between network nodes,
//! evaluated one discrete tick at a time.
//!
//! Links classified as recurrent in the genome read the
//! value their source had on the previous tick, which makes
//! cyclic topologies deterministic.
mod link;

use crate::genomics::{Genome, NodeType};
use crate::NodeId;
use link::Link;

use ahash::RandomState;
use thiserror::Error;

use std::collections::{HashMap, HashSet};
use std::fmt;

/// An error type indicating why a network could not be activated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    #[error("expected {expected} input values, got {actual}")]
    InputLength { expected: usize, actual: usize },
}

/// A layered neural network with memory for its recurrent links.
///
/// Nodes are stored inputs first, then bias nodes, hidden nodes
/// in layer order, and outputs last, which is also the order in
/// which they are evaluated.
#[derive(Clone, Debug)]
pub struct PhenotypeNetwork {
    input_count: usize,
    output_count: usize,
    hidden_layer_count: usize,
    first_evaluated: usize,
    node_ids: Box<[NodeId]>,
    values: Box<[f64]>,
    memory: Box<[f64]>,
    links: Box<[Box<[Link]>]>,
    remembered: Box<[usize]>,
}

impl PhenotypeNetwork {
    /// Compiles the enabled connections of a genome into a network.
    ///
    /// Hidden nodes without an enabled incoming connection or
    /// without an enabled outgoing one are left out, together
    /// with their links.
    ///
    /// # Examples
    /// ```
    /// use rtneat_nn::{
    ///     genomics::{EvolutionContext, GeneticConfig, Genome},
    ///     networks::PhenotypeNetwork,
    /// };
    ///
    /// let mut context = EvolutionContext::seeded(GeneticConfig::zero(), 0);
    /// let mut genome = Genome::generate(&mut context, 3, 2);
    /// let innovation = genome.add_connection(&mut context, 0, 3, None).unwrap();
    /// genome.split_connection(&mut context, innovation, None, None).unwrap();
    ///
    /// let network = PhenotypeNetwork::new(&genome);
    /// assert_eq!(network.input_count(), 3);
    /// assert_eq!(network.output_count(), 2);
    /// assert_eq!(network.hidden_layer_count(), 1);
    /// ```
    pub fn new(genome: &Genome) -> PhenotypeNetwork {
        let enabled: Vec<_> = genome.connections().iter().filter(|c| c.enabled()).collect();
        let fed: HashSet<_, RandomState> = enabled.iter().map(|c| c.output()).collect();
        let feeding: HashSet<_, RandomState> = enabled.iter().map(|c| c.input()).collect();

        let (mut inputs, mut biases, mut hidden, mut outputs) = (vec![], vec![], vec![], vec![]);
        for node in genome.nodes() {
            let key = (node.layer(), node.id());
            match node.node_type() {
                NodeType::Input => inputs.push(key),
                NodeType::Bias => biases.push(key),
                NodeType::Output => outputs.push(key),
                NodeType::Hidden => {
                    if fed.contains(&node.id()) && feeding.contains(&node.id()) {
                        hidden.push(key);
                    }
                }
            }
        }
        inputs.sort_unstable();
        biases.sort_unstable();
        hidden.sort_unstable();
        outputs.sort_unstable();

        let mut hidden_layers: Vec<_> = hidden.iter().map(|(layer, _)| *layer).collect();
        hidden_layers.dedup();

        let node_ids: Vec<NodeId> = inputs
            .iter()
            .chain(&biases)
            .chain(&hidden)
            .chain(&outputs)
            .map(|(_, id)| *id)
            .collect();
        let index_of: HashMap<_, _, RandomState> = node_ids
            .iter()
            .enumerate()
            .map(|(i, id)| (*id, i))
            .collect();

        let mut links = vec![vec![]; node_ids.len()];
        let mut remembered = vec![];
        for connection in enabled {
            let (input, output) = connection.endpoints();
            if let (Some(&source), Some(&target)) = (index_of.get(&input), index_of.get(&output)) {
                links[target].push(Link::new(source, connection.weight(), connection.recurrent()));
                if connection.recurrent() {
                    remembered.push(source);
                }
            }
        }
        remembered.sort_unstable();
        remembered.dedup();

        PhenotypeNetwork {
            input_count: inputs.len(),
            output_count: outputs.len(),
            hidden_layer_count: hidden_layers.len(),
            first_evaluated: inputs.len() + biases.len(),
            values: vec![0.0; node_ids.len()].into(),
            memory: vec![0.0; node_ids.len()].into(),
            node_ids: node_ids.into(),
            links: links.into_iter().map(|l| l.into()).collect(),
            remembered: remembered.into(),
        }
    }

    /// Sets the input values, evaluates the hidden
    /// layers and outputs, and returns the output values
    /// in ascending order of output node id.
    ///
    /// Each node takes the hyperbolic tangent of the weighted
    /// sum of its links. Bias nodes are fixed at 1.
    ///
    /// # Errors
    /// Fails if `inputs` does not hold exactly one
    /// value per input node.
    ///
    /// # Examples
    /// ```
    /// use rtneat_nn::{
    ///     genomics::{EvolutionContext, GeneticConfig, Genome},
    ///     networks::{NetworkError, PhenotypeNetwork},
    /// };
    ///
    /// let mut context = EvolutionContext::seeded(GeneticConfig::zero(), 0);
    /// let mut genome = Genome::generate(&mut context, 2, 1);
    /// let innovation = genome.add_connection(&mut context, 1, 2, None).unwrap();
    /// genome.connection_mut(innovation).unwrap().set_weight(-2.0);
    ///
    /// let mut network = PhenotypeNetwork::from(&genome);
    /// assert_eq!(network.feed_forward(&[0.3, 0.25]), Ok(vec![(-0.5f64).tanh()]));
    /// assert_eq!(
    ///     network.feed_forward(&[1.0]),
    ///     Err(NetworkError::InputLength { expected: 2, actual: 1 })
    /// );
    /// ```
    pub fn feed_forward(&mut self, inputs: &[f64]) -> Result<Vec<f64>, NetworkError> {
        if inputs.len() != self.input_count {
            return Err(NetworkError::InputLength {
                expected: self.input_count,
                actual: inputs.len(),
            });
        }
        self.values[..self.input_count].copy_from_slice(inputs);
        for bias in &mut self.values[self.input_count..self.first_evaluated] {
            *bias = 1.0;
        }

        for index in self.first_evaluated..self.values.len() {
            let sum: f64 = self.links[index]
                .iter()
                .map(|link| link.signal(&self.values, &self.memory))
                .sum();
            self.values[index] = sum.tanh();
        }
        for &source in self.remembered.iter() {
            self.memory[source] = self.values[source];
        }

        Ok(self.outputs().to_vec())
    }

    /// Returns the output values of the last activation.
    pub fn outputs(&self) -> &[f64] {
        &self.values[self.values.len() - self.output_count..]
    }

    /// Clears the values and memory of every node.
    ///
    /// # Examples
    /// ```
    /// use rtneat_nn::{
    ///     genomics::{EvolutionContext, GeneticConfig, Genome},
    ///     networks::PhenotypeNetwork,
    /// };
    ///
    /// let mut context = EvolutionContext::seeded(GeneticConfig::zero(), 0);
    /// let mut genome = Genome::generate(&mut context, 1, 1);
    /// let innovation = genome.add_connection(&mut context, 0, 1, None).unwrap();
    /// genome.connection_mut(innovation).unwrap().set_weight(1.0);
    ///
    /// let mut network = PhenotypeNetwork::from(&genome);
    /// network.feed_forward(&[1.0]).unwrap();
    /// assert_ne!(network.outputs()[0], 0.0);
    ///
    /// network.reset();
    /// assert_eq!(network.outputs()[0], 0.0);
    /// ```
    pub fn reset(&mut self) {
        self.values.iter_mut().for_each(|v| *v = 0.0);
        self.memory.iter_mut().for_each(|m| *m = 0.0);
    }

    pub fn input_count(&self) -> usize {
        self.input_count
    }

    pub fn output_count(&self) -> usize {
        self.output_count
    }

    /// Returns the number of distinct hidden
    /// layers left after pruning.
    pub fn hidden_layer_count(&self) -> usize {
        self.hidden_layer_count
    }

    /// Returns the ids of the compiled nodes,
    /// in evaluation order.
    pub fn node_ids(&self) -> &[NodeId] {
        &self.node_ids
    }
}

impl From<&Genome> for PhenotypeNetwork {
    fn from(genome: &Genome) -> Self {
        PhenotypeNetwork::new(genome)
    }
}

impl fmt::Display for PhenotypeNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        (self as &dyn fmt::Debug).fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genomics::{EvolutionContext, GeneticConfig, NodeGene};

    fn context(bias: bool) -> EvolutionContext {
        EvolutionContext::seeded(
            GeneticConfig {
                bias,
                ..GeneticConfig::zero()
            },
            0,
        )
    }

    fn weighted(
        genome: &mut Genome,
        context: &mut EvolutionContext,
        input: NodeId,
        output: NodeId,
        weight: f64,
    ) {
        let innovation = genome.add_connection(context, input, output, None).unwrap();
        genome.connection_mut(innovation).unwrap().set_weight(weight);
    }

    #[test]
    fn single_link() {
        let mut context = context(false);
        let mut genome = Genome::generate(&mut context, 1, 1);
        weighted(&mut genome, &mut context, 0, 1, 0.5);
        let mut network = PhenotypeNetwork::new(&genome);
        for input in -20..=20 {
            let input = input as f64 / 10.0;
            network.reset();
            assert_eq!(network.feed_forward(&[input]).unwrap(), vec![(input * 0.5).tanh()]);
        }
    }

    #[test]
    fn empty_network_outputs_zero() {
        let mut context = context(false);
        let genome = Genome::generate(&mut context, 2, 3);
        let mut network = PhenotypeNetwork::new(&genome);
        assert_eq!(network.feed_forward(&[1.0, -1.0]).unwrap(), vec![0.0; 3]);
    }

    #[test]
    fn bias_is_constant() {
        let mut context = context(true);
        let mut genome = Genome::generate(&mut context, 1, 1);
        weighted(&mut genome, &mut context, 2, 1, 1.0);
        let mut network = PhenotypeNetwork::new(&genome);
        assert_eq!(network.input_count(), 1);
        for input in [-1.0, 0.0, 3.0] {
            assert_eq!(network.feed_forward(&[input]).unwrap(), vec![1.0f64.tanh()]);
        }
    }

    #[test]
    fn hidden_layers_in_order() {
        let mut context = context(false);
        let mut genome = Genome::generate(&mut context, 1, 1);
        weighted(&mut genome, &mut context, 0, 1, 0.5);
        let (into_first, _, _) = genome.split_connection(&mut context, 0, None, None).unwrap();
        genome.split_connection(&mut context, into_first, None, None).unwrap();

        let mut network = PhenotypeNetwork::new(&genome);
        assert_eq!(network.hidden_layer_count(), 2);
        assert_eq!(network.node_ids(), &[0, 3, 2, 1]);
        let output = network.feed_forward(&[0.8]).unwrap();
        assert_eq!(output, vec![(0.5 * 0.8f64.tanh().tanh()).tanh()]);
    }

    #[test]
    fn recurrent_links_read_memory() {
        let mut context = context(false);
        let mut genome = Genome::generate(&mut context, 1, 1);
        weighted(&mut genome, &mut context, 0, 1, 1.0);
        weighted(&mut genome, &mut context, 1, 1, 1.0);
        let mut network = PhenotypeNetwork::new(&genome);

        let first = network.feed_forward(&[0.5]).unwrap()[0];
        assert_eq!(first, 0.5f64.tanh());
        let second = network.feed_forward(&[0.5]).unwrap()[0];
        assert_eq!(second, (0.5 + first).tanh());

        network.reset();
        assert_eq!(network.feed_forward(&[0.5]).unwrap()[0], first);
    }

    #[test]
    fn disabled_connections_are_ignored() {
        let mut context = context(false);
        let mut genome = Genome::generate(&mut context, 2, 1);
        weighted(&mut genome, &mut context, 0, 2, 1.0);
        weighted(&mut genome, &mut context, 1, 2, 1.0);
        genome.activate_connection(1, false).unwrap();
        let mut network = PhenotypeNetwork::new(&genome);
        assert_eq!(network.feed_forward(&[0.5, 4.0]).unwrap(), vec![0.5f64.tanh()]);
    }

    #[test]
    fn dead_ends_are_pruned() {
        let mut context = context(false);
        let mut genome = Genome::generate(&mut context, 1, 1);
        genome.add_node(&mut context, NodeGene::new(5, NodeType::Hidden)).unwrap();
        weighted(&mut genome, &mut context, 0, 5, 1.0);
        weighted(&mut genome, &mut context, 0, 1, 1.0);
        let (_, hidden, outgoing) = genome.split_connection(&mut context, 1, None, None).unwrap();
        genome.activate_connection(outgoing, false).unwrap();

        let network = PhenotypeNetwork::new(&genome);
        assert_eq!(network.hidden_layer_count(), 0);
        assert!(!network.node_ids().contains(&5));
        assert!(!network.node_ids().contains(&hidden));
    }
}
