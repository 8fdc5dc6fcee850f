use super::{EvolutionContext, Genome, Layer, Modification, MutationError, NodeType};
use crate::{Innovation, NodeId};

use rand::{seq::SliceRandom, Rng};
use rtneat::Context;
use tracing::trace;

use std::fmt::Debug;

impl Genome {
    /// Applies at most one kind of mutation to the genome:
    /// with the [connect rate] a connection is added; failing
    /// that, with the [split rate] a connection is split; failing
    /// that, a random weight is nudged with the [mutation rate],
    /// and a random connection is toggled on or off with the
    /// [activation rate].
    ///
    /// Mutations that find nothing to act on leave
    /// the genome unchanged.
    ///
    /// [connect rate]: rtneat::Rates::mutation_connect
    /// [split rate]: rtneat::Rates::mutation_split_connect
    /// [mutation rate]: rtneat::Rates::mutation
    /// [activation rate]: rtneat::Rates::mutation_activation
    ///
    /// # Examples
    /// ```
    /// use rtneat::Rates;
    /// use rtneat_nn::genomics::{EvolutionContext, GeneticConfig, Genome};
    ///
    /// let mut context = EvolutionContext::seeded(
    ///     GeneticConfig {
    ///         weight_bound: 1.0,
    ///         rates: Rates {
    ///             mutation_connect: 1.0,
    ///             ..Rates::zero()
    ///         },
    ///         ..GeneticConfig::zero()
    ///     },
    ///     0,
    /// );
    /// let mut genome = Genome::generate(&mut context, 2, 1);
    ///
    /// while genome.connections().len() < 2 {
    ///     genome.mutate(&mut context);
    /// }
    /// assert!(genome.connections().iter().all(|c| c.output() == 2));
    /// ```
    pub fn mutate(&mut self, context: &mut EvolutionContext) {
        let rates = context.rates().clone();
        if context.rng().gen::<f64>() < rates.mutation_connect {
            report("connect", self.mutate_add_connection(context));
        } else if context.rng().gen::<f64>() < rates.mutation_split_connect {
            report("split", self.mutate_split_connection(context));
        } else {
            if context.rng().gen::<f64>() < rates.mutation {
                report("weight", self.mutate_weight(context));
            }
            if context.rng().gen::<f64>() < rates.mutation_activation {
                report("toggle", self.mutate_toggle(context));
            }
        }
    }

    /// Connects two nodes, reusing the innovation number
    /// recorded in the ledger for the same pair if any.
    pub fn connect(
        &mut self,
        context: &mut EvolutionContext,
        input: NodeId,
        output: NodeId,
    ) -> Result<Innovation, MutationError> {
        let reuse = context
            .ledger()
            .find(input, Modification::Add, output)
            .map(|e| e.innovation);
        self.add_connection(context, input, output, reuse)
    }

    /// Splits a connection, reusing the ids recorded in the
    /// ledger for the same split if the genome doesn't
    /// already hold the node they introduced.
    ///
    /// # Examples
    /// ```
    /// use rtneat_nn::genomics::{EvolutionContext, GeneticConfig, Genome};
    ///
    /// let mut context = EvolutionContext::seeded(GeneticConfig::zero(), 0);
    /// let mut first = Genome::generate(&mut context, 1, 1);
    /// let innovation = first.connect(&mut context, 0, 1).unwrap();
    /// let mut second = first.clone();
    ///
    /// assert_eq!(
    ///     first.split(&mut context, innovation),
    ///     second.split(&mut context, innovation),
    /// );
    /// ```
    pub fn split(
        &mut self,
        context: &mut EvolutionContext,
        innovation: Innovation,
    ) -> Result<(Innovation, NodeId, Innovation), MutationError> {
        let (input, output) = self
            .connection(innovation)
            .ok_or(MutationError::UnknownConnection(innovation))?
            .endpoints();
        let reuse = context
            .ledger()
            .find_all(input, Modification::Split, output)
            .find(|e| e.new_node.map_or(false, |n| self.node(n).is_none()))
            .map(|e| (e.innovation, e.new_node));
        match reuse {
            Some((reuse_innovation, reuse_node)) => {
                self.split_connection(context, innovation, Some(reuse_innovation), reuse_node)
            }
            None => self.split_connection(context, innovation, None, None),
        }
    }

    /// Connects a random node to a random valid target it isn't
    /// connected to yet. A connection that would be recurrent is
    /// flipped around unless the [recurrence rate] allows it; the
    /// mutation fails if the flipped connection is invalid, still
    /// recurrent or already present.
    ///
    /// [recurrence rate]: rtneat::Rates::mutation_allow_recurrent
    fn mutate_add_connection(
        &mut self,
        context: &mut EvolutionContext,
    ) -> Result<Innovation, MutationError> {
        let source = self
            .nodes
            .choose(context.rng())
            .ok_or(MutationError::EmptyGenome("nodes"))?;
        let (source_id, source_type) = (source.id(), source.node_type());
        let candidates: Vec<NodeId> = self
            .nodes
            .iter()
            .filter(|n| can_link(source_type, n.node_type()))
            .filter(|n| !self.are_connected(source_id, n.id()))
            .map(|n| n.id())
            .collect();
        let target = *candidates
            .choose(context.rng())
            .ok_or(MutationError::NoCandidate(source_id))?;

        let (mut input, mut output) = (source_id, target);
        let allow_recurrent = context.rates().mutation_allow_recurrent;
        if self.would_be_recurrent(input, output) && context.rng().gen::<f64>() >= allow_recurrent {
            std::mem::swap(&mut input, &mut output);
            let flippable = match (self.node(input), self.node(output)) {
                (Some(i), Some(o)) => can_link(i.node_type(), o.node_type()),
                _ => false,
            };
            if !flippable
                || self.would_be_recurrent(input, output)
                || self.are_connected(input, output)
            {
                return Err(MutationError::InvalidFlip(input, output));
            }
        }
        self.connect(context, input, output)
    }

    /// Splits a random enabled connection, unless its input
    /// node sits on the [maximum split depth] or deeper.
    ///
    /// [maximum split depth]: super::GeneticConfig::max_split_depth
    fn mutate_split_connection(
        &mut self,
        context: &mut EvolutionContext,
    ) -> Result<(Innovation, NodeId, Innovation), MutationError> {
        let enabled: Vec<&_> = self.connections.iter().filter(|c| c.enabled()).collect();
        let connection = *enabled
            .choose(context.rng())
            .ok_or(MutationError::NoSplittableConnection)?;
        let innovation = connection.innovation();
        let input_layer = self
            .node(connection.input())
            .map_or(Layer::Input, |n| n.layer());
        if input_layer >= Layer::Hidden(context.config().max_split_depth) {
            return Err(MutationError::SplitTooDeep(innovation, input_layer));
        }
        self.split(context, innovation)
    }

    fn mutate_weight(&mut self, context: &mut EvolutionContext) -> Result<(), MutationError> {
        let index = self.random_connection_index(context)?;
        let (config, rng) = context.config_and_rng();
        self.connections[index].nudge_weight(config, rng);
        Ok(())
    }

    fn mutate_toggle(&mut self, context: &mut EvolutionContext) -> Result<(), MutationError> {
        let index = self.random_connection_index(context)?;
        let connection = &mut self.connections[index];
        connection.set_enabled(!connection.enabled());
        Ok(())
    }

    fn random_connection_index(&self, context: &mut EvolutionContext) -> Result<usize, MutationError> {
        if self.connections.is_empty() {
            return Err(MutationError::EmptyGenome("connections"));
        }
        Ok(context.rng().gen_range(0..self.connections.len()))
    }
}

/// Returns whether a connection may run from
/// a node of type `input` to one of type `output`.
fn can_link(input: NodeType, output: NodeType) -> bool {
    use NodeType::*;
    match input {
        Input | Bias | Hidden => matches!(output, Hidden | Output),
        Output => output == Hidden,
    }
}

fn report<T: Debug>(kind: &str, result: Result<T, MutationError>) {
    match result {
        Ok(value) => trace!(kind, ?value, "mutated"),
        Err(e) => trace!(kind, error = %e, "mutation skipped"),
    }
}
