use super::{GeneticConfig, HistoricLedger};
use crate::{Innovation, NodeId};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rtneat::{Context, Rates};

/// Run-wide state of a neuroevolution run: the innovation
/// and node id counters, the historic ledger, the genetic
/// configuration and the random source.
///
/// Every genome of a run must be created and mutated
/// against the same context. Independent runs use
/// independent contexts.
#[derive(Debug, Clone)]
pub struct EvolutionContext {
    next_innovation: Innovation,
    next_node: NodeId,
    ledger: HistoricLedger,
    config: GeneticConfig,
    rng: ChaCha8Rng,
}

impl EvolutionContext {
    /// Creates a context whose random source is seeded from
    /// `seed`. Two runs with the same seed and the same
    /// sequence of operations produce the same genomes.
    ///
    /// # Examples
    /// ```
    /// use rtneat_nn::genomics::{EvolutionContext, GeneticConfig};
    ///
    /// let context = EvolutionContext::seeded(GeneticConfig::zero(), 42);
    /// assert_eq!(context.next_innovation(), 0);
    /// assert!(context.ledger().is_empty());
    /// ```
    pub fn seeded(config: GeneticConfig, seed: u64) -> EvolutionContext {
        EvolutionContext::with_rng(config, ChaCha8Rng::seed_from_u64(seed))
    }

    /// Creates a context whose random source is seeded
    /// from system entropy.
    pub fn new(config: GeneticConfig) -> EvolutionContext {
        EvolutionContext::with_rng(config, ChaCha8Rng::from_entropy())
    }

    fn with_rng(config: GeneticConfig, rng: ChaCha8Rng) -> EvolutionContext {
        EvolutionContext {
            next_innovation: 0,
            next_node: 0,
            ledger: HistoricLedger::new(),
            config,
            rng,
        }
    }

    pub fn config(&self) -> &GeneticConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut GeneticConfig {
        &mut self.config
    }

    pub fn ledger(&self) -> &HistoricLedger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut HistoricLedger {
        &mut self.ledger
    }

    /// Returns the innovation number the next
    /// new connection will be given.
    pub fn next_innovation(&self) -> Innovation {
        self.next_innovation
    }

    /// Returns the id the next new node will be given.
    pub fn next_node(&self) -> NodeId {
        self.next_node
    }

    pub(crate) fn new_innovation(&mut self) -> Innovation {
        let innovation = self.next_innovation;
        self.next_innovation += 1;
        innovation
    }

    pub(crate) fn new_node(&mut self) -> NodeId {
        let id = self.next_node;
        self.next_node += 1;
        id
    }

    /// Makes sure node ids below `id` are never handed out.
    pub(crate) fn reserve_nodes(&mut self, id: NodeId) {
        self.next_node = self.next_node.max(id);
    }

    /// Splits the borrow of the context into the
    /// configuration and the random source.
    pub(crate) fn config_and_rng(&mut self) -> (&GeneticConfig, &mut ChaCha8Rng) {
        (&self.config, &mut self.rng)
    }
}

impl Context for EvolutionContext {
    type Rng = ChaCha8Rng;

    fn rng(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }

    fn rates(&self) -> &Rates {
        &self.config.rates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn seeded_runs_agree() {
        let mut a = EvolutionContext::seeded(GeneticConfig::zero(), 9);
        let mut b = EvolutionContext::seeded(GeneticConfig::zero(), 9);
        let xs: Vec<u32> = (0..8).map(|_| a.rng().gen()).collect();
        let ys: Vec<u32> = (0..8).map(|_| b.rng().gen()).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn counters() {
        let mut context = EvolutionContext::seeded(GeneticConfig::zero(), 0);
        assert_eq!(context.new_innovation(), 0);
        assert_eq!(context.new_innovation(), 1);
        context.reserve_nodes(3);
        assert_eq!(context.new_node(), 3);
        context.reserve_nodes(1);
        assert_eq!(context.next_node(), 4);
    }
}
