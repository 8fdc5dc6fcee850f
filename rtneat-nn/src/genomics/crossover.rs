use super::{ConnectionGene, EvolutionContext, Genome, NodeType};

use rand::Rng;
use rtneat::{Context, Dominance};

impl Genome {
    /// Combines two genomes.
    ///
    /// Connections are aligned by innovation number. Matching
    /// connections get the mean of both parents' weights, and are
    /// disabled if disabled in either parent, unless reactivated
    /// with the [reactivation chance]. Connections present in a
    /// single parent are inherited from the dominant parent, or
    /// from both if `dominance` is [`Equal`].
    ///
    /// The child holds every input, output and bias node of the
    /// dominant parent (`self` on [`Equal`]), plus copies of the
    /// endpoints of its inherited connections.
    ///
    /// [reactivation chance]: super::GeneticConfig::reactivation_chance
    /// [`Equal`]: Dominance::Equal
    ///
    /// # Examples
    /// ```
    /// use rtneat::Dominance;
    /// use rtneat_nn::genomics::{EvolutionContext, GeneticConfig, Genome};
    ///
    /// let mut context = EvolutionContext::seeded(GeneticConfig::zero(), 0);
    /// let mut parent = Genome::generate(&mut context, 1, 1);
    /// let innovation = parent.add_connection(&mut context, 0, 1, None).unwrap();
    /// let mut other = parent.clone();
    /// parent.connection_mut(innovation).unwrap().set_weight(1.0);
    /// other.connection_mut(innovation).unwrap().set_weight(-0.5);
    ///
    /// let child = parent.cross_over(&other, Dominance::Equal, &mut context);
    /// assert_eq!(child.connections().len(), 1);
    /// assert_eq!(child.connections()[0].weight(), 0.25);
    /// ```
    pub fn cross_over(
        &self,
        other: &Genome,
        dominance: Dominance,
        context: &mut EvolutionContext,
    ) -> Genome {
        let dominant = match dominance {
            Dominance::OtherBetter => other,
            _ => self,
        };
        let reactivation = context.config().reactivation_chance;
        let (ours, theirs) = (&self.connections, &other.connections);
        let (mut i, mut j) = (0, 0);
        let mut inherited: Vec<(ConnectionGene, &Genome)> = vec![];

        while i < ours.len() || j < theirs.len() {
            match (ours.get(i), theirs.get(j)) {
                (Some(a), Some(b)) if a.innovation() == b.innovation() => {
                    let mut gene = a.clone();
                    gene.set_weight((a.weight() + b.weight()) / 2.0);
                    let enabled = (a.enabled() && b.enabled())
                        || context.rng().gen::<f64>() < reactivation;
                    gene.set_enabled(enabled);
                    inherited.push((gene, dominant));
                    i += 1;
                    j += 1;
                }
                (Some(a), Some(b)) if a.innovation() < b.innovation() => {
                    if dominance != Dominance::OtherBetter {
                        inherited.push((a.clone(), self));
                    }
                    i += 1;
                }
                (Some(a), None) => {
                    if dominance != Dominance::OtherBetter {
                        inherited.push((a.clone(), self));
                    }
                    i += 1;
                }
                (_, Some(b)) => {
                    if dominance != Dominance::CurrentBetter {
                        inherited.push((b.clone(), other));
                    }
                    j += 1;
                }
                (None, None) => break,
            }
        }

        let mut child = Genome::default();
        let mut nodes: Vec<_> = dominant
            .nodes
            .iter()
            .filter(|n| n.node_type() != NodeType::Hidden)
            .map(|n| n.detached())
            .collect();
        for (gene, parent) in &inherited {
            for id in [gene.input(), gene.output()] {
                if nodes.iter().all(|n| n.id() != id) {
                    if let Some(node) = parent.node(id) {
                        nodes.push(node.detached());
                    }
                }
            }
        }
        nodes.sort_by_key(|n| (n.layer(), n.id()));
        for node in nodes {
            child.push_node(node);
        }

        for (gene, _) in inherited {
            let (input, output) = gene.endpoints();
            let bound = child.node(input).is_some() && child.node(output).is_some();
            if bound && !child.are_connected(input, output) {
                child.insert_connection(gene);
            }
        }
        child.refresh_recurrence();
        child
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genomics::{GeneticConfig, Layer};

    fn context(reactivation_chance: f64) -> EvolutionContext {
        EvolutionContext::seeded(
            GeneticConfig {
                weight_bound: 1.0,
                reactivation_chance,
                ..GeneticConfig::zero()
            },
            11,
        )
    }

    /// Two genomes sharing a base connection, the first with
    /// a split of it, the second with an extra connection.
    fn parents(context: &mut EvolutionContext) -> (Genome, Genome) {
        let mut first = Genome::generate(context, 2, 1);
        let base = first.connect(context, 0, 2).unwrap();
        let mut second = first.clone();
        first.split(context, base).unwrap();
        second.connect(context, 1, 2).unwrap();
        (first, second)
    }

    #[test]
    fn identical_parents_make_identical_children() {
        let mut context = context(0.0);
        let (parent, _) = parents(&mut context);
        let child = parent.cross_over(&parent, Dominance::Equal, &mut context);
        assert_eq!(child.connections(), parent.connections());
        assert_eq!(child.nodes().len(), parent.nodes().len());
    }

    #[test]
    fn dominant_parent_keeps_its_genes() {
        let mut context = context(0.0);
        let (first, second) = parents(&mut context);

        let child = first.cross_over(&second, Dominance::CurrentBetter, &mut context);
        let innovations: Vec<_> = child.connections().iter().map(|c| c.innovation()).collect();
        assert_eq!(innovations, vec![0, 1, 2]);
        assert_eq!(child.nodes().len(), 4);

        let child = first.cross_over(&second, Dominance::OtherBetter, &mut context);
        let innovations: Vec<_> = child.connections().iter().map(|c| c.innovation()).collect();
        assert_eq!(innovations, vec![0, 3]);
        assert_eq!(child.nodes().len(), 3);
    }

    #[test]
    fn equal_parents_share_everything() {
        let mut context = context(0.0);
        let (first, second) = parents(&mut context);
        let child = first.cross_over(&second, Dominance::Equal, &mut context);
        let innovations: Vec<_> = child.connections().iter().map(|c| c.innovation()).collect();
        assert_eq!(innovations, vec![0, 1, 2, 3]);
        // Disabled in the first parent only.
        assert!(!child.connection(0).unwrap().enabled());
        assert!(child.is_recurrence_consistent());
    }

    #[test]
    fn trailing_excess_genes_follow_dominance() {
        let mut context = context(0.0);
        let mut base = Genome::generate(&mut context, 2, 1);
        base.connect(&mut context, 0, 2).unwrap();
        let mut grown = base.clone();
        grown.connect(&mut context, 1, 2).unwrap();
        grown.split(&mut context, 1).unwrap();

        let child = grown.cross_over(&base, Dominance::CurrentBetter, &mut context);
        let innovations: Vec<_> = child.connections().iter().map(|c| c.innovation()).collect();
        assert_eq!(innovations, vec![0, 1, 2, 3]);

        let child = grown.cross_over(&base, Dominance::OtherBetter, &mut context);
        let innovations: Vec<_> = child.connections().iter().map(|c| c.innovation()).collect();
        assert_eq!(innovations, vec![0]);
    }

    #[test]
    fn disabled_genes_may_be_reactivated() {
        let mut context = context(1.0);
        let (first, second) = parents(&mut context);
        let child = first.cross_over(&second, Dominance::Equal, &mut context);
        assert!(child.connection(0).unwrap().enabled());
    }

    #[test]
    fn child_nodes_are_sorted_and_unique() {
        let mut context = context(0.0);
        let (first, second) = parents(&mut context);
        let child = second.cross_over(&first, Dominance::Equal, &mut context);

        let keys: Vec<_> = child.nodes().iter().map(|n| (n.layer(), n.id())).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(keys, sorted);
        assert_eq!(child.nodes()[3].layer(), Layer::Output);
    }
}
