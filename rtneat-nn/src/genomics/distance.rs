use super::{GeneticConfig, Genome};

impl Genome {
    /// Returns the genetic distance between two genomes.
    ///
    /// Disjoint connections (unmatched within the innovation
    /// range shared by both genomes) and excess connections
    /// (beyond the other genome's last innovation) are counted
    /// separately, and the mean absolute weight difference
    /// of matching connections is taken (0 when nothing
    /// matches). The result is
    ///
    /// `excess_gene_factor * E + disjoint_gene_factor * D + common_weight_factor * W`
    ///
    /// # Examples
    /// ```
    /// use rtneat_nn::genomics::{EvolutionContext, GeneticConfig, Genome};
    ///
    /// let config = GeneticConfig {
    ///     excess_gene_factor: 1.0,
    ///     disjoint_gene_factor: 1.0,
    ///     common_weight_factor: 0.5,
    ///     ..GeneticConfig::zero()
    /// };
    /// let mut context = EvolutionContext::seeded(config.clone(), 0);
    /// let mut genome = Genome::generate(&mut context, 2, 1);
    /// genome.add_connection(&mut context, 0, 2, None).unwrap();
    /// assert_eq!(genome.distance(&genome, &config), 0.0);
    ///
    /// let mut other = genome.clone();
    /// other.add_connection(&mut context, 1, 2, None).unwrap();
    /// assert_eq!(genome.distance(&other, &config), 1.0);
    /// ```
    pub fn distance(&self, other: &Genome, config: &GeneticConfig) -> f64 {
        let (ours, theirs) = (&self.connections, &other.connections);
        let (mut i, mut j) = (0, 0);
        let (mut disjoint, mut matching) = (0usize, 0usize);
        let mut weight_difference = 0.0;

        while i < ours.len() && j < theirs.len() {
            let (a, b) = (&ours[i], &theirs[j]);
            if a.innovation() == b.innovation() {
                weight_difference += (a.weight() - b.weight()).abs();
                matching += 1;
                i += 1;
                j += 1;
            } else if a.innovation() < b.innovation() {
                disjoint += 1;
                i += 1;
            } else {
                disjoint += 1;
                j += 1;
            }
        }
        let excess = (ours.len() - i) + (theirs.len() - j);
        let mean_difference = if matching > 0 {
            weight_difference / matching as f64
        } else {
            0.0
        };

        config.excess_gene_factor * excess as f64
            + config.disjoint_gene_factor * disjoint as f64
            + config.common_weight_factor * mean_difference
    }
}
