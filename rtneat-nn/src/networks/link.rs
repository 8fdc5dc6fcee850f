use std::fmt;

/// Network equivalent of an enabled connection gene,
/// stored with the node it feeds into.
#[derive(Clone, Copy, PartialEq)]
pub struct Link {
    pub source: usize,
    pub weight: f64,
    pub recurrent: bool,
}

impl Link {
    pub fn new(source: usize, weight: f64, recurrent: bool) -> Link {
        Link {
            source,
            weight,
            recurrent,
        }
    }

    /// Returns the link's contribution to its output node's
    /// input sum. Recurrent links carry the source's value
    /// from the previous activation.
    pub fn signal(&self, values: &[f64], memory: &[f64]) -> f64 {
        let source = if self.recurrent { memory } else { values };
        source[self.source] * self.weight
    }
}

impl fmt::Debug for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let arrow = if self.recurrent { "~>" } else { "->" };
        write!(f, "{} {} {:.9}", self.source, arrow, self.weight)
    }
}
