use crate::{Innovation, NodeId};

use std::fmt;

/// A NodeType indicates the function of
/// the node's network equivalent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeType {
    /// Input nodes, set from outside the network.
    Input,
    /// Output nodes, read from outside the network.
    Output,
    /// Hidden nodes, created by splitting connections.
    Hidden,
    /// A constant input fixed at 1.0.
    Bias,
}

impl NodeType {
    /// Returns whether connections may end at a node of this type.
    pub fn accepts_input(self) -> bool {
        matches!(self, NodeType::Hidden | NodeType::Output)
    }
}

/// The position of a node in the network, used to classify
/// connections as feed-forward or recurrent and to order
/// the evaluation of hidden nodes.
///
/// Inputs sit before every hidden layer, and outputs
/// after all of them:
/// ```
/// use rtneat_nn::genomics::Layer;
///
/// assert!(Layer::Input < Layer::Hidden(i64::MIN));
/// assert!(Layer::Hidden(2) < Layer::Hidden(3));
/// assert!(Layer::Hidden(i64::MAX) < Layer::Output);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Layer {
    Input,
    Hidden(i64),
    Output,
}

impl Layer {
    /// Returns the hidden layer right after `self`,
    /// or `None` for the output layer.
    ///
    /// # Examples
    /// ```
    /// use rtneat_nn::genomics::Layer;
    ///
    /// assert_eq!(Layer::Input.successor(), Some(Layer::Hidden(0)));
    /// assert_eq!(Layer::Hidden(4).successor(), Some(Layer::Hidden(5)));
    /// assert_eq!(Layer::Output.successor(), None);
    /// ```
    pub fn successor(self) -> Option<Layer> {
        match self {
            Layer::Input => Some(Layer::Hidden(0)),
            Layer::Hidden(n) => Some(Layer::Hidden(n + 1)),
            Layer::Output => None,
        }
    }

    /// Returns the depth of a hidden layer.
    pub fn depth(self) -> Option<i64> {
        match self {
            Layer::Hidden(n) => Some(n),
            _ => None,
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layer::Input => write!(f, "-inf"),
            Layer::Hidden(n) => write!(f, "{}", n),
            Layer::Output => write!(f, "+inf"),
        }
    }
}

/// Nodes are the structural elements of genomes
/// between which connections are created.
///
/// Each node keeps the innovation numbers of the
/// connections entering and leaving it.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct NodeGene {
    id: NodeId,
    node_type: NodeType,
    layer: Layer,
    inputs: Vec<Innovation>,
    outputs: Vec<Innovation>,
}

impl NodeGene {
    /// Generate a new unconnected node. Input and bias
    /// nodes are placed on the input layer, outputs on
    /// the output layer and hidden nodes on `Hidden(0)`.
    ///
    /// # Examples
    /// ```
    /// use rtneat_nn::genomics::{Layer, NodeGene, NodeType};
    ///
    /// let node = NodeGene::new(5, NodeType::Bias);
    /// assert_eq!(node.layer(), Layer::Input);
    /// assert_eq!(node.inputs().len(), 0);
    /// ```
    pub fn new(id: NodeId, node_type: NodeType) -> NodeGene {
        let layer = match node_type {
            NodeType::Input | NodeType::Bias => Layer::Input,
            NodeType::Hidden => Layer::Hidden(0),
            NodeType::Output => Layer::Output,
        };
        NodeGene::with_layer(id, node_type, layer)
    }

    /// Generate a new unconnected node on the given layer.
    pub fn with_layer(id: NodeId, node_type: NodeType, layer: Layer) -> NodeGene {
        NodeGene {
            id,
            node_type,
            layer,
            inputs: vec![],
            outputs: vec![],
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    pub fn layer(&self) -> Layer {
        self.layer
    }

    pub(crate) fn set_layer(&mut self, layer: Layer) {
        self.layer = layer;
    }

    /// Innovation numbers of the connections ending at the node.
    pub fn inputs(&self) -> &[Innovation] {
        &self.inputs
    }

    /// Innovation numbers of the connections starting at the node.
    pub fn outputs(&self) -> &[Innovation] {
        &self.outputs
    }

    pub(crate) fn add_input(&mut self, innovation: Innovation) {
        debug_assert!(!self.inputs.contains(&innovation));
        self.inputs.push(innovation);
    }

    pub(crate) fn add_output(&mut self, innovation: Innovation) {
        debug_assert!(!self.outputs.contains(&innovation));
        self.outputs.push(innovation);
    }

    /// Returns a copy of the node without its connections.
    pub(crate) fn detached(&self) -> NodeGene {
        NodeGene::with_layer(self.id, self.node_type, self.layer)
    }
}
