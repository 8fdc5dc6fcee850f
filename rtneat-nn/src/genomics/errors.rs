use super::Layer;
use crate::{Innovation, NodeId};

use thiserror::Error;

/// An error type indicating why a structural
/// or weight mutation could not be carried out.
/// The genome is left unchanged in every case.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MutationError {
    #[error("connection between nonexistent endpoint(s) {0} -> {1}")]
    NonexistentEndpoints(NodeId, NodeId),
    #[error("connection into node {0}, which does not accept inputs")]
    InvalidTarget(NodeId),
    #[error("nodes {0} -> {1} are already connected")]
    DuplicateConnection(NodeId, NodeId),
    #[error("connection with innovation {0} already present")]
    DuplicateInnovation(Innovation),
    #[error("no connection with innovation {0}")]
    UnknownConnection(Innovation),
    #[error("node with id {0} already present")]
    DuplicateNode(NodeId),
    #[error("no valid connection candidate from node {0}")]
    NoCandidate(NodeId),
    #[error("flipped connection {0} -> {1} is invalid")]
    InvalidFlip(NodeId, NodeId),
    #[error("no enabled connection to split")]
    NoSplittableConnection,
    #[error("connection {0} starts too deep to be split (layer {1})")]
    SplitTooDeep(Innovation, Layer),
    #[error("mutation on genome without {0}")]
    EmptyGenome(&'static str),
}
