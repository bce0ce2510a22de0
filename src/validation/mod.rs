//! This module implements the evaluation of embeddings on downstream tasks
//! - link prediction : held out edges against sampled negative edges, scored with a logistic regression on Hadamard products
//! - node classification : one vs rest logistic regression on node vectors, multi label
//!
//! All randomness comes from a Xoshiro256PlusPlus generator seeded from the parameters of each call,
//! so 2 calls with the same inputs give the same results and calls can run in parallel.
//!
//! references
//! - Graph embedding on biomedical networks: methods, applications and evaluations
//!     Yue, Wang, Huang et al. Bioinformatics 2020
//! - The Link-Prediction Problem for Social Networks Liben-Nowell Kleinberg
//!           2007 Journal AMS for Info. Science and Technology

pub mod params;

pub mod split;

pub mod negative;

pub mod features;

pub mod metrics;

pub mod link;

pub mod nodelabel;
