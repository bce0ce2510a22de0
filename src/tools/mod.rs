//! small utilities used by the splitter and the classifiers

pub mod degrees;

pub mod linalg;
