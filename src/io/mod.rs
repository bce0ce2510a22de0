//! io : graph and label files, embedding dumps, classifier persistence and result records.

pub mod csv;

pub mod embeddedbson;

pub mod embedtxt;

pub mod model;

pub mod output;

pub mod results;
