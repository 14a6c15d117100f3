mod assignment;
mod common;
mod weighting;
