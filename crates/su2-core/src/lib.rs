//! Recoupling-coefficient toolkit for SU(2): a generic three-term recurrence
//! engine with forward/backward stability analysis, Wigner 3j/6j/9j
//! evaluators, and the closed-form hypergeometric product formula.

pub mod domain;
pub mod numerics;
pub mod recurrence;
pub mod survey;
pub mod symbols;
