pub mod compile;
pub mod romanize;
pub mod sexp;
pub mod unicode;
