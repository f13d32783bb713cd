//! Semgrep integration: subprocess invocation and output handling

mod invoker;
mod normalize;
pub mod output;

pub use invoker::SemgrepInvoker;
pub use normalize::ResultNormalizer;
