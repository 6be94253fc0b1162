pub mod error;
pub mod metrics;
pub mod net;
pub mod queue;
pub mod registry;
pub mod routing;
pub mod sim;
pub mod topo;

#[cfg(test)]
mod test;
