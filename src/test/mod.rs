mod config;
mod delay_model;
mod registry;
mod topologies;
