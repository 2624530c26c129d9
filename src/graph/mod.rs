pub mod components;
pub mod flow_network;
pub mod helpers;
