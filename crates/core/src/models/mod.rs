pub mod chart;
pub mod conversation;
pub mod market;
pub mod model;
pub mod portfolio;
pub mod settings;
pub mod trade;
pub mod view;
