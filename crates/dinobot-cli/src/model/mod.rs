pub(crate) mod checkpoint_file;
pub(crate) mod strategy_model;
