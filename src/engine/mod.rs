pub(crate) mod classify;
pub(crate) mod compose;
pub(crate) mod composite;
pub(crate) mod resolve;
