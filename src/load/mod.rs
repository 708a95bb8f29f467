pub(crate) mod decompile;
pub(crate) mod pipeline;
pub(crate) mod staging;
