pub mod decision;
pub mod remote;
pub mod repo;
