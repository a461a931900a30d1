// lexflow-common: practice records, remote-row mapping and pure queries

pub mod agenda;
pub mod calendar;
pub mod document;
pub mod hearing;
pub mod mapper;
pub mod query;
pub mod seed;
pub mod types;
