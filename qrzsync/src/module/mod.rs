pub mod dedup;
pub mod enrich;
pub mod http;
pub mod ledger;
pub mod logbook;
pub mod pipeline;
pub mod xml_lookup;
