// groupwatch: activity snapshots for community groups
//
// This is the library root. Each module corresponds to a stage of the
// monitoring pass, from the shared request queue up to snapshot storage.

pub mod config;
pub mod directory;
pub mod fetch;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod sources;
pub mod status;
pub mod store;
