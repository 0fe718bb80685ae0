pub mod lead;
pub mod leads_schema;
pub mod leads_service;
pub mod leads_shared;

pub use lead::{Lead, LeadStatus, NewLead, StatusUpdate, UnknownStatus};
pub use leads_service::LeadsService;
