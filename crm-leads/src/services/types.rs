pub type LeadsParams = crm_axum::params::RestParams;
