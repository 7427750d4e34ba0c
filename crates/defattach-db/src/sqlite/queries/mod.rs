pub mod default_attachments;
pub mod schema;
pub mod tenants;
