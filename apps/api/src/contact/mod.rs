// "Get in Touch" submissions: validation, persistence, and the form routes.

pub mod handlers;
pub mod store;
pub mod validation;
