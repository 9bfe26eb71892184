use askama::Template;

use crate::application::bulk::{BulkForm, FormField};

pub const BULK_FORM_ID: &str = "bulkActionForm";

/// Hidden form the bulk button submits; the browser follows the redirect.
#[derive(Template)]
#[template(path = "admin/bulk_form.html")]
pub struct AdminBulkFormTemplate {
    pub form_id: &'static str,
    pub method: &'static str,
    pub action: &'static str,
    pub fields: Vec<FormField>,
}

impl From<&BulkForm> for AdminBulkFormTemplate {
    fn from(form: &BulkForm) -> Self {
        Self {
            form_id: BULK_FORM_ID,
            method: form.method(),
            action: form.action_path,
            fields: form.fields.clone(),
        }
    }
}
