use askama::Template;

use crate::application::toast::{ActiveToast, ToastCenter};

#[derive(Clone)]
pub struct AdminToastItem {
    pub id: String,
    pub kind: &'static str,
    pub icon: &'static str,
    pub text: String,
    pub ttl_ms: u64,
    pub leaving: bool,
}

impl From<&ActiveToast> for AdminToastItem {
    fn from(active: &ActiveToast) -> Self {
        let toast = &active.toast;
        Self {
            id: toast.id.to_string(),
            kind: toast.kind.as_variant(),
            icon: toast.kind.icon(),
            text: toast.text.clone(),
            ttl_ms: u64::try_from(toast.ttl.as_millis()).unwrap_or(u64::MAX),
            leaving: active.leaving,
        }
    }
}

#[derive(Template)]
#[template(path = "admin/toast_stack.html")]
pub struct AdminToastStackTemplate {
    pub toasts: Vec<AdminToastItem>,
}

impl AdminToastStackTemplate {
    pub fn from_center(center: &ToastCenter) -> Self {
        Self {
            toasts: center.snapshot().iter().map(AdminToastItem::from).collect(),
        }
    }
}
