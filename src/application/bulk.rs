//! Bulk operations over the selected rows.
//!
//! Form-based flows build a hidden POST form that carries the CSRF token and
//! one input per selected id. The AJAX flow fires one DELETE per id and
//! aggregates the outcomes into toasts.

use std::fmt;

use serde::Serialize;
use thiserror::Error;
use url::form_urlencoded;

use crate::{
    application::{selection::SelectionSet, toast::Toast},
    domain::types::RecordId,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BulkAction {
    Delete,
    Activate,
    Deactivate,
    Publish,
    Archive,
    Reject,
    MarkNew,
    MarkPending,
    Resolve,
    StatusPending,
    StatusCompleted,
    StatusFailed,
    StatusCancelled,
}

impl BulkAction {
    pub const ALL: [BulkAction; 13] = [
        BulkAction::Delete,
        BulkAction::Activate,
        BulkAction::Deactivate,
        BulkAction::Publish,
        BulkAction::Archive,
        BulkAction::Reject,
        BulkAction::MarkNew,
        BulkAction::MarkPending,
        BulkAction::Resolve,
        BulkAction::StatusPending,
        BulkAction::StatusCompleted,
        BulkAction::StatusFailed,
        BulkAction::StatusCancelled,
    ];

    /// Value submitted in the `action` field.
    pub fn as_value(self) -> &'static str {
        match self {
            BulkAction::Delete => "delete",
            BulkAction::Activate => "activate",
            BulkAction::Deactivate => "deactivate",
            BulkAction::Publish => "publish",
            BulkAction::Archive => "archive",
            BulkAction::Reject => "reject",
            BulkAction::MarkNew => "new",
            BulkAction::MarkPending => "pending",
            BulkAction::Resolve => "resolve",
            BulkAction::StatusPending => "status_pending",
            BulkAction::StatusCompleted => "status_completed",
            BulkAction::StatusFailed => "status_failed",
            BulkAction::StatusCancelled => "status_cancelled",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BulkAction::Delete => "Xóa",
            BulkAction::Activate => "Kích hoạt",
            BulkAction::Deactivate => "Vô hiệu hóa",
            BulkAction::Publish => "Xuất bản",
            BulkAction::Archive => "Lưu trữ",
            BulkAction::Reject => "Từ chối",
            BulkAction::MarkNew => "Đánh dấu mới",
            BulkAction::MarkPending => "Đang xử lý",
            BulkAction::Resolve => "Đã giải quyết",
            BulkAction::StatusPending => "Chờ xử lý",
            BulkAction::StatusCompleted => "Hoàn thành",
            BulkAction::StatusFailed => "Thất bại",
            BulkAction::StatusCancelled => "Đã hủy",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        match raw {
            "resolved" => Some(BulkAction::Resolve),
            "rejected" => Some(BulkAction::Reject),
            _ => BulkAction::ALL
                .into_iter()
                .find(|action| action.as_value().eq_ignore_ascii_case(raw)),
        }
    }
}

impl fmt::Display for BulkAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_value())
    }
}

/// Admin endpoint that accepts a bulk submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BulkTarget {
    CategoriesDelete,
    CategoriesRestore,
    CategoriesPermanentDelete,
    CoinPackages,
    Transactions,
    Withdrawals,
    Reports,
    Documents,
}

impl BulkTarget {
    pub const ALL: [BulkTarget; 8] = [
        BulkTarget::CategoriesDelete,
        BulkTarget::CategoriesRestore,
        BulkTarget::CategoriesPermanentDelete,
        BulkTarget::CoinPackages,
        BulkTarget::Transactions,
        BulkTarget::Withdrawals,
        BulkTarget::Reports,
        BulkTarget::Documents,
    ];

    pub fn key(self) -> &'static str {
        match self {
            BulkTarget::CategoriesDelete => "categories-delete",
            BulkTarget::CategoriesRestore => "categories-restore",
            BulkTarget::CategoriesPermanentDelete => "categories-permanent-delete",
            BulkTarget::CoinPackages => "coin-packages",
            BulkTarget::Transactions => "transactions",
            BulkTarget::Withdrawals => "withdrawals",
            BulkTarget::Reports => "reports",
            BulkTarget::Documents => "documents",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        BulkTarget::ALL
            .into_iter()
            .find(|target| target.key().eq_ignore_ascii_case(raw))
    }

    /// Same-origin path the form posts to.
    pub fn action_path(self) -> &'static str {
        match self {
            BulkTarget::CategoriesDelete => "/admin/categories/delete-multiple",
            BulkTarget::CategoriesRestore => "/admin/categories/restore-multiple",
            BulkTarget::CategoriesPermanentDelete => "/admin/categories/bulk-permanent-delete",
            BulkTarget::CoinPackages => "/admin/coin-packages/bulk-action",
            BulkTarget::Transactions => "/admin/transactions/bulk-action",
            BulkTarget::Withdrawals => "/admin/withdrawals/bulk-action",
            BulkTarget::Reports => "/admin/reports/bulk-action",
            BulkTarget::Documents => "/admin/documents/bulk-action",
        }
    }

    /// Name shared by every id input.
    pub fn id_field(self) -> &'static str {
        match self {
            BulkTarget::CategoriesDelete
            | BulkTarget::CategoriesRestore
            | BulkTarget::CategoriesPermanentDelete => "categoryIds",
            BulkTarget::CoinPackages => "packageIds",
            BulkTarget::Transactions => "transactionIds",
            BulkTarget::Withdrawals => "withdrawalIds",
            BulkTarget::Reports => "reportIds",
            BulkTarget::Documents => "ids",
        }
    }

    pub fn reason_field(self) -> &'static str {
        match self {
            BulkTarget::Reports => "deleteReason",
            _ => "reason",
        }
    }

    /// Actions the endpoint understands; empty when the path itself is the action.
    pub fn actions(self) -> &'static [BulkAction] {
        match self {
            BulkTarget::CategoriesDelete
            | BulkTarget::CategoriesRestore
            | BulkTarget::CategoriesPermanentDelete => &[],
            BulkTarget::CoinPackages => &[
                BulkAction::Activate,
                BulkAction::Deactivate,
                BulkAction::Delete,
            ],
            BulkTarget::Transactions => &[
                BulkAction::Delete,
                BulkAction::StatusCompleted,
                BulkAction::StatusFailed,
                BulkAction::StatusCancelled,
            ],
            BulkTarget::Withdrawals => &[
                BulkAction::Delete,
                BulkAction::StatusPending,
                BulkAction::StatusCompleted,
                BulkAction::StatusFailed,
                BulkAction::StatusCancelled,
            ],
            BulkTarget::Reports => &[
                BulkAction::MarkNew,
                BulkAction::MarkPending,
                BulkAction::Resolve,
                BulkAction::Reject,
            ],
            BulkTarget::Documents => &[BulkAction::Publish, BulkAction::Archive, BulkAction::Delete],
        }
    }

    pub fn requires_action(self) -> bool {
        !self.actions().is_empty()
    }

    /// Noun used in user-facing messages.
    pub fn noun(self) -> &'static str {
        match self {
            BulkTarget::CategoriesDelete
            | BulkTarget::CategoriesRestore
            | BulkTarget::CategoriesPermanentDelete => "danh mục",
            BulkTarget::CoinPackages => "gói xu",
            BulkTarget::Transactions => "giao dịch",
            BulkTarget::Withdrawals => "yêu cầu rút xu",
            BulkTarget::Reports => "báo cáo",
            BulkTarget::Documents => "tài liệu",
        }
    }

    /// Per-record DELETE endpoint used by the AJAX flow. Only reports expose
    /// one; the other resources delete through their POST forms.
    pub fn delete_path(self, id: &RecordId) -> Result<String, BulkError> {
        match self {
            BulkTarget::Reports => Ok(format!("/admin/reports/api/{id}")),
            target => Err(BulkError::PerItemUnsupported { target }),
        }
    }

    pub fn supports_per_item(self) -> bool {
        matches!(self, BulkTarget::Reports)
    }
}

impl fmt::Display for BulkTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// CSRF token read from the page, with the parameter name forms must use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrfToken {
    pub param: String,
    pub value: String,
}

impl CsrfToken {
    pub fn new(param: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            param: param.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormField {
    pub name: String,
    pub value: String,
}

impl FormField {
    fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Hidden POST form ready to render or submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkForm {
    pub target: BulkTarget,
    pub action_path: &'static str,
    pub fields: Vec<FormField>,
}

impl BulkForm {
    pub fn method(&self) -> &'static str {
        "POST"
    }

    /// Values of every field named `name`, in form order.
    pub fn values(&self, name: &str) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|field| field.name == name)
            .map(|field| field.value.as_str())
            .collect()
    }

    pub fn id_count(&self) -> usize {
        self.values(self.target.id_field()).len()
    }

    /// `application/x-www-form-urlencoded` body.
    pub fn encode(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for field in &self.fields {
            serializer.append_pair(&field.name, &field.value);
        }
        serializer.finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BulkError {
    #[error("no {target} records selected")]
    EmptySelection { target: BulkTarget },
    #[error("a bulk action must be chosen for {target}")]
    MissingAction { target: BulkTarget },
    #[error("action `{action}` is not available for {target}")]
    UnsupportedAction {
        target: BulkTarget,
        action: BulkAction,
    },
    #[error("CSRF token is missing from the page")]
    MissingCsrf,
    #[error("{target} records cannot be deleted one by one")]
    PerItemUnsupported { target: BulkTarget },
}

impl BulkError {
    /// Toast the user sees instead of a submission.
    pub fn toast(&self) -> Toast {
        match self {
            BulkError::EmptySelection { target } => {
                Toast::warning(format!("Vui lòng chọn ít nhất một {}!", target.noun()))
            }
            BulkError::MissingAction { target } => Toast::warning(format!(
                "Vui lòng chọn hành động và ít nhất một {}",
                target.noun()
            )),
            BulkError::UnsupportedAction { action, .. } => {
                Toast::error(format!("Hành động \"{}\" không hợp lệ", action.label()))
            }
            BulkError::MissingCsrf => {
                Toast::error("Không tìm thấy mã bảo mật CSRF. Vui lòng tải lại trang.")
            }
            BulkError::PerItemUnsupported { target } => Toast::error(format!(
                "Không thể xóa từng {} riêng lẻ, hãy dùng thao tác hàng loạt",
                target.noun()
            )),
        }
    }
}

/// Inputs for one bulk submission.
#[derive(Debug, Clone, Copy)]
pub struct BulkRequest<'a> {
    pub target: BulkTarget,
    pub selection: &'a SelectionSet,
    pub csrf: Option<&'a CsrfToken>,
    pub action: Option<BulkAction>,
    pub reason: Option<&'a str>,
}

impl<'a> BulkRequest<'a> {
    pub fn new(target: BulkTarget, selection: &'a SelectionSet) -> Self {
        Self {
            target,
            selection,
            csrf: None,
            action: None,
            reason: None,
        }
    }

    pub fn csrf(mut self, csrf: Option<&'a CsrfToken>) -> Self {
        self.csrf = csrf;
        self
    }

    pub fn action(mut self, action: Option<BulkAction>) -> Self {
        self.action = action;
        self
    }

    pub fn reason(mut self, reason: Option<&'a str>) -> Self {
        self.reason = reason;
        self
    }

    /// Validate the request and lay out the form fields: CSRF first, then
    /// one input per selected id, then the action and reason.
    pub fn build(self) -> Result<BulkForm, BulkError> {
        let target = self.target;
        if self.selection.is_empty() {
            return Err(BulkError::EmptySelection { target });
        }

        let action = match (target.requires_action(), self.action) {
            (true, None) => return Err(BulkError::MissingAction { target }),
            (_, Some(action)) if !target.actions().contains(&action) => {
                return Err(BulkError::UnsupportedAction { target, action });
            }
            (_, action) => action,
        };

        let csrf = self
            .csrf
            .filter(|token| !token.value.trim().is_empty())
            .ok_or(BulkError::MissingCsrf)?;

        let mut fields = Vec::with_capacity(self.selection.len() + 3);
        fields.push(FormField::new(csrf.param.clone(), csrf.value.clone()));
        for id in self.selection.ids() {
            fields.push(FormField::new(target.id_field(), id.as_str()));
        }
        if let Some(action) = action {
            fields.push(FormField::new("action", action.as_value()));
        }
        if let Some(reason) = self.reason.map(str::trim).filter(|reason| !reason.is_empty()) {
            fields.push(FormField::new(target.reason_field(), reason));
        }

        Ok(BulkForm {
            target,
            action_path: target.action_path(),
            fields,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkFailure {
    pub id: RecordId,
    pub reason: String,
}

/// Aggregated result of the per-id AJAX flow. Completion order is irrelevant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkOutcome {
    pub target: BulkTarget,
    pub succeeded: Vec<RecordId>,
    pub failed: Vec<BulkFailure>,
}

impl BulkOutcome {
    pub fn new(target: BulkTarget) -> Self {
        Self {
            target,
            succeeded: Vec::new(),
            failed: Vec::new(),
        }
    }

    pub fn record_success(&mut self, id: RecordId) {
        self.succeeded.push(id);
    }

    pub fn record_failure(&mut self, id: RecordId, reason: impl Into<String>) {
        self.failed.push(BulkFailure {
            id,
            reason: reason.into(),
        });
    }

    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    /// A success toast when anything succeeded, an error toast when anything failed.
    pub fn toasts(&self) -> Vec<Toast> {
        let noun = self.target.noun();
        let mut toasts = Vec::new();
        if !self.succeeded.is_empty() {
            toasts.push(Toast::success(format!(
                "Đã xóa thành công {} {noun}!",
                self.succeeded.len()
            )));
        }
        if !self.failed.is_empty() {
            toasts.push(Toast::error(format!(
                "Có {} {noun} không thể xóa!",
                self.failed.len()
            )));
        }
        toasts
    }
}
