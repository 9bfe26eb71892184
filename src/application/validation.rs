//! Client-side mirrors of the server's form rules.
//!
//! These run before anything is sent so the user gets per-field messages
//! immediately; the server still validates on its own.

use thiserror::Error;
use time::OffsetDateTime;

pub const CODE_PREFIX: &str = "COIN-";
pub const MIN_WITHDRAWAL: i64 = 50;
pub const MAX_WITHDRAWAL: i64 = 50_000;
pub const MAX_NOTES_CHARS: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{} field(s) failed validation", .errors.len())]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn messages_for(&self, field: &str) -> Vec<&str> {
        self.errors
            .iter()
            .filter(|error| error.field == field)
            .map(|error| error.message.as_str())
            .collect()
    }

    fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CoinPackageForm<'a> {
    pub code: &'a str,
    pub name: &'a str,
    pub original_price: Option<f64>,
    pub sale_price: Option<f64>,
}

pub fn validate_coin_package(form: &CoinPackageForm<'_>) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let code = form.code.trim();
    if code.is_empty() {
        errors.push("code", "Mã gói xu là bắt buộc");
    } else if code.chars().count() < 3 {
        errors.push("code", "Mã gói xu phải có ít nhất 3 ký tự");
    } else if !code
        .chars()
        .all(|ch| ch.is_ascii_uppercase() || ch.is_ascii_digit() || ch == '-' || ch == '_')
    {
        errors.push(
            "code",
            "Mã gói xu chỉ được chứa chữ hoa, số, dấu gạch ngang và gạch dưới",
        );
    }

    let name = form.name.trim();
    if name.is_empty() {
        errors.push("name", "Tên gói xu là bắt buộc");
    } else if name.chars().count() < 3 {
        errors.push("name", "Tên gói xu phải có ít nhất 3 ký tự");
    }

    let original = form.original_price.filter(|price| price.is_finite());
    let sale = form.sale_price.filter(|price| price.is_finite());
    if original.is_none_or(|price| price <= 0.0) {
        errors.push("originalPrice", "Giá gốc phải lớn hơn 0");
    }
    match sale {
        None => errors.push("salePrice", "Giá bán phải lớn hơn 0"),
        Some(price) if price <= 0.0 => errors.push("salePrice", "Giá bán phải lớn hơn 0"),
        Some(price) if original.is_some_and(|original| original > 0.0 && price > original) => {
            errors.push("salePrice", "Giá bán không được lớn hơn giá gốc");
        }
        Some(_) => {}
    }

    errors.into_result()
}

/// Discount in percent, or `None` when the original price is not positive.
pub fn discount_percent(original_price: f64, sale_price: f64) -> Option<f64> {
    if !original_price.is_finite() || !sale_price.is_finite() || original_price <= 0.0 {
        return None;
    }
    Some((original_price - sale_price) / original_price * 100.0)
}

/// Discount as shown in the read-only form field, two decimals.
pub fn format_discount(original_price: f64, sale_price: f64) -> String {
    discount_percent(original_price, sale_price)
        .map(|discount| format!("{discount:.2}"))
        .unwrap_or_default()
}

pub fn validate_withdrawal_amount(amount: i64) -> Result<(), FieldError> {
    if amount <= 0 {
        return Err(FieldError::new("amount", "Số xu phải là số dương"));
    }
    if amount < MIN_WITHDRAWAL {
        return Err(FieldError::new("amount", "Số xu tối thiểu là 50 xu"));
    }
    if amount > MAX_WITHDRAWAL {
        return Err(FieldError::new("amount", "Số xu tối đa là 50,000 xu"));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WithdrawalForm<'a> {
    pub amount: Option<i64>,
    pub code: Option<&'a str>,
    pub notes: Option<&'a str>,
}

pub fn validate_withdrawal(form: &WithdrawalForm<'_>) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    match form.amount {
        None => errors.push("amount", "Số xu là bắt buộc"),
        Some(amount) => {
            if let Err(error) = validate_withdrawal_amount(amount) {
                errors.errors.push(error);
            }
        }
    }

    if let Some(code) = form.code {
        let code = code.trim();
        if code.is_empty() {
            errors.push("code", "Mã withdrawal là bắt buộc");
        } else if !is_withdrawal_code(code) {
            errors.push("code", "Mã withdrawal không đúng định dạng (WD + 6-20 ký tự)");
        }
    }

    if form
        .notes
        .is_some_and(|notes| notes.chars().count() > MAX_NOTES_CHARS)
    {
        errors.push("notes", "Ghi chú không được vượt quá 1000 ký tự");
    }

    errors.into_result()
}

/// `WD` followed by 6 to 20 ASCII letters or digits, case-insensitive.
fn is_withdrawal_code(code: &str) -> bool {
    let Some(prefix) = code.get(..2) else {
        return false;
    };
    let rest = &code[2..];
    prefix.eq_ignore_ascii_case("WD")
        && (6..=20).contains(&rest.len())
        && rest.chars().all(|ch| ch.is_ascii_alphanumeric())
}

/// Deletion reasons are optional, but a present one should say something.
pub fn check_delete_reason(reason: &str) -> Option<FieldError> {
    let reason = reason.trim();
    if !reason.is_empty() && reason.chars().count() < 5 {
        return Some(FieldError::new("reason", "Lý do xóa nên có ít nhất 5 ký tự"));
    }
    None
}

/// Derive a package code from its display name.
///
/// Uppercases, keeps ASCII letters and digits, joins words with single
/// dashes, then adds the `COIN-` prefix and a 4-digit suffix.
pub fn generate_package_code(name: &str, suffix: u16) -> String {
    let upper = name.to_uppercase();
    let words: Vec<String> = upper
        .split(|ch: char| ch.is_whitespace() || ch == '-' || ch == '_')
        .map(|word| {
            word.chars()
                .filter(|ch| ch.is_ascii_uppercase() || ch.is_ascii_digit())
                .collect::<String>()
        })
        .filter(|word| !word.is_empty())
        .collect();
    let body = words.join("-");

    let mut code = if body.starts_with(CODE_PREFIX) || body == "COIN" {
        body
    } else if body.is_empty() {
        "COIN".to_string()
    } else {
        format!("{CODE_PREFIX}{body}")
    };
    code.push('-');
    code.push_str(&format!("{:04}", suffix % 10_000));
    code
}

/// Last four digits of the current millisecond timestamp.
pub fn timestamp_suffix(now: OffsetDateTime) -> u16 {
    let millis = now.unix_timestamp_nanos() / 1_000_000;
    u16::try_from(millis.rem_euclid(10_000)).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    fn package<'a>(code: &'a str, name: &'a str, original: f64, sale: f64) -> CoinPackageForm<'a> {
        CoinPackageForm {
            code,
            name,
            original_price: Some(original),
            sale_price: Some(sale),
        }
    }

    #[test]
    fn accepts_a_well_formed_package() {
        assert_eq!(
            validate_coin_package(&package("COIN-GOLD_1", "Gói vàng", 100.0, 80.0)),
            Ok(())
        );
    }

    #[test]
    fn reports_each_failing_field() {
        let errors = validate_coin_package(&package("ab", "", 0.0, 5.0)).expect_err("invalid");

        assert_eq!(errors.messages_for("code"), vec!["Mã gói xu phải có ít nhất 3 ký tự"]);
        assert_eq!(errors.messages_for("name"), vec!["Tên gói xu là bắt buộc"]);
        assert_eq!(errors.messages_for("originalPrice"), vec!["Giá gốc phải lớn hơn 0"]);
        assert!(errors.messages_for("salePrice").is_empty());
    }

    #[test]
    fn code_charset_and_sale_ceiling() {
        let errors =
            validate_coin_package(&package("coin-1", "Gói bạc", 50.0, 60.0)).expect_err("invalid");

        assert_eq!(
            errors.messages_for("code"),
            vec!["Mã gói xu chỉ được chứa chữ hoa, số, dấu gạch ngang và gạch dưới"]
        );
        assert_eq!(
            errors.messages_for("salePrice"),
            vec!["Giá bán không được lớn hơn giá gốc"]
        );
    }

    #[test]
    fn discount_uses_two_decimals() {
        assert_eq!(format_discount(300.0, 200.0), "33.33");
        assert_eq!(format_discount(0.0, 10.0), "");
    }

    #[test]
    fn withdrawal_amount_bounds() {
        assert!(validate_withdrawal_amount(50).is_ok());
        assert!(validate_withdrawal_amount(50_000).is_ok());
        assert_eq!(
            validate_withdrawal_amount(0).map_err(|err| err.message),
            Err("Số xu phải là số dương".to_string())
        );
        assert_eq!(
            validate_withdrawal_amount(49).map_err(|err| err.message),
            Err("Số xu tối thiểu là 50 xu".to_string())
        );
        assert_eq!(
            validate_withdrawal_amount(50_001).map_err(|err| err.message),
            Err("Số xu tối đa là 50,000 xu".to_string())
        );
    }

    #[test]
    fn withdrawal_form_checks_code_and_notes() {
        let notes = "x".repeat(1001);
        let errors = validate_withdrawal(&WithdrawalForm {
            amount: Some(100),
            code: Some("WD12"),
            notes: Some(&notes),
        })
        .expect_err("invalid");

        assert_eq!(errors.errors.len(), 2);
        assert!(
            validate_withdrawal(&WithdrawalForm {
                amount: Some(100),
                code: Some("wd20240101"),
                notes: None,
            })
            .is_ok()
        );
    }

    #[test]
    fn generates_codes_from_names() {
        assert_eq!(generate_package_code("Gold pack  500", 42), "COIN-GOLD-PACK-500-0042");
        assert_eq!(generate_package_code("coin-vip", 1234), "COIN-VIP-1234");
        assert_eq!(generate_package_code("!!!", 7), "COIN-0007");
    }

    #[test]
    fn suffix_is_last_four_millisecond_digits() {
        assert_eq!(timestamp_suffix(datetime!(1970-01-01 0:00:12.345 UTC)), 2345);
    }

    #[test]
    fn short_delete_reasons_are_flagged() {
        assert!(check_delete_reason("").is_none());
        assert!(check_delete_reason("spam").is_some());
        assert!(check_delete_reason("Nội dung vi phạm").is_none());
    }
}
