//! 收件地址校验
//!
//! 把候选地址按输入顺序分成合法与不合法两组，语法判断委托给 [`AddressValidator`]。

use std::sync::Arc;

use validator::ValidateEmail;

use crate::traits::AddressValidator;

/// 地址校验结果
///
/// `valid` 与 `invalid` 互不相交，合起来恰好覆盖输入，且各自保持输入顺序。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    pub valid: Vec<String>,
    /// 不合法的地址，`None` 对应输入中的空值
    pub invalid: Vec<Option<String>>,
}

impl ValidationResult {
    pub fn is_valid(&self, address: &str) -> bool {
        self.valid.iter().any(|a| a == address)
    }
}

/// 邮箱地址校验器
#[derive(Clone)]
pub struct EmailValidator {
    grammar: Arc<dyn AddressValidator>,
}

impl EmailValidator {
    pub fn new(grammar: Arc<dyn AddressValidator>) -> Self {
        Self { grammar }
    }

    pub fn validate_emails(&self, addresses: &[Option<String>]) -> ValidationResult {
        let mut result = ValidationResult::default();

        for address in addresses {
            match address.as_deref() {
                // 空值不交给语法校验
                None | Some("") => result.invalid.push(address.clone()),
                Some(candidate) if self.grammar.is_syntactically_valid(candidate) => {
                    result.valid.push(candidate.to_string())
                }
                Some(_) => result.invalid.push(address.clone()),
            }
        }

        result
    }
}

/// 基于 `validator` crate 的 HTML5 邮箱语法校验
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntaxAddressValidator;

impl AddressValidator for SyntaxAddressValidator {
    fn is_syntactically_valid(&self, address: &str) -> bool {
        address.validate_email()
    }
}
