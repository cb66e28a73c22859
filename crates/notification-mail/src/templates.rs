//! 邮件文本模板与内置本地化目录
//!
//! 模板以英文原文作为键，各语言目录给出译文；参数使用 `{{variable}}` 语法。
//!
//! ## 使用示例
//!
//! ```ignore
//! let localization = BundledLocalization::new();
//! let catalog = localization.catalog("de").await;
//!
//! let subject = catalog.translate(
//!     SUBJECT_TEMPLATE,
//!     &[("server_url", "https://cloud.example"), ("notification_id", "share#42"), ("subject", "...")],
//! );
//! ```

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use regex::Regex;
use tracing::{debug, warn};

use crate::traits::{Catalog, LocalizationFactory};

/// 邮件主题模板
pub const SUBJECT_TEMPLATE: &str =
    "[{{server_url}}] Notification {{notification_id}}: {{subject}}";

/// 邮件纯文本正文模板
pub const BODY_TEMPLATE: &str = "{{subject}}\n\n{{message}}\n\n--\nNotification {{notification_id}} from {{server_url}}\nYou are receiving this email because of your notification settings at {{server_url}}";

/// 回退语言
pub const FALLBACK_LOCALE: &str = "en";

// 匹配 {{variable_name}} 格式，变量名支持字母、数字、下划线
static VARIABLE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{(\w+)\}\}").expect("变量正则必须合法"));

/// 单一语言的模板目录
#[derive(Debug, Clone)]
pub struct TemplateCatalog {
    locale: String,
    translations: HashMap<String, String>,
}

impl TemplateCatalog {
    /// 创建没有译文的目录，翻译时直接使用模板原文
    pub fn new(locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            translations: HashMap::new(),
        }
    }

    /// 注册译文
    pub fn with_translation(
        mut self,
        template: impl Into<String>,
        translation: impl Into<String>,
    ) -> Self {
        self.translations
            .insert(template.into(), translation.into());
        self
    }

    /// 将模板中的 `{{variable}}` 替换为参数值
    ///
    /// 未找到的变量保留原样并记录警告日志。
    pub fn render(template: &str, params: &[(&str, &str)]) -> String {
        VARIABLE_REGEX
            .replace_all(template, |caps: &regex::Captures| {
                let var_name = &caps[1];
                match params.iter().find(|(name, _)| *name == var_name) {
                    Some((_, value)) => value.to_string(),
                    None => {
                        warn!(variable = var_name, "模板变量未找到，保留原样");
                        caps[0].to_string()
                    }
                }
            })
            .into_owned()
    }
}

impl Catalog for TemplateCatalog {
    fn locale(&self) -> &str {
        &self.locale
    }

    fn translate(&self, template: &str, params: &[(&str, &str)]) -> String {
        let source = self
            .translations
            .get(template)
            .map(String::as_str)
            .unwrap_or(template);
        Self::render(source, params)
    }
}

/// 内置本地化工厂
///
/// 提供英文与德文目录，未知语言回退到英文。
pub struct BundledLocalization {
    catalogs: HashMap<String, Arc<TemplateCatalog>>,
}

impl Default for BundledLocalization {
    fn default() -> Self {
        Self::new()
    }
}

impl BundledLocalization {
    pub fn new() -> Self {
        let mut catalogs = HashMap::new();
        catalogs.insert(
            FALLBACK_LOCALE.to_string(),
            Arc::new(TemplateCatalog::new(FALLBACK_LOCALE)),
        );
        catalogs.insert(
            "de".to_string(),
            Arc::new(
                TemplateCatalog::new("de")
                    .with_translation(
                        SUBJECT_TEMPLATE,
                        "[{{server_url}}] Benachrichtigung {{notification_id}}: {{subject}}",
                    )
                    .with_translation(
                        BODY_TEMPLATE,
                        "{{subject}}\n\n{{message}}\n\n--\nBenachrichtigung {{notification_id}} von {{server_url}}\nSie erhalten diese E-Mail aufgrund Ihrer Benachrichtigungseinstellungen auf {{server_url}}",
                    ),
            ),
        );
        Self { catalogs }
    }

    /// 注册额外的语言目录
    pub fn register(&mut self, catalog: TemplateCatalog) {
        self.catalogs
            .insert(catalog.locale.clone(), Arc::new(catalog));
    }

    fn lookup(&self, locale: &str) -> Option<Arc<TemplateCatalog>> {
        // de_DE -> de
        self.catalogs.get(locale).cloned().or_else(|| {
            let language = locale.split(['_', '-']).next()?;
            self.catalogs.get(language).cloned()
        })
    }
}

#[async_trait]
impl LocalizationFactory for BundledLocalization {
    async fn catalog(&self, locale: &str) -> Arc<dyn Catalog> {
        match self.lookup(locale) {
            Some(catalog) => catalog,
            None => {
                debug!(locale = %locale, "未找到语言目录，回退到英文");
                Arc::new(TemplateCatalog::new(FALLBACK_LOCALE))
            }
        }
    }
}
