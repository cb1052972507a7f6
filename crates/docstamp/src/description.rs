//! Description strategies for header text.
//!
//! A [`DescriptionSource`] fills the free-text parts of a header: the
//! declaration description and the descriptions of type parameters,
//! parameters and the return value. Strategies never fail; a missing answer
//! becomes an empty editable region.

use std::sync::Arc;

use async_trait::async_trait;
use rustc_hash::FxHashMap;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::{CLASS_NAME_TOKEN, GenerativeConfig, GeneratorConfig, DescriptionStyle};
use crate::model::{DeclarationKind, Fragment};

/// What is being described.
#[derive(Debug, Clone, Copy)]
pub struct DescriptionRequest<'a> {
    pub kind: DeclarationKind,
    pub name: &'a str,
    /// Source text of the declaration.
    pub snippet: &'a str,
    /// Name of the enclosing class, for constructors.
    pub class_name: Option<&'a str>,
}

/// Source of header descriptions.
#[async_trait]
pub trait DescriptionSource: Send + Sync {
    async fn describe_declaration(&self, request: &DescriptionRequest<'_>) -> Fragment;

    /// One fragment per name, in the same order.
    async fn describe_type_parameters(
        &self,
        request: &DescriptionRequest<'_>,
        names: &[String],
    ) -> Vec<Fragment>;

    /// One fragment per name, in the same order.
    async fn describe_parameters(
        &self,
        request: &DescriptionRequest<'_>,
        names: &[String],
    ) -> Vec<Fragment>;

    async fn describe_return(&self, request: &DescriptionRequest<'_>, return_type: &str)
    -> Fragment;
}

/// External natural-language generator.
///
/// Every method returns `None` when the service could not produce a usable
/// answer; callers treat that as "no description".
#[async_trait]
pub trait DescriptionService: Send + Sync {
    async fn describe_snippet(&self, kind: DeclarationKind, snippet: &str) -> Option<String>;

    /// Descriptions keyed by parameter name. `is_generic` selects type
    /// parameters instead of value parameters.
    async fn describe_parameters(
        &self,
        snippet: &str,
        names: &[String],
        is_generic: bool,
    ) -> Option<FxHashMap<String, String>>;

    async fn describe_return(&self, snippet: &str, return_type: &str) -> Option<String>;
}

fn constructor_text(template: &str, class_name: Option<&str>) -> String {
    template.replace(CLASS_NAME_TOKEN, class_name.unwrap_or("Object"))
}

fn empty_fragments(count: usize) -> Vec<Fragment> {
    (0..count).map(|_| Fragment::empty()).collect()
}

/// Editable regions; the declaration region defaults to the configured
/// placeholder text.
#[derive(Debug, Clone)]
pub struct PlaceholderDescriptions {
    placeholder: String,
    constructor_template: String,
}

impl PlaceholderDescriptions {
    pub fn new(placeholder: impl Into<String>, constructor_template: impl Into<String>) -> Self {
        Self {
            placeholder: placeholder.into(),
            constructor_template: constructor_template.into(),
        }
    }

    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self::new(
            config.description_placeholder.clone(),
            config.description_for_constructors.clone(),
        )
    }
}

#[async_trait]
impl DescriptionSource for PlaceholderDescriptions {
    async fn describe_declaration(&self, request: &DescriptionRequest<'_>) -> Fragment {
        if request.kind == DeclarationKind::Constructor {
            return Fragment::placeholder(constructor_text(
                &self.constructor_template,
                request.class_name,
            ));
        }
        Fragment::placeholder(self.placeholder.clone())
    }

    async fn describe_type_parameters(
        &self,
        _request: &DescriptionRequest<'_>,
        names: &[String],
    ) -> Vec<Fragment> {
        empty_fragments(names.len())
    }

    async fn describe_parameters(
        &self,
        _request: &DescriptionRequest<'_>,
        names: &[String],
    ) -> Vec<Fragment> {
        empty_fragments(names.len())
    }

    async fn describe_return(
        &self,
        _request: &DescriptionRequest<'_>,
        _return_type: &str,
    ) -> Fragment {
        Fragment::empty()
    }
}

/// Fixed text for every declaration.
#[derive(Debug, Clone)]
pub struct StaticDescriptions {
    text: String,
    constructor_template: String,
}

impl StaticDescriptions {
    pub fn new(text: impl Into<String>, constructor_template: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            constructor_template: constructor_template.into(),
        }
    }

    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self::new(
            config.description_placeholder.clone(),
            config.description_for_constructors.clone(),
        )
    }
}

#[async_trait]
impl DescriptionSource for StaticDescriptions {
    async fn describe_declaration(&self, request: &DescriptionRequest<'_>) -> Fragment {
        if request.kind == DeclarationKind::Constructor {
            return Fragment::text(constructor_text(
                &self.constructor_template,
                request.class_name,
            ));
        }
        Fragment::text(self.text.clone())
    }

    async fn describe_type_parameters(
        &self,
        _request: &DescriptionRequest<'_>,
        names: &[String],
    ) -> Vec<Fragment> {
        empty_fragments(names.len())
    }

    async fn describe_parameters(
        &self,
        _request: &DescriptionRequest<'_>,
        names: &[String],
    ) -> Vec<Fragment> {
        empty_fragments(names.len())
    }

    async fn describe_return(
        &self,
        _request: &DescriptionRequest<'_>,
        _return_type: &str,
    ) -> Fragment {
        Fragment::empty()
    }
}

/// Which requests the generative strategy sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerativeToggles {
    pub type_parameters: bool,
    pub parameters: bool,
    pub returns: bool,
}

impl Default for GenerativeToggles {
    fn default() -> Self {
        Self {
            type_parameters: true,
            parameters: true,
            returns: true,
        }
    }
}

impl From<&GenerativeConfig> for GenerativeToggles {
    fn from(config: &GenerativeConfig) -> Self {
        Self {
            type_parameters: config.describe_type_parameters,
            parameters: config.describe_parameters,
            returns: config.describe_returns,
        }
    }
}

/// Descriptions produced by a [`DescriptionService`].
///
/// Once the cancellation token fires no further requests are sent.
pub struct GenerativeDescriptions {
    service: Arc<dyn DescriptionService>,
    toggles: GenerativeToggles,
    cancel: CancellationToken,
}

impl GenerativeDescriptions {
    pub fn new(service: Arc<dyn DescriptionService>) -> Self {
        Self {
            service,
            toggles: GenerativeToggles::default(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_toggles(mut self, toggles: GenerativeToggles) -> Self {
        self.toggles = toggles;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    async fn named(
        &self,
        request: &DescriptionRequest<'_>,
        names: &[String],
        is_generic: bool,
    ) -> Vec<Fragment> {
        if names.is_empty() || self.cancel.is_cancelled() {
            return empty_fragments(names.len());
        }
        let Some(descriptions) = self
            .service
            .describe_parameters(request.snippet, names, is_generic)
            .await
        else {
            warn!(name = request.name, is_generic, "parameter descriptions unavailable");
            return empty_fragments(names.len());
        };
        names
            .iter()
            .map(|name| descriptions.get(name).map_or("", |text| text.trim()))
            .map(generated)
            .collect()
    }
}

fn generated(text: &str) -> Fragment {
    let text = text.trim();
    if text.is_empty() {
        Fragment::empty()
    } else {
        Fragment::placeholder(text)
    }
}

#[async_trait]
impl DescriptionSource for GenerativeDescriptions {
    async fn describe_declaration(&self, request: &DescriptionRequest<'_>) -> Fragment {
        if self.cancel.is_cancelled() {
            return Fragment::empty();
        }
        match self
            .service
            .describe_snippet(request.kind, request.snippet)
            .await
        {
            Some(text) => {
                debug!(name = request.name, kind = %request.kind, "generated description");
                generated(&text)
            }
            None => {
                warn!(name = request.name, kind = %request.kind, "description unavailable");
                Fragment::empty()
            }
        }
    }

    async fn describe_type_parameters(
        &self,
        request: &DescriptionRequest<'_>,
        names: &[String],
    ) -> Vec<Fragment> {
        if !self.toggles.type_parameters {
            return empty_fragments(names.len());
        }
        self.named(request, names, true).await
    }

    async fn describe_parameters(
        &self,
        request: &DescriptionRequest<'_>,
        names: &[String],
    ) -> Vec<Fragment> {
        if !self.toggles.parameters {
            return empty_fragments(names.len());
        }
        self.named(request, names, false).await
    }

    async fn describe_return(
        &self,
        request: &DescriptionRequest<'_>,
        return_type: &str,
    ) -> Fragment {
        if !self.toggles.returns || self.cancel.is_cancelled() {
            return Fragment::empty();
        }
        match self
            .service
            .describe_return(request.snippet, return_type)
            .await
        {
            Some(text) => generated(&text),
            None => {
                warn!(name = request.name, "return description unavailable");
                Fragment::empty()
            }
        }
    }
}

/// Builds the non-generative strategy selected by the configuration.
pub fn configured_source(config: &GeneratorConfig) -> Arc<dyn DescriptionSource> {
    match config.description_style {
        DescriptionStyle::Placeholder => Arc::new(PlaceholderDescriptions::from_config(config)),
        DescriptionStyle::Static => Arc::new(StaticDescriptions::from_config(config)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedService {
        parameters: Option<FxHashMap<String, String>>,
    }

    #[async_trait]
    impl DescriptionService for FixedService {
        async fn describe_snippet(&self, _kind: DeclarationKind, _snippet: &str) -> Option<String> {
            Some("  Loads a user.  ".to_string())
        }

        async fn describe_parameters(
            &self,
            _snippet: &str,
            _names: &[String],
            _is_generic: bool,
        ) -> Option<FxHashMap<String, String>> {
            self.parameters.clone()
        }

        async fn describe_return(&self, _snippet: &str, _return_type: &str) -> Option<String> {
            None
        }
    }

    fn request() -> DescriptionRequest<'static> {
        DescriptionRequest {
            kind: DeclarationKind::Method,
            name: "load",
            snippet: "function load(id, force) {}",
            class_name: None,
        }
    }

    #[tokio::test]
    async fn placeholder_substitutes_class_name_for_constructors() {
        let source = PlaceholderDescriptions::new("Describe", "Creates an instance of {Object}.");
        let mut req = request();
        req.kind = DeclarationKind::Constructor;
        req.class_name = Some("Store");
        assert_eq!(
            source.describe_declaration(&req).await,
            Fragment::placeholder("Creates an instance of Store.")
        );
        req.kind = DeclarationKind::Method;
        assert_eq!(
            source.describe_declaration(&req).await,
            Fragment::placeholder("Describe")
        );
    }

    #[tokio::test]
    async fn static_text_is_fixed() {
        let source = StaticDescriptions::new("Fixed.", "New {Object}");
        assert_eq!(source.describe_declaration(&request()).await, Fragment::text("Fixed."));
        let names = vec!["a".to_string()];
        assert_eq!(
            source.describe_parameters(&request(), &names).await,
            vec![Fragment::empty()]
        );
    }

    #[tokio::test]
    async fn generative_keeps_order_and_fills_missing_names() {
        let mut answers = FxHashMap::default();
        answers.insert("force".to_string(), "Skip the cache.".to_string());
        let source = GenerativeDescriptions::new(Arc::new(FixedService {
            parameters: Some(answers),
        }));
        let names = vec!["id".to_string(), "force".to_string()];
        let fragments = source.describe_parameters(&request(), &names).await;
        assert_eq!(
            fragments,
            vec![Fragment::empty(), Fragment::placeholder("Skip the cache.")]
        );
        assert_eq!(
            source.describe_declaration(&request()).await,
            Fragment::placeholder("Loads a user.")
        );
        assert_eq!(source.describe_return(&request(), "number").await, Fragment::empty());
    }

    #[tokio::test]
    async fn generative_degrades_on_failure_and_toggles() {
        let source = GenerativeDescriptions::new(Arc::new(FixedService { parameters: None }));
        let names = vec!["id".to_string()];
        assert_eq!(
            source.describe_parameters(&request(), &names).await,
            vec![Fragment::empty()]
        );

        let mut answers = FxHashMap::default();
        answers.insert("id".to_string(), "Identifier.".to_string());
        let source = GenerativeDescriptions::new(Arc::new(FixedService {
            parameters: Some(answers),
        }))
        .with_toggles(GenerativeToggles {
            parameters: false,
            ..GenerativeToggles::default()
        });
        assert_eq!(
            source.describe_parameters(&request(), &names).await,
            vec![Fragment::empty()]
        );
    }

    #[tokio::test]
    async fn cancelled_generative_source_sends_nothing() {
        let token = CancellationToken::new();
        token.cancel();
        let source = GenerativeDescriptions::new(Arc::new(FixedService { parameters: None }))
            .with_cancellation(token);
        assert_eq!(source.describe_declaration(&request()).await, Fragment::empty());
    }
}
