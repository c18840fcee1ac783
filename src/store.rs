//! ParamStore - binds parameters onto records
//!
//! One [`ParamStore::bind`] call:
//!
//! 1. checks the target (unset optional, non-record)
//! 2. resolves the record's schema (key path → field access path)
//! 3. issues exactly one decrypted batch fetch for every key path
//! 4. walks each returned parameter's access path, allocating optional
//!    wrappers on the way, and converts the value into the field
//! 5. reports every key path the source did not return as one
//!    [`NotFoundError`]
//!
//! There is no rollback: a failed bind may leave the target partially
//! populated.

use std::fmt;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, trace};

use crate::convert::{
    set_value, Converter, DurationConverter, NumberConverter, TimeConverter, TimeLayout,
};
use crate::error::{BindError, NotFoundError, Result};
use crate::field::{Field, Kind};
use crate::parameter::Parameter;
use crate::schema::Schema;
use crate::source::{GetParametersRequest, ParameterSource};

/// Annotation name used when none is configured
pub const DEFAULT_TAG: &str = "ssm";

/// Normalize a key prefix: leading `/`, no trailing `/`, `""` for the root
///
/// ```
/// use paramstore::store::normalize_prefix;
///
/// assert_eq!(normalize_prefix("dev"), "/dev");
/// assert_eq!(normalize_prefix("/prod/app/db/"), "/prod/app/db");
/// assert_eq!(normalize_prefix("/"), "");
/// ```
pub fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim_end_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

/// Reads parameters into records
///
/// Immutable once built and cheap to clone; one store can serve any number
/// of concurrent binds into distinct targets.
#[derive(Clone)]
pub struct ParamStore {
    prefix: String,
    tag: String,
    converters: Arc<[Arc<dyn Converter>]>,
    source: Arc<dyn ParameterSource>,
}

impl ParamStore {
    /// Store with default options reading from `source`
    pub fn new(source: impl ParameterSource + 'static) -> Self {
        Self {
            prefix: String::new(),
            tag: DEFAULT_TAG.to_string(),
            converters: Arc::from(Vec::new()),
            source: Arc::new(source),
        }
    }

    pub fn builder() -> ParamStoreBuilder {
        ParamStoreBuilder::default()
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    /// Resolve the key paths `bind` would request for `target`
    pub fn schema(&self, target: &dyn Field) -> Result<Schema> {
        let info = target.type_info().deref();
        if info.kind != Kind::Record {
            return Err(BindError::NotRecord {
                type_name: info.name,
            });
        }
        Schema::resolve(&info.fields(), &self.tag, &self.prefix, &[])
    }

    /// Read every annotated field of `target` from the source
    ///
    /// `target` must be a record, or an `Option` holding one.
    #[instrument(skip_all, fields(prefix = %self.prefix, tag = %self.tag))]
    pub async fn bind(&self, target: &mut dyn Field) -> Result<()> {
        let target = record_target(target)?;
        let mut schema = self.schema(&*target)?;

        let names = schema.names();
        debug!(keys = names.len(), source = self.source.name(), "fetching parameters");
        let params = self.fetch(names).await?;

        self.apply(target, &mut schema, &params)
    }

    /// Like [`bind`](Self::bind), abandoning the fetch when `cancel` fires
    pub async fn bind_until(
        &self,
        target: &mut dyn Field,
        cancel: CancellationToken,
    ) -> Result<()> {
        let target = record_target(target)?;
        let mut schema = self.schema(&*target)?;

        let names = schema.names();
        debug!(keys = names.len(), source = self.source.name(), "fetching parameters");
        let params = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(BindError::Cancelled),
            params = self.fetch(names) => params?,
        };

        self.apply(target, &mut schema, &params)
    }

    async fn fetch(&self, names: Vec<String>) -> Result<Vec<Parameter>> {
        self.source
            .get_parameters(GetParametersRequest::decrypted(names))
            .await
            .map_err(|error| BindError::Source {
                source_name: self.source.name().to_string(),
                error,
            })
    }

    /// Assign fetched parameters; stops at the first conversion failure
    fn apply(&self, target: &mut dyn Field, schema: &mut Schema, params: &[Parameter]) -> Result<()> {
        for param in params {
            let Some(path) = schema.take(&param.name) else {
                debug!(name = %param.name, "ignoring unrequested parameter");
                continue;
            };
            let field = locate(&mut *target, &path)
                .map_err(|e| BindError::for_param(param.name.as_str(), e))?;
            set_value(&self.converters, param, field)
                .map_err(|e| BindError::for_param(param.name.as_str(), e))?;
            trace!(name = %param.name, kind = %param.kind, "assigned parameter");
        }

        if !schema.is_empty() {
            return Err(NotFoundError::new(schema.names()).into());
        }
        Ok(())
    }
}

impl fmt::Debug for ParamStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParamStore")
            .field("prefix", &self.prefix)
            .field("tag", &self.tag)
            .field("converters", &self.converters.len())
            .field("source", &self.source.name())
            .finish()
    }
}

/// Check the bind target and look through an outer `Option`
fn record_target(target: &mut dyn Field) -> Result<&mut dyn Field> {
    let target = if target.type_info().kind == Kind::Optional {
        if target.is_nil() {
            return Err(BindError::NilTarget);
        }
        let name = target.type_info().name;
        target
            .allocate()
            .ok_or(BindError::NotRecord { type_name: name })?
    } else {
        target
    };

    let info = target.type_info();
    if info.kind != Kind::Record {
        return Err(BindError::NotRecord {
            type_name: info.name,
        });
    }
    Ok(target)
}

/// Walk an access path, allocating optional wrappers as they are crossed
fn locate<'a>(field: &'a mut dyn Field, path: &[usize]) -> Result<&'a mut dyn Field> {
    let Some((&index, rest)) = path.split_first() else {
        return Ok(field);
    };

    let type_name = field.type_info().name;
    let child = field
        .child_mut(index)
        .ok_or(BindError::InvalidFieldPath { index, type_name })?;

    let child = if child.type_info().kind == Kind::Optional {
        let name = child.type_info().name;
        child.allocate().ok_or(BindError::InvalidFieldPath {
            index,
            type_name: name,
        })?
    } else {
        child
    };

    locate(child, rest)
}

/// Options for [`ParamStore`]
#[derive(Default)]
pub struct ParamStoreBuilder {
    prefix: String,
    tag: Option<String>,
    converters: Vec<Arc<dyn Converter>>,
    source: Option<Arc<dyn ParameterSource>>,
}

impl ParamStoreBuilder {
    /// Prefix every key path, e.g. `"dev"` or `"prod/app/db"`
    ///
    /// A single leading or trailing `/` is accepted.
    pub fn with_prefix(mut self, prefix: impl AsRef<str>) -> Self {
        self.prefix = normalize_prefix(prefix.as_ref());
        self
    }

    /// Annotation name used to resolve the schema (default `"ssm"`)
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Append a converter to the chain
    pub fn with_converter(mut self, converter: impl Converter + 'static) -> Self {
        self.converters.push(Arc::new(converter));
        self
    }

    /// Append a closure converter to the chain
    pub fn with_converter_fn<F>(self, converter: F) -> Self
    where
        F: Fn(&Parameter, &mut dyn Field) -> Result<bool> + Send + Sync + 'static,
    {
        self.with_converter(converter)
    }

    /// Parse `std::time::Duration` fields ("5s", "1h30m")
    pub fn with_parse_duration(self) -> Self {
        self.with_converter(DurationConverter)
    }

    /// Parse `DateTime<Utc>` fields with the given layout
    pub fn with_parse_time(self, layout: impl Into<TimeLayout>) -> Self {
        self.with_converter(TimeConverter::new(layout))
    }

    /// Parse integer and float fields
    pub fn with_parse_number(self) -> Self {
        self.with_converter(NumberConverter)
    }

    pub fn with_source(mut self, source: impl ParameterSource + 'static) -> Self {
        self.source = Some(Arc::new(source));
        self
    }

    pub fn with_shared_source(mut self, source: Arc<dyn ParameterSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Build the store
    ///
    /// Without a source, the `aws` feature supplies a Parameter Store client
    /// built from the default AWS configuration; otherwise this fails.
    pub fn build(self) -> Result<ParamStore> {
        let source = match self.source {
            Some(source) => source,
            None => default_source()?,
        };

        Ok(ParamStore {
            prefix: self.prefix,
            tag: self.tag.unwrap_or_else(|| DEFAULT_TAG.to_string()),
            converters: Arc::from(self.converters),
            source,
        })
    }
}

#[cfg(feature = "aws")]
fn default_source() -> Result<Arc<dyn ParameterSource>> {
    Ok(Arc::new(crate::source::SsmSource::from_env()))
}

#[cfg(not(feature = "aws"))]
fn default_source() -> Result<Arc<dyn ParameterSource>> {
    Err(BindError::NoSource)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;

    crate::record! {
        #[derive(Debug, Default, Clone, PartialEq)]
        pub struct Inner {
            pub a: String [ssm = "a"],
        }
    }

    crate::record! {
        #[derive(Debug, Default, Clone, PartialEq)]
        pub struct Outer {
            pub name: String [ssm = "name"],
            pub inner: Option<Inner> [ssm = "inner"],
        }
    }

    #[test]
    fn prefix_normalization() {
        assert_eq!(normalize_prefix(""), "");
        assert_eq!(normalize_prefix("/"), "");
        assert_eq!(normalize_prefix("dev"), "/dev");
        assert_eq!(normalize_prefix("/dev"), "/dev");
        assert_eq!(normalize_prefix("dev/"), "/dev");
        assert_eq!(normalize_prefix("test/auth/token//"), "/test/auth/token");
    }

    #[test]
    fn builder_defaults() {
        let store = ParamStore::builder()
            .with_source(MemorySource::new())
            .build()
            .unwrap();
        assert_eq!(store.tag(), "ssm");
        assert_eq!(store.prefix(), "");
        assert_eq!(store.source_name(), "memory");
    }

    #[cfg(not(feature = "aws"))]
    #[test]
    fn build_without_source_fails() {
        let err = ParamStore::builder().build().unwrap_err();
        assert!(matches!(err, BindError::NoSource));
    }

    #[test]
    fn schema_includes_prefix() {
        let store = ParamStore::builder()
            .with_prefix("dev")
            .with_source(MemorySource::new())
            .build()
            .unwrap();
        let schema = store.schema(&Outer::default()).unwrap();
        assert_eq!(schema.names(), vec!["/dev/inner/a", "/dev/name"]);
    }

    #[test]
    fn locate_allocates_optional_wrappers() {
        let mut outer = Outer::default();
        let field = locate(&mut outer, &[1, 0]).unwrap();
        field.set_str("x").unwrap();
        assert_eq!(outer.inner, Some(Inner { a: "x".to_string() }));
    }

    #[test]
    fn locate_rejects_bad_index() {
        let mut outer = Outer::default();
        let err = locate(&mut outer, &[7]).err().unwrap();
        assert!(matches!(err, BindError::InvalidFieldPath { index: 7, .. }));
    }

    #[test]
    fn target_checks() {
        let mut none: Option<Outer> = None;
        assert!(matches!(record_target(&mut none), Err(BindError::NilTarget)));

        let mut text = String::new();
        assert!(matches!(
            record_target(&mut text),
            Err(BindError::NotRecord { .. })
        ));

        let mut some = Some(Outer::default());
        assert!(record_target(&mut some).is_ok());
    }

    #[test]
    fn debug_hides_source_internals() {
        let store = ParamStore::new(MemorySource::new());
        let shown = format!("{store:?}");
        assert!(shown.contains("memory"));
        assert!(shown.contains("converters: 0"));
    }

    #[tokio::test]
    async fn shared_source_serves_several_stores() {
        let memory = Arc::new(MemorySource::with_params([
            Parameter::string("/dev/name", "dev"),
            Parameter::string("/prod/name", "prod"),
            Parameter::string("/prod/inner/a", "x"),
        ]));
        let shared: Arc<dyn ParameterSource> = memory.clone();
        let dev = ParamStore::builder()
            .with_prefix("dev")
            .with_shared_source(shared.clone())
            .build()
            .unwrap();
        let prod = ParamStore::builder()
            .with_prefix("prod")
            .with_shared_source(shared)
            .build()
            .unwrap();
        assert_eq!(dev.source_name(), "memory");

        let mut target = Outer::default();
        prod.bind(&mut target).await.unwrap();
        assert_eq!(target.name, "prod");
        assert_eq!(target.inner, Some(Inner { a: "x".to_string() }));

        let mut target = Outer::default();
        let err = dev.bind(&mut target).await.unwrap_err();
        assert_eq!(err.not_found().unwrap().names(), &["/dev/inner/a".to_string()]);
        assert_eq!(target.name, "dev");

        let requests = memory.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].names, vec!["/prod/inner/a", "/prod/name"]);
        assert_eq!(requests[1].names, vec!["/dev/inner/a", "/dev/name"]);
    }
}
