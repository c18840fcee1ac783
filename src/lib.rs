//! paramstore - bind parameter store values onto nested records
//!
//! Declare a record with per-field annotations, point a [`ParamStore`] at a
//! [`ParameterSource`], and `bind`:
//!
//! ```rust
//! use paramstore::{record, MemorySource, Parameter, ParamStore};
//!
//! record! {
//!     #[derive(Debug, Default)]
//!     pub struct Database {
//!         pub user: String [ssm = "user"],
//!         pub hosts: Vec<String> [ssm = "hosts"],
//!     }
//! }
//!
//! record! {
//!     #[derive(Debug, Default)]
//!     pub struct Config {
//!         pub name: String [ssm = "name"],
//!         pub db: Database [ssm = "db"],      // /dev/db/...
//!     }
//! }
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let source = MemorySource::with_params([
//!     Parameter::string("/dev/name", "billing"),
//!     Parameter::secure_string("/dev/db/user", "svc_billing"),
//!     Parameter::string_list("/dev/db/hosts", "db1,db2"),
//! ]);
//! let store = ParamStore::builder()
//!     .with_prefix("dev")
//!     .with_source(source)
//!     .build()?;
//!
//! let mut config = Config::default();
//! store.bind(&mut config).await?;
//! assert_eq!(config.db.hosts, vec!["db1", "db2"]);
//! # Ok::<(), paramstore::BindError>(())
//! # }).unwrap();
//! ```
//!
//! ## Modules
//!
//! - [`record`] - the `record!` macro
//! - [`field`] - field handles and type descriptions
//! - [`schema`] - key path resolution
//! - [`convert`] - value conversion and bundled converters
//! - [`source`] - parameter backends
//! - [`store`] - the binder
//! - [`config`] - file/environment configuration

pub mod config;
pub mod convert;
pub mod error;
pub mod field;
pub mod parameter;
pub mod record;
pub mod schema;
pub mod source;
pub mod store;

pub use config::StoreConfig;
pub use convert::{Converter, DurationConverter, NumberConverter, TimeConverter, TimeLayout};
pub use error::{BindError, FixSuggestion, NotFoundError, Result};
pub use field::{Bindable, Field, FieldInfo, Kind, TypeInfo};
pub use parameter::{Parameter, ParameterKind};
pub use schema::Schema;
#[cfg(feature = "aws")]
pub use source::SsmSource;
pub use source::{FileSource, GetParametersRequest, MemorySource, ParameterSource};
pub use store::{ParamStore, ParamStoreBuilder};
