//! Locale-aware fake data drawn from the `fake` crate.

pub mod adapter;
pub mod locales;

pub use adapter::FakeRsAdapter;
pub use locales::LocaleKey;
