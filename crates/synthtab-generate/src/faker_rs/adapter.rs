use fake::Fake;
use fake::faker::address::raw::{BuildingNumber, CityName, PostCode, StreetName};
use fake::faker::internet::raw::FreeEmailProvider;
use fake::faker::name::raw::{FirstName, LastName};
use fake::locales::{EN, PT_BR};
use rand::RngCore;

use crate::faker_rs::locales::LocaleKey;

/// Thin locale dispatch over the `fake` fakers used by semantic columns.
pub struct FakeRsAdapter;

impl FakeRsAdapter {
    pub fn first_name(locale: LocaleKey, rng: &mut dyn RngCore) -> String {
        match locale {
            LocaleKey::EnUs => FirstName(EN).fake_with_rng(rng),
            LocaleKey::PtBr => FirstName(PT_BR).fake_with_rng(rng),
        }
    }

    pub fn last_name(locale: LocaleKey, rng: &mut dyn RngCore) -> String {
        match locale {
            LocaleKey::EnUs => LastName(EN).fake_with_rng(rng),
            LocaleKey::PtBr => LastName(PT_BR).fake_with_rng(rng),
        }
    }

    /// Domain part of a fake email address, e.g. `gmail.com`.
    pub fn email_domain(locale: LocaleKey, rng: &mut dyn RngCore) -> String {
        match locale {
            LocaleKey::EnUs => FreeEmailProvider(EN).fake_with_rng(rng),
            LocaleKey::PtBr => FreeEmailProvider(PT_BR).fake_with_rng(rng),
        }
    }

    pub fn street_address(locale: LocaleKey, rng: &mut dyn RngCore) -> String {
        let (number, street): (String, String) = match locale {
            LocaleKey::EnUs => (
                BuildingNumber(EN).fake_with_rng(rng),
                StreetName(EN).fake_with_rng(rng),
            ),
            LocaleKey::PtBr => (
                BuildingNumber(PT_BR).fake_with_rng(rng),
                StreetName(PT_BR).fake_with_rng(rng),
            ),
        };
        format!("{number} {street}")
    }

    pub fn city(locale: LocaleKey, rng: &mut dyn RngCore) -> String {
        match locale {
            LocaleKey::EnUs => CityName(EN).fake_with_rng(rng),
            LocaleKey::PtBr => CityName(PT_BR).fake_with_rng(rng),
        }
    }

    pub fn post_code(locale: LocaleKey, rng: &mut dyn RngCore) -> String {
        match locale {
            LocaleKey::EnUs => PostCode(EN).fake_with_rng(rng),
            LocaleKey::PtBr => PostCode(PT_BR).fake_with_rng(rng),
        }
    }
}
