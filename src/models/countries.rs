// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use serde::Deserialize;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Label of the empty first entry in every currency select
pub const PLACEHOLDER_LABEL: &str = "Select Currency";

/// One entry of a country's `currencies` mapping
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Currency {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
}

/// A record from the country directory that passed the shape check.
///
/// Currencies are keyed by code in a `BTreeMap`, so iteration is always in
/// lexicographic code order regardless of how the upstream JSON ordered them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CountryRecord {
    pub name: Option<String>,
    pub currencies: BTreeMap<String, Currency>,
}

impl CountryRecord {
    /// Keep a raw directory entry only if it is an object exposing `name`,
    /// `currencies` and `flags`. Field values are not validated here.
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        if !["name", "currencies", "flags"]
            .iter()
            .all(|key| object.contains_key(*key))
        {
            return None;
        }

        let name = object
            .get("name")
            .and_then(|name| name.get("common"))
            .and_then(Value::as_str)
            .map(str::to_string);

        let currencies = object
            .get("currencies")
            .and_then(Value::as_object)
            .map(|entries| {
                entries
                    .iter()
                    .map(|(code, info)| {
                        let currency =
                            serde_json::from_value::<Currency>(info.clone()).unwrap_or_default();
                        (code.clone(), currency)
                    })
                    .collect()
            })
            .unwrap_or_default();

        Some(Self { name, currencies })
    }

    pub fn common_name(&self) -> Option<&str> {
        self.name.as_deref().filter(|name| !name.is_empty())
    }

    /// The lexicographically smallest currency code of the record
    pub fn primary_currency(&self) -> Option<(&str, &Currency)> {
        self.currencies
            .iter()
            .find(|(code, _)| !code.is_empty())
            .map(|(code, currency)| (code.as_str(), currency))
    }

    /// Collapse the record to a `Country`, or `None` when it lacks a name or a currency
    pub fn to_country(&self) -> Option<Country> {
        let name = self.common_name()?;
        let (code, currency) = self.primary_currency()?;
        Some(Country {
            name: name.to_string(),
            currency_code: code.to_string(),
            currency: currency.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Country {
    pub name: String,
    pub currency_code: String,
    pub currency: Currency,
}

/// A selectable entry; the placeholder has an empty code
#[derive(Debug, Clone, PartialEq)]
pub struct CurrencyOption {
    pub code: String,
    pub label: String,
    pub country: String,
    pub currency: Currency,
}

impl CurrencyOption {
    pub fn placeholder() -> Self {
        Self {
            code: String::new(),
            label: PLACEHOLDER_LABEL.to_string(),
            country: String::new(),
            currency: Currency::default(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.code.is_empty()
    }
}

impl From<Country> for CurrencyOption {
    fn from(country: Country) -> Self {
        Self {
            label: format!("{} - {}", country.currency_code, country.name),
            code: country.currency_code,
            country: country.name,
            currency: country.currency,
        }
    }
}

/// Build the options for a currency select, ordered by country name.
/// Records without a name or a currency are skipped; no placeholder is added.
pub fn sorted_options(records: &[CountryRecord]) -> Vec<CurrencyOption> {
    let mut countries: Vec<Country> = records.iter().filter_map(CountryRecord::to_country).collect();
    countries.sort_by(|a, b| compare_country_names(&a.name, &b.name));
    countries.into_iter().map(CurrencyOption::from).collect()
}

/// Compare display names the way a user expects: case and common Latin
/// diacritics are ignored first, the raw strings only break ties.
pub fn compare_country_names(a: &str, b: &str) -> Ordering {
    let folded_a = a.chars().map(fold_char);
    let folded_b = b.chars().map(fold_char);
    folded_a.cmp(folded_b).then_with(|| a.cmp(b))
}

fn fold_char(c: char) -> char {
    match c {
        'À'..='Å' | 'à'..='å' | 'Ā' | 'ā' | 'Ă' | 'ă' | 'Ą' | 'ą' => 'a',
        'Ç' | 'ç' | 'Ć' | 'ć' | 'Č' | 'č' => 'c',
        'È'..='Ë' | 'è'..='ë' | 'Ē' | 'ē' | 'Ė' | 'ė' | 'Ę' | 'ę' | 'Ě' | 'ě' => 'e',
        'Ì'..='Ï' | 'ì'..='ï' | 'Ī' | 'ī' | 'İ' | 'ı' => 'i',
        'Ñ' | 'ñ' | 'Ń' | 'ń' | 'Ň' | 'ň' => 'n',
        'Ò'..='Ö' | 'Ø' | 'ò'..='ö' | 'ø' | 'Ō' | 'ō' | 'Ő' | 'ő' => 'o',
        'Ù'..='Ü' | 'ù'..='ü' | 'Ū' | 'ū' | 'Ů' | 'ů' | 'Ű' | 'ű' => 'u',
        'Ý' | 'ý' | 'ÿ' => 'y',
        'Ś' | 'ś' | 'Ş' | 'ş' | 'Š' | 'š' => 's',
        'Ź' | 'ź' | 'Ż' | 'ż' | 'Ž' | 'ž' => 'z',
        _ => c.to_lowercase().next().unwrap_or(c),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(name: &str, codes: &[&str]) -> CountryRecord {
        let currencies: serde_json::Map<String, Value> = codes
            .iter()
            .map(|code| {
                let info = json!({ "name": format!("{} money", code), "symbol": "$" });
                (code.to_string(), info)
            })
            .collect();

        CountryRecord::from_value(&json!({
            "name": { "common": name },
            "currencies": currencies,
            "flags": { "png": "", "svg": "" }
        }))
        .unwrap()
    }

    #[test]
    fn test_from_value_requires_all_fields() {
        assert!(CountryRecord::from_value(&json!(null)).is_none());
        assert!(CountryRecord::from_value(&json!("France")).is_none());
        assert!(CountryRecord::from_value(&json!({ "name": {}, "currencies": {} })).is_none());
        assert!(CountryRecord::from_value(&json!({ "name": {}, "flags": {} })).is_none());

        // Present but oddly shaped fields still pass the shape check
        let odd = CountryRecord::from_value(&json!({
            "name": "not an object",
            "currencies": null,
            "flags": 3
        }))
        .unwrap();
        assert_eq!(odd.common_name(), None);
        assert!(odd.currencies.is_empty());
        assert!(odd.to_country().is_none());
    }

    #[test]
    fn test_primary_currency_is_smallest_code() {
        let panama = CountryRecord::from_value(&json!({
            "name": { "common": "Panama", "official": "Republic of Panama" },
            "currencies": {
                "USD": { "name": "United States dollar", "symbol": "$" },
                "PAB": { "name": "Panamanian balboa", "symbol": "B/." }
            },
            "flags": {}
        }))
        .unwrap();

        let (code, currency) = panama.primary_currency().unwrap();
        assert_eq!(code, "PAB");
        assert_eq!(currency.symbol.as_deref(), Some("B/."));
    }

    #[test]
    fn test_currency_info_tolerates_missing_fields() {
        let record = CountryRecord::from_value(&json!({
            "name": { "common": "Somewhere" },
            "currencies": { "XYZ": "unexpected" },
            "flags": {}
        }))
        .unwrap();

        let country = record.to_country().unwrap();
        assert_eq!(country.currency_code, "XYZ");
        assert_eq!(country.currency, Currency::default());
    }

    #[test]
    fn test_sorted_options_skips_incomplete_records() {
        let records = vec![
            record("Germany", &["EUR"]),
            record("Antarctica", &[]),
            record("", &["XXX"]),
            record("Brazil", &["BRL"]),
        ];

        let options = sorted_options(&records);
        let labels: Vec<&str> = options.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, vec!["BRL - Brazil", "EUR - Germany"]);
        assert_eq!(options[0].code, "BRL");
        assert_eq!(options[0].currency.name.as_deref(), Some("BRL money"));
    }

    #[test]
    fn test_compare_country_names() {
        let mut names = vec![
            "Zambia",
            "Åland Islands",
            "Curaçao",
            "Cook Islands",
            "Côte d'Ivoire",
            "albania",
            "Réunion",
            "Russia",
        ];
        names.sort_by(|a, b| compare_country_names(a, b));
        assert_eq!(
            names,
            vec![
                "Åland Islands",
                "albania",
                "Cook Islands",
                "Côte d'Ivoire",
                "Curaçao",
                "Réunion",
                "Russia",
                "Zambia",
            ]
        );
        assert_eq!(compare_country_names("Chad", "Chad"), Ordering::Equal);
    }
}
